//! Scheduled train services.
//!
//! A `Service` is one scheduled run: an ordered sequence of station visits,
//! each at a fixed time, with a unit cost for riding the whole run. Partial
//! rides are priced pro rata by elapsed time.

use std::fmt;

use chrono::{Duration, NaiveTime};

use super::StationId;

/// The operator's number for a scheduled service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub u32);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One station visit within a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    /// The station visited.
    pub station: StationId,
    /// When the service calls there.
    pub time: NaiveTime,
}

/// A scheduled train run visiting an ordered sequence of stations.
///
/// # Invariants
///
/// - Visit times within one service are distinct; the stop list is kept
///   sorted by time at insertion, so every read view is sorted and the
///   sorted order defines "before/after" on the service.
/// - A station appears at most once (enforced by the timetable, which owns
///   the station-side visit map).
#[derive(Debug, Clone)]
pub struct Service {
    id: ServiceId,
    cost: f64,
    stops: Vec<Stop>,
}

impl Service {
    pub(crate) fn new(id: ServiceId, cost: f64) -> Self {
        Self {
            id,
            cost,
            stops: Vec::new(),
        }
    }

    /// The service's unique id.
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// The unit cost of riding the service end to end.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// All stops, sorted by visit time.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// The first stop, if any station has been added.
    pub fn origin(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// The last stop, if any station has been added.
    pub fn terminus(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Position of `station` in the sorted stop list.
    pub fn position_of(&self, station: StationId) -> Option<usize> {
        self.stops.iter().position(|stop| stop.station == station)
    }

    /// The time at which this service visits `station`, if it does.
    pub fn time_of(&self, station: StationId) -> Option<NaiveTime> {
        self.stops
            .iter()
            .find(|stop| stop.station == station)
            .map(|stop| stop.time)
    }

    /// The sorted stops from `start` to `end`, inclusive.
    ///
    /// Empty if either endpoint is not a stop of this service, or if `start`
    /// occurs after `end` in the service's order.
    pub fn span(&self, start: StationId, end: StationId) -> &[Stop] {
        let (Some(from), Some(to)) = (self.position_of(start), self.position_of(end)) else {
            return &[];
        };
        if from > to {
            return &[];
        }
        &self.stops[from..=to]
    }

    /// All stops strictly after `station` in sorted order.
    ///
    /// `None` signals that the station is not on this service.
    pub fn stops_after(&self, station: StationId) -> Option<&[Stop]> {
        let position = self.position_of(station)?;
        Some(&self.stops[position + 1..])
    }

    /// Total scheduled duration, origin to terminus.
    pub fn total_duration(&self) -> Duration {
        match (self.origin(), self.terminus()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => Duration::zero(),
        }
    }

    /// Pro-rata cost of riding from `start` to `end`.
    ///
    /// `cost / total_minutes * elapsed_minutes`. Returns the sentinel `-1.0`
    /// when the elapsed time is negative (end before start on this service)
    /// or either endpoint is not a stop; callers must check before using.
    pub fn cost_between(&self, start: StationId, end: StationId) -> f64 {
        let (Some(depart), Some(arrive)) = (self.time_of(start), self.time_of(end)) else {
            return -1.0;
        };
        let elapsed = arrive - depart;
        if elapsed < Duration::zero() {
            return -1.0;
        }
        let total = self.total_duration().num_minutes();
        if total == 0 {
            return 0.0;
        }
        self.cost / total as f64 * elapsed.num_minutes() as f64
    }

    /// Insert a stop, keeping the list sorted by visit time.
    ///
    /// The caller (the timetable) guarantees the station is not already on
    /// this service.
    pub(crate) fn insert_stop(&mut self, station: StationId, time: NaiveTime) {
        let at = self.stops.partition_point(|stop| stop.time < time);
        self.stops.insert(at, Stop { station, time });
    }
}
