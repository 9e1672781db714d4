//! Stations and their per-service visit times.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveTime;

use super::ServiceId;

/// Handle to a station interned in a [`Timetable`](crate::timetable::Timetable).
///
/// Ids are only minted by the timetable that owns the station, so an id is
/// always valid for the timetable it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub(crate) u32);

impl StationId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named stop participating in zero or more services.
///
/// A station records, for each service passing through it, the time of that
/// visit. It may appear in many services, but at most once per service.
/// Stations are owned by the timetable; everything else refers to them by
/// [`StationId`].
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    visits: HashMap<ServiceId, NaiveTime>,
}

impl Station {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visits: HashMap::new(),
        }
    }

    /// The station's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The time at which the given service visits this station, if it does.
    pub fn time_of(&self, service: ServiceId) -> Option<NaiveTime> {
        self.visits.get(&service).copied()
    }

    /// All services visiting this station, with their visit times.
    ///
    /// Iteration order is unspecified; callers needing determinism must sort.
    pub fn services(&self) -> impl Iterator<Item = (ServiceId, NaiveTime)> + '_ {
        self.visits.iter().map(|(&id, &time)| (id, time))
    }

    /// Record a visit by `service` at `time`.
    ///
    /// Returns `false` (and records nothing) if the service already visits
    /// this station.
    pub(crate) fn record_visit(&mut self, service: ServiceId, time: NaiveTime) -> bool {
        if self.visits.contains_key(&service) {
            return false;
        }
        self.visits.insert(service, time);
        true
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
