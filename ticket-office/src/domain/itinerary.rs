//! Itineraries: chronologically chained trips forming one journey.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::timetable::Timetable;

use super::{ServiceId, StationId, Trip};

/// An ordered chain of trips forming one traveller journey on one day.
///
/// # Invariants
///
/// After every successful mutation:
///
/// 1. Trips are chronologically contiguous: each trip ends where the next
///    starts, no earlier than the previous trip arrives.
/// 2. No service appears twice.
/// 3. No station appears twice across the trips, other than the boundary
///    station shared by two consecutive trips.
/// 4. Total cost is the sum of trip costs; total duration spans the first
///    departure to the last arrival.
///
/// A zero-trip itinerary is a transient construction state used while the
/// search engine assembles a chain; it is never exposed as a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    day: NaiveDate,
    trips: Vec<Trip>,
}

impl Itinerary {
    /// An empty itinerary for `day`, ready to be extended.
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            trips: Vec::new(),
        }
    }

    /// The calendar day this journey takes place on.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// The trips, in travel order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// True while in the transient zero-trip construction state.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// The first trip, once any leg has been added.
    pub fn first_trip(&self) -> Option<&Trip> {
        self.trips.first()
    }

    /// The last trip, once any leg has been added.
    pub fn last_trip(&self) -> Option<&Trip> {
        self.trips.last()
    }

    /// Departure time of the first trip.
    pub fn start_time(&self) -> Option<NaiveTime> {
        self.first_trip().map(Trip::departs)
    }

    /// Arrival time of the last trip.
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.last_trip().map(Trip::arrives)
    }

    /// Sum of the trips' pro-rata costs.
    pub fn cost(&self) -> f64 {
        self.trips.iter().map(Trip::cost).sum()
    }

    /// Time from first departure to last arrival.
    pub fn duration(&self) -> Duration {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => Duration::zero(),
        }
    }

    /// Prepend a leg riding `service` from `start` to `end`.
    ///
    /// Valid only if:
    /// - both endpoints are stops of `service`, with `start` strictly before
    ///   `end` in the service's order (at least two stops in the span);
    /// - the itinerary is empty, or `end` is the current first station and
    ///   `end`'s time on `service` is not after the current start time;
    /// - `service` is not already ridden by this itinerary;
    /// - none of the leg's stops other than `end` (the boundary) coincide
    ///   with a station already in the itinerary.
    ///
    /// Returns `false` without mutating when any condition fails; rejection
    /// is ordinary control flow, exercised on nearly every search branch.
    pub fn extend_front(
        &mut self,
        timetable: &Timetable,
        service: ServiceId,
        start: StationId,
        end: StationId,
    ) -> bool {
        let Ok(schedule) = timetable.service(service) else {
            return false;
        };
        let span = schedule.span(start, end);
        if span.len() < 2 {
            return false;
        }
        if let Some(first) = self.first_trip() {
            if end != first.start() || span[span.len() - 1].time > first.departs() {
                return false;
            }
        }
        if self.uses_service(service) {
            return false;
        }
        let visited = self.station_set(timetable);
        if span[..span.len() - 1]
            .iter()
            .any(|stop| visited.contains(&stop.station))
        {
            return false;
        }
        match Trip::new(schedule, start, end) {
            Some(trip) => {
                self.trips.insert(0, trip);
                true
            }
            None => false,
        }
    }

    /// Append a leg riding `service` from `start` to `end`.
    ///
    /// Mirror of [`extend_front`](Self::extend_front): `start` must be the
    /// current last station with a departure no earlier than the current
    /// arrival, the service must be unused, and no stop other than `start`
    /// (the boundary) may collide with a station already in the itinerary.
    pub fn extend_back(
        &mut self,
        timetable: &Timetable,
        service: ServiceId,
        start: StationId,
        end: StationId,
    ) -> bool {
        let Ok(schedule) = timetable.service(service) else {
            return false;
        };
        let span = schedule.span(start, end);
        if span.len() < 2 {
            return false;
        }
        if let Some(last) = self.last_trip() {
            if start != last.end() || span[0].time < last.arrives() {
                return false;
            }
        }
        if self.uses_service(service) {
            return false;
        }
        let visited = self.station_set(timetable);
        if span[1..].iter().any(|stop| visited.contains(&stop.station)) {
            return false;
        }
        match Trip::new(schedule, start, end) {
            Some(trip) => {
                self.trips.push(trip);
                true
            }
            None => false,
        }
    }

    fn uses_service(&self, service: ServiceId) -> bool {
        self.trips.iter().any(|trip| trip.service() == service)
    }

    /// Every station touched by the itinerary: the overall start plus each
    /// trip's stops excluding its own start (which is the previous trip's
    /// end).
    fn station_set(&self, timetable: &Timetable) -> HashSet<StationId> {
        let mut stations = HashSet::new();
        if let Some(first) = self.first_trip() {
            stations.insert(first.start());
        }
        for trip in &self.trips {
            let Ok(schedule) = timetable.service(trip.service()) else {
                continue;
            };
            for stop in &schedule.span(trip.start(), trip.end())[1..] {
                stations.insert(stop.station);
            }
        }
        stations
    }
}
