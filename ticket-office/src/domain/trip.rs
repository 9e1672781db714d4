//! Trips: one contiguous ride on a single service.

use chrono::{Duration, NaiveTime};

use super::{Service, ServiceId, StationId};

/// One ride segment on a single service between two of its stops.
///
/// The departure/arrival times and the pro-rata cost are resolved from the
/// service at construction, so an owned trip needs no timetable access.
/// Construction is crate-internal: trips only come into existence through
/// the itinerary extension operations, which validate the leg first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    service: ServiceId,
    start: StationId,
    end: StationId,
    departs: NaiveTime,
    arrives: NaiveTime,
    cost: f64,
}

impl Trip {
    /// Build a trip from `start` to `end` on `service`.
    ///
    /// `None` if the endpoints are not both stops of the service, coincide,
    /// or occur in the wrong order.
    pub(crate) fn new(service: &Service, start: StationId, end: StationId) -> Option<Self> {
        let span = service.span(start, end);
        if span.len() < 2 {
            return None;
        }
        let cost = service.cost_between(start, end);
        debug_assert!(cost >= 0.0, "span validation implies forward travel");
        Some(Self {
            service: service.id(),
            start,
            end,
            departs: span[0].time,
            arrives: span[span.len() - 1].time,
            cost,
        })
    }

    /// The service ridden.
    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// Boarding station.
    pub fn start(&self) -> StationId {
        self.start
    }

    /// Alighting station.
    pub fn end(&self) -> StationId {
        self.end
    }

    /// Departure time at the boarding station.
    pub fn departs(&self) -> NaiveTime {
        self.departs
    }

    /// Arrival time at the alighting station.
    pub fn arrives(&self) -> NaiveTime {
        self.arrives
    }

    /// Pro-rata share of the service's unit cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Time spent on board.
    pub fn duration(&self) -> Duration {
        self.arrives - self.departs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    fn make_service() -> Service {
        let mut service = Service::new(ServiceId(5), 40.0);
        service.insert_stop(StationId(0), time("08:00:00"));
        service.insert_stop(StationId(1), time("09:00:00"));
        service.insert_stop(StationId(2), time("10:00:00"));
        service
    }

    #[test]
    fn trip_resolves_times_and_cost() {
        let service = make_service();
        let trip = Trip::new(&service, StationId(0), StationId(1)).unwrap();

        assert_eq!(trip.service(), ServiceId(5));
        assert_eq!(trip.departs(), time("08:00:00"));
        assert_eq!(trip.arrives(), time("09:00:00"));
        assert_eq!(trip.duration(), Duration::minutes(60));
        assert_eq!(trip.cost(), 20.0);
    }

    #[test]
    fn backward_or_degenerate_legs_rejected() {
        let service = make_service();

        assert!(Trip::new(&service, StationId(1), StationId(0)).is_none());
        assert!(Trip::new(&service, StationId(1), StationId(1)).is_none());
        assert!(Trip::new(&service, StationId(0), StationId(9)).is_none());
    }
}
