//! Recursive itinerary search over the timetable.
//!
//! Given a departure station, an arrival station, a day and an earliest
//! time, the engine explores the schedule graph depth-first and proposes
//! itineraries. The policy is earliest-arrival-first and direct-preferring,
//! not cost-optimal: at each level a direct connection suppresses all
//! indirect exploration, and each candidate service contributes at most its
//! single earliest-arriving continuation.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::domain::{Itinerary, ServiceId, StationId, Trip};
use crate::timetable::Timetable;

/// One itinerary search: where from, where to, and no earlier than when.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery {
    /// Station the journey must start at.
    pub departure: StationId,
    /// Station the journey must end at.
    pub arrival: StationId,
    /// Calendar day of travel.
    pub day: NaiveDate,
    /// Journeys must leave the departure station strictly after this time.
    pub earliest: NaiveTime,
}

/// Search the timetable for itineraries satisfying `query`.
///
/// Results are totally ordered by (start time, end time), stabilized by the
/// first trip's service id so equal-time results are reproducible.
pub fn search(timetable: &Timetable, query: &SearchQuery) -> Vec<Itinerary> {
    let mut results = explore(
        timetable,
        query.departure,
        query.arrival,
        query.day,
        query.earliest,
    );
    results.sort_by_key(|itinerary| {
        (
            itinerary.start_time(),
            itinerary.end_time(),
            itinerary.first_trip().map(Trip::service),
        )
    });
    debug!(
        departure = timetable.station(query.departure).name(),
        arrival = timetable.station(query.arrival).name(),
        found = results.len(),
        "itinerary search finished"
    );
    results
}

/// Depth-first exploration from `from` towards `to`, considering services
/// that depart `from` strictly after `cutoff`.
///
/// Direct single-trip connections strictly dominate: if any exist at this
/// level, indirect routes are not explored. Otherwise, for each candidate
/// service, every stop reachable after `from` is searched recursively and
/// only the earliest-arriving continuation that the current leg can legally
/// front-extend is kept.
fn explore(
    timetable: &Timetable,
    from: StationId,
    to: StationId,
    day: NaiveDate,
    cutoff: NaiveTime,
) -> Vec<Itinerary> {
    // The station's visit map is unordered; sort by id for determinism.
    let mut departures: Vec<(ServiceId, NaiveTime)> = timetable
        .station(from)
        .services()
        .filter(|&(_, departs)| departs > cutoff)
        .collect();
    departures.sort_by_key(|&(service, _)| service);

    let mut found = Vec::new();
    for &(service, departs) in &departures {
        let Some(arrives) = timetable.time_at(service, to) else {
            continue;
        };
        if arrives > departs {
            let mut itinerary = Itinerary::new(day);
            if itinerary.extend_back(timetable, service, from, to) {
                found.push(itinerary);
            }
        }
    }
    if !found.is_empty() {
        return found;
    }

    for &(service, _) in &departures {
        let Ok(schedule) = timetable.service(service) else {
            continue;
        };
        let Some(onward) = schedule.stops_after(from) else {
            continue;
        };
        let best = onward
            .iter()
            .flat_map(|stop| explore(timetable, stop.station, to, day, stop.time))
            .filter_map(|mut itinerary| {
                // The connecting leg runs from the current station up to the
                // continuation's own departure stop.
                let boundary = itinerary.first_trip()?.start();
                itinerary
                    .extend_front(timetable, service, from, boundary)
                    .then_some(itinerary)
            })
            .min_by_key(|itinerary| itinerary.end_time());
        if let Some(itinerary) = best {
            found.push(itinerary);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceId;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 10, 30).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        format!("{s}:00").parse().unwrap()
    }

    /// Build a timetable from (id, cost, stops) triples.
    fn timetable(services: &[(u32, f64, &[(&str, &str)])]) -> Timetable {
        let mut tt = Timetable::new();
        for &(id, cost, stops) in services {
            tt.add_service(ServiceId(id), cost).unwrap();
            for &(at, name) in stops {
                tt.add_stop(ServiceId(id), name, time(at)).unwrap();
            }
        }
        tt
    }

    fn run(tt: &Timetable, from: &str, to: &str, earliest: &str) -> Vec<Itinerary> {
        let query = SearchQuery {
            departure: tt.station_id(from).unwrap(),
            arrival: tt.station_id(to).unwrap(),
            day: day(),
            earliest: time(earliest),
        };
        search(tt, &query)
    }

    #[test]
    fn direct_service_found() {
        // Scenario: one service A 08:00 -> B 09:00, cost 20.
        let tt = timetable(&[(1, 20.0, &[("08:00", "A"), ("09:00", "B")])]);

        let results = run(&tt, "A", "B", "07:00");
        assert_eq!(results.len(), 1);

        let itinerary = &results[0];
        assert_eq!(itinerary.trips().len(), 1);
        assert_eq!(itinerary.cost(), 20.0);
        assert_eq!(itinerary.start_time(), Some(time("08:00")));
        assert_eq!(itinerary.end_time(), Some(time("09:00")));
        assert_eq!(itinerary.day(), day());
    }

    #[test]
    fn departure_must_be_strictly_after_the_cutoff() {
        let tt = timetable(&[(1, 20.0, &[("08:00", "A"), ("09:00", "B")])]);

        // 08:30 is past the only departure.
        assert!(run(&tt, "A", "B", "08:30").is_empty());
        // An 08:00 cutoff excludes the 08:00 departure itself.
        assert!(run(&tt, "A", "B", "08:00").is_empty());
    }

    #[test]
    fn connecting_services_chained() {
        // A 08:00 -> B 09:00, then B 09:15 -> C 10:00.
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("09:15", "B"), ("10:00", "C")]),
        ]);

        let results = run(&tt, "A", "C", "07:00");
        assert_eq!(results.len(), 1);

        let itinerary = &results[0];
        assert_eq!(itinerary.trips().len(), 2);
        assert_eq!(itinerary.cost(), 20.0);
        assert_eq!(itinerary.start_time(), Some(time("08:00")));
        assert_eq!(itinerary.end_time(), Some(time("10:00")));
        assert_eq!(itinerary.trips()[0].service(), ServiceId(1));
        assert_eq!(itinerary.trips()[1].service(), ServiceId(2));
    }

    #[test]
    fn results_ordered_by_start_then_end() {
        let tt = timetable(&[
            (3, 10.0, &[("09:00", "A"), ("10:30", "B")]),
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("09:00", "A"), ("09:45", "B")]),
        ]);

        let results = run(&tt, "A", "B", "07:00");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].start_time(), Some(time("08:00")));
        assert_eq!(results[1].end_time(), Some(time("09:45")));
        assert_eq!(results[2].end_time(), Some(time("10:30")));
    }

    #[test]
    fn equal_times_ordered_by_service_id() {
        let tt = timetable(&[
            (8, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 15.0, &[("08:00", "A"), ("09:00", "B")]),
        ]);

        let results = run(&tt, "A", "B", "07:00");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].trips()[0].service(), ServiceId(2));
        assert_eq!(results[1].trips()[0].service(), ServiceId(8));
    }

    #[test]
    fn direct_connection_suppresses_indirect_routes() {
        // Direct A -> C, plus a faster indirect route via B. The policy
        // prefers the direct hit and never reports the indirect one.
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("11:00", "C")]),
            (2, 10.0, &[("08:05", "A"), ("08:30", "B")]),
            (3, 10.0, &[("08:40", "B"), ("09:00", "C")]),
        ]);

        let results = run(&tt, "A", "C", "07:00");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].trips().len(), 1);
        assert_eq!(results[0].trips()[0].service(), ServiceId(1));
    }

    #[test]
    fn per_service_continuation_keeps_earliest_arrival() {
        // From B two onward services reach C; the recursion keeps only the
        // earlier-arriving continuation for the A -> B leg.
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("09:10", "B"), ("11:00", "C")]),
            (3, 10.0, &[("09:15", "B"), ("10:00", "C")]),
        ]);

        let results = run(&tt, "A", "C", "07:00");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].end_time(), Some(time("10:00")));
        assert_eq!(results[0].trips()[1].service(), ServiceId(3));
    }

    #[test]
    fn intermediate_boarding_point_considered() {
        // The connection to C leaves from an intermediate stop of service 1,
        // not its terminus.
        let tt = timetable(&[
            (1, 30.0, &[("08:00", "A"), ("09:00", "B"), ("10:00", "D")]),
            (2, 10.0, &[("09:30", "B"), ("10:15", "C")]),
        ]);

        let results = run(&tt, "A", "C", "07:00");
        assert_eq!(results.len(), 1);

        let itinerary = &results[0];
        assert_eq!(itinerary.trips().len(), 2);
        // The first leg is cut at B, costing half of service 1's unit cost.
        assert_eq!(itinerary.trips()[0].cost(), 15.0);
        assert_eq!(itinerary.end_time(), Some(time("10:15")));
    }

    #[test]
    fn no_route_means_empty_result() {
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("10:00", "C"), ("11:00", "D")]),
        ]);

        assert!(run(&tt, "A", "D", "07:00").is_empty());
        assert!(run(&tt, "B", "A", "07:00").is_empty());
    }

    #[test]
    fn missed_connection_is_not_proposed() {
        // The only onward service leaves B before we can get there.
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("08:55", "B"), ("10:00", "C")]),
        ]);

        assert!(run(&tt, "A", "C", "07:00").is_empty());
    }

    #[test]
    fn results_satisfy_itinerary_invariants() {
        let tt = timetable(&[
            (1, 10.0, &[("08:00", "A"), ("09:00", "B")]),
            (2, 10.0, &[("09:15", "B"), ("10:00", "C")]),
            (3, 10.0, &[("09:20", "B"), ("10:30", "C")]),
            (4, 10.0, &[("10:10", "C"), ("11:00", "D")]),
        ]);

        for target in ["B", "C", "D"] {
            for itinerary in run(&tt, "A", target, "07:00") {
                assert!(!itinerary.is_empty());
                for pair in itinerary.trips().windows(2) {
                    assert_eq!(pair[0].end(), pair[1].start());
                    assert!(pair[0].arrives() <= pair[1].departs());
                }
                let mut services: Vec<_> =
                    itinerary.trips().iter().map(|t| t.service()).collect();
                services.sort();
                services.dedup();
                assert_eq!(services.len(), itinerary.trips().len());
            }
        }
    }
}
