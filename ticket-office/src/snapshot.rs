//! JSON persistence for the ticket office.
//!
//! Domain types are not serialized directly: the snapshot is a flat DTO
//! layer keyed by station names and service ids, and loading replays it
//! through the normal construction paths so every invariant is re-checked.
//! A file that cannot be replayed is reported as corrupt rather than being
//! patched up.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Itinerary, Passenger, PassengerId, ServiceId};
use crate::office::TicketOffice;
use crate::timetable::Timetable;

/// Failures reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding: {0}")]
    Json(#[from] serde_json::Error),

    /// The file decoded but does not describe a valid office.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    services: Vec<ServiceSnapshot>,
    passengers: Vec<PassengerSnapshot>,
    next_passenger: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServiceSnapshot {
    id: u32,
    cost: f64,
    stops: Vec<StopSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StopSnapshot {
    time: NaiveTime,
    station: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PassengerSnapshot {
    id: u32,
    name: String,
    spent: f64,
    itineraries: Vec<ItinerarySnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItinerarySnapshot {
    day: NaiveDate,
    legs: Vec<LegSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegSnapshot {
    service: u32,
    from: String,
    to: String,
}

/// Serialize `office` to `path` as pretty-printed JSON.
pub fn save_to(office: &TicketOffice, path: &Path) -> Result<(), SnapshotError> {
    let snapshot = capture(office);
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "snapshot written");
    Ok(())
}

/// Deserialize an office from `path`, replaying the snapshot through the
/// normal construction paths.
pub fn load_from(path: &Path) -> Result<TicketOffice, SnapshotError> {
    let json = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;
    restore(snapshot)
}

fn capture(office: &TicketOffice) -> Snapshot {
    let timetable = office.timetable();
    let station_name = |id| timetable.station(id).name().to_owned();

    let services = timetable
        .services()
        .map(|service| ServiceSnapshot {
            id: service.id().0,
            cost: service.cost(),
            stops: service
                .stops()
                .iter()
                .map(|stop| StopSnapshot {
                    time: stop.time,
                    station: station_name(stop.station),
                })
                .collect(),
        })
        .collect();

    let passengers = office
        .passengers()
        .map(|passenger| PassengerSnapshot {
            id: passenger.id().0,
            name: passenger.name().to_owned(),
            spent: passenger.spent(),
            itineraries: passenger
                .itineraries()
                .iter()
                .map(|itinerary| ItinerarySnapshot {
                    day: itinerary.day(),
                    legs: itinerary
                        .trips()
                        .iter()
                        .map(|trip| LegSnapshot {
                            service: trip.service().0,
                            from: station_name(trip.start()),
                            to: station_name(trip.end()),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Snapshot {
        services,
        passengers,
        next_passenger: office.next_passenger_counter(),
    }
}

fn restore(snapshot: Snapshot) -> Result<TicketOffice, SnapshotError> {
    let mut timetable = Timetable::new();
    for service in &snapshot.services {
        timetable
            .add_service(ServiceId(service.id), service.cost)
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        for stop in &service.stops {
            timetable
                .add_stop(ServiceId(service.id), &stop.station, stop.time)
                .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        }
    }

    let mut passengers = Vec::with_capacity(snapshot.passengers.len());
    for passenger in snapshot.passengers {
        if passenger.id >= snapshot.next_passenger {
            return Err(SnapshotError::Corrupt(format!(
                "passenger id {} beyond counter {}",
                passenger.id, snapshot.next_passenger
            )));
        }
        let mut itineraries = Vec::with_capacity(passenger.itineraries.len());
        for record in passenger.itineraries {
            let mut itinerary = Itinerary::new(record.day);
            for leg in &record.legs {
                let from = timetable
                    .station_id(&leg.from)
                    .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
                let to = timetable
                    .station_id(&leg.to)
                    .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
                if !itinerary.extend_back(&timetable, ServiceId(leg.service), from, to) {
                    return Err(SnapshotError::Corrupt(format!(
                        "itinerary leg {}/{}/{} does not replay",
                        leg.service, leg.from, leg.to
                    )));
                }
            }
            itineraries.push(itinerary);
        }
        passengers.push(Passenger::restore(
            PassengerId(passenger.id),
            passenger.name,
            passenger.spent,
            itineraries,
        ));
    }

    Ok(TicketOffice::from_parts(
        timetable,
        passengers,
        snapshot.next_passenger,
    ))
}
