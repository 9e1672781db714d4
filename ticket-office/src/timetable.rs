//! The timetable: stations and services forming the schedule graph.
//!
//! The timetable owns every station and service; trips and itineraries refer
//! to them by id. It is populated once by a loader and then queried
//! read-only by the search engine (no mutation happens during a search).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveTime;

use crate::domain::{Service, ServiceId, Station, StationId};

/// Failures reported while building or querying the timetable.
///
/// All of these are surfaced synchronously to the caller and are recoverable
/// by choosing different input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// No service with this id exists.
    #[error("no such service: {0}")]
    NoSuchServiceId(ServiceId),

    /// No station with this name exists.
    #[error("no such station: {0}")]
    NoSuchStationName(String),

    /// A service with this id already exists.
    #[error("service {0} already exists")]
    DuplicateServiceId(ServiceId),

    /// The service already calls at this station.
    #[error("station {station} appears twice on service {service}")]
    DuplicateStationOnService {
        station: String,
        service: ServiceId,
    },
}

/// The bipartite schedule graph of stations and services.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    stations: Vec<Station>,
    by_name: HashMap<String, StationId>,
    services: BTreeMap<ServiceId, Service>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new service with its unit cost.
    pub fn add_service(&mut self, id: ServiceId, cost: f64) -> Result<(), TimetableError> {
        if self.services.contains_key(&id) {
            return Err(TimetableError::DuplicateServiceId(id));
        }
        self.services.insert(id, Service::new(id, cost));
        Ok(())
    }

    /// Record that `service` calls at the named station at `time`.
    ///
    /// The station is created on first mention. Fails if the service does
    /// not exist or already calls at that station; a failed insert still
    /// leaves the station registered.
    pub fn add_stop(
        &mut self,
        service: ServiceId,
        station_name: &str,
        time: NaiveTime,
    ) -> Result<StationId, TimetableError> {
        if !self.services.contains_key(&service) {
            return Err(TimetableError::NoSuchServiceId(service));
        }
        let station = self.intern_station(station_name);
        if !self.stations[station.index()].record_visit(service, time) {
            return Err(TimetableError::DuplicateStationOnService {
                station: station_name.to_owned(),
                service,
            });
        }
        // Checked above; unreachable branch kept for the borrow split.
        if let Some(schedule) = self.services.get_mut(&service) {
            schedule.insert_stop(station, time);
        }
        Ok(station)
    }

    fn intern_station(&mut self, name: &str) -> StationId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = StationId(self.stations.len() as u32);
        self.stations.push(Station::new(name));
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Look up a station by its unique name.
    pub fn station_id(&self, name: &str) -> Result<StationId, TimetableError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TimetableError::NoSuchStationName(name.to_owned()))
    }

    /// The station behind an id minted by this timetable.
    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    /// Look up a service by id.
    pub fn service(&self, id: ServiceId) -> Result<&Service, TimetableError> {
        self.services
            .get(&id)
            .ok_or(TimetableError::NoSuchServiceId(id))
    }

    /// All services, ordered by id.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    /// All stations, in registration order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// The time at which `service` calls at `station`, if it does.
    pub fn time_at(&self, service: ServiceId, station: StationId) -> Option<NaiveTime> {
        self.stations[station.index()].time_of(service)
    }

    /// Services whose first stop is `station`, ordered by id.
    pub fn services_departing_from(&self, station: StationId) -> Vec<&Service> {
        self.services
            .values()
            .filter(|s| s.origin().is_some_and(|stop| stop.station == station))
            .collect()
    }

    /// Services whose last stop is `station`, ordered by id.
    pub fn services_arriving_at(&self, station: StationId) -> Vec<&Service> {
        self.services
            .values()
            .filter(|s| s.terminus().is_some_and(|stop| stop.station == station))
            .collect()
    }
}
