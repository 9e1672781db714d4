//! The ticket office: the single entry point tying the timetable, the
//! search engine and the passenger register together.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::domain::{Itinerary, Passenger, PassengerId, Service, ServiceId};
use crate::planner::{search, SearchQuery};
use crate::snapshot::{self, SnapshotError};
use crate::timetable::{Timetable, TimetableError};

/// Failures surfaced by ticket office operations.
#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    /// No passenger with this id is registered.
    #[error("no such passenger: {0}")]
    NoSuchPassengerId(PassengerId),

    /// Another passenger already has this name.
    #[error("passenger name already taken: {0}")]
    DuplicatePassengerName(String),

    /// The date string is not `YYYY-MM-DD`.
    #[error("bad date: {0}")]
    BadDate(String),

    /// The time string is not `HH:MM`.
    #[error("bad time: {0}")]
    BadTime(String),

    /// The chosen proposal number is out of range.
    #[error("passenger {passenger} has no proposal number {choice}")]
    NoSuchItineraryChoice {
        passenger: PassengerId,
        choice: usize,
    },

    /// `save` was called before any file was associated.
    #[error("no file associated with this office")]
    MissingFileAssociation,

    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// The ticket office.
///
/// Owns the timetable and the passenger register, dispatches itinerary
/// searches, and records commitments. Also remembers the file it was last
/// saved to or loaded from, so a plain `save` can reuse it.
#[derive(Debug, Default)]
pub struct TicketOffice {
    timetable: Timetable,
    passengers: BTreeMap<PassengerId, Passenger>,
    next_passenger: u32,
    file: Option<PathBuf>,
}

impl TicketOffice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an office from persisted parts. Used by the snapshot loader.
    pub(crate) fn from_parts(
        timetable: Timetable,
        passengers: Vec<Passenger>,
        next_passenger: u32,
    ) -> Self {
        Self {
            timetable,
            passengers: passengers.into_iter().map(|p| (p.id(), p)).collect(),
            next_passenger,
            file: None,
        }
    }

    /// Read-only view of the schedule graph.
    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub(crate) fn next_passenger_counter(&self) -> u32 {
        self.next_passenger
    }

    /// Register a new service with its unit cost.
    pub fn add_service(&mut self, id: ServiceId, cost: f64) -> Result<(), OfficeError> {
        self.timetable.add_service(id, cost)?;
        Ok(())
    }

    /// Record a stop of `service` at the named station.
    pub fn add_stop(
        &mut self,
        service: ServiceId,
        station: &str,
        time: NaiveTime,
    ) -> Result<(), OfficeError> {
        self.timetable.add_stop(service, station, time)?;
        Ok(())
    }

    /// Register a passenger, assigning the next sequential id.
    pub fn register_passenger(&mut self, name: &str) -> Result<PassengerId, OfficeError> {
        if self.passengers.values().any(|p| p.name() == name) {
            return Err(OfficeError::DuplicatePassengerName(name.to_owned()));
        }
        let id = PassengerId(self.next_passenger);
        self.next_passenger += 1;
        self.passengers.insert(id, Passenger::new(id, name));
        info!(%id, name, "passenger registered");
        Ok(id)
    }

    /// Change a passenger's name. The new name must still be unique.
    pub fn rename_passenger(&mut self, id: PassengerId, name: &str) -> Result<(), OfficeError> {
        if !self.passengers.contains_key(&id) {
            return Err(OfficeError::NoSuchPassengerId(id));
        }
        if self
            .passengers
            .values()
            .any(|p| p.id() != id && p.name() == name)
        {
            return Err(OfficeError::DuplicatePassengerName(name.to_owned()));
        }
        if let Some(passenger) = self.passengers.get_mut(&id) {
            passenger.set_name(name);
        }
        Ok(())
    }

    pub fn passenger(&self, id: PassengerId) -> Result<&Passenger, OfficeError> {
        self.passengers
            .get(&id)
            .ok_or(OfficeError::NoSuchPassengerId(id))
    }

    /// All passengers, ordered by id.
    pub fn passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.passengers.values()
    }

    /// Search for itineraries on behalf of a passenger and store them as
    /// that passenger's proposals, replacing any previous set.
    ///
    /// The date is `YYYY-MM-DD` and the time `HH:MM`; journeys must depart
    /// strictly after the given time. Returns the stored proposals.
    pub fn plan(
        &mut self,
        passenger: PassengerId,
        from: &str,
        to: &str,
        date: &str,
        time: &str,
    ) -> Result<&[Itinerary], OfficeError> {
        if !self.passengers.contains_key(&passenger) {
            return Err(OfficeError::NoSuchPassengerId(passenger));
        }
        let departure = self.timetable.station_id(from)?;
        let arrival = self.timetable.station_id(to)?;
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| OfficeError::BadDate(date.to_owned()))?;
        let earliest = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| OfficeError::BadTime(time.to_owned()))?;

        let query = SearchQuery {
            departure,
            arrival,
            day,
            earliest,
        };
        let proposals = search(&self.timetable, &query);
        info!(%passenger, from, to, date, proposals = proposals.len(), "search planned");

        let entry = self
            .passengers
            .get_mut(&passenger)
            .ok_or(OfficeError::NoSuchPassengerId(passenger))?;
        entry.set_proposals(proposals);
        Ok(entry.proposals())
    }

    /// Commit one of the passenger's current proposals.
    ///
    /// Proposals are numbered from 1; choosing 0 declines them all and is a
    /// no-op. The committed itinerary is charged at the discount the
    /// passenger's category carried before the commitment.
    pub fn commit(&mut self, passenger: PassengerId, choice: usize) -> Result<(), OfficeError> {
        let entry = self
            .passengers
            .get_mut(&passenger)
            .ok_or(OfficeError::NoSuchPassengerId(passenger))?;
        if choice == 0 {
            return Ok(());
        }
        let Some(itinerary) = entry.proposals().get(choice - 1).cloned() else {
            return Err(OfficeError::NoSuchItineraryChoice { passenger, choice });
        };
        entry.commit(itinerary);
        info!(%passenger, choice, category = %entry.category(), "itinerary committed");
        Ok(())
    }

    /// Commit a fully-built itinerary directly, bypassing the proposal
    /// step. Used by the line-format importer.
    pub(crate) fn add_itinerary(
        &mut self,
        passenger: PassengerId,
        itinerary: Itinerary,
    ) -> Result<(), OfficeError> {
        let entry = self
            .passengers
            .get_mut(&passenger)
            .ok_or(OfficeError::NoSuchPassengerId(passenger))?;
        entry.commit(itinerary);
        Ok(())
    }

    /// Services departing from the named station, ordered by id.
    pub fn services_departing_from(&self, station: &str) -> Result<Vec<&Service>, OfficeError> {
        let id = self.timetable.station_id(station)?;
        Ok(self.timetable.services_departing_from(id))
    }

    /// Services terminating at the named station, ordered by id.
    pub fn services_arriving_at(&self, station: &str) -> Result<Vec<&Service>, OfficeError> {
        let id = self.timetable.station_id(station)?;
        Ok(self.timetable.services_arriving_at(id))
    }

    /// Discard the timetable and every passenger, keeping the id counter
    /// and the file association. Ids are never reused across a reset.
    pub fn reset(&mut self) {
        self.timetable = Timetable::new();
        self.passengers.clear();
        info!("office reset");
    }

    /// Save to the associated file.
    pub fn save(&self) -> Result<(), OfficeError> {
        let Some(file) = self.file.clone() else {
            return Err(OfficeError::MissingFileAssociation);
        };
        snapshot::save_to(self, &file)?;
        Ok(())
    }

    /// Save to `path` and remember it as the associated file.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), OfficeError> {
        let path = path.into();
        snapshot::save_to(self, &path)?;
        info!(path = %path.display(), "office saved");
        self.file = Some(path);
        Ok(())
    }

    /// Load an office from a snapshot file, associating it with that file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, OfficeError> {
        let path = path.into();
        let mut office = snapshot::load_from(&path)?;
        info!(path = %path.display(), "office loaded");
        office.file = Some(path);
        Ok(office)
    }

    /// Populate the office from a line-format timetable file.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<(), crate::import::ImportError> {
        crate::import::import(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn time(s: &str) -> NaiveTime {
        format!("{s}:00").parse().unwrap()
    }

    /// A little network: A -> B -> C plus a pricey direct A -> C.
    fn office() -> TicketOffice {
        let mut office = TicketOffice::new();
        office.add_service(ServiceId(1), 20.0).unwrap();
        office.add_stop(ServiceId(1), "A", time("08:00")).unwrap();
        office.add_stop(ServiceId(1), "B", time("09:00")).unwrap();
        office.add_service(ServiceId(2), 10.0).unwrap();
        office.add_stop(ServiceId(2), "B", time("09:15")).unwrap();
        office.add_stop(ServiceId(2), "C", time("10:00")).unwrap();
        office
    }

    #[test]
    fn passenger_ids_are_sequential() {
        let mut office = office();
        assert_eq!(office.register_passenger("Alice").unwrap(), PassengerId(0));
        assert_eq!(office.register_passenger("Bob").unwrap(), PassengerId(1));
    }

    #[test]
    fn duplicate_passenger_name_rejected() {
        let mut office = office();
        office.register_passenger("Alice").unwrap();
        assert!(matches!(
            office.register_passenger("Alice"),
            Err(OfficeError::DuplicatePassengerName(_))
        ));
    }

    #[test]
    fn rename_checks_uniqueness() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();
        let bob = office.register_passenger("Bob").unwrap();

        assert!(matches!(
            office.rename_passenger(bob, "Alice"),
            Err(OfficeError::DuplicatePassengerName(_))
        ));
        // Renaming to one's own name is fine.
        office.rename_passenger(alice, "Alice").unwrap();
        office.rename_passenger(bob, "Robert").unwrap();
        assert_eq!(office.passenger(bob).unwrap().name(), "Robert");
    }

    #[test]
    fn plan_requires_known_passenger_and_stations() {
        let mut office = office();
        assert!(matches!(
            office.plan(PassengerId(9), "A", "C", "2017-10-30", "07:00"),
            Err(OfficeError::NoSuchPassengerId(PassengerId(9)))
        ));

        let alice = office.register_passenger("Alice").unwrap();
        assert!(matches!(
            office.plan(alice, "Nowhere", "C", "2017-10-30", "07:00"),
            Err(OfficeError::Timetable(TimetableError::NoSuchStationName(_)))
        ));
    }

    #[test]
    fn plan_rejects_malformed_date_and_time() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();

        assert!(matches!(
            office.plan(alice, "A", "C", "30/10/2017", "07:00"),
            Err(OfficeError::BadDate(_))
        ));
        assert!(matches!(
            office.plan(alice, "A", "C", "2017-10-30", "7am"),
            Err(OfficeError::BadTime(_))
        ));
    }

    #[test]
    fn plan_stores_proposals_on_the_passenger() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();

        let found = office
            .plan(alice, "A", "C", "2017-10-30", "07:00")
            .unwrap()
            .len();
        assert_eq!(found, 1);
        assert_eq!(office.passenger(alice).unwrap().proposals().len(), 1);

        // A new search replaces the old proposal set.
        let found = office
            .plan(alice, "A", "C", "2017-10-30", "09:00")
            .unwrap()
            .len();
        assert_eq!(found, 0);
        assert!(office.passenger(alice).unwrap().proposals().is_empty());
    }

    #[test]
    fn commit_charges_and_records() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();
        office.plan(alice, "A", "C", "2017-10-30", "07:00").unwrap();
        office.commit(alice, 1).unwrap();

        let passenger = office.passenger(alice).unwrap();
        assert_eq!(passenger.itineraries().len(), 1);
        assert_eq!(passenger.spent(), 30.0);
        assert_eq!(passenger.category(), Category::Normal);
    }

    #[test]
    fn commit_zero_declines() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();
        office.plan(alice, "A", "C", "2017-10-30", "07:00").unwrap();
        office.commit(alice, 0).unwrap();

        assert!(office.passenger(alice).unwrap().itineraries().is_empty());
    }

    #[test]
    fn commit_out_of_range_rejected() {
        let mut office = office();
        let alice = office.register_passenger("Alice").unwrap();
        office.plan(alice, "A", "C", "2017-10-30", "07:00").unwrap();

        assert!(matches!(
            office.commit(alice, 2),
            Err(OfficeError::NoSuchItineraryChoice { choice: 2, .. })
        ));
    }

    #[test]
    fn reset_keeps_the_id_counter() {
        let mut office = office();
        office.register_passenger("Alice").unwrap();
        office.register_passenger("Bob").unwrap();
        office.reset();

        assert_eq!(office.passengers().count(), 0);
        assert!(office.timetable().services().next().is_none());
        assert_eq!(office.register_passenger("Carol").unwrap(), PassengerId(2));
    }

    #[test]
    fn save_without_association_fails() {
        let office = office();
        assert!(matches!(
            office.save(),
            Err(OfficeError::MissingFileAssociation)
        ));
    }

    #[test]
    fn endpoint_queries_resolve_names() {
        let office = office();
        let departing: Vec<_> = office
            .services_departing_from("B")
            .unwrap()
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(departing, vec![ServiceId(2)]);
        assert!(office.services_arriving_at("Nowhere").is_err());
    }
}
