//! Domain types for the ticket office.
//!
//! The timetable side (stations, services, trips, itineraries) models the
//! operator's schedule graph; the passenger side (passengers, categories)
//! models the travellers booking against it. Types enforce their invariants
//! at construction or mutation time, so code receiving them can trust their
//! validity.

mod category;
mod itinerary;
mod passenger;
mod service;
mod station;
mod trip;

pub use category::{Category, NORMAL_THRESHOLD, RECENT_WINDOW, SPECIAL_THRESHOLD};
pub use itinerary::Itinerary;
pub use passenger::{Passenger, PassengerId};
pub use service::{Service, ServiceId, Stop};
pub use station::{Station, StationId};
pub use trip::Trip;
