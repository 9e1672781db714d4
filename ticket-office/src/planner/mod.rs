//! Itinerary planning against a timetable.

mod search;

pub use search::{search, SearchQuery};
