//! Rail operator ticket office.
//!
//! Timetable management, itinerary discovery and passenger booking for a
//! single train operator: "get me from this station to that one, leaving
//! after this time" answered against a fixed daily schedule.

pub mod domain;
pub mod import;
pub mod office;
pub mod planner;
pub mod snapshot;
pub mod timetable;
