//! Line-format import of timetables and passenger history.
//!
//! The format is pipe-delimited, one record per line:
//!
//! ```text
//! PASSENGER|name
//! SERVICE|id|cost|time|station|time|station|...
//! ITINERARY|passengerId|date|serviceId/from/to|...
//! ```
//!
//! `SERVICE` stops are (time, station) pairs in calling order. `ITINERARY`
//! legs are applied in order and must chain: each leg's departure station
//! and time must follow on from the previous leg's arrival.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::domain::{Itinerary, PassengerId, ServiceId};
use crate::office::{OfficeError, TicketOffice};

/// Failure reading an import file, with the offending line number.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("reading import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: LineError,
    },
}

/// What went wrong on a single line.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("unknown record type {0:?}")]
    UnknownRecord(String),

    #[error("too few fields")]
    TooFewFields,

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid time {0:?}")]
    InvalidTime(String),

    #[error("invalid date {0:?}")]
    InvalidDate(String),

    /// An itinerary leg did not chain onto the itinerary built so far.
    #[error("leg {0:?} does not extend the itinerary")]
    RejectedLeg(String),

    #[error(transparent)]
    Office(#[from] OfficeError),
}

/// Import `path` into `office`, line by line.
///
/// Stops at the first bad line; records before it stay applied.
pub fn import(office: &mut TicketOffice, path: &Path) -> Result<(), ImportError> {
    let contents = fs::read_to_string(path)?;
    let mut records = 0usize;
    for (number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        apply_line(office, line).map_err(|source| ImportError::Line {
            line: number + 1,
            source,
        })?;
        records += 1;
    }
    info!(path = %path.display(), records, "import finished");
    Ok(())
}

fn apply_line(office: &mut TicketOffice, line: &str) -> Result<(), LineError> {
    let mut fields = line.split('|');
    let record = fields.next().unwrap_or_default();
    let rest: Vec<&str> = fields.collect();
    match record {
        "PASSENGER" => passenger_record(office, &rest),
        "SERVICE" => service_record(office, &rest),
        "ITINERARY" => itinerary_record(office, &rest),
        other => Err(LineError::UnknownRecord(other.to_owned())),
    }
}

fn passenger_record(office: &mut TicketOffice, fields: &[&str]) -> Result<(), LineError> {
    let [name] = fields else {
        return Err(LineError::TooFewFields);
    };
    office.register_passenger(name)?;
    Ok(())
}

fn service_record(office: &mut TicketOffice, fields: &[&str]) -> Result<(), LineError> {
    let [id, cost, stops @ ..] = fields else {
        return Err(LineError::TooFewFields);
    };
    if stops.is_empty() || stops.len() % 2 != 0 {
        return Err(LineError::TooFewFields);
    }
    let id = ServiceId(parse_number(id)?);
    let cost: f64 = cost
        .parse()
        .map_err(|_| LineError::InvalidNumber((*cost).to_owned()))?;
    office.add_service(id, cost)?;
    for pair in stops.chunks_exact(2) {
        let time = parse_time(pair[0])?;
        office.add_stop(id, pair[1], time)?;
    }
    Ok(())
}

fn itinerary_record(office: &mut TicketOffice, fields: &[&str]) -> Result<(), LineError> {
    let [passenger, date, legs @ ..] = fields else {
        return Err(LineError::TooFewFields);
    };
    if legs.is_empty() {
        return Err(LineError::TooFewFields);
    }
    let passenger = PassengerId(parse_number(passenger)?);
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| LineError::InvalidDate((*date).to_owned()))?;

    let mut itinerary = Itinerary::new(day);
    for leg in legs {
        let mut parts = leg.split('/');
        let (Some(service), Some(from), Some(to), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LineError::RejectedLeg((*leg).to_owned()));
        };
        let service = ServiceId(parse_number(service)?);
        let timetable = office.timetable();
        let from = timetable
            .station_id(from)
            .map_err(OfficeError::from)?;
        let to = timetable
            .station_id(to)
            .map_err(OfficeError::from)?;
        if !itinerary.extend_back(timetable, service, from, to) {
            return Err(LineError::RejectedLeg((*leg).to_owned()));
        }
    }
    office.add_itinerary(passenger, itinerary)?;
    Ok(())
}

fn parse_number(field: &str) -> Result<u32, LineError> {
    field
        .parse()
        .map_err(|_| LineError::InvalidNumber(field.to_owned()))
}

fn parse_time(field: &str) -> Result<NaiveTime, LineError> {
    NaiveTime::parse_from_str(field, "%H:%M")
        .map_err(|_| LineError::InvalidTime(field.to_owned()))
}
