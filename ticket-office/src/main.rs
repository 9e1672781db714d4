use std::error::Error;
use std::process::ExitCode;

use ticket_office::domain::Itinerary;
use ticket_office::office::TicketOffice;
use ticket_office::timetable::Timetable;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [file, from, to, date, time] = args.as_slice() else {
        eprintln!("Usage: ticket-office <timetable-file> <from> <to> <YYYY-MM-DD> <HH:MM>");
        return ExitCode::FAILURE;
    };

    match run(file, from, to, date, time) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(file: &str, from: &str, to: &str, date: &str, time: &str) -> Result<(), Box<dyn Error>> {
    let mut office = TicketOffice::new();
    office.import(file)?;

    let passenger = office.register_passenger("enquiry")?;
    let proposals = office.plan(passenger, from, to, date, time)?;

    if proposals.is_empty() {
        println!("No itineraries from {from} to {to} after {time}.");
        return Ok(());
    }
    let proposals = proposals.to_vec();
    for (number, itinerary) in proposals.iter().enumerate() {
        print_itinerary(number + 1, itinerary, office.timetable());
    }
    Ok(())
}

fn print_itinerary(number: usize, itinerary: &Itinerary, timetable: &Timetable) {
    println!(
        "Itinerary {number} on {}: {:.2}",
        itinerary.day(),
        itinerary.cost()
    );
    for trip in itinerary.trips() {
        println!(
            "  service {}: {} {} -> {} {}",
            trip.service(),
            timetable.station(trip.start()).name(),
            trip.departs().format("%H:%M"),
            timetable.station(trip.end()).name(),
            trip.arrives().format("%H:%M"),
        );
    }
}
