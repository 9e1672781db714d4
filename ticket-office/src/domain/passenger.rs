//! Passengers and their itinerary history.

use std::fmt;

use chrono::Duration;

use super::{Category, Itinerary};

/// Sequential passenger number, assigned by the ticket office.
///
/// Ids are never reused: erasing all passengers does not rewind the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassengerId(pub u32);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered traveller.
///
/// Holds the permanent list of committed itineraries, the proposal set from
/// the most recent search (replaced wholesale on each new search), the
/// cumulative discounted spend, and an advisory category tag. The tag is a
/// cache: [`category`](Self::category) always recomputes from the committed
/// history.
#[derive(Debug, Clone)]
pub struct Passenger {
    id: PassengerId,
    name: String,
    spent: f64,
    itineraries: Vec<Itinerary>,
    proposals: Vec<Itinerary>,
    tag: Category,
}

impl Passenger {
    pub(crate) fn new(id: PassengerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            spent: 0.0,
            itineraries: Vec::new(),
            proposals: Vec::new(),
            tag: Category::Normal,
        }
    }

    /// Rebuild a passenger from persisted state. The spend is restored
    /// verbatim: historical discounts are not replayed.
    pub(crate) fn restore(
        id: PassengerId,
        name: impl Into<String>,
        spent: f64,
        itineraries: Vec<Itinerary>,
    ) -> Self {
        let tag = Category::from_recent_cost(Category::recent_cost(&itineraries));
        Self {
            id,
            name: name.into(),
            spent,
            itineraries,
            proposals: Vec::new(),
            tag,
        }
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Cumulative discounted spend across all committed itineraries.
    pub fn spent(&self) -> f64 {
        self.spent
    }

    /// The committed itineraries, oldest first.
    pub fn itineraries(&self) -> &[Itinerary] {
        &self.itineraries
    }

    /// The proposal set from the most recent search.
    pub fn proposals(&self) -> &[Itinerary] {
        &self.proposals
    }

    /// Replace the proposal set wholesale. A prior uncommitted set is
    /// silently discarded; at most one is ever live.
    pub(crate) fn set_proposals(&mut self, proposals: Vec<Itinerary>) {
        self.proposals = proposals;
    }

    /// The current discount tier, recomputed from the last ten committed
    /// itinerary costs. The stored tag is ignored.
    pub fn category(&self) -> Category {
        Category::from_recent_cost(Category::recent_cost(&self.itineraries))
    }

    /// Commit an itinerary permanently.
    ///
    /// The discount applied to this itinerary's cost comes from the category
    /// the passenger held *before* the addition.
    pub(crate) fn commit(&mut self, itinerary: Itinerary) {
        let category = self.category();
        self.spent += itinerary.cost() * category.discount();
        self.itineraries.push(itinerary);
        self.tag = self.category();
    }

    /// Total time spent travelling across all committed itineraries.
    pub fn total_travel_time(&self) -> Duration {
        self.itineraries
            .iter()
            .map(Itinerary::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }
}

impl fmt::Display for Passenger {
    /// `id|name|category|itineraries|spent|HH:MM travelled`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let travelled = self.total_travel_time();
        write!(
            f,
            "{}|{}|{}|{}|{:.2}|{:02}:{:02}",
            self.id,
            self.name,
            self.category(),
            self.itineraries.len(),
            self.spent,
            travelled.num_hours(),
            travelled.num_minutes() % 60,
        )
    }
}
