//! Passenger discount categories.
//!
//! A category is not a stored attribute but a pure function of the
//! passenger's recent itinerary costs: the sum of the last
//! [`RECENT_WINDOW`] committed itineraries decides the tier, so transitions
//! are instantaneous and memoryless given the history.

use std::fmt;

use super::Itinerary;

/// How many of the most recent itineraries count towards the tier.
pub const RECENT_WINDOW: usize = 10;

/// Recent spend strictly above this makes a passenger [`Category::Special`].
pub const SPECIAL_THRESHOLD: f64 = 2500.0;

/// Recent spend at or below this keeps a passenger [`Category::Normal`].
pub const NORMAL_THRESHOLD: f64 = 250.0;

/// A passenger's discount tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    /// Recent spend at or below [`NORMAL_THRESHOLD`]; no discount.
    #[default]
    Normal,
    /// Recent spend between the thresholds; 15% off.
    Frequent,
    /// Recent spend strictly above [`SPECIAL_THRESHOLD`]; 25% off.
    Special,
}

impl Category {
    /// The tier for a given recent-cost sum.
    pub fn from_recent_cost(recent: f64) -> Self {
        if recent > SPECIAL_THRESHOLD {
            Category::Special
        } else if recent <= NORMAL_THRESHOLD {
            Category::Normal
        } else {
            Category::Frequent
        }
    }

    /// Sum of the costs of the last [`RECENT_WINDOW`] itineraries.
    pub fn recent_cost(itineraries: &[Itinerary]) -> f64 {
        let skip = itineraries.len().saturating_sub(RECENT_WINDOW);
        itineraries[skip..].iter().map(Itinerary::cost).sum()
    }

    /// Multiplier applied to an itinerary's cost before it is added to the
    /// passenger's cumulative spend.
    pub fn discount(self) -> f64 {
        match self {
            Category::Normal => 1.0,
            Category::Frequent => 0.85,
            Category::Special => 0.75,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Normal => "NORMAL",
            Category::Frequent => "FREQUENT",
            Category::Special => "SPECIAL",
        })
    }
}
