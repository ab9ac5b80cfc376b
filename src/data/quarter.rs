//! Quarter labels in `YYYYQn` form

use std::fmt;

/// A calendar quarter such as `2024Q4`
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    /// Creates a quarter, rejecting anything outside 1..=4
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// Parses a label like `2024Q4` (case-insensitive, surrounding space ignored)
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let (year, quarter) = label.split_once(['Q', 'q'])?;
        Self::new(year.parse().ok()?, quarter.parse().ok()?)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}
