//! Inclusive date ranges for windowed queries and deletions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// An inclusive range of calendar days.
///
/// The constructor rejects ranges whose start comes after their end, so a
/// value of this type always describes a non-empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a date range covering the days from `start` through `end`, inclusive.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// The first day of the range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day of the range.
    pub fn end(&self) -> Date {
        self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
