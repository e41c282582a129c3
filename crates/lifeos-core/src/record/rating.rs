//! Importance/urgency rating on the `[1,5]` scale in half steps.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A validated importance or urgency value.
///
/// Construction through [`Rating::new`] rejects anything outside `[1,5]` or
/// off the 0.5 grid; [`Rating::clamped`] is for values coming from outside
/// the user's hands (advisory estimates) and forces them onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;
    pub const STEP: f64 = 0.5;
    /// Ratings at or above this value count as "high" in the matrix view.
    pub const HIGH_THRESHOLD: f64 = 3.0;

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        Self::for_field("rating", value)
    }

    /// Validate `value`, naming `field` in the error.
    pub fn for_field(field: &'static str, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::RatingOutOfRange { field, value });
        }
        if (value / Self::STEP).fract() != 0.0 {
            return Err(ValidationError::RatingStep { field, value });
        }
        Ok(Self(value))
    }

    /// Clamp into range and snap to the nearest half step.
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self(Self::MIN);
        }
        let snapped = (value / Self::STEP).round() * Self::STEP;
        Self(snapped.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_high(self) -> bool {
        self.0 >= Self::HIGH_THRESHOLD
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(3.0)
    }
}

impl TryFrom<f64> for Rating {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
