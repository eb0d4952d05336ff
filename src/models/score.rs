//! Unit-interval scores (rates, probabilities, confidence values).

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A value in `[0.0, 1.0]`.
///
/// Validated on construction and on deserialization, so a `Score` held by any
/// model is always in range. NaN is rejected.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(pub(super) f64);

impl Score {
    pub const ZERO: Score = Score(0.0);
    pub const ONE: Score = Score(1.0);

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        Self::for_field("score", value)
    }

    /// Same as [`Score::new`] but names the offending field in the error.
    pub fn for_field(field: &'static str, value: f64) -> Result<Self, ValidationError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: 0.0,
                max: 1.0,
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
