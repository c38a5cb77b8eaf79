//! Smoothed cognitive scores.

use serde::{Deserialize, Serialize};

use crate::sample::TimestampMs;

/// Lower and upper bound of every score.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// One tick's smoothed attention/stress/curiosity triple for a subject.
///
/// Field order is part of the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub timestamp: TimestampMs,
    pub attention: f64,
    pub stress: f64,
    pub curiosity: f64,
}

impl ScoredPoint {
    /// Build a point, clamping each score and rounding to two decimals.
    pub fn new(timestamp: TimestampMs, attention: f64, stress: f64, curiosity: f64) -> Self {
        Self {
            timestamp,
            attention: round2(clamp_score(attention)),
            stress: round2(clamp_score(stress)),
            curiosity: round2(clamp_score(curiosity)),
        }
    }
}

/// Clamp into the score range; NaN maps to the lower bound.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
