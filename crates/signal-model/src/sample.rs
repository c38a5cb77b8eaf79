//! Feature samples produced by the perception layer.
//!
//! One [`FeatureVector`] arrives per subject per sampling tick. Samples are
//! exchanged as JSONL (one JSON object per line); `#` lines are comments.

use std::collections::BTreeMap;

use attentrack_common::error::{AttentrackError, AttentrackResult};
use serde::{Deserialize, Serialize};

/// Milliseconds since session start.
pub type TimestampMs = u64;

/// Expression names understood by the scoring heuristics.
pub mod expression {
    pub const ANGRY: &str = "angry";
    pub const FEARFUL: &str = "fearful";
    pub const NEUTRAL: &str = "neutral";
    pub const HAPPY: &str = "happy";
    pub const SURPRISED: &str = "surprised";
}

/// One tick's geometric and expression measurements for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Head yaw in degrees.
    pub yaw: f64,
    /// Head pitch in degrees (negative = leaning forward / looking down).
    pub pitch: f64,
    /// Head roll in degrees.
    pub roll: f64,

    /// Eye aspect ratio, typically 0.0–0.3+.
    pub ear: f64,

    /// Blinks per minute over a rolling 60 s window.
    pub blink_rate: f64,

    /// Emotion name → confidence in [0, 1]. Entries need not sum to 1.
    #[serde(default)]
    pub expressions: BTreeMap<String, f64>,

    /// Auxiliary interaction-level scalar supplied by the capture layer.
    #[serde(default)]
    pub interaction_level: f64,
}

impl FeatureVector {
    /// A neutral, forward-facing sample with open eyes and no expressions.
    pub fn neutral(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            yaw: 0.0,
            pitch: 5.0,
            roll: 0.0,
            ear: 0.28,
            blink_rate: 15.0,
            expressions: BTreeMap::new(),
            interaction_level: 0.0,
        }
    }

    /// Builder-style helper to attach an expression confidence.
    pub fn with_expression(mut self, name: impl Into<String>, confidence: f64) -> Self {
        self.expressions.insert(name.into(), confidence);
        self
    }

    /// Confidence for a named expression, clamped to [0, 1].
    ///
    /// Missing or non-finite entries read as 0.
    pub fn expression(&self, name: &str) -> f64 {
        match self.expressions.get(name) {
            Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Whether every geometric field is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.yaw, self.pitch, self.roll, self.ear, self.blink_rate]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Parse feature samples from JSONL content.
///
/// Blank lines and `#` comment lines are skipped. Errors carry the 1-based
/// line number of the offending record.
pub fn parse_samples(jsonl: &str) -> AttentrackResult<Vec<FeatureVector>> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| AttentrackError::parse(n, e.to_string()))
        })
        .collect()
}
