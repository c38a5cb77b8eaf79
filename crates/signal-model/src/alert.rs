//! Alert events emitted by hysteresis monitors.

use serde::{Deserialize, Serialize};

use crate::sample::TimestampMs;

/// Transition reported by an alert monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Raised,
    Recovered,
}

/// A debounced alert transition for one monitored signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    /// Name of the monitored signal (e.g. "stress").
    pub signal: String,
    pub timestamp: TimestampMs,
}

impl AlertEvent {
    pub fn raised(signal: impl Into<String>, timestamp: TimestampMs) -> Self {
        Self {
            kind: AlertKind::Raised,
            signal: signal.into(),
            timestamp,
        }
    }

    pub fn recovered(signal: impl Into<String>, timestamp: TimestampMs) -> Self {
        Self {
            kind: AlertKind::Recovered,
            signal: signal.into(),
            timestamp,
        }
    }
}
