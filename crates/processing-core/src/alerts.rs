//! Hysteresis alerting on a scored stream.
//!
//! Two states per signal: `Normal → Alerting` needs the value to stay on
//! the bad side of the high threshold for more than `duration_ticks`
//! consecutive ticks; `Alerting → Normal` needs the value to cross the
//! (less extreme) recovery threshold. The band between the two thresholds
//! keeps a borderline value from flapping.

use attentrack_common::config::AlertRuleConfig;
use attentrack_common::error::{AttentrackError, AttentrackResult};
use attentrack_signal_model::alert::AlertEvent;
use attentrack_signal_model::sample::TimestampMs;

/// Which side of the threshold is the bad one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachDirection {
    /// Alert when the value stays high (e.g. stress).
    Above,
    /// Alert when the value stays low (e.g. attention).
    Below,
}

impl BreachDirection {
    fn breaches(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::Below => value < threshold,
        }
    }

    fn recovered(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value < threshold,
            Self::Below => value > threshold,
        }
    }
}

/// Thresholds for one alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRule {
    pub high_threshold: f64,
    pub duration_ticks: u32,
    pub recovery_threshold: f64,
}

impl AlertRule {
    /// Build a rule, requiring the recovery threshold to sit strictly on
    /// the safe side of the high threshold for `direction`.
    pub fn new(
        direction: BreachDirection,
        high_threshold: f64,
        duration_ticks: u32,
        recovery_threshold: f64,
    ) -> AttentrackResult<Self> {
        if !high_threshold.is_finite() || !recovery_threshold.is_finite() {
            return Err(AttentrackError::config("alert thresholds must be finite"));
        }
        if !direction.recovered(recovery_threshold, high_threshold) {
            return Err(AttentrackError::config(format!(
                "recovery threshold {recovery_threshold} must be less extreme than \
                 {high_threshold} for {direction:?} alerts"
            )));
        }
        Ok(Self {
            high_threshold,
            duration_ticks,
            recovery_threshold,
        })
    }

    /// Build a rule from its config section.
    pub fn from_config(
        direction: BreachDirection,
        config: &AlertRuleConfig,
    ) -> AttentrackResult<Self> {
        Self::new(
            direction,
            config.high_threshold,
            config.duration_ticks,
            config.recovery_threshold,
        )
    }
}

/// Hysteresis monitor for one signal.
#[derive(Debug, Clone)]
pub struct AlertHysteresis {
    signal: String,
    direction: BreachDirection,
    breach_ticks: u32,
    active: bool,
}

impl AlertHysteresis {
    pub fn new(signal: impl Into<String>, direction: BreachDirection) -> Self {
        Self {
            signal: signal.into(),
            direction,
            breach_ticks: 0,
            active: false,
        }
    }

    /// Feed one value; returns an event only on a state transition.
    ///
    /// Non-finite values are ignored.
    pub fn observe(
        &mut self,
        value: f64,
        rule: &AlertRule,
        timestamp: TimestampMs,
    ) -> Option<AlertEvent> {
        if !value.is_finite() {
            return None;
        }

        if self.direction.breaches(value, rule.high_threshold) {
            self.breach_ticks = self.breach_ticks.saturating_add(1);
        } else {
            self.breach_ticks = 0;
        }

        if !self.active && self.breach_ticks > rule.duration_ticks {
            self.active = true;
            tracing::info!(signal = %self.signal, value, "Alert raised");
            return Some(AlertEvent::raised(self.signal.clone(), timestamp));
        }

        if self.active && self.direction.recovered(value, rule.recovery_threshold) {
            self.active = false;
            tracing::info!(signal = %self.signal, value, "Alert recovered");
            return Some(AlertEvent::recovered(self.signal.clone(), timestamp));
        }

        None
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Consecutive ticks spent on the bad side of the high threshold.
    pub fn breach_ticks(&self) -> u32 {
        self.breach_ticks
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    pub fn reset(&mut self) {
        self.breach_ticks = 0;
        self.active = false;
    }
}
