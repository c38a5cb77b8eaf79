//! Per-subject scoring and alerting.

use attentrack_common::config::{AlertsConfig, ScoringConfig};
use attentrack_common::error::AttentrackResult;
use attentrack_signal_model::alert::AlertEvent;
use attentrack_signal_model::sample::FeatureVector;
use attentrack_signal_model::score::ScoredPoint;

use crate::alerts::{AlertHysteresis, AlertRule, BreachDirection};
use crate::cognitive::CognitiveScorer;

pub const STRESS_SIGNAL: &str = "stress";
pub const ATTENTION_SIGNAL: &str = "attention";

/// Output of one subject tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectUpdate {
    pub point: ScoredPoint,
    pub alerts: Vec<AlertEvent>,
}

/// Owns everything that is mutated for one subject: the scorer and the
/// high-stress / low-attention alert monitors.
#[derive(Debug, Clone)]
pub struct SubjectMonitor {
    scorer: CognitiveScorer,
    stress: (AlertHysteresis, AlertRule),
    attention: (AlertHysteresis, AlertRule),
}

impl SubjectMonitor {
    pub fn new(scoring: ScoringConfig, alerts: &AlertsConfig) -> AttentrackResult<Self> {
        Ok(Self {
            scorer: CognitiveScorer::new(scoring),
            stress: (
                AlertHysteresis::new(STRESS_SIGNAL, BreachDirection::Above),
                AlertRule::from_config(BreachDirection::Above, &alerts.stress)?,
            ),
            attention: (
                AlertHysteresis::new(ATTENTION_SIGNAL, BreachDirection::Below),
                AlertRule::from_config(BreachDirection::Below, &alerts.attention)?,
            ),
        })
    }

    /// Score one sample and run both alert monitors on the result.
    pub fn observe(&mut self, features: &FeatureVector) -> SubjectUpdate {
        let point = self.scorer.update(features);
        let alerts = [
            check(&mut self.stress, point.stress, point.timestamp),
            check(&mut self.attention, point.attention, point.timestamp),
        ]
        .into_iter()
        .flatten()
        .collect();

        SubjectUpdate { point, alerts }
    }

    /// Signals currently in the alerting state.
    pub fn active_alerts(&self) -> Vec<&str> {
        [&self.stress.0, &self.attention.0]
            .into_iter()
            .filter(|m| m.is_active())
            .map(|m| m.signal())
            .collect()
    }

    pub fn scorer(&self) -> &CognitiveScorer {
        &self.scorer
    }

    pub fn reset(&mut self) {
        self.scorer.reset();
        self.stress.0.reset();
        self.attention.0.reset();
    }
}

fn check(
    (monitor, rule): &mut (AlertHysteresis, AlertRule),
    value: f64,
    timestamp: u64,
) -> Option<AlertEvent> {
    monitor.observe(value, rule, timestamp)
}
