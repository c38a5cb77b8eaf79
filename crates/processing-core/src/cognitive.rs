//! Cognitive scoring: feature vector → smoothed attention/stress/curiosity.
//!
//! # Algorithm
//!
//! 1. **Raw scores** are computed from head pose, eye aspect ratio, blink
//!    rate and expression confidences with fixed additive heuristics.
//! 2. Each raw score is **clamped** to `[0, 100]`.
//! 3. Each clamped score is **smoothed** by its own [`ScalarFilter`].
//!
//! The curiosity flow-state bonus reads the *previous* tick's smoothed
//! attention and stress, so it lags the other two scores by one tick.

use attentrack_common::config::ScoringConfig;
use attentrack_signal_model::sample::{expression, FeatureVector};
use attentrack_signal_model::score::{ScoredPoint, SCORE_MAX, SCORE_MIN};

use crate::scalar_filter::ScalarFilter;

/// Neutral pitch: a slight downward gaze is not penalised.
const NEUTRAL_PITCH_DEG: f64 = 5.0;
const POSE_PENALTY_EXPONENT: f64 = 1.6;
/// Below this eye aspect ratio the eyes count as closed or averted.
const EYES_CLOSED_EAR: f64 = 0.20;
const EYES_CLOSED_PENALTY: f64 = 50.0;

const STRESS_BASE: f64 = 30.0;
const CURIOSITY_BASE: f64 = 50.0;
const FLOW_BONUS: f64 = 20.0;
const FORWARD_LEAN_BONUS: f64 = 15.0;
/// Pitch range (exclusive, degrees) read as leaning forward.
const FORWARD_LEAN_PITCH: (f64, f64) = (-25.0, -5.0);

/// A smoothed attention/stress/curiosity triple at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTriple {
    pub attention: f64,
    pub stress: f64,
    pub curiosity: f64,
}

impl ScoreTriple {
    /// Flow state: focused and relaxed.
    pub fn in_flow(&self) -> bool {
        self.attention > 80.0 && self.stress < 40.0
    }
}

/// Raw attention before smoothing.
pub fn raw_attention(features: &FeatureVector) -> f64 {
    let penalty = features.yaw.abs().powf(POSE_PENALTY_EXPONENT)
        + (features.pitch - NEUTRAL_PITCH_DEG)
            .abs()
            .powf(POSE_PENALTY_EXPONENT);

    let mut attention = 100.0 - penalty;
    if features.ear < EYES_CLOSED_EAR {
        attention -= EYES_CLOSED_PENALTY;
    }
    bound(attention)
}

/// Raw stress before smoothing.
pub fn raw_stress(features: &FeatureVector) -> f64 {
    let blink = features.blink_rate;
    let blink_term = if blink > 30.0 {
        30.0
    } else if blink > 20.0 {
        15.0
    } else if blink < 5.0 {
        // Staring: very low blink rate goes with high load.
        10.0
    } else {
        0.0
    };

    let expressions = features.expression(expression::ANGRY) * 60.0
        + features.expression(expression::FEARFUL) * 70.0
        - features.expression(expression::NEUTRAL) * 10.0
        - features.expression(expression::HAPPY) * 30.0;

    bound(STRESS_BASE + blink_term + expressions)
}

/// Raw curiosity before smoothing.
///
/// `prior` is the previous tick's smoothed triple, if any.
pub fn raw_curiosity(features: &FeatureVector, prior: Option<&ScoreTriple>) -> f64 {
    let mut curiosity = CURIOSITY_BASE;
    if prior.is_some_and(ScoreTriple::in_flow) {
        curiosity += FLOW_BONUS;
    }
    if features.pitch > FORWARD_LEAN_PITCH.0 && features.pitch < FORWARD_LEAN_PITCH.1 {
        curiosity += FORWARD_LEAN_BONUS;
    }
    curiosity += features.expression(expression::SURPRISED) * 50.0
        + features.expression(expression::HAPPY) * 20.0;
    bound(curiosity)
}

/// Clamp into the score range. NaN passes through so the filter rejects it.
fn bound(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Per-subject cognitive scorer.
///
/// Owns three independent filters; call [`update`](Self::update) once per
/// sampling tick from a single owner.
#[derive(Debug, Clone)]
pub struct CognitiveScorer {
    attention: ScalarFilter,
    stress: ScalarFilter,
    curiosity: ScalarFilter,
    prior: Option<ScoreTriple>,
}

impl CognitiveScorer {
    /// Create a scorer with the given filter constants.
    pub fn new(config: ScoringConfig) -> Self {
        let filter = || ScalarFilter::new(config.process_noise, config.measurement_noise);
        Self {
            attention: filter(),
            stress: filter(),
            curiosity: filter(),
            prior: None,
        }
    }

    /// Create a scorer with default filter constants.
    pub fn with_defaults() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// Score one feature vector.
    ///
    /// A sample with any non-finite geometric field is rejected as a whole:
    /// the filters and the prior triple are left untouched and the held
    /// estimates are reported at the sample's timestamp.
    pub fn update(&mut self, features: &FeatureVector) -> ScoredPoint {
        if !features.is_finite() {
            tracing::debug!(t = features.timestamp_ms, "Rejected non-finite sample");
            let held = |filter: &ScalarFilter| filter.estimate().unwrap_or(0.0);
            return ScoredPoint::new(
                features.timestamp_ms,
                held(&self.attention),
                held(&self.stress),
                held(&self.curiosity),
            );
        }

        let attention = self.attention.filter(raw_attention(features));
        let stress = self.stress.filter(raw_stress(features));
        let curiosity = self
            .curiosity
            .filter(raw_curiosity(features, self.prior.as_ref()));

        let triple = ScoreTriple {
            attention,
            stress,
            curiosity,
        };
        tracing::trace!(t = features.timestamp_ms, ?triple, "Scored sample");
        self.prior = Some(triple);

        ScoredPoint::new(features.timestamp_ms, attention, stress, curiosity)
    }

    /// The last smoothed triple, `None` before the first update.
    pub fn prior(&self) -> Option<ScoreTriple> {
        self.prior
    }

    /// Drop all filter history, e.g. when a different subject takes the seat.
    pub fn reset(&mut self) {
        self.attention.reset();
        self.stress.reset();
        self.curiosity.reset();
        self.prior = None;
    }
}

impl Default for CognitiveScorer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        FeatureVector {
            ear: 0.25,
            ..FeatureVector::neutral(0)
        }
    }

    fn with_blink(rate: f64) -> FeatureVector {
        FeatureVector {
            blink_rate: rate,
            ..sample()
        }
    }

    #[test]
    fn test_neutral_pose_has_no_penalty() {
        assert_eq!(raw_attention(&sample()), 100.0);
    }

    #[test]
    fn test_pose_penalty_exponent() {
        let f = FeatureVector {
            yaw: 10.0,
            ..sample()
        };
        let expected = 100.0 - 10f64.powf(1.6);
        assert!((raw_attention(&f) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_closed_eyes_penalty() {
        let f = FeatureVector {
            ear: 0.15,
            ..sample()
        };
        assert_eq!(raw_attention(&f), 50.0);
    }

    #[test]
    fn test_extreme_pose_clamps_to_zero() {
        let f = FeatureVector {
            yaw: 60.0,
            pitch: -40.0,
            ..sample()
        };
        assert_eq!(raw_attention(&f), 0.0);
    }

    #[test]
    fn test_stress_blink_boundaries() {
        assert_eq!(raw_stress(&with_blink(31.0)), 60.0);
        assert_eq!(raw_stress(&with_blink(30.0)), 45.0);
        assert_eq!(raw_stress(&with_blink(21.0)), 45.0);
        assert_eq!(raw_stress(&with_blink(20.0)), 30.0);
        assert_eq!(raw_stress(&with_blink(5.0)), 30.0);
        assert_eq!(raw_stress(&with_blink(4.0)), 40.0);
    }

    #[test]
    fn test_stress_expression_weights() {
        let f = with_blink(10.0)
            .with_expression(expression::ANGRY, 0.5)
            .with_expression(expression::HAPPY, 0.5);
        assert!((raw_stress(&f) - (30.0 + 30.0 - 15.0)).abs() < 1e-9);

        let calm = with_blink(10.0)
            .with_expression(expression::HAPPY, 1.0)
            .with_expression(expression::NEUTRAL, 1.0);
        assert_eq!(raw_stress(&calm), 0.0);
    }

    #[test]
    fn test_curiosity_forward_lean_is_exclusive() {
        let lean = |pitch| FeatureVector {
            pitch,
            ..sample()
        };
        assert_eq!(raw_curiosity(&lean(-10.0), None), 65.0);
        assert_eq!(raw_curiosity(&lean(-5.0), None), 50.0);
        assert_eq!(raw_curiosity(&lean(-25.0), None), 50.0);
    }

    #[test]
    fn test_curiosity_flow_bonus_uses_prior() {
        let flow = ScoreTriple {
            attention: 90.0,
            stress: 20.0,
            curiosity: 50.0,
        };
        let tense = ScoreTriple {
            stress: 45.0,
            ..flow
        };
        assert_eq!(raw_curiosity(&sample(), Some(&flow)), 70.0);
        assert_eq!(raw_curiosity(&sample(), Some(&tense)), 50.0);
        assert_eq!(raw_curiosity(&sample(), None), 50.0);
    }

    #[test]
    fn test_flow_bonus_lags_one_tick() {
        let mut scorer = CognitiveScorer::with_defaults();
        let calm = sample().with_expression(expression::NEUTRAL, 1.0);

        // First tick: attention 100 / stress 20 but no prior yet.
        let first = scorer.update(&calm);
        assert_eq!(first.curiosity, 50.0);

        // Second tick sees the first tick's flow state.
        let second = scorer.update(&calm);
        assert!(second.curiosity > 50.0);
    }

    #[test]
    fn test_update_seeds_from_first_sample() {
        let mut scorer = CognitiveScorer::with_defaults();
        let point = scorer.update(&with_blink(31.0));
        assert_eq!(point.attention, 100.0);
        assert_eq!(point.stress, 60.0);
        assert_eq!(point.timestamp, 0);
    }

    #[test]
    fn test_non_finite_sample_holds_prior() {
        let mut scorer = CognitiveScorer::with_defaults();
        let first = scorer.update(&sample());
        let broken = FeatureVector {
            yaw: f64::NAN,
            timestamp_ms: 500,
            ..sample()
        };
        let held = scorer.update(&broken);
        assert_eq!(held.attention, first.attention);
        assert_eq!(held.timestamp, 500);
    }

    #[test]
    fn test_non_finite_field_leaves_every_filter_alone() {
        let mut scorer = CognitiveScorer::with_defaults();
        let fearful = sample().with_expression(expression::FEARFUL, 1.0);
        let first = scorer.update(&fearful);
        assert_eq!(first.stress, 100.0);
        let prior = scorer.prior();

        let no_blink = FeatureVector {
            blink_rate: f64::NAN,
            timestamp_ms: 500,
            ..fearful.clone()
        };
        let held = scorer.update(&no_blink);
        assert_eq!(held.stress, first.stress);
        assert_eq!(held.curiosity, first.curiosity);
        assert_eq!(scorer.prior(), prior);

        let no_pitch = FeatureVector {
            pitch: f64::NAN,
            timestamp_ms: 1_000,
            ..sample().with_expression(expression::SURPRISED, 1.0)
        };
        let held = scorer.update(&no_pitch);
        assert_eq!(held.curiosity, first.curiosity);
        assert_eq!(held.stress, first.stress);
        assert_eq!(held.attention, first.attention);
        assert_eq!(held.timestamp, 1_000);
        assert_eq!(scorer.prior(), prior);
    }

    #[test]
    fn test_non_finite_before_seeding_reports_zero() {
        let mut scorer = CognitiveScorer::with_defaults();
        let broken = FeatureVector {
            ear: f64::INFINITY,
            ..sample()
        };
        let point = scorer.update(&broken);
        assert_eq!((point.attention, point.stress, point.curiosity), (0.0, 0.0, 0.0));
        assert!(scorer.prior().is_none());
    }

    #[test]
    fn test_reset_clears_prior() {
        let mut scorer = CognitiveScorer::with_defaults();
        scorer.update(&sample());
        assert!(scorer.prior().is_some());
        scorer.reset();
        assert!(scorer.prior().is_none());
    }
}
