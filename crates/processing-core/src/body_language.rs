//! Body-language classification.
//!
//! An ordered rule table: rules are evaluated top to bottom and the first
//! matching predicate wins. Falls through to [`BodyLanguage::Listening`].

use attentrack_signal_model::participant::BodyLanguage;

/// Signals the classifier looks at, all in `[0, 100]` except `speaking`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySignals {
    pub speaking: bool,
    pub activity: f64,
    pub attention: f64,
    pub stress: f64,
    pub curiosity: f64,
}

/// A tag and the predicate that selects it.
pub type Rule = (BodyLanguage, fn(&BodySignals) -> bool);

/// Priority-ordered rules.
pub const BODY_LANGUAGE_RULES: &[Rule] = &[
    (BodyLanguage::Gesturing, |s: &BodySignals| s.speaking),
    (BodyLanguage::Fidgeting, |s: &BodySignals| s.stress > 75.0 && s.activity > 30.0),
    (BodyLanguage::ArmsCrossed, |s: &BodySignals| s.stress > 75.0 && s.activity < 10.0),
    (BodyLanguage::LeaningIn, |s: &BodySignals| s.attention > 80.0 && s.curiosity > 70.0),
    (BodyLanguage::Nodding, |s: &BodySignals| {
        s.activity > 15.0 && s.activity < 40.0 && s.attention > 60.0
    }),
    (BodyLanguage::Slouching, |s: &BodySignals| {
        s.attention < 40.0 && s.stress < 50.0 && s.activity < 10.0
    }),
];

/// Classify a participant's body language.
pub fn classify(signals: &BodySignals) -> BodyLanguage {
    BODY_LANGUAGE_RULES
        .iter()
        .find(|(_, matches)| matches(signals))
        .map(|(tag, _)| *tag)
        .unwrap_or(BodyLanguage::Listening)
}
