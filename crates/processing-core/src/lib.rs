//! Attentrack Processing Core: the estimation engine
//!
//! Turns noisy per-frame measurements into stable scores and tracking state:
//! - **Scoring:** Kalman-smoothed attention/stress/curiosity per subject
//! - **Motion heatmap:** decaying frame-difference accumulator
//! - **Participant tracking:** per-slot activity, engagement, body language
//!   and centroid-following tracking boxes
//! - **Alerting:** hysteresis-debounced raised/recovered events
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod alerts;
pub mod blink;
pub mod body_language;
pub mod cognitive;
pub mod heatmap;
pub mod monitor;
pub mod participants;
pub mod scalar_filter;
pub mod scheduler;

pub use alerts::{AlertHysteresis, AlertRule, BreachDirection};
pub use cognitive::CognitiveScorer;
pub use heatmap::MotionHeatmap;
pub use monitor::SubjectMonitor;
pub use participants::ParticipantTracker;
pub use scalar_filter::ScalarFilter;
pub use scheduler::TickGate;
