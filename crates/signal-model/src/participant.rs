//! Participant slot state and tracking boxes.
//!
//! All box coordinates are percentages of the frame: `(0, 0)` is top-left,
//! `(100, 100)` is bottom-right.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed-size tracking box in percentage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingBox {
    /// Left edge (percent).
    pub x: f64,
    /// Top edge (percent).
    pub y: f64,
    /// Width (percent).
    pub w: f64,
    /// Height (percent).
    pub h: f64,
}

impl TrackingBox {
    /// Create a box, clamping it so it lies fully inside the frame.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }.clamped()
    }

    /// Create a box of the given size centred at `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Clamp size to `[0, 100]` and position to `[0, 100 - w] x [0, 100 - h]`.
    ///
    /// Non-finite coordinates collapse to the origin.
    pub fn clamped(self) -> Self {
        let w = finite_or(self.w, 0.0).clamp(0.0, 100.0);
        let h = finite_or(self.h, 0.0).clamp(0.0, 100.0);
        Self {
            x: finite_or(self.x, 0.0).clamp(0.0, 100.0 - w),
            y: finite_or(self.y, 0.0).clamp(0.0, 100.0 - h),
            w,
            h,
        }
    }

    /// The centre point of this box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Blend position toward `target`, keeping this box's size.
    ///
    /// `weight` is the share given to the target.
    pub fn blend_toward(&self, target: &TrackingBox, weight: f64) -> TrackingBox {
        let t = weight.clamp(0.0, 1.0);
        TrackingBox::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.w,
            self.h,
        )
    }

    /// Whether the box lies fully inside the frame.
    pub fn is_contained(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x <= 100.0 - self.w && self.y <= 100.0 - self.h
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Body-language tag inferred for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyLanguage {
    #[serde(rename = "Gesturing")]
    Gesturing,
    #[serde(rename = "Fidgeting")]
    Fidgeting,
    #[serde(rename = "Arms Crossed")]
    ArmsCrossed,
    #[serde(rename = "Leaning In")]
    LeaningIn,
    #[serde(rename = "Nodding")]
    Nodding,
    #[serde(rename = "Slouching")]
    Slouching,
    #[serde(rename = "Listening")]
    Listening,
}

impl BodyLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gesturing => "Gesturing",
            Self::Fidgeting => "Fidgeting",
            Self::ArmsCrossed => "Arms Crossed",
            Self::LeaningIn => "Leaning In",
            Self::Nodding => "Nodding",
            Self::Slouching => "Slouching",
            Self::Listening => "Listening",
        }
    }
}

impl fmt::Display for BodyLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-slot participant state, updated once per tracker tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub slot: usize,
    pub activity: f64,
    pub attention: f64,
    pub stress: f64,
    pub curiosity: f64,
    pub engagement: f64,
    pub speaking: bool,
    pub body_language: BodyLanguage,
    #[serde(rename = "box")]
    pub tracking_box: TrackingBox,
}

impl ParticipantState {
    /// Initial state for a slot: calm, idle and parked on its default box.
    pub fn idle(slot: usize, tracking_box: TrackingBox) -> Self {
        Self {
            slot,
            activity: 0.0,
            attention: 50.0,
            stress: 30.0,
            curiosity: 50.0,
            engagement: 50.0,
            speaking: false,
            body_language: BodyLanguage::Listening,
            tracking_box,
        }
    }
}
