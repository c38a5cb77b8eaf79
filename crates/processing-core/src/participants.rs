//! Per-slot participant tracking.
//!
//! The frame is split into a fixed grid of participant slots (2×2 by
//! default). Every tick each slot reads its region of the
//! [`MotionHeatmap`], derives activity and cognitive targets, smooths them
//! with per-signal EMA weights, classifies body language and moves its
//! tracking box toward the region's motion centroid.
//!
//! Taking `&MotionHeatmap` in [`ParticipantTracker::tick`] means the
//! heatmap's `&mut` ingest for the tick must already have finished.

use attentrack_common::config::TrackerConfig;
use attentrack_signal_model::participant::{ParticipantState, TrackingBox};
use attentrack_signal_model::score::clamp_score;

use crate::body_language::{classify, BodySignals};
use crate::heatmap::{CellMapper, GridRegion, MotionHeatmap};

const SPEAKING_ATTENTION: f64 = 95.0;
const SPEAKING_ENGAGEMENT: f64 = 98.0;

/// Share of the gap to the default box the target closes per idle tick.
const DEFAULT_DRIFT: f64 = 0.02;
/// Share of the gap to the target the displayed box closes per tick.
const FOLLOW_CENTROID: f64 = 0.4;
const FOLLOW_DEFAULT: f64 = 0.2;

/// Convert a scalar audio level into the speaking-capable flag.
pub fn audio_active_from_level(level: f64, threshold: f64) -> bool {
    level.is_finite() && level > threshold
}

/// Stress target derived from body activity.
pub fn stress_target(activity: f64, speaking: bool) -> f64 {
    let mut stress = 30.0;
    if activity > 60.0 {
        stress += 30.0;
    } else if activity > 35.0 {
        stress += 15.0;
    } else if activity < 3.0 {
        // Frozen still reads as tension.
        stress += 10.0;
    }
    if speaking {
        stress += 5.0;
    }
    clamp_score(stress)
}

/// Curiosity target; `prior_attention`/`prior_stress` are last tick's values.
pub fn curiosity_target(
    activity: f64,
    speaking: bool,
    prior_attention: f64,
    prior_stress: f64,
) -> f64 {
    let mut curiosity = 50.0;
    if prior_attention > 80.0 && prior_stress < 40.0 {
        curiosity += 20.0;
    }
    if activity > 15.0 && activity < 40.0 {
        curiosity += 15.0;
    }
    if speaking {
        curiosity += 10.0;
    }
    clamp_score(curiosity)
}

/// Weighted engagement before smoothing.
pub fn engagement_target(attention: f64, curiosity: f64, activity: f64, speaking: bool) -> f64 {
    if speaking {
        return SPEAKING_ENGAGEMENT;
    }
    clamp_score(attention * 0.45 + curiosity * 0.35 + (activity * 2.0).min(100.0) * 0.20)
}

fn ema(previous: f64, target: f64, weight: f64) -> f64 {
    clamp_score(previous + (target - previous) * weight.clamp(0.0, 1.0))
}

#[derive(Debug, Clone)]
struct SlotTrack {
    default_box: TrackingBox,
    target: TrackingBox,
    state: ParticipantState,
}

/// Tracker owning every participant slot.
#[derive(Debug, Clone)]
pub struct ParticipantTracker {
    config: TrackerConfig,
    slots: Vec<SlotTrack>,
}

impl ParticipantTracker {
    /// Create a tracker with all slots parked on their default boxes.
    pub fn new(config: TrackerConfig) -> Self {
        let slot_cols = config.slot_cols.max(1);
        let slot_rows = config.slot_rows.max(1);
        let slots = (0..slot_cols * slot_rows)
            .map(|index| {
                let (col, row) = (index % slot_cols, index / slot_cols);
                let cx = (col as f64 + 0.5) / slot_cols as f64 * 100.0;
                let cy = (row as f64 + 0.5) / slot_rows as f64 * 100.0;
                let default_box =
                    TrackingBox::centered(cx, cy, config.box_width, config.box_height);
                SlotTrack {
                    default_box,
                    target: default_box,
                    state: ParticipantState::idle(index, default_box),
                }
            })
            .collect();

        Self { config, slots }
    }

    /// Create a tracker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TrackerConfig::default())
    }

    /// Advance every slot by one tick.
    pub fn tick(&mut self, heatmap: &MotionHeatmap, audio_active: bool) -> Vec<ParticipantState> {
        let mapper = *heatmap.mapper();
        for index in 0..self.slots.len() {
            let region = self.slot_region(index, &mapper);
            self.update_slot(index, region, heatmap, &mapper, audio_active);
        }
        self.states()
    }

    /// Advance using a scalar audio level instead of a flag.
    pub fn tick_with_level(
        &mut self,
        heatmap: &MotionHeatmap,
        audio_level: f64,
    ) -> Vec<ParticipantState> {
        let active = audio_active_from_level(audio_level, self.config.audio_level_threshold);
        self.tick(heatmap, active)
    }

    fn update_slot(
        &mut self,
        index: usize,
        region: GridRegion,
        heatmap: &MotionHeatmap,
        mapper: &CellMapper,
        audio_active: bool,
    ) {
        let config = self.config;
        let blend = config.blend;
        let slot = &mut self.slots[index];
        let prev = slot.state.clone();

        let motion = heatmap.region_motion(region);
        let activity_now = (motion.density() * config.activity_scale).min(100.0);
        let activity = ema(prev.activity, activity_now, blend.activity);
        let speaking = audio_active && activity > config.speaking_activity_threshold;

        let attention_goal = if speaking {
            SPEAKING_ATTENTION
        } else {
            100.0 - activity
        };
        let attention = ema(prev.attention, attention_goal, blend.attention);
        let stress = ema(prev.stress, stress_target(activity, speaking), blend.stress);
        let curiosity = ema(
            prev.curiosity,
            curiosity_target(activity, speaking, prev.attention, prev.stress),
            blend.curiosity,
        );
        let engagement = ema(
            prev.engagement,
            engagement_target(attention, curiosity, activity, speaking),
            blend.engagement,
        );

        let body_language = classify(&BodySignals {
            speaking,
            activity,
            attention,
            stress,
            curiosity,
        });
        if body_language != prev.body_language {
            tracing::debug!(
                slot = index,
                from = %prev.body_language,
                to = %body_language,
                "Body language changed"
            );
        }

        let follow = match heatmap.centroid_of(region) {
            Some(centroid) => {
                let (cx, cy) = mapper.grid_to_percent(centroid.x, centroid.y);
                slot.target = TrackingBox::centered(cx, cy, config.box_width, config.box_height);
                FOLLOW_CENTROID
            }
            None => {
                slot.target = slot.target.blend_toward(&slot.default_box, DEFAULT_DRIFT);
                FOLLOW_DEFAULT
            }
        };
        let tracking_box = prev.tracking_box.blend_toward(&slot.target, follow);

        slot.state = ParticipantState {
            slot: index,
            activity,
            attention,
            stress,
            curiosity,
            engagement,
            speaking,
            body_language,
            tracking_box,
        };
    }

    /// Heatmap cells covered by slot `index`.
    pub fn slot_region(&self, index: usize, mapper: &CellMapper) -> GridRegion {
        let slot_cols = self.config.slot_cols.max(1);
        let slot_rows = self.config.slot_rows.max(1);
        let (col, row) = (index % slot_cols, index / slot_cols);

        let col_start = col * mapper.cols() / slot_cols;
        let col_end = (col + 1) * mapper.cols() / slot_cols;
        let row_start = row * mapper.rows() / slot_rows;
        let row_end = (row + 1) * mapper.rows() / slot_rows;
        GridRegion::new(
            col_start,
            row_start,
            col_end - col_start,
            row_end - row_start,
        )
    }

    /// Snapshot of every slot's current state.
    pub fn states(&self) -> Vec<ParticipantState> {
        self.slots.iter().map(|s| s.state.clone()).collect()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Default (resting) box for slot `index`.
    pub fn default_box(&self, index: usize) -> Option<TrackingBox> {
        self.slots.get(index).map(|s| s.default_box)
    }

    /// Return every slot to its idle state.
    pub fn reset(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.target = slot.default_box;
            slot.state = ParticipantState::idle(index, slot.default_box);
        }
    }
}

#[cfg(test)]
mod tests {
    use attentrack_common::config::HeatmapConfig;
    use attentrack_signal_model::frame::FrameBuffer;
    use attentrack_signal_model::participant::BodyLanguage;

    use super::*;

    const SKIN: [u8; 3] = [200, 140, 110];
    const WALL: [u8; 3] = [20, 20, 30];

    fn frame_with_blob(x: u32, y: u32) -> FrameBuffer {
        let mut frame = FrameBuffer::filled(320, 240, WALL);
        frame.fill_rect(x, y, 60, 60, SKIN);
        frame
    }

    /// Alternate the blob between two nearby positions in the top-left slot.
    fn drive(
        tracker: &mut ParticipantTracker,
        heatmap: &mut MotionHeatmap,
        ticks: usize,
        audio: bool,
    ) -> Vec<ParticipantState> {
        let mut prev = FrameBuffer::filled(320, 240, WALL);
        let mut states = vec![];
        for i in 0..ticks {
            let cur = frame_with_blob(40 + (i as u32 % 2) * 10, 40);
            heatmap.ingest(&cur, Some(&prev));
            states = tracker.tick(heatmap, audio);
            prev = cur;
        }
        states
    }

    #[test]
    fn test_slot_regions_partition_grid() {
        let tracker = ParticipantTracker::with_defaults();
        let mapper = CellMapper::new(320, 240, 32, 24);
        assert_eq!(tracker.slot_region(0, &mapper), GridRegion::new(0, 0, 16, 12));
        assert_eq!(tracker.slot_region(3, &mapper), GridRegion::new(16, 12, 16, 12));
    }

    #[test]
    fn test_default_boxes_centered_in_slots() {
        let tracker = ParticipantTracker::with_defaults();
        assert_eq!(tracker.slot_count(), 4);
        let b = tracker.default_box(1).unwrap();
        assert_eq!(b.center(), (75.0, 25.0));
    }

    #[test]
    fn test_quiet_scene_keeps_defaults() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let frame = FrameBuffer::filled(320, 240, WALL);
        let mut states = vec![];
        for _ in 0..10 {
            heatmap.ingest(&frame, Some(&frame));
            states = tracker.tick(&heatmap, true);
        }

        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.activity, 0.0);
            assert!(!state.speaking);
            assert_eq!(state.body_language, BodyLanguage::Listening);
            assert_eq!(state.tracking_box, tracker.default_box(i).unwrap());
        }
    }

    #[test]
    fn test_motion_raises_activity_in_its_slot_only() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let states = drive(&mut tracker, &mut heatmap, 6, false);

        assert!(states[0].activity > 5.0);
        assert_eq!(states[1].activity, 0.0);
        assert_eq!(states[2].activity, 0.0);
        assert_eq!(states[3].activity, 0.0);
    }

    #[test]
    fn test_speaking_needs_audio_and_motion() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let states = drive(&mut tracker, &mut heatmap, 6, true);

        assert!(states[0].speaking);
        assert_eq!(states[0].body_language, BodyLanguage::Gesturing);
        assert!(!states[1].speaking);
    }

    #[test]
    fn test_engagement_rises_while_speaking() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let states = drive(&mut tracker, &mut heatmap, 30, true);
        assert!(states[0].engagement > 90.0);
        assert!(states[0].attention > 90.0);
    }

    #[test]
    fn test_box_moves_toward_motion() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let start = tracker.default_box(0).unwrap().center();
        let states = drive(&mut tracker, &mut heatmap, 12, false);

        // Blob centre sits near (75px, 70px) → roughly (23%, 29%).
        let (cx, cy) = states[0].tracking_box.center();
        assert!(cx < start.0, "box should move left: {cx} vs {}", start.0);
        assert!(cy > start.1, "box should move down: {cy} vs {}", start.1);
        assert!(states[0].tracking_box.is_contained());
    }

    #[test]
    fn test_box_drifts_home_after_motion_stops() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        let moved = drive(&mut tracker, &mut heatmap, 12, false)[0].tracking_box;
        let home = tracker.default_box(0).unwrap();

        let still = FrameBuffer::filled(320, 240, WALL);
        let mut states = vec![];
        for _ in 0..400 {
            heatmap.ingest(&still, Some(&still));
            states = tracker.tick(&heatmap, false);
        }
        let settled = states[0].tracking_box;
        assert!((settled.x - home.x).abs() < (moved.x - home.x).abs());
        assert!((settled.x - home.x).abs() < 0.5);
        assert!((settled.y - home.y).abs() < 0.5);
    }

    #[test]
    fn test_audio_level_conversion() {
        assert!(audio_active_from_level(0.5, 0.1));
        assert!(!audio_active_from_level(0.05, 0.1));
        assert!(!audio_active_from_level(f64::NAN, 0.1));
    }

    #[test]
    fn test_targets() {
        assert_eq!(stress_target(70.0, false), 60.0);
        assert_eq!(stress_target(40.0, true), 50.0);
        assert_eq!(stress_target(1.0, false), 40.0);
        assert_eq!(curiosity_target(20.0, false, 90.0, 20.0), 85.0);
        assert_eq!(engagement_target(10.0, 10.0, 10.0, true), 98.0);
        assert!((engagement_target(100.0, 100.0, 60.0, false) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_idle() {
        let mut tracker = ParticipantTracker::with_defaults();
        let mut heatmap = MotionHeatmap::new(HeatmapConfig::default());
        drive(&mut tracker, &mut heatmap, 6, true);
        tracker.reset();
        assert!(tracker
            .states()
            .iter()
            .all(|s| s.body_language == BodyLanguage::Listening));
        assert_eq!(tracker.states()[0].activity, 0.0);
    }
}
