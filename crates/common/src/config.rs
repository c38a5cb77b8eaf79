//! Application configuration.
//!
//! Tuning constants for every estimator live here so a session can be
//! reproduced from a single JSON file. Missing sections or fields fall
//! back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AttentrackError, AttentrackResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cognitive scoring filter constants.
    pub scoring: ScoringConfig,

    /// Motion heatmap geometry and weights.
    pub heatmap: HeatmapConfig,

    /// Participant slot layout and smoothing.
    pub tracker: TrackerConfig,

    /// Alert thresholds.
    pub alerts: AlertsConfig,

    /// Tick rates for the two input streams.
    pub ticks: TickConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Kalman noise constants for the three cognitive filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub process_noise: f64,
    pub measurement_noise: f64,
}

/// Motion heatmap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Declared frame width in pixels.
    pub frame_width: u32,
    /// Declared frame height in pixels.
    pub frame_height: u32,
    pub grid_cols: usize,
    pub grid_rows: usize,
    /// Multiplicative decay applied to every cell each tick.
    pub decay: f64,
    /// Pixel subsampling stride along both axes.
    pub stride: usize,
    /// Minimum summed |ΔR|+|ΔG|+|ΔB| for a pixel to count as motion.
    pub noise_threshold: u32,
    pub motion_weight: f64,
    /// Increment used instead of `motion_weight` for skin-tone pixels.
    pub skin_weight: f64,
    /// Cells below this value are ignored by centroid queries.
    pub cell_noise_floor: f64,
    /// Minimum region energy for a centroid to be reported.
    pub min_centroid_energy: f64,
}

/// Participant tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub slot_cols: usize,
    pub slot_rows: usize,
    /// Scale applied to raw motion density to get activity in [0,100].
    pub activity_scale: f64,
    /// Smoothed activity needed (with audio) to count as speaking.
    pub speaking_activity_threshold: f64,
    /// Audio level above which the audio channel counts as active.
    pub audio_level_threshold: f64,
    /// Tracking box size in percent of the frame.
    pub box_width: f64,
    pub box_height: f64,
    pub blend: BlendWeights,
}

/// Exponential-moving-average weights given to the new target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub activity: f64,
    pub attention: f64,
    pub stress: f64,
    pub curiosity: f64,
    pub engagement: f64,
}

/// One hysteresis alert rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    pub high_threshold: f64,
    pub duration_ticks: u32,
    pub recovery_threshold: f64,
}

/// Alert rules for the monitored signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Raised when stress stays high.
    pub stress: AlertRuleConfig,
    /// Raised when attention stays low.
    pub attention: AlertRuleConfig,
}

/// Nominal tick rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub feature_hz: u32,
    pub frame_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "attentrack=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.1,
            measurement_noise: 5.0,
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            frame_width: 320,
            frame_height: 240,
            grid_cols: 32,
            grid_rows: 24,
            decay: 0.96,
            stride: 4,
            noise_threshold: 45,
            motion_weight: 2.0,
            skin_weight: 6.0,
            cell_noise_floor: 2.0,
            min_centroid_energy: 20.0,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            slot_cols: 2,
            slot_rows: 2,
            activity_scale: 400.0,
            speaking_activity_threshold: 5.0,
            audio_level_threshold: 0.1,
            box_width: 20.0,
            box_height: 30.0,
            blend: BlendWeights::default(),
        }
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            activity: 0.35,
            attention: 0.15,
            stress: 0.10,
            curiosity: 0.12,
            engagement: 0.20,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            stress: AlertRuleConfig {
                high_threshold: 85.0,
                duration_ticks: 4,
                recovery_threshold: 70.0,
            },
            attention: AlertRuleConfig {
                high_threshold: 30.0,
                duration_ticks: 6,
                recovery_threshold: 45.0,
            },
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            feature_hz: 2,
            frame_hz: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "Failed to load config");
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> AttentrackResult<Self> {
        if !path.exists() {
            return Err(AttentrackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> AttentrackResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> AttentrackResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations the estimators cannot run with.
    pub fn validate(&self) -> AttentrackResult<()> {
        let s = &self.scoring;
        if !(s.process_noise > 0.0 && s.measurement_noise > 0.0) {
            return Err(AttentrackError::config(
                "scoring noise constants must be positive",
            ));
        }

        let h = &self.heatmap;
        if h.grid_cols == 0 || h.grid_rows == 0 || h.stride == 0 {
            return Err(AttentrackError::config(
                "heatmap grid and stride must be non-zero",
            ));
        }
        if h.grid_cols as u32 > h.frame_width || h.grid_rows as u32 > h.frame_height {
            return Err(AttentrackError::config(
                "heatmap grid must not be finer than the frame",
            ));
        }
        if !(0.0..1.0).contains(&h.decay) {
            return Err(AttentrackError::config("heatmap decay must be in [0, 1)"));
        }

        let t = &self.tracker;
        if t.slot_cols == 0 || t.slot_rows == 0 {
            return Err(AttentrackError::config("tracker needs at least one slot"));
        }
        if t.slot_cols > h.grid_cols || t.slot_rows > h.grid_rows {
            return Err(AttentrackError::config(
                "tracker slots must map to at least one heatmap cell each",
            ));
        }
        if !(0.0..=100.0).contains(&t.box_width) || !(0.0..=100.0).contains(&t.box_height) {
            return Err(AttentrackError::config(
                "tracking box size must be within 0..=100 percent",
            ));
        }

        let a = &self.alerts;
        if a.stress.recovery_threshold >= a.stress.high_threshold {
            return Err(AttentrackError::config(
                "stress recovery threshold must be below its high threshold",
            ));
        }
        if a.attention.recovery_threshold <= a.attention.high_threshold {
            return Err(AttentrackError::config(
                "attention recovery threshold must be above its low threshold",
            ));
        }

        if self.ticks.feature_hz == 0 || self.ticks.frame_hz == 0 {
            return Err(AttentrackError::config("tick rates must be non-zero"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("attentrack").join("config.json")
}
