//! Score a JSONL feature file.

use std::io::Write;
use std::path::PathBuf;

use attentrack_common::clock::RateController;
use attentrack_common::config::AppConfig;
use attentrack_processing_core::blink::BlinkRateTracker;
use attentrack_processing_core::monitor::SubjectMonitor;
use attentrack_signal_model::alert::AlertEvent;
use attentrack_signal_model::sample::{parse_samples, FeatureVector};

use super::{open_output, write_record};

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    alerts: Option<PathBuf>,
    hz: Option<u32>,
    blink_from_ear: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let samples = parse_samples(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", input.display()))?;
    tracing::info!(path = %input.display(), samples = samples.len(), "Loaded feature samples");

    let samples = prepare(samples, hz, blink_from_ear);
    let mut monitor = SubjectMonitor::new(config.scoring, &config.alerts)
        .map_err(|e| anyhow::anyhow!("Invalid alert configuration: {e}"))?;

    let mut out = open_output(output.as_deref())?;
    let mut events: Vec<AlertEvent> = Vec::new();
    for sample in &samples {
        let update = monitor.observe(sample);
        write_record(out.as_mut(), &update.point)?;
        events.extend(update.alerts);
    }
    out.flush()?;

    if let Some(path) = &alerts {
        let mut alert_out = open_output(Some(path))?;
        for event in &events {
            write_record(alert_out.as_mut(), event)?;
        }
        alert_out.flush()?;
    }

    tracing::info!(
        scored = samples.len(),
        alerts = events.len(),
        active = ?monitor.active_alerts(),
        "Scoring complete"
    );
    if let Some(path) = &output {
        println!("Scored {} samples to {}", samples.len(), path.display());
        println!("  Alert events: {}", events.len());
    }

    Ok(())
}

/// Apply optional rate decimation and blink-rate reconstruction.
fn prepare(samples: Vec<FeatureVector>, hz: Option<u32>, blink_from_ear: bool) -> Vec<FeatureVector> {
    let mut rate = hz.map(RateController::new);
    let mut blinks = BlinkRateTracker::new();

    let kept: Vec<FeatureVector> = samples
        .into_iter()
        .filter_map(|mut sample| {
            if blink_from_ear {
                let (blink_rate, _) = blinks.observe(sample.ear, sample.timestamp_ms);
                sample.blink_rate = blink_rate;
            }
            let due = rate
                .as_mut()
                .map_or(true, |r| r.should_tick(sample.timestamp_ms.saturating_mul(1_000_000)));
            due.then_some(sample)
        })
        .collect();

    if let Some(rate) = &rate {
        tracing::debug!(kept = kept.len(), skipped = rate.skipped_ticks(), "Decimated input");
    }
    kept
}
