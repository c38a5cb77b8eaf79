//! Drive the heatmap and participant tracker at a fixed tick rate.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use attentrack_common::clock::SessionClock;
use attentrack_common::config::AppConfig;
use attentrack_processing_core::heatmap::MotionHeatmap;
use attentrack_processing_core::participants::ParticipantTracker;
use attentrack_processing_core::scheduler::TickGate;
use attentrack_signal_model::frame::FrameBuffer;
use attentrack_signal_model::participant::ParticipantState;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{open_output, write_record};
use crate::synthetic::SyntheticScene;

/// One output line.
#[derive(Debug, Serialize)]
struct TrackRecord {
    tick: u64,
    timestamp: u64,
    participants: Vec<ParticipantState>,
}

/// Everything one tick mutates.
struct TrackerLoop {
    scene: SyntheticScene,
    heatmap: MotionHeatmap,
    tracker: ParticipantTracker,
    previous: Option<FrameBuffer>,
    tick: u64,
}

impl TrackerLoop {
    fn step(&mut self, clock: &SessionClock) -> TrackRecord {
        let tick = self.tick;
        let frame = self.scene.frame(tick);
        self.heatmap.ingest(&frame, self.previous.as_ref());
        let participants = self
            .tracker
            .tick_with_level(&self.heatmap, self.scene.audio_level(tick));
        self.previous = Some(frame);
        self.tick += 1;

        TrackRecord {
            tick,
            timestamp: clock.elapsed_ms(),
            participants,
        }
    }
}

pub async fn run(
    config: &AppConfig,
    ticks: u64,
    hz: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    config.heatmap.frame_width = width.unwrap_or(config.heatmap.frame_width);
    config.heatmap.frame_height = height.unwrap_or(config.heatmap.frame_height);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid frame size: {e}"))?;
    let heatmap_config = config.heatmap;
    let hz = hz.unwrap_or(config.ticks.frame_hz).max(1);

    let state = Arc::new(Mutex::new(TrackerLoop {
        scene: SyntheticScene::new(heatmap_config.frame_width, heatmap_config.frame_height),
        heatmap: MotionHeatmap::new(heatmap_config),
        tracker: ParticipantTracker::new(config.tracker),
        previous: None,
        tick: 0,
    }));
    let clock = Arc::new(SessionClock::start());
    let gate = TickGate::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<TrackRecord>();

    tracing::info!(
        ticks,
        hz,
        width = heatmap_config.frame_width,
        height = heatmap_config.frame_height,
        started = clock.epoch_wall(),
        "Starting tracker loop"
    );

    let mut out = open_output(output.as_deref())?;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / hz as f64));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The gate admits one tick at a time, so at most one worker is pending.
    let mut in_flight: Option<JoinHandle<anyhow::Result<()>>> = None;
    for _ in 0..ticks {
        interval.tick().await;
        while let Ok(record) = rx.try_recv() {
            write_record(out.as_mut(), &record)?;
        }

        let Some(permit) = gate.try_enter() else {
            continue;
        };
        if let Some(previous) = in_flight.take() {
            previous.await??;
        }
        let state = Arc::clone(&state);
        let clock = Arc::clone(&clock);
        let tx = tx.clone();
        in_flight = Some(tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let _permit = permit;
            let record = state
                .lock()
                .map_err(|_| anyhow::anyhow!("tracker state poisoned"))?
                .step(&clock);
            tx.send(record)
                .map_err(|_| anyhow::anyhow!("output channel closed"))?;
            Ok(())
        }));
    }
    drop(tx);

    if let Some(last) = in_flight {
        last.await??;
    }
    while let Some(record) = rx.recv().await {
        write_record(out.as_mut(), &record)?;
    }
    out.flush()?;

    if gate.dropped() > 0 {
        tracing::warn!(dropped = gate.dropped(), "Ticks dropped while the previous tick ran");
    }
    tracing::info!(
        admitted = gate.admitted(),
        dropped = gate.dropped(),
        elapsed_ms = clock.elapsed_ms(),
        "Tracker loop finished"
    );
    if let Some(path) = &output {
        println!("Tracked {} ticks to {}", gate.admitted(), path.display());
    }

    Ok(())
}
