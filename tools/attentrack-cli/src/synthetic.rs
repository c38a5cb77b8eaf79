//! Synthetic scene generation for exercising the tracker without a camera.

use std::f64::consts::TAU;

use attentrack_signal_model::frame::FrameBuffer;

const BACKGROUND: [u8; 3] = [40, 40, 50];

/// A skin-toned block orbiting a fixed point.
#[derive(Debug, Clone, Copy)]
struct Actor {
    /// Orbit centre as a fraction of the frame.
    cx: f64,
    cy: f64,
    /// Orbit radius as a fraction of the frame width.
    amplitude: f64,
    period_ticks: f64,
    phase: f64,
    color: [u8; 3],
}

/// Four actors, one per quadrant, each moving at its own pace.
///
/// The bottom-right actor never moves so its slot should stay idle.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    width: u32,
    height: u32,
    actors: Vec<Actor>,
}

impl SyntheticScene {
    pub fn new(width: u32, height: u32) -> Self {
        let actor = |cx, cy, amplitude, period_ticks, phase, color| Actor {
            cx,
            cy,
            amplitude,
            period_ticks,
            phase,
            color,
        };
        Self {
            width: width.max(1),
            height: height.max(1),
            actors: vec![
                actor(0.25, 0.25, 0.08, 12.0, 0.0, [210, 150, 120]),
                actor(0.75, 0.25, 0.03, 30.0, 1.0, [190, 120, 90]),
                actor(0.25, 0.75, 0.12, 6.0, 2.0, [230, 170, 140]),
                actor(0.75, 0.75, 0.0, 1.0, 0.0, [200, 140, 110]),
            ],
        }
    }

    /// Render the scene at `tick`.
    pub fn frame(&self, tick: u64) -> FrameBuffer {
        let mut frame = FrameBuffer::filled(self.width, self.height, BACKGROUND);
        let size = (self.width.min(self.height) / 6).max(1);
        let (w, h) = (self.width as f64, self.height as f64);

        for actor in &self.actors {
            let angle = TAU * tick as f64 / actor.period_ticks + actor.phase;
            let x = actor.cx * w + actor.amplitude * w * angle.cos() - size as f64 / 2.0;
            let y = actor.cy * h + actor.amplitude * w * angle.sin() - size as f64 / 2.0;
            frame.fill_rect(x.max(0.0) as u32, y.max(0.0) as u32, size, size, actor.color);
        }
        frame
    }

    /// Audio level at `tick`: bursts of speech six ticks out of every sixteen.
    pub fn audio_level(&self, tick: u64) -> f64 {
        if tick % 16 < 6 {
            0.6
        } else {
            0.02
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dimensions() {
        let frame = SyntheticScene::new(320, 240).frame(0);
        assert_eq!((frame.width(), frame.height()), (320, 240));
        assert_eq!(frame.rgb(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn test_still_actor_does_not_change() {
        let scene = SyntheticScene::new(320, 240);
        let (a, b) = (scene.frame(3), scene.frame(4));
        assert_eq!(a.rgb(240, 180), b.rgb(240, 180));
        assert_ne!(a.rgb(240, 180), Some(BACKGROUND));
    }

    #[test]
    fn test_moving_actor_changes_pixels() {
        let scene = SyntheticScene::new(320, 240);
        let top_left = |f: &FrameBuffer| {
            (0..160)
                .flat_map(|x| (0..120).map(move |y| (x, y)))
                .filter_map(|(x, y)| f.rgb(x, y))
                .collect::<Vec<_>>()
        };
        assert_ne!(top_left(&scene.frame(0)), top_left(&scene.frame(1)));
    }

    #[test]
    fn test_audio_bursts() {
        let scene = SyntheticScene::new(320, 240);
        assert!(scene.audio_level(0) > 0.1);
        assert!(scene.audio_level(10) < 0.1);
        assert!(scene.audio_level(16) > 0.1);
    }
}
