//! Per-frame march budget derived from enabled features and measured frame rate

use crate::scene::SimulationParams;
use std::time::Duration;

pub const STEP_RANGE: (f32, f32) = (0.15, 0.8);
pub const FAR_DISTANCE: f32 = 100.0;

const LENSING_MAX_STEPS: u32 = 220;
const FLAT_MAX_STEPS: u32 = 120;

/// March parameters for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityParams {
    pub step_size: f32,
    pub max_steps: u32,
    /// Escape radius; rays beyond it see the sky
    pub far_distance: f32,
    /// Deflection is only applied inside this radius; 0 disables it
    pub lens_max_radius: f32,
}

impl QualityParams {
    pub fn derive(params: &SimulationParams, fps: Option<f32>) -> Self {
        let features = params.features;

        let mut step: f32 = if features.lensing { 0.25 } else { 0.45 };
        // Cheaper scenes afford finer steps
        if !features.disk {
            step *= 1.15;
        }
        if !features.planets {
            step *= 1.15;
        }

        match fps {
            Some(fps) if fps > 0.0 && fps < 30.0 => step *= 1.2,
            Some(fps) if fps > 55.0 => step *= 0.9,
            _ => {}
        }

        let lens_max_radius = if features.lensing {
            2.0 * params.disk_outer_radius() + 6.0
        } else {
            0.0
        };

        Self {
            step_size: step.clamp(STEP_RANGE.0, STEP_RANGE.1),
            max_steps: if features.lensing {
                LENSING_MAX_STEPS
            } else {
                FLAT_MAX_STEPS
            },
            far_distance: FAR_DISTANCE,
            lens_max_radius,
        }
    }
}

/// Frame-rate estimate refreshed once per second of accumulated frame time
#[derive(Debug, Clone, Default)]
pub struct FrameRateMeter {
    frames: u32,
    elapsed: Duration,
    estimate: Option<f32>,
}

impl FrameRateMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished frame that took `frame_time`.
    ///
    /// Returns the new estimate when a measurement window closes.
    pub fn record_frame(&mut self, frame_time: Duration) -> Option<f32> {
        self.frames += 1;
        self.elapsed += frame_time;

        if self.elapsed < Self::WINDOW {
            return None;
        }

        let fps = self.frames as f32 / self.elapsed.as_secs_f32();
        self.frames = 0;
        self.elapsed = Duration::ZERO;
        self.estimate = Some(fps);
        tracing::debug!(fps, "frame rate window closed");
        self.estimate
    }

    /// Latest estimate, `None` until the first window has closed
    pub fn fps(&self) -> Option<f32> {
        self.estimate
    }
}
