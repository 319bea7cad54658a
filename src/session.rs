//! Mutable simulation state between frames
//!
//! The session is the single owner of everything that changes across frames:
//! parameters, camera, clock and frame-rate estimate. Rendering only ever sees
//! the immutable [`Frame`] snapshot it produces.

use crate::config::{AppConfig, ControlsConfig};
use crate::marcher::Frame;
use crate::quality::FrameRateMeter;
use crate::scene::{OrbitCamera, SimulationParams};
use crate::terminal::Action;
use std::time::Duration;

/// Whether the frame driver should keep going after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    params: SimulationParams,
    camera: OrbitCamera,
    controls: ControlsConfig,
    time_scale: f32,
    time: f32,
    meter: FrameRateMeter,
    paused: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl Session {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            params: config.simulation.params(),
            camera: config.camera.camera(),
            controls: config.controls.clone(),
            time_scale: config.render.time_scale,
            time: 0.0,
            meter: FrameRateMeter::new(),
            paused: false,
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn fps(&self) -> Option<f32> {
        self.meter.fps()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Apply one input action
    pub fn apply(&mut self, action: Action) -> Flow {
        let c = &self.controls;
        match action {
            Action::Quit => return Flow::Quit,
            Action::None => return Flow::Continue,
            Action::ToggleStarfield => self.params.toggle_starfield(),
            Action::TogglePlanets => self.params.toggle_planets(),
            Action::ToggleDisk => self.params.toggle_disk(),
            Action::ToggleLensing => self.params.toggle_lensing(),
            Action::MassUp => self.params.adjust_mass(c.mass_step),
            Action::MassDown => self.params.adjust_mass(-c.mass_step),
            Action::DiskGrow => self.params.adjust_disk_size(c.disk_step),
            Action::DiskShrink => self.params.adjust_disk_size(-c.disk_step),
            Action::OrbitLeft => self.camera.rotate(-c.orbit_step, 0.0),
            Action::OrbitRight => self.camera.rotate(c.orbit_step, 0.0),
            Action::OrbitUp => self.camera.rotate(0.0, -c.orbit_step),
            Action::OrbitDown => self.camera.rotate(0.0, c.orbit_step),
            Action::ZoomIn => self.camera.zoom(-c.zoom_step),
            Action::ZoomOut => self.camera.zoom(c.zoom_step),
            Action::Reset => {
                self.params.reset();
                self.camera.reset();
            }
            Action::Pause => {
                self.paused = !self.paused;
                tracing::debug!(paused = self.paused, "pause toggled");
                return Flow::Continue;
            }
        }

        tracing::debug!(
            ?action,
            mass = self.params.mass(),
            disk_outer = self.params.disk_outer_radius(),
            features = %self.params.features.summary(),
            "parameters updated"
        );
        Flow::Continue
    }

    /// Move the simulation clock forward by `dt` of wall clock, scaled by the
    /// configured time scale. Does nothing while paused.
    pub fn advance(&mut self, dt: Duration) {
        if !self.paused {
            self.time += dt.as_secs_f32() * self.time_scale;
        }
    }

    /// Feed the frame-rate meter with how long producing a frame actually took.
    ///
    /// Pacing sleeps must not be included, otherwise the frame interval caps
    /// the estimate.
    pub fn record_frame_time(&mut self, render_time: Duration) {
        self.meter.record_frame(render_time);
    }

    /// Immutable snapshot for the next render
    pub fn frame(&self) -> Frame {
        Frame::new(self.params, &self.camera, self.time, self.meter.fps())
    }

    /// One-line status summary for the terminal
    pub fn status_line(&self) -> String {
        let fps = self
            .fps()
            .map(|f| format!("{:.1}", f))
            .unwrap_or_else(|| "--".to_string());
        format!(
            "FPS: {} | Mass: {:.2} | Disk: {:.1} | Features: {} | [1-4] Toggle  [+/-] Mass  [[/]] Disk  [←→↑↓] Orbit  [w/s] Zoom  [R]eset  [SPACE] Pause  [Q]uit",
            fps,
            self.params.mass(),
            self.params.disk_outer_radius(),
            self.params.features.summary(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FeatureFlags;

    #[test]
    fn test_actions_mutate_params() {
        let mut session = Session::default();
        session.apply(Action::MassUp);
        assert!((session.params().mass() - 1.1).abs() < 1e-6);
        assert_eq!(session.params().schwarzschild_radius(), session.params().mass());
        session.apply(Action::DiskShrink);
        assert_eq!(session.params().disk_outer_radius(), 7.5);
        session.apply(Action::ToggleLensing);
        assert!(!session.params().features.lensing);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = Session::default();
        session.apply(Action::ToggleDisk);
        session.apply(Action::ZoomOut);
        session.apply(Action::MassDown);
        session.apply(Action::Reset);
        assert_eq!(*session.params(), SimulationParams::default());
        assert_eq!(*session.camera(), OrbitCamera::default());
    }

    #[test]
    fn test_quit_flow() {
        let mut session = Session::default();
        assert_eq!(session.apply(Action::Quit), Flow::Quit);
        assert_eq!(session.apply(Action::None), Flow::Continue);
    }

    #[test]
    fn test_reset_ignores_configured_start() {
        let mut config = AppConfig::default();
        config.simulation.mass = 3.0;
        config.simulation.disk_outer_radius = 20.0;
        config.simulation.features.lensing = false;
        config.camera.radius = 30.0;

        let mut session = Session::from_config(&config);
        assert_eq!(session.params().mass(), 3.0);
        session.apply(Action::Reset);

        assert_eq!(*session.params(), SimulationParams::default());
        assert_eq!(session.params().features.summary(), "SPDL");
        assert_eq!(*session.camera(), OrbitCamera::default());
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut session = Session::default();
        session.advance(Duration::from_millis(500));
        assert!((session.time() - 0.5).abs() < 1e-6);
        assert_eq!(session.apply(Action::Pause), Flow::Continue);
        assert!(session.is_paused());
        session.advance(Duration::from_millis(500));
        assert!((session.time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_does_not_feed_meter() {
        let mut session = Session::default();
        let first = session.frame().quality;
        for _ in 0..4 {
            session.advance(Duration::from_millis(500));
        }
        assert!(session.fps().is_none());
        assert!((session.time() - 2.0).abs() < 1e-6);
        assert_eq!(session.frame().quality, first);
    }

    #[test]
    fn test_time_scale_applies_to_clock() {
        let mut config = AppConfig::default();
        config.render.time_scale = 0.5;
        let mut session = Session::from_config(&config);
        session.advance(Duration::from_secs(2));
        assert!((session.time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_snapshot_is_independent() {
        let mut session = Session::default();
        let frame = session.frame();
        session.apply(Action::ToggleStarfield);
        assert!(frame.params.features.starfield);
        assert!(!session.frame().params.features.starfield);
        assert_eq!(frame.quality.max_steps, 220);
    }

    #[test]
    fn test_frame_uses_measured_fps() {
        let mut session = Session::default();
        session.record_frame_time(Duration::from_millis(1000));
        // One frame per second is slow: the step coarsens
        assert!((session.frame().quality.step_size - 0.3).abs() < 1e-6);
        assert_eq!(session.time(), 0.0);
    }

    #[test]
    fn test_fast_renders_refine_step() {
        let mut session = Session::default();
        for _ in 0..100 {
            session.record_frame_time(Duration::from_millis(10));
        }
        // 100 frames in one second of render time
        assert!((session.frame().quality.step_size - 0.225).abs() < 1e-6);
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.simulation.features = FeatureFlags::none();
        config.controls.mass_step = 1.0;
        let mut session = Session::from_config(&config);
        assert!(!session.params().features.any());
        session.apply(Action::MassUp);
        assert_eq!(session.params().mass(), 2.0);
    }

    #[test]
    fn test_status_line() {
        let session = Session::default();
        let status = session.status_line();
        assert!(status.starts_with("FPS: -- | Mass: 1.00 | Disk: 8.0 | Features: SPDL"));
    }
}
