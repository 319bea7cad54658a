mod loader;

use crate::scene::{FeatureFlags, OrbitCamera, SimulationParams, DISK_OUTER_RANGE, MASS_RANGE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use loader::load_config;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
}

/// Output and pacing configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    /// Offline render width in pixels (interactive mode follows the terminal)
    #[serde(default = "default_width")]
    pub width: usize,
    /// Offline render height in pixels
    #[serde(default = "default_height")]
    pub height: usize,
    /// Minimum time between interactive frames
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Simulation seconds per wall-clock second
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
}

fn default_width() -> usize {
    320
}

fn default_height() -> usize {
    180
}

fn default_frame_interval() -> u64 {
    33
}

fn default_time_scale() -> f32 {
    1.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_interval_ms: default_frame_interval(),
            time_scale: default_time_scale(),
        }
    }
}

/// Initial black hole parameters
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_disk_outer_radius")]
    pub disk_outer_radius: f32,
    #[serde(default)]
    pub features: FeatureFlags,
}

fn default_mass() -> f32 {
    crate::scene::DEFAULT_MASS
}

fn default_disk_outer_radius() -> f32 {
    crate::scene::DEFAULT_DISK_OUTER_RADIUS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            disk_outer_radius: default_disk_outer_radius(),
            features: FeatureFlags::all(),
        }
    }
}

impl SimulationConfig {
    pub fn params(&self) -> SimulationParams {
        SimulationParams::new(self.mass, self.disk_outer_radius, self.features)
    }
}

/// Initial camera placement
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CameraConfig {
    #[serde(default = "default_azimuth")]
    pub azimuth: f32,
    #[serde(default = "default_elevation")]
    pub elevation: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_azimuth() -> f32 {
    OrbitCamera::default().azimuth
}

fn default_elevation() -> f32 {
    OrbitCamera::default().elevation
}

fn default_radius() -> f32 {
    OrbitCamera::default().radius
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            azimuth: default_azimuth(),
            elevation: default_elevation(),
            radius: default_radius(),
        }
    }
}

impl CameraConfig {
    pub fn camera(&self) -> OrbitCamera {
        OrbitCamera::new(self.azimuth, self.elevation, self.radius)
    }
}

/// Increments applied by interactive key presses
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ControlsConfig {
    #[serde(default = "default_mass_step")]
    pub mass_step: f32,
    #[serde(default = "default_disk_step")]
    pub disk_step: f32,
    /// Radians per orbit key press
    #[serde(default = "default_orbit_step")]
    pub orbit_step: f32,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
}

fn default_mass_step() -> f32 {
    0.1
}

fn default_disk_step() -> f32 {
    0.5
}

fn default_orbit_step() -> f32 {
    0.1
}

fn default_zoom_step() -> f32 {
    0.5
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            mass_step: default_mass_step(),
            disk_step: default_disk_step(),
            orbit_step: default_orbit_step(),
            zoom_step: default_zoom_step(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, or the first default location that exists, or
    /// fall back to built-in defaults when no path was given
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["blackhole.yaml", "blackhole.yml", "./config/blackhole.yaml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values outside the ranges the simulation accepts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(MASS_RANGE.0..=MASS_RANGE.1).contains(&sim.mass) {
            return Err(ConfigError::Validation(format!(
                "simulation.mass must be within [{}, {}], got {}",
                MASS_RANGE.0, MASS_RANGE.1, sim.mass
            )));
        }
        if !(DISK_OUTER_RANGE.0..=DISK_OUTER_RANGE.1).contains(&sim.disk_outer_radius) {
            return Err(ConfigError::Validation(format!(
                "simulation.disk_outer_radius must be within [{}, {}], got {}",
                DISK_OUTER_RANGE.0, DISK_OUTER_RANGE.1, sim.disk_outer_radius
            )));
        }

        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(ConfigError::Validation(format!(
                "render size must be non-zero, got {}x{}",
                render.width, render.height
            )));
        }
        if !render.time_scale.is_finite() || render.time_scale < 0.0 {
            return Err(ConfigError::Validation(format!(
                "render.time_scale must be a non-negative number, got {}",
                render.time_scale
            )));
        }

        let camera = &self.camera;
        let limits = OrbitCamera::default();
        if !(limits.min_radius..=limits.max_radius).contains(&camera.radius) {
            return Err(ConfigError::Validation(format!(
                "camera.radius must be within [{}, {}], got {}",
                limits.min_radius, limits.max_radius, camera.radius
            )));
        }

        let controls = &self.controls;
        let steps = [
            ("mass_step", controls.mass_step),
            ("disk_step", controls.disk_step),
            ("orbit_step", controls.orbit_step),
            ("zoom_step", controls.zoom_step),
        ];
        for (name, value) in steps {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "controls.{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.params(), SimulationParams::default());
        assert_eq!(config.camera.camera(), OrbitCamera::default());
    }

    #[test]
    fn test_validate_rejects_mass() {
        let mut config = AppConfig::default();
        config.simulation.mass = 7.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("simulation.mass"));
    }

    #[test]
    fn test_validate_rejects_disk_radius() {
        let mut config = AppConfig::default();
        config.simulation.disk_outer_radius = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let mut config = AppConfig::default();
        config.render.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_step() {
        let mut config = AppConfig::default();
        config.controls.zoom_step = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("controls.zoom_step"));
    }

    #[test]
    fn test_validate_rejects_camera_radius() {
        let mut config = AppConfig::default();
        config.camera.radius = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_feature_flags_deserialize() {
        let flags: FeatureFlags =
            serde_yaml::from_str("starfield: true\nplanets: false\ndisk: true\nlensing: false\n")
                .unwrap();
        assert!(flags.starfield);
        assert!(!flags.planets);
        assert!(!flags.lensing);
    }

    #[test]
    fn test_config_roundtrip_yaml() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = include_str!("../../blackhole.yaml.default");
        let parsed: AppConfig = serde_yaml::from_str(sample).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("blackhole.yaml".to_string());
        assert_eq!(err.to_string(), "Configuration file not found: blackhole.yaml");
    }
}
