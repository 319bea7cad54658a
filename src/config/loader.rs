use std::path::Path;

use super::{AppConfig, ConfigError};

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/blackhole.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let file = write_temp("render: [unclosed");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let file = write_temp(
            r#"
render:
  width: 640
  height: 360
  frame_interval_ms: 16
  time_scale: 0.5

simulation:
  mass: 2.0
  disk_outer_radius: 12.0
  features:
    starfield: true
    planets: false
    disk: true
    lensing: true

camera:
  azimuth: 0.0
  elevation: 1.2
  radius: 25.0

controls:
  mass_step: 0.2
  disk_step: 1.0
  orbit_step: 0.05
  zoom_step: 1.0
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.frame_interval_ms, 16);
        assert_eq!(config.simulation.mass, 2.0);
        assert!(!config.simulation.features.planets);
        assert_eq!(config.camera.radius, 25.0);
        assert_eq!(config.controls.disk_step, 1.0);

        let params = config.simulation.params();
        assert_eq!(params.schwarzschild_radius(), 2.0);
        assert_eq!(params.disk_inner_radius(), 3.0);
    }

    #[test]
    fn test_load_config_minimal() {
        let file = write_temp("simulation:\n  mass: 0.5\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.simulation.mass, 0.5);
        assert_eq!(config.simulation.disk_outer_radius, 8.0);
        assert_eq!(config.render, super::super::RenderConfig::default());
    }

    #[test]
    fn test_load_config_out_of_range() {
        let file = write_temp("simulation:\n  disk_outer_radius: 45.0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_config_from_file() {
        let result = AppConfig::from_file("/nonexistent/path.yaml");
        assert!(result.is_err());
    }
}
