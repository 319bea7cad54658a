//! ASCII black hole renderer
//!
//! This library marches camera rays through a stylised curved-spacetime model,
//! compositing an accretion disk, two orbiting planets and a procedural
//! starfield, and renders the result to the terminal or to PNG frames.

pub mod config;
pub mod disk;
pub mod marcher;
pub mod noise;
pub mod planets;
pub mod quality;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod starfield;
pub mod terminal;

pub use config::AppConfig;
pub use marcher::{Frame, Ray};
pub use renderer::Renderer;
pub use scene::{FeatureFlags, OrbitCamera, SimulationParams};
pub use session::Session;
pub use terminal::TerminalDisplay;

/// Hard upper bound on march iterations, regardless of the quality budget
pub const MAX_MARCH_STEPS: u32 = 300;

/// UTF-8 character gradient from dark to light (extended Unicode block characters)
pub const ASCII_GRADIENT: &str = " ·∙:;░▒▓█";
