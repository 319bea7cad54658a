//! Simulation parameters and the orbiting camera

use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

pub const MASS_RANGE: (f32, f32) = (0.1, 5.0);
pub const DISK_OUTER_RANGE: (f32, f32) = (2.0, 30.0);

pub const DEFAULT_MASS: f32 = 1.0;
pub const DEFAULT_DISK_OUTER_RADIUS: f32 = 8.0;

/// Independently switchable scene features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub starfield: bool,
    pub planets: bool,
    pub disk: bool,
    pub lensing: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl FeatureFlags {
    pub fn all() -> Self {
        Self {
            starfield: true,
            planets: true,
            disk: true,
            lensing: true,
        }
    }

    pub fn none() -> Self {
        Self {
            starfield: false,
            planets: false,
            disk: false,
            lensing: false,
        }
    }

    /// Nothing but the sky is enabled, so rays never need marching
    pub fn starfield_only(&self) -> bool {
        self.starfield && !self.planets && !self.disk && !self.lensing
    }

    pub fn any(&self) -> bool {
        self.starfield || self.planets || self.disk || self.lensing
    }

    /// Compact status string, e.g. `SPDL` or `S--L`
    pub fn summary(&self) -> String {
        [
            (self.starfield, 'S'),
            (self.planets, 'P'),
            (self.disk, 'D'),
            (self.lensing, 'L'),
        ]
        .iter()
        .map(|&(on, c)| if on { c } else { '-' })
        .collect()
    }
}

/// Black hole and disk parameters.
///
/// The horizon and inner disk radius are derived from the mass and are kept in
/// sync by every mutator. Inner < outer is not enforced here; see
/// [`SimulationParams::disk_is_degenerate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    mass: f32,
    disk_outer_radius: f32,
    schwarzschild_radius: f32,
    disk_inner_radius: f32,
    pub features: FeatureFlags,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new(DEFAULT_MASS, DEFAULT_DISK_OUTER_RADIUS, FeatureFlags::all())
    }
}

impl SimulationParams {
    /// Build parameters, clamping mass and disk radius into their valid ranges
    pub fn new(mass: f32, disk_outer_radius: f32, features: FeatureFlags) -> Self {
        let mut params = Self {
            mass: 0.0,
            disk_outer_radius: disk_outer_radius.clamp(DISK_OUTER_RANGE.0, DISK_OUTER_RANGE.1),
            schwarzschild_radius: 0.0,
            disk_inner_radius: 0.0,
            features,
        };
        params.set_mass(mass);
        params
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn disk_outer_radius(&self) -> f32 {
        self.disk_outer_radius
    }

    /// Stylised horizon radius, equal to the mass
    pub fn schwarzschild_radius(&self) -> f32 {
        self.schwarzschild_radius
    }

    pub fn disk_inner_radius(&self) -> f32 {
        self.disk_inner_radius
    }

    /// The inner edge has reached or passed the outer edge; the disk renders empty
    pub fn disk_is_degenerate(&self) -> bool {
        self.disk_inner_radius >= self.disk_outer_radius
    }

    fn set_mass(&mut self, mass: f32) {
        self.mass = mass.clamp(MASS_RANGE.0, MASS_RANGE.1);
        self.schwarzschild_radius = self.mass;
        self.disk_inner_radius = 1.5 * self.schwarzschild_radius;
    }

    pub fn adjust_mass(&mut self, delta: f32) {
        self.set_mass(self.mass + delta);
    }

    pub fn adjust_disk_size(&mut self, delta: f32) {
        self.disk_outer_radius =
            (self.disk_outer_radius + delta).clamp(DISK_OUTER_RANGE.0, DISK_OUTER_RANGE.1);
    }

    pub fn toggle_starfield(&mut self) {
        self.features.starfield = !self.features.starfield;
    }

    pub fn toggle_planets(&mut self) {
        self.features.planets = !self.features.planets;
    }

    pub fn toggle_disk(&mut self) {
        self.features.disk = !self.features.disk;
    }

    pub fn toggle_lensing(&mut self) {
        self.features.lensing = !self.features.lensing;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Camera orbiting the origin on a sphere, always looking at its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub target: Point3<f32>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: 0.5,
            elevation: 1.5,
            radius: 15.0,
            min_radius: 4.0,
            max_radius: 50.0,
            target: Point3::origin(),
        }
    }
}

impl OrbitCamera {
    pub fn new(azimuth: f32, elevation: f32, radius: f32) -> Self {
        let defaults = Self::default();
        Self {
            azimuth,
            elevation: elevation.clamp(0.01, PI - 0.01),
            radius: radius.clamp(defaults.min_radius, defaults.max_radius),
            ..defaults
        }
    }

    /// Spherical-to-Cartesian placement around the target
    pub fn position(&self) -> Point3<f32> {
        self.target
            + Vector3::new(
                self.radius * self.elevation.sin() * self.azimuth.cos(),
                self.radius * self.elevation.cos(),
                self.radius * self.elevation.sin() * self.azimuth.sin(),
            )
    }

    /// Orbit by the given angles (radians), keeping the camera off the poles
    pub fn rotate(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth += delta_azimuth;
        self.elevation = (self.elevation + delta_elevation).clamp(0.01, PI - 0.01);
    }

    /// Move toward (negative) or away from (positive) the target
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta).clamp(self.min_radius, self.max_radius);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position(), &self.target, &Vector3::y())
    }

    /// Camera-to-world transform; identity if the view matrix is singular
    pub fn inverse_view(&self) -> Matrix4<f32> {
        invert_or_identity(&self.view_matrix())
    }
}

/// Invert a transform, falling back to identity instead of producing NaNs
pub fn invert_or_identity(m: &Matrix4<f32>) -> Matrix4<f32> {
    match m.try_inverse() {
        Some(inv) if inv.iter().all(|v| v.is_finite()) => inv,
        _ => {
            tracing::warn!("view matrix is not invertible, using identity");
            Matrix4::identity()
        }
    }
}

/// World-space unit ray direction for a screen coordinate.
///
/// `uv` is centred on the screen, y up, scaled by the image height so that the
/// vertical field of view spans one unit at distance one.
pub fn ray_direction(inverse_view: &Matrix4<f32>, uv: (f32, f32)) -> Vector3<f32> {
    let camera_dir = Vector3::new(uv.0, uv.1, -1.0).normalize();
    let world = inverse_view * Vector4::new(camera_dir.x, camera_dir.y, camera_dir.z, 0.0);
    Vector3::new(world.x, world.y, world.z)
        .try_normalize(1e-8)
        .unwrap_or(camera_dir)
}
