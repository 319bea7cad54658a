//! Accretion disk emission and opacity
//!
//! The disk is an infinitely thin annulus in the `y = 0` plane. Its pattern is
//! sampled in (log radius, sin/cos of the sheared angle) space so it stays
//! seamless across the `atan2` wrap and advects with Keplerian shear.

use crate::noise::{mix, mix3, noise, smoothstep};
use nalgebra::{Point3, Vector2, Vector3};

const BASE_ALPHA: f32 = 0.33;
const SPIRAL_ARMS: f32 = 3.0;
const SPIRAL_PITCH: f32 = 4.0;

/// Emissive colour and opacity of the disk at one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSample {
    pub emissive: Vector3<f32>,
    pub alpha: f32,
}

impl DiskSample {
    pub fn transparent() -> Self {
        Self {
            emissive: Vector3::zeros(),
            alpha: 0.0,
        }
    }
}

/// Disk evaluator bound to one frame's geometry, time and viewpoint
#[derive(Debug, Clone, Copy)]
pub struct DiskSampler {
    inner_radius: f32,
    outer_radius: f32,
    time: f32,
    camera_position: Point3<f32>,
}

impl DiskSampler {
    pub fn new(inner_radius: f32, outer_radius: f32, time: f32, camera_position: Point3<f32>) -> Self {
        Self {
            inner_radius,
            outer_radius,
            time,
            camera_position,
        }
    }

    /// An inverted annulus (inner >= outer) has no area
    pub fn is_empty(&self) -> bool {
        self.inner_radius >= self.outer_radius
    }

    /// Whether a plane crossing at cylindrical radius `r` lands on the disk
    pub fn contains(&self, r: f32) -> bool {
        r > self.inner_radius && r < self.outer_radius
    }

    pub fn sample(&self, p: &Point3<f32>) -> DiskSample {
        if self.is_empty() {
            return DiskSample::transparent();
        }

        let r = Vector2::new(p.x, p.z).norm();
        let theta = p.z.atan2(p.x);

        // Keplerian shear
        let omega = 1.6 * r.max(0.25).powf(-1.5);
        let theta_flow = theta - self.time * omega;

        let turbulence = self.turbulence(r, theta_flow);

        let spiral_phase = SPIRAL_ARMS * (theta_flow + r.max(0.0005).ln() * SPIRAL_PITCH);
        let arm_mask = (0.5 + 0.5 * spiral_phase.cos()).powi(2);

        let radial = smoothstep(self.inner_radius, self.outer_radius, r);
        let arm_gain = mix(1.35, 1.1, radial);
        let intensity = turbulence.powf(1.5)
            * arm_gain
            * mix(0.7, 1.2, arm_mask)
            * (1.15 - 0.65 * radial);

        let mut color = temperature_color(radial);
        self.apply_doppler(&mut color, p, r);

        let falloff = 1.0 - radial;
        let emissive = color * intensity * (2.2 + 1.3 * (1.0 - radial)) * falloff;
        let alpha = BASE_ALPHA * falloff * (intensity * (1.1 + 0.4 * (1.0 - radial))).clamp(0.1, 1.0);

        DiskSample { emissive, alpha }
    }

    /// Three noise octaves in seam-free polar coordinates, normalised to [0, 1]
    fn turbulence(&self, r: f32, theta_flow: f32) -> f32 {
        let log_r = r.max(0.0007).ln();
        let n = 1.00 * noise(Vector2::new(log_r * 2.7, theta_flow.sin()))
            + 0.50 * noise(Vector2::new(log_r * 5.11 + 17.0, theta_flow.cos()))
            + 0.25 * noise(Vector2::new(log_r * 9.30 - 11.0, (theta_flow * 2.0).sin()));
        (n / 1.75).clamp(0.0, 1.0)
    }

    /// Stylised beaming: the approaching side loses red, the receding side gains blue
    fn apply_doppler(&self, color: &mut Vector3<f32>, p: &Point3<f32>, r: f32) {
        let speed = 0.8 * r.max(0.25).powf(-0.5);
        let Some(orbit_dir) = Vector3::new(-p.z, 0.0, p.x).try_normalize(1e-8) else {
            return;
        };
        let Some(view_dir) = (self.camera_position - p).try_normalize(1e-8) else {
            return;
        };

        let dop = (orbit_dir.dot(&view_dir) * speed).clamp(-1.0, 1.0);
        color.x *= 1.0 - 0.35 * dop.max(0.0);
        color.z *= 1.0 + 0.55 * (-dop).max(0.0);
    }
}

/// Hot blue-white inner edge through gold to warm orange at the rim
fn temperature_color(radial: f32) -> Vector3<f32> {
    let inner = Vector3::new(0.98, 0.98, 1.0);
    let mid = Vector3::new(1.0, 0.85, 0.55);
    let outer = Vector3::new(1.0, 0.55, 0.22);
    let color = mix3(inner, mid, smoothstep(0.0, 0.6, radial));
    mix3(color, outer, smoothstep(0.4, 1.0, radial))
}
