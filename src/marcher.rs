//! Ray marching through the lensed scene
//!
//! Each ray is advanced in discrete steps. Per step, in this order: planet hit,
//! horizon absorption, step-size modulation, gravitational deflection and
//! advance, disk plane crossing, escape. Emission is composited front to back.

use crate::disk::DiskSampler;
use crate::noise::smoothstep;
use crate::planets::PlanetField;
use crate::quality::QualityParams;
use crate::scene::{ray_direction, OrbitCamera, SimulationParams};
use crate::starfield::star_field;
use crate::MAX_MARCH_STEPS;
use nalgebra::{Matrix4, Point3, Vector3};

/// Gravitational constant of the pseudo-force
const G: f32 = 1.0;
const HORIZON_EPSILON: f32 = 1e-3;
const OPAQUE_TRANSMITTANCE: f32 = 0.02;
const MIN_RADIUS_SQ: f32 = 1e-4;
const GAMMA: f32 = 0.4545;
const BLOOM_STRENGTH: f32 = 0.3;

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }
}

/// Immutable inputs for rendering one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub params: SimulationParams,
    pub quality: QualityParams,
    pub camera_position: Point3<f32>,
    pub inverse_view: Matrix4<f32>,
    pub time: f32,
}

impl Frame {
    pub fn new(params: SimulationParams, camera: &OrbitCamera, time: f32, fps: Option<f32>) -> Self {
        Self {
            quality: QualityParams::derive(&params, fps),
            params,
            camera_position: camera.position(),
            inverse_view: camera.inverse_view(),
            time,
        }
    }

    /// Primary ray through screen coordinate `uv` (see [`ray_direction`])
    pub fn camera_ray(&self, uv: (f32, f32)) -> Ray {
        Ray::new(self.camera_position, ray_direction(&self.inverse_view, uv))
    }
}

/// Running front-to-back compositing state of one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub color: Vector3<f32>,
    pub transmittance: f32,
}

impl Default for Composite {
    fn default() -> Self {
        Self {
            color: Vector3::zeros(),
            transmittance: 1.0,
        }
    }
}

impl Composite {
    /// Add a semi-transparent emitter in front of everything still to come
    pub fn add_layer(&mut self, emissive: &Vector3<f32>, alpha: f32) {
        self.color += emissive * self.transmittance;
        self.transmittance *= 1.0 - alpha.clamp(0.0, 1.0);
    }

    /// Add an opaque (or background) colour through the remaining transmittance
    pub fn add_opaque(&mut self, color: &Vector3<f32>) {
        self.color += color * self.transmittance;
    }

    pub fn is_opaque(&self) -> bool {
        self.transmittance < OPAQUE_TRANSMITTANCE
    }
}

/// Why a march stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Entered a planet
    Planet,
    /// Fell inside the event horizon
    Horizon,
    /// Accumulated disk opacity blocks everything behind
    Opaque,
    /// Left the scene through the escape radius
    Escaped,
    /// Ran out of step budget; composited like an escape
    Exhausted,
}

/// Outcome of marching one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Linear (pre-bloom, pre-gamma) colour
    pub color: Vector3<f32>,
    /// Direction of travel when the march stopped
    pub direction: Vector3<f32>,
    pub termination: Termination,
    pub steps: u32,
}

/// Integrate one ray through the scene
pub fn trace(ray: &Ray, frame: &Frame) -> MarchResult {
    let params = &frame.params;
    let features = params.features;
    let quality = &frame.quality;
    let t = frame.time;

    let planets = PlanetField::new(features.planets);
    let disk = DiskSampler::new(
        params.disk_inner_radius(),
        params.disk_outer_radius(),
        t,
        frame.camera_position,
    );
    let horizon = params.schwarzschild_radius() + HORIZON_EPSILON;
    let far_distance = if quality.far_distance > 0.0 {
        quality.far_distance
    } else {
        crate::quality::FAR_DISTANCE
    };

    let mut acc = Composite::default();
    let mut p = ray.origin;
    let mut dir = ray.direction;

    let finish = |acc: Composite, dir: Vector3<f32>, termination, steps| MarchResult {
        color: acc.color,
        direction: dir,
        termination,
        steps,
    };

    let budget = quality.max_steps.min(MAX_MARCH_STEPS);
    for i in 0..budget {
        let p_prev = p;

        if let Some(color) = planets.hit(&p, t) {
            acc.add_opaque(&color);
            return finish(acc, dir, Termination::Planet, i);
        }

        let r = p.coords.norm();
        if features.lensing && r < horizon {
            return finish(acc, dir, Termination::Horizon, i);
        }

        let step = modulated_step(quality.step_size, r, p.y, params.disk_outer_radius(), far_distance);

        if features.lensing && r < quality.lens_max_radius {
            dir = deflect(&dir, &p, r, params.mass(), step);
        }
        p += dir * step;

        if features.disk && p_prev.y * p.y < 0.0 {
            let s = -p_prev.y / (p.y - p_prev.y);
            let hit = p_prev + (p - p_prev) * s;
            let r_hit = hit.x.hypot(hit.z);
            if disk.contains(r_hit) {
                let sample = disk.sample(&hit);
                acc.add_layer(&sample.emissive, sample.alpha);
                if acc.is_opaque() {
                    return finish(acc, dir, Termination::Opaque, i + 1);
                }
            }
        }

        if p.coords.norm() > far_distance {
            if features.starfield {
                acc.add_opaque(&star_field(&dir, t));
            }
            return finish(acc, dir, Termination::Escaped, i + 1);
        }
    }

    if features.starfield {
        acc.add_opaque(&star_field(&dir, t));
    }
    finish(acc, dir, Termination::Exhausted, budget)
}

/// Linear colour seen along a ray
pub fn march(ray: &Ray, frame: &Frame) -> Vector3<f32> {
    trace(ray, frame).color
}

/// Coarsen the base step far from the hole and away from the disk plane
fn modulated_step(base: f32, r: f32, y: f32, disk_outer: f32, far_distance: f32) -> f32 {
    let mut step = base;
    step += step * smoothstep(disk_outer + 2.0, far_distance, r) * 2.5;
    step *= 1.0 + 1.2 * smoothstep(0.5, 3.0, y.abs());
    step
}

/// Explicit Euler update of the direction under a central inverse-square pull
fn deflect(dir: &Vector3<f32>, p: &Point3<f32>, r: f32, mass: f32, step: f32) -> Vector3<f32> {
    let toward_center = if r > 1e-6 { -p.coords / r } else { Vector3::zeros() };
    let acceleration = toward_center * (G * mass) / (r * r).max(MIN_RADIUS_SQ);
    (dir + acceleration * step).try_normalize(1e-8).unwrap_or(*dir)
}

/// Bloom and gamma encoding of a linear colour
pub fn post_process(color: Vector3<f32>) -> Vector3<f32> {
    let luminance = color.dot(&Vector3::new(0.21, 0.72, 0.07));
    let bloomed = color + color * luminance * BLOOM_STRENGTH;
    gamma_encode(bloomed)
}

fn gamma_encode(color: Vector3<f32>) -> Vector3<f32> {
    color.map(|c| c.max(0.0).powf(GAMMA))
}

/// Final display colour of a primary ray
pub fn shade(ray: &Ray, frame: &Frame) -> Vector3<f32> {
    let features = frame.params.features;

    if features.starfield_only() {
        return gamma_encode(star_field(&ray.direction, frame.time));
    }
    if !features.any() {
        return Vector3::zeros();
    }

    post_process(march(ray, frame))
}
