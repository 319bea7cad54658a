//! Hash-based value noise shared by every procedural texture
//!
//! All functions here are pure: the same input always produces the same output,
//! there is no lattice cache and no seed state.

use nalgebra::{Vector2, Vector3};

const HASH_K: [f32; 2] = [12.9898, 78.233];
const HASH_C: f32 = 43758.5453123;

/// Octave count used by [`fbm`]
pub const FBM_OCTAVES: u32 = 4;

/// Fractional part with GLSL semantics (`x - floor(x)`, never negative)
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Hermite interpolation between two edges. Reversed edges are allowed and
/// produce a falling curve.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn mix3(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
    a + (b - a) * t
}

/// Pseudo-random scalar in [0, 1) for a 2D point
pub fn random(p: Vector2<f32>) -> f32 {
    fract((p.x * HASH_K[0] + p.y * HASH_K[1]).sin() * HASH_C)
}

/// Bilinearly blended value noise over the integer lattice
pub fn noise(p: Vector2<f32>) -> f32 {
    let i = p.map(f32::floor);
    let f = p.map(fract);

    let a = random(i);
    let b = random(i + Vector2::new(1.0, 0.0));
    let c = random(i + Vector2::new(0.0, 1.0));
    let d = random(i + Vector2::new(1.0, 1.0));

    let u = f.map(|t| t * t * (3.0 - 2.0 * t));
    mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y
}

/// Fractal sum of `octaves` noise layers, normalised by the total amplitude
pub fn fbm_octaves(mut p: Vector2<f32>, octaves: u32) -> f32 {
    let mut amplitude: f32 = 0.5;
    let mut value = 0.0;
    let mut weight = 0.0;

    for _ in 0..octaves {
        value += amplitude * noise(p);
        weight += amplitude;
        p = p * 2.03 + Vector2::new(17.7, 11.3);
        amplitude *= 0.5;
    }

    if weight > 0.0 {
        value / weight
    } else {
        0.0
    }
}

/// Four-octave fractal noise
pub fn fbm(p: Vector2<f32>) -> f32 {
    fbm_octaves(p, FBM_OCTAVES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fract_is_never_negative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!((fract(2.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_random_range() {
        for i in 0..200 {
            let p = Vector2::new(i as f32 * 0.731 - 40.0, i as f32 * 1.37);
            let r = random(p);
            assert!((0.0..=1.0).contains(&r), "random({:?}) = {}", p, r);
        }
    }

    #[test]
    fn test_random_is_pure() {
        let p = Vector2::new(3.25, -7.5);
        assert_eq!(random(p).to_bits(), random(p).to_bits());
    }

    #[test]
    fn test_noise_matches_random_on_lattice() {
        let p = Vector2::new(4.0, 9.0);
        assert!((noise(p) - random(p)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_range() {
        for i in 0..100 {
            let p = Vector2::new(i as f32 * 0.173, i as f32 * -0.291);
            let n = noise(p);
            assert!((0.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_single_octave_fbm_equals_noise() {
        let p = Vector2::new(1.7, 0.3);
        assert_eq!(fbm_octaves(p, 1).to_bits(), noise(p).to_bits());
    }

    #[test]
    fn test_fbm_uses_four_octaves() {
        let p = Vector2::new(0.41, 2.9);
        assert_eq!(fbm(p), fbm_octaves(p, FBM_OCTAVES));
        assert!((0.0..=1.0).contains(&fbm(p)));
    }

    #[test]
    fn test_fbm_zero_octaves() {
        assert_eq!(fbm_octaves(Vector2::new(1.0, 1.0), 0), 0.0);
    }

    #[test]
    fn test_smoothstep_reversed_edges() {
        assert_eq!(smoothstep(1.0, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(1.0, 0.0, 2.0), 0.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
