//! Procedural sky: hashed star grid, galactic band and nebula

use crate::noise::{fbm, mix3, random, smoothstep};
use nalgebra::{Vector2, Vector3};
use std::f32::consts::PI;

/// Star grid resolution in longitude/latitude UV space
const GRID: (f32, f32) = (520.0, 260.0);

/// Background sky colour seen along unit direction `rd` at time `t`.
///
/// The result is soft tone-mapped (`c / (1 + c)`) so every channel lies in [0, 1).
pub fn star_field(rd: &Vector3<f32>, t: f32) -> Vector3<f32> {
    let rd = rd.normalize();
    let lon = rd.z.atan2(rd.x);
    let lat = rd.y.clamp(-1.0, 1.0).asin();
    let uv = Vector2::new(lon / (2.0 * PI) + 0.5, lat / PI + 0.5);

    let mut color = stars(uv, t) + nebula(&rd, uv);
    color.apply(|c| *c /= 1.0 + *c);
    color
}

/// Sum of star contributions from the 3x3 cell neighbourhood around `uv`
fn stars(uv: Vector2<f32>, t: f32) -> Vector3<f32> {
    let g_uv = Vector2::new(uv.x * GRID.0, uv.y * GRID.1);
    let base_cell = g_uv.map(f32::floor);
    let f = g_uv - base_cell;

    let warm = Vector3::new(1.0, 0.92, 0.86);
    let cool = Vector3::new(0.75, 0.86, 1.0);

    let mut color = Vector3::zeros();
    for j in -1..=1 {
        for i in -1..=1 {
            let neighbour = Vector2::new(i as f32, j as f32);
            let cell = base_cell + neighbour;

            let offset = Vector2::new(
                random(cell + Vector2::new(13.1, 17.7)),
                random(cell + Vector2::new(27.3, 39.5)),
            );
            let dist = (neighbour + offset - f).norm();

            let size_rnd = random(cell + Vector2::new(3.7, 5.1));
            let size = 0.018 + 0.12 * size_rnd * size_rnd;

            let mut brightness = random(cell + Vector2::new(1.3, 2.1)).powf(10.0);
            if random(cell + Vector2::new(4.2, 7.9)) >= 0.985 {
                brightness += 0.6;
            }

            let tw_rnd = random(cell + Vector2::new(9.2, 6.4));
            let twinkle = 0.88 + 0.22 * (t * (5.0 + 11.0 * tw_rnd) + tw_rnd * 6.28318).sin();

            let core = smoothstep(size, 0.0, dist);
            let halo = smoothstep(2.5 * size, 0.0, dist) * 0.35;
            let intensity = brightness * (core * core + halo) * twinkle;

            let temp = random(cell + Vector2::new(2.7, 8.9));
            color += mix3(warm, cool, temp) * intensity;
        }
    }
    color
}

/// Faint nebula tint concentrated along the galactic band
fn nebula(rd: &Vector3<f32>, uv: Vector2<f32>) -> Vector3<f32> {
    let band_axis = Vector3::new(0.0, 0.2, 1.0).normalize();
    let band = (1.0 - rd.dot(&band_axis).abs()).powi(2);

    let base = fbm(uv.component_mul(&Vector2::new(8.0, 4.0)));
    let detail = fbm((uv + Vector2::new(0.17, 0.03)).component_mul(&Vector2::new(16.0, 8.0)));
    let mask = smoothstep(0.55, 0.9, band) * smoothstep(0.35, 0.85, base);
    let density = (0.9 * base + 0.4 * detail).clamp(0.0, 1.6) * mask;

    let tint = mix3(
        Vector3::new(0.12, 0.16, 0.22),
        Vector3::new(0.18, 0.12, 0.20),
        detail,
    );
    tint * (0.06 * density)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directions() -> Vec<Vector3<f32>> {
        (0..64)
            .map(|i| {
                let a = i as f32 * 0.37;
                let b = (i as f32 * 0.21).sin();
                Vector3::new(a.cos(), b, a.sin()).normalize()
            })
            .collect()
    }

    #[test]
    fn test_star_field_is_tone_mapped() {
        for rd in directions() {
            let c = star_field(&rd, 1.5);
            for k in 0..3 {
                assert!(c[k] >= 0.0 && c[k] < 1.0, "channel {} = {}", k, c[k]);
            }
        }
    }

    #[test]
    fn test_star_field_is_deterministic() {
        let rd = Vector3::new(0.3, 0.2, -0.9).normalize();
        assert_eq!(star_field(&rd, 2.0), star_field(&rd, 2.0));
    }

    #[test]
    fn test_star_field_normalises_input() {
        let rd = Vector3::new(0.0, 0.1, 1.0);
        let a = star_field(&rd, 0.0);
        let b = star_field(&(rd * 5.0), 0.0);
        assert!((a - b).norm() < 1e-5);
    }

    #[test]
    fn test_star_field_poles_are_finite() {
        for rd in [Vector3::y(), -Vector3::y()] {
            let c = star_field(&rd, 0.0);
            assert!(c.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_nebula_is_faint() {
        for rd in directions() {
            let uv = Vector2::new(0.5, 0.5);
            let n = nebula(&rd, uv);
            assert!(n.max() <= 0.06 * 1.6 * 0.22 + 1e-6);
        }
    }
}
