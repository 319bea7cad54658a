//! Two opaque bodies on circular orbits in the disk plane

use crate::noise::{mix3, noise};
use nalgebra::{Point3, Vector2, Vector3};

/// Orbital and appearance parameters of a single body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    pub orbit_radius: f32,
    pub radius: f32,
    pub speed: f32,
    pub phase: f32,
    pub color: Vector3<f32>,
    /// Ambient floor of the Lambertian term
    pub ambient: f32,
    /// Banded gas-giant texture
    pub banded: bool,
}

impl Planet {
    pub fn rocky() -> Self {
        Self {
            orbit_radius: 18.0,
            radius: 0.4,
            speed: 0.1,
            phase: 0.0,
            color: Vector3::new(0.8, 0.3, 0.1),
            ambient: 0.3,
            banded: false,
        }
    }

    pub fn gas_giant() -> Self {
        Self {
            orbit_radius: 30.0,
            radius: 1.0,
            speed: 0.05,
            phase: 2.5,
            color: Vector3::new(0.3, 0.4, 0.7),
            ambient: 0.4,
            banded: true,
        }
    }

    /// Centre of the body at time `t`
    pub fn position(&self, t: f32) -> Point3<f32> {
        let angle = t * self.speed + self.phase;
        Point3::new(angle.cos() * self.orbit_radius, 0.0, angle.sin() * self.orbit_radius)
    }

    /// Shaded colour if `p` lies inside the body
    fn shade(&self, p: &Point3<f32>, t: f32) -> Option<Vector3<f32>> {
        let center = self.position(t);
        let offset = p - center;
        if offset.norm() >= self.radius {
            return None;
        }

        // Lit from the origin
        let normal = offset.try_normalize(1e-6).unwrap_or_else(Vector3::y);
        let light_dir = (-center.coords).try_normalize(1e-6).unwrap_or_else(Vector3::y);
        let diffuse = normal.dot(&light_dir).max(0.0) * (1.0 - self.ambient) + self.ambient;

        let albedo = if self.banded {
            let n = noise(Vector2::new(p.x, p.y) * 3.0) * 0.5
                + noise(Vector2::new(p.y, p.z) * 6.0) * 0.5;
            mix3(self.color, Vector3::repeat(0.9), n)
        } else {
            self.color
        };

        Some(albedo * diffuse)
    }
}

/// The orbiting bodies, or nothing at all when planets are switched off
#[derive(Debug, Clone)]
pub struct PlanetField {
    enabled: bool,
    planets: [Planet; 2],
}

impl PlanetField {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            planets: [Planet::rocky(), Planet::gas_giant()],
        }
    }

    pub fn positions(&self, t: f32) -> [Point3<f32>; 2] {
        [self.planets[0].position(t), self.planets[1].position(t)]
    }

    /// Opaque hit colour at `p`, checking the inner body first
    pub fn hit(&self, p: &Point3<f32>, t: f32) -> Option<Vector3<f32>> {
        if !self.enabled {
            return None;
        }
        self.planets.iter().find_map(|planet| planet.shade(p, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_at_time_zero() {
        let field = PlanetField::new(true);
        let [p1, p2] = field.positions(0.0);
        assert!((p1 - Point3::new(18.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((p2.coords.norm() - 30.0).abs() < 1e-4);
        assert!((p2.x - 2.5f32.cos() * 30.0).abs() < 1e-4);
        assert_eq!(p2.y, 0.0);
    }

    #[test]
    fn test_orbits_stay_on_circle() {
        let field = PlanetField::new(true);
        for step in 0..20 {
            let t = step as f32 * 3.7;
            let [p1, p2] = field.positions(t);
            assert!((p1.coords.norm() - 18.0).abs() < 1e-3);
            assert!((p2.coords.norm() - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_hit_inside_rocky_planet() {
        let field = PlanetField::new(true);
        let hit = field.hit(&Point3::new(17.8, 0.0, 0.0), 0.0);
        let color = hit.expect("point inside planet should hit");
        // Facing the origin: full diffuse
        assert!((color - Vector3::new(0.8, 0.3, 0.1)).norm() < 1e-4);
    }

    #[test]
    fn test_far_side_gets_ambient_only() {
        let field = PlanetField::new(true);
        let color = field.hit(&Point3::new(18.3, 0.0, 0.0), 0.0).unwrap();
        assert!((color - Vector3::new(0.8, 0.3, 0.1) * 0.3).norm() < 1e-4);
    }

    #[test]
    fn test_gas_giant_hit_is_textured() {
        let field = PlanetField::new(true);
        let center = field.positions(0.0)[1];
        let color = field.hit(&center, 0.0);
        assert!(color.is_some());
    }

    #[test]
    fn test_miss_returns_none() {
        let field = PlanetField::new(true);
        assert!(field.hit(&Point3::new(0.0, 5.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn test_disabled_never_hits() {
        let field = PlanetField::new(false);
        assert!(field.hit(&Point3::new(18.0, 0.0, 0.0), 0.0).is_none());
    }
}
