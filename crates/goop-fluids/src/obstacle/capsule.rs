use glam::Vec2;

use super::{Collider, Sdf};
use crate::params::{check_radius, ConfigError};

/// A line segment inflated by `radius`, giving rounded caps at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    start: Vec2,
    end: Vec2,
    radius: f32,
    delta: Vec2,
    length_squared: f32,
}

impl Capsule {
    pub fn new(start: Vec2, end: Vec2, radius: f32) -> Self {
        let delta = end - start;

        Capsule {
            start,
            end,
            radius,
            delta,
            length_squared: delta.length_squared(),
        }
    }

    /// Like [`Capsule::new`], but rejects a negative or non-finite radius.
    pub fn try_new(start: Vec2, end: Vec2, radius: f32) -> Result<Self, ConfigError> {
        Ok(Self::new(start, end, check_radius(radius)?))
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Point on the segment closest to `p`.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        if self.length_squared == 0.0 {
            return self.start;
        }

        let t = ((p - self.start).dot(self.delta) / self.length_squared).clamp(0.0, 1.0);
        self.start + t * self.delta
    }
}

impl Collider for Capsule {
    fn sdf(&self, p: Vec2) -> Sdf {
        let offset = p - self.closest_point(p);
        let d = offset.length();

        Sdf {
            distance: d - self.radius,
            normal: if d > 0.0 { offset / d } else { Vec2::ZERO },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capsule() -> Capsule {
        Capsule::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 10.0)
    }

    #[test]
    fn side_distance_uses_projection() {
        let sdf = capsule().sdf(Vec2::new(40.0, 25.0));
        assert!((sdf.distance - 15.0).abs() < 1e-5);
        assert!((sdf.normal - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn caps_are_round() {
        let sdf = capsule().sdf(Vec2::new(130.0, 40.0));
        assert!((sdf.distance - 40.0).abs() < 1e-4);
        assert!((sdf.normal - Vec2::new(0.6, 0.8)).length() < 1e-5);

        let behind = capsule().sdf(Vec2::new(-5.0, 0.0));
        assert!((behind.distance + 5.0).abs() < 1e-5);
        assert!((behind.normal + Vec2::X).length() < 1e-6);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = Capsule::try_new(Vec2::ZERO, Vec2::X, -2.0).unwrap_err();
        assert_eq!(err, ConfigError::ObstacleRadius(-2.0));
        assert!(Capsule::try_new(Vec2::ZERO, Vec2::X, f32::NAN).is_err());
    }

    #[test]
    fn degenerate_segment_is_a_sphere() {
        let dot = Capsule::new(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), 5.0);
        let sdf = dot.sdf(Vec2::new(10.0, 20.0));
        assert!((sdf.distance - 5.0).abs() < 1e-5);
        assert!((sdf.normal - Vec2::Y).length() < 1e-6);
    }
}
