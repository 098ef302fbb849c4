use glam::Vec2;

use super::{Collider, Sdf};
use crate::params::ConfigError;

/// An infinite wall through `origin`. Particles are kept on the side its normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    origin: Vec2,
    tangent: Vec2,
    normal: Vec2,
}

impl Wall {
    /// Half length of the drawn outline along the wall.
    pub const DRAW_LENGTH: f32 = 1000.0;
    /// Thickness of the drawn outline behind the wall.
    pub const DRAW_DEPTH: f32 = 50.0;

    /// Creates a wall through `origin` running along `direction`. The solid side lies to the
    /// right of `direction`; the free side (the normal) is its left-hand perpendicular.
    ///
    /// # Panics
    ///
    /// If `direction` is zero or not finite. Use [`Wall::try_new`] for untrusted input.
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        match Self::try_new(origin, direction) {
            Ok(wall) => wall,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(origin: Vec2, direction: Vec2) -> Result<Self, ConfigError> {
        let tangent = direction.try_normalize().ok_or(ConfigError::WallDirection(direction))?;

        Ok(Wall {
            origin,
            tangent,
            normal: tangent.perp(),
        })
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn tangent(&self) -> Vec2 {
        self.tangent
    }

    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Polygon covering the solid side of the wall, for drawing.
    pub fn outline(&self) -> [Vec2; 5] {
        let along = Self::DRAW_LENGTH * self.tangent;
        let behind = -Self::DRAW_DEPTH * self.normal;

        [
            self.origin,
            self.origin + along,
            self.origin + along + behind,
            self.origin - along + behind,
            self.origin - along,
        ]
    }
}

impl Collider for Wall {
    #[inline]
    fn sdf(&self, p: Vec2) -> Sdf {
        Sdf::new((p - self.origin).dot(self.normal), self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_normal_points_up() {
        let floor = Wall::new(Vec2::new(0.0, 10.0), Vec2::new(20.0, 0.0));
        assert!((floor.normal() - Vec2::Y).length() < 1e-6);

        let sdf = floor.sdf(Vec2::new(-500.0, 25.0));
        assert!((sdf.distance - 15.0).abs() < 1e-5);
        assert!(floor.sdf(Vec2::new(3.0, 4.0)).distance < 0.0);
    }

    #[test]
    fn side_walls_face_inward() {
        let left = Wall::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, -10.0));
        let right = Wall::new(Vec2::new(790.0, 0.0), Vec2::new(0.0, 10.0));

        assert!((left.normal() - Vec2::X).length() < 1e-6);
        assert!((right.normal() + Vec2::X).length() < 1e-6);
        assert!((left.sdf(Vec2::new(400.0, 0.0)).distance - 390.0).abs() < 1e-3);
        assert!((right.sdf(Vec2::new(400.0, 0.0)).distance - 390.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_direction_is_rejected() {
        assert_eq!(Wall::try_new(Vec2::ZERO, Vec2::ZERO), Err(ConfigError::WallDirection(Vec2::ZERO)));
        assert!(Wall::try_new(Vec2::ZERO, Vec2::new(f32::NAN, 1.0)).is_err());
        assert!(Wall::try_new(Vec2::ZERO, Vec2::new(0.0, 3.0)).is_ok());
    }

    #[test]
    #[should_panic(expected = "wall direction")]
    fn zero_direction_panics() {
        Wall::new(Vec2::new(0.0, 10.0), Vec2::ZERO);
    }

    #[test]
    fn outline_lies_on_solid_side() {
        let floor = Wall::new(Vec2::new(0.0, 10.0), Vec2::X);
        for corner in floor.outline() {
            assert!(floor.sdf(corner).distance <= 1e-4);
        }
    }
}
