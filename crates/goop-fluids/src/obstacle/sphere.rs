use glam::Vec2;

use super::{Collider, Sdf};
use crate::params::{check_radius, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec2,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Sphere {
            center,
            radius,
        }
    }

    /// Like [`Sphere::new`], but rejects a negative or non-finite radius.
    pub fn try_new(center: Vec2, radius: f32) -> Result<Self, ConfigError> {
        Ok(Self::new(center, check_radius(radius)?))
    }
}

impl Collider for Sphere {
    /// At the exact center the normal is undefined and comes back as zero, so the collision
    /// response only applies friction there.
    fn sdf(&self, p: Vec2) -> Sdf {
        let offset = p - self.center;
        let d = offset.length();

        Sdf {
            distance: d - self.radius,
            normal: if d > 0.0 { offset / d } else { Vec2::ZERO },
        }
    }
}
