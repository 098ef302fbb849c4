use glam::Vec2;

use super::{Collider, Obstacle, Sdf};
use crate::params::{check_radius, ConfigError};

/// A sink region paired with a source. Particles that end up inside the sink collider are
/// re-emitted around `source` with `velocity`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAndSink {
    collider: Box<Obstacle>,
    pub source: Vec2,
    pub source_radius: f32,
    pub velocity: Vec2,
}

impl SourceAndSink {
    pub fn new(collider: impl Into<Obstacle>, source: Vec2, source_radius: f32, velocity: Vec2) -> Self {
        Self {
            collider: Box::new(collider.into()),
            source,
            source_radius,
            velocity,
        }
    }

    /// Like [`SourceAndSink::new`], but rejects a negative or non-finite source radius.
    pub fn try_new(
        collider: impl Into<Obstacle>,
        source: Vec2,
        source_radius: f32,
        velocity: Vec2,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(collider, source, check_radius(source_radius)?, velocity))
    }

    pub fn collider(&self) -> &Obstacle {
        &self.collider
    }

    /// Whether a particle at `p` has crossed into the sink.
    #[inline]
    pub fn swallows(&self, p: Vec2) -> bool {
        self.sdf(p).distance < 0.0
    }
}

impl Collider for SourceAndSink {
    #[inline]
    fn sdf(&self, p: Vec2) -> Sdf {
        self.collider.sdf(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::Capsule;

    #[test]
    fn delegates_to_collider() {
        let capsule = Capsule::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 10.0);
        let sink = SourceAndSink::new(capsule, Vec2::new(250.0, 550.0), 25.0, Vec2::new(2.0, -4.0));

        let p = Vec2::new(20.0, 15.0);
        assert_eq!(sink.sdf(p), capsule.sdf(p));
        assert!(sink.swallows(p));
        assert!(!sink.swallows(Vec2::new(20.0, 25.0)));
    }

    #[test]
    fn negative_source_radius_is_rejected() {
        let capsule = Capsule::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 10.0);
        let err = SourceAndSink::try_new(capsule, Vec2::ZERO, -25.0, Vec2::ZERO).unwrap_err();
        assert_eq!(err, ConfigError::ObstacleRadius(-25.0));
    }
}
