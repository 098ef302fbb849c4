use glam::Vec2;

use crate::obstacle::Collider;

/// Fixed-size particle state in structure-of-arrays form.
///
/// Velocities are per-step displacements: advection adds them to positions without a `dt`.
#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub positions: Vec<Vec2>,
    /// Positions at the start of the current step.
    pub previous: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

impl Particles {
    /// `n` particles resting at the origin.
    pub fn new(n: usize) -> Self {
        Self {
            positions: vec![Vec2::ZERO; n],
            previous: vec![Vec2::ZERO; n],
            velocities: vec![Vec2::ZERO; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f32 {
        self.positions[i].distance(self.positions[j])
    }

    pub fn accelerate(&mut self, dv: Vec2) {
        self.velocities.iter_mut().for_each(|v| *v += dv);
    }

    /// Rescales every velocity longer than `cap` down to `cap`.
    pub fn clamp_velocities(&mut self, cap: f32) {
        self.velocities.iter_mut().for_each(|v| *v = v.clamp_length_max(cap));
    }

    pub fn snapshot_positions(&mut self) {
        self.previous.copy_from_slice(&self.positions);
    }

    pub fn advect(&mut self) {
        self.positions.iter_mut().zip(self.velocities.iter()).for_each(|(p, v)| *p += *v);
    }

    /// Derives velocities from the displacement since the last snapshot.
    pub fn reconstruct_velocities(&mut self) {
        for ((v, p), prev) in self.velocities.iter_mut().zip(&self.positions).zip(&self.previous) {
            *v = *p - *prev;
        }
    }

    /// Pushes particle `i` out of `collider` if it lies closer than `radius` to its surface.
    ///
    /// The push is along the surface normal by the penetration depth, plus `friction` times the
    /// tangential part of this step's motion, taken backwards. Returns whether it collided.
    pub fn resolve_collision<C: Collider>(&mut self, i: usize, collider: &C, radius: f32, friction: f32) -> bool {
        let p = self.positions[i];
        let sdf = collider.sdf(p);
        if sdf.distance >= radius {
            return false;
        }

        let n = sdf.normal;
        let motion = p - self.previous[i];
        let normal_motion = motion.dot(n) * n;
        let tangent_correction = normal_motion - motion;

        self.positions[i] += (radius - sdf.distance) * n + friction * tangent_correction;
        true
    }

    /// Adds a velocity impulse to every particle strictly inside `radius` of `center`, falling off
    /// linearly from `force` at the center to zero at the rim and pointing away from the center
    /// (towards it for negative `force`).
    pub fn apply_radial_force(&mut self, center: Vec2, force: f32, radius: f32) {
        for (p, v) in self.positions.iter().zip(self.velocities.iter_mut()) {
            let offset = *p - center;
            let r = offset.length();

            if r > 0.0 && r < radius {
                *v += offset / r * force * (1.0 - r / radius);
            }
        }
    }

    /// Adds a uniform impulse along `to - from` to every particle inside the circle spanned by
    /// the segment (centered on its midpoint, radius half its length).
    pub fn apply_line_force(&mut self, from: Vec2, to: Vec2, force: f32) {
        let delta = to - from;
        let length = delta.length();
        if length == 0.0 {
            return;
        }

        let center = from + 0.5 * delta;
        let radius_squared = 0.25 * length * length;
        let impulse = delta / length * force;

        for (p, v) in self.positions.iter().zip(self.velocities.iter_mut()) {
            if p.distance_squared(center) < radius_squared {
                *v += impulse;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::{Capsule, Obstacle, Sphere, Wall};

    #[test]
    fn advect_then_reconstruct_recovers_velocity() {
        let mut particles = Particles::new(2);
        particles.positions[1] = Vec2::new(5.0, 5.0);
        particles.velocities = vec![Vec2::new(1.0, -2.0), Vec2::new(-0.5, 0.25)];

        let velocities = particles.velocities.clone();
        particles.snapshot_positions();
        particles.advect();
        particles.reconstruct_velocities();

        assert_eq!(particles.velocities, velocities);
        assert_eq!(particles.positions[1], Vec2::new(4.5, 5.25));
    }

    #[test]
    fn clamp_keeps_direction() {
        let mut particles = Particles::new(2);
        particles.velocities = vec![Vec2::new(30.0, 40.0), Vec2::new(1.0, 0.0)];
        particles.clamp_velocities(5.0);

        assert!((particles.velocities[0] - Vec2::new(3.0, 4.0)).length() < 1e-5);
        assert_eq!(particles.velocities[1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn collision_pushes_to_surface() {
        let floor = Wall::new(Vec2::new(0.0, 10.0), Vec2::X);
        let mut particles = Particles::new(1);
        particles.previous[0] = Vec2::new(50.0, 14.0);
        particles.positions[0] = Vec2::new(50.0, 8.0);

        assert!(particles.resolve_collision(0, &floor, 5.0, 0.5));
        assert!((particles.positions[0] - Vec2::new(50.0, 15.0)).length() < 1e-5);
        assert!(!particles.resolve_collision(0, &floor, 5.0, 0.5));
    }

    #[test]
    fn friction_opposes_tangential_motion() {
        let floor = Wall::new(Vec2::new(0.0, 10.0), Vec2::X);
        let mut particles = Particles::new(1);
        particles.previous[0] = Vec2::new(40.0, 12.0);
        particles.positions[0] = Vec2::new(50.0, 11.0);

        particles.resolve_collision(0, &floor, 5.0, 0.5);
        assert!((particles.positions[0] - Vec2::new(45.0, 15.0)).length() < 1e-5);
    }

    #[test]
    fn collision_leaves_no_penetration() {
        let radius = 5.0;
        let colliders = [
            Obstacle::from(Sphere::new(Vec2::new(100.0, 100.0), 40.0)),
            Obstacle::from(Capsule::new(Vec2::new(60.0, 60.0), Vec2::new(140.0, 90.0), 12.0)),
        ];

        for collider in colliders.iter() {
            let mut particles = Particles::new(64);
            for i in 0..particles.len() {
                let angle = i as f32 * 0.37;
                let p = Vec2::new(100.0, 100.0) + Vec2::from_angle(angle) * ((i + 1) as f32 * 0.9);
                particles.positions[i] = p;
                particles.previous[i] = p - Vec2::from_angle(angle * 1.7) * 3.0;
            }

            for i in 0..particles.len() {
                particles.resolve_collision(i, collider, radius, 0.5);
                let distance = collider.sdf(particles.positions[i]).distance;
                assert!(distance >= radius - 1e-3, "particle {i} at distance {distance}");
            }
        }
    }

    #[test]
    fn radial_force_falls_off() {
        let mut particles = Particles::new(3);
        particles.positions = vec![Vec2::new(10.0, 0.0), Vec2::new(0.0, 40.0), Vec2::new(0.0, 60.0)];
        particles.apply_radial_force(Vec2::ZERO, 2.0, 50.0);

        assert!((particles.velocities[0] - Vec2::new(1.6, 0.0)).length() < 1e-5);
        assert!((particles.velocities[1] - Vec2::new(0.0, 0.4)).length() < 1e-5);
        assert_eq!(particles.velocities[2], Vec2::ZERO);
    }

    #[test]
    fn radial_force_skips_center() {
        let mut particles = Particles::new(1);
        particles.apply_radial_force(Vec2::ZERO, 1.0, 50.0);
        assert_eq!(particles.velocities[0], Vec2::ZERO);
    }

    #[test]
    fn line_force_covers_half_length_circle() {
        let mut particles = Particles::new(3);
        particles.positions = vec![Vec2::new(50.0, 0.0), Vec2::new(50.0, 45.0), Vec2::new(50.0, 60.0)];
        particles.apply_line_force(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 3.0);

        assert_eq!(particles.velocities[0], Vec2::new(3.0, 0.0));
        assert_eq!(particles.velocities[1], Vec2::new(3.0, 0.0));
        assert_eq!(particles.velocities[2], Vec2::ZERO);
    }

    #[test]
    fn zero_length_line_force_is_ignored() {
        let mut particles = Particles::new(1);
        particles.apply_line_force(Vec2::ONE, Vec2::ONE, 3.0);
        assert_eq!(particles.velocities[0], Vec2::ZERO);
    }
}
