use glam::Vec2;

use crate::{params::FluidParams, viscoelastic::ViscoelasticFluid, Fluid};

bitflags::bitflags! {
    /// Debug layers drawn on top of the fluid.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct Overlays: u32 {
        const PARTICLES = 1 << 0;
        const VELOCITY = 1 << 1;
        const INTERACTION_RADIUS = 1 << 2;
        const SPRINGS = 1 << 3;

        /// Layers switched together by [`Overlays::toggle_stats`].
        const STATS = Self::VELOCITY.bits() | Self::INTERACTION_RADIUS.bits() | Self::SPRINGS.bits();
    }
}

impl Overlays {
    /// Flips velocity, spring and interaction radius layers as one.
    pub fn toggle_stats(&mut self) {
        if self.intersects(Self::STATS) {
            self.remove(Self::STATS);
        } else {
            self.insert(Self::STATS);
        }
    }
}

impl Default for Overlays {
    fn default() -> Self {
        Self::PARTICLES
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub flags: Overlays,
    /// Scale applied to velocity vectors before drawing.
    pub velocity_stretch: f32,
    /// Radius particles are drawn with.
    pub draw_radius: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            flags: Overlays::default(),
            velocity_stretch: 10.0,
            draw_radius: 10.0,
        }
    }
}

/// A renderer-agnostic shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Disc { center: Vec2, radius: f32 },
    Circle { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2 },
}

impl OverlaySettings {
    /// Shapes for every enabled layer, layer by layer.
    pub fn primitives(&self, fluid: &ViscoelasticFluid, params: &FluidParams) -> Vec<Primitive> {
        let positions = fluid.positions();
        let mut out = Vec::new();

        if self.flags.contains(Overlays::INTERACTION_RADIUS) {
            out.extend(positions.iter().map(|&center| Primitive::Circle {
                center,
                radius: params.interaction_radius,
            }));
        }

        if self.flags.contains(Overlays::PARTICLES) {
            out.extend(positions.iter().map(|&center| Primitive::Disc {
                center,
                radius: self.draw_radius,
            }));
        }

        if self.flags.contains(Overlays::SPRINGS) {
            out.extend(fluid.springs().iter().map(|s| Primitive::Line {
                from: positions[s.a],
                to: positions[s.b],
            }));
        }

        if self.flags.contains(Overlays::VELOCITY) {
            out.extend(positions.iter().zip(fluid.velocities()).map(|(&p, &v)| Primitive::Line {
                from: p,
                to: p + v * self.velocity_stretch,
            }));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_toggle_together() {
        let mut flags = Overlays::PARTICLES;
        flags.toggle_stats();
        assert_eq!(flags, Overlays::all());

        flags.toggle_stats();
        assert_eq!(flags, Overlays::PARTICLES);

        // Any stats layer on counts as on.
        let mut flags = Overlays::SPRINGS;
        flags.toggle_stats();
        assert!(flags.is_empty());
    }

    #[test]
    fn primitives_follow_flags() {
        let mut fluid = ViscoelasticFluid::new(2);
        fluid.set_particle(0, Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)).unwrap();
        fluid.set_particle(1, Vec2::new(50.0, 0.0), Vec2::ZERO).unwrap();
        let params = FluidParams::default();

        let settings = OverlaySettings::default();
        assert_eq!(settings.primitives(&fluid, &params).len(), 2);

        let settings = OverlaySettings {
            flags: Overlays::VELOCITY,
            velocity_stretch: 3.0,
            ..Default::default()
        };
        let shapes = settings.primitives(&fluid, &params);
        assert_eq!(
            shapes[0],
            Primitive::Line { from: Vec2::ZERO, to: Vec2::new(3.0, 0.0) },
        );
    }
}
