use glam::Vec2;
use log::debug;

use super::{
    obstacle::{Obstacle, ObstacleId, ObstacleSet, SourceAndSink},
    overlay::{OverlaySettings, Primitive},
    params::{ConfigError, FluidParams},
    springs::SpringNetwork,
    viscoelastic::{Probe, ViscoelasticFluid},
    Fluid,
};

pub struct Scene<F, P> {
    /// The fluid for this scene.
    pub fluid: F,
    /// The parameters for this scene's fluid.
    params: P,
    /// The obstacles and sinks in this scene.
    obstacles: ObstacleSet,
    /// Debug layers to draw.
    pub overlays: OverlaySettings,
}

/// The viscoelastic fluid with its parameters and obstacles.
pub type Simulation = Scene<ViscoelasticFluid, FluidParams>;

impl<F: Fluid<Params = P>, P> Scene<F, P> {
    #[inline(always)]
    pub fn new(fluid: F, params: P) -> Self {
        Self {
            params,
            fluid,
            obstacles: ObstacleSet::default(),
            overlays: OverlaySettings::default(),
        }
    }

    #[inline(always)]
    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Adds an obstacle to the scene, returning its ID.
    pub fn add_obstacle(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        self.obstacles.add_obstacle(obstacle)
    }

    pub fn add_sink(&mut self, sink: SourceAndSink) {
        self.obstacles.add_sink(sink);
    }

    pub fn step(&mut self, dt: f32) {
        self.fluid.step(
            dt,
            &self.params,
            &self.obstacles,
        );
    }
}

impl Scene<ViscoelasticFluid, FluidParams> {
    /// A scene of `capacity` particles at the origin, with no obstacles.
    pub fn try_new(capacity: usize, params: FluidParams) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::Empty);
        }
        params.validate()?;

        debug!(
            "new simulation: {} particles, H = {}, particle radius = {}",
            capacity, params.interaction_radius, params.particle_radius,
        );

        let mut scene = Self::new(ViscoelasticFluid::new(capacity), params);
        scene.overlays.draw_radius = 2.0 * scene.params.particle_radius;
        Ok(scene)
    }

    pub fn positions(&self) -> &[Vec2] {
        self.fluid.positions()
    }

    pub fn velocities(&self) -> &[Vec2] {
        self.fluid.velocities()
    }

    pub fn springs(&self) -> &SpringNetwork {
        self.fluid.springs()
    }

    pub fn apply_radial_force(&mut self, center: Vec2, force: f32, radius: f32) {
        self.fluid.apply_radial_force(center, force, radius);
    }

    pub fn apply_line_force(&mut self, from: Vec2, to: Vec2, force: f32) {
        self.fluid.apply_line_force(from, to, force);
    }

    pub fn probe(&mut self, point: Vec2) -> Probe {
        self.fluid.probe(point, &self.params, &self.obstacles)
    }

    /// Shapes for the enabled overlays.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.overlays.primitives(&self.fluid, &self.params)
    }
}
