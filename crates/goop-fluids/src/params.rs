use glam::Vec2;
use thiserror::Error;

/// Fixed increment used to scale gravity, viscosity and density relaxation, independent of the
/// `dt` handed to `step`.
pub const INTERNAL_DT: f32 = 0.015;

/// Constants of the viscoelastic fluid. Fixed for the lifetime of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidParams {
    /// Interaction radius `H`. Also the spatial hash cell size.
    pub interaction_radius: f32,
    /// Pressure stiffness `K`.
    pub stiffness: f32,
    /// Near-pressure stiffness `K_NEAR`.
    pub near_stiffness: f32,
    /// Rest density `P0`.
    pub rest_density: f32,
    /// Stiffness of the elastic spring pass. Only used with `elastic_springs`.
    pub spring_stiffness: f32,
    /// Linear viscosity `σ`. Zero for water.
    pub linear_viscosity: f32,
    /// Quadratic viscosity `β`.
    pub quadratic_viscosity: f32,
    /// Plasticity constant `α`.
    pub plasticity: f32,
    /// Yield ratio `γ`.
    pub yield_ratio: f32,
    /// Collision friction `μ` in `[0, 1]`.
    pub friction: f32,
    /// Collision radius of a particle.
    pub particle_radius: f32,
    pub gravity: Vec2,
    /// Velocity cap applied when `stabilization` is on. Defaults to `H / 3`.
    pub max_velocity: Option<f32>,
    /// Clamp velocities and weight viscosity impulses by particle speed.
    pub stabilization: bool,
    /// Displace spring endpoints towards their rest length after pruning.
    pub elastic_springs: bool,
    pub internal_dt: f32,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            interaction_radius: 15.0,
            stiffness: 100.0,
            near_stiffness: 10_000.0,
            rest_density: 1.0,
            spring_stiffness: 1_000.0,
            linear_viscosity: 100.0,
            quadratic_viscosity: 10.0,
            plasticity: 100.0,
            yield_ratio: 1.0,
            friction: 0.5,
            particle_radius: 5.0,
            gravity: Vec2::new(0.0, -2.0),
            max_velocity: None,
            stabilization: true,
            elastic_springs: false,
            internal_dt: INTERNAL_DT,
        }
    }
}

impl FluidParams {
    /// Sets the interaction radius and derives the particle radius as a third of it.
    pub fn with_interaction_radius(mut self, h: f32) -> Self {
        self.interaction_radius = h;
        self.particle_radius = h / 3.0;
        self
    }

    pub fn with_viscosity(mut self, linear: f32, quadratic: f32) -> Self {
        self.linear_viscosity = linear;
        self.quadratic_viscosity = quadratic;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_stabilization(mut self, stabilization: bool) -> Self {
        self.stabilization = stabilization;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    #[inline]
    pub fn velocity_cap(&self) -> f32 {
        self.max_velocity.unwrap_or(self.interaction_radius / 3.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = self.interaction_radius;
        if !(h.is_finite() && h > 0.0) {
            return Err(ConfigError::InteractionRadius(h));
        }

        if !(self.particle_radius.is_finite() && self.particle_radius >= 0.0) {
            return Err(ConfigError::ParticleRadius(self.particle_radius));
        }

        if !(0.0..=1.0).contains(&self.friction) {
            return Err(ConfigError::Friction(self.friction));
        }

        if !(self.internal_dt.is_finite() && self.internal_dt > 0.0) {
            return Err(ConfigError::InternalStep(self.internal_dt));
        }

        if let Some(cap) = self.max_velocity {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(ConfigError::VelocityCap(cap));
            }
        }

        let constants = [
            ("stiffness", self.stiffness),
            ("near_stiffness", self.near_stiffness),
            ("rest_density", self.rest_density),
            ("spring_stiffness", self.spring_stiffness),
            ("linear_viscosity", self.linear_viscosity),
            ("quadratic_viscosity", self.quadratic_viscosity),
            ("plasticity", self.plasticity),
            ("yield_ratio", self.yield_ratio),
            ("gravity.x", self.gravity.x),
            ("gravity.y", self.gravity.y),
        ];

        for (name, value) in constants {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("interaction radius must be positive and finite, got {0}")]
    InteractionRadius(f32),
    #[error("particle radius must be non-negative and finite, got {0}")]
    ParticleRadius(f32),
    #[error("friction must lie in [0, 1], got {0}")]
    Friction(f32),
    #[error("internal time step must be positive and finite, got {0}")]
    InternalStep(f32),
    #[error("velocity cap must be positive and finite, got {0}")]
    VelocityCap(f32),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("a simulation needs at least one particle")]
    Empty,
    #[error("particle index {index} out of range for {len} particles")]
    ParticleIndex { index: usize, len: usize },
    #[error("wall direction must be non-zero and finite, got {0}")]
    WallDirection(Vec2),
    #[error("obstacle radius must be non-negative and finite, got {0}")]
    ObstacleRadius(f32),
}

/// Checks the radius of a sphere, capsule or source.
pub(crate) fn check_radius(radius: f32) -> Result<f32, ConfigError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(ConfigError::ObstacleRadius(radius))
    }
}
