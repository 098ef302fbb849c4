use glam::Vec2;
use obstacle::ObstacleSet;

pub mod grid;
pub mod obstacle;
pub mod overlay;
pub mod params;
pub mod particles;
pub mod scenario;
pub mod scene;
pub mod springs;
pub mod viscoelastic;

pub use params::{ConfigError, FluidParams};

pub trait Fluid {
    type Params;

    fn step(&mut self, dt: f32, params: &Self::Params, obstacles: &ObstacleSet);

    fn positions(&self) -> &[Vec2];

    fn velocities(&self) -> &[Vec2];
}
