use std::fmt;

use glam::Vec2;
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    obstacle::{Capsule, SourceAndSink, Sphere, Wall},
    params::{ConfigError, FluidParams},
    scene::Simulation,
    viscoelastic::SINK_SEED,
};

/// Preset scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// A jittered block of syrup.
    HighViscosity,
    /// The same block as water.
    LowViscosity,
    /// A single column of particles settling on the floor.
    Stack(usize),
    /// Two particles fired at each other without gravity.
    TwoParticles,
    /// A blob of water dropped into a shallow pool.
    Splash,
    /// Water poured over capsules spelling "END".
    End,
    /// Water falling through two funnels into a pool drained by sinks.
    SourceSink,
    /// Sinks in the floor corners feed a jet in the middle.
    Fountain,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::HighViscosity,
        Scenario::LowViscosity,
        Scenario::Stack(1000),
        Scenario::Stack(100),
        Scenario::Stack(20),
        Scenario::TwoParticles,
        Scenario::Splash,
        Scenario::End,
        Scenario::SourceSink,
        Scenario::Fountain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::HighViscosity => "high-viscosity",
            Scenario::LowViscosity => "low-viscosity",
            Scenario::Stack(_) => "stack",
            Scenario::TwoParticles => "two-particles",
            Scenario::Splash => "splash",
            Scenario::End => "end",
            Scenario::SourceSink => "source-sink",
            Scenario::Fountain => "fountain",
        }
    }

    /// Particle count of the preset.
    pub fn capacity(&self) -> usize {
        match self {
            Scenario::HighViscosity | Scenario::LowViscosity | Scenario::End | Scenario::SourceSink => 4_000,
            Scenario::Stack(n) => *n,
            Scenario::TwoParticles => 2,
            Scenario::Splash => 2_200,
            Scenario::Fountain => 3_256,
        }
    }

    pub fn build(&self) -> Result<Simulation, ConfigError> {
        self.build_with_capacity(self.capacity())
    }

    /// Builds the preset with `capacity` particles. Layouts that place fewer particles leave the
    /// rest at the origin; layouts that would place more are cut off.
    pub fn build_with_capacity(&self, capacity: usize) -> Result<Simulation, ConfigError> {
        let params = self.params();
        let h = params.interaction_radius;
        let mut sim = Simulation::try_new(capacity, params)?;

        add_containment(&mut sim)?;

        let placed = match self {
            Scenario::HighViscosity | Scenario::LowViscosity => {
                sim.fluid.seed(jittered_block(capacity, h, &mut StdRng::seed_from_u64(SINK_SEED)))
            }
            Scenario::Stack(_) => {
                sim.overlays.draw_radius = sim.params().particle_radius;
                sim.fluid.seed((0..capacity).map(|y| Vec2::new(60.0, y as f32 * h * 0.7 + 10.0 + h / 2.0)))
            }
            Scenario::TwoParticles => {
                sim.overlays.draw_radius = sim.params().particle_radius;
                sim.overlays.velocity_stretch = 1.0;

                let velocities = [Vec2::new(50.0, 0.0), Vec2::new(-50.0, 0.0)];
                let positions = [Vec2::new(100.0, 100.0), Vec2::new(200.0, 101.0)];
                for (i, (p, v)) in positions.into_iter().zip(velocities).enumerate().take(capacity) {
                    sim.fluid.set_particle(i, p, v)?;
                }
                positions.len().min(capacity)
            }
            Scenario::Splash => sim.fluid.seed(
                columns((20..780).step_by(9), (20..200).step_by(9))
                    .chain(columns((250..450).step_by(10), (350..600).step_by(10))),
            ),
            Scenario::End => {
                add_letters(&mut sim)?;
                sim.fluid.seed(
                    columns((20..780).step_by(9), (20..200).step_by(9))
                        .chain(columns((20..780).step_by(9), (600..900).step_by(9))),
                )
            }
            Scenario::SourceSink => {
                add_funnels(&mut sim)?;
                sim.fluid.seed(rows((550..900).step_by(7), (20..780).step_by(7)))
            }
            Scenario::Fountain => {
                add_fountain(&mut sim)?;
                sim.fluid.seed((20..150).step_by(6).flat_map(|y| {
                    let left = (20..390).step_by(5);
                    let right = (415..=780).rev().step_by(5);
                    left.chain(right).map(move |x| Vec2::new(x as f32, y as f32))
                }))
            }
        };

        if placed < capacity {
            warn!(
                "{} layout placed {} of {} particles, the rest start at the origin",
                self.name(),
                placed,
                capacity,
            );
        }

        info!(
            "built {} scene: {} particles, {} obstacles, {} sinks",
            self.name(),
            capacity,
            sim.obstacles().obstacles().len(),
            sim.obstacles().sinks().len(),
        );

        Ok(sim)
    }

    pub fn params(&self) -> FluidParams {
        let water = FluidParams::default().with_viscosity(0.0, 5.0);

        match self {
            Scenario::HighViscosity => FluidParams::default(),
            Scenario::LowViscosity => water,
            Scenario::Stack(_) => FluidParams::default()
                .with_interaction_radius(40.0)
                .with_stabilization(false),
            Scenario::TwoParticles => FluidParams {
                rest_density: 0.0,
                near_stiffness: 200_000.0,
                ..FluidParams::default()
                    .with_interaction_radius(50.0)
                    .with_stabilization(false)
                    .with_gravity(Vec2::ZERO)
            },
            Scenario::Splash => water.with_stabilization(false),
            Scenario::End => water.with_stabilization(true).with_friction(0.1),
            Scenario::SourceSink => water.with_friction(0.05).with_interaction_radius(13.0),
            Scenario::Fountain => FluidParams {
                rest_density: 3.0,
                ..water
                    .with_friction(0.05)
                    .with_stabilization(false)
                    .with_interaction_radius(10.0)
            },
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Stack(n) => write!(f, "stack ({n})"),
            _ => f.write_str(self.name()),
        }
    }
}

/// Floor plus left and right walls of the 800 wide domain.
fn add_containment(sim: &mut Simulation) -> Result<(), ConfigError> {
    sim.add_obstacle(Wall::try_new(Vec2::new(0.0, 10.0), Vec2::new(20.0, 0.0))?);
    sim.add_obstacle(Wall::try_new(Vec2::new(10.0, 0.0), Vec2::new(0.0, -10.0))?);
    sim.add_obstacle(Wall::try_new(Vec2::new(790.0, 0.0), Vec2::new(0.0, 10.0))?);
    Ok(())
}

fn capsule(x0: f32, y0: f32, x1: f32, y1: f32, radius: f32) -> Result<Capsule, ConfigError> {
    Capsule::try_new(Vec2::new(x0, y0), Vec2::new(x1, y1), radius)
}

fn add_letters(sim: &mut Simulation) -> Result<(), ConfigError> {
    let r = 10.0;

    // E
    sim.add_obstacle(capsule(129.0, 465.0, 151.0, 200.0, r)?);
    sim.add_obstacle(capsule(129.0, 465.0, 225.0, 482.0, r)?);
    sim.add_obstacle(capsule(140.0, 332.5, 249.0, 316.0, r)?);
    sim.add_obstacle(capsule(151.0, 200.0, 257.0, 183.0, r)?);

    // N
    sim.add_obstacle(capsule(403.0, 488.0, 495.0, 252.0, r)?);
    sim.add_obstacle(capsule(495.0, 252.0, 270.0, 456.0, r)?);
    sim.add_obstacle(capsule(270.0, 456.0, 315.0, 225.0, r)?);

    // D
    sim.add_obstacle(capsule(591.0, 490.0, 549.0, 250.0, r)?);
    sim.add_obstacle(capsule(591.0, 490.0, 683.0, 365.0, r)?);
    sim.add_obstacle(capsule(683.0, 365.0, 549.0, 250.0, r)?);
    Ok(())
}

fn add_funnels(sim: &mut Simulation) -> Result<(), ConfigError> {
    let r = 10.0;

    sim.add_obstacle(Sphere::try_new(Vec2::new(400.0, 0.0), 60.0)?);

    sim.add_obstacle(capsule(583.0, 470.0, 544.0, 392.0, r)?);
    sim.add_obstacle(capsule(555.0, 335.0, 544.0, 392.0, r)?);
    sim.add_obstacle(capsule(555.0, 335.0, 700.0, 330.0, r)?);
    sim.add_obstacle(capsule(583.0, 470.0, 700.0, 330.0, r)?);

    sim.add_obstacle(capsule(232.0, 469.0, 300.0, 370.0, r)?);
    sim.add_obstacle(capsule(200.0, 327.0, 300.0, 370.0, r)?);
    sim.add_obstacle(capsule(200.0, 327.0, 120.0, 425.0, r)?);
    sim.add_obstacle(capsule(232.0, 469.0, 120.0, 425.0, r)?);

    sim.add_sink(SourceAndSink::try_new(
        capsule(10.0, 10.0, 30.0, 10.0, 10.0)?,
        Vec2::new(250.0, 550.0),
        25.0,
        Vec2::new(2.0, -4.0),
    )?);
    sim.add_sink(SourceAndSink::try_new(
        capsule(790.0, 10.0, 770.0, 10.0, 10.0)?,
        Vec2::new(550.0, 550.0),
        25.0,
        Vec2::new(-2.0, -4.0),
    )?);
    Ok(())
}

fn add_fountain(sim: &mut Simulation) -> Result<(), ConfigError> {
    let r = 10.0;
    let center = Vec2::new(400.0, 150.0);

    sim.add_obstacle(capsule(400.0, center.y - 4.0 * r, 400.0, center.y - 2.0 * r, r)?);

    for x in [10.0, 790.0] {
        sim.add_sink(SourceAndSink::try_new(capsule(x, 10.0, x, 20.0, 5.0)?, center, r, Vec2::new(0.0, 5.0))?);
    }
    Ok(())
}

/// `ceil(n / 40)` rows by 40 columns at `0.7 * h` spacing, filled column by column, each position
/// jittered by up to `0.2 * h`.
fn jittered_block<'a>(n: usize, h: f32, rng: &'a mut StdRng) -> impl Iterator<Item = Vec2> + 'a {
    const SIDE: usize = 40;
    let rows = n.div_ceil(SIDE);

    (0..SIDE)
        .flat_map(move |x| (0..rows).map(move |y| (x, y)))
        .take(n)
        .map(move |(x, y)| {
            let offset = 10.0 + h / 2.0;
            let px = x as f32 * h * 0.7 + offset + rng.gen::<f32>() * h * 0.2;
            let py = y as f32 * h * 0.7 + offset + rng.gen::<f32>() * h * 0.2;
            Vec2::new(px, py)
        })
}

/// Integer lattice with `xs` in the outer loop.
fn columns<X, Y>(xs: X, ys: Y) -> impl Iterator<Item = Vec2>
where
    X: Iterator<Item = i32>,
    Y: Iterator<Item = i32> + Clone,
{
    xs.flat_map(move |x| ys.clone().map(move |y| Vec2::new(x as f32, y as f32)))
}

/// Integer lattice with `ys` in the outer loop.
fn rows<Y, X>(ys: Y, xs: X) -> impl Iterator<Item = Vec2>
where
    Y: Iterator<Item = i32>,
    X: Iterator<Item = i32> + Clone,
{
    ys.flat_map(move |y| xs.clone().map(move |x| Vec2::new(x as f32, y as f32)))
}
