use glam::{IVec2, Vec2};
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    grid::SpatialHash,
    obstacle::ObstacleSet,
    params::{ConfigError, FluidParams},
    particles::Particles,
    springs::{Plasticity, SpringNetwork},
    Fluid,
};

/// Seed of the generator that jitters respawned particles.
pub const SINK_SEED: u64 = 42;

/// Position-based viscoelastic fluid (double density relaxation with plastic springs).
///
/// The particle count is fixed at construction. Particles swallowed by a sink are moved back to
/// its source under the same index.
#[derive(Debug, Clone)]
pub struct ViscoelasticFluid {
    particles: Particles,
    springs: SpringNetwork,
    grid: SpatialHash,
    /// Velocities as they were before the viscosity pass of the current step.
    velocity_snapshot: Vec<Vec2>,
    /// Unit direction and `1 - q` for each neighbor of the particle being relaxed.
    relax_scratch: Vec<(Vec2, f32)>,
    rng: StdRng,
    frames: u64,
}

/// What lies under a point, as seen through the spatial hash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub cell: IVec2,
    /// Lower corner of the cell.
    pub origin: Vec2,
    pub cell_size: f32,
    /// Number of particles in the cell.
    pub occupancy: usize,
    /// Particle of the cell closest to the point, if the cell is occupied.
    pub nearest: Option<ProbedParticle>,
    /// Signed distance from the point to the closest solid obstacle.
    pub obstacle_distance: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbedParticle {
    pub index: usize,
    /// Other particles within the interaction radius.
    pub neighbors: usize,
}

impl ViscoelasticFluid {
    /// `n_particles` particles at rest at the origin.
    pub fn new(n_particles: usize) -> Self {
        Self {
            particles: Particles::new(n_particles),
            springs: SpringNetwork::new(n_particles),
            grid: SpatialHash::new(),
            velocity_snapshot: Vec::with_capacity(n_particles),
            relax_scratch: Vec::new(),
            rng: StdRng::seed_from_u64(SINK_SEED),
            frames: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of completed steps.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn springs(&self) -> &SpringNetwork {
        &self.springs
    }

    pub fn grid(&self) -> &SpatialHash {
        &self.grid
    }

    /// Places particles at `positions` in index order, returning how many were placed. Extra
    /// positions beyond the particle count are ignored.
    pub fn seed<I: IntoIterator<Item = Vec2>>(&mut self, positions: I) -> usize {
        let mut placed = 0;

        for (slot, p) in self.particles.positions.iter_mut().zip(positions) {
            *slot = p;
            placed += 1;
        }

        self.particles.snapshot_positions();
        placed
    }

    pub fn set_particle(&mut self, i: usize, position: Vec2, velocity: Vec2) -> Result<(), ConfigError> {
        let len = self.len();
        if i >= len {
            return Err(ConfigError::ParticleIndex { index: i, len });
        }

        self.particles.positions[i] = position;
        self.particles.previous[i] = position;
        self.particles.velocities[i] = velocity;

        Ok(())
    }

    pub fn apply_radial_force(&mut self, center: Vec2, force: f32, radius: f32) {
        self.particles.apply_radial_force(center, force, radius);
    }

    pub fn apply_line_force(&mut self, from: Vec2, to: Vec2, force: f32) {
        self.particles.apply_line_force(from, to, force);
    }

    /// Looks up the grid cell under `point` after re-indexing the current positions.
    pub fn probe(&mut self, point: Vec2, params: &FluidParams, obstacles: &ObstacleSet) -> Probe {
        let h = params.interaction_radius;
        self.grid.rebuild(&self.particles.positions, h);

        let cell = self.grid.cell_of(point);
        let positions = &self.particles.positions;

        let mut occupancy = 0;
        let mut nearest: Option<(usize, f32)> = None;
        for i in self.grid.members(cell) {
            occupancy += 1;
            let d = positions[i].distance_squared(point);
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((i, d));
            }
        }

        let nearest = nearest.map(|(index, _)| ProbedParticle {
            index,
            neighbors: self
                .grid
                .neighbors(index, |a, b| a != b)
                .filter(|&j| positions[j].distance(positions[index]) < h)
                .count(),
        });

        Probe {
            cell,
            origin: cell.as_vec2() * self.grid.cell_size(),
            cell_size: self.grid.cell_size(),
            occupancy,
            nearest,
            obstacle_distance: obstacles.nearest(point).map(|(_, sdf)| sdf.distance),
        }
    }

    fn rebuild_grid(&mut self, params: &FluidParams) {
        self.grid.rebuild(&self.particles.positions, params.interaction_radius);
    }

    /// Radial viscosity impulses between approaching neighbors.
    fn apply_viscosity(&mut self, params: &FluidParams) {
        let h = params.interaction_radius;
        let dt = params.internal_dt;

        self.velocity_snapshot.clear();
        self.velocity_snapshot.extend_from_slice(&self.particles.velocities);

        let Self { particles, grid, velocity_snapshot, .. } = self;

        for i in 0..particles.len() {
            for j in grid.neighbors(i, |a, b| a < b) {
                let delta = particles.positions[j] - particles.positions[i];
                let r = delta.length();
                if r <= 0.0 {
                    continue;
                }

                let q = r / h;
                if q >= 1.0 {
                    continue;
                }

                let dir = delta / r;
                // Inward radial velocity.
                let u = (velocity_snapshot[i] - velocity_snapshot[j]).dot(dir);
                if u <= 0.0 {
                    continue;
                }

                let impulse = dir * dt * (1.0 - q)
                    * (params.linear_viscosity * u + params.quadratic_viscosity * u * u);

                let weight = if params.stabilization {
                    speed_weight(particles.velocities[i], particles.velocities[j])
                } else {
                    0.5
                };

                particles.velocities[i] -= impulse * weight;
                particles.velocities[j] += impulse * (1.0 - weight);
            }
        }
    }

    /// Creates springs for new close pairs and lets existing ones yield.
    fn adapt_springs(&mut self, params: &FluidParams, dt: f32) {
        let h = params.interaction_radius;
        let plasticity = Plasticity {
            yield_ratio: params.yield_ratio,
            rate: params.plasticity,
            dt,
        };

        let Self { particles, grid, springs, .. } = self;

        for i in 0..particles.len() {
            for j in grid.neighbors(i, |a, b| a < b) {
                let r = particles.distance(i, j);
                if r < h {
                    springs.adapt(i, j, r, h, &plasticity);
                }
            }
        }
    }

    /// Pulls spring endpoints towards their rest length.
    fn apply_spring_displacement(&mut self, params: &FluidParams, dt: f32) {
        let h = params.interaction_radius;
        let Self { particles, springs, .. } = self;

        for spring in springs.iter() {
            let delta = particles.positions[spring.b] - particles.positions[spring.a];
            let r = delta.length();
            if r <= 0.0 {
                continue;
            }

            let l = spring.rest_length;
            let d = dt * dt * params.spring_stiffness * (1.0 - l / h) * (l - r) * (delta / r);

            particles.positions[spring.a] -= 0.5 * d;
            particles.positions[spring.b] += 0.5 * d;
        }
    }

    /// Double density relaxation.
    ///
    /// Only the particle being processed moves, and it moves before the next one gathers its
    /// neighbors, so the result depends on particle order.
    fn relax_density(&mut self, params: &FluidParams) {
        let h = params.interaction_radius;
        let dt2 = params.internal_dt * params.internal_dt;

        let Self { particles, grid, relax_scratch, .. } = self;

        for i in 0..particles.len() {
            let p = particles.positions[i];

            relax_scratch.clear();
            for j in grid.neighbors(i, |a, b| a != b) {
                let delta = particles.positions[j] - p;
                let r = delta.length();
                let q = r / h;

                if q < 1.0 && r > 0.0 {
                    relax_scratch.push((delta / r, 1.0 - q));
                }
            }

            // Near density accumulates the running density, so it depends on gather order.
            let mut density = 0.0;
            let mut density_near = 0.0;
            for &(_, inv_q) in relax_scratch.iter() {
                density += inv_q * inv_q;
                density_near += density * inv_q;
            }

            let pressure = params.stiffness * (density - params.rest_density);
            let pressure_near = params.near_stiffness * density_near;

            let mut displacement = Vec2::ZERO;
            for &(dir, inv_q) in relax_scratch.iter() {
                let factor = dt2 * inv_q * (pressure + pressure_near * inv_q) * 0.5;
                displacement -= dir * factor;
            }

            particles.positions[i] += displacement;
        }
    }

    fn resolve_collisions(&mut self, params: &FluidParams, obstacles: &ObstacleSet) {
        for i in 0..self.particles.len() {
            for obstacle in obstacles.obstacles() {
                self.particles.resolve_collision(i, obstacle, params.particle_radius, params.friction);
            }
        }
    }

    /// Moves every particle that crossed into a sink to a jittered point around its source.
    fn recycle_sinks(&mut self, obstacles: &ObstacleSet) -> usize {
        let mut recycled = 0;

        for i in 0..self.particles.len() {
            for sink in obstacles.sinks() {
                if sink.swallows(self.particles.positions[i]) {
                    let jitter = Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5);

                    self.particles.positions[i] = sink.source + jitter * 2.0 * sink.source_radius;
                    self.particles.velocities[i] = sink.velocity;
                    recycled += 1;
                }
            }
        }

        recycled
    }
}

/// Share of a viscosity impulse taken by the first particle: its fraction of the pair's speed.
#[inline]
fn speed_weight(v: Vec2, other: Vec2) -> f32 {
    let speed = v.length();
    let total = speed + other.length();

    if total > 0.0 {
        speed / total
    } else {
        0.5
    }
}

impl Fluid for ViscoelasticFluid {
    type Params = FluidParams;

    /// Advances one frame. Gravity, viscosity and density relaxation are scaled by
    /// `params.internal_dt`; `dt` only drives plasticity and the elastic spring pass.
    fn step(&mut self, dt: f32, params: &Self::Params, obstacles: &ObstacleSet) {
        self.frames += 1;

        self.particles.accelerate(params.gravity * params.internal_dt);

        self.rebuild_grid(params);
        self.apply_viscosity(params);

        if params.stabilization {
            self.particles.clamp_velocities(params.velocity_cap());
        }

        self.particles.snapshot_positions();
        self.particles.advect();

        self.rebuild_grid(params);
        self.adapt_springs(params, dt);
        let pruned = self.springs.prune(&self.particles.positions, params.interaction_radius);

        if params.elastic_springs {
            self.apply_spring_displacement(params, dt);
        }

        self.rebuild_grid(params);
        self.relax_density(params);

        self.resolve_collisions(params, obstacles);
        self.particles.reconstruct_velocities();

        let recycled = self.recycle_sinks(obstacles);

        trace!(
            "frame {}: {} springs ({} pruned), {} particles recycled",
            self.frames,
            self.springs.len(),
            pruned,
            recycled,
        );
    }

    fn positions(&self) -> &[Vec2] {
        &self.particles.positions
    }

    fn velocities(&self) -> &[Vec2] {
        &self.particles.velocities
    }
}
