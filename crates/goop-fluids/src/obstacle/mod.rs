use glam::Vec2;

pub mod capsule;
pub mod sink;
pub mod sphere;
pub mod wall;

pub use capsule::Capsule;
pub use sink::SourceAndSink;
pub use sphere::Sphere;
pub use wall::Wall;

/// A shape that particles are pushed out of.
pub trait Collider {
    fn sdf(&self, p: Vec2) -> Sdf;
}

/// Signed distance from a query point to a shape, together with the outward surface normal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sdf {
    pub distance: f32,
    pub normal: Vec2,
}

impl Sdf {
    pub fn new(distance: f32, normal: Vec2) -> Sdf {
        Sdf { distance, normal }
    }
}

/// A static obstacle. Dispatch happens through a single `match` in the per-particle collision loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Obstacle {
    Wall(Wall),
    Sphere(Sphere),
    Capsule(Capsule),
    SourceAndSink(SourceAndSink),
}

impl Collider for Obstacle {
    #[inline]
    fn sdf(&self, p: Vec2) -> Sdf {
        match self {
            Obstacle::Wall(wall) => wall.sdf(p),
            Obstacle::Sphere(sphere) => sphere.sdf(p),
            Obstacle::Capsule(capsule) => capsule.sdf(p),
            Obstacle::SourceAndSink(sink) => sink.sdf(p),
        }
    }
}

impl From<Wall> for Obstacle {
    fn from(wall: Wall) -> Self {
        Obstacle::Wall(wall)
    }
}

impl From<Sphere> for Obstacle {
    fn from(sphere: Sphere) -> Self {
        Obstacle::Sphere(sphere)
    }
}

impl From<Capsule> for Obstacle {
    fn from(capsule: Capsule) -> Self {
        Obstacle::Capsule(capsule)
    }
}

impl From<SourceAndSink> for Obstacle {
    fn from(sink: SourceAndSink) -> Self {
        Obstacle::SourceAndSink(sink)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObstacleId(pub usize);

/// Solid obstacles plus the source/sink regions that recycle particles.
///
/// Both lists are filled during scenario setup and only read while stepping.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
    sinks: Vec<SourceAndSink>,
}

impl ObstacleSet {
    pub fn new(obstacles: Vec<Obstacle>, sinks: Vec<SourceAndSink>) -> Self {
        ObstacleSet {
            obstacles,
            sinks,
        }
    }

    /// Adds a solid obstacle to the set, returning its ID.
    pub fn add_obstacle(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        self.obstacles.push(obstacle.into());
        ObstacleId(self.obstacles.len() - 1)
    }

    /// Adds a source/sink pair. Sinks never push particles out; they respawn them at the source.
    pub fn add_sink(&mut self, sink: SourceAndSink) {
        self.sinks.push(sink);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn sinks(&self) -> &[SourceAndSink] {
        &self.sinks
    }

    /// The solid obstacle closest to `p`, if there is any.
    pub fn nearest(&self, p: Vec2) -> Option<(ObstacleId, Sdf)> {
        let mut nearest: Option<(ObstacleId, Sdf)> = None;

        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let sd = obstacle.sdf(p);
            if nearest.map_or(true, |(_, best)| best.distance > sd.distance) {
                nearest = Some((ObstacleId(i), sd));
            }
        }

        nearest
    }
}
