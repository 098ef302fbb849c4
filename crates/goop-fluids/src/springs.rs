use glam::Vec2;
use smallvec::SmallVec;

/// A plastic spring between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
}

/// Yield rule of the plastic springs: the rest length `l` only drifts towards the measured length
/// `r` once the deformation leaves the band `l ± yield_ratio * l`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plasticity {
    pub yield_ratio: f32,
    /// Plasticity constant `α`.
    pub rate: f32,
    pub dt: f32,
}

impl Plasticity {
    #[inline]
    pub fn rest_length(&self, l: f32, r: f32) -> f32 {
        let d = self.yield_ratio * l;

        if r > l + d {
            l + self.dt * self.rate * (r - l - d)
        } else if r < l - d {
            l - self.dt * self.rate * (l - d - r)
        } else {
            l
        }
    }
}

type EdgeList = SmallVec<[usize; 16]>;

/// Sparse set of springs, stored as an arena of edges plus a per-particle list of the edges that
/// touch it.
#[derive(Debug, Clone, Default)]
pub struct SpringNetwork {
    edges: Vec<Spring>,
    adjacency: Vec<EdgeList>,
}

impl SpringNetwork {
    pub fn new(n_particles: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![EdgeList::new(); n_particles],
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spring> {
        self.edges.iter()
    }

    /// Springs attached to particle `i`.
    pub fn attached(&self, i: usize) -> impl Iterator<Item = &Spring> {
        self.adjacency[i].iter().map(|&e| &self.edges[e])
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    fn find(&self, a: usize, b: usize) -> Option<usize> {
        let (from, other) = if self.adjacency[a].len() <= self.adjacency[b].len() { (a, b) } else { (b, a) };

        self.adjacency[from].iter().copied().find(|&e| {
            let edge = &self.edges[e];
            edge.a == other || edge.b == other
        })
    }

    /// Rest length of the spring between `a` and `b`, looked up from either side.
    pub fn rest_length(&self, a: usize, b: usize) -> Option<f32> {
        self.find(a, b).map(|e| self.edges[e].rest_length)
    }

    /// Inserts a spring between two distinct particles, returning its arena index.
    pub fn insert(&mut self, a: usize, b: usize, rest_length: f32) -> usize {
        debug_assert!(a != b);
        debug_assert!(self.find(a, b).is_none(), "duplicate spring ({a}, {b})");

        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let e = self.edges.len();

        self.edges.push(Spring { a, b, rest_length });
        self.adjacency[a].push(e);
        self.adjacency[b].push(e);

        e
    }

    /// Removes the spring at arena index `e`. The last spring takes its slot.
    fn remove_at(&mut self, e: usize) {
        let removed = self.edges.swap_remove(e);
        Self::unlink(&mut self.adjacency[removed.a], e);
        Self::unlink(&mut self.adjacency[removed.b], e);

        let moved_from = self.edges.len();
        if e < moved_from {
            let moved = self.edges[e];
            Self::relink(&mut self.adjacency[moved.a], moved_from, e);
            Self::relink(&mut self.adjacency[moved.b], moved_from, e);
        }
    }

    pub fn remove(&mut self, a: usize, b: usize) -> Option<Spring> {
        let e = self.find(a, b)?;
        let spring = self.edges[e];
        self.remove_at(e);
        Some(spring)
    }

    fn unlink(list: &mut EdgeList, e: usize) {
        if let Some(slot) = list.iter().position(|&x| x == e) {
            list.swap_remove(slot);
        }
    }

    fn relink(list: &mut EdgeList, from: usize, to: usize) {
        if let Some(slot) = list.iter_mut().find(|x| **x == from) {
            *slot = to;
        }
    }

    /// Creates the spring between `a` and `b` at rest length `h` if it is missing, then applies
    /// the yield rule for the measured distance `r`.
    pub fn adapt(&mut self, a: usize, b: usize, r: f32, h: f32, plasticity: &Plasticity) {
        let e = match self.find(a, b) {
            Some(e) => e,
            None => self.insert(a, b, h),
        };

        let spring = &mut self.edges[e];
        spring.rest_length = plasticity.rest_length(spring.rest_length, r);
    }

    /// Removes every spring whose endpoints are further apart than `h`.
    pub fn prune(&mut self, positions: &[Vec2], h: f32) -> usize {
        let before = self.edges.len();
        let mut e = 0;

        while e < self.edges.len() {
            let Spring { a, b, .. } = self.edges[e];
            if positions[a].distance(positions[b]) > h {
                // The last spring moves into slot `e`, check it next.
                self.remove_at(e);
            } else {
                e += 1;
            }
        }

        before - self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_consistency(network: &SpringNetwork) {
        for (e, spring) in network.edges.iter().enumerate() {
            assert!(spring.a < spring.b);
            assert!(network.adjacency[spring.a].contains(&e));
            assert!(network.adjacency[spring.b].contains(&e));
        }

        let total: usize = network.adjacency.iter().map(|l| l.len()).sum();
        assert_eq!(total, 2 * network.len());
    }

    #[test]
    fn yield_band_is_elastic() {
        let rule = Plasticity { yield_ratio: 0.5, rate: 100.0, dt: 0.03 };
        assert_eq!(rule.rest_length(10.0, 12.0), 10.0);
        assert_eq!(rule.rest_length(10.0, 6.0), 10.0);
    }

    #[test]
    fn yield_rule_stretches_and_compresses() {
        let rule = Plasticity { yield_ratio: 0.1, rate: 10.0, dt: 0.01 };

        let stretched = rule.rest_length(10.0, 20.0);
        assert!((stretched - (10.0 + 0.1 * 9.0)).abs() < 1e-5);

        let compressed = rule.rest_length(10.0, 4.0);
        assert!((compressed - (10.0 - 0.1 * 5.0)).abs() < 1e-5);
    }

    #[test]
    fn lookup_from_either_side() {
        let mut network = SpringNetwork::new(4);
        network.insert(2, 1, 7.0);

        assert_eq!(network.rest_length(1, 2), Some(7.0));
        assert_eq!(network.rest_length(2, 1), Some(7.0));
        assert_eq!(network.rest_length(0, 1), None);
        assert_eq!(network.iter().next().map(|s| (s.a, s.b)), Some((1, 2)));
    }

    #[test]
    fn adapt_creates_at_interaction_radius() {
        let mut network = SpringNetwork::new(3);
        network.adapt(0, 2, 5.0, 15.0, &Plasticity { yield_ratio: 1.0, rate: 100.0, dt: 0.03 });

        assert_eq!(network.rest_length(0, 2), Some(15.0));
        assert_eq!(network.degree(0), 1);
        assert_eq!(network.degree(1), 0);
    }

    #[test]
    fn remove_keeps_indices_consistent() {
        let mut network = SpringNetwork::new(6);
        for (a, b) in [(0, 1), (0, 2), (1, 3), (2, 4), (4, 5), (3, 5)] {
            network.insert(a, b, 1.0);
        }

        assert!(network.remove(0, 2).is_some());
        assert!(network.remove(5, 3).is_some());
        assert!(network.remove(0, 2).is_none());
        check_consistency(&network);

        assert_eq!(network.len(), 4);
        assert_eq!(network.rest_length(4, 5), Some(1.0));
        assert_eq!(network.attached(0).count(), 1);
    }

    #[test]
    fn prune_drops_only_long_springs() {
        let positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(40.0, 0.0),
            Vec2::new(0.0, 15.0),
        ];
        let mut network = SpringNetwork::new(positions.len());
        network.insert(0, 1, 15.0);
        network.insert(0, 2, 15.0);
        network.insert(1, 2, 15.0);
        network.insert(0, 3, 15.0);

        assert_eq!(network.prune(&positions, 15.0), 2);
        check_consistency(&network);

        for spring in network.iter() {
            assert!(positions[spring.a].distance(positions[spring.b]) <= 15.0);
        }
        assert!(network.rest_length(0, 3).is_some());
        assert!(network.rest_length(0, 1).is_some());
    }
}
