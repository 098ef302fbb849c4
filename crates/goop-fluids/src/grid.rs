use std::collections::HashMap;

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

/// Hashes a cell coordinate into a bucket key.
///
/// Distinct cells may share a key. Bucket members are always checked against the cell recorded
/// for them at the last rebuild, so a shared key only costs a few extra comparisons.
#[inline]
pub fn cell_hash(cell: IVec2) -> i32 {
    const P1: i32 = 73_856_093;
    const P2: i32 = 19_349_663;

    cell.x.wrapping_mul(P1) ^ cell.y.wrapping_mul(P2)
}

/// Whether two cells touch, including diagonally. Saturated cells at the grid edge compare
/// without overflow.
#[inline]
fn adjacent(a: IVec2, b: IVec2) -> bool {
    (a.as_i64vec2() - b.as_i64vec2()).abs().max_element() <= 1
}

/// Uniform spatial hash over particle indices.
///
/// The grid is a cache of particle positions: it is cleared and repopulated from scratch on every
/// [`rebuild`](SpatialHash::rebuild) and never updated incrementally.
#[derive(Debug, Clone, Default)]
pub struct SpatialHash {
    cell_size: f32,
    /// Particle indices per bucket key, in ascending index order.
    buckets: HashMap<i32, Vec<usize>>,
    /// Cell of each particle at the last rebuild.
    cells: Vec<IVec2>,
}

impl SpatialHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of particles indexed by the last rebuild.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell containing `p` for the current cell size.
    #[inline]
    pub fn cell_of(&self, p: Vec2) -> IVec2 {
        (p / self.cell_size).floor().as_ivec2()
    }

    /// Cell recorded for particle `i` at the last rebuild.
    #[inline]
    pub fn particle_cell(&self, i: usize) -> IVec2 {
        self.cells[i]
    }

    /// Clears every bucket and re-inserts all particles with cells of size `cell_size`.
    pub fn rebuild(&mut self, positions: &[Vec2], cell_size: f32) {
        debug_assert!(cell_size > 0.0);
        self.cell_size = cell_size;

        // Buckets left empty by the previous rebuild are dropped, live ones keep their storage.
        self.buckets.retain(|_, bucket| {
            let keep = !bucket.is_empty();
            bucket.clear();
            keep
        });

        self.cells.clear();
        self.cells.reserve(positions.len());

        for (i, &p) in positions.iter().enumerate() {
            let cell = self.cell_of(p);
            self.cells.push(cell);
            self.buckets.entry(cell_hash(cell)).or_default().push(i);
        }
    }

    /// Non-empty buckets and their members, in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = (i32, &[usize])> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(&key, bucket)| (key, bucket.as_slice()))
    }

    /// Particles recorded in exactly `cell`.
    pub fn members(&self, cell: IVec2) -> impl Iterator<Item = usize> + '_ {
        self.buckets
            .get(&cell_hash(cell))
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&j| self.cells[j] == cell)
    }

    /// Particles in the 3×3 block of cells around particle `i` that pass `predicate(i, j)`.
    ///
    /// Cells are visited column by column, and each bucket in ascending particle order. Passing
    /// `|a, b| a < b` enumerates every unordered pair once over all `i`; `|a, b| a != b`
    /// enumerates ordered pairs without `i` itself.
    pub fn neighbors<'a, P>(&'a self, i: usize, predicate: P) -> impl Iterator<Item = usize> + 'a
    where
        P: Fn(usize, usize) -> bool + 'a,
    {
        debug_assert!(i < self.cells.len(), "grid queried before rebuild");

        let cell = self.cells[i];

        self.block_keys(cell)
            .into_iter()
            .filter_map(move |key| self.buckets.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
            .filter(move |&j| adjacent(self.cells[j], cell) && predicate(i, j))
    }

    /// Bucket keys of the 3×3 block around `cell`, each at most once.
    fn block_keys(&self, cell: IVec2) -> SmallVec<[i32; 9]> {
        let mut keys = SmallVec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = cell_hash(IVec2::new(cell.x.wrapping_add(dx), cell.y.wrapping_add(dy)));
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        keys
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn scatter(n: usize, extent: f32, seed: u64) -> Vec<Vec2> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent)))
            .collect()
    }

    fn snapshot(grid: &SpatialHash) -> Vec<(i32, Vec<usize>)> {
        let mut buckets: Vec<_> = grid.buckets().map(|(k, b)| (k, b.to_vec())).collect();
        buckets.sort();
        buckets
    }

    #[test]
    fn neighbors_match_brute_force() {
        let h = 15.0;
        let positions = scatter(600, 120.0, 7);
        let mut grid = SpatialHash::new();
        grid.rebuild(&positions, h);

        for i in 0..positions.len() {
            let cell = (positions[i] / h).floor().as_ivec2();

            let mut expected: Vec<usize> = (0..positions.len())
                .filter(|&j| j != i && adjacent((positions[j] / h).floor().as_ivec2(), cell))
                .collect();
            let mut found: Vec<usize> = grid.neighbors(i, |a, b| a != b).collect();

            expected.sort_unstable();
            found.sort_unstable();
            assert_eq!(found, expected, "neighborhood of particle {i}");
        }
    }

    #[test]
    fn unique_pairs_cover_every_close_pair_once() {
        let h = 10.0;
        let positions = scatter(300, 60.0, 11);
        let mut grid = SpatialHash::new();
        grid.rebuild(&positions, h);

        let mut pairs = Vec::new();
        for i in 0..positions.len() {
            pairs.extend(grid.neighbors(i, |a, b| a < b).map(|j| (i, j)));
        }

        let mut sorted = pairs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), pairs.len());

        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                if positions[i].distance(positions[j]) < h {
                    assert!(sorted.binary_search(&(i, j)).is_ok(), "missing pair ({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let positions = scatter(200, 80.0, 3);
        let mut grid = SpatialHash::new();

        grid.rebuild(&positions, 12.0);
        let first = snapshot(&grid);
        grid.rebuild(&positions, 12.0);
        assert_eq!(snapshot(&grid), first);
    }

    #[test]
    fn rebuild_forgets_old_positions() {
        let mut grid = SpatialHash::new();
        grid.rebuild(&[Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)], 10.0);
        grid.rebuild(&[Vec2::new(55.0, 1.0), Vec2::new(2.0, 2.0)], 10.0);

        assert_eq!(grid.members(IVec2::new(0, 0)).collect::<Vec<_>>(), vec![1]);
        assert_eq!(grid.members(IVec2::new(5, 0)).collect::<Vec<_>>(), vec![0]);
        assert_eq!(grid.neighbors(1, |a, b| a != b).count(), 0);
    }

    #[test]
    fn negative_coordinates_floor() {
        let mut grid = SpatialHash::new();
        grid.rebuild(&[Vec2::new(-0.5, 0.5)], 10.0);
        assert_eq!(grid.particle_cell(0), IVec2::new(-1, 0));
    }

    #[test]
    fn saturated_cells_stay_queryable() {
        let positions = vec![
            Vec2::new(f32::MAX, 0.0),
            Vec2::new(f32::MAX, 5.0),
            Vec2::new(-f32::MAX, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        let mut grid = SpatialHash::new();
        grid.rebuild(&positions, 10.0);

        assert_eq!(grid.particle_cell(0), IVec2::new(i32::MAX, 0));
        assert_eq!(grid.particle_cell(2), IVec2::new(i32::MIN, 0));
        assert_eq!(grid.neighbors(0, |a, b| a != b).collect::<Vec<_>>(), vec![1]);
        assert_eq!(grid.neighbors(2, |a, b| a != b).count(), 0);
        assert_eq!(grid.neighbors(3, |a, b| a != b).count(), 0);
    }

    #[test]
    fn colliding_keys_do_not_leak_members() {
        let a = IVec2::new(-1984, 34);
        let b = IVec2::new(-1042, -40);
        assert_eq!(cell_hash(a), cell_hash(b));

        let positions = vec![a.as_vec2() + 0.5, b.as_vec2() + 0.5];
        let mut grid = SpatialHash::new();
        grid.rebuild(&positions, 1.0);

        assert_eq!(grid.neighbors(0, |a, b| a != b).count(), 0);
        assert_eq!(grid.members(a).collect::<Vec<_>>(), vec![0]);
        assert_eq!(grid.members(b).collect::<Vec<_>>(), vec![1]);
    }
}
