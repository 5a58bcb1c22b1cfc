use std::iter::FusedIterator;

use bit_set::BitSet;
use itertools::iproduct;
use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::errors::*;
use crate::grid::Grid;

/// How often the growing tree grows from its newest cell rather than a random active cell.
///
/// 1.0 is a pure recursive backtracker (long winding corridors), 0.0 behaves like Prim's
/// algorithm (short dead ends, lots of branching).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct CorridorBias(f64);

impl CorridorBias {
    pub const DEFAULT: f64 = 0.8;

    pub fn new(bias: f64) -> Result<CorridorBias> {
        if (0.0..=1.0).contains(&bias) {
            Ok(CorridorBias(bias))
        } else {
            bail!(ErrorKind::InvalidCorridorBias(bias))
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for CorridorBias {
    fn default() -> CorridorBias {
        CorridorBias(CorridorBias::DEFAULT)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GrowingTreeConfig {
    /// No seed means a fresh seed from the operating system for every run.
    pub seed: Option<u64>,
    pub corridor_bias: CorridorBias,
}

/// One step of maze generation: the passage carved from an already visited cell to a new one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CarvedEdge {
    pub from: Cartesian2DCoordinate,
    pub to: Cartesian2DCoordinate,
}

impl CarvedEdge {
    /// The `(from_x, from_y, to_x, to_y)` record of the carve.
    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.from.x, self.from.y, self.to.x, self.to.y)
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    }
}

/// Apply the growing tree maze generation algorithm to a grid, one carved passage per step.
///
/// The tree starts at the top left cell. Every step picks a cell from the list of active cells,
/// the newest one with probability `corridor_bias` and otherwise any of them, and carves into a
/// random unvisited neighbour of that cell, which then becomes active too. Cells with no unvisited
/// neighbours left are retired from the active list. Every cell gets visited exactly once, so the
/// passages form a spanning tree: a perfect maze.
///
/// The generator owns the grid while it runs. Once the steps run out the cell furthest from the
/// start (by manhattan distance) is made the end and the grid is marked as carved.
pub struct GrowingTree {
    grid: Grid,
    rng: SmallRng,
    corridor_bias: f64,
    active: Vec<Cartesian2DCoordinate>,
    visited: BitSet,
    carved_count: usize,
    finished: bool,
}

impl GrowingTree {
    pub fn new(mut grid: Grid, config: GrowingTreeConfig) -> GrowingTree {
        grid.reset();

        let start = Cartesian2DCoordinate::new(0, 0);
        let mut visited = BitSet::with_capacity(grid.size());
        visited.insert(0);
        grid.set_start(start);

        debug!("Growing tree over a {}x{} grid, corridor bias {}, seed {:?}",
               grid.width(), grid.height(), config.corridor_bias.value(), config.seed);

        GrowingTree {
            grid,
            rng: make_rng(config.seed),
            corridor_bias: config.corridor_bias.value(),
            active: vec![start],
            visited,
            carved_count: 0,
            finished: false,
        }
    }

    /// Read access to the grid as carved so far.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Hand the grid back. It is only marked as carved if all the steps were taken.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn carved_count(&self) -> usize {
        self.carved_count
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn active_cells(&self) -> &[Cartesian2DCoordinate] {
        &self.active
    }

    fn is_visited(&self, coord: Cartesian2DCoordinate) -> bool {
        self.grid
            .grid_coordinate_to_index(coord)
            .map_or(true, |index| self.visited.contains(index))
    }

    fn choose_active_index(&mut self) -> usize {
        let newest = self.active.len() - 1;
        if self.rng.gen::<f64>() < self.corridor_bias {
            newest
        } else {
            self.rng.gen_range(0..self.active.len())
        }
    }

    fn finish(&mut self) {
        let start = self.grid.start();

        // First maximum wins, scanning x then y.
        let mut best_distance = 0;
        let mut end = start;
        for (x, y) in iproduct!(0..self.grid.width() as u32, 0..self.grid.height() as u32) {
            let coord = Cartesian2DCoordinate::new(x, y);
            let distance = coord.manhattan_distance(start);
            if distance > best_distance {
                best_distance = distance;
                end = coord;
            }
        }

        self.grid.set_end(end);
        self.grid.seal();
        self.finished = true;

        debug!("Growing tree finished after {} carves, start {:?} end {:?}",
               self.carved_count, start, end);
    }
}

impl Iterator for GrowingTree {
    type Item = CarvedEdge;

    fn next(&mut self) -> Option<CarvedEdge> {
        if self.finished {
            return None;
        }

        while !self.active.is_empty() {
            let index = self.choose_active_index();
            let current = self.active[index];

            let unvisited = CompassPrimary::ALL
                .iter()
                .filter_map(|dir| {
                    self.grid
                        .neighbour_at_direction(current, *dir)
                        .filter(|neighbour| !self.is_visited(*neighbour))
                        .map(|_| *dir)
                })
                .collect::<SmallVec<[CompassPrimary; 4]>>();

            if unvisited.is_empty() {
                // dead end
                self.active.remove(index);
                continue;
            }

            let direction = unvisited[self.rng.gen_range(0..unvisited.len())];
            if let Some(next) = self.grid.clear_wall_pair(current, direction) {
                if let Some(next_index) = self.grid.grid_coordinate_to_index(next) {
                    self.visited.insert(next_index);
                }
                self.active.push(next);
                self.carved_count += 1;

                let edge = CarvedEdge { from: current, to: next };
                trace!("carved {:?}", edge.as_tuple());
                return Some(edge);
            }
        }

        self.finish();
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.finished {
            0
        } else {
            self.grid.size() - 1 - self.carved_count
        };
        (remaining, Some(remaining))
    }
}
impl FusedIterator for GrowingTree {}
impl ExactSizeIterator for GrowingTree {} // default impl using size_hint()

/// Carve a complete growing tree maze into the grid.
pub fn growing_tree(grid: Grid, config: GrowingTreeConfig) -> Grid {
    let mut generator = GrowingTree::new(grid, config);
    generator.by_ref().for_each(drop);
    generator.into_grid()
}

/// Rebuild the walls of up to `count` randomly chosen passages. Returns how many were rebuilt.
///
/// The grid stays marked as carved, so this is the way to make the end of a maze unreachable.
pub fn block_random_passages(grid: &mut Grid, count: usize, seed: Option<u64>) -> usize {
    let mut rng = make_rng(seed);
    let mut passages = grid.iter_links().collect::<Vec<_>>();
    let mut blocked = 0;

    while blocked < count && !passages.is_empty() {
        let (a, b) = passages.swap_remove(rng.gen_range(0..passages.len()));
        if grid.unlink(a, b) {
            trace!("blocked passage {:?} - {:?}", a, b);
            blocked += 1;
        }
    }

    debug!("Blocked {} of {} requested passages", blocked, count);
    blocked
}
