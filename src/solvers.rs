use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use bit_set::BitSet;
use log::{debug, trace};

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::errors::*;
use crate::grid::Grid;

const UNREACHED: u32 = u32::MAX;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SearchOutcome {
    Running,
    /// The end cell was expanded.
    Found,
    /// The frontier ran dry without reaching the end.
    Exhausted,
}

// Ordered by estimate then by insertion sequence, so equal estimates pop first in first out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct FrontierEntry {
    estimate: u32,
    sequence: u64,
    coord: Cartesian2DCoordinate,
}

/// A* search from the grid's start to its end, one expanded cell per step.
///
/// The heuristic is the manhattan distance to the end, which never overestimates on a grid
/// with unit cost orthogonal moves, so the first time the end is expanded its cost is optimal.
/// Better routes to a cell already on the frontier are pushed as new entries and the stale
/// entries are skipped when popped.
pub struct AStar {
    grid: Grid,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
    costs: Vec<u32>,
    came_from: Vec<Option<Cartesian2DCoordinate>>,
    finalized: BitSet,
    pushed: u64,
    expanded: usize,
    outcome: SearchOutcome,
}

impl AStar {
    /// Takes over a carved grid. Fails if the grid has not been through a full generation run.
    pub fn new(grid: Grid) -> Result<AStar> {
        if !grid.is_carved() {
            bail!(ErrorKind::MazeNotCarved);
        }

        let size = grid.size();
        let mut solver = AStar {
            grid,
            frontier: BinaryHeap::new(),
            costs: vec![UNREACHED; size],
            came_from: vec![None; size],
            finalized: BitSet::with_capacity(size),
            pushed: 0,
            expanded: 0,
            outcome: SearchOutcome::Running,
        };
        solver.restart();
        Ok(solver)
    }

    /// Forget all search progress and start again from the grid's start cell.
    pub fn restart(&mut self) {
        for cost in self.costs.iter_mut() {
            *cost = UNREACHED;
        }
        for prev in self.came_from.iter_mut() {
            *prev = None;
        }
        self.finalized.clear();
        self.frontier.clear();
        self.pushed = 0;
        self.expanded = 0;
        self.outcome = SearchOutcome::Running;

        let start = self.grid.start();
        if let Some(index) = self.grid.grid_coordinate_to_index(start) {
            self.costs[index] = 0;
            self.push(start, 0);
        }

        debug!("A* search from {:?} to {:?}", start, self.grid.end());
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }

    #[inline]
    pub fn expanded_count(&self) -> usize {
        self.expanded
    }

    /// Has the cell been expanded by the search?
    pub fn is_finalized(&self, coord: Cartesian2DCoordinate) -> bool {
        self.grid
            .grid_coordinate_to_index(coord)
            .map_or(false, |index| self.finalized.contains(index))
    }

    /// Cost of the best route found so far from the start to the cell.
    pub fn cost_to(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        self.grid
            .grid_coordinate_to_index(coord)
            .map(|index| self.costs[index])
            .filter(|cost| *cost != UNREACHED)
    }

    /// The route from start to end, both included, following the back pointers of the search.
    ///
    /// Empty if the search could not reach the end. Only available once the search has stopped.
    pub fn build_path(&self) -> Result<Vec<Cartesian2DCoordinate>> {
        if self.outcome == SearchOutcome::Running {
            bail!(ErrorKind::SearchInProgress);
        }

        let (start, end) = (self.grid.start(), self.grid.end());
        if !self.is_finalized(end) {
            return Ok(vec![]);
        }

        let mut path = vec![end];
        let mut current = end;
        while current != start && path.len() <= self.grid.size() {
            match self.grid.grid_coordinate_to_index(current).and_then(|index| self.came_from[index]) {
                Some(prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Run the search to the end and build the path.
    pub fn solve(&mut self) -> Result<Vec<Cartesian2DCoordinate>> {
        self.by_ref().for_each(drop);
        self.build_path()
    }

    fn heuristic(&self, coord: Cartesian2DCoordinate) -> u32 {
        coord.manhattan_distance(self.grid.end())
    }

    fn push(&mut self, coord: Cartesian2DCoordinate, cost: u32) {
        let entry = FrontierEntry {
            estimate: cost + self.heuristic(coord),
            sequence: self.pushed,
            coord,
        };
        self.pushed += 1;
        self.frontier.push(Reverse(entry));
    }

    fn relax_neighbours(&mut self, coord: Cartesian2DCoordinate, cost: u32) {
        for &dir in CompassPrimary::ALL.iter() {
            if self.grid.has_wall(coord, dir) {
                continue;
            }
            let neighbour = match self.grid.neighbour_at_direction(coord, dir) {
                Some(n) => n,
                None => continue,
            };
            let index = match self.grid.grid_coordinate_to_index(neighbour) {
                Some(i) => i,
                None => continue,
            };
            if self.finalized.contains(index) {
                continue;
            }

            let tentative = cost + 1;
            if tentative < self.costs[index] {
                self.costs[index] = tentative;
                self.came_from[index] = Some(coord);
                self.push(neighbour, tentative);
            }
        }
    }
}

impl Iterator for AStar {
    type Item = Cartesian2DCoordinate;

    fn next(&mut self) -> Option<Cartesian2DCoordinate> {
        if self.outcome != SearchOutcome::Running {
            return None;
        }

        while let Some(Reverse(entry)) = self.frontier.pop() {
            let coord = entry.coord;
            let index = match self.grid.grid_coordinate_to_index(coord) {
                Some(i) => i,
                None => continue,
            };
            if !self.finalized.insert(index) {
                // stale duplicate
                continue;
            }
            self.expanded += 1;
            trace!("expanded {:?} estimate {}", coord, entry.estimate);

            if coord == self.grid.end() {
                self.outcome = SearchOutcome::Found;
                debug!("A* reached {:?} after {} expansions, cost {}",
                       coord, self.expanded, self.costs[index]);
            } else {
                let cost = self.costs[index];
                self.relax_neighbours(coord, cost);
            }
            return Some(coord);
        }

        self.outcome = SearchOutcome::Exhausted;
        debug!("A* frontier exhausted after {} expansions, {:?} unreachable",
               self.expanded, self.grid.end());
        None
    }
}
impl FusedIterator for AStar {}
