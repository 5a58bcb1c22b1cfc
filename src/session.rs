use std::mem;

use fnv::FnvHashSet;
use log::info;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::generators::{CarvedEdge, CorridorBias, GrowingTree, GrowingTreeConfig};
use crate::grid::Grid;
use crate::grid_displays::GridDisplay;
use crate::solvers::AStar;
use crate::units::{Height, Width};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MazePhase {
    Generating,
    Searching,
    DrawingSolution,
    ShowingSolution,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub width: usize,
    pub height: usize,
    /// Maze k of the session (counting from 0) is generated with `seed + k`.
    pub seed: Option<u64>,
    pub corridor_bias: CorridorBias,
    /// How many ticks the finished solution stays up before the next maze starts.
    pub show_solution_ticks: u32,
}

impl SessionSettings {
    pub const DEFAULT_SHOW_SOLUTION_TICKS: u32 = 120;

    fn generator_config(&self, maze_number: u64) -> GrowingTreeConfig {
        GrowingTreeConfig {
            seed: self.seed.map(|s| s.wrapping_add(maze_number)),
            corridor_bias: self.corridor_bias,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            width: 20,
            height: 20,
            seed: None,
            corridor_bias: CorridorBias::default(),
            show_solution_ticks: SessionSettings::DEFAULT_SHOW_SOLUTION_TICKS,
        }
    }
}

// Whoever is working on the grid owns it.
enum Stage {
    Idle(Grid),
    Generating(GrowingTree),
    Solving(AStar),
}

impl Stage {
    fn grid(&self) -> &Grid {
        match *self {
            Stage::Idle(ref grid) => grid,
            Stage::Generating(ref generator) => generator.grid(),
            Stage::Solving(ref solver) => solver.grid(),
        }
    }

    fn into_grid(self) -> Grid {
        match self {
            Stage::Idle(grid) => grid,
            Stage::Generating(generator) => generator.into_grid(),
            Stage::Solving(solver) => solver.into_grid(),
        }
    }
}

/// Endless generate, search and show cycle over one grid, advanced one unit of work per `tick`.
///
/// Nothing here sleeps or spawns: the caller decides how fast to tick and draws the session
/// through its `GridDisplay` implementation between ticks.
pub struct MazeSession {
    settings: SessionSettings,
    stage: Stage,
    phase: MazePhase,
    last_carved: Option<CarvedEdge>,
    visited: FnvHashSet<Cartesian2DCoordinate>,
    path: Vec<Cartesian2DCoordinate>,
    path_index: usize,
    show_ticks: u32,
    mazes_completed: u64,
}

impl MazeSession {
    pub fn new(settings: SessionSettings) -> Result<MazeSession> {
        let grid = Grid::new(Width(settings.width), Height(settings.height))?;
        let generator = GrowingTree::new(grid, settings.generator_config(0));

        info!("Maze session on a {}x{} grid, seed {:?}",
              settings.width, settings.height, settings.seed);

        Ok(MazeSession {
            settings,
            stage: Stage::Generating(generator),
            phase: MazePhase::Generating,
            last_carved: None,
            visited: FnvHashSet::default(),
            path: vec![],
            path_index: 0,
            show_ticks: 0,
            mazes_completed: 0,
        })
    }

    /// Do one unit of work for the current phase. Returns the phase the session is in afterwards.
    pub fn tick(&mut self) -> Result<MazePhase> {
        match self.phase {
            MazePhase::Generating => self.tick_generating()?,
            MazePhase::Searching => self.tick_searching()?,
            MazePhase::DrawingSolution => self.tick_drawing(),
            MazePhase::ShowingSolution => self.tick_showing(),
        }
        Ok(self.phase)
    }

    #[inline]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[inline]
    pub fn phase(&self) -> MazePhase {
        self.phase
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        self.stage.grid()
    }

    #[inline]
    pub fn last_carved(&self) -> Option<CarvedEdge> {
        self.last_carved
    }

    /// Cells expanded by the search of the current maze.
    #[inline]
    pub fn visited(&self) -> &FnvHashSet<Cartesian2DCoordinate> {
        &self.visited
    }

    #[inline]
    pub fn path(&self) -> &[Cartesian2DCoordinate] {
        &self.path
    }

    /// The part of the solution drawn so far.
    #[inline]
    pub fn drawn_path(&self) -> &[Cartesian2DCoordinate] {
        &self.path[..self.path_index]
    }

    #[inline]
    pub fn mazes_completed(&self) -> u64 {
        self.mazes_completed
    }

    fn take_grid(&mut self) -> Grid {
        mem::replace(&mut self.stage, Stage::Idle(Grid::default())).into_grid()
    }

    fn tick_generating(&mut self) -> Result<()> {
        let carved = match self.stage {
            Stage::Generating(ref mut generator) => generator.next(),
            _ => None,
        };

        if let Some(edge) = carved {
            self.last_carved = Some(edge);
            return Ok(());
        }

        self.last_carved = None;
        let solver = AStar::new(self.take_grid())?;
        self.stage = Stage::Solving(solver);
        self.visited.clear();
        self.phase = MazePhase::Searching;

        info!("Maze {} generated, searching from {:?} to {:?}",
              self.mazes_completed + 1, self.grid().start(), self.grid().end());
        Ok(())
    }

    fn tick_searching(&mut self) -> Result<()> {
        let expanded = match self.stage {
            Stage::Solving(ref mut solver) => solver.next(),
            _ => None,
        };

        if let Some(coord) = expanded {
            self.visited.insert(coord);
            return Ok(());
        }

        self.path = match self.stage {
            Stage::Solving(ref solver) => solver.build_path()?,
            _ => vec![],
        };
        self.path_index = self.path.len().min(1);
        self.phase = MazePhase::DrawingSolution;

        info!("Maze {} searched, {} cells expanded, path of {} cells",
              self.mazes_completed + 1, self.visited.len(), self.path.len());
        Ok(())
    }

    fn tick_drawing(&mut self) {
        if !self.path.is_empty() {
            self.path_index += 1;
            if self.path_index < self.path.len() {
                return;
            }
            self.path_index = self.path.len();
        }
        self.show_ticks = 0;
        self.phase = MazePhase::ShowingSolution;
    }

    fn tick_showing(&mut self) {
        self.show_ticks += 1;
        if self.show_ticks >= self.settings.show_solution_ticks {
            self.next_maze();
        }
    }

    fn next_maze(&mut self) {
        self.mazes_completed += 1;

        let grid = self.take_grid();
        let config = self.settings.generator_config(self.mazes_completed);
        self.stage = Stage::Generating(GrowingTree::new(grid, config));

        self.last_carved = None;
        self.visited.clear();
        self.path.clear();
        self.path_index = 0;
        self.show_ticks = 0;
        self.phase = MazePhase::Generating;

        info!("Starting maze {}", self.mazes_completed + 1);
    }
}

impl GridDisplay for MazeSession {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        let grid = self.grid();
        let is_latest_carve = self.last_carved.map_or(false, |edge| edge.to == coord);

        if self.phase != MazePhase::Generating && coord == grid.start() {
            String::from(" S ")
        } else if self.phase != MazePhase::Generating && coord == grid.end() {
            String::from(" E ")
        } else if is_latest_carve {
            String::from(" + ")
        } else if self.drawn_path().contains(&coord) {
            String::from(" * ")
        } else if self.visited.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}
