use std::fmt;

use fnv::FnvHashSet;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;
use crate::pathing::Distances;


pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: Cartesian2DCoordinate) -> String {
        String::from("   ")
    }
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if let Some(d) = self.distance_from_start_to(coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}


#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Cartesian2DCoordinate>,
    start: Option<Cartesian2DCoordinate>,
    end: Option<Cartesian2DCoordinate>,
}
impl PathDisplay {
    /// The first and last path cells are marked as the start and end.
    pub fn new(path: &[Cartesian2DCoordinate]) -> Self {
        PathDisplay {
            on_path_coordinates: path.iter().cloned().collect(),
            start: path.first().cloned(),
            end: path.last().cloned(),
        }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if self.start == Some(coord) {
            String::from(" S ")
        } else if self.end == Some(coord) {
            String::from(" E ")
        } else if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}


#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start: Cartesian2DCoordinate,
    end: Cartesian2DCoordinate,
}
impl StartEndPointsDisplay {
    pub fn new(start: Cartesian2DCoordinate, end: Cartesian2DCoordinate) -> StartEndPointsDisplay {
        StartEndPointsDisplay { start, end }
    }

    pub fn for_grid(grid: &Grid) -> StartEndPointsDisplay {
        StartEndPointsDisplay::new(grid.start(), grid.end())
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if coord == self.start {
            String::from(" S ")
        } else if coord == self.end {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}


/// Box drawing text rendering of a grid, with the cell bodies filled in by an optional `GridDisplay`.
pub struct GridText<'a> {
    grid: &'a Grid,
    display: Option<&'a dyn GridDisplay>,
}

impl<'a> GridText<'a> {
    pub fn new(grid: &'a Grid) -> GridText<'a> {
        GridText { grid, display: None }
    }

    pub fn with_display(grid: &'a Grid, display: &'a dyn GridDisplay) -> GridText<'a> {
        GridText { grid, display: Some(display) }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        GridText::new(self).fmt(f)
    }
}

// Box drawing glyph for a wall corner, indexed by the wall sections leaving it:
// left 8, right 4, up 2, down 1.
const CORNERS: [&str; 16] = [
    " ", "╷", "╵", "│", "╶", "┌", "└", "├",
    "╴", "┐", "┘", "┤", "─", "┬", "┴", "┼",
];

impl<'a> GridText<'a> {
    // Is there a wall on the vertical line x = `column_line` beside row `row`?
    // The outer boundary always is one.
    fn vertical_wall(&self, column_line: usize, row: usize) -> bool {
        if column_line == 0 || column_line == self.grid.width() {
            return true;
        }
        let west = Cartesian2DCoordinate::new(column_line as u32 - 1, row as u32);
        !self.grid.is_neighbour_linked(west, CompassPrimary::East)
    }

    // Is there a wall on the horizontal line y = `row_line` below/above column `column`?
    fn horizontal_wall(&self, column: usize, row_line: usize) -> bool {
        if row_line == 0 || row_line == self.grid.height() {
            return true;
        }
        let north = Cartesian2DCoordinate::new(column as u32, row_line as u32 - 1);
        !self.grid.is_neighbour_linked(north, CompassPrimary::South)
    }

    // The corner where the wall lines x = `vx` and y = `vy` cross.
    fn corner(&self, vx: usize, vy: usize) -> &'static str {
        let (w, h) = (self.grid.width(), self.grid.height());
        let left = vx > 0 && self.horizontal_wall(vx - 1, vy);
        let right = vx < w && self.horizontal_wall(vx, vy);
        let up = vy > 0 && self.vertical_wall(vx, vy - 1);
        let down = vy < h && self.vertical_wall(vx, vy);
        CORNERS[(left as usize) << 3 | (right as usize) << 2 | (up as usize) << 1 | down as usize]
    }

    fn cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        match self.display {
            Some(displayer) => displayer.render_cell_body(coord),
            None => String::from("   "),
        }
    }
}

impl<'a> fmt::Display for GridText<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (w, h) = (self.grid.width(), self.grid.height());
        let mut output = String::new();

        // Each row of cells is a line of wall corners and horizontal walls above it,
        // then a line of bodies separated by vertical walls. The last wall line closes the grid.
        for vy in 0..=h {
            for vx in 0..=w {
                output.push_str(self.corner(vx, vy));
                if vx < w {
                    output.push_str(if self.horizontal_wall(vx, vy) { "───" } else { "   " });
                }
            }
            output.push('\n');

            if vy == h {
                break;
            }
            for vx in 0..=w {
                output.push_str(if self.vertical_wall(vx, vy) { "│" } else { " " });
                if vx < w {
                    output.push_str(&self.cell_body(Cartesian2DCoordinate::new(vx as u32, vy as u32)));
                }
            }
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}
