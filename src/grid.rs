use std::fmt;

use itertools::Itertools;

use crate::cells::{Cartesian2DCoordinate, Cell, CompassPrimary, CoordinateSmallVec};
use crate::errors::*;
use crate::units::{Height, Width};


/// A fixed size rectangle of walled cells with a designated start and end cell.
///
/// Walls between two cells are always built and cleared as a pair, so the wall state
/// seen from either side of a shared wall is the same.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    start: Cartesian2DCoordinate,
    end: Cartesian2DCoordinate,
    carved: bool,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    InvalidGridCoordinate,
    SelfLink,
    NotAdjacent,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: width: {:?}, height: {:?}, passages: {:?}, start: {:?}, end: {:?}, carved: {:?}",
               self.width, self.height, self.links_count(), self.start, self.end, self.carved)
    }
}

impl Default for Grid {
    /// The smallest grid, one enclosed cell.
    fn default() -> Grid {
        Grid {
            width: 1,
            height: 1,
            cells: vec![Cell::enclosed()],
            start: Cartesian2DCoordinate::new(0, 0),
            end: Cartesian2DCoordinate::new(0, 0),
            carved: false,
        }
    }
}

impl Grid {
    /// A grid with every wall standing and start/end at the origin.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);

        let coordinates_fit = w <= u32::MAX as usize && h <= u32::MAX as usize;
        let cells_count = w.checked_mul(h);
        match cells_count {
            Some(count) if count > 0 && coordinates_fit => {
                Ok(Grid {
                    width: w,
                    height: h,
                    cells: vec![Cell::enclosed(); count],
                    start: Cartesian2DCoordinate::new(0, 0),
                    end: Cartesian2DCoordinate::new(0, 0),
                    carved: false,
                })
            }
            _ => bail!(ErrorKind::InvalidGridDimensions(w, h)),
        }
    }

    /// Rebuild every wall, move start/end back to the origin and forget any carving.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = Cell::enclosed();
        }
        self.start = Cartesian2DCoordinate::new(0, 0);
        self.end = Cartesian2DCoordinate::new(0, 0);
        self.carved = false;
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Cartesian2DCoordinate {
        self.end
    }

    /// Has a generation run completed on this grid since it was last reset?
    #[inline]
    pub fn is_carved(&self) -> bool {
        self.carved
    }

    pub(crate) fn set_start(&mut self, coord: Cartesian2DCoordinate) {
        debug_assert!(self.is_valid_coordinate(coord));
        self.start = coord;
    }

    pub(crate) fn set_end(&mut self, coord: Cartesian2DCoordinate) {
        debug_assert!(self.is_valid_coordinate(coord));
        self.end = coord;
    }

    pub(crate) fn seal(&mut self) {
        self.carved = true;
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width && (coord.y as usize) < self.height
    }

    /// Convert a grid coordinate to a one dimensional row major index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_grid_coordinate(&self, index: usize) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new((index % self.width) as u32, (index / self.width) as u32)
    }

    pub fn cell(&self, coord: Cartesian2DCoordinate) -> Option<&Cell> {
        self.grid_coordinate_to_index(coord).map(|index| &self.cells[index])
    }

    /// Is there a wall on the `direction` side of the cell?
    /// The outer boundary always has walls and so does any invalid coordinate.
    #[inline]
    pub fn has_wall(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.cell(coord).map_or(true, |cell| cell.has_wall(direction))
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        coord.offset(direction).filter(|neighbour| self.is_valid_coordinate(*neighbour))
    }

    /// Cells that are to the North, South, East or West of a particular cell, but not
    /// necessarily linked by a passage.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    /// Link two adjacent cells by clearing the wall pair between them.
    pub fn link(&mut self,
                a: Cartesian2DCoordinate,
                b: Cartesian2DCoordinate)
                -> ::std::result::Result<(), CellLinkError> {
        let direction = self.direction_between(a, b)?;
        self.clear_wall_pair(a, direction);
        Ok(())
    }

    /// Unlink two cells, if the grid coordinates are adjacent and a passage exists between them.
    /// Returns true if an unlink occurred.
    pub fn unlink(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        match self.direction_between(a, b) {
            Ok(direction) if !self.has_wall(a, direction) => {
                self.build_wall_pair(a, direction);
                true
            }
            _ => false,
        }
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        self.direction_between(a, b)
            .map(|direction| !self.has_wall(a, direction))
            .unwrap_or(false)
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction).is_some() && !self.has_wall(coord, direction)
    }

    /// Cells that are linked to a particular cell by a passage.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<CoordinateSmallVec> {
        self.cell(coord).map(|cell| {
            cell.open_directions()
                .iter()
                .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
                .collect()
        })
    }

    /// Number of cleared wall pairs.
    pub fn links_count(&self) -> usize {
        self.iter_links().count()
    }

    /// Every cell coordinate in row major order.
    pub fn iter(&self) -> CellIter {
        CellIter {
            width: self.width,
            current_cell_number: 0,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> impl Iterator<Item = Vec<Cartesian2DCoordinate>> {
        let width = self.width as u32;
        (0..self.height as u32).map(move |y| (0..width).map(|x| Cartesian2DCoordinate::new(x, y)).collect())
    }

    /// Each passage once, as the (west or north cell, east or south cell) pair.
    pub fn iter_links<'a>(&'a self) -> impl Iterator<Item = (Cartesian2DCoordinate, Cartesian2DCoordinate)> + 'a {
        self.iter()
            .cartesian_product(&[CompassPrimary::East, CompassPrimary::South])
            .filter(move |&(coord, dir)| self.is_neighbour_linked(coord, *dir))
            .filter_map(move |(coord, dir)| {
                self.neighbour_at_direction(coord, *dir).map(|neighbour| (coord, neighbour))
            })
    }

    /// Does every cell agree with its neighbours about the walls they share,
    /// and is the outer boundary fully walled?
    pub fn has_consistent_walls(&self) -> bool {
        self.iter().all(|coord| {
            CompassPrimary::ALL.iter().all(|&dir| {
                match self.neighbour_at_direction(coord, dir) {
                    Some(neighbour) => self.has_wall(coord, dir) == self.has_wall(neighbour, dir.opposite()),
                    None => self.has_wall(coord, dir),
                }
            })
        })
    }

    fn direction_between(&self,
                         a: Cartesian2DCoordinate,
                         b: Cartesian2DCoordinate)
                         -> ::std::result::Result<CompassPrimary, CellLinkError> {
        if !self.is_valid_coordinate(a) || !self.is_valid_coordinate(b) {
            Err(CellLinkError::InvalidGridCoordinate)
        } else if a == b {
            Err(CellLinkError::SelfLink)
        } else {
            a.direction_to(b).ok_or(CellLinkError::NotAdjacent)
        }
    }

    /// Clear the wall on the `direction` side of `coord` and the facing wall of its neighbour.
    /// Returns the neighbour, or None (and changes nothing) if there is no neighbour that way.
    pub(crate) fn clear_wall_pair(&mut self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        let neighbour = self.neighbour_at_direction(coord, direction)?;
        let (a, b) = self.wall_pair_indices(coord, neighbour);
        self.cells[a].clear_wall(direction);
        self.cells[b].clear_wall(direction.opposite());
        Some(neighbour)
    }

    pub(crate) fn build_wall_pair(&mut self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        let neighbour = self.neighbour_at_direction(coord, direction)?;
        let (a, b) = self.wall_pair_indices(coord, neighbour);
        self.cells[a].build_wall(direction);
        self.cells[b].build_wall(direction.opposite());
        Some(neighbour)
    }

    // Both coordinates are known valid here.
    #[inline]
    fn wall_pair_indices(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> (usize, usize) {
        (a.y as usize * self.width + a.x as usize, b.y as usize * self.width + b.x as usize)
    }
}

#[derive(Clone, Debug)]
pub struct CellIter {
    width: usize,
    current_cell_number: usize,
    cells_count: usize,
}

impl Iterator for CellIter {
    type Item = Cartesian2DCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let n = self.current_cell_number;
            self.current_cell_number += 1;
            Some(Cartesian2DCoordinate::new((n % self.width) as u32, (n / self.width) as u32))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()


#[cfg(test)]
mod tests {

    use itertools::Itertools;
    use smallvec::SmallVec;

    use super::*;

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("valid grid dimensions")
    }

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    // SmallVec does not compare with arrays directly, deref it to a slice.
    macro_rules! assert_smallvec_eq {
        ($x:expr, $y:expr) => (assert_eq!(&*$x, &*$y))
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert!(Grid::new(Width(0), Height(3)).is_err());
        assert!(Grid::new(Width(3), Height(0)).is_err());
        assert!(Grid::new(Width(0), Height(0)).is_err());
        match Grid::new(Width(0), Height(2)) {
            Err(Error(ErrorKind::InvalidGridDimensions(0, 2), _)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn new_grid_is_fully_walled() {
        let g = grid(4, 3);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert_eq!(g.size(), 12);
        assert_eq!(g.start(), gc(0, 0));
        assert_eq!(g.end(), gc(0, 0));
        assert!(!g.is_carved());
        assert!(g.iter().all(|coord| g.cell(coord).unwrap().is_enclosed()));
        assert_eq!(g.links_count(), 0);
        assert!(g.has_consistent_walls());
    }

    #[test]
    fn default_grid_is_one_cell() {
        let g = Grid::default();
        assert_eq!(g.size(), 1);
        assert_eq!(g, grid(1, 1));
    }

    #[test]
    fn neighbour_cells() {
        let g = grid(10, 10);

        let check_expected_neighbours = |coord, expected_neighbours: &[Cartesian2DCoordinate]| {
            let neighbours: Vec<Cartesian2DCoordinate> = g.neighbours(coord).iter().cloned().sorted().collect();
            let expected: Vec<Cartesian2DCoordinate> = expected_neighbours.iter().cloned().sorted().collect();
            assert_eq!(neighbours, expected);
        };

        // corners
        check_expected_neighbours(gc(0, 0), &[gc(1, 0), gc(0, 1)]);
        check_expected_neighbours(gc(9, 0), &[gc(8, 0), gc(9, 1)]);
        check_expected_neighbours(gc(0, 9), &[gc(0, 8), gc(1, 9)]);
        check_expected_neighbours(gc(9, 9), &[gc(9, 8), gc(8, 9)]);

        // side element examples
        check_expected_neighbours(gc(1, 0), &[gc(0, 0), gc(1, 1), gc(2, 0)]);
        check_expected_neighbours(gc(0, 1), &[gc(0, 0), gc(0, 2), gc(1, 1)]);
        check_expected_neighbours(gc(9, 8), &[gc(9, 7), gc(9, 9), gc(8, 8)]);

        // Some place with 4 neighbours inside the grid
        check_expected_neighbours(gc(1, 1), &[gc(0, 1), gc(1, 0), gc(2, 1), gc(1, 2)]);

        // Outside the grid there is nothing
        check_expected_neighbours(gc(10, 10), &[]);
    }

    #[test]
    fn neighbours_are_listed_north_south_east_west() {
        let g = grid(3, 3);
        assert_smallvec_eq!(g.neighbours(gc(1, 1)), &[gc(1, 0), gc(1, 2), gc(2, 1), gc(0, 1)]);
    }

    #[test]
    fn neighbour_at_dir() {
        let g = grid(2, 2);
        let check_neighbour = |coord, dir: CompassPrimary, expected| {
            assert_eq!(g.neighbour_at_direction(coord, dir), expected);
        };
        check_neighbour(gc(0, 0), CompassPrimary::North, None);
        check_neighbour(gc(0, 0), CompassPrimary::South, Some(gc(0, 1)));
        check_neighbour(gc(0, 0), CompassPrimary::East, Some(gc(1, 0)));
        check_neighbour(gc(0, 0), CompassPrimary::West, None);

        check_neighbour(gc(1, 1), CompassPrimary::North, Some(gc(1, 0)));
        check_neighbour(gc(1, 1), CompassPrimary::South, None);
        check_neighbour(gc(1, 1), CompassPrimary::East, None);
        check_neighbour(gc(1, 1), CompassPrimary::West, Some(gc(0, 1)));
    }

    #[test]
    fn grid_coordinate_as_index() {
        let g = grid(3, 3);
        let coords = &[gc(0, 0), gc(1, 0), gc(2, 0), gc(0, 1), gc(1, 1), gc(2, 1), gc(0, 2),
                       gc(1, 2), gc(2, 2)];
        let indices: Vec<Option<usize>> = coords.iter()
            .map(|coord| g.grid_coordinate_to_index(*coord))
            .collect();
        let expected = (0..9).map(Some).collect::<Vec<Option<usize>>>();
        assert_eq!(expected, indices);

        for (index, coord) in coords.iter().enumerate() {
            assert_eq!(g.index_to_grid_coordinate(index), *coord);
        }

        assert_eq!(g.grid_coordinate_to_index(gc(2, 3)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(3, 2)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(u32::MAX, u32::MAX)), None);
    }

    #[test]
    fn cell_iter() {
        let g = grid(2, 3);
        assert_eq!(g.iter().len(), 6);
        assert_eq!(g.iter().collect::<Vec<Cartesian2DCoordinate>>(),
                   &[gc(0, 0), gc(1, 0), gc(0, 1), gc(1, 1), gc(0, 2), gc(1, 2)]);
    }

    #[test]
    fn row_iter() {
        let g = grid(2, 2);
        assert_eq!(g.iter_row().collect::<Vec<Vec<Cartesian2DCoordinate>>>(),
                   &[&[gc(0, 0), gc(1, 0)], &[gc(0, 1), gc(1, 1)]]);
    }

    #[test]
    fn linking_cells() {
        let mut g = grid(4, 4);
        let a = gc(0, 1);
        let b = gc(0, 2);
        let c = gc(0, 3);

        let sorted_links = |grid: &Grid, coord| -> Vec<Cartesian2DCoordinate> {
            grid.links(coord).expect("coordinate is invalid").iter().cloned().sorted().collect()
        };

        // a, b and c start with no links
        assert!(!g.is_linked(a, b));
        assert!(!g.is_linked(b, c));
        assert_eq!(sorted_links(&g, a), vec![]);

        g.link(a, b).expect("link failed");
        assert!(g.is_linked(a, b) && g.is_linked(b, a));
        assert!(!g.has_wall(a, CompassPrimary::South));
        assert!(!g.has_wall(b, CompassPrimary::North));
        assert!(g.is_neighbour_linked(a, CompassPrimary::South));
        assert!(g.is_neighbour_linked(b, CompassPrimary::North));
        assert_eq!(sorted_links(&g, a), vec![b]);
        assert_eq!(sorted_links(&g, b), vec![a]);
        assert_eq!(sorted_links(&g, c), vec![]);

        g.link(b, c).expect("link failed");
        assert!(g.is_linked(b, c));
        assert!(!g.is_linked(a, c));
        assert_eq!(sorted_links(&g, b), vec![a, c]);
        assert_eq!(g.links_count(), 2);
        assert!(g.has_consistent_walls());

        assert!(g.unlink(a, b));
        assert!(!g.is_linked(a, b) && !g.is_linked(b, a));
        assert!(g.is_linked(b, c));
        assert_eq!(sorted_links(&g, a), vec![]);
        assert_eq!(sorted_links(&g, b), vec![c]);
        assert_eq!(g.links_count(), 1);

        // nothing left to unlink
        assert!(!g.unlink(a, b));
        assert!(g.has_consistent_walls());
    }

    #[test]
    fn repeated_links_are_one_passage() {
        let mut g = grid(4, 4);
        let a = gc(0, 0);
        let b = gc(0, 1);
        g.link(a, b).expect("link failed");
        g.link(b, a).expect("link failed");
        assert_smallvec_eq!(g.links(a).unwrap(), &[b]);
        assert_smallvec_eq!(g.links(b).unwrap(), &[a]);
        assert_eq!(g.links_count(), 1);
    }

    #[test]
    fn invalid_links() {
        let mut g = grid(4, 4);
        assert_eq!(g.link(gc(0, 0), gc(0, 0)), Err(CellLinkError::SelfLink));
        assert_eq!(g.link(gc(0, 0), gc(100, 100)), Err(CellLinkError::InvalidGridCoordinate));
        assert_eq!(g.link(gc(0, 0), gc(1, 1)), Err(CellLinkError::NotAdjacent));
        assert_eq!(g.link(gc(0, 0), gc(2, 0)), Err(CellLinkError::NotAdjacent));
        assert_eq!(g.links_count(), 0);
        assert!(g.links(gc(4, 0)).is_none());
    }

    #[test]
    fn boundary_walls_always_stand() {
        let mut g = grid(2, 1);
        g.link(gc(0, 0), gc(1, 0)).unwrap();
        assert!(g.has_wall(gc(0, 0), CompassPrimary::West));
        assert!(g.has_wall(gc(0, 0), CompassPrimary::North));
        assert!(g.has_wall(gc(1, 0), CompassPrimary::East));
        assert!(!g.is_neighbour_linked(gc(1, 0), CompassPrimary::East));
        assert!(g.has_wall(gc(7, 7), CompassPrimary::North));
        assert_eq!(g.clear_wall_pair(gc(1, 0), CompassPrimary::East), None);
        assert!(g.has_consistent_walls());
    }

    #[test]
    fn links_iteration() {
        let mut g = grid(3, 2);
        g.link(gc(0, 0), gc(1, 0)).unwrap();
        g.link(gc(1, 1), gc(1, 0)).unwrap();
        g.link(gc(2, 1), gc(1, 1)).unwrap();
        let links: SmallVec<[_; 4]> = g.iter_links().collect();
        assert_smallvec_eq!(links, &[(gc(0, 0), gc(1, 0)), (gc(1, 0), gc(1, 1)), (gc(1, 1), gc(2, 1))]);
    }

    #[test]
    fn reset_restores_walls_and_endpoints() {
        let mut g = grid(3, 3);
        g.link(gc(0, 0), gc(1, 0)).unwrap();
        g.set_start(gc(1, 1));
        g.set_end(gc(2, 2));
        g.seal();
        assert!(g.is_carved());

        g.reset();
        assert_eq!(g, grid(3, 3));
    }
}
