use smallvec::SmallVec;

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;
pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    /// Creates a new coordinate offset 1 cell away in the given direction.
    /// Returns None if the coordinate is not representable (north of row 0 or west of column 0),
    /// the caller still has to check the result against the grid bounds.
    pub fn offset(self, dir: CompassPrimary) -> Option<Cartesian2DCoordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => y.checked_sub(1).map(|y| Cartesian2DCoordinate { x, y }),
            CompassPrimary::South => y.checked_add(1).map(|y| Cartesian2DCoordinate { x, y }),
            CompassPrimary::East => x.checked_add(1).map(|x| Cartesian2DCoordinate { x, y }),
            CompassPrimary::West => x.checked_sub(1).map(|x| Cartesian2DCoordinate { x, y }),
        }
    }

    #[inline]
    pub fn manhattan_distance(self, other: Cartesian2DCoordinate) -> u32 {
        diff(self.x, other.x) + diff(self.y, other.y)
    }

    /// The direction to step in to get from `self` to an orthogonally adjacent `other`.
    pub fn direction_to(self, other: Cartesian2DCoordinate) -> Option<CompassPrimary> {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .find(|dir| self.offset(*dir) == Some(other))
    }
}

#[inline(always)]
fn diff(a: u32, b: u32) -> u32 {
    if a > b { a - b } else { b - a }
}

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

impl CompassPrimary {
    /// Neighbour enumeration order used by the generator and the solver.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::South,
                                          CompassPrimary::East,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    #[inline(always)]
    fn wall_bit(self) -> u8 {
        match self {
            CompassPrimary::North => 0b0001,
            CompassPrimary::South => 0b0010,
            CompassPrimary::East => 0b0100,
            CompassPrimary::West => 0b1000,
        }
    }
}

const ALL_WALLS: u8 = 0b1111;

/// The four walls of a grid cell as a bit mask, a set bit being a standing wall.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    walls: u8,
}

impl Cell {
    pub fn enclosed() -> Cell {
        Cell { walls: ALL_WALLS }
    }

    #[inline]
    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        self.walls & dir.wall_bit() != 0
    }

    #[inline]
    pub fn is_enclosed(&self) -> bool {
        self.walls == ALL_WALLS
    }

    /// Directions with no wall standing.
    pub fn open_directions(&self) -> DirectionSmallVec {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .filter(|dir| !self.has_wall(*dir))
            .collect()
    }

    // Only the grid may touch walls, it keeps both sides of a wall in step.
    #[inline]
    pub(crate) fn clear_wall(&mut self, dir: CompassPrimary) {
        self.walls &= !dir.wall_bit();
    }

    #[inline]
    pub(crate) fn build_wall(&mut self, dir: CompassPrimary) {
        self.walls |= dir.wall_bit();
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::enclosed()
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn cells_start_enclosed() {
        let cell = Cell::default();
        assert!(cell.is_enclosed());
        for dir in CompassPrimary::ALL.iter() {
            assert!(cell.has_wall(*dir));
        }
        assert!(cell.open_directions().is_empty());
    }

    #[test]
    fn walls_are_independent() {
        let mut cell = Cell::enclosed();
        cell.clear_wall(CompassPrimary::East);
        assert!(!cell.has_wall(CompassPrimary::East));
        assert!(cell.has_wall(CompassPrimary::North));
        assert!(cell.has_wall(CompassPrimary::South));
        assert!(cell.has_wall(CompassPrimary::West));
        assert_eq!(&*cell.open_directions(), &[CompassPrimary::East]);

        cell.clear_wall(CompassPrimary::North);
        assert_eq!(&*cell.open_directions(), &[CompassPrimary::North, CompassPrimary::East]);

        cell.build_wall(CompassPrimary::East);
        cell.build_wall(CompassPrimary::North);
        assert!(cell.is_enclosed());
    }

    #[test]
    fn opposite_directions() {
        for dir in CompassPrimary::ALL.iter() {
            assert_ne!(dir.opposite(), *dir);
            assert_eq!(dir.opposite().opposite(), *dir);
        }
        assert_eq!(CompassPrimary::North.opposite(), CompassPrimary::South);
        assert_eq!(CompassPrimary::East.opposite(), CompassPrimary::West);
    }

    #[test]
    fn offsets() {
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert_eq!(gc(0, 0).offset(CompassPrimary::North), None);
        assert_eq!(gc(0, 0).offset(CompassPrimary::West), None);
        assert_eq!(gc(0, 0).offset(CompassPrimary::South), Some(gc(0, 1)));
        assert_eq!(gc(0, 0).offset(CompassPrimary::East), Some(gc(1, 0)));
        assert_eq!(gc(3, 2).offset(CompassPrimary::North), Some(gc(3, 1)));
        assert_eq!(gc(3, 2).offset(CompassPrimary::West), Some(gc(2, 2)));
        assert_eq!(gc(u32::MAX, 0).offset(CompassPrimary::East), None);
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert_eq!(gc(1, 1).direction_to(gc(1, 0)), Some(CompassPrimary::North));
        assert_eq!(gc(1, 1).direction_to(gc(1, 2)), Some(CompassPrimary::South));
        assert_eq!(gc(1, 1).direction_to(gc(2, 1)), Some(CompassPrimary::East));
        assert_eq!(gc(1, 1).direction_to(gc(0, 1)), Some(CompassPrimary::West));
        assert_eq!(gc(1, 1).direction_to(gc(2, 2)), None);
        assert_eq!(gc(1, 1).direction_to(gc(1, 1)), None);
    }

    #[test]
    fn manhattan() {
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert_eq!(gc(0, 0).manhattan_distance(gc(0, 0)), 0);
        assert_eq!(gc(0, 0).manhattan_distance(gc(2, 3)), 5);
        assert_eq!(gc(4, 1).manhattan_distance(gc(1, 3)), 5);
    }
}
