//! # Grid
//!
//! Fixed-size board container with spatial queries and mutation primitives.

use crate::game::{Position, Tile};
use rand::Rng;

/// Square board of optional tiles, row-major storage.
///
/// Invariant: every occupied cell's tile has `position` equal to that
/// cell's coordinate. All mutations go through [`Grid::insert_tile`] and
/// [`Grid::remove_tile`], which keep the mapping in sync.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Square dimension, fixed at construction
    pub size: i32,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// Creates an empty grid of the given dimension.
    pub fn new(size: i32) -> Self {
        Self {
            size,
            cells: vec![None; (size * size) as usize],
        }
    }

    fn index(&self, position: Position) -> usize {
        (position.y * self.size + position.x) as usize
    }

    /// True iff both axes lie in `[0, size)`.
    pub fn within_bounds(&self, position: Position) -> bool {
        position.x >= 0 && position.x < self.size && position.y >= 0 && position.y < self.size
    }

    /// Returns the tile at `position`, or `None` if the coordinate is out
    /// of bounds or the cell is empty. Never fails.
    pub fn cell_content(&self, position: Position) -> Option<&Tile> {
        if self.within_bounds(position) {
            self.cells[self.index(position)].as_ref()
        } else {
            None
        }
    }

    /// True iff `position` is within bounds and currently empty.
    pub fn cell_available(&self, position: Position) -> bool {
        self.within_bounds(position) && self.cells[self.index(position)].is_none()
    }

    /// Places `tile` at its own coordinate, replacing any prior occupant.
    ///
    /// The merge path relies on replacement: the merged tile is inserted
    /// over the consumed target. Callers inserting fresh tiles must pick an
    /// empty cell.
    pub fn insert_tile(&mut self, tile: Tile) {
        debug_assert!(self.within_bounds(tile.position));
        let index = self.index(tile.position);
        self.cells[index] = Some(tile);
    }

    /// Clears the cell at `tile`'s coordinate.
    pub fn remove_tile(&mut self, tile: &Tile) {
        if self.within_bounds(tile.position) {
            let index = self.index(tile.position);
            self.cells[index] = None;
        }
    }

    /// All empty cells in row-major order, recomputed on every call.
    pub fn available_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..self.size {
            for x in 0..self.size {
                let position = Position::new(x, y);
                if self.cells[self.index(position)].is_none() {
                    cells.push(position);
                }
            }
        }
        cells
    }

    /// Uniformly selects one empty cell, or `None` if the grid is full.
    pub fn random_available_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let cells = self.available_cells();
        if cells.is_empty() {
            None
        } else {
            Some(cells[rng.gen_range(0..cells.len())])
        }
    }

    /// True iff at least one cell is empty.
    pub fn cells_available(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_none())
    }

    /// Iterates over all occupied cells.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().filter_map(|cell| cell.as_ref())
    }

    /// Iterates mutably over all occupied cells.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells.iter_mut().filter_map(|cell| cell.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(4);
        assert_eq!(grid.available_cells().len(), 16);
        assert!(grid.cells_available());
        assert_eq!(grid.tiles().count(), 0);
    }

    #[test]
    fn test_within_bounds() {
        let grid = Grid::new(4);
        assert!(grid.within_bounds(Position::new(0, 0)));
        assert!(grid.within_bounds(Position::new(3, 3)));
        assert!(!grid.within_bounds(Position::new(-1, 0)));
        assert!(!grid.within_bounds(Position::new(0, 4)));
        assert!(!grid.within_bounds(Position::new(4, 0)));
    }

    #[test]
    fn test_cell_content_out_of_bounds_is_none() {
        let grid = Grid::new(4);
        assert!(grid.cell_content(Position::new(-1, 2)).is_none());
        assert!(grid.cell_content(Position::new(2, 17)).is_none());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut grid = Grid::new(4);
        let tile = Tile::new(Position::new(2, 1), 2);
        grid.insert_tile(tile.clone());

        assert_eq!(grid.cell_content(Position::new(2, 1)), Some(&tile));
        assert!(!grid.cell_available(Position::new(2, 1)));
        assert_eq!(grid.available_cells().len(), 15);

        grid.remove_tile(&tile);
        assert!(grid.cell_content(Position::new(2, 1)).is_none());
        assert_eq!(grid.available_cells().len(), 16);
    }

    #[test]
    fn test_remove_does_not_touch_other_cells() {
        let mut grid = Grid::new(4);
        grid.insert_tile(Tile::new(Position::new(0, 0), 2));
        grid.insert_tile(Tile::new(Position::new(1, 0), 4));

        // Stale handle: the tile at (0, 0) in the grid is not this value.
        let stale = Tile::new(Position::new(0, 0), 64);
        grid.remove_tile(&stale);

        assert!(grid.cell_content(Position::new(0, 0)).is_none());
        assert_eq!(grid.cell_content(Position::new(1, 0)).unwrap().value, 4);
    }

    #[test]
    fn test_available_cells_row_major() {
        let mut grid = Grid::new(2);
        grid.insert_tile(Tile::new(Position::new(0, 0), 2));
        assert_eq!(
            grid.available_cells(),
            vec![Position::new(1, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_random_available_cell_full_grid() {
        let mut grid = Grid::new(2);
        for y in 0..2 {
            for x in 0..2 {
                grid.insert_tile(Tile::new(Position::new(x, y), 2));
            }
        }
        let mut rng = StdRng::seed_from_u64(7);
        assert!(grid.random_available_cell(&mut rng).is_none());
        assert!(!grid.cells_available());
    }

    #[test]
    fn test_random_available_cell_only_picks_empty() {
        let mut grid = Grid::new(2);
        grid.insert_tile(Tile::new(Position::new(0, 0), 2));
        grid.insert_tile(Tile::new(Position::new(1, 0), 2));
        grid.insert_tile(Tile::new(Position::new(0, 1), 2));

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(
                grid.random_available_cell(&mut rng),
                Some(Position::new(1, 1))
            );
        }
    }
}
