//! # Tile
//!
//! A single numbered piece on the board.

use crate::game::Position;

/// One numbered tile, owned by exactly one grid cell at a time.
///
/// `previous_position` and `merged_from` are bookkeeping for the current
/// move: the former lets observers diff consecutive board states, the
/// latter marks a tile as the product of a merge so it cannot merge again
/// within the same move. Both are reset by [`Tile::prepare_for_move`] at
/// the start of every move.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Current board coordinate; kept in sync with the owning cell
    pub position: Position,
    /// Tile value, a power of two starting at 2
    pub value: u32,
    /// Coordinate at the start of the current move
    pub previous_position: Option<Position>,
    /// The pair of tiles consumed to produce this one, if it was merged
    /// during the current move
    pub merged_from: Option<Box<(Tile, Tile)>>,
}

impl Tile {
    /// Creates a fresh tile at the given position.
    pub fn new(position: Position, value: u32) -> Self {
        Self {
            position,
            value,
            previous_position: None,
            merged_from: None,
        }
    }

    /// Creates the result of merging two equal-valued tiles.
    pub fn merged(position: Position, value: u32, sources: (Tile, Tile)) -> Self {
        Self {
            position,
            value,
            previous_position: None,
            merged_from: Some(Box::new(sources)),
        }
    }

    /// Clears merge bookkeeping and snapshots the current coordinate.
    pub fn prepare_for_move(&mut self) {
        self.merged_from = None;
        self.previous_position = Some(self.position);
    }

    /// Moves the tile to a new coordinate.
    pub fn update_position(&mut self, position: Position) {
        self.position = position;
    }
}
