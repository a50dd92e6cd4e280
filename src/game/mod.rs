//! # Game Module
//!
//! The 2048 rule set: board coordinates, tiles, the grid container, and the
//! move-resolution engine.
//!
//! Everything in this module is synchronous and deterministic apart from
//! random tile insertion, which draws from an engine-owned seedable RNG.

pub mod engine;
pub mod grid;
pub mod tile;

pub use engine::*;
pub use grid::*;
pub use tile::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the board.
///
/// Also used as a coordinate delta: movement is expressed as a unit vector
/// added to a position, so the same traversal code handles all four
/// directions.
///
/// # Examples
///
/// ```
/// use llm2048::Position;
///
/// let pos = Position::new(1, 2);
/// assert_eq!(pos + Position::new(0, -1), Position::new(1, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// The four cardinal move directions.
///
/// The discriminants follow the wire mapping of the automated-player
/// protocol: 0 = up, 1 = right, 2 = down, 3 = left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All four directions, in wire order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Converts a direction to its movement vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use llm2048::{Direction, Position};
    ///
    /// assert_eq!(Direction::Up.vector(), Position::new(0, -1));
    /// assert_eq!(Direction::Left.vector(), Position::new(-1, 0));
    /// ```
    pub fn vector(self) -> Position {
        match self {
            Direction::Up => Position::new(0, -1),
            Direction::Right => Position::new(1, 0),
            Direction::Down => Position::new(0, 1),
            Direction::Left => Position::new(-1, 0),
        }
    }

    /// Converts a wire digit to a direction.
    ///
    /// Returns `None` for anything outside `0..=3`.
    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_addition() {
        let pos = Position::new(2, 3);
        assert_eq!(pos + Position::new(1, 0), Position::new(3, 3));
        assert_eq!(pos + Position::new(0, -1), Position::new(2, 2));
    }

    #[test]
    fn test_direction_vectors() {
        assert_eq!(Direction::Up.vector(), Position::new(0, -1));
        assert_eq!(Direction::Right.vector(), Position::new(1, 0));
        assert_eq!(Direction::Down.vector(), Position::new(0, 1));
        assert_eq!(Direction::Left.vector(), Position::new(-1, 0));
    }

    #[test]
    fn test_direction_from_index() {
        assert_eq!(Direction::from_index(0), Some(Direction::Up));
        assert_eq!(Direction::from_index(1), Some(Direction::Right));
        assert_eq!(Direction::from_index(2), Some(Direction::Down));
        assert_eq!(Direction::from_index(3), Some(Direction::Left));
        assert_eq!(Direction::from_index(4), None);
        assert_eq!(Direction::from_index(255), None);
    }

    #[test]
    fn test_direction_index_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_index(direction as u8), Some(direction));
        }
    }
}
