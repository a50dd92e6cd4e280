//! # Game Engine
//!
//! The complete 2048 rule set: move resolution, merging, random tile
//! insertion, and terminal-condition detection.
//!
//! The engine is the single writer of game state. Move sources feed
//! directions in through [`GameEngine::apply_move`]; observers receive a
//! [`GameSnapshot`] after every move.

use crate::game::{Direction, Grid, Position, Tile};
use crate::{config, Llm2048Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Serialized form of one tile, as exposed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub position: Position,
    pub value: u32,
}

/// Full board state handed to observers after every move.
///
/// `cells` is row-major: `cells[y][x]` is the cell at coordinate `(x, y)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub size: i32,
    pub cells: Vec<Vec<Option<TileSnapshot>>>,
    pub score: u32,
    pub over: bool,
    pub won: bool,
}

impl GameSnapshot {
    /// Total number of tiles on the board.
    pub fn tile_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Value of the tile at `(x, y)`, if any.
    pub fn value_at(&self, x: i32, y: i32) -> Option<u32> {
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .and_then(|cell| cell.as_ref().map(|tile| tile.value))
    }
}

/// Sink notified after every move and once on termination.
///
/// Implementations must tolerate being called for no-op moves, including
/// calls made after the game is already over.
pub trait MoveObserver {
    /// Called synchronously after every [`GameEngine::apply_move`], and once
    /// at session start with `direction = None`.
    fn on_move(&mut self, snapshot: &GameSnapshot, direction: Option<Direction>)
        -> Llm2048Result<()>;

    /// Called exactly once, when `over` transitions to true.
    fn on_terminate(&mut self, _snapshot: &GameSnapshot) -> Llm2048Result<()> {
        Ok(())
    }
}

/// Producer of direction inputs. Keyboard and LLM sources are
/// interchangeable behind this contract.
#[allow(async_fn_in_trait)]
pub trait MoveSource {
    /// Resolves to the next direction to play, or `None` on a quit request.
    ///
    /// Only valid directions ever come out of a source; malformed input is
    /// rejected at this boundary, not by the engine.
    async fn next_move(&mut self, snapshot: &GameSnapshot) -> Llm2048Result<Option<Direction>>;
}

/// Owns one grid plus score and terminal flags; `apply_move` is the entire
/// rule set.
pub struct GameEngine {
    /// Square board dimension
    pub size: i32,
    /// The board; exclusively owned
    pub grid: Grid,
    /// Accumulated merge score, non-decreasing within a game
    pub score: u32,
    /// True exactly when no move is possible
    pub over: bool,
    /// True exactly when a tile has reached the win value; play continues
    pub won: bool,
    rng: StdRng,
    observers: Vec<Box<dyn MoveObserver>>,
    terminate_notified: bool,
}

impl GameEngine {
    /// Creates an engine with two starting tiles already placed.
    ///
    /// A fixed `seed` reproduces the same game; `None` seeds from entropy.
    pub fn new(size: i32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut engine = Self {
            size,
            grid: Grid::new(size),
            score: 0,
            over: false,
            won: false,
            rng,
            observers: Vec::new(),
            terminate_notified: false,
        };
        engine.add_start_tiles();
        engine
    }

    /// Registers an observer; all registered observers see every move.
    pub fn add_observer(&mut self, observer: Box<dyn MoveObserver>) {
        self.observers.push(observer);
    }

    /// Notifies observers of the current state without applying a move.
    ///
    /// Used once at session start so the board is visible before the first
    /// input.
    pub fn publish(&mut self) -> Llm2048Result<()> {
        self.notify(None)
    }

    /// Resolves one move. This is the entire game rule set.
    ///
    /// After the game is over this is a defined no-op: the state is left
    /// untouched and observers are still notified (legacy contract).
    pub fn apply_move(&mut self, direction: Direction) -> Llm2048Result<()> {
        if self.over {
            return self.notify(Some(direction));
        }

        self.prepare_tiles();

        let vector = direction.vector();
        let (xs, ys) = self.build_traversals(vector);
        let mut moved = false;

        // Tiles nearest the destination edge are processed first, so a tile
        // slides into space freed by the tiles ahead of it.
        for &x in &xs {
            for &y in &ys {
                let cell = Position::new(x, y);
                let Some(tile) = self.grid.cell_content(cell).cloned() else {
                    continue;
                };

                let (farthest, next) = self.find_farthest_position(cell, vector);
                let target = self
                    .grid
                    .cell_content(next)
                    .filter(|other| other.value == tile.value && other.merged_from.is_none())
                    .cloned();

                if let Some(target) = target {
                    // One merge per tile per move: the merged tile carries
                    // its sources in merged_from, which blocks re-merging.
                    // The consumed mover converges onto the target cell so
                    // observers can diff both sources against one spot.
                    let mut moving = tile.clone();
                    moving.update_position(next);
                    let merged = Tile::merged(next, tile.value * 2, (moving, target));
                    let merged_value = merged.value;
                    self.grid.insert_tile(merged);
                    self.grid.remove_tile(&tile);

                    self.score += merged_value;
                    if merged_value == config::WIN_TILE_VALUE {
                        self.won = true;
                    }
                    moved = true;
                } else if farthest != cell {
                    self.move_tile(&tile, farthest);
                    moved = true;
                }
            }
        }

        if moved {
            self.add_random_tile();
            if !self.moves_available() {
                self.over = true;
            }
        }

        self.notify(Some(direction))
    }

    /// Inserts one random tile into an empty cell: value 2 with probability
    /// 0.9, else 4. No-op when the grid is full.
    pub fn add_random_tile(&mut self) {
        if !self.grid.cells_available() {
            return;
        }
        let value = if self.rng.gen::<f64>() < config::TWO_TILE_PROBABILITY {
            2
        } else {
            4
        };
        if let Some(cell) = self.grid.random_available_cell(&mut self.rng) {
            self.grid.insert_tile(Tile::new(cell, value));
        }
    }

    /// True iff the board has an empty cell or any cardinally-adjacent
    /// equal-valued pair.
    pub fn moves_available(&self) -> bool {
        self.grid.cells_available() || self.tile_matches_available()
    }

    /// Builds the serialized board state for observers.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut cells = vec![vec![None; self.size as usize]; self.size as usize];
        for tile in self.grid.tiles() {
            cells[tile.position.y as usize][tile.position.x as usize] = Some(TileSnapshot {
                position: tile.position,
                value: tile.value,
            });
        }
        GameSnapshot {
            size: self.size,
            cells,
            score: self.score,
            over: self.over,
            won: self.won,
        }
    }

    fn add_start_tiles(&mut self) {
        for _ in 0..config::START_TILES {
            self.add_random_tile();
        }
    }

    /// Clears merge bookkeeping and snapshots tile positions before a move.
    fn prepare_tiles(&mut self) {
        for tile in self.grid.tiles_mut() {
            tile.prepare_for_move();
        }
    }

    /// Iteration order over the board: from the farthest edge in the
    /// direction of travel first.
    fn build_traversals(&self, vector: Position) -> (Vec<i32>, Vec<i32>) {
        let mut xs: Vec<i32> = (0..self.size).collect();
        let mut ys: Vec<i32> = (0..self.size).collect();
        if vector.x == 1 {
            xs.reverse();
        }
        if vector.y == 1 {
            ys.reverse();
        }
        (xs, ys)
    }

    /// Steps from `cell` along `vector` while the next cell is empty.
    ///
    /// Returns the last empty cell reached and the first blocked or
    /// out-of-bounds cell beyond it (the merge candidate).
    fn find_farthest_position(&self, cell: Position, vector: Position) -> (Position, Position) {
        let mut farthest = cell;
        let mut next = cell + vector;
        while self.grid.within_bounds(next) && self.grid.cell_available(next) {
            farthest = next;
            next = next + vector;
        }
        (farthest, next)
    }

    fn move_tile(&mut self, tile: &Tile, to: Position) {
        self.grid.remove_tile(tile);
        let mut moved = tile.clone();
        moved.update_position(to);
        self.grid.insert_tile(moved);
    }

    fn tile_matches_available(&self) -> bool {
        for tile in self.grid.tiles() {
            for direction in Direction::ALL {
                let neighbor = tile.position + direction.vector();
                if let Some(other) = self.grid.cell_content(neighbor) {
                    if other.value == tile.value {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn notify(&mut self, direction: Option<Direction>) -> Llm2048Result<()> {
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_move(&snapshot, direction)?;
        }
        if self.over && !self.terminate_notified {
            self.terminate_notified = true;
            for observer in &mut self.observers {
                observer.on_terminate(&snapshot)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_engine(size: i32) -> GameEngine {
        let mut engine = GameEngine::new(size, Some(0));
        engine.grid = Grid::new(size);
        engine.score = 0;
        engine
    }

    #[test]
    fn test_new_game_has_two_start_tiles() {
        let engine = GameEngine::new(4, Some(42));
        assert_eq!(engine.grid.tiles().count(), 2);
        assert_eq!(engine.score, 0);
        assert!(!engine.over);
        assert!(!engine.won);
        for tile in engine.grid.tiles() {
            assert!(tile.value == 2 || tile.value == 4);
        }
    }

    #[test]
    fn test_same_seed_same_start() {
        let a = GameEngine::new(4, Some(1234));
        let b = GameEngine::new(4, Some(1234));
        assert_eq!(a.snapshot().cells, b.snapshot().cells);
    }

    #[test]
    fn test_traversal_order_favors_destination_edge() {
        let engine = empty_engine(4);

        let (xs, ys) = engine.build_traversals(Direction::Right.vector());
        assert_eq!(xs, vec![3, 2, 1, 0]);
        assert_eq!(ys, vec![0, 1, 2, 3]);

        let (xs, ys) = engine.build_traversals(Direction::Down.vector());
        assert_eq!(xs, vec![0, 1, 2, 3]);
        assert_eq!(ys, vec![3, 2, 1, 0]);

        let (xs, ys) = engine.build_traversals(Direction::Left.vector());
        assert_eq!(xs, vec![0, 1, 2, 3]);
        assert_eq!(ys, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_find_farthest_position_open_run() {
        let mut engine = empty_engine(4);
        engine.grid.insert_tile(Tile::new(Position::new(3, 0), 2));

        let (farthest, next) =
            engine.find_farthest_position(Position::new(3, 0), Direction::Left.vector());
        assert_eq!(farthest, Position::new(0, 0));
        assert_eq!(next, Position::new(-1, 0));
    }

    #[test]
    fn test_find_farthest_position_blocked() {
        let mut engine = empty_engine(4);
        engine.grid.insert_tile(Tile::new(Position::new(0, 0), 4));
        engine.grid.insert_tile(Tile::new(Position::new(3, 0), 2));

        let (farthest, next) =
            engine.find_farthest_position(Position::new(3, 0), Direction::Left.vector());
        assert_eq!(farthest, Position::new(1, 0));
        assert_eq!(next, Position::new(0, 0));
    }

    #[test]
    fn test_add_random_tile_fills_an_empty_cell() {
        let mut engine = empty_engine(2);
        engine.grid.insert_tile(Tile::new(Position::new(0, 0), 2));
        engine.grid.insert_tile(Tile::new(Position::new(1, 0), 4));
        engine.grid.insert_tile(Tile::new(Position::new(0, 1), 8));

        engine.add_random_tile();

        let spawned = engine
            .grid
            .cell_content(Position::new(1, 1))
            .expect("tile in the only empty cell");
        assert!(spawned.value == 2 || spawned.value == 4);
        assert!(!engine.grid.cells_available());
    }

    #[test]
    fn test_add_random_tile_noop_when_full() {
        let mut engine = empty_engine(2);
        for y in 0..2 {
            for x in 0..2 {
                engine.grid.insert_tile(Tile::new(Position::new(x, y), 2));
            }
        }
        engine.add_random_tile();
        assert_eq!(engine.grid.tiles().count(), 4);
    }

    #[test]
    fn test_simple_slide_left() {
        let mut engine = empty_engine(4);
        engine.grid.insert_tile(Tile::new(Position::new(3, 2), 2));

        engine.apply_move(Direction::Left).unwrap();

        let tile = engine
            .grid
            .cell_content(Position::new(0, 2))
            .expect("tile slid to the left wall");
        assert_eq!(tile.value, 2);
        assert_eq!(tile.previous_position, Some(Position::new(3, 2)));
        // One slid tile plus one spawned tile.
        assert_eq!(engine.grid.tiles().count(), 2);
        assert_eq!(engine.score, 0);
    }

    #[test]
    fn test_chained_slide_preserves_order() {
        let mut engine = empty_engine(4);
        engine.grid.insert_tile(Tile::new(Position::new(1, 0), 2));
        engine.grid.insert_tile(Tile::new(Position::new(2, 0), 4));

        engine.apply_move(Direction::Right).unwrap();

        assert_eq!(engine.snapshot().value_at(3, 0), Some(4));
        assert_eq!(engine.snapshot().value_at(2, 0), Some(2));
    }
}
