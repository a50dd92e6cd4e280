//! # LLM2048
//!
//! A terminal rendition of the 2048 sliding-tile puzzle with an optional
//! LLM-driven automated player.
//!
//! ## Architecture Overview
//!
//! The crate is split along the seams of the game's control flow:
//!
//! - **Game Core**: [`Grid`], [`Tile`], and [`GameEngine`]; the complete
//!   rule set lives in [`GameEngine::apply_move`]
//! - **Move Sources**: producers of direction inputs behind the
//!   [`MoveSource`] contract (keyboard, LLM player)
//! - **Move Observers**: sinks notified after every move behind the
//!   [`MoveObserver`] contract (terminal renderer, best-score keeper)
//! - **Rendering System**: terminal-based rendering using crossterm
//!
//! The engine is synchronous and single-writer; the asynchronous boundary
//! (awaiting a chat-completion response, listening for a quit key) lives
//! entirely in the move sources.

pub mod game;
pub mod input;
pub mod llm;
pub mod rendering;
pub mod storage;

pub use game::{
    Direction, GameEngine, GameSnapshot, Grid, MoveObserver, MoveSource, Position, Tile,
    TileSnapshot,
};
pub use input::{map_key_event, InputEvent, InputListener, KeyboardSource};
pub use llm::{board_text, LlmConfig, LlmPlayer, LlmSource, UsageTracker};
pub use rendering::{TerminalRenderer, TerminalSession};
pub use storage::{BestScoreStore, ScoreKeeper};

/// Core error type for the LLM2048 crate.
#[derive(thiserror::Error, Debug)]
pub enum Llm2048Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// HTTP request to the completion endpoint failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// LLM player error
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Result type used throughout the LLM2048 codebase.
pub type Llm2048Result<T> = Result<T, Llm2048Error>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default square grid dimension
    pub const DEFAULT_GRID_SIZE: i32 = 4;

    /// Number of random tiles placed at game start
    pub const START_TILES: usize = 2;

    /// Tile value that flips the `won` flag
    pub const WIN_TILE_VALUE: u32 = 2048;

    /// Probability that a freshly spawned tile has value 2 (else 4)
    pub const TWO_TILE_PROBABILITY: f64 = 0.9;

    /// Default chat-completion endpoint for the automated player
    pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

    /// Default model for the automated player
    pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
}
