//! # Storage Module
//!
//! Best-score persistence behind the observer contract.
//!
//! The store is a single small JSON record on disk. A missing or unreadable
//! file reads as a best score of zero; the game never fails because the
//! score file is bad.

use crate::game::{Direction, GameSnapshot, MoveObserver};
use crate::Llm2048Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct BestScoreRecord {
    best_score: u32,
}

/// Reads and writes the best-score file.
#[derive(Debug, Clone)]
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Best score on disk; zero when the file is missing or unreadable.
    pub fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<BestScoreRecord>(&raw).ok())
            .map(|record| record.best_score)
            .unwrap_or(0)
    }

    /// Persists a new best score.
    pub fn save(&self, best_score: u32) -> Llm2048Result<()> {
        let raw = serde_json::to_string(&BestScoreRecord { best_score })?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Observer that tracks the session high score and persists improvements.
pub struct ScoreKeeper {
    store: BestScoreStore,
    best: u32,
}

impl ScoreKeeper {
    /// Creates a keeper seeded from the store's current contents.
    pub fn new(store: BestScoreStore) -> Self {
        let best = store.load();
        Self { store, best }
    }

    /// Best score seen so far, including previous sessions.
    pub fn best(&self) -> u32 {
        self.best
    }
}

impl MoveObserver for ScoreKeeper {
    fn on_move(
        &mut self,
        snapshot: &GameSnapshot,
        _direction: Option<Direction>,
    ) -> Llm2048Result<()> {
        // Persist on every improvement rather than at termination: a quit
        // never passes through the terminate notification.
        if snapshot.score > self.best {
            self.best = snapshot.score;
            self.store.save(self.best)?;
        }
        Ok(())
    }

    fn on_terminate(&mut self, _snapshot: &GameSnapshot) -> Llm2048Result<()> {
        self.store.save(self.best)
    }
}
