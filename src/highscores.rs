//! High score leaderboard system
//!
//! Persisted to `highscores.json`, tracks the top 10 scores.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Default leaderboard file name
pub const HIGHSCORE_FILE: &str = "highscores.json";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player name
    pub name: String,
    /// Final score
    pub score: u64,
    /// Unix timestamp (ms) when recorded
    pub timestamp: i64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a score, re-sort descending and keep the top entries.
    ///
    /// The sort is stable, so equal scores keep insertion order. Returns the
    /// 1-indexed rank, or None if the score fell off the board.
    pub fn add_score(&mut self, name: &str, score: u64, timestamp: i64) -> Option<usize> {
        self.entries.push(HighScoreEntry {
            name: name.to_string(),
            score,
            timestamp,
        });
        let inserted = self.entries.len() - 1;

        let mut indexed: Vec<(usize, HighScoreEntry)> =
            self.entries.drain(..).enumerate().collect();
        indexed.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        indexed.truncate(MAX_HIGH_SCORES);

        let rank = indexed.iter().position(|(i, _)| *i == inserted).map(|p| p + 1);
        self.entries = indexed.into_iter().map(|(_, e)| e).collect();
        rank
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Scores of the last `n` stored entries
    pub fn recent_scores(&self, n: usize) -> Vec<u64> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| e.score).collect()
    }

    /// Load high scores from a JSON file
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        Ok(persistence::read_json(path)?.unwrap_or_default())
    }

    /// Save high scores to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json(path, self)
    }
}

/// Score persistence collaborator
pub trait ScoreStore {
    /// Record a finished game
    fn save_score(&mut self, name: &str, score: u64, timestamp: i64);
    /// Current top-10, or empty if nothing is stored
    fn high_scores(&self) -> Vec<HighScoreEntry>;
}

/// In-memory leaderboard (tests, sessions without a disk)
impl ScoreStore for HighScores {
    fn save_score(&mut self, name: &str, score: u64, timestamp: i64) {
        self.add_score(name, score, timestamp);
    }

    fn high_scores(&self) -> Vec<HighScoreEntry> {
        self.entries.clone()
    }
}

/// Shared handle, so the caller can read back what the game stored
impl<S: ScoreStore> ScoreStore for Rc<RefCell<S>> {
    fn save_score(&mut self, name: &str, score: u64, timestamp: i64) {
        self.borrow_mut().save_score(name, score, timestamp);
    }

    fn high_scores(&self) -> Vec<HighScoreEntry> {
        self.borrow().high_scores()
    }
}

/// Leaderboard stored in a JSON file.
///
/// Read and write failures are logged and never propagate: a broken file
/// behaves like an empty leaderboard.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> HighScores {
        match HighScores::load(&self.path) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Error reading high scores: {}", e);
                HighScores::new()
            }
        }
    }
}

impl ScoreStore for JsonScoreStore {
    fn save_score(&mut self, name: &str, score: u64, timestamp: i64) {
        let mut scores = self.read();
        let rank = scores.add_score(name, score, timestamp);
        match scores.save(&self.path) {
            Ok(()) => log::info!(
                "High scores saved ({} entries, rank {:?})",
                scores.entries.len(),
                rank
            ),
            Err(e) => log::error!("Error saving high score: {}", e),
        }
    }

    fn high_scores(&self) -> Vec<HighScoreEntry> {
        self.read().entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_descending_and_capped() {
        let mut scores = HighScores::new();
        for (i, score) in [5, 40, 12, 90, 1, 33, 70, 8, 21, 60, 2, 99].iter().enumerate() {
            scores.add_score("p", *score, i as i64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(99));
        let values: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![99, 90, 70, 60, 40, 33, 21, 12, 8, 5]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut scores = HighScores::new();
        scores.add_score("first", 10, 1);
        scores.add_score("second", 10, 2);
        assert_eq!(scores.add_score("third", 10, 3), Some(3));
        let names: Vec<&str> = scores.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_none_when_bumped_off() {
        let mut scores = HighScores::new();
        for i in 0..MAX_HIGH_SCORES {
            scores.add_score("p", 100, i as i64);
        }
        assert_eq!(scores.add_score("low", 1, 99), None);
        assert_eq!(scores.add_score("high", 500, 100), Some(1));
    }

    #[test]
    fn test_recent_scores_takes_tail() {
        let mut scores = HighScores::new();
        scores.add_score("a", 30, 0);
        scores.add_score("b", 20, 1);
        scores.add_score("c", 10, 2);
        scores.add_score("d", 5, 3);
        assert_eq!(scores.recent_scores(3), vec![20, 10, 5]);
        assert_eq!(HighScores::new().recent_scores(3), Vec::<u64>::new());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonScoreStore::new(dir.path().join(HIGHSCORE_FILE));
        assert!(store.high_scores().is_empty());

        store.save_score("Player", 42, 1000);
        store.save_score("Player", 77, 2000);

        let reopened = JsonScoreStore::new(dir.path().join(HIGHSCORE_FILE));
        let entries = reopened.high_scores();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].score, 77);
        assert_eq!(entries[1].name, "Player");
    }

    #[test]
    fn test_json_store_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HIGHSCORE_FILE);
        std::fs::write(&path, "{{{").unwrap();

        let mut store = JsonScoreStore::new(&path);
        assert!(store.high_scores().is_empty());
        // Saving over a corrupt file starts a fresh board
        store.save_score("Player", 3, 0);
        assert_eq!(store.high_scores().len(), 1);
    }
}
