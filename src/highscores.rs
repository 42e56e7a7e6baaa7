//! High score leaderboard
//!
//! Kept in memory for the life of the process and carried across restarts.
//! Serializable so an outer layer can persist it; the core never does.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score, rounded down
    pub score: u64,
    /// Stage reached (1-4)
    pub stage: u8,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
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

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_score(&mut self, score: u64, stage: u8) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, stage };

        // Ties keep the earlier run ahead
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("New high score #{rank}: {score} (stage {stage})");
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_leaderboard() {
        let scores = HighScores::new();
        assert!(scores.is_empty());
        assert!(scores.qualifies(1));
        assert!(!scores.qualifies(0));
        assert_eq!(scores.top_score(), None);
    }

    #[test]
    fn test_sorted_insert() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(150, 2), Some(1));
        assert_eq!(scores.add_score(400, 3), Some(1));
        assert_eq!(scores.add_score(200, 2), Some(2));

        let ordered: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![400, 200, 150]);
        assert_eq!(scores.entries[0].stage, 3);
        assert_eq!(scores.top_score(), Some(400));
    }

    #[test]
    fn test_keeps_top_ten() {
        let mut scores = HighScores::new();
        for i in 1..=12u64 {
            scores.add_score(i * 10, 1);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
        assert!(!scores.qualifies(30));
        assert_eq!(scores.potential_rank(31), Some(10));
        assert_eq!(scores.add_score(5, 1), None);
    }

    #[test]
    fn test_tie_ranks_after_existing() {
        let mut scores = HighScores::new();
        scores.add_score(100, 1);
        assert_eq!(scores.add_score(100, 2), Some(2));
        assert_eq!(scores.entries[0].stage, 1);
    }
}
