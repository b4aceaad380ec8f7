use std::fmt;

use serde::{Deserialize, Serialize};

/// Converts the rows cleared by one lock into points.
pub trait ScorePolicy: fmt::Debug {
    fn score_delta(&self, completed_rows: usize) -> u64;
}

/// `base` points for every cleared row, capped at `u64::MAX`.
///
/// A four-row clear is worth exactly four single clears; there is no bonus for
/// clearing several rows at once.
///
/// # Example
///
/// ```
/// use blockfall_engine::{LinearScore, ScorePolicy as _};
///
/// let policy = LinearScore { base: 100 };
/// assert_eq!(policy.score_delta(0), 0);
/// assert_eq!(policy.score_delta(3), 300);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearScore {
    pub base: u64,
}

impl ScorePolicy for LinearScore {
    fn score_delta(&self, completed_rows: usize) -> u64 {
        self.base.saturating_mul(completed_rows as u64)
    }
}

/// The n-th row cleared by a single lock is worth `n * base`.
///
/// Clearing `n` rows at once therefore scores `base * n * (n + 1) / 2`, capped at
/// `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressiveScore {
    pub base: u64,
}

impl ScorePolicy for ProgressiveScore {
    fn score_delta(&self, completed_rows: usize) -> u64 {
        let n = completed_rows as u64;
        self.base.saturating_mul(n.saturating_mul(n.saturating_add(1)) / 2)
    }
}

/// Selects a [`ScorePolicy`] by name.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    #[default]
    Linear,
    Progressive,
}

impl ScoringMode {
    #[must_use]
    pub fn policy(self, base: u64) -> Box<dyn ScorePolicy> {
        match self {
            ScoringMode::Linear => Box::new(LinearScore { base }),
            ScoringMode::Progressive => Box::new(ProgressiveScore { base }),
        }
    }
}

/// Running totals of a game.
///
/// - **Score**: sum of every score delta
/// - **Locked pieces**: number of pieces committed to the grid
/// - **Cleared lines**: total rows removed
/// - **Line clear distribution**: how many locks cleared 0, 1, 2, 3 and 4 rows
///
/// The level is derived from the cleared lines and does not affect gravity.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4, 400);
///
/// assert_eq!(stats.score(), 400);
/// assert_eq!(stats.cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: u64,
    locked_pieces: usize,
    cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            locked_pieces: 0,
            cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// One level per 10 cleared lines.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.cleared_lines / 10
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Returns a histogram of locks by the number of rows they cleared.
    ///
    /// Index `n` counts the locks that cleared exactly `n` rows.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates the totals after a piece locks.
    pub const fn record_lock(&mut self, cleared_rows: usize, score_delta: u64) {
        self.locked_pieces += 1;
        self.cleared_lines += cleared_rows;
        if cleared_rows < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_rows] += 1;
        }
        self.score = self.score.saturating_add(score_delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_score() {
        let policy = LinearScore { base: 100 };
        let deltas: Vec<_> = (0..=4).map(|n| policy.score_delta(n)).collect();
        assert_eq!(deltas, [0, 100, 200, 300, 400]);
    }

    #[test]
    fn test_progressive_score() {
        let policy = ProgressiveScore { base: 100 };
        let deltas: Vec<_> = (0..=4).map(|n| policy.score_delta(n)).collect();
        assert_eq!(deltas, [0, 100, 300, 600, 1000]);
    }

    #[test]
    fn test_huge_base_saturates() {
        let base = u64::MAX / 2 + 1;
        assert_eq!(LinearScore { base }.score_delta(1), base);
        assert_eq!(LinearScore { base }.score_delta(2), u64::MAX);
        assert_eq!(ProgressiveScore { base }.score_delta(4), u64::MAX);

        let mut stats = GameStats::new();
        stats.record_lock(1, base);
        stats.record_lock(1, base);
        assert_eq!(stats.score(), u64::MAX);
    }

    #[test]
    fn test_scoring_mode() {
        assert_eq!(ScoringMode::default(), ScoringMode::Linear);
        assert_eq!(ScoringMode::Linear.policy(50).score_delta(2), 100);
        assert_eq!(ScoringMode::Progressive.policy(50).score_delta(2), 150);
        assert_eq!(
            "progressive".parse::<ScoringMode>().unwrap(),
            ScoringMode::Progressive
        );
        assert_eq!(
            serde_json::to_string(&ScoringMode::Progressive).unwrap(),
            "\"progressive\""
        );
    }

    #[test]
    fn test_stats_record_lock() {
        let mut stats = GameStats::new();
        stats.record_lock(0, 0);
        stats.record_lock(2, 200);
        stats.record_lock(4, 400);
        stats.record_lock(4, 400);

        assert_eq!(stats.score(), 1000);
        assert_eq!(stats.locked_pieces(), 4);
        assert_eq!(stats.cleared_lines(), 10);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.line_cleared_counter(), &[1, 0, 1, 0, 2]);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = GameStats::new();
        stats.record_lock(1, 100);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["score"], 100);
        assert_eq!(value["cleared_lines"], 1);
        assert_eq!(value["line_cleared_counter"], serde_json::json!([0, 1, 0, 0, 0]));
    }
}
