//! Leaderboard Cache
//!
//! Last-known top scores, replaced wholesale on every successful fetch.

use tracing::{debug, warn};

use crate::ledger::{FetchError, ScoreRecord};

/// Rows kept on the board.
pub const LEADERBOARD_SIZE: usize = 10;

/// Ordered top scores: score descending, at most [`LEADERBOARD_SIZE`] rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// Normalize raw rows. Ties keep the order the source returned.
    /// Duplicate addresses are kept as given.
    pub fn from_records(mut records: Vec<ScoreRecord>) -> Self {
        records.sort_by(|a, b| b.score.cmp(&a.score));
        records.truncate(LEADERBOARD_SIZE);
        Self { entries: records }
    }

    /// Rows, best first.
    pub fn entries(&self) -> &[ScoreRecord] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the board has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a failed fetch does to the cached rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Clear the board rather than show rows that look fresher than they are.
    #[default]
    ResetToEmpty,
    /// Keep showing the last good rows.
    KeepStale,
}

/// Cached leaderboard fed by fetch completions.
///
/// Completions are applied in arrival order, so the most recently completed
/// fetch wins regardless of when it was issued.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardCache {
    board: Leaderboard,
    policy: FetchFailurePolicy,
    consecutive_failures: u32,
}

impl LeaderboardCache {
    /// Empty cache with the given failure policy.
    pub fn new(policy: FetchFailurePolicy) -> Self {
        Self {
            board: Leaderboard::default(),
            policy,
            consecutive_failures: 0,
        }
    }

    /// Apply a fetch outcome.
    pub fn apply(&mut self, result: Result<Vec<ScoreRecord>, FetchError>) {
        match result {
            Ok(records) => {
                self.board = Leaderboard::from_records(records);
                self.consecutive_failures = 0;
                debug!("Leaderboard refreshed: {} rows", self.board.len());
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    "Leaderboard fetch failed ({} in a row): {}",
                    self.consecutive_failures, e
                );
                if self.policy == FetchFailurePolicy::ResetToEmpty {
                    self.board = Leaderboard::default();
                }
            }
        }
    }

    /// Current board.
    pub fn board(&self) -> &Leaderboard {
        &self.board
    }

    /// Failure policy in effect.
    pub fn policy(&self) -> FetchFailurePolicy {
        self.policy
    }

    /// Failed fetches since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
