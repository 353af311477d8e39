//! Score Tracking
//!
//! Score comes from kills: each tick the tracker samples how many NPCs are
//! still alive and credits [`POINTS_PER_KILL`] for every one that disappeared
//! since the last sample. Sample exactly once per tick.

/// Points credited per NPC killed.
pub const POINTS_PER_KILL: u64 = 10;

/// Read-only view of how many NPCs are alive.
pub trait NpcCountSource {
    /// NPCs whose `alive` flag is set.
    fn alive_npcs(&self) -> usize;
}

/// Authoritative score for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u64,
    baseline: usize,
}

impl ScoreTracker {
    /// Tracker at zero with the given NPC baseline.
    pub fn new(baseline: usize) -> Self {
        Self { score: 0, baseline }
    }

    /// Start a new game: score back to zero, baseline re-armed.
    pub fn reset(&mut self, baseline: usize) {
        self.score = 0;
        self.baseline = baseline;
    }

    /// Sample the alive count and credit any kills. Returns points credited.
    ///
    /// A rising count (spawns) moves the baseline up without crediting.
    pub fn sample<S: NpcCountSource + ?Sized>(&mut self, source: &S) -> u64 {
        self.observe(source.alive_npcs())
    }

    /// Same as [`ScoreTracker::sample`] with a raw count.
    pub fn observe(&mut self, alive: usize) -> u64 {
        let killed = self.baseline.saturating_sub(alive);
        self.baseline = alive;
        if killed == 0 {
            return 0;
        }
        self.credit_kills(killed as u64);
        (killed as u64).saturating_mul(POINTS_PER_KILL)
    }

    /// Credit `n` kills directly.
    pub fn credit_kills(&mut self, n: u64) {
        self.score = self.score.saturating_add(n.saturating_mul(POINTS_PER_KILL));
    }

    /// Current score.
    pub fn current_score(&self) -> u64 {
        self.score
    }

    /// Alive count at the last sample.
    pub fn baseline(&self) -> usize {
        self.baseline
    }
}
