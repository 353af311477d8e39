//! Session State
//!
//! The explicit context the frame loop threads through each tick: current
//! mode, score, end-of-game signal, exit overlay, cached leaderboard and the
//! wallet. Components take only the part they need.
//!
//! - `state`: mode machine and end-of-game signal
//! - `score`: kill-based score tracking
//! - `leaderboard`: cached top scores
//! - `overlay`: "Game Exited" timer

pub mod leaderboard;
pub mod overlay;
pub mod score;
pub mod state;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FrameConfig;
use crate::ledger::Completion;
use crate::wallet::WalletManager;

pub use leaderboard::{FetchFailurePolicy, Leaderboard, LeaderboardCache, LEADERBOARD_SIZE};
pub use overlay::DisclaimerTimer;
pub use score::{NpcCountSource, ScoreTracker, POINTS_PER_KILL};
pub use state::{EndKind, EndOfGameSignal, SessionMode, Trigger};

/// Everything one player session owns.
#[derive(Debug)]
pub struct Session {
    /// Identifier used in logs.
    pub id: Uuid,
    mode: SessionMode,
    /// Score for the current game.
    pub score: ScoreTracker,
    /// Pending terminal condition.
    pub end_of_game: EndOfGameSignal,
    /// Exit overlay.
    pub overlay: DisclaimerTimer,
    /// Last fetched leaderboard.
    pub leaderboard: LeaderboardCache,
    /// Session wallet.
    pub wallet: WalletManager,
    /// Final score of the last finished game.
    pub last_score: Option<u64>,
    /// This wallet's score as recorded on chain.
    pub recorded_score: Option<u64>,
    /// How the last game ended (`None` for an exit).
    pub last_end: Option<EndKind>,
}

impl Session {
    /// Fresh session on the landing screen.
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: SessionMode::Landing,
            score: ScoreTracker::default(),
            end_of_game: EndOfGameSignal::default(),
            overlay: DisclaimerTimer::new(config.disclaimer_window),
            leaderboard: LeaderboardCache::new(config.fetch_failure_policy),
            wallet: WalletManager::new(),
            last_score: None,
            recorded_score: None,
            last_end: None,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Apply `trigger`. Returns the new mode, or `None` (and changes
    /// nothing) if the transition is not legal from the current mode.
    pub fn transition(&mut self, trigger: Trigger) -> Option<SessionMode> {
        let next = self.mode.next(trigger)?;
        info!("Session {}: {:?} -> {:?} ({:?})", self.id, self.mode, next, trigger);
        self.mode = next;
        Some(next)
    }

    /// Fold a ledger completion into session state.
    ///
    /// Returns `true` when a score was newly recorded on chain.
    pub fn apply_completion(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Funded { id, result } => {
                self.wallet.complete_funding(id, result);
                false
            }
            Completion::ScoreSubmitted { score, result, .. } => match result {
                Ok(receipt) => {
                    info!("Score {} confirmed at version {}", score, receipt.version);
                    true
                }
                Err(e) => {
                    // Dropped for good; a later game submits its own score.
                    warn!("Score {} was not recorded: {}", score, e);
                    false
                }
            },
            Completion::Leaderboard { result, .. } => {
                self.leaderboard.apply(result);
                false
            }
            Completion::PlayerScore { player, result, .. } => {
                let ours = self.wallet.account().map(|a| a.address()) == Some(player);
                match result {
                    Ok(score) if ours => self.recorded_score = Some(score),
                    Ok(_) => {}
                    Err(e) => warn!("Could not read score for {}: {}", player.short(), e),
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        AccountAddress, FetchError, LedgerError, OperationId, ScoreRecord, SubmitError, TxReceipt,
    };

    fn session() -> Session {
        Session::new(&FrameConfig::default())
    }

    #[test]
    fn test_illegal_transition_changes_nothing() {
        let mut s = session();
        assert_eq!(s.transition(Trigger::Back), None);
        assert_eq!(s.mode(), SessionMode::Landing);

        assert_eq!(s.transition(Trigger::Start), Some(SessionMode::Playing));
        assert_eq!(s.transition(Trigger::ViewLeaderboard), None);
        assert_eq!(s.mode(), SessionMode::Playing);
    }

    #[test]
    fn test_leaderboard_completion_updates_cache() {
        let mut s = session();
        let rows = vec![ScoreRecord::new(AccountAddress::ONE, 10)];
        s.apply_completion(Completion::Leaderboard {
            id: OperationId(1),
            result: Ok(rows.clone()),
        });
        assert_eq!(s.leaderboard.board().entries(), rows.as_slice());

        s.apply_completion(Completion::Leaderboard {
            id: OperationId(2),
            result: Err(FetchError::UnexpectedShape("oops".to_string())),
        });
        assert!(s.leaderboard.board().is_empty());
    }

    #[test]
    fn test_submission_outcomes() {
        let mut s = session();
        let recorded = s.apply_completion(Completion::ScoreSubmitted {
            id: OperationId(1),
            score: 30,
            result: Ok(TxReceipt {
                hash: "0x1".to_string(),
                version: 9,
                gas_used: 5,
                vm_status: "Executed successfully".to_string(),
            }),
        });
        assert!(recorded);

        let recorded = s.apply_completion(Completion::ScoreSubmitted {
            id: OperationId(2),
            score: 30,
            result: Err(SubmitError::Exhausted {
                attempts: 3,
                last: LedgerError::Timeout("confirm".to_string()),
            }),
        });
        assert!(!recorded);
    }

    #[test]
    fn test_player_score_only_for_own_wallet() {
        let mut s = session();
        let (account, _) = s.wallet.generate();

        s.apply_completion(Completion::PlayerScore {
            id: OperationId(1),
            player: AccountAddress::ONE,
            result: Ok(999),
        });
        assert_eq!(s.recorded_score, None);

        s.apply_completion(Completion::PlayerScore {
            id: OperationId(2),
            player: account.address(),
            result: Ok(120),
        });
        assert_eq!(s.recorded_score, Some(120));
    }
}
