//! Ledger Command Queue
//!
//! The frame loop never awaits the network. It enqueues typed [`Command`]s
//! through a [`LedgerHandle`]; a [`LedgerWorker`] task drains them and sends
//! [`Completion`]s back, which the frame loop collects at the start of its
//! next tick.
//!
//! Ordering:
//! - score submissions run one at a time on a dedicated lane, and the handle
//!   refuses a second submission while one is outstanding
//! - fetches and faucet requests run as independent tasks and may overlap;
//!   completions arrive in completion order, not issue order

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::contract::{fetch_leaderboard, fetch_player_score, ScoreContract};
use super::submit::{submit_score, RetryPolicy};
use super::types::{AccountAddress, ScoreRecord, TxReceipt};
use super::{FetchError, FundingError, LedgerClient, SubmitError};
use crate::config::LedgerConfig;
use crate::wallet::WalletAccount;

/// Identifier of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub u64);

/// Work the frame loop can ask for.
#[derive(Debug)]
pub enum Command {
    /// Request faucet funds for the account.
    Fund {
        /// Account to fund.
        account: Arc<WalletAccount>,
    },
    /// Record a final score on chain.
    SubmitScore {
        /// Signing account.
        account: Arc<WalletAccount>,
        /// Score to record.
        score: u64,
    },
    /// Read the top players.
    FetchLeaderboard,
    /// Read one player's recorded score.
    FetchPlayerScore {
        /// Player to look up.
        player: AccountAddress,
    },
}

/// Outcome of a [`Command`], delivered back to the frame loop.
#[derive(Debug)]
pub enum Completion {
    /// Faucet request finished.
    Funded {
        /// Operation id.
        id: OperationId,
        /// Outcome.
        result: Result<(), FundingError>,
    },
    /// Score submission finished (after retries).
    ScoreSubmitted {
        /// Operation id.
        id: OperationId,
        /// Score that was submitted.
        score: u64,
        /// Outcome.
        result: Result<TxReceipt, SubmitError>,
    },
    /// Leaderboard read finished.
    Leaderboard {
        /// Operation id.
        id: OperationId,
        /// Outcome.
        result: Result<Vec<ScoreRecord>, FetchError>,
    },
    /// Player score read finished.
    PlayerScore {
        /// Operation id.
        id: OperationId,
        /// Player looked up.
        player: AccountAddress,
        /// Outcome.
        result: Result<u64, FetchError>,
    },
}

impl Completion {
    /// Operation this completes.
    pub fn id(&self) -> OperationId {
        match self {
            Self::Funded { id, .. }
            | Self::ScoreSubmitted { id, .. }
            | Self::Leaderboard { id, .. }
            | Self::PlayerScore { id, .. } => *id,
        }
    }
}

/// Queueing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// A score submission is still running.
    #[error("a score submission is already in flight ({0:?})")]
    SubmissionInFlight(OperationId),
    /// Worker task has stopped.
    #[error("ledger worker is gone")]
    WorkerGone,
}

type Queued = (OperationId, Command);

// =============================================================================
// HANDLE (frame loop side)
// =============================================================================

/// Frame-loop side of the command queue.
pub struct LedgerHandle {
    commands: mpsc::UnboundedSender<Queued>,
    completions: mpsc::UnboundedReceiver<Completion>,
    next_id: u64,
    submission: Option<OperationId>,
}

impl LedgerHandle {
    fn new(
        commands: mpsc::UnboundedSender<Queued>,
        completions: mpsc::UnboundedReceiver<Completion>,
    ) -> Self {
        Self {
            commands,
            completions,
            next_id: 1,
            submission: None,
        }
    }

    /// Handle with no worker behind it. Commands land in the returned
    /// receiver; no completions ever arrive.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<Queued>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (_completion_tx, completion_rx) = mpsc::unbounded_channel();
        (Self::new(command_tx, completion_rx), command_rx)
    }

    fn send(&mut self, command: Command) -> Result<OperationId, QueueError> {
        let id = OperationId(self.next_id);
        self.commands
            .send((id, command))
            .map_err(|_| QueueError::WorkerGone)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Queue a faucet request.
    pub fn fund(&mut self, account: Arc<WalletAccount>) -> Result<OperationId, QueueError> {
        self.send(Command::Fund { account })
    }

    /// Queue a score submission. Refused while another one is in flight.
    pub fn submit_score(
        &mut self,
        account: Arc<WalletAccount>,
        score: u64,
    ) -> Result<OperationId, QueueError> {
        if let Some(pending) = self.submission {
            return Err(QueueError::SubmissionInFlight(pending));
        }
        let id = self.send(Command::SubmitScore { account, score })?;
        self.submission = Some(id);
        Ok(id)
    }

    /// Queue a leaderboard read.
    pub fn fetch_leaderboard(&mut self) -> Result<OperationId, QueueError> {
        self.send(Command::FetchLeaderboard)
    }

    /// Queue a player score read.
    pub fn fetch_player_score(&mut self, player: AccountAddress) -> Result<OperationId, QueueError> {
        self.send(Command::FetchPlayerScore { player })
    }

    /// Whether a score submission is outstanding.
    pub fn submission_in_flight(&self) -> bool {
        self.submission.is_some()
    }

    /// Collect every completion that has arrived, without waiting.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(completion) => {
                    if let Completion::ScoreSubmitted { id, .. } = &completion {
                        if self.submission == Some(*id) {
                            self.submission = None;
                        }
                    }
                    done.push(completion);
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Nothing outstanding can ever finish now.
                    self.submission = None;
                    break;
                }
            }
        }
        done
    }
}

// =============================================================================
// WORKER (background side)
// =============================================================================

/// Background task that executes ledger commands.
pub struct LedgerWorker<L> {
    client: Arc<L>,
    contract: ScoreContract,
    retry: RetryPolicy,
    faucet_amount: u64,
}

impl<L: LedgerClient + 'static> LedgerWorker<L> {
    /// Create a worker for `client` using the contract and retry settings
    /// from `config`.
    pub fn new(client: L, config: &LedgerConfig) -> Self {
        Self {
            client: Arc::new(client),
            contract: ScoreContract::new(config.contract_address, config.module_name.clone()),
            retry: config.retry,
            faucet_amount: config.faucet_amount,
        }
    }

    /// Start the worker on the current tokio runtime.
    pub fn spawn(self) -> LedgerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(command_rx, completion_tx));
        LedgerHandle::new(command_tx, completion_rx)
    }

    async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<Queued>,
        completions: mpsc::UnboundedSender<Completion>,
    ) {
        info!("Ledger worker started ({})", self.contract.function_id("*"));

        let (lane_tx, lane_rx) = mpsc::unbounded_channel();
        let lane = tokio::spawn(Self::submission_lane(
            self.client.clone(),
            self.contract.clone(),
            self.retry,
            lane_rx,
            completions.clone(),
        ));

        while let Some((id, command)) = commands.recv().await {
            debug!("Ledger command {:?}: {:?}", id, command);
            match command {
                Command::SubmitScore { account, score } => {
                    let _ = lane_tx.send((id, account, score));
                }
                Command::Fund { account } => {
                    let client = self.client.clone();
                    let amount = self.faucet_amount;
                    let completions = completions.clone();
                    tokio::spawn(async move {
                        let result = client
                            .fund_account(&account.address(), amount)
                            .await
                            .map_err(FundingError::from);
                        let _ = completions.send(Completion::Funded { id, result });
                    });
                }
                Command::FetchLeaderboard => {
                    let client = self.client.clone();
                    let contract = self.contract.clone();
                    let completions = completions.clone();
                    tokio::spawn(async move {
                        let result = fetch_leaderboard(client.as_ref(), &contract).await;
                        let _ = completions.send(Completion::Leaderboard { id, result });
                    });
                }
                Command::FetchPlayerScore { player } => {
                    let client = self.client.clone();
                    let contract = self.contract.clone();
                    let completions = completions.clone();
                    tokio::spawn(async move {
                        let result = fetch_player_score(client.as_ref(), &contract, &player).await;
                        let _ = completions.send(Completion::PlayerScore { id, player, result });
                    });
                }
            }
        }

        // Handle dropped: let queued submissions finish, then stop.
        drop(lane_tx);
        if let Err(e) = lane.await {
            warn!("Submission lane ended abnormally: {}", e);
        }
        info!("Ledger worker stopped");
    }

    async fn submission_lane(
        client: Arc<L>,
        contract: ScoreContract,
        retry: RetryPolicy,
        mut queue: mpsc::UnboundedReceiver<(OperationId, Arc<WalletAccount>, u64)>,
        completions: mpsc::UnboundedSender<Completion>,
    ) {
        while let Some((id, account, score)) = queue.recv().await {
            let result = submit_score(client.as_ref(), &contract, &account, score, &retry).await;
            let _ = completions.send(Completion::ScoreSubmitted { id, score, result });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockLedger;
    use crate::ledger::LedgerError;
    use serde_json::json;
    use std::time::Duration;

    fn spawn_worker(ledger: &MockLedger) -> LedgerHandle {
        LedgerWorker::new(ledger.clone(), &LedgerConfig::default()).spawn()
    }

    async fn wait_for(handle: &mut LedgerHandle, count: usize) -> Vec<Completion> {
        let mut done = Vec::new();
        for _ in 0..100 {
            done.extend(handle.drain());
            if done.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        done
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_submission_in_flight() {
        let ledger = MockLedger::new();
        let mut handle = spawn_worker(&ledger);
        let account = Arc::new(WalletAccount::from_secret([1; 32]));

        let first = handle.submit_score(account.clone(), 50).unwrap();
        assert!(handle.submission_in_flight());
        assert_eq!(
            handle.submit_score(account.clone(), 60),
            Err(QueueError::SubmissionInFlight(first))
        );

        let done = wait_for(&mut handle, 1).await;
        assert!(matches!(
            done[0],
            Completion::ScoreSubmitted { id, score: 50, result: Ok(_) } if id == first
        ));
        assert!(!handle.submission_in_flight());

        // Guard released
        assert!(handle.submit_score(account, 70).is_ok());
        assert_eq!(ledger.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submission_releases_guard() {
        let ledger = MockLedger::new();
        let down = LedgerError::Transport("down".to_string());
        ledger.script_submits(vec![Err(down.clone()), Err(down.clone()), Err(down)]);
        let mut handle = spawn_worker(&ledger);
        let account = Arc::new(WalletAccount::from_secret([2; 32]));

        handle.submit_score(account, 10).unwrap();
        let done = wait_for(&mut handle, 1).await;
        assert!(matches!(
            done[0],
            Completion::ScoreSubmitted { result: Err(SubmitError::Exhausted { attempts: 3, .. }), .. }
        ));
        assert!(!handle.submission_in_flight());
        assert_eq!(ledger.submit_times().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_complete_in_completion_order() {
        let ledger = MockLedger::new();
        ledger.script_view(
            Duration::from_millis(300),
            Ok(vec![json!([{"address": "0x1", "score": "10"}])]),
        );
        ledger.script_view(
            Duration::from_millis(10),
            Ok(vec![json!([{"address": "0x2", "score": "20"}])]),
        );
        let mut handle = spawn_worker(&ledger);

        let slow = handle.fetch_leaderboard().unwrap();
        let fast = handle.fetch_leaderboard().unwrap();

        let done = wait_for(&mut handle, 2).await;
        let order: Vec<OperationId> = done.iter().map(Completion::id).collect();
        assert_eq!(order, vec![fast, slow]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fund_reports_failure() {
        let ledger = MockLedger::new();
        ledger.set_fund_result(Err(LedgerError::Status {
            status: 429,
            body: "slow down".to_string(),
        }));
        let mut handle = spawn_worker(&ledger);
        let account = Arc::new(WalletAccount::from_secret([3; 32]));

        let id = handle.fund(account.clone()).unwrap();
        let done = wait_for(&mut handle, 1).await;
        assert!(matches!(
            &done[0],
            Completion::Funded { id: done_id, result: Err(FundingError::Ledger(LedgerError::Status { status: 429, .. })) }
                if *done_id == id
        ));
        assert_eq!(ledger.fund_calls(), vec![(account.address(), 100_000_000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_score_lookup() {
        let ledger = MockLedger::new();
        ledger.set_view_result(Ok(vec![json!("420")]));
        let mut handle = spawn_worker(&ledger);
        let player = AccountAddress::new([5; 32]);

        handle.fetch_player_score(player).unwrap();
        let done = wait_for(&mut handle, 1).await;
        assert!(matches!(
            &done[0],
            Completion::PlayerScore { player: p, result: Ok(420), .. } if *p == player
        ));
    }

    #[tokio::test]
    async fn test_detached_handle_queues_commands() {
        let (mut handle, mut commands) = LedgerHandle::detached();
        let id = handle.fetch_leaderboard().unwrap();
        let (queued_id, command) = commands.recv().await.unwrap();
        assert_eq!(queued_id, id);
        assert!(matches!(command, Command::FetchLeaderboard));
        assert!(handle.drain().is_empty());
    }
}
