//! Ledger Layer
//!
//! Everything that talks to the remote ledger. Nothing in here touches
//! session state directly: the frame loop only sees [`worker::Completion`]
//! values delivered through a [`worker::LedgerHandle`].
//!
//! - `types`: addresses, score records, payload shapes
//! - `contract`: the score contract's entry/view functions
//! - `submit`: bounded-retry score submission
//! - `http`: REST node + faucet client
//! - `worker`: command queue drained by a background task

pub mod contract;
pub mod http;
pub mod submit;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::wallet::WalletAccount;

pub use contract::{fetch_leaderboard, fetch_player_score, ScoreContract};
pub use http::HttpLedger;
pub use submit::{submit_score, RetryPolicy};
pub use types::{
    AccountAddress, EntryFunctionPayload, PendingTransaction, ScoreRecord, TxReceipt, ViewRequest,
};
pub use worker::{Command, Completion, LedgerHandle, LedgerWorker, OperationId, QueueError};

/// Capability to transact with and query a remote ledger.
///
/// Implementations must bound every call with their own timeout; callers
/// treat a hung call as a failed attempt.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign `payload` with `account` and submit it. Returns once the node
    /// has accepted the transaction, not once it is confirmed.
    async fn submit_transaction(
        &self,
        account: &WalletAccount,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, LedgerError>;

    /// Wait until `hash` is committed. Fails if it executed unsuccessfully.
    async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, LedgerError>;

    /// Run a read-only view function and return the raw result array.
    async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>, LedgerError>;

    /// Ask the funding service to grant `amount` (smallest denomination).
    async fn fund_account(&self, address: &AccountAddress, amount: u64) -> Result<(), LedgerError>;
}

/// Transport-level ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Node answered with a status other than the expected one.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body (may be empty).
        body: String,
    },

    /// Connection, DNS or I/O failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Transaction committed but did not execute successfully.
    #[error("transaction {hash} rejected: {vm_status}")]
    Rejected {
        /// Transaction hash.
        hash: String,
        /// VM status reported by the node.
        vm_status: String,
    },

    /// Deadline expired.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// No funding service configured.
    #[error("no faucet configured")]
    NoFaucet,
}

/// Read (view) failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// View result was not a single-element array of the expected shape.
    #[error("unexpected view result: {0}")]
    UnexpectedShape(String),
}

/// Score submission failure after the retry budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Every attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: LedgerError,
    },
}

/// Faucet failure. Non-fatal; the wallet stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FundingError {
    /// Transport failure.
    #[error("funding failed: {0}")]
    Ledger(#[from] LedgerError),
}
