//! Score Submission
//!
//! Bounded-retry submission of `update_score`. Each attempt runs
//! sign -> submit -> confirm strictly in order; attempts run one after
//! another with a fixed (not exponential) pause between them. Exhausting the
//! budget is the only "give up" signal.

use std::time::Duration;

use tracing::{info, instrument, warn};

use super::contract::ScoreContract;
use super::types::TxReceipt;
use super::{LedgerClient, LedgerError, SubmitError};
use crate::wallet::WalletAccount;

/// Retry budget for score submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
    /// Upper bound on a single attempt (submit + confirm).
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

/// Submit `score` for `account`, retrying per `policy`.
#[instrument(skip(client, contract, account, policy), fields(address = %account.address()))]
pub async fn submit_score<L: LedgerClient + ?Sized>(
    client: &L,
    contract: &ScoreContract,
    account: &WalletAccount,
    score: u64,
    policy: &RetryPolicy,
) -> Result<TxReceipt, SubmitError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match submit_once(client, contract, account, score, policy.attempt_timeout).await {
            Ok(receipt) => {
                info!(
                    "Score {} recorded in {} (attempt {}/{})",
                    score, receipt.hash, attempt, max_attempts
                );
                return Ok(receipt);
            }
            Err(e) => {
                warn!("Score submission attempt {}/{} failed: {}", attempt, max_attempts, e);
                if attempt >= max_attempts {
                    return Err(SubmitError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }

        tokio::time::sleep(policy.backoff).await;
        attempt += 1;
    }
}

async fn submit_once<L: LedgerClient + ?Sized>(
    client: &L,
    contract: &ScoreContract,
    account: &WalletAccount,
    score: u64,
    timeout: Duration,
) -> Result<TxReceipt, LedgerError> {
    let payload = contract.update_score(score);
    let attempt = async {
        let pending = client.submit_transaction(account, &payload).await?;
        client.wait_for_transaction(&pending.hash).await
    };

    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| LedgerError::Timeout(format!("score submission exceeded {:?}", timeout)))?
}
