//! REST Ledger Client
//!
//! [`LedgerClient`] over the node's JSON REST API and the faucet service.
//! Requests go through a blocking `ureq` agent on tokio's blocking pool; the
//! agent's timeout bounds every individual request.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::debug;

use super::types::{
    u64_string, AccountAddress, EntryFunctionPayload, PendingTransaction, TxReceipt, ViewRequest,
};
use super::{LedgerClient, LedgerError};
use crate::config::LedgerConfig;
use crate::wallet::WalletAccount;

/// Seconds a signed transaction stays valid.
const EXPIRATION_SECS: i64 = 60;

/// REST client for a ledger node and its faucet.
#[derive(Clone)]
pub struct HttpLedger {
    agent: ureq::Agent,
    node_url: String,
    faucet_url: Option<String>,
    confirm_timeout: Duration,
    poll_interval: Duration,
    max_gas_amount: u64,
    gas_unit_price: u64,
}

#[derive(Deserialize)]
struct AccountResource {
    #[serde(with = "u64_string")]
    sequence_number: u64,
}

#[derive(Deserialize)]
struct CommittedTransaction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    vm_status: String,
    #[serde(default, with = "u64_string")]
    version: u64,
    #[serde(default, with = "u64_string")]
    gas_used: u64,
}

impl HttpLedger {
    /// Build a client from config.
    pub fn new(config: &LedgerConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();

        Self {
            agent,
            node_url: config.node_url.trim_end_matches('/').to_string(),
            faucet_url: config
                .faucet_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            confirm_timeout: config.confirm_timeout,
            poll_interval: config.poll_interval,
            max_gas_amount: config.max_gas_amount,
            gas_unit_price: config.gas_unit_price,
        }
    }

    /// Node base URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, LedgerError> {
        let url = format!("{}/accounts/{}", self.node_url, address);
        let agent = self.agent.clone();
        let account: AccountResource =
            blocking(move || get_json(&agent, &url, &[200])).await?;
        Ok(account.sequence_number)
    }

    /// Poll once. `Ok(None)` while the transaction is pending or not yet
    /// indexed.
    async fn poll_transaction(&self, hash: &str) -> Result<Option<TxReceipt>, LedgerError> {
        let url = format!("{}/transactions/by_hash/{}", self.node_url, hash);
        let agent = self.agent.clone();
        let found: Option<CommittedTransaction> = blocking(move || {
            match get_json(&agent, &url, &[200]) {
                Ok(txn) => Ok(Some(txn)),
                Err(LedgerError::Status { status: 404, .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await?;

        let Some(txn) = found else {
            return Ok(None);
        };
        if txn.kind == "pending_transaction" {
            return Ok(None);
        }
        if !txn.success {
            return Err(LedgerError::Rejected {
                hash: hash.to_string(),
                vm_status: txn.vm_status,
            });
        }

        Ok(Some(TxReceipt {
            hash: if txn.hash.is_empty() { hash.to_string() } else { txn.hash },
            version: txn.version,
            gas_used: txn.gas_used,
            vm_status: txn.vm_status,
        }))
    }
}

#[async_trait]
impl LedgerClient for HttpLedger {
    async fn submit_transaction(
        &self,
        account: &WalletAccount,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, LedgerError> {
        let sender = account.address();
        let sequence_number = self.sequence_number(&sender).await?;
        let expiration = chrono::Utc::now().timestamp() + EXPIRATION_SECS;

        let mut transaction = json!({
            "sender": sender.to_hex_literal(),
            "sequence_number": sequence_number.to_string(),
            "max_gas_amount": self.max_gas_amount.to_string(),
            "gas_unit_price": self.gas_unit_price.to_string(),
            "expiration_timestamp_secs": expiration.to_string(),
            "payload": payload,
        });

        // The node produces the canonical signing message for us.
        let url = format!("{}/transactions/encode_submission", self.node_url);
        let agent = self.agent.clone();
        let body = transaction.clone();
        let encoded: String = blocking(move || post_json(&agent, &url, &body, &[200])).await?;
        let message = hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| LedgerError::Decode(format!("signing message: {}", e)))?;

        let signature = account.sign(&message);
        transaction["signature"] = json!({
            "type": "ed25519_signature",
            "public_key": account.public_key_hex(),
            "signature": format!("0x{}", hex::encode(signature)),
        });

        let url = format!("{}/transactions", self.node_url);
        let agent = self.agent.clone();
        let pending: PendingTransaction =
            blocking(move || post_json(&agent, &url, &transaction, &[200, 202])).await?;

        debug!("Submitted {} (seq {})", pending.hash, sequence_number);
        Ok(pending)
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, LedgerError> {
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            if let Some(receipt) = self.poll_transaction(hash).await? {
                return Ok(receipt);
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(LedgerError::Timeout(format!("confirmation of {}", hash)));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn view(&self, request: &ViewRequest) -> Result<Vec<Value>, LedgerError> {
        let url = format!("{}/view", self.node_url);
        let agent = self.agent.clone();
        let body = serde_json::to_value(request)
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        blocking(move || post_json(&agent, &url, &body, &[200])).await
    }

    async fn fund_account(&self, address: &AccountAddress, amount: u64) -> Result<(), LedgerError> {
        let faucet = self.faucet_url.as_ref().ok_or(LedgerError::NoFaucet)?;
        let url = format!("{}/mint?amount={}&address={}", faucet, amount, address);
        let agent = self.agent.clone();

        let hashes: Vec<String> = blocking(move || {
            let response = agent.post(&url).call();
            read_json(response, &[200])
        })
        .await?;

        for hash in &hashes {
            self.wait_for_transaction(hash).await?;
        }
        Ok(())
    }
}

/// Run a blocking request on tokio's blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, LedgerError>
where
    F: FnOnce() -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LedgerError::Task(e.to_string()))?
}

fn get_json<T: serde::de::DeserializeOwned>(
    agent: &ureq::Agent,
    url: &str,
    accept: &[u16],
) -> Result<T, LedgerError> {
    read_json(agent.get(url).call(), accept)
}

fn post_json<T: serde::de::DeserializeOwned>(
    agent: &ureq::Agent,
    url: &str,
    body: &Value,
    accept: &[u16],
) -> Result<T, LedgerError> {
    read_json(agent.post(url).send_json(body), accept)
}

fn read_json<T: serde::de::DeserializeOwned>(
    response: Result<ureq::Response, ureq::Error>,
    accept: &[u16],
) -> Result<T, LedgerError> {
    match response {
        Ok(resp) if accept.contains(&resp.status()) => resp
            .into_json::<T>()
            .map_err(|e| LedgerError::Decode(e.to_string())),
        Ok(resp) => Err(LedgerError::Status {
            status: resp.status(),
            body: resp.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Status(status, resp)) => Err(LedgerError::Status {
            status,
            body: resp.into_string().unwrap_or_default(),
        }),
        Err(e) => Err(LedgerError::Transport(e.to_string())),
    }
}
