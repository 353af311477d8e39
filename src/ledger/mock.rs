//! Scriptable in-memory ledger for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::types::{AccountAddress, EntryFunctionPayload, PendingTransaction, TxReceipt, ViewRequest};
use super::{LedgerClient, LedgerError};
use crate::wallet::WalletAccount;

#[derive(Default)]
struct Inner {
    submit_script: VecDeque<Result<PendingTransaction, LedgerError>>,
    submit_hangs: bool,
    submit_times: Vec<Instant>,
    submitted: Vec<(AccountAddress, EntryFunctionPayload)>,
    next_hash: u64,

    view_script: VecDeque<(Duration, Result<Vec<Value>, LedgerError>)>,
    view_result: Option<Result<Vec<Value>, LedgerError>>,
    view_requests: Vec<ViewRequest>,

    fund_result: Option<Result<(), LedgerError>>,
    fund_calls: Vec<(AccountAddress, u64)>,
}

/// Cloneable handle; clones share the same script and call log.
#[derive(Clone, Default)]
pub struct MockLedger {
    inner: Arc<Mutex<Inner>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next submissions. Unscripted calls succeed.
    pub fn script_submits(&self, outcomes: Vec<Result<(), LedgerError>>) {
        let mut inner = self.inner.lock().unwrap();
        for outcome in outcomes {
            let next = outcome.map(|()| PendingTransaction {
                hash: String::new(),
            });
            inner.submit_script.push_back(next);
        }
    }

    /// Make every submission hang forever.
    pub fn hang_submits(&self) {
        self.inner.lock().unwrap().submit_hangs = true;
    }

    pub fn submit_times(&self) -> Vec<Instant> {
        self.inner.lock().unwrap().submit_times.clone()
    }

    pub fn submitted(&self) -> Vec<(AccountAddress, EntryFunctionPayload)> {
        self.inner.lock().unwrap().submitted.clone()
    }

    /// Result returned by every unscripted view call.
    pub fn set_view_result(&self, result: Result<Vec<Value>, LedgerError>) {
        self.inner.lock().unwrap().view_result = Some(result);
    }

    /// Queue a delayed result for the next view call.
    pub fn script_view(&self, delay: Duration, result: Result<Vec<Value>, LedgerError>) {
        self.inner.lock().unwrap().view_script.push_back((delay, result));
    }

    pub fn view_requests(&self) -> Vec<ViewRequest> {
        self.inner.lock().unwrap().view_requests.clone()
    }

    pub fn set_fund_result(&self, result: Result<(), LedgerError>) {
        self.inner.lock().unwrap().fund_result = Some(result);
    }

    pub fn fund_calls(&self) -> Vec<(AccountAddress, u64)> {
        self.inner.lock().unwrap().fund_calls.clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit_transaction(
        &self,
        account: &WalletAccount,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, LedgerError> {
        let hangs = {
            let mut inner = self.inner.lock().unwrap();
            inner.submit_times.push(Instant::now());
            inner.submitted.push((account.address(), payload.clone()));
            inner.submit_hangs
        };
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut inner = self.inner.lock().unwrap();
        inner.next_hash += 1;
        let hash = format!("0x{:064x}", inner.next_hash);
        match inner.submit_script.pop_front() {
            Some(Err(e)) => Err(e),
            _ => Ok(PendingTransaction { hash }),
        }
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, LedgerError> {
        Ok(TxReceipt {
            hash: hash.to_string(),
            version: 1,
            gas_used: 10,
            vm_status: "Executed successfully".to_string(),
        })
    }

    async fn view(&self, request: &ViewRequest) -> Result<Vec<Value>, LedgerError> {
        let scripted = {
            let mut inner = self.inner.lock().unwrap();
            inner.view_requests.push(request.clone());
            inner.view_script.pop_front()
        };

        if let Some((delay, result)) = scripted {
            tokio::time::sleep(delay).await;
            return result;
        }

        let inner = self.inner.lock().unwrap();
        inner
            .view_result
            .clone()
            .unwrap_or_else(|| Ok(vec![Value::Array(Vec::new())]))
    }

    async fn fund_account(&self, address: &AccountAddress, amount: u64) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fund_calls.push((*address, amount));
        inner.fund_result.clone().unwrap_or(Ok(()))
    }
}
