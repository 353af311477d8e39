//! Wallet Management
//!
//! Owns the session's single account and its funding lifecycle.
//!
//! The account is generated locally and shared read-only (`Arc`) with the
//! ledger worker for the rest of the process. Funding is best-effort: a
//! failure is logged, recorded as [`FundingState::FundingFailed`] and only
//! retried when the player explicitly asks again.

use std::fmt;
use std::sync::Arc;

use ed25519_dalek::{Signer, SigningKey};
use sha3::{Digest, Sha3_256};
use tracing::{info, warn};

use crate::ledger::worker::{LedgerHandle, OperationId};
use crate::ledger::{AccountAddress, FundingError};

/// Authentication scheme byte for single ed25519 keys.
const ED25519_SCHEME: u8 = 0x00;

// =============================================================================
// ACCOUNT
// =============================================================================

/// A ledger account: address plus signing capability.
pub struct WalletAccount {
    address: AccountAddress,
    signing_key: SigningKey,
}

impl WalletAccount {
    /// Generate fresh key material. Purely local, cannot fail.
    pub fn generate() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::from_secret(secret)
    }

    /// Rebuild an account from a known 32-byte secret.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let address = derive_address(signing_key.verifying_key().as_bytes());
        Self { address, signing_key }
    }

    /// Account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// `0x`-prefixed hex public key.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.verifying_key().as_bytes()))
    }

    /// Sign an opaque message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for WalletAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Address = SHA3-256(public_key || scheme).
fn derive_address(public_key: &[u8; 32]) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key);
    hasher.update([ED25519_SCHEME]);
    let hash = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    AccountAddress::new(bytes)
}

// =============================================================================
// FUNDING
// =============================================================================

/// Funding lifecycle of the session wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FundingState {
    /// No faucet request made yet.
    #[default]
    Unfunded,
    /// Faucet request outstanding.
    FundingInFlight,
    /// Faucet granted the funds.
    Funded,
    /// Last faucet request failed. Can be re-triggered.
    FundingFailed,
}

impl FundingState {
    /// Whether a new faucet request may be issued from this state.
    pub fn can_request(self) -> bool {
        matches!(self, Self::Unfunded | Self::FundingFailed)
    }
}

/// Owns the session's account and funding state.
#[derive(Debug, Default)]
pub struct WalletManager {
    account: Option<Arc<WalletAccount>>,
    funding: FundingState,
    pending_fund: Option<OperationId>,
}

impl WalletManager {
    /// Manager with no account.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the account if there is none. Returns the (possibly existing)
    /// account and whether it was newly generated.
    pub fn generate(&mut self) -> (Arc<WalletAccount>, bool) {
        if let Some(account) = &self.account {
            return (account.clone(), false);
        }

        let account = Arc::new(WalletAccount::generate());
        info!("Wallet connected: {}", account.address());
        self.account = Some(account.clone());
        (account, true)
    }

    /// Queue a faucet request for the current account.
    ///
    /// Returns `None` without queueing when there is no account, a request
    /// is already in flight, the account is already funded, or the worker
    /// is gone.
    pub fn fund_async(&mut self, ledger: &mut LedgerHandle) -> Option<OperationId> {
        let account = self.account.clone()?;
        if !self.funding.can_request() {
            return None;
        }

        match ledger.fund(account) {
            Ok(id) => {
                self.funding = FundingState::FundingInFlight;
                self.pending_fund = Some(id);
                Some(id)
            }
            Err(e) => {
                warn!("Could not queue funding request: {}", e);
                None
            }
        }
    }

    /// Apply the outcome of a faucet request.
    ///
    /// Stale completions (not the request this manager is waiting for) are
    /// ignored.
    pub fn complete_funding(&mut self, id: OperationId, result: Result<(), FundingError>) {
        if self.pending_fund != Some(id) {
            return;
        }
        self.pending_fund = None;

        match result {
            Ok(()) => {
                info!("Wallet funded");
                self.funding = FundingState::Funded;
            }
            Err(e) => {
                warn!("Wallet funding failed (gameplay continues): {}", e);
                self.funding = FundingState::FundingFailed;
            }
        }
    }

    /// Current account, if connected.
    pub fn account(&self) -> Option<&Arc<WalletAccount>> {
        self.account.as_ref()
    }

    /// Current funding state.
    pub fn funding_state(&self) -> FundingState {
        self.funding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    #[test]
    fn test_address_is_deterministic() {
        let a = WalletAccount::from_secret([7; 32]);
        let b = WalletAccount::from_secret([7; 32]);
        let c = WalletAccount::from_secret([8; 32]);
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn test_signature_verifies() {
        use ed25519_dalek::{Signature, Verifier};

        let account = WalletAccount::from_secret([3; 32]);
        let sig = Signature::from_bytes(&account.sign(b"score"));
        assert!(account.signing_key.verifying_key().verify(b"score", &sig).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let account = WalletAccount::from_secret([9; 32]);
        let printed = format!("{:?}", account);
        assert!(printed.contains("address"));
        assert!(!printed.contains("signing_key"));
    }

    #[test]
    fn test_generate_once() {
        let mut wallet = WalletManager::new();
        let (first, created) = wallet.generate();
        assert!(created);
        let (second, created_again) = wallet.generate();
        assert!(!created_again);
        assert_eq!(first.address(), second.address());
    }

    #[tokio::test]
    async fn test_funding_lifecycle() {
        let (mut ledger, _commands) = LedgerHandle::detached();
        let mut wallet = WalletManager::new();

        // No account yet
        assert!(wallet.fund_async(&mut ledger).is_none());

        wallet.generate();
        let id = wallet.fund_async(&mut ledger).unwrap();
        assert_eq!(wallet.funding_state(), FundingState::FundingInFlight);

        // In flight: second request refused
        assert!(wallet.fund_async(&mut ledger).is_none());

        wallet.complete_funding(id, Err(FundingError::Ledger(LedgerError::NoFaucet)));
        assert_eq!(wallet.funding_state(), FundingState::FundingFailed);

        // Explicit retry allowed after failure
        let retry = wallet.fund_async(&mut ledger).unwrap();
        wallet.complete_funding(retry, Ok(()));
        assert_eq!(wallet.funding_state(), FundingState::Funded);
        assert!(wallet.fund_async(&mut ledger).is_none());
    }

    #[tokio::test]
    async fn test_stale_funding_completion_ignored() {
        let (mut ledger, _commands) = LedgerHandle::detached();
        let mut wallet = WalletManager::new();
        wallet.generate();
        let id = wallet.fund_async(&mut ledger).unwrap();

        wallet.complete_funding(OperationId(id.0 + 100), Ok(()));
        assert_eq!(wallet.funding_state(), FundingState::FundingInFlight);
    }
}
