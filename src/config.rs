//! Configuration
//!
//! Defaults match the shipped game. `LedgerConfig::from_env` lets a
//! deployment point the client at another node or contract.

use std::time::Duration;

use crate::ledger::submit::RetryPolicy;
use crate::ledger::types::{AccountAddress, AddressParseError};
use crate::session::leaderboard::FetchFailurePolicy;

/// One unit of the native token in its smallest denomination.
pub const ONE_NATIVE_TOKEN: u64 = 100_000_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// Remote ledger settings.
    pub ledger: LedgerConfig,
    /// Frame loop settings.
    pub frame: FrameConfig,
}

impl GameConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ledger: LedgerConfig::from_env()?,
            frame: FrameConfig::default(),
        })
    }
}

/// Remote ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Node REST base URL.
    pub node_url: String,
    /// Faucet base URL. `None` disables funding.
    pub faucet_url: Option<String>,
    /// Account that published the score module.
    pub contract_address: AccountAddress,
    /// Score module name.
    pub module_name: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// How long to wait for a transaction to commit.
    pub confirm_timeout: Duration,
    /// Delay between confirmation polls.
    pub poll_interval: Duration,
    /// Amount requested from the faucet.
    pub faucet_amount: u64,
    /// Gas limit per transaction.
    pub max_gas_amount: u64,
    /// Gas price per unit.
    pub gas_unit_price: u64,
    /// Score submission retry budget.
    pub retry: RetryPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: "https://fullnode.devnet.aptoslabs.com/v1".to_string(),
            faucet_url: Some("https://faucet.devnet.aptoslabs.com".to_string()),
            contract_address: AccountAddress::ONE,
            module_name: "ben_ton_scores".to_string(),
            request_timeout: Duration::from_secs(10),
            confirm_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
            faucet_amount: ONE_NATIVE_TOKEN,
            max_gas_amount: 2000,
            gas_unit_price: 100,
            retry: RetryPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Create config from environment variables.
    ///
    /// - `BEN_TON_NODE_URL`
    /// - `BEN_TON_FAUCET_URL` (empty disables funding)
    /// - `BEN_TON_CONTRACT`
    /// - `BEN_TON_MODULE`
    /// - `BEN_TON_REQUEST_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LedgerConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BEN_TON_NODE_URL") {
            config.node_url = url;
        }
        if let Some(url) = lookup("BEN_TON_FAUCET_URL") {
            config.faucet_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(raw) = lookup("BEN_TON_CONTRACT") {
            config.contract_address = raw.parse().map_err(|source| ConfigError::Address {
                var: "BEN_TON_CONTRACT",
                source,
            })?;
        }
        if let Some(module) = lookup("BEN_TON_MODULE") {
            config.module_name = module;
        }
        if let Some(raw) = lookup("BEN_TON_REQUEST_TIMEOUT_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::Number {
                var: "BEN_TON_REQUEST_TIMEOUT_MS",
                value: raw.clone(),
            })?;
            config.request_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

/// Frame loop configuration.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// How long the "Game Exited" overlay stays up before results.
    pub disclaimer_window: Duration,
    /// Period of the animation trigger handed to collaborators.
    pub animation_interval: Duration,
    /// Minimum gap between leaderboard fetches while on the results screen.
    pub leaderboard_refresh: Duration,
    /// Generate and fund a wallet at startup.
    pub auto_connect_wallet: bool,
    /// What a failed leaderboard fetch does to the cached rows.
    pub fetch_failure_policy: FetchFailurePolicy,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            disclaimer_window: Duration::from_millis(2000),
            animation_interval: Duration::from_millis(40),
            leaderboard_refresh: Duration::from_secs(1),
            auto_connect_wallet: true,
            fetch_failure_policy: FetchFailurePolicy::ResetToEmpty,
        }
    }
}

impl FrameConfig {
    /// Duration of one frame at the target rate, never shorter than 1 µs.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros((1_000_000 / self.target_fps.max(1) as u64).max(1))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Address variable did not parse.
    #[error("{var}: {source}")]
    Address {
        /// Variable name.
        var: &'static str,
        /// Parse failure.
        source: AddressParseError,
    },
    /// Numeric variable did not parse.
    #[error("{var}: not a number: {value:?}")]
    Number {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.ledger.faucet_amount, 100_000_000);
        assert_eq!(config.ledger.retry.max_attempts, 3);
        assert_eq!(config.ledger.retry.backoff, Duration::from_secs(1));
        assert_eq!(config.frame.disclaimer_window, Duration::from_millis(2000));
        assert_eq!(config.frame.frame_duration(), Duration::from_micros(16_666));
    }

    #[test]
    fn test_frame_duration_never_zero() {
        let config = FrameConfig {
            target_fps: u32::MAX,
            ..FrameConfig::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_micros(1));

        let config = FrameConfig {
            target_fps: 0,
            ..FrameConfig::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides() {
        let config = LedgerConfig::from_lookup(lookup(&[
            ("BEN_TON_NODE_URL", "http://localhost:8080/v1"),
            ("BEN_TON_FAUCET_URL", ""),
            ("BEN_TON_CONTRACT", "0xcafe"),
            ("BEN_TON_MODULE", "arcade"),
            ("BEN_TON_REQUEST_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.node_url, "http://localhost:8080/v1");
        assert!(config.faucet_url.is_none());
        assert_eq!(config.contract_address, "0xcafe".parse().unwrap());
        assert_eq!(config.module_name, "arcade");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_env_values() {
        let err = LedgerConfig::from_lookup(lookup(&[("BEN_TON_CONTRACT", "0xnothex")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Address { var: "BEN_TON_CONTRACT", .. }));

        let err = LedgerConfig::from_lookup(lookup(&[("BEN_TON_REQUEST_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Number { .. }));
    }
}
