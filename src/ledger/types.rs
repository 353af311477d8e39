//! Ledger Value Types
//!
//! Addresses, score records and the JSON shapes exchanged with the node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// ACCOUNT ADDRESS
// =============================================================================

/// 32-byte ledger account address.
///
/// Displays as `0x` followed by 64 lowercase hex digits. Parsing accepts the
/// short form (`0x1`) and left-pads with zeros.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountAddress(pub [u8; 32]);

impl AccountAddress {
    /// Address length in bytes.
    pub const LENGTH: usize = 32;

    /// The `0x1` framework address.
    pub const ONE: Self = {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        Self(bytes)
    };

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full `0x`-prefixed hex form.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Truncated form used on the leaderboard screen (`0x12345678...`).
    pub fn short(&self) -> String {
        let full = self.to_hex_literal();
        format!("{}...", &full[..10])
    }
}

/// Address parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Empty input or bare `0x`.
    #[error("address is empty")]
    Empty,
    /// More than 64 hex digits.
    #[error("address is longer than 32 bytes")]
    TooLong,
    /// Non-hex characters.
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0x");
        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > Self::LENGTH * 2 {
            return Err(AddressParseError::TooLong);
        }

        let padded = format!("{:0>64}", digits);
        let bytes = hex::decode(&padded)
            .map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;

        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SCORES
// =============================================================================

/// One leaderboard row: an address and its best submitted score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player account.
    pub address: AccountAddress,
    /// Score (u64 on chain, carried as a decimal string in JSON).
    #[serde(with = "u64_string")]
    pub score: u64,
}

impl ScoreRecord {
    /// Create a record.
    pub fn new(address: AccountAddress, score: u64) -> Self {
        Self { address, score }
    }
}

/// Serde adapter for u64 values the node encodes as strings.
///
/// Deserialization also accepts plain JSON numbers.
pub mod u64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    /// Serialize as a decimal string.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize from a decimal string or a number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(n),
        }
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Entry function call carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    /// Always `entry_function_payload`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `<address>::<module>::<function>`.
    pub function: String,
    /// Generic type arguments.
    pub type_arguments: Vec<String>,
    /// JSON-encoded arguments.
    pub arguments: Vec<serde_json::Value>,
}

impl EntryFunctionPayload {
    /// Create a payload with no type arguments.
    pub fn new(function: String, arguments: Vec<serde_json::Value>) -> Self {
        Self {
            kind: "entry_function_payload".to_string(),
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Body of a `POST /view` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    /// `<address>::<module>::<function>`.
    pub function: String,
    /// Generic type arguments.
    pub type_arguments: Vec<String>,
    /// JSON-encoded arguments.
    pub arguments: Vec<serde_json::Value>,
}

/// A transaction accepted into the mempool but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Transaction hash (`0x` hex).
    pub hash: String,
}

/// A confirmed, successfully executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub hash: String,
    /// Ledger version the transaction committed at.
    pub version: u64,
    /// Gas consumed.
    pub gas_used: u64,
    /// VM status string (`Executed successfully` on success).
    pub vm_status: String,
}
