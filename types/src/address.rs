//! Ethereum contract/account address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when parsing a malformed address string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be 0x followed by 40 hex characters, got {0} characters after 0x")]
    BadLength(usize),

    #[error("address contains non-hexadecimal character '{0}'")]
    NonHex(char),
}

/// An Ethereum address: `0x` followed by exactly 40 hex characters.
///
/// The original casing is preserved for display; equality and hashing are
/// case-insensitive, since on-chain addresses are.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthAddress(String);

impl EthAddress {
    pub const PREFIX: &'static str = "0x";

    /// Parse and validate an address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AddressError> {
        let s = raw.into();
        let hex = s
            .strip_prefix(Self::PREFIX)
            .ok_or(AddressError::MissingPrefix)?;
        if hex.len() != 40 {
            return Err(AddressError::BadLength(hex.len()));
        }
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::NonHex(bad));
        }
        Ok(Self(s))
    }

    /// Return the raw address string (original casing).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated display form, e.g. `0x61F1d0…e73e`.
    pub fn truncated(&self) -> String {
        format!("{}…{}", &self.0[..8], &self.0[38..])
    }

    /// Case-insensitive comparison against another address string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for EthAddress {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl Eq for EthAddress {}

impl std::hash::Hash for EthAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
