//! Coin identifiers and metadata

use std::fmt;

use crate::constants::DEFAULT_PAYMENT_COIN;
use crate::errors::{LaunchpadError, LaunchpadResult};

/// Fully-qualified coin type identifier, e.g. `0x2::sui::SUI`
///
/// Ordering is plain lexicographic byte order of the identifier string,
/// which is the order the external AMM expects for pool pairs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[cfg_attr(feature = "client", serde(transparent))]
pub struct CoinId(String);

impl CoinId {
    /// Parse an identifier of the form `address::module::Name`
    pub fn new(id: impl Into<String>) -> LaunchpadResult<Self> {
        let id = id.into();
        let parts: Vec<&str> = id.split("::").collect();
        let well_formed = parts.len() == 3
            && parts.iter().all(|p| !p.is_empty())
            && !id.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(LaunchpadError::invalid_config(
                "coin",
                &format!("'{}' is not of the form address::module::Name", id),
            ));
        }
        Ok(Self(id))
    }

    /// The default payment currency identifier
    pub fn default_payment() -> Self {
        Self(DEFAULT_PAYMENT_COIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical `(a, b)` order of two coins
    pub fn canonical_pair<'a>(x: &'a CoinId, y: &'a CoinId) -> (&'a CoinId, &'a CoinId) {
        if x <= y {
            (x, y)
        } else {
            (y, x)
        }
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-ledger metadata for a coin type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
pub struct CoinMetadata {
    pub coin: CoinId,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl CoinMetadata {
    pub fn new(coin: CoinId, symbol: impl Into<String>, name: impl Into<String>, decimals: u8) -> Self {
        Self {
            coin,
            symbol: symbol.into(),
            name: name.into(),
            decimals,
        }
    }
}
