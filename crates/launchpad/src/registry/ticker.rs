//! Ticker registry
//!
//! One curve per ticker symbol. Tickers are compared after normalization,
//! so `pepe`, ` PEPE ` and `Pepe` all claim the same entry. Entries are
//! written once at curve creation and never removed.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::constants::MAX_TICKER_LEN;
use launchpad_core::{CoinId, LaunchpadError, LaunchpadResult};
use serde::{Deserialize, Serialize};

/// Trim, upper-case and validate a ticker symbol
pub fn normalize_ticker(raw: &str) -> LaunchpadResult<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
        return Err(LaunchpadError::InvalidTicker(format!(
            "'{}' must be 1 to {} characters",
            raw, MAX_TICKER_LEN
        )));
    }
    if !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LaunchpadError::InvalidTicker(format!(
            "'{}' must be ASCII letters and digits",
            raw
        )));
    }
    Ok(ticker)
}

/// Normalized ticker to owning curve coin
#[derive(Debug, Clone, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TickerRegistry {
    entries: BTreeMap<String, CoinId>,
}

impl TickerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `raw` could be reserved, returning its normalized form
    pub fn check_available(&self, raw: &str) -> LaunchpadResult<String> {
        let ticker = normalize_ticker(raw)?;
        if self.entries.contains_key(&ticker) {
            return Err(LaunchpadError::TickerTaken(ticker));
        }
        Ok(ticker)
    }

    /// Claim a ticker for a curve
    pub fn reserve(&mut self, raw: &str, coin: &CoinId) -> LaunchpadResult<String> {
        let ticker = self.check_available(raw)?;
        self.entries.insert(ticker.clone(), coin.clone());
        tracing::debug!(ticker = %ticker, coin = %coin, "ticker reserved");
        Ok(ticker)
    }

    /// Curve coin owning a ticker, in any casing
    pub fn lookup(&self, raw: &str) -> Option<&CoinId> {
        normalize_ticker(raw)
            .ok()
            .and_then(|ticker| self.entries.get(&ticker))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
