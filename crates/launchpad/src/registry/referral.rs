//! Referral registry
//!
//! First write wins: once a trader is attributed to a referrer the pair is
//! never overwritten, and a trader can never refer themselves.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::Address;
use serde::{Deserialize, Serialize};

/// Trader to referrer mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ReferralRegistry {
    referrers: BTreeMap<Address, Address>,
}

impl ReferralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn referrer_of(&self, trader: &Address) -> Option<Address> {
        self.referrers.get(trader).copied()
    }

    /// Referrer a trade by `trader` would pay, and whether it is a new record
    ///
    /// Pure lookup, used while a trade is still being validated.
    pub fn resolve(&self, trader: &Address, candidate: Option<Address>) -> (Option<Address>, bool) {
        match self.referrer_of(trader) {
            Some(existing) => (Some(existing), false),
            None => match candidate {
                Some(referrer) if referrer != *trader => (Some(referrer), true),
                _ => (None, false),
            },
        }
    }

    /// Record `referrer` for `trader`; returns whether anything was written
    pub fn register(&mut self, trader: Address, referrer: Address) -> bool {
        if trader == referrer || self.referrers.contains_key(&trader) {
            return false;
        }
        self.referrers.insert(trader, referrer);
        tracing::debug!(trader = %trader, referrer = %referrer, "referrer registered");
        true
    }

    pub fn len(&self) -> usize {
        self.referrers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.referrers.is_empty()
    }
}
