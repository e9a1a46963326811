//! Balance ledger
//!
//! Payment-currency balances per address, token balances per coin and
//! address, and circulating token supply per coin. Every mutation goes
//! through a [`LedgerBatch`] that is validated in full against a staged
//! copy before anything is written, so a failed batch leaves the ledger
//! untouched.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::math::safe_math::{safe_add_u64, safe_sub_u64};
use launchpad_core::{Address, CoinId, LaunchpadError, LaunchpadResult};
use serde::{Deserialize, Serialize};

/// A single balance slot in the ledger
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Entry {
    /// Payment-currency balance of an address
    Payment(Address),
    /// Token balance of an address
    Token(CoinId, Address),
    /// Circulating supply of a token, in smallest units
    Supply(CoinId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LedgerOp {
    Credit(Entry, u64),
    Debit(Entry, u64),
}

/// Staged set of ledger mutations applied all-or-nothing
#[derive(Debug, Clone, Default)]
pub struct LedgerBatch {
    ops: Vec<LedgerOp>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn credit_payment(&mut self, to: Address, amount: u64) -> &mut Self {
        self.push(LedgerOp::Credit(Entry::Payment(to), amount))
    }

    pub fn debit_payment(&mut self, from: Address, amount: u64) -> &mut Self {
        self.push(LedgerOp::Debit(Entry::Payment(from), amount))
    }

    /// Mint new token units to an address
    pub fn mint(&mut self, coin: &CoinId, to: Address, units: u64) -> &mut Self {
        self.push(LedgerOp::Credit(Entry::Supply(coin.clone()), units));
        self.push(LedgerOp::Credit(Entry::Token(coin.clone(), to), units))
    }

    /// Burn token units held by an address
    pub fn burn(&mut self, coin: &CoinId, from: Address, units: u64) -> &mut Self {
        self.push(LedgerOp::Debit(Entry::Token(coin.clone(), from), units));
        self.push(LedgerOp::Debit(Entry::Supply(coin.clone()), units))
    }

    /// Mint token units into a curve's custody rather than an address
    pub fn mint_to_custody(&mut self, coin: &CoinId, units: u64) -> &mut Self {
        self.push(LedgerOp::Credit(Entry::Supply(coin.clone()), units))
    }

    /// Burn token units out of a curve's custody
    pub fn burn_from_custody(&mut self, coin: &CoinId, units: u64) -> &mut Self {
        self.push(LedgerOp::Debit(Entry::Supply(coin.clone()), units))
    }

    /// Move custody-held token units to an address; supply is unchanged
    pub fn release_from_custody(&mut self, coin: &CoinId, to: Address, units: u64) -> &mut Self {
        self.push(LedgerOp::Credit(Entry::Token(coin.clone(), to), units))
    }

    fn push(&mut self, op: LedgerOp) -> &mut Self {
        match &op {
            LedgerOp::Credit(_, 0) | LedgerOp::Debit(_, 0) => {}
            _ => self.ops.push(op),
        }
        self
    }
}

/// Balances held on the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Ledger {
    payment: BTreeMap<Address, u64>,
    tokens: BTreeMap<CoinId, BTreeMap<Address, u64>>,
    supply: BTreeMap<CoinId, u64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit payment currency from outside the launchpad
    pub fn deposit(&mut self, to: Address, amount: u64) -> LaunchpadResult<()> {
        let mut batch = LedgerBatch::new();
        batch.credit_payment(to, amount);
        self.commit(batch)
    }

    pub fn payment_balance(&self, owner: &Address) -> u64 {
        self.payment.get(owner).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, coin: &CoinId, owner: &Address) -> u64 {
        self.tokens
            .get(coin)
            .and_then(|holders| holders.get(owner))
            .copied()
            .unwrap_or(0)
    }

    /// Circulating supply in smallest units, including curve custody
    pub fn token_supply(&self, coin: &CoinId) -> u64 {
        self.supply.get(coin).copied().unwrap_or(0)
    }

    /// Sum of token units held by addresses
    pub fn held_token_units(&self, coin: &CoinId) -> u128 {
        self.tokens
            .get(coin)
            .map(|holders| holders.values().map(|v| *v as u128).sum())
            .unwrap_or(0)
    }

    fn read(&self, entry: &Entry) -> u64 {
        match entry {
            Entry::Payment(owner) => self.payment_balance(owner),
            Entry::Token(coin, owner) => self.token_balance(coin, owner),
            Entry::Supply(coin) => self.token_supply(coin),
        }
    }

    fn write(&mut self, entry: Entry, value: u64) {
        match entry {
            Entry::Payment(owner) => {
                self.payment.insert(owner, value);
            }
            Entry::Token(coin, owner) => {
                self.tokens.entry(coin).or_default().insert(owner, value);
            }
            Entry::Supply(coin) => {
                self.supply.insert(coin, value);
            }
        }
    }

    /// Validate the whole batch against staged balances, then write it
    pub fn commit(&mut self, batch: LedgerBatch) -> LaunchpadResult<()> {
        let mut staged: BTreeMap<Entry, u64> = BTreeMap::new();

        for op in batch.ops {
            match op {
                LedgerOp::Credit(entry, amount) => {
                    let current = match staged.get(&entry) {
                        Some(value) => *value,
                        None => self.read(&entry),
                    };
                    let next = safe_add_u64(current, amount)?;
                    staged.insert(entry, next);
                }
                LedgerOp::Debit(entry, amount) => {
                    let current = match staged.get(&entry) {
                        Some(value) => *value,
                        None => self.read(&entry),
                    };
                    if current < amount {
                        return Err(match entry {
                            Entry::Supply(_) => LaunchpadError::ArithmeticUnderflow,
                            _ => LaunchpadError::InsufficientBalance {
                                needed: amount,
                                available: current,
                            },
                        });
                    }
                    staged.insert(entry, safe_sub_u64(current, amount)?);
                }
            }
        }

        for (entry, value) in staged {
            self.write(entry, value);
        }
        Ok(())
    }
}
