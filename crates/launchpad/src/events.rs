//! Event definitions
//!
//! Records consumed by off-ledger indexers. Events are emitted only after
//! the operation that produced them has committed.

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::{Address, CoinId};
use serde::{Deserialize, Serialize};

/// Direction of a curve trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Emitted when a new curve is launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CurveCreated {
    pub coin: CoinId,
    pub ticker: String,
    pub name: String,
    pub creator: Address,
    pub base_price: u64,
    pub slope_numerator: u128,
    pub slope_denominator: u128,
    pub max_curve_supply: u64,
    pub total_token_supply: u64,
    pub token_decimals: u8,
    pub timestamp_ms: u64,
}

/// Emitted for every executed buy or sell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TradeExecuted {
    pub coin: CoinId,
    pub trader: Address,
    pub direction: TradeDirection,
    /// Whole tokens moved along the curve
    pub tokens: u64,
    /// Same amount in smallest token units
    pub token_units: u64,
    /// Curve cost (buy) or curve proceeds (sell), before fees
    pub payment: u64,
    pub fee: u64,
    /// Part of `fee` routed to the trader's referrer
    pub referral_fee: u64,
    /// Unspent payment returned to the buyer; zero for sells
    pub refund: u64,
    pub price_after: u64,
    pub reserve_after: u64,
    pub supply_after: u64,
    pub timestamp_ms: u64,
}

/// Emitted the first time a trader is attributed to a referrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ReferrerRegistered {
    pub trader: Address,
    pub referrer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct GraduationReached {
    pub coin: CoinId,
    pub reserve: u64,
    pub final_price: u64,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PayoutsDistributed {
    pub coin: CoinId,
    pub treasury: Address,
    pub platform_cut: u64,
    pub creator: Address,
    pub creator_payout: u64,
    /// Token units minted into curve custody for liquidity seeding
    pub tokens_minted: u64,
    pub reserve_after: u64,
}

/// Emitted when the external AMM pool is created and its position locked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolCreated {
    pub coin: CoinId,
    pub pool_id: Address,
    pub position_id: Address,
    pub coin_a: CoinId,
    pub coin_b: CoinId,
    pub tick_spacing: u32,
    pub initial_sqrt_price_q64: u128,
    pub amount_a: u64,
    pub amount_b: u64,
    pub refund_a: u64,
    pub refund_b: u64,
    pub timestamp_ms: u64,
}

/// Emitted when reserves are handed to the operator for manual pooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolHandoff {
    pub coin: CoinId,
    pub operator: Address,
    pub payment_amount: u64,
    pub token_units: u64,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokensBurned {
    pub coin: CoinId,
    pub token_units: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ConfigUpdated {
    pub field: String,
    pub value: String,
}

/// Every record the launchpad emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchpadEvent {
    CurveCreated(CurveCreated),
    TradeExecuted(TradeExecuted),
    ReferrerRegistered(ReferrerRegistered),
    GraduationReached(GraduationReached),
    PayoutsDistributed(PayoutsDistributed),
    PoolCreated(PoolCreated),
    PoolHandoff(PoolHandoff),
    TokensBurned(TokensBurned),
    ConfigUpdated(ConfigUpdated),
}

impl LaunchpadEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurveCreated(_) => "curve_created",
            Self::TradeExecuted(_) => "trade_executed",
            Self::ReferrerRegistered(_) => "referrer_registered",
            Self::GraduationReached(_) => "graduation_reached",
            Self::PayoutsDistributed(_) => "payouts_distributed",
            Self::PoolCreated(_) => "pool_created",
            Self::PoolHandoff(_) => "pool_handoff",
            Self::TokensBurned(_) => "tokens_burned",
            Self::ConfigUpdated(_) => "config_updated",
        }
    }
}

/// Destination for emitted events
pub trait EventSink {
    fn emit(&mut self, event: LaunchpadEvent);
}

/// In-memory event sink
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LaunchpadEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LaunchpadEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&LaunchpadEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drain everything recorded so far
    pub fn take(&mut self) -> Vec<LaunchpadEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events with the given name
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: LaunchpadEvent) {
        tracing::trace!(event = event.name(), "event emitted");
        self.events.push(event);
    }
}
