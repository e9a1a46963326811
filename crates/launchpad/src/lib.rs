//! # Launchpad
//!
//! Bonding-curve token launches: every new token is sold against a payment
//! currency along a quadratic price curve until its supply cap, then
//! graduates into a permanently locked pool on an external AMM.
//!
//! - [`config`]: platform parameters and the admin capability
//! - [`registry`]: ticker uniqueness and referral attribution
//! - [`ledger`]: balances, mutated through all-or-nothing batches
//! - [`curve`]: buy/sell execution and the graduation state machine
//! - [`seeder`]: liquidity seeding against the AMM pool factory
//! - [`launchpad`]: a facade owning one platform's state

pub mod config;
pub mod context;
pub mod curve;
pub mod events;
pub mod launchpad;
pub mod ledger;
pub mod registry;
pub mod seeder;

// Re-export commonly used items
pub use config::{create_example_config, AdminCap, AmmSettings, ConfigUpdate, CurveParams, PlatformConfig};
pub use context::TxContext;
pub use curve::{
    quote_buy_at, quote_sell_at, BondingCurve, BuyOrder, BuyPreview, CurvePhase, CurveStats, SellOrder, SellPreview,
};
pub use events::{EventLog, EventSink, LaunchpadEvent, TradeDirection};
pub use launchpad::Launchpad;
pub use ledger::{Ledger, LedgerBatch};
pub use registry::{ReferralRegistry, TickerRegistry};
pub use seeder::{CreatePoolRequest, LiquiditySeeder, LockedPosition, LpPosition, PoolCreation, PoolFactory, SeedPoolArgs};

pub use launchpad_core::{Address, CoinId, CoinMetadata, LaunchpadError, LaunchpadResult};
