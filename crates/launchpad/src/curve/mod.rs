//! Bonding curve state
//!
//! One curve per launched token. The curve owns the sale reserve, the
//! supply counters and the three graduation flags:
//!
//! ```text
//! Trading --try_graduate--> Graduated --distribute_payouts--> PayoutsDone --seed--> Sealed
//! ```
//!
//! Flags only ever flip from false to true, and every operation validates
//! and computes before it writes, so a rejected call leaves the curve
//! exactly as it found it.

mod graduation;
mod trade;

pub use trade::{quote_buy_at, quote_sell_at, BuyOrder, BuyPreview, SellOrder, SellPreview};

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::constants::BPS_DENOMINATOR;
use launchpad_core::math::big_int::{mul_div_u64, Rounding};
use launchpad_core::{Address, CoinId, CoinMetadata, LaunchpadError, LaunchpadResult};
use serde::{Deserialize, Serialize};

use crate::config::{CurveParams, PlatformConfig};
use crate::context::TxContext;
use crate::events::{CurveCreated, EventSink, LaunchpadEvent};
use crate::registry::TickerRegistry;
use crate::seeder::LockedPosition;

/// Lifecycle phase derived from the graduation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePhase {
    /// Buys and sells are open
    Trading,
    /// Cap reached and graduation triggered; payouts pending
    Graduated,
    /// Payouts distributed; liquidity seeding pending
    PayoutsDone,
    /// Liquidity seeded; the curve is read-only
    Sealed,
}

/// Sale state of one launched token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct BondingCurve {
    /// Coin identifier, ticker symbol, name and decimals of the token
    pub(crate) token: CoinMetadata,
    pub(crate) creator: Address,
    pub(crate) params: CurveParams,
    /// Whole tokens sold along the curve
    pub(crate) token_supply_sold: u64,
    /// Smallest payment units held by the curve
    pub(crate) reserve_balance: u64,
    /// Token units minted at payout time and not yet seeded
    pub(crate) token_custody: u64,
    pub(crate) graduated: bool,
    pub(crate) reward_paid: bool,
    pub(crate) lp_seeded: bool,
    pub(crate) created_at_ms: u64,
    pub(crate) locked_position: Option<LockedPosition>,
}

/// Read-only summary for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveStats {
    pub coin: CoinId,
    pub ticker: String,
    pub name: String,
    pub creator: Address,
    pub phase: CurvePhase,
    pub token_supply_sold: u64,
    pub max_curve_supply: u64,
    pub total_token_supply: u64,
    pub reserve_balance: u64,
    pub token_custody: u64,
    pub current_price: u64,
    pub progress_bps: u64,
    /// Current price times total supply, in smallest payment units
    pub market_cap: u128,
    pub pool_id: Option<Address>,
}

impl BondingCurve {
    /// Launch a curve: reserve the ticker and snapshot the curve shape
    pub fn create(
        ctx: &TxContext,
        config: &PlatformConfig,
        tickers: &mut TickerRegistry,
        coin: CoinId,
        name: &str,
        ticker: &str,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<Self> {
        if coin == config.payment_coin().coin {
            return Err(LaunchpadError::invalid_config("coin", "must differ from the payment coin"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LaunchpadError::invalid_config("name", "must not be empty"));
        }
        let params = config.curve_params()?;
        let symbol = tickers.check_available(ticker)?;

        tickers.reserve(&symbol, &coin)?;
        let curve = Self {
            token: CoinMetadata::new(coin, symbol, name, params.token_decimals),
            creator: ctx.sender,
            params,
            token_supply_sold: 0,
            reserve_balance: 0,
            token_custody: 0,
            graduated: false,
            reward_paid: false,
            lp_seeded: false,
            created_at_ms: ctx.timestamp_ms,
            locked_position: None,
        };

        tracing::info!(
            coin = %curve.token.coin,
            ticker = %curve.token.symbol,
            creator = %curve.creator,
            "curve created"
        );
        events.emit(LaunchpadEvent::CurveCreated(CurveCreated {
            coin: curve.token.coin.clone(),
            ticker: curve.token.symbol.clone(),
            name: curve.token.name.clone(),
            creator: curve.creator,
            base_price: params.pricing.base_price,
            slope_numerator: params.pricing.slope_numerator,
            slope_denominator: params.pricing.slope_denominator,
            max_curve_supply: params.max_curve_supply,
            total_token_supply: params.total_token_supply,
            token_decimals: params.token_decimals,
            timestamp_ms: ctx.timestamp_ms,
        }));
        Ok(curve)
    }

    pub fn phase(&self) -> CurvePhase {
        if self.lp_seeded {
            CurvePhase::Sealed
        } else if self.reward_paid {
            CurvePhase::PayoutsDone
        } else if self.graduated {
            CurvePhase::Graduated
        } else {
            CurvePhase::Trading
        }
    }

    pub fn coin(&self) -> &CoinId {
        &self.token.coin
    }

    pub fn token(&self) -> &CoinMetadata {
        &self.token
    }

    pub fn ticker(&self) -> &str {
        &self.token.symbol
    }

    pub fn creator(&self) -> Address {
        self.creator
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn token_supply_sold(&self) -> u64 {
        self.token_supply_sold
    }

    pub fn reserve_balance(&self) -> u64 {
        self.reserve_balance
    }

    pub fn token_custody(&self) -> u64 {
        self.token_custody
    }

    pub fn is_graduated(&self) -> bool {
        self.graduated
    }

    pub fn is_reward_paid(&self) -> bool {
        self.reward_paid
    }

    pub fn is_lp_seeded(&self) -> bool {
        self.lp_seeded
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn locked_position(&self) -> Option<&LockedPosition> {
        self.locked_position.as_ref()
    }

    /// Whole tokens still sellable before the cap
    pub fn headroom(&self) -> u64 {
        self.params.max_curve_supply - self.token_supply_sold
    }

    /// Marginal price at the current supply
    pub fn current_price(&self) -> LaunchpadResult<u64> {
        self.params.pricing.price(self.token_supply_sold)
    }

    /// Sold supply as a fraction of the cap, in basis points
    pub fn progress_bps(&self) -> LaunchpadResult<u64> {
        mul_div_u64(
            self.token_supply_sold,
            BPS_DENOMINATOR,
            self.params.max_curve_supply,
            Rounding::Down,
        )
    }

    pub fn snapshot(&self) -> LaunchpadResult<CurveStats> {
        let current_price = self.current_price()?;
        Ok(CurveStats {
            coin: self.token.coin.clone(),
            ticker: self.token.symbol.clone(),
            name: self.token.name.clone(),
            creator: self.creator,
            phase: self.phase(),
            token_supply_sold: self.token_supply_sold,
            max_curve_supply: self.params.max_curve_supply,
            total_token_supply: self.params.total_token_supply,
            reserve_balance: self.reserve_balance,
            token_custody: self.token_custody,
            current_price,
            progress_bps: self.progress_bps()?,
            market_cap: current_price as u128 * self.params.total_token_supply as u128,
            pool_id: self.locked_position.as_ref().map(|p| p.pool_id()),
        })
    }

    /// Reject unless buys and sells are still open
    pub(crate) fn ensure_trading(&self) -> LaunchpadResult<()> {
        if self.graduated {
            return Err(LaunchpadError::AlreadyGraduated);
        }
        Ok(())
    }
}
