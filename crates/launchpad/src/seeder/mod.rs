//! Liquidity seeder
//!
//! Final graduation step. Two completion paths exist and exactly one may
//! run per curve:
//!
//! 1. Automated: create a full-range pool on the external AMM from the
//!    remaining reserve and the custody allocation, then lock the returned
//!    position so it can never be withdrawn.
//! 2. Manual: hand the reserve and custody to the configured operator, who
//!    creates the pool out of band.
//!
//! The AMM itself is a collaborator behind [`PoolFactory`]. A rejected
//! factory call changes nothing and can be retried, or the curve can fall
//! back to the manual path.

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::constants::BPS_DENOMINATOR;
use launchpad_core::math::big_int::{mul_div_u128, mul_div_u64, Rounding};
use launchpad_core::math::safe_math::{pow10, safe_cast_u128_to_u64};
use launchpad_core::math::sqrt_price::{full_range_ticks, sqrt_price_q64_from_ratio};
use launchpad_core::{Address, CoinId, CoinMetadata, LaunchpadError, LaunchpadResult};
use serde::{Deserialize, Serialize};

use crate::config::{AdminCap, PlatformConfig};
use crate::context::TxContext;
use crate::curve::BondingCurve;
use crate::events::{EventSink, LaunchpadEvent, PoolCreated, PoolHandoff, TokensBurned};
use crate::ledger::{Ledger, LedgerBatch};

/// Liquidity position returned by the AMM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LpPosition {
    pub id: Address,
    pub pool_id: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

/// A position that can never be withdrawn
///
/// Wraps the AMM position by value and exposes it read-only; there is no
/// way to move the inner position back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LockedPosition {
    position: LpPosition,
    locked_at_ms: u64,
}

impl LockedPosition {
    fn lock(position: LpPosition, locked_at_ms: u64) -> Self {
        Self { position, locked_at_ms }
    }

    pub fn position(&self) -> &LpPosition {
        &self.position
    }

    pub fn pool_id(&self) -> Address {
        self.position.pool_id
    }

    pub fn locked_at_ms(&self) -> u64 {
        self.locked_at_ms
    }
}

/// Arguments of the AMM pool-factory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolRequest {
    pub tick_spacing: u32,
    /// `sqrt(price of A in B) * 2^64`, smallest units on both sides
    pub initial_sqrt_price_q64: u128,
    pub name: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub metadata_a: CoinMetadata,
    pub metadata_b: CoinMetadata,
    pub amount_a: u64,
    pub amount_b: u64,
    pub fix_amount_a: bool,
    pub timestamp_ms: u64,
}

/// What the AMM hands back after creating a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCreation {
    pub pool_id: Address,
    pub position: LpPosition,
    /// Unused coin A returned by the AMM
    pub refund_a: u64,
    /// Unused coin B returned by the AMM
    pub refund_b: u64,
}

/// Pool-creation surface of the external AMM
pub trait PoolFactory {
    fn create_pool(&mut self, request: &CreatePoolRequest) -> LaunchpadResult<PoolCreation>;
}

/// Caller-chosen pool parameters for the automated path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPoolArgs {
    pub coin_a: CoinId,
    pub coin_b: CoinId,
    pub tick_spacing: u32,
}

/// Orchestrates both liquidity-seeding paths
pub struct LiquiditySeeder;

impl LiquiditySeeder {
    /// Build the pool-factory request for a curve ready to seed
    pub fn plan(
        ctx: &TxContext,
        curve: &BondingCurve,
        config: &PlatformConfig,
        args: &SeedPoolArgs,
    ) -> LaunchpadResult<CreatePoolRequest> {
        curve.ensure_seedable()?;
        if !config.is_tick_spacing_enabled(args.tick_spacing) {
            return Err(LaunchpadError::UnsupportedTickSpacing(args.tick_spacing));
        }

        let payment = config.payment_coin();
        let token = curve.token();
        let (expected_a, expected_b) = CoinId::canonical_pair(&payment.coin, &token.coin);
        if args.coin_a != *expected_a || args.coin_b != *expected_b {
            return Err(LaunchpadError::CoinOrderMismatch {
                coin_a: args.coin_a.to_string(),
                coin_b: args.coin_b.to_string(),
            });
        }

        // Payment smallest units per whole token
        let final_price = curve.current_price()?;
        let pool_price = mul_div_u64(
            final_price,
            BPS_DENOMINATOR + config.liquidity_bump_bps() as u64,
            BPS_DENOMINATOR,
            Rounding::Down,
        )?;

        let scale = pow10(token.decimals)?;
        let reserve = curve.reserve_balance();
        let affordable = mul_div_u128(reserve as u128, scale as u128, pool_price as u128, Rounding::Down)?;
        let token_amount = safe_cast_u128_to_u64(affordable.min(curve.token_custody() as u128))?;
        if reserve == 0 || token_amount == 0 {
            return Err(LaunchpadError::InvalidAmount("nothing left to seed the pool with"));
        }

        let payment_is_a = payment.coin == *expected_a;
        let (metadata_a, metadata_b, amount_a, amount_b, sqrt_price) = if payment_is_a {
            // Token units per payment unit
            let sqrt_price = sqrt_price_q64_from_ratio(scale as u128, pool_price as u128)?;
            (payment.clone(), token.clone(), reserve, token_amount, sqrt_price)
        } else {
            let sqrt_price = sqrt_price_q64_from_ratio(pool_price as u128, scale as u128)?;
            (token.clone(), payment.clone(), token_amount, reserve, sqrt_price)
        };
        let (tick_lower, tick_upper) = full_range_ticks(args.tick_spacing)?;

        Ok(CreatePoolRequest {
            tick_spacing: args.tick_spacing,
            initial_sqrt_price_q64: sqrt_price,
            name: config.amm().pool_url.clone(),
            tick_lower,
            tick_upper,
            metadata_a,
            metadata_b,
            amount_a,
            amount_b,
            fix_amount_a: true,
            timestamp_ms: ctx.timestamp_ms,
        })
    }

    /// Automated path: create the pool, lock the position, burn leftovers
    pub fn seed_with_lock(
        ctx: &TxContext,
        curve: &mut BondingCurve,
        config: &PlatformConfig,
        ledger: &mut Ledger,
        factory: &mut dyn PoolFactory,
        args: &SeedPoolArgs,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<PoolCreated> {
        let request = Self::plan(ctx, curve, config, args)?;

        let created = factory.create_pool(&request).map_err(|err| {
            tracing::warn!(coin = %curve.coin(), error = %err, "pool factory rejected pool creation");
            match err {
                LaunchpadError::ExternalAmm(reason) => LaunchpadError::ExternalAmm(reason),
                other => LaunchpadError::ExternalAmm(other.to_string()),
            }
        })?;
        if created.refund_a > request.amount_a || created.refund_b > request.amount_b {
            tracing::warn!(coin = %curve.coin(), "pool factory refunded more than was deposited");
            return Err(LaunchpadError::ExternalAmm(
                "refund exceeds deposited amount".to_string(),
            ));
        }

        let payment_is_a = request.metadata_a.coin == config.payment_coin().coin;
        let (payment_refund, token_deposit, token_refund) = if payment_is_a {
            (created.refund_a, request.amount_b, created.refund_b)
        } else {
            (created.refund_b, request.amount_a, created.refund_a)
        };
        let token_used = token_deposit - token_refund;
        let burned = curve.token_custody() - token_used;

        let mut batch = LedgerBatch::new();
        batch
            .credit_payment(config.treasury(), payment_refund)
            .burn_from_custody(curve.coin(), burned);
        ledger.commit(batch)?;

        curve.reserve_balance = 0;
        curve.token_custody = 0;
        curve.lp_seeded = true;
        curve.locked_position = Some(LockedPosition::lock(created.position.clone(), ctx.timestamp_ms));

        let record = PoolCreated {
            coin: curve.coin().clone(),
            pool_id: created.pool_id,
            position_id: created.position.id,
            coin_a: request.metadata_a.coin.clone(),
            coin_b: request.metadata_b.coin.clone(),
            tick_spacing: request.tick_spacing,
            initial_sqrt_price_q64: request.initial_sqrt_price_q64,
            amount_a: request.amount_a,
            amount_b: request.amount_b,
            refund_a: created.refund_a,
            refund_b: created.refund_b,
            timestamp_ms: ctx.timestamp_ms,
        };
        tracing::info!(
            coin = %record.coin,
            pool_id = %record.pool_id,
            position_id = %record.position_id,
            burned,
            "pool created and position locked"
        );
        events.emit(LaunchpadEvent::PoolCreated(record.clone()));
        if burned > 0 {
            events.emit(LaunchpadEvent::TokensBurned(TokensBurned {
                coin: curve.coin().clone(),
                token_units: burned,
            }));
        }
        Ok(record)
    }

    /// Manual path: move reserve and custody to the operator
    pub fn hand_off(
        ctx: &TxContext,
        cap: &AdminCap,
        curve: &mut BondingCurve,
        config: &PlatformConfig,
        ledger: &mut Ledger,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<PoolHandoff> {
        config.authorize(cap)?;
        curve.ensure_seedable()?;
        let operator = config.lp_bot_address().ok_or(LaunchpadError::LpBotNotConfigured)?;

        let payment_amount = curve.reserve_balance();
        let token_units = curve.token_custody();
        let mut batch = LedgerBatch::new();
        batch
            .credit_payment(operator, payment_amount)
            .release_from_custody(curve.coin(), operator, token_units);
        ledger.commit(batch)?;

        curve.reserve_balance = 0;
        curve.token_custody = 0;
        curve.lp_seeded = true;

        let record = PoolHandoff {
            coin: curve.coin().clone(),
            operator,
            payment_amount,
            token_units,
            timestamp_ms: ctx.timestamp_ms,
        };
        tracing::info!(
            coin = %record.coin,
            operator = %operator,
            payment_amount,
            token_units,
            "reserves handed to lp operator"
        );
        events.emit(LaunchpadEvent::PoolHandoff(record.clone()));
        Ok(record)
    }
}

impl BondingCurve {
    /// Seed a locked full-range pool on the external AMM
    pub fn seed_pool_and_create_cetus_with_lock(
        &mut self,
        ctx: &TxContext,
        config: &PlatformConfig,
        ledger: &mut Ledger,
        factory: &mut dyn PoolFactory,
        args: &SeedPoolArgs,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<PoolCreated> {
        LiquiditySeeder::seed_with_lock(ctx, self, config, ledger, factory, args, events)
    }

    /// Hand the graduated reserves to the LP operator
    pub fn seed_pool_prepare(
        &mut self,
        ctx: &TxContext,
        cap: &AdminCap,
        config: &PlatformConfig,
        ledger: &mut Ledger,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<PoolHandoff> {
        LiquiditySeeder::hand_off(ctx, cap, self, config, ledger, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::registry::TickerRegistry;

    fn payout_done_curve(config: &PlatformConfig, coin: &str) -> BondingCurve {
        let ctx = TxContext::new(Address::from_low_u64(50), 0);
        let coin = CoinId::new(coin).unwrap();
        let mut curve = BondingCurve::create(
            &ctx,
            config,
            &mut TickerRegistry::new(),
            coin,
            "Token",
            "TKN",
            &mut EventLog::new(),
        )
        .unwrap();
        curve.token_supply_sold = curve.params.max_curve_supply;
        curve.reserve_balance = 12_566_350_000_000;
        curve.token_custody = 263_000_000_000_000;
        curve.graduated = true;
        curve.reward_paid = true;
        curve
    }

    #[test]
    fn test_plan_when_payment_is_coin_a() {
        let config = PlatformConfig::default();
        let curve = payout_done_curve(&config, "0xabc::pepe::PEPE");
        let ctx = TxContext::new(Address::from_low_u64(1), 9);
        let args = SeedPoolArgs {
            coin_a: config.payment_coin().coin.clone(),
            coin_b: curve.coin().clone(),
            tick_spacing: 60,
        };

        let request = LiquiditySeeder::plan(&ctx, &curve, &config, &args).unwrap();
        assert_eq!(request.metadata_a.coin, config.payment_coin().coin);
        assert_eq!(request.amount_a, 12_566_350_000_000);
        assert_eq!(request.amount_b, 240_403_083_868_992);
        assert_eq!(request.initial_sqrt_price_q64, 80_683_580_732_032_904_553);
        assert_eq!((request.tick_lower, request.tick_upper), (-443_580, 443_580));
        assert_eq!(request.timestamp_ms, 9);
    }

    #[test]
    fn test_plan_when_token_is_coin_a() {
        let config = PlatformConfig::default();
        let curve = payout_done_curve(&config, "0x1::early::EARLY");
        let ctx = TxContext::new(Address::from_low_u64(1), 9);
        let args = SeedPoolArgs {
            coin_a: curve.coin().clone(),
            coin_b: config.payment_coin().coin.clone(),
            tick_spacing: 200,
        };

        let request = LiquiditySeeder::plan(&ctx, &curve, &config, &args).unwrap();
        assert_eq!(request.metadata_a.coin, *curve.coin());
        assert_eq!(request.amount_a, 240_403_083_868_992);
        assert_eq!(request.amount_b, 12_566_350_000_000);
        // Payment units per token unit
        assert_eq!(request.initial_sqrt_price_q64, 4_217_492_132_024_823_986);
        assert!(request.fix_amount_a);
    }

    #[test]
    fn test_custody_caps_token_deposit() {
        let config = PlatformConfig::default();
        let mut curve = payout_done_curve(&config, "0xabc::pepe::PEPE");
        curve.token_custody = 1_000_000;
        let ctx = TxContext::new(Address::from_low_u64(1), 9);
        let args = SeedPoolArgs {
            coin_a: config.payment_coin().coin.clone(),
            coin_b: curve.coin().clone(),
            tick_spacing: 200,
        };

        let request = LiquiditySeeder::plan(&ctx, &curve, &config, &args).unwrap();
        assert_eq!(request.amount_b, 1_000_000);
    }

    #[test]
    fn test_locked_position_exposes_pool() {
        let position = LpPosition {
            id: Address::from_low_u64(1),
            pool_id: Address::from_low_u64(2),
            tick_lower: -10,
            tick_upper: 10,
            liquidity: 5,
        };
        let locked = LockedPosition::lock(position.clone(), 77);
        assert_eq!(locked.pool_id(), Address::from_low_u64(2));
        assert_eq!(locked.position(), &position);
        assert_eq!(locked.locked_at_ms(), 77);
    }
}
