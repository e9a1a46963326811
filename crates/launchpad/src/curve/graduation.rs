//! Graduation steps
//!
//! `try_graduate` and `distribute_payouts` are separate transactions from
//! liquidity seeding so that a rejected AMM call can be retried without
//! touching payouts that already landed.

use launchpad_core::math::fee_math::bps_of;
use launchpad_core::math::safe_math::{safe_add_u64, whole_to_units};
use launchpad_core::{LaunchpadError, LaunchpadResult};

use super::BondingCurve;
use crate::config::PlatformConfig;
use crate::context::TxContext;
use crate::events::{EventSink, GraduationReached, LaunchpadEvent, PayoutsDistributed};
use crate::ledger::{Ledger, LedgerBatch};

impl BondingCurve {
    /// Close trading once the cap is reached
    ///
    /// Returns `Ok(false)` without emitting anything when the curve has
    /// already graduated.
    pub fn try_graduate(&mut self, ctx: &TxContext, events: &mut dyn EventSink) -> LaunchpadResult<bool> {
        if self.graduated {
            return Ok(false);
        }
        if self.token_supply_sold < self.params.max_curve_supply {
            return Err(LaunchpadError::CapNotReached {
                sold: self.token_supply_sold,
                cap: self.params.max_curve_supply,
            });
        }
        let final_price = self.current_price()?;

        self.graduated = true;
        tracing::info!(
            coin = %self.token.coin,
            reserve = self.reserve_balance,
            final_price,
            "curve graduated"
        );
        events.emit(LaunchpadEvent::GraduationReached(GraduationReached {
            coin: self.token.coin.clone(),
            reserve: self.reserve_balance,
            final_price,
            timestamp_ms: ctx.timestamp_ms,
        }));
        Ok(true)
    }

    /// Pay the platform cut and creator payout, and mint the reserved allocation
    pub fn distribute_payouts(
        &mut self,
        config: &PlatformConfig,
        ledger: &mut Ledger,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<PayoutsDistributed> {
        if !self.graduated {
            return Err(LaunchpadError::NotYetGraduated);
        }
        if self.reward_paid {
            return Err(LaunchpadError::PayoutsAlreadyDistributed);
        }

        let platform_cut = bps_of(self.reserve_balance, config.platform_cut_bps())?;
        let creator_payout = config.creator_graduation_payout();
        let needed = safe_add_u64(platform_cut, creator_payout)?;
        if needed > self.reserve_balance {
            return Err(LaunchpadError::InsufficientReserve {
                needed,
                available: self.reserve_balance,
            });
        }
        let tokens_minted = whole_to_units(self.params.reserved_allocation()?, self.params.token_decimals)?;
        let custody_after = safe_add_u64(self.token_custody, tokens_minted)?;

        let mut batch = LedgerBatch::new();
        batch
            .credit_payment(config.treasury(), platform_cut)
            .credit_payment(self.creator, creator_payout)
            .mint_to_custody(&self.token.coin, tokens_minted);
        ledger.commit(batch)?;

        self.reserve_balance -= needed;
        self.token_custody = custody_after;
        self.reward_paid = true;

        let record = PayoutsDistributed {
            coin: self.token.coin.clone(),
            treasury: config.treasury(),
            platform_cut,
            creator: self.creator,
            creator_payout,
            tokens_minted,
            reserve_after: self.reserve_balance,
        };
        tracing::info!(
            coin = %record.coin,
            platform_cut,
            creator_payout,
            tokens_minted,
            reserve_after = record.reserve_after,
            "graduation payouts distributed"
        );
        events.emit(LaunchpadEvent::PayoutsDistributed(record.clone()));
        Ok(record)
    }

    /// Shared precondition of both liquidity-seeding paths
    pub(crate) fn ensure_seedable(&self) -> LaunchpadResult<()> {
        if !self.graduated {
            return Err(LaunchpadError::NotYetGraduated);
        }
        if !self.reward_paid {
            return Err(LaunchpadError::PayoutsPending);
        }
        if self.lp_seeded {
            return Err(LaunchpadError::AlreadySeeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::registry::TickerRegistry;
    use launchpad_core::{Address, CoinId};

    fn sold_out_curve(config: &PlatformConfig) -> BondingCurve {
        let ctx = TxContext::new(Address::from_low_u64(50), 0);
        let coin = CoinId::new("0xabc::pepe::PEPE").unwrap();
        let mut curve = BondingCurve::create(
            &ctx,
            config,
            &mut TickerRegistry::new(),
            coin,
            "Pepe",
            "PEPE",
            &mut EventLog::new(),
        )
        .unwrap();
        curve.token_supply_sold = curve.params.max_curve_supply;
        curve.reserve_balance = 13_333_000_000_000;
        curve
    }

    #[test]
    fn test_graduate_needs_cap_and_is_idempotent() {
        let config = PlatformConfig::default();
        let mut curve = sold_out_curve(&config);
        let ctx = TxContext::new(Address::from_low_u64(1), 5);
        let mut events = EventLog::new();

        curve.token_supply_sold -= 1;
        assert_eq!(
            curve.try_graduate(&ctx, &mut events),
            Err(LaunchpadError::CapNotReached { sold: 736_999_999, cap: 737_000_000 })
        );
        assert!(!curve.is_graduated());

        curve.token_supply_sold += 1;
        assert!(curve.try_graduate(&ctx, &mut events).unwrap());
        assert!(!curve.try_graduate(&ctx, &mut events).unwrap());
        assert_eq!(events.count("graduation_reached"), 1);
    }

    #[test]
    fn test_payouts_split_reserve_and_mint_allocation() {
        let config = PlatformConfig::with_treasury(Address::from_low_u64(100));
        let mut curve = sold_out_curve(&config);
        let ctx = TxContext::new(Address::from_low_u64(1), 5);
        let mut ledger = Ledger::new();
        let mut events = EventLog::new();

        assert_eq!(
            curve.distribute_payouts(&config, &mut ledger, &mut events),
            Err(LaunchpadError::NotYetGraduated)
        );
        curve.try_graduate(&ctx, &mut events).unwrap();

        let record = curve.distribute_payouts(&config, &mut ledger, &mut events).unwrap();
        assert_eq!(record.platform_cut, 666_650_000_000);
        assert_eq!(record.creator_payout, 100_000_000_000);
        assert_eq!(record.tokens_minted, 263_000_000_000_000);
        assert_eq!(curve.reserve_balance(), 12_566_350_000_000);
        assert_eq!(ledger.payment_balance(&config.treasury()), 666_650_000_000);
        assert_eq!(ledger.payment_balance(&curve.creator()), 100_000_000_000);
        assert_eq!(ledger.token_supply(curve.coin()), 263_000_000_000_000);

        assert_eq!(
            curve.distribute_payouts(&config, &mut ledger, &mut events),
            Err(LaunchpadError::PayoutsAlreadyDistributed)
        );
        assert_eq!(ledger.payment_balance(&config.treasury()), 666_650_000_000);
    }

    #[test]
    fn test_payouts_rejected_when_reserve_short() {
        let mut config = PlatformConfig::default();
        let cap = config.issue_admin_cap().unwrap();
        let mut events = EventLog::new();
        config
            .set_creator_graduation_payout(&cap, 20_000_000_000_000, &mut events)
            .unwrap();
        let mut curve = sold_out_curve(&config);
        let ctx = TxContext::new(Address::from_low_u64(1), 5);
        let mut ledger = Ledger::new();
        curve.try_graduate(&ctx, &mut events).unwrap();

        assert!(matches!(
            curve.distribute_payouts(&config, &mut ledger, &mut events),
            Err(LaunchpadError::InsufficientReserve { .. })
        ));
        assert!(!curve.is_reward_paid());
        assert_eq!(curve.reserve_balance(), 13_333_000_000_000);
        assert_eq!(ledger.token_supply(curve.coin()), 0);
    }
}
