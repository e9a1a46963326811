//! Buy and sell execution
//!
//! Quotes and executions share the same arithmetic: an execution is a
//! quote plus caller-bound checks plus one ledger batch. Curve fields are
//! written only after the batch commits.

use launchpad_core::math::fee_math::{bps_of, budget_excluding_fee, split_referral_fee};
use launchpad_core::math::safe_math::{safe_add_u64, safe_sub_u64, units_to_whole_exact, whole_to_units};
use launchpad_core::{Address, LaunchpadError, LaunchpadResult};

use super::BondingCurve;
use crate::config::{CurveParams, PlatformConfig};
use crate::context::TxContext;
use crate::events::{EventSink, LaunchpadEvent, ReferrerRegistered, TradeDirection, TradeExecuted};
use crate::ledger::{Ledger, LedgerBatch};
use crate::registry::ReferralRegistry;

/// Buy request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOrder {
    /// Smallest payment units offered, fee included
    pub payment_in: u64,
    /// Minimum whole tokens to receive
    pub min_tokens_out: u64,
    pub deadline_ms: u64,
    pub referrer: Option<Address>,
}

/// Sell request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellOrder {
    /// Smallest token units to sell; must be whole tokens
    pub tokens_in: u64,
    /// Minimum smallest payment units to receive after the fee
    pub min_payment_out: u64,
    pub deadline_ms: u64,
    pub referrer: Option<Address>,
}

/// Outcome of a buy at the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyPreview {
    /// Whole tokens received
    pub tokens: u64,
    pub token_units: u64,
    /// Curve cost added to the reserve
    pub cost: u64,
    pub fee: u64,
    /// Unspent payment returned to the buyer
    pub refund: u64,
    pub price_after: u64,
}

/// Outcome of a sell at the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellPreview {
    /// Whole tokens returned to the curve
    pub tokens: u64,
    pub token_units: u64,
    /// Curve proceeds taken from the reserve
    pub proceeds: u64,
    pub fee: u64,
    /// Proceeds less the fee, paid to the seller
    pub payout: u64,
    pub price_after: u64,
}

/// Price a buy of `payment_in` (fee included) against `supply` whole tokens sold
pub fn quote_buy_at(
    params: &CurveParams,
    trade_fee_bps: u16,
    supply: u64,
    payment_in: u64,
) -> LaunchpadResult<BuyPreview> {
    let budget = budget_excluding_fee(payment_in, trade_fee_bps)?;
    let quote = params
        .pricing
        .tokens_for_payment(supply, budget, params.max_curve_supply)?;
    if quote.tokens == 0 {
        return Err(if supply >= params.max_curve_supply {
            LaunchpadError::SoldOut
        } else {
            LaunchpadError::PaymentTooSmall
        });
    }

    let fee = bps_of(quote.cost, trade_fee_bps)?;
    let refund = safe_sub_u64(payment_in, safe_add_u64(quote.cost, fee)?)?;
    let supply_after = safe_add_u64(supply, quote.tokens)?;

    Ok(BuyPreview {
        tokens: quote.tokens,
        token_units: whole_to_units(quote.tokens, params.token_decimals)?,
        cost: quote.cost,
        fee,
        refund,
        price_after: params.pricing.price(supply_after)?,
    })
}

/// Price a sell of `tokens_in` smallest units against `supply` whole tokens sold
pub fn quote_sell_at(
    params: &CurveParams,
    trade_fee_bps: u16,
    supply: u64,
    tokens_in: u64,
) -> LaunchpadResult<SellPreview> {
    if tokens_in == 0 {
        return Err(LaunchpadError::InvalidAmount("sell amount must be positive"));
    }
    let tokens = units_to_whole_exact(tokens_in, params.token_decimals)?;
    if tokens > supply {
        return Err(LaunchpadError::SupplyExceeded {
            requested: tokens,
            sold: supply,
        });
    }

    let proceeds = params.pricing.payment_for_tokens(supply, tokens)?;
    let fee = bps_of(proceeds, trade_fee_bps)?;

    Ok(SellPreview {
        tokens,
        token_units: tokens_in,
        proceeds,
        fee,
        payout: safe_sub_u64(proceeds, fee)?,
        price_after: params.pricing.price(supply - tokens)?,
    })
}

impl BondingCurve {
    /// Price a buy without executing it
    pub fn quote_buy(&self, config: &PlatformConfig, payment_in: u64) -> LaunchpadResult<BuyPreview> {
        self.ensure_trading()?;
        quote_buy_at(&self.params, config.trade_fee_bps(), self.token_supply_sold, payment_in)
    }

    /// Price a sell without executing it
    pub fn quote_sell(&self, config: &PlatformConfig, tokens_in: u64) -> LaunchpadResult<SellPreview> {
        self.ensure_trading()?;
        quote_sell_at(&self.params, config.trade_fee_bps(), self.token_supply_sold, tokens_in)
    }

    /// Buy tokens along the curve, clamped to the remaining headroom
    pub fn buy(
        &mut self,
        ctx: &TxContext,
        config: &PlatformConfig,
        referrals: &mut ReferralRegistry,
        ledger: &mut Ledger,
        events: &mut dyn EventSink,
        order: BuyOrder,
    ) -> LaunchpadResult<TradeExecuted> {
        self.ensure_trading()?;
        ctx.check_deadline(order.deadline_ms)?;

        let preview = self.quote_buy(config, order.payment_in)?;
        if preview.tokens < order.min_tokens_out {
            return Err(LaunchpadError::SlippageExceeded {
                minimum: order.min_tokens_out,
                actual: preview.tokens,
            });
        }
        let reserve_after = safe_add_u64(self.reserve_balance, preview.cost)?;

        let (referrer, newly_referred) = referrals.resolve(&ctx.sender, order.referrer);
        let mut batch = LedgerBatch::new();
        batch
            .debit_payment(ctx.sender, order.payment_in)
            .credit_payment(ctx.sender, preview.refund)
            .mint(&self.token.coin, ctx.sender, preview.token_units);
        let referral_fee = route_fee(&mut batch, config, referrer, preview.fee)?;
        ledger.commit(batch)?;

        self.reserve_balance = reserve_after;
        self.token_supply_sold += preview.tokens;

        let receipt = TradeExecuted {
            coin: self.token.coin.clone(),
            trader: ctx.sender,
            direction: TradeDirection::Buy,
            tokens: preview.tokens,
            token_units: preview.token_units,
            payment: preview.cost,
            fee: preview.fee,
            referral_fee,
            refund: preview.refund,
            price_after: preview.price_after,
            reserve_after: self.reserve_balance,
            supply_after: self.token_supply_sold,
            timestamp_ms: ctx.timestamp_ms,
        };
        self.finish_trade(ctx, referrals, referrer, newly_referred, events, &receipt);

        if self.headroom() == 0 {
            tracing::info!(coin = %self.token.coin, "curve sold out; ready to graduate");
        }
        Ok(receipt)
    }

    /// Sell whole tokens back to the curve
    pub fn sell(
        &mut self,
        ctx: &TxContext,
        config: &PlatformConfig,
        referrals: &mut ReferralRegistry,
        ledger: &mut Ledger,
        events: &mut dyn EventSink,
        order: SellOrder,
    ) -> LaunchpadResult<TradeExecuted> {
        self.ensure_trading()?;
        ctx.check_deadline(order.deadline_ms)?;

        let preview = self.quote_sell(config, order.tokens_in)?;
        if preview.payout < order.min_payment_out {
            return Err(LaunchpadError::SlippageExceeded {
                minimum: order.min_payment_out,
                actual: preview.payout,
            });
        }
        let reserve_after = self.reserve_balance.checked_sub(preview.proceeds).ok_or(
            LaunchpadError::InsufficientReserve {
                needed: preview.proceeds,
                available: self.reserve_balance,
            },
        )?;

        let (referrer, newly_referred) = referrals.resolve(&ctx.sender, order.referrer);
        let mut batch = LedgerBatch::new();
        batch
            .burn(&self.token.coin, ctx.sender, preview.token_units)
            .credit_payment(ctx.sender, preview.payout);
        let referral_fee = route_fee(&mut batch, config, referrer, preview.fee)?;
        ledger.commit(batch)?;

        self.reserve_balance = reserve_after;
        self.token_supply_sold -= preview.tokens;

        let receipt = TradeExecuted {
            coin: self.token.coin.clone(),
            trader: ctx.sender,
            direction: TradeDirection::Sell,
            tokens: preview.tokens,
            token_units: preview.token_units,
            payment: preview.proceeds,
            fee: preview.fee,
            referral_fee,
            refund: 0,
            price_after: preview.price_after,
            reserve_after: self.reserve_balance,
            supply_after: self.token_supply_sold,
            timestamp_ms: ctx.timestamp_ms,
        };
        self.finish_trade(ctx, referrals, referrer, newly_referred, events, &receipt);
        Ok(receipt)
    }

    fn finish_trade(
        &self,
        ctx: &TxContext,
        referrals: &mut ReferralRegistry,
        referrer: Option<Address>,
        newly_referred: bool,
        events: &mut dyn EventSink,
        receipt: &TradeExecuted,
    ) {
        if let (true, Some(referrer)) = (newly_referred, referrer) {
            if referrals.register(ctx.sender, referrer) {
                events.emit(LaunchpadEvent::ReferrerRegistered(ReferrerRegistered {
                    trader: ctx.sender,
                    referrer,
                }));
            }
        }

        tracing::debug!(
            coin = %receipt.coin,
            trader = %receipt.trader,
            direction = ?receipt.direction,
            tokens = receipt.tokens,
            payment = receipt.payment,
            fee = receipt.fee,
            supply_after = receipt.supply_after,
            "trade executed"
        );
        events.emit(LaunchpadEvent::TradeExecuted(receipt.clone()));
    }
}

/// Stage the fee split between referrer and treasury; returns the referrer share
fn route_fee(
    batch: &mut LedgerBatch,
    config: &PlatformConfig,
    referrer: Option<Address>,
    fee: u64,
) -> LaunchpadResult<u64> {
    match referrer {
        Some(referrer) => {
            let (referral_fee, platform_fee) = split_referral_fee(fee, config.referral_share_bps())?;
            batch
                .credit_payment(referrer, referral_fee)
                .credit_payment(config.treasury(), platform_fee);
            Ok(referral_fee)
        }
        None => {
            batch.credit_payment(config.treasury(), fee);
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigUpdate;
    use crate::events::EventLog;
    use crate::registry::TickerRegistry;
    use launchpad_core::CoinId;

    struct Fixture {
        config: PlatformConfig,
        referrals: ReferralRegistry,
        ledger: Ledger,
        events: EventLog,
        curve: BondingCurve,
    }

    fn fixture(trade_fee_bps: u16) -> Fixture {
        let mut config = PlatformConfig::with_treasury(Address::from_low_u64(100));
        let cap = config.issue_admin_cap().unwrap();
        let mut events = EventLog::new();
        config
            .update(&cap, ConfigUpdate::TradeFeeBps(trade_fee_bps), &mut events)
            .unwrap();
        let mut tickers = TickerRegistry::new();
        let ctx = TxContext::new(Address::from_low_u64(50), 0);
        let coin = CoinId::new("0xabc::pepe::PEPE").unwrap();
        let curve = BondingCurve::create(&ctx, &config, &mut tickers, coin, "Pepe", "PEPE", &mut events).unwrap();
        Fixture {
            config,
            referrals: ReferralRegistry::new(),
            ledger: Ledger::new(),
            events,
            curve,
        }
    }

    fn order(payment_in: u64) -> BuyOrder {
        BuyOrder {
            payment_in,
            min_tokens_out: 0,
            deadline_ms: u64::MAX,
            referrer: None,
        }
    }

    #[test]
    fn test_buy_mints_scaled_units_once() {
        let mut f = fixture(0);
        let buyer = Address::from_low_u64(1);
        let ctx = TxContext::new(buyer, 10);
        f.ledger.deposit(buyer, 1_000_000).unwrap();

        let receipt = f
            .curve
            .buy(&ctx, &f.config, &mut f.referrals, &mut f.ledger, &mut f.events, order(1_000_000))
            .unwrap();
        assert_eq!(receipt.tokens, 1_000);
        assert_eq!(receipt.token_units, 1_000_000_000);
        assert_eq!(f.ledger.token_balance(f.curve.coin(), &buyer), 1_000_000_000);
        assert_eq!(f.ledger.payment_balance(&buyer), 0);
        assert_eq!(f.curve.reserve_balance(), 1_000_000);
    }

    #[test]
    fn test_buy_fee_on_top_and_refund() {
        let mut f = fixture(100);
        let buyer = Address::from_low_u64(1);
        let ctx = TxContext::new(buyer, 10);
        f.ledger.deposit(buyer, 1_010_000).unwrap();

        let preview = f.curve.quote_buy(&f.config, 1_010_000).unwrap();
        assert_eq!(preview.tokens, 1_000);
        assert_eq!(preview.cost, 1_000_000);
        assert_eq!(preview.fee, 10_000);
        assert_eq!(preview.refund, 0);

        f.curve
            .buy(&ctx, &f.config, &mut f.referrals, &mut f.ledger, &mut f.events, order(1_010_000))
            .unwrap();
        assert_eq!(f.ledger.payment_balance(&f.config.treasury()), 10_000);
    }

    #[test]
    fn test_zero_token_buys_fail() {
        let f = fixture(0);
        assert_eq!(f.curve.quote_buy(&f.config, 999), Err(LaunchpadError::PaymentTooSmall));
        assert_eq!(f.curve.quote_buy(&f.config, 0), Err(LaunchpadError::PaymentTooSmall));

        let mut full = fixture(0);
        full.curve.token_supply_sold = full.curve.params.max_curve_supply;
        assert_eq!(full.curve.quote_buy(&full.config, u64::MAX), Err(LaunchpadError::SoldOut));
    }

    #[test]
    fn test_sell_requires_whole_tokens() {
        let mut f = fixture(0);
        f.curve.token_supply_sold = 10;
        f.curve.reserve_balance = 10_000;
        assert!(matches!(
            f.curve.quote_sell(&f.config, 1_500_000),
            Err(LaunchpadError::InvalidAmount(_))
        ));
        assert!(matches!(f.curve.quote_sell(&f.config, 0), Err(LaunchpadError::InvalidAmount(_))));
        assert_eq!(
            f.curve.quote_sell(&f.config, 11_000_000),
            Err(LaunchpadError::SupplyExceeded { requested: 11, sold: 10 })
        );
        let preview = f.curve.quote_sell(&f.config, 10_000_000).unwrap();
        assert_eq!(preview.proceeds, 10_000);
        assert_eq!(preview.payout, 10_000);
    }

    #[test]
    fn test_referral_share_routed() {
        let mut f = fixture(100);
        let buyer = Address::from_low_u64(1);
        let referrer = Address::from_low_u64(2);
        let ctx = TxContext::new(buyer, 10);
        f.ledger.deposit(buyer, 1_010_000).unwrap();

        let mut buy = order(1_010_000);
        buy.referrer = Some(referrer);
        let receipt = f
            .curve
            .buy(&ctx, &f.config, &mut f.referrals, &mut f.ledger, &mut f.events, buy)
            .unwrap();

        assert_eq!(receipt.referral_fee, 1_000);
        assert_eq!(f.ledger.payment_balance(&referrer), 1_000);
        assert_eq!(f.ledger.payment_balance(&f.config.treasury()), 9_000);
        assert_eq!(f.referrals.referrer_of(&buyer), Some(referrer));
        assert_eq!(f.events.count("referrer_registered"), 1);
    }

    #[test]
    fn test_quote_at_arbitrary_supply() {
        let params = PlatformConfig::default().curve_params().unwrap();

        let preview = quote_buy_at(&params, 0, 329_402_001, 30_954_134_998_723).unwrap();
        assert_eq!(preview.tokens, 407_597_999);
        assert_eq!(preview.cost, 11_878_970_010_716);
        assert_eq!(preview.refund, 19_075_164_988_007);
        assert_eq!(preview.price_after, 52_272);

        assert_eq!(quote_buy_at(&params, 100, 737_000_000, u64::MAX), Err(LaunchpadError::SoldOut));
        assert_eq!(quote_buy_at(&params, 100, 0, 999), Err(LaunchpadError::PaymentTooSmall));
        assert_eq!(
            quote_sell_at(&params, 100, 10, 11_000_000),
            Err(LaunchpadError::SupplyExceeded { requested: 11, sold: 10 })
        );

        let sell = quote_sell_at(&params, 100, 1_000, 400_000_000).unwrap();
        assert_eq!((sell.proceeds, sell.fee, sell.payout), (400_000, 4_000, 396_000));
    }
}
