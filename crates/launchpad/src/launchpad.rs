//! Launchpad facade
//!
//! Owns one platform's state: the config, both registries, the ledger, every
//! curve and the event sink. Each method is one transaction against that
//! state and forwards to the curve or seeder operation of the same name.

use std::collections::BTreeMap;

use launchpad_core::{Address, CoinId, LaunchpadError, LaunchpadResult};

use crate::config::{AdminCap, ConfigUpdate, PlatformConfig};
use crate::context::TxContext;
use crate::curve::{BondingCurve, BuyOrder, BuyPreview, CurveStats, SellOrder, SellPreview};
use crate::events::{EventLog, EventSink, PayoutsDistributed, PoolCreated, PoolHandoff, TradeExecuted};
use crate::ledger::Ledger;
use crate::registry::{ReferralRegistry, TickerRegistry};
use crate::seeder::{PoolFactory, SeedPoolArgs};

/// All state of one launchpad deployment
#[derive(Debug)]
pub struct Launchpad<S: EventSink = EventLog> {
    config: PlatformConfig,
    tickers: TickerRegistry,
    referrals: ReferralRegistry,
    ledger: Ledger,
    curves: BTreeMap<CoinId, BondingCurve>,
    events: S,
}

impl Launchpad<EventLog> {
    /// Start a platform recording events in memory
    pub fn new(config: PlatformConfig) -> LaunchpadResult<(Self, AdminCap)> {
        Self::with_sink(config, EventLog::new())
    }
}

impl<S: EventSink> Launchpad<S> {
    /// Start a platform and issue its admin capability
    pub fn with_sink(mut config: PlatformConfig, events: S) -> LaunchpadResult<(Self, AdminCap)> {
        config.validate()?;
        let cap = config.issue_admin_cap()?;
        tracing::info!(
            treasury = %config.treasury(),
            payment_coin = %config.payment_coin().coin,
            "launchpad initialized"
        );
        let launchpad = Self {
            config,
            tickers: TickerRegistry::new(),
            referrals: ReferralRegistry::new(),
            ledger: Ledger::new(),
            curves: BTreeMap::new(),
            events,
        };
        Ok((launchpad, cap))
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn tickers(&self) -> &TickerRegistry {
        &self.tickers
    }

    pub fn referrals(&self) -> &ReferralRegistry {
        &self.referrals
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut S {
        &mut self.events
    }

    pub fn curve(&self, coin: &CoinId) -> LaunchpadResult<&BondingCurve> {
        self.curves
            .get(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))
    }

    pub fn curves(&self) -> impl Iterator<Item = &BondingCurve> {
        self.curves.values()
    }

    /// Credit payment currency to an address from outside the platform
    pub fn deposit(&mut self, to: Address, amount: u64) -> LaunchpadResult<()> {
        self.ledger.deposit(to, amount)
    }

    pub fn update_config(&mut self, cap: &AdminCap, update: ConfigUpdate) -> LaunchpadResult<()> {
        self.config.update(cap, update, &mut self.events)
    }

    pub fn create_curve(
        &mut self,
        ctx: &TxContext,
        coin: CoinId,
        name: &str,
        ticker: &str,
    ) -> LaunchpadResult<&BondingCurve> {
        if self.curves.contains_key(&coin) {
            return Err(LaunchpadError::CurveExists(coin.to_string()));
        }
        let curve = BondingCurve::create(
            ctx,
            &self.config,
            &mut self.tickers,
            coin.clone(),
            name,
            ticker,
            &mut self.events,
        )?;
        Ok(self.curves.entry(coin).or_insert(curve))
    }

    pub fn quote_buy(&self, coin: &CoinId, payment_in: u64) -> LaunchpadResult<BuyPreview> {
        self.curve(coin)?.quote_buy(&self.config, payment_in)
    }

    pub fn quote_sell(&self, coin: &CoinId, tokens_in: u64) -> LaunchpadResult<SellPreview> {
        self.curve(coin)?.quote_sell(&self.config, tokens_in)
    }

    pub fn snapshot(&self, coin: &CoinId) -> LaunchpadResult<CurveStats> {
        self.curve(coin)?.snapshot()
    }

    pub fn buy(&mut self, ctx: &TxContext, coin: &CoinId, order: BuyOrder) -> LaunchpadResult<TradeExecuted> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.buy(
            ctx,
            &self.config,
            &mut self.referrals,
            &mut self.ledger,
            &mut self.events,
            order,
        )
    }

    pub fn sell(&mut self, ctx: &TxContext, coin: &CoinId, order: SellOrder) -> LaunchpadResult<TradeExecuted> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.sell(
            ctx,
            &self.config,
            &mut self.referrals,
            &mut self.ledger,
            &mut self.events,
            order,
        )
    }

    pub fn try_graduate(&mut self, ctx: &TxContext, coin: &CoinId) -> LaunchpadResult<bool> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.try_graduate(ctx, &mut self.events)
    }

    pub fn distribute_payouts(&mut self, coin: &CoinId) -> LaunchpadResult<PayoutsDistributed> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.distribute_payouts(&self.config, &mut self.ledger, &mut self.events)
    }

    pub fn seed_pool_and_create_cetus_with_lock(
        &mut self,
        ctx: &TxContext,
        coin: &CoinId,
        factory: &mut dyn PoolFactory,
        args: &SeedPoolArgs,
    ) -> LaunchpadResult<PoolCreated> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.seed_pool_and_create_cetus_with_lock(
            ctx,
            &self.config,
            &mut self.ledger,
            factory,
            args,
            &mut self.events,
        )
    }

    pub fn seed_pool_prepare(&mut self, ctx: &TxContext, cap: &AdminCap, coin: &CoinId) -> LaunchpadResult<PoolHandoff> {
        let curve = self
            .curves
            .get_mut(coin)
            .ok_or_else(|| LaunchpadError::CurveNotFound(coin.to_string()))?;
        curve.seed_pool_prepare(ctx, cap, &self.config, &mut self.ledger, &mut self.events)
    }

    /// Canonical pool arguments for a curve using the default tick spacing
    pub fn default_seed_args(&self, coin: &CoinId) -> LaunchpadResult<SeedPoolArgs> {
        let curve = self.curve(coin)?;
        let (coin_a, coin_b) = CoinId::canonical_pair(&self.config.payment_coin().coin, curve.coin());
        Ok(SeedPoolArgs {
            coin_a: coin_a.clone(),
            coin_b: coin_b.clone(),
            tick_spacing: self.config.amm().default_tick_spacing,
        })
    }
}
