//! Shared fixtures for launchpad integration tests
#![allow(dead_code)]

use launchpad::{
    AdminCap, BuyOrder, ConfigUpdate, CreatePoolRequest, Launchpad, LpPosition, PlatformConfig, PoolCreation,
    PoolFactory, SellOrder, TxContext,
};
use launchpad_core::{Address, CoinId, LaunchpadError, LaunchpadResult};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Common test constants
pub mod test_constants {
    pub const PEPE: &str = "0xabc::pepe::PEPE";
    pub const TOKEN_UNIT: u64 = 1_000_000;
    pub const PAYMENT_UNIT: u64 = 1_000_000_000;

    /// Curve cost of a full sale at default parameters
    pub const SOLD_OUT_RESERVE: u64 = 13_333_000_000_000;
    /// Marginal price at the cap at default parameters
    pub const FINAL_PRICE: u64 = 52_272;
    /// Enough to buy out a fresh curve including the fee
    pub const SELL_OUT_PAYMENT: u64 = 20_000_000_000_000;
}

/// Pre-configured test accounts
pub struct TestAccounts {
    pub treasury: Address,
    pub creator: Address,
    pub alice: Address,
    pub bob: Address,
    pub lp_bot: Address,
}

impl Default for TestAccounts {
    fn default() -> Self {
        Self {
            treasury: Address::from_low_u64(0x7ea5),
            creator: Address::from_low_u64(0xc0de),
            alice: Address::from_low_u64(0xa11ce),
            bob: Address::from_low_u64(0xb0b),
            lp_bot: Address::from_low_u64(0x1b07),
        }
    }
}

/// A platform with one fresh curve
pub struct TestHarness {
    pub launchpad: Launchpad,
    pub cap: AdminCap,
    pub accounts: TestAccounts,
    pub coin: CoinId,
    pub now_ms: u64,
}

impl TestHarness {
    pub fn new() -> TestResult<Self> {
        Self::with_config(Vec::new())
    }

    /// Apply admin updates before the curve is created
    pub fn with_config(updates: impl IntoIterator<Item = ConfigUpdate>) -> TestResult<Self> {
        let accounts = TestAccounts::default();
        let (mut launchpad, cap) = Launchpad::new(PlatformConfig::with_treasury(accounts.treasury))?;
        launchpad.update_config(&cap, ConfigUpdate::LpBotAddress(Some(accounts.lp_bot)))?;
        for update in updates {
            launchpad.update_config(&cap, update)?;
        }

        let coin = CoinId::new(test_constants::PEPE)?;
        let now_ms = 1_700_000_000_000;
        launchpad.create_curve(&TxContext::new(accounts.creator, now_ms), coin.clone(), "Pepe", "PEPE")?;

        Ok(Self {
            launchpad,
            cap,
            accounts,
            coin,
            now_ms,
        })
    }

    pub fn ctx(&self, sender: Address) -> TxContext {
        TxContext::new(sender, self.now_ms)
    }

    pub fn fund(&mut self, who: Address, amount: u64) -> TestResult {
        self.launchpad.deposit(who, amount)?;
        Ok(())
    }

    pub fn buy_order(payment_in: u64) -> BuyOrder {
        BuyOrder {
            payment_in,
            min_tokens_out: 0,
            deadline_ms: u64::MAX,
            referrer: None,
        }
    }

    pub fn sell_order(tokens_in: u64) -> SellOrder {
        SellOrder {
            tokens_in,
            min_payment_out: 0,
            deadline_ms: u64::MAX,
            referrer: None,
        }
    }

    pub fn buy(&mut self, who: Address, payment_in: u64) -> LaunchpadResult<launchpad::events::TradeExecuted> {
        let ctx = self.ctx(who);
        let coin = self.coin.clone();
        self.launchpad.buy(&ctx, &coin, Self::buy_order(payment_in))
    }

    pub fn sell(&mut self, who: Address, tokens_in: u64) -> LaunchpadResult<launchpad::events::TradeExecuted> {
        let ctx = self.ctx(who);
        let coin = self.coin.clone();
        self.launchpad.sell(&ctx, &coin, Self::sell_order(tokens_in))
    }

    /// Fund alice and buy the whole curve
    pub fn sell_out(&mut self) -> TestResult {
        let alice = self.accounts.alice;
        self.fund(alice, test_constants::SELL_OUT_PAYMENT)?;
        self.buy(alice, test_constants::SELL_OUT_PAYMENT)?;
        Ok(())
    }

    /// Sell out, graduate and distribute payouts
    pub fn ready_to_seed(&mut self) -> TestResult {
        self.sell_out()?;
        let ctx = self.ctx(self.accounts.bob);
        let coin = self.coin.clone();
        self.launchpad.try_graduate(&ctx, &coin)?;
        self.launchpad.distribute_payouts(&coin)?;
        Ok(())
    }
}

/// Pool factory double recording every request
#[derive(Debug, Default)]
pub struct MockPoolFactory {
    pub requests: Vec<CreatePoolRequest>,
    pub fail_with: Option<String>,
    pub refund_a: u64,
    pub refund_b: u64,
}

impl MockPoolFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn with_refunds(refund_a: u64, refund_b: u64) -> Self {
        Self {
            refund_a,
            refund_b,
            ..Self::default()
        }
    }
}

impl PoolFactory for MockPoolFactory {
    fn create_pool(&mut self, request: &CreatePoolRequest) -> LaunchpadResult<PoolCreation> {
        self.requests.push(request.clone());
        if let Some(reason) = &self.fail_with {
            return Err(LaunchpadError::ExternalAmm(reason.clone()));
        }
        let pool_id = Address::from_low_u64(0x9001 + self.requests.len() as u64);
        Ok(PoolCreation {
            pool_id,
            position: LpPosition {
                id: Address::from_low_u64(0x9500),
                pool_id,
                tick_lower: request.tick_lower,
                tick_upper: request.tick_upper,
                liquidity: 1_000_000,
            },
            refund_a: self.refund_a,
            refund_b: self.refund_b,
        })
    }
}
