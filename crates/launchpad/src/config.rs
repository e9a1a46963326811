//! Platform configuration
//!
//! Global, admin-mutable parameters. New curves copy the curve-shape fields
//! into their own [`CurveParams`] at creation, so later changes here never
//! reach a curve that is already trading. Fee and payout fields are read
//! when the operation that uses them runs.

use std::fs;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use borsh::{BorshDeserialize, BorshSerialize};
use launchpad_core::constants::*;
use launchpad_core::math::safe_math::{pow10, safe_sub_u64, whole_to_units};
use launchpad_core::math::sqrt_price::full_range_ticks;
use launchpad_core::{Address, CoinId, CoinMetadata, LaunchpadError, LaunchpadResult, PriceCurve};
use serde::{Deserialize, Serialize};

use crate::events::{ConfigUpdated, EventSink, LaunchpadEvent};

static NEXT_ADMIN_CAP_ID: AtomicU64 = AtomicU64::new(1);

/// Capability authorizing admin mutation of one [`PlatformConfig`]
///
/// Not `Clone`: holding the value is the authorization.
#[derive(Debug, PartialEq, Eq)]
pub struct AdminCap {
    id: u64,
}

impl AdminCap {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// External AMM parameters used when seeding graduated pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AmmSettings {
    /// Tick spacings with an enabled fee tier on the AMM
    pub enabled_tick_spacings: Vec<u32>,
    /// Spacing suggested to callers of the automated seeding path
    pub default_tick_spacing: u32,
    /// Pool url/name passed through to the pool factory
    pub pool_url: String,
}

impl Default for AmmSettings {
    fn default() -> Self {
        Self {
            enabled_tick_spacings: DEFAULT_TICK_SPACINGS.to_vec(),
            default_tick_spacing: DEFAULT_TICK_SPACING,
            pool_url: String::new(),
        }
    }
}

/// Curve shape snapshotted into each curve at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CurveParams {
    pub pricing: PriceCurve,
    /// Whole tokens sellable along the curve
    pub max_curve_supply: u64,
    /// Whole tokens in existence once graduated
    pub total_token_supply: u64,
    pub token_decimals: u8,
}

impl CurveParams {
    /// Whole tokens minted into custody at payout time
    pub fn reserved_allocation(&self) -> LaunchpadResult<u64> {
        safe_sub_u64(self.total_token_supply, self.max_curve_supply)
    }
}

/// Binding between a config and the [`AdminCap`] issued for it
///
/// Clones start unbound so a copied config never honors the original cap.
#[derive(Debug, Default, PartialEq, Eq)]
struct CapBinding(Option<u64>);

impl Clone for CapBinding {
    fn clone(&self) -> Self {
        Self(None)
    }
}

/// Platform-wide configuration
///
/// Fields are read through getters and changed only through [`PlatformConfig::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PlatformConfig {
    /// Recipient of trade fees and the platform cut
    treasury: Address,

    /// Price of the first token of a new curve, in smallest payment units
    default_base_price: u64,
    #[serde(with = "u128_serde")]
    default_slope_numerator: u128,
    #[serde(with = "u128_serde")]
    default_slope_denominator: u128,
    default_max_curve_supply: u64,
    default_total_token_supply: u64,
    default_token_decimals: u8,

    /// Fee on every trade (basis points)
    trade_fee_bps: u16,
    /// Referrer share of the trade fee (basis points)
    referral_share_bps: u16,
    /// Platform cut of the reserve at graduation (basis points)
    platform_cut_bps: u16,
    /// Flat creator payout at graduation, in smallest payment units
    creator_graduation_payout: u64,
    /// Markup of the pool opening price over the final curve price (basis points)
    liquidity_bump_bps: u16,
    /// Operator receiving reserves on the manual seeding path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lp_bot_address: Option<Address>,

    /// Reserve currency of every curve
    payment_coin: CoinMetadata,
    #[serde(default)]
    amm: AmmSettings,

    #[serde(skip)]
    #[borsh_skip]
    admin_cap: CapBinding,
}

/// A single validated admin change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
    Treasury(Address),
    DefaultBasePrice(u64),
    DefaultSlope { numerator: u128, denominator: u128 },
    DefaultSupply { max_curve_supply: u64, total_token_supply: u64 },
    TradeFeeBps(u16),
    ReferralShareBps(u16),
    PlatformCutBps(u16),
    CreatorGraduationPayout(u64),
    LiquidityBumpBps(u16),
    LpBotAddress(Option<Address>),
    DefaultTickSpacing(u32),
}

impl ConfigUpdate {
    fn field(&self) -> &'static str {
        match self {
            Self::Treasury(_) => "treasury",
            Self::DefaultBasePrice(_) => "default_base_price",
            Self::DefaultSlope { .. } => "default_slope",
            Self::DefaultSupply { .. } => "default_supply",
            Self::TradeFeeBps(_) => "trade_fee_bps",
            Self::ReferralShareBps(_) => "referral_share_bps",
            Self::PlatformCutBps(_) => "platform_cut_bps",
            Self::CreatorGraduationPayout(_) => "creator_graduation_payout",
            Self::LiquidityBumpBps(_) => "liquidity_bump_bps",
            Self::LpBotAddress(_) => "lp_bot_address",
            Self::DefaultTickSpacing(_) => "default_tick_spacing",
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Treasury(addr) => addr.to_string(),
            Self::DefaultBasePrice(v) | Self::CreatorGraduationPayout(v) => v.to_string(),
            Self::DefaultSlope { numerator, denominator } => format!("{}/{}", numerator, denominator),
            Self::DefaultSupply {
                max_curve_supply,
                total_token_supply,
            } => format!("{}/{}", max_curve_supply, total_token_supply),
            Self::TradeFeeBps(v)
            | Self::ReferralShareBps(v)
            | Self::PlatformCutBps(v)
            | Self::LiquidityBumpBps(v) => v.to_string(),
            Self::LpBotAddress(Some(addr)) => addr.to_string(),
            Self::LpBotAddress(None) => "none".to_string(),
            Self::DefaultTickSpacing(v) => v.to_string(),
        }
    }
}

impl PlatformConfig {
    /// Default configuration with the given treasury
    pub fn with_treasury(treasury: Address) -> Self {
        Self {
            treasury,
            ..Self::default()
        }
    }

    /// Load configuration from TOML file
    pub fn load(path: &str) -> LaunchpadResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| LaunchpadError::ConfigIo(format!("Failed to read config file {}: {}", path, e)))?;
        Self::from_toml(&content)
            .map_err(|e| match e {
                LaunchpadError::ConfigIo(msg) => LaunchpadError::ConfigIo(format!("{}: {}", path, msg)),
                other => other,
            })
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> LaunchpadResult<Self> {
        let config: PlatformConfig = toml::from_str(content)
            .map_err(|e| LaunchpadError::ConfigIo(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> LaunchpadResult<()> {
        let content = self.to_toml()?;
        fs::write(path, content)
            .map_err(|e| LaunchpadError::ConfigIo(format!("Failed to write config file {}: {}", path, e)))?;
        Ok(())
    }

    pub fn to_toml(&self) -> LaunchpadResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LaunchpadError::ConfigIo(format!("Failed to serialize config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> LaunchpadResult<()> {
        for (field, bps) in [
            ("trade_fee_bps", self.trade_fee_bps),
            ("referral_share_bps", self.referral_share_bps),
            ("platform_cut_bps", self.platform_cut_bps),
            ("liquidity_bump_bps", self.liquidity_bump_bps),
        ] {
            if bps > MAX_BPS {
                return Err(LaunchpadError::invalid_config(field, "must be at most 10000"));
            }
        }

        self.curve_shape()?;

        CoinId::new(self.payment_coin.coin.as_str())?;
        pow10(self.payment_coin.decimals)
            .map_err(|_| LaunchpadError::invalid_config("payment_coin.decimals", "at most 19"))?;

        self.validate_amm()
    }

    fn validate_amm(&self) -> LaunchpadResult<()> {
        if self.amm.enabled_tick_spacings.is_empty() {
            return Err(LaunchpadError::invalid_config(
                "amm.enabled_tick_spacings",
                "at least one tick spacing",
            ));
        }
        for spacing in &self.amm.enabled_tick_spacings {
            full_range_ticks(*spacing)?;
        }
        if !self.is_tick_spacing_enabled(self.amm.default_tick_spacing) {
            return Err(LaunchpadError::invalid_config(
                "amm.default_tick_spacing",
                "must be one of amm.enabled_tick_spacings",
            ));
        }
        Ok(())
    }

    pub fn is_tick_spacing_enabled(&self, tick_spacing: u32) -> bool {
        self.amm.enabled_tick_spacings.contains(&tick_spacing)
    }

    /// Snapshot of the curve shape a new curve starts with
    ///
    /// Fails on any invalid setting, so no curve is created from a config
    /// that bypassed [`PlatformConfig::validate`].
    pub fn curve_params(&self) -> LaunchpadResult<CurveParams> {
        self.validate()?;
        self.curve_shape()
    }

    fn curve_shape(&self) -> LaunchpadResult<CurveParams> {
        let pricing = PriceCurve::new(
            self.default_base_price,
            self.default_slope_numerator,
            self.default_slope_denominator,
        )?;

        if self.default_max_curve_supply == 0 {
            return Err(LaunchpadError::invalid_config("default_max_curve_supply", "must be non-zero"));
        }
        if self.default_max_curve_supply > self.default_total_token_supply {
            return Err(LaunchpadError::invalid_config(
                "default_max_curve_supply",
                &format!("must not exceed default_total_token_supply ({})", self.default_total_token_supply),
            ));
        }
        pricing.validate_cap(self.default_max_curve_supply)?;

        whole_to_units(self.default_total_token_supply, self.default_token_decimals).map_err(|_| {
            LaunchpadError::invalid_config(
                "default_token_decimals",
                "total supply in smallest units overflows u64",
            )
        })?;

        Ok(CurveParams {
            pricing,
            max_curve_supply: self.default_max_curve_supply,
            total_token_supply: self.default_total_token_supply,
            token_decimals: self.default_token_decimals,
        })
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn trade_fee_bps(&self) -> u16 {
        self.trade_fee_bps
    }

    pub fn referral_share_bps(&self) -> u16 {
        self.referral_share_bps
    }

    pub fn platform_cut_bps(&self) -> u16 {
        self.platform_cut_bps
    }

    pub fn creator_graduation_payout(&self) -> u64 {
        self.creator_graduation_payout
    }

    pub fn liquidity_bump_bps(&self) -> u16 {
        self.liquidity_bump_bps
    }

    pub fn lp_bot_address(&self) -> Option<Address> {
        self.lp_bot_address
    }

    pub fn payment_coin(&self) -> &CoinMetadata {
        &self.payment_coin
    }

    pub fn amm(&self) -> &AmmSettings {
        &self.amm
    }

    /// Issue the admin capability; only the first call succeeds
    pub fn issue_admin_cap(&mut self) -> LaunchpadResult<AdminCap> {
        if self.admin_cap.0.is_some() {
            return Err(LaunchpadError::Unauthorized);
        }
        let id = NEXT_ADMIN_CAP_ID.fetch_add(1, Ordering::Relaxed);
        self.admin_cap = CapBinding(Some(id));
        Ok(AdminCap { id })
    }

    /// Reject capabilities issued for a different config
    pub fn authorize(&self, cap: &AdminCap) -> LaunchpadResult<()> {
        match self.admin_cap.0 {
            Some(id) if id == cap.id => Ok(()),
            _ => Err(LaunchpadError::Unauthorized),
        }
    }

    /// Apply one admin change after validating the resulting config
    pub fn update(
        &mut self,
        cap: &AdminCap,
        update: ConfigUpdate,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<()> {
        self.authorize(cap)?;

        let mut candidate = self.clone();
        match &update {
            ConfigUpdate::Treasury(addr) => candidate.treasury = *addr,
            ConfigUpdate::DefaultBasePrice(v) => candidate.default_base_price = *v,
            ConfigUpdate::DefaultSlope { numerator, denominator } => {
                candidate.default_slope_numerator = *numerator;
                candidate.default_slope_denominator = *denominator;
            }
            ConfigUpdate::DefaultSupply {
                max_curve_supply,
                total_token_supply,
            } => {
                candidate.default_max_curve_supply = *max_curve_supply;
                candidate.default_total_token_supply = *total_token_supply;
            }
            ConfigUpdate::TradeFeeBps(v) => candidate.trade_fee_bps = *v,
            ConfigUpdate::ReferralShareBps(v) => candidate.referral_share_bps = *v,
            ConfigUpdate::PlatformCutBps(v) => candidate.platform_cut_bps = *v,
            ConfigUpdate::CreatorGraduationPayout(v) => candidate.creator_graduation_payout = *v,
            ConfigUpdate::LiquidityBumpBps(v) => candidate.liquidity_bump_bps = *v,
            ConfigUpdate::LpBotAddress(addr) => candidate.lp_bot_address = *addr,
            ConfigUpdate::DefaultTickSpacing(v) => candidate.amm.default_tick_spacing = *v,
        }
        candidate.validate()?;
        candidate.admin_cap = std::mem::take(&mut self.admin_cap);
        *self = candidate;

        let field = update.field();
        let value = update.value();
        tracing::info!(field, value = %value, "platform config updated");
        events.emit(LaunchpadEvent::ConfigUpdated(ConfigUpdated {
            field: field.to_string(),
            value,
        }));
        Ok(())
    }

    pub fn set_default_slope(
        &mut self,
        cap: &AdminCap,
        numerator: u128,
        denominator: u128,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<()> {
        self.update(cap, ConfigUpdate::DefaultSlope { numerator, denominator }, events)
    }

    pub fn set_platform_cut_bps(&mut self, cap: &AdminCap, bps: u16, events: &mut dyn EventSink) -> LaunchpadResult<()> {
        self.update(cap, ConfigUpdate::PlatformCutBps(bps), events)
    }

    pub fn set_creator_graduation_payout(
        &mut self,
        cap: &AdminCap,
        amount: u64,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<()> {
        self.update(cap, ConfigUpdate::CreatorGraduationPayout(amount), events)
    }

    pub fn set_liquidity_bump_bps(&mut self, cap: &AdminCap, bps: u16, events: &mut dyn EventSink) -> LaunchpadResult<()> {
        self.update(cap, ConfigUpdate::LiquidityBumpBps(bps), events)
    }

    pub fn set_lp_bot_address(
        &mut self,
        cap: &AdminCap,
        address: Option<Address>,
        events: &mut dyn EventSink,
    ) -> LaunchpadResult<()> {
        self.update(cap, ConfigUpdate::LpBotAddress(address), events)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            treasury: Address::ZERO,
            default_base_price: DEFAULT_BASE_PRICE,
            default_slope_numerator: DEFAULT_SLOPE_NUMERATOR,
            default_slope_denominator: DEFAULT_SLOPE_DENOMINATOR,
            default_max_curve_supply: DEFAULT_MAX_CURVE_SUPPLY,
            default_total_token_supply: DEFAULT_TOTAL_TOKEN_SUPPLY,
            default_token_decimals: DEFAULT_TOKEN_DECIMALS,
            trade_fee_bps: DEFAULT_TRADE_FEE_BPS,
            referral_share_bps: DEFAULT_REFERRAL_SHARE_BPS,
            platform_cut_bps: DEFAULT_PLATFORM_CUT_BPS,
            creator_graduation_payout: DEFAULT_CREATOR_GRADUATION_PAYOUT,
            liquidity_bump_bps: DEFAULT_LIQUIDITY_BUMP_BPS,
            lp_bot_address: None,
            payment_coin: default_payment_coin(),
            amm: AmmSettings::default(),
            admin_cap: CapBinding::default(),
        }
    }
}

fn default_payment_coin() -> CoinMetadata {
    CoinMetadata {
        coin: CoinId::default_payment(),
        symbol: "SUI".to_string(),
        name: "Sui".to_string(),
        decimals: DEFAULT_PAYMENT_DECIMALS,
    }
}

/// Create example configuration file
pub fn create_example_config(path: &str) -> LaunchpadResult<()> {
    let example_config = PlatformConfig {
        treasury: Address::from_str("0x7ea5")?,
        lp_bot_address: Some(Address::from_str("0x1b07")?),
        amm: AmmSettings {
            pool_url: "https://launchpad.example/pools".to_string(),
            ..AmmSettings::default()
        },
        ..PlatformConfig::default()
    };

    example_config.validate()?;
    example_config.save(path)?;
    Ok(())
}

// u128 fields as decimal strings; TOML integers stop at i64
mod u128_serde {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an unsigned integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.replace('_', "").parse::<u128>().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(U128Visitor)
    }
}
