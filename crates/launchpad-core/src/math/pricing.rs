//! # Curve Pricing
//!
//! Quadratic price curve and its closed-form integral, all in integers.
//!
//! ```text
//! price(s) = base + floor(num * s^2 / den)
//! cost(s)  = base * s + floor(num * s^3 / (3 * den))
//! ```
//!
//! `s` is the whole-token supply sold; prices and costs are in smallest
//! payment units. The cubic term is evaluated through a 256-bit
//! intermediate. Buys invert `cost` by binary search over the token delta,
//! bounded by the remaining headroom under the supply cap.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::math::big_int::mul_u128_to_u256;
use crate::math::safe_math::{safe_add_u128, safe_cast_u128_to_u64, safe_mul_u128, safe_sub_u128};

/// Shape of a quadratic-price bonding curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
pub struct PriceCurve {
    /// Price of the first token in smallest payment units
    pub base_price: u64,
    /// Slope numerator
    pub slope_numerator: u128,
    /// Slope denominator, never zero
    pub slope_denominator: u128,
}

/// Result of inverting the cost integral for a payment budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyQuote {
    /// Whole tokens purchasable
    pub tokens: u64,
    /// Exact cost of those tokens, never above the budget
    pub cost: u64,
}

impl PriceCurve {
    /// Create a validated curve shape
    pub fn new(base_price: u64, slope_numerator: u128, slope_denominator: u128) -> LaunchpadResult<Self> {
        let curve = Self {
            base_price,
            slope_numerator,
            slope_denominator,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Check the shape is usable for pricing
    ///
    /// A positive base price keeps `cost` strictly increasing, which the
    /// buy search and the round-trip property rely on.
    pub fn validate(&self) -> LaunchpadResult<()> {
        if self.slope_denominator == 0 {
            return Err(LaunchpadError::invalid_config("slope_denominator", "must be non-zero"));
        }
        if self.slope_denominator > u128::MAX / 3 {
            return Err(LaunchpadError::invalid_config(
                "slope_denominator",
                "must be at most u128::MAX / 3",
            ));
        }
        if self.slope_numerator == 0 {
            return Err(LaunchpadError::invalid_config("slope_numerator", "must be non-zero"));
        }
        if self.base_price == 0 {
            return Err(LaunchpadError::invalid_config("base_price", "must be non-zero"));
        }
        Ok(())
    }

    /// Check that selling out a curve with this cap keeps the reserve in range
    pub fn validate_cap(&self, max_supply: u64) -> LaunchpadResult<()> {
        let full = self
            .cost(max_supply)
            .map_err(|_| LaunchpadError::invalid_config("max_curve_supply", "sell-out cost overflows"))?;
        if full > u64::MAX as u128 {
            return Err(LaunchpadError::invalid_config(
                "max_curve_supply",
                "sell-out cost exceeds the reserve range",
            ));
        }
        Ok(())
    }

    /// Marginal price at whole-token supply `supply`
    pub fn price(&self, supply: u64) -> LaunchpadResult<u64> {
        let s = supply as u128;
        let squared = s * s;
        let (quadratic, _) = mul_u128_to_u256(self.slope_numerator, squared)
            .div_rem_u128(self.slope_denominator)
            .ok_or(LaunchpadError::DivisionByZero)?;
        let quadratic = quadratic.to_u128().ok_or(LaunchpadError::ArithmeticOverflow)?;
        let price = safe_add_u128(self.base_price as u128, quadratic)?;
        safe_cast_u128_to_u64(price)
    }

    /// Cumulative reserve required to have sold the first `supply` tokens
    pub fn cost(&self, supply: u64) -> LaunchpadResult<u128> {
        let s = supply as u128;
        let linear = safe_mul_u128(self.base_price as u128, s)?;

        let cubed = mul_u128_to_u256(s * s, s);
        let scaled = cubed
            .checked_mul_u128(self.slope_numerator)
            .ok_or(LaunchpadError::ArithmeticOverflow)?;
        let divisor = safe_mul_u128(3, self.slope_denominator)?;
        let (cubic, _) = scaled
            .div_rem_u128(divisor)
            .ok_or(LaunchpadError::DivisionByZero)?;
        let cubic = cubic.to_u128().ok_or(LaunchpadError::ArithmeticOverflow)?;

        safe_add_u128(linear, cubic)
    }

    /// Cost of moving supply from `from` up to `to`
    pub fn cost_between(&self, from: u64, to: u64) -> LaunchpadResult<u64> {
        if to < from {
            return Err(LaunchpadError::ArithmeticUnderflow);
        }
        let delta = safe_sub_u128(self.cost(to)?, self.cost(from)?)?;
        safe_cast_u128_to_u64(delta)
    }

    /// Maximum whole tokens purchasable from `supply` for `payment`
    ///
    /// Searches `[0, max_supply - supply]`; the clamp to the remaining
    /// headroom is what stops a large payment from buying past the cap.
    pub fn tokens_for_payment(&self, supply: u64, payment: u64, max_supply: u64) -> LaunchpadResult<BuyQuote> {
        if supply > max_supply {
            return Err(LaunchpadError::InvalidAmount("supply is beyond the curve cap"));
        }
        let headroom = max_supply - supply;
        let start = self.cost(supply)?;
        let budget = payment as u128;

        let mut lo: u64 = 0;
        let mut hi: u64 = headroom;
        while lo < hi {
            // Upper midpoint so `lo = mid` always makes progress
            let mid = hi - (hi - lo) / 2;
            let spent = safe_sub_u128(self.cost(supply + mid)?, start)?;
            if spent <= budget {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        let cost = self.cost_between(supply, supply + lo)?;
        Ok(BuyQuote { tokens: lo, cost })
    }

    /// Proceeds of selling `amount` whole tokens back from `supply`
    pub fn payment_for_tokens(&self, supply: u64, amount: u64) -> LaunchpadResult<u64> {
        if amount > supply {
            return Err(LaunchpadError::SupplyExceeded {
                requested: amount,
                sold: supply,
            });
        }
        self.cost_between(supply - amount, supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn default_curve() -> PriceCurve {
        PriceCurve::new(DEFAULT_BASE_PRICE, DEFAULT_SLOPE_NUMERATOR, DEFAULT_SLOPE_DENOMINATOR).unwrap()
    }

    #[test]
    fn test_price_endpoints() {
        let curve = default_curve();
        assert_eq!(curve.price(0).unwrap(), 1_000);
        assert_eq!(curve.price(100_000_000).unwrap(), 1_943);
        assert_eq!(curve.price(DEFAULT_MAX_CURVE_SUPPLY).unwrap(), 52_272);
    }

    #[test]
    fn test_cost_small_supplies() {
        let curve = default_curve();
        assert_eq!(curve.cost(0).unwrap(), 0);
        assert_eq!(curve.cost(1).unwrap(), 1_000);
        assert_eq!(curve.cost(1_000).unwrap(), 1_000_000);
        assert_eq!(curve.cost(100_000_000).unwrap(), 131_465_177_671);
    }

    #[test]
    fn test_sell_out_cost() {
        let curve = default_curve();
        assert_eq!(curve.cost(DEFAULT_MAX_CURVE_SUPPLY).unwrap(), 13_333_000_000_000);
        assert!(curve.validate_cap(DEFAULT_MAX_CURVE_SUPPLY).is_ok());
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(PriceCurve::new(1_000, 1, 0).is_err());
        assert!(PriceCurve::new(1_000, 0, 1).is_err());
        assert!(PriceCurve::new(0, 1, 1).is_err());
        assert!(PriceCurve::new(1_000, 1, u128::MAX).is_err());
    }

    #[test]
    fn test_cubic_term_overflow_is_an_error() {
        let steep = PriceCurve::new(1, u128::MAX, 1).unwrap();
        assert_eq!(steep.cost(u64::MAX), Err(LaunchpadError::ArithmeticOverflow));
        assert_eq!(steep.price(u64::MAX), Err(LaunchpadError::ArithmeticOverflow));
        assert!(steep.validate_cap(u64::MAX).is_err());
    }

    #[test]
    fn test_tokens_for_payment_exact_boundary() {
        let curve = default_curve();
        let quote = curve.tokens_for_payment(0, 1_000_000, DEFAULT_MAX_CURVE_SUPPLY).unwrap();
        assert_eq!(quote, BuyQuote { tokens: 1_000, cost: 1_000_000 });

        // One unit short of the 1000th token
        let quote = curve.tokens_for_payment(0, 999_999, DEFAULT_MAX_CURVE_SUPPLY).unwrap();
        assert_eq!(quote.tokens, 999);
        assert!(quote.cost <= 999_999);
    }

    #[test]
    fn test_tokens_for_payment_clamped_to_headroom() {
        let curve = default_curve();
        let supply = DEFAULT_MAX_CURVE_SUPPLY - 407_597_999;
        let quote = curve.tokens_for_payment(supply, 30_954_134_998_723, DEFAULT_MAX_CURVE_SUPPLY).unwrap();
        assert_eq!(quote.tokens, 407_597_999);
        assert_eq!(quote.cost, 11_878_970_010_716);

        let quote = curve
            .tokens_for_payment(DEFAULT_MAX_CURVE_SUPPLY, u64::MAX, DEFAULT_MAX_CURVE_SUPPLY)
            .unwrap();
        assert_eq!(quote, BuyQuote { tokens: 0, cost: 0 });
    }

    #[test]
    fn test_payment_for_tokens() {
        let curve = default_curve();
        assert_eq!(curve.payment_for_tokens(1_000, 1_000).unwrap(), 1_000_000);
        assert_eq!(curve.payment_for_tokens(1_000, 0).unwrap(), 0);
        assert_eq!(
            curve.payment_for_tokens(10, 11),
            Err(LaunchpadError::SupplyExceeded { requested: 11, sold: 10 })
        );
    }
}
