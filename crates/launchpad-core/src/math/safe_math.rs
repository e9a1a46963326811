//! # Safe Math Operations
//!
//! Overflow-checked arithmetic for ledger amounts. Nothing in the launchpad
//! wraps silently; every failure maps onto a typed error.

use crate::errors::{LaunchpadError, LaunchpadResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Narrowing conversion; matched first since the binary arm also accepts four tokens
    (cast, $fn_name:ident, $from_type:ty, $to_type:ty) => {
        /// Narrowing conversion that fails instead of truncating
        pub fn $fn_name(value: $from_type) -> LaunchpadResult<$to_type> {
            <$to_type>::try_from(value).map_err(|_| LaunchpadError::ArithmeticOverflow)
        }
    };

    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        /// Checked arithmetic mapped onto a launchpad error
        pub fn $fn_name(a: $type, b: $type) -> LaunchpadResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };
}

safe_arith!(safe_add_u64, u64, checked_add, LaunchpadError::ArithmeticOverflow);
safe_arith!(safe_sub_u64, u64, checked_sub, LaunchpadError::ArithmeticUnderflow);
safe_arith!(safe_mul_u64, u64, checked_mul, LaunchpadError::ArithmeticOverflow);

safe_arith!(safe_add_u128, u128, checked_add, LaunchpadError::ArithmeticOverflow);
safe_arith!(safe_sub_u128, u128, checked_sub, LaunchpadError::ArithmeticUnderflow);
safe_arith!(safe_mul_u128, u128, checked_mul, LaunchpadError::ArithmeticOverflow);

safe_arith!(cast, safe_cast_u128_to_u64, u128, u64);

/// 10^decimals as a u64 scale factor
pub fn pow10(decimals: u8) -> LaunchpadResult<u64> {
    10u64
        .checked_pow(decimals as u32)
        .ok_or(LaunchpadError::ArithmeticOverflow)
}

/// Convert a whole-token amount to smallest units (`whole * 10^decimals`)
pub fn whole_to_units(whole: u64, decimals: u8) -> LaunchpadResult<u64> {
    safe_mul_u64(whole, pow10(decimals)?)
}

/// Convert smallest units to whole tokens, rejecting fractional amounts
pub fn units_to_whole_exact(units: u64, decimals: u8) -> LaunchpadResult<u64> {
    let scale = pow10(decimals)?;
    if units % scale != 0 {
        return Err(LaunchpadError::InvalidAmount(
            "token amount must be a whole number of tokens",
        ));
    }
    Ok(units / scale)
}

/// Integer square root for u128
pub fn sqrt_u128(n: u128) -> u128 {
    use integer_sqrt::IntegerSquareRoot;
    n.integer_sqrt()
}
