//! # Mathematical Functions
//!
//! Pure integer math for curve pricing, fees and AMM pool parameters.

pub mod big_int;
pub mod fee_math;
pub mod pricing;
pub mod safe_math;
pub mod sqrt_price;

// Re-export commonly used functions
pub use big_int::*;
pub use fee_math::*;
pub use pricing::*;
pub use safe_math::*;
pub use sqrt_price::*;
