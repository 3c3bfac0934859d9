//! # Primitive Types
//!
//! The value types everything else in the earn module is built from.
//!
//! ```text
//! dec.rs       Fixed-point share decimal, 256-bit mul-then-div
//! coin.rs      Whole-unit asset amounts and denom validation
//! address.rs   Opaque depositor addresses (bech32 `nova1...`)
//! ```

pub mod address;
pub mod coin;
pub mod dec;

pub use address::{Address, AddressError};
pub use coin::{validate_denom, Coin, DenomError};
pub use dec::{mul_div_ceil, mul_div_floor, Dec, DecError, U256};
