//! # Earn Module Configuration & Constants
//!
//! Every magic number in the earn module lives here. Store key prefixes in
//! particular are consensus-critical: changing one after launch orphans every
//! record written under the old prefix.

// ---------------------------------------------------------------------------
// Module Identity
// ---------------------------------------------------------------------------

/// Module name. Used as the invariant route namespace and in log targets.
pub const MODULE_NAME: &str = "earn";

/// Human-readable prefix for bech32 account addresses.
pub const ACCOUNT_HRP: &str = "nova";

/// Maximum length of a raw account address in bytes. The storage key encodes
/// the length in a single byte, so this is a hard limit.
pub const MAX_ADDRESS_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Decimal Arithmetic
// ---------------------------------------------------------------------------

/// Number of fractional digits carried by [`Dec`](crate::types::Dec).
pub const DECIMAL_PRECISION: u32 = 18;

/// `10^DECIMAL_PRECISION` -- the atom count of `1.0`.
pub const DECIMAL_ONE: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Minimum denom length, inclusive.
pub const MIN_DENOM_LENGTH: usize = 3;

/// Maximum denom length, inclusive.
pub const MAX_DENOM_LENGTH: usize = 128;

/// Allowed-vault denom that multiplexes every staking derivative denom.
///
/// A single `bnova` vault configuration serves `bnova-<validator>` denoms.
/// Each derivative denom still gets its own vault record and share price.
pub const DERIVATIVE_VAULT_DENOM: &str = "bnova";

/// Separator between [`DERIVATIVE_VAULT_DENOM`] and the validator suffix.
pub const DERIVATIVE_DENOM_SEPARATOR: char = '-';

// ---------------------------------------------------------------------------
// Store Layout
// ---------------------------------------------------------------------------

/// Single key holding the bincode-encoded [`Params`](crate::vault::Params).
pub const PARAMS_KEY: &[u8] = &[0x00];

/// Prefix for vault records: `0x01 || denom`.
pub const VAULT_RECORD_PREFIX: u8 = 0x01;

/// Prefix for vault share records: `0x02 || len(address) || address`.
pub const VAULT_SHARE_RECORD_PREFIX: u8 = 0x02;

/// Name of the sled tree that holds all earn state.
pub const EARN_TREE_NAME: &str = "earn";

/// Returns `true` if `denom` is a staking derivative denom served by the
/// aggregate derivative vault, e.g. `bnova-validator1`.
pub fn is_derivative_denom(denom: &str) -> bool {
    match denom.strip_prefix(DERIVATIVE_VAULT_DENOM) {
        Some(rest) => {
            let mut chars = rest.chars();
            chars.next() == Some(DERIVATIVE_DENOM_SEPARATOR) && chars.next().is_some()
        }
        None => false,
    }
}
