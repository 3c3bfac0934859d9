//! # Vault Module: Share Records & Vault Configuration
//!
//! The data side of the earn module. Everything here is a plain value: no
//! storage, no strategies, no side effects. The keeper owns the rules for
//! how these values change.
//!
//! ## Architecture
//!
//! ```text
//! share.rs     VaultShare / VaultShares: per-denom share amounts
//! record.rs    VaultRecord (per denom) and VaultShareRecord (per depositor)
//! allowed.rs   AllowedVault and Params: which denoms accept deposits
//! error.rs     ShareError, ParamsError
//! ```
//!
//! ## Invariants
//!
//! 1. **No zero records.** A vault record with zero total shares, or a share
//!    record with no entries, is deleted rather than stored.
//!
//! 2. **Canonical share sets.** A depositor's shares are sorted by denom,
//!    unique, and strictly positive, so two equal positions always encode to
//!    the same bytes.
//!
//! 3. **Totals match.** For every denom, the vault record total equals the
//!    sum of all depositors' entries. See [`crate::keeper::invariants`].

pub mod allowed;
pub mod error;
pub mod record;
pub mod share;

pub use allowed::{AllowedVault, Params};
pub use error::{ParamsError, ShareError};
pub use record::{VaultRecord, VaultRecords, VaultShareRecord, VaultShareRecords};
pub use share::{VaultShare, VaultShares};
