//! # Ledger Invariants
//!
//! Read-only consistency checks over the share ledger, safe to run between
//! any two state transitions. Each returns `(message, broken)`.
//!
//! | Route           | Checks                                                      |
//! |-----------------|-------------------------------------------------------------|
//! | `vault-records` | every vault record is valid and non-zero                    |
//! | `share-records` | every share record is sorted, unique and positive           |
//! | `vault-shares`  | per denom, vault total == sum of depositor shares           |

use std::collections::{BTreeMap, BTreeSet};

use tracing::error;

use crate::config::MODULE_NAME;
use crate::storage::VaultLedger;
use crate::types::Dec;

/// An invariant check.
pub type Invariant = fn(&VaultLedger) -> (String, bool);

/// Something invariants can be registered with.
pub trait InvariantRegistry {
    fn register_route(&mut self, module: &str, route: &str, invariant: Invariant);
}

/// Registers every earn invariant with `registry`.
pub fn register_invariants(registry: &mut impl InvariantRegistry) {
    registry.register_route(MODULE_NAME, "vault-records", vault_records_invariant);
    registry.register_route(MODULE_NAME, "share-records", share_records_invariant);
    registry.register_route(MODULE_NAME, "vault-shares", vault_shares_invariant);
}

/// Outcome of one registered invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantReport {
    pub module: String,
    pub route: String,
    pub message: String,
    pub broken: bool,
}

/// A plain list of registered invariants.
#[derive(Clone, Default)]
pub struct InvariantSet {
    routes: Vec<(String, String, Invariant)>,
}

impl InvariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `module/route` names in registration order.
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|(module, route, _)| format!("{module}/{route}"))
            .collect()
    }

    /// Runs every invariant against `ledger`.
    pub fn check(&self, ledger: &VaultLedger) -> Vec<InvariantReport> {
        self.routes
            .iter()
            .map(|(module, route, invariant)| {
                let (message, broken) = invariant(ledger);
                InvariantReport {
                    module: module.clone(),
                    route: route.clone(),
                    message,
                    broken,
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for InvariantSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvariantSet")
            .field("routes", &self.routes())
            .finish()
    }
}

impl InvariantRegistry for InvariantSet {
    fn register_route(&mut self, module: &str, route: &str, invariant: Invariant) {
        self.routes
            .push((module.to_string(), route.to_string(), invariant));
    }
}

fn format_invariant(name: &str, detail: &str) -> String {
    format!("{MODULE_NAME}: {name} invariant\n{detail}\n")
}

fn report(name: &str, detail: &str, broken: bool) -> (String, bool) {
    let message = format_invariant(name, detail);
    if broken {
        error!(invariant = name, "{}", message.trim_end());
    }
    (message, broken)
}

/// Runs every invariant, returning the first broken one.
pub fn all_invariants(ledger: &VaultLedger) -> (String, bool) {
    for invariant in [
        vault_records_invariant as Invariant,
        share_records_invariant,
        vault_shares_invariant,
    ] {
        let (message, broken) = invariant(ledger);
        if broken {
            return (message, true);
        }
    }
    (String::new(), false)
}

/// Every vault record passes validation and holds shares.
pub fn vault_records_invariant(ledger: &VaultLedger) -> (String, bool) {
    const NAME: &str = "validate vault records broken";

    let records = match ledger.iterate_vault_records() {
        Ok(records) => records,
        Err(err) => return report(NAME, &format!("vault records unreadable: {err}"), true),
    };

    let broken = records
        .iter()
        .any(|r| r.validate().is_err() || r.total().is_zero());
    report(NAME, "vault record invalid", broken)
}

/// Every share record passes validation.
pub fn share_records_invariant(ledger: &VaultLedger) -> (String, bool) {
    const NAME: &str = "validate share records broken";

    let records = match ledger.iterate_vault_share_records() {
        Ok(records) => records,
        Err(err) => return report(NAME, &format!("share records unreadable: {err}"), true),
    };

    let broken = records
        .iter()
        .any(|r| r.validate().is_err() || r.shares.is_empty());
    report(NAME, "share record invalid", broken)
}

/// Vault totals equal the sum of depositor shares, denom by denom.
///
/// A denom held by depositors with no vault record compares against zero.
pub fn vault_shares_invariant(ledger: &VaultLedger) -> (String, bool) {
    const NAME: &str = "vault shares broken";
    const DETAIL: &str = "vault shares do not match depositor shares";

    let (vault_records, share_records) = match (
        ledger.iterate_vault_records(),
        ledger.iterate_vault_share_records(),
    ) {
        (Ok(v), Ok(s)) => (v, s),
        (Err(err), _) | (_, Err(err)) => {
            return report(NAME, &format!("records unreadable: {err}"), true)
        }
    };

    let totals: BTreeMap<&str, Dec> = vault_records
        .iter()
        .map(|r| (r.denom(), r.total()))
        .collect();

    let mut sums: BTreeMap<&str, Dec> = BTreeMap::new();
    for record in &share_records {
        for share in &record.shares {
            let sum = sums.entry(share.denom.as_str()).or_default();
            match sum.checked_add(share.amount) {
                Ok(next) => *sum = next,
                Err(_) => return report(NAME, DETAIL, true),
            }
        }
    }

    let denoms: BTreeSet<&str> = totals.keys().chain(sums.keys()).copied().collect();
    let broken = denoms.into_iter().any(|denom| {
        totals.get(denom).copied().unwrap_or(Dec::ZERO)
            != sums.get(denom).copied().unwrap_or(Dec::ZERO)
    });

    report(NAME, DETAIL, broken)
}
