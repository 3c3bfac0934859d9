//! Shared fixtures for the keeper integration suites: an in-memory bank, a
//! yield backend that can accrue, lose and refuse funds, a store whose writes
//! can fail, and a harness that wires them into a [`Keeper`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use nova_earn::bank::{Bank, BankError};
use nova_earn::storage::{KvStore, MemStore, StoreError, StoreResult, VaultLedger, WriteBatch};
use nova_earn::strategy::{
    HardStrategy, LendingMarket, SavingsPool, SavingsStrategy, StrategyError, StrategyRegistry,
    StrategyType,
};
use nova_earn::types::{Address, Coin, Dec};
use nova_earn::vault::{AllowedVault, Params};
use nova_earn::{EarnHooks, Keeper};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn addr(byte: u8) -> Address {
    Address::from_bytes(vec![byte; 20]).expect("valid address")
}

pub fn coin(denom: &str, amount: u128) -> Coin {
    Coin::new(denom, amount)
}

pub fn dec(s: &str) -> Dec {
    s.parse().expect("valid decimal")
}

/// `usdx` on the lending market, `unova` and the `bnova` derivatives in
/// savings.
pub fn default_vaults() -> Vec<AllowedVault> {
    vec![
        AllowedVault::new("usdx", vec![StrategyType::Hard]),
        AllowedVault::new("unova", vec![StrategyType::Savings]),
        AllowedVault::new("bnova", vec![StrategyType::Savings]),
    ]
}

// ---------------------------------------------------------------------------
// MockBank
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockBank {
    balances: Mutex<HashMap<(Address, String), u128>>,
    blocked: Mutex<Option<Address>>,
}

impl MockBank {
    pub fn mint(&self, to: &Address, coin: &Coin) {
        *self
            .balances
            .lock()
            .entry((to.clone(), coin.denom.clone()))
            .or_default() += coin.amount;
    }

    pub fn balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .lock()
            .get(&(address.clone(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Makes every send to `account` fail until cleared.
    pub fn block_recipient(&self, account: Option<Address>) {
        *self.blocked.lock() = account;
    }
}

impl Bank for MockBank {
    fn send(&self, from: &Address, to: &Address, coin: &Coin) -> Result<(), BankError> {
        if self.blocked.lock().as_ref() == Some(to) {
            return Err(BankError::Other(format!("account {to} cannot receive funds")));
        }

        let mut balances = self.balances.lock();
        let available = balances
            .get(&(from.clone(), coin.denom.clone()))
            .copied()
            .unwrap_or(0);
        if available < coin.amount {
            return Err(BankError::InsufficientFunds {
                address: from.clone(),
                denom: coin.denom.clone(),
                available,
                requested: coin.amount,
            });
        }

        balances.insert((from.clone(), coin.denom.clone()), available - coin.amount);
        *balances
            .entry((to.clone(), coin.denom.clone()))
            .or_default() += coin.amount;
        Ok(())
    }

    fn balance(&self, address: &Address, denom: &str) -> u128 {
        MockBank::balance(self, address, denom)
    }
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// A yield backend holding funds in a custody account on the mock bank.
pub struct MockBackend {
    bank: Arc<MockBank>,
    custody: Address,
    supplied: Mutex<HashMap<(Address, String), u128>>,
    fail_deposits: AtomicBool,
    fail_withdrawals: AtomicBool,
    fail_value: AtomicBool,
}

impl MockBackend {
    pub fn new(bank: Arc<MockBank>, custody: Address) -> Self {
        Self {
            bank,
            custody,
            supplied: Mutex::new(HashMap::new()),
            fail_deposits: AtomicBool::new(false),
            fail_withdrawals: AtomicBool::new(false),
            fail_value: AtomicBool::new(false),
        }
    }

    /// Interest: `owner`'s position grows by `coin`.
    pub fn accrue(&self, owner: &Address, coin: &Coin) {
        self.bank.mint(&self.custody, coin);
        *self
            .supplied
            .lock()
            .entry((owner.clone(), coin.denom.clone()))
            .or_default() += coin.amount;
    }

    /// Loss: `owner`'s position shrinks by `coin`.
    pub fn lose(&self, owner: &Address, coin: &Coin) {
        let mut supplied = self.supplied.lock();
        let held = supplied
            .entry((owner.clone(), coin.denom.clone()))
            .or_default();
        *held = held.saturating_sub(coin.amount);
    }

    pub fn supplied(&self, owner: &Address, denom: &str) -> u128 {
        self.supplied
            .lock()
            .get(&(owner.clone(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn fail_deposits(&self, fail: bool) {
        self.fail_deposits.store(fail, Ordering::SeqCst);
    }

    pub fn fail_withdrawals(&self, fail: bool) {
        self.fail_withdrawals.store(fail, Ordering::SeqCst);
    }

    pub fn fail_value(&self, fail: bool) {
        self.fail_value.store(fail, Ordering::SeqCst);
    }

    fn holdings(&self, owner: &Address) -> Result<Vec<Coin>, StrategyError> {
        if self.fail_value.load(Ordering::SeqCst) {
            return Err(StrategyError::Backend("value unavailable".into()));
        }
        Ok(self
            .supplied
            .lock()
            .iter()
            .filter(|((o, _), amount)| o == owner && **amount > 0)
            .map(|((_, denom), amount)| Coin::new(denom.clone(), *amount))
            .collect())
    }

    fn put(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        if self.fail_deposits.load(Ordering::SeqCst) {
            return Err(StrategyError::Backend("deposits disabled".into()));
        }
        self.bank
            .send(owner, &self.custody, amount)
            .map_err(|e| StrategyError::Backend(e.to_string()))?;
        *self
            .supplied
            .lock()
            .entry((owner.clone(), amount.denom.clone()))
            .or_default() += amount.amount;
        Ok(())
    }

    fn take(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        if self.fail_withdrawals.load(Ordering::SeqCst) {
            return Err(StrategyError::Backend("withdrawals disabled".into()));
        }
        let held = self.supplied(owner, &amount.denom);
        if held < amount.amount {
            return Err(StrategyError::InsufficientBackendBalance {
                denom: amount.denom.clone(),
                available: held,
                requested: amount.amount,
            });
        }
        self.bank
            .send(&self.custody, owner, amount)
            .map_err(|e| StrategyError::Backend(e.to_string()))?;
        self.supplied
            .lock()
            .insert((owner.clone(), amount.denom.clone()), held - amount.amount);
        Ok(())
    }
}

impl LendingMarket for MockBackend {
    fn synced_deposit(&self, owner: &Address) -> Result<Vec<Coin>, StrategyError> {
        self.holdings(owner)
    }

    fn deposit(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        self.put(owner, amount)
    }

    fn withdraw(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        self.take(owner, amount)
    }
}

impl SavingsPool for MockBackend {
    fn deposit_of(&self, owner: &Address) -> Result<Vec<Coin>, StrategyError> {
        self.holdings(owner)
    }

    fn deposit(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        self.put(owner, amount)
    }

    fn withdraw(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
        self.take(owner, amount)
    }
}

// ---------------------------------------------------------------------------
// FlakyStore
// ---------------------------------------------------------------------------

/// A [`MemStore`] whose batch writes fail while armed. Reads and single-key
/// writes always succeed.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for FlakyStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.inner.delete(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.scan_prefix(prefix)
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Sled(sled::Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk full",
            ))));
        }
        self.inner.write_batch(batch)
    }
}

// ---------------------------------------------------------------------------
// CountingHooks
// ---------------------------------------------------------------------------

/// Counts every hook call, whichever callback it was.
#[derive(Clone, Default)]
pub struct CountingHooks {
    calls: Arc<AtomicUsize>,
}

impl CountingHooks {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EarnHooks for CountingHooks {
    fn after_vault_deposit_created(&self, _: &VaultLedger, _: &str, _: &Address, _: Dec) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn before_vault_deposit_modified(&self, _: &VaultLedger, _: &str, _: &Address, _: Dec) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub keeper: Keeper,
    pub bank: Arc<MockBank>,
    pub hard: Arc<MockBackend>,
    pub savings: Arc<MockBackend>,
    pub pool: Address,
}

impl Harness {
    pub fn new(vaults: Vec<AllowedVault>) -> Self {
        Self::with_ledger(VaultLedger::in_memory(), vaults)
    }

    /// A harness over a [`FlakyStore`], returned alongside it.
    pub fn with_flaky_store(vaults: Vec<AllowedVault>) -> (Self, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::default());
        let harness = Self::with_ledger(VaultLedger::new(store.clone()), vaults);
        (harness, store)
    }

    pub fn with_ledger(ledger: VaultLedger, vaults: Vec<AllowedVault>) -> Self {
        let bank = Arc::new(MockBank::default());
        let pool = Address::from_bytes(b"earn-vault-pool".to_vec()).expect("pool address");
        let hard = Arc::new(MockBackend::new(
            bank.clone(),
            Address::from_bytes(b"hard-custody".to_vec()).expect("custody address"),
        ));
        let savings = Arc::new(MockBackend::new(
            bank.clone(),
            Address::from_bytes(b"savings-custody".to_vec()).expect("custody address"),
        ));

        let strategies = StrategyRegistry::new()
            .with(Arc::new(HardStrategy::new(hard.clone(), pool.clone())))
            .with(Arc::new(SavingsStrategy::new(savings.clone(), pool.clone())));

        let keeper = Keeper::new(ledger, bank.clone(), strategies, pool.clone());
        keeper
            .set_params(&Params::new(vaults))
            .expect("valid params");

        Self {
            keeper,
            bank,
            hard,
            savings,
            pool,
        }
    }

    /// A depositor funded with `coins`.
    pub fn account(&self, byte: u8, coins: &[Coin]) -> Address {
        let account = addr(byte);
        for c in coins {
            self.bank.mint(&account, c);
        }
        account
    }

    /// The backend serving `denom` under the default vault set.
    pub fn backend_for(&self, denom: &str) -> &MockBackend {
        if denom == "usdx" {
            &self.hard
        } else {
            &self.savings
        }
    }

    /// Simulated yield on the vault for `denom`.
    pub fn accrue(&self, denom: &str, amount: u128) {
        self.backend_for(denom).accrue(&self.pool, &coin(denom, amount));
    }

    pub fn vault_value(&self, denom: &str) -> u128 {
        self.keeper
            .get_vault_total_value(denom)
            .expect("vault value")
            .amount
    }

    pub fn total_shares(&self, denom: &str) -> Dec {
        self.keeper
            .get_vault_total_shares(denom)
            .expect("total shares")
            .map(|s| s.amount)
            .unwrap_or(Dec::ZERO)
    }

    pub fn account_shares(&self, depositor: &Address, denom: &str) -> Dec {
        self.keeper
            .get_vault_account_shares(depositor)
            .expect("account shares")
            .map(|s| s.amount_of(denom))
            .unwrap_or(Dec::ZERO)
    }
}
