// Share conversion benchmarks for NOVA Earn.
//
// Covers the 256-bit mul-div primitive, asset/share conversion at several
// vault sizes, and a full keeper deposit against the in-memory store.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::Mutex;

use nova_earn::bank::{Bank, BankError};
use nova_earn::keeper::VaultSnapshot;
use nova_earn::strategy::{Strategy, StrategyError, StrategyRegistry, StrategyType};
use nova_earn::types::{mul_div_floor, Address, Coin, Dec};
use nova_earn::vault::{AllowedVault, Params};
use nova_earn::{Keeper, VaultLedger};

/// Bank that accepts every transfer.
struct OpenBank;

impl Bank for OpenBank {
    fn send(&self, _from: &Address, _to: &Address, _coin: &Coin) -> Result<(), BankError> {
        Ok(())
    }

    fn balance(&self, _address: &Address, _denom: &str) -> u128 {
        u128::MAX
    }
}

/// Strategy that keeps a running total.
#[derive(Default)]
struct Counter(Mutex<u128>);

impl Strategy for Counter {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Hard
    }

    fn total_realizable_value(&self, denom: &str) -> Result<Coin, StrategyError> {
        Ok(Coin::new(denom, *self.0.lock()))
    }

    fn deposit(&self, amount: &Coin) -> Result<(), StrategyError> {
        *self.0.lock() += amount.amount;
        Ok(())
    }

    fn withdraw(&self, amount: &Coin) -> Result<(), StrategyError> {
        *self.0.lock() -= amount.amount;
        Ok(())
    }
}

fn bench_mul_div(c: &mut Criterion) {
    c.bench_function("conversion/mul_div_floor", |b| {
        b.iter(|| {
            mul_div_floor(
                black_box(123_456_789_012_345_678),
                black_box(1_099_900_099_900_099_900_099),
                black_box(1_101),
            )
        });
    });
}

fn bench_asset_to_shares(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion/asset_to_shares");

    for total in [1_000u128, 1_000_000_000, 1_000_000_000_000_000] {
        let snapshot = VaultSnapshot::new(
            "usdx",
            Dec::from_int(total).expect("total shares"),
            total + total / 3,
        );
        group.bench_with_input(BenchmarkId::from_parameter(total), &snapshot, |b, s| {
            b.iter(|| s.asset_to_shares(black_box(12_345)));
        });
    }

    group.finish();
}

fn bench_shares_to_asset(c: &mut Criterion) {
    let snapshot = VaultSnapshot::new(
        "usdx",
        Dec::from_int(1_000_000_000).expect("total shares"),
        1_333_333_333,
    );
    let shares = Dec::from_int(12_345).expect("shares");

    c.bench_function("conversion/shares_to_asset", |b| {
        b.iter(|| snapshot.shares_to_asset(black_box(shares)));
    });
}

fn bench_keeper_deposit(c: &mut Criterion) {
    let pool = Address::from_bytes(b"earn-vault-pool".to_vec()).expect("pool address");
    let keeper = Keeper::new(
        VaultLedger::in_memory(),
        Arc::new(OpenBank),
        StrategyRegistry::new().with(Arc::new(Counter::default())),
        pool,
    );
    keeper
        .set_params(&Params::new(vec![AllowedVault::new(
            "usdx",
            vec![StrategyType::Hard],
        )]))
        .expect("params");
    let keeper = Mutex::new(keeper);
    let depositors: Vec<Address> = (0u8..16)
        .map(|i| Address::from_bytes(vec![i; 20]).expect("address"))
        .collect();

    c.bench_function("keeper/deposit", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let depositor = &depositors[i % depositors.len()];
            i += 1;
            let mut keeper = keeper.lock();
            keeper
                .deposit(depositor, Coin::new("usdx", 1_000), StrategyType::Hard)
                .expect("deposit");
            keeper.take_events();
        });
    });
}

criterion_group!(
    benches,
    bench_mul_div,
    bench_asset_to_shares,
    bench_shares_to_asset,
    bench_keeper_deposit,
);
criterion_main!(benches);
