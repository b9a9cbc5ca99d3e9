#![allow(dead_code)]

use std::hint::black_box;

use clmm_auction_math::{
    Address, U256,
    math::{
        bit_math::most_significant_bit,
        price::price_to_tick,
        tick_math::{MAX_TICK, MIN_TICK, Rounding, sqrt_price_at_tick, tick_at_sqrt_price},
    },
    miner::{MiningRequest, mine},
    range::{MarketCapConfig, MarketCapRange, PriceRange, compute_ticks, compute_ticks_from_market_cap},
    schedule::calculate_gamma,
};
use criterion::{BenchmarkId, Criterion, Throughput};

const TICKS: [i32; 7] = [MIN_TICK, -200_000, -46_055, 0, 46_054, 200_000, MAX_TICK];

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    for tick in TICKS {
        group.bench_with_input(BenchmarkId::new("sqrt_price_at_tick", tick), &tick, |b, &tick| {
            b.iter(|| sqrt_price_at_tick(black_box(tick)).unwrap())
        });
    }
    for tick in TICKS {
        let sqrt_price = sqrt_price_at_tick(tick).unwrap();
        group.bench_with_input(
            BenchmarkId::new("tick_at_sqrt_price", tick),
            &sqrt_price,
            |b, &sqrt_price| b.iter(|| tick_at_sqrt_price(black_box(sqrt_price)).unwrap()),
        );
    }
    group.finish();
}

pub fn bench_bit_math(c: &mut Criterion) {
    let values = [U256::ONE, U256::from(u64::MAX), U256::MAX];
    c.bench_function("most_significant_bit", |b| {
        b.iter(|| {
            for value in &values {
                black_box(most_significant_bit(black_box(*value)).unwrap());
            }
        })
    });
}

pub fn bench_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("price");
    for price in [1e-12, 0.01, 1.0, 100.0, 1e12] {
        group.bench_with_input(BenchmarkId::new("price_to_tick", price), &price, |b, &price| {
            b.iter(|| price_to_tick(black_box(price), 60, Rounding::Floor).unwrap())
        });
    }
    group.finish();
}

pub fn bench_ranges(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    group.bench_function("compute_ticks", |b| {
        b.iter(|| compute_ticks(black_box(PriceRange::new(100.0, 0.01)), 60).unwrap())
    });

    let config = MarketCapConfig::new(1e9, 3_000.0, 200).with_decimals(18, 18);
    group.bench_function("compute_ticks_from_market_cap", |b| {
        b.iter(|| {
            compute_ticks_from_market_cap(black_box(MarketCapRange::unbounded(1e6)), &config)
                .unwrap()
        })
    });

    let ticks = compute_ticks(PriceRange::new(100.0, 0.01), 60).unwrap();
    group.bench_function("calculate_gamma", |b| {
        b.iter(|| calculate_gamma(black_box(&ticks), black_box(720), 60).unwrap())
    });
    group.finish();
}

/// Fixed-length searches that never match, so every run hashes exactly
/// `ITERATIONS` candidates.
pub fn bench_miner(c: &mut Criterion) {
    const ITERATIONS: u64 = 10_000;
    let impossible = "0000000000000000000000000000000000000000";
    let base = MiningRequest::new(Address::repeat_byte(0x42), Default::default())
        .with_prefix(impossible)
        .with_max_iterations(ITERATIONS);

    let mut group = c.benchmark_group("miner");
    group.throughput(Throughput::Elements(ITERATIONS));
    group.bench_function("nonce_salt", |b| b.iter(|| mine(black_box(&base)).unwrap_err()));

    let digest = base.clone().with_payload_digest(Default::default());
    group.bench_function("digest_salt", |b| b.iter(|| mine(black_box(&digest)).unwrap_err()));

    #[cfg(feature = "parallel")]
    for workers in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("parallel", workers), &workers, |b, &workers| {
            b.iter(|| {
                clmm_auction_math::miner::mine_parallel(black_box(&base), workers).unwrap_err()
            })
        });
    }
    group.finish();
}
