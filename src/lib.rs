//! Parameter math for scheduled token auctions on a concentrated
//! liquidity AMM.
//!
//! This crate turns auction intent into the integer values an auction
//! hook and its deployer need, matching the on-chain fixed-point and
//! hashing conventions exactly:
//! - [`math`]: the tick ⇄ sqrt price codec (Q64.96) and a floating-point
//!   price layer on top of it.
//! - [`range`]: price or market-cap ranges to spacing-aligned tick ranges.
//! - [`schedule`]: per-epoch tick decay (`gamma`) and price previews.
//! - [`miner`]: CREATE2 salt search for vanity / flag-constrained addresses.
//!
//! # Examples
//!
//! ## From prices to a decay schedule
//! ```no_run
//! use clmm_auction_math::{
//!     range::{PriceRange, compute_ticks},
//!     schedule::{calculate_gamma, estimate_price_at_epoch},
//! };
//!
//! // a Dutch auction sliding from 100 down to 1 over 10 epochs
//! let ticks = compute_ticks(PriceRange::new(100.0, 1.0), 60).unwrap();
//! let gamma = calculate_gamma(&ticks, 10, 60).unwrap();
//! assert!(gamma < 0);
//!
//! let preview = estimate_price_at_epoch(ticks.start_tick, gamma, 5).unwrap();
//! println!("price after 5 epochs: {preview}");
//! ```
//!
//! ## Mining a salt
//! ```no_run
//! use clmm_auction_math::{Address, B256, U256, miner::{MiningRequest, mine}};
//!
//! let request = MiningRequest::new(Address::ZERO, B256::ZERO)
//!     .with_prefix("00")
//!     .with_max_iterations(1_000_000);
//! let found = mine(&request).unwrap();
//! assert!(found.nonce >= U256::ZERO);
//! println!("{} at salt {}", found.checksum, found.salt);
//! ```

pub use alloy_primitives::{Address, B256, I256, U256};

pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod miner;
pub mod range;
pub mod schedule;

pub use error::Error;
pub use hash::FastMap;

const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
