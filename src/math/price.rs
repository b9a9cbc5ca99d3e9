//! Floating-point convenience layer over the tick codec.
//!
//! Prices are plain `f64` ratios of quote per base unit, as a pool
//! sees them (`token1 / token0`, in raw units). The integer codec in
//! [`tick_math`](super::tick_math) stays the source of truth: this layer
//! only decides which tick a human price belongs to.

use crate::error::PriceError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, Rounding, align_tick};

/// Base of the tick coordinate: `price = TICK_BASE ^ tick`.
pub const TICK_BASE: f64 = 1.0001;

#[inline(always)]
fn checked_price(price: f64) -> Result<f64, PriceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PriceError::NonPositiveInput {
            what: "price",
            value: price,
        });
    }
    Ok(price)
}

/// Returns `1.0001^tick`.
pub fn tick_to_price(tick: i32) -> Result<f64, PriceError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PriceError::TickOutOfRange(tick));
    }
    Ok(TICK_BASE.powi(tick))
}

/// Greatest tick `t` with `1.0001^t <= price`, without any spacing.
///
/// The logarithm gives an estimate that can sit one tick off when the
/// price lies on (or within an ulp of) a tick boundary; the estimate is
/// corrected against `powi` so the floor is exact in `f64` terms.
pub fn price_to_tick_unaligned(price: f64) -> Result<i32, PriceError> {
    let price = checked_price(price)?;
    let estimate = (price.ln() / TICK_BASE.ln()).floor();

    // outside the tick domain by more than the correction window
    if estimate < f64::from(MIN_TICK) - 1.0 || estimate > f64::from(MAX_TICK) + 1.0 {
        return Err(PriceError::PriceOutOfRange(price));
    }

    let mut tick = estimate as i32;
    if TICK_BASE.powi(tick) > price {
        tick -= 1;
    } else if TICK_BASE.powi(tick + 1) <= price {
        tick += 1;
    }

    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PriceError::PriceOutOfRange(price));
    }
    Ok(tick)
}

/// Smallest tick `t` with `1.0001^t >= price`, without any spacing.
pub fn ceil_tick_unaligned(price: f64) -> Result<i32, PriceError> {
    let floor = price_to_tick_unaligned(price)?;
    if TICK_BASE.powi(floor) == price {
        return Ok(floor);
    }
    if floor == MAX_TICK {
        return Err(PriceError::PriceOutOfRange(price));
    }
    Ok(floor + 1)
}

/// Converts a price to a tick on the `tick_spacing` grid.
///
/// `Rounding::Floor` yields the greatest usable tick at or below the
/// price and `Rounding::Ceil` the smallest one at or above it, so a range
/// whose lower end is floored and upper end is ceiled always contains
/// the requested prices.
pub fn price_to_tick(price: f64, tick_spacing: i32, rounding: Rounding) -> Result<i32, PriceError> {
    let unaligned = match rounding {
        Rounding::Floor => price_to_tick_unaligned(price)?,
        Rounding::Ceil => ceil_tick_unaligned(price)?,
    };
    align_tick(unaligned, tick_spacing, rounding).map_err(|err| match err {
        PriceError::TickOutOfRange(_) => PriceError::PriceOutOfRange(price),
        other => other,
    })
}
