use crate::error::PriceError;
use crate::math::bit_math::most_significant_bit;
use crate::U256_128;
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// Largest tick spacing a pool will accept (`int16` on chain).
pub const MAX_TICK_SPACING: i32 = i16::MAX as i32;

/// `sqrt_price_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `sqrt_price_at_tick(MAX_TICK)`
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// log2(sqrt(1.0001)) reciprocal as Q128, and the error bounds of the
// 14-iteration log2 approximation, all taken from the on-chain TickMath.
const LOG_SQRT_10001: I256 =
    I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
const TICK_LOW_ERROR: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH_ERROR: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

const SHIFT_32: usize = 32;
const SHIFT_64: usize = 64;
const SHIFT_127: usize = 127;
const SHIFT_128: usize = 128;

/// Direction used when snapping a tick onto a spacing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
}

/// Returns the sqrt price (Q64.96 fixed‑point) at a given tick, or
/// `PriceError::TickOutOfRange` if the tick is outside
/// `[MIN_TICK, MAX_TICK]`.
///
/// Bit-for-bit identical to the Solidity `TickMath.getSqrtPriceAtTick`:
/// the ratio is built from precomputed `sqrt(1.0001)^-(2^i)` factors in
/// Q128 and rounded up when narrowed to Q96.
pub fn sqrt_price_at_tick(tick: i32) -> Result<U256, PriceError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(PriceError::TickOutOfRange(tick));
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_factor {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> SHIFT_128;
            }
        };
    }

    apply_factor!(0x2, 6459403834229662010, 18444899583751176498);
    apply_factor!(0x4, 17226890335427755468, 18443055278223354162);
    apply_factor!(0x8, 2032852871939366096, 18439367220385604838);
    apply_factor!(0x10, 14545316742740207172, 18431993317065449817);
    apply_factor!(0x20, 5129152022828963008, 18417254355718160513);
    apply_factor!(0x40, 4894419605888772193, 18387811781193591352);
    apply_factor!(0x80, 1280255884321894483, 18329067761203520168);
    apply_factor!(0x100, 15924666964335305636, 18212142134806087854);
    apply_factor!(0x200, 8010504389359918676, 17980523815641551639);
    apply_factor!(0x400, 10668036004952895731, 17526086738831147013);
    apply_factor!(0x800, 4878133418470705625, 16651378430235024244);
    apply_factor!(0x1000, 9537173718739605541, 15030750278693429944);
    apply_factor!(0x2000, 9972618978014552549, 12247334978882834399);
    apply_factor!(0x4000, 10428997489610666743, 8131365268884726200);
    apply_factor!(0x8000, 9305304367709015974, 3584323654723342297);
    apply_factor!(0x10000, 14301143598189091785, 696457651847595233);
    apply_factor!(0x20000, 7393154844743099908, 26294789957452057);
    apply_factor!(0x40000, 2209338891292245656, 37481735321082);
    apply_factor!(0x80000, 10518117631919034274, 76158723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128 -> Q96, rounding up so the result is never below the true price
    let round_up = ratio.as_limbs()[0] & 0xFFFF_FFFF != 0;
    Ok((ratio >> SHIFT_32) + U256::from(round_up as u64))
}

/// Returns the greatest tick whose sqrt price is `<= sqrt_price_x96`.
///
/// The integer `log2` is taken from the bit length, refined with 14
/// squaring steps, converted to base `sqrt(1.0001)` and then resolved
/// between the two candidate ticks with a single forward evaluation.
/// `MAX_SQRT_RATIO` itself maps to `MAX_TICK`, so this is the exact
/// left-inverse of [`sqrt_price_at_tick`] over the whole tick range.
pub fn tick_at_sqrt_price(sqrt_price_x96: U256) -> Result<i32, PriceError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 > MAX_SQRT_RATIO {
        return Err(PriceError::SqrtPriceOutOfRange(sqrt_price_x96));
    }
    if sqrt_price_x96 == MAX_SQRT_RATIO {
        return Ok(MAX_TICK);
    }

    let ratio = sqrt_price_x96 << SHIFT_32;
    let msb = most_significant_bit(ratio)? as usize;

    let mut r = if msb >= SHIFT_128 {
        ratio >> (msb - SHIFT_127)
    } else {
        ratio << (SHIFT_127 - msb)
    };

    let mut log_2 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << SHIFT_64;

    macro_rules! log2_step {
        ($shift:expr) => {{
            r = r.wrapping_mul(r) >> SHIFT_127;
            let f = r >> SHIFT_128;
            log_2 |= I256::from_raw(f << ($shift as usize));
            if !f.is_zero() {
                r >>= 1;
            }
        }};
    }

    log2_step!(63);
    log2_step!(62);
    log2_step!(61);
    log2_step!(60);
    log2_step!(59);
    log2_step!(58);
    log2_step!(57);
    log2_step!(56);
    log2_step!(55);
    log2_step!(54);
    log2_step!(53);
    log2_step!(52);
    log2_step!(51);
    log2_step!(50);

    let log_sqrt10001 = log_2.wrapping_mul(LOG_SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW_ERROR) >> SHIFT_128).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH_ERROR) >> SHIFT_128).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if sqrt_price_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}

/// Rejects spacings a pool could never be configured with.
#[inline]
pub fn validate_tick_spacing(tick_spacing: i32) -> Result<(), PriceError> {
    if tick_spacing <= 0 || tick_spacing > MAX_TICK_SPACING {
        return Err(PriceError::InvalidTickSpacing(tick_spacing));
    }
    Ok(())
}

/// Smallest tick that is a multiple of `tick_spacing` and within bounds.
pub fn min_usable_tick(tick_spacing: i32) -> Result<i32, PriceError> {
    validate_tick_spacing(tick_spacing)?;
    Ok(-(MAX_TICK / tick_spacing) * tick_spacing)
}

/// Largest tick that is a multiple of `tick_spacing` and within bounds.
pub fn max_usable_tick(tick_spacing: i32) -> Result<i32, PriceError> {
    validate_tick_spacing(tick_spacing)?;
    Ok((MAX_TICK / tick_spacing) * tick_spacing)
}

/// Snaps `tick` onto the `tick_spacing` grid in the given direction.
///
/// Fails when the aligned tick leaves the usable range instead of
/// clamping it back in.
pub fn align_tick(tick: i32, tick_spacing: i32, rounding: Rounding) -> Result<i32, PriceError> {
    validate_tick_spacing(tick_spacing)?;
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PriceError::TickOutOfRange(tick));
    }

    let floor = tick.div_euclid(tick_spacing) * tick_spacing;
    let aligned = match rounding {
        Rounding::Floor => floor,
        Rounding::Ceil if floor == tick => floor,
        Rounding::Ceil => floor + tick_spacing,
    };

    if aligned < min_usable_tick(tick_spacing)? || aligned > max_usable_tick(tick_spacing)? {
        return Err(PriceError::TickOutOfRange(aligned));
    }
    Ok(aligned)
}
