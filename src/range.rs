//! Price and market-cap ranges to spacing-aligned tick ranges.

use crate::FastMap;
use crate::hash::fast_map_with_capacity;
use crate::config::ChainParams;
use crate::error::PriceError;
use crate::math::price::price_to_tick;
use crate::math::tick_math::{
    Rounding, max_usable_tick, min_usable_tick, validate_tick_spacing,
};
use tracing::debug;

/// Upper end of a range, which may be left open.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpperBound {
    Finite(f64),
    /// No ceiling: the range runs to the largest usable tick.
    Unbounded,
}

/// Start and end price of an auction, in raw `token1 / token0` units.
///
/// The ends are not reordered: `start > end` describes a descending
/// (Dutch) auction, `start < end` an ascending one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceRange {
    pub start: f64,
    pub end: UpperBound,
}

impl PriceRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: UpperBound::Finite(end),
        }
    }

    pub fn unbounded(start: f64) -> Self {
        Self {
            start,
            end: UpperBound::Unbounded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRange {
    pub start_tick: i32,
    pub end_tick: i32,
    pub tick_spacing: i32,
}

impl TickRange {
    /// Builds a range from ticks that are already on the spacing grid.
    pub fn new(start_tick: i32, end_tick: i32, tick_spacing: i32) -> Result<Self, PriceError> {
        let min = min_usable_tick(tick_spacing)?;
        let max = max_usable_tick(tick_spacing)?;

        for tick in [start_tick, end_tick] {
            if tick < min || tick > max {
                return Err(PriceError::TickOutOfRange(tick));
            }
            if tick % tick_spacing != 0 {
                return Err(PriceError::InvalidRange {
                    start: start_tick,
                    end: end_tick,
                });
            }
        }

        Ok(Self {
            start_tick,
            end_tick,
            tick_spacing,
        })
    }

    #[inline]
    pub fn is_descending(&self) -> bool {
        self.end_tick < self.start_tick
    }

    #[inline]
    pub fn lower(&self) -> i32 {
        self.start_tick.min(self.end_tick)
    }

    #[inline]
    pub fn upper(&self) -> i32 {
        self.start_tick.max(self.end_tick)
    }

    /// Signed distance from start to end.
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.end_tick) - i64::from(self.start_tick)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.delta().unsigned_abs() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeConfig {
    pub tick_spacing: i32,
    /// Accept a range whose two ends align to the same tick.
    pub allow_single_tick: bool,
}

impl RangeConfig {
    pub fn new(tick_spacing: i32) -> Self {
        Self {
            tick_spacing,
            allow_single_tick: false,
        }
    }

    pub fn allow_single_tick(mut self, allow: bool) -> Self {
        self.allow_single_tick = allow;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum EndTick {
    Price(f64),
    MaxUsable,
    MinUsable,
}

/// Converts a price range into a tick range on the `tick_spacing` grid.
///
/// See [`compute_ticks_with`]; single-tick ranges are rejected.
pub fn compute_ticks(range: PriceRange, tick_spacing: i32) -> Result<TickRange, PriceError> {
    compute_ticks_with(range, &RangeConfig::new(tick_spacing))
}

/// Converts a price range into a tick range under `config`.
///
/// Each end is converted independently and keeps its position, so the
/// direction of the auction survives. Whichever end is lower in price is
/// floored and the other ceiled, which means the tick range always covers
/// the requested prices. An unbounded end becomes the largest usable tick.
pub fn compute_ticks_with(
    range: PriceRange,
    config: &RangeConfig,
) -> Result<TickRange, PriceError> {
    let end = match range.end {
        UpperBound::Finite(price) => EndTick::Price(price),
        UpperBound::Unbounded => EndTick::MaxUsable,
    };
    ticks_from_bounds(range.start, end, config)
}

fn ticks_from_bounds(
    start_price: f64,
    end: EndTick,
    config: &RangeConfig,
) -> Result<TickRange, PriceError> {
    let spacing = config.tick_spacing;
    validate_tick_spacing(spacing)?;

    let (start_tick, end_tick) = match end {
        EndTick::Price(end_price) => {
            let (start_rounding, end_rounding) = if start_price <= end_price {
                (Rounding::Floor, Rounding::Ceil)
            } else {
                (Rounding::Ceil, Rounding::Floor)
            };
            (
                price_to_tick(start_price, spacing, start_rounding)?,
                price_to_tick(end_price, spacing, end_rounding)?,
            )
        }
        EndTick::MaxUsable => (
            price_to_tick(start_price, spacing, Rounding::Floor)?,
            max_usable_tick(spacing)?,
        ),
        EndTick::MinUsable => (
            price_to_tick(start_price, spacing, Rounding::Ceil)?,
            min_usable_tick(spacing)?,
        ),
    };

    if start_tick == end_tick && !config.allow_single_tick {
        return Err(PriceError::InvalidRange {
            start: start_tick,
            end: end_tick,
        });
    }

    debug!(
        start_price,
        start_tick,
        end_tick,
        tick_spacing = spacing,
        "computed tick range"
    );

    Ok(TickRange {
        start_tick,
        end_tick,
        tick_spacing: spacing,
    })
}

/// Owned memo of [`compute_ticks_with`] results.
///
/// Keyed on the exact bit patterns of the prices, so it only ever
/// returns what a fresh conversion would. Failed conversions are not
/// stored.
#[derive(Debug, Default, Clone)]
pub struct TickRangeCache {
    entries: FastMap<(u64, Option<u64>, RangeConfig), TickRange>,
}

impl TickRangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache sized for `capacity` distinct ranges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: fast_map_with_capacity(capacity),
        }
    }

    pub fn get_or_compute(
        &mut self,
        range: PriceRange,
        config: &RangeConfig,
    ) -> Result<TickRange, PriceError> {
        let end_bits = match range.end {
            UpperBound::Finite(price) => Some(price.to_bits()),
            UpperBound::Unbounded => None,
        };
        let key = (range.start.to_bits(), end_bits, *config);

        if let Some(ticks) = self.entries.get(&key) {
            return Ok(*ticks);
        }
        let ticks = compute_ticks_with(range, config)?;
        self.entries.insert(key, ticks);
        Ok(ticks)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Market caps in the quote currency (e.g. USD).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketCapRange {
    pub start: f64,
    pub end: UpperBound,
}

impl MarketCapRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: UpperBound::Finite(end),
        }
    }

    pub fn unbounded(start: f64) -> Self {
        Self {
            start,
            end: UpperBound::Unbounded,
        }
    }
}

/// Token and numeraire facts needed to turn a market cap into a pool price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketCapConfig {
    /// Supply the market cap is measured against, in whole tokens.
    pub total_supply: f64,
    /// Quote-currency value of one whole numeraire token.
    pub numeraire_price: f64,
    pub token_decimals: u8,
    pub numeraire_decimals: u8,
    /// Whether the launched token sorts first in the pool.
    pub token_is_token0: bool,
    pub range: RangeConfig,
}

impl MarketCapConfig {
    pub fn new(total_supply: f64, numeraire_price: f64, tick_spacing: i32) -> Self {
        Self {
            total_supply,
            numeraire_price,
            token_decimals: 18,
            numeraire_decimals: 18,
            token_is_token0: true,
            range: RangeConfig::new(tick_spacing),
        }
    }

    pub fn with_chain_params(mut self, params: &ChainParams) -> Self {
        self.numeraire_decimals = params.numeraire_decimals;
        self
    }

    pub fn with_decimals(mut self, token_decimals: u8, numeraire_decimals: u8) -> Self {
        self.token_decimals = token_decimals;
        self.numeraire_decimals = numeraire_decimals;
        self
    }

    pub fn with_token_is_token0(mut self, token_is_token0: bool) -> Self {
        self.token_is_token0 = token_is_token0;
        self
    }

    pub fn allow_single_tick(mut self, allow: bool) -> Self {
        self.range = self.range.allow_single_tick(allow);
        self
    }
}

fn positive(what: &'static str, value: f64) -> Result<f64, PriceError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PriceError::NonPositiveInput { what, value });
    }
    Ok(value)
}

/// Pool price (raw `token1 / token0`) at which the token is worth
/// `market_cap` in the quote currency.
pub fn market_cap_to_price(market_cap: f64, config: &MarketCapConfig) -> Result<f64, PriceError> {
    let market_cap = positive("market cap", market_cap)?;
    let supply = positive("total supply", config.total_supply)?;
    let numeraire_price = positive("numeraire price", config.numeraire_price)?;

    let token_price = market_cap / supply / numeraire_price;
    let decimals_shift = i32::from(config.numeraire_decimals) - i32::from(config.token_decimals);
    let raw = token_price * 10f64.powi(decimals_shift);

    let price = if config.token_is_token0 { raw } else { raw.recip() };
    if !price.is_finite() || price <= 0.0 {
        return Err(PriceError::PriceOutOfRange(price));
    }
    Ok(price)
}

/// Converts a market-cap range into a tick range.
///
/// When the token is `token1` the pool quotes its reciprocal, so a
/// rising market cap moves the tick down and an unbounded cap ends at
/// the smallest usable tick.
pub fn compute_ticks_from_market_cap(
    range: MarketCapRange,
    config: &MarketCapConfig,
) -> Result<TickRange, PriceError> {
    let start_price = market_cap_to_price(range.start, config)?;
    let end = match range.end {
        UpperBound::Finite(market_cap) => EndTick::Price(market_cap_to_price(market_cap, config)?),
        UpperBound::Unbounded if config.token_is_token0 => EndTick::MaxUsable,
        UpperBound::Unbounded => EndTick::MinUsable,
    };
    ticks_from_bounds(start_price, end, &config.range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::price::{ceil_tick_unaligned, price_to_tick_unaligned};
    use proptest::prelude::*;

    #[test]
    fn ascending_range_never_shrinks() {
        let ticks = compute_ticks(PriceRange::new(1.0, 100.0), 60).unwrap();
        assert!(ticks.start_tick <= price_to_tick_unaligned(1.0).unwrap());
        assert!(ticks.end_tick >= price_to_tick_unaligned(100.0).unwrap());
        assert_eq!(ticks, TickRange::new(0, 46080, 60).unwrap());
        assert!(!ticks.is_descending());
    }

    #[test]
    fn descending_range_keeps_its_direction() {
        let ticks = compute_ticks(PriceRange::new(100.0, 1.0), 60).unwrap();
        assert_eq!(ticks.start_tick, 46080);
        assert_eq!(ticks.end_tick, 0);
        assert!(ticks.is_descending());
        assert_eq!(ticks.lower(), 0);
        assert_eq!(ticks.upper(), 46080);
        assert_eq!(ticks.delta(), -46080);
        assert_eq!(ticks.width(), 46080);
    }

    #[test]
    fn zero_width_range_needs_opt_in() {
        let range = PriceRange::new(1.0, 1.0);
        assert!(matches!(
            compute_ticks(range, 60),
            Err(PriceError::InvalidRange { start: 0, end: 0 })
        ));

        let single = compute_ticks_with(range, &RangeConfig::new(60).allow_single_tick(true)).unwrap();
        assert_eq!(single.start_tick, single.end_tick);
    }

    #[test]
    fn unbounded_end_uses_max_usable_tick() {
        let ticks = compute_ticks(PriceRange::unbounded(1.0), 200).unwrap();
        assert_eq!(ticks.start_tick, 0);
        assert_eq!(ticks.end_tick, 887200);
    }

    #[test]
    fn invalid_inputs_fail_instead_of_clamping() {
        assert!(matches!(
            compute_ticks(PriceRange::new(1.0, 100.0), 0),
            Err(PriceError::InvalidTickSpacing(0))
        ));
        assert!(matches!(
            compute_ticks(PriceRange::new(-1.0, 100.0), 60),
            Err(PriceError::NonPositiveInput { .. })
        ));
        assert!(matches!(
            compute_ticks(PriceRange::new(1.0, 1e300), 60),
            Err(PriceError::PriceOutOfRange(_))
        ));
    }

    #[test]
    fn tick_range_new_validates_alignment_and_bounds() {
        assert!(TickRange::new(-120, 600, 60).is_ok());
        assert!(matches!(
            TickRange::new(-120, 610, 60),
            Err(PriceError::InvalidRange { .. })
        ));
        assert!(matches!(
            TickRange::new(0, 887280, 60),
            Err(PriceError::TickOutOfRange(887280))
        ));
    }

    #[test]
    fn cache_returns_same_ranges_and_skips_failures() {
        let mut cache = TickRangeCache::new();
        let config = RangeConfig::new(60);
        let range = PriceRange::new(0.5, 2.0);

        let first = cache.get_or_compute(range, &config).unwrap();
        let second = cache.get_or_compute(range, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, compute_ticks(range, 60).unwrap());
        assert_eq!(cache.len(), 1);

        assert!(cache.get_or_compute(PriceRange::new(1.0, 1.0), &config).is_err());
        assert_eq!(cache.len(), 1);

        cache.get_or_compute(range, &config.allow_single_tick(true)).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn presized_cache_memoizes_like_a_default_one() {
        let mut cache = TickRangeCache::with_capacity(8);
        assert!(cache.is_empty());

        let config = RangeConfig::new(200);
        let range = PriceRange::unbounded(0.01);
        let ticks = cache.get_or_compute(range, &config).unwrap();
        assert_eq!(ticks, compute_ticks(range, 200).unwrap());
        assert_eq!(cache.get_or_compute(range, &config).unwrap(), ticks);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn market_cap_converts_through_supply_and_numeraire() {
        // 1B supply, $1M cap => $0.001 per token => 1/3_000_000 ETH at $3000
        let config = MarketCapConfig::new(1e9, 3000.0, 60);
        let price = market_cap_to_price(1e6, &config).unwrap();
        assert!((price - 1.0 / 3_000_000.0).abs() < 1e-18);

        // a 6-decimal numeraire scales raw units down by 1e12
        let usdc = MarketCapConfig::new(1e9, 1.0, 60).with_decimals(18, 6);
        let price = market_cap_to_price(1e6, &usdc).unwrap();
        assert!((price - 1e-15).abs() < 1e-27);

        assert!(matches!(
            market_cap_to_price(1e6, &MarketCapConfig::new(0.0, 3000.0, 60)),
            Err(PriceError::NonPositiveInput {
                what: "total supply",
                ..
            })
        ));
    }

    #[test]
    fn market_cap_range_flips_for_token1() {
        let token0 = MarketCapConfig::new(1e9, 3000.0, 60);
        let token1 = token0.with_token_is_token0(false);
        let range = MarketCapRange::new(1e6, 1e8);

        let as_token0 = compute_ticks_from_market_cap(range, &token0).unwrap();
        let as_token1 = compute_ticks_from_market_cap(range, &token1).unwrap();

        assert!(!as_token0.is_descending());
        assert!(as_token1.is_descending());
        assert!((as_token0.start_tick + as_token1.start_tick).abs() <= 60);
        assert!((as_token0.end_tick + as_token1.end_tick).abs() <= 60);
    }

    #[test]
    fn unbounded_market_cap_follows_token_order() {
        let token0 = MarketCapConfig::new(1e9, 3000.0, 200);
        let range = MarketCapRange::unbounded(1e6);

        let up = compute_ticks_from_market_cap(range, &token0).unwrap();
        assert_eq!(up.end_tick, 887200);

        let down =
            compute_ticks_from_market_cap(range, &token0.with_token_is_token0(false)).unwrap();
        assert_eq!(down.end_tick, -887200);
        assert!(down.start_tick > down.end_tick);
    }

    #[test]
    fn chain_params_supply_numeraire_decimals() {
        let params = ChainParams {
            numeraire_decimals: 6,
            ..ChainParams::default()
        };
        let config = MarketCapConfig::new(1e9, 1.0, 60).with_chain_params(&params);
        assert_eq!(config.numeraire_decimals, 6);
    }

    proptest! {
        #[test]
        fn converted_range_covers_requested_prices(
            a in 1e-6f64..1e6,
            b in 1e-6f64..1e6,
            spacing in prop::sample::select(vec![1i32, 10, 60, 200]),
        ) {
            let config = RangeConfig::new(spacing).allow_single_tick(true);
            let ticks = compute_ticks_with(PriceRange::new(a, b), &config).unwrap();

            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ticks.lower() <= price_to_tick_unaligned(low).unwrap());
            prop_assert!(ticks.upper() >= ceil_tick_unaligned(high).unwrap());
            prop_assert_eq!(ticks.start_tick % spacing, 0);
            prop_assert_eq!(ticks.end_tick % spacing, 0);
            prop_assert_eq!(ticks.is_descending(), a > b && ticks.start_tick != ticks.end_tick);
        }
    }
}
