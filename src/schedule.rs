//! Per-epoch tick decay for scheduled auctions.
//!
//! An auction that moves from `start_tick` toward `end_tick` in
//! `num_epochs` discrete steps advances by `gamma` ticks per epoch.
//! `gamma` is the truncated per-epoch distance rounded away from zero to
//! a multiple of the tick spacing, so every epoch boundary is a usable
//! tick. The terminal tick can therefore differ from the requested end;
//! the auction hook applies the same rule, so the difference is reported
//! (see [`EpochSchedule::overshoot`]) rather than corrected.

use crate::error::{PriceError, ScheduleError};
use crate::math::price::tick_to_price;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use crate::range::TickRange;
use std::time::Duration;
use tracing::debug;

/// Per-epoch tick step that carries `range` from start to end in
/// `num_epochs` steps.
///
/// `(end - start) / num_epochs` is truncated toward zero and then rounded
/// away from zero to the next multiple of `tick_spacing`. A non-zero
/// distance shorter than `num_epochs` still moves one spacing per epoch
/// and a flat range yields `0`. `tick_spacing` must be the range's own.
pub fn calculate_gamma(
    range: &TickRange,
    num_epochs: i64,
    tick_spacing: i32,
) -> Result<i32, ScheduleError> {
    if num_epochs <= 0 {
        return Err(ScheduleError::DegenerateSchedule(
            "number of epochs must be positive",
        ));
    }
    if tick_spacing <= 0 {
        return Err(ScheduleError::DegenerateSchedule(
            "tick spacing must be positive",
        ));
    }

    if tick_spacing != range.tick_spacing {
        return Err(ScheduleError::DegenerateSchedule(
            "tick spacing does not match the range",
        ));
    }

    let delta = i128::from(range.delta());
    let spacing = i128::from(tick_spacing);

    let per_epoch = delta / i128::from(num_epochs);
    let steps = per_epoch.unsigned_abs().div_ceil(spacing as u128).max(1) as i128;
    let gamma = delta.signum() * steps * spacing;

    let terminal = i128::from(range.start_tick) + gamma * i128::from(num_epochs);
    if terminal < i128::from(MIN_TICK) || terminal > i128::from(MAX_TICK) {
        let clamped = terminal.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        return Err(ScheduleError::TerminalTickOutOfRange(clamped));
    }

    // |gamma| <= |terminal - start| <= 2 * MAX_TICK
    let gamma = gamma as i32;

    debug!(
        start_tick = range.start_tick,
        end_tick = range.end_tick,
        num_epochs,
        tick_spacing,
        gamma,
        terminal_tick = terminal as i64,
        "derived epoch gamma"
    );

    Ok(gamma)
}

/// Price after `elapsed_epochs` steps of `gamma` from `start_tick`.
///
/// A pure preview: it re-derives the point from the closed form and is
/// not clamped to any schedule length.
pub fn estimate_price_at_epoch(
    start_tick: i32,
    gamma: i32,
    elapsed_epochs: u32,
) -> Result<f64, PriceError> {
    let tick = i64::from(start_tick) + i64::from(gamma) * i64::from(elapsed_epochs);
    let tick = i32::try_from(tick).map_err(|_| {
        PriceError::TickOutOfRange(if tick > 0 { i32::MAX } else { i32::MIN })
    })?;
    tick_to_price(tick)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpochSchedule {
    pub start_tick: i32,
    /// End tick the range asked for; see [`EpochSchedule::end_tick`].
    pub requested_end_tick: i32,
    pub tick_spacing: i32,
    pub num_epochs: u32,
    pub epoch_length: Duration,
    pub gamma: i32,
}

impl EpochSchedule {
    /// Splits `total_duration` into epochs of `epoch_length` and derives
    /// gamma for `range`.
    pub fn new(
        range: &TickRange,
        total_duration: Duration,
        epoch_length: Duration,
    ) -> Result<Self, ScheduleError> {
        if epoch_length.is_zero() {
            return Err(ScheduleError::DegenerateSchedule(
                "epoch length must be positive",
            ));
        }
        if total_duration.as_nanos() % epoch_length.as_nanos() != 0 {
            return Err(ScheduleError::DegenerateSchedule(
                "duration must be a whole number of epochs",
            ));
        }

        let num_epochs = u32::try_from(total_duration.as_nanos() / epoch_length.as_nanos())
            .map_err(|_| ScheduleError::DegenerateSchedule("too many epochs"))?;
        Self::with_epochs(range, num_epochs, epoch_length)
    }

    pub fn with_epochs(
        range: &TickRange,
        num_epochs: u32,
        epoch_length: Duration,
    ) -> Result<Self, ScheduleError> {
        if epoch_length.is_zero() {
            return Err(ScheduleError::DegenerateSchedule(
                "epoch length must be positive",
            ));
        }
        if epoch_length.checked_mul(num_epochs).is_none() {
            return Err(ScheduleError::DegenerateSchedule(
                "schedule duration overflows",
            ));
        }
        let gamma = calculate_gamma(range, i64::from(num_epochs), range.tick_spacing)?;

        Ok(Self {
            start_tick: range.start_tick,
            requested_end_tick: range.end_tick,
            tick_spacing: range.tick_spacing,
            num_epochs,
            epoch_length,
            gamma,
        })
    }

    /// Tick reached after the last epoch: `start_tick + gamma * num_epochs`.
    pub fn end_tick(&self) -> i32 {
        self.tick_at_epoch(self.num_epochs)
    }

    /// Signed distance from the requested end to [`end_tick`](Self::end_tick):
    /// positive when the schedule runs past the end in the direction of
    /// travel, negative when it stops short.
    pub fn overshoot(&self) -> i32 {
        let past = i64::from(self.end_tick()) - i64::from(self.requested_end_tick);
        let direction = (i64::from(self.requested_end_tick) - i64::from(self.start_tick)).signum();
        (past * direction) as i32
    }

    /// `None` when `epoch_length * num_epochs` does not fit a `Duration`.
    pub fn total_duration(&self) -> Option<Duration> {
        self.epoch_length.checked_mul(self.num_epochs)
    }

    /// Epoch index in effect after `elapsed`, saturating at `num_epochs`.
    pub fn epoch_at(&self, elapsed: Duration) -> u32 {
        let epoch = elapsed
            .as_nanos()
            .checked_div(self.epoch_length.as_nanos())
            .unwrap_or(u128::MAX);
        epoch.min(u128::from(self.num_epochs)) as u32
    }

    /// Tick after `epoch` steps, saturating at the end of the schedule.
    pub fn tick_at_epoch(&self, epoch: u32) -> i32 {
        let steps = i64::from(epoch.min(self.num_epochs));
        let tick = i64::from(self.start_tick) + i64::from(self.gamma) * steps;
        tick.clamp(i64::from(MIN_TICK), i64::from(MAX_TICK)) as i32
    }

    pub fn price_at_epoch(&self, epoch: u32) -> Result<f64, PriceError> {
        estimate_price_at_epoch(self.start_tick, self.gamma, epoch.min(self.num_epochs))
    }

    pub fn price_at(&self, elapsed: Duration) -> Result<f64, PriceError> {
        self.price_at_epoch(self.epoch_at(elapsed))
    }
}
