use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("Price error - tick {0} out of range")]
    TickOutOfRange(i32),
    #[error("Price error - sqrt price {0} out of range")]
    SqrtPriceOutOfRange(U256),
    #[error("Price error - price {0} out of representable range")]
    PriceOutOfRange(f64),

    #[error("Price error - {what} must be positive and finite, got {value}")]
    NonPositiveInput { what: &'static str, value: f64 },
    #[error("Price error - no tick spacing registered for fee {0}")]
    UnknownFeeTier(u32),
    #[error("Price error - tick spacing {0} is invalid")]
    InvalidTickSpacing(i32),
    #[error("Price error - invalid range: start tick {start}, end tick {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error(transparent)]
    MathError(#[from] MathError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Schedule error - degenerate schedule: {0}")]
    DegenerateSchedule(&'static str),
    #[error("Schedule error - terminal tick {0} out of range")]
    TerminalTickOutOfRange(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("Mining error - invalid {which} {value:?}: {reason}")]
    InvalidPrefixOrSuffix {
        which: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("Mining error - no salt found after {iterations} iterations")]
    NoSaltFound {
        last_tried_nonce: Option<U256>,
        iterations: u64,
    },
}

impl MiningError {
    /// Nonce to resume from after an exhausted search, if the nonce space
    /// has not run out.
    pub fn continuation(&self) -> Option<U256> {
        match self {
            Self::NoSaltFound {
                last_tried_nonce: Some(last),
                ..
            } => last.checked_add(U256::ONE),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] MathError),

    #[error(transparent)]
    PriceError(#[from] PriceError),

    #[error(transparent)]
    ScheduleError(#[from] ScheduleError),

    #[error(transparent)]
    MiningError(#[from] MiningError),
}
