use crate::error::MathError;
use alloy_primitives::U256;

/// Returns the index (0–255) of the most significant set bit in a `U256`,
/// or `MathError::ZeroValue` if the input is zero.
///
/// This is the integer `log2` used to seed the tick search in
/// [`tick_at_sqrt_price`](super::tick_math::tick_at_sqrt_price).
#[inline(always)]
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(255 - x.leading_zeros() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_errors_on_zero() {
        let res = most_significant_bit(U256::ZERO);
        assert!(matches!(res, Err(MathError::ZeroValue)));
    }

    #[test]
    fn msb_of_one() {
        assert_eq!(most_significant_bit(U256::ONE).unwrap(), 0);
    }

    #[test]
    fn msb_of_multiple_bits() {
        // binary: 1001_0100 (MSB = bit 7)
        let x = U256::from(0b1001_0100u64);
        assert_eq!(most_significant_bit(x).unwrap(), 7);
    }

    #[test]
    fn msb_of_q96_scaled_values() {
        // sqrt prices are shifted left by 32 before the log2 step,
        // so a price of exactly 1.0 lands on bit 128
        let one_x96 = U256::ONE << 96;
        assert_eq!(most_significant_bit(one_x96 << 32).unwrap(), 128);
        assert_eq!(most_significant_bit(U256::MAX).unwrap(), 255);
    }
}
