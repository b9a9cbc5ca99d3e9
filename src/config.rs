//! Chain parameters consumed by the range converter and the miner.
//!
//! Nothing here is computed: these are the conventions of the target
//! pool manager and deployer, kept in one place so callers can load them
//! from their own configuration (see the `serde` feature).

use crate::error::PriceError;
use crate::math::tick_math::validate_tick_spacing;

/// Leading byte of the CREATE2 preimage.
pub const CREATE2_PREFIX: u8 = 0xff;

/// `0xff ‖ deployer(20) ‖ salt(32) ‖ init_code_hash(32)`
pub const CREATE2_PREIMAGE_LEN: usize = 1 + 20 + 32 + 32;

/// Decimals of the usual numeraire (WETH / native ETH).
pub const DEFAULT_NUMERAIRE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeTier {
    /// Fee in hundredths of a bip (`3000` = 0.3%).
    pub fee: u32,
    pub tick_spacing: i32,
}

impl FeeTier {
    pub const fn new(fee: u32, tick_spacing: i32) -> Self {
        Self { fee, tick_spacing }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainParams {
    pub fee_tiers: Vec<FeeTier>,
    pub numeraire_decimals: u8,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            fee_tiers: vec![
                FeeTier::new(100, 1),
                FeeTier::new(500, 10),
                FeeTier::new(3000, 60),
                FeeTier::new(10000, 200),
            ],
            numeraire_decimals: DEFAULT_NUMERAIRE_DECIMALS,
        }
    }
}

impl ChainParams {
    /// Tick spacing registered for `fee`.
    pub fn tick_spacing_for_fee(&self, fee: u32) -> Result<i32, PriceError> {
        let tier = self
            .fee_tiers
            .iter()
            .find(|tier| tier.fee == fee)
            .ok_or(PriceError::UnknownFeeTier(fee))?;
        validate_tick_spacing(tier.tick_spacing)?;
        Ok(tier.tick_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_tiers_map_to_standard_spacings() {
        let params = ChainParams::default();
        assert_eq!(params.tick_spacing_for_fee(100).unwrap(), 1);
        assert_eq!(params.tick_spacing_for_fee(500).unwrap(), 10);
        assert_eq!(params.tick_spacing_for_fee(3000).unwrap(), 60);
        assert_eq!(params.tick_spacing_for_fee(10000).unwrap(), 200);
    }

    #[test]
    fn unknown_or_invalid_tier_is_rejected() {
        let mut params = ChainParams::default();
        assert!(matches!(
            params.tick_spacing_for_fee(1234),
            Err(PriceError::UnknownFeeTier(1234))
        ));

        params.fee_tiers.push(FeeTier::new(42, -5));
        assert!(matches!(
            params.tick_spacing_for_fee(42),
            Err(PriceError::InvalidTickSpacing(-5))
        ));
    }

    #[test]
    fn preimage_layout_is_85_bytes() {
        assert_eq!(CREATE2_PREIMAGE_LEN, 85);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_json_with_defaults() {
        let params: ChainParams =
            serde_json::from_str(r#"{"fee_tiers":[{"fee":2500,"tick_spacing":50}]}"#).unwrap();
        assert_eq!(params.tick_spacing_for_fee(2500).unwrap(), 50);
        assert_eq!(params.numeraire_decimals, DEFAULT_NUMERAIRE_DECIMALS);
    }
}
