use crate::error::MiningError;

/// Hex digits in an address.
pub const ADDRESS_NIBBLES: usize = 40;

/// Low 14 bits of a hook address, which encode its permissions.
pub const HOOK_FLAG_MASK: u32 = (1 << 14) - 1;

/// Constraint on the low 32 bits of an address: `low & mask == bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagMask {
    pub mask: u32,
    pub bits: u32,
}

impl FlagMask {
    pub const fn new(mask: u32, bits: u32) -> Self {
        Self { mask, bits }
    }

    /// Exact hook permission set: no flag outside `flags` may be set.
    pub const fn hook_permissions(flags: u16) -> Self {
        Self {
            mask: HOOK_FLAG_MASK,
            bits: flags as u32 & HOOK_FLAG_MASK,
        }
    }
}

/// Compiled prefix / suffix / flag constraint on a 20-byte address.
///
/// Fragments are kept as nibble values and compared straight against the
/// address bytes, which is the same as comparing against its lowercase
/// hex without formatting anything per candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPattern {
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    flags: Option<FlagMask>,
}

impl AddressPattern {
    /// `None` leaves that end unconstrained. A prefix may carry a `0x`.
    pub fn new(prefix: Option<&str>, suffix: Option<&str>) -> Result<Self, MiningError> {
        let prefix = match prefix {
            Some(raw) => parse_fragment("prefix", raw)?,
            None => Vec::new(),
        };
        let suffix = match suffix {
            Some(raw) => parse_fragment("suffix", raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            prefix,
            suffix,
            flags: None,
        })
    }

    pub fn with_flags(mut self, flags: FlagMask) -> Result<Self, MiningError> {
        if flags.bits & !flags.mask != 0 {
            return Err(MiningError::InvalidPrefixOrSuffix {
                which: "flags",
                value: format!("{:#x}/{:#x}", flags.bits, flags.mask),
                reason: "flag bits outside the mask can never match",
            });
        }
        self.flags = Some(flags);
        Ok(self)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty() && self.flags.is_none()
    }

    #[inline(always)]
    pub fn matches(&self, address: &[u8; 20]) -> bool {
        if let Some(flags) = self.flags {
            let low = u32::from_be_bytes([address[16], address[17], address[18], address[19]]);
            if low & flags.mask != flags.bits {
                return false;
            }
        }

        let tail = ADDRESS_NIBBLES - self.suffix.len();
        self.prefix
            .iter()
            .enumerate()
            .all(|(i, &nibble)| nibble_at(address, i) == nibble)
            && self
                .suffix
                .iter()
                .enumerate()
                .all(|(i, &nibble)| nibble_at(address, tail + i) == nibble)
    }
}

#[inline(always)]
fn nibble_at(address: &[u8; 20], index: usize) -> u8 {
    let byte = address[index / 2];
    if index % 2 == 0 { byte >> 4 } else { byte & 0x0f }
}

fn parse_fragment(which: &'static str, raw: &str) -> Result<Vec<u8>, MiningError> {
    let invalid = |reason| MiningError::InvalidPrefixOrSuffix {
        which,
        value: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    let digits = if which == "prefix" {
        trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed)
    } else {
        trimmed
    };

    if digits.is_empty() {
        return Err(invalid("empty"));
    }
    let nibbles = digits
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| invalid("not a hex string"))?;
    if nibbles.len() > ADDRESS_NIBBLES {
        return Err(invalid("longer than an address"));
    }
    Ok(nibbles)
}
