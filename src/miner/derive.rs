use crate::config::{CREATE2_PREFIX, CREATE2_PREIMAGE_LEN};
use alloy_primitives::{Address, B256, U256, keccak256};

const SALT_OFFSET: usize = 1 + 20;
const SALT_END: usize = SALT_OFFSET + 32;

/// Reusable CREATE2 preimage: `0xff ‖ deployer ‖ salt ‖ init_code_hash`.
///
/// Only the salt window is rewritten between candidates.
#[derive(Clone)]
pub(crate) struct Create2Preimage {
    bytes: [u8; CREATE2_PREIMAGE_LEN],
}

impl Create2Preimage {
    pub(crate) fn new(deployer: Address, init_code_hash: B256) -> Self {
        let mut bytes = [0u8; CREATE2_PREIMAGE_LEN];
        bytes[0] = CREATE2_PREFIX;
        bytes[1..SALT_OFFSET].copy_from_slice(deployer.as_slice());
        bytes[SALT_END..].copy_from_slice(init_code_hash.as_slice());
        Self { bytes }
    }

    #[inline(always)]
    pub(crate) fn derive(&mut self, salt: &B256) -> Address {
        self.bytes[SALT_OFFSET..SALT_END].copy_from_slice(salt.as_slice());
        Address::from_word(keccak256(&self.bytes))
    }
}

/// Turns a nonce into the salt handed to the deployer.
///
/// Without a payload digest the nonce itself is the salt. With one, the
/// salt is `keccak256(payload_digest ‖ nonce)`, as used by factories
/// that bind the salt to the creation calldata.
#[derive(Clone)]
pub(crate) enum SaltDeriver {
    Nonce,
    Digest { preimage: [u8; 64] },
}

impl SaltDeriver {
    pub(crate) fn new(payload_digest: Option<B256>) -> Self {
        match payload_digest {
            None => Self::Nonce,
            Some(digest) => {
                let mut preimage = [0u8; 64];
                preimage[..32].copy_from_slice(digest.as_slice());
                Self::Digest { preimage }
            }
        }
    }

    #[inline(always)]
    pub(crate) fn salt(&mut self, nonce: &U256) -> B256 {
        let word = nonce.to_be_bytes::<32>();
        match self {
            Self::Nonce => B256::from(word),
            Self::Digest { preimage } => {
                preimage[32..].copy_from_slice(&word);
                keccak256(&preimage[..])
            }
        }
    }
}

/// Salt the deployer receives for `nonce`.
pub fn salt_for_nonce(nonce: U256, payload_digest: Option<B256>) -> B256 {
    SaltDeriver::new(payload_digest).salt(&nonce)
}

/// Address the miner would derive for `nonce`, for independent re-checks
/// before broadcasting.
pub fn derive_address(
    deployer: Address,
    init_code_hash: B256,
    nonce: U256,
    payload_digest: Option<B256>,
) -> Address {
    let salt = salt_for_nonce(nonce, payload_digest);
    Create2Preimage::new(deployer, init_code_hash).derive(&salt)
}
