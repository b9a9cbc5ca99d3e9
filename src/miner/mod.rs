//! Bounded CREATE2 salt search.
//!
//! A search walks nonces `start_nonce, start_nonce + 1, ...` for at most
//! `max_iterations` candidates and returns the first one whose derived
//! address satisfies the pattern. The outcome, including the iteration
//! count, depends only on the request, so a caller can re-derive it
//! before broadcasting. Exhaustion is reported, never retried: resume
//! from [`MiningError::continuation`].

mod derive;
mod pattern;

pub use derive::{derive_address, salt_for_nonce};
pub use pattern::{ADDRESS_NIBBLES, AddressPattern, FlagMask, HOOK_FLAG_MASK};

use crate::error::MiningError;
use alloy_primitives::{Address, B256, U256};
use derive::{Create2Preimage, SaltDeriver};
use tracing::debug;

pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;

/// A second contract deployed with the same salt whose address must also
/// satisfy a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedTarget {
    pub deployer: Address,
    pub init_code_hash: B256,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub flags: Option<FlagMask>,
}

impl PairedTarget {
    pub fn new(deployer: Address, init_code_hash: B256) -> Self {
        Self {
            deployer,
            init_code_hash,
            prefix: None,
            suffix: None,
            flags: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_flags(mut self, flags: FlagMask) -> Self {
        self.flags = Some(flags);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningRequest {
    pub deployer: Address,
    pub init_code_hash: B256,
    /// Selects the digest-bound salt scheme; see [`salt_for_nonce`].
    pub payload_digest: Option<B256>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub flags: Option<FlagMask>,
    pub start_nonce: U256,
    pub max_iterations: u64,
    pub paired: Option<PairedTarget>,
}

impl MiningRequest {
    pub fn new(deployer: Address, init_code_hash: B256) -> Self {
        Self {
            deployer,
            init_code_hash,
            payload_digest: None,
            prefix: None,
            suffix: None,
            flags: None,
            start_nonce: U256::ZERO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            paired: None,
        }
    }

    pub fn with_payload_digest(mut self, digest: B256) -> Self {
        self.payload_digest = Some(digest);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_flags(mut self, flags: FlagMask) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_start_nonce(mut self, start_nonce: U256) -> Self {
        self.start_nonce = start_nonce;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_paired(mut self, paired: PairedTarget) -> Self {
        self.paired = Some(paired);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningResult {
    pub nonce: U256,
    /// `nonce` as handed to the deployer: a 32-byte big-endian word.
    pub salt: B256,
    pub address: Address,
    pub paired_address: Option<Address>,
    /// Candidates examined, the winning one included.
    pub iterations: u64,
    /// EIP-55 form of `address`.
    pub checksum: String,
}

struct Hit {
    salt: B256,
    address: Address,
    paired_address: Option<Address>,
}

struct PairedPlan {
    deployer: Address,
    init_code_hash: B256,
    pattern: AddressPattern,
}

/// Validated request: compiled patterns and the clipped nonce span.
struct SearchPlan {
    deployer: Address,
    init_code_hash: B256,
    payload_digest: Option<B256>,
    pattern: AddressPattern,
    paired: Option<PairedPlan>,
    start: U256,
    span: u64,
}

fn compile_pattern(
    prefix: Option<&str>,
    suffix: Option<&str>,
    flags: Option<FlagMask>,
) -> Result<AddressPattern, MiningError> {
    let pattern = AddressPattern::new(prefix, suffix)?;
    match flags {
        Some(flags) => pattern.with_flags(flags),
        None => Ok(pattern),
    }
}

impl SearchPlan {
    fn compile(request: &MiningRequest) -> Result<Self, MiningError> {
        let pattern = compile_pattern(
            request.prefix.as_deref(),
            request.suffix.as_deref(),
            request.flags,
        )?;
        let paired = request
            .paired
            .as_ref()
            .map(|target| {
                Ok::<_, MiningError>(PairedPlan {
                    deployer: target.deployer,
                    init_code_hash: target.init_code_hash,
                    pattern: compile_pattern(
                        target.prefix.as_deref(),
                        target.suffix.as_deref(),
                        target.flags,
                    )?,
                })
            })
            .transpose()?;

        // the nonce space ends at U256::MAX
        let headroom = U256::MAX - request.start_nonce;
        let span = if headroom >= U256::from(request.max_iterations) {
            request.max_iterations
        } else {
            headroom.to::<u64>() + 1
        };

        Ok(Self {
            deployer: request.deployer,
            init_code_hash: request.init_code_hash,
            payload_digest: request.payload_digest,
            pattern,
            paired,
            start: request.start_nonce,
            span,
        })
    }

    fn accept(&self, offset: u64, hit: Hit) -> MiningResult {
        let nonce = self.start + U256::from(offset);
        let checksum = hit.address.to_checksum(None);
        debug!(
            %nonce,
            address = %checksum,
            paired_address = ?hit.paired_address,
            iterations = offset + 1,
            "salt found"
        );
        MiningResult {
            nonce,
            salt: hit.salt,
            address: hit.address,
            paired_address: hit.paired_address,
            iterations: offset + 1,
            checksum,
        }
    }

    fn exhausted(&self) -> MiningError {
        let last_tried_nonce = self
            .span
            .checked_sub(1)
            .map(|last| self.start + U256::from(last));
        debug!(
            start_nonce = %self.start,
            iterations = self.span,
            "salt search exhausted"
        );
        MiningError::NoSaltFound {
            last_tried_nonce,
            iterations: self.span,
        }
    }
}

/// Per-thread search state. Each worker owns its buffers outright.
struct Worker<'a> {
    plan: &'a SearchPlan,
    salts: SaltDeriver,
    primary: Create2Preimage,
    paired: Option<Create2Preimage>,
}

impl<'a> Worker<'a> {
    fn new(plan: &'a SearchPlan) -> Self {
        Self {
            plan,
            salts: SaltDeriver::new(plan.payload_digest),
            primary: Create2Preimage::new(plan.deployer, plan.init_code_hash),
            paired: plan
                .paired
                .as_ref()
                .map(|paired| Create2Preimage::new(paired.deployer, paired.init_code_hash)),
        }
    }

    #[inline(always)]
    fn try_nonce(&mut self, nonce: &U256) -> Option<Hit> {
        let salt = self.salts.salt(nonce);
        let address = self.primary.derive(&salt);
        if !self.plan.pattern.matches(&address) {
            return None;
        }

        // the second hash is only paid for candidates that already passed
        let paired_address = match (&self.plan.paired, &mut self.paired) {
            (Some(plan), Some(preimage)) => {
                let paired = preimage.derive(&salt);
                if !plan.pattern.matches(&paired) {
                    return None;
                }
                Some(paired)
            }
            _ => None,
        };

        Some(Hit {
            salt,
            address,
            paired_address,
        })
    }
}

/// Runs the search on the calling thread.
pub fn mine(request: &MiningRequest) -> Result<MiningResult, MiningError> {
    let plan = SearchPlan::compile(request)?;
    debug!(
        deployer = %plan.deployer,
        start_nonce = %plan.start,
        max_iterations = plan.span,
        paired = plan.paired.is_some(),
        "mining salt"
    );

    let mut worker = Worker::new(&plan);
    let mut nonce = plan.start;
    for offset in 0..plan.span {
        if let Some(hit) = worker.try_nonce(&nonce) {
            return Ok(plan.accept(offset, hit));
        }
        nonce = nonce.wrapping_add(U256::ONE);
    }
    Err(plan.exhausted())
}

#[cfg(feature = "parallel")]
mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::mine_parallel;
