use super::{MiningRequest, MiningResult, SearchPlan, Worker};
use crate::error::MiningError;
use alloy_primitives::U256;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Offsets handed to a worker at a time.
const PARALLEL_CHUNK: u64 = 4096;

/// Iterations between looks at the shared best offset.
const CANCEL_CHECK_INTERVAL: u64 = 256;

const NOT_FOUND: u64 = u64::MAX;

/// Same search as [`super::mine`] spread over `workers` rayon tasks
/// (`0` uses the pool size).
///
/// Chunks of the nonce span are striped across workers. A hit lowers a
/// shared best offset and any worker past it stops, so the reported nonce
/// and iteration count are those of the sequential search.
pub fn mine_parallel(
    request: &MiningRequest,
    workers: usize,
) -> Result<MiningResult, MiningError> {
    let plan = SearchPlan::compile(request)?;
    let requested = match workers {
        0 => rayon::current_num_threads().max(1),
        n => n,
    } as u64;
    // a lane without a chunk of its own has nothing to search
    let workers = requested.min(plan.span.div_ceil(PARALLEL_CHUNK).max(1));
    debug!(
        deployer = %plan.deployer,
        start_nonce = %plan.start,
        max_iterations = plan.span,
        workers,
        "mining salt in parallel"
    );

    let best = AtomicU64::new(NOT_FOUND);
    (0..workers)
        .into_par_iter()
        .for_each(|lane| search_lane(&plan, lane, workers, &best));

    let offset = best.load(Ordering::Acquire);
    if offset == NOT_FOUND {
        return Err(plan.exhausted());
    }

    let nonce = plan.start + U256::from(offset);
    Worker::new(&plan)
        .try_nonce(&nonce)
        .map(|hit| plan.accept(offset, hit))
        .ok_or_else(|| plan.exhausted())
}

fn search_lane(plan: &SearchPlan, lane: u64, stride: u64, best: &AtomicU64) {
    let mut worker = Worker::new(plan);
    let mut chunk = lane;

    loop {
        let Some(from) = chunk.checked_mul(PARALLEL_CHUNK) else {
            return;
        };
        if from >= plan.span || from >= best.load(Ordering::Relaxed) {
            return;
        }
        let to = from.saturating_add(PARALLEL_CHUNK).min(plan.span);

        let mut nonce = plan.start + U256::from(from);
        for offset in from..to {
            if (offset - from) % CANCEL_CHECK_INTERVAL == 0
                && offset >= best.load(Ordering::Relaxed)
            {
                return;
            }
            if worker.try_nonce(&nonce).is_some() {
                best.fetch_min(offset, Ordering::AcqRel);
                return;
            }
            nonce = nonce.wrapping_add(U256::ONE);
        }

        let Some(next) = chunk.checked_add(stride) else {
            return;
        };
        chunk = next;
    }
}
