//! Parallel permutation iterations.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use surface_metric::Column;
use surface_types::Progress;
use tracing::debug;

use crate::error::MapResult;

/// Run `iterations` independent permutation steps in parallel and collect
/// one column per step, in iteration order.
///
/// Step `r` gets its own `ChaCha8Rng` seeded with `seed + r`, so the result
/// does not depend on scheduling. `progress` is checked before every step
/// and once after the last.
pub(crate) fn permutation_columns<F>(
    iterations: usize,
    seed: u64,
    progress: &Progress<'_>,
    step: F,
) -> MapResult<Vec<Column>>
where
    F: Fn(usize, &mut ChaCha8Rng) -> MapResult<Column> + Sync,
{
    let progress = progress.with_total(iterations);
    let finished = AtomicUsize::new(0);
    let columns = (0..iterations)
        .into_par_iter()
        .map(|r| {
            progress.check(finished.load(Ordering::Relaxed))?;
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(r as u64));
            let column = step(r, &mut rng)?;
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(iteration = r, done, "Permutation iteration done");
            Ok(column)
        })
        .collect::<MapResult<Vec<_>>>()?;
    progress.check(iterations)?;
    Ok(columns)
}
