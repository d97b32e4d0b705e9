//! Random permutations used to build empirical null distributions.

use rand::Rng;
use rand::seq::SliceRandom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::group::DataGroup;

/// How samples are permuted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Permutation {
    /// Multiply each element independently by +1 or -1 with equal probability.
    SignFlip,
    /// Uniformly reorder the elements.
    Shuffle,
}

/// Permute a slice in place.
pub fn permute<R: Rng + ?Sized>(values: &mut [f32], kind: Permutation, rng: &mut R) {
    match kind {
        Permutation::SignFlip => {
            for v in values.iter_mut() {
                if rng.gen_bool(0.5) {
                    *v = -*v;
                }
            }
        }
        Permutation::Shuffle => values.shuffle(rng),
    }
}

/// Permute the union of several groups and split it back into groups of the
/// original sizes.
///
/// Shuffling moves samples between groups; sign flipping never does.
#[must_use]
pub fn permute_groups<R: Rng + ?Sized>(
    groups: &[DataGroup<'_>],
    kind: Permutation,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let mut all: Vec<f32> = groups
        .iter()
        .flat_map(|g| g.as_slice().iter().copied())
        .collect();
    permute(&mut all, kind, rng);

    let mut out = Vec::with_capacity(groups.len());
    let mut rest = all.as_slice();
    for g in groups {
        let (head, tail) = rest.split_at(g.len());
        out.push(head.to_vec());
        rest = tail;
    }
    out
}

/// Draw a vector of `len` random signs.
#[must_use]
pub fn random_signs<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| if rng.gen_bool(0.5) { -1.0 } else { 1.0 })
        .collect()
}
