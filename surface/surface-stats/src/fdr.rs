//! Benjamini–Hochberg false discovery rate thresholding.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{StatResult, StatisticsFailure};

/// Constant `c` in the Benjamini–Hochberg step-up rule `p(i) <= i q / (m c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FdrVariant {
    /// `c = 1`, valid under independence or positive dependence.
    #[default]
    C1,
    /// `c = Σ 1/i`, valid under arbitrary dependence.
    CSum,
}

impl FdrVariant {
    /// Value of `c` for `m` tests.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn constant(self, m: usize) -> f64 {
        match self {
            Self::C1 => 1.0,
            Self::CSum => (1..=m).map(|i| 1.0 / i as f64).sum(),
        }
    }
}

/// Largest p-value accepted at rate `q`.
///
/// Entries that are not finite probabilities (for example the `-1` marker of
/// a masked node) do not count as tests. Returns `None` when nothing is
/// accepted.
///
/// # Errors
///
/// `InvalidInput` unless `0 < q < 1`.
#[allow(clippy::cast_precision_loss)]
pub fn fdr_cutoff(p_values: &[f32], q: f64, variant: FdrVariant) -> StatResult<Option<f64>> {
    if !(q > 0.0 && q < 1.0) {
        return Err(StatisticsFailure::invalid_input(format!(
            "false discovery rate q must lie in (0, 1), got {q}"
        )));
    }

    let mut sorted: Vec<f64> = p_values
        .iter()
        .map(|&p| f64::from(p))
        .filter(|p| (0.0..=1.0).contains(p))
        .collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_unstable_by(f64::total_cmp);

    let m = sorted.len() as f64;
    let c = variant.constant(sorted.len());
    Ok(sorted
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &p)| p <= (i + 1) as f64 / m * q / c)
        .map(|(_, &p)| p))
}

/// Replace every p-value above the cutoff with `-1`.
///
/// # Errors
///
/// `InvalidInput` unless `0 < q < 1`.
pub fn apply_fdr(p_values: &[f32], q: f64, variant: FdrVariant) -> StatResult<Vec<f32>> {
    let cutoff = fdr_cutoff(p_values, q, variant)?;
    Ok(p_values
        .iter()
        .map(|&p| match cutoff {
            Some(c) if p >= 0.0 && f64::from(p) <= c => p,
            _ => -1.0,
        })
        .collect())
}
