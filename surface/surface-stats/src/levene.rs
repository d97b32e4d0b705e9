//! Levene's test for equality of variance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptive::MeanVariance;
use crate::error::{StatResult, StatisticsFailure};
use crate::group::{DataGroup, total_len};
use crate::pvalue::f_p_value;

/// Outcome of Levene's test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Levene {
    /// Levene's W statistic, F distributed under the null.
    pub f: f64,
    /// `g - 1`.
    pub dof_numerator: f64,
    /// `N - g`.
    pub dof_denominator: f64,
    /// Upper-tail p of `f`.
    pub p: f64,
}

/// Test whether `g >= 2` groups share a common variance.
///
/// Works on absolute deviations from each group's mean. When every group
/// has zero spread around its mean deviation, the statistic is 0 if the
/// group means of the deviations agree and infinite otherwise.
///
/// # Errors
///
/// `InvalidInput` for fewer than two groups, an empty group, or when no
/// group has at least two values.
#[allow(clippy::cast_precision_loss)]
pub fn levene(groups: &[DataGroup<'_>]) -> StatResult<Levene> {
    let g = groups.len();
    if g < 2 {
        return Err(StatisticsFailure::invalid_input(format!(
            "Levene's test needs at least 2 groups, got {g}"
        )));
    }
    if groups.iter().any(|grp| grp.is_empty()) {
        return Err(StatisticsFailure::invalid_input(
            "Levene's test groups must not be empty",
        ));
    }
    let total = total_len(groups);
    if total <= g {
        return Err(StatisticsFailure::invalid_input(
            "Levene's test needs at least one group with 2 or more values",
        ));
    }

    // Per group: count, mean absolute deviation, and spread of those deviations.
    let mut spreads = Vec::with_capacity(g);
    for grp in groups {
        let mean = MeanVariance::of(grp).mean;
        let deviations: Vec<f64> = grp.iter().map(|&v| (f64::from(v) - mean).abs()).collect();
        let n = deviations.len() as f64;
        let dev_mean = deviations.iter().sum::<f64>() / n;
        let dev_ss = deviations.iter().map(|d| (d - dev_mean).powi(2)).sum::<f64>();
        spreads.push((n, dev_mean, dev_ss));
    }

    let n_total = total as f64;
    let grand_mean = spreads.iter().map(|&(n, m, _)| n * m).sum::<f64>() / n_total;
    let between: f64 = spreads
        .iter()
        .map(|&(n, m, _)| n * (m - grand_mean).powi(2))
        .sum();
    let within: f64 = spreads.iter().map(|&(_, _, ss)| ss).sum();

    let dof_numerator = (g - 1) as f64;
    let dof_denominator = (total - g) as f64;
    let f = if within > 0.0 {
        (dof_denominator / dof_numerator) * between / within
    } else if between > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    Ok(Levene {
        f,
        dof_numerator,
        dof_denominator,
        p: f_p_value(f, dof_numerator, dof_denominator),
    })
}
