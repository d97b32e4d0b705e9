//! One- and two-sample Student's t-tests.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptive::MeanVariance;
use crate::error::{StatResult, StatisticsFailure};
use crate::pvalue::{Tail, t_p_value};

/// Outcome of a t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TTest {
    /// The t statistic.
    pub t: f64,
    /// Degrees of freedom (fractional for Welch's test).
    pub dof: f64,
    /// Upper-tail p of `|t|`.
    pub p_one_tail: f64,
    /// Two-tailed p.
    pub p_two_tail: f64,
}

impl TTest {
    fn from_t(t: f64, dof: f64) -> Self {
        Self {
            t,
            dof,
            p_one_tail: t_p_value(t, dof, Tail::One),
            p_two_tail: t_p_value(t, dof, Tail::Two),
        }
    }
}

/// Test whether the mean of `values` differs from `mu`.
///
/// `t = (mean - mu) / (s / sqrt(n))` with `n - 1` degrees of freedom.
///
/// # Errors
///
/// - `InvalidInput` for fewer than two values
/// - `ConvergenceFailure` when the sample standard deviation is zero
#[allow(clippy::cast_precision_loss)]
pub fn one_sample_t_test(values: &[f32], mu: f64) -> StatResult<TTest> {
    if values.len() < 2 {
        return Err(StatisticsFailure::invalid_input(format!(
            "one-sample t-test needs at least 2 values, got {}",
            values.len()
        )));
    }
    let mv = MeanVariance::of(values);
    let n = mv.count as f64;
    let denom = mv.sample_std_dev() / n.sqrt();
    if denom == 0.0 {
        return Err(StatisticsFailure::convergence(
            "one-sample t-test data has zero variance",
        ));
    }
    Ok(TTest::from_t((mv.mean - mu) / denom, n - 1.0))
}

/// Welch–Satterthwaite degrees of freedom, untruncated.
///
/// Returns 0 when both variance terms vanish.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn welch_dof(var_a: f64, n_a: usize, var_b: f64, n_b: usize) -> f64 {
    if n_a < 2 || n_b < 2 {
        return 0.0;
    }
    let (na, nb) = (n_a as f64, n_b as f64);
    let qa = var_a / na;
    let qb = var_b / nb;
    let denominator = (qa * qa) / (na - 1.0) + (qb * qb) / (nb - 1.0);
    if denominator == 0.0 {
        0.0
    } else {
        (qa + qb) * (qa + qb) / denominator
    }
}

/// Pooled variance estimate of two samples.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pooled_variance(var_a: f64, n_a: usize, var_b: f64, n_b: usize) -> f64 {
    let dof = (n_a + n_b).saturating_sub(2);
    if dof == 0 {
        return 0.0;
    }
    ((n_a as f64 - 1.0) * var_a + (n_b as f64 - 1.0) * var_b) / dof as f64
}

/// Denominator of the two-sample t statistic from sample variances.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn two_sample_denominator(
    var_a: f64,
    n_a: usize,
    var_b: f64,
    n_b: usize,
    pooled: bool,
) -> f64 {
    let (na, nb) = (n_a as f64, n_b as f64);
    if pooled {
        (pooled_variance(var_a, n_a, var_b, n_b) * (1.0 / na + 1.0 / nb)).sqrt()
    } else {
        (var_a / na + var_b / nb).sqrt()
    }
}

/// Two-sample t-test of `mean(a) - mean(b)`.
///
/// Pooled tests use `n_a + n_b - 2` degrees of freedom; unpooled tests use
/// the untruncated Welch–Satterthwaite value.
///
/// # Errors
///
/// - `InvalidInput` when either sample has fewer than two values
/// - `ConvergenceFailure` when the denominator is zero
#[allow(clippy::cast_precision_loss)]
pub fn two_sample_t_test(a: &[f32], b: &[f32], pooled: bool) -> StatResult<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(StatisticsFailure::invalid_input(format!(
            "two-sample t-test needs at least 2 values per group, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    let ma = MeanVariance::of(a);
    let mb = MeanVariance::of(b);
    let (va, vb) = (ma.sample_variance(), mb.sample_variance());
    let denom = two_sample_denominator(va, ma.count, vb, mb.count, pooled);
    if denom == 0.0 {
        return Err(StatisticsFailure::convergence(
            "two-sample t-test data has zero variance",
        ));
    }
    let dof = if pooled {
        (ma.count + mb.count - 2) as f64
    } else {
        welch_dof(va, ma.count, vb, mb.count)
    };
    Ok(TTest::from_t((ma.mean - mb.mean) / denom, dof))
}
