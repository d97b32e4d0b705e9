//! Pearson correlation with its t-test.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{StatResult, StatisticsFailure};
use crate::pvalue::{Tail, t_p_value};

/// Pearson correlation between two equal-length samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Correlation {
    /// Correlation coefficient.
    pub r: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// `r * sqrt(n - 2) / sqrt(1 - r²)`.
    pub t: f64,
    /// `n - 2`.
    pub dof: f64,
    /// Two-sided p of `t`.
    pub p: f64,
}

/// Correlate `x` with `y`.
///
/// # Errors
///
/// - `InvalidInput` for mismatched lengths or fewer than three pairs
/// - `ConvergenceFailure` when either sample is constant
#[allow(clippy::cast_precision_loss)]
pub fn correlation(x: &[f32], y: &[f32]) -> StatResult<Correlation> {
    if x.len() != y.len() {
        return Err(StatisticsFailure::invalid_input(format!(
            "correlation needs equal-length samples, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 3 {
        return Err(StatisticsFailure::invalid_input(format!(
            "correlation needs at least 3 pairs, got {}",
            x.len()
        )));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let mean_y = y.iter().map(|&v| f64::from(v)).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let dx = f64::from(a) - mean_x;
        let dy = f64::from(b) - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(StatisticsFailure::convergence(
            "correlation undefined for a constant sample",
        ));
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let r_squared = r * r;
    let dof = n - 2.0;
    let residual = 1.0 - r_squared;
    let t = if residual <= 0.0 {
        f64::INFINITY.copysign(r)
    } else {
        r * dof.sqrt() / residual.sqrt()
    };

    Ok(Correlation {
        r,
        r_squared,
        t,
        dof,
        p: t_p_value(t, dof, Tail::Two),
    })
}
