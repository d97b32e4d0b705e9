//! Ordinary least squares with an intercept.

use nalgebra::{DMatrix, DVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{StatResult, StatisticsFailure};
use crate::group::DataGroup;
use crate::pvalue::f_p_value;

/// Fit of one dependent variable against `k` independent variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Regression {
    /// Intercept followed by one slope per independent variable.
    pub coefficients: Vec<f64>,
    /// Total sum of squares around the mean.
    pub ssto: f64,
    /// Residual (error) sum of squares.
    pub sse: f64,
    /// Regression sum of squares, `ssto - sse`.
    pub ssr: f64,
    /// Regression mean square, `ssr / dof_regression`.
    pub msr: f64,
    /// Error mean square, `sse / dof_error`.
    pub mse: f64,
    /// `msr / mse`.
    pub f: f64,
    /// Upper-tail p of `f`.
    pub p: f64,
    /// `ssr / ssto`; 0 when the dependent variable is constant.
    pub r_squared: f64,
    /// `k`.
    pub dof_regression: f64,
    /// `n - k - 1`.
    pub dof_error: f64,
}

/// Regress `dependent` on the `independents`.
///
/// The design matrix gets a leading column of ones. The system is solved
/// through a singular value decomposition so that collinear predictors are
/// detected instead of producing garbage coefficients.
///
/// # Errors
///
/// - `InvalidInput` without predictors, for mismatched lengths, or when
///   `n <= k + 1`
/// - `ConvergenceFailure` when the design matrix is rank deficient or any
///   value is NaN or infinite
#[allow(clippy::cast_precision_loss)]
pub fn regression(dependent: &[f32], independents: &[DataGroup<'_>]) -> StatResult<Regression> {
    let n = dependent.len();
    let k = independents.len();
    if k == 0 {
        return Err(StatisticsFailure::invalid_input(
            "regression needs at least one independent variable",
        ));
    }
    if let Some(bad) = independents.iter().find(|g| g.len() != n) {
        return Err(StatisticsFailure::invalid_input(format!(
            "independent variable has {} values, dependent has {n}",
            bad.len()
        )));
    }
    if n <= k + 1 {
        return Err(StatisticsFailure::invalid_input(format!(
            "regression with {k} predictors needs more than {} observations, got {n}",
            k + 1
        )));
    }

    let finite = dependent.iter().all(|v| v.is_finite())
        && independents.iter().all(|g| g.iter().all(|v| v.is_finite()));
    if !finite {
        return Err(StatisticsFailure::convergence(
            "regression values must be finite",
        ));
    }

    let x = DMatrix::from_fn(n, k + 1, |row, col| {
        if col == 0 {
            1.0
        } else {
            f64::from(independents[col - 1][row])
        }
    });
    let y = DVector::from_iterator(n, dependent.iter().map(|&v| f64::from(v)));

    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.max();
    let tolerance = largest * 1e-10 * (n.max(k + 1) as f64);
    if svd.rank(tolerance) < k + 1 {
        return Err(StatisticsFailure::convergence(
            "independent variables are collinear",
        ));
    }
    let beta = svd
        .solve(&y, tolerance)
        .map_err(|e| StatisticsFailure::convergence(format!("least squares solve: {e}")))?;

    let residuals = &y - &x * &beta;
    let sse = residuals.norm_squared();
    let mean_y = y.mean();
    let ssto = y.iter().map(|v| (v - mean_y) * (v - mean_y)).sum::<f64>();
    let ssr = (ssto - sse).max(0.0);

    let dof_regression = k as f64;
    let dof_error = (n - k - 1) as f64;
    let msr = ssr / dof_regression;
    let mse = sse / dof_error;
    let f = if mse > 0.0 {
        msr / mse
    } else if msr > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    Ok(Regression {
        coefficients: beta.iter().copied().collect(),
        ssto,
        sse,
        ssr,
        msr,
        mse,
        f,
        p: f_p_value(f, dof_regression, dof_error),
        r_squared: if ssto > 0.0 { ssr / ssto } else { 0.0 },
        dof_regression,
        dof_error,
    })
}
