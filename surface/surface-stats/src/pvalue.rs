//! P-values from test statistics.
//!
//! Reference distributions come from `statrs`. A statistic whose degrees of
//! freedom are below one, or that is NaN, maps to `p = 1`.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which tails of a symmetric distribution contribute to `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tail {
    /// Upper tail of `|t|`.
    One,
    /// Both tails; twice the one-tailed value.
    #[default]
    Two,
}

/// P-value of a Student's t statistic with `dof` degrees of freedom.
///
/// The statistic's sign is ignored: the one-tailed value is the upper-tail
/// probability of `|t|` and the two-tailed value doubles it.
#[must_use]
pub fn t_p_value(t: f64, dof: f64, tail: Tail) -> f64 {
    if t.is_nan() || dof.is_nan() || dof < 1.0 {
        return 1.0;
    }
    let t = t.abs();
    if t.is_infinite() {
        return 0.0;
    }
    let upper = StudentsT::new(0.0, 1.0, dof).map_or(0.5, |dist| dist.sf(t));
    match tail {
        Tail::One => upper,
        Tail::Two => (2.0 * upper).min(1.0),
    }
}

/// Upper-tail p-value of an F statistic.
#[must_use]
pub fn f_p_value(f: f64, dof_numerator: f64, dof_denominator: f64) -> f64 {
    if f.is_nan() || f <= 0.0 || dof_numerator < 1.0 || dof_denominator < 1.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    FisherSnedecor::new(dof_numerator, dof_denominator).map_or(1.0, |dist| dist.sf(f))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_tailed_reference_value() {
        assert_relative_eq!(
            t_p_value(1.172_105_7, 9.0, Tail::One),
            0.135_623,
            epsilon = 1e-5
        );
    }

    #[test]
    fn two_tailed_doubles_and_ignores_sign() {
        let one = t_p_value(-3.131_641, 3.0, Tail::One);
        let two = t_p_value(3.131_641, 3.0, Tail::Two);
        assert_relative_eq!(two, 2.0 * one, epsilon = 1e-12);
        assert_relative_eq!(two, 0.051_999, epsilon = 1e-5);
    }

    #[test]
    fn zero_statistic_is_not_significant() {
        assert_relative_eq!(t_p_value(0.0, 10.0, Tail::Two), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_inputs_map_to_one() {
        assert_eq!(t_p_value(5.0, 0.0, Tail::Two), 1.0);
        assert_eq!(t_p_value(f64::NAN, 4.0, Tail::One), 1.0);
        assert_eq!(f_p_value(-1.0, 1.0, 8.0), 1.0);
        assert_eq!(f_p_value(2.0, 0.0, 8.0), 1.0);
    }

    #[test]
    fn infinite_statistics_are_certain() {
        assert_eq!(t_p_value(f64::INFINITY, 4.0, Tail::Two), 0.0);
        assert_eq!(f_p_value(f64::INFINITY, 1.0, 4.0), 0.0);
    }

    #[test]
    fn f_upper_tail() {
        assert_relative_eq!(
            f_p_value(0.718_765_555, 1.0, 8.0),
            0.421_188,
            epsilon = 1e-5
        );
    }
}
