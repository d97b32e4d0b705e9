//! Rank transformation and rank-preserving normalization.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{StatResult, StatisticsFailure};
use crate::group::{DataGroup, total_len};

/// Replace every value with its 1-based rank across the union of all groups.
///
/// Tied values share the average of the ranks they span. The output has the
/// same number of groups, each of the same length, as the input.
///
/// # Example
///
/// ```
/// use surface_stats::{DataGroup, rank_transform};
///
/// let a = [1.0f32, 10.0, 100.0];
/// let b = [2.0f32, 20.0, 200.0];
/// let ranks = rank_transform(&[DataGroup::Borrowed(&a), DataGroup::Borrowed(&b)]).unwrap();
/// assert_eq!(ranks[0], vec![1.0, 3.0, 5.0]);
/// assert_eq!(ranks[1], vec![2.0, 4.0, 6.0]);
/// ```
///
/// # Errors
///
/// `InvalidInput` when the groups hold no samples.
pub fn rank_transform(groups: &[DataGroup<'_>]) -> StatResult<Vec<Vec<f32>>> {
    if total_len(groups) == 0 {
        return Err(StatisticsFailure::invalid_input(
            "rank transformation needs at least one value",
        ));
    }

    let values: Vec<f32> = groups
        .iter()
        .flat_map(|g| g.as_slice().iter().copied())
        .collect();
    let ranks = average_ranks(&values);

    let mut out = Vec::with_capacity(groups.len());
    let mut offset = 0;
    for g in groups {
        out.push(ranks[offset..offset + g.len()].to_vec());
        offset += g.len();
    }
    Ok(out)
}

/// Average 1-based ranks of a flat slice, in input order.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn average_ranks(values: &[f32]) -> Vec<f32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]).then(i.cmp(&j)));

    let mut ranks = vec![0.0f32; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end.
        let rank = (start + 1 + end) as f64 * 0.5;
        for &idx in &order[start..end] {
            ranks[idx] = rank as f32;
        }
        start = end;
    }
    ranks
}

/// Remap values onto a normal distribution with the given mean and deviation.
///
/// Each value is replaced by `mean + std_dev * Φ⁻¹((r - 0.5) / n)` where
/// `r` is its average rank, so order is preserved, ties stay tied and the
/// median lands on `mean`.
///
/// # Errors
///
/// `InvalidInput` for empty input or a negative or non-finite deviation.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn normalize_to(values: &[f32], mean: f64, std_dev: f64) -> StatResult<Vec<f32>> {
    if values.is_empty() {
        return Err(StatisticsFailure::invalid_input(
            "normalization needs at least one value",
        ));
    }
    if !std_dev.is_finite() || std_dev < 0.0 || !mean.is_finite() {
        return Err(StatisticsFailure::invalid_input(format!(
            "normalization target must be finite with non-negative deviation, got mean {mean} deviation {std_dev}"
        )));
    }
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| StatisticsFailure::convergence(format!("standard normal: {e}")))?;

    let n = values.len() as f64;
    Ok(average_ranks(values)
        .into_iter()
        .map(|r| {
            let quantile = (f64::from(r) - 0.5) / n;
            (mean + std_dev * standard.inverse_cdf(quantile)) as f32
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_ranks_with_ties() {
        let a = [3.0f32, 9.0, 1.0, 7.0, 5.0, 1.0, 10.0];
        let b = [8.0f32, 10.0, 2.0, 7.0, 3.0, 10.0, 15.0];
        let out = rank_transform(&[DataGroup::Borrowed(&a), DataGroup::Borrowed(&b)]).unwrap();
        assert_eq!(out[0], vec![4.5, 10.0, 1.5, 7.5, 6.0, 1.5, 12.0]);
        assert_eq!(out[1], vec![9.0, 12.0, 3.0, 7.5, 4.5, 12.0, 14.0]);
    }

    #[test]
    fn all_equal_share_mean_rank() {
        let ranks = average_ranks(&[2.0; 6]);
        assert!(ranks.iter().all(|&r| r == 3.5));
    }

    #[test]
    fn group_shape_is_preserved() {
        let out = rank_transform(&[
            DataGroup::Owned(vec![1.0]),
            DataGroup::Owned(vec![]),
            DataGroup::Owned(vec![3.0, 2.0]),
        ])
        .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].len(), 1);
        assert!(out[1].is_empty());
        assert_eq!(out[2], vec![3.0, 2.0]);
    }

    #[test]
    fn empty_ranks_fail() {
        assert!(rank_transform(&[]).is_err());
    }

    #[test]
    fn normalization_preserves_order_and_centers_median() {
        let data = [10.0f32, -3.0, 7.0, 0.5, 2.0];
        let out = normalize_to(&data, 100.0, 15.0).unwrap();
        // 2.0 is the median.
        assert_relative_eq!(out[4], 100.0, epsilon = 1e-4);
        for i in 0..data.len() {
            for j in 0..data.len() {
                if data[i] < data[j] {
                    assert!(out[i] < out[j]);
                }
            }
        }
        // Symmetric quantiles around the median.
        assert_relative_eq!(out[0] - 100.0, 100.0 - out[1], epsilon = 1e-3);
    }

    #[test]
    fn normalization_rejects_negative_deviation() {
        assert!(normalize_to(&[1.0], 0.0, -1.0).is_err());
        assert_relative_eq!(normalize_to(&[5.0], 3.0, 2.0).unwrap()[0], 3.0, epsilon = 1e-5);
    }
}
