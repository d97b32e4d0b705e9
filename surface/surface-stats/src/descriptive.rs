//! Moments, order statistics and z-scores.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{StatResult, StatisticsFailure};
use crate::group::{DataGroup, flatten, total_len};

/// Descriptive statistics over a flattened set of groups.
///
/// Population and sample forms are both reported. Skewness and kurtosis
/// are population moment ratios; kurtosis is not excess-adjusted, so a
/// normal distribution scores 3.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Descriptive {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sum of squared deviations from the mean.
    pub sum_of_squares: f64,
    /// Population variance (divides by N).
    pub variance: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Sample variance (divides by N - 1); 0 for a single sample.
    pub sample_variance: f64,
    /// Sample standard deviation.
    pub sample_std_dev: f64,
    /// Standard error of the mean: sample standard deviation over sqrt(N).
    pub std_error: f64,
    /// Root mean square.
    pub rms: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Median.
    pub median: f64,
    /// Third standardized moment.
    pub skewness: f64,
    /// Fourth standardized moment.
    pub kurtosis: f64,
}

/// Compute [`Descriptive`] statistics over all samples of all groups.
///
/// # Errors
///
/// `InvalidInput` when the groups hold no samples.
#[allow(clippy::cast_precision_loss)]
pub fn describe(groups: &[DataGroup<'_>]) -> StatResult<Descriptive> {
    let count = total_len(groups);
    if count == 0 {
        return Err(StatisticsFailure::invalid_input(
            "descriptive statistics need at least one value",
        ));
    }
    let n = count as f64;

    let mut sum = 0.0;
    let mut sum_sq_raw = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in flatten(groups) {
        sum += v;
        sum_sq_raw += v * v;
        min = min.min(v);
        max = max.max(v);
    }
    let mean = sum / n;

    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in flatten(groups) {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }

    let variance = m2 / n;
    let std_dev = variance.sqrt();
    let sample_variance = if count > 1 { m2 / (n - 1.0) } else { 0.0 };
    let sample_std_dev = sample_variance.sqrt();

    let (skewness, kurtosis) = if std_dev > 0.0 {
        (
            (m3 / n) / (std_dev * variance),
            (m4 / n) / (variance * variance),
        )
    } else {
        (0.0, 0.0)
    };

    let mut sorted: Vec<f64> = flatten(groups).collect();
    sorted.sort_unstable_by(f64::total_cmp);

    Ok(Descriptive {
        count,
        mean,
        sum_of_squares: m2,
        variance,
        std_dev,
        sample_variance,
        sample_std_dev,
        std_error: sample_std_dev / n.sqrt(),
        rms: (sum_sq_raw / n).sqrt(),
        min,
        max,
        median: median_of_sorted(&sorted),
        skewness,
        kurtosis,
    })
}

/// Convenience wrapper for a single slice.
///
/// # Errors
///
/// `InvalidInput` for an empty slice.
pub fn describe_values(values: &[f32]) -> StatResult<Descriptive> {
    describe(&[DataGroup::Borrowed(values)])
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) * 0.5
    }
}

/// Mean and variance of one sample set, computed without allocating.
///
/// This is the per-node workhorse of the map kernels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanVariance {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sum of squared deviations from the mean.
    pub sum_of_squares: f64,
}

impl MeanVariance {
    /// Two-pass mean and sum of squares.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(values: &[f32]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }
        let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / count as f64;
        let sum_of_squares = values
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();
        Self {
            count,
            mean,
            sum_of_squares,
        }
    }

    /// Population variance, 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_of_squares / self.count as f64
        }
    }

    /// Sample variance, 0 for fewer than two samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.sum_of_squares / (self.count - 1) as f64
        }
    }

    /// Population standard deviation.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Sample standard deviation.
    #[must_use]
    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

/// Z-score converter fitted to a set of groups.
///
/// Uses the mean and the sample standard deviation of all input; a zero
/// deviation is clamped to 1 so constant data maps to `x - mean`.
///
/// # Example
///
/// ```
/// use surface_stats::{DataGroup, ZScore};
///
/// let data = [1.0f32, 2.0, 3.0, 4.0, 5.0];
/// let z = ZScore::fit(&[DataGroup::Borrowed(&data)]).unwrap();
/// assert!((z.mean() - 3.0).abs() < 1e-12);
/// assert!(z.z(3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScore {
    mean: f64,
    std_dev: f64,
}

impl ZScore {
    /// Fit mean and sample standard deviation.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the groups hold no samples.
    pub fn fit(groups: &[DataGroup<'_>]) -> StatResult<Self> {
        let stats = describe(groups)?;
        let std_dev = if stats.sample_std_dev == 0.0 {
            1.0
        } else {
            stats.sample_std_dev
        };
        Ok(Self {
            mean: stats.mean,
            std_dev,
        })
    }

    /// Fitted mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Fitted (clamped) standard deviation.
    #[must_use]
    pub const fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Z-score of a value.
    #[inline]
    #[must_use]
    pub fn z(&self, x: f64) -> f64 {
        (x - self.mean) / self.std_dev
    }
}
