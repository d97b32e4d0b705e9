//! Cluster thresholding parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

/// Parameters for finding and scoring clusters.
///
/// A node is active when its value lies above `positive_threshold` or below
/// `negative_threshold`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", default))]
pub struct ClusterParams {
    /// Upper bound for negative clusters, at most 0. Default: -2.0.
    pub negative_threshold: f32,

    /// Lower bound for positive clusters, at least 0. Default: 2.0.
    pub positive_threshold: f32,

    /// Significance level α in `[0, 1]`. Default: 0.05.
    pub p_value: f64,

    /// Per-node exponent `e`; each node then contributes `area · 2^e` to the
    /// corrected area. Default: none.
    pub area_correction: Option<Vec<f32>>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            negative_threshold: -2.0,
            positive_threshold: 2.0,
            p_value: 0.05,
            area_correction: None,
        }
    }
}

impl ClusterParams {
    /// Creates new parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, negative: f32, positive: f32) -> Self {
        self.negative_threshold = negative;
        self.positive_threshold = positive;
        self
    }

    /// Sets the significance level.
    #[must_use]
    pub const fn with_p_value(mut self, p_value: f64) -> Self {
        self.p_value = p_value;
        self
    }

    /// Sets the per-node area correction exponents.
    #[must_use]
    pub fn with_area_correction(mut self, correction: Vec<f32>) -> Self {
        self.area_correction = Some(correction);
        self
    }

    /// Whether `value` passes either threshold.
    #[inline]
    #[must_use]
    pub fn is_active(&self, value: f32) -> bool {
        value > self.positive_threshold || value < self.negative_threshold
    }

    /// Check thresholds, α and, when given, the correction length.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::InvalidInput`] for a positive negative threshold, a
    ///   negative positive threshold or α outside `[0, 1]`
    /// - [`ClusterError::NodeCountMismatch`] if the correction column does
    ///   not have `node_count` entries
    pub fn validate(&self, node_count: usize) -> ClusterResult<()> {
        if self.negative_threshold.is_nan() || self.negative_threshold > 0.0 {
            return Err(ClusterError::invalid_input(format!(
                "negative threshold must be <= 0, got {}",
                self.negative_threshold
            )));
        }
        if self.positive_threshold.is_nan() || self.positive_threshold < 0.0 {
            return Err(ClusterError::invalid_input(format!(
                "positive threshold must be >= 0, got {}",
                self.positive_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.p_value) {
            return Err(ClusterError::invalid_input(format!(
                "p-value must lie in [0, 1], got {}",
                self.p_value
            )));
        }
        if let Some(correction) = &self.area_correction {
            if correction.len() != node_count {
                return Err(ClusterError::NodeCountMismatch {
                    expected: node_count,
                    actual: correction.len(),
                });
            }
        }
        Ok(())
    }
}
