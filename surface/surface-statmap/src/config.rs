//! Configuration shared by the map kernels.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use surface_smooth::SmoothingParams;
use surface_stats::FdrVariant;
use surface_types::Roi;

use crate::error::{MapError, MapResult};

/// Per-node preprocessing applied to the data groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DataTransform {
    /// Use values as given.
    #[default]
    None,
    /// Replace each node's values by their average ranks across all groups.
    RankSum,
}

/// Variance treatment of the two-sample driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum VarianceMode {
    /// Pooled-variance t-map.
    Pooled,
    /// Unpooled (Welch) t-map.
    Unpooled,
    /// Mean difference scaled by the shuffled standard deviation.
    Sigma,
}

/// Options for the statistical map kernels.
///
/// With the `serde` feature the field names (de)serialize in kebab case,
/// e.g. `variance-smoothing-iterations` or `group-1-size`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", default))]
pub struct MapConfig {
    /// Smoothing passes over the variance fields; 0 disables. Default: 0.
    pub variance_smoothing_iterations: usize,

    /// Blend factor in `[0, 1]` for variance smoothing. Default: 0.5.
    pub variance_smoothing_strength: f32,

    /// Pooled instead of unpooled denominator. Default: false.
    pub pooled_variance: bool,

    /// False discovery rate target in `(0, 1)`. Default: 0.05.
    pub false_discovery_rate_q: f64,

    /// FDR constant. Default: [`FdrVariant::C1`].
    pub fdr_variant: FdrVariant,

    /// Emit a `DOF` column. Default: false.
    pub produce_dof: bool,

    /// Emit a `P` column. Default: false.
    pub produce_p: bool,

    /// Emit an FDR column; implies `produce_p`. Default: false.
    pub produce_fdr: bool,

    /// Permutation count for shuffled maps. Default: 1000.
    pub iterations: usize,

    /// Size of synthetic group A in shuffled maps; `<= 0` means half the
    /// columns. Default: 0.
    pub group_1_size: i64,

    /// Per-node preprocessing. Default: none.
    pub data_transform: DataTransform,

    /// Overrides `pooled_variance`, or selects the sigma map. Default: none.
    pub variance_mode: Option<VarianceMode>,

    /// Nodes taking part in variance smoothing. Default: all.
    pub roi: Option<Roi>,

    /// Seed of the random streams; iteration `r` uses `seed + r`. Default: 0.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            variance_smoothing_iterations: 0,
            variance_smoothing_strength: 0.5,
            pooled_variance: false,
            false_discovery_rate_q: 0.05,
            fdr_variant: FdrVariant::C1,
            produce_dof: false,
            produce_p: false,
            produce_fdr: false,
            iterations: 1000,
            group_1_size: 0,
            data_transform: DataTransform::None,
            variance_mode: None,
            roi: None,
            seed: 0,
        }
    }
}

impl MapConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets variance smoothing.
    #[must_use]
    pub const fn with_variance_smoothing(mut self, iterations: usize, strength: f32) -> Self {
        self.variance_smoothing_iterations = iterations;
        self.variance_smoothing_strength = strength;
        self
    }

    /// Selects the pooled denominator.
    #[must_use]
    pub const fn with_pooled_variance(mut self, pooled: bool) -> Self {
        self.pooled_variance = pooled;
        self
    }

    /// Sets the FDR target and constant.
    #[must_use]
    pub const fn with_fdr(mut self, q: f64, variant: FdrVariant) -> Self {
        self.false_discovery_rate_q = q;
        self.fdr_variant = variant;
        self
    }

    /// Selects the optional output columns.
    #[must_use]
    pub const fn with_outputs(mut self, dof: bool, p: bool, fdr: bool) -> Self {
        self.produce_dof = dof;
        self.produce_p = p;
        self.produce_fdr = fdr;
        self
    }

    /// Sets the permutation count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the synthetic group A size.
    #[must_use]
    pub const fn with_group_1_size(mut self, size: i64) -> Self {
        self.group_1_size = size;
        self
    }

    /// Sets the per-node preprocessing.
    #[must_use]
    pub const fn with_data_transform(mut self, transform: DataTransform) -> Self {
        self.data_transform = transform;
        self
    }

    /// Sets the variance treatment.
    #[must_use]
    pub const fn with_variance_mode(mut self, mode: VarianceMode) -> Self {
        self.variance_mode = Some(mode);
        self
    }

    /// Restricts variance smoothing to `roi`.
    #[must_use]
    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = Some(roi);
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Whether the t-map uses the pooled denominator.
    #[must_use]
    pub fn pooled(&self) -> bool {
        match self.variance_mode {
            Some(VarianceMode::Pooled) => true,
            Some(VarianceMode::Unpooled) => false,
            Some(VarianceMode::Sigma) | None => self.pooled_variance,
        }
    }

    /// Whether a `P` column is produced.
    #[must_use]
    pub const fn wants_p(&self) -> bool {
        self.produce_p || self.produce_fdr
    }

    /// Variance smoothing parameters, or `None` when disabled.
    #[must_use]
    pub fn smoothing_params(&self) -> Option<SmoothingParams> {
        if self.variance_smoothing_iterations == 0 {
            None
        } else {
            Some(
                SmoothingParams::new()
                    .with_strength(self.variance_smoothing_strength)
                    .with_iterations(self.variance_smoothing_iterations),
            )
        }
    }

    /// Check the smoothing strength and the FDR target.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidInput`] for a strength outside `[0, 1]` or a `q`
    /// outside `(0, 1)`.
    pub fn validate(&self) -> MapResult<()> {
        if !(0.0..=1.0).contains(&self.variance_smoothing_strength) {
            return Err(MapError::invalid_input(format!(
                "variance smoothing strength must lie in [0, 1], got {}",
                self.variance_smoothing_strength
            )));
        }
        let q = self.false_discovery_rate_q;
        if q.is_nan() || q <= 0.0 || q >= 1.0 {
            return Err(MapError::invalid_input(format!(
                "false discovery rate q must lie in (0, 1), got {q}"
            )));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus an iteration count of at least 1.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidInput`] as above or for zero iterations.
    pub fn validate_permutation(&self) -> MapResult<()> {
        self.validate()?;
        if self.iterations == 0 {
            return Err(MapError::invalid_input(
                "permutation maps need at least one iteration",
            ));
        }
        Ok(())
    }
}
