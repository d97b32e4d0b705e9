//! Uniform driver over the statistics primitives.
//!
//! Every primitive follows the same protocol: add data groups, execute,
//! read the output. [`Statistic`] captures that protocol once so that map
//! kernels can treat primitives interchangeably.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::correlation::{Correlation, correlation};
use crate::descriptive::{Descriptive, describe};
use crate::error::{StatResult, StatisticsFailure};
use crate::group::DataGroup;
use crate::levene::{Levene, levene};
use crate::permute::{Permutation, permute_groups};
use crate::rank::{normalize_to, rank_transform};
use crate::regression::{Regression, regression};
use crate::ttest::{TTest, one_sample_t_test, two_sample_t_test};

/// The primitive a [`Statistic`] runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatisticKind {
    /// Moments and order statistics over all groups.
    Descriptive,
    /// Averaged ranks across the union of all groups.
    RankTransform,
    /// Rank-preserving remap of the single group onto a normal distribution.
    Normalize {
        /// Target mean.
        mean: f64,
        /// Target standard deviation.
        std_dev: f64,
    },
    /// Random permutation of the union of all groups.
    Permute {
        /// Sign flip or shuffle.
        kind: Permutation,
        /// Seed of the private random stream.
        seed: u64,
    },
    /// Pearson correlation of exactly two groups.
    Correlation,
    /// Regression of the first group on the remaining groups.
    Regression,
    /// Levene's test across all groups.
    Levene,
    /// One-sample t-test of the single group against `mu`.
    OneSampleT {
        /// Hypothesized mean.
        mu: f64,
    },
    /// Two-sample t-test of exactly two groups.
    TwoSampleT {
        /// Use the pooled variance denominator.
        pooled: bool,
    },
}

/// Result of executing a [`Statistic`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticOutput {
    /// From [`StatisticKind::Descriptive`].
    Descriptive(Descriptive),
    /// Transformed groups, one per input group.
    Groups(Vec<Vec<f32>>),
    /// From [`StatisticKind::Correlation`].
    Correlation(Correlation),
    /// From [`StatisticKind::Regression`].
    Regression(Regression),
    /// From [`StatisticKind::Levene`].
    Levene(Levene),
    /// From the t-test kinds.
    TTest(TTest),
}

impl StatisticOutput {
    /// Transformed groups, if this output carries them.
    #[must_use]
    pub fn into_groups(self) -> Option<Vec<Vec<f32>>> {
        match self {
            Self::Groups(groups) => Some(groups),
            _ => None,
        }
    }
}

/// A primitive together with its input groups.
///
/// # Example
///
/// ```
/// use surface_stats::{Statistic, StatisticKind, StatisticOutput};
///
/// let a = [1.0f32, 2.0, 3.0];
/// let b = [4.0f32, 5.0, 6.0];
/// let mut stat = Statistic::new(StatisticKind::TwoSampleT { pooled: false });
/// stat.add_data_group(&a[..]).add_data_group(&b[..]);
///
/// let StatisticOutput::TTest(t) = stat.execute().unwrap() else {
///     panic!("t-test output expected");
/// };
/// assert!((t.t + 3.674_235).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct Statistic<'a> {
    kind: StatisticKind,
    groups: Vec<DataGroup<'a>>,
}

impl<'a> Statistic<'a> {
    /// Primitive with no data yet.
    #[must_use]
    pub const fn new(kind: StatisticKind) -> Self {
        Self {
            kind,
            groups: Vec::new(),
        }
    }

    /// Add one input group.
    pub fn add_data_group(&mut self, group: impl Into<DataGroup<'a>>) -> &mut Self {
        self.groups.push(group.into());
        self
    }

    /// Input groups added so far.
    #[must_use]
    pub fn groups(&self) -> &[DataGroup<'a>] {
        &self.groups
    }

    /// The configured primitive.
    #[must_use]
    pub const fn kind(&self) -> StatisticKind {
        self.kind
    }

    fn expect_groups(&self, count: usize, what: &str) -> StatResult<()> {
        if self.groups.len() == count {
            Ok(())
        } else {
            Err(StatisticsFailure::invalid_input(format!(
                "{what} needs exactly {count} group(s), got {}",
                self.groups.len()
            )))
        }
    }

    /// Run the primitive.
    ///
    /// Transforming primitives are checked to return exactly one output
    /// group per input group.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for the wrong number of groups, plus whatever the
    /// primitive itself reports. A transform whose output group count does
    /// not match its input is a `ConvergenceFailure`.
    pub fn execute(&self) -> StatResult<StatisticOutput> {
        let groups = &self.groups;
        let output = match self.kind {
            StatisticKind::Descriptive => StatisticOutput::Descriptive(describe(groups)?),
            StatisticKind::RankTransform => StatisticOutput::Groups(rank_transform(groups)?),
            StatisticKind::Normalize { mean, std_dev } => {
                self.expect_groups(1, "normalization")?;
                StatisticOutput::Groups(vec![normalize_to(&groups[0], mean, std_dev)?])
            }
            StatisticKind::Permute { kind, seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                StatisticOutput::Groups(permute_groups(groups, kind, &mut rng))
            }
            StatisticKind::Correlation => {
                self.expect_groups(2, "correlation")?;
                StatisticOutput::Correlation(correlation(&groups[0], &groups[1])?)
            }
            StatisticKind::Regression => {
                let Some((dependent, independents)) = groups.split_first() else {
                    return Err(StatisticsFailure::invalid_input(
                        "regression needs a dependent group",
                    ));
                };
                StatisticOutput::Regression(regression(dependent, independents)?)
            }
            StatisticKind::Levene => StatisticOutput::Levene(levene(groups)?),
            StatisticKind::OneSampleT { mu } => {
                self.expect_groups(1, "one-sample t-test")?;
                StatisticOutput::TTest(one_sample_t_test(&groups[0], mu)?)
            }
            StatisticKind::TwoSampleT { pooled } => {
                self.expect_groups(2, "two-sample t-test")?;
                StatisticOutput::TTest(two_sample_t_test(&groups[0], &groups[1], pooled)?)
            }
        };

        if let StatisticOutput::Groups(out) = &output {
            let same_shape = out.len() == groups.len()
                && out.iter().zip(groups).all(|(o, i)| o.len() == i.len());
            if !same_shape {
                return Err(StatisticsFailure::convergence(format!(
                    "transform produced {} groups from {} inputs",
                    out.len(),
                    groups.len()
                )));
            }
        }
        Ok(output)
    }
}
