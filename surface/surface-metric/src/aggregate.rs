//! Per-node aggregation across a subset of columns.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use surface_stats::{Descriptive, describe_values};

use crate::error::{MetricError, MetricResult};
use crate::table::{MetricTable, Modified, OutputColumn};

/// Statistic computed per node across the selected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Aggregate {
    /// Arithmetic mean.
    Mean,
    /// Sample variance.
    SampleVariance,
    /// Sample standard deviation.
    SampleStdDev,
    /// Standard error of the mean.
    StdError,
    /// Root mean square.
    Rms,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Median.
    Median,
    /// Skewness.
    Skewness,
    /// Kurtosis.
    Kurtosis,
}

impl Aggregate {
    /// Column name used for a newly created output column.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Mean => "Mean",
            Self::SampleVariance => "Sample Variance",
            Self::SampleStdDev => "Sample Standard Deviation",
            Self::StdError => "Standard Error",
            Self::Rms => "Root Mean Square",
            Self::Min => "Minimum",
            Self::Max => "Maximum",
            Self::Median => "Median",
            Self::Skewness => "Skewness",
            Self::Kurtosis => "Kurtosis",
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pick(self, d: &Descriptive) -> f32 {
        // Truncation: table storage is f32
        (match self {
            Self::Mean => d.mean,
            Self::SampleVariance => d.sample_variance,
            Self::SampleStdDev => d.sample_std_dev,
            Self::StdError => d.std_error,
            Self::Rms => d.rms,
            Self::Min => d.min,
            Self::Max => d.max,
            Self::Median => d.median,
            Self::Skewness => d.skewness,
            Self::Kurtosis => d.kurtosis,
        }) as f32
    }
}

/// One requested statistic and where to put it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateRequest {
    /// Statistic to compute.
    pub statistic: Aggregate,
    /// Destination column.
    pub output: OutputColumn,
}

impl AggregateRequest {
    /// Request `statistic` into a new column.
    #[must_use]
    pub const fn new(statistic: Aggregate) -> Self {
        Self {
            statistic,
            output: OutputColumn::New,
        }
    }

    /// Builder-style destination setter.
    #[must_use]
    pub const fn with_output(mut self, output: OutputColumn) -> Self {
        self.output = output;
        self
    }
}

impl MetricTable {
    /// Compute per-node statistics across `columns`.
    ///
    /// Each request produces one output column. An existing column named as
    /// an output is removed from the input set before computing, so results
    /// never feed on themselves.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for any bad column
    /// - [`MetricError::InvalidInput`] when no input column remains
    pub fn aggregate(
        &mut self,
        columns: &[usize],
        requests: &[AggregateRequest],
    ) -> MetricResult<Modified> {
        for r in requests {
            if let OutputColumn::Existing(index) = r.output {
                self.column_values(index)?;
            }
        }
        let inputs: Vec<usize> = columns
            .iter()
            .copied()
            .filter(|c| {
                !requests
                    .iter()
                    .any(|r| r.output == OutputColumn::Existing(*c))
            })
            .collect();
        if inputs.is_empty() {
            return Err(MetricError::invalid_input(
                "aggregation needs at least one input column",
            ));
        }
        let sources = inputs
            .iter()
            .map(|&c| self.column_values(c))
            .collect::<MetricResult<Vec<_>>>()?;

        let node_count = self.node_count();
        let mut outputs = vec![vec![0.0f32; node_count]; requests.len()];
        let mut row = Vec::with_capacity(sources.len());
        for node in 0..node_count {
            row.clear();
            row.extend(sources.iter().map(|s| s[node]));
            let stats = describe_values(&row)?;
            for (out, r) in outputs.iter_mut().zip(requests) {
                out[node] = r.statistic.pick(&stats);
            }
        }

        let mut lo = usize::MAX;
        let mut hi = 0;
        for (values, r) in outputs.into_iter().zip(requests) {
            let index = self.prepare_output(r.output, r.statistic.column_name())?;
            let column = self.column_mut(index)?;
            column.replace_values(values);
            column.comment = format!(
                "{} of {} columns",
                r.statistic.column_name(),
                inputs.len()
            );
            lo = lo.min(index);
            hi = hi.max(index + 1);
        }
        if lo == usize::MAX {
            lo = self.column_count();
            hi = lo;
        }
        Ok(Modified {
            first_column: lo,
            column_count: hi - lo,
        })
    }
}
