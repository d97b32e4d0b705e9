//! Per-node moments and shape checks shared by the kernels.

use surface_metric::{MetricError, MetricTable};
use surface_smooth::smooth_column;
use surface_stats::MeanVariance;
use surface_types::SurfaceMesh;

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};

/// Per-node mean and sample variance across a set of columns.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeMoments {
    pub means: Vec<f64>,
    pub variances: Vec<f64>,
}

impl NodeMoments {
    /// Moments of `columns` at each of `node_count` nodes, each column
    /// optionally multiplied by its sign.
    pub(crate) fn of(columns: &[&[f32]], signs: Option<&[f32]>, node_count: usize) -> Self {
        let mut means = Vec::with_capacity(node_count);
        let mut variances = Vec::with_capacity(node_count);
        let mut row = Vec::with_capacity(columns.len());
        for node in 0..node_count {
            row.clear();
            match signs {
                Some(signs) => {
                    row.extend(columns.iter().zip(signs).map(|(c, &s)| c[node] * s));
                }
                None => row.extend(columns.iter().map(|c| c[node])),
            }
            let mv = MeanVariance::of(&row);
            means.push(mv.mean);
            variances.push(mv.sample_variance());
        }
        Self { means, variances }
    }

    /// Smooth the variance field over the mesh when the configuration asks
    /// for it.
    pub(crate) fn smooth_variances(
        &mut self,
        mesh: &SurfaceMesh,
        config: &MapConfig,
    ) -> MapResult<()> {
        let Some(params) = config.smoothing_params() else {
            return Ok(());
        };
        let mut field: Vec<f32> = self.variances.iter().map(|&v| to_f32(v)).collect();
        smooth_column(mesh, &mut field, &params, config.roi.as_ref())?;
        for (out, v) in self.variances.iter_mut().zip(field) {
            *out = f64::from(v);
        }
        Ok(())
    }
}

/// Narrow a statistic to table storage.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_f32(value: f64) -> f32 {
    // Truncation: table storage is f32
    value as f32
}

/// Borrow every column of a table.
pub(crate) fn column_slices(table: &MetricTable) -> Vec<&[f32]> {
    table.columns().iter().map(|c| c.values()).collect()
}

/// Fail unless `table` has one row per mesh node.
pub(crate) fn check_fits(mesh: &SurfaceMesh, table: &MetricTable) -> MapResult<()> {
    if table.node_count() == mesh.node_count() {
        Ok(())
    } else {
        Err(MetricError::NodeCountMismatch {
            expected: mesh.node_count(),
            actual: table.node_count(),
        }
        .into())
    }
}

/// Fail unless `table` has at least `min` columns.
pub(crate) fn require_columns(table: &MetricTable, min: usize, what: &str) -> MapResult<()> {
    if table.column_count() >= min {
        Ok(())
    } else {
        Err(MapError::invalid_input(format!(
            "{what} needs at least {min} columns, got {}",
            table.column_count()
        )))
    }
}

/// Fail unless all tables share node and column counts.
pub(crate) fn require_same_shape(first: &MetricTable, others: &[&MetricTable]) -> MapResult<()> {
    for other in others {
        if other.node_count() != first.node_count() {
            return Err(MetricError::NodeCountMismatch {
                expected: first.node_count(),
                actual: other.node_count(),
            }
            .into());
        }
        if other.column_count() != first.column_count() {
            return Err(MapError::invalid_input(format!(
                "tables must have the same number of columns, got {} and {}",
                first.column_count(),
                other.column_count()
            )));
        }
    }
    Ok(())
}
