//! Two-sample t-maps.
//!
//! For every node the columns of table `A` and table `B` form two samples.
//! The map holds their means and the t statistic
//!
//! ```text
//! t = (mean_A - mean_B) / denom
//! pooled:   denom = sqrt(s_p² (1/k_A + 1/k_B))
//! unpooled: denom = sqrt(s²_A / k_A + s²_B / k_B)
//! ```
//!
//! with sample variances, optionally smoothed over the mesh first. A zero
//! denominator is replaced by 1.

use surface_metric::{Column, MetricError, MetricTable};
use surface_stats::{
    DataGroup, FdrVariant, StatisticsFailure, Tail, apply_fdr, rank_transform, t_p_value,
    two_sample_denominator, welch_dof,
};
use surface_types::SurfaceMesh;
use tracing::info;

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::moments::{NodeMoments, check_fits, column_slices, require_columns, to_f32};

/// Index of the `T` column in a [`t_map`] result.
pub const T_COLUMN: usize = 2;

/// Per-node outputs of one two-sample comparison.
#[derive(Debug, Clone, Default)]
pub(crate) struct TwoSampleColumns {
    pub mean_a: Vec<f32>,
    pub mean_b: Vec<f32>,
    pub t: Vec<f32>,
    pub dof: Vec<f32>,
    pub p: Vec<f32>,
}

/// Compute means, t and Welch degrees of freedom; `p` stays empty unless
/// `with_p` is set. Shapes are already validated.
pub(crate) fn two_sample_columns(
    mesh: &SurfaceMesh,
    a: &[&[f32]],
    b: &[&[f32]],
    config: &MapConfig,
    with_p: bool,
) -> MapResult<TwoSampleColumns> {
    let n = mesh.node_count();
    let (ka, kb) = (a.len(), b.len());
    let mut ma = NodeMoments::of(a, None, n);
    let mut mb = NodeMoments::of(b, None, n);
    ma.smooth_variances(mesh, config)?;
    mb.smooth_variances(mesh, config)?;

    let pooled = config.pooled();
    let mut out = TwoSampleColumns {
        mean_a: Vec::with_capacity(n),
        mean_b: Vec::with_capacity(n),
        t: Vec::with_capacity(n),
        dof: Vec::with_capacity(n),
        p: Vec::new(),
    };
    for node in 0..n {
        let (va, vb) = (ma.variances[node], mb.variances[node]);
        let mut denom = two_sample_denominator(va, ka, vb, kb, pooled);
        if denom == 0.0 {
            denom = 1.0;
        }
        let t = (ma.means[node] - mb.means[node]) / denom;
        let dof = welch_dof(va, ka, vb, kb);

        out.mean_a.push(to_f32(ma.means[node]));
        out.mean_b.push(to_f32(mb.means[node]));
        out.t.push(to_f32(t));
        out.dof.push(to_f32(dof));
        if with_p {
            out.p.push(to_f32(t_p_value(t, dof, Tail::Two)));
        }
    }
    Ok(out)
}

/// Two-sample t-map of `a` against `b`.
///
/// Columns, in order: `Mean-A`, `Mean-B`, `T`, then `DOF` when requested,
/// `P` when p-values or FDR are requested, and `FDR-C1` or `FDR-CSum` when
/// FDR is requested. The p-value is two-tailed with Welch degrees of
/// freedom, also for pooled variance.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for an invalid configuration or an empty
///   group
/// - [`MapError::Metric`] if a table does not fit the mesh
/// - [`MapError::Statistics`] if the FDR primitive rejects its input
pub fn t_map(
    mesh: &SurfaceMesh,
    a: &MetricTable,
    b: &MetricTable,
    config: &MapConfig,
) -> MapResult<MetricTable> {
    config.validate()?;
    check_fits(mesh, a)?;
    check_fits(mesh, b)?;
    require_columns(a, 1, "group A")?;
    require_columns(b, 1, "group B")?;

    let pooled = config.pooled();
    info!(
        nodes = mesh.node_count(),
        columns_a = a.column_count(),
        columns_b = b.column_count(),
        pooled,
        "Computing two-sample t-map"
    );
    let cols = two_sample_columns(
        mesh,
        &column_slices(a),
        &column_slices(b),
        config,
        config.wants_p(),
    )?;

    let mut map = MetricTable::new(mesh.node_count());
    map.set_file_comment(format!(
        "T-map of {} versus {} columns, {} variance",
        a.column_count(),
        b.column_count(),
        if pooled { "pooled" } else { "unpooled" }
    ));
    map.add_column(Column::from_values("Mean-A", cols.mean_a))?;
    map.add_column(Column::from_values("Mean-B", cols.mean_b))?;
    map.add_column(Column::from_values("T", cols.t).with_color_mapping(-5.0, 5.0))?;
    if config.produce_dof {
        map.add_column(Column::from_values("DOF", cols.dof).with_color_mapping(0.0, 20.0))?;
    }
    if config.wants_p() {
        if config.produce_fdr {
            let fdr = apply_fdr(&cols.p, config.false_discovery_rate_q, config.fdr_variant)
                .map_err(|e| MapError::statistics("false discovery rate", e))?;
            map.add_column(Column::from_values("P", cols.p))?;
            let name = match config.fdr_variant {
                FdrVariant::C1 => "FDR-C1",
                FdrVariant::CSum => "FDR-CSum",
            };
            map.add_column(
                Column::from_values(name, fdr).with_comment(format!(
                    "P-values at or below the FDR cutoff for q = {}",
                    config.false_discovery_rate_q
                )),
            )?;
        } else {
            map.add_column(Column::from_values("P", cols.p))?;
        }
    }

    info!(columns = map.column_count(), "Two-sample t-map done");
    Ok(map)
}

/// Replace every node's values in `a` and `b` by their average ranks
/// across both tables.
///
/// Column names and metadata are kept.
///
/// # Errors
///
/// - [`MapError::Metric`] if the node counts differ
/// - [`MapError::Statistics`] with `ConvergenceFailure` if the rank
///   transformation does not return two groups
pub fn rank_transform_pair(
    a: &MetricTable,
    b: &MetricTable,
) -> MapResult<(MetricTable, MetricTable)> {
    const KERNEL: &str = "rank-sum transform";
    let n = a.node_count();
    if b.node_count() != n {
        return Err(MetricError::NodeCountMismatch {
            expected: n,
            actual: b.node_count(),
        }
        .into());
    }

    let (ka, kb) = (a.column_count(), b.column_count());
    let mut ranked_a = vec![vec![0.0f32; n]; ka];
    let mut ranked_b = vec![vec![0.0f32; n]; kb];
    let (mut row_a, mut row_b) = (Vec::with_capacity(ka), Vec::with_capacity(kb));
    for node in 0..n {
        a.row_into(node, &mut row_a)?;
        b.row_into(node, &mut row_b)?;
        let ranks = rank_transform(&[DataGroup::Borrowed(&row_a), DataGroup::Borrowed(&row_b)])
            .map_err(|e| MapError::statistics(KERNEL, e))?;
        let [ra, rb] = ranks.as_slice() else {
            return Err(MapError::statistics(
                KERNEL,
                StatisticsFailure::convergence(format!(
                    "rank transformation returned {} groups, expected 2",
                    ranks.len()
                )),
            ));
        };
        for (column, &r) in ranked_a.iter_mut().zip(ra) {
            column[node] = r;
        }
        for (column, &r) in ranked_b.iter_mut().zip(rb) {
            column[node] = r;
        }
    }

    let rebuild = |source: &MetricTable, ranked: Vec<Vec<f32>>| -> MapResult<MetricTable> {
        let columns = source
            .columns()
            .iter()
            .zip(ranked)
            .map(|(original, values)| {
                let mut column = Column::from_values(original.name.clone(), values);
                column.copy_metadata_from(original);
                column
            })
            .collect();
        let mut table = MetricTable::from_columns(n, columns)?;
        table.set_title(source.title());
        table.set_file_comment(source.file_comment());
        Ok(table)
    };
    Ok((rebuild(a, ranked_a)?, rebuild(b, ranked_b)?))
}

/// [`t_map`] on the per-node ranks of `a` and `b`.
///
/// # Errors
///
/// Any error of [`rank_transform_pair`] or [`t_map`].
pub fn rank_sum_t_map(
    mesh: &SurfaceMesh,
    a: &MetricTable,
    b: &MetricTable,
    config: &MapConfig,
) -> MapResult<MetricTable> {
    check_fits(mesh, a)?;
    check_fits(mesh, b)?;
    info!(nodes = mesh.node_count(), "Rank transforming groups");
    let (ra, rb) = rank_transform_pair(a, b)?;
    t_map(mesh, &ra, &rb, config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surface_types::{corner_tetrahedron, planar_grid};

    /// One table per group; column `j` holds `values[j]` at node 0 and
    /// `values[j] + node` elsewhere.
    fn group(mesh: &SurfaceMesh, values: &[f32]) -> MetricTable {
        let n = mesh.node_count();
        let columns = values
            .iter()
            .enumerate()
            .map(|(j, &v)| {
                #[allow(clippy::cast_precision_loss)]
                let data = (0..n).map(|node| v + node as f32).collect();
                Column::from_values(format!("subject {j}"), data)
            })
            .collect();
        MetricTable::from_columns(n, columns).unwrap()
    }

    #[test]
    fn unpooled_matches_hand_computation() {
        let mesh = corner_tetrahedron();
        let a = group(&mesh, &[1.0, 2.0, 3.0]);
        let b = group(&mesh, &[4.0, 5.0, 6.0]);
        let map = t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();

        assert_eq!(map.column_count(), 3);
        assert_eq!(map.column(T_COLUMN).unwrap().name, "T");
        assert_eq!(map.value(0, 0).unwrap(), 2.0);
        assert_eq!(map.value(0, 1).unwrap(), 5.0);
        let expected = -3.0 / (2.0f64 / 3.0).sqrt();
        for node in 0..4 {
            assert_relative_eq!(
                f64::from(map.value(node, T_COLUMN).unwrap()),
                expected,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn pooled_equals_unpooled_for_equal_variances() {
        let mesh = corner_tetrahedron();
        let a = group(&mesh, &[1.0, 2.0, 3.0]);
        let b = group(&mesh, &[4.0, 5.0, 6.0]);
        let unpooled = t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();
        let pooled = t_map(&mesh, &a, &b, &MapConfig::new().with_pooled_variance(true)).unwrap();
        assert_relative_eq!(
            pooled.value(0, T_COLUMN).unwrap(),
            unpooled.value(0, T_COLUMN).unwrap(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn optional_columns_in_order() {
        let mesh = corner_tetrahedron();
        let a = group(&mesh, &[1.0, 2.0, 3.0]);
        let b = group(&mesh, &[4.0, 5.0, 6.5]);
        let config = MapConfig::new()
            .with_outputs(true, false, true)
            .with_fdr(0.05, FdrVariant::CSum);
        let map = t_map(&mesh, &a, &b, &config).unwrap();
        let names: Vec<_> = map.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Mean-A", "Mean-B", "T", "DOF", "P", "FDR-CSum"]);

        let p = map.value(0, 4).unwrap();
        assert!(p > 0.0 && p < 0.05);
        let dof = map.value(0, 3).unwrap();
        assert!(dof > 2.0 && dof < 4.0);
    }

    #[test]
    fn zero_variance_uses_unit_denominator() {
        let mesh = corner_tetrahedron();
        let a = group(&mesh, &[2.0, 2.0]);
        let b = group(&mesh, &[5.0, 5.0]);
        let map = t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();
        assert_eq!(map.value(0, T_COLUMN).unwrap(), -3.0);
    }

    #[test]
    fn swapping_groups_negates_t() {
        let mesh = planar_grid(3, 3);
        let a = group(&mesh, &[1.0, 4.0, 2.5]);
        let b = group(&mesh, &[0.5, 7.0, 3.0, 1.0]);
        let config = MapConfig::new().with_outputs(false, true, false);
        let ab = t_map(&mesh, &a, &b, &config).unwrap();
        let ba = t_map(&mesh, &b, &a, &config).unwrap();
        for node in 0..9 {
            assert_eq!(ab.value(node, 2).unwrap(), -ba.value(node, 2).unwrap());
            assert_eq!(ab.value(node, 3).unwrap(), ba.value(node, 3).unwrap());
        }
    }

    #[test]
    fn variance_smoothing_runs_on_mesh() {
        let mesh = planar_grid(3, 3);
        let a = group(&mesh, &[1.0, 2.0, 3.0]);
        let b = group(&mesh, &[4.0, 5.0, 6.0]);
        let config = MapConfig::new().with_variance_smoothing(3, 0.5);
        let map = t_map(&mesh, &a, &b, &config).unwrap();
        // Variance is 1 everywhere, so smoothing changes nothing
        assert_relative_eq!(
            f64::from(map.value(4, T_COLUMN).unwrap()),
            -3.0 / (2.0f64 / 3.0).sqrt(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn rejects_bad_shapes() {
        let mesh = corner_tetrahedron();
        let grid = planar_grid(3, 3);
        let a = group(&mesh, &[1.0, 2.0]);
        let wrong = group(&grid, &[1.0, 2.0]);
        let empty = MetricTable::new(4);
        assert!(matches!(
            t_map(&mesh, &a, &wrong, &MapConfig::new()),
            Err(MapError::Metric(_))
        ));
        assert!(matches!(
            t_map(&mesh, &a, &empty, &MapConfig::new()),
            Err(MapError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rank_sum_uses_average_ranks() {
        let mesh = corner_tetrahedron();
        let a = group(&mesh, &[1.0, 10.0, 100.0]);
        let b = group(&mesh, &[2.0, 20.0, 200.0]);
        let (ra, rb) = rank_transform_pair(&a, &b).unwrap();
        assert_eq!(ra.row(0).unwrap(), vec![1.0, 3.0, 5.0]);
        assert_eq!(rb.row(0).unwrap(), vec![2.0, 4.0, 6.0]);
        assert_eq!(ra.column(0).unwrap().name, "subject 0");

        let map = rank_sum_t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();
        // Ranks {1,3,5} vs {2,4,6}: means 3 and 4, variances 4
        let expected = -1.0 / (8.0f64 / 3.0).sqrt();
        assert_relative_eq!(
            f64::from(map.value(0, T_COLUMN).unwrap()),
            expected,
            epsilon = 1e-5
        );
    }
}
