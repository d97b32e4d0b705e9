//! End-to-end significance pipelines: preprocess, build the statistical
//! map and its permutation null, then score clusters.

use std::borrow::Cow;

use surface_cluster::{ClusterParams, ClusterReport};
use surface_metric::MetricTable;
use surface_types::{Progress, SurfaceMesh};
use tracing::info;

use crate::config::{DataTransform, MapConfig, VarianceMode};
use crate::error::{MapError, MapResult};
use crate::shuffled::{one_sample_t_values, permuted_sign_flip_t_map, shuffled_t_map};
use crate::sigma::sigma_t_map;
use crate::tmap::{T_COLUMN, rank_transform_pair, t_map};

/// Outputs of a significance pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAnalysis {
    /// The statistical map.
    pub map: MetricTable,
    /// Index of the map column that was clustered.
    pub column: usize,
    /// One null column per permutation.
    pub shuffled: MetricTable,
    /// Clusters of `map[column]` scored against `shuffled`.
    pub report: ClusterReport,
}

/// Two-sample significance analysis of `a` against `b`.
///
/// 1. With [`DataTransform::RankSum`] both groups are rank transformed per
///    node first.
/// 2. With [`VarianceMode::Sigma`] the map is [`sigma_t_map`] and clusters
///    are found on `T-Sigma`. Otherwise the map is [`t_map`], clustered on
///    `T`, and the null is [`shuffled_t_map`] over the columns of `a`
///    followed by `b`, split at the column count of `a`.
/// 3. The clusters are scored with [`ClusterReport::analyze`].
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for an invalid configuration, zero
///   iterations or an empty group
/// - [`MapError::Metric`] if a table does not fit the mesh
/// - [`MapError::Cluster`] for invalid cluster parameters
/// - [`MapError::Cancelled`] when `progress` asks to stop
pub fn two_sample_driver(
    mesh: &SurfaceMesh,
    a: &MetricTable,
    b: &MetricTable,
    config: &MapConfig,
    cluster_params: &ClusterParams,
    progress: &Progress<'_>,
) -> MapResult<MapAnalysis> {
    config.validate_permutation()?;
    cluster_params.validate(mesh.node_count())?;
    info!(
        nodes = mesh.node_count(),
        columns_a = a.column_count(),
        columns_b = b.column_count(),
        transform = ?config.data_transform,
        variance = ?config.variance_mode,
        "Starting two-sample analysis"
    );

    let (a, b): (Cow<'_, MetricTable>, Cow<'_, MetricTable>) = match config.data_transform {
        DataTransform::None => (Cow::Borrowed(a), Cow::Borrowed(b)),
        DataTransform::RankSum => {
            let (ra, rb) = rank_transform_pair(a, b)?;
            (Cow::Owned(ra), Cow::Owned(rb))
        }
    };
    let ranked = config.data_transform == DataTransform::RankSum;

    let (map, column, shuffled, title) = if config.variance_mode == Some(VarianceMode::Sigma) {
        let maps = sigma_t_map(mesh, &a, &b, config, progress)?;
        (maps.map, 0, maps.shuffled, "Sigma T-Test")
    } else {
        let map = t_map(mesh, &a, &b, config)?;
        let mut union = a.as_ref().clone();
        union.append(&b)?;
        let split = i64::try_from(a.column_count())
            .map_err(|_| MapError::invalid_input("group A has too many columns"))?;
        let shuffled_config = config.clone().with_group_1_size(split);
        let shuffled = shuffled_t_map(mesh, &union, &shuffled_config, progress)?;
        let title = match (ranked, config.pooled()) {
            (true, _) => "Rank-Sum T-Test",
            (false, true) => "T-Test (Pooled Variance)",
            (false, false) => "T-Test (Unpooled Variance)",
        };
        (map, T_COLUMN, shuffled, title)
    };

    let report =
        ClusterReport::analyze(mesh, &map, column, &shuffled, cluster_params)?.with_title(title);
    info!(
        clusters = report.clusters.len(),
        significant_area = report.significant_area,
        "Two-sample analysis done"
    );
    Ok(MapAnalysis {
        map,
        column,
        shuffled,
        report,
    })
}

/// One-sample significance analysis of `table` against the constant `mu`.
///
/// The map is [`one_sample_t_values`], the null is
/// [`permuted_sign_flip_t_map`], and clusters are found on `T-Values`.
///
/// # Errors
///
/// As [`two_sample_driver`]; the table needs at least two columns.
pub fn one_sample_driver(
    mesh: &SurfaceMesh,
    table: &MetricTable,
    mu: f32,
    config: &MapConfig,
    cluster_params: &ClusterParams,
    progress: &Progress<'_>,
) -> MapResult<MapAnalysis> {
    config.validate_permutation()?;
    cluster_params.validate(mesh.node_count())?;
    info!(
        nodes = mesh.node_count(),
        columns = table.column_count(),
        mu,
        "Starting one-sample analysis"
    );

    let map = one_sample_t_values(mesh, table, mu, config)?;
    let shuffled = permuted_sign_flip_t_map(mesh, table, mu, config, progress)?;
    let report = ClusterReport::analyze(mesh, &map, 0, &shuffled, cluster_params)?
        .with_title("One-Sample T-Test");
    info!(
        clusters = report.clusters.len(),
        significant_area = report.significant_area,
        "One-sample analysis done"
    );
    Ok(MapAnalysis {
        map,
        column: 0,
        shuffled,
        report,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use surface_metric::Column;
    use surface_types::{CancelToken, NoProgress, planar_grid};

    const EFFECT_NODES: [usize; 4] = [0, 1, 4, 5];

    /// 4x4 grid tables with per-subject offsets and `effect` added on the
    /// lower-left 2x2 block.
    fn subjects(offsets: &[f32], effect: f32) -> MetricTable {
        let columns = offsets
            .iter()
            .enumerate()
            .map(|(j, &offset)| {
                let values = (0..16)
                    .map(|node| {
                        if EFFECT_NODES.contains(&node) {
                            offset + effect
                        } else {
                            offset
                        }
                    })
                    .collect();
                Column::from_values(format!("subject {j}"), values)
            })
            .collect();
        MetricTable::from_columns(16, columns).unwrap()
    }

    fn groups() -> (MetricTable, MetricTable) {
        (
            subjects(&[0.1, -0.2, 0.3, -0.1], 5.0),
            subjects(&[0.2, -0.1, 0.0, -0.3], 0.0),
        )
    }

    #[test]
    fn two_sample_finds_effect_cluster() {
        let mesh = planar_grid(4, 4);
        let (a, b) = groups();
        let config = MapConfig::new().with_iterations(20).with_seed(7);
        let analysis =
            two_sample_driver(&mesh, &a, &b, &config, &ClusterParams::new(), &Progress::silent(0))
                .unwrap();

        assert_eq!(analysis.column, T_COLUMN);
        assert_eq!(analysis.map.column(T_COLUMN).unwrap().name, "T");
        assert_eq!(analysis.shuffled.column_count(), 20);
        assert_eq!(analysis.report.iterations, 20);
        assert_eq!(analysis.report.title, "T-Test (Unpooled Variance)");

        let largest = &analysis.report.clusters[0];
        let mut nodes = largest.nodes.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, [0, 1, 4, 5]);
        assert!((0.0..=1.0).contains(&largest.p_value));
    }

    #[test]
    fn two_sample_is_reproducible() {
        let mesh = planar_grid(4, 4);
        let (a, b) = groups();
        let config = MapConfig::new().with_iterations(10).with_seed(3);
        let params = ClusterParams::new();
        let first = two_sample_driver(&mesh, &a, &b, &config, &params, &Progress::silent(0));
        let second = two_sample_driver(&mesh, &a, &b, &config, &params, &Progress::silent(0));
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn two_sample_sigma_and_rank_sum() {
        let mesh = planar_grid(4, 4);
        let (a, b) = groups();
        let params = ClusterParams::new();

        let sigma = MapConfig::new()
            .with_iterations(10)
            .with_variance_mode(VarianceMode::Sigma);
        let analysis =
            two_sample_driver(&mesh, &a, &b, &sigma, &params, &Progress::silent(0)).unwrap();
        assert_eq!(analysis.column, 0);
        assert_eq!(analysis.map.column(0).unwrap().name, "T-Sigma");
        assert_eq!(analysis.shuffled.column(0).unwrap().name, "Iteration 1");
        assert_eq!(analysis.report.title, "Sigma T-Test");

        let ranked = MapConfig::new()
            .with_iterations(10)
            .with_data_transform(DataTransform::RankSum);
        let analysis =
            two_sample_driver(&mesh, &a, &b, &ranked, &params, &Progress::silent(0)).unwrap();
        assert_eq!(analysis.report.title, "Rank-Sum T-Test");
        // Every rank lies in 1..=8
        let mean_a = analysis.map.column_values(0).unwrap();
        assert!(mean_a.iter().all(|&m| (1.0..=8.0).contains(&m)));
        // Group A ranks highest on the effect block
        assert_eq!(mean_a[0], 6.5);
    }

    #[test]
    fn two_sample_rejects_bad_inputs() {
        let mesh = planar_grid(4, 4);
        let (a, b) = groups();
        let silent = Progress::silent(0);
        let params = ClusterParams::new();
        assert!(matches!(
            two_sample_driver(&mesh, &a, &b, &MapConfig::new().with_iterations(0), &params, &silent),
            Err(MapError::InvalidInput { .. })
        ));

        let small = planar_grid(3, 3);
        assert!(matches!(
            two_sample_driver(&small, &a, &b, &MapConfig::new().with_iterations(2), &params, &silent),
            Err(MapError::Metric(_))
        ));

        let token = CancelToken::new();
        token.cancel();
        let cancelled = Progress::new(&NoProgress, Some(&token), 0);
        assert!(matches!(
            two_sample_driver(&mesh, &a, &b, &MapConfig::new().with_iterations(4), &params, &cancelled),
            Err(MapError::Cancelled(_))
        ));
    }

    #[test]
    fn one_sample_pipeline() {
        let mesh = planar_grid(4, 4);
        let table = subjects(&[0.1, -0.2, 0.3, -0.1, 0.2], 5.0);
        let config = MapConfig::new().with_iterations(16).with_seed(2);
        let analysis = one_sample_driver(
            &mesh,
            &table,
            0.0,
            &config,
            &ClusterParams::new(),
            &Progress::silent(0),
        )
        .unwrap();

        assert_eq!(analysis.map.column(0).unwrap().name, "T-Values");
        assert_eq!(analysis.shuffled.column_count(), 16);
        assert_eq!(analysis.report.title, "One-Sample T-Test");
        let mut nodes = analysis.report.clusters[0].nodes.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, [0, 1, 4, 5]);
    }
}
