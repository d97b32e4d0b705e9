//! API Regression Tests for the Surface Crate Ecosystem
//!
//! These tests serve as a regression suite to ensure the public API remains
//! stable and consistent across the surface crate ecosystem. They are
//! organized in 4 tiers of increasing complexity:
//!
//! - Tier 1: Foundation (surface-types, surface-stats)
//! - Tier 2: Per-node Data (surface-metric, surface-smooth, surface-geodesic)
//! - Tier 3: Statistical Maps (surface-statmap)
//! - Tier 4: Cluster Significance (surface-cluster, drivers)
//!
//! If any of these tests fail after API changes, it indicates a breaking change
//! that needs documentation in CHANGELOG.md and a version bump.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_precision_loss)]

use approx::assert_relative_eq;
use surface::{cluster, geodesic, metric, prelude::*, smooth, statmap, stats, types};

/// One-row table with a column per value.
fn single_node(values: &[f32]) -> MetricTable {
    let columns = values
        .iter()
        .enumerate()
        .map(|(j, &v)| Column::from_values(format!("c{j}"), vec![v]))
        .collect();
    MetricTable::from_columns(1, columns).unwrap()
}

// =============================================================================
// TIER 1: Foundation - Mesh and Statistics Primitives
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn mesh_construction_and_validation() {
        let coords = vec![
            types::Point3::new(0.0, 0.0, 0.0),
            types::Point3::new(1.0, 0.0, 0.0),
            types::Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = SurfaceMesh::new(coords.clone(), vec![[0, 1, 2]]).unwrap();
        assert_eq!(mesh.node_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.neighbors(0).len(), 2);

        // Repeated vertex and out-of-range index
        assert!(SurfaceMesh::new(coords.clone(), vec![[0, 0, 1]]).is_err());
        assert!(SurfaceMesh::new(coords, vec![[0, 1, 7]]).is_err());
    }

    #[test]
    fn neighbor_adjacency_is_symmetric() {
        let mesh = planar_grid(5, 4);
        for node in 0..mesh.node_count() {
            for &other in mesh.neighbors(node) {
                assert!(mesh.neighbors(other as usize).contains(&(node as u32)));
            }
        }
    }

    #[test]
    fn z_scores_of_one_to_five() {
        let table = single_node(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let z = table.z_map().unwrap();
        let sd = 2.5f64.sqrt();
        let expected = [-2.0 / sd, -1.0 / sd, 0.0, 1.0 / sd, 2.0 / sd];
        for (c, e) in expected.iter().enumerate() {
            assert_relative_eq!(f64::from(z.value(0, c).unwrap()), e, epsilon = 1e-6);
        }
    }

    #[test]
    fn fdr_accepts_two_smallest() {
        let p = [0.001, 0.008, 0.039, 0.041, 0.042, 0.06, 0.074, 0.205];
        let accepted = stats::apply_fdr(&p, 0.05, stats::FdrVariant::C1).unwrap();
        assert_eq!(accepted[0], 0.001);
        assert_eq!(accepted[1], 0.008);
        assert!(accepted[2..].iter().all(|&v| v == -1.0));
    }

    #[test]
    fn two_sample_t_test_primitive() {
        let test = stats::two_sample_t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], false).unwrap();
        assert_relative_eq!(test.t, -3.674_234_614, epsilon = 1e-6);
        assert_relative_eq!(test.dof, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn cancellation_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        let progress = Progress::new(&types::NoProgress, Some(&token), 10);
        assert!(progress.check(0).is_err());
    }
}

// =============================================================================
// TIER 2: Per-node Data - Tables, Smoothing, Geodesics
// =============================================================================

mod tier2_per_node_data {
    use super::*;

    #[test]
    fn geodesic_tetrahedron_distances() {
        let mesh = corner_tetrahedron();
        let mut engine = GeodesicEngine::new(&mesh, GeodesicParams::new()).unwrap();

        let from_0 = engine.single_source(0).unwrap();
        assert_eq!(from_0.distances(), [0.0, 1.0, 1.0, 1.0]);

        let from_1 = engine.single_source(1).unwrap();
        let root2 = 2f64.sqrt();
        assert_relative_eq!(from_1.distance(0).unwrap(), 1.0);
        assert_relative_eq!(from_1.distance(1).unwrap(), 0.0);
        assert_relative_eq!(from_1.distance(2).unwrap(), root2, epsilon = 1e-12);
        assert_relative_eq!(from_1.distance(3).unwrap(), root2, epsilon = 1e-12);
        assert_eq!(from_1.path_to(2).unwrap(), [1, 2]);
    }

    #[test]
    fn geodesic_all_pairs_layout() {
        let mesh = corner_tetrahedron();
        let mut engine = GeodesicEngine::new(&mesh, GeodesicParams::new()).unwrap();
        let matrix = engine.all_pairs(&Progress::silent(0)).unwrap();
        assert_eq!(matrix.len(), 16);
        assert_eq!(matrix[0], 0.0);
        assert_eq!(matrix[4], 1.0);
        assert_relative_eq!(matrix[4 + 2], 2f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn geodesic_unreachable_nodes() {
        // Two disjoint triangles
        let coords = (0..6)
            .map(|i| types::Point3::new(f64::from(i), f64::from(i % 2), 0.0))
            .collect();
        let mesh = SurfaceMesh::new(coords, vec![[0, 1, 2], [3, 4, 5]]).unwrap();
        let mut engine = GeodesicEngine::new(&mesh, GeodesicParams::new()).unwrap();
        let tree = engine.single_source(0).unwrap();
        assert_eq!(tree.distances()[4], geodesic::UNREACHABLE);
        assert_eq!(tree.reached_count(), 3);
    }

    #[test]
    fn smoothing_constant_column_is_fixed_point() {
        let mesh = planar_grid(6, 5);
        let mut values = vec![7.0f32; mesh.node_count()];
        let params = SmoothingParams::new().with_strength(1.0).with_iterations(100);
        smooth_column(&mesh, &mut values, &params, None).unwrap();
        for v in values {
            assert!((v - 7.0).abs() <= 1e-6);
        }
    }

    #[test]
    fn smoothing_rejects_bad_strength() {
        let mesh = planar_grid(2, 2);
        let mut values = vec![1.0f32; 4];
        let params = SmoothingParams::new().with_strength(1.5);
        assert!(matches!(
            smooth_column(&mesh, &mut values, &params, None),
            Err(smooth::SmoothError::InvalidStrength { .. })
        ));
    }

    #[test]
    fn column_algebra_and_aggregation() {
        let mut table = MetricTable::from_columns(
            2,
            vec![
                Column::from_values("a", vec![1.0, 4.0]),
                Column::from_values("b", vec![3.0, 0.0]),
            ],
        )
        .unwrap();
        table
            .binary_op(metric::BinaryOp::Divide, 0, 1, metric::OutputColumn::New, "a/b")
            .unwrap();
        assert_relative_eq!(table.value(0, 2).unwrap(), 1.0 / 3.0);
        // Division by zero yields zero
        assert_eq!(table.value(1, 2).unwrap(), 0.0);

        table
            .aggregate(&[0, 1], &[metric::AggregateRequest::new(metric::Aggregate::Mean)])
            .unwrap();
        let mean = table.column_index("Mean").unwrap();
        assert_eq!(table.value(0, mean).unwrap(), 2.0);
        assert_eq!(table.value(1, mean).unwrap(), 2.0);
    }

    #[test]
    fn ascii_file_round_trip() {
        let mut table = MetricTable::from_columns(
            3,
            vec![
                Column::from_values("thickness", vec![1.5, -2.25, 0.0]).with_comment("left"),
                Column::from_values("depth", vec![3.0, 4.0, f32::MAX]),
            ],
        )
        .unwrap();
        table.set_title("round trip");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.metric");
        let mut file = std::fs::File::create(&path).unwrap();
        metric::io::write_ascii(&table, &mut file).unwrap();
        drop(file);

        let mut reader = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
        let back = metric::io::read(&mut reader).unwrap();
        assert_eq!(back.node_count(), 3);
        assert_eq!(back.title(), "round trip");
        assert_eq!(back.column(0).unwrap().comment, "left");
        assert_eq!(back.column_values(1).unwrap(), table.column_values(1).unwrap());
    }
}

// =============================================================================
// TIER 3: Statistical Maps
// =============================================================================

mod tier3_statistical_maps {
    use super::*;

    fn tetra_groups(a: &[f32], b: &[f32]) -> (MetricTable, MetricTable) {
        let group = |values: &[f32]| {
            let columns = values
                .iter()
                .enumerate()
                .map(|(j, &v)| Column::from_values(format!("s{j}"), vec![v; 4]))
                .collect();
            MetricTable::from_columns(4, columns).unwrap()
        };
        (group(a), group(b))
    }

    #[test]
    fn unpooled_and_pooled_t_maps() {
        let mesh = corner_tetrahedron();
        let (a, b) = tetra_groups(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);

        let unpooled = t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();
        let t = unpooled.value(0, statmap::T_COLUMN).unwrap();
        assert_relative_eq!(t, -3.674_234_6, epsilon = 1e-5);
        assert_eq!(unpooled.value(0, 0).unwrap(), 2.0);
        assert_eq!(unpooled.value(0, 1).unwrap(), 5.0);

        let pooled = t_map(&mesh, &a, &b, &MapConfig::new().with_pooled_variance(true)).unwrap();
        assert_relative_eq!(pooled.value(0, statmap::T_COLUMN).unwrap(), t, epsilon = 1e-6);
    }

    #[test]
    fn optional_columns_and_fdr_variant() {
        let mesh = corner_tetrahedron();
        let (a, b) = tetra_groups(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let config = MapConfig::new()
            .with_outputs(true, false, true)
            .with_fdr(0.05, stats::FdrVariant::CSum);
        let map = t_map(&mesh, &a, &b, &config).unwrap();
        let names: Vec<_> = map.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Mean-A", "Mean-B", "T", "DOF", "P", "FDR-CSum"]);
    }

    #[test]
    fn rank_sum_ranks() {
        let (a, b) = tetra_groups(&[1.0, 10.0, 100.0], &[2.0, 20.0, 200.0]);
        let (ra, rb) = statmap::rank_transform_pair(&a, &b).unwrap();
        assert_eq!(ra.row(0).unwrap(), [1.0, 3.0, 5.0]);
        assert_eq!(rb.row(0).unwrap(), [2.0, 4.0, 6.0]);

        let mesh = corner_tetrahedron();
        let map = statmap::rank_sum_t_map(&mesh, &a, &b, &MapConfig::new()).unwrap();
        // Ranks {1,3,5} against {2,4,6}: difference -1, both variances 4
        let expected = -1.0 / (8.0f64 / 3.0).sqrt();
        assert_relative_eq!(
            f64::from(map.value(0, statmap::T_COLUMN).unwrap()),
            expected,
            epsilon = 1e-6
        );
    }

    #[test]
    fn shuffled_map_column_names() {
        let mesh = corner_tetrahedron();
        let (a, _) = tetra_groups(&[1.0, 2.0, 3.0, 4.0], &[]);
        let config = MapConfig::new().with_iterations(3).with_seed(9);
        let map = statmap::shuffled_t_map(&mesh, &a, &config, &Progress::silent(0)).unwrap();
        assert_eq!(map.column_count(), 3);
        assert_eq!(map.column(2).unwrap().name, "T-Test iteration 2");
    }

    #[test]
    fn row_wise_maps() {
        let x = single_node(&[1.0, 2.0, 3.0, 4.0]);
        let y = single_node(&[2.0, 4.1, 5.9, 8.0]);
        let r = statmap::correlation_map(&x, &y).unwrap();
        assert!(r.value(0, 0).unwrap() > 0.99);

        let fit = statmap::regression_map(&y, &[&x]).unwrap();
        assert!(fit.value(0, 0).unwrap() > 0.99);

        let levene = statmap::levene_map(&[&x, &y]).unwrap();
        assert_eq!(levene.column(0).unwrap().name, "Levene-F");
        assert_eq!(levene.value(0, 1).unwrap(), 1.0);
        assert_eq!(levene.value(0, 2).unwrap(), 6.0);
    }

    #[test]
    fn map_errors_are_typed() {
        let mesh = corner_tetrahedron();
        let (a, b) = tetra_groups(&[1.0, 2.0], &[3.0, 4.0]);
        let bad = MapConfig::new().with_fdr(1.5, stats::FdrVariant::C1);
        assert!(matches!(
            t_map(&mesh, &a, &b, &bad),
            Err(statmap::MapError::InvalidInput { .. })
        ));
        assert!(matches!(
            t_map(&planar_grid(3, 3), &a, &b, &MapConfig::new()),
            Err(statmap::MapError::Metric(_))
        ));
    }
}

// =============================================================================
// TIER 4: Cluster Significance
// =============================================================================

mod tier4_cluster_significance {
    use super::*;

    #[test]
    fn significant_area_and_p_value() {
        let sorted = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert_eq!(cluster::significant_area(&sorted, 0.4), 8.0);
        assert_eq!(cluster::significant_area(&sorted, 0.0), 10.0);
        assert_eq!(cluster::cluster_p_value(&sorted, 7.0), 0.4);
    }

    #[test]
    fn driver_report_renders() {
        let mesh = planar_grid(4, 4);
        let subject = |offset: f32, bump: f32| {
            let values = (0..16)
                .map(|node| if node < 2 { offset + bump } else { offset })
                .collect();
            Column::from_values("subject", values)
        };
        let a = MetricTable::from_columns(
            16,
            vec![subject(0.1, 5.0), subject(-0.2, 5.0), subject(0.15, 5.0)],
        )
        .unwrap();
        let b = MetricTable::from_columns(
            16,
            vec![subject(0.2, 0.0), subject(-0.1, 0.0), subject(-0.05, 0.0)],
        )
        .unwrap();

        let config = MapConfig::new().with_iterations(12).with_seed(4);
        let analysis = two_sample_driver(
            &mesh,
            &a,
            &b,
            &config,
            &ClusterParams::new(),
            &Progress::silent(0),
        )
        .unwrap();

        let report = analysis.report.to_string();
        assert!(report.contains("Significant Area:"));
        assert!(report.contains("Iterations:          12"));
        assert!(report.contains("Num-Nodes"));
        assert_eq!(analysis.report.clusters[0].node_count(), 2);

        let table = analysis
            .report
            .cluster_table(&analysis.map, analysis.column)
            .unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.value(15, 0).unwrap(), 0.0);
    }
}
