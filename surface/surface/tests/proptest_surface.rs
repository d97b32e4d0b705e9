//! Property-based tests for surface analysis.
//!
//! These tests use proptest to generate random grids, tables and p-values
//! and verify invariants of geodesics, tables and statistical maps.
//!
//! Run with: cargo test -p surface -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use surface::geodesic::UNREACHABLE;
use surface::metric::io::{read, write_ascii};
use surface::prelude::*;
use surface::stats::{FdrVariant, Permutation, apply_fdr, average_ranks, permute};
use surface::statmap::T_COLUMN;

// =============================================================================
// Strategies
// =============================================================================

/// Grid dimensions that keep all-pairs searches cheap.
fn arb_grid() -> impl Strategy<Value = SurfaceMesh> {
    (2usize..6, 2usize..6).prop_map(|(cols, rows)| planar_grid(cols, rows))
}

/// Table of `columns` random columns over `nodes` nodes.
fn arb_table(nodes: usize, columns: usize) -> impl Strategy<Value = MetricTable> {
    prop::collection::vec(prop::collection::vec(-100.0f32..100.0, nodes), columns).prop_map(
        move |data| {
            let columns = data
                .into_iter()
                .enumerate()
                .map(|(j, values)| Column::from_values(format!("column {j}"), values))
                .collect();
            MetricTable::from_columns(nodes, columns).unwrap()
        },
    )
}

fn all_pairs(mesh: &SurfaceMesh) -> Vec<f32> {
    let mut engine = GeodesicEngine::new(mesh, GeodesicParams::new()).unwrap();
    engine.all_pairs(&Progress::silent(0)).unwrap()
}

// =============================================================================
// Geodesics
// =============================================================================

proptest! {
    #[test]
    fn proptest_geodesic_non_negative(mesh in arb_grid(), smoothed in any::<bool>()) {
        let mut engine =
            GeodesicEngine::new(&mesh, GeodesicParams::new().with_smoothed(smoothed)).unwrap();
        for source in 0..mesh.node_count() {
            let tree = engine.single_source(source).unwrap();
            for &d in tree.distances() {
                prop_assert!(d >= 0.0 || d == UNREACHABLE);
            }
        }
    }

    #[test]
    fn proptest_geodesic_symmetric(mesh in arb_grid()) {
        let n = mesh.node_count();
        let d = all_pairs(&mesh);
        for u in 0..n {
            for v in 0..n {
                prop_assert!((d[u * n + v] - d[v * n + u]).abs() <= 1e-4);
            }
        }
    }

    #[test]
    fn proptest_geodesic_triangle_inequality(mesh in arb_grid()) {
        let n = mesh.node_count();
        let d = all_pairs(&mesh);
        for u in 0..n {
            for v in 0..n {
                for w in 0..n {
                    prop_assert!(d[u * n + v] <= d[u * n + w] + d[w * n + v] + 1e-4);
                }
            }
        }
    }
}

// =============================================================================
// Tables and primitives
// =============================================================================

proptest! {
    #[test]
    fn proptest_ascii_round_trip(table in arb_table(7, 3), title in "[a-z]{1,12}") {
        let mut table = table;
        table.set_title(title);
        let mut bytes = Vec::new();
        write_ascii(&table, &mut bytes).unwrap();
        let back = read(&mut bytes.as_slice()).unwrap();
        prop_assert_eq!(back.title(), table.title());
        prop_assert_eq!(back.column_count(), table.column_count());
        for c in 0..table.column_count() {
            let original = table.column(c).unwrap();
            let parsed = back.column(c).unwrap();
            prop_assert_eq!(&parsed.name, &original.name);
            for (a, b) in parsed.values().iter().zip(original.values()) {
                prop_assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn proptest_ranks_of_ties(value in -50.0f32..50.0, len in 1usize..20) {
        let ranks = average_ranks(&vec![value; len]);
        let expected = (len as f32 + 1.0) / 2.0;
        for r in ranks {
            prop_assert_eq!(r, expected);
        }
    }

    #[test]
    fn proptest_permutation_keeps_values(
        values in prop::collection::vec(-10.0f32..10.0, 0..40),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut shuffled = values.clone();
        permute(&mut shuffled, Permutation::Shuffle, &mut rng);

        let mut before = values;
        before.sort_by(f32::total_cmp);
        shuffled.sort_by(f32::total_cmp);
        prop_assert_eq!(before, shuffled);
    }

    #[test]
    fn proptest_fdr_monotone_in_q(
        p in prop::collection::vec(0.0f32..1.0, 1..30),
        q1 in 0.01f64..0.5,
        extra in 0.0f64..0.45,
    ) {
        let q2 = q1 + extra;
        for variant in [FdrVariant::C1, FdrVariant::CSum] {
            let strict = apply_fdr(&p, q1, variant).unwrap();
            let loose = apply_fdr(&p, q2, variant).unwrap();
            for (s, l) in strict.iter().zip(&loose) {
                if *s >= 0.0 {
                    prop_assert!(*l >= 0.0);
                }
            }
        }
    }
}

// =============================================================================
// Maps and smoothing
// =============================================================================

proptest! {
    #[test]
    fn proptest_t_map_swap_symmetry(
        a in arb_table(9, 3),
        b in arb_table(9, 4),
        pooled in any::<bool>(),
    ) {
        let mesh = planar_grid(3, 3);
        let config = MapConfig::new().with_pooled_variance(pooled).with_outputs(false, true, false);
        let ab = t_map(&mesh, &a, &b, &config).unwrap();
        let ba = t_map(&mesh, &b, &a, &config).unwrap();
        let p = ab.column_index("P").unwrap();
        for node in 0..9 {
            let t_ab = ab.value(node, T_COLUMN).unwrap();
            let t_ba = ba.value(node, T_COLUMN).unwrap();
            prop_assert_eq!(t_ab, -t_ba);
            prop_assert!((ab.value(node, p).unwrap() - ba.value(node, p).unwrap()).abs() <= 1e-6);
        }
    }

    #[test]
    fn proptest_smoothing_constant_fixed_point(
        mesh in arb_grid(),
        value in -1000.0f32..1000.0,
        strength in 0.0f32..=1.0,
        iterations in 0usize..30,
    ) {
        let mut values = vec![value; mesh.node_count()];
        let params = SmoothingParams::new().with_strength(strength).with_iterations(iterations);
        smooth_column(&mesh, &mut values, &params, None).unwrap();
        let tolerance = value.abs().max(1.0) * 1e-6;
        for v in values {
            prop_assert!((v - value).abs() <= tolerance);
        }
    }
}
