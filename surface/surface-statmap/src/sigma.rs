//! Mean-difference maps scaled by the spread of a shuffled null.
//!
//! The real map holds `|mean_A - mean_B|` per node. The null map repeats
//! that on tables whose columns were shuffled across `A` and `B`. Both are
//! then divided, node by node, by the population standard deviation of the
//! null values at that node, where that deviation is non-zero.

use surface_metric::{Column, MetricTable};
use surface_stats::MeanVariance;
use surface_types::{Progress, SurfaceMesh};
use tracing::info;

use crate::config::MapConfig;
use crate::error::MapResult;
use crate::iterate::permutation_columns;
use crate::moments::{NodeMoments, check_fits, column_slices, require_columns, to_f32};

/// Real and null maps of a sigma-scaled comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaMaps {
    /// `T-Sigma`, `Group A Mean`, `Group B Mean`.
    pub map: MetricTable,
    /// One scaled mean difference per iteration, `Iteration 1` onwards.
    pub shuffled: MetricTable,
}

fn abs_mean_difference(
    a: &[&[f32]],
    b: &[&[f32]],
    node_count: usize,
) -> (Vec<f64>, NodeMoments, NodeMoments) {
    let ma = NodeMoments::of(a, None, node_count);
    let mb = NodeMoments::of(b, None, node_count);
    let diff = ma
        .means
        .iter()
        .zip(&mb.means)
        .map(|(x, y)| (x - y).abs())
        .collect();
    (diff, ma, mb)
}

/// Sigma-scaled mean difference of `a` and `b` with its shuffled null.
///
/// # Errors
///
/// - [`MapError::InvalidInput`](crate::MapError::InvalidInput) for an
///   empty group, zero iterations or an invalid configuration
/// - [`MapError::Metric`](crate::MapError::Metric) if a table does not fit
///   the mesh
/// - [`MapError::Cancelled`](crate::MapError::Cancelled) when `progress`
///   asks to stop
pub fn sigma_t_map(
    mesh: &SurfaceMesh,
    a: &MetricTable,
    b: &MetricTable,
    config: &MapConfig,
    progress: &Progress<'_>,
) -> MapResult<SigmaMaps> {
    config.validate_permutation()?;
    check_fits(mesh, a)?;
    check_fits(mesh, b)?;
    require_columns(a, 1, "group A")?;
    require_columns(b, 1, "group B")?;
    let n = mesh.node_count();

    info!(
        nodes = n,
        columns_a = a.column_count(),
        columns_b = b.column_count(),
        iterations = config.iterations,
        "Computing sigma t-map"
    );
    let (mut t_sigma, mean_a, mean_b) =
        abs_mean_difference(&column_slices(a), &column_slices(b), n);

    let null = permutation_columns(config.iterations, config.seed, progress, |r, rng| {
        let mut sa = a.clone();
        let mut sb = b.clone();
        MetricTable::shuffle_across(&mut [&mut sa, &mut sb], rng)?;
        let (diff, _, _) = abs_mean_difference(&column_slices(&sa), &column_slices(&sb), n);
        Ok(Column::from_values(
            format!("Iteration {}", r + 1),
            diff.into_iter().map(to_f32).collect(),
        ))
    })?;

    let mut row = Vec::with_capacity(null.len());
    let spread: Vec<f64> = (0..n)
        .map(|node| {
            row.clear();
            row.extend(null.iter().map(|c| c.values()[node]));
            MeanVariance::of(&row).std_dev()
        })
        .collect();
    let scale = |node: usize, v: f64| {
        if spread[node] == 0.0 {
            v
        } else {
            v / spread[node]
        }
    };
    for (node, v) in t_sigma.iter_mut().enumerate() {
        *v = scale(node, *v);
    }
    let null: Vec<Column> = null
        .into_iter()
        .map(|c| {
            let values = c
                .values()
                .iter()
                .enumerate()
                .map(|(node, &v)| to_f32(scale(node, f64::from(v))))
                .collect();
            Column::from_values(c.name, values)
        })
        .collect();

    let mut map = MetricTable::new(n);
    map.set_file_comment("Mean difference divided by the shuffled standard deviation");
    map.add_column(Column::from_values(
        "T-Sigma",
        t_sigma.into_iter().map(to_f32).collect(),
    ))?;
    map.add_column(Column::from_values(
        "Group A Mean",
        mean_a.means.into_iter().map(to_f32).collect(),
    ))?;
    map.add_column(Column::from_values(
        "Group B Mean",
        mean_b.means.into_iter().map(to_f32).collect(),
    ))?;

    let mut shuffled = MetricTable::from_columns(n, null)?;
    shuffled.set_file_comment(format!(
        "Shuffled sigma map, {} iterations",
        config.iterations
    ));
    info!("Sigma t-map done");
    Ok(SigmaMaps { map, shuffled })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surface_types::corner_tetrahedron;

    fn group(values: &[f32]) -> MetricTable {
        let columns = values
            .iter()
            .enumerate()
            .map(|(j, &v)| Column::from_values(format!("c{j}"), vec![v, v, 2.0 * v, 0.0]))
            .collect();
        MetricTable::from_columns(4, columns).unwrap()
    }

    #[test]
    fn layout_and_scaling() {
        let mesh = corner_tetrahedron();
        let a = group(&[1.0, 2.0, 3.0]);
        let b = group(&[4.0, 5.0, 6.0]);
        let config = MapConfig::new().with_iterations(20).with_seed(1);
        let maps = sigma_t_map(&mesh, &a, &b, &config, &Progress::silent(0)).unwrap();

        let names: Vec<_> = maps.map.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["T-Sigma", "Group A Mean", "Group B Mean"]);
        assert_eq!(maps.shuffled.column_count(), 20);
        assert_eq!(maps.shuffled.column(0).unwrap().name, "Iteration 1");
        assert_eq!(maps.shuffled.column(19).unwrap().name, "Iteration 20");
        assert_eq!(maps.map.value(0, 1).unwrap(), 2.0);
        assert_eq!(maps.map.value(0, 2).unwrap(), 5.0);

        // Node 0 null values were divided by their own population sd
        let null: Vec<f32> = (0..20).map(|c| maps.shuffled.value(0, c).unwrap()).collect();
        let sd = MeanVariance::of(&null).std_dev();
        if sd > 0.0 {
            assert_relative_eq!(sd, 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn zero_spread_leaves_values() {
        let mesh = corner_tetrahedron();
        let a = group(&[1.0, 2.0]);
        let b = group(&[4.0, 5.0]);
        let config = MapConfig::new().with_iterations(5);
        let maps = sigma_t_map(&mesh, &a, &b, &config, &Progress::silent(0)).unwrap();
        // Node 3 is zero in every column, so the null has no spread there
        assert_eq!(maps.map.value(3, 0).unwrap(), 0.0);
        for c in 0..5 {
            assert_eq!(maps.shuffled.value(3, c).unwrap(), 0.0);
        }
    }

    #[test]
    fn reproducible_for_a_seed() {
        let mesh = corner_tetrahedron();
        let a = group(&[1.0, 2.0, 7.0]);
        let b = group(&[4.0, 5.0]);
        let config = MapConfig::new().with_iterations(6).with_seed(42);
        let first = sigma_t_map(&mesh, &a, &b, &config, &Progress::silent(0)).unwrap();
        let second = sigma_t_map(&mesh, &a, &b, &config, &Progress::silent(0)).unwrap();
        assert_eq!(first, second);
    }
}
