//! Permutation null maps: shuffled-column t-maps and sign-flipped
//! one-sample t-maps.

use rand::seq::SliceRandom;
use surface_metric::{Column, MetricTable};
use surface_stats::random_signs;
use surface_types::{Progress, SurfaceMesh};
use tracing::info;

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::iterate::permutation_columns;
use crate::moments::{NodeMoments, check_fits, column_slices, require_columns, to_f32};
use crate::tmap::two_sample_columns;

/// Size of synthetic group A for a table of `k` columns.
fn group_1_size(config: &MapConfig, k: usize) -> MapResult<usize> {
    let g = match usize::try_from(config.group_1_size) {
        Ok(g) if g > 0 => g,
        _ => k / 2,
    };
    if g >= k {
        return Err(MapError::invalid_input(format!(
            "group 1 size {g} must be smaller than the column count {k}"
        )));
    }
    Ok(g)
}

/// Null distribution of two-sample t-maps built by shuffling columns.
///
/// Iteration `r` draws a random order of the `K` columns, treats the first
/// `g` as group A and the rest as group B, and stores the `T` column of
/// their t-map as output column `r`, named `T-Test iteration r`. A
/// `group_1_size` of 0 or less splits the columns in half.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for fewer than two columns, `g >= K`, zero
///   iterations or another invalid configuration
/// - [`MapError::Metric`] if the table does not fit the mesh
/// - [`MapError::Cancelled`] when `progress` asks to stop
pub fn shuffled_t_map(
    mesh: &SurfaceMesh,
    table: &MetricTable,
    config: &MapConfig,
    progress: &Progress<'_>,
) -> MapResult<MetricTable> {
    config.validate_permutation()?;
    check_fits(mesh, table)?;
    require_columns(table, 2, "shuffled t-map")?;
    let k = table.column_count();
    let g = group_1_size(config, k)?;

    info!(
        nodes = mesh.node_count(),
        columns = k,
        group_1 = g,
        iterations = config.iterations,
        "Computing shuffled t-map"
    );
    let columns = column_slices(table);
    let names = |order: &[usize]| {
        order
            .iter()
            .map(|&i| table.columns()[i].name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    let shuffled = permutation_columns(config.iterations, config.seed, progress, |r, rng| {
        let mut order: Vec<usize> = (0..k).collect();
        order.shuffle(rng);
        let (first, second) = order.split_at(g);
        let a: Vec<&[f32]> = first.iter().map(|&i| columns[i]).collect();
        let b: Vec<&[f32]> = second.iter().map(|&i| columns[i]).collect();
        let t = two_sample_columns(mesh, &a, &b, config, false)?.t;
        Ok(Column::from_values(format!("T-Test iteration {r}"), t)
            .with_comment(format!("T-Test on {} versus {}", names(first), names(second)))
            .with_color_mapping(-5.0, 5.0))
    })?;

    let mut map = MetricTable::from_columns(mesh.node_count(), shuffled)?;
    map.set_file_comment(format!(
        "Shuffled columns t-map, {} iterations, group A of {g} columns",
        config.iterations
    ));
    info!(columns = map.column_count(), "Shuffled t-map done");
    Ok(map)
}

/// One-sample t statistic per node against the constant `mu`, with each
/// column optionally sign-flipped.
fn one_sample_column(
    mesh: &SurfaceMesh,
    columns: &[&[f32]],
    signs: Option<&[f32]>,
    mu: f32,
    config: &MapConfig,
) -> MapResult<Vec<f32>> {
    let mut moments = NodeMoments::of(columns, signs, mesh.node_count());
    moments.smooth_variances(mesh, config)?;

    #[allow(clippy::cast_precision_loss)]
    let sqrt_k = (columns.len() as f64).sqrt();
    Ok(moments
        .means
        .iter()
        .zip(&moments.variances)
        .map(|(&mean, &variance)| {
            let denom = variance.sqrt() / sqrt_k;
            let mut t = mean - f64::from(mu);
            if denom != 0.0 {
                t /= denom;
            }
            to_f32(t)
        })
        .collect())
}

/// One-sample t statistic of every node against the constant `mu`.
///
/// The result has one column, `T-Values`:
/// `t = (mean - mu) / (s / sqrt(K))`, left as `mean - mu` where `s` is
/// zero. The variance `s²` is smoothed over the mesh when configured.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for fewer than two columns or an invalid
///   configuration
/// - [`MapError::Metric`] if the table does not fit the mesh
pub fn one_sample_t_values(
    mesh: &SurfaceMesh,
    table: &MetricTable,
    mu: f32,
    config: &MapConfig,
) -> MapResult<MetricTable> {
    config.validate()?;
    check_fits(mesh, table)?;
    require_columns(table, 2, "one-sample t-map")?;

    info!(nodes = mesh.node_count(), columns = table.column_count(), mu, "Computing t-values");
    let t = one_sample_column(mesh, &column_slices(table), None, mu, config)?;
    let mut map = MetricTable::new(mesh.node_count());
    map.set_file_comment(format!("T-values against {mu}"));
    map.add_column(Column::from_values("T-Values", t).with_color_mapping(-5.0, 5.0))?;
    Ok(map)
}

/// Null distribution of one-sample t-maps built by random sign flips.
///
/// Iteration `r` multiplies every column by an independent random sign and
/// stores the resulting t-values as column `Permuted T-Values r`.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for fewer than two columns, zero
///   iterations or an invalid configuration
/// - [`MapError::Metric`] if the table does not fit the mesh
/// - [`MapError::Cancelled`] when `progress` asks to stop
pub fn permuted_sign_flip_t_map(
    mesh: &SurfaceMesh,
    table: &MetricTable,
    mu: f32,
    config: &MapConfig,
    progress: &Progress<'_>,
) -> MapResult<MetricTable> {
    config.validate_permutation()?;
    check_fits(mesh, table)?;
    require_columns(table, 2, "sign-flip t-map")?;
    let k = table.column_count();

    info!(
        nodes = mesh.node_count(),
        columns = k,
        iterations = config.iterations,
        "Computing sign-flip permuted t-map"
    );
    let columns = column_slices(table);
    let flipped = permutation_columns(config.iterations, config.seed, progress, |r, rng| {
        let signs = random_signs(k, rng);
        let t = one_sample_column(mesh, &columns, Some(&signs), mu, config)?;
        Ok(Column::from_values(format!("Permuted T-Values {r}"), t).with_color_mapping(-5.0, 5.0))
    })?;

    let mut map = MetricTable::from_columns(mesh.node_count(), flipped)?;
    map.set_file_comment(format!(
        "Sign flipped permuted t-values against {mu}, {} iterations",
        config.iterations
    ));
    info!(columns = map.column_count(), "Sign-flip permuted t-map done");
    Ok(map)
}
