//! Permutation-based cluster significance.
//!
//! Each column of a shuffled map contributes its largest corrected cluster
//! area (0 when it has none). With those `R` maxima sorted descending as `S`:
//!
//! ```text
//! significant area = S[clamp(ceil(α·R) - 1, 0, R - 1)]
//! cluster p-value  = |{ s in S : s > area }| / R
//! ```

use rayon::prelude::*;
use surface_metric::MetricTable;
use surface_types::SurfaceMesh;
use tracing::{debug, info};

use crate::cluster::{Cluster, components, sort_largest_first};
use crate::error::{ClusterError, ClusterResult};
use crate::params::ClusterParams;

/// Largest cluster of every column of `shuffled`, largest first.
///
/// Columns without any active node contribute nothing.
///
/// # Errors
///
/// - [`ClusterError::NodeCountMismatch`] if the map does not fit the mesh
/// - [`ClusterError::InvalidInput`] for invalid parameters
pub fn largest_clusters(
    mesh: &SurfaceMesh,
    shuffled: &MetricTable,
    params: &ClusterParams,
) -> ClusterResult<Vec<Cluster>> {
    let n = mesh.node_count();
    params.validate(n)?;
    if shuffled.node_count() != n {
        return Err(ClusterError::NodeCountMismatch {
            expected: n,
            actual: shuffled.node_count(),
        });
    }
    let areas = mesh.node_areas();

    info!(columns = shuffled.column_count(), "Finding largest shuffled clusters");
    let mut largest: Vec<Cluster> = shuffled
        .columns()
        .par_iter()
        .enumerate()
        .filter_map(|(index, column)| {
            let mut found = components(mesh, &areas, column.values(), index + 1, params);
            sort_largest_first(&mut found);
            found.into_iter().next()
        })
        .collect();
    sort_largest_first(&mut largest);
    info!(clusters = largest.len(), "Largest shuffled clusters found");
    Ok(largest)
}

/// Largest corrected cluster area per column of `shuffled`, sorted
/// descending. Columns without clusters contribute 0.
///
/// # Errors
///
/// Same as [`largest_clusters`].
pub fn largest_cluster_areas(
    mesh: &SurfaceMesh,
    shuffled: &MetricTable,
    params: &ClusterParams,
) -> ClusterResult<Vec<f64>> {
    let mut areas = vec![0.0; shuffled.column_count()];
    for cluster in largest_clusters(mesh, shuffled, params)? {
        areas[cluster.column - 1] = cluster.corrected_area;
    }
    areas.sort_by(|a: &f64, b| b.total_cmp(a));
    Ok(areas)
}

/// Corrected area a cluster must reach at significance level `alpha`.
///
/// `sorted_areas` must be sorted descending; an empty list gives 0.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn significant_area(sorted_areas: &[f64], alpha: f64) -> f64 {
    if sorted_areas.is_empty() {
        return 0.0;
    }
    let r = sorted_areas.len();
    // Truncation: α·R is a small non-negative count
    let rank = (alpha * r as f64).ceil().max(0.0) as usize;
    sorted_areas[rank.saturating_sub(1).min(r - 1)]
}

/// Fraction of shuffled maxima strictly larger than `area`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster_p_value(sorted_areas: &[f64], area: f64) -> f64 {
    if sorted_areas.is_empty() {
        return 0.0;
    }
    let larger = sorted_areas.iter().filter(|&&s| s > area).count();
    larger as f64 / sorted_areas.len() as f64
}

/// Set the p-value of every cluster from the shuffled maxima.
pub fn assign_p_values(clusters: &mut [Cluster], sorted_areas: &[f64]) {
    for cluster in clusters.iter_mut() {
        cluster.p_value = cluster_p_value(sorted_areas, cluster.corrected_area);
    }
    debug!(clusters = clusters.len(), "Cluster p-values assigned");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surface_metric::Column;
    use surface_types::planar_grid;

    #[test]
    fn significant_area_index() {
        let s = [10.0, 8.0, 6.0, 4.0, 2.0, 1.0, 0.5, 0.25, 0.0, 0.0];
        // ceil(0.05 * 10) - 1 = 0
        assert_eq!(significant_area(&s, 0.05), 10.0);
        // ceil(0.25 * 10) - 1 = 2
        assert_eq!(significant_area(&s, 0.25), 6.0);
        assert_eq!(significant_area(&s, 1.0), 0.0);
        assert_eq!(significant_area(&s, 0.0), 10.0);
        assert_eq!(significant_area(&[], 0.05), 0.0);
    }

    #[test]
    fn p_value_counts_strictly_larger() {
        let s = [10.0, 8.0, 6.0, 4.0];
        assert_eq!(cluster_p_value(&s, 11.0), 0.0);
        assert_eq!(cluster_p_value(&s, 8.0), 0.25);
        assert_eq!(cluster_p_value(&s, 5.0), 0.5);
        assert_eq!(cluster_p_value(&s, 0.0), 1.0);
    }

    #[test]
    fn largest_area_per_column() {
        let mesh = planar_grid(3, 3);
        let mut big = vec![0.0f32; 9];
        big[..6].fill(5.0);
        let mut small = vec![0.0f32; 9];
        small[6] = -5.0;
        let shuffled = MetricTable::from_columns(
            9,
            vec![
                Column::from_values("Iteration 1", small),
                Column::from_values("Iteration 2", vec![0.0; 9]),
                Column::from_values("Iteration 3", big),
            ],
        )
        .unwrap();
        let params = ClusterParams::new();

        let clusters = largest_clusters(&mesh, &shuffled, &params).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].column, 3);
        assert_eq!(clusters[1].column, 1);

        let areas = largest_cluster_areas(&mesh, &shuffled, &params).unwrap();
        assert_eq!(areas.len(), 3);
        assert!(areas[0] > areas[1]);
        assert_eq!(areas[2], 0.0);
        // Corner node 6 touches one triangle: 0.5 / 3
        assert_relative_eq!(areas[1], 0.5 / 3.0, epsilon = 1e-9);
    }
}
