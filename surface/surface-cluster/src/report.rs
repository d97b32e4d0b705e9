//! Cluster significance analysis and its text report.
//!
//! The report lists the run parameters, then the clusters whose corrected
//! area reaches the significant area, then every cluster:
//!
//! ```text
//! Negative Threshold:  -2
//! Positive Threshold:  2
//! Iterations:          1000
//! P-Value:             0.05
//! Significant Area:    12.5
//!
//! Column    Thresh  Num-Nodes          Area  Area-Corrected     COG-X     COG-Y     COG-Z   P-Value
//!      3     2.000         14     10.000000       20.000000     1.000     2.000     3.000  0.010000
//! ```

use std::fmt::{self, Write as _};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use surface_metric::{Column, MetricTable};
use surface_types::SurfaceMesh;
use tracing::info;

use crate::cluster::{Cluster, find_clusters};
use crate::error::ClusterResult;
use crate::params::ClusterParams;
use crate::significance::{assign_p_values, largest_clusters, significant_area};

const HEADER: &str = "Column    Thresh  Num-Nodes          Area  Area-Corrected     COG-X     COG-Y     COG-Z   P-Value";

/// Clusters of a statistical map scored against a shuffled null map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterReport {
    /// Kind of test that produced the maps, shown first when not empty.
    pub title: String,
    /// Negative threshold used.
    pub negative_threshold: f32,
    /// Positive threshold used.
    pub positive_threshold: f32,
    /// Number of shuffled columns.
    pub iterations: usize,
    /// Significance level α.
    pub alpha: f64,
    /// Corrected area needed for significance.
    pub significant_area: f64,
    /// Largest cluster per shuffled column, largest first.
    pub shuffled_clusters: Vec<Cluster>,
    /// Clusters of the statistical map with p-values, largest first.
    pub clusters: Vec<Cluster>,
}

impl ClusterReport {
    /// Find clusters in `column` of `map` and score them against the
    /// largest clusters of each column of `shuffled`.
    ///
    /// # Errors
    ///
    /// Any error of [`find_clusters`] or [`largest_clusters`].
    pub fn analyze(
        mesh: &SurfaceMesh,
        map: &MetricTable,
        column: usize,
        shuffled: &MetricTable,
        params: &ClusterParams,
    ) -> ClusterResult<Self> {
        info!(
            column,
            iterations = shuffled.column_count(),
            "Starting cluster significance analysis"
        );
        let areas = mesh.node_areas();
        let mut clusters = find_clusters(mesh, &areas, map, column, params)?;
        let shuffled_clusters = largest_clusters(mesh, shuffled, params)?;

        let mut maxima = vec![0.0; shuffled.column_count()];
        for c in &shuffled_clusters {
            maxima[c.column - 1] = c.corrected_area;
        }
        maxima.sort_by(|a: &f64, b| b.total_cmp(a));
        let significant_area = significant_area(&maxima, params.p_value);
        assign_p_values(&mut clusters, &maxima);

        let report = Self {
            title: String::new(),
            negative_threshold: params.negative_threshold,
            positive_threshold: params.positive_threshold,
            iterations: shuffled.column_count(),
            alpha: params.p_value,
            significant_area,
            shuffled_clusters,
            clusters,
        };
        info!(
            clusters = report.clusters.len(),
            significant = report.significant().count(),
            significant_area,
            "Cluster significance analysis done"
        );
        Ok(report)
    }

    /// Sets the title line.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Clusters of the map whose corrected area reaches the significant
    /// area.
    pub fn significant(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters
            .iter()
            .filter(|c| c.is_significant(self.significant_area))
    }

    /// Two-column table over `node_count` nodes: the map value and `1 - P`
    /// on every node of a cluster, 0 elsewhere.
    ///
    /// # Errors
    ///
    /// [`ClusterError::Metric`](crate::ClusterError::Metric) if `column`
    /// does not exist or the map has a different node count.
    pub fn cluster_table(&self, map: &MetricTable, column: usize) -> ClusterResult<MetricTable> {
        let values = map.column_values(column)?;
        let n = map.node_count();
        let mut mapped = vec![0.0f32; n];
        let mut confidence = vec![0.0f32; n];
        for c in self.clusters.iter().filter(|c| c.corrected_area > 0.0) {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: table storage is f32
            let q = (1.0 - c.p_value) as f32;
            for &node in &c.nodes {
                let node = node as usize;
                mapped[node] = values[node];
                confidence[node] = q;
            }
        }
        let name = map
            .column(column)
            .map_or_else(String::new, |c| c.name.clone());
        Ok(MetricTable::from_columns(
            n,
            vec![
                Column::from_values(name, mapped),
                Column::from_values("1 - P", confidence),
            ],
        )?)
    }

    /// Render the text report.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn write_clusters<'a>(
    f: &mut String,
    clusters: impl Iterator<Item = &'a Cluster>,
) -> fmt::Result {
    writeln!(f, "{HEADER}")?;
    for c in clusters {
        write!(
            f,
            "{:>6}  {:>8.3}  {:>9}  {:>12.6}  {:>14.6}  {:>8.3}  {:>8.3}  {:>8.3}",
            c.column,
            c.threshold(),
            c.node_count(),
            c.area,
            c.corrected_area,
            c.center_of_gravity.x,
            c.center_of_gravity.y,
            c.center_of_gravity.z,
        )?;
        if c.p_value >= 0.0 {
            write!(f, "  {:>8.6}", c.p_value)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for ClusterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if !self.title.is_empty() {
            writeln!(out, "Type of Test:        {}", self.title)?;
        }
        writeln!(out, "Negative Threshold:  {}", self.negative_threshold)?;
        writeln!(out, "Positive Threshold:  {}", self.positive_threshold)?;
        writeln!(out, "Iterations:          {}", self.iterations)?;
        writeln!(out, "P-Value:             {}", self.alpha)?;
        writeln!(out, "Significant Area:    {}", self.significant_area)?;
        writeln!(out)?;

        let sig = self.significant_area;
        writeln!(out, "Shuffled Map\n------------")?;
        write_clusters(
            &mut out,
            self.shuffled_clusters.iter().filter(|c| c.is_significant(sig)),
        )?;
        writeln!(out, "\n\nMap\n---")?;
        write_clusters(&mut out, self.significant())?;

        writeln!(out, "\n\nAll Clusters\n\nShuffled Map\n------------")?;
        write_clusters(&mut out, self.shuffled_clusters.iter())?;
        writeln!(out, "\n\nMap\n---")?;
        write_clusters(&mut out, self.clusters.iter())?;
        f.write_str(&out)
    }
}
