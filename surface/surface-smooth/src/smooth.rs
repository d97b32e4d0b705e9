//! Neighbor-average smoothing.
//!
//! # Algorithm
//!
//! For each node v with neighbors N(v), per iteration:
//! ```text
//! v_new = (1 - s) * v + s * mean(N(v))
//! ```
//!
//! Neighbor means always read the previous iteration's values, so node order
//! never matters.

use surface_metric::{Column, MetricTable, Modified, OutputColumn};
use surface_types::{Roi, SurfaceMesh};
use tracing::debug;

use crate::error::{SmoothError, SmoothResult};
use crate::params::SmoothingParams;

fn check_len(mesh: &SurfaceMesh, len: usize) -> SmoothResult<()> {
    if len == mesh.node_count() {
        Ok(())
    } else {
        Err(SmoothError::NodeCountMismatch {
            expected: mesh.node_count(),
            actual: len,
        })
    }
}

/// Smooth a per-node value buffer in place.
///
/// Nodes outside `roi` keep their values and are ignored as neighbors.
/// Nodes without any participating neighbor are copied unchanged.
///
/// # Errors
///
/// - [`SmoothError::InvalidStrength`] for a strength outside `[0, 1]`
/// - [`SmoothError::NodeCountMismatch`] if `values` does not fit the mesh
/// - [`SmoothError::Mesh`] if the mask has the wrong length
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn smooth_column(
    mesh: &SurfaceMesh,
    values: &mut [f32],
    params: &SmoothingParams,
    roi: Option<&Roi>,
) -> SmoothResult<()> {
    params.validate()?;
    check_len(mesh, values.len())?;
    if let Some(roi) = roi {
        roi.check_len(mesh.node_count())?;
    }
    if params.iterations == 0 {
        return Ok(());
    }

    let s = f64::from(params.strength);
    let mut previous = values.to_vec();
    for _ in 0..params.iterations {
        for (node, out) in values.iter_mut().enumerate() {
            if !Roi::includes(roi, node) {
                continue;
            }
            let (sum, count) = mesh
                .neighbors(node)
                .iter()
                .map(|&n| n as usize)
                .filter(|&n| Roi::includes(roi, n))
                .fold((0.0f64, 0usize), |(sum, count), n| {
                    (sum + f64::from(previous[n]), count + 1)
                });
            if count == 0 {
                continue;
            }
            let mean = sum / count as f64;
            // Truncation: table storage is f32
            *out = ((1.0 - s) * f64::from(previous[node]) + s * mean) as f32;
        }
        previous.copy_from_slice(values);
    }

    debug!(
        nodes = values.len(),
        strength = params.strength,
        iterations = params.iterations,
        "Neighbor-average smoothing done"
    );
    Ok(())
}

/// Smooth one table column over the mesh.
///
/// The result goes into a new column (named `name`, metadata copied from
/// the source) or overwrites an existing one. Its comment records the
/// strength and iteration count.
///
/// # Errors
///
/// - [`SmoothError::Metric`] for a bad column or a table that does not fit
///   the mesh
/// - Any error of [`smooth_column`]
pub fn smooth_average_neighbors(
    mesh: &SurfaceMesh,
    table: &mut MetricTable,
    column: usize,
    output: OutputColumn,
    name: &str,
    params: &SmoothingParams,
) -> SmoothResult<Modified> {
    check_len(mesh, table.node_count())?;
    let mut values = table.column_values(column)?.to_vec();
    smooth_column(mesh, &mut values, params, None)?;
    let note = format!(
        "Average Neighbors Smoothing: Strength/Iterations: {} {}",
        params.strength, params.iterations
    );

    match output {
        OutputColumn::New => {
            let mut smoothed = Column::from_values(name, values);
            if let Some(source) = table.column(column) {
                smoothed.copy_metadata_from(source);
            }
            smoothed.name = name.to_string();
            smoothed.append_comment(&note);
            let index = table.add_column(smoothed)?;
            Ok(Modified {
                first_column: index,
                column_count: 1,
            })
        }
        OutputColumn::Existing(index) => {
            table.set_column_values(index, &values)?;
            table.edit_column(index, |c| {
                c.name = name.to_string();
                c.append_comment(&note);
            })?;
            Ok(Modified {
                first_column: index,
                column_count: 1,
            })
        }
    }
}

/// Fill zero-valued nodes from their non-zero neighbors until nothing
/// changes.
///
/// Each pass gives every zero node the value of its lowest-numbered
/// neighbor that was non-zero before the pass. Returns the number of passes
/// that changed something.
///
/// # Errors
///
/// [`SmoothError::NodeCountMismatch`] if `values` does not fit the mesh.
pub fn smooth_zero_neighbors(mesh: &SurfaceMesh, values: &mut [f32]) -> SmoothResult<usize> {
    check_len(mesh, values.len())?;
    let mut passes = 0;
    let mut previous = values.to_vec();
    loop {
        let mut changed = false;
        for (node, out) in values.iter_mut().enumerate() {
            if previous[node] != 0.0 {
                continue;
            }
            if let Some(&n) = mesh
                .neighbors(node)
                .iter()
                .find(|&&n| previous[n as usize] != 0.0)
            {
                *out = previous[n as usize];
                changed = true;
            }
        }
        if !changed {
            break;
        }
        passes += 1;
        previous.copy_from_slice(values);
    }
    debug!(passes, "Zero-neighbor fill done");
    Ok(passes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surface_types::{corner_tetrahedron, planar_grid};

    #[test]
    fn constant_column_is_a_fixed_point() {
        let mesh = planar_grid(6, 5);
        let mut values = vec![7.0f32; mesh.node_count()];
        let params = SmoothingParams::new().with_strength(1.0).with_iterations(100);
        smooth_column(&mesh, &mut values, &params, None).unwrap();
        for v in values {
            assert!((v - 7.0).abs() < 1e-6);
        }
    }

    #[test]
    fn single_pass_blends_with_neighbor_mean() {
        let mesh = corner_tetrahedron();
        let mut values = vec![4.0f32, 0.0, 0.0, 0.0];
        let params = SmoothingParams::new().with_strength(0.5).with_iterations(1);
        smooth_column(&mesh, &mut values, &params, None).unwrap();
        // Node 0: 0.5 * 4 + 0.5 * 0; others: 0.5 * 0 + 0.5 * 4/3.
        assert_relative_eq!(values[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(values[1], 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(values[3], 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn uses_previous_iteration_values() {
        // A 3 x 2 grid where node order would matter without
        // double-buffering.
        let mesh = planar_grid(3, 2);
        let mut values = vec![0.0f32; 6];
        values[0] = 6.0;
        let params = SmoothingParams::new().with_strength(1.0).with_iterations(1);
        smooth_column(&mesh, &mut values, &params, None).unwrap();
        // Node 2 only touches nodes 1 and 5, both zero before the pass.
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn zero_strength_or_iterations_change_nothing() {
        let mesh = corner_tetrahedron();
        let original = vec![1.0f32, 2.0, 3.0, 4.0];
        for params in [
            SmoothingParams::new().with_strength(0.0),
            SmoothingParams::new().with_iterations(0),
        ] {
            let mut values = original.clone();
            smooth_column(&mesh, &mut values, &params, None).unwrap();
            assert_eq!(values, original);
        }
    }

    #[test]
    fn roi_limits_nodes_and_neighbors() {
        let mesh = corner_tetrahedron();
        let roi = Roi::from_nodes(4, &[0, 1]);
        let mut values = vec![0.0f32, 2.0, 100.0, 100.0];
        let params = SmoothingParams::new().with_strength(1.0).with_iterations(1);
        smooth_column(&mesh, &mut values, &params, Some(&roi)).unwrap();
        assert_eq!(values, vec![2.0, 0.0, 100.0, 100.0]);
    }

    #[test]
    fn rejects_bad_inputs() {
        let mesh = corner_tetrahedron();
        let mut short = vec![0.0f32; 3];
        assert!(matches!(
            smooth_column(&mesh, &mut short, &SmoothingParams::new(), None),
            Err(SmoothError::NodeCountMismatch { .. })
        ));
        let mut values = vec![0.0f32; 4];
        let bad = SmoothingParams::new().with_strength(2.0);
        assert!(matches!(
            smooth_column(&mesh, &mut values, &bad, None),
            Err(SmoothError::InvalidStrength { .. })
        ));
        let roi = Roi::all(5);
        assert!(matches!(
            smooth_column(&mesh, &mut values, &SmoothingParams::new(), Some(&roi)),
            Err(SmoothError::Mesh(_))
        ));
    }

    #[test]
    fn table_column_gets_comment() {
        let mesh = corner_tetrahedron();
        let mut table = MetricTable::from_columns(
            4,
            vec![Column::from_values("depth", vec![1.0, 1.0, 1.0, 5.0]).with_comment("raw")],
        )
        .unwrap();
        let params = SmoothingParams::new().with_strength(0.5).with_iterations(2);
        let token =
            smooth_average_neighbors(&mesh, &mut table, 0, OutputColumn::New, "smoothed", &params)
                .unwrap();
        assert_eq!(token.range(), 1..2);
        let col = table.column(1).unwrap();
        assert_eq!(col.name, "smoothed");
        assert_eq!(
            col.comment,
            "raw\nAverage Neighbors Smoothing: Strength/Iterations: 0.5 2"
        );
        assert_eq!(table.column_values(0).unwrap(), &[1.0, 1.0, 1.0, 5.0]);

        smooth_average_neighbors(
            &mesh,
            &mut table,
            0,
            OutputColumn::Existing(0),
            "depth",
            &params,
        )
        .unwrap();
        assert_eq!(table.column_values(0).unwrap(), table.column_values(1).unwrap());
    }

    #[test]
    fn zero_fill_spreads_until_stable() {
        let mesh = planar_grid(4, 2);
        let mut values = vec![0.0f32; mesh.node_count()];
        values[0] = 3.0;
        let passes = smooth_zero_neighbors(&mesh, &mut values).unwrap();
        assert!(passes >= 1);
        assert!(values.iter().all(|&v| v == 3.0));

        let mut none = vec![0.0f32; mesh.node_count()];
        assert_eq!(smooth_zero_neighbors(&mesh, &mut none).unwrap(), 0);
    }
}
