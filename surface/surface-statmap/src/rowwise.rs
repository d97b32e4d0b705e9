//! Maps that run one primitive on the rows of several tables.
//!
//! Row `v` of every input table forms one data group; the primitive's
//! outputs become the columns of the map.

use surface_metric::{Column, MetricError, MetricTable};
use surface_stats::{DataGroup, FailureKind, correlation, levene, regression};
use tracing::{info, warn};

use crate::error::{MapError, MapResult};
use crate::moments::{require_same_shape, to_f32};

/// Build a table from named value vectors.
fn table_of(node_count: usize, named: Vec<(&str, Vec<f32>)>) -> MapResult<MetricTable> {
    let columns = named
        .into_iter()
        .map(|(name, values)| Column::from_values(name, values))
        .collect();
    Ok(MetricTable::from_columns(node_count, columns)?)
}

/// Pearson correlation of the rows of `x` and `y`.
///
/// Columns: `r`, `t`, `p` (two-sided), `dof`. A node where either row is
/// constant gets `r = 0`, `t = 0`, `p = 1` and is logged.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] if the tables differ in column count
/// - [`MapError::Metric`] if the tables differ in node count
/// - [`MapError::Statistics`] for rows the primitive rejects, such as fewer
///   than three columns
#[allow(clippy::cast_precision_loss)]
pub fn correlation_map(x: &MetricTable, y: &MetricTable) -> MapResult<MetricTable> {
    const KERNEL: &str = "correlation map";
    require_same_shape(x, &[y])?;
    let n = x.node_count();
    info!(nodes = n, columns = x.column_count(), "Computing correlation map");

    let mut r = Vec::with_capacity(n);
    let mut t = Vec::with_capacity(n);
    let mut p = Vec::with_capacity(n);
    let mut dof = Vec::with_capacity(n);
    let (mut row_x, mut row_y) = (Vec::new(), Vec::new());
    let mut degenerate = 0usize;
    for node in 0..n {
        x.row_into(node, &mut row_x)?;
        y.row_into(node, &mut row_y)?;
        match correlation(&row_x, &row_y) {
            Ok(c) => {
                r.push(to_f32(c.r));
                t.push(to_f32(c.t));
                p.push(to_f32(c.p));
                dof.push(to_f32(c.dof));
            }
            Err(e) if e.kind == FailureKind::ConvergenceFailure => {
                degenerate += 1;
                r.push(0.0);
                t.push(0.0);
                p.push(1.0);
                dof.push(to_f32(row_x.len() as f64 - 2.0));
            }
            Err(e) => return Err(MapError::statistics(KERNEL, e)),
        }
    }
    if degenerate > 0 {
        warn!(nodes = degenerate, "Constant rows left uncorrelated");
    }

    let map = table_of(n, vec![("r", r), ("t", t), ("p", p), ("dof", dof)])?;
    info!("Correlation map done");
    Ok(map)
}

/// Multiple regression of the rows of `dependent` on the rows of each
/// table in `independents`.
///
/// Columns: `R²`, `r`, `F`, `p`, `dof_num`, `dof_den`. Rows whose
/// predictors are collinear are logged and written as `R² = r = F = 0`,
/// `p = 1` with the usual degrees of freedom.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] without independent tables or for tables
///   of different column counts
/// - [`MapError::Metric`] for tables of different node counts
/// - [`MapError::Statistics`] for rows the primitive rejects, such as too
///   few columns for the number of predictors
#[allow(clippy::cast_precision_loss)]
pub fn regression_map(
    dependent: &MetricTable,
    independents: &[&MetricTable],
) -> MapResult<MetricTable> {
    const KERNEL: &str = "regression map";
    if independents.is_empty() {
        return Err(MapError::invalid_input(
            "regression map needs at least one independent table",
        ));
    }
    require_same_shape(dependent, independents)?;
    let n = dependent.node_count();
    let k = independents.len();
    info!(
        nodes = n,
        columns = dependent.column_count(),
        predictors = k,
        "Computing regression map"
    );

    let mut outputs: [Vec<f32>; 6] = Default::default();
    let mut row = Vec::new();
    let mut predictor_rows = vec![Vec::new(); k];
    let mut skipped = 0usize;
    for node in 0..n {
        dependent.row_into(node, &mut row)?;
        for (table, out) in independents.iter().zip(predictor_rows.iter_mut()) {
            table.row_into(node, out)?;
        }
        let groups: Vec<DataGroup<'_>> = predictor_rows
            .iter()
            .map(|r| DataGroup::Borrowed(r))
            .collect();
        let values = match regression(&row, &groups) {
            Ok(fit) => [
                fit.r_squared,
                fit.r_squared.sqrt(),
                fit.f,
                fit.p,
                fit.dof_regression,
                fit.dof_error,
            ],
            Err(e) if e.kind == FailureKind::ConvergenceFailure => {
                skipped += 1;
                let dof_error = row.len() as f64 - k as f64 - 1.0;
                [0.0, 0.0, 0.0, 1.0, k as f64, dof_error]
            }
            Err(e) => return Err(MapError::statistics(KERNEL, e)),
        };
        for (out, v) in outputs.iter_mut().zip(values) {
            out.push(to_f32(v));
        }
    }
    if skipped > 0 {
        warn!(
            nodes = skipped,
            "Regression rows skipped for collinear predictors or non-finite values"
        );
    }

    let [r2, r, f, p, dof_num, dof_den] = outputs;
    let map = table_of(
        n,
        vec![
            ("R²", r2),
            ("r", r),
            ("F", f),
            ("p", p),
            ("dof_num", dof_num),
            ("dof_den", dof_den),
        ],
    )?;
    info!("Regression map done");
    Ok(map)
}

/// Levene's test for equal variance across the rows of `g >= 2` tables.
///
/// Columns: `Levene-F`, `DOF - numerator`, `DOF - denominator`, `P-Value`,
/// each with its color mapping set to the column's value range. Tables may
/// differ in column count; at least one needs three or more columns.
///
/// # Errors
///
/// - [`MapError::InvalidInput`] for fewer than two tables, an empty table
///   or no table with three columns
/// - [`MapError::Metric`] for tables of different node counts
/// - [`MapError::Statistics`] if a row fails the primitive
pub fn levene_map(tables: &[&MetricTable]) -> MapResult<MetricTable> {
    const KERNEL: &str = "Levene map";
    let [first, rest @ ..] = tables else {
        return Err(MapError::invalid_input("Levene map needs at least two tables"));
    };
    if rest.is_empty() {
        return Err(MapError::invalid_input("Levene map needs at least two tables"));
    }
    let n = first.node_count();
    if let Some(bad) = rest.iter().find(|t| t.node_count() != n) {
        return Err(MetricError::NodeCountMismatch {
            expected: n,
            actual: bad.node_count(),
        }
        .into());
    }
    if tables.iter().any(|t| t.column_count() == 0) {
        return Err(MapError::invalid_input("Levene map input table has no columns"));
    }
    if tables.iter().all(|t| t.column_count() < 3) {
        return Err(MapError::invalid_input(
            "Levene map needs at least one table with three columns",
        ));
    }
    info!(nodes = n, groups = tables.len(), "Computing Levene map");

    let mut outputs: [Vec<f32>; 4] = Default::default();
    let mut rows = vec![Vec::new(); tables.len()];
    for node in 0..n {
        for (table, row) in tables.iter().zip(rows.iter_mut()) {
            table.row_into(node, row)?;
        }
        let groups: Vec<DataGroup<'_>> = rows.iter().map(|r| DataGroup::Borrowed(r)).collect();
        let test = levene(&groups).map_err(|e| MapError::statistics(KERNEL, e))?;
        let values = [test.f, test.dof_numerator, test.dof_denominator, test.p];
        for (out, v) in outputs.iter_mut().zip(values) {
            out.push(to_f32(v));
        }
    }

    let [f, dof_num, dof_den, p] = outputs;
    let mut map = table_of(
        n,
        vec![
            ("Levene-F", f),
            ("DOF - numerator", dof_num),
            ("DOF - denominator", dof_den),
            ("P-Value", p),
        ],
    )?;
    for c in 0..map.column_count() {
        let range = map.column(c).and_then(|col| col.finite_range());
        if let Some((min, max)) = range {
            map.edit_column(c, |col| col.color_mapping = (min, max))?;
        }
    }
    info!("Levene map done");
    Ok(map)
}
