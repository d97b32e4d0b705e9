//! Whole-column and whole-table transforms.

use rand::Rng;
use rand::seq::SliceRandom;
use surface_stats::{DataGroup, Descriptive, ZScore, describe_values, normalize_to};
use tracing::debug;

use crate::column::Column;
use crate::error::{MetricError, MetricResult};
use crate::table::{MetricTable, Modified, OutputColumn};

impl MetricTable {
    /// Zero every value of `column` inside `[min, max]` (or `(min, max)`
    /// when not `inclusive`).
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for a bad column.
    pub fn set_range_to_zero(
        &mut self,
        column: usize,
        min: f32,
        max: f32,
        inclusive: bool,
    ) -> MetricResult<Modified> {
        for v in self.column_values_mut(column)? {
            let inside = if inclusive {
                *v >= min && *v <= max
            } else {
                *v > min && *v < max
            };
            if inside {
                *v = 0.0;
            }
        }
        Ok(Modified {
            first_column: column,
            column_count: 1,
        })
    }

    /// Replace values with their base-10 logarithm.
    ///
    /// Values below `1e-5` (including zero and negatives) map to `-5`.
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for a bad column.
    pub fn scale_log10(
        &mut self,
        column: usize,
        output: OutputColumn,
        name: &str,
    ) -> MetricResult<Modified> {
        let values: Vec<f32> = self
            .column_values(column)?
            .iter()
            .map(|&v| if v < 1.0e-5 { -5.0 } else { v.log10() })
            .collect();
        let source = self.columns()[column].name.clone();
        let index = self.prepare_output(output, name)?;
        let target = self.column_mut(index)?;
        target.replace_values(values);
        target.append_comment(&format!("Log10 of column {source}"));
        Ok(Modified {
            first_column: index,
            column_count: 1,
        })
    }

    /// Append a copy of `column` remapped onto a normal distribution with the
    /// given mean and deviation. Order is preserved and ties stay tied.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for a bad column
    /// - [`MetricError::Statistics`] for an empty column or a bad target
    pub fn remap_to_normal(
        &mut self,
        column: usize,
        mean: f32,
        std_dev: f32,
    ) -> MetricResult<Modified> {
        let values = normalize_to(
            self.column_values(column)?,
            f64::from(mean),
            f64::from(std_dev),
        )?;
        let source = &self.columns()[column];
        let normalized = Column::from_values(format!("Normalized - {}", source.name), values)
            .with_comment(format!("Mean = {mean}  Std Dev = {std_dev}"));
        let index = self.add_column(normalized)?;
        Ok(Modified {
            first_column: index,
            column_count: 1,
        })
    }

    /// Per-row z-scores across all columns.
    ///
    /// Each node's values are standardized with that node's mean and sample
    /// deviation. The result has one column per input column, named
    /// `Z-map - NAME` with a color mapping of ±5.
    ///
    /// # Errors
    ///
    /// [`MetricError::InvalidInput`] with fewer than two columns.
    #[allow(clippy::cast_possible_truncation)]
    pub fn z_map(&self) -> MetricResult<Self> {
        let k = self.column_count();
        if k < 2 {
            return Err(MetricError::invalid_input(format!(
                "z-map needs at least two columns, table has {k}"
            )));
        }
        let n = self.node_count();
        let mut outputs = vec![vec![0.0f32; n]; k];
        let mut row = Vec::with_capacity(k);
        for node in 0..n {
            self.row_into(node, &mut row)?;
            let z = ZScore::fit(&[DataGroup::Borrowed(&row)])?;
            for (out, &v) in outputs.iter_mut().zip(&row) {
                // Truncation: table storage is f32
                out[node] = z.z(f64::from(v)) as f32;
            }
        }

        let columns = outputs
            .into_iter()
            .zip(self.columns())
            .map(|(values, source)| {
                Column::from_values(format!("Z-map - {}", source.name), values)
                    .with_color_mapping(-5.0, 5.0)
            })
            .collect();
        let mut result = Self::from_columns(n, columns)?;
        result.set_title(format!("Z-map of {}", self.title()));
        Ok(result)
    }

    /// Descriptive statistics of one column.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for a bad column
    /// - [`MetricError::Statistics`] for a table without nodes
    pub fn column_statistics(&self, column: usize) -> MetricResult<Descriptive> {
        Ok(describe_values(self.column_values(column)?)?)
    }

    /// Subtract each node's mean over every column of `a` and `b` from both
    /// tables. Columns are renamed `Avg-subtracted - NAME`.
    ///
    /// # Errors
    ///
    /// - [`MetricError::NodeCountMismatch`] if the node counts differ
    /// - [`MetricError::InvalidInput`] if both tables are empty
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn subtract_row_mean(a: &mut Self, b: &mut Self) -> MetricResult<(Modified, Modified)> {
        if a.node_count() != b.node_count() {
            return Err(MetricError::NodeCountMismatch {
                expected: a.node_count(),
                actual: b.node_count(),
            });
        }
        let k = a.column_count() + b.column_count();
        if k == 0 {
            return Err(MetricError::invalid_input(
                "row mean subtraction needs at least one column",
            ));
        }

        let means: Vec<f32> = (0..a.node_count())
            .map(|node| {
                let sum: f64 = a
                    .columns()
                    .iter()
                    .chain(b.columns())
                    .map(|c| f64::from(c.values()[node]))
                    .sum();
                // Truncation: table storage is f32
                (sum / k as f64) as f32
            })
            .collect();

        let tokens = [a.column_count(), b.column_count()].map(|count| Modified {
            first_column: 0,
            column_count: count,
        });
        for (table, token) in [a, b].into_iter().zip(tokens) {
            for column in 0..token.column_count {
                let target = table.column_mut(column)?;
                for (v, m) in target.values_mut().iter_mut().zip(&means) {
                    *v -= m;
                }
                target.name = format!("Avg-subtracted - {}", target.name);
            }
        }
        Ok((tokens[0], tokens[1]))
    }

    /// Shuffle whole columns across several tables.
    ///
    /// The union of all columns is permuted uniformly and dealt back so
    /// every table keeps its column count.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeCountMismatch`] if the node counts differ.
    pub fn shuffle_across<R: Rng + ?Sized>(
        tables: &mut [&mut Self],
        rng: &mut R,
    ) -> MetricResult<()> {
        let Some(first) = tables.first() else {
            return Ok(());
        };
        let n = first.node_count();
        if let Some(bad) = tables.iter().find(|t| t.node_count() != n) {
            return Err(MetricError::NodeCountMismatch {
                expected: n,
                actual: bad.node_count(),
            });
        }

        let counts: Vec<usize> = tables.iter().map(|t| t.column_count()).collect();
        let mut pool: Vec<Column> = tables.iter_mut().flat_map(|t| t.take_columns()).collect();
        pool.shuffle(rng);

        let mut pool = pool.into_iter();
        for (table, count) in tables.iter_mut().zip(counts) {
            table.put_columns(pool.by_ref().take(count).collect());
        }
        Ok(())
    }

    /// Build a table of products of randomly paired columns.
    ///
    /// Each repetition picks two distinct columns `A` and `B` and appends
    /// their element-wise product, named `A * B`.
    ///
    /// # Errors
    ///
    /// [`MetricError::InvalidInput`] with fewer than two columns.
    pub fn shuffled_cross_correlations<R: Rng + ?Sized>(
        &self,
        repetitions: usize,
        rng: &mut R,
    ) -> MetricResult<Self> {
        let k = self.column_count();
        if k < 2 {
            return Err(MetricError::invalid_input(format!(
                "cross correlation needs at least two columns, table has {k}"
            )));
        }
        let mut result = Self::new(self.node_count());
        for rep in 0..repetitions {
            let i = rng.gen_range(0..k);
            let mut j = rng.gen_range(0..k - 1);
            if j >= i {
                j += 1;
            }
            let (a, b) = (&self.columns()[i], &self.columns()[j]);
            debug!(repetition = rep, a = i, b = j, "Cross correlation pair");
            let values = a
                .values()
                .iter()
                .zip(b.values())
                .map(|(x, y)| x * y)
                .collect();
            result.add_column(Column::from_values(format!("{} * {}", a.name, b.name), values))?;
        }
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table(values: &[&[f32]]) -> MetricTable {
        let n = values.first().map_or(0, |v| v.len());
        let columns = values
            .iter()
            .enumerate()
            .map(|(i, v)| Column::from_values(format!("c{i}"), v.to_vec()))
            .collect();
        MetricTable::from_columns(n, columns).unwrap()
    }

    #[test]
    fn range_to_zero_respects_inclusivity() {
        let mut t = table(&[&[1.0, 2.0, 3.0, 4.0]]);
        t.set_range_to_zero(0, 2.0, 3.0, false).unwrap();
        assert_eq!(t.column_values(0).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        t.set_range_to_zero(0, 2.0, 3.0, true).unwrap();
        assert_eq!(t.column_values(0).unwrap(), &[1.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn log10_floors_small_values() {
        let mut t = table(&[&[100.0, 0.0, -3.0, 1.0e-6]]);
        t.scale_log10(0, OutputColumn::New, "log").unwrap();
        let out = t.column_values(1).unwrap();
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-6);
        assert_eq!(&out[1..], &[-5.0, -5.0, -5.0]);
    }

    #[test]
    fn normal_remap_preserves_order() {
        let mut t = table(&[&[3.0, 1.0, 2.0, 2.0, 9.0]]);
        t.remap_to_normal(0, 10.0, 2.0).unwrap();
        let col = t.column(1).unwrap();
        assert_eq!(col.name, "Normalized - c0");
        assert_eq!(col.comment, "Mean = 10  Std Dev = 2");
        let v = col.values();
        assert!(v[1] < v[2]);
        assert_eq!(v[2], v[3]);
        assert!(v[3] < v[0] && v[0] < v[4]);
        assert_relative_eq!(v[2], 10.0, epsilon = 1e-5);
    }

    #[test]
    fn z_map_standardizes_rows() {
        let t = table(&[&[1.0, 0.0], &[2.0, 0.0], &[3.0, 0.0], &[4.0, 0.0], &[5.0, 0.0]]);
        let z = t.z_map().unwrap();
        assert_eq!(z.column_count(), 5);
        assert_eq!(z.column(0).unwrap().name, "Z-map - c0");
        assert_eq!(z.column(0).unwrap().color_mapping, (-5.0, 5.0));
        let sd = 2.5f32.sqrt();
        assert_relative_eq!(z.value(0, 0).unwrap(), -2.0 / sd, epsilon = 1e-5);
        assert_relative_eq!(z.value(0, 4).unwrap(), 2.0 / sd, epsilon = 1e-5);
        // Constant row: deviation clamps to 1.
        assert_eq!(z.value(1, 3).unwrap(), 0.0);
        assert!(table(&[&[1.0]]).z_map().is_err());
    }

    #[test]
    fn column_statistics_reports_moments() {
        let t = table(&[&[7.0, 8.0, 8.0, 7.0, 3.0, 1.0, 6.0, 9.0, 3.0, 8.0]]);
        let d = t.column_statistics(0).unwrap();
        assert_relative_eq!(d.mean, 6.0, epsilon = 1e-9);
        assert_eq!(d.median, 7.0);
    }

    #[test]
    fn row_mean_subtraction_spans_both_tables() {
        let mut a = table(&[&[1.0, 10.0], &[3.0, 10.0]]);
        let mut b = table(&[&[5.0, 10.0]]);
        let (ta, tb) = MetricTable::subtract_row_mean(&mut a, &mut b).unwrap();
        assert_eq!(ta.range(), 0..2);
        assert_eq!(tb.range(), 0..1);
        assert_eq!(a.column_values(0).unwrap(), &[-2.0, 0.0]);
        assert_eq!(a.column_values(1).unwrap(), &[0.0, 0.0]);
        assert_eq!(b.column_values(0).unwrap(), &[2.0, 0.0]);
        assert_eq!(b.column(0).unwrap().name, "Avg-subtracted - c0");
    }

    #[test]
    fn shuffle_across_keeps_shapes_and_columns() {
        let mut a = table(&[&[1.0], &[2.0], &[3.0]]);
        let mut b = table(&[&[4.0], &[5.0]]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        MetricTable::shuffle_across(&mut [&mut a, &mut b], &mut rng).unwrap();
        assert_eq!(a.column_count(), 3);
        assert_eq!(b.column_count(), 2);
        let mut all: Vec<f32> = a
            .columns()
            .iter()
            .chain(b.columns())
            .map(|c| c.values()[0])
            .collect();
        all.sort_by(f32::total_cmp);
        assert_eq!(all, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(a.is_modified());
    }

    #[test]
    fn cross_correlations_pair_distinct_columns() {
        let t = table(&[&[2.0, 1.0], &[3.0, 1.0], &[5.0, 1.0]]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = t.shuffled_cross_correlations(20, &mut rng).unwrap();
        assert_eq!(out.column_count(), 20);
        for c in out.columns() {
            assert!([6.0, 10.0, 15.0].contains(&c.values()[0]));
            assert_eq!(c.values()[1], 1.0);
            assert!(c.name.contains(" * "));
        }
    }
}
