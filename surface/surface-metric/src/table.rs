//! The node × column scalar table.

use std::ops::Range;

use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{MetricError, MetricResult};

/// Record of a mutation.
///
/// Every mutating operation sets the table's modified flag and returns the
/// columns it touched. Columns never refer back to their table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modified {
    /// First touched column.
    pub first_column: usize,
    /// Number of touched columns; 0 for table-level metadata.
    pub column_count: usize,
}

impl Modified {
    const fn column(column: usize) -> Self {
        Self {
            first_column: column,
            column_count: 1,
        }
    }

    const fn columns(first_column: usize, column_count: usize) -> Self {
        Self {
            first_column,
            column_count,
        }
    }

    /// Touched columns as a range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.first_column..self.first_column + self.column_count
    }
}

/// Where an operation writes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputColumn {
    /// Append a new column.
    #[default]
    New,
    /// Overwrite an existing column.
    Existing(usize),
}

/// What [`MetricTable::append_with`] does with each incoming column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDestination {
    /// Append as a new column.
    New,
    /// Replace values and metadata of an existing column.
    Overwrite(usize),
    /// Ignore the incoming column.
    Skip,
}

/// A mutable `N × K` matrix of `f32` with per-column metadata.
///
/// The node count is fixed at construction; columns come and go. Whole
/// tables can be appended when their node counts agree.
///
/// # Example
///
/// ```
/// use surface_metric::MetricTable;
///
/// let mut table = MetricTable::new(3);
/// let col = table.resolve_column("thickness", true).unwrap();
/// table.set_value(1, col, 2.5).unwrap();
///
/// assert_eq!(table.column_count(), 1);
/// assert_eq!(table.value(1, col).unwrap(), 2.5);
/// assert!(table.is_modified());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricTable {
    node_count: usize,
    columns: Vec<Column>,
    title: String,
    file_comment: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    modified: bool,
}

impl PartialEq for MetricTable {
    fn eq(&self, other: &Self) -> bool {
        self.node_count == other.node_count
            && self.title == other.title
            && self.file_comment == other.file_comment
            && self.columns == other.columns
    }
}

impl MetricTable {
    /// Empty table over `node_count` nodes.
    #[must_use]
    pub const fn new(node_count: usize) -> Self {
        Self {
            node_count,
            columns: Vec::new(),
            title: String::new(),
            file_comment: String::new(),
            modified: false,
        }
    }

    /// Table over `node_count` nodes holding the given columns.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeCountMismatch`] if a column has the wrong length.
    pub fn from_columns(node_count: usize, columns: Vec<Column>) -> MetricResult<Self> {
        if let Some(bad) = columns.iter().find(|c| c.len() != node_count) {
            return Err(MetricError::NodeCountMismatch {
                expected: node_count,
                actual: bad.len(),
            });
        }
        Ok(Self {
            columns,
            ..Self::new(node_count)
        })
    }

    /// Number of nodes (rows).
    #[inline]
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no columns.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Table title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the table title.
    pub fn set_title(&mut self, title: impl Into<String>) -> Modified {
        self.title = title.into();
        self.modified = true;
        Modified::columns(0, 0)
    }

    /// Free-text comment carried in the file header.
    #[must_use]
    pub fn file_comment(&self) -> &str {
        &self.file_comment
    }

    /// Set the file comment.
    pub fn set_file_comment(&mut self, comment: impl Into<String>) -> Modified {
        self.file_comment = comment.into();
        self.modified = true;
        Modified::columns(0, 0)
    }

    /// Whether any mutation happened since creation or the last
    /// [`clear_modified`](Self::clear_modified).
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Reset the modified flag, typically after saving.
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// All columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// One column, `None` when out of range.
    #[must_use]
    pub fn column(&self, column: usize) -> Option<&Column> {
        self.columns.get(column)
    }

    fn check_column(&self, column: usize) -> MetricResult<()> {
        if column < self.columns.len() {
            Ok(())
        } else {
            Err(MetricError::ColumnOutOfRange {
                column,
                column_count: self.columns.len(),
            })
        }
    }

    fn check_node(&self, node: usize) -> MetricResult<()> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(MetricError::NodeOutOfRange {
                node,
                node_count: self.node_count,
            })
        }
    }

    /// Index of the first column with the given name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Values of one column for all nodes.
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for a bad column.
    pub fn column_values(&self, column: usize) -> MetricResult<&[f32]> {
        self.check_column(column)?;
        Ok(self.columns[column].values())
    }

    /// Mutable values of one column. Marks the table modified.
    pub(crate) fn column_values_mut(&mut self, column: usize) -> MetricResult<&mut [f32]> {
        self.check_column(column)?;
        self.modified = true;
        Ok(self.columns[column].values_mut())
    }

    /// Mutable column for crate-internal edits. Marks the table modified.
    pub(crate) fn column_mut(&mut self, column: usize) -> MetricResult<&mut Column> {
        self.check_column(column)?;
        self.modified = true;
        Ok(&mut self.columns[column])
    }

    /// Replace all values of one column.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for a bad column
    /// - [`MetricError::NodeCountMismatch`] if `values` has the wrong length
    pub fn set_column_values(&mut self, column: usize, values: &[f32]) -> MetricResult<Modified> {
        if values.len() != self.node_count {
            return Err(MetricError::NodeCountMismatch {
                expected: self.node_count,
                actual: values.len(),
            });
        }
        self.column_values_mut(column)?.copy_from_slice(values);
        Ok(Modified::column(column))
    }

    /// Edit a column's metadata in place.
    ///
    /// Values cannot change through this path; use the value setters.
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for a bad column.
    pub fn edit_column(
        &mut self,
        column: usize,
        edit: impl FnOnce(&mut Column),
    ) -> MetricResult<Modified> {
        edit(self.column_mut(column)?);
        Ok(Modified::column(column))
    }

    /// One value.
    ///
    /// # Errors
    ///
    /// Out-of-range node or column.
    pub fn value(&self, node: usize, column: usize) -> MetricResult<f32> {
        self.check_node(node)?;
        self.check_column(column)?;
        Ok(self.columns[column].values()[node])
    }

    /// Set one value.
    ///
    /// # Errors
    ///
    /// Out-of-range node or column.
    pub fn set_value(&mut self, node: usize, column: usize, value: f32) -> MetricResult<Modified> {
        self.check_node(node)?;
        self.column_values_mut(column)?[node] = value;
        Ok(Modified::column(column))
    }

    /// Copy the values of every column at one node into `out`.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeOutOfRange`] for a bad node.
    pub fn row_into(&self, node: usize, out: &mut Vec<f32>) -> MetricResult<()> {
        self.check_node(node)?;
        out.clear();
        out.extend(self.columns.iter().map(|c| c.values()[node]));
        Ok(())
    }

    /// Values of every column at one node.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeOutOfRange`] for a bad node.
    pub fn row(&self, node: usize) -> MetricResult<Vec<f32>> {
        let mut out = Vec::with_capacity(self.columns.len());
        self.row_into(node, &mut out)?;
        Ok(out)
    }

    /// Append a prepared column.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeCountMismatch`] if the column has the wrong length.
    pub fn add_column(&mut self, column: Column) -> MetricResult<usize> {
        if column.len() != self.node_count {
            return Err(MetricError::NodeCountMismatch {
                expected: self.node_count,
                actual: column.len(),
            });
        }
        self.columns.push(column);
        self.modified = true;
        Ok(self.columns.len() - 1)
    }

    /// Append `count` zero-filled, unnamed columns.
    pub fn add_columns(&mut self, count: usize) -> Modified {
        let first = self.columns.len();
        self.columns
            .extend((0..count).map(|_| Column::new(String::new(), self.node_count)));
        self.modified = true;
        Modified::columns(first, count)
    }

    /// Remove and return one column.
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for a bad column.
    pub fn remove_column(&mut self, column: usize) -> MetricResult<Column> {
        self.check_column(column)?;
        self.modified = true;
        Ok(self.columns.remove(column))
    }

    /// Append every column of another table.
    ///
    /// # Errors
    ///
    /// [`MetricError::NodeCountMismatch`] if the node counts differ.
    pub fn append(&mut self, other: &Self) -> MetricResult<Modified> {
        let destinations = vec![ColumnDestination::New; other.column_count()];
        self.append_with(other, &destinations)
    }

    /// Append another table's columns as directed by `destinations`, one
    /// entry per incoming column.
    ///
    /// Overwritten columns take both the values and the metadata of the
    /// incoming column. The returned token spans the lowest to highest
    /// touched column.
    ///
    /// # Errors
    ///
    /// - [`MetricError::NodeCountMismatch`] if the node counts differ
    /// - [`MetricError::InvalidInput`] if `destinations` has the wrong length
    /// - [`MetricError::ColumnOutOfRange`] for an overwrite target outside
    ///   this table; nothing is changed in that case
    pub fn append_with(
        &mut self,
        other: &Self,
        destinations: &[ColumnDestination],
    ) -> MetricResult<Modified> {
        if other.node_count != self.node_count {
            return Err(MetricError::NodeCountMismatch {
                expected: self.node_count,
                actual: other.node_count,
            });
        }
        if destinations.len() != other.column_count() {
            return Err(MetricError::invalid_input(format!(
                "{} destinations for {} incoming columns",
                destinations.len(),
                other.column_count()
            )));
        }
        for dest in destinations {
            if let ColumnDestination::Overwrite(target) = *dest {
                self.check_column(target)?;
            }
        }

        let mut lo = usize::MAX;
        let mut hi = 0;
        for (incoming, dest) in other.columns.iter().zip(destinations) {
            let touched = match *dest {
                ColumnDestination::New => {
                    self.columns.push(incoming.clone());
                    self.columns.len() - 1
                }
                ColumnDestination::Overwrite(target) => {
                    self.columns[target].clone_from(incoming);
                    target
                }
                ColumnDestination::Skip => continue,
            };
            lo = lo.min(touched);
            hi = hi.max(touched + 1);
        }

        if lo == usize::MAX {
            return Ok(Modified::columns(self.columns.len(), 0));
        }
        self.modified = true;
        Ok(Modified::columns(lo, hi - lo))
    }

    /// Find a column by name or 1-based number.
    ///
    /// A purely numeric identifier is a 1-based column number; with
    /// `auto_create` it may name the column one past the end, which is then
    /// created. Any other identifier is matched against column names and,
    /// with `auto_create`, a missing name becomes a new column.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for a number that is 0 or more
    ///   than one past the end (or exactly one past without `auto_create`)
    /// - [`MetricError::ColumnNotFound`] for an unknown name without
    ///   `auto_create`
    pub fn resolve_column(&mut self, id: &str, auto_create: bool) -> MetricResult<usize> {
        let id = id.trim();
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            let count = self.columns.len();
            let number: usize = id.parse()?;
            return match number {
                n if (1..=count).contains(&n) => Ok(n - 1),
                n if n == count + 1 && auto_create => {
                    self.add_column(Column::new(format!("column {n}"), self.node_count))
                }
                n => Err(MetricError::ColumnOutOfRange {
                    column: n.saturating_sub(1),
                    column_count: count,
                }),
            };
        }

        match self.column_index(id) {
            Some(index) => Ok(index),
            None if auto_create => self.add_column(Column::new(id, self.node_count)),
            None => Err(MetricError::ColumnNotFound {
                name: id.to_string(),
            }),
        }
    }

    /// Move every column out, leaving the table empty. Marks it modified.
    pub(crate) fn take_columns(&mut self) -> Vec<Column> {
        self.modified = true;
        std::mem::take(&mut self.columns)
    }

    /// Install columns already known to match the node count.
    pub(crate) fn put_columns(&mut self, columns: Vec<Column>) {
        debug_assert!(columns.iter().all(|c| c.len() == self.node_count));
        self.columns = columns;
        self.modified = true;
    }

    /// Prepare an output column: append a new one or validate an existing
    /// one, then give it `name`.
    pub(crate) fn prepare_output(
        &mut self,
        output: OutputColumn,
        name: &str,
    ) -> MetricResult<usize> {
        let index = match output {
            OutputColumn::New => self.add_column(Column::new(name, self.node_count))?,
            OutputColumn::Existing(index) => {
                self.column_mut(index)?.name = name.to_string();
                index
            }
        };
        Ok(index)
    }

    /// Names carried by more than one column, each listed once in order of
    /// first appearance.
    #[must_use]
    pub fn duplicate_column_names(&self) -> Vec<String> {
        let mut duplicates: Vec<String> = Vec::new();
        for (i, column) in self.columns.iter().enumerate() {
            let repeated = self.columns[i + 1..].iter().any(|c| c.name == column.name);
            if repeated && !duplicates.contains(&column.name) {
                duplicates.push(column.name.clone());
            }
        }
        if !duplicates.is_empty() {
            warn!(
                count = duplicates.len(),
                names = ?duplicates,
                "Table has duplicate column names"
            );
        }
        duplicates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn table_with(values: &[&[f32]]) -> MetricTable {
        let n = values.first().map_or(0, |v| v.len());
        let columns = values
            .iter()
            .enumerate()
            .map(|(i, v)| Column::from_values(format!("c{i}"), v.to_vec()))
            .collect();
        MetricTable::from_columns(n, columns).unwrap()
    }

    #[test]
    fn values_are_bounds_checked() {
        let mut t = table_with(&[&[1.0, 2.0]]);
        assert!(matches!(
            t.value(2, 0),
            Err(MetricError::NodeOutOfRange { node: 2, .. })
        ));
        assert!(matches!(
            t.set_value(0, 1, 0.0),
            Err(MetricError::ColumnOutOfRange { column: 1, .. })
        ));
        let token = t.set_value(1, 0, 7.0).unwrap();
        assert_eq!(token.range(), 0..1);
        assert_eq!(t.value(1, 0).unwrap(), 7.0);
    }

    #[test]
    fn modified_flag_tracks_mutations() {
        let mut t = table_with(&[&[1.0]]);
        assert!(!t.is_modified());
        let _ = t.column_values(0).unwrap();
        assert!(!t.is_modified());
        t.set_column_values(0, &[3.0]).unwrap();
        assert!(t.is_modified());
        t.clear_modified();
        t.edit_column(0, |c| c.comment = "edited".into()).unwrap();
        assert!(t.is_modified());
    }

    #[test]
    fn rows_and_columns() {
        let t = table_with(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        assert_eq!(t.row(1).unwrap(), vec![2.0, 4.0, 6.0]);
        assert_eq!(t.column_values(2).unwrap(), &[5.0, 6.0]);
        assert!(t.row(5).is_err());
    }

    #[test]
    fn add_and_remove_columns() {
        let mut t = MetricTable::new(3);
        let token = t.add_columns(2);
        assert_eq!(token.range(), 0..2);
        assert_eq!(t.column_count(), 2);
        let removed = t.remove_column(0).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(t.column_count(), 1);
        assert!(t.add_column(Column::new("short", 2)).is_err());
    }

    #[test]
    fn append_requires_equal_node_counts() {
        let mut a = table_with(&[&[1.0, 2.0]]);
        let b = table_with(&[&[1.0, 2.0, 3.0]]);
        assert!(matches!(
            a.append(&b),
            Err(MetricError::NodeCountMismatch {
                expected: 2,
                actual: 3
            })
        ));
        let c = table_with(&[&[5.0, 6.0], &[7.0, 8.0]]);
        let token = a.append(&c).unwrap();
        assert_eq!(token.range(), 1..3);
        assert_eq!(a.column_values(2).unwrap(), &[7.0, 8.0]);
    }

    #[test]
    fn append_with_destination_map() {
        let mut a = table_with(&[&[1.0, 1.0], &[2.0, 2.0]]);
        let b = table_with(&[&[8.0, 8.0], &[9.0, 9.0], &[10.0, 10.0]]);
        let dest = [
            ColumnDestination::Skip,
            ColumnDestination::Overwrite(0),
            ColumnDestination::New,
        ];
        a.append_with(&b, &dest).unwrap();
        assert_eq!(a.column_count(), 3);
        assert_eq!(a.column_values(0).unwrap(), &[9.0, 9.0]);
        assert_eq!(a.column(0).unwrap().name, "c1");
        assert_eq!(a.column_values(1).unwrap(), &[2.0, 2.0]);
        assert_eq!(a.column_values(2).unwrap(), &[10.0, 10.0]);
    }

    #[test]
    fn append_with_bad_target_changes_nothing() {
        let mut a = table_with(&[&[1.0]]);
        let b = table_with(&[&[2.0], &[3.0]]);
        let dest = [ColumnDestination::New, ColumnDestination::Overwrite(4)];
        assert!(a.append_with(&b, &dest).is_err());
        assert_eq!(a.column_count(), 1);
        assert!(a.append_with(&b, &dest[..1]).is_err());
    }

    #[test]
    fn resolve_by_number() {
        let mut t = table_with(&[&[1.0], &[2.0]]);
        assert_eq!(t.resolve_column("2", false).unwrap(), 1);
        assert!(t.resolve_column("3", false).is_err());
        assert_eq!(t.resolve_column("3", true).unwrap(), 2);
        assert_eq!(t.column_count(), 3);
        // Only one past the end may be created.
        assert!(t.resolve_column("5", true).is_err());
        assert!(t.resolve_column("0", true).is_err());
    }

    #[test]
    fn resolve_by_name() {
        let mut t = table_with(&[&[1.0], &[2.0]]);
        assert_eq!(t.resolve_column("c1", false).unwrap(), 1);
        assert!(matches!(
            t.resolve_column("depth", false),
            Err(MetricError::ColumnNotFound { .. })
        ));
        assert_eq!(t.resolve_column("depth", true).unwrap(), 2);
        assert_eq!(t.column(2).unwrap().name, "depth");
        // Mixed identifiers are names, not numbers.
        assert_eq!(t.resolve_column("2a", true).unwrap(), 3);
    }

    #[test]
    fn duplicate_audit() {
        let mut t = MetricTable::new(1);
        for name in ["a", "b", "a", "c", "b", "a"] {
            t.add_column(Column::new(name, 1)).unwrap();
        }
        assert_eq!(t.duplicate_column_names(), vec!["a", "b"]);
    }

    #[test]
    fn equality_ignores_modified_flag() {
        let a = table_with(&[&[1.0]]);
        let mut b = a.clone();
        b.set_value(0, 0, 1.0).unwrap();
        assert_eq!(a, b);
    }
}
