//! A single named scalar column with display metadata.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One column of a [`MetricTable`](crate::MetricTable).
///
/// Values are private so that a column's length always matches the node
/// count of the table that owns it; metadata fields are plain data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    /// Display name. Not required to be unique.
    pub name: String,
    /// Free-text comment, typically a record of how the column was made.
    pub comment: String,
    /// Color palette range `(min, max)`.
    pub color_mapping: (f32, f32),
    /// Display thresholds `(negative, positive)`.
    pub threshold: (f32, f32),
    /// Sample (average) thresholds `(negative, positive)`.
    pub average_threshold: (f32, f32),
    /// Opaque, coded set of bibliographic links.
    pub study_metadata: String,
    values: Vec<f32>,
}

impl Column {
    /// Zero-filled column of `node_count` values.
    #[must_use]
    pub fn new(name: impl Into<String>, node_count: usize) -> Self {
        Self::from_values(name, vec![0.0; node_count])
    }

    /// Column wrapping existing values.
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            color_mapping: (-1.0, 1.0),
            threshold: (0.0, 0.0),
            average_threshold: (0.0, 0.0),
            study_metadata: String::new(),
            values,
        }
    }

    /// Builder-style comment setter.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Builder-style color mapping setter.
    #[must_use]
    pub const fn with_color_mapping(mut self, min: f32, max: f32) -> Self {
        self.color_mapping = (min, max);
        self
    }

    /// Column values, one per node.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a column over zero nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy every metadata field (not the values) from another column.
    pub fn copy_metadata_from(&mut self, other: &Self) {
        self.name.clone_from(&other.name);
        self.comment.clone_from(&other.comment);
        self.color_mapping = other.color_mapping;
        self.threshold = other.threshold;
        self.average_threshold = other.average_threshold;
        self.study_metadata.clone_from(&other.study_metadata);
    }

    /// Append a line to the comment.
    pub fn append_comment(&mut self, text: &str) {
        if !self.comment.is_empty() && !self.comment.ends_with('\n') {
            self.comment.push('\n');
        }
        self.comment.push_str(text);
    }

    /// Smallest and largest finite value, `None` when there are none.
    #[must_use]
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub(crate) fn replace_values(&mut self, values: Vec<f32>) {
        self.values = values;
    }
}
