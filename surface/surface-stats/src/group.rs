//! Borrowed-or-owned float arrays fed to the primitives.

use std::ops::Deref;

/// One group of samples.
///
/// Callers either lend an existing buffer (a table column, a row slice) or
/// hand over a freshly computed vector. Primitives only ever read through
/// [`DataGroup::as_slice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataGroup<'a> {
    /// Points at the caller's buffer.
    Borrowed(&'a [f32]),
    /// Owns its values.
    Owned(Vec<f32>),
}

impl DataGroup<'_> {
    /// View the samples.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        match self {
            Self::Borrowed(values) => values,
            Self::Owned(values) => values,
        }
    }

    /// Take ownership of the samples, copying if borrowed.
    #[must_use]
    pub fn into_owned(self) -> Vec<f32> {
        match self {
            Self::Borrowed(values) => values.to_vec(),
            Self::Owned(values) => values,
        }
    }
}

impl Deref for DataGroup<'_> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.as_slice()
    }
}

impl<'a> From<&'a [f32]> for DataGroup<'a> {
    fn from(values: &'a [f32]) -> Self {
        Self::Borrowed(values)
    }
}

impl From<Vec<f32>> for DataGroup<'_> {
    fn from(values: Vec<f32>) -> Self {
        Self::Owned(values)
    }
}

/// Iterate every sample of every group as `f64`.
pub(crate) fn flatten<'g>(groups: &'g [DataGroup<'_>]) -> impl Iterator<Item = f64> + 'g {
    groups
        .iter()
        .flat_map(|g| g.as_slice().iter().map(|&v| f64::from(v)))
}

/// Total number of samples across groups.
pub(crate) fn total_len(groups: &[DataGroup<'_>]) -> usize {
    groups.iter().map(|g| g.len()).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_and_owned_read_the_same() {
        let data = [1.0f32, 2.0, 3.0];
        let borrowed = DataGroup::from(&data[..]);
        let owned = DataGroup::from(data.to_vec());
        assert_eq!(borrowed.as_slice(), owned.as_slice());
        assert_eq!(borrowed.len(), 3);
        assert_eq!(borrowed.into_owned(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn flatten_walks_all_groups() {
        let a = [1.0f32, 2.0];
        let groups = [DataGroup::from(&a[..]), DataGroup::from(vec![3.0f32])];
        let all: Vec<f64> = flatten(&groups).collect();
        assert_eq!(all, vec![1.0, 2.0, 3.0]);
        assert_eq!(total_len(&groups), 3);
    }
}
