//! Region-of-interest node mask.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// Boolean mask selecting which nodes take part in a computation.
///
/// Kernels accept `Option<&Roi>`; `None` means every node participates.
/// See [`Roi::includes`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Roi {
    mask: Vec<bool>,
}

impl Roi {
    /// Mask selecting all `node_count` nodes.
    #[must_use]
    pub fn all(node_count: usize) -> Self {
        Self {
            mask: vec![true; node_count],
        }
    }

    /// Mask selecting no nodes.
    #[must_use]
    pub fn none(node_count: usize) -> Self {
        Self {
            mask: vec![false; node_count],
        }
    }

    /// Wrap an existing boolean mask.
    #[must_use]
    pub const fn from_mask(mask: Vec<bool>) -> Self {
        Self { mask }
    }

    /// Mask selecting exactly the listed nodes. Out-of-range entries are ignored.
    #[must_use]
    pub fn from_nodes(node_count: usize, nodes: &[usize]) -> Self {
        let mut roi = Self::none(node_count);
        for &n in nodes {
            roi.set(n, true);
        }
        roi
    }

    /// Length of the mask.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    /// True when the mask has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Whether a node is selected. Out-of-range nodes are not.
    #[inline]
    #[must_use]
    pub fn contains(&self, node: usize) -> bool {
        self.mask.get(node).copied().unwrap_or(false)
    }

    /// Select or deselect a node. Out-of-range nodes are ignored.
    pub fn set(&mut self, node: usize, selected: bool) {
        if let Some(slot) = self.mask.get_mut(node) {
            *slot = selected;
        }
    }

    /// Number of selected nodes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Raw mask.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.mask
    }

    /// Check that the mask covers exactly `node_count` nodes.
    ///
    /// # Errors
    ///
    /// [`MeshError::RoiLength`] on a length mismatch.
    pub fn check_len(&self, node_count: usize) -> MeshResult<()> {
        if self.mask.len() == node_count {
            Ok(())
        } else {
            Err(MeshError::RoiLength {
                expected: node_count,
                actual: self.mask.len(),
            })
        }
    }

    /// Whether `node` participates under an optional mask.
    #[inline]
    #[must_use]
    pub fn includes(roi: Option<&Self>, node: usize) -> bool {
        roi.is_none_or(|r| r.contains(node))
    }
}
