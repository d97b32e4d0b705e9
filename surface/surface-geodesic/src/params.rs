//! Geodesic engine parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use surface_types::Roi;

/// Parameters for building a [`GeodesicEngine`](crate::GeodesicEngine).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodesicParams {
    /// Also relax across two-hop links over shared edges. Default: false.
    pub smoothed: bool,

    /// Restrict the search to these nodes. Default: every node.
    pub roi: Option<Roi>,
}

impl GeodesicParams {
    /// Creates new parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the smoothed two-hop graph.
    #[must_use]
    pub const fn with_smoothed(mut self, smoothed: bool) -> Self {
        self.smoothed = smoothed;
        self
    }

    /// Restricts the search to an ROI.
    #[must_use]
    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = Some(roi);
        self
    }
}
