//! Smoothing parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SmoothError, SmoothResult};

/// Parameters for neighbor-average smoothing.
///
/// Each iteration blends a node with the mean of its neighbors:
/// `out = (1 - strength) * value + strength * mean(neighbors)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothingParams {
    /// Blend factor in `[0, 1]`. Default: 0.5.
    pub strength: f32,

    /// Number of passes; 0 leaves values untouched. Default: 10.
    pub iterations: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            strength: 0.5,
            iterations: 10,
        }
    }
}

impl SmoothingParams {
    /// Creates new parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the blend factor.
    #[must_use]
    pub const fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the number of passes.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Check that the strength lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`SmoothError::InvalidStrength`] otherwise.
    pub fn validate(&self) -> SmoothResult<()> {
        if (0.0..=1.0).contains(&self.strength) {
            Ok(())
        } else {
            Err(SmoothError::InvalidStrength {
                strength: self.strength,
            })
        }
    }
}
