#![warn(missing_docs)]
//! Parameters of a plane-parallel slab (e.g. a glass window)
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::millimeter};

use crate::error::{SlabError, SlabResult};

/// Refractive index of the ambient medium surrounding the slab (air / vacuum).
pub const AMBIENT_REFRACTIVE_INDEX: f64 = 1.0;

/// A flat, parallel-faced block of transparent material.
///
/// The refractive index is wavelength independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabParameters {
    refractive_index: f64,
    thickness_mm: f64,
}
impl Default for SlabParameters {
    /// Create a window with a refractive index of 1.5 and a thickness of 10 mm.
    fn default() -> Self {
        Self {
            refractive_index: 1.5,
            thickness_mm: 10.0,
        }
    }
}
impl SlabParameters {
    /// Create new [`SlabParameters`] from a refractive index and a thickness given in millimeters.
    ///
    /// # Errors
    ///
    /// The checks are performed in the following order. The first failing check determines the error:
    ///   - [`SlabError::InvalidInput`] if one of the values is `NaN` or infinite
    ///   - [`SlabError::InvalidRefractiveIndex`] if the refractive index is < 1.0
    ///   - [`SlabError::InvalidThickness`] if the thickness is < 0.0
    pub fn new(refractive_index: f64, thickness_mm: f64) -> SlabResult<Self> {
        let slab = Self {
            refractive_index,
            thickness_mm,
        };
        slab.validate()?;
        Ok(slab)
    }
    /// Create new [`SlabParameters`] without any checks.
    ///
    /// Used for input records which are validated as a whole later on.
    pub(crate) const fn new_unchecked(refractive_index: f64, thickness_mm: f64) -> Self {
        Self {
            refractive_index,
            thickness_mm,
        }
    }
    /// Create new [`SlabParameters`] from a refractive index and a thickness as [`Length`].
    ///
    /// # Errors
    ///
    /// Same as [`SlabParameters::new`].
    pub fn from_length(refractive_index: f64, thickness: Length) -> SlabResult<Self> {
        Self::new(refractive_index, thickness.get::<millimeter>())
    }
    /// Check the parameters.
    ///
    /// This function is also called by the calculation engines since a [`SlabParameters`] could have
    /// been deserialized from untrusted data.
    ///
    /// # Errors
    ///
    /// See [`SlabParameters::new`].
    pub fn validate(&self) -> SlabResult<()> {
        if !self.refractive_index.is_finite() || !self.thickness_mm.is_finite() {
            return Err(SlabError::InvalidInput);
        }
        self.validate_ranges()
    }
    /// Check only the value ranges of the parameters (assuming they are finite numbers).
    pub(crate) fn validate_ranges(&self) -> SlabResult<()> {
        if self.refractive_index < AMBIENT_REFRACTIVE_INDEX {
            return Err(SlabError::InvalidRefractiveIndex);
        }
        if self.thickness_mm < 0.0 {
            return Err(SlabError::InvalidThickness);
        }
        Ok(())
    }
    /// Returns the refractive index of this [`SlabParameters`].
    #[must_use]
    pub const fn refractive_index(&self) -> f64 {
        self.refractive_index
    }
    /// Returns the thickness in millimeters.
    #[must_use]
    pub const fn thickness_mm(&self) -> f64 {
        self.thickness_mm
    }
    /// Returns the thickness of this [`SlabParameters`].
    #[must_use]
    pub fn thickness(&self) -> Length {
        Length::new::<millimeter>(self.thickness_mm)
    }
}
