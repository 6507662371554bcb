#![warn(missing_docs)]
//! Drawing configuration used for deriving the visualization geometry.
//!
//! All values are given in canvas pixels (x axis pointing right, y axis pointing down) unless
//! stated otherwise. A [`CanvasLayout`] can be stored as / read from a YAML document. Missing
//! entries are replaced by their default values.
use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{SlabError, SlabResult};

/// Geometry constants of the two visualizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasLayout {
    /// width of the canvas
    pub width: u32,
    /// height of the canvas
    pub height: u32,
    /// pixels per millimeter
    pub scale_factor: f64,
    /// minimum drawn thickness of the tilted slab
    pub min_slab_thickness_px: f64,
    /// drawn length of the tilted slab as fraction of the canvas height
    pub slab_length_ratio: f64,
    /// beam width as fraction of the lateral displacement (in pixels)
    pub beam_width_ratio: f64,
    /// minimum beam width
    pub min_beam_width_px: f64,
    /// maximum beam width
    pub max_beam_width_px: f64,
    /// beam width used if the slab has zero thickness
    pub straight_beam_width_px: f64,
    /// width of the undeviated (dashed) beam path as fraction of the beam width
    pub continuation_width_ratio: f64,
    /// x position of the front face of the focus slab as fraction of the canvas width
    pub focus_slab_x_ratio: f64,
    /// upper edge of the focus slab as fraction of the canvas height
    pub focus_slab_top_ratio: f64,
    /// height of the focus slab as fraction of the canvas height
    pub focus_slab_height_ratio: f64,
    /// x position of the virtual focus as fraction of the canvas width
    pub virtual_focus_x_ratio: f64,
    /// x position where all traced rays start
    pub ray_start_x: f64,
    /// vertical distance of the outer rays from the optical axis
    pub ray_spacing: f64,
}
impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            scale_factor: 10.0,
            min_slab_thickness_px: 5.0,
            slab_length_ratio: 0.9,
            beam_width_ratio: 0.3,
            min_beam_width_px: 1.0,
            max_beam_width_px: 20.0,
            straight_beam_width_px: 2.0,
            continuation_width_ratio: 0.2,
            focus_slab_x_ratio: 0.5,
            focus_slab_top_ratio: 0.2,
            focus_slab_height_ratio: 0.6,
            virtual_focus_x_ratio: 0.8,
            ray_start_x: 50.0,
            ray_spacing: 80.0,
        }
    }
}
impl CanvasLayout {
    /// Read a [`CanvasLayout`] from a YAML file.
    ///
    /// # Errors
    ///
    /// This function returns an error if the file cannot be read, is not valid YAML or contains
    /// values for which [`CanvasLayout::check`] fails.
    pub fn from_file(path: &Path) -> SlabResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SlabError::Layout(format!("cannot read file {} : {}", path.display(), e))
        })?;
        let layout = Self::from_yaml(&contents)?;
        info!("Canvas layout read from {}", path.display());
        Ok(layout)
    }
    /// Parse a [`CanvasLayout`] from a YAML string.
    ///
    /// # Errors
    ///
    /// This function returns an error if the string cannot be parsed or the layout is not valid.
    pub fn from_yaml(yaml: &str) -> SlabResult<Self> {
        let layout: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SlabError::Layout(format!("parsing of layout failed: {e}")))?;
        layout.check()?;
        Ok(layout)
    }
    /// Serialize this [`CanvasLayout`] to a YAML string.
    ///
    /// # Errors
    ///
    /// This function returns an error if the serialization fails.
    pub fn to_yaml(&self) -> SlabResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SlabError::Layout(format!("serialization of layout failed: {e}")))
    }
    /// Check the consistency of this [`CanvasLayout`].
    ///
    /// # Errors
    ///
    /// This function returns an error if
    ///   - the canvas has a zero width or height
    ///   - the scale factor is not positive and finite
    ///   - any other value is negative or not finite
    ///   - the minimum beam width is larger than the maximum beam width
    pub fn check(&self) -> SlabResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlabError::Layout("canvas size must be > 0".into()));
        }
        if !self.scale_factor.is_normal() || self.scale_factor.is_sign_negative() {
            return Err(SlabError::Layout(
                "scale factor must be > 0.0 and finite".into(),
            ));
        }
        let values = [
            self.min_slab_thickness_px,
            self.slab_length_ratio,
            self.beam_width_ratio,
            self.min_beam_width_px,
            self.max_beam_width_px,
            self.straight_beam_width_px,
            self.continuation_width_ratio,
            self.focus_slab_x_ratio,
            self.focus_slab_top_ratio,
            self.focus_slab_height_ratio,
            self.virtual_focus_x_ratio,
            self.ray_start_x,
            self.ray_spacing,
        ];
        if values.iter().any(|v| !v.is_finite() || v.is_sign_negative()) {
            return Err(SlabError::Layout(
                "layout values must be >= 0.0 and finite".into(),
            ));
        }
        if self.min_beam_width_px > self.max_beam_width_px {
            return Err(SlabError::Layout(
                "minimum beam width must not exceed maximum beam width".into(),
            ));
        }
        Ok(())
    }
    /// Returns the canvas width as floating point value.
    #[must_use]
    pub fn width_px(&self) -> f64 {
        f64::from(self.width)
    }
    /// Returns the canvas height as floating point value.
    #[must_use]
    pub fn height_px(&self) -> f64 {
        f64::from(self.height)
    }
}
