#![warn(missing_docs)]
//! Approximate perceptual color of monochromatic light.
//!
//! The mapping is a piecewise-linear approximation of the visible spectrum. It is only used for
//! annotating a visualization and has no influence on any physical calculation.
use std::fmt::Display;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

/// A color with 8 bit per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// red channel
    pub r: u8,
    /// green channel
    pub g: u8,
    /// blue channel
    pub b: u8,
}
impl Rgb {
    /// Create a new [`Rgb`] color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
/// Formats the color in CSS notation, e.g. `rgb(0, 255, 0)`.
impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}
impl From<Rgb> for RGBColor {
    fn from(rgb: Rgb) -> Self {
        Self(rgb.r, rgb.g, rgb.b)
    }
}

/// Lower limit of the visible range in nanometers.
pub const VISIBLE_MIN_NM: f64 = 380.0;
/// Upper limit of the visible range in nanometers.
pub const VISIBLE_MAX_NM: f64 = 780.0;

/// Calculate the (unscaled) red, green and blue intensities for the given wavelength.
///
/// Each band ramps one channel linearly while the others are kept constant. Outside the visible
/// range all channels are zero.
fn band_channels(lambda: f64) -> (f64, f64, f64) {
    if (380.0..440.0).contains(&lambda) {
        (-(lambda - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if (440.0..490.0).contains(&lambda) {
        (0.0, (lambda - 440.0) / (490.0 - 440.0), 1.0)
    } else if (490.0..510.0).contains(&lambda) {
        (0.0, 1.0, -(lambda - 510.0) / (510.0 - 490.0))
    } else if (510.0..580.0).contains(&lambda) {
        ((lambda - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if (580.0..645.0).contains(&lambda) {
        (1.0, -(lambda - 645.0) / (645.0 - 580.0), 0.0)
    } else if (645.0..=780.0).contains(&lambda) {
        (1.0, 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0)
    }
}
/// Intensity falloff towards the limits of the visible range.
fn intensity_factor(lambda: f64) -> f64 {
    if (380.0..420.0).contains(&lambda) {
        0.3 + 0.7 * (lambda - 380.0) / (420.0 - 380.0)
    } else if (420.0..645.0).contains(&lambda) {
        1.0
    } else if (645.0..=780.0).contains(&lambda) {
        0.3 + 0.7 * (780.0 - lambda) / (780.0 - 645.0)
    } else {
        0.0
    }
}
fn to_channel(intensity: f64, factor: f64) -> u8 {
    let value = (255.0 * intensity.max(0.0) * factor).round().clamp(0.0, 255.0);
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let channel = value as u8;
    channel
}
/// Map a wavelength (in nanometers) to an [`Rgb`] color.
///
/// This function is total: wavelengths outside the visible range (380 - 780 nm) as well as `NaN`
/// are mapped to black. Near the limits of the visible range the color is dimmed down to 30 %.
///
/// # Example
/// ```
/// use slab_optics::spectral_color::{wavelength_to_color, Rgb};
///
/// assert_eq!(wavelength_to_color(440.0), Rgb::new(0, 0, 255));
/// assert_eq!(wavelength_to_color(1064.0), Rgb::new(0, 0, 0));
/// ```
#[must_use]
pub fn wavelength_to_color(lambda_nm: f64) -> Rgb {
    let (r, g, b) = band_channels(lambda_nm);
    let factor = intensity_factor(lambda_nm);
    Rgb {
        r: to_channel(r, factor),
        g: to_channel(g, factor),
        b: to_channel(b, factor),
    }
}
/// Map a wavelength given as [`Length`] to an [`Rgb`] color.
///
/// See [`wavelength_to_color`].
#[must_use]
pub fn length_to_color(wavelength: Length) -> Rgb {
    wavelength_to_color(wavelength.get::<nanometer>())
}
