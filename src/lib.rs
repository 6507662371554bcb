//! This is the documentation for the **slab_optics** package.
//!
//! It calculates (and draws) two effects of a flat, plane-parallel slab (e.g. a glass window) on
//! light:
//!   - the lateral displacement of a beam passing a tilted slab ([`beam_offset`])
//!   - the longitudinal shift of the focus of a converging beam passing a slab ([`focus_shift`])
//!
//! In addition, the approximate perceptual color of a wavelength can be calculated
//! ([`spectral_color`]). It is used for coloring the drawn beam.
#![allow(clippy::module_name_repetitions)]

pub mod beam_offset;
pub mod console;
pub mod error;
pub mod focus_shift;
pub mod geometry;
pub mod layout;
pub mod refraction;
pub mod render;
pub mod slab;
pub mod spectral_color;
pub mod utils;

/// Return the version information of the currently built executable.
///
/// This function returns a `String` containing the package name and its version number.
#[must_use]
pub fn get_version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
#[cfg(test)]
mod test {
    use super::*;
    use regex::Regex;
    #[test]
    fn get_ver() {
        let version_string = get_version();
        let re = Regex::new(r"^slab_optics \d+\.\d+\.\d+").unwrap();
        assert!(re.is_match(&version_string));
    }
}
