#![warn(missing_docs)]
//! Lateral beam displacement caused by a tilted plane-parallel slab.
//!
//! A collimated beam hits a slab (window) of thickness `t` and refractive index `n` under the
//! angle of incidence `θ1`. Inside the slab the beam propagates under the refraction angle `θ2`
//! (Snell's law with an ambient refractive index of 1.0). After leaving the slab the beam is
//! parallel to the incoming beam but laterally shifted by
//!
//! `d = t * sin(θ1 - θ2) / cos(θ2)`
//!
//! Besides the numbers, [`compute_beam_offset`] also derives the drawing geometry (see
//! [`BeamGeometry`]) so that a renderer does not need any knowledge about the physics.
use log::{debug, warn};
use nalgebra::Point2;
use num::Zero;
use serde::{Deserialize, Serialize};
use uom::si::f64::{Angle, Length};

use crate::{
    error::{SlabError, SlabResult},
    geometry::{RotatedRect, Segment},
    layout::CanvasLayout,
    millimeter, radian,
    refraction::snell_angle,
    slab::{SlabParameters, AMBIENT_REFRACTIVE_INDEX},
    spectral_color::{wavelength_to_color, Rgb},
};

/// Below this value the cosine of an angle is considered to be zero.
const COS_EPSILON: f64 = 1e-9;

/// Input parameters of a beam offset calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamInput {
    /// angle of incidence in degrees. Must be within the open interval (-90°, 90°).
    pub incidence_angle_deg: f64,
    /// wavelength of the beam in nanometers. It only determines the color of the drawn beam.
    pub wavelength_nm: f64,
    /// the tilted slab
    pub slab: SlabParameters,
}
impl Default for BeamInput {
    /// A green beam hitting a 10 mm window (n = 1.5) under 30°.
    fn default() -> Self {
        Self {
            incidence_angle_deg: 30.0,
            wavelength_nm: 550.0,
            slab: SlabParameters::default(),
        }
    }
}
impl BeamInput {
    /// Create a new [`BeamInput`].
    ///
    /// The values are not checked here but during [`compute_beam_offset`].
    #[must_use]
    pub const fn new(
        incidence_angle_deg: f64,
        refractive_index: f64,
        thickness_mm: f64,
        wavelength_nm: f64,
    ) -> Self {
        Self {
            incidence_angle_deg,
            wavelength_nm,
            slab: SlabParameters::new_unchecked(refractive_index, thickness_mm),
        }
    }
    /// Check the input values.
    ///
    /// # Errors
    ///
    /// The checks are performed in the following order. The first failing check determines the error:
    ///   - [`SlabError::InvalidInput`] if any value is `NaN` or infinite
    ///   - [`SlabError::InvalidRefractiveIndex`] if the refractive index is < 1.0
    ///   - [`SlabError::InvalidThickness`] if the thickness is < 0.0
    ///   - [`SlabError::InvalidAngle`] if the angle of incidence is not within (-90°, 90°)
    pub fn validate(&self) -> SlabResult<()> {
        let values = [
            self.incidence_angle_deg,
            self.slab.refractive_index(),
            self.slab.thickness_mm(),
            self.wavelength_nm,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SlabError::InvalidInput);
        }
        self.slab.validate_ranges()?;
        if self.incidence_angle_deg <= -90.0 || self.incidence_angle_deg >= 90.0 {
            return Err(SlabError::InvalidAngle);
        }
        Ok(())
    }
}

/// The tilted slab together with the beam path through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltedSlabGeometry {
    /// outline of the slab, rotated by the negative angle of incidence
    pub slab: RotatedRect,
    /// point where the beam enters the slab
    pub entry_point: Point2<f64>,
    /// point where the beam leaves the slab
    pub exit_point: Point2<f64>,
    /// angle of incidence in radians
    pub incidence_angle_rad: f64,
    /// refraction angle inside the slab in radians
    pub refracted_angle_rad: f64,
    /// beam from the left canvas border to the entry point
    pub incoming: Segment,
    /// beam inside the slab
    pub inside: Segment,
    /// beam from the exit point to the right canvas border
    pub outgoing: Segment,
    /// undeviated beam path from the entry point to the right canvas border (drawn dashed)
    pub continuation: Segment,
    /// width of the drawn beam. It scales with the displacement.
    pub beam_width: f64,
    /// width of the continuation line
    pub continuation_width: f64,
}

/// Drawing geometry of a beam offset calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeamGeometry {
    /// The slab has zero thickness. The beam passes straight through the canvas, no slab is drawn.
    Straight {
        /// the beam
        beam: Segment,
        /// width of the beam
        width: f64,
    },
    /// Regular case: tilted slab with refracted beam.
    Tilted(TiltedSlabGeometry),
    /// The angle of incidence is so close to ±90° that the beam path cannot be drawn meaningfully.
    Grazing {
        /// outline of the slab
        slab: RotatedRect,
    },
}

/// Result of a beam offset calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamResult {
    incidence_angle_rad: f64,
    refracted_angle_rad: f64,
    lateral_displacement_mm: f64,
    beam_color: Rgb,
    geometry: BeamGeometry,
}
impl BeamResult {
    /// Returns the angle of incidence in radians.
    #[must_use]
    pub const fn incidence_angle_rad(&self) -> f64 {
        self.incidence_angle_rad
    }
    /// Returns the refraction angle inside the slab in radians.
    #[must_use]
    pub const fn refracted_angle_rad(&self) -> f64 {
        self.refracted_angle_rad
    }
    /// Returns the refraction angle inside the slab.
    #[must_use]
    pub fn refracted_angle(&self) -> Angle {
        radian!(self.refracted_angle_rad)
    }
    /// Returns the signed lateral displacement in millimeters.
    ///
    /// The sign follows the sign of `θ1 - θ2` and thus the sign of the angle of incidence.
    #[must_use]
    pub const fn lateral_displacement_mm(&self) -> f64 {
        self.lateral_displacement_mm
    }
    /// Returns the signed lateral displacement.
    #[must_use]
    pub fn lateral_displacement(&self) -> Length {
        millimeter!(self.lateral_displacement_mm)
    }
    /// Returns the color of the beam derived from its wavelength.
    #[must_use]
    pub const fn beam_color(&self) -> Rgb {
        self.beam_color
    }
    /// Returns the drawing geometry.
    #[must_use]
    pub const fn geometry(&self) -> &BeamGeometry {
        &self.geometry
    }
}

/// Calculate the lateral displacement of a beam passing a tilted slab.
///
/// The drawing geometry is derived using the default [`CanvasLayout`].
///
/// # Errors
///
/// This function returns a validation error if the input is invalid (see [`BeamInput::validate`]).
/// In this case no geometry is produced and a previous visualization should be cleared.
///
/// # Example
/// ```
/// use slab_optics::beam_offset::{compute_beam_offset, BeamInput};
///
/// let result = compute_beam_offset(&BeamInput::new(30.0, 1.5, 10.0, 550.0)).unwrap();
/// assert!((result.refracted_angle_rad().to_degrees() - 19.471).abs() < 1e-3);
/// assert!((result.lateral_displacement_mm() - 1.938).abs() < 1e-3);
/// ```
pub fn compute_beam_offset(input: &BeamInput) -> SlabResult<BeamResult> {
    compute_beam_offset_with_layout(input, &CanvasLayout::default())
}

/// Calculate the lateral displacement of a beam passing a tilted slab using the given [`CanvasLayout`]
/// for deriving the drawing geometry.
///
/// # Errors
///
/// This function returns
///   - a validation error if the input is invalid (see [`BeamInput::validate`])
///   - [`SlabError::Layout`] if the layout is inconsistent (see [`CanvasLayout::check`])
pub fn compute_beam_offset_with_layout(
    input: &BeamInput,
    layout: &CanvasLayout,
) -> SlabResult<BeamResult> {
    input.validate()?;
    layout.check()?;
    let thickness_mm = input.slab.thickness_mm();
    let theta1 = input.incidence_angle_deg.to_radians();
    let theta2 = snell_angle(
        theta1,
        AMBIENT_REFRACTIVE_INDEX,
        input.slab.refractive_index(),
    );
    let displacement = if thickness_mm.is_zero() {
        0.0
    } else {
        lateral_displacement(theta1, theta2, thickness_mm)
    };
    debug!(
        "beam offset: theta1={theta1} rad, theta2={theta2} rad, displacement={displacement} mm"
    );
    let geometry = derive_geometry(theta1, theta2, thickness_mm, displacement, layout);
    Ok(BeamResult {
        incidence_angle_rad: theta1,
        refracted_angle_rad: theta2,
        lateral_displacement_mm: displacement,
        beam_color: wavelength_to_color(input.wavelength_nm),
        geometry,
    })
}

fn lateral_displacement(theta1: f64, theta2: f64, thickness_mm: f64) -> f64 {
    let cos_theta2 = theta2.cos();
    if cos_theta2.abs() <= COS_EPSILON {
        warn!("Refracted beam nearly parallel to the slab surface. Displacement set to zero.");
        return 0.0;
    }
    thickness_mm * (theta1 - theta2).sin() / cos_theta2
}

fn derive_geometry(
    theta1: f64,
    theta2: f64,
    thickness_mm: f64,
    displacement_mm: f64,
    layout: &CanvasLayout,
) -> BeamGeometry {
    let width = layout.width_px();
    let center = Point2::new(width / 2.0, layout.height_px() / 2.0);
    if thickness_mm <= 0.0 {
        return BeamGeometry::Straight {
            beam: Segment::new(Point2::new(0.0, center.y), Point2::new(width, center.y)),
            width: layout.straight_beam_width_px,
        };
    }
    let half_thickness = (thickness_mm * layout.scale_factor).max(layout.min_slab_thickness_px) / 2.0;
    let slab = RotatedRect {
        center,
        half_width: half_thickness,
        half_height: layout.height_px() * layout.slab_length_ratio / 2.0,
        rotation: -theta1,
    };
    let cos_theta1 = theta1.cos();
    if cos_theta1.abs() < COS_EPSILON {
        warn!("Beam visualization inaccurate near ±90° incidence.");
        return BeamGeometry::Grazing { slab };
    }
    let displacement_px = displacement_mm * layout.scale_factor;
    let beam_width = (displacement_px * layout.beam_width_ratio)
        .abs()
        .clamp(layout.min_beam_width_px, layout.max_beam_width_px);
    let entry_point = Point2::new(center.x - half_thickness / cos_theta1, center.y);
    let exit_point = Point2::new(
        center.x + half_thickness / cos_theta1 + displacement_px * theta1.tan(),
        center.y + displacement_px,
    );
    BeamGeometry::Tilted(TiltedSlabGeometry {
        slab,
        entry_point,
        exit_point,
        incidence_angle_rad: theta1,
        refracted_angle_rad: theta2,
        incoming: Segment::new(Point2::new(0.0, center.y), entry_point),
        inside: Segment::new(entry_point, exit_point),
        outgoing: Segment::new(exit_point, Point2::new(width, exit_point.y)),
        continuation: Segment::new(entry_point, Point2::new(width, center.y)),
        beam_width,
        continuation_width: (beam_width * layout.continuation_width_ratio)
            .max(layout.min_beam_width_px),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::{check_no_warnings, check_warnings};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;
    use uom::si::{angle::degree, length::millimeter};

    fn offset(angle: f64, n: f64, t: f64) -> f64 {
        compute_beam_offset(&BeamInput::new(angle, n, t, 550.0))
            .unwrap()
            .lateral_displacement_mm()
    }
    #[test]
    fn default_input() {
        let input = BeamInput::default();
        assert_eq!(input.incidence_angle_deg, 30.0);
        assert_eq!(input.wavelength_nm, 550.0);
        assert!(input.validate().is_ok());
    }
    #[test]
    fn validation() {
        let check = |a, n, t, w| compute_beam_offset(&BeamInput::new(a, n, t, w));
        assert_matches!(check(f64::NAN, 1.5, 5.0, 550.0), Err(SlabError::InvalidInput));
        assert_matches!(check(10.0, f64::NAN, 5.0, 550.0), Err(SlabError::InvalidInput));
        assert_matches!(check(10.0, 1.5, f64::NAN, 550.0), Err(SlabError::InvalidInput));
        assert_matches!(check(10.0, 1.5, 5.0, f64::NAN), Err(SlabError::InvalidInput));
        assert_matches!(
            check(10.0, 1.5, 5.0, f64::INFINITY),
            Err(SlabError::InvalidInput)
        );
        assert_matches!(
            check(10.0, 0.99, 5.0, 550.0),
            Err(SlabError::InvalidRefractiveIndex)
        );
        assert_matches!(
            check(10.0, 1.5, -0.5, 550.0),
            Err(SlabError::InvalidThickness)
        );
        assert_matches!(check(90.0, 1.5, 5.0, 550.0), Err(SlabError::InvalidAngle));
        assert_matches!(check(-90.0, 1.5, 5.0, 550.0), Err(SlabError::InvalidAngle));
        assert_matches!(check(120.0, 1.5, 5.0, 550.0), Err(SlabError::InvalidAngle));
        assert!(check(89.9, 1.5, 5.0, 550.0).is_ok());
        assert!(check(-89.9, 1.5, 5.0, 550.0).is_ok());
        // wavelength outside the visible range is fine
        assert!(check(10.0, 1.5, 5.0, 1064.0).is_ok());
    }
    #[test]
    fn validation_precedence() {
        let check = |a, n, t| compute_beam_offset(&BeamInput::new(a, n, t, 550.0));
        assert_matches!(check(f64::NAN, 0.5, 5.0), Err(SlabError::InvalidInput));
        assert_matches!(
            check(95.0, 0.5, -5.0),
            Err(SlabError::InvalidRefractiveIndex)
        );
        assert_matches!(check(95.0, 1.5, -5.0), Err(SlabError::InvalidThickness));
    }
    #[test]
    fn reference_value() {
        let result = compute_beam_offset(&BeamInput::new(30.0, 1.5, 10.0, 550.0)).unwrap();
        assert_abs_diff_eq!(
            result.refracted_angle().get::<degree>(),
            19.471_220_634_490_69,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            result.lateral_displacement_mm(),
            1.938_137_821_521_027,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            result.lateral_displacement().get::<millimeter>(),
            result.lateral_displacement_mm(),
            max_relative = 1e-12
        );
        assert_eq!(result.beam_color(), wavelength_to_color(550.0));
        assert_relative_eq!(result.incidence_angle_rad(), 30.0_f64.to_radians());
    }
    #[test]
    fn zero_thickness() {
        for n in [1.0, 1.5, 4.0] {
            for angle in [-60.0, 0.0, 45.0] {
                assert_eq!(offset(angle, n, 0.0), 0.0);
            }
        }
        let layout = CanvasLayout::default();
        let result = compute_beam_offset(&BeamInput::new(45.0, 1.5, 0.0, 550.0)).unwrap();
        assert_matches!(result.geometry(), BeamGeometry::Straight { beam, width } => {
            assert_eq!(*width, layout.straight_beam_width_px);
            assert_eq!(beam.start, Point2::new(0.0, 200.0));
            assert_eq!(beam.end, Point2::new(600.0, 200.0));
        });
    }
    #[test]
    fn normal_incidence() {
        for n in [1.0, 1.33, 1.5, 2.4] {
            for t in [0.0, 0.1, 10.0, 1000.0] {
                assert_eq!(offset(0.0, n, t), 0.0);
            }
        }
    }
    #[test]
    fn same_refractive_index() {
        assert_abs_diff_eq!(offset(40.0, 1.0, 10.0), 0.0);
    }
    #[test]
    fn symmetry() {
        for angle in [1.0, 10.0, 30.0, 45.0, 70.0, 89.0] {
            for n in [1.0, 1.5, 3.5] {
                assert_abs_diff_eq!(offset(angle, n, 7.5), -offset(-angle, n, 7.5), epsilon = 1e-12);
            }
        }
        assert!(offset(30.0, 1.5, 10.0) > 0.0);
        assert!(offset(-30.0, 1.5, 10.0) < 0.0);
    }
    #[test]
    fn monotonic_in_thickness() {
        for angle in [-75.0, -20.0, 5.0, 60.0] {
            let mut last = 0.0;
            for t in [0.0, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0] {
                let d = offset(angle, 1.5, t).abs();
                assert!(d >= last);
                last = d;
            }
        }
    }
    #[test]
    fn near_grazing() {
        testing_logger::setup();
        let result = compute_beam_offset(&BeamInput::new(90.0 - 1e-12, 1.0, 10.0, 550.0)).unwrap();
        assert_eq!(result.lateral_displacement_mm(), 0.0);
        assert_matches!(result.geometry(), BeamGeometry::Grazing { .. });
        check_warnings(vec![
            "Refracted beam nearly parallel to the slab surface. Displacement set to zero.",
            "Beam visualization inaccurate near ±90° incidence.",
        ]);
    }
    #[test]
    fn no_warnings_regular() {
        testing_logger::setup();
        compute_beam_offset(&BeamInput::default()).unwrap();
        check_no_warnings();
    }
    #[test]
    fn tilted_geometry() {
        let layout = CanvasLayout::default();
        let result = compute_beam_offset(&BeamInput::new(30.0, 1.5, 10.0, 550.0)).unwrap();
        let BeamGeometry::Tilted(geo) = result.geometry() else {
            panic!("expected tilted geometry");
        };
        let theta1 = 30.0_f64.to_radians();
        let d_px = result.lateral_displacement_mm() * layout.scale_factor;
        assert_eq!(geo.slab.center, Point2::new(300.0, 200.0));
        assert_eq!(geo.slab.half_width, 50.0);
        assert_abs_diff_eq!(geo.slab.half_height, 180.0, epsilon = 1e-12);
        assert_eq!(geo.slab.rotation, -theta1);
        assert_abs_diff_eq!(geo.entry_point.x, 300.0 - 50.0 / theta1.cos(), epsilon = 1e-9);
        assert_eq!(geo.entry_point.y, 200.0);
        assert_abs_diff_eq!(
            geo.exit_point.x,
            300.0 + 50.0 / theta1.cos() + d_px * theta1.tan(),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(geo.exit_point.y, 200.0 + d_px, epsilon = 1e-9);
        assert_abs_diff_eq!(geo.beam_width, (d_px * 0.3).abs(), epsilon = 1e-9);
        assert_abs_diff_eq!(geo.continuation_width, geo.beam_width * 0.2, epsilon = 1e-9);
        assert_eq!(geo.incoming.start, Point2::new(0.0, 200.0));
        assert_eq!(geo.incoming.end, geo.entry_point);
        assert_eq!(geo.inside, Segment::new(geo.entry_point, geo.exit_point));
        assert_eq!(geo.outgoing.end, Point2::new(600.0, geo.exit_point.y));
        assert_eq!(geo.continuation.end, Point2::new(600.0, 200.0));
        assert_eq!(geo.incidence_angle_rad, theta1);
        assert_eq!(geo.refracted_angle_rad, result.refracted_angle_rad());
    }
    #[test]
    fn exit_point_on_rear_face() {
        // the exit point must be located on the rear face of the rotated slab
        let result = compute_beam_offset(&BeamInput::new(-25.0, 1.7, 4.0, 633.0)).unwrap();
        let BeamGeometry::Tilted(geo) = result.geometry() else {
            panic!("expected tilted geometry");
        };
        let [_, top_right, bottom_right, _] = geo.slab.corners();
        let face = bottom_right - top_right;
        let to_exit = geo.exit_point - top_right;
        assert_abs_diff_eq!(face.perp(&to_exit), 0.0, epsilon = 1e-6);
    }
    #[test]
    fn beam_width_clamped() {
        let result = compute_beam_offset(&BeamInput::new(1.0, 1.5, 0.1, 550.0)).unwrap();
        let BeamGeometry::Tilted(geo) = result.geometry() else {
            panic!("expected tilted geometry");
        };
        assert_eq!(geo.beam_width, 1.0);
        // minimum drawn slab thickness
        assert_eq!(geo.slab.half_width, 2.5);
        let result = compute_beam_offset(&BeamInput::new(70.0, 1.5, 100.0, 550.0)).unwrap();
        let BeamGeometry::Tilted(geo) = result.geometry() else {
            panic!("expected tilted geometry");
        };
        assert_eq!(geo.beam_width, 20.0);
        assert_abs_diff_eq!(geo.continuation_width, 4.0, epsilon = 1e-12);
    }
    #[test]
    fn custom_layout() {
        let layout = CanvasLayout {
            width: 1000,
            scale_factor: 2.0,
            ..CanvasLayout::default()
        };
        let result = compute_beam_offset_with_layout(&BeamInput::default(), &layout).unwrap();
        let BeamGeometry::Tilted(geo) = result.geometry() else {
            panic!("expected tilted geometry");
        };
        assert_eq!(geo.slab.center.x, 500.0);
        assert_eq!(geo.slab.half_width, 10.0);
    }
    #[test]
    fn invalid_layout() {
        let layout = CanvasLayout {
            min_beam_width_px: 30.0,
            ..CanvasLayout::default()
        };
        assert_matches!(
            compute_beam_offset_with_layout(&BeamInput::default(), &layout),
            Err(SlabError::Layout(_))
        );
        let layout = CanvasLayout {
            scale_factor: f64::NAN,
            ..CanvasLayout::default()
        };
        assert_matches!(
            compute_beam_offset_with_layout(&BeamInput::default(), &layout),
            Err(SlabError::Layout(_))
        );
        // input validation is reported first
        assert_matches!(
            compute_beam_offset_with_layout(&BeamInput::new(95.0, 1.5, 1.0, 550.0), &layout),
            Err(SlabError::InvalidAngle)
        );
    }
}
