#![warn(missing_docs)]
//! Longitudinal focus shift of a converging beam passing a plane-parallel slab.
//!
//! A beam converging towards a (virtual) focus on the optical axis passes a slab of thickness `t`
//! and refractive index `n` at normal incidence. In paraxial approximation the focus is shifted
//! away from the slab by
//!
//! `Δz = t * (1 - 1/n)`
//!
//! In addition to this closed form, three rays (above, on and below the optical axis) are traced
//! through the slab in canvas coordinates. The intersection of the two outer rays behind the slab
//! yields the (non-paraxial) real focus used for the visualization.
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::SlabResult,
    geometry::{RotatedRect, Segment},
    layout::CanvasLayout,
    millimeter,
    refraction::{intersect_rays_x, refract_magnitude},
    slab::{SlabParameters, AMBIENT_REFRACTIVE_INDEX},
};

/// Input parameters of a focus shift calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FocusInput {
    /// the slab placed in the converging beam
    pub slab: SlabParameters,
}
impl FocusInput {
    /// Create a new [`FocusInput`].
    ///
    /// The values are not checked here but during [`compute_focus_shift`].
    #[must_use]
    pub const fn new(refractive_index: f64, thickness_mm: f64) -> Self {
        Self {
            slab: SlabParameters::new_unchecked(refractive_index, thickness_mm),
        }
    }
    /// Check the input values.
    ///
    /// # Errors
    ///
    /// See [`SlabParameters::validate`].
    pub fn validate(&self) -> SlabResult<()> {
        self.slab.validate()
    }
}

/// State of a single ray traced through the slab (in canvas coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayState {
    /// start point of the ray
    pub origin: Point2<f64>,
    /// intersection point with the front face of the slab
    pub entry_point: Point2<f64>,
    /// intersection point with the rear face of the slab
    pub exit_point: Point2<f64>,
    /// propagation angle of the incident ray (radians, with respect to the optical axis)
    pub incident_angle_rad: f64,
    /// propagation angle inside the slab
    pub refracted_angle_rad: f64,
    /// propagation angle behind the slab
    pub exit_angle_rad: f64,
    /// end point of the ray extended beyond the exit point (by one canvas width along x)
    pub extension_end: Point2<f64>,
}
impl RayState {
    /// Returns the segments of the refracted ray path (incident, inside the slab, behind the slab).
    #[must_use]
    pub fn path(&self) -> [Segment; 3] {
        [
            Segment::new(self.origin, self.entry_point),
            Segment::new(self.entry_point, self.exit_point),
            Segment::new(self.exit_point, self.extension_end),
        ]
    }
}

/// Result of a focus shift calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusResult {
    paraxial_focus_shift_mm: f64,
    scale_factor: f64,
    slab_outline: RotatedRect,
    optical_axis: Segment,
    virtual_focus: Point2<f64>,
    paraxial_focus: Point2<f64>,
    fallback_focus: Point2<f64>,
    traced_focus: Option<Point2<f64>>,
    ray_states: [RayState; 3],
}
impl FocusResult {
    /// Returns the focus shift in paraxial approximation in millimeters.
    #[must_use]
    pub const fn paraxial_focus_shift_mm(&self) -> f64 {
        self.paraxial_focus_shift_mm
    }
    /// Returns the focus shift in paraxial approximation.
    #[must_use]
    pub fn paraxial_focus_shift(&self) -> Length {
        millimeter!(self.paraxial_focus_shift_mm)
    }
    /// Returns the outline of the slab.
    #[must_use]
    pub const fn slab_outline(&self) -> &RotatedRect {
        &self.slab_outline
    }
    /// Returns the optical axis spanning the full canvas width.
    #[must_use]
    pub const fn optical_axis(&self) -> &Segment {
        &self.optical_axis
    }
    /// Returns the position of the focus without slab.
    #[must_use]
    pub const fn virtual_focus(&self) -> Point2<f64> {
        self.virtual_focus
    }
    /// Returns the focus position derived from the paraxial focus shift.
    #[must_use]
    pub const fn paraxial_focus(&self) -> Point2<f64> {
        self.paraxial_focus
    }
    /// Returns the focus position used if the traced rays do not intersect.
    ///
    /// It is located by the paraxial focus shift in front of the virtual focus (towards the slab).
    #[must_use]
    pub const fn fallback_focus(&self) -> Point2<f64> {
        self.fallback_focus
    }
    /// Returns the intersection point of the two outer traced rays.
    ///
    /// `None` if the rays are (nearly) parallel.
    #[must_use]
    pub const fn traced_focus(&self) -> Option<Point2<f64>> {
        self.traced_focus
    }
    /// Returns the real focus.
    ///
    /// This is the intersection point of the traced rays or, if they do not intersect, the
    /// [`FocusResult::fallback_focus`]. The returned point is always finite.
    #[must_use]
    pub fn real_focus(&self) -> Point2<f64> {
        self.traced_focus.unwrap_or(self.fallback_focus)
    }
    /// Returns `true` if the real focus falls back to [`FocusResult::fallback_focus`].
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        self.traced_focus.is_none()
    }
    /// Returns the shift of the real focus with respect to the virtual focus in millimeters.
    #[must_use]
    pub fn real_focus_shift_mm(&self) -> f64 {
        (self.real_focus().x - self.virtual_focus.x) / self.scale_factor
    }
    /// Returns the three traced rays ordered from top to bottom.
    #[must_use]
    pub const fn ray_states(&self) -> &[RayState; 3] {
        &self.ray_states
    }
    /// Returns the undeviated continuations of the rays from their entry points to the virtual focus.
    #[must_use]
    pub fn virtual_rays(&self) -> [Segment; 3] {
        self.ray_states
            .map(|ray| Segment::new(ray.entry_point, self.virtual_focus))
    }
}

/// Calculate the focus shift caused by a slab in a converging beam.
///
/// The ray geometry is derived using the default [`CanvasLayout`].
///
/// # Errors
///
/// This function returns a validation error if the input is invalid (see [`SlabParameters::validate`]).
///
/// # Example
/// ```
/// use slab_optics::focus_shift::{compute_focus_shift, FocusInput};
///
/// let result = compute_focus_shift(&FocusInput::new(1.5, 9.0)).unwrap();
/// assert!((result.paraxial_focus_shift_mm() - 3.0).abs() < 1e-12);
/// ```
pub fn compute_focus_shift(input: &FocusInput) -> SlabResult<FocusResult> {
    compute_focus_shift_with_layout(input, &CanvasLayout::default())
}

/// Calculate the focus shift caused by a slab using the given [`CanvasLayout`] for the ray tracing.
///
/// # Errors
///
/// This function returns
///   - a validation error if the input is invalid (see [`SlabParameters::validate`])
///   - [`SlabError::Layout`](crate::error::SlabError::Layout) if the layout is inconsistent (see [`CanvasLayout::check`])
pub fn compute_focus_shift_with_layout(
    input: &FocusInput,
    layout: &CanvasLayout,
) -> SlabResult<FocusResult> {
    input.validate()?;
    layout.check()?;
    let n = input.slab.refractive_index();
    let thickness_mm = input.slab.thickness_mm();
    let focus_shift = thickness_mm * (1.0 - 1.0 / n);

    let width = layout.width_px();
    let height = layout.height_px();
    let axis_y = height * 0.5;
    let front_x = width * layout.focus_slab_x_ratio;
    let thickness_px = thickness_mm * layout.scale_factor;
    let virtual_focus = Point2::new(width * layout.virtual_focus_x_ratio, axis_y);
    let paraxial_focus = Point2::new(
        virtual_focus.x + focus_shift * layout.scale_factor,
        axis_y,
    );
    let fallback_focus = Point2::new(
        virtual_focus.x - focus_shift * layout.scale_factor,
        axis_y,
    );
    let slab_height = height * layout.focus_slab_height_ratio;
    let slab_outline = RotatedRect {
        center: Point2::new(
            front_x + thickness_px / 2.0,
            height * layout.focus_slab_top_ratio + slab_height / 2.0,
        ),
        half_width: thickness_px / 2.0,
        half_height: slab_height / 2.0,
        rotation: 0.0,
    };
    let tracer = SlabTracer {
        front_x,
        thickness_px,
        refractive_index: n,
        virtual_focus,
        extension_length: width,
    };
    let ray_states = [
        axis_y - layout.ray_spacing,
        axis_y,
        axis_y + layout.ray_spacing,
    ]
    .map(|y| tracer.trace(Point2::new(layout.ray_start_x, y)));
    let traced_focus = calc_ray_intersection(&ray_states).map(|x| Point2::new(x, axis_y));
    if traced_focus.is_none() {
        warn!("Traced rays do not intersect. Using fallback focus position.");
    }
    debug!("focus shift: paraxial={focus_shift} mm, traced focus={traced_focus:?}");
    Ok(FocusResult {
        paraxial_focus_shift_mm: focus_shift,
        scale_factor: layout.scale_factor,
        slab_outline,
        optical_axis: Segment::new(Point2::new(0.0, axis_y), Point2::new(width, axis_y)),
        virtual_focus,
        paraxial_focus,
        fallback_focus,
        traced_focus,
        ray_states,
    })
}

/// Calculate the x position where the first and the last ray intersect behind the slab.
///
/// Only the outermost rays are used. `None` is returned if fewer than two rays are given or the
/// rays are (nearly) parallel.
#[must_use]
pub fn calc_ray_intersection(rays: &[RayState]) -> Option<f64> {
    let (first, last) = (rays.first()?, rays.last()?);
    if rays.len() < 2 {
        return None;
    }
    intersect_rays_x(
        first.exit_point,
        first.exit_angle_rad,
        last.exit_point,
        last.exit_angle_rad,
    )
}

struct SlabTracer {
    front_x: f64,
    thickness_px: f64,
    refractive_index: f64,
    virtual_focus: Point2<f64>,
    extension_length: f64,
}
impl SlabTracer {
    fn trace(&self, origin: Point2<f64>) -> RayState {
        let incident_angle =
            (self.virtual_focus.y - origin.y).atan2(self.virtual_focus.x - origin.x);
        let entry_point = Point2::new(
            self.front_x,
            origin.y + (self.front_x - origin.x) * incident_angle.tan(),
        );
        let refracted_angle = refract_magnitude(
            incident_angle,
            AMBIENT_REFRACTIVE_INDEX,
            self.refractive_index,
        );
        let exit_point = Point2::new(
            self.front_x + self.thickness_px,
            entry_point.y + self.thickness_px * refracted_angle.tan(),
        );
        let exit_angle = refract_magnitude(
            refracted_angle,
            self.refractive_index,
            AMBIENT_REFRACTIVE_INDEX,
        );
        let extension_end = Point2::new(
            exit_point.x + self.extension_length,
            exit_point.y + self.extension_length * exit_angle.tan(),
        );
        RayState {
            origin,
            entry_point,
            exit_point,
            incident_angle_rad: incident_angle,
            refracted_angle_rad: refracted_angle,
            exit_angle_rad: exit_angle,
            extension_end,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::SlabError;
    use crate::utils::test_helper::test_helper::{check_no_warnings, check_warnings};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;
    use uom::si::length::millimeter;

    #[test]
    fn validation() {
        assert_matches!(
            compute_focus_shift(&FocusInput::new(f64::NAN, 1.0)),
            Err(SlabError::InvalidInput)
        );
        assert_matches!(
            compute_focus_shift(&FocusInput::new(1.5, f64::NAN)),
            Err(SlabError::InvalidInput)
        );
        assert_matches!(
            compute_focus_shift(&FocusInput::new(0.5, f64::NAN)),
            Err(SlabError::InvalidInput)
        );
        assert_matches!(
            compute_focus_shift(&FocusInput::new(0.5, -1.0)),
            Err(SlabError::InvalidRefractiveIndex)
        );
        assert_matches!(
            compute_focus_shift(&FocusInput::new(1.5, -1.0)),
            Err(SlabError::InvalidThickness)
        );
        assert!(compute_focus_shift(&FocusInput::default()).is_ok());
    }
    #[test]
    fn paraxial_formula() {
        for n in [1.0, 1.0001, 1.33, 1.5, 2.0, 4.0] {
            for t in [0.0, 0.5, 3.0, 10.0, 25.4] {
                let result = compute_focus_shift(&FocusInput::new(n, t)).unwrap();
                assert_eq!(result.paraxial_focus_shift_mm(), t * (1.0 - 1.0 / n));
            }
        }
        for t in [0.0, 1.0, 100.0] {
            let result = compute_focus_shift(&FocusInput::new(1.0, t)).unwrap();
            assert_eq!(result.paraxial_focus_shift_mm(), 0.0);
        }
        let result = compute_focus_shift(&FocusInput::new(1.5, 0.0)).unwrap();
        assert_eq!(result.paraxial_focus_shift_mm(), 0.0);
        let result = compute_focus_shift(&FocusInput::new(1.5, 9.0)).unwrap();
        assert_relative_eq!(result.paraxial_focus_shift().get::<millimeter>(), 3.0);
    }
    #[test]
    fn ray_states() {
        let result = compute_focus_shift(&FocusInput::new(1.5, 10.0)).unwrap();
        let rays = result.ray_states();
        assert_eq!(rays[0].origin, Point2::new(50.0, 120.0));
        assert_eq!(rays[1].origin, Point2::new(50.0, 200.0));
        assert_eq!(rays[2].origin, Point2::new(50.0, 280.0));
        for ray in rays {
            assert_eq!(ray.entry_point.x, 300.0);
            assert_eq!(ray.exit_point.x, 400.0);
            assert_abs_diff_eq!(ray.exit_angle_rad, ray.incident_angle_rad, epsilon = 1e-12);
            assert!(ray.refracted_angle_rad.abs() <= ray.incident_angle_rad.abs());
            assert_eq!(ray.extension_end.x, 1000.0);
        }
        // top ray points downwards (canvas coordinates), bottom ray upwards
        assert!(rays[0].incident_angle_rad > 0.0);
        assert_eq!(rays[1].incident_angle_rad, 0.0);
        assert!(rays[2].incident_angle_rad < 0.0);
        assert_abs_diff_eq!(rays[0].exit_point.y, 178.797_168_057_362_74, epsilon = 1e-9);
        assert_abs_diff_eq!(rays[1].exit_point.y, 200.0);
        assert_abs_diff_eq!(rays[2].exit_point.y, 221.202_831_942_637_26, epsilon = 1e-9);
        let path = rays[0].path();
        assert_eq!(path[0].start, rays[0].origin);
        assert_eq!(path[1].end, rays[0].exit_point);
        assert_eq!(path[2].end, rays[0].extension_end);
    }
    #[test]
    fn traced_focus() {
        testing_logger::setup();
        let result = compute_focus_shift(&FocusInput::new(1.5, 10.0)).unwrap();
        check_no_warnings();
        assert!(!result.used_fallback());
        let focus = result.traced_focus().unwrap();
        assert_abs_diff_eq!(focus.x, 513.965_221_691_675_4, epsilon = 1e-6);
        assert_eq!(focus.y, 200.0);
        assert_eq!(result.real_focus(), focus);
        assert_eq!(result.virtual_focus(), Point2::new(480.0, 200.0));
        assert_abs_diff_eq!(result.paraxial_focus().x, 513.333_333_333_333_4, epsilon = 1e-9);
        // marginal rays focus behind the paraxial focus
        assert!(focus.x > result.paraxial_focus().x);
        assert_abs_diff_eq!(result.real_focus_shift_mm(), 3.396_522, epsilon = 1e-6);
    }
    #[test]
    fn zero_thickness() {
        let result = compute_focus_shift(&FocusInput::new(1.5, 0.0)).unwrap();
        assert_eq!(result.paraxial_focus_shift_mm(), 0.0);
        assert_abs_diff_eq!(result.real_focus().x, 480.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.real_focus_shift_mm(), 0.0, epsilon = 1e-9);
        for ray in result.ray_states() {
            assert_eq!(ray.entry_point, ray.exit_point);
        }
    }
    #[test]
    fn index_close_to_one() {
        let result = compute_focus_shift(&FocusInput::new(1.0001, 10.0)).unwrap();
        let focus = result.real_focus();
        assert!(focus.x.is_finite());
        assert!(focus.y.is_finite());
        assert_abs_diff_eq!(focus.x, result.paraxial_focus().x, epsilon = 1e-3);
    }
    #[test]
    fn parallel_rays_fallback() {
        testing_logger::setup();
        let layout = CanvasLayout {
            ray_spacing: 0.0,
            ..CanvasLayout::default()
        };
        let result =
            compute_focus_shift_with_layout(&FocusInput::new(1.5, 6.0), &layout).unwrap();
        check_warnings(vec![
            "Traced rays do not intersect. Using fallback focus position.",
        ]);
        assert!(result.used_fallback());
        assert!(result.traced_focus().is_none());
        assert_eq!(result.real_focus(), result.fallback_focus());
        // the fallback lies the paraxial shift in front of the virtual focus
        assert_abs_diff_eq!(result.real_focus().x, 460.0, epsilon = 1e-9);
        assert_eq!(result.real_focus().y, 200.0);
        assert_abs_diff_eq!(result.paraxial_focus().x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.real_focus_shift_mm(), -2.0, epsilon = 1e-9);
    }
    #[test]
    fn fallback_focus_position() {
        let result = compute_focus_shift(&FocusInput::new(1.5, 10.0)).unwrap();
        assert!(!result.used_fallback());
        assert_abs_diff_eq!(result.fallback_focus().x, 446.666_666_666_666_6, epsilon = 1e-9);
        let result = compute_focus_shift(&FocusInput::new(1.0, 10.0)).unwrap();
        assert_eq!(result.fallback_focus(), result.virtual_focus());
    }
    #[test]
    fn invalid_layout() {
        let layout = CanvasLayout {
            scale_factor: 0.0,
            ..CanvasLayout::default()
        };
        assert_matches!(
            compute_focus_shift_with_layout(&FocusInput::default(), &layout),
            Err(SlabError::Layout(_))
        );
        let layout = CanvasLayout {
            width: 0,
            ..CanvasLayout::default()
        };
        assert_matches!(
            compute_focus_shift_with_layout(&FocusInput::default(), &layout),
            Err(SlabError::Layout(_))
        );
        // input validation is reported first
        assert_matches!(
            compute_focus_shift_with_layout(&FocusInput::new(0.5, 1.0), &layout),
            Err(SlabError::InvalidRefractiveIndex)
        );
    }
    #[test]
    fn intersection_needs_two_rays() {
        let result = compute_focus_shift(&FocusInput::new(1.5, 10.0)).unwrap();
        assert!(calc_ray_intersection(&[]).is_none());
        assert!(calc_ray_intersection(&result.ray_states()[..1]).is_none());
        assert!(calc_ray_intersection(result.ray_states()).is_some());
    }
    #[test]
    fn drawing_geometry() {
        let result = compute_focus_shift(&FocusInput::new(1.5, 10.0)).unwrap();
        let [top_left, _, bottom_right, _] = result.slab_outline().corners();
        assert_abs_diff_eq!(top_left.x, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(top_left.y, 80.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bottom_right.x, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bottom_right.y, 320.0, epsilon = 1e-9);
        assert_eq!(
            *result.optical_axis(),
            Segment::new(Point2::new(0.0, 200.0), Point2::new(600.0, 200.0))
        );
        for (virtual_ray, ray) in result.virtual_rays().iter().zip(result.ray_states()) {
            assert_eq!(virtual_ray.start, ray.entry_point);
            assert_eq!(virtual_ray.end, result.virtual_focus());
        }
    }
}
