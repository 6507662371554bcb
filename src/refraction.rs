#![warn(missing_docs)]
//! Refraction on a flat interface and intersection of refracted rays in a 2D plane.
//!
//! All angles are given in radians with respect to the surface normal (which is collinear to
//! the x axis for the planes used in this crate).
use nalgebra::Point2;

/// Slopes of two rays differing by less than this value are considered parallel.
pub const PARALLEL_SLOPE_TOLERANCE: f64 = 1e-6;

/// Calculate the refraction angle of a ray using Snell's law.
///
/// The ray passes from a medium with refractive index `n1` into a medium with refractive index
/// `n2`. The sine of the refracted angle is clamped to `[-1.0, 1.0]` before calculating the
/// arcsine. Hence, this function always returns a finite angle (for finite inputs) even in case
/// of total internal reflection or floating point overshoot at grazing incidence. The sign of the
/// incident angle carries over to the refracted angle.
#[must_use]
pub fn snell_angle(incident_angle: f64, n1: f64, n2: f64) -> f64 {
    let sin_refracted = ((n1 / n2) * incident_angle.sin()).clamp(-1.0, 1.0);
    sin_refracted.asin()
}

/// Calculate the refraction angle by only transforming the magnitude of the incident angle.
///
/// The refracted magnitude is `asin(clamp((n1/n2) * sin(|θ|), 0, 1))`. The sign is copied from the
/// incident angle, where an incident angle of (positive or negative) zero counts as positive.
#[must_use]
pub fn refract_magnitude(incident_angle: f64, n1: f64, n2: f64) -> f64 {
    let sin_refracted = ((n1 / n2) * incident_angle.abs().sin()).clamp(0.0, 1.0);
    let refracted = sin_refracted.asin();
    if incident_angle >= 0.0 {
        refracted
    } else {
        -refracted
    }
}

/// Calculate the x coordinate of the intersection point of two rays.
///
/// Each ray is given by a point on its path and its propagation angle with respect to the x axis.
/// The rays are converted into the slope-intercept form `y = m*x + b` and intersected. `None` is
/// returned if the slopes differ by less than [`PARALLEL_SLOPE_TOLERANCE`] or if the intersection
/// is not a finite number.
#[must_use]
pub fn intersect_rays_x(p1: Point2<f64>, angle1: f64, p2: Point2<f64>, angle2: f64) -> Option<f64> {
    let m1 = angle1.tan();
    let m2 = angle2.tan();
    if (m1 - m2).abs() < PARALLEL_SLOPE_TOLERANCE {
        return None;
    }
    let b1 = p1.y - m1 * p1.x;
    let b2 = p2.y - m2 * p2.x;
    let x = (b2 - b1) / (m1 - m2);
    x.is_finite().then_some(x)
}
