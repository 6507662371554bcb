//! Simple 2D drawing primitives in canvas coordinates (pixels, y axis pointing down).
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// start point
    pub start: Point2<f64>,
    /// end point
    pub end: Point2<f64>,
}
impl Segment {
    /// Create a new [`Segment`].
    #[must_use]
    pub const fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }
    /// Returns the length of this [`Segment`].
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
    /// Split this [`Segment`] into the visible parts of a dashed line.
    ///
    /// The pattern starts with a dash of length `dash` followed by a gap of length `gap`. The last
    /// dash is shortened to the end of the segment. If `dash` is not positive, or `gap` is negative,
    /// the segment is returned unsplit.
    #[must_use]
    pub fn dashes(&self, dash: f64, gap: f64) -> Vec<Self> {
        let length = self.length();
        if dash <= 0.0 || gap < 0.0 || length <= dash {
            return vec![*self];
        }
        let dir: Vector2<f64> = (self.end - self.start) / length;
        let mut dashes = Vec::new();
        let mut pos = 0.0;
        while pos < length {
            let end = (pos + dash).min(length);
            dashes.push(Self::new(self.start + dir * pos, self.start + dir * end));
            pos = end + gap;
        }
        dashes
    }
}

/// A rectangle of the given half sizes rotated by `rotation` (radians) around its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    /// center of the rectangle
    pub center: Point2<f64>,
    /// half size along the (unrotated) x axis
    pub half_width: f64,
    /// half size along the (unrotated) y axis
    pub half_height: f64,
    /// rotation angle in radians (positive values rotate clockwise on screen)
    pub rotation: f64,
}
impl RotatedRect {
    /// Returns the four corners of this [`RotatedRect`].
    ///
    /// The order is top-left, top-right, bottom-right, bottom-left (before rotation).
    #[must_use]
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (sin, cos) = self.rotation.sin_cos();
        let (w, h) = (self.half_width, self.half_height);
        [(-w, -h), (w, -h), (w, h), (-w, h)].map(|(x, y)| {
            Point2::new(
                self.center.x + x * cos - y * sin,
                self.center.y + x * sin + y * cos,
            )
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;
    #[test]
    fn length() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_eq!(s.length(), 5.0);
    }
    #[test]
    fn dashes() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(20.0, 0.0));
        let d = s.dashes(5.0, 3.0);
        assert_eq!(d.len(), 3);
        assert_eq!(d[0], Segment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)));
        assert_eq!(d[1], Segment::new(Point2::new(8.0, 0.0), Point2::new(13.0, 0.0)));
        assert_eq!(d[2], Segment::new(Point2::new(16.0, 0.0), Point2::new(20.0, 0.0)));
    }
    #[test]
    fn dashes_degenerate() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_eq!(s.dashes(5.0, 3.0), vec![s]);
        assert_eq!(s.dashes(0.0, 3.0), vec![s]);
        assert_eq!(s.dashes(1.0, -1.0), vec![s]);
        let p = Segment::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert_eq!(p.dashes(1.0, 1.0), vec![p]);
    }
    #[test]
    fn corners_unrotated() {
        let r = RotatedRect {
            center: Point2::new(10.0, 20.0),
            half_width: 1.0,
            half_height: 2.0,
            rotation: 0.0,
        };
        assert_eq!(
            r.corners(),
            [
                Point2::new(9.0, 18.0),
                Point2::new(11.0, 18.0),
                Point2::new(11.0, 22.0),
                Point2::new(9.0, 22.0)
            ]
        );
    }
    #[test]
    fn corners_rotated() {
        let r = RotatedRect {
            center: Point2::new(0.0, 0.0),
            half_width: 1.0,
            half_height: 2.0,
            rotation: FRAC_PI_2,
        };
        let c = r.corners();
        assert_abs_diff_eq!(c[0].x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[0].y, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[2].x, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[2].y, 1.0, epsilon = 1e-12);
    }
}
