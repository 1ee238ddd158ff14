//! Screen-space geometry shared by the hero transition and gesture code.

use std::fmt;

use serde::Deserialize;

/// Axis-aligned rectangle in viewport coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True when the rect cannot serve as a scale reference.
    pub fn is_degenerate(&self) -> bool {
        !(self.top.is_finite() && self.left.is_finite())
            || !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Where this rect ends up on screen once `transform` is applied with a
    /// top-left transform origin.
    pub fn transformed(&self, transform: &FlipTransform) -> Rect {
        Rect {
            top: self.top + transform.dy,
            left: self.left + transform.dx,
            width: self.width * transform.scale_x,
            height: self.height * transform.scale_y,
        }
    }
}

/// Translate plus non-uniform scale, applied with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipTransform {
    pub dx: f64,
    pub dy: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl FlipTransform {
    pub const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Transform that moves a box laid out at `from` onto `to`.
    ///
    /// Returns `None` when `from` is degenerate; the caller falls back to a
    /// cross-fade instead of dividing by zero.
    pub fn between(from: &Rect, to: &Rect) -> Option<Self> {
        if from.is_degenerate() || !to.width.is_finite() || !to.height.is_finite() {
            return None;
        }
        Some(Self {
            dx: to.left - from.left,
            dy: to.top - from.top,
            scale_x: to.width / from.width,
            scale_y: to.height / from.height,
        })
    }

    /// Linear interpolation from identity (`progress == 0`) to `self`.
    pub fn at(&self, progress: f64) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            dx: self.dx * p,
            dy: self.dy * p,
            scale_x: 1.0 + (self.scale_x - 1.0) * p,
            scale_y: 1.0 + (self.scale_y - 1.0) * p,
        }
    }

    pub fn css_transform(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlipTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate3d({}px, {}px, 0) scale({}, {})",
            self.dx, self.dy, self.scale_x, self.scale_y
        )
    }
}

/// CSS `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const EPSILON: f64 = 1e-7;

    /// Material "standard" curve used for both open and close.
    pub const STANDARD: [f64; 4] = [0.4, 0.0, 0.2, 1.0];

    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    pub fn from_points(points: [f64; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }

    pub fn standard() -> Self {
        Self::from_points(Self::STANDARD)
    }

    /// Eased progress for linear time `t` in `[0, 1]`.
    pub fn ease(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        self.sample_y(self.solve_x(t))
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    fn solve_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let err = self.sample_x(t) - x;
            if err.abs() < Self::EPSILON {
                return t;
            }
            let slope = self.sample_dx(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        // Newton stalled on a flat segment; bisect instead.
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        t = x;
        while lo < hi {
            let value = self.sample_x(t);
            if (value - x).abs() < Self::EPSILON {
                return t;
            }
            if x > value {
                lo = t;
            } else {
                hi = t;
            }
            let next = (lo + hi) / 2.0;
            if (next - t).abs() < f64::EPSILON {
                break;
            }
            t = next;
        }
        t
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn flip_maps_origin_onto_destination() {
        let thumb = Rect::new(500.0, 40.0, 120.0, 80.0);
        let full = Rect::new(100.0, 0.0, 1200.0, 800.0);
        let flip = FlipTransform::between(&thumb, &full).expect("non-degenerate");
        assert_eq!(thumb.transformed(&flip), full);
        assert_eq!(thumb.transformed(&flip.at(0.0)), thumb);
    }

    #[test]
    fn zero_sized_origin_has_no_flip() {
        let collapsed = Rect::new(10.0, 10.0, 0.0, 50.0);
        let full = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(collapsed.is_degenerate());
        assert!(FlipTransform::between(&collapsed, &full).is_none());
    }

    #[test]
    fn halfway_interpolation_is_linear() {
        let flip = FlipTransform {
            dx: 100.0,
            dy: -40.0,
            scale_x: 3.0,
            scale_y: 0.5,
        };
        let mid = flip.at(0.5);
        assert!(close(mid.dx, 50.0));
        assert!(close(mid.dy, -20.0));
        assert!(close(mid.scale_x, 2.0));
        assert!(close(mid.scale_y, 0.75));
    }

    #[test]
    fn css_matches_translate_scale_shape() {
        let flip = FlipTransform {
            dx: 12.0,
            dy: 3.5,
            scale_x: 2.0,
            scale_y: 1.0,
        };
        assert_eq!(flip.css_transform(), "translate3d(12px, 3.5px, 0) scale(2, 1)");
    }

    #[test]
    fn standard_curve_is_monotonic_with_fixed_endpoints() {
        let curve = CubicBezier::standard();
        assert_eq!(curve.ease(0.0), 0.0);
        assert_eq!(curve.ease(1.0), 1.0);
        let mut last = 0.0;
        for step in 1..100 {
            let value = curve.ease(step as f64 / 100.0);
            assert!(value >= last, "curve must not go backwards at step {step}");
            last = value;
        }
        // Decelerating curve: well ahead of linear at the midpoint.
        assert!(curve.ease(0.5) > 0.7);
    }

    #[test]
    fn linear_control_points_are_identity() {
        let linear = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for step in 0..=10 {
            let t = step as f64 / 10.0;
            assert!(close(linear.ease(t), t));
        }
    }
}
