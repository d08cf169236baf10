// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Minimal 2D geometry used by the sizing/alignment engine.

use float_cmp::ApproxEqUlps;

/// A trait for fuzzy/approximate equality comparisons of float numbers.
pub trait FuzzyEq<Rhs: ?Sized = Self> {
    fn fuzzy_eq(&self, other: &Rhs) -> bool;

    #[inline]
    fn fuzzy_ne(&self, other: &Rhs) -> bool {
        !self.fuzzy_eq(other)
    }
}

impl FuzzyEq for f64 {
    #[inline]
    fn fuzzy_eq(&self, other: &f64) -> bool {
        self.approx_eq_ulps(other, 4)
    }
}

/// Checks that a number is approximately zero.
pub trait FuzzyZero: FuzzyEq {
    fn is_fuzzy_zero(&self) -> bool;
}

impl FuzzyZero for f64 {
    #[inline]
    fn is_fuzzy_zero(&self) -> bool {
        self.fuzzy_eq(&0.0)
    }
}

/// Clamps `val` to the `[min, max]` range.
#[inline]
pub fn f64_bound(min: f64, val: f64, max: f64) -> f64 {
    if val > max {
        max
    } else if val < min {
        min
    } else {
        val
    }
}

/// A rectangle in fractional user units. Width and height are always >= 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return None;
        }

        Some(Rect { x, y, width, height })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns a copy of this rect with the origin shifted by `(dx, dy)`.
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns a copy of this rect scaled around its own origin (not center).
    #[inline]
    pub fn scaled(&self, k: f64) -> Self {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width * k,
            height: self.height * k,
        }
    }
}

/// An affine transform `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Transform { a, b, c, d, e, f }
    }

    #[inline]
    pub fn identity() -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// The transform that maps `view_box` onto a `(target, target)` square,
    /// i.e. `BoxSizing(view_box, (target, target))` from the specification.
    pub fn box_sizing(view_box: Rect, target: f64) -> Self {
        let sx = if view_box.width().is_fuzzy_zero() {
            1.0
        } else {
            target / view_box.width()
        };
        let sy = if view_box.height().is_fuzzy_zero() {
            1.0
        } else {
            target / view_box.height()
        };

        Transform::new(sx, 0.0, 0.0, sy, -view_box.x() * sx, -view_box.y() * sy)
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_rejects_negative_size() {
        assert!(Rect::new(0.0, 0.0, -1.0, 10.0).is_none());
    }

    #[test]
    fn box_sizing_maps_viewbox_onto_target_square() {
        let vb = Rect::new(0.0, 0.0, 256.0, 256.0).unwrap();
        let ts = Transform::box_sizing(vb, 32.0);
        assert_eq!(ts.apply(0.0, 0.0), (0.0, 0.0));
        assert_eq!(ts.apply(256.0, 256.0), (32.0, 32.0));
    }

    #[test]
    fn box_sizing_handles_offset_viewbox() {
        let vb = Rect::new(-2.4, 2.4, 256.0, 256.0).unwrap();
        let ts = Transform::box_sizing(vb, 32.0);
        let (x, y) = ts.apply(128.3, 127.7);
        assert!((x - 32.0 * (128.3 - -2.4) / 256.0).abs() < 1e-9);
        assert!((y - 32.0 * (127.7 - 2.4) / 256.0).abs() < 1e-9);
    }
}
