// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sizing / alignment engine (C4): computes a rewritten view-box, per-child
//! translates, and an integer hotspot for one target pixel size.

use std::collections::HashMap;
use std::fmt;

use xmltree::Element;

use crate::anchor::AnchorPoint;
use crate::geom::{f64_bound, FuzzyZero, Rect, Transform};
use crate::numbers::{format_trimmed, round9};
use crate::path::ElementPath;

/// A named canvas-size preset, e.g. "Source", "Normal", "Large".
#[derive(Clone, Debug, PartialEq)]
pub struct SizeScheme {
    pub name: String,
    pub canvas_size: f64,
    pub nominal_size: f64,
    pub permanent: bool,
}

impl SizeScheme {
    pub fn new(name: impl Into<String>, canvas_size: f64, nominal_size: f64, permanent: bool) -> Self {
        SizeScheme { name: name.into(), canvas_size, nominal_size, permanent }
    }

    pub fn source() -> Self {
        SizeScheme::new("Source", 1.0, 1.0, false)
    }

    pub fn normal() -> Self {
        SizeScheme::new("N", 1.5, 1.5, false)
    }

    pub fn large() -> Self {
        SizeScheme::new("L", 1.25, 1.25, true)
    }

    pub fn extra_large() -> Self {
        SizeScheme::new("XL", 1.0, 1.0, true)
    }
}

#[derive(Debug)]
pub enum AlignmentError {
    /// Numeric overflow while projecting an anchor into target space.
    Overflow,
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentError::Overflow => write!(f, "alignment produced a non-finite coordinate"),
        }
    }
}

impl std::error::Error for AlignmentError {}

/// The default clamp on how far `balance_canvas` may shift the origin,
/// expressed as a fraction of the view-box's own extent.
pub const DEFAULT_BALANCE_LIMIT: f64 = 0.5;

/// Result of the sizing/alignment algorithm for one target size.
#[derive(Clone, Debug)]
pub struct Alignment {
    pub view_box: Rect,
    pub child_translates: HashMap<ElementPath, (f64, f64)>,
    pub hotspot: (u16, u16),
}

/// Computes the offset that, added to `anchor`, makes its projection under
/// `Transform::box_sizing(view_box, target)` land on an exact integer pixel.
fn align_to_grid(anchor: (f64, f64), target: f64, view_box: Rect) -> Result<(f64, f64), AlignmentError> {
    if view_box.width() <= 0.0 || view_box.height() <= 0.0 || !target.is_finite() {
        return Err(AlignmentError::Overflow);
    }

    let sx = target / view_box.width();
    let sy = target / view_box.height();

    let ax = anchor.0 - view_box.x();
    let ay = anchor.1 - view_box.y();

    let off_x = (ax * sx).round() / sx - ax;
    let off_y = (ay * sy).round() / sy - ay;

    if !off_x.is_finite() || !off_y.is_finite() {
        return Err(AlignmentError::Overflow);
    }

    Ok((round9(off_x), round9(off_y)))
}

/// Shifts the origin of `view_box` toward the geometric mean of `hotspot`
/// and `root_anchor`, clamped by `limit_factor` (itself clamped to
/// [`DEFAULT_BALANCE_LIMIT`]).
fn balance_canvas(view_box: Rect, hotspot: (f64, f64), root_anchor: (f64, f64), limit_factor: f64) -> Rect {
    let mean = ((hotspot.0 + root_anchor.0) / 2.0, (hotspot.1 + root_anchor.1) / 2.0);
    let center = view_box.center();

    let limit = f64_bound(0.0, limit_factor, DEFAULT_BALANCE_LIMIT);
    let max_dx = view_box.width() * limit;
    let max_dy = view_box.height() * limit;

    let dx = f64_bound(-max_dx, mean.0 - center.0, max_dx);
    let dy = f64_bound(-max_dy, mean.1 - center.1, max_dy);

    view_box.translated(dx, dy)
}

/// Rounds a target-space coordinate per the hotspot rounding rule: the
/// rounding direction depends on the sign of the anchor's bias along that
/// axis, so the hotspot is nudged toward the inside of the drawn shape.
fn round_hotspot_coord(c: f64, bias_sign: f64) -> i64 {
    if bias_sign < 0.0 {
        (c + 0.51).floor() as i64
    } else if bias_sign > 0.0 {
        (c + 0.49).floor() as i64 - 1
    } else {
        c.round() as i64
    }
}

fn clamp_u16(v: i64) -> u16 {
    v.clamp(0, 0xFFFF) as u16
}

/// Inputs to one invocation of the sizing/alignment engine.
pub struct AlignmentInput<'a> {
    pub target: f64,
    pub source_view_box: Rect,
    pub canvas_size: f64,
    pub stroke_offset: f64,
    pub fill_offset: f64,
    pub hotspot: AnchorPoint,
    pub root_anchor: AnchorPoint,
    pub child_anchors: &'a HashMap<ElementPath, AnchorPoint>,
    pub balance_canvas: bool,
    pub balance_limit_factor: f64,
}

/// Runs the full sizing/alignment algorithm for one target pixel size.
pub fn compute_alignment(input: &AlignmentInput) -> Result<Alignment, AlignmentError> {
    let v0 = input.source_view_box.scaled(input.canvas_size);

    let hotspot_xy = input.hotspot.point_with_offset(input.stroke_offset, input.fill_offset);
    let root_xy = input.root_anchor.point_with_offset(input.stroke_offset, input.fill_offset);

    let v0 = if input.balance_canvas {
        balance_canvas(v0, hotspot_xy, root_xy, input.balance_limit_factor)
    } else {
        v0
    };

    let (off_x, off_y) = align_to_grid(root_xy, input.target, v0)?;
    let view_box = Rect::new(v0.x() - off_x, v0.y() - off_y, v0.width(), v0.height())
        .ok_or(AlignmentError::Overflow)?;

    let mut child_translates = HashMap::with_capacity(input.child_anchors.len());
    for (path, anchor) in input.child_anchors {
        let xy = anchor.point_with_offset(input.stroke_offset, input.fill_offset);
        let translate = align_to_grid(xy, input.target, view_box)?;
        child_translates.insert(path.clone(), translate);
    }

    let ts = Transform::box_sizing(view_box, input.target);
    let (hx_f, hy_f) = ts.apply(hotspot_xy.0, hotspot_xy.1);
    if !hx_f.is_finite() || !hy_f.is_finite() {
        return Err(AlignmentError::Overflow);
    }

    let hx = clamp_u16(round_hotspot_coord(hx_f, input.hotspot.bias.dx));
    let hy = clamp_u16(round_hotspot_coord(hy_f, input.hotspot.bias.dy));

    Ok(Alignment { view_box, child_translates, hotspot: (hx, hy) })
}

impl Alignment {
    /// Applies this alignment result to a parsed SVG document in place:
    /// rewrites `viewBox` to the aligned rectangle and prepends a
    /// `translate(dx,dy)` to each child anchor's own `transform` attribute.
    ///
    /// A child path that no longer resolves against `root` is logged at
    /// `warn!` and skipped rather than treated as fatal.
    pub fn apply_to_dom(&self, root: &mut Element) {
        root.attributes.insert(
            "viewBox".to_string(),
            format!(
                "{} {} {} {}",
                format_trimmed(self.view_box.x()),
                format_trimmed(self.view_box.y()),
                format_trimmed(self.view_box.width()),
                format_trimmed(self.view_box.height()),
            ),
        );

        for (path, (dx, dy)) in &self.child_translates {
            match path.resolve_mut(root) {
                Some(el) => prepend_translate(el, *dx, *dy),
                None => log::warn!("child anchor at '{path}' no longer resolves against the document; skipping its translate"),
            }
        }
    }
}

fn prepend_translate(el: &mut Element, dx: f64, dy: f64) {
    if dx.is_fuzzy_zero() && dy.is_fuzzy_zero() {
        return;
    }

    let translate = format!("translate({},{})", format_trimmed(dx), format_trimmed(dy));
    let combined = match el.attributes.get("transform") {
        Some(existing) => format!("{translate} {existing}"),
        None => translate,
    };
    el.attributes.insert("transform".to_string(), combined);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Bias;

    fn neutral(x: f64, y: f64) -> AnchorPoint {
        AnchorPoint::new(x, y, Bias::neutral())
    }

    #[test]
    fn root_anchor_projects_to_integer_pixel() {
        let vb = Rect::new(0.0, 0.0, 256.0, 256.0).unwrap();
        let input = AlignmentInput {
            target: 32.0,
            source_view_box: vb,
            canvas_size: 1.0,
            stroke_offset: 0.0,
            fill_offset: 0.0,
            hotspot: neutral(128.0, 128.0),
            root_anchor: neutral(128.3, 127.7),
            child_anchors: &HashMap::new(),
            balance_canvas: false,
            balance_limit_factor: 0.0,
        };

        let aligned = compute_alignment(&input).unwrap();
        let ts = Transform::box_sizing(aligned.view_box, 32.0);
        let (x, y) = ts.apply(128.3, 127.7);
        assert!((x - x.round()).abs() < 1e-9);
        assert!((y - y.round()).abs() < 1e-9);
    }

    #[test]
    fn idempotent_when_already_on_grid() {
        let vb = Rect::new(0.0, 0.0, 32.0, 32.0).unwrap();
        let input = AlignmentInput {
            target: 32.0,
            source_view_box: vb,
            canvas_size: 1.0,
            stroke_offset: 0.0,
            fill_offset: 0.0,
            hotspot: neutral(16.0, 16.0),
            root_anchor: neutral(16.0, 16.0),
            child_anchors: &HashMap::new(),
            balance_canvas: false,
            balance_limit_factor: 0.0,
        };

        let aligned = compute_alignment(&input).unwrap();
        assert!((aligned.view_box.x() - 0.0).abs() < 1e-9);
        assert!((aligned.view_box.y() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn hotspot_is_clamped_and_non_negative() {
        let vb = Rect::new(0.0, 0.0, 32.0, 32.0).unwrap();
        let input = AlignmentInput {
            target: 32.0,
            source_view_box: vb,
            canvas_size: 1.0,
            stroke_offset: 0.0,
            fill_offset: 0.0,
            hotspot: neutral(4.0, 5.0),
            root_anchor: neutral(0.0, 0.0),
            child_anchors: &HashMap::new(),
            balance_canvas: false,
            balance_limit_factor: 0.0,
        };

        let aligned = compute_alignment(&input).unwrap();
        assert_eq!(aligned.hotspot, (4, 5));
    }

    #[test]
    fn apply_to_dom_rewrites_viewbox_and_translates() {
        let mut child_anchors = HashMap::new();
        let path = ElementPath::root().child("g", 1);
        child_anchors.insert(path.clone(), neutral(20.0, 20.0));

        let vb = Rect::new(0.0, 0.0, 256.0, 256.0).unwrap();
        let input = AlignmentInput {
            target: 32.0,
            source_view_box: vb,
            canvas_size: 1.0,
            stroke_offset: 0.0,
            fill_offset: 0.0,
            hotspot: neutral(128.0, 128.0),
            root_anchor: neutral(128.3, 127.7),
            child_anchors: &child_anchors,
            balance_canvas: false,
            balance_limit_factor: 0.0,
        };
        let aligned = compute_alignment(&input).unwrap();

        let mut root = xmltree::Element::parse(
            br#"<svg viewBox="0 0 256 256"><g/></svg>"#.as_slice(),
        )
        .unwrap();
        aligned.apply_to_dom(&mut root);

        assert!(root.attributes.get("viewBox").unwrap().starts_with("0.3 -0.3"));
        let g = root.get_mut_child("g").unwrap();
        assert!(g.attributes.get("transform").map(|t| t.starts_with("translate")).unwrap_or(false));
    }
}
