// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SVG transformer pipeline (C3): three composable passes over a mutable
//! `xmltree::Element` DOM. Each pass is a typed struct rather than a
//! reflective/string-keyed transformer; [`Pipeline::set_thin_stroke`] and
//! [`Pipeline::set_pointer_shadow`] let a caller re-set a pass's parameters
//! across variants without rebuilding the pipeline itself.

use xmltree::{Element, XMLNode};

/// Parameters for the `thin-stroke` pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThinStrokeParams {
    pub new_width: f64,
}

/// Parameters for the `drop-shadow` pass. `color` is `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadowParams {
    pub blur: f64,
    pub dx: f64,
    pub dy: f64,
    pub opacity: f64,
    pub color: u32,
}

/// The ordered set of passes applied to a cursor's DOM for one variant.
/// `thin_stroke` and `pointer_shadow` are re-set across variants sharing
/// the same source document; `svg11_compat` runs once, on load.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    pub svg11_compat: bool,
    pub thin_stroke: Option<ThinStrokeParams>,
    pub pointer_shadow: Option<DropShadowParams>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn set_thin_stroke(&mut self, params: Option<ThinStrokeParams>) {
        self.thin_stroke = params;
    }

    pub fn set_pointer_shadow(&mut self, params: Option<DropShadowParams>) {
        self.pointer_shadow = params;
    }

    /// Applies the passes requested at load time (`svg11_compat` only).
    pub fn apply_load(&self, root: &mut Element) {
        if self.svg11_compat {
            svg11_compat(root);
        }
    }

    /// Applies the passes that are re-run per variant: stripping marker
    /// elements, thin-stroke, and drop-shadow.
    pub fn apply_update(&self, root: &mut Element) {
        strip_anchor_markers(root);

        if let Some(params) = self.thin_stroke {
            thin_stroke(root, params.new_width);
        }

        if let Some(params) = self.pointer_shadow {
            drop_shadow(root, params);
        }
    }
}

/// `thin-stroke`: replaces every `stroke-width` attribute with `new_width`,
/// scaled proportionally to the element's original width so a drawing with
/// mixed stroke weights keeps its relative weighting.
fn thin_stroke(root: &mut Element, new_width: f64) {
    let base_width = find_base_stroke_width(root).unwrap_or(new_width);
    if base_width <= 0.0 {
        return;
    }

    let ratio = new_width / base_width;
    visit_mut(root, &mut |el| {
        if let Some(w) = el.attributes.get("stroke-width").and_then(|s| s.parse::<f64>().ok()) {
            el.attributes.insert("stroke-width".to_string(), format!("{}", w * ratio));
        }
    });
}

/// The first `stroke-width` encountered in document order is treated as the
/// drawing's base width, used to keep the other strokes' relative weight.
fn find_base_stroke_width(root: &Element) -> Option<f64> {
    let mut found = None;
    visit(root, &mut |el| {
        if found.is_none() {
            if let Some(w) = el.attributes.get("stroke-width").and_then(|s| s.parse::<f64>().ok()) {
                found = Some(w);
            }
        }
    });
    found
}

/// Removes the zero-footprint marker elements (`hotspot`/`anchor`/
/// `root-anchor` classes) used by the metadata reader; they must never
/// reach the raster backend.
fn strip_anchor_markers(root: &mut Element) {
    root.children.retain(|node| {
        if let XMLNode::Element(el) = node {
            !is_marker(el)
        } else {
            true
        }
    });

    for child in &mut root.children {
        if let XMLNode::Element(el) = child {
            strip_anchor_markers(el);
        }
    }
}

fn is_marker(el: &Element) -> bool {
    el.attributes
        .get("class")
        .map(|c| {
            c.split_whitespace()
                .any(|tok| tok == "hotspot" || tok == "anchor" || tok == "root-anchor")
        })
        .unwrap_or(false)
}

/// `drop-shadow`: injects a `<filter id="drop-shadow">` into `<defs>`
/// (creating it if absent) and sets `filter="url(#drop-shadow)"` on the
/// root `<svg>`.
fn drop_shadow(root: &mut Element, params: DropShadowParams) {
    let defs = find_or_create_defs(root);
    defs.children.retain(|n| !matches!(n, XMLNode::Element(e) if e.name == "filter" && e.attributes.get("id").map(String::as_str) == Some("drop-shadow")));
    defs.children.push(XMLNode::Element(build_drop_shadow_filter(params)));

    root.attributes.insert("filter".to_string(), "url(#drop-shadow)".to_string());
}

fn find_or_create_defs(root: &mut Element) -> &mut Element {
    let idx = root.children.iter().position(|n| matches!(n, XMLNode::Element(e) if e.name == "defs"));

    let idx = match idx {
        Some(i) => i,
        None => {
            root.children.insert(0, XMLNode::Element(Element::new("defs")));
            0
        }
    };

    match &mut root.children[idx] {
        XMLNode::Element(e) => e,
        _ => unreachable!(),
    }
}

fn build_drop_shadow_filter(params: DropShadowParams) -> Element {
    let mut filter = Element::new("filter");
    filter.attributes.insert("id".to_string(), "drop-shadow".to_string());
    filter.attributes.insert("x".to_string(), "-50%".to_string());
    filter.attributes.insert("y".to_string(), "-50%".to_string());
    filter.attributes.insert("width".to_string(), "200%".to_string());
    filter.attributes.insert("height".to_string(), "200%".to_string());

    let mut blur = Element::new("feGaussianBlur");
    blur.attributes.insert("in".to_string(), "SourceAlpha".to_string());
    blur.attributes.insert("stdDeviation".to_string(), format!("{}", params.blur));
    blur.attributes.insert("result".to_string(), "blur".to_string());

    let mut offset = Element::new("feOffset");
    offset.attributes.insert("in".to_string(), "blur".to_string());
    offset.attributes.insert("dx".to_string(), format!("{}", params.dx));
    offset.attributes.insert("dy".to_string(), format!("{}", params.dy));
    offset.attributes.insert("result".to_string(), "offsetBlur".to_string());

    let (a, r, g, b) = argb_channels(params.color);
    let alpha = (a as f64 / 255.0) * params.opacity;

    let mut flood = Element::new("feFlood");
    flood.attributes.insert("flood-color".to_string(), format!("#{:02x}{:02x}{:02x}", r, g, b));
    flood.attributes.insert("flood-opacity".to_string(), format!("{}", alpha));
    flood.attributes.insert("result".to_string(), "color".to_string());

    let mut composite = Element::new("feComposite");
    composite.attributes.insert("in".to_string(), "color".to_string());
    composite.attributes.insert("in2".to_string(), "offsetBlur".to_string());
    composite.attributes.insert("operator".to_string(), "in".to_string());
    composite.attributes.insert("result".to_string(), "shadow".to_string());

    let mut merge = Element::new("feMerge");
    let mut shadow_node = Element::new("feMergeNode");
    shadow_node.attributes.insert("in".to_string(), "shadow".to_string());
    let mut source_node = Element::new("feMergeNode");
    source_node.attributes.insert("in".to_string(), "SourceGraphic".to_string());
    merge.children.push(XMLNode::Element(shadow_node));
    merge.children.push(XMLNode::Element(source_node));

    filter.children.push(XMLNode::Element(blur));
    filter.children.push(XMLNode::Element(offset));
    filter.children.push(XMLNode::Element(flood));
    filter.children.push(XMLNode::Element(composite));
    filter.children.push(XMLNode::Element(merge));

    filter
}

fn argb_channels(color: u32) -> (u8, u8, u8, u8) {
    let a = ((color >> 24) & 0xFF) as u8;
    let r = ((color >> 16) & 0xFF) as u8;
    let g = ((color >> 8) & 0xFF) as u8;
    let b = (color & 0xFF) as u8;
    (a, r, g, b)
}

/// `svg11-compat`: rewrites `href="..."` to `xlink:href="..."`, and
/// decomposes `<path fill=".." stroke=".." paint-order="stroke fill">`
/// into a fill-only `<path>` (given a generated id) plus a stroke-only
/// `<use>` referencing it, so SVG 1.1 consumers (which lack
/// `paint-order`) render the same stacking order.
fn svg11_compat(root: &mut Element) {
    let mut next_id = 0u32;
    rewrite_href(root);
    decompose_paint_order(root, &mut next_id);
}

fn rewrite_href(el: &mut Element) {
    if let Some(href) = el.attributes.remove("href") {
        el.attributes.insert("xlink:href".to_string(), href);
    }

    for child in &mut el.children {
        if let XMLNode::Element(child_el) = child {
            rewrite_href(child_el);
        }
    }
}

fn decompose_paint_order(el: &mut Element, next_id: &mut u32) {
    let mut new_children = Vec::with_capacity(el.children.len());

    for child in el.children.drain(..) {
        match child {
            XMLNode::Element(mut child_el) => {
                decompose_paint_order(&mut child_el, next_id);

                let needs_split = child_el.name == "path"
                    && child_el.attributes.get("fill").is_some()
                    && child_el.attributes.get("stroke").is_some()
                    && child_el.attributes.get("paint-order").map(String::as_str) == Some("stroke fill");

                if needs_split {
                    let id = format!("cs-fill-{}", *next_id);
                    *next_id += 1;

                    let mut fill_only = child_el.clone();
                    fill_only.attributes.insert("id".to_string(), id.clone());
                    fill_only.attributes.remove("stroke");
                    fill_only.attributes.remove("stroke-width");
                    fill_only.attributes.remove("paint-order");

                    let mut stroke_use = Element::new("use");
                    stroke_use.attributes.insert("xlink:href".to_string(), format!("#{id}"));
                    if let Some(stroke) = child_el.attributes.get("stroke") {
                        stroke_use.attributes.insert("stroke".to_string(), stroke.clone());
                    }
                    if let Some(w) = child_el.attributes.get("stroke-width") {
                        stroke_use.attributes.insert("stroke-width".to_string(), w.clone());
                    }
                    stroke_use.attributes.insert("fill".to_string(), "none".to_string());

                    new_children.push(XMLNode::Element(fill_only));
                    new_children.push(XMLNode::Element(stroke_use));
                } else {
                    new_children.push(XMLNode::Element(child_el));
                }
            }
            other => new_children.push(other),
        }
    }

    el.children = new_children;
}

fn visit(el: &Element, f: &mut impl FnMut(&Element)) {
    f(el);
    for child in &el.children {
        if let XMLNode::Element(child_el) = child {
            visit(child_el, f);
        }
    }
}

fn visit_mut(el: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(el);
    for child in &mut el.children {
        if let XMLNode::Element(child_el) = child {
            visit_mut(child_el, f);
        }
    }
}
