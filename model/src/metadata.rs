// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SVG metadata reader (C2): pulls the view-box, hotspot, root anchor and
//! child anchors out of a parsed SVG document.
//!
//! Anchors are authored as zero-footprint marker elements: a `circle`,
//! `ellipse`, `rect` or `use` element whose `class` attribute carries a
//! `hotspot` or `anchor` token (plus an optional `bias-...` token, see
//! [`crate::anchor`]). The coordinate is read from `cx`/`cy` for
//! circle/ellipse/use, or from the center of `x`/`y`/`width`/`height` for
//! rect. Exactly one `hotspot` marker and at most one `root-anchor` marker
//! are recognized at the document root; any other marked element becomes a
//! child anchor keyed by its [`ElementPath`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use xmltree::Element;

use crate::anchor::{parse_bias, AnchorPoint, Bias, InvalidBias};
use crate::geom::Rect;
use crate::path::ElementPath;

#[derive(Debug)]
pub enum SvgError {
    MissingViewBox,
    InvalidViewBox(String),
    Bias(InvalidBias),
    Xml(xmltree::ParseError),
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgError::MissingViewBox => {
                write!(f, "SVG has neither a 'viewBox' nor 'width'/'height' attributes")
            }
            SvgError::InvalidViewBox(s) => write!(f, "invalid 'viewBox' attribute value: '{s}'"),
            SvgError::Bias(e) => write!(f, "{e}"),
            SvgError::Xml(e) => write!(f, "SVG parsing failed: {e}"),
        }
    }
}

impl std::error::Error for SvgError {}

impl From<InvalidBias> for SvgError {
    fn from(e: InvalidBias) -> Self {
        SvgError::Bias(e)
    }
}

impl From<xmltree::ParseError> for SvgError {
    fn from(e: xmltree::ParseError) -> Self {
        SvgError::Xml(e)
    }
}

/// Parsed, semantic metadata of one SVG cursor source file.
#[derive(Clone, Debug)]
pub struct SvgMetadata {
    pub source_view_box: Rect,
    pub hotspot: AnchorPoint,
    pub root_anchor: AnchorPoint,
    pub child_anchors: HashMap<ElementPath, AnchorPoint>,
}

fn parse_view_box(svg: &Element) -> Result<Rect, SvgError> {
    if let Some(vb) = svg.attributes.get("viewBox") {
        let parts: Vec<f64> = vb
            .split([' ', ','])
            .filter(|s| !s.is_empty())
            .map(f64::from_str)
            .collect::<Result<_, _>>()
            .map_err(|_| SvgError::InvalidViewBox(vb.clone()))?;

        if parts.len() != 4 {
            return Err(SvgError::InvalidViewBox(vb.clone()));
        }

        return Rect::new(parts[0], parts[1], parts[2], parts[3])
            .ok_or_else(|| SvgError::InvalidViewBox(vb.clone()));
    }

    let width = svg.attributes.get("width").and_then(|s| parse_length(s));
    let height = svg.attributes.get("height").and_then(|s| parse_length(s));

    match (width, height) {
        (Some(w), Some(h)) => Rect::new(0.0, 0.0, w, h).ok_or(SvgError::MissingViewBox),
        _ => Err(SvgError::MissingViewBox),
    }
}

fn parse_length(s: &str) -> Option<f64> {
    let trimmed = s.trim_end_matches(|c: char| c.is_alphabetic() || c == '%');
    f64::from_str(trimmed).ok()
}

fn marker_point(el: &Element) -> Option<(f64, f64)> {
    match el.name.as_str() {
        "circle" | "ellipse" | "use" => {
            let cx = el.attributes.get("cx").and_then(|s| parse_length(s)).unwrap_or(0.0);
            let cy = el.attributes.get("cy").and_then(|s| parse_length(s)).unwrap_or(0.0);
            Some((cx, cy))
        }
        "rect" => {
            let x = el.attributes.get("x").and_then(|s| parse_length(s)).unwrap_or(0.0);
            let y = el.attributes.get("y").and_then(|s| parse_length(s)).unwrap_or(0.0);
            let w = el.attributes.get("width").and_then(|s| parse_length(s)).unwrap_or(0.0);
            let h = el.attributes.get("height").and_then(|s| parse_length(s)).unwrap_or(0.0);
            Some((x + w / 2.0, y + h / 2.0))
        }
        _ => None,
    }
}

fn class_tokens(el: &Element) -> Vec<&str> {
    el.attributes
        .get("class")
        .map(|c| c.split_whitespace().collect())
        .unwrap_or_default()
}

fn bias_from_class(tokens: &[&str]) -> Result<Bias, SvgError> {
    for tok in tokens {
        if let Some(rest) = tok.strip_prefix("bias-") {
            return Ok(parse_bias(rest)?);
        }
    }
    Ok(Bias::neutral())
}

/// Recursively walks the document, building `child_anchors` and returning
/// the hotspot/root-anchor markers if found.
struct Walk {
    child_anchors: HashMap<ElementPath, AnchorPoint>,
    hotspot: Option<AnchorPoint>,
    root_anchor: Option<AnchorPoint>,
}

impl Walk {
    fn visit(&mut self, el: &Element, path: &ElementPath) -> Result<(), SvgError> {
        let tokens = class_tokens(el);
        let is_hotspot = tokens.contains(&"hotspot");
        let is_root_anchor = tokens.contains(&"root-anchor");
        let is_anchor = tokens.contains(&"anchor") || is_hotspot || is_root_anchor;

        if is_anchor {
            if let Some((x, y)) = marker_point(el) {
                let bias = bias_from_class(&tokens)?;
                let anchor = AnchorPoint::new(x, y, bias);

                if is_hotspot {
                    self.hotspot = Some(anchor);
                } else if is_root_anchor {
                    self.root_anchor = Some(anchor);
                } else {
                    self.child_anchors.insert(path.clone(), anchor);
                }
            }
        }

        let mut ordinals: HashMap<String, u32> = HashMap::new();
        for child in &el.children {
            if let xmltree::XMLNode::Element(child_el) = child {
                let ordinal = ordinals.entry(child_el.name.clone()).or_insert(0);
                *ordinal += 1;
                let child_path = path.child(child_el.name.clone(), *ordinal);
                self.visit(child_el, &child_path)?;
            }
        }

        Ok(())
    }
}

/// Extracts [`SvgMetadata`] from a parsed SVG document's root element.
pub fn extract_metadata(svg: &Element) -> Result<SvgMetadata, SvgError> {
    let source_view_box = parse_view_box(svg)?;

    let mut walk = Walk { child_anchors: HashMap::new(), hotspot: None, root_anchor: None };
    walk.visit(svg, &ElementPath::root())?;

    let hotspot = walk.hotspot.unwrap_or_else(|| {
        let (cx, cy) = source_view_box.center();
        AnchorPoint::new(cx, cy, Bias::neutral())
    });

    let root_anchor =
        walk.root_anchor.unwrap_or_else(|| AnchorPoint::new(0.0, 0.0, Bias::neutral()));

    Ok(SvgMetadata { source_view_box, hotspot, root_anchor, child_anchors: walk.child_anchors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(svg: &str) -> Element {
        Element::parse(svg.as_bytes()).unwrap()
    }

    #[test]
    fn reads_view_box() {
        let el = parse(r#"<svg viewBox="0 0 256 256"></svg>"#);
        let meta = extract_metadata(&el).unwrap();
        assert_eq!(meta.source_view_box.width(), 256.0);
    }

    #[test]
    fn falls_back_to_width_height() {
        let el = parse(r#"<svg width="32" height="32"></svg>"#);
        let meta = extract_metadata(&el).unwrap();
        assert_eq!(meta.source_view_box.width(), 32.0);
    }

    #[test]
    fn missing_size_is_an_error() {
        let el = parse(r#"<svg></svg>"#);
        assert!(matches!(extract_metadata(&el), Err(SvgError::MissingViewBox)));
    }

    #[test]
    fn hotspot_defaults_to_viewbox_center() {
        let el = parse(r#"<svg viewBox="0 0 100 200"></svg>"#);
        let meta = extract_metadata(&el).unwrap();
        assert_eq!((meta.hotspot.x, meta.hotspot.y), (50.0, 100.0));
    }

    #[test]
    fn reads_hotspot_and_bias() {
        let el = parse(
            r#"<svg viewBox="0 0 256 256">
                <circle class="hotspot bias-top-right" cx="10" cy="20" r="1"/>
            </svg>"#,
        );
        let meta = extract_metadata(&el).unwrap();
        assert_eq!((meta.hotspot.x, meta.hotspot.y), (10.0, 20.0));
        assert_eq!((meta.hotspot.bias.dx, meta.hotspot.bias.dy), (1.0, -1.0));
    }

    #[test]
    fn reads_child_anchors_keyed_by_path() {
        let el = parse(
            r#"<svg viewBox="0 0 256 256">
                <g>
                    <rect class="anchor" x="10" y="10" width="10" height="10"/>
                </g>
            </svg>"#,
        );
        let meta = extract_metadata(&el).unwrap();
        assert_eq!(meta.child_anchors.len(), 1);
        let (_, anchor) = meta.child_anchors.iter().next().unwrap();
        assert_eq!((anchor.x, anchor.y), (15.0, 15.0));
    }
}
