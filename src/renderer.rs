// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cursor renderer (C5): loads one SVG source document once, then replays
//! it through the variant axes (colors, stroke width, shadow, size, frame)
//! without re-parsing. Each `render_target_size` call clones the
//! load-time-transformed document, applies the per-variant passes, runs the
//! sizing/alignment engine, and hands the aligned document to a
//! [`RasterBackend`].

use std::collections::BTreeMap;
use std::path::Path;

use cursorsmith_containers::CursorImage;
use cursorsmith_model::config::DropShadow;
use cursorsmith_model::sizing::{compute_alignment, AlignmentInput};
use cursorsmith_model::transform_pipeline::{DropShadowParams, Pipeline, ThinStrokeParams};
use cursorsmith_model::{extract_metadata, SvgMetadata};
use xmltree::{Element, XMLNode};

use crate::error::Error;
use crate::raster::RasterBackend;

/// A fully rendered cursor frame, ready to hand to a container writer.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    pub cursor_name: String,
    pub frame_index: Option<u32>,
    pub images: Vec<CursorImage>,
}

/// One loaded SVG source, replayed across the variant axes it's asked to
/// render.
pub struct CursorRenderer {
    /// The document after load-time passes (`svg11-compat`) but before any
    /// per-variant mutation.
    loaded: Element,
    metadata: SvgMetadata,
    colors: Option<BTreeMap<String, String>>,
    requested_stroke_width: Option<f64>,
    base_stroke_width: f64,
    min_stroke_width: f64,
    pointer_shadow: Option<DropShadowParams>,
    fill_offset: f64,
    canvas_size: f64,
    balance_canvas: bool,
    /// Frames accumulated via [`CursorRenderer::save_deferred`], keyed by
    /// cursor name, awaiting a flush once every frame of an animation has
    /// been rendered.
    deferred: BTreeMap<String, Vec<RenderedFrame>>,
}

impl CursorRenderer {
    /// Parses `path`, reads its metadata, and runs the one-time
    /// `svg11-compat` pass.
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        let mut loaded =
            Element::parse(bytes.as_slice()).map_err(|e| Error::Internal(format!("{path:?}: {e}")))?;
        let metadata = extract_metadata(&loaded).map_err(|e| Error::Internal(e.to_string()))?;

        let load_pipeline = Pipeline { svg11_compat: true, thin_stroke: None, pointer_shadow: None };
        load_pipeline.apply_load(&mut loaded);

        Ok(CursorRenderer {
            loaded,
            metadata,
            colors: None,
            requested_stroke_width: None,
            base_stroke_width: cursorsmith_model::config::BASE_STROKE_WIDTH,
            min_stroke_width: 1.0,
            pointer_shadow: None,
            fill_offset: 0.0,
            canvas_size: 1.0,
            balance_canvas: false,
            deferred: BTreeMap::new(),
        })
    }

    pub fn set_colors(&mut self, colors: Option<BTreeMap<String, String>>) {
        self.colors = colors;
    }

    /// Stores the requested stroke width, the document's own base stroke
    /// width, and the hair-width promotion threshold (in output pixels).
    /// The actual width used at a given target size is resolved per-call by
    /// [`CursorRenderer::resolve_stroke_for_target`], since the hair-width
    /// threshold scales with the target's resolution.
    pub fn set_stroke_width(&mut self, new_width: Option<f64>, base_stroke_width: f64, min_stroke_width: f64) {
        self.requested_stroke_width = new_width;
        self.base_stroke_width = base_stroke_width;
        self.min_stroke_width = min_stroke_width;
    }

    /// Resolves the stroke width to actually draw at `target` pixels: below
    /// `min_stroke_width` output pixels, a stroke this thin risks vanishing
    /// under anti-aliasing, so its source-unit width is promoted to the
    /// hair-width threshold `sourceCanvas * minStrokeWidth / target`.
    fn resolve_stroke_for_target(&self, target: f64) -> (Option<ThinStrokeParams>, f64) {
        match self.requested_stroke_width {
            None => (None, 0.0),
            Some(requested) => {
                let source_canvas = self.metadata.source_view_box.width() * self.canvas_size;
                let threshold = source_canvas * self.min_stroke_width / target;
                let effective = requested.max(threshold);
                let offset = (effective - self.base_stroke_width) / 2.0;
                (Some(ThinStrokeParams { new_width: effective }), offset)
            }
        }
    }

    pub fn set_pointer_shadow(&mut self, shadow: Option<DropShadow>) {
        self.pointer_shadow = shadow.map(|s| DropShadowParams {
            blur: s.blur,
            dx: s.dx,
            dy: s.dy,
            opacity: s.opacity,
            color: s.color,
        });
    }

    pub fn set_fill_offset(&mut self, fill_offset: f64) {
        self.fill_offset = fill_offset;
    }

    pub fn set_canvas_size(&mut self, canvas_size: f64, balance_canvas: bool) {
        self.canvas_size = canvas_size;
        self.balance_canvas = balance_canvas;
    }

    /// Renders one frame at every requested target pixel size, returning
    /// the images in the same order as `targets`.
    pub fn render_target_sizes(
        &self,
        targets: &[f64],
        raster: &dyn RasterBackend,
    ) -> Result<Vec<CursorImage>, Error> {
        let mut colored = self.loaded.clone();
        if let Some(colors) = &self.colors {
            recolor(&mut colored, colors);
        }

        let mut images = Vec::with_capacity(targets.len());
        for &target in targets {
            let (thin_stroke, stroke_offset) = self.resolve_stroke_for_target(target);

            let update_pipeline =
                Pipeline { svg11_compat: false, thin_stroke, pointer_shadow: self.pointer_shadow };
            let mut frame_document = colored.clone();
            update_pipeline.apply_update(&mut frame_document);

            let input = AlignmentInput {
                target,
                source_view_box: self.metadata.source_view_box,
                canvas_size: self.canvas_size,
                stroke_offset,
                fill_offset: self.fill_offset,
                hotspot: self.metadata.hotspot,
                root_anchor: self.metadata.root_anchor,
                child_anchors: &self.metadata.child_anchors,
                balance_canvas: self.balance_canvas,
                balance_limit_factor: cursorsmith_model::sizing::DEFAULT_BALANCE_LIMIT,
            };
            let alignment = compute_alignment(&input)?;
            alignment.apply_to_dom(&mut frame_document);

            let raster_size = target.round().max(1.0) as u32;
            let rastered = raster
                .rasterize(&frame_document, raster_size)
                .map_err(|e| Error::Internal(e.to_string()))?;

            images.push(CursorImage::new(
                rastered.width,
                rastered.height,
                alignment.hotspot,
                rastered.rgba,
            ));
        }

        Ok(images)
    }

    /// Stores a single-frame (non-animated) cursor's rendering, ready for
    /// the theme driver to write out immediately.
    pub fn save_current(&self, cursor_name: impl Into<String>, images: Vec<CursorImage>) -> RenderedFrame {
        RenderedFrame { cursor_name: cursor_name.into(), frame_index: None, images }
    }

    /// Accumulates one animation frame. Nothing is written until the
    /// caller flushes with [`CursorRenderer::take_deferred`] once every
    /// frame for `cursor_name` has been pushed.
    pub fn save_deferred(&mut self, cursor_name: impl Into<String>, frame_index: u32, images: Vec<CursorImage>) {
        let cursor_name = cursor_name.into();
        self.deferred
            .entry(cursor_name.clone())
            .or_default()
            .push(RenderedFrame { cursor_name, frame_index: Some(frame_index), images });
    }

    /// Removes and returns every deferred frame queued for `cursor_name`,
    /// sorted by frame index.
    pub fn take_deferred(&mut self, cursor_name: &str) -> Vec<RenderedFrame> {
        let mut frames = self.deferred.remove(cursor_name).unwrap_or_default();
        frames.sort_by_key(|f| f.frame_index.unwrap_or(0));
        frames
    }

    pub fn hotspot_of(&self, images: &[CursorImage]) -> Option<(u16, u16)> {
        images.first().map(|img| img.hotspot)
    }
}

/// Case-insensitive hex prefix replacement over every attribute, on every
/// element in the subtree. A value only needs to start with a mapped hex
/// color, not equal it exactly, so an 8-digit `#rrggbbaa` value is recolored
/// with its alpha channel (or any other suffix) carried over unchanged.
fn recolor(el: &mut Element, map: &BTreeMap<String, String>) {
    for value in el.attributes.values_mut() {
        if let Some(replaced) = replace_color_prefix(value.as_str(), map) {
            *value = replaced;
        }
    }

    for child in &mut el.children {
        if let XMLNode::Element(child_el) = child {
            recolor(child_el, map);
        }
    }
}

/// Finds the longest key in `map` that `value` starts with
/// (case-insensitive) and splices in its replacement, preserving whatever
/// of `value` followed the matched prefix.
fn replace_color_prefix(value: &str, map: &BTreeMap<String, String>) -> Option<String> {
    map.iter()
        .filter(|(k, _)| value.len() >= k.len() && value[..k.len()].eq_ignore_ascii_case(k))
        .max_by_key(|(k, _)| k.len())
        .map(|(k, v)| format!("{v}{}", &value[k.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::test_support::SolidColorBackend;
    use std::io::Write;

    fn write_svg(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{body}").unwrap();
        path
    }

    const SAMPLE: &str = r#"<svg viewBox="0 0 32 32">
        <circle class="hotspot bias-center" cx="16" cy="16" r="0"/>
        <path d="M0,0" fill="#ff0000" stroke-width="16"/>
    </svg>"#;

    #[test]
    fn renders_requested_target_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_svg(dir.path(), "pointer.svg", SAMPLE);

        let renderer = CursorRenderer::load_file(&path).unwrap();
        let backend = SolidColorBackend { color: [255, 0, 0, 255] };
        let images = renderer.render_target_sizes(&[32.0, 48.0], &backend).unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].width, 32);
        assert_eq!(images[1].width, 48);
    }

    #[test]
    fn hair_width_threshold_promotes_thin_strokes_at_small_targets() {
        let renderer = CursorRenderer {
            loaded: Element::parse(SAMPLE.as_bytes()).unwrap(),
            metadata: extract_metadata(&Element::parse(SAMPLE.as_bytes()).unwrap()).unwrap(),
            colors: None,
            requested_stroke_width: Some(0.5),
            base_stroke_width: 16.0,
            min_stroke_width: 1.0,
            pointer_shadow: None,
            fill_offset: 0.0,
            canvas_size: 1.0,
            balance_canvas: false,
            deferred: BTreeMap::new(),
        };

        // source_canvas (32) * min_stroke_width (1) / target (8) = 4, well
        // above the requested 0.5, so the resolved width is promoted to 4.
        let (thin_stroke, offset) = renderer.resolve_stroke_for_target(8.0);
        let params = thin_stroke.unwrap();
        assert!((params.new_width - 4.0).abs() < 1e-9);
        assert!((offset - (4.0 - 16.0) / 2.0).abs() < 1e-9);

        // At a large enough target the threshold drops below the requested
        // width, so the requested width passes through unchanged.
        let (thin_stroke, _) = renderer.resolve_stroke_for_target(256.0);
        let params = thin_stroke.unwrap();
        assert!((params.new_width - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recolor_replaces_fill_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_svg(dir.path(), "pointer.svg", SAMPLE);

        let mut renderer = CursorRenderer::load_file(&path).unwrap();
        let mut colors = BTreeMap::new();
        colors.insert("#FF0000".to_string(), "#00ff00".to_string());
        renderer.set_colors(Some(colors));

        let backend = SolidColorBackend { color: [0, 0, 0, 255] };
        let images = renderer.render_target_sizes(&[16.0], &backend).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn recolor_matches_any_attribute_by_value_prefix() {
        let mut colors = BTreeMap::new();
        colors.insert("#ff0000".to_string(), "#00ff00".to_string());

        // `flood-color` isn't fill/stroke/stop-color, and the value carries
        // an 8-digit alpha suffix the map key doesn't spell out.
        let svg = r#"<svg viewBox="0 0 32 32">
            <feFlood flood-color="#FF0000FF"/>
        </svg>"#;
        let mut root = Element::parse(svg.as_bytes()).unwrap();
        recolor(&mut root, &colors);

        let flood = &root.children[1];
        let XMLNode::Element(flood_el) = flood else { panic!("expected element") };
        assert_eq!(flood_el.attributes.get("flood-color").unwrap(), "#00ff00FF");
    }

    #[test]
    fn deferred_frames_flush_sorted_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_svg(dir.path(), "spin.svg", SAMPLE);
        let mut renderer = CursorRenderer::load_file(&path).unwrap();

        renderer.save_deferred("spin", 2, vec![]);
        renderer.save_deferred("spin", 0, vec![]);
        renderer.save_deferred("spin", 1, vec![]);

        let frames = renderer.take_deferred("spin");
        let indices: Vec<u32> = frames.iter().map(|f| f.frame_index.unwrap()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(renderer.take_deferred("spin").is_empty());
    }
}
