//! End-to-end exercises of the metadata/transform/sizing chain (C2-C4)
//! through the crate's public API, as opposed to the in-module unit tests
//! that poke each stage in isolation.

use std::collections::HashMap;

use cursorsmith_model::transform_pipeline::Pipeline;
use cursorsmith_model::{compute_alignment, extract_metadata, AlignmentInput};

const POINTER: &str = r#"
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32">
    <circle class="hotspot bias-top-left" cx="4" cy="4" r="0"/>
    <circle class="anchor bias-center" cx="16" cy="16" r="0"/>
    <g>
        <path d="M4,4 L28,16 L16,28 Z" stroke="#000000" stroke-width="2" fill="#ffffff"/>
    </g>
</svg>
"#;

#[test]
fn loaded_document_survives_thin_stroke_then_alignment() {
    let mut root = xmltree::Element::parse(POINTER.as_bytes()).unwrap();
    let metadata = extract_metadata(&root).unwrap();

    let pipeline = cursorsmith_model::transform_pipeline::ThinStrokeParams { new_width: 1.0 };
    let update = Pipeline { svg11_compat: false, thin_stroke: Some(pipeline), pointer_shadow: None };
    update.apply_update(&mut root);

    let path = root.get_mut_child("g").unwrap().get_mut_child("path").unwrap();
    assert_eq!(path.attributes.get("stroke-width").map(String::as_str), Some("1"));

    let input = AlignmentInput {
        target: 16.0,
        source_view_box: metadata.source_view_box,
        canvas_size: 1.0,
        stroke_offset: 0.0,
        fill_offset: 0.0,
        hotspot: metadata.hotspot,
        root_anchor: metadata.root_anchor,
        child_anchors: &metadata.child_anchors,
        balance_canvas: false,
        balance_limit_factor: 0.0,
    };
    let alignment = compute_alignment(&input).unwrap();
    alignment.apply_to_dom(&mut root);

    assert!(root.attributes.contains_key("viewBox"));
    assert!(alignment.hotspot.0 <= 16 && alignment.hotspot.1 <= 16);
}

#[test]
fn empty_child_anchors_still_align_the_root() {
    let root = xmltree::Element::parse("<svg viewBox='0 0 10 10'/>".as_bytes()).unwrap();
    let metadata = extract_metadata(&root).unwrap();
    assert!(metadata.child_anchors.is_empty());

    let input = AlignmentInput {
        target: 10.0,
        source_view_box: metadata.source_view_box,
        canvas_size: 1.0,
        stroke_offset: 0.0,
        fill_offset: 0.0,
        hotspot: metadata.hotspot,
        root_anchor: metadata.root_anchor,
        child_anchors: &HashMap::new(),
        balance_canvas: false,
        balance_limit_factor: 0.0,
    };
    let alignment = compute_alignment(&input).unwrap();
    assert!(alignment.child_translates.is_empty());
}
