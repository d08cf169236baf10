//! End-to-end exercises of the container writers/readers through the
//! crate's public API.

use cursorsmith_containers::ani::{read_ani, write_ani};
use cursorsmith_containers::cur::{read_cur, write_cur};
use cursorsmith_containers::mousecape::{average_hotspot, write_cape, CapeMeta, CursorEntry, Representation};
use cursorsmith_containers::CursorImage;

fn solid(width: u32, height: u32, hotspot: (u16, u16), color: [u8; 4]) -> CursorImage {
    CursorImage::new(width, height, hotspot, color.repeat((width * height) as usize))
}

#[test]
fn ani_round_trip_preserves_frame_order_and_hotspots() {
    let frames = vec![
        solid(32, 32, (1, 1), [255, 0, 0, 255]),
        solid(32, 32, (2, 2), [0, 255, 0, 255]),
        solid(32, 32, (3, 3), [0, 0, 255, 255]),
    ];
    let bytes = write_ani(&frames, 6).unwrap();

    let parsed = read_ani(&bytes).unwrap();
    assert_eq!(parsed.num_frames, 3);
    assert_eq!(parsed.display_rate, 6);
    let hotspots: Vec<(u16, u16)> = parsed.frames.iter().map(|f| f.hotspot).collect();
    assert_eq!(hotspots, vec![(1, 1), (2, 2), (3, 3)]);
}

#[test]
fn cur_write_then_read_back_matches_static_single_frame_cursor() {
    let image = solid(32, 32, (16, 16), [10, 20, 30, 255]);
    let bytes = write_cur(&[image.clone()]).unwrap();

    let read_back = read_cur(&bytes).unwrap();
    assert_eq!(read_back.len(), 1);
    assert_eq!(read_back[0].width, image.width);
    assert_eq!(read_back[0].hotspot, image.hotspot);
    assert_eq!(read_back[0].rgba, image.rgba);
}

#[test]
fn cape_hotspot_averages_across_mismatched_representation_scales() {
    // The 64px representation is 2x the 32px one; its hotspot must be
    // halved into the smallest representation's point space before
    // averaging, per Mousecape's HotSpotX/HotSpotY convention.
    let small = Representation { frames: vec![solid(32, 32, (8, 8), [0, 0, 0, 255])] };
    let large = Representation { frames: vec![solid(64, 64, (20, 20), [0, 0, 0, 255])] };

    let meta = CapeMeta {
        author: "cursorsmith".to_string(),
        cape_name: "Scaled".to_string(),
        cape_version: 1.0,
        cloud: false,
        hidpi: true,
        identifier: "com.example.scaled".to_string(),
    };
    let cursor = CursorEntry {
        identifier: "com.apple.cursor.1".to_string(),
        frame_duration_secs: 0.0,
        representations: vec![small, large],
    };

    let xml = write_cape(&meta, &[cursor]).unwrap();
    // small rep contributes (8,8); large rep's (20,20) halves to (10,10) in
    // point space; average of the two is (9,9).
    assert!(xml.contains("<key>HotSpotX</key>\n\t\t\t<real>9</real>"));
    assert!(xml.contains("<key>PointsWide</key>\n\t\t\t<integer>32</integer>"));
}

#[test]
fn average_hotspot_of_a_single_point_is_itself() {
    assert_eq!(average_hotspot(&[(3.5, 4.25)]), (3.5, 4.25));
}
