// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mousecape writer (C1c): Apple property-list `.cape` files, one
//! `<dict>` entry per cursor, each representation a base64-encoded PNG
//! "filmstrip" stacking all animation frames vertically.

use crate::error::ContainerError;
use crate::image::{encode_png, stack_vertically, CursorImage};

const LINE_WRAP: usize = 76;

/// One representation: all frames of one cursor at one resolution.
pub struct Representation {
    pub frames: Vec<CursorImage>,
}

/// One cursor entry in the cape's `Cursors` dictionary.
pub struct CursorEntry {
    pub identifier: String,
    pub frame_duration_secs: f64,
    /// Representations ordered by ascending pixel width, smallest first —
    /// the smallest defines `PointsWide`/`PointsHigh`.
    pub representations: Vec<Representation>,
}

/// Top-level cape metadata.
pub struct CapeMeta {
    pub author: String,
    pub cape_name: String,
    pub cape_version: f64,
    pub cloud: bool,
    pub hidpi: bool,
    pub identifier: String,
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = base64::encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WRAP + 1);
    for chunk in encoded.as_bytes().chunks(LINE_WRAP) {
        out.push_str(std::str::from_utf8(chunk).expect("base64 alphabet is ASCII"));
        out.push('\n');
    }
    out
}

fn scale_factor_for(points_wide: u32, frame_width: u32) -> u32 {
    if points_wide == 0 {
        1
    } else {
        (frame_width / points_wide).max(1)
    }
}

/// Rounds the unweighted average of `hotspots` (in target pixels at each
/// representation's own resolution, already scaled down to the smallest
/// representation's point space by the caller) to 3 decimals.
pub fn average_hotspot(hotspots: &[(f64, f64)]) -> (f64, f64) {
    if hotspots.is_empty() {
        return (0.0, 0.0);
    }
    let n = hotspots.len() as f64;
    let sx: f64 = hotspots.iter().map(|h| h.0).sum();
    let sy: f64 = hotspots.iter().map(|h| h.1).sum();
    let round3 = |v: f64| (v * 1000.0).round() / 1000.0;
    (round3(sx / n), round3(sy / n))
}

fn write_cursor_entry(out: &mut String, entry: &CursorEntry) -> Result<(), ContainerError> {
    let smallest = entry
        .representations
        .first()
        .ok_or_else(|| ContainerError::DataFormat("cursor entry has no representations".to_string()))?;
    let first_frame = smallest
        .frames
        .first()
        .ok_or_else(|| ContainerError::DataFormat("representation has no frames".to_string()))?;

    let points_wide = first_frame.width;
    let points_high = first_frame.height;
    let frame_count = smallest.frames.len() as u32;

    let hotspots: Vec<(f64, f64)> = entry
        .representations
        .iter()
        .filter_map(|r| r.frames.first())
        .map(|f| {
            let scale = scale_factor_for(points_wide, f.width);
            (f.hotspot.0 as f64 / scale as f64, f.hotspot.1 as f64 / scale as f64)
        })
        .collect();
    let (hotspot_x, hotspot_y) = average_hotspot(&hotspots);

    out.push_str(&format!("\t\t<key>{}</key>\n", xml_escape(&entry.identifier)));
    out.push_str("\t\t<dict>\n");
    out.push_str(&format!("\t\t\t<key>FrameCount</key>\n\t\t\t<integer>{frame_count}</integer>\n"));
    out.push_str(&format!(
        "\t\t\t<key>FrameDuration</key>\n\t\t\t<real>{}</real>\n",
        entry.frame_duration_secs
    ));
    out.push_str(&format!("\t\t\t<key>HotSpotX</key>\n\t\t\t<real>{hotspot_x}</real>\n"));
    out.push_str(&format!("\t\t\t<key>HotSpotY</key>\n\t\t\t<real>{hotspot_y}</real>\n"));
    out.push_str(&format!("\t\t\t<key>PointsHigh</key>\n\t\t\t<integer>{points_high}</integer>\n"));
    out.push_str(&format!("\t\t\t<key>PointsWide</key>\n\t\t\t<integer>{points_wide}</integer>\n"));
    out.push_str("\t\t\t<key>Representations</key>\n\t\t\t<array>\n");

    for rep in &entry.representations {
        let (width, height, rgba) = stack_vertically(&rep.frames);
        let png = encode_png(width, height, &rgba)?;
        out.push_str("\t\t\t\t<data>\n");
        for line in wrap_base64(&png).lines() {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("\t\t\t\t</data>\n");
    }

    out.push_str("\t\t\t</array>\n");
    out.push_str("\t\t</dict>\n");
    Ok(())
}

/// Renders a complete `.cape` plist document.
pub fn write_cape(meta: &CapeMeta, cursors: &[CursorEntry]) -> Result<String, ContainerError> {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"\">\n");
    out.push_str("<plist version=\"1.0\">\n<dict>\n");

    out.push_str(&format!("\t<key>Author</key>\n\t<string>{}</string>\n", xml_escape(&meta.author)));
    out.push_str(&format!("\t<key>CapeName</key>\n\t<string>{}</string>\n", xml_escape(&meta.cape_name)));
    out.push_str(&format!("\t<key>CapeVersion</key>\n\t<real>{}</real>\n", meta.cape_version));
    out.push_str(&format!("\t<key>Cloud</key>\n\t<{}/>\n", if meta.cloud { "true" } else { "false" }));

    out.push_str("\t<key>Cursors</key>\n\t<dict>\n");
    for cursor in cursors {
        write_cursor_entry(&mut out, cursor)?;
    }
    out.push_str("\t</dict>\n");

    out.push_str(&format!("\t<key>HiDPI</key>\n\t<{}/>\n", if meta.hidpi { "true" } else { "false" }));
    out.push_str(&format!("\t<key>Identifier</key>\n\t<string>{}</string>\n", xml_escape(&meta.identifier)));
    out.push_str("\t<key>MinimumVersion</key>\n\t<real>2.0</real>\n");
    out.push_str("\t<key>Version</key>\n\t<real>2.0</real>\n");

    out.push_str("</dict>\n</plist>\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u8, w: u32, h: u32) -> CursorImage {
        CursorImage::new(w, h, (w as u16 / 2, h as u16 / 2), vec![n, n, n, 255].repeat((w * h) as usize))
    }

    #[test]
    fn scenario_5_filmstrip_dimensions() {
        let frames: Vec<_> = (0..4).map(|n| frame(n, 64, 64)).collect();
        let (width, height, _) = stack_vertically(&frames);
        assert_eq!(width, 64);
        assert_eq!(height, 256);
    }

    #[test]
    fn cape_document_reports_frame_count_and_duration() {
        let meta = CapeMeta {
            author: "cursorsmith".to_string(),
            cape_name: "Test".to_string(),
            cape_version: 1.0,
            cloud: false,
            hidpi: true,
            identifier: "com.example.test".to_string(),
        };
        let frames: Vec<_> = (0..4).map(|n| frame(n, 64, 64)).collect();
        let cursor = CursorEntry {
            identifier: "com.apple.cursor.1".to_string(),
            frame_duration_secs: 0.05,
            representations: vec![Representation { frames }],
        };

        let xml = write_cape(&meta, &[cursor]).unwrap();
        assert!(xml.contains("<key>FrameCount</key>\n\t\t\t<integer>4</integer>"));
        assert!(xml.contains("<real>0.05</real>"));
        assert!(xml.contains("<data>"));
    }

    #[test]
    fn hotspot_average_rounds_to_three_decimals() {
        let avg = average_hotspot(&[(1.0, 2.0), (1.5, 2.5), (2.0, 3.0)]);
        assert_eq!(avg, (1.5, 2.5));
    }

    #[test]
    fn base64_round_trips_through_wrap() {
        let png = encode_png(2, 2, &[0u8; 16]).unwrap();
        let wrapped = wrap_base64(&png);
        let joined: String = wrapped.lines().collect();
        let decoded = base64::decode(joined).unwrap();
        assert_eq!(decoded, png);
    }
}
