// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The container-agnostic bitmap type shared by the CUR, ANI, Mousecape and
//! Xcursor writers, plus PNG codec helpers.

use std::collections::HashSet;
use std::io::Cursor;

use crate::error::ContainerError;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// One rasterized cursor frame: 32-bit RGBA pixels plus the hotspot that
/// applies to it.
#[derive(Clone, Debug)]
pub struct CursorImage {
    pub width: u32,
    pub height: u32,
    pub hotspot: (u16, u16),
    pub rgba: Vec<u8>,
}

impl CursorImage {
    pub fn new(width: u32, height: u32, hotspot: (u16, u16), rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        CursorImage { width, height, hotspot, rgba }
    }

    /// Number of distinct RGBA colors, or `None` once the count would
    /// overflow the ICONDIRENTRY `numColors` byte (>= 256 colors).
    pub fn color_count(&self) -> Option<u8> {
        let mut seen = HashSet::new();
        for px in self.rgba.chunks_exact(4) {
            seen.insert((px[0], px[1], px[2], px[3]));
            if seen.len() >= 256 {
                return None;
            }
        }
        Some(seen.len() as u8)
    }

    pub fn average_dimension(&self) -> f64 {
        (self.width as f64 + self.height as f64) / 2.0
    }
}

/// Encodes `rgba` as a standalone PNG (8-bit RGBA, no interlacing).
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba).map_err(ContainerError::from)?;
    }
    Ok(buf)
}

/// Decodes a PNG byte stream into raw 8-bit RGBA pixels.
pub fn decode_png(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), ContainerError> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder
        .read_info()
        .map_err(|e| ContainerError::DataFormat(format!("invalid PNG: {e}")))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ContainerError::DataFormat(format!("invalid PNG: {e}")))?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 0xFF])
            .collect(),
        png::ColorType::GrayscaleAlpha => {
            buf.chunks_exact(2).flat_map(|c| [c[0], c[0], c[0], c[1]]).collect()
        }
        png::ColorType::Grayscale => {
            buf.iter().flat_map(|&g| [g, g, g, 0xFF]).collect()
        }
        png::ColorType::Indexed => {
            return Err(ContainerError::Unsupported("indexed-color PNG payload".to_string()))
        }
    };

    Ok((info.width, info.height, rgba))
}

/// Vertically stacks `frames` (all assumed the same width) into one PNG
/// "filmstrip" image, top frame first.
pub fn stack_vertically(frames: &[CursorImage]) -> (u32, u32, Vec<u8>) {
    let width = frames.first().map(|f| f.width).unwrap_or(0);
    let height: u32 = frames.iter().map(|f| f.height).sum();
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for frame in frames {
        rgba.extend_from_slice(&frame.rgba);
    }
    (width, height, rgba)
}
