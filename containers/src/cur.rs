// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CUR/ICO writer and reader (C1a): `ICONDIR`/`ICONDIRENTRY` plus PNG
//! payloads.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::error::ContainerError;
use crate::image::{decode_png, encode_png, CursorImage, PNG_SIGNATURE};

const ICONDIR_SIZE: usize = 6;
const ICONDIRENTRY_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    Icon,
    Cursor,
}

impl ResourceType {
    fn as_u16(self) -> u16 {
        match self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }
}

fn dimension_byte(dim: u32) -> u8 {
    if dim >= 256 {
        0
    } else {
        dim as u8
    }
}

fn dimension_from_byte(b: u8) -> u32 {
    if b == 0 {
        256
    } else {
        b as u32
    }
}

/// Encodes `images` (each as a complete PNG payload) into a CUR file,
/// applying the `(-numColors, -averageDimension)` entry ordering and
/// collapsing duplicate `(width, height, numColors)` entries in favor of
/// the later one.
pub fn write_cur(images: &[CursorImage]) -> Result<Vec<u8>, ContainerError> {
    write_icon_resource(images, ResourceType::Cursor)
}

pub fn write_ico(images: &[CursorImage]) -> Result<Vec<u8>, ContainerError> {
    write_icon_resource(images, ResourceType::Icon)
}

struct PendingEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    hotspot: (u16, u16),
    payload: Vec<u8>,
}

fn write_icon_resource(
    images: &[CursorImage],
    kind: ResourceType,
) -> Result<Vec<u8>, ContainerError> {
    let mut entries: Vec<PendingEntry> = Vec::with_capacity(images.len());

    for image in images {
        let payload = encode_png(image.width, image.height, &image.rgba)?;
        let num_colors = image.color_count().unwrap_or(0);
        let entry = PendingEntry {
            width: image.width,
            height: image.height,
            num_colors,
            hotspot: image.hotspot,
            payload,
        };

        let key = (entry.width, entry.height, entry.num_colors);
        if let Some(existing) = entries
            .iter_mut()
            .find(|e| (e.width, e.height, e.num_colors) == key)
        {
            *existing = entry;
        } else {
            let avg_dim = |e: &PendingEntry| (e.width as f64 + e.height as f64) / 2.0;
            let sort_key = |e: &PendingEntry| (-(e.num_colors as i32), -(avg_dim(e) as i32));
            let new_key = sort_key(&entry);
            let insert_at = entries.iter().position(|e| sort_key(e) > new_key).unwrap_or(entries.len());
            entries.insert(insert_at, entry);
        }
    }

    let num_images = entries.len() as u16;
    let mut out = Vec::new();
    out.write_u16::<LittleEndian>(0)?; // reserved
    out.write_u16::<LittleEndian>(kind.as_u16())?;
    out.write_u16::<LittleEndian>(num_images)?;

    let mut offset = (ICONDIR_SIZE + entries.len() * ICONDIRENTRY_SIZE) as u32;
    for entry in &entries {
        out.write_u8(dimension_byte(entry.width))?;
        out.write_u8(dimension_byte(entry.height))?;
        out.write_u8(entry.num_colors)?;
        out.write_u8(0)?; // reserved
        out.write_u16::<LittleEndian>(entry.hotspot.0)?;
        out.write_u16::<LittleEndian>(entry.hotspot.1)?;
        out.write_u32::<LittleEndian>(entry.payload.len() as u32)?;
        out.write_u32::<LittleEndian>(offset)?;
        offset += entry.payload.len() as u32;
    }

    for entry in &entries {
        out.write_all(&entry.payload)?;
    }

    Ok(out)
}

struct RawEntry {
    width: u32,
    height: u32,
    hotspot: (u16, u16),
    data_size: u32,
    data_offset: u32,
}

/// Parses an existing CUR/ICO file back into [`CursorImage`]s, sorted by
/// ascending `dataOffset`. Entries whose payload is BMP-encoded with an
/// unsupported bit depth are skipped with a [`ContainerError::Unsupported`]
/// only for that single entry's decode, not the whole file.
pub fn read_cur(bytes: &[u8]) -> Result<Vec<CursorImage>, ContainerError> {
    let mut cursor = Cursor::new(bytes);
    let _reserved = cursor.read_u16::<LittleEndian>()?;
    let _kind = cursor.read_u16::<LittleEndian>()?;
    let num_images = cursor.read_u16::<LittleEndian>()?;

    let header_end = (ICONDIR_SIZE + num_images as usize * ICONDIRENTRY_SIZE) as u32;

    let mut entries = Vec::with_capacity(num_images as usize);
    for _ in 0..num_images {
        let width_b = cursor.read_u8()?;
        let height_b = cursor.read_u8()?;
        let _num_colors = cursor.read_u8()?;
        let _reserved = cursor.read_u8()?;
        let hotspot_x = cursor.read_u16::<LittleEndian>()?;
        let hotspot_y = cursor.read_u16::<LittleEndian>()?;
        let data_size = cursor.read_u32::<LittleEndian>()?;
        let data_offset = cursor.read_u32::<LittleEndian>()?;

        if data_offset < header_end {
            return Err(ContainerError::DataFormat(format!(
                "entry dataOffset {data_offset} overlaps the header (ends at {header_end})"
            )));
        }

        entries.push(RawEntry {
            width: dimension_from_byte(width_b),
            height: dimension_from_byte(height_b),
            hotspot: (hotspot_x, hotspot_y),
            data_size,
            data_offset,
        });
    }

    entries.sort_by_key(|e| e.data_offset);

    let mut prev_end: Option<u32> = None;
    for entry in &entries {
        if let Some(prev_end) = prev_end {
            if entry.data_offset < prev_end {
                return Err(ContainerError::DataFormat(format!(
                    "entry at offset {} overlaps the previous entry ending at {prev_end}",
                    entry.data_offset
                )));
            } else if entry.data_offset > prev_end {
                log::trace!("gap of {} bytes before entry at {}", entry.data_offset - prev_end, entry.data_offset);
            }
        }
        prev_end = Some(entry.data_offset + entry.data_size);
    }

    let mut images = Vec::with_capacity(entries.len());
    for entry in &entries {
        let start = entry.data_offset as usize;
        let end = start + entry.data_size as usize;
        let payload = bytes.get(start..end).ok_or_else(|| {
            ContainerError::DataFormat("entry payload extends past end of file".to_string())
        })?;

        if payload.starts_with(&PNG_SIGNATURE) {
            let (width, height, rgba) = decode_png(payload)?;
            images.push(CursorImage::new(width, height, entry.hotspot, rgba));
        } else {
            let (width, height, rgba) = decode_bmp(payload, entry.width, entry.height)?;
            images.push(CursorImage::new(width, height, entry.hotspot, rgba));
        }
    }

    Ok(images)
}

/// Decodes the minimal subset of `BITMAPINFOHEADER`-based DIBs this reader
/// needs: uncompressed 32bpp BGRA, optionally followed by a 1bpp AND mask.
/// `fallback_width`/`fallback_height` come from the ICONDIRENTRY in case
/// the header's own height (doubled for the AND mask) disagrees.
fn decode_bmp(data: &[u8], fallback_width: u32, fallback_height: u32) -> Result<(u32, u32, Vec<u8>), ContainerError> {
    if data.len() < 40 {
        return Err(ContainerError::DataFormat("BMP header truncated".to_string()));
    }

    let mut cursor = Cursor::new(data);
    let header_size = cursor.read_u32::<LittleEndian>()?;
    if header_size < 40 {
        return Err(ContainerError::DataFormat("unsupported BITMAPINFOHEADER size".to_string()));
    }
    let width = cursor.read_i32::<LittleEndian>()?;
    let height_with_mask = cursor.read_i32::<LittleEndian>()?;
    let _planes = cursor.read_u16::<LittleEndian>()?;
    let bit_count = cursor.read_u16::<LittleEndian>()?;
    let compression = cursor.read_u32::<LittleEndian>()?;

    if compression != 0 || bit_count != 32 {
        return Err(ContainerError::Unsupported(format!(
            "BMP cursor payload with bitCount={bit_count} compression={compression}"
        )));
    }

    let width = width.unsigned_abs();
    let height = (height_with_mask.unsigned_abs()) / 2;
    let (width, height) = if width == 0 || height == 0 {
        (fallback_width, fallback_height)
    } else {
        (width, height)
    };

    let pixel_start = header_size as usize;
    let row_bytes = (width * 4) as usize;
    let needed = pixel_start + row_bytes * height as usize;
    if data.len() < needed {
        return Err(ContainerError::DataFormat("BMP pixel data truncated".to_string()));
    }

    // BMP rows are stored bottom-to-top; BGRA -> RGBA.
    let mut rgba = vec![0u8; row_bytes * height as usize];
    for row in 0..height as usize {
        let src_row = pixel_start + (height as usize - 1 - row) * row_bytes;
        let src = &data[src_row..src_row + row_bytes];
        let dst = &mut rgba[row * row_bytes..(row + 1) * row_bytes];
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
            d[0] = s[2];
            d[1] = s[1];
            d[2] = s[0];
            d[3] = s[3];
        }
    }

    Ok((width, height, rgba))
}
