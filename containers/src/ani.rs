// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! ANI/RIFF writer and reader (C1b): `RIFF`/`ACON` with `anih` and
//! `LIST/fram` sub-chunks, each `fram` entry a complete CUR payload.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::cur::{read_cur, write_cur};
use crate::error::ContainerError;
use crate::image::CursorImage;

const ANIH_FLAG_ICON: u32 = 0x0001;

fn chunk_id(bytes: &[u8; 4]) -> [u8; 4] {
    *bytes
}

fn padded_len(len: usize) -> usize {
    len + (len % 2)
}

fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) -> Result<(), ContainerError> {
    out.write_all(id)?;
    out.write_u32::<LittleEndian>(data.len() as u32)?;
    out.write_all(data)?;
    if data.len() % 2 == 1 {
        out.write_u8(0)?;
    }
    Ok(())
}

/// Encodes one frame per `images` entry at `jiffies` per frame (1/60 s)
/// into a complete `.ani` file.
pub fn write_ani(images: &[CursorImage], jiffies: u32) -> Result<Vec<u8>, ContainerError> {
    let num_frames = images.len() as u32;

    let mut anih = Vec::with_capacity(36);
    anih.write_u32::<LittleEndian>(36)?; // header size
    anih.write_u32::<LittleEndian>(num_frames)?;
    anih.write_u32::<LittleEndian>(num_frames)?; // num_steps == num_frames, no seq chunk
    anih.write_u32::<LittleEndian>(0)?; // width, unused when icon data is present
    anih.write_u32::<LittleEndian>(0)?; // height
    anih.write_u32::<LittleEndian>(0)?; // bit count
    anih.write_u32::<LittleEndian>(0)?; // planes
    anih.write_u32::<LittleEndian>(jiffies)?;
    anih.write_u32::<LittleEndian>(ANIH_FLAG_ICON)?;

    let mut fram_body = Vec::new();
    fram_body.write_all(b"fram")?;
    for image in images {
        let cur_bytes = write_cur(std::slice::from_ref(image))?;
        write_chunk(&mut fram_body, b"icon", &cur_bytes)?;
    }

    let mut riff_body = Vec::new();
    riff_body.write_all(b"ACON")?;
    write_chunk(&mut riff_body, b"anih", &anih)?;
    write_chunk(&mut riff_body, b"LIST", &fram_body)?;

    let mut out = Vec::new();
    write_chunk(&mut out, b"RIFF", &riff_body)?;

    Ok(out)
}

/// The result of reading back an `.ani` file: decoded frames plus the
/// header fields a caller may want to re-check.
pub struct ParsedAni {
    pub frames: Vec<CursorImage>,
    pub num_frames: u32,
    pub num_steps: u32,
    pub display_rate: u32,
    pub flags: u32,
}

fn read_fourcc(cursor: &mut Cursor<&[u8]>) -> Result<[u8; 4], ContainerError> {
    let mut id = [0u8; 4];
    cursor.read_exact(&mut id)?;
    Ok(id)
}

pub fn read_ani(bytes: &[u8]) -> Result<ParsedAni, ContainerError> {
    let mut cursor = Cursor::new(bytes);
    let riff_id = read_fourcc(&mut cursor)?;
    if &riff_id != b"RIFF" {
        return Err(ContainerError::DataFormat("missing RIFF header".to_string()));
    }
    let _riff_size = cursor.read_u32::<LittleEndian>()?;
    let form_type = read_fourcc(&mut cursor)?;
    if &form_type != b"ACON" {
        return Err(ContainerError::DataFormat(format!(
            "unexpected RIFF form type {:?}",
            String::from_utf8_lossy(&form_type)
        )));
    }

    let mut anih: Option<(u32, u32, u32, u32)> = None;
    let mut frames: Option<Vec<CursorImage>> = None;

    loop {
        let id = match read_fourcc(&mut cursor) {
            Ok(id) => id,
            Err(_) => break,
        };
        let size = cursor.read_u32::<LittleEndian>()?;
        let start = cursor.position() as usize;
        let end = start + size as usize;
        let data = bytes
            .get(start..end)
            .ok_or_else(|| ContainerError::DataFormat("chunk size extends past end of file".to_string()))?;

        match &id {
            b"anih" => {
                if anih.is_some() {
                    return Err(ContainerError::DataFormat("duplicate anih chunk".to_string()));
                }
                if data.len() < 36 {
                    return Err(ContainerError::DataFormat("anih chunk too short".to_string()));
                }
                let mut anih_cursor = Cursor::new(data);
                let _header_size = anih_cursor.read_u32::<LittleEndian>()?;
                let num_frames = anih_cursor.read_u32::<LittleEndian>()?;
                let num_steps = anih_cursor.read_u32::<LittleEndian>()?;
                let _width = anih_cursor.read_u32::<LittleEndian>()?;
                let _height = anih_cursor.read_u32::<LittleEndian>()?;
                let _bit_count = anih_cursor.read_u32::<LittleEndian>()?;
                let _planes = anih_cursor.read_u32::<LittleEndian>()?;
                let display_rate = anih_cursor.read_u32::<LittleEndian>()?;
                let flags = anih_cursor.read_u32::<LittleEndian>()?;
                anih = Some((num_frames, num_steps, display_rate, flags));
            }
            b"LIST" => {
                if data.len() < 4 {
                    return Err(ContainerError::DataFormat("LIST chunk too short".to_string()));
                }
                if &data[0..4] == b"fram" {
                    if frames.is_some() {
                        return Err(ContainerError::DataFormat("duplicate LIST/fram chunk".to_string()));
                    }
                    frames = Some(read_fram_list(&data[4..])?);
                } else {
                    log::trace!("ignoring unknown LIST type {:?}", String::from_utf8_lossy(&data[0..4]));
                }
            }
            b"seq " | b"rate" => {
                return Err(ContainerError::Unsupported(format!(
                    "{:?} chunk is not supported by this writer",
                    String::from_utf8_lossy(&chunk_id(&id))
                )))
            }
            other => {
                log::trace!("ignoring unknown chunk {:?}", String::from_utf8_lossy(other));
            }
        }

        cursor.set_position((start + padded_len(size as usize)) as u64);
    }

    let (num_frames, num_steps, display_rate, flags) =
        anih.ok_or_else(|| ContainerError::DataFormat("missing anih chunk".to_string()))?;
    let frames = frames.ok_or_else(|| ContainerError::DataFormat("missing LIST/fram chunk".to_string()))?;

    Ok(ParsedAni { frames, num_frames, num_steps, display_rate, flags })
}

fn read_fram_list(bytes: &[u8]) -> Result<Vec<CursorImage>, ContainerError> {
    let mut cursor = Cursor::new(bytes);
    let mut frames = Vec::new();

    loop {
        let id = match read_fourcc(&mut cursor) {
            Ok(id) => id,
            Err(_) => break,
        };
        let size = cursor.read_u32::<LittleEndian>()?;
        let start = cursor.position() as usize;
        let end = start + size as usize;
        let data = bytes
            .get(start..end)
            .ok_or_else(|| ContainerError::DataFormat("icon chunk size extends past end".to_string()))?;

        if &id == b"icon" {
            let mut images = read_cur(data)?;
            frames.append(&mut images);
        } else {
            log::trace!("ignoring unknown chunk {:?} inside LIST/fram", String::from_utf8_lossy(&id));
        }

        cursor.set_position((start + padded_len(size as usize)) as u64);
    }

    Ok(frames)
}
