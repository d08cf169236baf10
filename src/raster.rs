// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rasterization is a pluggable external collaborator: the renderer hands a
//! transformed SVG document and a target pixel size to a [`RasterBackend`]
//! and gets back straight, premultiplied-free RGBA pixels. No concrete
//! production backend ships here; a host binary wires in whatever SVG
//! rasterizer its build has available.

use xmltree::Element;

#[derive(Debug)]
pub enum RasterError {
    /// The rasterizer rejected the document outright (unsupported element,
    /// malformed attribute it cares about, etc.).
    Unsupported(String),
    /// The backend failed for a reason that isn't about the document's
    /// content (allocation failure, internal panic caught at the boundary).
    Backend(String),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Unsupported(msg) => write!(f, "unsupported SVG content: {msg}"),
            RasterError::Backend(msg) => write!(f, "rasterizer error: {msg}"),
        }
    }
}

impl std::error::Error for RasterError {}

/// Straight (non-premultiplied) 8-bit RGBA pixels at a known size.
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Renders a transformed SVG document to a square canvas of raw RGBA
/// pixels. Implementations must honor the document's own `viewBox` and
/// scale it to fill `size` exactly, matching the sizing engine's own
/// `Transform::box_sizing` convention — the two must agree pixel-for-pixel
/// or the computed hotspot will be off by a sub-pixel amount.
pub trait RasterBackend {
    fn rasterize(&self, svg: &Element, size: u32) -> Result<RasterImage, RasterError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A backend used only by this crate's own tests: fills every pixel
    /// with a fixed color so renderer tests can assert on size/hotspot
    /// plumbing without depending on an actual SVG rasterizer.
    pub struct SolidColorBackend {
        pub color: [u8; 4],
    }

    impl RasterBackend for SolidColorBackend {
        fn rasterize(&self, _svg: &Element, size: u32) -> Result<RasterImage, RasterError> {
            let mut rgba = Vec::with_capacity((size * size * 4) as usize);
            for _ in 0..(size * size) {
                rgba.extend_from_slice(&self.color);
            }
            Ok(RasterImage { width: size, height: size, rgba })
        }
    }
}
