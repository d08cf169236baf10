// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Binary and text container formats for the four supported cursor
//! platforms: CUR/ICO, ANI/RIFF, the Mousecape plist, and Xcursor's
//! `xcursorgen` config / `index.theme` / symlink aliases.

pub mod ani;
pub mod cur;
pub mod error;
pub mod image;
pub mod mousecape;
pub mod xcursor;

pub use error::ContainerError;
pub use image::CursorImage;
