// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

/// Errors surfaced by the container readers/writers.
#[derive(Debug)]
pub enum ContainerError {
    /// A binary reader rejected malformed input (bad magic, overlapping
    /// offsets, inconsistent counts, ...).
    DataFormat(String),
    /// A recognized-but-unhandled feature, e.g. an ANI `seq`/`rate` chunk.
    Unsupported(String),
    Io(std::io::Error),
    Png(png::EncodingError),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::DataFormat(msg) => write!(f, "malformed container: {msg}"),
            ContainerError::Unsupported(msg) => write!(f, "unsupported feature: {msg}"),
            ContainerError::Io(e) => write!(f, "I/O error: {e}"),
            ContainerError::Png(e) => write!(f, "PNG encoding error: {e}"),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<std::io::Error> for ContainerError {
    fn from(e: std::io::Error) -> Self {
        ContainerError::Io(e)
    }
}

impl From<png::EncodingError> for ContainerError {
    fn from(e: png::EncodingError) -> Self {
        ContainerError::Png(e)
    }
}
