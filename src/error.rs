// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The root error type: composes every crate's narrow error via `From`
//! and tags it with a kind so `main` can map it to a process exit code.

use std::fmt;

use cursorsmith_containers::ContainerError;
use cursorsmith_model::{AlignmentError, ConfigError};

#[derive(Debug)]
pub enum Error {
    /// Malformed CLI invocation. Exit code 1.
    Arg(String),
    /// Malformed manifest/JSON, blank theme name, unknown palette. Exit code 2.
    Config(ConfigError),
    /// Numeric overflow or unparseable bias during sizing. Exit code 3.
    Alignment(AlignmentError),
    /// A binary reader/writer rejected malformed input, or a
    /// recognized-but-unhandled feature. Exit code 3.
    Container(ContainerError),
    /// File system failure. Exit code 3.
    Io(std::io::Error),
    /// Internal invariant violated; should not happen in normal operation.
    /// Exit code 4.
    Internal(String),
}

impl Error {
    /// The process exit code for this error's kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Arg(_) => 1,
            Error::Config(_) => 2,
            Error::Alignment(_) | Error::Container(_) | Error::Io(_) => 3,
            Error::Internal(_) => 4,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Arg(msg) => write!(f, "{msg}"),
            Error::Config(e) => write!(f, "{e}"),
            Error::Alignment(e) => write!(f, "{e}"),
            Error::Container(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<AlignmentError> for Error {
    fn from(e: AlignmentError) -> Self {
        Error::Alignment(e)
    }
}

impl From<ContainerError> for Error {
    fn from(e: ContainerError) -> Self {
        Error::Container(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<pico_args::Error> for Error {
    fn from(e: pico_args::Error) -> Self {
        Error::Arg(e.to_string())
    }
}
