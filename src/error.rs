// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shaderlink`.
//
// `shaderlink` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shaderlink` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shaderlink`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! The error type.

use crate::ShaderStageKind;

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;

/// An error that occurred while building a shader program.
///
/// By the time one of these is returned, a human-readable diagnostic has already been sent to the
/// [`DiagnosticSink`](crate::DiagnosticSink).
#[derive(Debug)]
pub enum Error {
    /// The source file does not exist or cannot be accessed.
    ResourceNotFound {
        /// The offending path.
        path: PathBuf,
    },

    /// The source file exists but could not be read in full.
    ResourceRead {
        /// The offending path.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// The source text is not valid UTF-8.
    InvalidEncoding {
        /// The stage the text was meant for.
        stage: ShaderStageKind,

        /// The file the text came from, if any.
        path: Option<PathBuf>,

        /// The underlying decoding error.
        source: Utf8Error,
    },

    /// The source text for a stage is present but empty.
    EmptySource {
        /// The offending stage.
        stage: ShaderStageKind,

        /// The file the text came from, if any.
        path: Option<PathBuf>,
    },

    /// A stage that is required to build the program was not provided.
    MissingStage(ShaderStageKind),

    /// The driver failed to compile a stage.
    StageCompile {
        /// The offending stage.
        stage: ShaderStageKind,

        /// The driver's info log.
        log: Option<String>,
    },

    /// The driver failed to link the program.
    ProgramLink {
        /// The driver's info log.
        log: Option<String>,
    },

    /// The linked program failed validation.
    ProgramValidate {
        /// The driver's info log.
        log: Option<String>,
    },

    /// The driver could not create an object.
    Driver(Box<dyn StdError + 'static>),
}

/// The kind of an [`Error`], without any of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::ResourceNotFound`].
    ResourceNotFound,

    /// See [`Error::ResourceRead`].
    ResourceRead,

    /// See [`Error::InvalidEncoding`].
    InvalidEncoding,

    /// See [`Error::EmptySource`].
    EmptySource,

    /// See [`Error::MissingStage`].
    MissingStage,

    /// See [`Error::StageCompile`].
    StageCompile,

    /// See [`Error::ProgramLink`].
    ProgramLink,

    /// See [`Error::ProgramValidate`].
    ProgramValidate,

    /// See [`Error::Driver`].
    Driver,
}

impl Error {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Error::ResourceRead { .. } => ErrorKind::ResourceRead,
            Error::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            Error::EmptySource { .. } => ErrorKind::EmptySource,
            Error::MissingStage(_) => ErrorKind::MissingStage,
            Error::StageCompile { .. } => ErrorKind::StageCompile,
            Error::ProgramLink { .. } => ErrorKind::ProgramLink,
            Error::ProgramValidate { .. } => ErrorKind::ProgramValidate,
            Error::Driver(_) => ErrorKind::Driver,
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::ResourceNotFound { path } | Error::ResourceRead { path, .. } => Some(path),
            Error::InvalidEncoding { path, .. } | Error::EmptySource { path, .. } => {
                path.as_deref()
            }
            _ => None,
        }
    }

    /// The stage this error is about, if any.
    pub fn stage(&self) -> Option<ShaderStageKind> {
        match self {
            Error::InvalidEncoding { stage, .. }
            | Error::EmptySource { stage, .. }
            | Error::StageCompile { stage, .. } => Some(*stage),
            Error::MissingStage(stage) => Some(*stage),
            _ => None,
        }
    }

    /// The driver's info log, if the driver produced one.
    pub fn log(&self) -> Option<&str> {
        match self {
            Error::StageCompile { log, .. }
            | Error::ProgramLink { log }
            | Error::ProgramValidate { log } => log.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn driver(err: impl StdError + 'static) -> Self {
        Error::Driver(Box::new(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceNotFound { path } => {
                write!(f, "couldn't access {}", path.display())
            }
            Error::ResourceRead { path, source } => {
                write!(f, "couldn't read {}: {}", path.display(), source)
            }
            Error::InvalidEncoding { stage, path, .. } => match path {
                Some(path) => write!(
                    f,
                    "{} shader source in {} is not valid UTF-8",
                    stage,
                    path.display()
                ),
                None => write!(f, "{} shader source is not valid UTF-8", stage),
            },
            Error::EmptySource { stage, path } => match path {
                Some(path) => write!(f, "{} shader source in {} is empty", stage, path.display()),
                None => write!(f, "{} shader source is empty", stage),
            },
            Error::MissingStage(stage) => write!(f, "missing required {} shader stage", stage),
            Error::StageCompile { stage, log } => {
                write!(f, "couldn't compile {} shader", stage)?;
                write_log(f, log)
            }
            Error::ProgramLink { log } => {
                f.write_str("couldn't link program")?;
                write_log(f, log)
            }
            Error::ProgramValidate { log } => {
                f.write_str("program is invalid")?;
                write_log(f, log)
            }
            Error::Driver(err) => write!(f, "driver error: {}", err),
        }
    }
}

fn write_log(f: &mut fmt::Formatter<'_>, log: &Option<String>) -> fmt::Result {
    match log {
        Some(log) => write!(f, ": {}", log),
        None => Ok(()),
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ResourceRead { source, .. } => Some(source),
            Error::InvalidEncoding { source, .. } => Some(source),
            Error::Driver(err) => Some(&**err),
            _ => None,
        }
    }
}
