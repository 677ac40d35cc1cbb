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

//! Reading shader sources from disk.

use crate::diagnostics::{Diagnostic, DiagnosticSink, Step};
use crate::error::Error;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::str::Utf8Error;

/// The contents of a source file, followed by a NUL terminator.
///
/// The terminator is not counted in [`len`](Self::len).
#[derive(Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    /// Always at least one byte long; the last byte is always zero.
    bytes: Box<[u8]>,
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SourceBuffer {
    fn from_vec(mut bytes: Vec<u8>) -> Self {
        bytes.push(0);
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// The length of the contents, without the terminator.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Whether the file was empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The contents, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// The contents, including the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// The contents as text.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

/// Reads whole files into [`SourceBuffer`]s.
#[derive(Debug, Clone, Copy)]
pub struct SourceLoader<'a, S: DiagnosticSink + ?Sized> {
    sink: &'a S,
}

impl<'a, S: DiagnosticSink + ?Sized> SourceLoader<'a, S> {
    /// Create a loader that reports failures to `sink`.
    pub fn new(sink: &'a S) -> Self {
        Self { sink }
    }

    /// Read a file in full.
    ///
    /// A file that can't be found or accessed fails with [`Error::ResourceNotFound`]. A file
    /// that disappears or shrinks between the access check and the read, or that can't be read
    /// for any other reason, fails with [`Error::ResourceRead`]. Either way a diagnostic is
    /// reported first.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SourceBuffer, Error> {
        let path = path.as_ref();

        let expected = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "source file is not accessible");
                self.sink.report(&Diagnostic::failure(
                    Step::Load,
                    format!("Couldn't access {} file", path.display()),
                ));
                return Err(Error::ResourceNotFound { path: path.into() });
            }
        };

        let file = File::open(path).map_err(|source| self.read_failed(path, source))?;
        self.read_source(path, file, expected)
    }

    /// Read exactly `expected` bytes of `path` from `reader`.
    fn read_source(
        &self,
        path: &Path,
        reader: impl Read,
        expected: u64,
    ) -> Result<SourceBuffer, Error> {
        let bytes = read_up_to(reader, expected).map_err(|source| self.read_failed(path, source))?;

        if bytes.len() as u64 != expected {
            self.sink.report(&Diagnostic::failure(
                Step::Load,
                format!(
                    "Error reading file {}: Unexpected end of file",
                    path.display()
                ),
            ));
            return Err(Error::ResourceRead {
                path: path.into(),
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("read {} of {} bytes", bytes.len(), expected),
                ),
            });
        }

        tracing::trace!(path = %path.display(), len = bytes.len(), "loaded source file");
        Ok(SourceBuffer::from_vec(bytes))
    }

    fn read_failed(&self, path: &Path, source: io::Error) -> Error {
        self.sink.report(&Diagnostic::failure(
            Step::Load,
            format!("Error: Couldn't read file {}", path.display()),
        ));
        Error::ResourceRead {
            path: path.into(),
            source,
        }
    }
}

/// Read up to `expected` bytes from `reader`.
///
/// Anything past `expected` is ignored.
fn read_up_to(reader: impl Read, expected: u64) -> io::Result<Vec<u8>> {
    let capacity = usize::try_from(expected)
        .ok()
        .and_then(|len| len.checked_add(1))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "file is too large"))?;

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(capacity)
        .map_err(|err| io::Error::new(io::ErrorKind::OutOfMemory, err))?;

    reader.take(expected).read_to_end(&mut bytes)?;
    Ok(bytes)
}
