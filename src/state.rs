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

//! Helpers for the global state of the driver context.

use crate::context::{PolygonMode, ShaderContext};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Step};

/// Draw polygons as outlines, or go back to filling them.
pub fn set_wireframe_mode<C: ShaderContext + ?Sized>(context: &C, enabled: bool) {
    let mode = if enabled {
        PolygonMode::Line
    } else {
        PolygonMode::Fill
    };

    tracing::debug!(?mode, "setting polygon mode");
    context.set_polygon_mode(mode);
}

/// Drain the driver's error queue, returning how many errors were discarded.
pub fn clear_errors<C: ShaderContext + ?Sized>(context: &C) -> usize {
    let mut count = 0;
    while let Some(err) = context.take_error() {
        tracing::trace!(%err, "discarding pending driver error");
        count += 1;
    }
    count
}

/// Check whether the driver has recorded an error since the last check.
///
/// Only the oldest pending error is consumed and reported to `sink`. Returns `true` if there was
/// an error.
pub fn check_errors<C, S>(context: &C, sink: &S) -> bool
where
    C: ShaderContext + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    match context.take_error() {
        Some(err) => {
            sink.report(&Diagnostic::failure(Step::Driver, format!("GL_ERROR: {}", err)));
            true
        }
        None => false,
    }
}
