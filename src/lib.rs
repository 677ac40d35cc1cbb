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

//! Load, compile and link shader programs without the boilerplate.
//!
//! This crate takes shader sources (either as strings or as files on disk), submits them to a
//! graphics driver for compilation, links the compiled stages into a program object and reports
//! whatever the driver has to say about it in a uniform way.
//!
//! To use, implement the [`ShaderContext`] trait for a type that represents an active driver
//! context (or use the `shaderlink-glow` crate, which implements it for [`glow`]). Wrap a
//! reference to it in a [`ShaderCompiler`] and call [`ShaderCompiler::compile_from_source`] or
//! [`ShaderCompiler::compile_from_files`].
//!
//! Every failure is reported to a [`DiagnosticSink`] at the point where it happens and is then
//! returned as an [`Error`]. Driver objects created along the way are always released, even when
//! the pipeline fails halfway through.
//!
//! Note that this crate uses thread-unsafe primitives. Driver contexts are bound to a single
//! thread anyways, so there is nothing to gain from sharing these types across threads.
//!
//! [`glow`]: https://crates.io/crates/glow

#![forbid(unsafe_code, rust_2018_idioms)]

use std::fmt;
use std::ops::{Index, IndexMut};

mod context;
mod diagnostics;
mod error;
mod link;
mod options;
mod pipeline;
mod resources;
mod source;
mod stage;
mod state;

#[cfg(test)]
mod mock;

pub use self::context::{DriverError, PolygonMode, ShaderContext, StatusCheck};
pub use self::diagnostics::{
    CollectSink, Diagnostic, DiagnosticSink, Query, Reporter, StderrSink, Step, TracingSink,
};
pub use self::error::{Error, ErrorKind};
pub use self::link::ProgramLinker;
pub use self::options::{Options, Requirement, StageRequirements, DEFAULT_INFO_LOG_LIMIT};
pub use self::pipeline::ShaderCompiler;
pub use self::source::{SourceBuffer, SourceLoader};
pub use self::stage::StageCompiler;
pub use self::state::{check_errors, clear_errors, set_wireframe_mode};

/// The kind of a programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStageKind {
    /// The vertex stage.
    Vertex,

    /// The geometry stage.
    Geometry,

    /// The fragment stage.
    Fragment,
}

impl ShaderStageKind {
    /// Every stage kind, in pipeline order.
    pub const ALL: [ShaderStageKind; 3] = [
        ShaderStageKind::Vertex,
        ShaderStageKind::Geometry,
        ShaderStageKind::Fragment,
    ];

    /// A lowercase name for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStageKind::Vertex => "vertex",
            ShaderStageKind::Geometry => "geometry",
            ShaderStageKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional value per pipeline stage.
///
/// This is used for everything that comes in a vertex/geometry/fragment triple: source strings,
/// file paths and compiled stage handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stages<T> {
    /// The vertex stage.
    pub vertex: Option<T>,

    /// The geometry stage.
    pub geometry: Option<T>,

    /// The fragment stage.
    pub fragment: Option<T>,
}

impl<T> Default for Stages<T> {
    fn default() -> Self {
        Self {
            vertex: None,
            geometry: None,
            fragment: None,
        }
    }
}

impl<T> Stages<T> {
    /// Create a new set of stages.
    pub fn new(vertex: Option<T>, geometry: Option<T>, fragment: Option<T>) -> Self {
        Self {
            vertex,
            geometry,
            fragment,
        }
    }

    /// The common case: a vertex and a fragment stage.
    pub fn vertex_fragment(vertex: T, fragment: T) -> Self {
        Self::new(Some(vertex), None, Some(fragment))
    }

    /// Add a geometry stage.
    pub fn with_geometry(mut self, geometry: T) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Get the value for a stage, if there is one.
    pub fn get(&self, kind: ShaderStageKind) -> Option<&T> {
        self[kind].as_ref()
    }

    /// Iterate over the stages that are present, in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStageKind, &T)> + '_ {
        ShaderStageKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|value| (kind, value)))
    }

    /// The number of stages that are present.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no stage is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow every present value.
    pub fn as_ref(&self) -> Stages<&T> {
        Stages {
            vertex: self.vertex.as_ref(),
            geometry: self.geometry.as_ref(),
            fragment: self.fragment.as_ref(),
        }
    }

    /// Convert every present value.
    pub fn map<U>(self, mut convert: impl FnMut(ShaderStageKind, T) -> U) -> Stages<U> {
        Stages {
            vertex: self.vertex.map(|v| convert(ShaderStageKind::Vertex, v)),
            geometry: self.geometry.map(|g| convert(ShaderStageKind::Geometry, g)),
            fragment: self.fragment.map(|f| convert(ShaderStageKind::Fragment, f)),
        }
    }
}

impl<T> Index<ShaderStageKind> for Stages<T> {
    type Output = Option<T>;

    fn index(&self, kind: ShaderStageKind) -> &Option<T> {
        match kind {
            ShaderStageKind::Vertex => &self.vertex,
            ShaderStageKind::Geometry => &self.geometry,
            ShaderStageKind::Fragment => &self.fragment,
        }
    }
}

impl<T> IndexMut<ShaderStageKind> for Stages<T> {
    fn index_mut(&mut self, kind: ShaderStageKind) -> &mut Option<T> {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Geometry => &mut self.geometry,
            ShaderStageKind::Fragment => &mut self.fragment,
        }
    }
}
