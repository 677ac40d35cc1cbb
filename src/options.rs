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

//! Pipeline configuration.

use crate::ShaderStageKind;

/// The default upper bound on the length of a driver info log, in bytes.
pub const DEFAULT_INFO_LOG_LIMIT: usize = 1024;

/// Whether a pipeline needs a given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// The program can't be built without this stage.
    Required,

    /// The stage may be left out.
    Optional,
}

/// Which stages a pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageRequirements {
    vertex: Requirement,
    geometry: Requirement,
    fragment: Requirement,
}

impl Default for StageRequirements {
    /// Vertex and fragment stages are required, the geometry stage is optional.
    fn default() -> Self {
        Self {
            vertex: Requirement::Required,
            geometry: Requirement::Optional,
            fragment: Requirement::Required,
        }
    }
}

impl StageRequirements {
    /// Every stage is optional.
    ///
    /// Stages that fail to load are dropped and the driver decides at link time whether what is
    /// left makes a usable program.
    pub fn legacy() -> Self {
        Self {
            vertex: Requirement::Optional,
            geometry: Requirement::Optional,
            fragment: Requirement::Optional,
        }
    }

    /// Every stage is required.
    pub fn all_required() -> Self {
        Self {
            vertex: Requirement::Required,
            geometry: Requirement::Required,
            fragment: Requirement::Required,
        }
    }

    /// Change the requirement for one stage.
    pub fn with(mut self, kind: ShaderStageKind, requirement: Requirement) -> Self {
        *self.slot(kind) = requirement;
        self
    }

    /// Get the requirement for a stage.
    pub fn get(&self, kind: ShaderStageKind) -> Requirement {
        match kind {
            ShaderStageKind::Vertex => self.vertex,
            ShaderStageKind::Geometry => self.geometry,
            ShaderStageKind::Fragment => self.fragment,
        }
    }

    /// Whether a stage is required.
    pub fn is_required(&self, kind: ShaderStageKind) -> bool {
        self.get(kind) == Requirement::Required
    }

    fn slot(&mut self, kind: ShaderStageKind) -> &mut Requirement {
        match kind {
            ShaderStageKind::Vertex => &mut self.vertex,
            ShaderStageKind::Geometry => &mut self.geometry,
            ShaderStageKind::Fragment => &mut self.fragment,
        }
    }
}

/// Options for a [`ShaderCompiler`](crate::ShaderCompiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// The longest info log that is kept, in bytes.
    info_log_limit: usize,

    /// Which stages must be present.
    requirements: StageRequirements,

    /// A `#version` line to put in front of every stage.
    version_header: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            info_log_limit: DEFAULT_INFO_LOG_LIMIT,
            requirements: StageRequirements::default(),
            version_header: None,
        }
    }
}

impl Options {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the longest info log that is kept, in bytes.
    ///
    /// Longer logs are cut at the last character boundary that fits. The limit is never less
    /// than one byte.
    pub fn with_info_log_limit(mut self, limit: usize) -> Self {
        self.info_log_limit = limit.max(1);
        self
    }

    /// Set which stages must be present.
    pub fn with_requirements(mut self, requirements: StageRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Put a header line, usually `#version ...`, in front of every stage source.
    ///
    /// Sources that already start with a `#version` directive are left alone.
    pub fn with_version_header(mut self, header: impl Into<String>) -> Self {
        self.version_header = Some(header.into());
        self
    }

    /// The longest info log that is kept, in bytes.
    pub fn info_log_limit(&self) -> usize {
        self.info_log_limit
    }

    /// Which stages must be present.
    pub fn requirements(&self) -> &StageRequirements {
        &self.requirements
    }

    /// The header put in front of every stage source.
    pub fn version_header(&self) -> Option<&str> {
        self.version_header.as_deref()
    }
}
