// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shaderlink-glow`.
//
// `shaderlink-glow` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shaderlink-glow` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shaderlink-glow`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! A [`shaderlink`] backend that uses the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;
use shaderlink::{DriverError, PolygonMode, ShaderContext, ShaderStageKind, StatusCheck};

use std::fmt;

/// A wrapper around a [`glow`] context.
pub struct GlowContext<H: HasContext + ?Sized> {
    /// Whether this is an OpenGL ES context.
    is_embedded: bool,

    /// The `#version` line that fits this context.
    version_header: &'static str,

    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("is_embedded", &self.is_embedded)
            .field("version_header", &self.version_header)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext> GlowContext<H> {
    /// Create a new [`GlowContext`] from a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and the context must be current
    /// whenever a method of [`ShaderContext`] is called on this type.
    pub unsafe fn new(context: H) -> Result<Self, GlError> {
        let version = context.version();

        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major >= 3 && version.minor >= 3)
        };
        if !has_supported_version {
            return Err(GlError(format!(
                "OpenGL version 3.3 (or 3.0 ES) or higher is required, found {}.{}",
                version.major, version.minor
            )));
        }

        let is_embedded = version.is_embedded;
        tracing::debug!(
            major = version.major,
            minor = version.minor,
            is_embedded,
            "created glow shader context"
        );

        Ok(Self {
            is_embedded,
            version_header: version_header(is_embedded),
            context,
        })
    }

    /// Get the underlying [`glow`] context back.
    pub fn into_inner(self) -> H {
        self.context
    }
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }

    /// Whether this is an OpenGL ES context.
    pub fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// The `#version` line that shaders for this context should start with.
    ///
    /// Pass this to [`shaderlink::Options::with_version_header`] to have it prepended to
    /// sources that don't declare a version.
    pub fn version_header(&self) -> &'static str {
        self.version_header
    }
}

impl<H: HasContext + ?Sized> ShaderContext for GlowContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Error = GlError;

    fn create_shader(&self, kind: ShaderStageKind) -> Result<H::Shader, GlError> {
        unsafe { self.context.create_shader(stage_type(kind)).gl_err() }
    }

    fn delete_shader(&self, shader: H::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn shader_source(&self, shader: H::Shader, source: &str) {
        unsafe { self.context.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: H::Shader) {
        unsafe { self.context.compile_shader(shader) }
    }

    fn shader_status(&self, shader: H::Shader, check: StatusCheck) -> bool {
        match check {
            StatusCheck::Compile => unsafe { self.context.get_shader_compile_status(shader) },
            StatusCheck::Link | StatusCheck::Validate => false,
        }
    }

    fn shader_info_log(&self, shader: H::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn create_program(&self) -> Result<H::Program, GlError> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn delete_program(&self, program: H::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn attach_shader(&self, program: H::Program, shader: H::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: H::Program, shader: H::Shader) {
        unsafe { self.context.detach_shader(program, shader) }
    }

    fn link_program(&self, program: H::Program) {
        unsafe { self.context.link_program(program) }
    }

    fn validate_program(&self, program: H::Program) {
        unsafe { self.context.validate_program(program) }
    }

    fn program_status(&self, program: H::Program, check: StatusCheck) -> bool {
        unsafe {
            match check {
                StatusCheck::Link => self.context.get_program_link_status(program),
                StatusCheck::Validate => self.context.get_program_validate_status(program),
                StatusCheck::Compile => false,
            }
        }
    }

    fn program_info_log(&self, program: H::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        // OpenGL ES has no glPolygonMode.
        if self.is_embedded {
            tracing::warn!(?mode, "polygon modes are not supported on OpenGL ES");
            return;
        }

        let mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
        };
        unsafe { self.context.polygon_mode(glow::FRONT_AND_BACK, mode) }
    }

    fn take_error(&self) -> Option<DriverError> {
        driver_error(unsafe { self.context.get_error() })
    }
}

/// The error type for failing to create GL objects.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

fn version_header(is_embedded: bool) -> &'static str {
    if is_embedded {
        "#version 300 es"
    } else {
        "#version 330 core"
    }
}

fn stage_type(kind: ShaderStageKind) -> u32 {
    match kind {
        ShaderStageKind::Vertex => glow::VERTEX_SHADER,
        ShaderStageKind::Geometry => glow::GEOMETRY_SHADER,
        ShaderStageKind::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn driver_error(code: u32) -> Option<DriverError> {
    let err = match code {
        glow::NO_ERROR => return None,
        glow::INVALID_ENUM => DriverError::InvalidEnum,
        glow::INVALID_VALUE => DriverError::InvalidValue,
        glow::INVALID_OPERATION => DriverError::InvalidOperation,
        glow::STACK_OVERFLOW => DriverError::StackOverflow,
        glow::STACK_UNDERFLOW => DriverError::StackUnderflow,
        glow::OUT_OF_MEMORY => DriverError::OutOfMemory,
        glow::INVALID_FRAMEBUFFER_OPERATION => DriverError::InvalidFramebufferOperation,
        glow::CONTEXT_LOST => DriverError::ContextLost,
        code => DriverError::Unknown(code),
    };

    Some(err)
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}
