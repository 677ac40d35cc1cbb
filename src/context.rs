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

//! Defines the driver backend for shaderlink.

use crate::ShaderStageKind;

use std::error::Error;
use std::fmt;

/// The backend for the shader pipeline.
///
/// This is an explicit stand-in for the "current context" of the graphics driver. Every method
/// assumes that the context is current on the calling thread.
pub trait ShaderContext {
    /// A handle to one compiled (or compiling) shader stage.
    type Shader: Copy + fmt::Debug;

    /// A handle to a program object.
    type Program: Copy + fmt::Debug;

    /// The error type for failing to create driver objects.
    type Error: Error + 'static;

    /// Create a new, empty shader stage object.
    fn create_shader(&self, kind: ShaderStageKind) -> Result<Self::Shader, Self::Error>;

    /// Delete a shader stage object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Replace the source code of a shader stage.
    fn shader_source(&self, shader: Self::Shader, source: &str);

    /// Compile a shader stage.
    fn compile_shader(&self, shader: Self::Shader);

    /// Query a status flag of a shader stage.
    fn shader_status(&self, shader: Self::Shader, check: StatusCheck) -> bool;

    /// Get the info log of a shader stage.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Create a new, empty program object.
    fn create_program(&self) -> Result<Self::Program, Self::Error>;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Attach a shader stage to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a shader stage from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Validate a program against the current driver state.
    fn validate_program(&self, program: Self::Program);

    /// Query a status flag of a program.
    fn program_status(&self, program: Self::Program, check: StatusCheck) -> bool;

    /// Get the info log of a program.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Set the rasterization mode for front and back faces.
    fn set_polygon_mode(&self, mode: PolygonMode);

    /// Pop the oldest error off the driver's error queue.
    fn take_error(&self) -> Option<DriverError>;
}

/// A status flag that the driver keeps for shaders and programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCheck {
    /// Whether the last compile of a shader stage succeeded.
    Compile,

    /// Whether the last link of a program succeeded.
    Link,

    /// Whether the last validation of a program succeeded.
    Validate,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Fill the interior.
    #[default]
    Fill,

    /// Only draw the edges.
    Line,
}

/// An error reported through the driver's error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverError {
    /// An enum argument was out of range.
    InvalidEnum,

    /// A numeric argument was out of range, or a handle didn't name an object.
    InvalidValue,

    /// The operation isn't allowed in the current state.
    InvalidOperation,

    /// A stack push would overflow.
    StackOverflow,

    /// A stack pop would underflow.
    StackUnderflow,

    /// The driver ran out of memory.
    OutOfMemory,

    /// The bound framebuffer is not complete.
    InvalidFramebufferOperation,

    /// The context was lost, e.g. after a graphics card reset.
    ContextLost,

    /// An error code this crate doesn't know about.
    Unknown(u32),
}

impl DriverError {
    /// The name the driver documentation uses for this error.
    pub fn name(self) -> &'static str {
        match self {
            DriverError::InvalidEnum => "GL_INVALID_ENUM",
            DriverError::InvalidValue => "GL_INVALID_VALUE",
            DriverError::InvalidOperation => "GL_INVALID_OPERATION",
            DriverError::StackOverflow => "GL_STACK_OVERFLOW",
            DriverError::StackUnderflow => "GL_STACK_UNDERFLOW",
            DriverError::OutOfMemory => "GL_OUT_OF_MEMORY",
            DriverError::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            DriverError::ContextLost => "GL_CONTEXT_LOST",
            DriverError::Unknown(_) => "Unknown GL error",
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Unknown(code) => write!(f, "{} ({:#06x})", self.name(), code),
            _ => f.write_str(self.name()),
        }
    }
}

impl Error for DriverError {}
