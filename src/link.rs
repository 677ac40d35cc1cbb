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

//! Linking compiled stages into a program.

use crate::context::{ShaderContext, StatusCheck};
use crate::diagnostics::{DiagnosticSink, Query, Reporter};
use crate::error::Error;
use crate::Stages;

const LINK_LABEL: &str = "Error: Couldn't link program";
const VALIDATE_LABEL: &str = "Error: Program is invalid";

/// Attaches stages to a program, links it and validates it.
pub struct ProgramLinker<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> {
    reporter: Reporter<'a, C, S>,
    context: &'a C,
}

impl<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> ProgramLinker<'a, C, S> {
    /// Create a new linker.
    pub fn new(context: &'a C, sink: &'a S, log_limit: usize) -> Self {
        Self {
            reporter: Reporter::new(context, sink, log_limit),
            context,
        }
    }

    /// Attach every present stage to `program`, then link and validate it.
    ///
    /// Validation is skipped if linking fails. The stages are neither detached nor deleted.
    pub fn link(&self, program: C::Program, stages: &Stages<C::Shader>) -> Result<(), Error> {
        for (kind, &shader) in stages.iter() {
            self.context.attach_shader(program, shader);
            tracing::trace!(stage = %kind, ?shader, ?program, "attached shader stage");
        }

        self.context.link_program(program);
        let linked = self
            .reporter
            .check(Query::Program(program), StatusCheck::Link, LINK_LABEL, None);
        if !linked.passed() {
            return Err(Error::ProgramLink {
                log: linked.into_log(),
            });
        }

        self.context.validate_program(program);
        let validated = self.reporter.check(
            Query::Program(program),
            StatusCheck::Validate,
            VALIDATE_LABEL,
            None,
        );
        if !validated.passed() {
            return Err(Error::ProgramValidate {
                log: validated.into_log(),
            });
        }

        tracing::debug!(?program, stages = stages.len(), "linked shader program");
        Ok(())
    }
}
