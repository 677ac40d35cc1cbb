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

//! The full pipeline, from sources to a linked program.

use crate::context::ShaderContext;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Step, TracingSink};
use crate::error::Error;
use crate::link::ProgramLinker;
use crate::options::Options;
use crate::resources::{CallOnDrop, ProgramObject, StageObject};
use crate::source::{SourceBuffer, SourceLoader};
use crate::stage::{empty_source, invalid_encoding, StageCompiler};
use crate::{ShaderStageKind, Stages};

use std::fmt;
use std::path::Path;

/// Builds shader programs.
///
/// This holds no state between calls: compiling the same sources twice gives two independent
/// programs.
pub struct ShaderCompiler<'a, C: ShaderContext + ?Sized, S = TracingSink> {
    /// The driver context.
    context: &'a C,

    /// Pipeline configuration.
    options: Options,

    /// Where failures are reported.
    sink: S,
}

impl<C: ShaderContext + ?Sized, S: fmt::Debug> fmt::Debug for ShaderCompiler<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderCompiler")
            .field("options", &self.options)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl<'a, C: ShaderContext + ?Sized> ShaderCompiler<'a, C> {
    /// Create a compiler with the default options that reports through `tracing`.
    pub fn new(context: &'a C) -> Self {
        Self {
            context,
            options: Options::default(),
            sink: TracingSink,
        }
    }
}

impl<'a, C: ShaderContext + ?Sized, S: DiagnosticSink> ShaderCompiler<'a, C, S> {
    /// Report failures to `sink` instead.
    pub fn with_sink<T: DiagnosticSink>(self, sink: T) -> ShaderCompiler<'a, C, T> {
        ShaderCompiler {
            context: self.context,
            options: self.options,
            sink,
        }
    }

    /// Use different options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// The driver context.
    pub fn context(&self) -> &'a C {
        self.context
    }

    /// The pipeline configuration.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The diagnostic sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A loader that reports to this compiler's sink.
    pub fn loader(&self) -> SourceLoader<'_, S> {
        SourceLoader::new(&self.sink)
    }

    /// A stage compiler that shares this compiler's configuration.
    pub fn stage_compiler(&self) -> StageCompiler<'_, C, S> {
        StageCompiler::new(self.context, &self.sink, &self.options)
    }

    /// A program linker that shares this compiler's configuration.
    pub fn linker(&self) -> ProgramLinker<'_, C, S> {
        ProgramLinker::new(self.context, &self.sink, self.options.info_log_limit())
    }

    /// Compile and link a program from source strings.
    ///
    /// Every present source is compiled into a stage of its kind. The first stage that fails to
    /// compile aborts the whole pipeline, and so does a failure to link or validate. On success
    /// the intermediate stage objects are deleted and the program is handed to the caller, who
    /// becomes responsible for deleting it. On failure, nothing created here outlives the call.
    pub fn compile_from_source(&self, sources: Stages<&str>) -> Result<C::Program, Error> {
        self.check_requirements(&sources)?;

        let program = ProgramObject::new(self.context, &self.sink)?;
        let compiler = self.stage_compiler();

        let mut stages: Stages<StageObject<'_, C>> = Stages::default();
        for (kind, &source) in sources.iter() {
            let stage = StageObject::new(self.context, &self.sink, kind)?;
            compiler.compile(kind, stage.raw(), source)?;
            stages[kind] = Some(stage);
        }

        let shaders = stages.as_ref().map(|_, stage| stage.raw());
        let raw_program = program.raw();

        // Dropped before `stages`, so every stage is detached before it is deleted.
        let context = self.context;
        let _detach = CallOnDrop(|| {
            for (_, &shader) in shaders.iter() {
                context.detach_shader(raw_program, shader);
            }
        });

        self.linker().link(raw_program, &shaders)?;

        tracing::debug!(
            program = ?raw_program,
            stages = shaders.len(),
            "built shader program"
        );
        Ok(program.into_raw())
    }

    /// Load sources from files, then compile and link them into a program.
    ///
    /// A file that can't be loaded for an optional stage only leaves that stage out; for a
    /// required stage it aborts the pipeline. A file that loads but is empty always aborts it.
    pub fn compile_from_files<P: AsRef<Path>>(
        &self,
        paths: Stages<P>,
    ) -> Result<C::Program, Error> {
        let loader = self.loader();

        let mut buffers: Stages<(&Path, SourceBuffer)> = Stages::default();
        for (kind, path) in paths.iter() {
            let path = path.as_ref();
            match loader.load(path) {
                Ok(buffer) => buffers[kind] = Some((path, buffer)),
                Err(err) => self.leave_out(kind, err)?,
            }
        }

        let mut sources: Stages<&str> = Stages::default();
        for (kind, (path, buffer)) in buffers.iter() {
            if buffer.is_empty() {
                return Err(empty_source(&self.sink, kind, Some(*path)));
            }

            match buffer.as_str() {
                Ok(text) => sources[kind] = Some(text),
                Err(err) => {
                    let err = invalid_encoding(&self.sink, kind, Some(*path), err);
                    self.leave_out(kind, err)?;
                }
            }
        }

        self.compile_from_source(sources)
    }

    fn check_requirements<T>(&self, stages: &Stages<T>) -> Result<(), Error> {
        let requirements = self.options.requirements();

        for kind in ShaderStageKind::ALL {
            if requirements.is_required(kind) && stages[kind].is_none() {
                self.sink.report(
                    &Diagnostic::failure(
                        Step::Inputs,
                        format!("Error: missing required {} shader stage", kind),
                    )
                    .with_stage(kind),
                );
                return Err(Error::MissingStage(kind));
            }
        }

        Ok(())
    }

    /// Drop an optional stage that failed to load, or propagate the failure for a required one.
    fn leave_out(&self, kind: ShaderStageKind, err: Error) -> Result<(), Error> {
        if self.options.requirements().is_required(kind) {
            return Err(err);
        }

        tracing::debug!(stage = %kind, %err, "leaving out optional stage");
        Ok(())
    }
}
