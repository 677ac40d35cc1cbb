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

//! Compiling single shader stages.

use crate::context::{ShaderContext, StatusCheck};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Query, Reporter, Step};
use crate::error::Error;
use crate::options::Options;
use crate::source::SourceLoader;
use crate::ShaderStageKind;

use std::borrow::Cow;
use std::path::Path;
use std::str::Utf8Error;

const COMPILE_LABEL: &str = "Error: couldn't compile shader";

/// Compiles source text into shader stage objects.
pub struct StageCompiler<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> {
    context: &'a C,
    sink: &'a S,
    options: &'a Options,
}

impl<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> StageCompiler<'a, C, S> {
    /// Create a new stage compiler.
    pub fn new(context: &'a C, sink: &'a S, options: &'a Options) -> Self {
        Self {
            context,
            sink,
            options,
        }
    }

    /// Compile `source` into the stage object `shader`.
    ///
    /// The source is submitted as the whole content of the stage. The shader object is left
    /// alone on failure; deleting it is up to the caller.
    pub fn compile(
        &self,
        kind: ShaderStageKind,
        shader: C::Shader,
        source: &str,
    ) -> Result<(), Error> {
        if source.is_empty() {
            return Err(empty_source(self.sink, kind, None));
        }

        let source = with_header(self.options.version_header(), source);
        self.context.shader_source(shader, &source);
        self.context.compile_shader(shader);

        let diagnostic = Reporter::new(self.context, self.sink, self.options.info_log_limit())
            .check(
                Query::Shader(shader),
                StatusCheck::Compile,
                COMPILE_LABEL,
                Some(kind),
            );

        if !diagnostic.passed() {
            return Err(Error::StageCompile {
                stage: kind,
                log: diagnostic.into_log(),
            });
        }

        tracing::trace!(stage = %kind, ?shader, len = source.len(), "compiled shader stage");
        Ok(())
    }

    /// Load `path` and compile it into the stage object `shader`.
    ///
    /// Fails without touching the driver if the file can't be loaded, isn't UTF-8 or is empty.
    pub fn compile_from_file(
        &self,
        kind: ShaderStageKind,
        shader: C::Shader,
        path: impl AsRef<Path>,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        let buffer = SourceLoader::new(self.sink).load(path)?;

        if buffer.is_empty() {
            return Err(empty_source(self.sink, kind, Some(path)));
        }

        let source = buffer
            .as_str()
            .map_err(|err| invalid_encoding(self.sink, kind, Some(path), err))?;

        self.compile(kind, shader, source)
    }
}

/// Put `header` in front of `source`, unless the source brings its own `#version`.
fn with_header<'s>(header: Option<&str>, source: &'s str) -> Cow<'s, str> {
    match header {
        Some(header) if !source.trim_start().starts_with("#version") => {
            Cow::Owned(format!("{}\n{}", header, source))
        }
        _ => Cow::Borrowed(source),
    }
}

pub(crate) fn empty_source<S: DiagnosticSink + ?Sized>(
    sink: &S,
    stage: ShaderStageKind,
    path: Option<&Path>,
) -> Error {
    sink.report(&Diagnostic::failure(Step::Load, "Invalid batch").with_stage(stage));

    Error::EmptySource {
        stage,
        path: path.map(Into::into),
    }
}

pub(crate) fn invalid_encoding<S: DiagnosticSink + ?Sized>(
    sink: &S,
    stage: ShaderStageKind,
    path: Option<&Path>,
    source: Utf8Error,
) -> Error {
    let label = match path {
        Some(path) => format!("Error: {} is not valid UTF-8: {}", path.display(), source),
        None => format!("Error: shader source is not valid UTF-8: {}", source),
    };
    sink.report(&Diagnostic::failure(Step::Load, label).with_stage(stage));

    Error::InvalidEncoding {
        stage,
        path: path.map(Into::into),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectSink;
    use crate::error::ErrorKind;
    use crate::mock::MockContext;

    use std::io::Write;

    const VERTEX: &str = "void main() { gl_Position = vec4(0.0); }";

    #[test]
    fn compiles_valid_source() {
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Vertex).unwrap();

        StageCompiler::new(&context, &sink, &options)
            .compile(ShaderStageKind::Vertex, shader, VERTEX)
            .unwrap();

        assert_eq!(context.submitted_source(shader).as_deref(), Some(VERTEX));
        assert!(sink.is_empty());
    }

    #[test]
    fn compile_failure_reports_once_and_keeps_the_shader() {
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Fragment).unwrap();

        let err = StageCompiler::new(&context, &sink, &options)
            .compile(ShaderStageKind::Fragment, shader, "#error missing semicolon")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StageCompile);
        assert_eq!(err.stage(), Some(ShaderStageKind::Fragment));
        assert!(err.log().unwrap().contains("missing semicolon"));

        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].label(), COMPILE_LABEL);
        assert_eq!(diagnostics[0].stage(), Some(ShaderStageKind::Fragment));

        assert_eq!(context.live_shaders(), 1);
    }

    #[test]
    fn empty_source_never_reaches_the_driver() {
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Vertex).unwrap();

        let err = StageCompiler::new(&context, &sink, &options)
            .compile(ShaderStageKind::Vertex, shader, "")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptySource);
        assert_eq!(context.submitted_source(shader), None);
        assert_eq!(sink.last().unwrap().label(), "Invalid batch");
    }

    #[test]
    fn empty_file_fails_with_empty_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Vertex).unwrap();

        let err = StageCompiler::new(&context, &sink, &options)
            .compile_from_file(ShaderStageKind::Vertex, shader, file.path())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptySource);
        assert_eq!(err.path(), Some(file.path()));
        assert_eq!(context.submitted_source(shader), None);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn file_contents_are_submitted_in_full() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let source = format!("{}\n// {}\n", VERTEX, "x".repeat(4096));
        file.write_all(source.as_bytes()).unwrap();

        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Vertex).unwrap();

        StageCompiler::new(&context, &sink, &options)
            .compile_from_file(ShaderStageKind::Vertex, shader, file.path())
            .unwrap();

        assert_eq!(
            context.submitted_source(shader).map(|s| s.len()),
            Some(source.len())
        );
    }

    #[test]
    fn missing_file_fails_before_the_driver() {
        let dir = tempfile::tempdir().unwrap();
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::default();
        let shader = context.create_shader(ShaderStageKind::Geometry).unwrap();

        let err = StageCompiler::new(&context, &sink, &options)
            .compile_from_file(ShaderStageKind::Geometry, shader, dir.path().join("nope.geom"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(context.submitted_source(shader), None);
    }

    #[test]
    fn version_header_is_prepended_once() {
        let context = MockContext::new();
        let sink = CollectSink::new();
        let options = Options::new().with_version_header("#version 330 core");
        let compiler = StageCompiler::new(&context, &sink, &options);

        let plain = context.create_shader(ShaderStageKind::Vertex).unwrap();
        compiler
            .compile(ShaderStageKind::Vertex, plain, VERTEX)
            .unwrap();
        assert_eq!(
            context.submitted_source(plain),
            Some(format!("#version 330 core\n{}", VERTEX))
        );

        let versioned = context.create_shader(ShaderStageKind::Vertex).unwrap();
        let source = format!("#version 300 es\n{}", VERTEX);
        compiler
            .compile(ShaderStageKind::Vertex, versioned, &source)
            .unwrap();
        assert_eq!(context.submitted_source(versioned), Some(source));
    }
}
