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

//! Driver diagnostics and where they end up.

use crate::context::{ShaderContext, StatusCheck};
use crate::ShaderStageKind;

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The step of the pipeline that produced a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Checking that every required stage was provided.
    Inputs,

    /// Reading source text from storage.
    Load,

    /// Compiling a single stage.
    Compile,

    /// Linking stages into a program.
    Link,

    /// Validating a linked program.
    Validate,

    /// Creating driver objects or polling the driver's error queue.
    Driver,
}

/// The outcome of one compile, link or validate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    passed: bool,
    step: Step,
    stage: Option<ShaderStageKind>,
    label: Cow<'static, str>,
    log: Option<String>,
}

impl Diagnostic {
    /// A step that succeeded.
    pub fn success(step: Step, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            passed: true,
            step,
            stage: None,
            label: label.into(),
            log: None,
        }
    }

    /// A step that failed.
    pub fn failure(step: Step, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            passed: false,
            ..Self::success(step, label)
        }
    }

    /// Attribute this diagnostic to a stage.
    pub fn with_stage(mut self, stage: impl Into<Option<ShaderStageKind>>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Attach a driver log.
    pub fn with_log(mut self, log: impl Into<Option<String>>) -> Self {
        self.log = log.into();
        self
    }

    /// Whether the step succeeded.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// The step that produced this diagnostic.
    pub fn step(&self) -> Step {
        self.step
    }

    /// The stage this diagnostic is about, if any.
    pub fn stage(&self) -> Option<ShaderStageKind> {
        self.stage
    }

    /// A short description of what happened.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The driver log, if there was one.
    pub fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    /// Take the driver log out of this diagnostic.
    pub fn into_log(self) -> Option<String> {
        self.log
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)?;

        if let Some(log) = &self.log {
            write!(f, "\n{}", log)?;
        }

        Ok(())
    }
}

/// Somewhere to send human-readable diagnostics.
pub trait DiagnosticSink {
    /// Report a diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<S> {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Emits diagnostics as `tracing` events.
///
/// This is the default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.stage() {
            Some(stage) => tracing::error!(
                step = ?diagnostic.step(),
                %stage,
                "{}",
                diagnostic
            ),
            None => tracing::error!(step = ?diagnostic.step(), "{}", diagnostic),
        }
    }
}

/// Writes diagnostics to the standard error stream, one label line followed by the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, diagnostic: &Diagnostic) {
        eprintln!("{}", diagnostic);
    }
}

/// Keeps diagnostics in memory so they can be shown later, e.g. in a shader editor.
#[derive(Debug, Default)]
pub struct CollectSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of diagnostics collected so far.
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the most recent diagnostic.
    pub fn last(&self) -> Option<Diagnostic> {
        self.diagnostics.borrow().last().cloned()
    }

    /// Take every diagnostic collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic.clone());
    }
}

/// The object a status check is made against.
pub enum Query<C: ShaderContext + ?Sized> {
    /// A shader stage.
    Shader(C::Shader),

    /// A program.
    Program(C::Program),
}

impl<C: ShaderContext + ?Sized> Clone for Query<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ShaderContext + ?Sized> Copy for Query<C> {}

impl<C: ShaderContext + ?Sized> fmt::Debug for Query<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Shader(shader) => f.debug_tuple("Shader").field(shader).finish(),
            Query::Program(program) => f.debug_tuple("Program").field(program).finish(),
        }
    }
}

impl<C: ShaderContext + ?Sized> Query<C> {
    /// Ask the driver for a status flag.
    pub fn status(self, context: &C, check: StatusCheck) -> bool {
        match self {
            Query::Shader(shader) => context.shader_status(shader, check),
            Query::Program(program) => context.program_status(program, check),
        }
    }

    /// Ask the driver for the info log.
    pub fn info_log(self, context: &C) -> String {
        match self {
            Query::Shader(shader) => context.shader_info_log(shader),
            Query::Program(program) => context.program_info_log(program),
        }
    }
}

/// Checks the outcome of driver steps and reports failures.
pub struct Reporter<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> {
    context: &'a C,
    sink: &'a S,
    log_limit: usize,
}

impl<'a, C: ShaderContext + ?Sized, S: DiagnosticSink + ?Sized> Reporter<'a, C, S> {
    /// Create a new reporter.
    ///
    /// Logs longer than `log_limit` bytes are cut short.
    pub fn new(context: &'a C, sink: &'a S, log_limit: usize) -> Self {
        Self {
            context,
            sink,
            log_limit: log_limit.max(1),
        }
    }

    /// Check a status flag.
    ///
    /// If the flag is unset, the info log is fetched. If that log has anything in it, the label
    /// and the log are sent to the sink. The returned diagnostic carries the status either way.
    pub fn check(
        &self,
        query: Query<C>,
        check: StatusCheck,
        label: &'static str,
        stage: Option<ShaderStageKind>,
    ) -> Diagnostic {
        let step = match check {
            StatusCheck::Compile => Step::Compile,
            StatusCheck::Link => Step::Link,
            StatusCheck::Validate => Step::Validate,
        };

        if query.status(self.context, check) {
            return Diagnostic::success(step, label).with_stage(stage);
        }

        let log = truncate_log(query.info_log(self.context), self.log_limit);
        let diagnostic = Diagnostic::failure(step, label)
            .with_stage(stage)
            .with_log(log);

        if diagnostic.log().is_some() {
            self.sink.report(&diagnostic);
        } else {
            tracing::debug!(?query, ?check, "status check failed without a log");
        }

        diagnostic
    }
}

/// Cut a log down to `limit` bytes, dropping trailing NULs and whitespace.
///
/// Returns `None` if nothing is left.
fn truncate_log(mut log: String, limit: usize) -> Option<String> {
    if log.len() > limit {
        let mut end = limit;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }

    let trimmed = log.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.trim_start().is_empty() {
        return None;
    }

    let len = trimmed.len();
    log.truncate(len);
    Some(log)
}
