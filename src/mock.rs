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

//! A fake driver for unit tests.
//!
//! Shaders fail to compile if their source contains an `#error` directive. Linking fails if no
//! stage is attached, if an attached stage didn't compile, or if a failure was scripted with
//! [`MockContext::fail_link`]. Misuse of handles is recorded on the error queue, the same way a
//! real driver would.

use crate::context::{DriverError, PolygonMode, ShaderContext, StatusCheck};
use crate::ShaderStageKind;

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
pub(crate) struct MockError(&'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for MockError {}

struct MockShader {
    kind: ShaderStageKind,
    source: Option<String>,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    linked_stages: Option<usize>,
    validated: Option<bool>,
    log: String,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: BTreeMap<u32, MockShader>,
    programs: BTreeMap<u32, MockProgram>,
    shaders_created: usize,
    programs_created: usize,
    links: usize,
    submitted: Vec<(ShaderStageKind, usize)>,
    errors: VecDeque<DriverError>,
    polygon_mode: PolygonMode,
    fail_shader_creation: bool,
    link_failure: Option<String>,
    validate_failure: Option<String>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct MockContext {
    state: RefCell<State>,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create and compile a shader in one go.
    pub(crate) fn compiled_shader(&self, kind: ShaderStageKind, source: &str) -> u32 {
        let shader = self.create_shader(kind).unwrap();
        self.shader_source(shader, source);
        self.compile_shader(shader);
        shader
    }

    pub(crate) fn fail_shader_creation(&self) {
        self.state.borrow_mut().fail_shader_creation = true;
    }

    pub(crate) fn fail_link(&self, log: &str) {
        self.state.borrow_mut().link_failure = Some(log.into());
    }

    pub(crate) fn fail_validation(&self, log: &str) {
        self.state.borrow_mut().validate_failure = Some(log.into());
    }

    pub(crate) fn push_error(&self, error: DriverError) {
        self.state.borrow_mut().errors.push_back(error);
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn is_live_program(&self, program: u32) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub(crate) fn shaders_created(&self) -> usize {
        self.state.borrow().shaders_created
    }

    pub(crate) fn programs_created(&self) -> usize {
        self.state.borrow().programs_created
    }

    pub(crate) fn links(&self) -> usize {
        self.state.borrow().links
    }

    pub(crate) fn pending_errors(&self) -> usize {
        self.state.borrow().errors.len()
    }

    pub(crate) fn polygon_mode(&self) -> PolygonMode {
        self.state.borrow().polygon_mode
    }

    pub(crate) fn attached(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// How many stages the program was linked with, if it was linked successfully.
    pub(crate) fn linked_stage_count(&self, program: u32) -> Option<usize> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.linked_stages)
    }

    pub(crate) fn was_validated(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.validated.is_some())
    }

    pub(crate) fn submitted_source(&self, shader: u32) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|s| s.source.clone())
    }

    /// The length of every source submitted so far, in order.
    pub(crate) fn submitted_lengths(&self) -> Vec<(ShaderStageKind, usize)> {
        self.state.borrow().submitted.clone()
    }
}

impl ShaderContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type Error = MockError;

    fn create_shader(&self, kind: ShaderStageKind) -> Result<u32, MockError> {
        let mut state = self.state.borrow_mut();
        if state.fail_shader_creation {
            return Err(MockError("out of shader objects"));
        }

        let id = state.next_id();
        state.shaders.insert(
            id,
            MockShader {
                kind,
                source: None,
                compiled: false,
                log: String::new(),
            },
        );
        state.shaders_created += 1;
        Ok(id)
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_none() {
            state.errors.push_back(DriverError::InvalidValue);
        }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        let kind = match state.shaders.get_mut(&shader) {
            Some(s) => {
                s.source = Some(source.to_owned());
                s.kind
            }
            None => return state.errors.push_back(DriverError::InvalidValue),
        };
        state.submitted.push((kind, source.len()));
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let shader = match state.shaders.get_mut(&shader) {
            Some(s) => s,
            None => return state.errors.push_back(DriverError::InvalidValue),
        };

        let source = shader.source.as_deref().unwrap_or_default();
        match source.lines().find_map(|line| line.trim().strip_prefix("#error")) {
            Some(message) => {
                shader.compiled = false;
                shader.log = format!("0:1(1): preprocessor error: {}\n", message.trim());
            }
            None => {
                shader.compiled = true;
                shader.log.clear();
            }
        }
    }

    fn shader_status(&self, shader: u32, check: StatusCheck) -> bool {
        let state = self.state.borrow();
        match (state.shaders.get(&shader), check) {
            (Some(s), StatusCheck::Compile) => s.compiled,
            _ => false,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn create_program(&self) -> Result<u32, MockError> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, MockProgram::default());
        state.programs_created += 1;
        Ok(id)
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_none() {
            state.errors.push_back(DriverError::InvalidValue);
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            return state.errors.push_back(DriverError::InvalidValue);
        }

        let error = match state.programs.get_mut(&program) {
            Some(p) if p.attached.contains(&shader) => Some(DriverError::InvalidOperation),
            Some(p) => {
                p.attached.push(shader);
                None
            }
            None => Some(DriverError::InvalidValue),
        };
        state.errors.extend(error);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let error = match state.programs.get_mut(&program) {
            Some(p) => match p.attached.iter().position(|&s| s == shader) {
                Some(index) => {
                    p.attached.remove(index);
                    None
                }
                None => Some(DriverError::InvalidOperation),
            },
            None => Some(DriverError::InvalidValue),
        };
        state.errors.extend(error);
    }

    fn link_program(&self, program: u32) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.links += 1;

        let p = match state.programs.get_mut(&program) {
            Some(p) => p,
            None => return state.errors.push_back(DriverError::InvalidValue),
        };

        let all_compiled = p
            .attached
            .iter()
            .all(|id| state.shaders.get(id).map_or(false, |s| s.compiled));

        let failure = if p.attached.is_empty() {
            Some("error: no shaders attached to the program".to_owned())
        } else if !all_compiled {
            Some("error: linking with uncompiled shader".to_owned())
        } else {
            state.link_failure.clone()
        };

        match failure {
            Some(log) => {
                p.linked = false;
                p.linked_stages = None;
                p.log = log;
            }
            None => {
                p.linked = true;
                p.linked_stages = Some(p.attached.len());
                p.log.clear();
            }
        }
    }

    fn validate_program(&self, program: u32) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let p = match state.programs.get_mut(&program) {
            Some(p) => p,
            None => return state.errors.push_back(DriverError::InvalidValue),
        };

        match (&state.validate_failure, p.linked) {
            (None, true) => p.validated = Some(true),
            (Some(log), _) => {
                p.validated = Some(false);
                p.log = log.clone();
            }
            (None, false) => {
                p.validated = Some(false);
                p.log = "error: program is not linked".to_owned();
            }
        }
    }

    fn program_status(&self, program: u32, check: StatusCheck) -> bool {
        let state = self.state.borrow();
        match (state.programs.get(&program), check) {
            (Some(p), StatusCheck::Link) => p.linked,
            (Some(p), StatusCheck::Validate) => p.validated == Some(true),
            _ => false,
        }
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        self.state.borrow_mut().polygon_mode = mode;
    }

    fn take_error(&self) -> Option<DriverError> {
        self.state.borrow_mut().errors.pop_front()
    }
}
