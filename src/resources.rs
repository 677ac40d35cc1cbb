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

//! Driver objects that clean up after themselves.

use crate::context::ShaderContext;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Step};
use crate::error::Error;
use crate::ShaderStageKind;

use std::mem;

macro_rules! define_object_guards {
    ($($name:ident($res:ident, $delete:ident, $label:literal)),* $(,)?) => {
        $(
            pub(crate) struct $name<'a, C: ShaderContext + ?Sized> {
                context: &'a C,
                raw: C::$res,
            }

            impl<'a, C: ShaderContext + ?Sized> $name<'a, C> {
                pub(crate) fn raw(&self) -> C::$res {
                    self.raw
                }
            }

            impl<C: ShaderContext + ?Sized> Drop for $name<'_, C> {
                fn drop(&mut self) {
                    tracing::trace!(object = $label, raw = ?self.raw, "deleting driver object");
                    self.context.$delete(self.raw);
                }
            }
        )*
    };
}

define_object_guards! {
    StageObject(Shader, delete_shader, "shader"),
    ProgramObject(Program, delete_program, "program"),
}

impl<'a, C: ShaderContext + ?Sized> StageObject<'a, C> {
    pub(crate) fn new<S: DiagnosticSink + ?Sized>(
        context: &'a C,
        sink: &S,
        kind: ShaderStageKind,
    ) -> Result<Self, Error> {
        let raw = context.create_shader(kind).map_err(|err| {
            sink.report(
                &Diagnostic::failure(
                    Step::Driver,
                    format!("Error: couldn't create shader object: {}", err),
                )
                .with_stage(kind),
            );
            Error::driver(err)
        })?;

        Ok(Self { context, raw })
    }
}

impl<'a, C: ShaderContext + ?Sized> ProgramObject<'a, C> {
    pub(crate) fn new<S: DiagnosticSink + ?Sized>(context: &'a C, sink: &S) -> Result<Self, Error> {
        let raw = context.create_program().map_err(|err| {
            sink.report(&Diagnostic::failure(
                Step::Driver,
                format!("Error: couldn't create program object: {}", err),
            ));
            Error::driver(err)
        })?;

        Ok(Self { context, raw })
    }

    /// Stop managing the program and hand it to the caller.
    pub(crate) fn into_raw(self) -> C::Program {
        let raw = self.raw;
        mem::forget(self);
        raw
    }
}

/// Runs a closure when dropped.
pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
