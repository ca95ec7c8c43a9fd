// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gles-triangle`.
//
// `gles-triangle` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gles-triangle` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gles-triangle`. If not, see <https://www.gnu.org/licenses/>.

//! A [`GpuContext`] that records every call instead of talking to a driver.

use crate::gpu_backend::{AttribLayout, GpuContext, ShaderStage, Viewport};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub(crate) const POSITION_LOCATION: u32 = 0;
pub(crate) const COLOR_LOCATION: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetClearColor([f64; 4]),
    Clear,
    Viewport(Viewport),
    CreateShader(ShaderStage, u32),
    ShaderSource(u32, String),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexBuffer(u32, Vec<u8>),
    BindVertexBuffer(Option<u32>),
    DeleteVertexBuffer(u32),
    EnableVertexAttrib(u32),
    DisableVertexAttrib(u32),
    VertexAttribPointer(u32, AttribLayout),
    UniformColor(i32, [f64; 4]),
    DrawTriangles(i32, i32),
}

#[derive(Debug)]
pub(crate) struct OutOfHandles;

impl fmt::Display for OutOfHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("out of handles")
    }
}

impl std::error::Error for OutOfHandles {}

/// Source is considered malformed unless it has an entry point.
fn is_well_formed(source: &str) -> bool {
    source.contains("void main")
}

#[derive(Default)]
pub(crate) struct RecordingContext {
    calls: RefCell<Vec<Call>>,
    next_handle: Cell<u32>,
    exhausted: Cell<bool>,
    fail_link: Cell<bool>,
    sources: RefCell<HashMap<u32, String>>,
    compiled: RefCell<HashSet<u32>>,
    missing: RefCell<HashSet<String>>,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Make every following `create_*` call fail.
    pub(crate) fn exhaust(&self) {
        self.exhausted.set(true);
    }

    pub(crate) fn fail_link(&self) {
        self.fail_link.set(true);
    }

    /// Pretend the linked program has no active variable called `name`.
    pub(crate) fn hide(&self, name: &str) {
        self.missing.borrow_mut().insert(name.to_owned());
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> Result<u32, OutOfHandles> {
        if self.exhausted.get() {
            return Err(OutOfHandles);
        }

        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        Ok(handle)
    }
}

fn rgba(color: piet::Color) -> [f64; 4] {
    let (r, g, b, a) = color.as_rgba();
    [r, g, b, a]
}

impl GpuContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type VertexBuffer = u32;
    type UniformLocation = i32;
    type Error = OutOfHandles;

    fn set_clear_color(&self, color: piet::Color) {
        self.record(Call::SetClearColor(rgba(color)));
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn viewport(&self, viewport: Viewport) {
        self.record(Call::Viewport(viewport));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, OutOfHandles> {
        let handle = self.allocate()?;
        self.record(Call::CreateShader(stage, handle));
        Ok(handle)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        self.sources.borrow_mut().insert(*shader, source.to_owned());
        self.record(Call::ShaderSource(*shader, source.to_owned()));
    }

    fn compile_shader(&self, shader: &u32) {
        let ok = self
            .sources
            .borrow()
            .get(shader)
            .map_or(false, |source| is_well_formed(source));
        if ok {
            self.compiled.borrow_mut().insert(*shader);
        }
        self.record(Call::CompileShader(*shader));
    }

    fn shader_compile_status(&self, shader: &u32) -> bool {
        self.compiled.borrow().contains(shader)
    }

    fn shader_info_log(&self, shader: &u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1: error: missing entry point\n".to_owned()
        }
    }

    fn delete_shader(&self, shader: &u32) {
        self.record(Call::DeleteShader(*shader));
    }

    fn create_program(&self) -> Result<u32, OutOfHandles> {
        let handle = self.allocate()?;
        self.record(Call::CreateProgram(handle));
        Ok(handle)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        self.record(Call::AttachShader(*program, *shader));
    }

    fn detach_shader(&self, program: &u32, shader: &u32) {
        self.record(Call::DetachShader(*program, *shader));
    }

    fn link_program(&self, program: &u32) {
        self.record(Call::LinkProgram(*program));
    }

    fn program_link_status(&self, _program: &u32) -> bool {
        !self.fail_link.get()
    }

    fn program_info_log(&self, program: &u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: varying mismatch\n".to_owned()
        }
    }

    fn use_program(&self, program: Option<&u32>) {
        self.record(Call::UseProgram(program.copied()));
    }

    fn delete_program(&self, program: &u32) {
        self.record(Call::DeleteProgram(*program));
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        if self.missing.borrow().contains(name) {
            None
        } else {
            Some(POSITION_LOCATION)
        }
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<i32> {
        if self.missing.borrow().contains(name) {
            None
        } else {
            Some(COLOR_LOCATION)
        }
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Result<u32, OutOfHandles> {
        let handle = self.allocate()?;
        self.record(Call::CreateVertexBuffer(handle, data.to_vec()));
        Ok(handle)
    }

    fn bind_vertex_buffer(&self, buffer: Option<&u32>) {
        self.record(Call::BindVertexBuffer(buffer.copied()));
    }

    fn delete_vertex_buffer(&self, buffer: &u32) {
        self.record(Call::DeleteVertexBuffer(*buffer));
    }

    fn enable_vertex_attrib(&self, location: u32) {
        self.record(Call::EnableVertexAttrib(location));
    }

    fn disable_vertex_attrib(&self, location: u32) {
        self.record(Call::DisableVertexAttrib(location));
    }

    fn vertex_attrib_pointer(&self, location: u32, layout: AttribLayout) {
        self.record(Call::VertexAttribPointer(location, layout));
    }

    fn uniform_color(&self, location: &i32, color: piet::Color) {
        self.record(Call::UniformColor(*location, rgba(color)));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles(first, count));
    }
}
