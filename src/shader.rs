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

//! Shader compilation and program linking.

use crate::error::Error;
use crate::gpu_backend::{GpuContext, ShaderStage};
use crate::resources::{Program, Shader};

use std::rc::Rc;

/// Compile `source` as a shader of the given stage.
///
/// Compilation is attempted exactly once. If the driver reports a failure, the shader object
/// is released before the error is returned, so a returned [`Shader`] is always a compiled one.
pub fn compile_shader<C: GpuContext + ?Sized>(
    context: &Rc<C>,
    stage: ShaderStage,
    source: &str,
) -> Result<Shader<C>, Error> {
    let shader = Shader::new(context, stage)?;

    context.shader_source(shader.resource(), source);
    context.compile_shader(shader.resource());

    if !context.shader_compile_status(shader.resource()) {
        let log = context.shader_info_log(shader.resource());
        tracing::warn!("compile failed for {stage} shader: {}", log.trim_end());
        return Err(Error::Compile { stage, log });
    }

    Ok(shader)
}

/// Link a vertex and a fragment shader into a program.
///
/// Both shaders are detached and released once linking is done, whether or not it succeeded.
pub fn link_program<C: GpuContext + ?Sized>(
    context: &Rc<C>,
    vertex: Shader<C>,
    fragment: Shader<C>,
) -> Result<Program<C>, Error> {
    let program = Program::new(context)?;

    context.attach_shader(program.resource(), vertex.resource());
    context.attach_shader(program.resource(), fragment.resource());
    context.link_program(program.resource());
    let linked = context.program_link_status(program.resource());

    for shader in [&vertex, &fragment] {
        context.detach_shader(program.resource(), shader.resource());
    }
    drop(vertex);
    drop(fragment);

    if !linked {
        let log = context.program_info_log(program.resource());
        tracing::warn!("link failed: {}", log.trim_end());
        return Err(Error::Link(log));
    }

    Ok(program)
}

/// Compile both stages and link them.
///
/// A compile failure aborts before any program object is created.
pub fn compile_program<C: GpuContext + ?Sized>(
    context: &Rc<C>,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<Program<C>, Error> {
    let vertex = compile_shader(context, ShaderStage::Vertex, vertex_source)?;
    let fragment = compile_shader(context, ShaderStage::Fragment, fragment_source)?;
    link_program(context, vertex, fragment)
}
