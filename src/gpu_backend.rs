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

//! Defines the GPU backend for gles-triangle.

use std::error::Error;
use std::fmt;

/// The backend for the triangle renderer.
///
/// Every method maps onto one call of an OpenGL ES 2.0 style driver. Implementations are
/// expected to be driven from a single rendering thread with their context current.
pub trait GpuContext {
    /// The type associated with a compiled (or compiling) shader object.
    type Shader;

    /// The type associated with a shader program.
    type Program;

    /// The type associated with a GPU vertex buffer.
    ///
    /// Contains the vertex data and any layout state the backend needs to bind it.
    type VertexBuffer;

    /// The location of a uniform inside of a linked program.
    type UniformLocation;

    /// The error type associated with this GPU context.
    type Error: Error + 'static;

    /// Set the color used by [`clear`](Self::clear).
    fn set_clear_color(&self, color: piet::Color);

    /// Clear the color buffer.
    fn clear(&self);

    /// Set the viewport.
    fn viewport(&self, viewport: Viewport);

    /// Create a new, empty shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error>;

    /// Upload source code into a shader object.
    fn shader_source(&self, shader: &Self::Shader, source: &str);

    /// Compile the source currently held by a shader object.
    fn compile_shader(&self, shader: &Self::Shader);

    /// Whether the last compilation of this shader succeeded.
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;

    /// Get the driver's info log for this shader.
    fn shader_info_log(&self, shader: &Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&self, shader: &Self::Shader);

    /// Create a new, empty program object.
    fn create_program(&self) -> Result<Self::Program, Self::Error>;

    /// Attach a shader to a program.
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Detach a shader from a program.
    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Link the shaders attached to a program.
    fn link_program(&self, program: &Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: &Self::Program) -> bool;

    /// Get the driver's info log for this program.
    fn program_info_log(&self, program: &Self::Program) -> String;

    /// Make a program part of the current rendering state, or unbind it.
    fn use_program(&self, program: Option<&Self::Program>);

    /// Delete a program object.
    fn delete_program(&self, program: &Self::Program);

    /// Look up the location of a vertex attribute.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    /// Look up the location of a uniform.
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Create a vertex buffer holding `data`.
    ///
    /// The data is uploaded once and never modified afterwards.
    fn create_vertex_buffer(&self, data: &[u8]) -> Result<Self::VertexBuffer, Self::Error>;

    /// Bind a vertex buffer for the following attribute calls, or unbind it.
    fn bind_vertex_buffer(&self, buffer: Option<&Self::VertexBuffer>);

    /// Delete a vertex buffer.
    fn delete_vertex_buffer(&self, buffer: &Self::VertexBuffer);

    /// Enable the vertex attribute array at `location`.
    fn enable_vertex_attrib(&self, location: u32);

    /// Disable the vertex attribute array at `location`.
    fn disable_vertex_attrib(&self, location: u32);

    /// Describe how the bound vertex buffer feeds the attribute at `location`.
    fn vertex_attrib_pointer(&self, location: u32, layout: AttribLayout);

    /// Set a `vec4` uniform to a color.
    fn uniform_color(&self, location: &Self::UniformLocation, color: piet::Color);

    /// Draw `count` vertices as a list of triangles, starting at `first`.
    fn draw_triangles(&self, first: i32, count: i32);
}

/// The pipeline stage a shader runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,

    /// Runs once per fragment.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// A rectangle of the surface that rendering is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// The left edge, in pixels.
    pub x: i32,

    /// The bottom edge, in pixels.
    pub y: i32,

    /// The width, in pixels.
    pub width: i32,

    /// The height, in pixels.
    pub height: i32,
}

impl Viewport {
    /// A viewport covering a whole `width` by `height` surface.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: clamp_dimension(width),
            height: clamp_dimension(height),
        }
    }
}

fn clamp_dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// The layout of one float attribute inside of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLayout {
    /// Number of `f32` components per vertex.
    pub components: i32,

    /// Distance in bytes between two consecutive vertices.
    pub stride: i32,

    /// Offset in bytes of the first component.
    pub offset: i32,
}

/// The version of the graphics API a context provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    /// Major version number.
    pub major: u32,

    /// Minor version number.
    pub minor: u32,

    /// Whether this is OpenGL ES (as opposed to desktop OpenGL).
    pub embedded: bool,
}

impl ApiVersion {
    /// Create a new version.
    pub fn new(major: u32, minor: u32, embedded: bool) -> Self {
        Self {
            major,
            minor,
            embedded,
        }
    }

    /// Whether GLSL shaders, program objects and generic vertex attributes are available.
    ///
    /// This is the case for OpenGL ES 2.0 and OpenGL 2.0 onwards.
    pub fn supports_programmable_pipeline(&self) -> bool {
        self.major >= 2
    }

    /// Whether vertex array objects are part of the core API.
    pub fn supports_vertex_arrays(&self) -> bool {
        self.major >= 3
    }

    /// Fail with [`Error::UnsupportedVersion`] unless the programmable pipeline is available.
    ///
    /// [`Error::UnsupportedVersion`]: crate::Error::UnsupportedVersion
    pub fn ensure_supported(&self) -> Result<(), crate::Error> {
        if self.supports_programmable_pipeline() {
            Ok(())
        } else {
            Err(crate::Error::UnsupportedVersion {
                major: self.major,
                minor: self.minor,
                embedded: self.embedded,
            })
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api = if self.embedded { "OpenGL ES" } else { "OpenGL" };
        write!(f, "{api} {}.{}", self.major, self.minor)
    }
}
