// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gles-triangle-glow`.
//
// `gles-triangle-glow` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gles-triangle-glow` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gles-triangle-glow`. If not, see <https://www.gnu.org/licenses/>.

//! A [`GpuContext`] for `gles-triangle` that uses the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;

use gles_triangle::piet;
use gles_triangle::{ApiVersion, AttribLayout, Error, GpuContext, ShaderStage, Viewport};

use std::fmt;

macro_rules! c {
    ($e:expr) => {{
        ($e) as f32
    }};
}

/// A wrapper around a `glow` context.
pub struct GlowContext<H: HasContext + ?Sized> {
    /// The version reported by the driver.
    version: ApiVersion,

    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext> GlowContext<H> {
    /// Create a new [`GlowContext`] from a [`glow`] context.
    ///
    /// Fails with [`Error::UnsupportedVersion`] if the context cannot run OpenGL ES 2.0
    /// style shaders.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, while calling any [`GpuContext`]
    /// method, and when this type is dropped.
    pub unsafe fn new(context: H) -> Result<Self, Error> {
        let version = {
            let version = context.version();
            ApiVersion::new(version.major, version.minor, version.is_embedded)
        };

        version.ensure_supported()?;
        tracing::debug!("using {version}");

        Ok(Self { version, context })
    }
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }

    /// The version reported by the driver.
    pub fn version(&self) -> ApiVersion {
        self.version
    }
}

/// A wrapper around a `glow` shader that remembers its stage.
pub struct GlShader<H: HasContext + ?Sized> {
    /// The underlying shader.
    shader: H::Shader,

    /// The stage the shader was created for.
    stage: ShaderStage,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlShader<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlShader")
            .field("shader", &self.shader)
            .field("stage", &self.stage)
            .finish()
    }
}

/// A wrapper around a `glow` vertex buffer.
pub struct GlVertexBuffer<H: HasContext + ?Sized> {
    /// The underlying vertex buffer.
    vbo: H::Buffer,

    /// The vertex array object, on contexts that have them.
    vao: Option<H::VertexArray>,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlVertexBuffer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlVertexBuffer")
            .field("vbo", &self.vbo)
            .field("vao", &self.vao)
            .finish()
    }
}

/// An error reported by the driver.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

impl<H: HasContext + ?Sized> GpuContext for GlowContext<H> {
    type Shader = GlShader<H>;
    type Program = H::Program;
    type VertexBuffer = GlVertexBuffer<H>;
    type UniformLocation = H::UniformLocation;
    type Error = GlError;

    fn set_clear_color(&self, color: piet::Color) {
        let (r, g, b, a) = color.as_rgba();

        unsafe {
            self.context.clear_color(c!(r), c!(g), c!(b), c!(a));
        }
    }

    fn clear(&self) {
        unsafe {
            self.context.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn viewport(&self, viewport: Viewport) {
        unsafe {
            self.context
                .viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        }

        gl_error(&self.context);
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<GlShader<H>, GlError> {
        let shader = unsafe { self.context.create_shader(shader_type(stage)).gl_err()? };
        Ok(GlShader { shader, stage })
    }

    fn shader_source(&self, shader: &GlShader<H>, source: &str) {
        let dialect = GlslDialect::for_version(self.version);

        unsafe {
            self.context
                .shader_source(shader.shader, &format_shader(dialect, shader.stage, source));
        }
    }

    fn compile_shader(&self, shader: &GlShader<H>) {
        unsafe {
            self.context.compile_shader(shader.shader);
        }
    }

    fn shader_compile_status(&self, shader: &GlShader<H>) -> bool {
        unsafe { self.context.get_shader_compile_status(shader.shader) }
    }

    fn shader_info_log(&self, shader: &GlShader<H>) -> String {
        unsafe { self.context.get_shader_info_log(shader.shader) }
    }

    fn delete_shader(&self, shader: &GlShader<H>) {
        unsafe {
            self.context.delete_shader(shader.shader);
        }
    }

    fn create_program(&self) -> Result<H::Program, GlError> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: &H::Program, shader: &GlShader<H>) {
        unsafe {
            self.context.attach_shader(*program, shader.shader);
        }
    }

    fn detach_shader(&self, program: &H::Program, shader: &GlShader<H>) {
        unsafe {
            self.context.detach_shader(*program, shader.shader);
        }
    }

    fn link_program(&self, program: &H::Program) {
        unsafe {
            self.context.link_program(*program);
        }
    }

    fn program_link_status(&self, program: &H::Program) -> bool {
        unsafe { self.context.get_program_link_status(*program) }
    }

    fn program_info_log(&self, program: &H::Program) -> String {
        unsafe { self.context.get_program_info_log(*program) }
    }

    fn use_program(&self, program: Option<&H::Program>) {
        unsafe {
            self.context.use_program(program.copied());
        }

        gl_error(&self.context);
    }

    fn delete_program(&self, program: &H::Program) {
        unsafe {
            self.context.delete_program(*program);
        }
    }

    fn attrib_location(&self, program: &H::Program, name: &str) -> Option<u32> {
        unsafe { self.context.get_attrib_location(*program, name) }
    }

    fn uniform_location(&self, program: &H::Program, name: &str) -> Option<H::UniformLocation> {
        unsafe { self.context.get_uniform_location(*program, name) }
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Result<GlVertexBuffer<H>, GlError> {
        unsafe {
            let vbo = self.context.create_buffer().gl_err()?;
            let vao = if self.version.supports_vertex_arrays() {
                match self.context.create_vertex_array().gl_err() {
                    Ok(vao) => Some(vao),
                    Err(err) => {
                        self.context.delete_buffer(vbo);
                        return Err(err);
                    }
                }
            } else {
                None
            };

            if let Some(vao) = vao {
                self.context.bind_vertex_array(Some(vao));
            }
            let _guard = CallOnDrop(|| {
                if vao.is_some() {
                    self.context.bind_vertex_array(None);
                }
                self.context.bind_buffer(glow::ARRAY_BUFFER, None);
            });

            self.context.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.context
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);

            gl_error(&self.context);

            Ok(GlVertexBuffer { vbo, vao })
        }
    }

    fn bind_vertex_buffer(&self, buffer: Option<&GlVertexBuffer<H>>) {
        unsafe {
            match buffer {
                Some(buffer) => {
                    if let Some(vao) = buffer.vao {
                        self.context.bind_vertex_array(Some(vao));
                    }
                    self.context.bind_buffer(glow::ARRAY_BUFFER, Some(buffer.vbo));
                }
                None => {
                    self.context.bind_buffer(glow::ARRAY_BUFFER, None);
                    if self.version.supports_vertex_arrays() {
                        self.context.bind_vertex_array(None);
                    }
                }
            }
        }
    }

    fn delete_vertex_buffer(&self, buffer: &GlVertexBuffer<H>) {
        unsafe {
            self.context.delete_buffer(buffer.vbo);
            if let Some(vao) = buffer.vao {
                self.context.delete_vertex_array(vao);
            }
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe {
            self.context.enable_vertex_attrib_array(location);
        }
    }

    fn disable_vertex_attrib(&self, location: u32) {
        unsafe {
            self.context.disable_vertex_attrib_array(location);
        }
    }

    fn vertex_attrib_pointer(&self, location: u32, layout: AttribLayout) {
        unsafe {
            self.context.vertex_attrib_pointer_f32(
                location,
                layout.components,
                glow::FLOAT,
                false,
                layout.stride,
                layout.offset,
            );
        }
    }

    fn uniform_color(&self, location: &H::UniformLocation, color: piet::Color) {
        let (r, g, b, a) = color.as_rgba();

        unsafe {
            self.context
                .uniform_4_f32(Some(location), c!(r), c!(g), c!(b), c!(a));
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe {
            self.context.draw_arrays(glow::TRIANGLES, first, count);
        }

        gl_error(&self.context);
    }
}

fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// The GLSL dialect shader sources are compiled as.
///
/// Shader assets are written in GLSL ES 1.00 without a `#version` line. Desktop contexts get
/// the closest desktop version, and 3.2+ contexts (which may be core profiles) get GLSL 1.50
/// with the removed `attribute` / `gl_FragColor` spellings translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslDialect {
    /// GLSL ES 1.00, for every OpenGL ES context.
    Es100,

    /// GLSL 1.10, for OpenGL 2.0.
    Glsl110,

    /// GLSL 1.20, for OpenGL 2.1 through 3.1.
    Glsl120,

    /// GLSL 1.50, for OpenGL 3.2 and later.
    Glsl150,
}

/// Name of the fragment output that replaces `gl_FragColor` in GLSL 1.50.
const FRAG_COLOR_OUTPUT: &str = "triangleFragColor";

impl GlslDialect {
    /// Pick the dialect for a context version.
    pub fn for_version(version: ApiVersion) -> Self {
        if version.embedded {
            GlslDialect::Es100
        } else {
            match (version.major, version.minor) {
                (2, 0) => GlslDialect::Glsl110,
                (major, minor) if major < 3 || (major == 3 && minor < 2) => GlslDialect::Glsl120,
                _ => GlslDialect::Glsl150,
            }
        }
    }

    /// The `#version` directive for this dialect.
    pub fn header(self) -> &'static str {
        match self {
            GlslDialect::Es100 => "#version 100",
            GlslDialect::Glsl110 => "#version 110",
            GlslDialect::Glsl120 => "#version 120",
            GlslDialect::Glsl150 => "#version 150",
        }
    }
}

fn format_shader(dialect: GlslDialect, stage: ShaderStage, source: &str) -> String {
    let header = dialect.header();

    if dialect != GlslDialect::Glsl150 {
        return format!("{header}
{source}");
    }

    match stage {
        ShaderStage::Vertex => {
            let source = replace_identifier(source, "attribute", "in");
            format!("{header}
{source}")
        }
        ShaderStage::Fragment => {
            let source = replace_identifier(source, "gl_FragColor", FRAG_COLOR_OUTPUT);
            format!("{header}
out vec4 {FRAG_COLOR_OUTPUT};
{source}")
        }
    }
}

/// Replace whole-identifier occurrences of `from` with `to`.
fn replace_identifier(source: &str, from: &str, to: &str) -> String {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut prev = None;

    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back().or(prev);
        let after = rest[pos + from.len()..].chars().next();

        out.push_str(&rest[..pos]);
        if before.map_or(true, |c| !is_ident(c)) && after.map_or(true, |c| !is_ident(c)) {
            out.push_str(to);
        } else {
            out.push_str(from);
        }

        prev = from.chars().next_back();
        rest = &rest[pos + from.len()..];
    }

    out.push_str(rest);
    out
}

fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        tracing::error!("GL error: {}", gl_error_name(err));
    }
}

fn gl_error_name(err: u32) -> &'static str {
    match err {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "Unknown GL error",
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
