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

//! Draws a single, static triangle through a programmable OpenGL ES 2.0 pipeline.
//!
//! The centerpiece of this crate is the [`TriangleRenderer`], which is driven by the three
//! callbacks a windowing system delivers to a GL surface: the surface was created, the surface
//! changed size, and a frame should be drawn. The actual graphics API is abstracted behind
//! [`GpuContext`]; see the [`gles-triangle-glow`] crate for an implementation over [`glow`].
//!
//! All callbacks must be made from the thread the context is current on.
//!
//! [`gles-triangle-glow`]: https://crates.io/crates/gles-triangle-glow
//! [`glow`]: https://crates.io/crates/glow

pub use piet;

pub mod assets;
mod config;
mod error;
mod gpu_backend;
pub mod resources;
pub mod shader;
pub mod triangle;

#[cfg(test)]
mod testing;

pub use assets::{AssetError, AssetSource, DirAssets, EmbeddedAssets};
pub use config::{RendererConfig, COLOR_UNIFORM, POSITION_ATTRIBUTE};
pub use error::Error;
pub use gpu_backend::{ApiVersion, AttribLayout, GpuContext, ShaderStage, Viewport};

use resources::{Program, VertexBuffer};
use triangle::{Vertex, VERTEX_COUNT};

use std::fmt;
use std::rc::Rc;

/// Where the renderer is in the surface lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererState {
    /// No surface has been created, or creating it failed.
    Uninitialized,

    /// The program is linked and active.
    Created,

    /// The viewport was set after the program was linked, and no frame has been drawn since.
    Sized,

    /// At least one frame has been drawn at the current size.
    Drawing,
}

/// Everything created along with the surface.
struct Pipeline<C: GpuContext + ?Sized> {
    program: Program<C>,
    vertex_buffer: VertexBuffer<C>,
    position: u32,
    color: C::UniformLocation,
}

/// Renders one triangle onto a GL surface.
pub struct TriangleRenderer<C: GpuContext + ?Sized, A = EmbeddedAssets> {
    /// The underlying context.
    context: Rc<C>,

    /// Where shader source is read from.
    assets: A,

    /// Names and colors.
    config: RendererConfig,

    /// `None` until the surface is created.
    pipeline: Option<Pipeline<C>>,

    /// The last viewport that was set.
    viewport: Option<Viewport>,

    state: RendererState,
}

impl<C: GpuContext + ?Sized, A> fmt::Debug for TriangleRenderer<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleRenderer")
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> TriangleRenderer<C> {
    /// Create a renderer that uses the bundled shaders and the default colors.
    pub fn new(context: Rc<C>) -> Self {
        Self::with_assets(context, EmbeddedAssets, RendererConfig::default())
    }
}

impl<C: GpuContext + ?Sized, A: AssetSource> TriangleRenderer<C, A> {
    /// Create a renderer that reads its shaders from `assets`.
    ///
    /// Nothing touches the context until [`on_surface_created`](Self::on_surface_created).
    pub fn with_assets(context: Rc<C>, assets: A, config: RendererConfig) -> Self {
        Self {
            context,
            assets,
            config,
            pipeline: None,
            viewport: None,
            state: RendererState::Uninitialized,
        }
    }

    /// Get a reference to the underlying context.
    pub fn context(&self) -> &Rc<C> {
        &self.context
    }

    /// Get the configuration this renderer draws with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Where the renderer is in the surface lifecycle.
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// The viewport set by the last [`on_surface_changed`](Self::on_surface_changed).
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// The surface was created: build and activate the shader program.
    ///
    /// Calling this again, for instance after the surface was lost, releases the previous
    /// program and builds a fresh one. If this fails the renderer is left uninitialized.
    pub fn on_surface_created(&mut self) -> Result<(), Error> {
        self.release_pipeline();
        self.state = RendererState::Uninitialized;

        self.context.set_clear_color(self.config.clear_color);

        let vertex_source = self.assets.read_to_string(&self.config.vertex_shader)?;
        let fragment_source = self.assets.read_to_string(&self.config.fragment_shader)?;

        let program = shader::compile_program(&self.context, &vertex_source, &fragment_source)?;

        let position = self
            .context
            .attrib_location(program.resource(), &self.config.position_attribute)
            .ok_or_else(|| Error::MissingAttribute(self.config.position_attribute.clone()))?;
        let color = self
            .context
            .uniform_location(program.resource(), &self.config.color_uniform)
            .ok_or_else(|| Error::MissingUniform(self.config.color_uniform.clone()))?;

        let vertex_buffer = VertexBuffer::new(&self.context, triangle::vertex_bytes())?;

        self.context.use_program(Some(program.resource()));
        self.pipeline = Some(Pipeline {
            program,
            vertex_buffer,
            position,
            color,
        });
        self.state = RendererState::Created;

        tracing::debug!("surface created, program linked");
        Ok(())
    }

    /// The surface was resized to `width` by `height` pixels.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        let viewport = Viewport::from_size(width, height);
        self.context.viewport(viewport);
        self.viewport = Some(viewport);

        if self.state != RendererState::Uninitialized {
            self.state = RendererState::Sized;
        }

        tracing::debug!("surface changed to {width}x{height}");
    }

    /// Draw one frame.
    ///
    /// The color buffer is always cleared. If the surface has not been created yet the
    /// triangle is skipped and [`Error::NotCreated`] is returned.
    pub fn on_draw_frame(&mut self) -> Result<(), Error> {
        self.context.clear();

        let pipeline = self.pipeline.as_ref().ok_or(Error::NotCreated)?;
        let context = &*self.context;

        context.bind_vertex_buffer(Some(pipeline.vertex_buffer.resource()));
        context.enable_vertex_attrib(pipeline.position);
        context.vertex_attrib_pointer(pipeline.position, Vertex::POSITION_LAYOUT);

        context.uniform_color(&pipeline.color, self.config.triangle_color);
        context.draw_triangles(0, VERTEX_COUNT as i32);

        context.disable_vertex_attrib(pipeline.position);
        context.bind_vertex_buffer(None);

        self.state = RendererState::Drawing;
        Ok(())
    }

    /// Get the handle of the active program, if the surface has been created.
    pub fn program(&self) -> Option<&C::Program> {
        self.pipeline
            .as_ref()
            .map(|pipeline| pipeline.program.resource())
    }
}

impl<C: GpuContext + ?Sized, A> TriangleRenderer<C, A> {
    /// Deactivate and release the current program and vertex buffer, if any.
    fn release_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            self.context.use_program(None);
            drop(pipeline);
        }
    }
}

impl<C: GpuContext + ?Sized, A> Drop for TriangleRenderer<C, A> {
    fn drop(&mut self) {
        self.release_pipeline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingContext, COLOR_LOCATION, POSITION_LOCATION};

    fn renderer() -> (Rc<RecordingContext>, TriangleRenderer<RecordingContext>) {
        let context = Rc::new(RecordingContext::new());
        let renderer = TriangleRenderer::new(context.clone());
        (context, renderer)
    }

    /// Assets that serve fixed sources regardless of name.
    struct Sources {
        vertex: &'static str,
        fragment: &'static str,
    }

    impl AssetSource for Sources {
        fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
            if name == assets::VERTEX_SHADER_ASSET {
                Ok(self.vertex.into())
            } else {
                Ok(self.fragment.into())
            }
        }
    }

    #[test]
    fn nothing_happens_before_the_surface_exists() {
        let (context, renderer) = renderer();
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert!(renderer.program().is_none());
        assert!(context.calls().is_empty());
    }

    #[test]
    fn surface_creation_links_and_activates() {
        let (context, mut renderer) = renderer();

        renderer.on_surface_created().unwrap();

        assert_eq!(renderer.state(), RendererState::Created);
        let program = *renderer.program().unwrap();

        let calls = context.calls();
        assert_eq!(calls[0], Call::SetClearColor([0.0, 0.0, 0.0, 0.0]));
        assert!(calls.contains(&Call::LinkProgram(program)));
        assert_eq!(calls.last(), Some(&Call::UseProgram(Some(program))));

        let uploaded = calls
            .iter()
            .find_map(|call| match call {
                Call::CreateVertexBuffer(_, data) => Some(data.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(uploaded, triangle::vertex_bytes());

        // Shaders do not outlive the link.
        let deleted = calls
            .iter()
            .filter(|call| matches!(call, Call::DeleteShader(_)))
            .count();
        assert_eq!(deleted, 2);
    }

    #[test]
    fn resize_sets_full_viewport() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();

        for (width, height) in [(1080, 1920), (1920, 1080), (1, 1)] {
            context.clear_calls();
            renderer.on_surface_changed(width, height);

            let expected = Viewport {
                x: 0,
                y: 0,
                width: width as i32,
                height: height as i32,
            };
            assert_eq!(context.calls(), [Call::Viewport(expected)]);
            assert_eq!(renderer.viewport(), Some(expected));
            assert_eq!(renderer.state(), RendererState::Sized);
        }
    }

    #[test]
    fn frame_draws_one_white_triangle_on_black() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        renderer.on_surface_changed(640, 480);
        let buffer = context
            .calls()
            .iter()
            .find_map(|call| match call {
                Call::CreateVertexBuffer(handle, _) => Some(*handle),
                _ => None,
            })
            .unwrap();
        context.clear_calls();

        renderer.on_draw_frame().unwrap();

        assert_eq!(
            context.calls(),
            [
                Call::Clear,
                Call::BindVertexBuffer(Some(buffer)),
                Call::EnableVertexAttrib(POSITION_LOCATION),
                Call::VertexAttribPointer(POSITION_LOCATION, Vertex::POSITION_LAYOUT),
                Call::UniformColor(COLOR_LOCATION, [1.0, 1.0, 1.0, 1.0]),
                Call::DrawTriangles(0, 3),
                Call::DisableVertexAttrib(POSITION_LOCATION),
                Call::BindVertexBuffer(None),
            ]
        );
        assert_eq!(renderer.state(), RendererState::Drawing);
    }

    #[test]
    fn every_frame_issues_exactly_one_draw() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        context.clear_calls();

        for _ in 0..5 {
            renderer.on_draw_frame().unwrap();
        }

        let draws: Vec<_> = context
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::DrawTriangles(..)))
            .collect();
        assert_eq!(draws, vec![Call::DrawTriangles(0, 3); 5]);
    }

    #[test]
    fn drawing_before_creation_only_clears() {
        let (context, mut renderer) = renderer();

        assert!(matches!(renderer.on_draw_frame(), Err(Error::NotCreated)));
        assert_eq!(context.calls(), [Call::Clear]);
        assert_eq!(renderer.state(), RendererState::Uninitialized);
    }

    #[test]
    fn broken_shader_aborts_program_construction() {
        let context = Rc::new(RecordingContext::new());
        let sources = Sources {
            vertex: "attribute vec4 aPosition;\nvoid main() { gl_Position = aPosition; }",
            fragment: "uniform vec4 uColor; gl_FragColor = uColor;",
        };
        let mut renderer =
            TriangleRenderer::with_assets(context.clone(), sources, RendererConfig::default());

        let err = renderer.on_surface_created().unwrap_err();
        assert!(matches!(
            err,
            Error::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert!(renderer.program().is_none());
        assert!(!context.calls().iter().any(|call| matches!(
            call,
            Call::CreateProgram(_) | Call::AttachShader(..) | Call::UseProgram(_)
        )));
    }

    #[test]
    fn missing_asset_fails_loudly() {
        let context = Rc::new(RecordingContext::new());
        let config = RendererConfig::default().with_shaders("shape/nope.glsl", "shape/nope.glsl");
        let mut renderer = TriangleRenderer::with_assets(context.clone(), EmbeddedAssets, config);

        match renderer.on_surface_created() {
            Err(Error::Asset(err)) => assert_eq!(err.name(), "shape/nope.glsl"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!context
            .calls()
            .iter()
            .any(|call| matches!(call, Call::CreateShader(..))));
    }

    #[test]
    fn missing_attribute_releases_the_program() {
        let (context, mut renderer) = renderer();
        context.hide(POSITION_ATTRIBUTE);

        match renderer.on_surface_created() {
            Err(Error::MissingAttribute(name)) => assert_eq!(name, "aPosition"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(renderer.state(), RendererState::Uninitialized);

        let calls = context.calls();
        let program = calls
            .iter()
            .find_map(|call| match call {
                Call::CreateProgram(handle) => Some(*handle),
                _ => None,
            })
            .unwrap();
        assert_eq!(calls.last(), Some(&Call::DeleteProgram(program)));
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::CreateVertexBuffer(..))));
    }

    #[test]
    fn missing_uniform_releases_the_program() {
        let (context, mut renderer) = renderer();
        context.hide(COLOR_UNIFORM);

        match renderer.on_surface_created() {
            Err(Error::MissingUniform(name)) => assert_eq!(name, "uColor"),
            other => panic!("unexpected result: {other:?}"),
        }

        let calls = context.calls();
        let program = calls
            .iter()
            .find_map(|call| match call {
                Call::CreateProgram(handle) => Some(*handle),
                _ => None,
            })
            .unwrap();
        assert_eq!(calls.last(), Some(&Call::DeleteProgram(program)));
    }

    #[test]
    fn recreating_the_surface_replaces_the_pipeline() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        let first = *renderer.program().unwrap();

        renderer.on_surface_created().unwrap();
        let second = *renderer.program().unwrap();

        assert_ne!(first, second);
        let calls = context.calls();
        let unbound = calls
            .iter()
            .position(|call| *call == Call::UseProgram(None))
            .unwrap();
        let deleted = calls
            .iter()
            .position(|call| *call == Call::DeleteProgram(first))
            .unwrap();
        assert!(unbound < deleted);
        assert_eq!(renderer.state(), RendererState::Created);
    }

    #[test]
    fn failed_recreation_releases_the_old_pipeline() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        renderer.on_surface_changed(640, 480);
        let first = *renderer.program().unwrap();

        context.hide(POSITION_ATTRIBUTE);
        assert!(matches!(
            renderer.on_surface_created(),
            Err(Error::MissingAttribute(_))
        ));

        let calls = context.calls();
        assert!(calls.contains(&Call::UseProgram(None)));
        assert!(calls.contains(&Call::DeleteProgram(first)));
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert!(renderer.program().is_none());

        context.clear_calls();
        assert!(matches!(renderer.on_draw_frame(), Err(Error::NotCreated)));
        assert_eq!(context.calls(), [Call::Clear]);
    }

    #[test]
    fn recreation_after_resize_keeps_the_viewport() {
        let (_context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        renderer.on_surface_changed(800, 600);
        renderer.on_draw_frame().unwrap();

        renderer.on_surface_created().unwrap();

        assert_eq!(renderer.state(), RendererState::Created);
        assert_eq!(renderer.viewport(), Some(Viewport::from_size(800, 600)));

        renderer.on_surface_changed(800, 600);
        assert_eq!(renderer.state(), RendererState::Sized);
    }

    #[test]
    fn dropping_the_renderer_releases_gpu_objects() {
        let (context, mut renderer) = renderer();
        renderer.on_surface_created().unwrap();
        let program = *renderer.program().unwrap();
        context.clear_calls();

        drop(renderer);

        let calls = context.calls();
        assert_eq!(calls[0], Call::UseProgram(None));
        assert_eq!(calls[1], Call::DeleteProgram(program));
        assert!(matches!(calls[2], Call::DeleteVertexBuffer(_)));
        assert_eq!(calls.len(), 3);
    }

    #[test]
    fn dropping_an_uncreated_renderer_touches_nothing() {
        let (context, renderer) = renderer();
        drop(renderer);
        assert!(context.calls().is_empty());
    }

    #[test]
    fn custom_colors_reach_the_driver() {
        let context = Rc::new(RecordingContext::new());
        let config = RendererConfig::default()
            .with_clear_color(piet::Color::BLACK)
            .with_triangle_color(piet::Color::rgb8(0, 0, 0xff));
        let mut renderer = TriangleRenderer::with_assets(context.clone(), EmbeddedAssets, config);

        renderer.on_surface_created().unwrap();
        renderer.on_draw_frame().unwrap();

        let calls = context.calls();
        assert_eq!(calls[0], Call::SetClearColor([0.0, 0.0, 0.0, 1.0]));
        assert!(calls.contains(&Call::UniformColor(COLOR_LOCATION, [0.0, 0.0, 1.0, 1.0])));
    }
}
