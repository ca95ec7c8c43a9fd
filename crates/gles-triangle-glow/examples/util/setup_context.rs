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

// Easy module for setting up a context for the examples.
// Uses glutin and winit, which also covers Android.

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

pub(crate) mod glutin_impl {
    use gles_triangle::{AssetSource, Error, RendererConfig, TriangleRenderer};
    use gles_triangle_glow::GlowContext;

    use glutin::config::{Config, ConfigTemplateBuilder};
    use glutin::context::{
        ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version,
    };
    use glutin::display::{Display, GetGlDisplay};
    use glutin::prelude::*;

    use glutin::surface::{Surface, SwapInterval, WindowSurface};
    use glutin_winit::{DisplayBuilder, GlWindow};

    use raw_window_handle::HasRawWindowHandle;

    use std::error::Error as StdError;
    use std::mem;
    use std::num::NonZeroU32;
    use std::rc::Rc;

    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{EventLoop, EventLoopWindowTarget};
    use winit::window::{Window, WindowBuilder};

    type Renderer = TriangleRenderer<GlowContext<glow::Context>, Box<dyn AssetSource>>;

    pub(crate) struct GlutinSetup {
        display: Display,
        config: Config,
        context: ContextType,
        window: Option<Window>,
    }

    enum ContextType {
        NotCurrent(NotCurrentContext),
        Current {
            context: PossiblyCurrentContext,
            window: Window,
            surface: Surface<WindowSurface>,
        },
        Hole,
    }

    impl Default for ContextType {
        fn default() -> Self {
            Self::Hole
        }
    }

    fn make_window_builder() -> WindowBuilder {
        WindowBuilder::new().with_title("gles-triangle")
    }

    impl GlutinSetup {
        pub(crate) fn new<T>(
            event_loop: &EventLoopWindowTarget<T>,
        ) -> Result<Self, Box<dyn StdError>> {
            // Start building a window.
            let window = if cfg!(windows) {
                Some(make_window_builder())
            } else {
                None
            };

            let display = DisplayBuilder::new().with_window_builder(window);

            // Any config will do for a single opaque triangle; prefer hardware acceleration.
            let (window, gl_config) = display.build(
                event_loop,
                ConfigTemplateBuilder::new(),
                |configs| {
                    configs
                        .reduce(|accum, config| {
                            if config.hardware_accelerated() && !accum.hardware_accelerated() {
                                config
                            } else {
                                accum
                            }
                        })
                        .expect("no GL configs available")
                },
            )?;

            tracing::info!("picked config {:?} with api {:?}", &gl_config, gl_config.api());

            // Try to build a several different contexts, ending with plain OpenGL ES 2.0.
            let window_handle = window.as_ref().map(|w| w.raw_window_handle());
            let contexts = [
                ContextAttributesBuilder::new().build(window_handle),
                ContextAttributesBuilder::new()
                    .with_context_api(ContextApi::Gles(None))
                    .build(window_handle),
                ContextAttributesBuilder::new()
                    .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
                    .build(window_handle),
            ];

            let display = gl_config.display();
            let gl_context = (|| {
                for context in &contexts {
                    if let Ok(gl_context) = unsafe { display.create_context(&gl_config, context) } {
                        return Ok(gl_context);
                    }
                }

                Err(Box::<dyn StdError>::from("Could not create a context"))
            })()?;

            Ok(Self {
                display,
                config: gl_config,
                context: ContextType::NotCurrent(gl_context),
                window,
            })
        }

        fn make_current<T>(
            &mut self,
            window_target: &EventLoopWindowTarget<T>,
        ) -> Result<impl FnOnce() -> glow::Context, Box<dyn StdError>> {
            let window = match self.window.take() {
                Some(window) => window,
                None => glutin_winit::finalize_window(
                    window_target,
                    make_window_builder(),
                    &self.config,
                )?,
            };

            let attrs = window.build_surface_attributes(<_>::default());
            let gl_surface = unsafe {
                self.display
                    .create_window_surface(&self.config, &attrs)?
            };

            let gl_context = match mem::take(&mut self.context) {
                ContextType::NotCurrent(context) => context.make_current(&gl_surface)?,
                _ => return Err("context is already current".into()),
            };

            if let Err(err) = gl_surface
                .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
            {
                tracing::warn!("error setting vsync: {err:?}");
            }

            self.context = ContextType::Current {
                context: gl_context,
                window,
                surface: gl_surface,
            };

            // Set up the Glow context.
            let display = self.display.clone();
            Ok(move || {
                #[allow(unused_mut)]
                let mut glow_context = unsafe {
                    glow::Context::from_loader_function_cstr(|s| {
                        display.get_proc_address(s) as *const _
                    })
                };

                #[cfg(not(target_vendor = "apple"))]
                unsafe {
                    use glow::HasContext;

                    if glow_context.supported_extensions().contains("GL_KHR_debug") {
                        glow_context.enable(glow::DEBUG_OUTPUT);
                        glow_context.debug_message_callback(debug_message_callback);
                    }
                }

                glow_context
            })
        }

        /// Drive the renderer from the window's lifecycle events until it closes.
        pub(crate) fn run(
            mut self,
            evl: EventLoop<()>,
            assets: Box<dyn AssetSource>,
            config: RendererConfig,
        ) -> ! {
            let mut assets = Some(assets);
            let mut renderer: Option<Renderer> = None;

            evl.run(move |event, window_target, control_flow| {
                control_flow.set_wait();

                match event {
                    Event::Resumed => {
                        let generator = match self.make_current(window_target) {
                            Ok(generator) => generator,
                            Err(err) => {
                                tracing::error!("failed to make the context current: {err}");
                                control_flow.set_exit_with_code(1);
                                return;
                            }
                        };

                        if renderer.is_none() {
                            // SAFETY: We are current.
                            match unsafe { GlowContext::new(generator()) } {
                                Ok(context) => {
                                    let assets = assets.take().expect("assets used twice");
                                    renderer = Some(TriangleRenderer::with_assets(
                                        Rc::new(context),
                                        assets,
                                        config.clone(),
                                    ));
                                }
                                Err(err @ Error::UnsupportedVersion { .. }) => {
                                    tracing::error!(
                                        "This device does not support OpenGL ES 2.0: {err}"
                                    );
                                    control_flow.set_exit_with_code(1);
                                    return;
                                }
                                Err(err) => {
                                    tracing::error!("failed to set up glow: {err}");
                                    control_flow.set_exit_with_code(1);
                                    return;
                                }
                            }
                        }

                        let (renderer, window) = match (&mut renderer, &self.context) {
                            (Some(renderer), ContextType::Current { window, .. }) => {
                                (renderer, window)
                            }
                            _ => return,
                        };

                        if let Err(err) = renderer.on_surface_created() {
                            tracing::error!("failed to create the surface: {err}");
                            control_flow.set_exit_with_code(1);
                            return;
                        }

                        let size = window.inner_size();
                        renderer.on_surface_changed(size.width, size.height);
                        window.request_redraw();
                    }
                    Event::Suspended => {
                        // This event is only raised on Android, where the backing NativeWindow for a GL
                        // Surface can appear and disappear at any moment.
                        tracing::info!("window removed, pausing");

                        // Destroy the GL Surface and un-current the GL Context before the window
                        // is handed back to the system.
                        if let ContextType::Current { context, .. } = mem::take(&mut self.context) {
                            match context.make_not_current() {
                                Ok(context) => self.context = ContextType::NotCurrent(context),
                                Err(err) => {
                                    tracing::error!("failed to release the context: {err}");
                                    control_flow.set_exit_with_code(1);
                                }
                            }
                        }
                    }
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::Resized(size) => {
                            if let (Some(width), Some(height)) =
                                (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                            {
                                // Some platforms like EGL require resizing GL surface to update the size.
                                if let ContextType::Current {
                                    context, surface, ..
                                } = &self.context
                                {
                                    surface.resize(context, width, height);

                                    if let Some(renderer) = &mut renderer {
                                        renderer.on_surface_changed(size.width, size.height);
                                    }
                                }
                            }
                        }
                        WindowEvent::CloseRequested => {
                            control_flow.set_exit();
                        }
                        _ => (),
                    },
                    Event::RedrawRequested(_) => {
                        if let (
                            Some(renderer),
                            ContextType::Current {
                                context: gl_context,
                                window,
                                surface: gl_surface,
                            },
                        ) = (&mut renderer, &self.context)
                        {
                            if let Err(err) = renderer.on_draw_frame() {
                                tracing::warn!("frame skipped: {err}");
                            }

                            if let Err(err) = gl_surface.swap_buffers(gl_context) {
                                tracing::error!("failed to swap buffers: {err}");
                            }

                            // Keep drawing continuously.
                            window.request_redraw();
                        }
                    }
                    Event::LoopDestroyed => {
                        // GL objects can only be deleted while the context is current.
                        if let ContextType::Current { .. } = self.context {
                            drop(renderer.take());
                        } else if let Some(renderer) = renderer.take() {
                            tracing::warn!("context is not current, leaking GPU objects");
                            mem::forget(renderer);
                        }
                    }
                    _ => (),
                }
            })
        }
    }

    pub(crate) fn with_renderer(
        assets: Box<dyn AssetSource>,
        config: RendererConfig,
    ) -> Result<(), Box<dyn StdError>> {
        let event_loop = EventLoop::new();
        GlutinSetup::new(&event_loop)?.run(event_loop, assets, config)
    }

    #[cfg(not(target_vendor = "apple"))]
    fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
        let source = match source {
            glow::DEBUG_SOURCE_API => "API",
            glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
            glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
            glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
            glow::DEBUG_SOURCE_APPLICATION => "Application",
            glow::DEBUG_SOURCE_OTHER => "Other",
            _ => "Unknown",
        };

        let ty = match ty {
            glow::DEBUG_TYPE_ERROR => "Error",
            glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
            glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
            glow::DEBUG_TYPE_PORTABILITY => "Portability",
            glow::DEBUG_TYPE_PERFORMANCE => "Performance",
            glow::DEBUG_TYPE_MARKER => "Marker",
            glow::DEBUG_TYPE_OTHER => "Other",
            _ => "Unknown",
        };

        match severity {
            glow::DEBUG_SEVERITY_HIGH => {
                tracing::error!("{ty}-{id} ({source}): {message}");
            }
            glow::DEBUG_SEVERITY_MEDIUM => {
                tracing::warn!("{ty}-{id} ({source}): {message}");
            }
            glow::DEBUG_SEVERITY_LOW => {
                tracing::info!("{ty}-{id} ({source}): {message}");
            }
            glow::DEBUG_SEVERITY_NOTIFICATION => {
                tracing::debug!("{ty}-{id} ({source}): {message}");
            }
            _ => (),
        };
    }
}

pub(crate) use glutin_impl::with_renderer;
