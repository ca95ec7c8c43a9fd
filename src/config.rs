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

//! Renderer configuration.

use crate::assets::{FRAGMENT_SHADER_ASSET, VERTEX_SHADER_ASSET};

use piet::Color;

/// Name of the position attribute in the bundled vertex shader.
pub const POSITION_ATTRIBUTE: &str = "aPosition";

/// Name of the color uniform in the bundled fragment shader.
pub const COLOR_UNIFORM: &str = "uColor";

/// The constants a [`TriangleRenderer`](crate::TriangleRenderer) draws with.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Asset name of the vertex shader.
    pub vertex_shader: String,

    /// Asset name of the fragment shader.
    pub fragment_shader: String,

    /// Name of the `vec4` vertex attribute that receives positions.
    pub position_attribute: String,

    /// Name of the `vec4` uniform that receives the triangle color.
    pub color_uniform: String,

    /// The color the surface is cleared to every frame.
    pub clear_color: Color,

    /// The color of the triangle.
    pub triangle_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vertex_shader: VERTEX_SHADER_ASSET.into(),
            fragment_shader: FRAGMENT_SHADER_ASSET.into(),
            position_attribute: POSITION_ATTRIBUTE.into(),
            color_uniform: COLOR_UNIFORM.into(),
            clear_color: Color::rgba(0.0, 0.0, 0.0, 0.0),
            triangle_color: Color::WHITE,
        }
    }
}

impl RendererConfig {
    /// Use a different clear color.
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Use a different triangle color.
    pub fn with_triangle_color(mut self, color: Color) -> Self {
        self.triangle_color = color;
        self
    }

    /// Load the shaders from different asset names.
    pub fn with_shaders(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }
}
