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

//! The triangle's vertex data.

use crate::gpu_backend::AttribLayout;

use bytemuck::{Pod, Zeroable};

use std::mem;

/// Number of coordinates (x, y, z) that describe one vertex.
pub const COORDS_PER_VERTEX: usize = 3;

/// Distance in bytes between two consecutive vertices.
pub const STRIDE: usize = COORDS_PER_VERTEX * mem::size_of::<f32>();

/// A single vertex, laid out exactly as the vertex buffer stores it.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in normalized device coordinates.
    pub position: [f32; COORDS_PER_VERTEX],
}

impl Vertex {
    /// How [`Vertex::position`] is fed into the position attribute.
    pub const POSITION_LAYOUT: AttribLayout = AttribLayout {
        components: COORDS_PER_VERTEX as i32,
        stride: STRIDE as i32,
        offset: 0,
    };

    const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

const _: () = assert!(mem::size_of::<Vertex>() == STRIDE);

const TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.5, 0.5, 0.0),
    Vertex::new(-0.5, -0.5, 0.0),
    Vertex::new(0.5, -0.5, 0.0),
];

/// The triangle: top right, bottom left, bottom right.
pub static TRIANGLE_VERTICES: [Vertex; 3] = TRIANGLE;

/// Number of vertices handed to the draw call.
pub const VERTEX_COUNT: usize = TRIANGLE.len();

const _: () = assert!(VERTEX_COUNT % 3 == 0);

/// The vertex data as a flat list of coordinates.
pub fn coords() -> &'static [f32] {
    bytemuck::cast_slice(&TRIANGLE_VERTICES)
}

/// The vertex data in native byte order, ready to upload.
pub fn vertex_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&TRIANGLE_VERTICES)
}
