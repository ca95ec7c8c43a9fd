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

//! Defines useful resource wrappers.
//!
//! Each wrapper owns one driver handle and releases it when dropped.

use super::error::{Error, ResultExt};
use super::gpu_backend::{GpuContext, ShaderStage};

use std::fmt;
use std::rc::Rc;

macro_rules! define_resource_wrappers {
    ($($name:ident($res:ident, $delete:ident)),* $(,)?) => {
        $(
            #[doc = concat!("An owned [`GpuContext::", stringify!($res), "`].")]
            pub struct $name<C: GpuContext + ?Sized> {
                context: Rc<C>,
                resource: C::$res,
            }

            impl<C: GpuContext + ?Sized> fmt::Debug for $name<C> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name))
                        .finish_non_exhaustive()
                }
            }

            impl<C: GpuContext + ?Sized> $name<C> {
                pub(crate) fn from_raw(context: &Rc<C>, resource: C::$res) -> Self {
                    Self {
                        context: context.clone(),
                        resource,
                    }
                }

                /// Get the underlying handle.
                pub fn resource(&self) -> &C::$res {
                    &self.resource
                }
            }

            impl<C: GpuContext + ?Sized> Drop for $name<C> {
                fn drop(&mut self) {
                    self.context.$delete(&self.resource);
                }
            }
        )*
    };
}

define_resource_wrappers! {
    Shader(Shader, delete_shader),
    Program(Program, delete_program),
    VertexBuffer(VertexBuffer, delete_vertex_buffer),
}

impl<C: GpuContext + ?Sized> Shader<C> {
    pub(crate) fn new(context: &Rc<C>, stage: ShaderStage) -> Result<Self, Error> {
        let resource = context.create_shader(stage).gpu_err()?;
        Ok(Self::from_raw(context, resource))
    }
}

impl<C: GpuContext + ?Sized> Program<C> {
    pub(crate) fn new(context: &Rc<C>) -> Result<Self, Error> {
        let resource = context.create_program().gpu_err()?;
        Ok(Self::from_raw(context, resource))
    }
}

impl<C: GpuContext + ?Sized> VertexBuffer<C> {
    pub(crate) fn new(context: &Rc<C>, data: &[u8]) -> Result<Self, Error> {
        let resource = context.create_vertex_buffer(data).gpu_err()?;
        Ok(Self::from_raw(context, resource))
    }
}
