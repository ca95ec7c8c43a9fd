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

//! Error types.

use crate::assets::AssetError;
use crate::gpu_backend::ShaderStage;

use std::error::Error as StdError;
use std::fmt;

/// An error that can occur while setting up or driving the renderer.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A shader asset could not be read.
    Asset(AssetError),

    /// A shader failed to compile.
    Compile {
        /// The stage of the shader that failed.
        stage: ShaderStage,

        /// The info log reported by the driver.
        log: String,
    },

    /// The shader program failed to link.
    Link(String),

    /// The linked program has no active attribute with this name.
    MissingAttribute(String),

    /// The linked program has no active uniform with this name.
    MissingUniform(String),

    /// The context does not provide the programmable pipeline.
    UnsupportedVersion {
        /// The major version reported by the driver.
        major: u32,

        /// The minor version reported by the driver.
        minor: u32,

        /// Whether this is an OpenGL ES context.
        embedded: bool,
    },

    /// A frame was requested before the surface was created.
    NotCreated,

    /// The GPU backend reported an error.
    Backend(Box<dyn StdError + 'static>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Asset(err) => write!(f, "failed to load shader asset: {err}"),
            Error::Compile { stage, log } => {
                write!(f, "failed to compile {stage} shader: {}", log.trim_end())
            }
            Error::Link(log) => write!(f, "failed to link program: {}", log.trim_end()),
            Error::MissingAttribute(name) => write!(f, "no active attribute named `{name}`"),
            Error::MissingUniform(name) => write!(f, "no active uniform named `{name}`"),
            Error::UnsupportedVersion {
                major,
                minor,
                embedded,
            } => {
                let api = if *embedded { "OpenGL ES" } else { "OpenGL" };
                write!(
                    f,
                    "{api} {major}.{minor} does not support OpenGL ES 2.0 shaders"
                )
            }
            Error::NotCreated => f.write_str("the surface has not been created yet"),
            Error::Backend(err) => write!(f, "gpu backend error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Asset(err) => Some(err),
            Error::Backend(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<AssetError> for Error {
    fn from(err: AssetError) -> Self {
        Error::Asset(err)
    }
}

pub(crate) trait ResultExt<T> {
    fn gpu_err(self) -> Result<T, Error>;
}

impl<T, E: StdError + 'static> ResultExt<T> for Result<T, E> {
    fn gpu_err(self) -> Result<T, Error> {
        self.map_err(|err| Error::Backend(Box::new(err)))
    }
}
