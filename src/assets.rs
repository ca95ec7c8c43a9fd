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

//! Loading shader source code by asset name.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the bundled vertex shader.
pub const VERTEX_SHADER_ASSET: &str = "shape/triangle_vertex_shader.glsl";

/// Name of the bundled fragment shader.
pub const FRAGMENT_SHADER_ASSET: &str = "shape/triangle_fragment_shader.glsl";

const BUNDLED: &[(&str, &str)] = &[
    (
        VERTEX_SHADER_ASSET,
        include_str!("../assets/shape/triangle_vertex_shader.glsl"),
    ),
    (
        FRAGMENT_SHADER_ASSET,
        include_str!("../assets/shape/triangle_fragment_shader.glsl"),
    ),
];

/// Somewhere shader source code can be read from.
pub trait AssetSource {
    /// Read the asset called `name` as UTF-8 text.
    fn read_to_string(&self, name: &str) -> Result<String, AssetError>;
}

impl<A: AssetSource + ?Sized> AssetSource for &A {
    fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
        (**self).read_to_string(name)
    }
}

impl<A: AssetSource + ?Sized> AssetSource for Box<A> {
    fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
        (**self).read_to_string(name)
    }
}

/// The shaders that ship inside of the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
        BUNDLED
            .iter()
            .find(|(bundled, _)| *bundled == name)
            .map(|(_, source)| (*source).to_owned())
            .ok_or_else(|| AssetError::new(name, AssetErrorKind::NotFound))
    }
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Read assets relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory assets are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssets {
    fn read_to_string(&self, name: &str) -> Result<String, AssetError> {
        let path = self.root.join(name);
        tracing::debug!("reading asset {}", path.display());

        let bytes = fs::read(&path).map_err(|err| {
            let kind = if err.kind() == io::ErrorKind::NotFound {
                AssetErrorKind::NotFound
            } else {
                AssetErrorKind::Io(err)
            };
            AssetError::new(name, kind)
        })?;

        String::from_utf8(bytes).map_err(|_| AssetError::new(name, AssetErrorKind::InvalidUtf8))
    }
}

/// An asset could not be read.
#[derive(Debug)]
pub struct AssetError {
    name: String,
    kind: AssetErrorKind,
}

#[derive(Debug)]
enum AssetErrorKind {
    NotFound,
    InvalidUtf8,
    Io(io::Error),
}

impl AssetError {
    fn new(name: &str, kind: AssetErrorKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }

    /// The name of the asset that failed to load.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the asset does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, AssetErrorKind::NotFound)
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AssetErrorKind::NotFound => write!(f, "asset `{}` not found", self.name),
            AssetErrorKind::InvalidUtf8 => write!(f, "asset `{}` is not valid UTF-8", self.name),
            AssetErrorKind::Io(err) => write!(f, "failed to read asset `{}`: {err}", self.name),
        }
    }
}

impl StdError for AssetError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            AssetErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}
