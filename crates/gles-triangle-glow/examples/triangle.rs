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

//! Draws a white triangle on a black background.
//!
//! Set `GLES_TRIANGLE_ASSETS` to a directory to load the shaders from disk instead of the
//! copies built into the binary.

#[path = "util/setup_context.rs"]
mod util;

use gles_triangle::{AssetSource, DirAssets, EmbeddedAssets, RendererConfig};

const ASSET_DIR_VAR: &str = "GLES_TRIANGLE_ASSETS";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let assets: Box<dyn AssetSource> = match std::env::var_os(ASSET_DIR_VAR) {
        Some(dir) => {
            let assets = DirAssets::new(dir);
            tracing::info!("loading shaders from {}", assets.root().display());
            Box::new(assets)
        }
        None => Box::new(EmbeddedAssets),
    };

    util::with_renderer(assets, RendererConfig::default())
}
