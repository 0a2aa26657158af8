// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface material resolution.
//!
//! Textures are optional. When a texture cannot be loaded the material
//! degrades to its flat color; a build never fails because of a texture.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::assembly::Material;
use crate::error::{Error, Result};

/// Color and opacity of void (air gap) elements.
pub const VOID_COLOR: u32 = 0x9999ff;
pub const VOID_OPACITY: f32 = 0.1;

/// A loaded texture, identified by its resolved location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureHandle {
    pub reference: String,
    pub path: PathBuf,
}

/// Renderable surface description attached to a mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub color: u32,
    pub opacity: f32,
    pub transparent: bool,
    pub texture: Option<TextureHandle>,
    pub double_sided: bool,
}

impl SurfaceMaterial {
    /// Flat, untextured material.
    pub fn flat(color: u32, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: opacity < 1.0,
            texture: None,
            double_sided: true,
        }
    }

    /// Color as linear RGB in `0.0..=1.0`.
    pub fn rgb(&self) -> [f32; 3] {
        [
            ((self.color >> 16) & 0xff) as f32 / 255.0,
            ((self.color >> 8) & 0xff) as f32 / 255.0,
            (self.color & 0xff) as f32 / 255.0,
        ]
    }
}

/// Source of texture images.
pub trait TextureLoader {
    fn load(&self, reference: &str) -> Result<TextureHandle>;
}

/// Loads textures from the local filesystem, relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsTextureLoader {
    root: PathBuf,
}

impl FsTextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextureLoader for FsTextureLoader {
    fn load(&self, reference: &str) -> Result<TextureHandle> {
        let path = self.root.join(reference);
        let metadata = std::fs::metadata(&path).map_err(|err| Error::MaterialLoad {
            reference: reference.to_string(),
            reason: err.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(Error::MaterialLoad {
                reference: reference.to_string(),
                reason: "not a file".to_string(),
            });
        }
        Ok(TextureHandle {
            reference: reference.to_string(),
            path,
        })
    }
}

/// Turns declared element materials into surface materials.
pub struct MaterialLibrary {
    loader: Box<dyn TextureLoader>,
}

impl MaterialLibrary {
    pub fn new(loader: Box<dyn TextureLoader>) -> Self {
        Self { loader }
    }

    pub fn resolve(&self, material: &Material) -> SurfaceMaterial {
        let mut surface = SurfaceMaterial::flat(material.color, material.opacity as f32);
        if let Some(reference) = &material.texture {
            match self.loader.load(reference) {
                Ok(handle) => surface.texture = Some(handle),
                Err(err) => warn!(error = %err, "falling back to flat color material"),
            }
        }
        surface
    }

    pub fn void_material(&self) -> SurfaceMaterial {
        SurfaceMaterial::flat(VOID_COLOR, VOID_OPACITY)
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new(Box::new(FsTextureLoader::default()))
    }
}

impl std::fmt::Debug for MaterialLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialLibrary").finish_non_exhaustive()
    }
}
