// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Section Engine
//!
//! Compiles a layered architectural assembly model into a scene of solids
//! stacked along +Z, and keeps a hover highlight on whatever solid the
//! pointer is over.
//!
//! ## Overview
//!
//! - **Normalization**: missing element attributes are filled from the
//!   configured defaults, then the model becomes a typed [`Assembly`]
//! - **Compositing**: each layer resolves into one solid; subassemblies are
//!   clipped to the assembly footprint and punched out by their first member
//! - **Tiling**: unitized elements are laid out as a grid of cells
//! - **Selection**: a pick ray from the camera drives an explicit
//!   [`SelectionState`] machine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use section_engine::{Model, Options, SectionEngine, Viewport};
//!
//! let model = Model::from_json(r#"{"layers": [
//!     {"name": "gypsum", "thickness": 13},
//!     [{"name": "studs", "type": "unit", "width": 400, "thickness": 90},
//!      {"name": "insulation", "type": "infill", "thickness": 90}]
//! ]}"#)?;
//! let mut engine = SectionEngine::new(Viewport::new(800.0, 600.0), model, Options::default())?;
//! let root = engine.build()?;
//! println!("{} nodes", engine.scene().len());
//! ```

pub mod assembly;
pub mod boolean;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod material;
pub mod model;
pub mod normalize;
pub mod scene;
pub mod selection;
pub mod solid;
pub mod stack;
pub mod tiling;

pub use assembly::{Assembly, AssemblyFrame, Element, ElementKind, Layer, Material, UnitCell};
pub use boolean::SolidBooleanOps;
pub use camera::{Camera, Pointer, Ray};
pub use compositor::SubassemblyCompositor;
pub use config::{ElementDefaults, Options};
pub use engine::{Event, Handler, SectionEngine, Viewport};
pub use error::{Error, Result};
pub use material::{FsTextureLoader, MaterialLibrary, SurfaceMaterial, TextureHandle, TextureLoader};
pub use model::{MaterialSpec, Model, Offset, RawElement, RawLayer, RawOffset};
pub use normalize::{apply_defaults, ModelNormalizer};
pub use scene::{Hit, NodeKey, NodeKind, SceneGraph, SceneNode};
pub use selection::{SelectionChange, SelectionController, SelectionState};
pub use solid::{NodeMetadata, Shape, Solid};
pub use stack::{effective_thickness, LayerPlacement, LayerStackBuilder, StackLayout};
pub use tiling::{TileGrid, TileGridLayout, MAX_TILE_CELLS};
