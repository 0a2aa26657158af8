// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host-facing engine.
//!
//! A [`SectionEngine`] owns one model, its options, the scene built from
//! them, the camera and the selection state. Everything the engine touches
//! lives in this value; there is no global state.

use nalgebra::Vector3;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::assembly::{Assembly, AssemblyFrame};
use crate::camera::{Camera, Pointer};
use crate::config::Options;
use crate::error::Result;
use crate::material::{MaterialLibrary, TextureLoader};
use crate::model::Model;
use crate::normalize::ModelNormalizer;
use crate::scene::{NodeKey, NodeKind, SceneGraph};
use crate::selection::{SelectionChange, SelectionController};
use crate::stack::{LayerStackBuilder, StackLayout};

/// Axis helper length.
pub const ORIGIN_MARKER_SIZE: f64 = 500.0;

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Payload handed to registered handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
}

pub type Handler = Box<dyn FnMut(&Event)>;

pub struct SectionEngine {
    viewport: Viewport,
    options: Options,
    model: Model,
    assembly: Option<Assembly>,
    materials: MaterialLibrary,
    scene: SceneGraph,
    root: Option<NodeKey>,
    camera: Camera,
    pointer: Pointer,
    selection: SelectionController,
    handlers: FxHashMap<String, Vec<Handler>>,
}

impl SectionEngine {
    /// Set up engine state for `model`. Geometry is not built until
    /// [`SectionEngine::build`].
    pub fn new(viewport: Viewport, model: Model, options: Options) -> Result<Self> {
        options.validate()?;
        let frame = AssemblyFrame::from_options(&options);
        let camera = Camera::framing(&frame, viewport.aspect());
        let selection = SelectionController::new(&options);

        let mut engine = Self {
            viewport,
            options,
            model,
            assembly: None,
            materials: MaterialLibrary::default(),
            scene: SceneGraph::new(),
            root: None,
            camera,
            pointer: Pointer::default(),
            selection,
            handlers: FxHashMap::default(),
        };
        add_helpers(&engine.options, &mut engine.scene);
        Ok(engine)
    }

    /// Replace the texture source used when resolving materials.
    pub fn with_texture_loader(mut self, loader: Box<dyn TextureLoader>) -> Self {
        self.materials = MaterialLibrary::new(loader);
        self
    }

    /// Populate the scene from the model.
    ///
    /// The model is normalized on the first call only. On error the scene is
    /// left exactly as it was before the call.
    pub fn build(&mut self) -> Result<NodeKey> {
        let assembly = self.normalized()?;

        let mut staged = SceneGraph::new();
        add_helpers(&self.options, &mut staged);
        let root = LayerStackBuilder::new(&self.options, &self.materials).build(&assembly, &mut staged)?;

        self.selection.forget();
        self.scene = staged;
        self.root = Some(root);
        info!(layers = assembly.layers.len(), nodes = self.scene.len(), "section built");
        Ok(root)
    }

    /// Layer placement report; normalizes the model if needed.
    pub fn layout(&mut self) -> Result<StackLayout> {
        let assembly = self.normalized()?;
        Ok(LayerStackBuilder::new(&self.options, &self.materials).layout(&assembly))
    }

    fn normalized(&mut self) -> Result<Assembly> {
        if let Some(assembly) = &self.assembly {
            return Ok(assembly.clone());
        }
        let normalizer = ModelNormalizer::new(self.options.default_element.clone());
        let assembly = normalizer.normalize(&mut self.model)?;
        debug!(layers = assembly.layers.len(), "model normalized");
        self.assembly = Some(assembly.clone());
        Ok(assembly)
    }

    /// Register a handler for `event`. Handlers accumulate per event name.
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.handlers.entry(event.into()).or_default().push(Box::new(handler));
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Set the pointer in normalized device coordinates.
    pub fn set_pointer(&mut self, pointer: Pointer) {
        self.pointer = pointer;
    }

    /// Set the pointer from client pixel coordinates within the viewport.
    pub fn set_pointer_client(&mut self, client_x: f64, client_y: f64) {
        self.pointer = Pointer::from_client(client_x, client_y, self.viewport.width, self.viewport.height);
    }

    /// One frame of work: hover selection when enabled.
    pub fn tick(&mut self) -> SelectionChange {
        if !self.options.enable_selection {
            return SelectionChange::None;
        }
        self.selection.tick(&mut self.scene, &self.camera, &self.pointer)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
    }

    /// Remove every node from the scene.
    pub fn clear(&mut self) {
        self.selection.forget();
        self.scene.clear();
        self.root = None;
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn assembly(&self) -> Option<&Assembly> {
        self.assembly.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }
}

fn add_helpers(options: &Options, scene: &mut SceneGraph) {
    if options.show_origin_marker {
        scene.add(
            None,
            NodeKind::OriginMarker { size: ORIGIN_MARKER_SIZE },
            Vector3::zeros(),
            None,
        );
    }
}

impl std::fmt::Debug for SectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionEngine")
            .field("viewport", &self.viewport)
            .field("options", &self.options)
            .field("nodes", &self.scene.len())
            .field("root", &self.root)
            .field("selection", &self.selection.state())
            .finish_non_exhaustive()
    }
}
