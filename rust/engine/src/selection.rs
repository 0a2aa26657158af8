// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pointer hover highlighting.
//!
//! At most one node is highlighted. Its original color is held in the
//! [`SelectionState::Hovering`] state and written back when the pointer
//! leaves it, so every highlight is paired with exactly one restore.

use crate::camera::{Camera, Pointer};
use crate::config::Options;
use crate::scene::{NodeKey, SceneGraph};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Hovering { node: NodeKey, saved_color: u32 },
}

/// What a tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    None,
    Selected(NodeKey),
    Switched { from: NodeKey, to: NodeKey },
    Cleared(NodeKey),
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    state: SelectionState,
    highlight_color: u32,
}

impl SelectionController {
    pub fn new(options: &Options) -> Self {
        Self {
            state: SelectionState::Idle,
            highlight_color: options.selected_material_color,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Currently highlighted node, if any.
    pub fn selected(&self) -> Option<NodeKey> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Hovering { node, .. } => Some(node),
        }
    }

    /// Hit test the pointer and update the highlight.
    pub fn tick(&mut self, scene: &mut SceneGraph, camera: &Camera, pointer: &Pointer) -> SelectionChange {
        let hit = scene.raycast(&camera.ray(pointer)).first().map(|hit| hit.node);
        self.update(scene, hit)
    }

    /// Move to the state for the nearest hit `hit`.
    pub fn update(&mut self, scene: &mut SceneGraph, hit: Option<NodeKey>) -> SelectionChange {
        match (self.state, hit) {
            (SelectionState::Idle, None) => SelectionChange::None,
            (SelectionState::Hovering { node, .. }, Some(target)) if node == target => SelectionChange::None,
            (SelectionState::Idle, Some(target)) => {
                if self.highlight(scene, target) {
                    SelectionChange::Selected(target)
                } else {
                    SelectionChange::None
                }
            }
            (SelectionState::Hovering { node, saved_color }, Some(target)) => {
                restore(scene, node, saved_color);
                self.state = SelectionState::Idle;
                if self.highlight(scene, target) {
                    SelectionChange::Switched { from: node, to: target }
                } else {
                    SelectionChange::Cleared(node)
                }
            }
            (SelectionState::Hovering { node, saved_color }, None) => {
                restore(scene, node, saved_color);
                self.state = SelectionState::Idle;
                SelectionChange::Cleared(node)
            }
        }
    }

    /// Restore any highlighted node and go idle.
    pub fn reset(&mut self, scene: &mut SceneGraph) {
        if let SelectionState::Hovering { node, saved_color } = self.state {
            restore(scene, node, saved_color);
        }
        self.state = SelectionState::Idle;
    }

    /// Forget the highlighted node without touching the scene; used when the
    /// scene it lived in is discarded.
    pub(crate) fn forget(&mut self) {
        self.state = SelectionState::Idle;
    }

    fn highlight(&mut self, scene: &mut SceneGraph, target: NodeKey) -> bool {
        let Some(material) = scene.material_mut(target) else {
            return false;
        };
        self.state = SelectionState::Hovering {
            node: target,
            saved_color: material.color,
        };
        material.color = self.highlight_color;
        true
    }
}

fn restore(scene: &mut SceneGraph, node: NodeKey, saved_color: u32) {
    if let Some(material) = scene.material_mut(node) {
        material.color = saved_color;
    }
}
