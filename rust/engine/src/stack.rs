// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stacks layers along +Z, starting at the construction plane.

use nalgebra::Vector3;
use serde::Serialize;
use tracing::debug;

use crate::assembly::{Assembly, AssemblyFrame, Layer};
use crate::compositor::SubassemblyCompositor;
use crate::config::Options;
use crate::error::Result;
use crate::material::MaterialLibrary;
use crate::scene::{NodeKey, NodeKind, SceneGraph};
use crate::solid::NodeMetadata;

pub const LAYER_BOUNDING_BOX_COLOR: u32 = 0xff0000;
pub const ASSEMBLY_BOUNDING_BOX_COLOR: u32 = 0xfdc00d;

/// Stacking thickness of a layer: its declared thickness, never below `min`.
pub fn effective_thickness(layer: &Layer, min: f64) -> f64 {
    layer.thickness().max(min)
}

/// Where one layer sits in the stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPlacement {
    pub index: usize,
    pub name: String,
    pub thickness: f64,
    /// Z of the layer's mid-plane.
    pub center_z: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackLayout {
    pub placements: Vec<LayerPlacement>,
    pub total_thickness: f64,
}

pub struct LayerStackBuilder<'a> {
    options: &'a Options,
    materials: &'a MaterialLibrary,
}

impl<'a> LayerStackBuilder<'a> {
    pub fn new(options: &'a Options, materials: &'a MaterialLibrary) -> Self {
        Self { options, materials }
    }

    /// Layer positions without building any geometry.
    pub fn layout(&self, assembly: &Assembly) -> StackLayout {
        let mut z = 0.0;
        let placements = assembly
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let thickness = effective_thickness(layer, self.options.min_thickness);
                let center_z = z + thickness / 2.0;
                z += thickness;
                LayerPlacement {
                    index,
                    name: layer.display_name(),
                    thickness,
                    center_z,
                }
            })
            .collect();
        StackLayout {
            placements,
            total_thickness: z,
        }
    }

    /// Build every layer into `scene` under a new root group at the origin.
    ///
    /// Bounding box helpers are added at the top level of the scene, in world
    /// coordinates, when the options ask for them.
    pub fn build(&self, assembly: &Assembly, scene: &mut SceneGraph) -> Result<NodeKey> {
        let frame = AssemblyFrame::from_options(self.options);
        let compositor = SubassemblyCompositor::new(frame, self.materials, self.options.debug);
        let layout = self.layout(assembly);

        let root = scene.add(
            None,
            NodeKind::Group,
            Vector3::zeros(),
            Some(NodeMetadata::centered("assembly", frame.width, frame.height)),
        );

        for (layer, placement) in assembly.layers.iter().zip(&layout.placements) {
            let solid = compositor.resolve(layer)?;
            debug!(
                layer = placement.index,
                name = %placement.name,
                thickness = placement.thickness,
                z = placement.center_z,
                "placing layer"
            );
            let key = scene.insert_solid(Some(root), solid, Vector3::new(0.0, 0.0, placement.center_z));

            if self.options.show_layer_bounding_box {
                if let Some((min, max)) = scene.world_bounds(key) {
                    scene.add(
                        None,
                        NodeKind::BoundingBox { min, max, color: LAYER_BOUNDING_BOX_COLOR },
                        Vector3::zeros(),
                        None,
                    );
                }
            }
        }

        if self.options.show_assembly_bounding_box {
            if let Some((min, max)) = scene.world_bounds(root) {
                scene.add(
                    None,
                    NodeKind::BoundingBox { min, max, color: ASSEMBLY_BOUNDING_BOX_COLOR },
                    Vector3::zeros(),
                    None,
                );
            }
        }

        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Element, ElementKind, Material};
    use crate::model::Offset;

    fn sheet(name: &str, thickness: f64) -> Layer {
        Layer::Element(Element {
            name: name.to_string(),
            kind: ElementKind::Sheet,
            thickness,
            max_layer_thickness: 1000.0,
            offset: Offset::default(),
            material: Material { color: 0xcccccc, opacity: 1.0, texture: None },
            transparency: 1.0,
            construction_plane: 90.0,
        })
    }

    #[test]
    fn test_layout_stacks_from_zero() {
        let options = Options::default();
        let library = MaterialLibrary::default();
        let assembly = Assembly {
            layers: vec![
                sheet("a", 10.0),
                Layer::Group(vec![sheet("b", 5.0), sheet("c", 20.0)]),
                sheet("d", 8.0),
            ],
        };

        let layout = LayerStackBuilder::new(&options, &library).layout(&assembly);
        let centers: Vec<f64> = layout.placements.iter().map(|p| p.center_z).collect();
        assert_eq!(centers, vec![5.0, 20.0, 34.0]);
        assert_eq!(layout.total_thickness, 38.0);
        assert_eq!(layout.placements[1].thickness, 20.0);
    }

    #[test]
    fn test_thin_layers_are_clamped() {
        let options = Options::default();
        let library = MaterialLibrary::default();
        let assembly = Assembly { layers: vec![sheet("film", 1.0), sheet("board", 10.0)] };
        let layout = LayerStackBuilder::new(&options, &library).layout(&assembly);
        assert_eq!(layout.placements[0].thickness, 5.0);
        assert_eq!(layout.placements[1].center_z, 10.0);
    }

    #[test]
    fn test_empty_assembly_builds_empty_root() {
        let options = Options::default();
        let library = MaterialLibrary::default();
        let mut scene = SceneGraph::new();
        let root = LayerStackBuilder::new(&options, &library)
            .build(&Assembly::default(), &mut scene)
            .unwrap();
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(root).map(|node| node.position), Some(Vector3::zeros()));
    }

    #[test]
    fn test_build_adds_bounding_boxes() {
        let options = Options::default();
        let library = MaterialLibrary::default();
        let mut scene = SceneGraph::new();
        let assembly = Assembly { layers: vec![sheet("a", 10.0), sheet("b", 20.0)] };
        let root = LayerStackBuilder::new(&options, &library)
            .build(&assembly, &mut scene)
            .unwrap();

        let boxes: Vec<u32> = scene
            .roots()
            .iter()
            .filter_map(|key| match scene.get(*key).map(|node| &node.kind) {
                Some(NodeKind::BoundingBox { color, .. }) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(boxes, vec![LAYER_BOUNDING_BOX_COLOR, LAYER_BOUNDING_BOX_COLOR, ASSEMBLY_BOUNDING_BOX_COLOR]);

        let (min, max) = scene.world_bounds(root).unwrap();
        assert!(min.z.abs() < 1e-4 && (max.z - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_bounding_boxes_are_optional() {
        let options = Options {
            show_layer_bounding_box: false,
            show_assembly_bounding_box: false,
            ..Options::default()
        };
        let library = MaterialLibrary::default();
        let mut scene = SceneGraph::new();
        let assembly = Assembly { layers: vec![sheet("a", 10.0)] };
        LayerStackBuilder::new(&options, &library)
            .build(&assembly, &mut scene)
            .unwrap();
        assert_eq!(scene.roots().len(), 1);
    }
}
