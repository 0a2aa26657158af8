// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned scene graph.
//!
//! Nodes live in a slot map and refer to each other by [`NodeKey`]. Each
//! node has a translation relative to its parent; mesh positions are local
//! to the node.

use nalgebra::{Point3, Vector3};
use section_geometry::Mesh;
use slotmap::{new_key_type, SlotMap};

use crate::camera::Ray;
use crate::material::SurfaceMaterial;
use crate::solid::{NodeMetadata, Shape, Solid};

new_key_type! {
    /// Key of a node in a [`SceneGraph`].
    pub struct NodeKey;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { mesh: Mesh, material: SurfaceMaterial },
    /// Wireframe box drawn around other nodes, in world coordinates.
    BoundingBox { min: Point3<f64>, max: Point3<f64>, color: u32 },
    /// Axis helper at the origin.
    OriginMarker { size: f64 },
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub position: Vector3<f64>,
    pub metadata: Option<NodeMetadata>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|metadata| metadata.name.as_str())
    }
}

/// A ray hit on a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeKey,
    pub distance: f64,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    roots: Vec<NodeKey>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent`, or at the top level.
    pub fn add(
        &mut self,
        parent: Option<NodeKey>,
        kind: NodeKind,
        position: Vector3<f64>,
        metadata: Option<NodeMetadata>,
    ) -> NodeKey {
        let parent = parent.filter(|key| self.nodes.contains_key(*key));
        let key = self.nodes.insert(SceneNode {
            kind,
            position,
            metadata,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|key| self.nodes.get_mut(key)) {
            Some(node) => node.children.push(key),
            None => self.roots.push(key),
        }
        key
    }

    /// Insert a solid as a subtree placed at `position` relative to `parent`.
    ///
    /// Solids carry no placement of their own; every caller states where the
    /// subtree goes.
    pub fn insert_solid(&mut self, parent: Option<NodeKey>, solid: Solid, position: Vector3<f64>) -> NodeKey {
        let Solid { shape, metadata } = solid;
        match shape {
            Shape::Mesh { mesh, material } => {
                self.add(parent, NodeKind::Mesh { mesh, material }, position, Some(metadata))
            }
            Shape::Group(children) => {
                let key = self.add(parent, NodeKind::Group, position, Some(metadata));
                for child in children {
                    self.insert_solid(Some(key), child, Vector3::zeros());
                }
                key
            }
        }
    }

    /// Remove a node and everything below it. Returns whether it existed.
    pub fn remove(&mut self, key: NodeKey) -> bool {
        let Some(parent) = self.nodes.get(key).map(|node| node.parent) else {
            return false;
        };
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| *child != key);
                }
            }
            None => self.roots.retain(|root| *root != key),
        }

        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Mutable access to a mesh node's material.
    pub fn material_mut(&mut self, key: NodeKey) -> Option<&mut SurfaceMaterial> {
        match &mut self.nodes.get_mut(key)?.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material(&self, key: NodeKey) -> Option<&SurfaceMaterial> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Sum of translations from the top level down to `key`.
    pub fn world_position(&self, key: NodeKey) -> Vector3<f64> {
        let mut position = Vector3::zeros();
        let mut current = Some(key);
        while let Some(node) = current.and_then(|key| self.nodes.get(key)) {
            position += node.position;
            current = node.parent;
        }
        position
    }

    /// World-space bounds of all mesh geometry at or below `key`.
    pub fn world_bounds(&self, key: NodeKey) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut bounds: Option<(Point3<f64>, Point3<f64>)> = None;
        for (_, offset, mesh) in self.meshes_below(key) {
            if mesh.is_empty() {
                continue;
            }
            let (min, max) = mesh.bounds();
            let min = min.cast::<f64>() + offset;
            let max = max.cast::<f64>() + offset;
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.inf(&min), hi.sup(&max)),
                None => (min, max),
            });
        }
        bounds
    }

    /// Every mesh node in the graph with its world translation.
    pub fn world_meshes(&self) -> Vec<(NodeKey, Vector3<f64>, &Mesh)> {
        self.roots
            .iter()
            .flat_map(|root| self.meshes_below(*root))
            .collect()
    }

    fn meshes_below(&self, key: NodeKey) -> Vec<(NodeKey, Vector3<f64>, &Mesh)> {
        let mut meshes = Vec::new();
        let base = self
            .nodes
            .get(key)
            .and_then(|node| node.parent)
            .map(|parent| self.world_position(parent))
            .unwrap_or_else(Vector3::zeros);

        let mut pending = vec![(key, base)];
        while let Some((next, offset)) = pending.pop() {
            let Some(node) = self.nodes.get(next) else {
                continue;
            };
            let world = offset + node.position;
            if let NodeKind::Mesh { mesh, .. } = &node.kind {
                meshes.push((next, world, mesh));
            }
            for child in node.children.iter().rev() {
                pending.push((*child, world));
            }
        }
        meshes
    }

    /// All mesh nodes hit by `ray`, nearest first. Helpers are never hit.
    pub fn raycast(&self, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (key, offset, mesh) in self.world_meshes() {
            if mesh.is_empty() {
                continue;
            }
            let (min, max) = mesh.bounds();
            if ray
                .intersect_aabb(&(min.cast::<f64>() + offset), &(max.cast::<f64>() + offset))
                .is_none()
            {
                continue;
            }

            let nearest = mesh
                .triangles()
                .filter_map(|[a, b, c]| ray.intersect_triangle(&(a + offset), &(b + offset), &(c + offset)))
                .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t))));
            if let Some(distance) = nearest {
                hits.push(Hit { node: key, distance });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_geometry::box_mesh;

    fn cube(name: &str, size: f64, color: u32) -> Solid {
        Solid::mesh(
            box_mesh(size, size, size),
            SurfaceMaterial::flat(color, 1.0),
            NodeMetadata::centered(name, size, size),
        )
    }

    #[test]
    fn test_insert_solid_builds_subtree() {
        let mut scene = SceneGraph::new();
        let group = Solid::group(vec![cube("a", 1.0, 1), cube("b", 1.0, 2)], NodeMetadata::centered("g", 1.0, 1.0));
        let key = scene.insert_solid(None, group, Vector3::new(0.0, 0.0, 3.0));

        assert_eq!(scene.len(), 3);
        assert_eq!(scene.roots(), &[key]);
        let children = scene.children(key).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(scene.get(children[1]).and_then(SceneNode::name), Some("b"));
        assert_eq!(scene.world_position(children[0]), Vector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_remove_drops_descendants() {
        let mut scene = SceneGraph::new();
        let root = scene.add(None, NodeKind::Group, Vector3::zeros(), None);
        let group = Solid::group(vec![cube("a", 1.0, 1)], NodeMetadata::centered("g", 1.0, 1.0));
        let key = scene.insert_solid(Some(root), group, Vector3::zeros());
        let child = scene.children(key)[0];

        assert!(scene.remove(key));
        assert!(!scene.contains(child));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.len(), 1);
        assert!(!scene.remove(key));
    }

    #[test]
    fn test_world_bounds_follow_parent_translation() {
        let mut scene = SceneGraph::new();
        let root = scene.add(None, NodeKind::Group, Vector3::new(10.0, 0.0, 0.0), None);
        let key = scene.insert_solid(Some(root), cube("a", 2.0, 1), Vector3::new(0.0, 0.0, 5.0));
        let (min, max) = scene.world_bounds(key).unwrap();
        assert!((min - Point3::new(9.0, -1.0, 4.0)).norm() < 1e-5);
        assert!((max - Point3::new(11.0, 1.0, 6.0)).norm() < 1e-5);
        assert_eq!(scene.world_bounds(root), scene.world_bounds(key));
    }

    #[test]
    fn test_raycast_sorts_nearest_first_and_skips_helpers() {
        let mut scene = SceneGraph::new();
        let far = scene.insert_solid(None, cube("far", 2.0, 1), Vector3::new(0.0, 0.0, -10.0));
        let near = scene.insert_solid(None, cube("near", 2.0, 2), Vector3::new(0.0, 0.0, 0.0));
        scene.add(
            None,
            NodeKind::BoundingBox { min: Point3::new(-5.0, -5.0, -20.0), max: Point3::new(5.0, 5.0, 5.0), color: 0xff0000 },
            Vector3::zeros(),
            None,
        );
        scene.add(None, NodeKind::OriginMarker { size: 500.0 }, Vector3::zeros(), None);

        let hits = scene.raycast(&Ray::new(Point3::new(0.0, 0.0, 20.0), -Vector3::z()));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert!((hits[0].distance - 19.0).abs() < 1e-6);
        assert_eq!(hits[1].node, far);

        let miss = scene.raycast(&Ray::new(Point3::new(50.0, 0.0, 20.0), -Vector3::z()));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_material_mut_only_for_meshes() {
        let mut scene = SceneGraph::new();
        let group = scene.add(None, NodeKind::Group, Vector3::zeros(), None);
        let mesh = scene.insert_solid(Some(group), cube("a", 1.0, 0x123456), Vector3::zeros());
        assert!(scene.material_mut(group).is_none());
        scene.material_mut(mesh).unwrap().color = 0xffff00;
        assert_eq!(scene.material(mesh).map(|m| m.color), Some(0xffff00));
    }
}
