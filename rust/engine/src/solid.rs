// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unplaced solids produced while compositing layers.
//!
//! A [`Solid`] carries geometry in its own local frame and no position.
//! Placement is decided by whoever inserts it into the scene.

use section_geometry::{Mesh, Point3, Vector3};

use crate::material::SurfaceMaterial;

/// Footprint bookkeeping carried with a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetadata {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// Distance from the footprint's left edge to the local origin.
    pub offset_x: f64,
    /// Distance from the footprint's bottom edge to the local origin.
    pub offset_y: f64,
}

impl NodeMetadata {
    /// Metadata for geometry centered on its local origin.
    pub fn centered(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            offset_x: width / 2.0,
            offset_y: height / 2.0,
        }
    }

    /// Translation that moves the footprint's center onto the local origin.
    pub fn anchor(&self) -> Vector3<f64> {
        Vector3::new(
            -(self.width / 2.0) + self.offset_x,
            -(self.height / 2.0) + self.offset_y,
            0.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Mesh { mesh: Mesh, material: SurfaceMaterial },
    Group(Vec<Solid>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub shape: Shape,
    pub metadata: NodeMetadata,
}

impl Solid {
    pub fn mesh(mesh: Mesh, material: SurfaceMaterial, metadata: NodeMetadata) -> Self {
        Self {
            shape: Shape::Mesh { mesh, material },
            metadata,
        }
    }

    pub fn group(children: Vec<Solid>, metadata: NodeMetadata) -> Self {
        Self {
            shape: Shape::Group(children),
            metadata,
        }
    }

    /// Copy with all geometry moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Solid {
        let shape = match &self.shape {
            Shape::Mesh { mesh, material } => Shape::Mesh {
                mesh: mesh.translated(offset),
                material: material.clone(),
            },
            Shape::Group(children) => {
                Shape::Group(children.iter().map(|child| child.translated(offset)).collect())
            }
        };
        Solid {
            shape,
            metadata: self.metadata.clone(),
        }
    }

    /// All meshes of this solid merged into one buffer.
    pub fn flatten(&self) -> Mesh {
        let mut merged = Mesh::new();
        self.collect_into(&mut merged);
        merged
    }

    fn collect_into(&self, merged: &mut Mesh) {
        match &self.shape {
            Shape::Mesh { mesh, .. } => merged.merge(mesh),
            Shape::Group(children) => {
                for child in children {
                    child.collect_into(merged);
                }
            }
        }
    }

    /// Axis-aligned bounds of all geometry, `None` when there is none.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let flat = self.flatten();
        if flat.is_empty() {
            return None;
        }
        let (min, max) = flat.bounds();
        Some((min.cast::<f64>(), max.cast::<f64>()))
    }

    pub fn is_empty(&self) -> bool {
        match &self.shape {
            Shape::Mesh { mesh, .. } => mesh.is_empty(),
            Shape::Group(children) => children.iter().all(Solid::is_empty),
        }
    }
}
