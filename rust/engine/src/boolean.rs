// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid-level booleans over meshes and groups.
//!
//! Results are geometry in the operands' shared frame. Nothing about where
//! an operand was placed survives; callers translate operands into a common
//! frame before combining them and place the result explicitly.

use section_geometry::SolidOps;

use crate::solid::{Shape, Solid};

#[derive(Debug, Clone, Default)]
pub struct SolidBooleanOps {
    ops: SolidOps,
}

impl SolidBooleanOps {
    pub fn new() -> Self {
        Self { ops: SolidOps::new() }
    }

    /// Volume common to `a` and `b`. Group operands are intersected child
    /// by child and keep their structure and metadata.
    pub fn intersect(&self, a: &Solid, b: &Solid) -> Solid {
        let clip = b.flatten();
        self.map_meshes(a, &|mesh| self.ops.intersect(mesh, &clip))
    }

    /// `a` with the volume of `b` removed.
    pub fn subtract(&self, a: &Solid, b: &Solid) -> Solid {
        let cutter = b.flatten();
        self.map_meshes(a, &|mesh| self.ops.subtract(mesh, &cutter))
    }

    fn map_meshes(
        &self,
        solid: &Solid,
        op: &dyn Fn(&section_geometry::Mesh) -> section_geometry::Mesh,
    ) -> Solid {
        let shape = match &solid.shape {
            Shape::Mesh { mesh, material } => Shape::Mesh {
                mesh: op(mesh),
                material: material.clone(),
            },
            Shape::Group(children) => Shape::Group(
                children
                    .iter()
                    .map(|child| self.map_meshes(child, op))
                    .collect(),
            ),
        };
        Solid {
            shape,
            metadata: solid.metadata.clone(),
        }
    }
}
