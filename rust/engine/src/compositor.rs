// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolves one layer into a single solid.
//!
//! Elements become boxes (or tile grids for unitized elements). A
//! subassembly is resolved member by member: each member is centered on the
//! footprint, clipped to the assembly's maximum bounding volume, and every
//! member after the first has the first member's volume punched out of it.

use section_geometry::box_mesh;
use tracing::debug;

use crate::assembly::{AssemblyFrame, Element, ElementKind, Layer};
use crate::boolean::SolidBooleanOps;
use crate::error::{Error, Result};
use crate::material::MaterialLibrary;
use crate::solid::{NodeMetadata, Solid};
use crate::tiling::TileGridLayout;

pub struct SubassemblyCompositor<'a> {
    frame: AssemblyFrame,
    materials: &'a MaterialLibrary,
    booleans: SolidBooleanOps,
    tiles: TileGridLayout,
}

impl<'a> SubassemblyCompositor<'a> {
    pub fn new(frame: AssemblyFrame, materials: &'a MaterialLibrary, debug: bool) -> Self {
        Self {
            frame,
            materials,
            booleans: SolidBooleanOps::new(),
            tiles: TileGridLayout::new(frame, debug),
        }
    }

    pub fn resolve(&self, layer: &Layer) -> Result<Solid> {
        match layer {
            Layer::Element(element) => self.resolve_element(element),
            Layer::Group(members) => self.resolve_group(members, layer.display_name()),
        }
    }

    fn resolve_element(&self, element: &Element) -> Result<Solid> {
        let material = match element.kind {
            ElementKind::Void => self.materials.void_material(),
            _ => self.materials.resolve(&element.material),
        };

        match &element.kind {
            ElementKind::Unit(cell) => self.tiles.build_unitized(element, cell, material),
            ElementKind::Sheet | ElementKind::Frame | ElementKind::Infill | ElementKind::Void => {
                let mesh = box_mesh(self.frame.width, self.frame.height, element.carved_thickness());
                Ok(Solid::mesh(
                    mesh,
                    material,
                    NodeMetadata::centered(element.name.clone(), self.frame.width, self.frame.height),
                ))
            }
        }
    }

    fn resolve_group(&self, members: &[Layer], name: String) -> Result<Solid> {
        if members.is_empty() {
            return Err(Error::malformed(format!("{name} has no members")));
        }

        let clip = self.clipping_solid();
        let mut clipped = Vec::with_capacity(members.len());
        for member in members {
            let resolved = self.resolve(member)?;
            let centered = resolved.translated(&resolved.metadata.anchor());
            let mut result = self.booleans.intersect(&centered, &clip);
            result.metadata =
                NodeMetadata::centered(resolved.metadata.name, self.frame.width, self.frame.height);
            clipped.push(result);
        }

        let mut clipped = clipped.into_iter();
        let Some(base) = clipped.next() else {
            return Err(Error::malformed(format!("{name} has no members")));
        };

        let punched: Vec<Solid> = clipped
            .map(|member| {
                debug!(member = %member.metadata.name, base = %base.metadata.name, "punching out base volume");
                self.booleans.subtract(&member, &base)
            })
            .collect();

        let metadata = NodeMetadata::centered(name, self.frame.width, self.frame.height);
        if punched.is_empty() {
            return Ok(Solid { metadata, ..base });
        }

        let mut children = Vec::with_capacity(punched.len() + 1);
        children.push(base);
        children.extend(punched);
        Ok(Solid::group(children, metadata))
    }

    /// Maximum volume any layer may occupy, centered on the local origin.
    fn clipping_solid(&self) -> Solid {
        Solid::mesh(
            box_mesh(self.frame.width, self.frame.height, self.frame.max_layer_thickness),
            self.materials.void_material(),
            NodeMetadata::centered("clip", self.frame.width, self.frame.height),
        )
    }
}
