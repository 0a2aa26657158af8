// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized, fully populated assembly tree.

use crate::config::{ElementDefaults, Options};
use crate::model::Offset;

/// Flat surface appearance declared for an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: u32,
    pub opacity: f64,
    pub texture: Option<String>,
}

/// Repeating cell of a unitized element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    pub width: f64,
    pub height: f64,
}

/// What an element is, and the fields only that kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    /// Continuous sheet spanning the assembly footprint.
    Sheet,
    /// Cells tiled over the assembly footprint.
    Unit(UnitCell),
    Frame,
    Infill,
    /// Air gap; always drawn with the translucent void material.
    Void,
}

impl ElementKind {
    /// Model tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Sheet => "sheet",
            ElementKind::Unit(_) => "unit",
            ElementKind::Frame => "frame",
            ElementKind::Infill => "infill",
            ElementKind::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
    pub thickness: f64,
    pub max_layer_thickness: f64,
    pub offset: Offset,
    pub material: Material,
    pub transparency: f64,
    pub construction_plane: f64,
}

impl Element {
    /// Thickness left after the front and back offsets are carved away.
    pub fn carved_thickness(&self) -> f64 {
        self.thickness - self.offset.front - self.offset.back
    }

    /// Width left after the left and right offsets are carved away.
    pub fn carved_width(&self, width: f64) -> f64 {
        width - self.offset.left - self.offset.right
    }

    /// Height left after the top and bottom offsets are carved away.
    pub fn carved_height(&self, height: f64) -> f64 {
        height - self.offset.top - self.offset.bottom
    }
}

/// One stacking unit, or a member of a subassembly.
///
/// Group members are ordered: the first member is the base that every later
/// member is punched out of.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Element(Element),
    Group(Vec<Layer>),
}

impl Layer {
    /// Declared thickness: the element's own, or the thickest member of a group.
    pub fn thickness(&self) -> f64 {
        match self {
            Layer::Element(element) => element.thickness,
            Layer::Group(members) => members.iter().map(Layer::thickness).fold(0.0, f64::max),
        }
    }

    /// Name used for scene metadata; groups get one derived from their members.
    pub fn display_name(&self) -> String {
        match self {
            Layer::Element(element) => element.name.clone(),
            Layer::Group(members) => {
                let names: Vec<String> = members.iter().map(Layer::display_name).collect();
                format!("subassembly({})", names.join(", "))
            }
        }
    }
}

/// A normalized model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub layers: Vec<Layer>,
}

/// Footprint every layer is laid out in and clipped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyFrame {
    pub width: f64,
    pub height: f64,
    pub max_layer_thickness: f64,
}

impl AssemblyFrame {
    pub fn from_options(options: &Options) -> Self {
        Self::from_defaults(&options.default_element)
    }

    pub fn from_defaults(element: &ElementDefaults) -> Self {
        Self {
            width: element.width,
            height: element.height,
            max_layer_thickness: element.max_layer_thickness,
        }
    }
}
