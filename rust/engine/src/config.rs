// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine options.
//!
//! Options are a camelCase JSON object. Any subset of the recognized keys
//! may be given; everything else keeps its built-in default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{MaterialSpec, Offset};

/// Attribute values given to any element that does not declare them.
///
/// `width` and `height` double as the assembly footprint: non-unit elements
/// span it, and every subassembly is clipped to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementDefaults {
    pub name: String,
    /// Degrees around the X axis.
    pub construction_plane: f64,
    pub height: f64,
    pub width: f64,
    pub thickness: f64,
    pub max_layer_thickness: f64,
    pub color: u32,
    pub opacity: f64,
    pub material: Option<MaterialSpec>,
    pub transparency: f64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub offset: Offset,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self {
            name: "element".to_string(),
            construction_plane: 90.0,
            height: 500.0,
            width: 500.0,
            thickness: 10.0,
            max_layer_thickness: 1000.0,
            color: 0xcccccc,
            opacity: 1.0,
            material: None,
            transparency: 1.0,
            element_type: "sheet".to_string(),
            offset: Offset::default(),
        }
    }
}

/// Engine configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Scene clear color.
    pub background: u32,
    /// Log layout details (tile grid sizes) while building.
    pub debug: bool,
    pub default_element: ElementDefaults,
    /// Run pointer hit testing on every tick.
    pub enable_selection: bool,
    /// Target frame rate for the host's animation loop.
    pub fps: u32,
    /// Floor for every layer's stacking thickness.
    pub min_thickness: f64,
    pub selected_material_color: u32,
    pub selected_material_opacity: f32,
    pub show_assembly_bounding_box: bool,
    pub show_layer_bounding_box: bool,
    pub show_origin_marker: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            background: 0xffffff,
            debug: false,
            default_element: ElementDefaults::default(),
            enable_selection: false,
            fps: 30,
            // Pointer picking misbehaves on layers thinner than this
            min_thickness: 5.0,
            selected_material_color: 0xffff00,
            selected_material_opacity: 0.2,
            show_assembly_bounding_box: true,
            show_layer_bounding_box: true,
            show_origin_marker: true,
        }
    }
}

impl Options {
    /// Parse options from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Override individual keys of these options.
    ///
    /// Keys are replaced whole: an overriding `defaultElement` object is
    /// filled from the built-in element defaults, not merged with the
    /// current one.
    pub fn with_overrides(&self, overrides: serde_json::Value) -> Result<Self> {
        let mut merged = serde_json::to_value(self)?;
        if let (Some(target), serde_json::Value::Object(source)) = (merged.as_object_mut(), overrides) {
            for (key, value) in source {
                target.insert(key, value);
            }
        }
        let options: Options = serde_json::from_value(merged)?;
        options.validate()?;
        Ok(options)
    }

    /// Check ranges that the builder relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_thickness.is_finite() && self.min_thickness > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "minThickness must be positive, got {}",
                self.min_thickness
            )));
        }
        let element = &self.default_element;
        for (key, value) in [
            ("defaultElement.width", element.width),
            ("defaultElement.height", element.height),
            ("defaultElement.maxLayerThickness", element.max_layer_thickness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidOptions(format!("{key} must be positive, got {value}")));
            }
        }
        Ok(())
    }

    /// Delay between frames for the configured fps.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}
