// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model documents as supplied by the host.
//!
//! A model is an ordered list of layers; a layer is either one element or an
//! ordered list of layers (a subassembly). Every element attribute is
//! optional here. [`crate::normalize`] fills the gaps from the configured
//! defaults and turns the document into a typed [`crate::Assembly`].
//!
//! ```json
//! { "layers": [
//!     { "name": "gypsum", "thickness": 13 },
//!     [ { "name": "studs", "type": "unit", "width": 400, "thickness": 90 },
//!       { "name": "insulation", "type": "infill", "thickness": 90 } ],
//!     { "name": "sheathing", "thickness": 12 }
//! ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Insets carved from each face of an element's nominal box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub front: f64,
    pub back: f64,
}

/// Offset as written in a model; missing sides are filled from defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOffset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<f64>,
}

/// Surface description: flat color, opacity and an optional texture reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

/// One element as written in a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One of `sheet`, `unit`, `frame`, `infill`, `void`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_layer_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<RawOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,
    /// Degrees around the X axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_plane: Option<f64>,
}

/// A layer as written in a model: one element, or a subassembly of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLayer {
    Group(Vec<RawLayer>),
    Element(RawElement),
}

impl From<RawElement> for RawLayer {
    fn from(element: RawElement) -> Self {
        RawLayer::Element(element)
    }
}

/// An assembly model document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub layers: Vec<RawLayer>,
}

impl Model {
    /// Create a model from layers in stacking order.
    pub fn new(layers: Vec<RawLayer>) -> Self {
        Self { layers }
    }

    /// Parse a model document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a model from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layers_keep_shape_and_order() {
        let model = Model::from_value(json!({
            "layers": [
                { "name": "a", "thickness": 10 },
                [ { "name": "b" }, [ { "name": "c" } ] ],
            ]
        }))
        .unwrap();

        assert_eq!(model.layers.len(), 2);
        match &model.layers[1] {
            RawLayer::Group(members) => {
                assert_eq!(members.len(), 2);
                assert!(matches!(&members[1], RawLayer::Group(inner) if inner.len() == 1));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_element_fields_use_camel_case() {
        let model = Model::from_json(
            r#"{"layers":[{"type":"unit","maxLayerThickness":200,"constructionPlane":45,
                "offset":{"left":5},"material":{"color":255,"texture":"brick.png"}}]}"#,
        )
        .unwrap();

        let RawLayer::Element(element) = &model.layers[0] else {
            panic!("expected element");
        };
        assert_eq!(element.element_type.as_deref(), Some("unit"));
        assert_eq!(element.max_layer_thickness, Some(200.0));
        assert_eq!(element.construction_plane, Some(45.0));
        assert_eq!(element.offset.and_then(|o| o.left), Some(5.0));
        assert_eq!(element.offset.and_then(|o| o.right), None);
        let material = element.material.as_ref().unwrap();
        assert_eq!(material.texture.as_deref(), Some("brick.png"));
    }

    #[test]
    fn test_missing_layers_is_empty_model() {
        let model = Model::from_json("{}").unwrap();
        assert!(model.layers.is_empty());
    }
}
