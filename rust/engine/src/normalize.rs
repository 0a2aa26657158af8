// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Default filling and conversion of a model into an [`Assembly`].
//!
//! Filling never overwrites a key the model already declares, so running it
//! again on its own output changes nothing. Conversion then checks the
//! structure and produces the typed tree the builder works on.

use crate::assembly::{Assembly, AssemblyFrame, Element, ElementKind, Layer, Material, UnitCell};
use crate::config::ElementDefaults;
use crate::error::{Error, Result};
use crate::model::{Model, Offset, RawElement, RawLayer, RawOffset};
use crate::tiling::TileGrid;

/// Fill every missing element attribute of `layer` from `defaults`.
///
/// Groups are walked recursively and keep their shape.
pub fn apply_defaults(layer: &mut RawLayer, defaults: &ElementDefaults) {
    match layer {
        RawLayer::Element(element) => fill_element(element, defaults),
        RawLayer::Group(members) => {
            for member in members {
                apply_defaults(member, defaults);
            }
        }
    }
}

fn fill_element(element: &mut RawElement, defaults: &ElementDefaults) {
    element.name.get_or_insert_with(|| defaults.name.clone());
    element
        .element_type
        .get_or_insert_with(|| defaults.element_type.clone());
    element.width.get_or_insert(defaults.width);
    element.height.get_or_insert(defaults.height);
    element.thickness.get_or_insert(defaults.thickness);
    element
        .max_layer_thickness
        .get_or_insert(defaults.max_layer_thickness);
    element.color.get_or_insert(defaults.color);
    element.opacity.get_or_insert(defaults.opacity);
    element.transparency.get_or_insert(defaults.transparency);
    element
        .construction_plane
        .get_or_insert(defaults.construction_plane);
    if element.material.is_none() {
        element.material = defaults.material.clone();
    }

    let offset = element.offset.get_or_insert_with(RawOffset::default);
    let fallback = &defaults.offset;
    offset.top.get_or_insert(fallback.top);
    offset.left.get_or_insert(fallback.left);
    offset.bottom.get_or_insert(fallback.bottom);
    offset.right.get_or_insert(fallback.right);
    offset.front.get_or_insert(fallback.front);
    offset.back.get_or_insert(fallback.back);
}

/// Fills defaults into a model and converts it into an [`Assembly`].
#[derive(Debug, Clone)]
pub struct ModelNormalizer {
    defaults: ElementDefaults,
}

impl ModelNormalizer {
    pub fn new(defaults: ElementDefaults) -> Self {
        Self { defaults }
    }

    /// Fill defaults into every layer of `model` in place.
    pub fn apply(&self, model: &mut Model) {
        for layer in &mut model.layers {
            apply_defaults(layer, &self.defaults);
        }
    }

    /// Fill defaults, then convert into a typed assembly.
    pub fn normalize(&self, model: &mut Model) -> Result<Assembly> {
        self.apply(model);
        let layers = model
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| self.convert_layer(layer, &index.to_string()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Assembly { layers })
    }

    fn convert_layer(&self, layer: &RawLayer, path: &str) -> Result<Layer> {
        match layer {
            RawLayer::Element(element) => Ok(Layer::Element(self.convert_element(element, path)?)),
            RawLayer::Group(members) => {
                if members.is_empty() {
                    return Err(Error::malformed(format!("layer {path} is an empty subassembly")));
                }
                let members = members
                    .iter()
                    .enumerate()
                    .map(|(index, member)| self.convert_layer(member, &format!("{path}.{index}")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Layer::Group(members))
            }
        }
    }

    fn convert_element(&self, raw: &RawElement, path: &str) -> Result<Element> {
        let defaults = &self.defaults;
        let name = raw.name.clone().unwrap_or_else(|| defaults.name.clone());
        let tag = raw.element_type.as_deref().unwrap_or(&defaults.element_type);

        let thickness = raw.thickness.unwrap_or(defaults.thickness);
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(Error::malformed(format!(
                "layer {path} ({name}) has invalid thickness {thickness}"
            )));
        }

        let kind = match tag {
            "sheet" => ElementKind::Sheet,
            "frame" => ElementKind::Frame,
            "infill" => ElementKind::Infill,
            "void" => ElementKind::Void,
            "unit" => {
                let width = raw.width.unwrap_or(defaults.width);
                let height = raw.height.unwrap_or(defaults.height);
                if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
                    return Err(Error::malformed(format!(
                        "layer {path} ({name}) has unusable unit cell {width} x {height}"
                    )));
                }
                let cell = UnitCell { width, height };
                TileGrid::fit(&AssemblyFrame::from_defaults(defaults), &cell)
                    .bounded_cell_count()
                    .map_err(|_| {
                        Error::malformed(format!(
                            "layer {path} ({name}) unit cell {width} x {height} needs too many tiles"
                        ))
                    })?;
                ElementKind::Unit(cell)
            }
            other => {
                return Err(Error::malformed(format!(
                    "layer {path} ({name}) has unknown element type {other:?}"
                )))
            }
        };

        let color = raw.color.unwrap_or(defaults.color);
        let opacity = raw.opacity.unwrap_or(defaults.opacity);
        let material = match &raw.material {
            Some(spec) => Material {
                color: spec.color.unwrap_or(color),
                opacity: spec.opacity.unwrap_or(opacity),
                texture: spec.texture.clone(),
            },
            None => Material { color, opacity, texture: None },
        };

        let raw_offset = raw.offset.unwrap_or_default();
        let fallback = &defaults.offset;
        let offset = Offset {
            top: raw_offset.top.unwrap_or(fallback.top),
            left: raw_offset.left.unwrap_or(fallback.left),
            bottom: raw_offset.bottom.unwrap_or(fallback.bottom),
            right: raw_offset.right.unwrap_or(fallback.right),
            front: raw_offset.front.unwrap_or(fallback.front),
            back: raw_offset.back.unwrap_or(fallback.back),
        };

        Ok(Element {
            name,
            kind,
            thickness,
            max_layer_thickness: raw.max_layer_thickness.unwrap_or(defaults.max_layer_thickness),
            offset,
            material,
            transparency: raw.transparency.unwrap_or(defaults.transparency),
            construction_plane: raw.construction_plane.unwrap_or(defaults.construction_plane),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialSpec;
    use serde_json::json;

    fn model(value: serde_json::Value) -> Model {
        Model::from_value(value).unwrap()
    }

    #[test]
    fn test_present_keys_win() {
        let mut layer = RawLayer::Element(RawElement {
            name: Some("brick".into()),
            thickness: Some(90.0),
            offset: Some(RawOffset { front: Some(3.0), ..RawOffset::default() }),
            ..RawElement::default()
        });
        apply_defaults(&mut layer, &ElementDefaults::default());

        let RawLayer::Element(element) = layer else { panic!("expected element") };
        assert_eq!(element.name.as_deref(), Some("brick"));
        assert_eq!(element.thickness, Some(90.0));
        assert_eq!(element.element_type.as_deref(), Some("sheet"));
        assert_eq!(element.width, Some(500.0));
        let offset = element.offset.unwrap();
        assert_eq!(offset.front, Some(3.0));
        assert_eq!(offset.back, Some(0.0));
    }

    #[test]
    fn test_apply_defaults_is_idempotent() {
        let mut once = model(json!({
            "layers": [ { "name": "a" }, [ { "type": "unit", "width": 120 }, [ {} ] ] ]
        }));
        let normalizer = ModelNormalizer::new(ElementDefaults::default());
        normalizer.apply(&mut once);
        let mut twice = once.clone();
        normalizer.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_groups_keep_their_shape() {
        let mut doc = model(json!({ "layers": [ [ { "name": "a" }, [ { "name": "b" } ] ] ] }));
        let assembly = ModelNormalizer::new(ElementDefaults::default())
            .normalize(&mut doc)
            .unwrap();
        match &assembly.layers[0] {
            Layer::Group(members) => {
                assert_eq!(members.len(), 2);
                assert!(matches!(&members[1], Layer::Group(inner) if inner.len() == 1));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_unit_cell_from_element() {
        let mut doc = model(json!({ "layers": [ { "type": "unit", "width": 120, "height": 60 } ] }));
        let assembly = ModelNormalizer::new(ElementDefaults::default())
            .normalize(&mut doc)
            .unwrap();
        let Layer::Element(element) = &assembly.layers[0] else { panic!("expected element") };
        assert_eq!(element.kind, ElementKind::Unit(UnitCell { width: 120.0, height: 60.0 }));
    }

    #[test]
    fn test_material_falls_back_to_element_color() {
        let mut doc = model(json!({
            "layers": [ { "color": 255, "opacity": 0.5, "material": { "texture": "wood.png" } } ]
        }));
        let assembly = ModelNormalizer::new(ElementDefaults::default())
            .normalize(&mut doc)
            .unwrap();
        let Layer::Element(element) = &assembly.layers[0] else { panic!("expected element") };
        assert_eq!(
            element.material,
            Material { color: 255, opacity: 0.5, texture: Some("wood.png".into()) }
        );
    }

    #[test]
    fn test_default_material_applies_to_bare_elements() {
        let defaults = ElementDefaults {
            material: Some(MaterialSpec { color: Some(0x336699), ..MaterialSpec::default() }),
            ..ElementDefaults::default()
        };
        let mut doc = model(json!({ "layers": [ {} ] }));
        let assembly = ModelNormalizer::new(defaults).normalize(&mut doc).unwrap();
        let Layer::Element(element) = &assembly.layers[0] else { panic!("expected element") };
        assert_eq!(element.material.color, 0x336699);
    }

    #[test]
    fn test_rejects_empty_group() {
        let mut doc = model(json!({ "layers": [ { "name": "a" }, [ { "name": "b" }, [] ] ] }));
        let err = ModelNormalizer::new(ElementDefaults::default())
            .normalize(&mut doc)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedModel(ref message) if message.contains("1.1")));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let mut doc = model(json!({ "layers": [ { "name": "glass", "type": "curtain" } ] }));
        assert!(matches!(
            ModelNormalizer::new(ElementDefaults::default()).normalize(&mut doc),
            Err(Error::MalformedModel(_))
        ));
    }

    #[test]
    fn test_rejects_zero_unit_cell() {
        let mut doc = model(json!({ "layers": [ { "type": "unit", "width": 0 } ] }));
        assert!(matches!(
            ModelNormalizer::new(ElementDefaults::default()).normalize(&mut doc),
            Err(Error::MalformedModel(_))
        ));
    }

    #[test]
    fn test_rejects_unit_cell_with_too_many_tiles() {
        let mut doc = model(json!({ "layers": [ { "type": "unit", "width": 1e-9, "height": 1e-9 } ] }));
        assert!(matches!(
            ModelNormalizer::new(ElementDefaults::default()).normalize(&mut doc),
            Err(Error::MalformedModel(_))
        ));

        // 500 / 1 per side is 250 000 cells, exactly at the cap
        let mut doc = model(json!({ "layers": [ { "type": "unit", "width": 1, "height": 1 } ] }));
        assert!(ModelNormalizer::new(ElementDefaults::default()).normalize(&mut doc).is_ok());
    }
}
