// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use section_engine::{
    Error, Model, NodeKind, Options, RawLayer, SceneGraph, SectionEngine, Viewport,
};
use serde_json::json;

fn section(model: serde_json::Value, options: Options) -> SectionEngine {
    let model = Model::from_value(model).unwrap();
    SectionEngine::new(Viewport::new(800.0, 600.0), model, options).unwrap()
}

fn mesh_vertex_count(scene: &SceneGraph, key: section_engine::NodeKey) -> usize {
    match scene.get(key).map(|node| &node.kind) {
        Some(NodeKind::Mesh { mesh, .. }) => mesh.vertex_count(),
        other => panic!("expected mesh node, got {other:?}"),
    }
}

#[test]
fn layers_stack_along_z() {
    let mut engine = section(
        json!({ "layers": [
            { "name": "a", "thickness": 10 },
            [ { "name": "b", "thickness": 20 }, { "name": "c", "thickness": 5 } ],
            { "name": "d", "thickness": 8 }
        ] }),
        Options::default(),
    );

    let layout = engine.layout().unwrap();
    let centers: Vec<f64> = layout.placements.iter().map(|p| p.center_z).collect();
    assert_eq!(centers, vec![5.0, 20.0, 34.0]);
    assert_eq!(layout.total_thickness, 38.0);

    let root = engine.build().unwrap();
    let scene = engine.scene();
    let layers = scene.children(root);
    assert_eq!(layers.len(), 3);
    let z: Vec<f64> = layers
        .iter()
        .map(|key| scene.get(*key).unwrap().position.z)
        .collect();
    assert_eq!(z, vec![5.0, 20.0, 34.0]);
    assert_eq!(scene.get(layers[0]).and_then(|node| node.name()), Some("a"));

    let (min, max) = scene.world_bounds(root).unwrap();
    assert!(min.z.abs() < 1e-3);
    assert!((max.z - 38.0).abs() < 1e-3);
    assert!((min.x + 250.0).abs() < 1e-3 && (max.x - 250.0).abs() < 1e-3);
}

#[test]
fn empty_model_builds_empty_root() {
    let mut engine = section(json!({ "layers": [] }), Options::default());
    let root = engine.build().unwrap();
    assert!(engine.scene().children(root).is_empty());
    assert_eq!(engine.layout().unwrap().total_thickness, 0.0);
}

#[test]
fn unit_layer_tiles_footprint() {
    let mut engine = section(
        json!({ "layers": [ { "name": "brick", "type": "unit", "width": 120, "height": 120 } ] }),
        Options::default(),
    );
    let root = engine.build().unwrap();
    let layer = engine.scene().children(root)[0];
    assert_eq!(mesh_vertex_count(engine.scene(), layer), 25 * 24);
}

#[test]
fn oversized_unit_is_single_cell() {
    let mut engine = section(
        json!({ "layers": [ { "type": "unit", "width": 600, "height": 600 } ] }),
        Options::default(),
    );
    let root = engine.build().unwrap();
    let layer = engine.scene().children(root)[0];
    assert_eq!(mesh_vertex_count(engine.scene(), layer), 24);
}

#[test]
fn subassembly_is_clipped_to_footprint() {
    let mut engine = section(
        json!({ "layers": [
            [ { "name": "studs", "type": "unit", "width": 120, "height": 120, "thickness": 20 },
              { "name": "fill", "type": "infill", "thickness": 20 } ]
        ] }),
        Options::default(),
    );
    let root = engine.build().unwrap();
    let scene = engine.scene();
    let layer = scene.children(root)[0];
    assert_eq!(scene.children(layer).len(), 2);

    let (min, max) = scene.world_bounds(layer).unwrap();
    assert!(min.x >= -250.0 - 1e-2 && max.x <= 250.0 + 1e-2);
    assert!(min.y >= -250.0 - 1e-2 && max.y <= 250.0 + 1e-2);
    assert!(min.z >= -1e-2 && max.z <= 20.0 + 1e-2);
}

#[test]
fn helpers_follow_options() {
    let mut shown = section(json!({ "layers": [ { "name": "a" } ] }), Options::default());
    shown.build().unwrap();
    let kinds: Vec<&NodeKind> = shown
        .scene()
        .roots()
        .iter()
        .map(|key| &shown.scene().get(*key).unwrap().kind)
        .collect();
    assert!(matches!(kinds[0], NodeKind::OriginMarker { size } if *size == 500.0));
    assert_eq!(
        kinds.iter().filter(|kind| matches!(kind, NodeKind::BoundingBox { .. })).count(),
        2
    );

    let hidden = Options {
        show_origin_marker: false,
        show_layer_bounding_box: false,
        show_assembly_bounding_box: false,
        ..Options::default()
    };
    let mut bare = section(json!({ "layers": [ { "name": "a" } ] }), hidden);
    let root = bare.build().unwrap();
    assert_eq!(bare.scene().roots(), &[root]);
}

#[test]
fn malformed_model_leaves_scene_untouched() {
    let mut engine = section(
        json!({ "layers": [ { "name": "ok" }, { "name": "glass", "type": "curtain" } ] }),
        Options::default(),
    );
    let before = engine.scene().len();
    assert!(matches!(engine.build(), Err(Error::MalformedModel(_))));
    assert_eq!(engine.scene().len(), before);
    assert!(engine.root().is_none());

    let mut empty_group = section(json!({ "layers": [ [] ] }), Options::default());
    assert!(matches!(empty_group.build(), Err(Error::MalformedModel(_))));
}

#[test]
fn microscopic_unit_cell_is_rejected() {
    let mut engine = section(
        json!({ "layers": [ { "type": "unit", "width": 1e-9, "height": 1e-9 } ] }),
        Options::default(),
    );
    assert!(matches!(engine.build(), Err(Error::MalformedModel(_))));
    assert!(engine.root().is_none());
}

#[test]
fn normalization_runs_once() {
    let mut engine = section(json!({ "layers": [ { "name": "a" }, [ { "thickness": 3 } ] ] }), Options::default());
    engine.build().unwrap();
    let first = engine.model().clone();
    engine.build().unwrap();
    assert_eq!(engine.model(), &first);

    let RawLayer::Group(members) = &first.layers[1] else { panic!("expected group") };
    let RawLayer::Element(element) = &members[0] else { panic!("expected element") };
    assert_eq!(element.thickness, Some(3.0));
    assert_eq!(element.name.as_deref(), Some("element"));
}

#[test]
fn rebuild_replaces_scene_and_clear_empties_it() {
    let mut engine = section(json!({ "layers": [ { "name": "a" } ] }), Options::default());
    engine.build().unwrap();
    let count = engine.scene().len();
    engine.build().unwrap();
    assert_eq!(engine.scene().len(), count);

    engine.clear();
    assert!(engine.scene().is_empty());
    assert!(engine.root().is_none());
}

#[test]
fn handlers_accumulate_per_event() {
    let mut engine = section(json!({ "layers": [] }), Options::default());
    engine.on("select", |_| {});
    engine.on("select", |_| {});
    engine.on("build", |_| {});
    assert_eq!(engine.handler_count("select"), 2);
    assert_eq!(engine.handler_count("build"), 1);
    assert_eq!(engine.handler_count("missing"), 0);
}

#[test]
fn invalid_options_are_rejected() {
    let model = Model::default();
    let options = Options { min_thickness: -1.0, ..Options::default() };
    assert!(matches!(
        SectionEngine::new(Viewport::new(10.0, 10.0), model, options),
        Err(Error::InvalidOptions(_))
    ));
}
