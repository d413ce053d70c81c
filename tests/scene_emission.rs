//! Scene Emission Tests
//!
//! End-to-end scenarios through the public API:
//! - A rejected write keeps the prior value and names the field
//! - Construction fails without required fields and succeeds with them
//! - Emission carries set optional attributes and omits untouched ones
//! - Emitting an unmodified entity twice yields identical text
//! - String identifiers collide until released by `destroy`

use std::sync::Arc;

use povscene::emit::{EmitError, Emitter};
use povscene::scene::{SceneDocument, SceneError, SceneGraph};
use povscene::schema::SchemaLoader;
use povscene::value::{FieldValue, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn graph() -> SceneGraph {
    SceneGraph::new(Arc::new(SchemaLoader::with_builtin().compile().unwrap()))
}

fn rgb(r: f64, g: f64, b: f64) -> [(&'static str, FieldValue); 3] {
    [("r", r.into()), ("g", g.into()), ("b", b.into())]
}

// =============================================================================
// Validation Tests
// =============================================================================

/// An invalid write leaves the previous value in place.
#[test]
fn test_invalid_write_keeps_prior_value() {
    let mut g = graph();
    let camera = g.create("Camera", []).unwrap();
    g.set(camera, "angle", 45.0).unwrap();

    let err = g.set(camera, "angle", 400.0).unwrap_err();
    let details = err.validation().unwrap();
    assert_eq!(details.field, "angle");
    assert_eq!(details.owner.type_name, "Camera");
    assert_eq!(details.owner.serial, camera);
    assert_eq!(g.get(camera, "angle").unwrap(), Some(Value::Float(45.0)));
}

/// Construction fails until every required field without a default is given.
#[test]
fn test_construction_requires_fields() {
    let mut g = graph();
    let err = g
        .create("Cylinder", [("base_point", [0.0, 0.0, 0.0].into())])
        .unwrap_err();
    assert!(matches!(err, SceneError::MissingRequired { .. }));
    assert!(g.is_empty());

    let id = g
        .create(
            "Cylinder",
            [
                ("base_point", [0.0, 0.0, 0.0].into()),
                ("cap_point", [0.0, 2.0, 0.0].into()),
                ("radius", 0.5.into()),
            ],
        )
        .unwrap();
    assert_eq!(g.len(), 1);
    assert!(g.contains(id));
}

// =============================================================================
// Emission Tests
// =============================================================================

/// Box scenario.
#[test]
fn test_box_scenario() {
    let mut g = graph();
    let id = g
        .create(
            "Box",
            [
                ("corner1", [1.0, 2.0, 3.0].into()),
                ("corner2", [4.0, 5.0, 6.0].into()),
            ],
        )
        .unwrap();
    g.set(id, "sturm", true).unwrap();

    let text = Emitter::new(&g).emit(id, 0).unwrap();
    assert!(text.starts_with("box {"));
    assert!(text.contains("<1, 2, 3>, <4, 5, 6>"));
    assert!(text.contains("sturm"));
}

/// Inactive objects emit nothing, even inside a container.
#[test]
fn test_inactive_scenario() {
    let mut g = graph();
    let ball = g
        .create(
            "Sphere",
            [("center", [0.0, 0.0, 0.0].into()), ("radius", 1.0.into())],
        )
        .unwrap();
    g.set(ball, "active", false).unwrap();
    assert_eq!(Emitter::new(&g).emit(ball, 0).unwrap(), "");

    let other = g
        .create(
            "Sphere",
            [("center", [3.0, 0.0, 0.0].into()), ("radius", 1.0.into())],
        )
        .unwrap();
    let union = g
        .create("Union", [("objects", vec![ball, other].into())])
        .unwrap();
    let text = Emitter::new(&g).emit(union, 0).unwrap();
    assert!(text.contains("<3, 0, 0>"));
    assert!(!text.contains("<0, 0, 0>"));
}

/// Setting filter switches `rgb` to `rgbf`.
#[test]
fn test_color_scenario() {
    let mut g = graph();
    let red = g.create("Color", rgb(1.0, 0.0, 0.0)).unwrap();
    assert_eq!(Emitter::new(&g).emit(red, 0).unwrap(), "rgb <1, 0, 0>\n");

    g.set(red, "f", 0.5).unwrap();
    assert_eq!(Emitter::new(&g).emit(red, 0).unwrap(), "rgbf <1, 0, 0, 0.5>\n");
}

/// Set optional attributes appear; untouched ones do not.
#[test]
fn test_round_trip_emission() {
    let mut g = graph();
    let torus = g
        .create(
            "Torus",
            [("major_radius", 2.0.into()), ("minor_radius", 0.25.into())],
        )
        .unwrap();
    g.set(torus, "no_reflection", true).unwrap();
    g.set(torus, "texture", "T_Gold").unwrap();

    let text = Emitter::new(&g).emit(torus, 0).unwrap();
    assert!(text.contains("2, 0.25"));
    assert!(text.contains("no_reflection"));
    assert!(text.contains("texture { T_Gold }"));
    for untouched in ["sturm", "no_shadow", "hollow", "inverse", "matrix", "bounded_by"] {
        assert!(!text.contains(untouched), "unexpected {} in {}", untouched, text);
    }
}

/// Emission does not alter the graph.
#[test]
fn test_emission_idempotent() {
    let mut g = graph();
    let cone = g
        .create(
            "Cone",
            [
                ("base_point", [0.0, 0.0, 0.0].into()),
                ("base_radius", 1.0.into()),
                ("cap_point", [0.0, 1.0, 0.0].into()),
                ("cap_radius", 0.0.into()),
            ],
        )
        .unwrap();
    let emitter = Emitter::new(&g);
    let first = emitter.emit(cone, 0).unwrap();
    let second = emitter.emit(cone, 0).unwrap();
    assert_eq!(first, second);
}

/// Emission of a destroyed entity fails cleanly.
#[test]
fn test_emit_destroyed_entity() {
    let mut g = graph();
    let plane = g
        .create(
            "Plane",
            [("normal", [0.0, 1.0, 0.0].into()), ("distance", 0.0.into())],
        )
        .unwrap();
    g.destroy(plane).unwrap();
    let err = Emitter::new(&g).emit(plane, 0).unwrap_err();
    assert!(matches!(err, EmitError::Scene(SceneError::UnknownEntity(_))));
}

// =============================================================================
// Identifier Tests
// =============================================================================

/// Duplicate string ids collide; destroying releases the name.
#[test]
fn test_identifier_uniqueness() {
    let mut g = graph();
    let first = g.create_named("Color", "white", rgb(1.0, 1.0, 1.0)).unwrap();
    let err = g.create_named("Color", "white", rgb(1.0, 1.0, 1.0)).unwrap_err();
    assert_eq!(err.code(), "SDL_IDENTIFIER_COLLISION");

    g.destroy(first).unwrap();
    let second = g.create_named("Color", "white", rgb(1.0, 1.0, 1.0)).unwrap();
    assert_eq!(g.lookup("white"), Some(second));
}

/// Independent graphs do not share string identifiers.
#[test]
fn test_identifiers_are_per_graph() {
    let mut a = graph();
    let mut b = graph();
    let x = a.create_named("Color", "black", rgb(0.0, 0.0, 0.0)).unwrap();
    let y = b.create_named("Color", "black", rgb(0.0, 0.0, 0.0)).unwrap();
    assert_ne!(x, y);
}

// =============================================================================
// Document Tests
// =============================================================================

/// A full document emits a complete scene in section order.
#[test]
fn test_document_scene() {
    let doc = SceneDocument::from_json(
        r#"{
            "entities": [
                { "type": "Sphere", "fields": { "center": [0, 1, 0], "radius": 1, "texture": "T_Glass" } },
                { "type": "Color", "id": "sun", "fields": { "r": 1, "g": 0.9, "b": 0.8 } },
                { "type": "LightSource", "fields": { "location": [10, 20, -10], "color": { "ref": "sun" } } },
                { "type": "Camera", "fields": { "location": [0, 2, -6], "look_at": [0, 1, 0] } },
                { "type": "GlobalSettings", "fields": { "assumed_gamma": 2.2 } }
            ]
        }"#,
    )
    .unwrap();

    let mut g = graph();
    doc.build(&mut g).unwrap();
    let text = Emitter::new(&g).emit_scene().unwrap();

    let expected = "\
#version 3.7;

global_settings {
    assumed_gamma 2.2
}

camera {
    location <0, 2, -6>
    look_at <0, 1, 0>
}

light_source {
    <10, 20, -10>, rgb <1, 0.9, 0.8>
}

sphere {
    <0, 1, 0>, 1
    texture { T_Glass }
}
";
    assert_eq!(text, expected);
}
