//! SDL serializer
//!
//! Turns entities of a `SceneGraph` into POV-Ray scene description text.
//! The serializer only reads the graph.

mod emitter;
mod errors;
pub mod format;

pub use emitter::Emitter;
pub use errors::{EmitError, EmitResult};

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::config::EmitConfig;
    use crate::scene::{SceneGraph, Transform};
    use crate::schema::{FieldDef, Predicate, SchemaLoader, TypeDef, TypeFlags};
    use crate::value::{FieldValue, Value};

    fn graph() -> SceneGraph {
        SceneGraph::new(Arc::new(SchemaLoader::with_builtin().compile().unwrap()))
    }

    fn sphere(g: &mut SceneGraph, x: f64) -> crate::value::EntityId {
        g.create(
            "Sphere",
            [("center", [x, 0.0, 0.0].into()), ("radius", 1.0.into())],
        )
        .unwrap()
    }

    fn color(g: &mut SceneGraph, r: f64, gr: f64, b: f64) -> crate::value::EntityId {
        g.create("Color", [("r", r.into()), ("g", gr.into()), ("b", b.into())])
            .unwrap()
    }

    #[test]
    fn test_box_scenario() {
        let mut g = graph();
        let id = g
            .create(
                "Box",
                [
                    ("corner1", [1.0, 2.0, 3.0].into()),
                    ("corner2", [4.0, 5.0, 6.0].into()),
                    ("sturm", true.into()),
                ],
            )
            .unwrap();
        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert_eq!(text, "box {\n    <1, 2, 3>, <4, 5, 6>\n    sturm\n}\n");
    }

    #[test]
    fn test_inactive_emits_nothing() {
        let mut g = graph();
        let id = sphere(&mut g, 0.0);
        g.set(id, "active", false).unwrap();
        assert_eq!(Emitter::new(&g).emit(id, 0).unwrap(), "");
    }

    #[test]
    fn test_color_filter_switches_keyword() {
        let mut g = graph();
        let c = color(&mut g, 1.0, 0.0, 0.0);
        let emitter_text = |g: &SceneGraph| Emitter::new(g).emit(c, 0).unwrap();
        assert_eq!(emitter_text(&g), "rgb <1, 0, 0>\n");

        g.set(c, "f", 0.5).unwrap();
        assert_eq!(emitter_text(&g), "rgbf <1, 0, 0, 0.5>\n");

        g.set(c, "f", 0.0).unwrap();
        g.set(c, "t", 0.25).unwrap();
        assert_eq!(emitter_text(&g), "rgbft <1, 0, 0, 0, 0.25>\n");

        g.set(c, "srgb", true).unwrap();
        assert_eq!(emitter_text(&g), "srgbft <1, 0, 0, 0, 0.25>\n");
    }

    #[test]
    fn test_transmit_without_filter_gets_zero_filter() {
        let mut g = graph();
        let c = color(&mut g, 1.0, 1.0, 1.0);
        g.set(c, "t", 0.5).unwrap();
        assert_eq!(Emitter::new(&g).emit(c, 0).unwrap(), "rgbft <1, 1, 1, 0, 0.5>\n");
    }

    #[test]
    fn test_optional_tokens_round_trip() {
        let mut g = graph();
        let id = sphere(&mut g, 0.0);
        let plain = Emitter::new(&g).emit(id, 0).unwrap();
        assert!(!plain.contains("no_shadow"));
        assert!(!plain.contains("texture"));

        g.set(id, "no_shadow", true).unwrap();
        g.set(id, "texture", "T_Stone1").unwrap();
        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert!(text.contains("    no_shadow\n"));
        assert!(text.contains("    texture { T_Stone1 }\n"));
        assert!(!text.contains("no_image"));
    }

    #[test]
    fn test_emission_is_idempotent() {
        let mut g = graph();
        let id = sphere(&mut g, 2.0);
        g.set(id, "hollow", true).unwrap();
        let emitter = Emitter::new(&g);
        assert_eq!(emitter.emit(id, 1).unwrap(), emitter.emit(id, 1).unwrap());
    }

    #[test]
    fn test_deferred_revalidated_at_emission() {
        let mut g = graph();
        let id = sphere(&mut g, 0.0);
        let radius = Rc::new(Cell::new(1.0_f64));
        let shared = Rc::clone(&radius);
        g.set(
            id,
            "radius",
            FieldValue::deferred(move || {
                let r = shared.get();
                if r > 0.0 {
                    Value::Float(r)
                } else {
                    Value::Str("gone".into())
                }
            }),
        )
        .unwrap();

        radius.set(3.0);
        assert!(Emitter::new(&g).emit(id, 0).unwrap().contains("<0, 0, 0>, 3"));

        radius.set(-1.0);
        let err = Emitter::new(&g).emit(id, 0).unwrap_err();
        assert!(matches!(err, EmitError::Invalid { ref field, .. } if field == "radius"));
    }

    #[test]
    fn test_verbatim_passthrough() {
        let mut g = graph();
        let id = sphere(&mut g, 0.0);
        g.set(id, "radius", "&R_Ball * 2").unwrap();
        assert!(Emitter::new(&g).emit(id, 0).unwrap().contains("<0, 0, 0>, R_Ball * 2"));
    }

    #[test]
    fn test_csg_children_then_split_union() {
        let mut g = graph();
        let a = sphere(&mut g, 0.0);
        let b = sphere(&mut g, 1.0);
        let u = g.create("Union", [("objects", vec![a, b].into())]).unwrap();

        let text = Emitter::new(&g).emit(u, 0).unwrap();
        assert!(text.starts_with("union {\n    sphere {\n        <0, 0, 0>, 1\n    }\n"));
        assert!(!text.contains("split_union"));

        g.set(u, "split_union", false).unwrap();
        let text = Emitter::new(&g).emit(u, 0).unwrap();
        let children_end = text.rfind("    }\n").unwrap();
        let split = text.find("split_union off").unwrap();
        assert!(split > children_end);
    }

    #[test]
    fn test_csg_needs_two_children() {
        let mut g = graph();
        let a = sphere(&mut g, 0.0);
        let u = g.create("Merge", [("objects", vec![a].into())]).unwrap();
        let err = Emitter::new(&g).emit(u, 0).unwrap_err();
        assert_eq!(err.code(), "SDL_EMIT_STRUCTURE");
    }

    #[test]
    fn test_polygon_and_lathe_minimums() {
        let mut g = graph();
        let poly = g
            .create(
                "Polygon",
                [(
                    "points",
                    Value::List(vec![
                        [0.0, 0.0, 0.0].into(),
                        [1.0, 0.0, 0.0].into(),
                        [0.0, 1.0, 0.0].into(),
                    ])
                    .into(),
                )],
            )
            .unwrap();
        let text = Emitter::new(&g).emit(poly, 0).unwrap();
        assert!(text.contains("3, <0, 0, 0>, <1, 0, 0>, <0, 1, 0>"));

        let pts = |n: usize| Value::List((0..n).map(|i| Value::from([i as f64, 1.0])).collect());
        let lathe = g
            .create(
                "Lathe",
                [("spline_type", "cubic_spline".into()), ("points", pts(3).into())],
            )
            .unwrap();
        assert!(Emitter::new(&g).emit(lathe, 0).is_err());

        g.set(lathe, "points", pts(4)).unwrap();
        let text = Emitter::new(&g).emit(lathe, 0).unwrap();
        assert!(text.contains("    cubic_spline\n    4, <0, 1>"));

        g.set(lathe, "spline_type", "bezier_spline").unwrap();
        g.set(lathe, "points", pts(6)).unwrap();
        assert!(Emitter::new(&g).emit(lathe, 0).is_err());
    }

    #[test]
    fn test_sphere_sweep() {
        let mut g = graph();
        let id = g
            .create(
                "SphereSweep",
                [
                    ("spline_type", "linear_spline".into()),
                    (
                        "spheres",
                        Value::List(vec![
                            [0.0, 0.0, 0.0, 0.5].into(),
                            [1.0, 0.0, 0.0, 0.25].into(),
                        ])
                        .into(),
                    ),
                ],
            )
            .unwrap();
        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert!(text.contains("    2, <0, 0, 0>, 0.5, <1, 0, 0>, 0.25\n"));
    }

    #[test]
    fn test_hollow_skipped_on_patch() {
        let mut g = graph();
        let id = g
            .create(
                "Triangle",
                [
                    ("corner1", [0.0, 0.0, 0.0].into()),
                    ("corner2", [1.0, 0.0, 0.0].into()),
                    ("corner3", [0.0, 1.0, 0.0].into()),
                ],
            )
            .unwrap();
        g.set(id, "hollow", true).unwrap();
        g.set(id, "no_image", true).unwrap();
        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert!(!text.contains("hollow"));
        assert!(text.contains("no_image"));
    }

    #[test]
    fn test_common_tail_order() {
        let mut g = graph();
        let clip = sphere(&mut g, 0.0);
        let id = sphere(&mut g, 1.0);
        g.set(id, "clipped_by", clip).unwrap();
        g.set(id, "texture", "T_Wood").unwrap();
        g.set(id, "inverse", true).unwrap();
        g.set(id, "no_shadow", true).unwrap();
        g.apply_transform(id, Transform::translate([0.0, 1.0, 0.0])).unwrap();

        let text = Emitter::new(&g).emit(id, 0).unwrap();
        let order = ["clipped_by {", "no_shadow", "inverse", "texture {", "matrix <"];
        let positions: Vec<usize> = order.iter().map(|t| text.find(t).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
        assert!(text.contains("matrix <1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0>"));
    }

    #[test]
    fn test_prepend_append_and_satellites() {
        let mut g = graph();
        let moon = sphere(&mut g, 5.0);
        let planet = sphere(&mut g, 0.0);
        g.set(planet, "sdl_prepend", "#declare Planet =").unwrap();
        g.set(planet, "sdl_append", "// planet").unwrap();
        g.set(planet, "satellites", vec![moon]).unwrap();

        let text = Emitter::new(&g).emit(planet, 0).unwrap();
        assert!(text.starts_with("#declare Planet =\nsphere {\n"));
        let append = text.find("// planet").unwrap();
        let satellite = text.find("<5, 0, 0>, 1").unwrap();
        assert!(append < satellite);
    }

    #[test]
    fn test_dangling_reference() {
        let mut g = graph();
        let a = sphere(&mut g, 0.0);
        let b = sphere(&mut g, 1.0);
        let u = g.create("Union", [("objects", vec![a, b].into())]).unwrap();
        g.destroy(b).unwrap();
        let err = Emitter::new(&g).emit(u, 0).unwrap_err();
        assert!(matches!(err, EmitError::DanglingReference { target, .. } if target == b));
    }

    #[test]
    fn test_cycle_detected() {
        let mut g = graph();
        let a = sphere(&mut g, 0.0);
        let b = sphere(&mut g, 1.0);
        let u = g.create("Union", [("objects", vec![a, b].into())]).unwrap();
        g.set(u, "objects", vec![a, u]).unwrap();
        let err = Emitter::new(&g).emit(u, 0).unwrap_err();
        assert_eq!(err.code(), "SDL_EMIT_CYCLE");
    }

    #[test]
    fn test_scene_rejects_detached_cycle() {
        let mut g = graph();
        let a = sphere(&mut g, 0.0);
        let b = sphere(&mut g, 1.0);
        let c = sphere(&mut g, 2.0);
        let d = sphere(&mut g, 3.0);
        let left = g.create("Union", [("objects", vec![a, b].into())]).unwrap();
        let right = g.create("Union", [("objects", vec![c, d].into())]).unwrap();
        g.set(left, "objects", vec![a, right]).unwrap();
        g.set(right, "objects", vec![c, left]).unwrap();

        assert!(!g.roots().contains(&left));
        let err = Emitter::new(&g).emit_scene().unwrap_err();
        assert_eq!(err.code(), "SDL_EMIT_CYCLE");
        assert_eq!(err.owner().unwrap().serial, left);
    }

    #[test]
    fn test_light_source_inline_color() {
        let mut g = graph();
        let white = color(&mut g, 1.0, 1.0, 1.0);
        let light = g
            .create(
                "LightSource",
                [("location", [0.0, 10.0, -5.0].into()), ("color", white.into())],
            )
            .unwrap();
        g.set(light, "light_type", "spotlight").unwrap();
        g.set(light, "point_at", [0.0, 0.0, 0.0]).unwrap();

        let text = Emitter::new(&g).emit(light, 0).unwrap();
        assert_eq!(
            text,
            "light_source {\n    <0, 10, -5>, rgb <1, 1, 1>\n    spotlight\n    point_at <0, 0, 0>\n}\n"
        );
    }

    #[test]
    fn test_generic_routine_for_custom_type() {
        let mut loader = SchemaLoader::with_builtin();
        loader.register(
            TypeDef::new("Blob")
                .extends("Primitive")
                .keyword("blob")
                .flags(TypeFlags::finite_solid())
                .field(FieldDef::required("threshold", Predicate::Float))
                .field(FieldDef::optional("component", Predicate::vector(3))),
        );
        let mut g = SceneGraph::new(Arc::new(loader.compile().unwrap()));
        let id = g.create("Blob", [("threshold", 0.6.into())]).unwrap();
        g.set(id, "hollow", true).unwrap();

        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert_eq!(text, "blob {\n    threshold 0.6\n    hollow\n}\n");
    }

    #[test]
    fn test_generic_reference_lists() {
        let mut loader = SchemaLoader::with_builtin();
        loader.register(
            TypeDef::new("Blob")
                .extends("Primitive")
                .keyword("blob")
                .flags(TypeFlags::finite_solid())
                .field(FieldDef::required("threshold", Predicate::Float))
                .field(FieldDef::optional(
                    "components",
                    Predicate::array_of(Predicate::instance_of("Primitive"), 0, None),
                ))
                .field(FieldDef::optional(
                    "palette",
                    Predicate::array_of(Predicate::instance_of("Color"), 0, None),
                )),
        );
        let mut g = SceneGraph::new(Arc::new(loader.compile().unwrap()));
        let a = sphere(&mut g, 0.0);
        let b = sphere(&mut g, 1.0);
        let red = color(&mut g, 1.0, 0.0, 0.0);
        let blue = color(&mut g, 0.0, 0.0, 1.0);
        let id = g.create("Blob", [("threshold", 0.6.into())]).unwrap();
        g.set(id, "components", vec![a, b]).unwrap();
        g.set(id, "palette", vec![red, blue]).unwrap();

        let text = Emitter::new(&g).emit(id, 0).unwrap();
        assert_eq!(
            text,
            "blob {\n    threshold 0.6\n    components {\n        sphere {\n            <0, 0, 0>, 1\n        }\n        sphere {\n            <1, 0, 0>, 1\n        }\n    }\n    palette rgb <1, 0, 0>, rgb <0, 0, 1>\n}\n"
        );
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_reference_in_plain_position_rejected() {
        let mut loader = SchemaLoader::with_builtin();
        loader.register(
            TypeDef::new("Marker")
                .extends("Primitive")
                .keyword("marker")
                .flags(TypeFlags::finite_solid())
                .field(FieldDef::optional("payload", Predicate::Any)),
        );
        let mut g = SceneGraph::new(Arc::new(loader.compile().unwrap()));
        let a = sphere(&mut g, 0.0);
        let id = g.create("Marker", []).unwrap();

        g.set(id, "payload", Value::List(vec![Value::Int(1), Value::Entity(a)])).unwrap();
        let err = Emitter::new(&g).emit(id, 0).unwrap_err();
        assert_eq!(err.code(), "SDL_EMIT_STRUCTURE");

        let nested = Value::List(vec![Value::List(vec![Value::Entity(a)])]);
        g.set(id, "payload", nested).unwrap();
        let err = Emitter::new(&g).emit(id, 0).unwrap_err();
        assert_eq!(err.code(), "SDL_EMIT_STRUCTURE");
        assert_eq!(err.owner().unwrap().serial, id);
    }

    #[test]
    fn test_scene_assembly_order() {
        let mut g = graph();
        let ball = sphere(&mut g, 0.0);
        let white = color(&mut g, 1.0, 1.0, 1.0);
        let light = g
            .create(
                "LightSource",
                [("location", [0.0, 10.0, 0.0].into()), ("color", white.into())],
            )
            .unwrap();
        let camera = g
            .create("Camera", [("location", [0.0, 1.0, -5.0].into())])
            .unwrap();
        g.set(camera, "look_at", [0.0, 0.0, 0.0]).unwrap();
        let settings = g.create("GlobalSettings", []).unwrap();
        g.set(settings, "max_trace_level", 10).unwrap();
        let _unused_color = color(&mut g, 0.5, 0.5, 0.5);

        let config = EmitConfig {
            includes: vec!["colors.inc".into()],
            indent_width: 2,
            ..EmitConfig::default()
        };
        let text = Emitter::new(&g).with_config(config).emit_scene().unwrap();

        assert!(text.starts_with("#version 3.7;\n#include \"colors.inc\"\n"));
        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("global_settings") < pos("camera {"));
        assert!(pos("camera {") < pos("light_source"));
        assert!(pos("light_source") < pos("sphere {"));
        assert!(text.contains("  max_trace_level 10\n"));
        assert!(!text.contains("assumed_gamma"));
        assert!(!text.contains("0.5, 0.5"));
        let _ = (ball, light);
    }
}
