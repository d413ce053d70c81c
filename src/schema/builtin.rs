//! Builtin POV-Ray definition table
//!
//! Every entity type the emitter knows about is declared here. Extra types
//! can be layered on top from JSON definition files via `SchemaLoader`.

use super::predicate::Predicate;
use super::types::{FieldDef, TypeDef, TypeFlags};

const LATHE_SPLINES: &[&str] = &["linear_spline", "quadratic_spline", "cubic_spline", "bezier_spline"];
const SWEEP_SPLINES: &[&str] = &["linear_spline", "b_spline", "cubic_spline"];
const CAMERA_TYPES: &[&str] = &[
    "perspective",
    "orthographic",
    "fisheye",
    "ultra_wide_angle",
    "omnimax",
    "panoramic",
    "spherical",
    "cylinder 1",
    "cylinder 2",
    "cylinder 3",
    "cylinder 4",
];
const LIGHT_TYPES: &[&str] = &["spotlight", "shadowless", "cylinder", "parallel"];

fn vec3_req(name: &str) -> FieldDef {
    FieldDef::required(name, Predicate::vector(3))
}

fn vec3_opt(name: &str) -> FieldDef {
    FieldDef::optional(name, Predicate::vector(3))
}

fn float_req(name: &str) -> FieldDef {
    FieldDef::required(name, Predicate::Float)
}

fn float_opt(name: &str) -> FieldDef {
    FieldDef::optional(name, Predicate::Float)
}

fn primitive_ref(name: &str) -> FieldDef {
    FieldDef::optional(name, Predicate::instance_of("Primitive"))
}

/// Returns the full builtin definition table.
pub fn definitions() -> Vec<TypeDef> {
    let mut defs = vec![primitive()];
    defs.extend(solids());
    defs.extend(patches());
    defs.extend(csg());
    defs.push(color());
    defs.push(camera());
    defs.push(light_source());
    defs.push(global_settings());
    defs
}

fn primitive() -> TypeDef {
    TypeDef::new("Primitive")
        .flags(TypeFlags::abstract_base())
        .doc("Shared base of every geometric object.")
        .field(
            FieldDef::flag("active")
                .with_default(true)
                .with_doc("When false the object and its children emit nothing."),
        )
        .field(primitive_ref("bounded_by").with_doc("Manual bounding volume."))
        .field(primitive_ref("clipped_by").with_doc("Clipping volume."))
        .field(FieldDef::flag("double_illuminate"))
        .field(FieldDef::flag("hollow").with_doc("Only meaningful for solid objects."))
        .field(FieldDef::flag("inverse").with_doc("Only meaningful for solid objects."))
        .field(FieldDef::flag("no_image"))
        .field(FieldDef::flag("no_radiosity"))
        .field(FieldDef::flag("no_reflection"))
        .field(FieldDef::flag("no_shadow"))
        .field(
            FieldDef::optional("texture", Predicate::NonEmptyString)
                .with_message("texture must be a non-empty texture identifier"),
        )
        .field(
            FieldDef::optional(
                "satellites",
                Predicate::array_of(Predicate::instance_of("Primitive"), 0, None),
            )
            .with_doc("Objects emitted after this one that follow its transforms."),
        )
        .field(FieldDef::optional("sdl_prepend", Predicate::NonEmptyString))
        .field(FieldDef::optional("sdl_append", Predicate::NonEmptyString))
}

fn solids() -> Vec<TypeDef> {
    vec![
        TypeDef::new("Box")
            .extends("Primitive")
            .keyword("box")
            .flags(TypeFlags::finite_solid())
            .field(vec3_req("corner1"))
            .field(vec3_req("corner2"))
            .field(FieldDef::flag("sturm")),
        TypeDef::new("Sphere")
            .extends("Primitive")
            .keyword("sphere")
            .flags(TypeFlags::finite_solid())
            .field(vec3_req("center"))
            .field(float_req("radius")),
        TypeDef::new("Cylinder")
            .extends("Primitive")
            .keyword("cylinder")
            .flags(TypeFlags::finite_solid())
            .field(vec3_req("base_point"))
            .field(vec3_req("cap_point"))
            .field(float_req("radius"))
            .field(FieldDef::flag("open")),
        TypeDef::new("Cone")
            .extends("Primitive")
            .keyword("cone")
            .flags(TypeFlags::finite_solid())
            .field(vec3_req("base_point"))
            .field(float_req("base_radius"))
            .field(vec3_req("cap_point"))
            .field(float_req("cap_radius"))
            .field(FieldDef::flag("open")),
        TypeDef::new("Torus")
            .extends("Primitive")
            .keyword("torus")
            .flags(TypeFlags::finite_solid())
            .field(float_req("major_radius"))
            .field(float_req("minor_radius"))
            .field(FieldDef::flag("sturm")),
        TypeDef::new("Plane")
            .extends("Primitive")
            .keyword("plane")
            .flags(TypeFlags::infinite_solid())
            .field(vec3_req("normal"))
            .field(float_req("distance")),
        TypeDef::new("Lathe")
            .extends("Primitive")
            .keyword("lathe")
            .flags(TypeFlags::finite_solid())
            .field(
                FieldDef::optional("spline_type", Predicate::one_of(LATHE_SPLINES))
                    .with_default("linear_spline"),
            )
            .field(
                FieldDef::required("points", Predicate::array_of(Predicate::vector(2), 2, None))
                    .with_doc("Minimum count depends on the spline type."),
            )
            .field(FieldDef::flag("sturm")),
        TypeDef::new("SphereSweep")
            .extends("Primitive")
            .keyword("sphere_sweep")
            .flags(TypeFlags::finite_solid())
            .field(FieldDef::required("spline_type", Predicate::one_of(SWEEP_SPLINES)))
            .field(
                FieldDef::required("spheres", Predicate::array_of(Predicate::vector(4), 2, None))
                    .with_doc("Each entry is <x, y, z, radius>."),
            )
            .field(float_opt("tolerance")),
        TypeDef::new("Superellipsoid")
            .extends("Primitive")
            .keyword("superellipsoid")
            .flags(TypeFlags::finite_solid())
            .field(FieldDef::required("e", Predicate::float_range(0.0, f64::MAX)))
            .field(FieldDef::required("n", Predicate::float_range(0.0, f64::MAX))),
        TypeDef::new("Text")
            .extends("Primitive")
            .keyword("text")
            .flags(TypeFlags::finite_solid())
            .field(
                FieldDef::required("font", Predicate::NonEmptyString)
                    .read_only()
                    .with_doc("TrueType font file, fixed at construction."),
            )
            .field(FieldDef::required("display_text", Predicate::NonEmptyString))
            .field(float_req("thickness"))
            .field(vec3_req("offset")),
    ]
}

fn patches() -> Vec<TypeDef> {
    vec![
        TypeDef::new("Disc")
            .extends("Primitive")
            .keyword("disc")
            .flags(TypeFlags::finite_patch())
            .field(vec3_req("center"))
            .field(vec3_req("normal"))
            .field(float_req("radius"))
            .field(float_opt("hole_radius")),
        TypeDef::new("Triangle")
            .extends("Primitive")
            .keyword("triangle")
            .flags(TypeFlags::finite_patch())
            .field(vec3_req("corner1"))
            .field(vec3_req("corner2"))
            .field(vec3_req("corner3")),
        TypeDef::new("Polygon")
            .extends("Primitive")
            .keyword("polygon")
            .flags(TypeFlags::finite_patch())
            .field(
                FieldDef::required("points", Predicate::array_of(Predicate::vector(3), 3, None))
                    .with_message("points must be an array of at least 3 <x, y, z> vectors"),
            ),
    ]
}

fn csg() -> Vec<TypeDef> {
    let objects = FieldDef::required(
        "objects",
        Predicate::array_of(Predicate::instance_of("Primitive"), 1, None),
    )
    .with_doc("Child objects, emitted in order.");

    vec![
        TypeDef::new("Csg")
            .extends("Primitive")
            .flags(TypeFlags {
                abstract_type: true,
                ..TypeFlags::csg()
            })
            .field(objects),
        TypeDef::new("Union")
            .extends("Csg")
            .keyword("union")
            .flags(TypeFlags::csg())
            .field(FieldDef::optional("split_union", Predicate::Bool).with_default(true)),
        TypeDef::new("Merge")
            .extends("Csg")
            .keyword("merge")
            .flags(TypeFlags::csg()),
        TypeDef::new("Intersection")
            .extends("Csg")
            .keyword("intersection")
            .flags(TypeFlags::csg()),
        TypeDef::new("Difference")
            .extends("Csg")
            .keyword("difference")
            .flags(TypeFlags::csg()),
    ]
}

fn color() -> TypeDef {
    TypeDef::new("Color")
        .keyword("rgb")
        .flags(TypeFlags::settings())
        .field(float_req("r"))
        .field(float_req("g"))
        .field(float_req("b"))
        .field(float_opt("f").with_doc("Filter; emitted when non-zero or when transmit is."))
        .field(float_opt("t").with_doc("Transmit; emitted when non-zero."))
        .field(FieldDef::flag("srgb").with_doc("Components are gamma-encoded."))
}

fn camera() -> TypeDef {
    TypeDef::new("Camera")
        .keyword("camera")
        .flags(TypeFlags {
            transformable: true,
            ..TypeFlags::settings()
        })
        .field(
            FieldDef::optional("camera_type", Predicate::one_of(CAMERA_TYPES))
                .read_only()
                .with_doc("Projection, fixed at construction."),
        )
        .field(vec3_opt("location"))
        .field(vec3_opt("right"))
        .field(vec3_opt("up"))
        .field(vec3_opt("direction"))
        .field(vec3_opt("sky"))
        .field(FieldDef::optional("angle", Predicate::float_range(0.0, 360.0)))
        .field(vec3_opt("look_at"))
        .field(float_opt("aperture"))
        .field(FieldDef::optional("blur_samples", Predicate::int_range(1, 65536)))
        .field(vec3_opt("focal_point"))
}

fn light_source() -> TypeDef {
    TypeDef::new("LightSource")
        .keyword("light_source")
        .flags(TypeFlags {
            transformable: true,
            ..TypeFlags::settings()
        })
        .field(vec3_req("location"))
        .field(FieldDef::required("color", Predicate::instance_of("Color")))
        .field(FieldDef::optional("light_type", Predicate::one_of(LIGHT_TYPES)))
        .field(vec3_opt("point_at"))
        .field(float_opt("radius"))
        .field(float_opt("falloff"))
        .field(float_opt("tightness"))
        .field(float_opt("fade_distance"))
        .field(float_opt("fade_power"))
        .field(FieldDef::optional("looks_like", Predicate::instance_of("Primitive")))
}

fn global_settings() -> TypeDef {
    TypeDef::new("GlobalSettings")
        .keyword("global_settings")
        .flags(TypeFlags::settings())
        .field(float_opt("adc_bailout"))
        .field(FieldDef::optional("ambient_light", Predicate::instance_of("Color")))
        .field(float_opt("assumed_gamma").with_default(1.0))
        .field(FieldDef::optional("charset", Predicate::one_of(&["ascii", "utf8", "sys"])))
        .field(FieldDef::optional("max_intersections", Predicate::int_range(1, i64::MAX)))
        .field(FieldDef::optional("max_trace_level", Predicate::int_range(1, 256)))
        .field(FieldDef::optional("number_of_waves", Predicate::int_range(1, i64::MAX)))
        .field(FieldDef::optional("noise_generator", Predicate::int_range(1, 3)))
}
