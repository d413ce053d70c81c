//! Scene graph to SDL text
//!
//! Every entity is emitted as a frame shared by all types:
//!
//! ```text
//! <sdl_prepend>
//! keyword {
//!     <type-specific body>
//!     <common tail: clipping, bounding, visibility, hollow/inverse, texture, matrix>
//! }
//! <sdl_append>
//! <satellites>
//! ```
//!
//! The body comes from a per-type routine, selected by walking the class
//! and then its ancestors, so user-defined subtypes of a builtin object
//! inherit its routine. Types without one use the generic routine, which
//! writes each set field as `name value` in declaration order.
//!
//! Emission never mutates the graph. Deferred values are invoked again and
//! re-checked against their predicate.

use std::iter;

use super::errors::{EmitError, EmitResult};
use super::format;
use crate::config::EmitConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::scene::{Entity, SceneGraph, Transform};
use crate::value::{EntityId, FieldValue, Value};

/// Fields written by the common tail rather than by a body routine.
const TAIL_FIELDS: &[&str] = &[
    "active",
    "bounded_by",
    "clipped_by",
    "double_illuminate",
    "hollow",
    "inverse",
    "no_image",
    "no_radiosity",
    "no_reflection",
    "no_shadow",
    "texture",
    "satellites",
    "sdl_prepend",
    "sdl_append",
];

const VISIBILITY_FLAGS: &[&str] = &[
    "no_shadow",
    "no_image",
    "no_reflection",
    "no_radiosity",
    "double_illuminate",
];

/// A stored field value ready for output.
#[derive(Debug, Clone)]
enum Resolved {
    Verbatim(String),
    Value(Value),
}

impl Resolved {
    fn plain(&self, owner: &Entity) -> EmitResult<String> {
        match self {
            Resolved::Verbatim(text) => Ok(text.clone()),
            Resolved::Value(v) => plain_value(owner, v),
        }
    }

    /// Verbatim text counts as non-zero.
    fn is_nonzero(&self) -> bool {
        match self {
            Resolved::Verbatim(_) => true,
            Resolved::Value(v) => v.as_f64() != Some(0.0),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Resolved::Value(Value::Str(s)) => Some(s),
            _ => None,
        }
    }
}

/// Output buffer for one `keyword { ... }` block.
struct Block<'c> {
    config: &'c EmitConfig,
    depth: usize,
    out: String,
}

impl<'c> Block<'c> {
    fn open(config: &'c EmitConfig, depth: usize, header: &str) -> Self {
        let out = format!("{}{} {{\n", config.indent(depth), header);
        Self { config, depth, out }
    }

    /// Depth of the lines inside the block.
    fn inner(&self) -> usize {
        self.depth + 1
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(&self.config.indent(self.inner()));
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    /// Appends text that is already indented.
    fn nested(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn close(mut self) -> String {
        self.out.push_str(&self.config.indent(self.depth));
        self.out.push_str("}\n");
        self.out
    }
}

/// Serializes entities of one scene graph.
pub struct Emitter<'g> {
    graph: &'g SceneGraph,
    config: EmitConfig,
}

impl<'g> Emitter<'g> {
    /// Emitter with the default configuration.
    pub fn new(graph: &'g SceneGraph) -> Self {
        Self {
            graph,
            config: EmitConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EmitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    /// Emits one entity, its children and satellites, nested `depth` levels.
    /// An inactive entity yields an empty string.
    pub fn emit(&self, id: EntityId, depth: usize) -> EmitResult<String> {
        log_event_with_fields(Event::EmitBegin, &[("serial", &id.to_string())]);
        let result = self.render(id, depth, &mut Vec::new());
        log_outcome(&result);
        result
    }

    /// Emits a complete scene file: `#version`, includes, then global
    /// settings, cameras, lights and the remaining roots in creation order.
    /// Colors referenced nowhere are skipped. Entities that only reference
    /// each other are never roots and fail the scene as a cycle.
    pub fn emit_scene(&self) -> EmitResult<String> {
        let roots = self.graph.roots();
        log_event_with_fields(Event::EmitBegin, &[("roots", &roots.len().to_string())]);
        let result = self.assemble(&roots);
        log_outcome(&result);
        result
    }

    fn assemble(&self, roots: &[EntityId]) -> EmitResult<String> {
        let detached = self.graph.unreachable();
        if let Some(&id) = detached.iter().find(|&&id| self.graph.is_cyclic(id)) {
            return Err(EmitError::Cycle {
                owner: self.graph.entity(id)?.label(),
            });
        }

        let mut out = format!("#version {};\n", self.config.sdl_version);
        for include in &self.config.includes {
            out.push_str(&format!("#include {}\n", format::quoted(include)));
        }

        let mut sections: [Vec<EntityId>; 4] = Default::default();
        for &id in roots {
            let class = self.graph.entity(id)?.class();
            let slot = if class.is_a("GlobalSettings") {
                0
            } else if class.is_a("Camera") {
                1
            } else if class.is_a("LightSource") {
                2
            } else if class.is_a("Color") {
                continue;
            } else {
                3
            };
            sections[slot].push(id);
        }

        for &id in sections.iter().flatten() {
            let text = self.render(id, 0, &mut Vec::new())?;
            if !text.is_empty() {
                out.push('\n');
                out.push_str(&text);
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Frame
    // =========================================================================

    fn render(&self, id: EntityId, depth: usize, stack: &mut Vec<EntityId>) -> EmitResult<String> {
        self.render_placed(id, depth, stack, None)
    }

    /// Renders an entity placed under `parent`, the emitted transform of
    /// the object it is a satellite of.
    fn render_placed(
        &self,
        id: EntityId,
        depth: usize,
        stack: &mut Vec<EntityId>,
        parent: Option<Transform>,
    ) -> EmitResult<String> {
        let entity = self.graph.entity(id)?;
        if stack.contains(&id) {
            return Err(EmitError::Cycle {
                owner: entity.label(),
            });
        }
        if !self.is_active(entity)? {
            return Ok(String::new());
        }
        if entity.class().is_a("Color") {
            return Ok(format!("{}{}\n", self.config.indent(depth), self.color(entity)?));
        }

        stack.push(id);
        let result = self.render_block(entity, depth, stack, parent);
        stack.pop();
        result
    }

    /// Renders an entity reached through `owner.field`.
    fn render_ref(
        &self,
        owner: &Entity,
        field: &str,
        id: EntityId,
        depth: usize,
        stack: &mut Vec<EntityId>,
    ) -> EmitResult<String> {
        self.target(owner, field, id)?;
        self.render(id, depth, stack)
    }

    fn render_block(
        &self,
        entity: &Entity,
        depth: usize,
        stack: &mut Vec<EntityId>,
        parent: Option<Transform>,
    ) -> EmitResult<String> {
        let class = entity.class();
        let keyword = class.keyword().ok_or_else(|| {
            EmitError::structure(entity.label(), format!("type '{}' has no SDL keyword", class.name()))
        })?;

        let mut out = String::new();
        if let Some(prepend) = self.field(entity, "sdl_prepend")? {
            out.push_str(&format!("{}{}\n", self.config.indent(depth), prepend.plain(entity)?));
        }

        let placed = placement(entity, parent);
        let mut block = Block::open(&self.config, depth, keyword);
        self.body(entity, &mut block, stack)?;
        if class.is_a("Primitive") {
            self.common_tail(entity, &mut block, stack)?;
        }
        if let Some(transform) = placed {
            transform_line(&transform, &mut block);
        }
        out.push_str(&block.close());

        if let Some(append) = self.field(entity, "sdl_append")? {
            out.push_str(&format!("{}{}\n", self.config.indent(depth), append.plain(entity)?));
        }

        match self.field(entity, "satellites")? {
            Some(Resolved::Value(Value::List(items))) => {
                for item in items {
                    if let Value::Entity(satellite) = item {
                        self.target(entity, "satellites", satellite)?;
                        out.push_str(&self.render_placed(satellite, depth, stack, placed)?);
                    }
                }
            }
            Some(Resolved::Verbatim(text)) => {
                out.push_str(&format!("{}{}\n", self.config.indent(depth), text));
            }
            _ => {}
        }
        Ok(out)
    }

    fn body(&self, entity: &Entity, block: &mut Block, stack: &mut Vec<EntityId>) -> EmitResult<()> {
        let class = entity.class();
        if class.flags().csg {
            return self.csg(entity, block, stack);
        }

        let lineage = iter::once(class.name()).chain(class.ancestors().iter().map(String::as_str));
        for name in lineage {
            match name {
                "Box" => return self.box_body(entity, block),
                "Sphere" => return self.sphere(entity, block),
                "Cylinder" => return self.cylinder(entity, block),
                "Cone" => return self.cone(entity, block),
                "Torus" => return self.torus(entity, block),
                "Plane" => return self.plane(entity, block),
                "Disc" => return self.disc(entity, block),
                "Triangle" => return self.triangle(entity, block),
                "Polygon" => return self.polygon(entity, block),
                "Lathe" => return self.lathe(entity, block),
                "SphereSweep" => return self.sphere_sweep(entity, block),
                "Superellipsoid" => return self.superellipsoid(entity, block),
                "Text" => return self.text(entity, block),
                "Camera" => return self.camera(entity, block, stack),
                "LightSource" => return self.light_source(entity, block, stack),
                _ => {}
            }
        }
        self.generic(entity, block, stack, &[])
    }

    /// Attributes shared by every object, in fixed order.
    fn common_tail(&self, entity: &Entity, block: &mut Block, stack: &mut Vec<EntityId>) -> EmitResult<()> {
        for field in ["clipped_by", "bounded_by"] {
            match self.field(entity, field)? {
                Some(Resolved::Value(Value::Entity(id))) => self.wrapped(entity, field, id, block, stack)?,
                Some(Resolved::Verbatim(text)) => block.line(format!("{} {{ {} }}", field, text)),
                Some(Resolved::Value(other)) => {
                    return Err(EmitError::structure(
                        entity.label(),
                        format!("{} must reference an object, got {}", field, other),
                    ))
                }
                None => {}
            }
        }

        for flag in VISIBILITY_FLAGS {
            if let Some(line) = self.flag_line(entity, flag)? {
                block.line(line);
            }
        }

        let solid = entity.class().flags().solid;
        for flag in ["hollow", "inverse"] {
            if let Some(line) = self.flag_line(entity, flag)? {
                if solid {
                    block.line(line);
                } else {
                    log_event_with_fields(
                        Event::AttributeSkipped,
                        &[("attribute", flag), ("owner", &entity.label().to_string())],
                    );
                }
            }
        }

        if let Some(texture) = self.field(entity, "texture")? {
            block.line(format!("texture {{ {} }}", texture.plain(entity)?));
        }
        Ok(())
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Stored value of a field. Defaults are not consulted.
    fn field(&self, entity: &Entity, name: &str) -> EmitResult<Option<Resolved>> {
        let Some(def) = entity.class().field(name) else {
            return Ok(None);
        };
        match entity.value(name) {
            None => Ok(None),
            Some(FieldValue::Verbatim(text)) => Ok(Some(Resolved::Verbatim(text.clone()))),
            Some(FieldValue::Literal(v)) => Ok(Some(Resolved::Value(v.clone()))),
            Some(FieldValue::Deferred(producer)) => {
                let v = producer();
                if def.predicate.check(&v, self.graph) {
                    Ok(Some(Resolved::Value(v)))
                } else {
                    Err(EmitError::Invalid {
                        owner: entity.label(),
                        field: name.to_string(),
                        message: def.message(),
                    })
                }
            }
        }
    }

    fn required(&self, entity: &Entity, name: &str) -> EmitResult<Resolved> {
        self.field(entity, name)?.ok_or_else(|| EmitError::MissingField {
            owner: entity.label(),
            field: name.to_string(),
        })
    }

    fn required_plain(&self, entity: &Entity, name: &str) -> EmitResult<String> {
        self.required(entity, name)?.plain(entity)
    }

    /// `name` when the flag is true, `name <text>` for verbatim text.
    fn flag_line(&self, entity: &Entity, name: &str) -> EmitResult<Option<String>> {
        Ok(match self.field(entity, name)? {
            Some(Resolved::Value(Value::Bool(true))) => Some(name.to_string()),
            Some(Resolved::Verbatim(text)) => Some(format!("{} {}", name, text)),
            _ => None,
        })
    }

    fn is_active(&self, entity: &Entity) -> EmitResult<bool> {
        Ok(!matches!(
            self.field(entity, "active")?,
            Some(Resolved::Value(Value::Bool(false)))
        ))
    }

    fn target(&self, owner: &Entity, field: &str, id: EntityId) -> EmitResult<&'g Entity> {
        self.graph.entity(id).map_err(|_| EmitError::DanglingReference {
            owner: owner.label(),
            field: field.to_string(),
            target: id,
        })
    }

    /// `field { <child> }`
    fn wrapped(
        &self,
        owner: &Entity,
        field: &str,
        id: EntityId,
        block: &mut Block,
        stack: &mut Vec<EntityId>,
    ) -> EmitResult<()> {
        let child = self.render_ref(owner, field, id, block.inner() + 1, stack)?;
        if !child.is_empty() {
            block.line(format!("{} {{", field));
            block.nested(&child);
            block.line("}");
        }
        Ok(())
    }

    /// Writes one generic `name value` attribute.
    fn attribute(
        &self,
        owner: &Entity,
        name: &str,
        value: Resolved,
        block: &mut Block,
        stack: &mut Vec<EntityId>,
    ) -> EmitResult<()> {
        match value {
            Resolved::Verbatim(text) => block.line(format!("{} {}", name, text)),
            Resolved::Value(Value::Bool(true)) => block.line(name),
            Resolved::Value(Value::Bool(false)) => {}
            Resolved::Value(Value::Entity(id)) => {
                let target = self.target(owner, name, id)?;
                if target.class().is_a("Color") {
                    block.line(format!("{} {}", name, self.color(target)?));
                } else {
                    self.wrapped(owner, name, id, block, stack)?;
                }
            }
            Resolved::Value(Value::List(items)) if items.iter().any(|v| matches!(v, Value::Entity(_))) => {
                self.reference_list(owner, name, &items, block, stack)?
            }
            Resolved::Value(v) => block.line(format!("{} {}", name, plain_value(owner, &v)?)),
        }
        Ok(())
    }

    /// A list of references: `name c1, c2` when every target is a color,
    /// otherwise `name { <children> }`.
    fn reference_list(
        &self,
        owner: &Entity,
        name: &str,
        items: &[Value],
        block: &mut Block,
        stack: &mut Vec<EntityId>,
    ) -> EmitResult<()> {
        let mut targets = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Entity(id) => targets.push(self.target(owner, name, *id)?),
                other => {
                    return Err(EmitError::structure(
                        owner.label(),
                        format!("{} mixes references with {}", name, other),
                    ))
                }
            }
        }

        if targets.iter().all(|t| t.class().is_a("Color")) {
            let colors = targets
                .into_iter()
                .map(|t| self.color(t))
                .collect::<EmitResult<Vec<_>>>()?;
            block.line(format!("{} {}", name, colors.join(", ")));
            return Ok(());
        }

        let mut children = String::new();
        for target in targets {
            children.push_str(&self.render(target.serial(), block.inner() + 1, stack)?);
        }
        if !children.is_empty() {
            block.line(format!("{} {{", name));
            block.nested(&children);
            block.line("}");
        }
        Ok(())
    }

    /// Every set field as `name value`, in declaration order.
    fn generic(
        &self,
        entity: &Entity,
        block: &mut Block,
        stack: &mut Vec<EntityId>,
        skip: &[&str],
    ) -> EmitResult<()> {
        let primitive = entity.class().is_a("Primitive");
        for def in entity.class().fields() {
            let name = def.name.as_str();
            if skip.contains(&name) || (primitive && TAIL_FIELDS.contains(&name)) {
                continue;
            }
            if let Some(value) = self.field(entity, name)? {
                self.attribute(entity, name, value, block, stack)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Colors
    // =========================================================================

    /// Inline color: `rgb <r, g, b>` with filter and transmit when present.
    fn color(&self, entity: &Entity) -> EmitResult<String> {
        let mut components = vec![
            self.required_plain(entity, "r")?,
            self.required_plain(entity, "g")?,
            self.required_plain(entity, "b")?,
        ];

        let transmit = self.field(entity, "t")?.filter(Resolved::is_nonzero);
        let filter = match self.field(entity, "f")? {
            Some(f) if transmit.is_some() || f.is_nonzero() => Some(f),
            None if transmit.is_some() => Some(Resolved::Value(Value::Float(0.0))),
            _ => None,
        };
        let srgb = matches!(self.field(entity, "srgb")?, Some(Resolved::Value(Value::Bool(true))));

        let keyword = format::color_keyword(
            entity.class().keyword().unwrap_or("rgb"),
            srgb,
            filter.is_some(),
            transmit.is_some(),
        );
        for extra in filter.iter().chain(transmit.iter()) {
            components.push(extra.plain(entity)?);
        }
        Ok(format!("{} {}", keyword, format::vector(&components)))
    }

    /// A color-valued field: inline color, or verbatim text as given.
    fn color_field(&self, owner: &Entity, name: &str) -> EmitResult<String> {
        match self.required(owner, name)? {
            Resolved::Value(Value::Entity(id)) => self.color(self.target(owner, name, id)?),
            other => other.plain(owner),
        }
    }

    // =========================================================================
    // Object routines
    // =========================================================================

    fn box_body(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}",
            self.required_plain(entity, "corner1")?,
            self.required_plain(entity, "corner2")?
        ));
        self.trailing_flags(entity, block, &["sturm"])
    }

    fn sphere(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}",
            self.required_plain(entity, "center")?,
            self.required_plain(entity, "radius")?
        ));
        Ok(())
    }

    fn cylinder(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}, {}",
            self.required_plain(entity, "base_point")?,
            self.required_plain(entity, "cap_point")?,
            self.required_plain(entity, "radius")?
        ));
        self.trailing_flags(entity, block, &["open"])
    }

    fn cone(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}, {}, {}",
            self.required_plain(entity, "base_point")?,
            self.required_plain(entity, "base_radius")?,
            self.required_plain(entity, "cap_point")?,
            self.required_plain(entity, "cap_radius")?
        ));
        self.trailing_flags(entity, block, &["open"])
    }

    fn torus(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}",
            self.required_plain(entity, "major_radius")?,
            self.required_plain(entity, "minor_radius")?
        ));
        self.trailing_flags(entity, block, &["sturm"])
    }

    fn plane(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}",
            self.required_plain(entity, "normal")?,
            self.required_plain(entity, "distance")?
        ));
        Ok(())
    }

    fn disc(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let mut line = format!(
            "{}, {}, {}",
            self.required_plain(entity, "center")?,
            self.required_plain(entity, "normal")?,
            self.required_plain(entity, "radius")?
        );
        if let Some(hole) = self.field(entity, "hole_radius")? {
            line.push_str(&format!(", {}", hole.plain(entity)?));
        }
        block.line(line);
        Ok(())
    }

    fn triangle(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        block.line(format!(
            "{}, {}, {}",
            self.required_plain(entity, "corner1")?,
            self.required_plain(entity, "corner2")?,
            self.required_plain(entity, "corner3")?
        ));
        Ok(())
    }

    fn polygon(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let points = self.required(entity, "points")?;
        block.line(self.point_list(entity, &points, 3, format::value)?);
        Ok(())
    }

    fn lathe(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let spline = self.field(entity, "spline_type")?;
        let effective = match &spline {
            Some(s) => s.text().map(str::to_string),
            None => entity
                .class()
                .field("spline_type")
                .and_then(|def| def.default.as_ref())
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some("linear_spline".to_string())),
        };

        let points = self.required(entity, "points")?;
        let minimum = effective.as_deref().map_or(0, spline_minimum);
        if let (Some("bezier_spline"), Resolved::Value(Value::List(items))) = (effective.as_deref(), &points) {
            if items.len() % 4 != 0 {
                return Err(EmitError::structure(
                    entity.label(),
                    format!("bezier_spline needs a multiple of 4 points, got {}", items.len()),
                ));
            }
        }

        if let Some(spline) = spline {
            block.line(spline.plain(entity)?);
        }
        block.line(self.point_list(entity, &points, minimum, format::value)?);
        self.trailing_flags(entity, block, &["sturm"])
    }

    fn sphere_sweep(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let spline = self.required(entity, "spline_type")?;
        let minimum = spline.text().map_or(0, spline_minimum);
        let spheres = self.required(entity, "spheres")?;

        block.line(spline.plain(entity)?);
        block.line(self.point_list(entity, &spheres, minimum, sweep_sphere)?);
        if let Some(tolerance) = self.field(entity, "tolerance")? {
            block.line(format!("tolerance {}", tolerance.plain(entity)?));
        }
        Ok(())
    }

    fn superellipsoid(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let e = self.required_plain(entity, "e")?;
        let n = self.required_plain(entity, "n")?;
        block.line(format::vector(&[e, n]));
        Ok(())
    }

    fn text(&self, entity: &Entity, block: &mut Block) -> EmitResult<()> {
        let quote = |r: Resolved| match r {
            Resolved::Value(Value::Str(s)) => Ok(format::quoted(&s)),
            other => other.plain(entity),
        };
        block.line(format!(
            "ttf {} {} {}, {}",
            quote(self.required(entity, "font")?)?,
            quote(self.required(entity, "display_text")?)?,
            self.required_plain(entity, "thickness")?,
            self.required_plain(entity, "offset")?
        ));
        Ok(())
    }

    /// `n, <p1>, <p2>, ...` after checking the point count against
    /// `minimum`. Verbatim text is written as is.
    fn point_list(
        &self,
        entity: &Entity,
        points: &Resolved,
        minimum: usize,
        render: fn(&Value) -> Option<String>,
    ) -> EmitResult<String> {
        let items = match points {
            Resolved::Verbatim(text) => return Ok(text.clone()),
            Resolved::Value(Value::List(items)) => items,
            Resolved::Value(other) => {
                return Err(EmitError::structure(
                    entity.label(),
                    format!("expected a list of points, got {}", other),
                ))
            }
        };
        if items.len() < minimum {
            return Err(EmitError::structure(
                entity.label(),
                format!("needs at least {} points, got {}", minimum, items.len()),
            ));
        }

        let mut parts = vec![items.len().to_string()];
        for item in items {
            parts.push(render(item).ok_or_else(|| inline_error(entity, item))?);
        }
        Ok(parts.join(", "))
    }

    fn trailing_flags(&self, entity: &Entity, block: &mut Block, flags: &[&str]) -> EmitResult<()> {
        for flag in flags {
            if let Some(line) = self.flag_line(entity, flag)? {
                block.line(line);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Containers and settings
    // =========================================================================

    /// Children in order, then `split_union off` when explicitly disabled.
    fn csg(&self, entity: &Entity, block: &mut Block, stack: &mut Vec<EntityId>) -> EmitResult<()> {
        match self.required(entity, "objects")? {
            Resolved::Verbatim(text) => block.line(text),
            Resolved::Value(Value::List(children)) => {
                if children.len() < 2 {
                    return Err(EmitError::structure(
                        entity.label(),
                        format!("needs at least 2 objects, got {}", children.len()),
                    ));
                }
                for child in children {
                    match child {
                        Value::Entity(id) => {
                            let text = self.render_ref(entity, "objects", id, block.inner(), stack)?;
                            block.nested(&text);
                        }
                        other => {
                            return Err(EmitError::structure(
                                entity.label(),
                                format!("objects must be entities, got {}", other),
                            ))
                        }
                    }
                }
            }
            Resolved::Value(other) => {
                return Err(EmitError::structure(
                    entity.label(),
                    format!("objects must be a list, got {}", other),
                ))
            }
        }

        if let Some(Resolved::Value(Value::Bool(false))) = self.field(entity, "split_union")? {
            block.line("split_union off");
        }
        Ok(())
    }

    fn camera(&self, entity: &Entity, block: &mut Block, stack: &mut Vec<EntityId>) -> EmitResult<()> {
        if let Some(projection) = self.field(entity, "camera_type")? {
            block.line(projection.plain(entity)?);
        }
        self.generic(entity, block, stack, &["camera_type"])
    }

    fn light_source(&self, entity: &Entity, block: &mut Block, stack: &mut Vec<EntityId>) -> EmitResult<()> {
        block.line(format!(
            "{}, {}",
            self.required_plain(entity, "location")?,
            self.color_field(entity, "color")?
        ));
        if let Some(kind) = self.field(entity, "light_type")? {
            block.line(kind.plain(entity)?);
        }
        self.generic(entity, block, stack, &["location", "color", "light_type"])
    }
}

fn log_outcome(result: &EmitResult<String>) {
    match result {
        Ok(text) => log_event_with_fields(Event::EmitComplete, &[("bytes", &text.len().to_string())]),
        Err(e) => log_event_with_fields(
            Event::EmitFailed,
            &[("code", e.code()), ("error", &e.to_string())],
        ),
    }
}

/// Fewest control points a spline accepts.
fn spline_minimum(spline: &str) -> usize {
    match spline {
        "quadratic_spline" => 3,
        "cubic_spline" | "bezier_spline" | "b_spline" => 4,
        _ => 2,
    }
}

/// `<x, y, z>, r`
fn sweep_sphere(v: &Value) -> Option<String> {
    match v.as_list() {
        Some([x, y, z, r]) => Some(format!(
            "{}, {}",
            format::vector(&[format::value(x)?, format::value(y)?, format::value(z)?]),
            format::value(r)?
        )),
        _ => format::value(v),
    }
}

/// Emitted transform: the entity's own cumulative transform followed by
/// its parent's placement. `None` when neither was ever touched.
fn placement(entity: &Entity, parent: Option<Transform>) -> Option<Transform> {
    let own = entity.transform_state().map(|s| s.current());
    if !entity.class().flags().transformable {
        return own;
    }
    match (own, parent) {
        (Some(own), Some(parent)) => Some(own.then(&parent)),
        (own, None) => own,
        (None, parent) => parent,
    }
}

fn transform_line(transform: &Transform, block: &mut Block) {
    let rows = transform.to_rows().map(format::number);
    block.line(format!("matrix {}", format::vector(&rows)));
}

fn plain_value(owner: &Entity, v: &Value) -> EmitResult<String> {
    format::value(v).ok_or_else(|| inline_error(owner, v))
}

fn inline_error(owner: &Entity, v: &Value) -> EmitError {
    EmitError::structure(owner.label(), format!("{} cannot be written inline", v))
}
