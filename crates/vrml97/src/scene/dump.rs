//! Indented text rendering of a scene, mostly for tests and debugging.

use std::fmt::Write;

use super::{ElementId, ElementKind, MarkerKind, NodeOrigin, Scene};
use crate::values::FieldValue;

pub struct ScenePrinter<'s> {
    scene: &'s Scene,
    spans: bool,
    generated: bool,
}

impl<'s> ScenePrinter<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Self {
            scene,
            spans: false,
            generated: true,
        }
    }

    /// Append `@start..end` token spans.
    pub fn with_spans(mut self, value: bool) -> Self {
        self.spans = value;
        self
    }

    /// Include PROTO instance copies.
    pub fn with_generated(mut self, value: bool) -> Self {
        self.generated = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        self.format_element(self.scene.root(), 0, w)
    }

    fn format_element(&self, id: ElementId, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let element = &self.scene[id];
        if element.generated && !self.generated {
            return Ok(());
        }
        let prefix = "  ".repeat(indent);

        write!(w, "{prefix}")?;
        self.format_label(id, w)?;
        if self.spans && !element.generated {
            write!(w, " @{}..{}", element.span.start, element.span.end)?;
        }
        writeln!(w)?;

        for note in element.notes() {
            writeln!(w, "{prefix}  ! {}", note.message)?;
        }
        for &child in &element.children {
            self.format_element(child, indent + 1, w)?;
        }
        Ok(())
    }

    fn format_label(&self, id: ElementId, w: &mut impl Write) -> std::fmt::Result {
        let scene = self.scene;
        match &scene[id].kind {
            ElementKind::Scene => write!(w, "Scene"),
            ElementKind::Node(node) => {
                write!(w, "Node {}", scene.resolve_symbol(node.name))?;
                match node.origin {
                    NodeOrigin::BuiltIn => {}
                    NodeOrigin::Script => write!(w, " (Script)")?,
                    NodeOrigin::Proto(_) => write!(w, " (PROTO)")?,
                    NodeOrigin::ExternProto(_) => write!(w, " (EXTERNPROTO)")?,
                }
                if node.has_is {
                    write!(w, " IS")?;
                }
                if !node.functions.is_empty() {
                    write!(w, " functions={}", node.functions.join(","))?;
                }
                Ok(())
            }
            ElementKind::Def(def) => write!(w, "DEF {}", def.name),
            ElementKind::Use(data) => {
                write!(w, "USE {}", data.name)?;
                if data.loops {
                    write!(w, " (loop)")?;
                }
                Ok(())
            }
            ElementKind::Field(field) => {
                write!(w, "Field {} {} {}", field.kind, field.data_type, field.name)
            }
            ElementKind::Value(value) => format_value(value, w),
            ElementKind::Is(is) => write!(w, "IS {}", is.name),
            ElementKind::Proto(proto) => {
                let keyword = if proto.external { "EXTERNPROTO" } else { "PROTO" };
                write!(w, "{keyword} {}", proto.name)?;
                if let Some(builtin) = &proto.builtin_type {
                    write!(w, " -> {builtin}")?;
                }
                Ok(())
            }
            ElementKind::Interface(interface) => write!(
                w,
                "Interface {} {} {}",
                interface.kind, interface.data_type, interface.name
            ),
            ElementKind::InstanceBody => write!(w, "InstanceBody"),
            ElementKind::Route => write!(w, "ROUTE"),
            ElementKind::Endpoint(endpoint) => {
                write!(w, "Endpoint {}.{}", endpoint.node_name, endpoint.field)
            }
            ElementKind::Marker(marker) => write!(w, "Marker {}", marker_name(*marker)),
        }
    }
}

fn format_value(value: &FieldValue, w: &mut impl Write) -> std::fmt::Result {
    write!(w, "Value {}", value.field_type())?;
    match value {
        FieldValue::Bool(Some(b)) => write!(w, " {}", if *b { "TRUE" } else { "FALSE" }),
        FieldValue::Color(Some(v)) | FieldValue::Vec3f(Some(v)) => {
            write!(w, " {} {} {}", v[0], v[1], v[2])
        }
        FieldValue::Float(Some(v)) => write!(w, " {v}"),
        FieldValue::Image(Some(image)) => write!(
            w,
            " {}x{}x{} pixels={}",
            image.width, image.height, image.depth, image.pixels
        ),
        FieldValue::Int32(Some(v)) => write!(w, " {v}"),
        FieldValue::Node(count) => write!(w, " nodes={count}"),
        FieldValue::Rotation(Some(v)) => write!(w, " {} {} {} {}", v[0], v[1], v[2], v[3]),
        FieldValue::String(Some(s)) => write!(w, " {s:?}"),
        FieldValue::Time(Some(v)) => write!(w, " {v}"),
        FieldValue::Vec2f(Some(v)) => write!(w, " {} {}", v[0], v[1]),
        FieldValue::Multi(multi) => write!(w, " count={}", multi.count),
        _ => write!(w, " ?"),
    }
}

fn marker_name(marker: MarkerKind) -> &'static str {
    match marker {
        MarkerKind::Header => "header",
        MarkerKind::LeftBracket => "[",
        MarkerKind::RightBracket => "]",
        MarkerKind::LeftBrace => "{",
        MarkerKind::RightBrace => "}",
        MarkerKind::Unexpected => "unexpected",
        MarkerKind::Invalid => "invalid",
        MarkerKind::Short => "short",
        MarkerKind::Limit => "limit",
    }
}
