//! Built-in node table.
//!
//! Two layers, as with any embedded data set:
//! - **Deserialization layer**: 1:1 mapping to `vrml97.json`
//! - **Lookup layer**: name-indexed node specs with parsed field descriptors

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::{Extension, FieldType, InterfaceKind, Limit, NodeClass, ValueConstraint, spelling};

const VRML97_JSON: &str = include_str!("vrml97.json");

static VRML97: LazyLock<SpecTable> = LazyLock::new(|| {
    let raw = parse_table(VRML97_JSON).unwrap_or_else(|err| crate::invariants::bad_table(&err));
    SpecTable::from_raw(raw)
});

/// The process-wide VRML97 table.
pub fn vrml97() -> &'static SpecTable {
    &VRML97
}

// ============================================================================
// Deserialization Layer
// ============================================================================

#[derive(Debug, Clone, serde::Deserialize)]
struct RawTable {
    nodes: Vec<RawNode>,
}

/// Raw node definition from `vrml97.json`.
///
/// Fields are written the way the VRML97 node reference writes them:
/// `"exposedField SFVec3f translation 0 0 0"`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawNode {
    pub name: String,
    pub classes: Vec<NodeClass>,
    pub fields: Vec<String>,
    #[serde(default)]
    pub accepts: HashMap<String, NodeClass>,
    #[serde(default)]
    pub limits: HashMap<String, (usize, usize)>,
    #[serde(default)]
    pub constraints: HashMap<String, ValueConstraint>,
    #[serde(default)]
    pub extension: Option<Extension>,
}

/// Parse table JSON into raw nodes.
pub fn parse_table(json: &str) -> Result<Vec<RawNode>, serde_json::Error> {
    serde_json::from_str::<RawTable>(json).map(|t| t.nodes)
}

// ============================================================================
// Lookup Layer
// ============================================================================

/// Everything the parser needs to know about one field of a built-in node.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: InterfaceKind,
    pub data_type: FieldType,
    /// Default value as VRML text; `None` for events.
    pub default_text: Option<String>,
    pub limit: Option<Limit>,
    /// Node class accepted by SFNode/MFNode fields.
    pub accepts: Option<NodeClass>,
    pub constraint: Option<ValueConstraint>,
}

/// A field resolved by name, possibly through an implicit event name.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'t> {
    pub descriptor: &'t FieldDescriptor,
    /// `EventIn` for `set_x`, `EventOut` for `x_changed`, else the declared kind.
    pub kind: InterfaceKind,
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub classes: Vec<NodeClass>,
    pub fields: IndexMap<String, FieldDescriptor>,
    pub extension: Option<Extension>,
}

impl NodeSpec {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn is_a(&self, class: NodeClass) -> bool {
        self.classes.contains(&class)
    }

    /// Resolves a field id, including `set_`/`_changed` forms of exposed fields.
    pub fn resolve(&self, field_id: &str) -> Option<ResolvedField<'_>> {
        if let Some(descriptor) = self.fields.get(field_id) {
            return Some(ResolvedField {
                descriptor,
                kind: descriptor.kind,
            });
        }
        let (base, kind) = split_event_name(field_id)?;
        let descriptor = self.fields.get(base)?;
        if descriptor.kind != InterfaceKind::ExposedField {
            return None;
        }
        Some(ResolvedField { descriptor, kind })
    }

    /// Closest field name, not filtered by the acceptance threshold.
    pub fn closest_field(&self, name: &str) -> Option<(&str, u32)> {
        spelling::best_match(name, self.fields.keys().map(String::as_str))
    }
}

/// Splits `set_x` into (`x`, EventIn) and `x_changed` into (`x`, EventOut).
pub fn split_event_name(field_id: &str) -> Option<(&str, InterfaceKind)> {
    if let Some(base) = field_id.strip_prefix("set_") {
        return (!base.is_empty()).then_some((base, InterfaceKind::EventIn));
    }
    field_id
        .strip_suffix("_changed")
        .filter(|base| !base.is_empty())
        .map(|base| (base, InterfaceKind::EventOut))
}

/// Node descriptors for all built-in nodes, extensions included.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    nodes: IndexMap<String, NodeSpec>,
}

impl SpecTable {
    pub fn from_raw(raw: Vec<RawNode>) -> Self {
        let mut nodes = IndexMap::with_capacity(raw.len());
        for node in raw {
            let mut fields = IndexMap::with_capacity(node.fields.len());
            for line in &node.fields {
                let (kind, data_type, name, default_text) = parse_field_line(line)
                    .unwrap_or_else(|| crate::invariants::bad_field_line(&node.name, line));
                let descriptor = FieldDescriptor {
                    name: name.to_owned(),
                    kind,
                    data_type,
                    default_text: default_text.map(str::to_owned),
                    limit: node
                        .limits
                        .get(name)
                        .map(|&(max, per_unit)| Limit::new(max, per_unit)),
                    accepts: node.accepts.get(name).copied(),
                    constraint: node.constraints.get(name).copied(),
                };
                fields.insert(name.to_owned(), descriptor);
            }
            let spec = NodeSpec {
                name: node.name.clone(),
                classes: node.classes,
                fields,
                extension: node.extension,
            };
            nodes.insert(node.name, spec);
        }
        Self { nodes }
    }

    /// Node spec by name; extension nodes only when `nurbs` is on.
    pub fn node(&self, name: &str, nurbs: bool) -> Option<&NodeSpec> {
        self.nodes
            .get(name)
            .filter(|spec| nurbs || spec.extension.is_none())
    }

    pub fn is_built_in_node(&self, name: &str, nurbs: bool) -> bool {
        self.node(name, nurbs).is_some()
    }

    pub fn is_built_in_type(&self, name: &str) -> bool {
        FieldType::from_name(name).is_some()
    }

    /// Looks up a declared field. Extension nodes are always visible here
    /// because a node that was built already passed the extension check.
    pub fn field_descriptor(&self, node: &str, field: &str) -> Option<&FieldDescriptor> {
        self.nodes.get(node)?.field(field)
    }

    /// Interface kind and type of `field_id`, accepting implicit event names.
    pub fn interface_type_of(&self, node: &str, field_id: &str) -> Option<ResolvedField<'_>> {
        self.nodes.get(node)?.resolve(field_id)
    }

    pub fn node_names(&self, nurbs: bool) -> impl Iterator<Item = &str> {
        self.nodes
            .values()
            .filter(move |spec| nurbs || spec.extension.is_none())
            .map(|spec| spec.name.as_str())
    }

    pub fn closest_node(&self, name: &str, nurbs: bool) -> Option<(&str, u32)> {
        spelling::best_match(name, self.node_names(nurbs))
    }

    pub fn closest_type(&self, name: &str) -> Option<(&'static str, u32)> {
        spelling::best_match(name, FieldType::ALL.iter().map(|t| t.name()))
    }

    pub fn closest_field_id(&self, node: &str, name: &str) -> Option<(&str, u32)> {
        self.nodes.get(node)?.closest_field(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.values()
    }
}

/// `kind type name [default...]`
fn parse_field_line(line: &str) -> Option<(InterfaceKind, FieldType, &str, Option<&str>)> {
    let mut parts = line.splitn(4, ' ');
    let kind = InterfaceKind::from_name(parts.next()?)?;
    let data_type = FieldType::from_name(parts.next()?)?;
    let name = parts.next()?;
    let default_text = parts.next().map(str::trim).filter(|s| !s.is_empty());
    if kind.takes_value() != default_text.is_some() {
        return None;
    }
    Some((kind, data_type, name, default_text))
}
