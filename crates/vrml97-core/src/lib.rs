#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! VRML97 specification data for the `vrml97` parser.
//!
//! Three layers:
//! - **Types**: the 20 field data types and the 4 interface kinds
//! - **Table**: built-in node descriptors, deserialized once from `vrml97.json`
//! - **Lookup helpers**: spelling-distance matching and base-profile limits

use std::fmt;

pub mod interner;
pub mod limits;
pub mod spelling;
pub mod table;

mod invariants;


pub use interner::{Interner, Symbol};
pub use table::{FieldDescriptor, NodeSpec, SpecTable, vrml97};

// ============================================================================
// Field Types
// ============================================================================

/// The VRML97 field data types, single-valued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    SfBool,
    SfColor,
    SfFloat,
    SfImage,
    SfInt32,
    SfNode,
    SfRotation,
    SfString,
    SfTime,
    SfVec2f,
    SfVec3f,
    MfColor,
    MfFloat,
    MfInt32,
    MfNode,
    MfRotation,
    MfString,
    MfTime,
    MfVec2f,
    MfVec3f,
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        Self::SfBool,
        Self::SfColor,
        Self::SfFloat,
        Self::SfImage,
        Self::SfInt32,
        Self::SfNode,
        Self::SfRotation,
        Self::SfString,
        Self::SfTime,
        Self::SfVec2f,
        Self::SfVec3f,
        Self::MfColor,
        Self::MfFloat,
        Self::MfInt32,
        Self::MfNode,
        Self::MfRotation,
        Self::MfString,
        Self::MfTime,
        Self::MfVec2f,
        Self::MfVec3f,
    ];

    /// Spelling used in VRML source text.
    pub fn name(self) -> &'static str {
        match self {
            Self::SfBool => "SFBool",
            Self::SfColor => "SFColor",
            Self::SfFloat => "SFFloat",
            Self::SfImage => "SFImage",
            Self::SfInt32 => "SFInt32",
            Self::SfNode => "SFNode",
            Self::SfRotation => "SFRotation",
            Self::SfString => "SFString",
            Self::SfTime => "SFTime",
            Self::SfVec2f => "SFVec2f",
            Self::SfVec3f => "SFVec3f",
            Self::MfColor => "MFColor",
            Self::MfFloat => "MFFloat",
            Self::MfInt32 => "MFInt32",
            Self::MfNode => "MFNode",
            Self::MfRotation => "MFRotation",
            Self::MfString => "MFString",
            Self::MfTime => "MFTime",
            Self::MfVec2f => "MFVec2f",
            Self::MfVec3f => "MFVec3f",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn is_multi(self) -> bool {
        self >= Self::MfColor
    }

    pub fn is_node(self) -> bool {
        matches!(self, Self::SfNode | Self::MfNode)
    }

    /// The single-valued counterpart (identity for SF types).
    pub fn single(self) -> Self {
        match self {
            Self::MfColor => Self::SfColor,
            Self::MfFloat => Self::SfFloat,
            Self::MfInt32 => Self::SfInt32,
            Self::MfNode => Self::SfNode,
            Self::MfRotation => Self::SfRotation,
            Self::MfString => Self::SfString,
            Self::MfTime => Self::SfTime,
            Self::MfVec2f => Self::SfVec2f,
            Self::MfVec3f => Self::SfVec3f,
            sf => sf,
        }
    }

    /// Number of numeric tokens making up one value.
    ///
    /// Zero for types whose values are not a fixed run of numbers.
    pub fn arity(self) -> usize {
        match self.single() {
            Self::SfFloat | Self::SfInt32 | Self::SfTime => 1,
            Self::SfVec2f => 2,
            Self::SfColor | Self::SfVec3f => 3,
            Self::SfRotation => 4,
            _ => 0,
        }
    }

    /// Whether values are read as floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(
            self.single(),
            Self::SfColor
                | Self::SfFloat
                | Self::SfRotation
                | Self::SfTime
                | Self::SfVec2f
                | Self::SfVec3f
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Interface Kinds
// ============================================================================

/// How a field takes part in event routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Field,
    ExposedField,
    EventIn,
    EventOut,
}

impl InterfaceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::ExposedField => "exposedField",
            Self::EventIn => "eventIn",
            Self::EventOut => "eventOut",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "field" => Some(Self::Field),
            "exposedField" => Some(Self::ExposedField),
            "eventIn" => Some(Self::EventIn),
            "eventOut" => Some(Self::EventOut),
            _ => None,
        }
    }

    /// Whether a value may be written for this field in a node body.
    pub fn takes_value(self) -> bool {
        matches!(self, Self::Field | Self::ExposedField)
    }

    /// Whether a ROUTE may start here.
    pub fn is_source(self) -> bool {
        matches!(self, Self::ExposedField | Self::EventOut)
    }

    /// Whether a ROUTE may end here.
    pub fn is_destination(self) -> bool {
        matches!(self, Self::ExposedField | Self::EventIn)
    }

    /// IS compatibility: `self` is the node field, `interface` the PROTO field.
    pub fn connects_to(self, interface: InterfaceKind) -> bool {
        match self {
            Self::ExposedField => true,
            other => other == interface,
        }
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Node Classes
// ============================================================================

/// Structural role a node can play; SFNode/MFNode fields accept one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeClass {
    Child,
    Geometry,
    Appearance,
    Material,
    Texture,
    TextureTransform,
    Coordinate,
    Color,
    Normal,
    TexCoord,
    FontStyle,
    AudioSource,
    Surface,
    Contour,
    Curve2D,
}

impl NodeClass {
    pub fn name(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Geometry => "geometry",
            Self::Appearance => "appearance",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::TextureTransform => "textureTransform",
            Self::Coordinate => "coordinate",
            Self::Color => "color",
            Self::Normal => "normal",
            Self::TexCoord => "texCoord",
            Self::FontStyle => "fontStyle",
            Self::AudioSource => "audioSource",
            Self::Surface => "surface",
            Self::Contour => "contour",
            Self::Curve2D => "curve2D",
        }
    }
}

/// Semantic restriction on a float field's value, on top of its lexical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueConstraint {
    /// Every component must be greater than zero.
    Positive,
    /// `-1 -1 -1`, or every component non-negative.
    BboxSize,
}

/// Optional node sets that can be switched on per parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Extension {
    Nurbs,
}

/// Base-profile ceiling on the number of values in an MF field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limit {
    pub max: usize,
    /// Values that together count as one unit against `max`.
    pub per_unit: usize,
}

impl Limit {
    pub fn new(max: usize, per_unit: usize) -> Self {
        Self { max, per_unit }
    }

    /// Whether `count` values stay within the ceiling.
    pub fn allows(&self, count: usize) -> bool {
        count.div_ceil(self.per_unit.max(1)) <= self.max
    }
}
