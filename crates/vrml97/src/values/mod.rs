//! Typed field values.
//!
//! Valid values carry a derived value. Invalid ones carry `None` and have
//! diagnostic children in the tree. MF values only record how many values
//! they hold: their tokens stay in the stream and are read back through
//! [`Scene`](crate::Scene) accessors.

mod defaults;
mod lexical;


pub use defaults::is_default_value;
pub use lexical::{is_color_component, is_float, is_int, is_pixel};

use vrml97_core::FieldType;

/// Header and pixel summary of an SFImage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    /// Pixel values actually present.
    pub pixels: usize,
    /// Longest run of identical consecutive pixels.
    pub longest_run: usize,
}

/// Value count of an MF field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiValue {
    pub field_type: FieldType,
    /// Values parsed, whether or not they produced child elements.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(Option<bool>),
    Color(Option<[f32; 3]>),
    Float(Option<f32>),
    Image(Option<Image>),
    Int32(Option<i32>),
    /// Number of nodes held: 0 for `NULL`, else 1.
    Node(usize),
    Rotation(Option<[f32; 4]>),
    String(Option<String>),
    Time(Option<f64>),
    Vec2f(Option<[f32; 2]>),
    Vec3f(Option<[f32; 3]>),
    Multi(MultiValue),
}

impl FieldValue {
    /// Empty value of `field_type`, before any token is consumed.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::SfBool => Self::Bool(None),
            FieldType::SfColor => Self::Color(None),
            FieldType::SfFloat => Self::Float(None),
            FieldType::SfImage => Self::Image(None),
            FieldType::SfInt32 => Self::Int32(None),
            FieldType::SfNode => Self::Node(0),
            FieldType::SfRotation => Self::Rotation(None),
            FieldType::SfString => Self::String(None),
            FieldType::SfTime => Self::Time(None),
            FieldType::SfVec2f => Self::Vec2f(None),
            FieldType::SfVec3f => Self::Vec3f(None),
            multi => Self::Multi(MultiValue {
                field_type: multi,
                count: 0,
            }),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Bool(_) => FieldType::SfBool,
            Self::Color(_) => FieldType::SfColor,
            Self::Float(_) => FieldType::SfFloat,
            Self::Image(_) => FieldType::SfImage,
            Self::Int32(_) => FieldType::SfInt32,
            Self::Node(_) => FieldType::SfNode,
            Self::Rotation(_) => FieldType::SfRotation,
            Self::String(_) => FieldType::SfString,
            Self::Time(_) => FieldType::SfTime,
            Self::Vec2f(_) => FieldType::SfVec2f,
            Self::Vec3f(_) => FieldType::SfVec3f,
            Self::Multi(multi) => multi.field_type,
        }
    }

    /// Number of values held. SF values hold one unless they failed to parse.
    pub fn number_values(&self) -> usize {
        match self {
            Self::Multi(multi) => multi.count,
            Self::Node(count) => *count,
            other => usize::from(other.is_valid()),
        }
    }

    /// Whether a derived value could be extracted.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Bool(v) => v.is_some(),
            Self::Color(v) | Self::Vec3f(v) => v.is_some(),
            Self::Float(v) => v.is_some(),
            Self::Image(v) => v.is_some(),
            Self::Int32(v) => v.is_some(),
            Self::Node(_) | Self::Multi(_) => true,
            Self::Rotation(v) => v.is_some(),
            Self::String(v) => v.is_some(),
            Self::Time(v) => v.is_some(),
            Self::Vec2f(v) => v.is_some(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => *v,
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => *v,
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => *v,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Self::Image(v) => v.as_ref(),
            _ => None,
        }
    }
}

/// Pixel value: decimal, `0x` hexadecimal or bare `x` hexadecimal.
pub fn pixel_value(text: &str) -> Option<u32> {
    if !is_pixel(text) {
        return None;
    }
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('x'))
        .or_else(|| text.strip_prefix('X'));
    match hex {
        Some(digits) => u32::from_str_radix(digits, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Content of a quoted string token, escapes resolved.
///
/// `text` may lack the closing quote when the string continues on the next
/// line or is unterminated.
pub fn unquote(text: &str) -> String {
    let inner = text.strip_prefix('"').unwrap_or(text);
    let inner = match inner.strip_suffix('"') {
        Some(stripped) if !stripped.ends_with('\\') || stripped.ends_with("\\\\") => stripped,
        _ => inner,
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
