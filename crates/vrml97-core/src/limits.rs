//! Base-profile limits (VRML97 Table 7).
//!
//! Exceeding any of these is a warning, never an error.

use crate::{FieldType, Limit};

/// Maximum PROTO declaration nesting.
pub const MAX_PROTO_NESTING: usize = 5;

/// Maximum characters in one SFString, quotes excluded.
pub const MAX_STRING_LENGTH: usize = 30_000;

/// Maximum SFImage width and height in pixels.
pub const MAX_IMAGE_DIMENSION: i64 = 256;

/// Maximum SFImage components per pixel.
pub const MAX_IMAGE_DEPTH: i64 = 4;

/// Maximum faces in one IndexedFaceSet.
pub const MAX_FACES: usize = 5_000;

/// Maximum vertices in one IndexedFaceSet face.
pub const MAX_VERTICES_PER_FACE: usize = 10;

/// Maximum interface declarations of each kind in one Script node.
pub const MAX_SCRIPT_DECLARATIONS: usize = 25;

/// Generic ceiling for an MF type, used when a field has no limit of its own.
pub fn mf_limit(field_type: FieldType) -> Option<Limit> {
    let max = match field_type {
        FieldType::MfColor | FieldType::MfVec2f | FieldType::MfVec3f => 15_000,
        FieldType::MfFloat | FieldType::MfRotation | FieldType::MfTime => 1_000,
        FieldType::MfInt32 => 20_000,
        FieldType::MfNode => 500,
        FieldType::MfString => 30_000,
        _ => return None,
    };
    Some(Limit::new(max, 1))
}
