use serde::{Deserialize, Serialize};

use crate::core::types::FieldKind;

/// Definition of a single field in a table schema.
///
/// Every field is nullable; there is no per-field nullability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// The field name, unique (case-sensitive) within its table.
    pub name: String,

    /// The declared kind for values in this field.
    pub field_type: FieldKind,
}

impl Field {
    /// Creates a new field definition.
    pub fn new(name: &str, field_type: FieldKind) -> Self {
        Self {
            name: name.to_owned(),
            field_type,
        }
    }
}
