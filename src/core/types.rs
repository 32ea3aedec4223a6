use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The declared kind of a field.
///
/// A field's kind is declared once in the schema and never inferred from the
/// values submitted for it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum FieldKind {
    /// A numeric value.
    ///
    /// Stored as 8 bytes in little-endian `f64` format.
    #[strum(
        to_string = "Number",
        serialize = "integer",
        serialize = "int",
        serialize = "real",
        serialize = "float",
        serialize = "double",
        serialize = "numeric"
    )]
    Number,

    /// UTF-8 text.
    ///
    /// Stored as 4-byte length prefix + UTF-8 bytes.
    #[strum(
        to_string = "String",
        serialize = "text",
        serialize = "varchar",
        serialize = "char"
    )]
    String,

    /// Boolean true/false value.
    ///
    /// Stored as a single byte.
    #[strum(to_string = "Boolean", serialize = "bool")]
    Boolean,

    /// An opaque byte sequence.
    ///
    /// Stored as 4-byte length prefix + raw bytes.
    #[strum(to_string = "Blob", serialize = "binary", serialize = "bytes")]
    Blob,
}

impl FieldKind {
    /// Maps a storage-style declared type name onto a kind.
    ///
    /// Matching is case-insensitive and ignores a parenthesised size suffix
    /// (`VARCHAR(255)` is a String). Names that match no kind are treated as
    /// opaque bytes.
    ///
    /// Use [`str::parse`] instead to reject unknown names.
    ///
    /// # Example
    ///
    /// ```
    /// use rowstore::FieldKind;
    ///
    /// assert_eq!(FieldKind::from_declared("INTEGER"), FieldKind::Number);
    /// assert_eq!(FieldKind::from_declared("varchar(255)"), FieldKind::String);
    /// assert_eq!(FieldKind::from_declared("BOOL"), FieldKind::Boolean);
    /// assert_eq!(FieldKind::from_declared("JSONB"), FieldKind::Blob);
    /// ```
    pub fn from_declared(declared: &str) -> Self {
        let base = declared.split('(').next().unwrap_or_default().trim();
        base.parse().unwrap_or(FieldKind::Blob)
    }
}

/// A value bound to one field of a row.
///
/// Exactly five cases: one per [`FieldKind`] plus an explicit `Null`, which is
/// accepted for a field of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A numeric value.
    Number(f64),

    /// A UTF-8 text string.
    String(String),

    /// A boolean value (true/false).
    Boolean(bool),

    /// An opaque binary payload, compared byte-for-byte.
    Blob(Vec<u8>),

    /// An explicitly supplied null.
    ///
    /// Distinct from a field that is absent from the row.
    Null,
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
            FieldValue::Null => write!(f, "NULL"),
        }
    }
}

impl FieldValue {
    /// Returns the kind of this value.
    ///
    /// Returns `None` for [`FieldValue::Null`] since null has no kind of its own.
    ///
    /// # Example
    ///
    /// ```
    /// use rowstore::{FieldKind, FieldValue};
    ///
    /// assert_eq!(FieldValue::Number(42.0).kind(), Some(FieldKind::Number));
    /// assert_eq!(FieldValue::from("hello").kind(), Some(FieldKind::String));
    /// assert_eq!(FieldValue::Null.kind(), None);
    /// ```
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Number(_) => Some(FieldKind::Number),
            FieldValue::String(_) => Some(FieldKind::String),
            FieldValue::Boolean(_) => Some(FieldKind::Boolean),
            FieldValue::Blob(_) => Some(FieldKind::Blob),
            FieldValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Blob(value)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        FieldValue::Blob(value.to_vec())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
