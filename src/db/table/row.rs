use serde::{Deserialize, Serialize};

use crate::core::types::FieldValue;

/// One value bound to one named field within a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub data: FieldValue,
}

impl FieldData {
    pub fn new(name: &str, data: impl Into<FieldValue>) -> Self {
        Self {
            name: name.to_owned(),
            data: data.into(),
        }
    }
}

/// One record: a caller-supplied id plus the field values the caller chose to
/// supply.
///
/// A field missing from `data` is "not supplied", which is distinct from a
/// field supplied as [`FieldValue::Null`].
///
/// # Example
///
/// ```
/// use rowstore::{FieldValue, RowData};
///
/// let row = RowData::new("u1").with("age", 30).with("bio", None::<String>);
///
/// assert_eq!(row.get("age"), Some(&FieldValue::Number(30.0)));
/// assert_eq!(row.get("bio"), Some(&FieldValue::Null));
/// assert_eq!(row.get("email"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub row_id: String,

    #[serde(default)]
    pub data: Vec<FieldData>,
}

impl RowData {
    /// Creates an empty row with the given id.
    pub fn new(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            data: Vec::new(),
        }
    }

    /// Appends a value for `name`.
    pub fn with(mut self, name: &str, data: impl Into<FieldValue>) -> Self {
        self.data.push(FieldData::new(name, data));
        self
    }

    /// Gets the value supplied for a field, if any.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.data
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.data)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_with_preserves_entry_order() {
        let row = RowData::new("r").with("b", true).with("a", 1);
        let names: Vec<_> = row.data.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_deserialize_row_without_data() {
        let row: RowData = serde_json::from_str(r#"{"row_id": "empty"}"#).unwrap();
        assert_eq!(row, RowData::new("empty"));
    }

    #[test]
    fn test_deserialize_row_json() {
        let row: RowData = serde_json::from_str(
            r#"{"row_id": "u1", "data": [{"name": "age", "data": 30}, {"name": "bio", "data": null}]}"#,
        )
        .unwrap();

        assert_eq!(row, RowData::new("u1").with("age", 30).with("bio", FieldValue::Null));
    }
}
