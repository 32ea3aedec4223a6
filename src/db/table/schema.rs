use std::collections::HashMap;

use miette::{Result, miette};
use serde::{Deserialize, Serialize};

use super::{
    field::Field,
    row::{FieldData, RowData},
    validator::ValidatedRow,
};
use crate::{
    common::error::{RowError, SchemaError},
    core::{
        codec::{check, decode_value, encode_value, read_len_prefixed, write_len_prefixed},
        types::{FieldKind, FieldValue},
    },
    db::bitmap::FieldBitmap,
};

/// A table's field declarations, indexed by name.
///
/// Fields keep their declaration order; lookups go through a name→position
/// map so they never depend on reference identity. Once built the index is
/// immutable.
///
/// # Example
///
/// ```
/// use rowstore::{Field, FieldKind, SchemaIndex};
///
/// let schema = SchemaIndex::build(vec![
///     Field::new("age", FieldKind::Number),
///     Field::new("bio", FieldKind::String),
/// ])
/// .unwrap();
///
/// assert_eq!(schema.lookup("age"), Some(FieldKind::Number));
/// assert_eq!(schema.lookup("Age"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Field>", try_from = "Vec<Field>")]
pub struct SchemaIndex {
    fields: Vec<Field>,
    positions: HashMap<String, usize>,
}

impl SchemaIndex {
    /// Builds an index over `fields`.
    ///
    /// Fails on the first name that repeats an earlier one (case-sensitive).
    pub fn build(fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut positions = HashMap::with_capacity(fields.len());

        for (idx, field) in fields.iter().enumerate() {
            if positions.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }

        Ok(Self { fields, positions })
    }

    /// Returns the declared kind of `name`, or `None` if it is not part of the schema.
    pub fn lookup(&self, name: &str) -> Option<FieldKind> {
        self.position(name).map(|idx| self.fields[idx].field_type)
    }

    /// Finds the declaration index of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encodes a validated row to bytes for a persistence backend.
    ///
    /// Layout:
    /// - row id: 4-byte length + UTF-8 bytes
    /// - presence bitmap, then null bitmap (one bit per schema field)
    /// - each present, non-null value in schema order
    ///
    /// The row is checked against this schema again, since a [`ValidatedRow`]
    /// may come from another schema.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An entry names a field this schema does not declare
    /// - An entry supplies the same field twice
    /// - A non-null value does not match its field's declared kind
    /// - A string, blob or the row id is too long for its length prefix
    pub fn encode_row(&self, row: &ValidatedRow) -> Result<Vec<u8>> {
        let row = row.row();
        let mut slots: Vec<Option<&FieldValue>> = vec![None; self.fields.len()];
        let mut present = FieldBitmap::new(self.fields.len());
        let mut nulls = FieldBitmap::new(self.fields.len());

        for entry in &row.data {
            let Some(idx) = self.position(&entry.name) else {
                return Err(RowError::UnknownField {
                    name: entry.name.clone(),
                }
                .into());
            };
            if present.is_set(idx) {
                return Err(RowError::DuplicateRowField {
                    name: entry.name.clone(),
                }
                .into());
            }

            let value = check(&entry.data, self.fields[idx].field_type).map_err(|mismatch| {
                RowError::FieldType {
                    field: entry.name.clone(),
                    mismatch,
                }
            })?;

            present.set(idx);
            if value.is_null() {
                nulls.set(idx);
            }
            slots[idx] = Some(value);
        }

        let mut bytes = vec![];
        write_len_prefixed(row.row_id.as_bytes(), &mut bytes)?;
        bytes.extend_from_slice(&present.bytes);
        bytes.extend_from_slice(&nulls.bytes);

        for value in slots.into_iter().flatten() {
            encode_value(value, &mut bytes)?;
        }

        Ok(bytes)
    }

    /// Decodes a row previously produced by [`SchemaIndex::encode_row`].
    ///
    /// Entries come back in schema order. Absent fields stay absent and
    /// explicit nulls stay null.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Not enough bytes for the expected data
    /// - UTF-8 decoding fails for the row id or a text value
    /// - A bitmap marks a field null that is not present
    /// - Bytes remain after the last value
    pub fn decode_row(&self, bytes: &[u8]) -> Result<RowData> {
        let mut offset = 0;

        let row_id = read_len_prefixed(bytes, &mut offset, "row id")?;
        let row_id = std::str::from_utf8(row_id)
            .map_err(|_| miette!("Invalid UTF-8 sequence in row id"))?
            .to_owned();

        let present = FieldBitmap::from_bytes(&bytes[offset..], self.fields.len())?;
        offset += present.bytes.len();
        let nulls = FieldBitmap::from_bytes(&bytes[offset..], self.fields.len())?;
        offset += nulls.bytes.len();

        let mut data = Vec::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let is_present = present.is_set(idx);
            let is_null = nulls.is_set(idx);

            if is_null && !is_present {
                return Err(miette!("Field {} marked null but not present", field.name));
            }
            if !is_present {
                continue;
            }

            let value = if is_null {
                FieldValue::Null
            } else {
                decode_value(field.field_type, bytes, &mut offset)?
            };
            data.push(FieldData {
                name: field.name.clone(),
                data: value,
            });
        }

        if offset != bytes.len() {
            return Err(miette!(
                "{} trailing byte(s) after row {}",
                bytes.len() - offset,
                row_id
            ));
        }

        Ok(RowData { row_id, data })
    }
}

impl TryFrom<Vec<Field>> for SchemaIndex {
    type Error = SchemaError;

    fn try_from(fields: Vec<Field>) -> Result<Self, Self::Error> {
        Self::build(fields)
    }
}

impl From<SchemaIndex> for Vec<Field> {
    fn from(schema: SchemaIndex) -> Self {
        schema.fields
    }
}
