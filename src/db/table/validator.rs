use std::collections::HashSet;

use serde::Serialize;

use super::{row::RowData, schema::SchemaIndex};
use crate::{
    common::error::RowError,
    core::{codec, types::FieldValue},
};

/// A row that passed validation against a schema.
///
/// Wraps the submitted row unchanged: nothing is rewritten and absent fields
/// are not filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedRow(RowData);

impl ValidatedRow {
    pub fn row(&self) -> &RowData {
        &self.0
    }

    pub fn into_inner(self) -> RowData {
        self.0
    }
}

/// Validates rows against a [`SchemaIndex`].
///
/// The default validator applies no blob limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowValidator {
    max_blob_len: Option<usize>,
}

impl RowValidator {
    pub fn new(max_blob_len: Option<usize>) -> Self {
        Self { max_blob_len }
    }

    /// Checks every entry of `row` against `schema`, in the row's entry order.
    ///
    /// The first failing entry decides the error:
    /// - a name the schema does not declare is [`RowError::UnknownField`]
    /// - a name already seen earlier in the row is [`RowError::DuplicateRowField`]
    /// - a non-null value of the wrong kind is [`RowError::FieldType`]
    /// - a blob longer than the configured limit is [`RowError::BlobTooLarge`]
    ///
    /// Fields the row does not mention are never inspected.
    pub fn validate(&self, row: RowData, schema: &SchemaIndex) -> Result<ValidatedRow, RowError> {
        self.check(&row, schema)?;
        Ok(ValidatedRow(row))
    }

    fn check(&self, row: &RowData, schema: &SchemaIndex) -> Result<(), RowError> {
        let mut seen = HashSet::with_capacity(row.data.len());

        for entry in &row.data {
            let Some(kind) = schema.lookup(&entry.name) else {
                return Err(RowError::UnknownField {
                    name: entry.name.clone(),
                });
            };

            if !seen.insert(entry.name.as_str()) {
                return Err(RowError::DuplicateRowField {
                    name: entry.name.clone(),
                });
            }

            let value = codec::check(&entry.data, kind).map_err(|mismatch| RowError::FieldType {
                field: entry.name.clone(),
                mismatch,
            })?;

            if let (FieldValue::Blob(blob), Some(limit)) = (value, self.max_blob_len)
                && blob.len() > limit
            {
                return Err(RowError::BlobTooLarge {
                    field: entry.name.clone(),
                    len: blob.len(),
                    limit,
                });
            }
        }

        Ok(())
    }
}

/// Validates `row` against `schema` with no blob limit.
///
/// # Example
///
/// ```
/// use rowstore::{Field, FieldKind, RowData, RowError, SchemaIndex, validate};
///
/// let schema = SchemaIndex::build(vec![
///     Field::new("age", FieldKind::Number),
///     Field::new("bio", FieldKind::String),
/// ])
/// .unwrap();
///
/// let row = RowData::new("u1").with("age", 30).with("bio", None::<String>);
/// assert!(validate(row, &schema).is_ok());
///
/// let row = RowData::new("u2").with("age", "thirty");
/// assert!(matches!(validate(row, &schema), Err(RowError::FieldType { .. })));
/// ```
pub fn validate(row: RowData, schema: &SchemaIndex) -> Result<ValidatedRow, RowError> {
    RowValidator::default().validate(row, schema)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        common::error::TypeMismatch,
        core::types::FieldKind,
        db::table::{field::Field, row::FieldData},
    };

    fn users() -> SchemaIndex {
        SchemaIndex::build(vec![
            Field::new("age", FieldKind::Number),
            Field::new("bio", FieldKind::String),
            Field::new("admin", FieldKind::Boolean),
            Field::new("avatar", FieldKind::Blob),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_row_returned_unchanged() {
        let row = RowData::new("u1").with("bio", "hi").with("age", 30);

        let validated = validate(row.clone(), &users()).unwrap();
        assert_eq!(validated.row(), &row);
    }

    #[test]
    fn test_revalidating_is_idempotent() {
        let schema = users();
        let row = RowData::new("u1").with("admin", false).with("avatar", vec![0u8; 4]);

        let once = validate(row, &schema).unwrap();
        let twice = validate(once.clone().into_inner(), &schema).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_row_is_valid() {
        assert!(validate(RowData::new("empty"), &users()).is_ok());
    }

    #[test]
    fn test_partial_row_stays_partial() {
        let validated = validate(RowData::new("u1").with("age", 1), &users()).unwrap();

        assert_eq!(validated.row().data.len(), 1);
        assert_eq!(validated.row().get("bio"), None);
    }

    #[test]
    fn test_null_accepted_for_every_kind() {
        let row = RowData::new("u1")
            .with("age", FieldValue::Null)
            .with("bio", FieldValue::Null)
            .with("admin", FieldValue::Null)
            .with("avatar", FieldValue::Null);

        assert!(validate(row, &users()).is_ok());
    }

    #[test]
    fn test_unknown_field() {
        let err = validate(RowData::new("u1").with("email", "a@b"), &users()).unwrap_err();

        assert_eq!(
            err,
            RowError::UnknownField {
                name: "email".to_string()
            }
        );
    }

    #[test]
    fn test_type_mismatch() {
        let err = validate(RowData::new("u2").with("age", "thirty"), &users()).unwrap_err();

        assert_eq!(
            err,
            RowError::FieldType {
                field: "age".to_string(),
                mismatch: TypeMismatch {
                    expected: FieldKind::Number,
                    actual: FieldKind::String,
                },
            }
        );
    }

    #[test]
    fn test_duplicate_row_field() {
        let row = RowData::new("u1").with("age", 1).with("age", 2);

        assert_eq!(
            validate(row, &users()).unwrap_err(),
            RowError::DuplicateRowField {
                name: "age".to_string()
            }
        );
    }

    #[test]
    fn test_first_error_in_row_order_wins() {
        // Schema order would report `age` first.
        let row = RowData::new("u1")
            .with("admin", 1)
            .with("age", "thirty")
            .with("nope", true);

        let err = validate(row, &users()).unwrap_err();
        assert!(matches!(err, RowError::FieldType { ref field, .. } if field == "admin"));
    }

    #[test]
    fn test_unknown_field_before_later_mismatch() {
        let row = RowData::new("u1").with("nope", true).with("age", "thirty");

        assert!(matches!(
            validate(row, &users()),
            Err(RowError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_blob_limit() {
        let validator = RowValidator::new(Some(4));
        let schema = users();

        assert!(validator
            .validate(RowData::new("ok").with("avatar", vec![0u8; 4]), &schema)
            .is_ok());

        let err = validator
            .validate(RowData::new("big").with("avatar", vec![0u8; 5]), &schema)
            .unwrap_err();
        assert_eq!(
            err,
            RowError::BlobTooLarge {
                field: "avatar".to_string(),
                len: 5,
                limit: 4,
            }
        );
    }

    #[test]
    fn test_default_validator_has_no_blob_limit() {
        let row = RowData::new("big").with("avatar", vec![0u8; 1 << 20]);
        assert!(validate(row, &users()).is_ok());
    }

    fn value_of(kind: FieldKind) -> BoxedStrategy<FieldValue> {
        match kind {
            FieldKind::Number => any::<i32>().prop_map(FieldValue::from).boxed(),
            FieldKind::String => "[a-z ]{0,16}".prop_map(FieldValue::String).boxed(),
            FieldKind::Boolean => any::<bool>().prop_map(FieldValue::Boolean).boxed(),
            FieldKind::Blob => prop::collection::vec(any::<u8>(), 0..16)
                .prop_map(FieldValue::Blob)
                .boxed(),
        }
    }

    fn conforming_row() -> impl Strategy<Value = RowData> {
        let fields = users().fields().to_vec();
        let picks: Vec<_> = fields
            .into_iter()
            .map(|field| {
                let value = prop_oneof![
                    1 => Just(FieldValue::Null),
                    4 => value_of(field.field_type),
                ];
                prop::option::of(value.prop_map(move |value| (field.name.clone(), value)))
            })
            .collect();

        picks.prop_map(|entries| RowData {
            row_id: "r".to_string(),
            data: entries
                .into_iter()
                .flatten()
                .map(|(name, data)| FieldData { name, data })
                .collect(),
        })
    }

    proptest! {
        #[test]
        fn prop_conforming_rows_validate_unchanged(row in conforming_row()) {
            let validated = validate(row.clone(), &users()).unwrap();
            prop_assert_eq!(validated.row(), &row);
        }

        #[test]
        fn prop_unknown_name_is_reported(row in conforming_row(), extra in "x[a-z]{0,6}") {
            let row = row.with(&extra, FieldValue::Null);

            prop_assert_eq!(
                validate(row, &users()).unwrap_err(),
                RowError::UnknownField { name: extra }
            );
        }
    }
}
