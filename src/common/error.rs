use miette::Diagnostic;
use thiserror::Error;

use crate::core::types::FieldKind;

/// A value's kind did not match the kind declared for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
#[error("expected a {expected} value, found {actual}")]
#[diagnostic(code(rowstore::type_mismatch))]
pub struct TypeMismatch {
    pub expected: FieldKind,
    pub actual: FieldKind,
}

/// Errors raised while building a schema from field declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SchemaError {
    #[error("field `{name}` is declared more than once")]
    #[diagnostic(
        code(rowstore::schema::duplicate_field),
        help("field names are case-sensitive and must be unique within a table")
    )]
    DuplicateField { name: String },
}

/// Reasons a row does not conform to a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RowError {
    #[error("field `{name}` is not part of the schema")]
    #[diagnostic(code(rowstore::row::unknown_field))]
    UnknownField { name: String },

    #[error("field `{name}` is supplied more than once")]
    #[diagnostic(
        code(rowstore::row::duplicate_field),
        help("a row may carry at most one value per field")
    )]
    DuplicateRowField { name: String },

    #[error("field `{field}`: {mismatch}")]
    #[diagnostic(code(rowstore::row::type_mismatch))]
    FieldType {
        field: String,
        #[source]
        mismatch: TypeMismatch,
    },

    #[error("field `{field}`: blob of {len} bytes exceeds the {limit} byte limit")]
    #[diagnostic(code(rowstore::row::blob_too_large))]
    BlobTooLarge {
        field: String,
        len: usize,
        limit: usize,
    },
}

/// The named table does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("table `{table_name}` does not exist")]
#[diagnostic(code(rowstore::unknown_table))]
pub struct UnknownTable {
    pub table_name: String,
}

/// Errors raised by [`TableRegistry::define`](crate::TableRegistry::define).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DefineError {
    #[error("table `{name}` already exists")]
    #[diagnostic(code(rowstore::define::duplicate_table))]
    DuplicateTable { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised by [`TableRegistry::submit`](crate::TableRegistry::submit).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SubmitError {
    #[error("table `{table_name}` does not exist")]
    #[diagnostic(code(rowstore::submit::unknown_table))]
    UnknownTable { table_name: String },

    #[error("table `{table_name}` is inactive")]
    #[diagnostic(
        code(rowstore::submit::table_inactive),
        help("re-activate the table before submitting rows to it")
    )]
    TableInactive { table_name: String },

    #[error("row id `{row_id}` already exists")]
    #[diagnostic(code(rowstore::submit::duplicate_row_id))]
    DuplicateRowId { row_id: String },

    #[error("invalid row: {0}")]
    #[diagnostic(code(rowstore::submit::invalid))]
    Invalid(#[from] RowError),
}

impl From<UnknownTable> for SubmitError {
    fn from(value: UnknownTable) -> Self {
        Self::UnknownTable {
            table_name: value.table_name,
        }
    }
}

/// Errors raised while reading a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {var}")]
    #[diagnostic(code(rowstore::config::invalid))]
    Invalid { var: &'static str, value: String },

    #[error("page sizes must be non-zero and default ({default}) must not exceed max ({max})")]
    #[diagnostic(code(rowstore::config::page_size))]
    PageSize { default: usize, max: usize },
}

/// Any error this crate can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum StoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Define(#[from] DefineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownTable(#[from] UnknownTable),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_type_mismatch_message_names_both_kinds() {
        let err = RowError::FieldType {
            field: "age".to_string(),
            mismatch: TypeMismatch {
                expected: FieldKind::Number,
                actual: FieldKind::String,
            },
        };

        assert_eq!(
            err.to_string(),
            "field `age`: expected a Number value, found String"
        );
    }

    #[test]
    fn test_submit_error_wraps_row_error() {
        let err: SubmitError = RowError::UnknownField {
            name: "nope".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            SubmitError::Invalid(RowError::UnknownField { ref name }) if name == "nope"
        ));
    }

    #[test]
    fn test_unknown_table_converts_into_submit_error() {
        let err: SubmitError = UnknownTable {
            table_name: "users".to_string(),
        }
        .into();

        assert_eq!(
            err,
            SubmitError::UnknownTable {
                table_name: "users".to_string()
            }
        );
    }
}
