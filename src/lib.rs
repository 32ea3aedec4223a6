//! A schema-driven, strongly-typed row store.
//!
//! Tables declare named fields of four kinds (Number, String, Boolean, Blob).
//! Rows are validated against their table's schema before they are accepted;
//! every field also accepts an explicit null, and a row may leave fields out
//! entirely.
//!
//! ```
//! use rowstore::{Field, FieldKind, RowData, TableRegistry};
//!
//! let registry = TableRegistry::new();
//! registry
//!     .define(
//!         "users",
//!         vec![
//!             Field::new("age", FieldKind::Number),
//!             Field::new("bio", FieldKind::String),
//!         ],
//!     )
//!     .unwrap();
//!
//! registry
//!     .submit("users", RowData::new("u1").with("age", 30).with("bio", None::<String>))
//!     .unwrap();
//! assert!(registry.submit("users", RowData::new("u2").with("age", "thirty")).is_err());
//! assert_eq!(registry.get("users").unwrap().len(), 1);
//! ```
pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;

pub use common::{
    config::RegistryConfig,
    error::{
        ConfigError, DefineError, RowError, SchemaError, StoreError, SubmitError, TypeMismatch,
        UnknownTable,
    },
};
pub use crate::core::{
    codec,
    types::{FieldKind, FieldValue},
};
pub use db::{
    registry::TableRegistry,
    table::{
        Table,
        field::Field,
        row::{FieldData, RowData},
        schema::SchemaIndex,
        validator::{RowValidator, ValidatedRow, validate},
    },
};
