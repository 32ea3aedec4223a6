use std::{collections::HashSet, sync::Arc};

use serde::Serialize;

use crate::core::types::FieldValue;

pub mod field;
pub mod row;
pub mod schema;
pub mod validator;

use self::{field::Field, row::RowData, schema::SchemaIndex, validator::ValidatedRow};

/// A named schema plus the rows accepted under it.
///
/// Rows are append-only and kept in insertion order. An inactive table keeps
/// its rows and stays readable; it only refuses new submissions.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    name: String,

    #[serde(rename = "fields")]
    schema: Arc<SchemaIndex>,

    data: Vec<RowData>,

    active: bool,

    #[serde(skip)]
    row_ids: HashSet<String>,
}

impl Table {
    /// Creates an empty, active table.
    pub(crate) fn new(name: String, schema: Arc<SchemaIndex>) -> Self {
        Self {
            name,
            schema,
            data: Vec::new(),
            active: true,
            row_ids: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field declarations in declaration order.
    pub fn fields(&self) -> &[Field] {
        self.schema.fields()
    }

    pub fn schema(&self) -> &SchemaIndex {
        &self.schema
    }

    pub(crate) fn schema_handle(&self) -> Arc<SchemaIndex> {
        Arc::clone(&self.schema)
    }

    /// Accepted rows in insertion order.
    pub fn data(&self) -> &[RowData] {
        &self.data
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn contains_row(&self, row_id: &str) -> bool {
        self.row_ids.contains(row_id)
    }

    pub fn get_row(&self, row_id: &str) -> Option<&RowData> {
        if !self.contains_row(row_id) {
            return None;
        }
        self.data.iter().find(|row| row.row_id == row_id)
    }

    /// Returns the value of `field` in row `row_id`.
    ///
    /// `None` if the row does not exist or did not supply the field.
    pub fn value(&self, row_id: &str, field: &str) -> Option<&FieldValue> {
        self.get_row(row_id)?.get(field)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends a validated row. The caller has already checked the id is new.
    pub(crate) fn push(&mut self, row: ValidatedRow) {
        let row = row.into_inner();
        self.row_ids.insert(row.row_id.clone());
        self.data.push(row);
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
