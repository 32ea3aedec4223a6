use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::{debug, info, warn};

use crate::{
    common::{
        config::RegistryConfig,
        error::{DefineError, SubmitError, UnknownTable},
    },
    db::table::{
        Table,
        field::Field,
        row::RowData,
        schema::SchemaIndex,
        validator::RowValidator,
    },
};

type TableCell = Arc<RwLock<Table>>;

/// The entry point that owns every table.
///
/// `TableRegistry` is safe to share between threads. Each table sits behind
/// its own lock:
/// - submissions to one table are serialized, so a duplicate row id can never
///   slip past a concurrent insert of the same id
/// - readers of a table see either all of an appended row or none of it
/// - row validation runs outside any table lock
///
/// Per table the lifecycle is `Undefined -> Active <-> Inactive`; there is no
/// way back to undefined.
#[derive(Debug, Default)]
pub struct TableRegistry {
    config: RegistryConfig,
    validator: RowValidator,
    tables: RwLock<BTreeMap<String, TableCell>>,
}

impl TableRegistry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validator: RowValidator::new(config.max_blob_len),
            config,
            tables: RwLock::default(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Defines a new, active, empty table.
    ///
    /// # Errors
    ///
    /// - [`DefineError::DuplicateTable`] if `name` is already defined
    /// - [`DefineError::Schema`] if two fields share a name
    pub fn define(&self, name: &str, fields: Vec<Field>) -> Result<(), DefineError> {
        let mut tables = write(&self.tables);

        if tables.contains_key(name) {
            return Err(DefineError::DuplicateTable {
                name: name.to_string(),
            });
        }

        let schema = SchemaIndex::build(fields)?;
        info!("Defined table {name} with {} field(s)", schema.len());

        let table = Table::new(name.to_string(), Arc::new(schema));
        tables.insert(name.to_string(), Arc::new(RwLock::new(table)));
        Ok(())
    }

    /// Validates `row` and appends it to `table_name`.
    ///
    /// Checks run in this order: the table exists, it is active, the row id is
    /// new, then the row itself validates. Nothing is stored unless every
    /// check passes.
    pub fn submit(&self, table_name: &str, row: RowData) -> Result<(), SubmitError> {
        let row_id = row.row_id.clone();

        let result = self.try_submit(table_name, row);
        match &result {
            Ok(()) => debug!("Accepted row {row_id} into {table_name}"),
            Err(err) => warn!("Rejected row {row_id} for {table_name}: {err}"),
        }

        result
    }

    fn try_submit(&self, table_name: &str, row: RowData) -> Result<(), SubmitError> {
        let cell = self.cell(table_name)?;

        let schema = {
            let table = read(&cell);
            admit(&table, &row.row_id)?;
            table.schema_handle()
        };

        let validated = self.validator.validate(row, &schema)?;

        // State may have changed while validating without the lock.
        let mut table = write(&cell);
        admit(&table, &validated.row().row_id)?;
        table.push(validated);

        Ok(())
    }

    /// Activates or deactivates a table. Accepted rows are untouched.
    pub fn set_active(&self, table_name: &str, active: bool) -> Result<(), UnknownTable> {
        let cell = self.cell(table_name)?;
        write(&cell).set_active(active);

        debug!(
            "Table {table_name} is now {}",
            if active { "active" } else { "inactive" }
        );
        Ok(())
    }

    /// Returns a consistent snapshot of a table, active or not.
    ///
    /// The snapshot copies every row. Callers that only need to inspect the
    /// table should prefer [`TableRegistry::with_table`], or
    /// [`TableRegistry::fetch`] for a page of rows.
    pub fn get(&self, table_name: &str) -> Option<Table> {
        self.with_table(table_name, Table::clone)
    }

    /// Runs `f` against a table under its read lock, without copying it.
    pub fn with_table<R>(&self, table_name: &str, f: impl FnOnce(&Table) -> R) -> Option<R> {
        let cell = self.cell(table_name).ok()?;
        let table = read(&cell);
        Some(f(&table))
    }

    /// Returns up to `limit` rows starting at `offset`, in insertion order.
    ///
    /// A missing limit uses the configured default page size; any limit is
    /// clamped to the configured maximum.
    pub fn fetch(
        &self,
        table_name: &str,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<RowData>, UnknownTable> {
        let page_size = self.config.page_size(limit);
        let cell = self.cell(table_name)?;
        let table = read(&cell);

        Ok(table
            .data()
            .iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect())
    }

    /// Names of all defined tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        read(&self.tables).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.tables).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.tables).is_empty()
    }

    fn cell(&self, table_name: &str) -> Result<TableCell, UnknownTable> {
        read(&self.tables)
            .get(table_name)
            .cloned()
            .ok_or_else(|| UnknownTable {
                table_name: table_name.to_string(),
            })
    }
}

/// Checks that `table` will take a row with this id.
fn admit(table: &Table, row_id: &str) -> Result<(), SubmitError> {
    if !table.is_active() {
        return Err(SubmitError::TableInactive {
            table_name: table.name().to_string(),
        });
    }
    if table.contains_row(row_id) {
        return Err(SubmitError::DuplicateRowId {
            row_id: row_id.to_string(),
        });
    }
    Ok(())
}

// No code path panics while holding these locks, so a poisoned lock still
// guards consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
