//! Self-describing schema catalog.
//!
//! Two built-in heap tables describe every relation, including themselves:
//! `_tables(table_name)` and `_columns(table_name, column_name, data_type)`.
//! Both are bootstrapped lazily on first use. Catalog state is an explicit
//! value owned by the executor; there are no process-wide globals.

use crate::access::{Column, DataType, HeapTable, Row, Value};
use anyhow::{bail, Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

pub const TABLES_TABLE_NAME: &str = "_tables";
pub const COLUMNS_TABLE_NAME: &str = "_columns";

fn tables_schema() -> Vec<Column> {
    vec![Column::new("table_name", DataType::Text)]
}

fn columns_schema() -> Vec<Column> {
    vec![
        Column::new("table_name", DataType::Text),
        Column::new("column_name", DataType::Text),
        Column::new("data_type", DataType::Text),
    ]
}

pub fn is_schema_table(name: &str) -> bool {
    name == TABLES_TABLE_NAME || name == COLUMNS_TABLE_NAME
}

pub struct Catalog {
    dir: PathBuf,
    tables: HeapTable,
    columns: HeapTable,
    bootstrapped: bool,
}

impl Catalog {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            tables: HeapTable::new(dir, TABLES_TABLE_NAME, tables_schema()),
            columns: HeapTable::new(dir, COLUMNS_TABLE_NAME, columns_schema()),
            bootstrapped: false,
        }
    }

    /// Registers a relation and creates its storage. If any step fails,
    /// catalog rows inserted so far are rolled back so the failed create
    /// leaves no trace.
    pub fn create_table(&mut self, name: &str, columns: &[Column], if_not_exists: bool) -> Result<()> {
        self.ensure_bootstrapped()?;
        if is_schema_table(name) {
            bail!("cannot create a schema table: {name}");
        }
        if columns.is_empty() {
            bail!("table {name} must have at least one column");
        }
        if self.table_exists(name)? {
            if if_not_exists {
                return Ok(());
            }
            bail!("table already exists: {name}");
        }

        let table_handle = self.tables.insert(&where_table(name))?;
        if let Err(e) = self.create_table_storage(name, columns) {
            let _ = self.tables.delete(table_handle);
            return Err(e);
        }
        debug!("created table {name}");
        Ok(())
    }

    /// Releases a relation's storage and unregisters it. The schema
    /// tables themselves cannot be dropped.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.ensure_bootstrapped()?;
        if is_schema_table(name) {
            bail!("cannot drop a schema table: {name}");
        }
        let filter = where_table(name);
        let table_handles = self.tables.select(Some(&filter))?;
        let Some(&table_handle) = table_handles.first() else {
            bail!("table does not exist: {name}");
        };

        // Resolve the schema before its _columns rows disappear.
        let mut table = self.open_table(name)?;
        for handle in self.columns.select(Some(&filter))? {
            self.columns.delete(handle)?;
        }
        table.drop_table()?;
        self.tables.delete(table_handle)?;
        debug!("dropped table {name}");
        Ok(())
    }

    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        self.ensure_bootstrapped()?;
        Ok(!self.tables.select(Some(&where_table(name)))?.is_empty())
    }

    /// Names of all user tables, excluding the schema tables.
    pub fn table_names(&mut self) -> Result<Vec<String>> {
        self.ensure_bootstrapped()?;
        let mut names = Vec::new();
        for handle in self.tables.select(None)? {
            let row = self.tables.project(handle, None)?;
            let Some(Value::Text(name)) = row.get("table_name") else {
                bail!("corrupt catalog: _tables row without table_name");
            };
            if !is_schema_table(name) {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    /// Declared columns of a relation, in declaration order.
    pub fn columns_of(&mut self, name: &str) -> Result<Vec<Column>> {
        self.ensure_bootstrapped()?;
        let mut columns = Vec::new();
        for handle in self.columns.select(Some(&where_table(name)))? {
            let row = self.columns.project(handle, None)?;
            let (Some(Value::Text(column_name)), Some(Value::Text(type_name))) =
                (row.get("column_name"), row.get("data_type"))
            else {
                bail!("corrupt catalog: malformed _columns row for {name}");
            };
            let data_type = DataType::from_type_name(type_name)
                .with_context(|| format!("corrupt catalog: unknown data type {type_name}"))?;
            columns.push(Column::new(column_name, data_type));
        }
        if columns.is_empty() {
            bail!("table does not exist: {name}");
        }
        Ok(columns)
    }

    /// Builds a `HeapTable` for a registered relation from its stored
    /// schema. The underlying file is opened lazily on first use.
    pub fn open_table(&mut self, name: &str) -> Result<HeapTable> {
        let columns = self.columns_of(name)?;
        Ok(HeapTable::new(&self.dir, name, columns))
    }

    fn ensure_bootstrapped(&mut self) -> Result<()> {
        if self.bootstrapped {
            return Ok(());
        }
        self.tables.create_if_not_exists()?;
        self.columns.create_if_not_exists()?;
        if self.tables.select(None)?.is_empty() {
            debug!("seeding schema catalog in {}", self.dir.display());
            for name in [TABLES_TABLE_NAME, COLUMNS_TABLE_NAME] {
                self.tables.insert(&where_table(name))?;
            }
            for column in tables_schema() {
                self.columns.insert(&column_row(TABLES_TABLE_NAME, &column))?;
            }
            for column in columns_schema() {
                self.columns.insert(&column_row(COLUMNS_TABLE_NAME, &column))?;
            }
        }
        self.bootstrapped = true;
        Ok(())
    }

    fn create_table_storage(&mut self, name: &str, columns: &[Column]) -> Result<()> {
        let mut column_handles = Vec::new();
        let mut failure = None;
        for column in columns {
            match self.columns.insert(&column_row(name, column)) {
                Ok(handle) => column_handles.push(handle),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if failure.is_none() {
            let mut table = HeapTable::new(&self.dir, name, columns.to_vec());
            if let Err(e) = table.create() {
                failure = Some(e);
            }
        }
        if let Some(e) = failure {
            for handle in column_handles {
                let _ = self.columns.delete(handle);
            }
            return Err(e);
        }
        Ok(())
    }
}

fn where_table(name: &str) -> Row {
    Row::from([("table_name".to_string(), Value::Text(name.to_string()))])
}

fn column_row(table_name: &str, column: &Column) -> Row {
    Row::from([
        ("table_name".to_string(), Value::Text(table_name.to_string())),
        ("column_name".to_string(), Value::Text(column.name.clone())),
        (
            "data_type".to_string(),
            Value::Text(column.data_type.type_name().to_string()),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn foo_schema() -> Vec<Column> {
        vec![
            Column::new("x", DataType::Int),
            Column::new("label", DataType::Text),
        ]
    }

    #[test]
    fn test_bootstrap_is_self_describing() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        // Triggers the lazy bootstrap.
        assert!(catalog.table_names()?.is_empty());

        let tables_columns = catalog.columns_of(TABLES_TABLE_NAME)?;
        assert_eq!(tables_columns, tables_schema());
        let columns_columns = catalog.columns_of(COLUMNS_TABLE_NAME)?;
        assert_eq!(columns_columns, columns_schema());
        Ok(())
    }

    #[test]
    fn test_create_and_describe_table() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        catalog.create_table("foo", &foo_schema(), false)?;
        assert_eq!(catalog.table_names()?, vec!["foo".to_string()]);
        assert_eq!(catalog.columns_of("foo")?, foo_schema());
        assert!(catalog.table_exists("foo")?);
        Ok(())
    }

    #[test]
    fn test_column_order_preserved() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        let columns = vec![
            Column::new("zeta", DataType::Text),
            Column::new("alpha", DataType::Int),
            Column::new("mid", DataType::Text),
        ];
        catalog.create_table("ordered", &columns, false)?;
        assert_eq!(catalog.columns_of("ordered")?, columns);
        Ok(())
    }

    #[test]
    fn test_duplicate_create() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        catalog.create_table("foo", &foo_schema(), false)?;
        assert!(catalog.create_table("foo", &foo_schema(), false).is_err());
        // IF NOT EXISTS swallows the conflict.
        catalog.create_table("foo", &foo_schema(), true)?;
        assert_eq!(catalog.table_names()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_drop_table() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        catalog.create_table("foo", &foo_schema(), false)?;
        catalog.drop_table("foo")?;

        assert!(!catalog.table_exists("foo")?);
        assert!(catalog.columns_of("foo").is_err());
        // Dropped storage is gone: a re-created table starts empty.
        catalog.create_table("foo", &foo_schema(), false)?;
        let mut table = catalog.open_table("foo")?;
        assert!(table.select(None)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_drop_unknown_table() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::new(dir.path());
        assert!(catalog.drop_table("ghost").is_err());
    }

    #[test]
    fn test_schema_tables_protected() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::new(dir.path());
        assert!(catalog.drop_table(TABLES_TABLE_NAME).is_err());
        assert!(catalog.drop_table(COLUMNS_TABLE_NAME).is_err());
        assert!(catalog
            .create_table(TABLES_TABLE_NAME, &foo_schema(), false)
            .is_err());
    }

    #[test]
    fn test_catalog_persists_across_instances() -> Result<()> {
        let dir = tempdir()?;
        {
            let mut catalog = Catalog::new(dir.path());
            catalog.create_table("foo", &foo_schema(), false)?;
            let mut table = catalog.open_table("foo")?;
            table.insert(&Row::from([
                ("x".to_string(), Value::Int(5)),
                ("label".to_string(), Value::Text("kept".to_string())),
            ]))?;
        }
        {
            let mut catalog = Catalog::new(dir.path());
            assert_eq!(catalog.table_names()?, vec!["foo".to_string()]);
            let mut table = catalog.open_table("foo")?;
            let handles = table.select(None)?;
            assert_eq!(handles.len(), 1);
            let row = table.project(handles[0], None)?;
            assert_eq!(row.get("x"), Some(&Value::Int(5)));
        }
        Ok(())
    }

    #[test]
    fn test_rollback_on_failed_create() -> Result<()> {
        let dir = tempdir()?;
        let mut catalog = Catalog::new(dir.path());

        // Pre-existing storage file makes HeapFile::create fail after the
        // catalog rows have been inserted.
        std::fs::write(dir.path().join("clash.db"), [0u8; 4096])?;
        assert!(catalog.create_table("clash", &foo_schema(), false).is_err());

        assert!(!catalog.table_exists("clash")?);
        assert!(catalog.columns_of("clash").is_err());
        Ok(())
    }
}
