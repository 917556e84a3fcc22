use crate::access::error::RelationError;
use crate::access::handle::Handle;
use crate::access::value::{DataType, Row, Value};
use crate::storage::error::StorageError;
use crate::storage::heap_file::HeapFile;
use crate::storage::page::BlockId;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::io::{Cursor, Read};
use std::path::Path;

/// One column of a relation's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
        }
    }
}

/// Typed relation stored in a heap file.
///
/// Rows are marshaled positionally in declared column order: INT as a
/// 4-byte little-endian signed integer, TEXT as a 2-byte little-endian
/// length prefix followed by the raw bytes. The encoding is not
/// self-describing; the schema is required to decode.
pub struct HeapTable {
    name: String,
    columns: Vec<Column>,
    file: HeapFile,
}

impl HeapTable {
    pub fn new(dir: &Path, name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            file: HeapFile::new(dir, name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn create(&mut self) -> Result<()> {
        self.file
            .create()
            .with_context(|| format!("failed to create table {}", self.name))?;
        Ok(())
    }

    /// Opens the existing storage, falling back to `create` when absent.
    pub fn create_if_not_exists(&mut self) -> Result<()> {
        match self.file.open() {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound(_)) => self.create(),
            Err(e) => Err(e.into()),
        }
    }

    pub fn open(&mut self) -> Result<()> {
        self.file
            .open()
            .with_context(|| format!("failed to open table {}", self.name))?;
        Ok(())
    }

    pub fn close(&mut self) {
        self.file.close();
    }

    /// Releases all storage for this relation. Terminal.
    pub fn drop_table(&mut self) -> Result<()> {
        self.file
            .drop_file()
            .with_context(|| format!("failed to drop table {}", self.name))?;
        Ok(())
    }

    /// Validates and appends a row, returning its permanent handle.
    pub fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.file.open()?;
        let values = self.validate(row)?;
        let record = self.marshal(&values)?;
        self.append(&record)
    }

    /// Handles of every live row, optionally filtered by column-value
    /// equality against `filter`.
    pub fn select(&mut self, filter: Option<&Row>) -> Result<Vec<Handle>> {
        self.file.open()?;
        if let Some(filter) = filter {
            for key in filter.keys() {
                self.column(key)?;
            }
        }

        let mut handles = Vec::new();
        let block_ids: Vec<BlockId> = self.file.block_ids().collect();
        for block_id in block_ids {
            let page = self.file.get(block_id)?;
            for record_id in page.ids() {
                let handle = Handle::new(block_id, record_id);
                match filter {
                    None => handles.push(handle),
                    Some(filter) => {
                        let Some(record) = page.get(record_id)? else {
                            continue;
                        };
                        let row = self.unmarshal(record)?;
                        if filter.iter().all(|(key, value)| row.get(key) == Some(value)) {
                            handles.push(handle);
                        }
                    }
                }
            }
        }
        Ok(handles)
    }

    /// Unmarshals the row a handle points at, optionally narrowed to the
    /// requested columns.
    pub fn project(&mut self, handle: Handle, columns: Option<&[String]>) -> Result<Row> {
        self.file.open()?;
        let page = self.file.get(handle.block_id)?;
        let record = page
            .get(handle.record_id)?
            .ok_or(RelationError::RecordNotFound { handle })?;
        let row = self.unmarshal(record)?;

        match columns {
            None => Ok(row),
            Some(names) => {
                let mut projected = Row::new();
                for name in names {
                    let value = row.get(name).ok_or_else(|| RelationError::UnknownColumn {
                        column: name.clone(),
                    })?;
                    projected.insert(name.clone(), value.clone());
                }
                Ok(projected)
            }
        }
    }

    /// Overlays `new_values` on the stored row and rewrites the record in
    /// place. Growth beyond the page's free space surfaces as `NoRoom`.
    pub fn update(&mut self, handle: Handle, new_values: &Row) -> Result<()> {
        let mut row = self.project(handle, None)?;
        for (key, value) in new_values {
            self.column(key)?;
            row.insert(key.clone(), value.clone());
        }
        let values = self.validate(&row)?;
        let record = self.marshal(&values)?;

        let mut page = self.file.get(handle.block_id)?;
        page.put(handle.record_id, &record)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Deletes the row a handle points at. The handle is dead afterwards.
    pub fn delete(&mut self, handle: Handle) -> Result<()> {
        self.file.open()?;
        let mut page = self.file.get(handle.block_id)?;
        page.del(handle.record_id)?;
        self.file.put(&page)?;
        Ok(())
    }

    /// Checks a row against the schema and returns its values in declared
    /// column order. Strict: keys not in the schema are rejected.
    pub fn validate(&self, row: &Row) -> Result<Vec<Value>, RelationError> {
        for key in row.keys() {
            self.column(key)?;
        }
        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = row
                .get(&column.name)
                .ok_or_else(|| RelationError::MissingColumn {
                    column: column.name.clone(),
                })?;
            if !value.is_compatible_with(column.data_type) {
                return Err(RelationError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type,
                });
            }
            values.push(value.clone());
        }
        Ok(values)
    }

    /// Encodes values (in declared column order) as one byte record.
    pub fn marshal(&self, values: &[Value]) -> Result<Vec<u8>, RelationError> {
        let mut record = Vec::new();
        for (column, value) in self.columns.iter().zip(values) {
            match (column.data_type, value) {
                (DataType::Int, Value::Int(n)) => record.extend_from_slice(&n.to_le_bytes()),
                (DataType::Text, Value::Text(s)) => {
                    let raw = s.as_bytes();
                    if raw.len() > u16::MAX as usize {
                        return Err(RelationError::TextTooLong {
                            column: column.name.clone(),
                            len: raw.len(),
                        });
                    }
                    record.extend_from_slice(&(raw.len() as u16).to_le_bytes());
                    record.extend_from_slice(raw);
                }
                (_, Value::Null) => {
                    // Representable in a row, but this positional format
                    // has no encoding for it.
                    return Err(RelationError::UnsupportedType {
                        column: column.name.clone(),
                    });
                }
                _ => {
                    return Err(RelationError::TypeMismatch {
                        column: column.name.clone(),
                        expected: column.data_type,
                    });
                }
            }
        }
        Ok(record)
    }

    /// Decodes a record back into a row, advancing past length-prefixed
    /// TEXT fields.
    pub fn unmarshal(&self, record: &[u8]) -> Result<Row> {
        let mut cursor = Cursor::new(record);
        let mut row = Row::new();
        for column in &self.columns {
            let value = match column.data_type {
                DataType::Int => Value::Int(
                    cursor
                        .read_i32::<LittleEndian>()
                        .with_context(|| format!("record truncated at INT column {}", column.name))?,
                ),
                DataType::Text => {
                    let len = cursor
                        .read_u16::<LittleEndian>()
                        .with_context(|| format!("record truncated at TEXT column {}", column.name))?
                        as usize;
                    let mut raw = vec![0u8; len];
                    cursor
                        .read_exact(&mut raw)
                        .with_context(|| format!("record truncated at TEXT column {}", column.name))?;
                    Value::Text(
                        String::from_utf8(raw)
                            .with_context(|| format!("invalid text in column {}", column.name))?,
                    )
                }
            };
            row.insert(column.name.clone(), value);
        }
        Ok(row)
    }

    /// Appends a marshaled record, retrying exactly once on a fresh block
    /// when the last block has no room.
    fn append(&mut self, record: &[u8]) -> Result<Handle> {
        let mut page = self.file.get(self.file.last_block_id())?;
        let record_id = match page.add(record) {
            Ok(id) => id,
            Err(StorageError::NoRoom { .. }) => {
                debug!(
                    "block {} of table {} is full, allocating a new block",
                    page.block_id(),
                    self.name
                );
                page = self.file.get_new()?;
                page.add(record)?
            }
            Err(e) => return Err(e.into()),
        };
        self.file.put(&page)?;
        Ok(Handle::new(page.block_id(), record_id))
    }

    fn column(&self, name: &str) -> Result<&Column, RelationError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RelationError::UnknownColumn {
                column: name.to_string(),
            })
    }
}
