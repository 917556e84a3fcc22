//! Statement execution over the schema catalog.

use crate::access::{Column, Value};
use crate::catalog::Catalog;
use crate::sql::{ColumnDef, Statement};
use anyhow::Result;
use std::fmt;

/// Result of one executed statement: an optional rowset plus a message.
#[derive(Debug)]
pub struct QueryResult {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub message: String,
}

impl QueryResult {
    fn message_only(message: String) -> Self {
        Self {
            column_names: Vec::new(),
            rows: Vec::new(),
            message,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.column_names.is_empty() {
            for name in &self.column_names {
                write!(f, "{name} ")?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in &self.column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in &self.rows {
                for value in row {
                    match value {
                        Value::Text(s) => write!(f, "\"{s}\" ")?,
                        other => write!(f, "{other} ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        f.write_str(&self.message)
    }
}

/// Dispatches parsed statements against the catalog.
pub struct SqlExec {
    catalog: Catalog,
}

impl SqlExec {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::CreateTable {
                table_name,
                columns,
                if_not_exists,
            } => self.create_table(table_name, columns, *if_not_exists),
            Statement::DropTable { table_name } => self.drop_table(table_name),
            Statement::ShowTables => self.show_tables(),
            Statement::ShowColumns { table_name } => self.show_columns(table_name),
        }
    }

    fn create_table(
        &mut self,
        name: &str,
        defs: &[ColumnDef],
        if_not_exists: bool,
    ) -> Result<QueryResult> {
        let columns: Vec<Column> = defs
            .iter()
            .map(|def| Column::new(&def.name, def.data_type))
            .collect();
        self.catalog.create_table(name, &columns, if_not_exists)?;
        Ok(QueryResult::message_only(format!("created {name}")))
    }

    fn drop_table(&mut self, name: &str) -> Result<QueryResult> {
        self.catalog.drop_table(name)?;
        Ok(QueryResult::message_only(format!("dropped {name}")))
    }

    fn show_tables(&mut self) -> Result<QueryResult> {
        let rows: Vec<Vec<Value>> = self
            .catalog
            .table_names()?
            .into_iter()
            .map(|name| vec![Value::Text(name)])
            .collect();
        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult {
            column_names: vec!["table_name".to_string()],
            rows,
            message,
        })
    }

    fn show_columns(&mut self, name: &str) -> Result<QueryResult> {
        let rows: Vec<Vec<Value>> = self
            .catalog
            .columns_of(name)?
            .into_iter()
            .map(|column| {
                vec![
                    Value::Text(name.to_string()),
                    Value::Text(column.name),
                    Value::Text(column.data_type.type_name().to_string()),
                ]
            })
            .collect();
        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult {
            column_names: vec![
                "table_name".to_string(),
                "column_name".to_string(),
                "data_type".to_string(),
            ],
            rows,
            message,
        })
    }
}
