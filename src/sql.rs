//! SQL front end for the statements the executor understands:
//! CREATE TABLE, DROP TABLE, SHOW TABLES and SHOW COLUMNS FROM.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{ColumnDef, Statement};

use anyhow::Result;

/// Parses a single SQL statement.
pub fn parse(input: &str) -> Result<Statement> {
    parser::Parser::new(input)?.parse_statement()
}
