use std::collections::BTreeMap;
use std::fmt;

/// Column data types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Text,
}

impl DataType {
    /// The name stored in the `_columns` catalog table.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "INT" => Some(DataType::Int),
            "TEXT" => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single typed value in a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int),
            Value::Text(_) => Some(DataType::Text),
        }
    }

    /// NULL is compatible with any column type; storability is decided
    /// at marshal time.
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Int(_), DataType::Int) => true,
            (Value::Text(_), DataType::Text) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A row is a mapping from column name to value.
pub type Row = BTreeMap<String, Value>;
