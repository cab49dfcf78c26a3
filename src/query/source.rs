//! Data source contract.
//!
//! The resolver never talks to a database directly. It issues SQL through a
//! [`DataSource`] and reads back field metadata and JSON rows.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A row as returned by the data source.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Column type as reported by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Dates and timestamps, with or without time zone.
    Date,
    Number,
    String,
    Boolean,
    Geometry,
    Other(String),
}

impl FieldType {
    /// Classifies a type name, accepting both generic names (`date`, `number`)
    /// and PostgreSQL ones (`timestamptz`, `int8`, ...).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "date" | "timestamp" | "timestamptz" | "timestamp without time zone"
            | "timestamp with time zone" => FieldType::Date,
            "number" | "numeric" | "int2" | "int4" | "int8" | "smallint" | "integer"
            | "bigint" | "float4" | "float8" | "real" | "double precision" => FieldType::Number,
            "string" | "text" | "varchar" | "character varying" | "char" | "bpchar" | "name" => {
                FieldType::String
            }
            "boolean" | "bool" => FieldType::Boolean,
            "geometry" | "geography" => FieldType::Geometry,
            _ => FieldType::Other(name.to_string()),
        }
    }

    /// Returns `true` for date and timestamp columns.
    pub fn is_time(&self) -> bool {
        matches!(self, FieldType::Date)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Geometry => "geometry",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::from_name(&name)
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub kind: FieldType,
}

impl Field {
    pub fn new(kind: FieldType) -> Self {
        Self { kind }
    }
}

/// A query result set: column metadata plus rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub fields: HashMap<String, Field>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, returning the updated result for chaining.
    pub fn field(mut self, name: impl Into<String>, kind: FieldType) -> Self {
        self.fields.insert(name.into(), Field::new(kind));
        self
    }

    /// Adds a row, returning the updated result for chaining.
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }
}

/// Failure reported by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataSourceError {
    pub message: String,
}

impl DataSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Something that runs SQL.
///
/// Returning `Ok(None)` means the statement produced no result set at all,
/// which is different from an empty one.
pub trait DataSource: Send + Sync {
    /// Runs `sql`. `readonly` asks the source to refuse writes.
    fn query(&self, sql: &str, readonly: bool) -> Result<Option<QueryResult>, DataSourceError>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn query(&self, sql: &str, readonly: bool) -> Result<Option<QueryResult>, DataSourceError> {
        (**self).query(sql, readonly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_name() {
        assert_eq!(FieldType::from_name("date"), FieldType::Date);
        assert_eq!(FieldType::from_name("timestamptz"), FieldType::Date);
        assert_eq!(
            FieldType::from_name("Timestamp with time zone"),
            FieldType::Date
        );
        assert_eq!(FieldType::from_name("int8"), FieldType::Number);
        assert_eq!(FieldType::from_name("text"), FieldType::String);
        assert_eq!(
            FieldType::from_name("jsonb"),
            FieldType::Other("jsonb".into())
        );
    }

    #[test]
    fn test_only_dates_are_time() {
        assert!(FieldType::Date.is_time());
        assert!(!FieldType::Number.is_time());
        assert!(!FieldType::Other("interval".into()).is_time());
    }

    #[test]
    fn test_query_result_deserializes() {
        let result: QueryResult = serde_json::from_str(
            r#"{"fields": {"ts": {"type": "date"}, "n": {"type": "number"}},
                "rows": [{"ts": "2020-01-01", "n": 1}]}"#,
        )
        .unwrap();
        assert_eq!(result.fields["ts"].kind, FieldType::Date);
        assert_eq!(result.fields["n"].kind, FieldType::Number);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_field_serializes_type_name() {
        let json = serde_json::to_value(Field::new(FieldType::Date)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "date"}));
    }

    #[test]
    fn test_builder() {
        let result = QueryResult::new()
            .field("ts", FieldType::Date)
            .row(Row::new());
        assert!(result.fields.contains_key("ts"));
        assert_eq!(result.rows.len(), 1);
    }
}
