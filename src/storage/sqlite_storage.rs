// SQLite sink for extracted well records
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tracing::{debug, info, warn};

use super::RecordSink;
use crate::error::StorageError;
use crate::fields::{ExtractedRecord, FieldSchema, ValueKind};

pub const TABLE_NAME: &str = "wells";

pub struct SqliteSink {
    conn: Connection,
    columns: Option<Vec<(String, ValueKind)>>,
}

impl SqliteSink {
    pub fn new(path: Option<&Path>) -> Result<Self, StorageError> {
        let conn = if let Some(p) = path {
            Connection::open(p)?
        } else {
            Connection::open_in_memory()?
        };

        Ok(Self {
            conn,
            columns: None,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn row_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RecordSink for SqliteSink {
    fn ensure_table(&mut self, schema: &FieldSchema) -> Result<(), StorageError> {
        let columns: Vec<(String, ValueKind)> =
            schema.specs().map(|s| (s.name.clone(), s.kind)).collect();

        let column_defs: Vec<String> = columns
            .iter()
            .map(|(name, kind)| format!("    {} {}", name, sql_type(*kind)))
            .collect();

        let create_table_sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    source_path TEXT NOT NULL,\n{},\n    ingested_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n);",
            TABLE_NAME,
            column_defs.join(",\n")
        );
        self.conn.execute_batch(&create_table_sql)?;
        info!(table = TABLE_NAME, columns = columns.len(), "table ready");

        self.columns = Some(columns);
        Ok(())
    }

    fn insert(&mut self, source: &Path, record: &ExtractedRecord) -> Result<i64, StorageError> {
        let columns = self.columns.as_ref().ok_or(StorageError::TableMissing)?;

        let shape_matches = columns.len() == record.len()
            && columns
                .iter()
                .zip(record.fields())
                .all(|((name, _), field)| name == &field.name);
        if !shape_matches {
            return Err(StorageError::ShapeMismatch {
                expected: columns.len(),
                got: record.len(),
            });
        }

        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<String> = (1..=names.len() + 1).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} (source_path, {}) VALUES ({})",
            TABLE_NAME,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut values = Vec::with_capacity(names.len() + 1);
        values.push(Value::Text(source.to_string_lossy().into_owned()));
        for field in record.fields() {
            values.push(match &field.value {
                Some(raw) => column_value(&field.name, field.kind, raw),
                None => Value::Null,
            });
        }

        self.conn.execute(&sql, params_from_iter(values))?;
        let row_id = self.conn.last_insert_rowid();
        debug!(row_id, source = %source.display(), "record inserted");
        Ok(row_id)
    }
}

fn sql_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Text => "TEXT",
        ValueKind::Date => "DATE",
        ValueKind::Integer => "INTEGER",
        ValueKind::Float => "REAL",
    }
}

/// Convert a matched string to its column type. Values that don't convert are
/// stored as NULL rather than failing the insert.
fn column_value(name: &str, kind: ValueKind, raw: &str) -> Value {
    let converted = match kind {
        ValueKind::Text => Some(Value::Text(raw.to_string())),
        ValueKind::Integer => raw.parse::<i64>().ok().map(Value::Integer),
        ValueKind::Float => raw.parse::<f64>().ok().map(Value::Real),
        ValueKind::Date => NaiveDate::parse_from_str(raw, "%m/%d/%Y")
            .ok()
            .map(|d| Value::Text(d.format("%Y-%m-%d").to_string())),
    };

    converted.unwrap_or_else(|| {
        warn!(field = name, value = raw, "value does not convert to column type, storing NULL");
        Value::Null
    })
}
