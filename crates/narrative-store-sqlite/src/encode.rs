//! Conversions between core cell values and SQLite values.

use narrative_core::coerce::CellValue;
use rusqlite::types::Value;

pub fn encode_cell(cell: CellValue) -> Value {
  match cell {
    CellValue::Null => Value::Null,
    CellValue::Integer(i) => Value::Integer(i),
    CellValue::Text(s) => Value::Text(s),
  }
}

/// Double-quote an SQL identifier.
pub fn quote_ident(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}
