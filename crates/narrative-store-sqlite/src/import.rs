//! Single-file CSV → table import.

use std::{fs::File, path::Path};

use narrative_core::{catalog, coerce::coerce};
use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
  Error, Result,
  encode::{encode_cell, quote_ident},
  schema::table_columns,
};

/// Import one CSV file into `table`, returning the number of rows written.
///
/// Column renames and transforms come from the static catalog; a table the
/// catalog does not know is imported with identity names and scalar
/// coercion only. Rows are written through `conn` without committing, so
/// the caller's transaction decides durability.
pub fn import_csv(conn: &Connection, table: &str, csv_path: &Path) -> Result<usize> {
  let spec = catalog::table(table);

  let file = File::open(csv_path).map_err(|e| Error::io(csv_path, e))?;
  let mut reader = csv::Reader::from_reader(file);

  let csv_columns = reader.headers()?.clone();
  if csv_columns.is_empty() {
    return Err(Error::MissingHeader(csv_path.to_path_buf()));
  }

  let db_columns: Vec<&str> = csv_columns
    .iter()
    .map(|c| spec.map_or(c, |s| s.rename(c)))
    .collect();
  let transforms: Vec<_> = csv_columns
    .iter()
    .map(|c| spec.and_then(|s| s.transform(c)))
    .collect();

  let declared = table_columns(conn, table)?;
  if let Some(unknown) = db_columns
    .iter()
    .find(|c| !declared.iter().any(|d| d == *c))
  {
    return Err(Error::UnknownColumn {
      table:  table.to_owned(),
      column: (*unknown).to_owned(),
    });
  }

  // Parse everything before touching the table so a malformed record
  // aborts with nothing written.
  let mut rows: Vec<Vec<Value>> = Vec::new();
  for record in reader.records() {
    let record = record?;
    let row = record
      .iter()
      .zip(&transforms)
      .map(|(raw, t)| encode_cell(coerce(raw, *t)))
      .collect();
    rows.push(row);
  }

  let sql = insert_sql(table, &db_columns);
  tracing::debug!(table, path = %csv_path.display(), %sql, "importing");

  let mut stmt = conn.prepare(&sql)?;
  for row in &rows {
    stmt.execute(params_from_iter(row.iter()))?;
  }

  Ok(rows.len())
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
  let names = columns
    .iter()
    .map(|c| quote_ident(c))
    .collect::<Vec<_>>()
    .join(", ");
  let placeholders = vec!["?"; columns.len()].join(", ");
  format!(
    "INSERT INTO {} ({names}) VALUES ({placeholders})",
    quote_ident(table)
  )
}
