//! Reading the relationship table back out for graph export.

use std::path::Path;

use narrative_core::entity::{Endpoint, Relationship};
use rusqlite::{Connection, OpenFlags};

use crate::{Error, Result};

/// Open an existing database without write access.
pub fn open_read_only(path: &Path) -> Result<Connection> {
  if !path.exists() {
    return Err(Error::DatabaseNotFound(path.to_path_buf()));
  }
  let conn = Connection::open_with_flags(
    path,
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
  )?;
  Ok(conn)
}

/// Every relationship row in table scan order.
///
/// Endpoint ids are read as text so a value the INTEGER column could not
/// convert comes back as stored rather than failing the whole read.
pub fn fetch_relationships(conn: &Connection) -> Result<Vec<Relationship>> {
  let mut stmt = conn.prepare(
    "SELECT id,
            subject_type, CAST(subject_id AS TEXT), subject_name,
            predicate,
            object_type, CAST(object_id AS TEXT), object_name,
            book_id
     FROM relationships
     ORDER BY rowid",
  )?;

  let rows = stmt
    .query_map([], |r| {
      Ok(Relationship {
        id:        r.get(0)?,
        subject:   Endpoint {
          type_tag: r.get(1)?,
          id:       r.get(2)?,
          name:     r.get(3)?,
        },
        predicate: r.get(4)?,
        object:    Endpoint {
          type_tag: r.get(5)?,
          id:       r.get(6)?,
          name:     r.get(7)?,
        },
        book_id:   r.get(8)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(rows)
}
