//! SQL schema for the narrative corpus database.
//!
//! The database is rebuilt from scratch on every import, so the DDL is plain
//! `CREATE TABLE` without `IF NOT EXISTS`; running it twice against the same
//! file is an error.

use rusqlite::Connection;

use crate::Result;

/// Built-in DDL for every table the import catalog loads.
///
/// `relationships.subject_*` / `object_*` form a type-tagged reference that
/// SQLite cannot declare as a foreign key; see the integrity checker.
pub const SCHEMA: &str = "
CREATE TABLE books (
    id              INTEGER PRIMARY KEY,
    title           TEXT NOT NULL,
    series_order    INTEGER,
    published_year  INTEGER,
    description     TEXT
);

CREATE TABLE chapters (
    id              INTEGER PRIMARY KEY,
    book_id         INTEGER NOT NULL REFERENCES books(id),
    chapter_number  INTEGER NOT NULL,
    title           TEXT,
    summary         TEXT
);

CREATE TABLE characters (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    aliases         TEXT,             -- JSON array of strings
    gender          TEXT,
    nationality     TEXT,
    occupation      TEXT,
    is_main         INTEGER,          -- 0 | 1
    description     TEXT
);

CREATE TABLE locations (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    location_type   TEXT,
    city            TEXT,
    country         TEXT,
    description     TEXT
);

CREATE TABLE organizations (
    id                        INTEGER PRIMARY KEY,
    name                      TEXT NOT NULL,
    aliases                   TEXT,   -- JSON array of strings
    organization_type         TEXT,
    first_appearance_book_id  INTEGER REFERENCES books(id),
    description               TEXT
);

CREATE TABLE glossary (
    id              INTEGER PRIMARY KEY,
    term            TEXT NOT NULL,
    definition      TEXT,
    language        TEXT
);

CREATE TABLE characters_appearances (
    book_id         INTEGER NOT NULL REFERENCES books(id),
    chapter_id      INTEGER NOT NULL REFERENCES chapters(id),
    character_id    INTEGER NOT NULL REFERENCES characters(id)
);

CREATE TABLE locations_appearances (
    book_id         INTEGER NOT NULL REFERENCES books(id),
    chapter_id      INTEGER NOT NULL REFERENCES chapters(id),
    location_id     INTEGER NOT NULL REFERENCES locations(id)
);

CREATE TABLE relationships (
    id              INTEGER PRIMARY KEY,
    subject_type    TEXT NOT NULL,    -- 'character' | 'organization' | 'location'
    subject_id      INTEGER NOT NULL,
    subject_name    TEXT,
    predicate       TEXT NOT NULL,
    object_type     TEXT NOT NULL,
    object_id       INTEGER NOT NULL,
    object_name     TEXT,
    book_id         INTEGER NOT NULL REFERENCES books(id),
    chapter_id      INTEGER NOT NULL REFERENCES chapters(id),
    evidence        TEXT
);

CREATE INDEX chapters_book_idx             ON chapters(book_id);
CREATE INDEX organizations_first_book_idx  ON organizations(first_appearance_book_id);
CREATE INDEX characters_app_chapter_idx    ON characters_appearances(chapter_id);
CREATE INDEX characters_app_character_idx  ON characters_appearances(character_id);
CREATE INDEX locations_app_chapter_idx     ON locations_appearances(chapter_id);
CREATE INDEX locations_app_location_idx    ON locations_appearances(location_id);
CREATE INDEX relationships_subject_idx     ON relationships(subject_type, subject_id);
CREATE INDEX relationships_object_idx      ON relationships(object_type, object_id);
CREATE INDEX relationships_chapter_idx     ON relationships(chapter_id);
";

/// Turn on foreign-key enforcement. Must run outside a transaction.
pub fn configure_connection(conn: &Connection) -> Result<()> {
  conn.pragma_update(None, "foreign_keys", "ON")?;
  Ok(())
}

/// Execute a DDL script against a fresh database.
pub fn create_schema(conn: &Connection, ddl: &str) -> Result<()> {
  conn.execute_batch(ddl)?;
  Ok(())
}

/// Declared column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
  let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
  let columns = stmt
    .query_map([table], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(columns)
}
