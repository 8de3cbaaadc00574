//! Read-only integrity battery for a built database.
//!
//! Every check is independent: it yields a list of violation descriptions
//! (empty means pass), and a database error inside one check is recorded as
//! that check's failure without stopping the others.

use std::{fmt, path::Path};

use narrative_core::entity::{EntityKind, Role};
use rusqlite::{Connection, OpenFlags};

use crate::{Error, Result, relationships::fetch_relationships};

/// Minimum row counts observed in the reference dataset. Counts may grow
/// between dataset revisions but must never shrink below these.
pub const REFERENCE_FLOORS: &[(&str, i64)] = &[
  ("books", 6),
  ("chapters", 122),
  ("characters", 170),
  ("locations", 370),
  ("organizations", 51),
  ("glossary", 512),
  ("characters_appearances", 883),
  ("locations_appearances", 581),
  ("relationships", 303),
];

/// Columns that must never be NULL or blank.
pub const NAME_COLUMNS: &[(&str, &str)] = &[
  ("books", "title"),
  ("characters", "name"),
  ("locations", "name"),
  ("organizations", "name"),
  ("glossary", "term"),
];

/// SQL expression for the characters `TRIM` strips when testing for blank
/// names: space, tab, newline, carriage return.
const WHITESPACE: &str = "' ' || char(9) || char(10) || char(13)";

/// Tables whose `aliases` column holds a JSON array.
pub const ALIAS_TABLES: &[&str] = &["characters", "organizations"];

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
  pub name:       &'static str,
  pub violations: Vec<String>,
}

impl CheckResult {
  pub fn passed(&self) -> bool { self.violations.is_empty() }
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
  pub results: Vec<CheckResult>,
}

impl CheckReport {
  pub fn passed(&self) -> usize { self.results.iter().filter(|r| r.passed()).count() }

  pub fn failed(&self) -> usize { self.results.len() - self.passed() }

  pub fn is_ok(&self) -> bool { self.failed() == 0 }

  pub fn get(&self, name: &str) -> Option<&CheckResult> {
    self.results.iter().find(|r| r.name == name)
  }
}

/// A relationship endpoint that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolymorphicViolation {
  UnknownType {
    relationship_id: i64,
    role:            Role,
    type_tag:        String,
  },
  MissingEntity {
    relationship_id: i64,
    role:            Role,
    kind:            EntityKind,
    /// The stored id, rendered as text.
    id:              String,
  },
}

impl fmt::Display for PolymorphicViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolymorphicViolation::UnknownType {
        relationship_id,
        role,
        type_tag,
      } => write!(f, "rel {relationship_id}: unknown {role}_type {type_tag:?}"),
      PolymorphicViolation::MissingEntity {
        relationship_id,
        role,
        kind,
        id,
      } => write!(
        f,
        "rel {relationship_id}: {role} {kind}:{id} not found in {}",
        kind.table()
      ),
    }
  }
}

// ─── Checker ─────────────────────────────────────────────────────────────────

type CheckFn = fn(&IntegrityChecker) -> Result<Vec<String>>;

/// The battery, in reporting order.
const CHECKS: &[(&str, CheckFn)] = &[
  ("table_row_counts", IntegrityChecker::row_count_violations),
  ("foreign_key_integrity", IntegrityChecker::foreign_key_violations),
  ("chapters_reference_valid_books", IntegrityChecker::chapter_orphans),
  ("organizations_reference_valid_books", IntegrityChecker::organization_orphans),
  ("characters_appearances_references", IntegrityChecker::character_appearance_orphans),
  ("locations_appearances_references", IntegrityChecker::location_appearance_orphans),
  ("relationships_reference_valid_chapters", IntegrityChecker::relationship_scope_orphans),
  ("relationships_polymorphic_fk", IntegrityChecker::polymorphic_descriptions),
  ("no_empty_names", IntegrityChecker::empty_names),
  ("aliases_are_valid_json", IntegrityChecker::invalid_aliases),
];

pub struct IntegrityChecker {
  conn:   Connection,
  floors: Vec<(String, i64)>,
}

impl IntegrityChecker {
  /// Open the database at `path` read-only with the reference floors.
  pub fn open(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Err(Error::DatabaseNotFound(path.to_path_buf()));
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(Self::from_connection(conn))
  }

  pub fn from_connection(conn: Connection) -> Self {
    Self {
      conn,
      floors: REFERENCE_FLOORS
        .iter()
        .map(|(t, n)| ((*t).to_owned(), *n))
        .collect(),
    }
  }

  /// Replace the row-count floors.
  pub fn with_floors<'a>(mut self, floors: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
    self.floors = floors.into_iter().map(|(t, n)| (t.to_owned(), n)).collect();
    self
  }

  /// Run every check and collect the results.
  pub fn run_all(&self) -> CheckReport {
    let results = CHECKS
      .iter()
      .map(|(name, check)| {
        let violations =
          check(self).unwrap_or_else(|e| vec![format!("check errored: {e}")]);
        CheckResult {
          name: *name,
          violations,
        }
      })
      .collect();
    CheckReport { results }
  }

  pub fn row_count_violations(&self) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for (table, min) in &self.floors {
      let sql = format!("SELECT COUNT(*) FROM \"{table}\"");
      let actual: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
      if actual < *min {
        out.push(format!("{table}: expected >= {min} rows, got {actual}"));
      }
    }
    Ok(out)
  }

  /// Rows reported by `PRAGMA foreign_key_check`.
  pub fn foreign_key_violations(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
    let rows = stmt
      .query_map([], |r| {
        let table: String = r.get(0)?;
        let rowid: Option<i64> = r.get(1)?;
        let parent: String = r.get(2)?;
        Ok(match rowid {
          Some(id) => format!("{table} rowid {id} -> missing {parent}"),
          None => format!("{table} -> missing {parent}"),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub fn chapter_orphans(&self) -> Result<Vec<String>> {
    self.describe_rows(
      "SELECT printf('chapter %s: book_id=%s', c.id, quote(c.book_id))
       FROM chapters c
       LEFT JOIN books b ON b.id = c.book_id
       WHERE b.id IS NULL",
    )
  }

  /// Organizations whose first-appearance book is set but missing.
  pub fn organization_orphans(&self) -> Result<Vec<String>> {
    self.describe_rows(
      "SELECT printf('organization %s: first_appearance_book_id=%s',
                     o.id, quote(o.first_appearance_book_id))
       FROM organizations o
       LEFT JOIN books b ON b.id = o.first_appearance_book_id
       WHERE o.first_appearance_book_id IS NOT NULL AND b.id IS NULL",
    )
  }

  pub fn character_appearance_orphans(&self) -> Result<Vec<String>> {
    self.describe_rows(
      "SELECT printf('book_id=%s chapter_id=%s character_id=%s',
                     quote(ca.book_id), quote(ca.chapter_id), quote(ca.character_id))
       FROM characters_appearances ca
       LEFT JOIN books b ON b.id = ca.book_id
       LEFT JOIN chapters ch ON ch.id = ca.chapter_id
       LEFT JOIN characters c ON c.id = ca.character_id
       WHERE b.id IS NULL OR ch.id IS NULL OR c.id IS NULL",
    )
  }

  pub fn location_appearance_orphans(&self) -> Result<Vec<String>> {
    self.describe_rows(
      "SELECT printf('book_id=%s chapter_id=%s location_id=%s',
                     quote(la.book_id), quote(la.chapter_id), quote(la.location_id))
       FROM locations_appearances la
       LEFT JOIN books b ON b.id = la.book_id
       LEFT JOIN chapters ch ON ch.id = la.chapter_id
       LEFT JOIN locations l ON l.id = la.location_id
       WHERE b.id IS NULL OR ch.id IS NULL OR l.id IS NULL",
    )
  }

  pub fn relationship_scope_orphans(&self) -> Result<Vec<String>> {
    self.describe_rows(
      "SELECT printf('rel %s: book_id=%s chapter_id=%s',
                     r.id, quote(r.book_id), quote(r.chapter_id))
       FROM relationships r
       LEFT JOIN books b ON b.id = r.book_id
       LEFT JOIN chapters ch ON ch.id = r.chapter_id
       WHERE b.id IS NULL OR ch.id IS NULL",
    )
  }

  /// Resolve every relationship endpoint against the table its tag names.
  pub fn polymorphic_violations(&self) -> Result<Vec<PolymorphicViolation>> {
    let mut out = Vec::new();
    for rel in fetch_relationships(&self.conn)? {
      for (role, endpoint) in [(Role::Subject, &rel.subject), (Role::Object, &rel.object)] {
        let kind = match endpoint.kind() {
          Ok(kind) => kind,
          Err(narrative_core::Error::UnknownEntityType(type_tag)) => {
            out.push(PolymorphicViolation::UnknownType {
              relationship_id: rel.id,
              role,
              type_tag,
            });
            continue;
          }
        };
        if !self.entity_exists(kind, &endpoint.id)? {
          out.push(PolymorphicViolation::MissingEntity {
            relationship_id: rel.id,
            role,
            kind,
            id: endpoint.id.clone(),
          });
        }
      }
    }
    Ok(out)
  }

  fn polymorphic_descriptions(&self) -> Result<Vec<String>> {
    Ok(
      self
        .polymorphic_violations()?
        .iter()
        .map(ToString::to_string)
        .collect(),
    )
  }

  pub fn empty_names(&self) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for (table, col) in NAME_COLUMNS {
      let count: i64 = self.conn.query_row(
        &format!(
          "SELECT COUNT(*) FROM {table} WHERE {col} IS NULL OR TRIM({col}, {WHITESPACE}) = ''"
        ),
        [],
        |r| r.get(0),
      )?;
      if count > 0 {
        out.push(format!("{table}.{col} has {count} NULL/empty values"));
      }
    }
    Ok(out)
  }

  /// Non-null `aliases` values that are not a JSON array.
  pub fn invalid_aliases(&self) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for table in ALIAS_TABLES {
      let mut stmt = self.conn.prepare(&format!(
        "SELECT id, name, aliases FROM {table} WHERE aliases IS NOT NULL ORDER BY id"
      ))?;
      let rows = stmt
        .query_map([], |r| {
          Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, String>(2)?,
          ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

      for (id, name, aliases) in rows {
        let name = name.unwrap_or_default();
        match serde_json::from_str::<serde_json::Value>(&aliases) {
          Ok(v) if v.is_array() => {}
          Ok(_) => out.push(format!("{table} id={id} ({name}): aliases is not a JSON array")),
          Err(_) => out.push(format!(
            "{table} id={id} ({name}): invalid JSON in aliases: {aliases:?}"
          )),
        }
      }
    }
    Ok(out)
  }

  /// The text id is compared under the column's INTEGER affinity, so `"7"`
  /// matches row 7 and a non-numeric id matches nothing.
  fn entity_exists(&self, kind: EntityKind, id: &str) -> Result<bool> {
    let mut stmt = self.conn.prepare_cached(&format!(
      "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
      kind.table()
    ))?;
    Ok(stmt.query_row([id], |r| r.get(0))?)
  }

  /// Run a query whose single column is a violation description.
  fn describe_rows(&self, sql: &str) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare(sql)?;
    let rows = stmt
      .query_map([], |r| r.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }
}
