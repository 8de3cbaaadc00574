//! Integration tests: full builds from CSV fixtures on disk, then the
//! integrity battery against the result.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, types::Value};
use tempfile::TempDir;

use narrative_core::entity::{EntityKind, Role};

use crate::{
  Error, IntegrityChecker, TableOutcome, build_database, fetch_relationships,
  integrity::PolymorphicViolation, schema::SCHEMA,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

const FIXTURE: &[(&str, &str)] = &[
  (
    "books.csv",
    "id,title,series_order,published_year,description
1,Codename Villanelle,1,2018,
2,No Tomorrow,2,2018,
",
  ),
  (
    "chapters.csv",
    "id,book_id,chapter_number,title,summary
1,1,1,One,
2,1,2,Two,
3,2,1,One,
",
  ),
  (
    "characters.csv",
    "id,name,aliases,gender,nationality,occupation,is_main,description
1,Villanelle,['Oksana' 'Billie'],female,Russian,assassin,TRUE,
2,Eve Polastri,,female,British,analyst,true,
3,Konstantin,['Konstantin Vasiliev'],male,Russian,handler,FALSE,
",
  ),
  (
    "locations.csv",
    "id,name,location_type,city,country,description
1,Paris apartment,residence,Paris,France,
2,Thames House,office,London,United Kingdom,
",
  ),
  (
    "organizations.csv",
    "id,name,aliases,organization_type,fist_appearance_book_id,description
1,The Twelve,['The 12'],criminal,1,
2,MI6,none,intelligence,2,
",
  ),
  (
    "glossary.csv",
    "id,term,definition,language
1,Babushka,Grandmother,Russian
",
  ),
  (
    "characters_appearances.csv",
    "book_id,chapter_id,character_id
1,1,1
1,2,2
2,3,3
",
  ),
  (
    "locations_appearances.csv",
    "book_id,chapter_id,location_id
1,1,1
2,3,2
",
  ),
  (
    "relationships.csv",
    "id,subject_type,subject_id,subject_name,predicate,object_type,object_id,object_name,book_id,chapter_id,evidence
1,character,1,Villanelle,works_for,organization,1,The Twelve,1,1,
2,character,2,Eve Polastri,hunts,character,1,Villanelle,1,2,
3,character,3,Konstantin,handles,character,1,Oksana,2,3,
4,organization,1,The Twelve,operates_in,location,1,Paris apartment,1,1,
",
  ),
];

const FIXTURE_TOTAL: usize = 22;

struct Workspace {
  dir: TempDir,
}

impl Workspace {
  fn new() -> Self {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(dir.path().join("data")).unwrap();
    for (file, body) in FIXTURE {
      std::fs::write(dir.path().join("data").join(file), body).unwrap();
    }
    Self { dir }
  }

  fn data_dir(&self) -> PathBuf { self.dir.path().join("data") }

  fn db_path(&self) -> PathBuf { self.dir.path().join("database").join("corpus.db") }

  fn write(&self, file: &str, body: &str) {
    std::fs::write(self.data_dir().join(file), body).unwrap();
  }

  fn remove(&self, file: &str) { std::fs::remove_file(self.data_dir().join(file)).unwrap(); }

  fn build(&self) -> crate::Result<crate::ImportReport> {
    build_database(&self.db_path(), &self.data_dir(), SCHEMA)
  }
}

fn count(path: &Path, table: &str) -> i64 {
  let conn = Connection::open(path).unwrap();
  conn
    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
    .unwrap()
}

fn dump(path: &Path, table: &str) -> Vec<Vec<Value>> {
  let conn = Connection::open(path).unwrap();
  let mut stmt = conn
    .prepare(&format!("SELECT * FROM {table} ORDER BY rowid"))
    .unwrap();
  let width = stmt.column_count();
  stmt
    .query_map([], |r| {
      (0..width)
        .map(|i| r.get::<_, Value>(i))
        .collect::<rusqlite::Result<Vec<Value>>>()
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

fn small_floors() -> Vec<(&'static str, i64)> {
  narrative_core::catalog::IMPORT_ORDER
    .iter()
    .map(|t| (t.name, 1))
    .collect()
}

// ─── Build ───────────────────────────────────────────────────────────────────

#[test]
fn build_imports_every_table() {
  let ws = Workspace::new();
  let report = ws.build().unwrap();

  assert_eq!(report.tables.len(), 9);
  assert_eq!(report.total_rows(), FIXTURE_TOTAL);
  assert_eq!(report.rows("chapters"), Some(3));
  assert_eq!(report.rows("relationships"), Some(4));
  assert_eq!(count(&ws.db_path(), "relationships"), 4);
}

#[test]
fn build_applies_coercion_renames_and_transforms() {
  let ws = Workspace::new();
  ws.build().unwrap();
  let conn = Connection::open(ws.db_path()).unwrap();

  let (aliases, is_main): (String, i64) = conn
    .query_row(
      "SELECT aliases, is_main FROM characters WHERE id = 1",
      [],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .unwrap();
  assert_eq!(aliases, r#"["Oksana", "Billie"]"#);
  assert_eq!(is_main, 1);

  // Blank alias cells still go through the transform.
  let eve: (String, i64) = conn
    .query_row(
      "SELECT aliases, is_main FROM characters WHERE id = 2",
      [],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .unwrap();
  assert_eq!(eve, ("[]".to_owned(), 1));

  // Empty scalar cells become NULL.
  let description: Option<String> = conn
    .query_row("SELECT description FROM books WHERE id = 1", [], |r| r.get(0))
    .unwrap();
  assert_eq!(description, None);

  let (first_book, mi6_aliases): (i64, String) = conn
    .query_row(
      "SELECT first_appearance_book_id, aliases FROM organizations WHERE id = 2",
      [],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .unwrap();
  assert_eq!(first_book, 2);
  assert_eq!(mi6_aliases, "[]");
}

#[test]
fn missing_file_is_skipped() {
  let ws = Workspace::new();
  ws.remove("glossary.csv");

  let report = ws.build().unwrap();
  let glossary = report.tables.iter().find(|t| t.table == "glossary").unwrap();
  assert_eq!(glossary.outcome, TableOutcome::Skipped);
  assert_eq!(report.total_rows(), FIXTURE_TOTAL - 1);
  assert_eq!(count(&ws.db_path(), "glossary"), 0);
  assert_eq!(count(&ws.db_path(), "relationships"), 4);
}

#[test]
fn rebuild_discards_previous_database() {
  let ws = Workspace::new();
  let first = ws.build().unwrap();

  {
    let conn = Connection::open(ws.db_path()).unwrap();
    conn
      .execute("INSERT INTO glossary (id, term) VALUES (99, 'Stray')", [])
      .unwrap();
  }
  assert_eq!(count(&ws.db_path(), "glossary"), 2);

  let second = ws.build().unwrap();
  assert_eq!(first.tables, second.tables);
  assert_eq!(count(&ws.db_path(), "glossary"), 1);
}

#[test]
fn builds_are_deterministic() {
  let a = Workspace::new();
  let b = Workspace::new();
  a.build().unwrap();
  b.build().unwrap();

  for spec in narrative_core::catalog::IMPORT_ORDER {
    assert_eq!(
      dump(&a.db_path(), spec.name),
      dump(&b.db_path(), spec.name),
      "{} differs",
      spec.name
    );
  }
}

#[test]
fn missing_header_aborts_the_run() {
  let ws = Workspace::new();
  ws.write("chapters.csv", "");

  let err = ws.build().unwrap_err();
  assert!(matches!(err, Error::MissingHeader(ref p) if p.ends_with("chapters.csv")));
  // Books were inserted before the failure but never committed.
  assert_eq!(count(&ws.db_path(), "books"), 0);
}

#[test]
fn foreign_key_violation_rolls_back_everything() {
  let ws = Workspace::new();
  ws.write(
    "chapters.csv",
    "id,book_id,chapter_number,title,summary\n1,1,1,One,\n2,77,1,Lost,\n",
  );

  let err = ws.build().unwrap_err();
  assert!(matches!(err, Error::Database(_)), "got {err:?}");
  assert_eq!(count(&ws.db_path(), "books"), 0);
  assert_eq!(count(&ws.db_path(), "chapters"), 0);
}

#[test]
fn unknown_column_is_rejected_before_insert() {
  let ws = Workspace::new();
  ws.write("glossary.csv", "id,term,etymology\n1,Babushka,Russian\n");

  let err = ws.build().unwrap_err();
  assert!(
    matches!(err, Error::UnknownColumn { ref table, ref column }
      if table == "glossary" && column == "etymology"),
    "got {err:?}"
  );
}

#[test]
fn ragged_row_is_a_csv_error() {
  let ws = Workspace::new();
  ws.write("glossary.csv", "id,term,definition,language\n1,Babushka\n");
  assert!(matches!(ws.build().unwrap_err(), Error::Csv(_)));
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[test]
fn relationships_come_back_in_scan_order() {
  let ws = Workspace::new();
  ws.build().unwrap();
  let conn = crate::relationships::open_read_only(&ws.db_path()).unwrap();

  let rels = fetch_relationships(&conn).unwrap();
  assert_eq!(rels.len(), 4);
  assert_eq!(rels[0].predicate, "works_for");
  assert_eq!(rels[0].subject.key(), "character_1");
  assert_eq!(rels[0].id, 1);
  assert_eq!(rels[0].object.kind().unwrap(), EntityKind::Organization);
  assert_eq!(rels[2].object.name.as_deref(), Some("Oksana"));
  assert_eq!(rels[3].book_id, 1);
}

/// The id columns are not declared foreign keys, so a non-numeric id gets
/// through the import and is stored as text.
const TEXT_ID_RELATIONSHIPS: &str = "id,subject_type,subject_id,subject_name,predicate,object_type,object_id,object_name,book_id,chapter_id,evidence
1,character,1,Villanelle,works_for,organization,1,The Twelve,1,1,
2,character,villanelle,Villanelle,hunts,character,2,Eve Polastri,1,2,
";

#[test]
fn text_endpoint_id_is_read_back_verbatim() {
  let ws = Workspace::new();
  ws.write("relationships.csv", TEXT_ID_RELATIONSHIPS);
  assert_eq!(ws.build().unwrap().rows("relationships"), Some(2));

  let conn = crate::relationships::open_read_only(&ws.db_path()).unwrap();
  let rels = fetch_relationships(&conn).unwrap();
  assert_eq!(rels.len(), 2);
  assert_eq!(rels[0].subject.id, "1");
  assert_eq!(rels[1].subject.id, "villanelle");
  assert_eq!(rels[1].subject.key(), "character_villanelle");
}

#[test]
fn read_only_open_requires_existing_file() {
  let dir = tempfile::tempdir().unwrap();
  let err = crate::relationships::open_read_only(&dir.path().join("nope.db")).unwrap_err();
  assert!(matches!(err, Error::DatabaseNotFound(_)));
}

// ─── Integrity ───────────────────────────────────────────────────────────────

#[test]
fn clean_build_passes_every_check() {
  let ws = Workspace::new();
  ws.build().unwrap();

  let report = IntegrityChecker::open(&ws.db_path())
    .unwrap()
    .with_floors(small_floors())
    .run_all();
  for r in &report.results {
    assert!(r.passed(), "{} failed: {:?}", r.name, r.violations);
  }
  assert_eq!(report.passed(), 10);
  assert!(report.is_ok());
}

#[test]
fn reference_floors_flag_small_dataset() {
  let ws = Workspace::new();
  ws.build().unwrap();

  let report = IntegrityChecker::open(&ws.db_path()).unwrap().run_all();
  assert_eq!(report.failed(), 1);
  let counts = report.get("table_row_counts").unwrap();
  assert_eq!(counts.violations.len(), 9);
  assert!(counts.violations[0].starts_with("books: expected >= 6 rows, got 2"));
}

#[test]
fn checker_requires_existing_database() {
  let dir = tempfile::tempdir().unwrap();
  let err = IntegrityChecker::open(&dir.path().join("missing.db"))
    .err()
    .unwrap();
  assert!(matches!(err, Error::DatabaseNotFound(_)));
}

/// Build the fixture, then tamper with it through a connection that has
/// foreign-key enforcement off. The workspace must outlive the checker.
fn tampered(sql: &str) -> (Workspace, IntegrityChecker) {
  let ws = Workspace::new();
  ws.build().unwrap();

  let conn = Connection::open(ws.db_path()).unwrap();
  conn.pragma_update(None, "foreign_keys", "OFF").unwrap();
  conn.execute_batch(sql).unwrap();
  let checker = IntegrityChecker::from_connection(conn).with_floors(small_floors());
  (ws, checker)
}

#[test]
fn orphans_are_reported_per_child_table() {
  let (_ws, checker) = tampered(
    "INSERT INTO chapters (id, book_id, chapter_number) VALUES (50, 9, 1);
     INSERT INTO characters_appearances VALUES (1, 1, 404);
     INSERT INTO locations_appearances VALUES (8, 1, 1);
     INSERT INTO relationships (id, subject_type, subject_id, predicate,
                                object_type, object_id, book_id, chapter_id)
       VALUES (60, 'character', 1, 'knows', 'character', 2, 1, 300);
     UPDATE organizations SET first_appearance_book_id = 12 WHERE id = 2;",
  );

  assert_eq!(
    checker.chapter_orphans().unwrap(),
    vec!["chapter 50: book_id=9".to_owned()]
  );
  assert_eq!(
    checker.character_appearance_orphans().unwrap(),
    vec!["book_id=1 chapter_id=1 character_id=404".to_owned()]
  );
  assert_eq!(checker.location_appearance_orphans().unwrap().len(), 1);
  assert_eq!(
    checker.relationship_scope_orphans().unwrap(),
    vec!["rel 60: book_id=1 chapter_id=300".to_owned()]
  );
  assert_eq!(checker.organization_orphans().unwrap().len(), 1);
  assert_eq!(checker.foreign_key_violations().unwrap().len(), 5);

  let report = checker.run_all();
  assert!(!report.is_ok());
  assert!(!report.get("foreign_key_integrity").unwrap().passed());
  assert!(report.get("no_empty_names").unwrap().passed());
}

#[test]
fn polymorphic_check_distinguishes_unknown_type_from_missing_id() {
  let (_ws, checker) = tampered(
    "INSERT INTO relationships (id, subject_type, subject_id, predicate,
                                object_type, object_id, book_id, chapter_id)
       VALUES (70, 'faction', 1, 'rivals', 'organization', 1, 1, 1),
              (71, 'character', 1, 'visits', 'location', 999, 1, 1);",
  );

  let violations = checker.polymorphic_violations().unwrap();
  assert_eq!(violations, vec![
    PolymorphicViolation::UnknownType {
      relationship_id: 70,
      role:            Role::Subject,
      type_tag:        "faction".into(),
    },
    PolymorphicViolation::MissingEntity {
      relationship_id: 71,
      role:            Role::Object,
      kind:            EntityKind::Location,
      id:              "999".into(),
    },
  ]);
  // The type-tagged columns are not declared foreign keys.
  assert!(checker.foreign_key_violations().unwrap().is_empty());
}

#[test]
fn text_endpoint_id_is_a_missing_entity() {
  let ws = Workspace::new();
  ws.write("relationships.csv", TEXT_ID_RELATIONSHIPS);
  ws.build().unwrap();

  let report = IntegrityChecker::open(&ws.db_path())
    .unwrap()
    .with_floors(small_floors())
    .run_all();
  assert_eq!(
    report.get("relationships_polymorphic_fk").unwrap().violations,
    vec!["rel 2: subject character:villanelle not found in characters".to_owned()]
  );
  assert_eq!(report.failed(), 1);
}

#[test]
fn blank_names_are_reported() {
  let (_ws, checker) = tampered(
    "INSERT INTO locations (id, name) VALUES (9, '   ');
     INSERT INTO glossary (id, term) VALUES (9, '');",
  );
  assert_eq!(checker.empty_names().unwrap(), vec![
    "locations.name has 1 NULL/empty values".to_owned(),
    "glossary.term has 1 NULL/empty values".to_owned(),
  ]);
}

#[test]
fn tab_and_newline_names_count_as_blank() {
  let (_ws, checker) = tampered(
    "INSERT INTO characters (id, name) VALUES (9, char(9));
     INSERT INTO organizations (id, name) VALUES (9, char(10) || ' ' || char(13));
     INSERT INTO locations (id, name) VALUES (9, ' Villa' || char(9));",
  );
  assert_eq!(checker.empty_names().unwrap(), vec![
    "characters.name has 1 NULL/empty values".to_owned(),
    "organizations.name has 1 NULL/empty values".to_owned(),
  ]);
}

#[test]
fn aliases_must_be_json_arrays() {
  let (_ws, checker) = tampered(
    "INSERT INTO characters (id, name, aliases) VALUES (8, 'Niko', '{\"a\": 1}');
     INSERT INTO organizations (id, name, aliases) VALUES (9, 'Sorority', '[broken');
     INSERT INTO characters (id, name, aliases) VALUES (10, 'Carolyn', NULL);",
  );
  let violations = checker.invalid_aliases().unwrap();
  assert_eq!(violations.len(), 2);
  assert_eq!(
    violations[0],
    "characters id=8 (Niko): aliases is not a JSON array"
  );
  assert!(violations[1].starts_with("organizations id=9 (Sorority): invalid JSON"));
}
