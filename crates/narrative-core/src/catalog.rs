//! The static import catalog.
//!
//! Tables are listed parent-before-child so foreign keys always resolve
//! during a bulk load. Rename and transform maps are immutable process-wide
//! data looked up by table and column name.

use crate::coerce::ColumnTransform;

/// One importable table and how its CSV source maps onto it.
#[derive(Debug)]
pub struct TableSpec {
  pub name:       &'static str,
  pub csv_file:   &'static str,
  /// CSV column name → destination column name, where they differ.
  pub renames:    &'static [(&'static str, &'static str)],
  /// Destination-independent transforms keyed by CSV column name.
  pub transforms: &'static [(&'static str, ColumnTransform)],
}

impl TableSpec {
  /// Destination column for a CSV header; identity when unmapped.
  pub fn rename<'a>(&self, csv_column: &'a str) -> &'a str {
    self
      .renames
      .iter()
      .find(|(from, _)| *from == csv_column)
      .map_or(csv_column, |(_, to)| *to)
  }

  pub fn transform(&self, csv_column: &str) -> Option<ColumnTransform> {
    self
      .transforms
      .iter()
      .find(|(col, _)| *col == csv_column)
      .map(|(_, t)| *t)
  }
}

pub static BOOKS: TableSpec = TableSpec {
  name:       "books",
  csv_file:   "books.csv",
  renames:    &[],
  transforms: &[],
};

pub static CHAPTERS: TableSpec = TableSpec {
  name:       "chapters",
  csv_file:   "chapters.csv",
  renames:    &[],
  transforms: &[],
};

pub static CHARACTERS: TableSpec = TableSpec {
  name:       "characters",
  csv_file:   "characters.csv",
  renames:    &[],
  transforms: &[("aliases", ColumnTransform::AliasList)],
};

pub static LOCATIONS: TableSpec = TableSpec {
  name:       "locations",
  csv_file:   "locations.csv",
  renames:    &[],
  transforms: &[],
};

pub static ORGANIZATIONS: TableSpec = TableSpec {
  name:       "organizations",
  csv_file:   "organizations.csv",
  // Misspelled in the source export.
  renames:    &[("fist_appearance_book_id", "first_appearance_book_id")],
  transforms: &[("aliases", ColumnTransform::AliasList)],
};

pub static GLOSSARY: TableSpec = TableSpec {
  name:       "glossary",
  csv_file:   "glossary.csv",
  renames:    &[],
  transforms: &[],
};

pub static CHARACTERS_APPEARANCES: TableSpec = TableSpec {
  name:       "characters_appearances",
  csv_file:   "characters_appearances.csv",
  renames:    &[],
  transforms: &[],
};

pub static LOCATIONS_APPEARANCES: TableSpec = TableSpec {
  name:       "locations_appearances",
  csv_file:   "locations_appearances.csv",
  renames:    &[],
  transforms: &[],
};

pub static RELATIONSHIPS: TableSpec = TableSpec {
  name:       "relationships",
  csv_file:   "relationships.csv",
  renames:    &[],
  transforms: &[],
};

/// Import order. Parents strictly precede children.
pub static IMPORT_ORDER: [&TableSpec; 9] = [
  &BOOKS,
  &CHAPTERS,
  &CHARACTERS,
  &LOCATIONS,
  &ORGANIZATIONS,
  &GLOSSARY,
  &CHARACTERS_APPEARANCES,
  &LOCATIONS_APPEARANCES,
  &RELATIONSHIPS,
];

/// Look up a table by name.
pub fn table(name: &str) -> Option<&'static TableSpec> {
  IMPORT_ORDER.iter().copied().find(|t| t.name == name)
}
