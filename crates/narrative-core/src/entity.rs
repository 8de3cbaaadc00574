//! Entity vocabulary and the polymorphic `(type, id)` reference used by
//! the `relationships` table.
//!
//! The storage engine cannot express a foreign key whose target table
//! depends on a sibling column, so the tag is modelled here as an enum and
//! re-validated by the integrity checker.

use std::{fmt, str::FromStr};

use crate::{Error, Result};

/// The kind of named entity a relationship endpoint can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Character,
  Organization,
  Location,
}

impl EntityKind {
  pub const ALL: [EntityKind; 3] = [
    EntityKind::Character,
    EntityKind::Organization,
    EntityKind::Location,
  ];

  /// The tag stored in `subject_type` / `object_type`.
  pub fn tag(self) -> &'static str {
    match self {
      EntityKind::Character => "character",
      EntityKind::Organization => "organization",
      EntityKind::Location => "location",
    }
  }

  /// The table an id of this kind is resolved against.
  pub fn table(self) -> &'static str {
    match self {
      EntityKind::Character => "characters",
      EntityKind::Organization => "organizations",
      EntityKind::Location => "locations",
    }
  }

  /// Tag lookup that does not allocate an error; tags are case-sensitive.
  pub fn from_tag(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.tag() == tag)
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl FromStr for EntityKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::from_tag(s).ok_or_else(|| Error::UnknownEntityType(s.to_owned()))
  }
}

/// Which side of a directed relationship an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Subject,
  Object,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Subject => "subject",
      Role::Object => "object",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One end of a relationship as stored: the raw type tag, the id, and the
/// denormalised display name.
///
/// Tag and id are kept as text because rows with an unrecognised tag or a
/// non-numeric id must still be representable (they are flagged, not
/// rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  pub type_tag: String,
  pub id:       String,
  pub name:     Option<String>,
}

impl Endpoint {
  /// Composite node key, `{type}_{id}`.
  pub fn key(&self) -> String { format!("{}_{}", self.type_tag, self.id) }

  /// The parsed kind; fails on a tag outside the entity vocabulary.
  pub fn kind(&self) -> Result<EntityKind> { self.type_tag.parse() }
}

/// A row of the `relationships` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
  pub id:        i64,
  pub subject:   Endpoint,
  pub predicate: String,
  pub object:    Endpoint,
  pub book_id:   i64,
}
