//! Projection of relationship rows onto a node/edge graph.

use std::collections::HashSet;

use narrative_core::entity::{EntityKind, Endpoint, Relationship};

/// An RGB triple for the `viz:color` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

pub const DEFAULT_COLOR: Rgb = Rgb {
  r: 149,
  g: 165,
  b: 166,
};

/// Display color for an entity type tag; unknown tags get [`DEFAULT_COLOR`].
pub fn color_for(type_tag: &str) -> Rgb {
  match EntityKind::from_tag(type_tag) {
    Some(EntityKind::Character) => Rgb { r: 231, g: 76, b: 60 },
    Some(EntityKind::Organization) => Rgb { r: 46, g: 134, b: 193 },
    Some(EntityKind::Location) => Rgb { r: 39, g: 174, b: 96 },
    None => DEFAULT_COLOR,
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
  /// `{type}_{id}`.
  pub id:          String,
  pub label:       String,
  pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
  pub id:      usize,
  pub source:  String,
  pub target:  String,
  pub label:   String,
  pub book_id: i64,
}

/// A directed graph with nodes in first-seen order and one edge per
/// relationship row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
}

impl Graph {
  pub fn from_relationships(rows: &[Relationship]) -> Self {
    let mut nodes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut intern = |ep: &Endpoint| -> String {
      let key = ep.key();
      if seen.insert(key.clone()) {
        nodes.push(Node {
          id:          key.clone(),
          label:       ep
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| key.clone()),
          entity_type: ep.type_tag.clone(),
        });
      }
      key
    };

    let mut edges = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
      let source = intern(&row.subject);
      let target = intern(&row.object);
      edges.push(Edge {
        id: i,
        source,
        target,
        label: row.predicate.clone(),
        book_id: row.book_id,
      });
    }

    Self { nodes, edges }
  }
}
