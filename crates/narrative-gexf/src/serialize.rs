//! GEXF 1.3 writer.
//!
//! Uses `quick-xml`'s event writer with two-space indentation. Attribute
//! values and text are escaped by the writer.

use std::io::Write;

use chrono::NaiveDate;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
  Result,
  graph::{Graph, color_for},
};

// ─── Namespaces
// ───────────────────────────────────────────────────────────────

pub const NS_GEXF: &str = "http://www.gexf.net/1.3";
pub const NS_VIZ: &str = "http://www.gexf.net/1.3/viz";
pub const GEXF_VERSION: &str = "1.3";

/// Node attribute column `0`.
const NODE_ATTR_ENTITY_TYPE: &str = "0";
/// Edge attribute column `0`.
const EDGE_ATTR_BOOK_ID: &str = "0";

/// Contents of the `<meta>` block.
#[derive(Debug, Clone)]
pub struct GexfMeta {
  pub creator:       String,
  pub description:   String,
  pub last_modified: Option<NaiveDate>,
}

impl Default for GexfMeta {
  fn default() -> Self {
    Self {
      creator:       "narrative-db".to_owned(),
      description:   "Narrative corpus knowledge graph".to_owned(),
      last_modified: Some(chrono::Local::now().date_naive()),
    }
  }
}

/// Serialize `graph` as a complete GEXF document into `out`.
pub fn write_gexf<W: Write>(graph: &Graph, meta: &GexfMeta, out: W) -> Result<()> {
  let mut w = Writer::new_with_indent(out, b' ', 2);

  w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let mut root = BytesStart::new("gexf");
  root.push_attribute(("xmlns", NS_GEXF));
  root.push_attribute(("xmlns:viz", NS_VIZ));
  root.push_attribute(("version", GEXF_VERSION));
  w.write_event(Event::Start(root))?;

  write_meta(&mut w, meta)?;

  let mut el = BytesStart::new("graph");
  el.push_attribute(("defaultedgetype", "directed"));
  el.push_attribute(("mode", "static"));
  w.write_event(Event::Start(el))?;

  write_attribute_decl(&mut w, "node", NODE_ATTR_ENTITY_TYPE, "entity_type", "string")?;
  write_attribute_decl(&mut w, "edge", EDGE_ATTR_BOOK_ID, "book_id", "integer")?;

  start(&mut w, "nodes")?;
  for node in &graph.nodes {
    let mut el = BytesStart::new("node");
    el.push_attribute(("id", node.id.as_str()));
    el.push_attribute(("label", node.label.as_str()));
    w.write_event(Event::Start(el))?;

    write_attvalue(&mut w, NODE_ATTR_ENTITY_TYPE, &node.entity_type)?;

    let color = color_for(&node.entity_type);
    let (r, g, b) = (color.r.to_string(), color.g.to_string(), color.b.to_string());
    empty(&mut w, "viz:color", &[
      ("r", r.as_str()),
      ("g", g.as_str()),
      ("b", b.as_str()),
    ])?;

    end(&mut w, "node")?;
  }
  end(&mut w, "nodes")?;

  start(&mut w, "edges")?;
  for edge in &graph.edges {
    let id = edge.id.to_string();
    let mut el = BytesStart::new("edge");
    el.push_attribute(("id", id.as_str()));
    el.push_attribute(("source", edge.source.as_str()));
    el.push_attribute(("target", edge.target.as_str()));
    el.push_attribute(("label", edge.label.as_str()));
    w.write_event(Event::Start(el))?;

    write_attvalue(&mut w, EDGE_ATTR_BOOK_ID, &edge.book_id.to_string())?;

    end(&mut w, "edge")?;
  }
  end(&mut w, "edges")?;

  end(&mut w, "graph")?;
  end(&mut w, "gexf")?;
  w.get_mut().write_all(b"\n")?;
  Ok(())
}

/// Serialize to an in-memory string.
pub fn to_string(graph: &Graph, meta: &GexfMeta) -> Result<String> {
  let mut buf = Vec::new();
  write_gexf(graph, meta, &mut buf)?;
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ─── Sections ────────────────────────────────────────────────────────────────

fn write_meta<W: Write>(w: &mut Writer<W>, meta: &GexfMeta) -> Result<()> {
  let mut el = BytesStart::new("meta");
  let date = meta.last_modified.map(|d| d.format("%Y-%m-%d").to_string());
  if let Some(date) = &date {
    el.push_attribute(("lastmodifieddate", date.as_str()));
  }
  w.write_event(Event::Start(el))?;
  text_elem(w, "creator", &meta.creator)?;
  text_elem(w, "description", &meta.description)?;
  end(w, "meta")
}

fn write_attribute_decl<W: Write>(
  w: &mut Writer<W>,
  class: &str,
  id: &str,
  title: &str,
  kind: &str,
) -> Result<()> {
  let mut el = BytesStart::new("attributes");
  el.push_attribute(("class", class));
  w.write_event(Event::Start(el))?;
  empty(w, "attribute", &[("id", id), ("title", title), ("type", kind)])?;
  end(w, "attributes")
}

fn write_attvalue<W: Write>(w: &mut Writer<W>, attr: &str, value: &str) -> Result<()> {
  start(w, "attvalues")?;
  empty(w, "attvalue", &[("for", attr), ("value", value)])?;
  end(w, "attvalues")
}

// ─── XML writer helpers
// ───────────────────────────────────────────────────────

fn start<W: Write>(w: &mut Writer<W>, tag: &str) -> Result<()> {
  w.write_event(Event::Start(BytesStart::new(tag)))?;
  Ok(())
}

fn end<W: Write>(w: &mut Writer<W>, tag: &str) -> Result<()> {
  w.write_event(Event::End(BytesEnd::new(tag)))?;
  Ok(())
}

fn text_elem<W: Write>(w: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
  start(w, tag)?;
  w.write_event(Event::Text(BytesText::new(text)))?;
  end(w, tag)
}

fn empty<W: Write>(w: &mut Writer<W>, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  w.write_event(Event::Empty(el))?;
  Ok(())
}
