//! GEXF export of the relationship graph for Gephi.
//!
//! Pure projection: takes relationship rows already read from the store,
//! derives a deduplicated node set, and writes a GEXF 1.3 document with the
//! `viz` extension. No database dependency.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use narrative_gexf::{GexfMeta, Graph, write_file};
//!
//! let graph = Graph::from_relationships(&[]);
//! write_file(&graph, &GexfMeta::default(), Path::new("out/graph.gexf")).unwrap();
//! ```

pub mod error;
mod graph;
mod serialize;

use std::{fs::File, io::BufWriter, io::Write as _, path::Path};

pub use error::{Error, Result};
pub use graph::{DEFAULT_COLOR, Edge, Graph, Node, Rgb, color_for};
pub use serialize::{GexfMeta, NS_GEXF, NS_VIZ, to_string, write_gexf};

/// Write `graph` to `path`, creating parent directories as needed.
pub fn write_file(graph: &Graph, meta: &GexfMeta, path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).map_err(|source| Error::Create {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let file = File::create(path).map_err(|source| Error::Create {
    path: path.to_path_buf(),
    source,
  })?;
  let mut out = BufWriter::new(file);
  write_gexf(graph, meta, &mut out)?;
  out.flush()?;

  tracing::info!(
    nodes = graph.nodes.len(),
    edges = graph.edges.len(),
    path = %path.display(),
    "exported graph"
  );
  Ok(())
}
