//! Cell coercion: raw CSV text → a value ready for storage.
//!
//! Cells without a registered transform go through [`coerce_scalar`]:
//! empty → NULL, `true`/`false` (any case) → 1/0, everything else kept as
//! text. Numeric-looking text is left to the column's type affinity.

use std::sync::LazyLock;

use regex::Regex;

/// A storable cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
  Null,
  Integer(i64),
  Text(String),
}

/// A named, pure per-column transform.
///
/// Transforms receive the raw cell text, never the coerced scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTransform {
  /// `['Oxana' 'Maria']` → `["Oxana", "Maria"]`.
  AliasList,
}

impl ColumnTransform {
  pub fn apply(self, raw: &str) -> CellValue {
    match self {
      ColumnTransform::AliasList => CellValue::Text(aliases_to_json(raw)),
    }
  }
}

/// Coerce one cell, dispatching to `transform` when one is registered.
pub fn coerce(raw: &str, transform: Option<ColumnTransform>) -> CellValue {
  match transform {
    Some(t) => t.apply(raw),
    None => coerce_scalar(raw),
  }
}

/// Default coercion for cells without a transform.
pub fn coerce_scalar(raw: &str) -> CellValue {
  if raw.is_empty() {
    CellValue::Null
  } else if raw.eq_ignore_ascii_case("true") {
    CellValue::Integer(1)
  } else if raw.eq_ignore_ascii_case("false") {
    CellValue::Integer(0)
  } else {
    CellValue::Text(raw.to_owned())
  }
}

static QUOTED_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"'([^']+)'").expect("static regex"));

/// Convert a bracketed list of single-quoted tokens into a JSON array.
///
/// Never fails: input without any quoted token (blank included) yields
/// `[]`. Elements are separated by `", "` and non-ASCII text is kept
/// verbatim.
pub fn aliases_to_json(raw: &str) -> String {
  let items: Vec<String> = QUOTED_TOKEN
    .captures_iter(raw)
    .map(|c| serde_json::Value::String(c[1].to_owned()).to_string())
    .collect();
  format!("[{}]", items.join(", "))
}
