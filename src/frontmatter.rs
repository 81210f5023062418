//! Front-matter handling: split, parse, and canonical serialization.
//!
//! Parsing is delegated wholesale to `serde_yaml`; the YAML dialect is a
//! black box here. Writing is NOT delegated: Hugo is pickier than YAML about
//! shapes (`categories: ["a", "b"]` inline, `draft: false` bare, everything
//! else quoted), so [`FrontMatter::to_block`] renders the header itself,
//! one key per line, in insertion order.
//!
//! `serde_yaml::Mapping` preserves key insertion order, which is exactly the
//! field-order guarantee the serializer documents.

use serde_yaml::{Mapping, Value};

/// Delimiter framing a front-matter block.
const DELIMITER: &str = "---";

/// A document's structured header.
///
/// Wraps an ordered YAML mapping. Existing keys keep the order they had in
/// the source file; synthesized keys append in derivation order.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    map: Mapping,
}

/// Split raw document text into its front-matter source and body.
///
/// Mirrors the two-delimiter scan: a document that starts with `---` and
/// contains a second `---` yields `(Some(header_text), body)`. Anything
/// else (no header, or an unterminated one) yields `(None, original_text)`
/// untouched. Later `---` occurrences (horizontal rules) stay in the body.
pub fn split(content: &str) -> (Option<&str>, &str) {
    if !content.starts_with(DELIMITER) {
        return (None, content);
    }
    let mut parts = content.splitn(3, DELIMITER);
    let _leading = parts.next();
    match (parts.next(), parts.next()) {
        (Some(header), Some(body)) => (Some(header), body),
        _ => (None, content),
    }
}

impl FrontMatter {
    /// An empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw front-matter text via the YAML black box.
    ///
    /// An empty or null header is a valid, empty mapping. A header that
    /// parses to anything other than a mapping is an error.
    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        let map: Option<Mapping> = serde_yaml::from_str(raw)?;
        Ok(Self {
            map: map.unwrap_or_default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(&Value::String(key.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(&Value::String(key.to_string()))
    }

    /// Insert a value, appending the key if new.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.map.insert(Value::String(key.to_string()), value);
    }

    /// Insert a string value.
    pub fn insert_str(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Value::String(value.into()));
    }

    /// Insert a list-of-strings value.
    pub fn insert_list(&mut self, key: &str, items: impl IntoIterator<Item = String>) {
        self.insert(
            key,
            Value::Sequence(items.into_iter().map(Value::String).collect()),
        );
    }

    /// Render the canonical delimited header block, trailing blank line
    /// included, ready to prepend to the body.
    pub fn to_block(&self) -> String {
        let mut out = String::with_capacity(64 + self.map.len() * 32);
        out.push_str(DELIMITER);
        out.push('\n');
        for (key, value) in &self.map {
            out.push_str(&render_key(key));
            out.push_str(": ");
            out.push_str(&render_value(value));
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out
    }
}

fn render_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => json_inline(other),
    }
}

/// Render a top-level value: lists inline, booleans bare, everything else
/// (numbers included) a quoted string.
fn render_value(value: &Value) -> String {
    match value {
        Value::Sequence(items) => {
            let rendered: Vec<String> = items.iter().map(render_list_item).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Bool(b) => b.to_string(),
        Value::String(s) => quote(s),
        Value::Number(n) => quote(&n.to_string()),
        Value::Null => quote(""),
        other => json_inline(other),
    }
}

/// List items: strings quoted, non-strings as bare literals.
fn render_list_item(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => quote(""),
        other => json_inline(other),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Out-of-model shapes (nested mappings etc.) round-trip as inline JSON,
/// which is itself valid YAML flow syntax.
fn json_inline(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| quote(""))
}
