//! Object model for Xcode project descriptors.
//!
//! Xcode stores the entire project in a single file named "project.pbxproj"
//! inside the *.xcodeproj folder, using the NeXTSTEP property list format:
//!
//! - String:     contents, or "quoted contents"
//! - Array:      ( element, ... )
//! - Dictionary: { key = value; ... }
//!
//! Comments of the form /* contents */ are optional; Xcode loads a project
//! just fine without them but always writes them back, so they are kept in
//! the model (attached to the string they follow) to limit churn when a
//! patched file is later edited from Xcode.
//!
//! The root element is a dictionary whose "objects" entry holds every object
//! of the project keyed by a unique 96-bit hexadecimal identifier. Each
//! object carries an "isa" property naming its type; on disk the objects are
//! grouped by type between /* Begin <ISA> section */ and /* End <ISA>
//! section */ markers. Ordering is irrelevant to Xcode itself.
//!
//! References:
//! - https://en.wikipedia.org/wiki/Property_list
//! - http://monoobjc.net/xcode-project-file-format.html

mod lexer;
mod parser;
mod project;
mod writer;

pub use parser::parse;
pub use project::Pbxproj;
pub use writer::to_text;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

/// A string literal plus the /* annotation */ that followed it, if any.
/// Dictionary keys use the same type, so object identifiers keep their
/// name comments across a round trip.
#[derive(Clone, Debug, PartialEq)]
pub struct Str {
  pub text:    String,
  pub comment: Option<String>
}

impl Str {
  pub fn plain<T: Into<String>>(text: T) -> Self {
    Str { text: text.into(), comment: None }
  }

  pub fn annotated<T: Into<String>, C: Into<String>>(text: T, comment: C) -> Self {
    Str { text: text.into(), comment: Some(comment.into()) }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Str(Str),
  Array(Vec<Value>),
  Dict(Dict)
}

impl Value {
  pub fn string<T: Into<String>>(text: T) -> Self {
    Value::Str(Str::plain(text))
  }

  pub fn annotated<T: Into<String>, C: Into<String>>(text: T, comment: C) -> Self {
    Value::Str(Str::annotated(text, comment))
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(&s.text),
      _             => None
    }
  }

  pub fn as_array(&self) -> Option<&Vec<Value>> {
    match self {
      Value::Array(a) => Some(a),
      _               => None
    }
  }

  pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
    match self {
      Value::Array(a) => Some(a),
      _               => None
    }
  }

  pub fn as_dict(&self) -> Option<&Dict> {
    match self {
      Value::Dict(d) => Some(d),
      _              => None
    }
  }

  pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
    match self {
      Value::Dict(d) => Some(d),
      _              => None
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
  pub key:   Str,
  pub value: Value
}

/// Insertion-ordered dictionary. Lookup is linear; descriptor dictionaries
/// are small except for "objects", which is only ever scanned in full.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dict {
  pub entries: Vec<Entry>
}

impl Dict {
  pub fn new() -> Self {
    Dict { entries: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
    self.entries.iter()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.entries.iter().any(|e| e.key.text == key)
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.entries.iter().find(|e| e.key.text == key).map(|e| &e.value)
  }

  pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
    self.entries.iter_mut().find(|e| e.key.text == key).map(|e| &mut e.value)
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.get(key).and_then(Value::as_str)
  }

  pub fn get_dict(&self, key: &str) -> Option<&Dict> {
    self.get(key).and_then(Value::as_dict)
  }

  pub fn get_dict_mut(&mut self, key: &str) -> Option<&mut Dict> {
    self.get_mut(key).and_then(Value::as_dict_mut)
  }

  pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
    self.get(key).and_then(Value::as_array)
  }

  pub fn get_array_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
    self.get_mut(key).and_then(Value::as_array_mut)
  }

  /// Appends an entry as-is. Used by the parser and by object builders that
  /// lay out keys in a known order.
  pub fn push(&mut self, key: Str, value: Value) {
    self.entries.push(Entry { key, value });
  }

  /// Overwrites the value of an existing key in place, or inserts a new key
  /// at its sorted position. "isa" stays pinned first, matching how Xcode
  /// orders object bodies.
  pub fn set<T: Into<String>>(&mut self, key: &str, text: T) {
    self.set_value(key, Value::string(text));
  }

  pub fn set_value(&mut self, key: &str, value: Value) {
    if let Some(slot) = self.get_mut(key) {
      *slot = value;
      return;
    }
    let at = self.entries.iter()
      .position(|e| e.key.text != "isa" && e.key.text.as_str() > key)
      .unwrap_or_else(|| self.entries.len());
    self.entries.insert(at, Entry { key: Str::plain(key), value });
  }
}

/// Parse failure with the 1-based source position where it happened.
#[derive(Debug)]
pub struct ParseError {
  pub line:    usize,
  pub column:  usize,
  pub message: String
}

impl ParseError {
  pub fn new<M: Into<String>>(line: usize, column: usize, message: M) -> Self {
    ParseError { line, column, message: message.into() }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
  }
}

impl std::error::Error for ParseError {}

static NEXT_ID_PREFIX: AtomicU32 = AtomicU32::new(0);

/// Fresh 96-bit object identifier as 24 uppercase hex characters. A counter
/// in the leading bytes keeps identifiers from one run collision-free and
/// keeps newly emitted objects in generation order.
pub fn new_id() -> String {
  use rand::RngCore;
  let mut bytes = [0u8; 12];
  rand::thread_rng().fill_bytes(&mut bytes[4..]);

  let prefix = NEXT_ID_PREFIX.fetch_add(1, Ordering::Relaxed);
  bytes[0] =  (prefix >> 24)         as u8;
  bytes[1] = ((prefix >> 16) & 0xFF) as u8;
  bytes[2] = ((prefix >> 8)  & 0xFF) as u8;
  bytes[3] =  (prefix        & 0xFF) as u8;

  let mut id = String::with_capacity(24);
  for b in &bytes {
    id.push(hex_char(b >> 4));
    id.push(hex_char(b & 0xF));
  }
  id
}

fn hex_char(b: u8) -> char {
  match b < 10 {
    true  => (b'0' + b)        as char,
    false => (b'A' + (b - 10)) as char
  }
}

/// Lists every project descriptor under `dir`. Only used to improve the
/// error message when the expected descriptor is missing.
pub fn discover_projects(dir: &Path) -> Vec<PathBuf> {
  let pattern = match dir.join("*.xcodeproj").join("project.pbxproj").to_str() {
    None    => return Vec::new(),
    Some(p) => p.to_string()
  };
  match glob::glob(&pattern) {
    Err(_)    => Vec::new(),
    Ok(paths) => paths.flatten().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn ids_are_24_uppercase_hex_chars() {
    let id = new_id();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(id.chars().all(|c| !c.is_ascii_lowercase()));
  }

  #[test]
  fn ids_never_collide_within_a_run() {
    let ids: HashSet<String> = (0..4096).map(|_| new_id()).collect();
    assert_eq!(ids.len(), 4096);
  }

  #[test]
  fn set_overwrites_in_place_and_inserts_sorted() {
    let mut d = Dict::new();
    d.push(Str::plain("isa"),  Value::string("XCBuildConfiguration"));
    d.push(Str::plain("name"), Value::string("Debug"));

    d.set("name", "Release");
    assert_eq!(d.get_str("name"), Some("Release"));
    assert_eq!(d.entries[1].key.text, "name");

    d.set_value("buildSettings", Value::Dict(Dict::new()));
    assert_eq!(d.entries[0].key.text, "isa");
    assert_eq!(d.entries[1].key.text, "buildSettings");
    assert_eq!(d.entries[2].key.text, "name");
  }

  #[test]
  fn set_keeps_existing_key_comment() {
    let mut d = Dict::new();
    d.push(Str::annotated("fileRef", "Runner.app"), Value::string("AA"));
    d.set("fileRef", "BB");
    assert_eq!(d.entries[0].key.comment.as_deref(), Some("Runner.app"));
    assert_eq!(d.get_str("fileRef"), Some("BB"));
  }
}
