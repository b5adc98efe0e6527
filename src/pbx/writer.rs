//! Serializes the model back to the exact shape Xcode writes:
//!
//! - tab indentation, one entry per line, "isa" first in every object body
//! - the "objects" dictionary grouped into /* Begin X section */ runs,
//!   sections ordered alphabetically by isa
//! - PBXBuildFile and PBXFileReference objects on a single line
//! - strings quoted only when they contain characters outside the safe set
//!
//! Writing the result of a parse reproduces the input byte for byte, so a
//! run that changes nothing leaves no diff behind.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::pbx::{Dict, Entry, Str, Value};

const HEADER: &str = "// !$*UTF8*$!\n";

pub fn to_text(root: &Dict) -> String {
  let mut out = String::new();
  out.push_str(HEADER);
  out.push_str("{\n");
  for entry in ordered(root) {
    match entry.key.text == "objects" {
      true  => write_objects(&mut out, entry),
      false => write_entry(&mut out, entry, 1)
    }
  }
  out.push_str("}\n");
  out
}

fn write_objects(out: &mut String, entry: &Entry) {
  let objects = match &entry.value {
    Value::Dict(d) => d,
    _              => return write_entry(out, entry, 1)
  };
  out.push_str("\tobjects = {\n");

  let mut sections: BTreeMap<&str, Vec<&Entry>> = BTreeMap::new();
  for object in objects.iter() {
    let isa = object.value.as_dict().and_then(|d| d.get_str("isa")).unwrap_or("");
    sections.entry(isa).or_default().push(object);
  }

  for (isa, objects) in &sections {
    if !isa.is_empty() {
      out.push_str(&format!("\n/* Begin {} section */\n", isa));
    }
    for object in objects {
      write_object(out, object, isa);
    }
    if !isa.is_empty() {
      out.push_str(&format!("/* End {} section */\n", isa));
    }
  }
  out.push_str("\t};\n");
}

fn write_object(out: &mut String, entry: &Entry, isa: &str) {
  out.push_str("\t\t");
  out.push_str(&str_text(&entry.key));
  out.push_str(" = ");
  match &entry.value {
    Value::Dict(d) if single_line(isa) => write_dict_inline(out, d),
    value => write_value(out, value, 2)
  }
  out.push_str(";\n");
}

fn write_entry(out: &mut String, entry: &Entry, depth: usize) {
  push_tabs(out, depth);
  out.push_str(&str_text(&entry.key));
  out.push_str(" = ");
  write_value(out, &entry.value, depth);
  out.push_str(";\n");
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
  match value {
    Value::Str(s)   => out.push_str(&str_text(s)),
    Value::Array(a) => {
      out.push_str("(\n");
      for element in a {
        push_tabs(out, depth + 1);
        write_value(out, element, depth + 1);
        out.push_str(",\n");
      }
      push_tabs(out, depth);
      out.push(')');
    }
    Value::Dict(d) => {
      out.push_str("{\n");
      for entry in ordered(d) {
        write_entry(out, entry, depth + 1);
      }
      push_tabs(out, depth);
      out.push('}');
    }
  }
}

fn write_dict_inline(out: &mut String, dict: &Dict) {
  out.push('{');
  for entry in ordered(dict) {
    out.push_str(&str_text(&entry.key));
    out.push_str(" = ");
    write_value_inline(out, &entry.value);
    out.push_str("; ");
  }
  out.push('}');
}

fn write_value_inline(out: &mut String, value: &Value) {
  match value {
    Value::Str(s)   => out.push_str(&str_text(s)),
    Value::Array(a) => {
      out.push('(');
      for element in a {
        write_value_inline(out, element);
        out.push_str(", ");
      }
      out.push(')');
    }
    Value::Dict(d) => write_dict_inline(out, d)
  }
}

fn ordered(dict: &Dict) -> impl Iterator<Item = &Entry> {
  let isa  = dict.iter().filter(|e| e.key.text == "isa");
  let rest = dict.iter().filter(|e| e.key.text != "isa");
  isa.chain(rest)
}

/// Xcode keeps these object types on one line each.
fn single_line(isa: &str) -> bool {
  matches!(isa, "PBXBuildFile" | "PBXFileReference")
}

fn str_text(s: &Str) -> String {
  match &s.comment {
    Some(comment) => format!("{} /* {} */", quote(&s.text), comment),
    None          => quote(&s.text).into_owned()
  }
}

fn quote(text: &str) -> Cow<str> {
  let safe = !text.is_empty() && text.chars().all(is_safe_char);
  if safe {
    return Cow::Borrowed(text);
  }
  let mut quoted = String::with_capacity(text.len() + 2);
  quoted.push('"');
  for c in text.chars() {
    match c {
      '"'  => quoted.push_str("\\\""),
      '\\' => quoted.push_str("\\\\"),
      '\n' => quoted.push_str("\\n"),
      '\t' => quoted.push_str("\\t"),
      '\r' => quoted.push_str("\\r"),
      _    => quoted.push(c)
    }
  }
  quoted.push('"');
  Cow::Owned(quoted)
}

fn is_safe_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '/')
}

fn push_tabs(out: &mut String, depth: usize) {
  for _ in 0..depth {
    out.push('\t');
  }
}
