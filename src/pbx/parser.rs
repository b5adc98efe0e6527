//! Recursive descent over the token stream. The grammar is tiny:
//!
//! ```text
//! document = dict EOF
//! value    = string | '(' (value ',')* value? ')' | '{' (string '=' value ';')* '}'
//! ```
//!
//! Entry order inside dictionaries is preserved so a patched descriptor
//! diffs cleanly against what Xcode wrote.

use crate::pbx::lexer::{Lexer, Token};
use crate::pbx::{Dict, ParseError, Value};

pub fn parse(src: &str) -> Result<Dict, ParseError> {
  Parser { lexer: Lexer::new(src) }.document()
}

struct Parser {
  lexer: Lexer
}

impl Parser {
  fn document(&mut self) -> Result<Dict, ParseError> {
    let root = match self.lexer.next()? {
      Token::LBrace => self.dict()?,
      token         => return Err(self.unexpected(&token, "expected '{' at the top level"))
    };
    match self.lexer.next()? {
      Token::Eof => Ok(root),
      token      => Err(self.unexpected(&token, "expected end of file"))
    }
  }

  /// Entries until the matching '}'. The opening brace is already consumed.
  fn dict(&mut self) -> Result<Dict, ParseError> {
    let mut dict = Dict::new();
    loop {
      let key = match self.lexer.next()? {
        Token::RBrace => return Ok(dict),
        Token::Str(s) => s,
        token         => return Err(self.unexpected(&token, "expected a key or '}'"))
      };
      match self.lexer.next()? {
        Token::Equals => {}
        token         => return Err(self.unexpected(&token, "expected '=' after key"))
      }
      let value = self.value()?;
      match self.lexer.next()? {
        Token::Semi => {}
        token       => return Err(self.unexpected(&token, "expected ';' after value"))
      }
      dict.push(key, value);
    }
  }

  fn value(&mut self) -> Result<Value, ParseError> {
    match self.lexer.next()? {
      Token::Str(s) => Ok(Value::Str(s)),
      Token::LBrace => Ok(Value::Dict(self.dict()?)),
      Token::LParen => Ok(Value::Array(self.array()?)),
      token         => Err(self.unexpected(&token, "expected a value"))
    }
  }

  /// Elements until the matching ')'. Xcode writes a comma after every
  /// element including the last, but a bare final element is accepted too.
  fn array(&mut self) -> Result<Vec<Value>, ParseError> {
    let mut values = Vec::new();
    loop {
      match self.lexer.next()? {
        Token::RParen => return Ok(values),
        Token::Str(s) => values.push(Value::Str(s)),
        Token::LBrace => values.push(Value::Dict(self.dict()?)),
        Token::LParen => values.push(Value::Array(self.array()?)),
        token         => return Err(self.unexpected(&token, "expected an element or ')'"))
      }
      match self.lexer.next()? {
        Token::Comma  => {}
        Token::RParen => return Ok(values),
        token         => return Err(self.unexpected(&token, "expected ',' or ')'"))
      }
    }
  }

  fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
    ParseError::new(
      self.lexer.token_line,
      self.lexer.token_column,
      format!("{}, found {}", expected, describe(token))
    )
  }
}

fn describe(token: &Token) -> String {
  match token {
    Token::Str(s) => format!("'{}'", s.text),
    Token::LBrace => "'{'".to_string(),
    Token::RBrace => "'}'".to_string(),
    Token::LParen => "'('".to_string(),
    Token::RParen => "')'".to_string(),
    Token::Equals => "'='".to_string(),
    Token::Semi   => "';'".to_string(),
    Token::Comma  => "','".to_string(),
    Token::Eof    => "end of file".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pbx::sample;

  #[test]
  fn empty_document() {
    let root = parse("// !$*UTF8*$!\n{\n}\n").unwrap();
    assert!(root.is_empty());
  }

  #[test]
  fn nested_values_and_entry_order() {
    let root = parse("{b = (1, {c = d;}, ()); a = 2;}").unwrap();
    assert_eq!(root.entries[0].key.text, "b");
    assert_eq!(root.entries[1].key.text, "a");

    let b = root.get_array("b").unwrap();
    assert_eq!(b.len(), 3);
    assert_eq!(b[0].as_str(), Some("1"));
    assert_eq!(b[1].as_dict().unwrap().get_str("c"), Some("d"));
    assert_eq!(b[2].as_array().unwrap().len(), 0);
  }

  #[test]
  fn final_array_element_without_comma() {
    let root = parse("{a = (1, 2);}").unwrap();
    assert_eq!(root.get_array("a").unwrap().len(), 2);
  }

  #[test]
  fn full_descriptor_keeps_annotations() {
    let root    = parse(sample::MINIMAL).unwrap();
    let objects = root.get_dict("objects").unwrap();
    assert_eq!(objects.len(), 5);

    let target = objects.iter()
      .find(|e| e.key.text == "860D00010000000000000002")
      .unwrap();
    assert_eq!(target.key.comment.as_deref(), Some("Runner"));
    assert_eq!(target.value.as_dict().unwrap().get_str("isa"), Some("PBXNativeTarget"));

    let root_object = root.get("rootObject").unwrap();
    match root_object {
      Value::Str(s) => assert_eq!(s.comment.as_deref(), Some("Project object")),
      _             => panic!("rootObject should be a string")
    }
  }

  #[test]
  fn missing_semicolon_reports_position() {
    let err = parse("{\n\tname = Runner\n}").unwrap_err();
    assert_eq!((err.line, err.column), (3, 1));
    assert!(err.message.contains("expected ';'"));
  }

  #[test]
  fn top_level_must_be_a_dict() {
    let err = parse("(1, 2)").unwrap_err();
    assert!(err.message.contains("top level"));
  }

  #[test]
  fn trailing_garbage_is_rejected() {
    let err = parse("{\n}\nleftover").unwrap_err();
    assert!(err.message.contains("expected end of file"));
  }

  #[test]
  fn truncated_document_is_rejected() {
    let err = parse("{a = {b = c;").unwrap_err();
    assert!(err.message.contains("found end of file"));
  }
}
