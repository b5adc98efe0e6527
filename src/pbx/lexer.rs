//! Token stream over the NeXTSTEP property list grammar.
//!
//! Comments are handled here so the parser never sees them: `//` line
//! comments and free-standing `/* block */` comments (the section markers)
//! are trivia, while a block comment directly following a string on the
//! same line is attached to that string as its annotation.

use crate::pbx::{ParseError, Str};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
  Str(Str),
  LBrace,
  RBrace,
  LParen,
  RParen,
  Equals,
  Semi,
  Comma,
  Eof
}

pub struct Lexer {
  chars: Vec<char>,
  pos:   usize,
  line:  usize,
  col:   usize,
  /// Start of the token most recently returned by `next`.
  pub token_line:   usize,
  pub token_column: usize
}

impl Lexer {
  pub fn new(src: &str) -> Self {
    Lexer {
      chars: src.chars().collect(),
      pos:   0,
      line:  1,
      col:   1,
      token_line:   1,
      token_column: 1
    }
  }

  pub fn next(&mut self) -> Result<Token, ParseError> {
    self.skip_trivia()?;
    self.token_line   = self.line;
    self.token_column = self.col;

    let c = match self.peek() {
      None    => return Ok(Token::Eof),
      Some(c) => c
    };
    let token = match c {
      '{' => { self.bump(); Token::LBrace }
      '}' => { self.bump(); Token::RBrace }
      '(' => { self.bump(); Token::LParen }
      ')' => { self.bump(); Token::RParen }
      '=' => { self.bump(); Token::Equals }
      ';' => { self.bump(); Token::Semi }
      ',' => { self.bump(); Token::Comma }
      '"' => {
        let text = self.quoted()?;
        Token::Str(self.with_annotation(text)?)
      }
      c if is_word_char(c) => {
        let text = self.word();
        Token::Str(self.with_annotation(text)?)
      }
      c => return Err(self.error(format!("unexpected character '{}'", c)))
    };
    Ok(token)
  }

  fn peek(&self) -> Option<char> {
    self.chars.get(self.pos).copied()
  }

  fn peek_at(&self, ahead: usize) -> Option<char> {
    self.chars.get(self.pos + ahead).copied()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += 1;
    match c == '\n' {
      true  => {
        self.line += 1;
        self.col   = 1;
      }
      false => self.col += 1
    }
    Some(c)
  }

  fn error<M: Into<String>>(&self, message: M) -> ParseError {
    ParseError::new(self.line, self.col, message)
  }

  fn skip_trivia(&mut self) -> Result<(), ParseError> {
    loop {
      match self.peek() {
        Some(c) if c.is_whitespace() => {
          self.bump();
        }
        Some('/') if self.peek_at(1) == Some('/') => {
          while let Some(c) = self.bump() {
            if c == '\n' {
              break;
            }
          }
        }
        Some('/') if self.peek_at(1) == Some('*') => {
          self.block_comment()?;
        }
        _ => return Ok(())
      }
    }
  }

  /// Consumes `/* ... */` and returns the trimmed contents.
  fn block_comment(&mut self) -> Result<String, ParseError> {
    let (line, col) = (self.line, self.col);
    self.bump();
    self.bump();

    let mut text = String::new();
    loop {
      match self.peek() {
        None => return Err(ParseError::new(line, col, "unterminated comment")),
        Some('*') if self.peek_at(1) == Some('/') => {
          self.bump();
          self.bump();
          return Ok(text.trim().to_string());
        }
        Some(c) => {
          self.bump();
          text.push(c);
        }
      }
    }
  }

  fn quoted(&mut self) -> Result<String, ParseError> {
    let (line, col) = (self.line, self.col);
    self.bump();

    let mut text = String::new();
    loop {
      match self.bump() {
        None       => return Err(ParseError::new(line, col, "unterminated string")),
        Some('"')  => return Ok(text),
        Some('\\') => match self.bump() {
          None      => return Err(ParseError::new(line, col, "unterminated string")),
          Some('n') => text.push('\n'),
          Some('t') => text.push('\t'),
          Some('r') => text.push('\r'),
          Some(c)   => text.push(c)
        },
        Some(c) => text.push(c)
      }
    }
  }

  fn word(&mut self) -> String {
    let mut text = String::new();
    while let Some(c) = self.peek() {
      let comment = c == '/' && matches!(self.peek_at(1), Some('*') | Some('/'));
      if comment || !is_word_char(c) {
        break;
      }
      self.bump();
      text.push(c);
    }
    text
  }

  /// Attaches a block comment to the string it follows. Only spaces and
  /// tabs may separate the two; a comment on the next line is trivia.
  fn with_annotation(&mut self, text: String) -> Result<Str, ParseError> {
    let mut ahead = 0;
    while matches!(self.peek_at(ahead), Some(' ') | Some('\t')) {
      ahead += 1;
    }
    if self.peek_at(ahead) == Some('/') && self.peek_at(ahead + 1) == Some('*') {
      for _ in 0..ahead {
        self.bump();
      }
      let comment = self.block_comment()?;
      return Ok(Str::annotated(text, comment));
    }
    Ok(Str::plain(text))
  }
}

/// Characters Xcode accepts outside quotes. Deliberately wider than the set
/// the writer leaves unquoted.
fn is_word_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '@' | '-')
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lex(src: &str) -> Vec<Token> {
    let mut lexer  = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
      let token = lexer.next().unwrap();
      let done  = token == Token::Eof;
      tokens.push(token);
      if done {
        return tokens;
      }
    }
  }

  #[test]
  fn punctuation_and_words() {
    let tokens = lex("{ archiveVersion = 1; }");
    assert_eq!(tokens, vec![
      Token::LBrace,
      Token::Str(Str::plain("archiveVersion")),
      Token::Equals,
      Token::Str(Str::plain("1")),
      Token::Semi,
      Token::RBrace,
      Token::Eof
    ]);
  }

  #[test]
  fn header_line_comment_is_trivia() {
    let tokens = lex("// !$*UTF8*$!\n{ }");
    assert_eq!(tokens, vec![Token::LBrace, Token::RBrace, Token::Eof]);
  }

  #[test]
  fn annotation_attaches_to_preceding_string() {
    let tokens = lex("AA11 /* Runner.app */ = name;");
    assert_eq!(tokens[0], Token::Str(Str::annotated("AA11", "Runner.app")));
  }

  #[test]
  fn comment_on_next_line_is_trivia_not_annotation() {
    let tokens = lex("name = Products;\n/* End PBXGroup section */\n}");
    assert_eq!(tokens, vec![
      Token::Str(Str::plain("name")),
      Token::Equals,
      Token::Str(Str::plain("Products")),
      Token::Semi,
      Token::RBrace,
      Token::Eof
    ]);
  }

  #[test]
  fn quoted_strings_unescape() {
    let tokens = lex(r#""a\"b\\c\nd""#);
    assert_eq!(tokens[0], Token::Str(Str::plain("a\"b\\c\nd")));
  }

  #[test]
  fn words_span_paths_and_reverse_dns() {
    let tokens = lex("Runner/Info.plist com.drivesync.app $PROJECT_DIR");
    assert_eq!(tokens[0], Token::Str(Str::plain("Runner/Info.plist")));
    assert_eq!(tokens[1], Token::Str(Str::plain("com.drivesync.app")));
    assert_eq!(tokens[2], Token::Str(Str::plain("$PROJECT_DIR")));
  }

  #[test]
  fn word_stops_where_a_comment_starts() {
    let tokens = lex("Runner/* app */");
    assert_eq!(tokens[0], Token::Str(Str::annotated("Runner", "app")));
  }

  #[test]
  fn unterminated_string_reports_start_position() {
    let mut lexer = Lexer::new("{\n\tname = \"oops");
    lexer.next().unwrap();
    lexer.next().unwrap();
    lexer.next().unwrap();
    let err = lexer.next().unwrap_err();
    assert_eq!((err.line, err.column), (2, 9));
    assert!(err.message.contains("unterminated string"));
  }

  #[test]
  fn unterminated_comment_is_an_error() {
    let mut lexer = Lexer::new("/* never closed");
    let err = lexer.next().unwrap_err();
    assert!(err.message.contains("unterminated comment"));
  }

  #[test]
  fn unexpected_character_is_an_error() {
    let mut lexer = Lexer::new("&");
    let err = lexer.next().unwrap_err();
    assert!(err.message.contains("unexpected character"));
  }
}
