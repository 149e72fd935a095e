//! Line-oriented parser producing a [`ParsedModule`].
//!
//! The format is deliberately flat: every statement fits on one line except
//! `class` blocks (header plus an indented body) and multi-line docstrings.
//! The parser walks lines once; literal values on a line are scanned with a
//! byte cursor. Columns in errors are 1-indexed byte offsets.

use std::sync::Arc;

use lodestar_core::{intern, InternedString, Value};

use crate::error::ParseError;

// =============================================================================
// Parsed Representation
// =============================================================================

/// A parsed `.lode` module: an optional docstring and its statements, in
/// source order.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    /// Module docstring, when the first statement is a triple-quoted string.
    pub doc: Option<Arc<str>>,
    /// Top-level statements in source order.
    pub stmts: Vec<Stmt>,
}

/// A top-level statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `NAME = literal`
    Assign {
        name: InternedString,
        value: Value,
    },
    /// `class Name:` with class-level constant bindings (empty for `pass`).
    ClassDef {
        name: InternedString,
        members: Vec<(InternedString, Value)>,
    },
}

/// Parse `.lode` source into a [`ParsedModule`].
pub fn parse(source: &str) -> Result<ParsedModule, ParseError> {
    Parser::new(source).parse_module()
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    lines: Vec<&'a str>,
    /// Current line, 0-indexed.
    idx: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            idx: 0,
        }
    }

    #[inline]
    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.idx).copied()
    }

    #[inline]
    fn line_no(&self) -> usize {
        self.idx + 1
    }

    fn parse_module(mut self) -> Result<ParsedModule, ParseError> {
        let mut doc = None;
        let mut stmts = Vec::new();
        let mut first_stmt = true;

        while let Some(line) = self.current() {
            if is_blank_or_comment(line) {
                self.idx += 1;
                continue;
            }

            let indent = indent_of(line);
            if indent > 0 {
                return Err(ParseError::new("unexpected indent", self.line_no(), indent + 1));
            }

            if line.starts_with("\"\"\"") || line.starts_with("'''") {
                if first_stmt {
                    doc = Some(self.parse_docstring()?);
                    first_stmt = false;
                    continue;
                }
                return Err(ParseError::new(
                    "docstring is only allowed as the first statement",
                    self.line_no(),
                    1,
                ));
            }
            first_stmt = false;

            if let Some(class_start) = class_keyword(line) {
                let stmt = self.parse_class(class_start)?;
                stmts.push(stmt);
            } else {
                let (name, value) = parse_assignment(line, self.line_no(), 0)?;
                stmts.push(Stmt::Assign { name, value });
                self.idx += 1;
            }
        }

        Ok(ParsedModule { doc, stmts })
    }

    /// Parse a docstring starting at the current line.
    ///
    /// Handles both `"""one line"""` and multi-line forms; the closing
    /// delimiter must be the last code on its line.
    fn parse_docstring(&mut self) -> Result<Arc<str>, ParseError> {
        let opening_line_no = self.line_no();
        let line = self.current().unwrap_or_default();
        let delim = &line[..3];
        let after_open = &line[3..];

        // Single-line docstring.
        if let Some(end) = after_open.find(delim) {
            let trailing = after_open[end + 3..].trim_start();
            if !(trailing.is_empty() || trailing.starts_with('#')) {
                return Err(ParseError::new(
                    "unexpected characters after docstring",
                    opening_line_no,
                    3 + end + 3 + 1,
                ));
            }
            self.idx += 1;
            return Ok(Arc::from(after_open[..end].trim()));
        }

        // Multi-line: accumulate until a line containing the delimiter.
        let mut parts: Vec<&str> = vec![after_open];
        self.idx += 1;
        while let Some(line) = self.current() {
            if let Some(end) = line.find(delim) {
                let trailing = line[end + 3..].trim_start();
                if !(trailing.is_empty() || trailing.starts_with('#')) {
                    return Err(ParseError::new(
                        "unexpected characters after docstring",
                        self.line_no(),
                        end + 3 + 1,
                    ));
                }
                parts.push(&line[..end]);
                self.idx += 1;
                let joined = parts.join("\n");
                return Ok(Arc::from(joined.trim()));
            }
            parts.push(line);
            self.idx += 1;
        }

        Err(ParseError::new("unterminated docstring", opening_line_no, 1))
    }

    /// Parse a `class Name:` header (cursor positioned after the keyword)
    /// and its indented body.
    fn parse_class(&mut self, header_start: usize) -> Result<Stmt, ParseError> {
        let header_line_no = self.line_no();
        let line = self.current().unwrap_or_default();

        let mut scanner = Scanner::new(line, header_line_no, header_start);
        scanner.skip_ws();
        let name = scanner.parse_identifier("expected a class name")?;
        scanner.skip_ws();
        scanner.expect(b':', "expected ':' after class name")?;
        scanner.expect_end("unexpected characters after class header")?;
        let name = intern(name);
        self.idx += 1;

        let mut members = Vec::new();
        let mut saw_body = false;
        while let Some(line) = self.current() {
            if is_blank_or_comment(line) {
                self.idx += 1;
                continue;
            }
            let indent = indent_of(line);
            if indent == 0 {
                break;
            }
            saw_body = true;

            let body = &line[indent..];
            if let Some(rest) = keyword(body, "pass") {
                let mut scanner = Scanner::new(line, self.line_no(), indent + rest);
                scanner.expect_end("unexpected characters after 'pass'")?;
            } else {
                let (member, value) = parse_assignment(line, self.line_no(), indent)?;
                members.push((member, value));
            }
            self.idx += 1;
        }

        if !saw_body {
            return Err(ParseError::new(
                format!("expected an indented block after class '{}'", name),
                header_line_no,
                1,
            ));
        }

        Ok(Stmt::ClassDef { name, members })
    }
}

// =============================================================================
// Line Helpers
// =============================================================================

/// Leading whitespace width in bytes (spaces and tabs both count one).
fn indent_of(line: &str) -> usize {
    line.bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// If `line` starts a `class` statement, return the byte offset just past
/// the keyword. `classic = 1` is an assignment, not a class.
fn class_keyword(line: &str) -> Option<usize> {
    keyword(line, "class")
}

/// Match a keyword at the start of `text`, requiring a non-identifier
/// boundary after it. Returns the offset just past the keyword.
fn keyword(text: &str, word: &str) -> Option<usize> {
    let rest = text.strip_prefix(word)?;
    match rest.bytes().next() {
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' => None,
        _ => Some(word.len()),
    }
}

/// Parse `NAME = literal` on a single line. `start` is the byte offset of
/// the statement within the line (its indentation, for class members).
fn parse_assignment(
    line: &str,
    line_no: usize,
    start: usize,
) -> Result<(InternedString, Value), ParseError> {
    let mut scanner = Scanner::new(line, line_no, start);
    let name = scanner.parse_identifier("expected an identifier")?;
    scanner.skip_ws();
    scanner.expect(b'=', "expected '=' after identifier")?;
    scanner.skip_ws();
    let value = scanner.parse_literal()?;
    scanner.expect_end("unexpected characters after value")?;
    Ok((intern(name), value))
}

// =============================================================================
// Literal Scanner
// =============================================================================

/// Byte cursor over a single source line.
struct Scanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_no: usize,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str, line_no: usize, start: usize) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            pos: start,
            line_no,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn col(&self) -> usize {
        self.pos + 1
    }

    fn err(&self, message: impl Into<Arc<str>>) -> ParseError {
        ParseError::new(message, self.line_no, self.col())
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.advance();
        }
    }

    fn expect(&mut self, byte: u8, message: &str) -> Result<(), ParseError> {
        if self.peek() == Some(byte) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(message))
        }
    }

    /// Require only whitespace or a `#` comment through end of line.
    fn expect_end(&mut self, message: &str) -> Result<(), ParseError> {
        self.skip_ws();
        match self.peek() {
            None | Some(b'#') => Ok(()),
            Some(_) => Err(self.err(message)),
        }
    }

    fn parse_identifier(&mut self, message: &str) -> Result<&'a str, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.advance(),
            _ => return Err(self.err(message)),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        Ok(&self.line[start..self.pos])
    }

    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') | Some(b'\'') => self.parse_string(),
            Some(b'[') => self.parse_list(),
            Some(b) if b == b'-' || b == b'+' || b.is_ascii_digit() => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let start_col = self.col();
                let word = self.parse_identifier("expected a value")?;
                match word {
                    "None" => Ok(Value::None),
                    "True" => Ok(Value::bool(true)),
                    "False" => Ok(Value::bool(false)),
                    _ => Err(ParseError::new(
                        format!(
                            "'{}' is not a literal (expected None, True, False, \
                             a number, a string, or a list)",
                            word
                        ),
                        self.line_no,
                        start_col,
                    )),
                }
            }
            Some(b) => Err(self.err(format!("unexpected character '{}'", b as char))),
            None => Err(self.err("expected a value")),
        }
    }

    fn parse_string(&mut self) -> Result<Value, ParseError> {
        let quote = self.bytes[self.pos];
        self.advance();

        let mut out = String::new();
        loop {
            let rest = &self.line[self.pos..];
            let mut chars = rest.chars();
            match chars.next() {
                None => return Err(self.err("unterminated string literal")),
                Some(c) if c as u32 == quote as u32 => {
                    self.advance();
                    return Ok(Value::str(&out));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = chars.next().ok_or_else(|| self.err("unterminated escape"))?;
                    let resolved = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        other => {
                            return Err(self.err(format!("unknown escape '\\{}'", other)));
                        }
                    };
                    out.push(resolved);
                    self.pos += escaped.len_utf8();
                }
                Some(c) => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let start_col = self.col();

        if let Some(b'-' | b'+') = self.peek() {
            self.advance();
        }
        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' | b'_' => self.advance(),
                b'.' => {
                    is_float = true;
                    self.advance();
                }
                b'e' | b'E' => {
                    is_float = true;
                    self.advance();
                    if let Some(b'-' | b'+') = self.peek() {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        let text = &self.line[start..self.pos];
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        let invalid =
            || ParseError::new(format!("invalid number literal '{}'", text), self.line_no, start_col);

        if is_float {
            let value = cleaned.parse::<f64>().map_err(|_| invalid())?;
            Ok(Value::float(value))
        } else {
            let value = cleaned.parse::<i64>().map_err(|_| invalid())?;
            Ok(Value::int(value))
        }
    }

    fn parse_list(&mut self) -> Result<Value, ParseError> {
        self.advance(); // Skip '['

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.err("unterminated list literal")),
                Some(b']') => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                _ => {}
            }

            items.push(self.parse_literal()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.advance(),
                Some(b']') => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                Some(_) => return Err(self.err("expected ',' or ']' in list")),
                None => return Err(self.err("unterminated list literal")),
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
