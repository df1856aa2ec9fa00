//! Character cursor shared by the parameter-format and model-format parsers.
//!
//! Both grammars are scannerless: the parsers pull characters directly from a
//! [`Cursor`] rather than from a token stream. A cursor position can be saved
//! and restored, which is how an alternative that does not match "fails
//! without consuming input" and lets the next alternative try the same text.

use crate::config::DEFAULT_COMMENT_CHAR;
use crate::error::{IbisAmiError, Result};

/// Engineering multiplier suffixes accepted after a numeric mantissa.
pub const SUFFIXES: [(char, f64); 9] = [
    ('T', 1e12),
    ('G', 1e9),
    ('M', 1e6),
    ('k', 1e3),
    ('m', 1e-3),
    ('u', 1e-6),
    ('n', 1e-9),
    ('p', 1e-12),
    ('f', 1e-15),
];

/// Unit names that may trail a number, with or without a multiplier.
const UNITS: [&str; 10] = ["V", "A", "F", "H", "s", "S", "W", "Hz", "Ohm", "ohm"];

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from the start of input
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Backtracking character cursor over borrowed input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: Position,
    comment_char: char,
}

impl<'a> Cursor<'a> {
    /// Create a cursor using the default `|` comment marker.
    pub fn new(input: &'a str) -> Self {
        Self::with_comment_char(input, DEFAULT_COMMENT_CHAR)
    }

    pub fn with_comment_char(input: &'a str, comment_char: char) -> Self {
        Self {
            input,
            pos: Position::default(),
            comment_char,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Change the comment marker for the remaining input.
    pub fn set_comment_char(&mut self, comment_char: char) {
        self.comment_char = comment_char;
    }

    /// Rewind (or fast-forward) to a previously saved position.
    pub fn reset(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos.offset >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn at_line_start(&self) -> bool {
        self.pos.column == 1
    }

    /// True at end of input, at a line break or at a comment.
    pub fn at_line_end(&self) -> bool {
        match self.peek() {
            None | Some('\n') | Some('\r') => true,
            Some(c) => c == self.comment_char,
        }
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn bump(&mut self, len: usize) {
        let target = self.pos.offset + len;
        while self.pos.offset < target && self.advance().is_some() {}
    }

    /// Skip whitespace (including line breaks) and comments.
    pub fn skip_ignored(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == self.comment_char {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Skip spaces and tabs without leaving the current line.
    pub fn skip_inline_space(&mut self) -> bool {
        let start = self.pos.offset;
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
        self.pos.offset > start
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_char(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.expected(format!("'{}'", expected)))
        }
    }

    pub fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        self.rest()
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
    }

    /// Consume `prefix` if the input starts with it, ignoring ASCII case.
    pub fn eat_ignore_case(&mut self, prefix: &str) -> bool {
        if self.starts_with_ignore_case(prefix) {
            self.bump(prefix.len());
            true
        } else {
            false
        }
    }

    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos.offset]
    }

    /// Text up to the end of line or a comment, trailing blanks trimmed.
    ///
    /// A trailing comment is consumed too; the line break is not.
    pub fn rest_of_line(&mut self) -> &'a str {
        let comment_char = self.comment_char;
        let text = self.take_while(|c| c != '\n' && c != '\r' && c != comment_char);
        self.take_while(|c| c != '\n');
        text.trim_end()
    }

    /// Raw text up to the end of line, comments included.
    pub fn line_remainder(&mut self) -> &'a str {
        self.take_while(|c| c != '\n' && c != '\r')
    }

    /// Consume an `NA` (or `na`) placeholder.
    pub fn eat_na(&mut self) -> bool {
        let rest = self.rest();
        if !(rest.starts_with("NA") || rest.starts_with("na")) {
            return false;
        }
        match rest[2..].chars().next() {
            None => {}
            Some(c) if c.is_whitespace() || c == '/' || c == self.comment_char => {}
            Some(_) => return false,
        }
        self.bump(2);
        true
    }

    /// Scan a number with optional engineering suffix.
    ///
    /// Returns `Ok(None)` without consuming anything when no mantissa is
    /// present. A mantissa followed by letters that are neither a known
    /// multiplier nor a unit is an error.
    pub fn try_number(&mut self) -> Result<Option<f64>> {
        let rest = self.rest();
        let Some(len) = number_prefix_len(rest) else {
            return Ok(None);
        };
        let Ok(mantissa) = rest[..len].parse::<f64>() else {
            return Ok(None);
        };
        self.bump(len);

        let suffix_pos = self.pos;
        let letters = self.take_while(|c| c.is_ascii_alphabetic());
        match apply_suffix(mantissa, letters) {
            Some(value) => Ok(Some(value)),
            None => Err(IbisAmiError::unknown_suffix(suffix_pos, letters)),
        }
    }

    /// Scan a number that must be present.
    pub fn number(&mut self) -> Result<f64> {
        match self.try_number()? {
            Some(value) => Ok(value),
            None => Err(self.expected("number")),
        }
    }

    /// Scan a double-quoted string, returning its contents.
    ///
    /// The string may span lines. Returns `Ok(None)` if the input does not
    /// start with a quote.
    pub fn quoted_string(&mut self) -> Result<Option<&'a str>> {
        if self.peek() != Some('"') {
            return Ok(None);
        }
        let start = self.pos;
        self.advance();
        let body = self.take_while(|c| c != '"');
        if self.eat('"') {
            Ok(Some(body))
        } else {
            Err(IbisAmiError::syntax(start, "closing '\"'", "end of input"))
        }
    }

    /// Syntax error at the current position.
    pub fn expected(&self, what: impl Into<String>) -> IbisAmiError {
        IbisAmiError::syntax(self.pos, what, self.found())
    }

    fn found(&self) -> String {
        match self.rest().split_whitespace().next() {
            None => "end of input".to_string(),
            Some(word) => {
                let preview: String = word.chars().take(24).collect();
                format!("'{}'", preview)
            }
        }
    }
}

/// Length of the decimal mantissa (with optional exponent) at the start of `text`.
pub fn number_prefix_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_end = digits_from(i);
    let has_int = int_end > i;
    i = int_end;

    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        if frac_end > i + 1 || has_int {
            i = frac_end;
        } else {
            return None;
        }
    } else if !has_int {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    Some(i)
}

/// Multiplier for an engineering suffix character.
pub fn suffix_multiplier(suffix: char) -> Option<f64> {
    SUFFIXES
        .iter()
        .find(|(c, _)| *c == suffix)
        .map(|(_, mult)| *mult)
}

fn apply_suffix(mantissa: f64, letters: &str) -> Option<f64> {
    if letters.is_empty() || UNITS.contains(&letters) {
        return Some(mantissa);
    }
    let mut chars = letters.chars();
    let mult = chars.next().and_then(suffix_multiplier)?;
    let unit = chars.as_str();
    if unit.is_empty() || UNITS.contains(&unit) {
        Some(mantissa * mult)
    } else {
        None
    }
}

/// Parse a complete string as a number with optional suffix.
pub fn parse_value(text: &str) -> Result<f64> {
    let mut cursor = Cursor::new(text.trim());
    let value = cursor.number()?;
    if cursor.is_eof() {
        Ok(value)
    } else {
        Err(cursor.expected("end of number"))
    }
}
