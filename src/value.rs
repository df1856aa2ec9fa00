//! Numeric value forms shared by the model format: typ/min/max triples,
//! slew-rate ratios and tap-position labels.

use std::fmt;

use crate::error::Result;
use crate::lexer::Cursor;

/// A typical value with optional min/max corners.
///
/// Either both corners are present or neither is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypMinMax {
    pub typ: f64,
    pub corners: Option<(f64, f64)>,
}

impl TypMinMax {
    pub fn typ_only(typ: f64) -> Self {
        Self { typ, corners: None }
    }

    pub fn new(typ: f64, min: f64, max: f64) -> Self {
        Self {
            typ,
            corners: Some((min, max)),
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.corners.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.corners.map(|(_, max)| max)
    }

    /// The values as a list of length one or three.
    pub fn values(&self) -> Vec<f64> {
        match self.corners {
            Some((min, max)) => vec![self.typ, min, max],
            None => vec![self.typ],
        }
    }
}

impl fmt::Display for TypMinMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.corners {
            Some((min, max)) => write!(f, "{} {} {}", self.typ, min, max),
            None => write!(f, "{}", self.typ),
        }
    }
}

/// Parse `typ [min max]`, with `NA NA` standing for absent corners.
///
/// The corners must sit on the same line as the typical value. Nothing
/// after the last value is consumed.
pub fn typminmax(cursor: &mut Cursor<'_>) -> Result<TypMinMax> {
    match try_typminmax(cursor)? {
        Some(value) => Ok(value),
        None => Err(cursor.expected("typical value")),
    }
}

/// Like [`typminmax`] but fails without consuming when no number is present.
pub fn try_typminmax(cursor: &mut Cursor<'_>) -> Result<Option<TypMinMax>> {
    match cursor.try_number()? {
        Some(typ) => {
            let corners = corners(cursor)?;
            Ok(Some(TypMinMax { typ, corners }))
        }
        None => Ok(None),
    }
}

fn corners(cursor: &mut Cursor<'_>) -> Result<Option<(f64, f64)>> {
    let mark = cursor.position();
    cursor.skip_inline_space();
    if let Some(min) = cursor.try_number()? {
        cursor.skip_inline_space();
        if let Some(max) = cursor.try_number()? {
            return Ok(Some((min, max)));
        }
    } else if cursor.eat_na() {
        cursor.skip_inline_space();
        if cursor.eat_na() {
            return Ok(None);
        }
    }
    cursor.reset(mark);
    Ok(None)
}

/// Parse `a/b` as a float, or `NA` as absent.
///
/// A zero denominator also yields `None`. Inline whitespace around the
/// slash is allowed; line breaks are not consumed.
pub fn ratio(cursor: &mut Cursor<'_>) -> Result<Option<f64>> {
    if cursor.eat_na() {
        let mark = cursor.position();
        if !(cursor.eat('/') && cursor.eat_na()) {
            cursor.reset(mark);
        }
        return Ok(None);
    }
    let num = cursor.number()?;
    cursor.skip_inline_space();
    cursor.expect_char('/')?;
    cursor.skip_inline_space();
    let den = cursor.number()?;
    if den == 0.0 {
        Ok(None)
    } else {
        Ok(Some(num / den))
    }
}

/// Label for a tap index: `post<n>` for `n >= 0`, otherwise `pre<|n|>`.
pub fn tap_label(index: i64) -> String {
    if index >= 0 {
        format!("post{}", index)
    } else {
        format!("pre{}", index.unsigned_abs())
    }
}

/// Scan a signed integer immediately followed by whitespace as a tap label.
///
/// Fails without consuming input otherwise.
pub fn try_tap_label(cursor: &mut Cursor<'_>) -> Option<String> {
    let mark = cursor.position();
    let sign = if cursor.eat('-') {
        "-"
    } else {
        cursor.eat('+');
        ""
    };
    let digits = cursor.take_while(|c| c.is_ascii_digit());
    let followed_by_space = cursor.peek().map_or(false, char::is_whitespace);
    let index = format!("{}{}", sign, digits).parse::<i64>().ok();
    match index {
        Some(index) if followed_by_space => Some(tap_label(index)),
        _ => {
            cursor.reset(mark);
            None
        }
    }
}

/// Parse a standalone `typ [min max]` string.
pub fn parse_typminmax(text: &str) -> Result<TypMinMax> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ignored();
    let value = typminmax(&mut cursor)?;
    cursor.skip_ignored();
    if cursor.is_eof() {
        Ok(value)
    } else {
        Err(cursor.expected("end of value"))
    }
}

/// Parse a standalone ratio string.
pub fn parse_ratio(text: &str) -> Result<Option<f64>> {
    let mut cursor = Cursor::new(text.trim());
    let value = ratio(&mut cursor)?;
    if cursor.is_eof() {
        Ok(value)
    } else {
        Err(cursor.expected("end of ratio"))
    }
}
