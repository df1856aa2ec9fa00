//! Grammar for the parenthesized parameter-definition format.
//!
//! ```text
//! file  := ignored node ignored EOF
//! node  := '(' label expr* ')'
//! label := tap-index | symbol
//! expr  := node | atom
//! atom  := string | bool | number | symbol
//! ```
//!
//! `ignored` is any run of whitespace and comments, allowed between all
//! tokens. A tap index is a signed integer immediately followed by
//! whitespace and becomes `post<n>` or `pre<n>`.

use super::ast::{Atom, Expr, Node};
use crate::config::ParseConfig;
use crate::error::{IbisAmiError, Result};
use crate::lexer::{parse_value, Cursor};
use crate::value::try_tap_label;

/// Parser for parameter-definition files.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, config: &ParseConfig) -> Self {
        Self {
            cursor: Cursor::with_comment_char(input, config.comment_char),
            max_depth: config.max_depth,
        }
    }

    /// Parse the whole input as a single root node.
    pub fn parse(&mut self) -> Result<Node> {
        self.cursor.skip_ignored();
        let root = self.node(1)?;
        if !self.cursor.is_eof() {
            return Err(self.cursor.expected("end of input"));
        }
        Ok(root)
    }

    fn node(&mut self, depth: usize) -> Result<Node> {
        if depth > self.max_depth {
            return Err(IbisAmiError::NestingTooDeep {
                max_depth: self.max_depth,
                line: self.cursor.position().line,
            });
        }

        let offset = self.cursor.position().offset;
        self.cursor.expect_char('(')?;
        self.cursor.skip_ignored();
        let label = self.label()?;
        self.cursor.skip_ignored();

        let mut children = Vec::new();
        loop {
            match self.cursor.peek() {
                Some(')') => {
                    self.cursor.advance();
                    self.cursor.skip_ignored();
                    break;
                }
                Some('(') => children.push(Expr::Node(self.node(depth + 1)?)),
                Some(_) => {
                    children.push(Expr::Atom(self.atom()?));
                    self.cursor.skip_ignored();
                }
                None => return Err(self.cursor.expected("')'")),
            }
        }

        Ok(Node {
            label,
            children,
            offset,
        })
    }

    fn label(&mut self) -> Result<String> {
        if let Some(tap) = try_tap_label(&mut self.cursor) {
            return Ok(tap);
        }
        match self.cursor.peek() {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => Ok(self.word().to_string()),
            _ => Err(self.cursor.expected("parameter name")),
        }
    }

    fn word(&mut self) -> &'a str {
        self.cursor
            .take_while(|c| !c.is_whitespace() && c != '(' && c != ')')
    }

    fn atom(&mut self) -> Result<Atom> {
        if let Some(text) = self.cursor.quoted_string()? {
            return Ok(Atom::Str(text.to_string()));
        }

        let start = self.cursor.position();
        let word = self.word();
        match word {
            "True" => return Ok(Atom::Bool(true)),
            "False" => return Ok(Atom::Bool(false)),
            _ => {}
        }
        if let Ok(value) = parse_value(word) {
            return Ok(Atom::Number {
                value,
                text: word.to_string(),
            });
        }
        match word.chars().next() {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => Ok(Atom::Symbol(word.to_string())),
            _ => {
                self.cursor.reset(start);
                Err(self.cursor.expected("atom"))
            }
        }
    }
}

/// Parse parameter-definition text into its root node.
pub fn parse_expr(input: &str, config: &ParseConfig) -> Result<Node> {
    Parser::new(input, config).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Node> {
        parse_expr(input, &ParseConfig::default())
    }

    #[test]
    fn test_parse_atoms() {
        let node = parse("(p 27 1.5k \"two words\" True sym)").unwrap();
        assert_eq!(node.label, "p");
        let atoms: Vec<&Atom> = node.children.iter().filter_map(Expr::as_atom).collect();
        assert_eq!(
            atoms[0],
            &Atom::Number {
                value: 27.0,
                text: "27".to_string()
            }
        );
        assert!(matches!(atoms[1], Atom::Number { value, .. } if *value == 1500.0));
        assert_eq!(atoms[2], &Atom::Str("two words".to_string()));
        assert_eq!(atoms[3], &Atom::Bool(true));
        assert_eq!(atoms[4], &Atom::Symbol("sym".to_string()));
    }

    #[test]
    fn test_unknown_suffix_becomes_symbol() {
        let node = parse("(p 10x)").unwrap();
        assert_eq!(
            node.children[0],
            Expr::Atom(Atom::Symbol("10x".to_string()))
        );
    }

    #[test]
    fn test_tap_index_labels() {
        let node = parse("(taps (0 (Usage In)) (-1 (Usage In)) (1e5 x))").unwrap();
        let labels: Vec<&str> = node.child_nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["post0", "pre1", "1e5"]);
    }

    #[test]
    fn test_comments_and_offsets() {
        let input = "| header\n(root | trailing\n  (child 1) )\n";
        let node = parse(input).unwrap();
        assert_eq!(node.offset, 9);
        let child = node.child_nodes().next().unwrap();
        assert_eq!(child.label, "child");
        assert_eq!(child.offset, input.find("(child").unwrap());
    }

    #[test]
    fn test_unbalanced_is_syntax_error() {
        let err = parse("(root (child 1)").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.offset(), Some(15));
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert!(parse("(root) extra").unwrap_err().is_syntax());
        assert!(parse("").unwrap_err().is_syntax());
    }

    #[test]
    fn test_nesting_limit() {
        let config = ParseConfig::new().with_max_depth(3);
        assert!(parse_expr("(a (b (c 1)))", &config).is_ok());
        let err = parse_expr("(a (b (c (d 1))))", &config).unwrap_err();
        assert!(matches!(err, IbisAmiError::NestingTooDeep { max_depth: 3, .. }));
    }
}
