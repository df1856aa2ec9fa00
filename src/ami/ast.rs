//! Expression tree produced by the parameter-file grammar.

use std::fmt;

/// A leaf value inside an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Numeric literal; `text` keeps the source spelling
    Number { value: f64, text: String },
    /// Bare word
    Symbol(String),
    /// Double-quoted string, quotes removed
    Str(String),
    /// `True` or `False`
    Bool(bool),
}

impl Atom {
    /// Source-like text of the atom, without quotes.
    pub fn text(&self) -> String {
        match self {
            Atom::Number { text, .. } => text.clone(),
            Atom::Symbol(s) | Atom::Str(s) => s.clone(),
            Atom::Bool(true) => "True".to_string(),
            Atom::Bool(false) => "False".to_string(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Str(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.text()),
        }
    }
}

/// A labelled, parenthesized list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Expr>,
    /// Offset of the opening parenthesis
    pub offset: usize,
}

impl Node {
    /// Child nodes, skipping atoms.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Expr::as_node)
    }
}

/// Either an atom or a nested node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atom(Atom),
    Node(Node),
}

impl Expr {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Expr::Node(node) => Some(node),
            Expr::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            Expr::Node(_) => None,
        }
    }
}
