//! Parameter tree built from the expression tree.
//!
//! Every node is classified exactly once:
//!
//! - a **leaf** when its first two children are parameter-definition tags,
//!   and is materialized as a [`Parameter`];
//! - a **description** when labelled `Description`, and becomes the text of
//!   the enclosing group;
//! - otherwise a **group**, whose children are classified in turn.
//!
//! Problems inside a branch are recorded as diagnostics and the branch is
//! dropped; siblings continue to be processed.

use indexmap::IndexMap;
use tracing::debug;

use super::ast::{Expr, Node};
use super::param::{is_param_tag, Parameter};
use crate::diagnostics::Diagnostics;

/// Either a parameter or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTree {
    Param(Parameter),
    Group(ParamGroup),
}

impl ParamTree {
    pub fn as_param(&self) -> Option<&Parameter> {
        match self {
            ParamTree::Param(p) => Some(p),
            ParamTree::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&ParamGroup> {
        match self {
            ParamTree::Group(g) => Some(g),
            ParamTree::Param(_) => None,
        }
    }
}

/// Named entries in declaration order, plus an optional description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGroup {
    pub description: Option<String>,
    pub entries: IndexMap<String, ParamTree>,
}

impl ParamGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamTree> {
        self.entries.get(name)
    }

    /// Follow a path of entry names.
    pub fn get_path(&self, path: &[&str]) -> Option<&ParamTree> {
        let (first, rest) = path.split_first()?;
        let entry = self.entries.get(*first)?;
        if rest.is_empty() {
            Some(entry)
        } else {
            entry.as_group()?.get_path(rest)
        }
    }

    pub fn get_path_mut(&mut self, path: &[&str]) -> Option<&mut ParamTree> {
        let (first, rest) = path.split_first()?;
        let entry = self.entries.get_mut(*first)?;
        if rest.is_empty() {
            return Some(entry);
        }
        match entry {
            ParamTree::Group(group) => group.get_path_mut(rest),
            ParamTree::Param(_) => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&ParamGroup> {
        self.get(name).and_then(ParamTree::as_group)
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.get(name).and_then(ParamTree::as_param)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ParamTree> {
        self.entries.iter()
    }

    /// Depth-first walk over all parameters with their paths.
    pub fn walk(&self) -> Vec<(Vec<&str>, &Parameter)> {
        let mut out = Vec::new();
        self.walk_into(&mut Vec::new(), &mut out);
        out
    }

    fn walk_into<'g>(&'g self, prefix: &mut Vec<&'g str>, out: &mut Vec<(Vec<&'g str>, &'g Parameter)>) {
        for (name, entry) in &self.entries {
            prefix.push(name);
            match entry {
                ParamTree::Param(p) => out.push((prefix.clone(), p)),
                ParamTree::Group(g) => g.walk_into(prefix, out),
            }
            prefix.pop();
        }
    }

    /// Copy of this group keeping only what `keep` accepts; empty groups are pruned.
    pub fn filtered(&self, keep: &impl Fn(&Parameter) -> bool) -> ParamGroup {
        let mut out = ParamGroup {
            description: self.description.clone(),
            entries: IndexMap::new(),
        };
        for (name, entry) in &self.entries {
            match entry {
                ParamTree::Param(p) if keep(p) => {
                    out.entries.insert(name.clone(), entry.clone());
                }
                ParamTree::Param(_) => {}
                ParamTree::Group(g) => {
                    let sub = g.filtered(keep);
                    if !sub.is_empty() {
                        out.entries.insert(name.clone(), ParamTree::Group(sub));
                    }
                }
            }
        }
        out
    }
}

/// Result of classifying one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedNode<'n> {
    Leaf { name: &'n str, tags: &'n [Expr] },
    Description(&'n [Expr]),
    Group { name: &'n str, children: &'n [Expr] },
    Empty { name: &'n str },
}

impl<'n> ParsedNode<'n> {
    pub fn classify(node: &'n Node) -> Self {
        let name = node.label.as_str();
        let children = node.children.as_slice();
        if children.is_empty() {
            return ParsedNode::Empty { name };
        }
        let is_tag = |expr: &Expr| expr.as_node().map_or(false, |n| is_param_tag(&n.label));
        if children.len() >= 2 && is_tag(&children[0]) && is_tag(&children[1]) {
            ParsedNode::Leaf {
                name,
                tags: children,
            }
        } else if name == "Description" {
            ParsedNode::Description(children)
        } else {
            ParsedNode::Group { name, children }
        }
    }
}

/// Build the group rooted at `node`, recording problems in `diags`.
pub fn build_group(node: &Node, diags: &mut Diagnostics) -> ParamGroup {
    let mut group = ParamGroup::new();
    fill_group(&mut group, &node.children, &node.label, diags);
    group
}

fn fill_group(group: &mut ParamGroup, children: &[Expr], path: &str, diags: &mut Diagnostics) {
    for child in children {
        match child {
            Expr::Node(node) => add_branch(group, node, path, diags),
            Expr::Atom(atom) => {
                diags.error(format!("{}: Malformed item '{}'", path, atom));
            }
        }
    }
}

fn add_branch(group: &mut ParamGroup, node: &Node, parent: &str, diags: &mut Diagnostics) {
    let path = format!("{}.{}", parent, node.label);
    match ParsedNode::classify(node) {
        ParsedNode::Empty { name } => {
            diags.error_at(
                node.offset,
                format!("{}: No tags or subparameters provided for '{}'", parent, name),
            );
        }
        ParsedNode::Leaf { name, tags } => match Parameter::from_tags(name, tags) {
            Ok(param) => {
                debug!(path = %path, "parameter");
                insert(group, name, ParamTree::Param(param), parent, diags);
            }
            Err(e) => diags.error_at(node.offset, format!("{}: {}", parent, e)),
        },
        ParsedNode::Description(children) => match children.first().and_then(Expr::as_atom) {
            Some(text) => group.description = Some(text.text()),
            None => diags.error_at(node.offset, format!("{}: Malformed description", parent)),
        },
        ParsedNode::Group { name, children } => {
            let mut sub = ParamGroup::new();
            fill_group(&mut sub, children, &path, diags);
            insert(group, name, ParamTree::Group(sub), parent, diags);
        }
    }
}

fn insert(group: &mut ParamGroup, name: &str, entry: ParamTree, parent: &str, diags: &mut Diagnostics) {
    if group.entries.insert(name.to_string(), entry).is_some() {
        diags.warn(format!("{}: Duplicate entry '{}' replaces earlier definition", parent, name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ami::parser::parse_expr;
    use crate::config::ParseConfig;

    fn node(text: &str) -> Node {
        parse_expr(text, &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_is_exclusive() {
        let leaf = node("(p (Usage In) (Type Float))");
        assert!(matches!(ParsedNode::classify(&leaf), ParsedNode::Leaf { name: "p", .. }));

        let group = node("(g (Description \"x\") (p (Usage In) (Type Float)))");
        assert!(matches!(ParsedNode::classify(&group), ParsedNode::Group { name: "g", .. }));

        let desc = node("(Description \"text\")");
        assert!(matches!(ParsedNode::classify(&desc), ParsedNode::Description(_)));

        let empty = node("(e)");
        assert!(matches!(ParsedNode::classify(&empty), ParsedNode::Empty { name: "e" }));
    }

    #[test]
    fn test_build_nested_groups() {
        let root = node(
            "(root (Description \"top\")
                (taps (Description \"FIR\")
                    (-1 (Usage In) (Type Tap) (Range 0 -1 1))
                    (0 (Usage In) (Type Tap) (Range 1 0 1))))",
        );
        let mut diags = Diagnostics::new();
        let group = build_group(&root, &mut diags);
        assert!(diags.is_empty(), "{}", diags);
        assert_eq!(group.description.as_deref(), Some("top"));

        let taps = group.group("taps").unwrap();
        assert_eq!(taps.description.as_deref(), Some("FIR"));
        let names: Vec<&String> = taps.entries.keys().collect();
        assert_eq!(names, vec!["pre1", "post0"]);
        assert!(group.get_path(&["taps", "post0"]).unwrap().as_param().is_some());
        assert_eq!(group.walk().len(), 2);
    }

    #[test]
    fn test_bad_branch_dropped_siblings_kept() {
        let root = node(
            "(root
                (bad (Usage Sideways) (Type Float))
                (good (Usage In) (Type Float) (Value 1.0))
                (empty))",
        );
        let mut diags = Diagnostics::new();
        let group = build_group(&root, &mut diags);
        assert!(group.param("good").is_some());
        assert!(group.get("bad").is_none());
        assert_eq!(diags.errors().count(), 2);
        assert!(diags.first_error().unwrap().message.contains("Sideways"));
    }

    #[test]
    fn test_filtered_prunes_empty_groups() {
        let root = node(
            "(root
                (a (x (Usage Info) (Type Float) (Value 1)))
                (b (y (Usage In) (Type Float) (Value 2))))",
        );
        let mut diags = Diagnostics::new();
        let group = build_group(&root, &mut diags);
        let inputs = group.filtered(&|p| p.usage.is_input());
        assert!(inputs.get("a").is_none());
        assert!(inputs.get_path(&["b", "y"]).is_some());
    }
}
