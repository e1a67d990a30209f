use std::fmt;

use crate::analyzer::Type;
use crate::error::{Error, Result};
use crate::grammar::{Rule, Symbol};
use crate::token::Token;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Leaf(Token),
    Interior { rule: Rule, children: Vec<Node> },
}

/// A parse tree node. `ty` is filled in by semantic analysis for expression
/// nonterminals only.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: Option<Type>,
}

impl Node {
    pub fn leaf(token: Token) -> Self {
        Self {
            kind: NodeKind::Leaf(token),
            ty: None,
        }
    }

    pub fn interior(rule: Rule, children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Interior { rule, children },
            ty: None,
        }
    }

    /// Token kind for a leaf, left-hand side for an interior node.
    pub fn label(&self) -> Symbol {
        match &self.kind {
            NodeKind::Leaf(token) => token.kind,
            NodeKind::Interior { rule, .. } => rule.lhs,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::Leaf(token) => Some(token),
            NodeKind::Interior { .. } => None,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Interior { rule, .. } => Some(rule),
        }
    }

    /// Right-hand side of the producing rule; empty for leaves.
    pub fn rhs(&self) -> &[Symbol] {
        match self.rule() {
            Some(rule) => &rule.rhs,
            None => &[],
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Interior { children, .. } => children,
        }
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        match &mut self.kind {
            NodeKind::Leaf(_) => &mut [],
            NodeKind::Interior { children, .. } => children,
        }
    }

    /// The `n`-th (1-indexed) immediate child labelled `label`.
    pub fn child(&self, label: Symbol, n: usize) -> Option<&Node> {
        self.children()
            .iter()
            .filter(|child| child.label() == label)
            .nth(n.checked_sub(1)?)
    }

    pub fn expect_child(&self, label: Symbol, n: usize) -> Result<&Node> {
        self.child(label, n).ok_or(Error::Malformed(label))
    }

    /// Depth-first search, this node included, for the first node labelled
    /// `label`.
    pub fn find(&self, label: Symbol) -> Option<&Node> {
        if self.label() == label {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(label))
    }

    pub fn lexeme(&self) -> Result<&str> {
        self.token()
            .map(|token| token.lexeme.as_str())
            .ok_or(Error::Malformed(self.label()))
    }

    pub fn expect_type(&self) -> Result<Type> {
        self.ty.ok_or(Error::Malformed(self.label()))
    }

    /// Collects `item` children along a self-recursive list such as
    /// `arglist expr COMMA arglist` or `dcls dcls dcl BECOMES NUM SEMI`,
    /// outermost first.
    pub fn list_items(&self, item: Symbol) -> Vec<&Node> {
        let label = self.label();
        let mut items = vec![];
        let mut current = Some(self);

        while let Some(node) = current {
            items.extend(node.child(item, 1));
            current = node.child(label, 1);
        }

        items
    }

    /// Mutable `list_items`. Walks the chain in a loop, so long lists do not
    /// grow the call stack.
    pub fn list_items_mut(&mut self, item: Symbol) -> Vec<&mut Node> {
        let label = self.label();
        let mut items = vec![];
        let mut current = Some(self);

        while let Some(node) = current.take() {
            let mut found = false;
            for child in node.children_mut() {
                if child.label() == label && current.is_none() {
                    current = Some(child);
                } else if child.label() == item && !found {
                    found = true;
                    items.push(child);
                }
            }
        }

        items
    }

    /// Procedure and entry-procedure nodes, in source order.
    pub fn procedures(&self) -> Vec<&Node> {
        match self.label() {
            Symbol::Procedure | Symbol::Main => vec![self],
            Symbol::Start | Symbol::Procedures => self
                .children()
                .iter()
                .flat_map(|child| child.procedures())
                .collect(),
            _ => vec![],
        }
    }

    pub fn procedures_mut(&mut self) -> Vec<&mut Node> {
        let mut procedures = vec![];
        collect_procedures(self, &mut procedures);
        procedures
    }

    /// Indented rendering with box-drawing guides.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, "");
        out
    }

    fn pretty_into(&self, out: &mut String, prefix: &str) {
        out.push_str(&self.heading());
        out.push('\n');

        let children = self.children();
        for (i, child) in children.iter().enumerate() {
            let (branch, guide) = if i + 1 == children.len() {
                ("╰─", "  ")
            } else {
                ("├─", "│ ")
            };
            out.push_str(prefix);
            out.push_str(branch);
            child.pretty_into(out, &format!("{prefix}{guide}"));
        }
    }

    fn heading(&self) -> String {
        let heading = match &self.kind {
            NodeKind::Leaf(token) => token.to_string(),
            NodeKind::Interior { rule, .. } => rule.to_string(),
        };
        match self.ty {
            Some(ty) => format!("{heading} : {ty}"),
            None => heading,
        }
    }
}

fn collect_procedures<'a>(node: &'a mut Node, out: &mut Vec<&'a mut Node>) {
    match node.label() {
        Symbol::Procedure | Symbol::Main => out.push(node),
        Symbol::Start | Symbol::Procedures => {
            for child in node.children_mut() {
                collect_procedures(child, out);
            }
        }
        _ => (),
    }
}

/// Pre-order listing, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading())?;
        for child in self.children() {
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}
