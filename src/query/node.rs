use std::fmt;

use thiserror::Error;

use crate::{
    ast::{Expr, MatchCase, Module, Pattern, Stmt},
    parser::{self, ParseError},
    render,
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("index {index} out of bounds for a node with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// The piece of syntax a [`QueryNode`] holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Syntax {
    Module(Module),
    Stmt(Stmt),
    Expr(Expr),
    Case(MatchCase),
    Pattern(Pattern),
    /// Nodes gathered by an earlier query, in order
    Sequence(Vec<QueryNode>),
}

impl Syntax {
    /// The statements this syntax owns, if it owns a block.
    pub fn body(&self) -> Option<&[Stmt]> {
        match self {
            Syntax::Module(module) => Some(&module.body),
            Syntax::Stmt(stmt) => stmt.body(),
            Syntax::Case(case) => Some(&case.body),
            Syntax::Expr(_) | Syntax::Pattern(_) | Syntax::Sequence(_) => None,
        }
    }

    /// Canonical source text. Sequence members go on separate lines.
    pub fn render(&self) -> String {
        match self {
            Syntax::Module(module) => render::unparse(module),
            Syntax::Stmt(stmt) => render::unparse_stmt(stmt),
            Syntax::Expr(expr) => render::unparse_expr(expr),
            Syntax::Case(case) => render::unparse_case(case),
            Syntax::Pattern(pattern) => render::unparse_pattern(pattern),
            Syntax::Sequence(items) => items
                .iter()
                .map(QueryNode::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A read-only view of one syntax node, or of nothing.
///
/// Two nodes are equal when both are empty, or when both hold trees of the
/// same structure. Trees carry no layout, so formatting never affects
/// equality while literal and operator differences always do.
///
/// # Examples
///
/// ```
/// use py_query::QueryNode;
///
/// let code = QueryNode::parse("x = 1\nif x == 1:\n    x = 2\n").unwrap();
/// assert_eq!(code.len(), 2);
/// assert!(code.get(1).unwrap().is_equivalent("if x == 1:\n    x = 2").unwrap());
/// assert!(code.get(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryNode {
    tree: Option<Syntax>,
}

impl QueryNode {
    /// Parses a Python program.
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let module = parser::parse(source)?;
        tracing::debug!(statements = module.body.len(), "query node from source");
        Ok(module.into())
    }

    pub fn new(tree: Syntax) -> Self {
        QueryNode { tree: Some(tree) }
    }

    /// The absent node.
    pub fn empty() -> Self {
        QueryNode { tree: None }
    }

    /// True when the node holds nothing. A node holding an empty program is
    /// not empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    pub fn tree(&self) -> Option<&Syntax> {
        self.tree.as_ref()
    }

    /// Number of children: the length of the body or sequence, 1 for any
    /// other syntax, 0 when empty.
    pub fn len(&self) -> usize {
        match &self.tree {
            None => 0,
            Some(Syntax::Sequence(items)) => items.len(),
            Some(tree) => tree.body().map_or(1, <[Stmt]>::len),
        }
    }

    /// The child at `index`: a statement of the body, or a member of a
    /// sequence.
    pub fn get(&self, index: usize) -> Result<QueryNode, QueryError> {
        let found = match &self.tree {
            Some(Syntax::Sequence(items)) => items.get(index).cloned(),
            _ => self.body().get(index).cloned().map(QueryNode::from),
        };
        found.ok_or_else(|| {
            let len = match &self.tree {
                Some(Syntax::Sequence(items)) => items.len(),
                _ => self.body().len(),
            };
            tracing::debug!(index, len, "query node index out of bounds");
            QueryError::IndexOutOfBounds { index, len }
        })
    }

    /// Statements of the node's block; empty when it has none.
    pub(crate) fn body(&self) -> &[Stmt] {
        self.tree.as_ref().and_then(Syntax::body).unwrap_or_default()
    }

    /// The statement this node stands for. A program of exactly one
    /// statement stands for that statement.
    pub(crate) fn statement(&self) -> Option<&Stmt> {
        match &self.tree {
            Some(Syntax::Stmt(stmt)) => Some(stmt),
            Some(Syntax::Module(Module { body })) if body.len() == 1 => body.first(),
            _ => None,
        }
    }

    /// The expression this node stands for, looking through an expression
    /// statement.
    pub(crate) fn expression(&self) -> Option<&Expr> {
        match &self.tree {
            Some(Syntax::Expr(expr)) => Some(expr),
            _ => match self.statement() {
                Some(Stmt::Expr(expr)) => Some(expr),
                _ => None,
            },
        }
    }
}

/// Canonical source text; an empty node displays as nothing.
impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tree {
            Some(tree) => f.write_str(&tree.render()),
            None => Ok(()),
        }
    }
}

impl From<Syntax> for QueryNode {
    fn from(tree: Syntax) -> Self {
        QueryNode::new(tree)
    }
}

impl From<Module> for QueryNode {
    fn from(module: Module) -> Self {
        QueryNode::new(Syntax::Module(module))
    }
}

impl From<Stmt> for QueryNode {
    fn from(stmt: Stmt) -> Self {
        QueryNode::new(Syntax::Stmt(stmt))
    }
}

impl From<Expr> for QueryNode {
    fn from(expr: Expr) -> Self {
        QueryNode::new(Syntax::Expr(expr))
    }
}

impl From<MatchCase> for QueryNode {
    fn from(case: MatchCase) -> Self {
        QueryNode::new(Syntax::Case(case))
    }
}

impl From<Pattern> for QueryNode {
    fn from(pattern: Pattern) -> Self {
        QueryNode::new(Syntax::Pattern(pattern))
    }
}

impl From<Vec<QueryNode>> for QueryNode {
    fn from(items: Vec<QueryNode>) -> Self {
        QueryNode::new(Syntax::Sequence(items))
    }
}

/// Wraps an optional child, mapping `None` to the empty node.
impl<T: Into<QueryNode>> From<Option<T>> for QueryNode {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(QueryNode::empty, Into::into)
    }
}
