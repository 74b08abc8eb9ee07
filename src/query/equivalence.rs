use super::node::{QueryError, QueryNode, Syntax};
use crate::{
    ast::{Expr, Stmt},
    parser::{self, ParseError},
    render,
};

/// Something a node can be compared against: source text or another node.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    Source(&'a str),
    Node(&'a QueryNode),
}

impl<'a> From<&'a str> for Fragment<'a> {
    fn from(source: &'a str) -> Self {
        Fragment::Source(source)
    }
}

impl<'a> From<&'a String> for Fragment<'a> {
    fn from(source: &'a String) -> Self {
        Fragment::Source(source)
    }
}

impl<'a> From<&'a QueryNode> for Fragment<'a> {
    fn from(node: &'a QueryNode) -> Self {
        Fragment::Node(node)
    }
}

/// Which grammar a piece of canonical text is read back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Grammar {
    Program,
    Pattern,
    Case,
}

impl Grammar {
    fn of(tree: &Syntax) -> Self {
        match tree {
            Syntax::Pattern(_) => Grammar::Pattern,
            Syntax::Case(_) => Grammar::Case,
            _ => Grammar::Program,
        }
    }

    /// Parses and renders `text` as a whole.
    fn normalize(self, text: &str) -> Result<String, ParseError> {
        Ok(match self {
            Grammar::Program => render::unparse(&parser::parse(text)?),
            Grammar::Pattern => render::unparse_pattern(&parser::parse_pattern(text)?),
            Grammar::Case => render::unparse_case(&parser::parse_case(text)?),
        })
    }

    /// Parses `text` and renders each top-level statement on its own.
    fn forms(self, text: &str) -> Result<Vec<String>, ParseError> {
        match self {
            Grammar::Program => Ok(parser::parse(text)?
                .body
                .iter()
                .map(render::unparse_stmt)
                .collect()),
            Grammar::Pattern | Grammar::Case => Ok(vec![self.normalize(text)?]),
        }
    }
}

/// Canonical forms of a tree. `None` when a sequence holds an empty node,
/// which matches nothing.
fn tree_forms(tree: &Syntax) -> Result<Option<Vec<String>>, ParseError> {
    match tree {
        Syntax::Sequence(items) => {
            let mut forms = Vec::new();
            for item in items {
                let Some(tree) = item.tree() else {
                    return Ok(None);
                };
                let Some(item_forms) = tree_forms(tree)? else {
                    return Ok(None);
                };
                forms.extend(item_forms);
            }
            Ok(Some(forms))
        }
        tree => Grammar::of(tree).forms(&tree.render()).map(Some),
    }
}

/// The canonical statements a candidate has to reproduce, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Expected {
    forms: Vec<String>,
}

impl Expected {
    fn from_source(source: &str, grammar: Grammar) -> Result<Self, ParseError> {
        let forms = grammar.forms(&grammar.normalize(source)?)?;
        Ok(Expected { forms })
    }

    fn from_node(node: &QueryNode) -> Result<Option<Self>, ParseError> {
        let Some(tree) = node.tree() else {
            return Ok(None);
        };
        Ok(tree_forms(tree)?.map(|forms| Expected { forms }))
    }

    /// Caller text read as a program.
    pub(super) fn program(source: &str) -> Result<Self, ParseError> {
        Self::from_source(source, Grammar::Program)
    }

    pub(super) fn matches(&self, node: &QueryNode) -> Result<bool, ParseError> {
        let Some(tree) = node.tree() else {
            return Ok(false);
        };
        Ok(tree_forms(tree)?.is_some_and(|forms| self.accepts(&forms)))
    }

    pub(super) fn matches_stmt(&self, stmt: &Stmt) -> Result<bool, ParseError> {
        let forms = Grammar::Program.forms(&render::unparse_stmt(stmt))?;
        Ok(self.accepts(&forms))
    }

    pub(super) fn matches_expr(&self, expr: &Expr) -> Result<bool, ParseError> {
        let forms = Grammar::Program.forms(&render::unparse_expr(expr))?;
        Ok(self.accepts(&forms))
    }

    fn accepts(&self, forms: &[String]) -> bool {
        let equivalent = self.forms == forms;
        tracing::trace!(expected = ?self.forms, candidate = ?forms, equivalent, "equivalence check");
        equivalent
    }
}

impl QueryNode {
    /// Whether this node is the same code as `target`, ignoring layout,
    /// comments, redundant parentheses and literal spelling.
    ///
    /// An empty node is equivalent to nothing. A bare expression and a
    /// program holding only that expression compare equal, and a sequence
    /// of nodes matches text with the same statements in the same order.
    ///
    /// # Examples
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("print( 'hi' )").unwrap();
    /// assert!(code.is_equivalent("print(\"hi\")").unwrap());
    /// assert!(!QueryNode::empty().is_equivalent("").unwrap());
    /// ```
    pub fn is_equivalent<'a>(&self, target: impl Into<Fragment<'a>>) -> Result<bool, QueryError> {
        let Some(tree) = self.tree() else {
            return Ok(false);
        };
        let expected = match target.into() {
            Fragment::Source(source) => Expected::from_source(source, Grammar::of(tree))?,
            Fragment::Node(node) => match Expected::from_node(node)? {
                Some(expected) => expected,
                None => return Ok(false),
            },
        };
        Ok(expected.matches(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_forms_flatten_members() {
        let node = QueryNode::parse("a = 1\nb = 2").unwrap();
        let sequence = QueryNode::from(vec![node.get(0).unwrap(), node.get(1).unwrap()]);
        let forms = tree_forms(sequence.tree().unwrap()).unwrap();
        assert_eq!(forms, Some(vec!["a = 1".to_string(), "b = 2".to_string()]));
    }

    #[test]
    fn sequence_with_absent_member_has_no_forms() {
        let sequence = QueryNode::from(vec![QueryNode::parse("a = 1").unwrap(), QueryNode::empty()]);
        assert_eq!(tree_forms(sequence.tree().unwrap()).unwrap(), None);
    }

    #[test]
    fn pattern_text_uses_pattern_grammar() {
        let expected = Expected::from_source("[a,   *rest]", Grammar::Pattern).unwrap();
        assert_eq!(expected.forms, vec!["[a, *rest]".to_string()]);
    }
}
