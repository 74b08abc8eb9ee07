//! Conditional chains, loops and `match` statements.
//!
//! Python nests an `elif` as the sole statement of the previous branch's
//! `else`. The finders here flatten that nesting into one entry per branch.

use super::{
    equivalence::Expected,
    node::{QueryError, QueryNode, Syntax},
};
use crate::ast::{Module, Stmt};

fn block(body: &[Stmt]) -> QueryNode {
    Module::new(body.to_vec()).into()
}

impl QueryNode {
    fn find_first(
        &self,
        mut predicate: impl FnMut(&Stmt) -> Result<bool, QueryError>,
    ) -> Result<QueryNode, QueryError> {
        for stmt in self.body() {
            if predicate(stmt)? {
                return Ok(stmt.clone().into());
            }
        }
        Ok(QueryNode::empty())
    }

    // Conditionals and loops

    pub fn find_ifs(&self) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::If { .. }))
    }

    /// The first `if` in this block whose condition is equivalent to
    /// `condition`.
    pub fn find_if(&self, condition: &str) -> Result<QueryNode, QueryError> {
        let expected = Expected::program(condition)?;
        self.find_first(|stmt| match stmt {
            Stmt::If { test, .. } => Ok(expected.matches_expr(test)?),
            _ => Ok(false),
        })
    }

    pub fn find_whiles(&self) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::While { .. }))
    }

    pub fn find_while(&self, condition: &str) -> Result<QueryNode, QueryError> {
        let expected = Expected::program(condition)?;
        self.find_first(|stmt| match stmt {
            Stmt::While { test, .. } => Ok(expected.matches_expr(test)?),
            _ => Ok(false),
        })
    }

    pub fn find_for_loops(&self) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::For { .. }))
    }

    /// The first `for target in iter` loop in this block; both the loop
    /// variables and the iterable have to match.
    pub fn find_for(&self, target: &str, iter: &str) -> Result<QueryNode, QueryError> {
        let expected_target = Expected::program(target)?;
        let expected_iter = Expected::program(iter)?;
        self.find_first(|stmt| match stmt {
            Stmt::For {
                target: loop_target,
                iter: loop_iter,
                ..
            } => Ok(expected_target.matches_expr(loop_target)? && expected_iter.matches_expr(loop_iter)?),
            _ => Ok(false),
        })
    }

    /// Loop variables of the `for` loop this node stands for.
    pub fn find_for_vars(&self) -> QueryNode {
        match self.statement() {
            Some(Stmt::For { target, .. }) => target.clone().into(),
            _ => QueryNode::empty(),
        }
    }

    /// Iterable of the `for` loop this node stands for.
    pub fn find_for_iter(&self) -> QueryNode {
        match self.statement() {
            Some(Stmt::For { iter, .. }) => iter.clone().into(),
            _ => QueryNode::empty(),
        }
    }

    /// One condition per branch of the `if` chain or `while` this node
    /// stands for. A final `else` adds an empty node.
    ///
    /// # Examples
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n").unwrap();
    /// let conditions = code.find_conditions();
    /// assert_eq!(conditions.len(), 3);
    /// assert!(conditions[1].is_equivalent("b").unwrap());
    /// assert!(conditions[2].is_empty());
    /// ```
    pub fn find_conditions(&self) -> Vec<QueryNode> {
        let mut conditions: Vec<QueryNode> = Vec::new();
        match self.statement() {
            Some(Stmt::If { test, orelse, .. }) => {
                conditions.push(test.clone().into());
                let mut orelse = orelse;
                while let [Stmt::If { test, orelse: next, .. }] = orelse.as_slice() {
                    conditions.push(test.clone().into());
                    orelse = next;
                }
                if !orelse.is_empty() {
                    conditions.push(QueryNode::empty());
                }
            }
            Some(Stmt::While { test, orelse, .. }) => {
                conditions.push(test.clone().into());
                if !orelse.is_empty() {
                    conditions.push(QueryNode::empty());
                }
            }
            _ => {}
        }
        conditions
    }

    /// One block per branch of the `if` chain, `while` or `for` this node
    /// stands for, each as a program of its own. A final `else` adds its
    /// block.
    pub fn find_bodies(&self) -> Vec<QueryNode> {
        let mut bodies = Vec::new();
        match self.statement() {
            Some(Stmt::If { body, orelse, .. }) => {
                bodies.push(block(body));
                let mut orelse = orelse;
                while let [Stmt::If { body, orelse: next, .. }] = orelse.as_slice() {
                    bodies.push(block(body));
                    orelse = next;
                }
                if !orelse.is_empty() {
                    bodies.push(block(orelse));
                }
            }
            Some(Stmt::While { body, orelse, .. } | Stmt::For { body, orelse, .. }) => {
                bodies.push(block(body));
                if !orelse.is_empty() {
                    bodies.push(block(orelse));
                }
            }
            _ => {}
        }
        bodies
    }

    // Pattern matching

    pub fn find_matches(&self) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::Match { .. }))
    }

    pub fn find_match_subject(&self) -> QueryNode {
        match self.statement() {
            Some(Stmt::Match { subject, .. }) => subject.clone().into(),
            _ => QueryNode::empty(),
        }
    }

    /// The `case` clauses of the `match` this node stands for, in order.
    pub fn find_match_cases(&self) -> Vec<QueryNode> {
        match self.statement() {
            Some(Stmt::Match { cases, .. }) => cases.iter().cloned().map(QueryNode::from).collect(),
            _ => Vec::new(),
        }
    }

    pub fn find_case_pattern(&self) -> QueryNode {
        match self.tree() {
            Some(Syntax::Case(case)) => case.pattern.clone().into(),
            _ => QueryNode::empty(),
        }
    }

    /// The guard of this `case`; empty when it has none.
    pub fn find_case_guard(&self) -> QueryNode {
        match self.tree() {
            Some(Syntax::Case(case)) => case.guard.clone().into(),
            _ => QueryNode::empty(),
        }
    }

    pub fn find_case_body(&self) -> QueryNode {
        match self.tree() {
            Some(Syntax::Case(case)) => block(&case.body),
            _ => QueryNode::empty(),
        }
    }
}
