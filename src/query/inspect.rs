use super::{
    equivalence::Expected,
    node::{QueryError, QueryNode, Syntax},
};
use crate::{
    ast::{Comprehension, Expr, Stmt},
    parser, render,
};

/// The parts of a list, set, dict or generator comprehension.
struct CompView<'a> {
    key: Option<&'a Expr>,
    value: &'a Expr,
    generators: &'a [Comprehension],
}

impl<'a> CompView<'a> {
    fn of(expr: &'a Expr) -> Option<Self> {
        match expr {
            Expr::ListComp { elt, generators }
            | Expr::SetComp { elt, generators }
            | Expr::GeneratorExp { elt, generators } => Some(CompView {
                key: None,
                value: elt,
                generators,
            }),
            Expr::DictComp {
                key,
                value,
                generators,
            } => Some(CompView {
                key: Some(&**key),
                value,
                generators,
            }),
            _ => None,
        }
    }
}

/// Decorator name without call arguments: `@app.route("/")` is `app.route`.
fn decorator_name(decorator: &Expr) -> Option<String> {
    match decorator {
        Expr::Call { func, .. } => func.dotted_name(),
        other => other.dotted_name(),
    }
}

impl QueryNode {
    /// The comprehension this node is, or assigns, returns or evaluates.
    fn comprehension(&self) -> Option<CompView<'_>> {
        let expr = match self.tree() {
            Some(Syntax::Expr(expr)) => Some(expr),
            _ => match self.statement()? {
                Stmt::Assign { value, .. } | Stmt::Expr(value) => Some(value),
                Stmt::AnnAssign { value, .. } | Stmt::Return(value) => value.as_ref(),
                _ => None,
            },
        };
        expr.and_then(CompView::of)
    }

    // Comprehensions

    /// Iterables of each `for` clause, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("pairs = [(a, b) for a in xs for b in ys if a != b]").unwrap();
    /// let iters = code.find_comp_iters();
    /// assert!(iters[0].is_equivalent("xs").unwrap());
    /// assert!(iters[1].is_equivalent("ys").unwrap());
    /// assert!(code.find_comp_ifs()[0].is_equivalent("a != b").unwrap());
    /// ```
    pub fn find_comp_iters(&self) -> Vec<QueryNode> {
        self.comprehension()
            .map(|comp| {
                comp.generators
                    .iter()
                    .map(|generator| QueryNode::from(generator.iter.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Loop variables of each `for` clause, in order.
    pub fn find_comp_targets(&self) -> Vec<QueryNode> {
        self.comprehension()
            .map(|comp| {
                comp.generators
                    .iter()
                    .map(|generator| QueryNode::from(generator.target.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every filter condition, across all `for` clauses, left to right.
    pub fn find_comp_ifs(&self) -> Vec<QueryNode> {
        self.comprehension()
            .map(|comp| {
                comp.generators
                    .iter()
                    .flat_map(|generator| &generator.ifs)
                    .cloned()
                    .map(QueryNode::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The produced element; the value for a dict comprehension.
    pub fn find_comp_expr(&self) -> QueryNode {
        self.comprehension().map(|comp| comp.value.clone()).into()
    }

    /// The key of a dict comprehension.
    pub fn find_comp_key(&self) -> QueryNode {
        self.comprehension().and_then(|comp| comp.key.cloned()).into()
    }

    // Decorators

    pub fn find_decorators(&self) -> Vec<QueryNode> {
        let decorators = match self.statement() {
            Some(Stmt::FunctionDef(def)) => &def.decorator_list,
            Some(Stmt::ClassDef(class)) => &class.decorator_list,
            _ => return Vec::new(),
        };
        decorators.iter().cloned().map(QueryNode::from).collect()
    }

    /// True when the function carries every decorator in `names`, in any
    /// order. Decorators are named by their dotted path without arguments.
    pub fn has_decorators(&self, names: &[&str]) -> bool {
        let Some(def) = self.function_def() else {
            return false;
        };
        let present: Vec<String> = def.decorator_list.iter().filter_map(decorator_name).collect();
        names.iter().all(|name| present.iter().any(|found| found == name))
    }

    // Signatures and classes

    /// True when the function's parameter list is equivalent to
    /// `signature`, the text between the parentheses of a `def`.
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("def greet(name, greeting='hi'):\n    pass\n").unwrap();
    /// let greet = code.find_function("greet");
    /// assert!(greet.has_args("name, greeting = \"hi\"").unwrap());
    /// assert!(!greet.has_args("name").unwrap());
    /// ```
    pub fn has_args(&self, signature: &str) -> Result<bool, QueryError> {
        let Some(Stmt::FunctionDef(def)) = self.statement() else {
            return Ok(false);
        };
        let probe = parser::parse(&format!("def _({signature}): pass"))?;
        let Some(Stmt::FunctionDef(probe)) = probe.body.into_iter().next() else {
            return Ok(false);
        };
        let mut rewritten = def.clone();
        rewritten.args = probe.args;
        let expected = Expected::program(&render::unparse_stmt(&Stmt::FunctionDef(rewritten)))?;
        Ok(expected.matches_stmt(&Stmt::FunctionDef(def.clone()))?)
    }

    /// True when the function declares a return annotation equivalent to
    /// `annotation`.
    pub fn has_returns(&self, annotation: &str) -> Result<bool, QueryError> {
        let Some(returns) = self.function_def().and_then(|def| def.returns.as_ref()) else {
            return Ok(false);
        };
        Ok(Expected::program(annotation)?.matches_expr(returns)?)
    }

    /// True when the class lists every name in `bases` among its bases.
    pub fn inherits_from(&self, bases: &[&str]) -> bool {
        let Some(Stmt::ClassDef(class)) = self.statement() else {
            return false;
        };
        let declared: Vec<String> = class.bases.iter().filter_map(Expr::dotted_name).collect();
        bases.iter().all(|base| declared.iter().any(|found| found == base))
    }
}
