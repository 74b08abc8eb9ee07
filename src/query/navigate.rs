use super::{
    equivalence::Expected,
    node::{QueryError, QueryNode, Syntax},
    walk::{statement_heads, walk_expr, walk_stmt_deep},
};
use crate::{
    ast::{Expr, FunctionDef, Module, Stmt, UnaryOp},
    value::Value,
};

/// Whether an assignment target binds `name`, which may be dotted
/// (`self.count`). Tuple and list targets bind each of their elements.
fn binds(target: &Expr, name: &str) -> bool {
    match target {
        Expr::Tuple(elements) | Expr::List(elements) => {
            elements.iter().any(|element| binds(element, name))
        }
        Expr::Starred(value) => binds(value, name),
        target => target.dotted_name().is_some_and(|dotted| dotted == name),
    }
}

/// Whether a call's callee is `name`: the bare name, the attribute name
/// of a method call, or the full dotted path.
pub(super) fn calls(func: &Expr, name: &str) -> bool {
    match func {
        Expr::Name(id) => id == name,
        Expr::Attribute { attr, .. } => {
            attr == name || func.dotted_name().is_some_and(|dotted| dotted == name)
        }
        _ => false,
    }
}

/// A literal right-hand side. Negated numbers count as literals.
fn literal(value: &Expr) -> Option<Value> {
    match value {
        Expr::Constant(value) => Some(value.clone()),
        Expr::UnaryOp {
            op: UnaryOp::USub,
            operand,
        } => match operand.as_ref() {
            Expr::Constant(Value::Int(n)) => Some(Value::Int(-n)),
            Expr::Constant(Value::BigInt(digits)) => Some(Value::BigInt(format!("-{digits}"))),
            Expr::Constant(Value::Float(n)) => Some(Value::Float(-n)),
            Expr::Constant(Value::Complex(n)) => Some(Value::Complex(-n)),
            _ => None,
        },
        _ => None,
    }
}

/// The value assigned by a plain or annotated assignment.
fn assigned_value(stmt: &Stmt) -> Option<&Expr> {
    match stmt {
        Stmt::Assign { value, .. } => Some(value),
        Stmt::AnnAssign { value, .. } => value.as_ref(),
        _ => None,
    }
}

fn assigns(stmt: &Stmt, name: &str) -> bool {
    match stmt {
        Stmt::Assign { targets, .. } => targets.iter().any(|target| binds(target, name)),
        Stmt::AnnAssign { target, .. } => binds(target, name),
        _ => false,
    }
}

impl QueryNode {
    pub(super) fn find_stmt(&self, predicate: impl Fn(&Stmt) -> bool) -> QueryNode {
        self.body().iter().find(|stmt| predicate(stmt)).cloned().into()
    }

    pub(super) fn find_stmts(&self, predicate: impl Fn(&Stmt) -> bool) -> Vec<QueryNode> {
        self.body()
            .iter()
            .filter(|stmt| predicate(stmt))
            .cloned()
            .map(QueryNode::from)
            .collect()
    }

    /// The function definition this node stands for.
    pub(super) fn function_def(&self) -> Option<&FunctionDef> {
        match self.statement() {
            Some(Stmt::FunctionDef(def)) => Some(def),
            _ => None,
        }
    }

    // Functions and classes

    /// The first function named `name` in this block, `async` or not.
    ///
    /// # Examples
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("def area(r):\n    return 3 * r * r\n").unwrap();
    /// let area = code.find_function("area");
    /// assert!(area.has_return("3 * r * r").unwrap());
    /// assert!(code.find_function("volume").is_empty());
    /// ```
    pub fn find_function(&self, name: &str) -> QueryNode {
        self.find_stmt(|stmt| matches!(stmt, Stmt::FunctionDef(def) if def.name == name))
    }

    pub fn find_async_function(&self, name: &str) -> QueryNode {
        self.find_stmt(|stmt| matches!(stmt, Stmt::FunctionDef(def) if def.is_async && def.name == name))
    }

    /// Every function named `name`, such as a property's getter and setter.
    pub fn find_functions(&self, name: &str) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::FunctionDef(def) if def.name == name))
    }

    pub fn has_function(&self, name: &str) -> bool {
        !self.find_function(name).is_empty()
    }

    pub fn find_class(&self, name: &str) -> QueryNode {
        self.find_stmt(|stmt| matches!(stmt, Stmt::ClassDef(class) if class.name == name))
    }

    pub fn has_class(&self, name: &str) -> bool {
        !self.find_class(name).is_empty()
    }

    // Variables

    /// The first assignment to `name` in this block. Dotted names such as
    /// `self.total` match attribute targets.
    pub fn find_variable(&self, name: &str) -> QueryNode {
        self.find_stmt(|stmt| assigns(stmt, name))
    }

    /// Every assignment to `name`, annotated declarations without a value
    /// included.
    pub fn find_variables(&self, name: &str) -> Vec<QueryNode> {
        self.find_stmts(|stmt| assigns(stmt, name))
    }

    pub fn has_variable(&self, name: &str) -> bool {
        !self.find_variable(name).is_empty()
    }

    /// The first augmented assignment (`name += ...`) to `name`.
    pub fn find_aug_variable(&self, name: &str) -> QueryNode {
        self.find_stmt(|stmt| matches!(stmt, Stmt::AugAssign { target, .. } if binds(target, name)))
    }

    /// The literal assigned to `name`, if its first assignment has one.
    ///
    /// A negated number counts as a literal. `limit = -3` gives
    /// `Value::Int(-3)` even though the tree, like Python's own `ast`,
    /// holds unary minus applied to the constant `3`. Integers too large
    /// for `i128` come back as [`Value::BigInt`].
    ///
    /// ```
    /// use py_query::{QueryNode, Value};
    ///
    /// let code = QueryNode::parse("limit = -3\nname = input()\n").unwrap();
    /// assert_eq!(code.get_variable("limit"), Some(Value::Int(-3)));
    /// assert_eq!(code.get_variable("name"), None);
    /// ```
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        let found = self.find_variable(name);
        found.statement().and_then(assigned_value).and_then(literal)
    }

    /// True when this node is an assignment of an integer literal, negated
    /// or not.
    pub fn is_integer(&self) -> bool {
        self.statement()
            .and_then(assigned_value)
            .and_then(literal)
            .is_some_and(|value| value.is_int())
    }

    /// True when this node is an assignment whose value is a call to `name`.
    pub fn value_is_call(&self, name: &str) -> bool {
        matches!(
            self.statement().and_then(assigned_value),
            Some(Expr::Call { func, .. }) if calls(func, name)
        )
    }

    // Blocks

    /// This node's block as a program of its own.
    pub fn find_body(&self) -> QueryNode {
        match self.tree().and_then(Syntax::body) {
            Some(body) => Module::new(body.to_vec()).into(),
            None => QueryNode::empty(),
        }
    }

    /// True when the block holds a `pass`. Always false on an `if`, loop,
    /// `try` or `match` itself; ask one of its bodies instead.
    pub fn has_pass(&self) -> bool {
        let construct = matches!(
            self.tree(),
            Some(Syntax::Stmt(
                Stmt::If { .. } | Stmt::For { .. } | Stmt::While { .. } | Stmt::Try { .. } | Stmt::Match { .. }
            ))
        );
        !construct && self.body().iter().any(|stmt| matches!(stmt, Stmt::Pass))
    }

    pub fn find_return(&self) -> QueryNode {
        self.find_stmt(|stmt| matches!(stmt, Stmt::Return(_)))
    }

    /// True when the block's first `return` returns code equivalent to
    /// `value`.
    pub fn has_return(&self, value: &str) -> Result<bool, QueryError> {
        let found = self.find_return();
        let Some(Stmt::Return(Some(returned))) = found.statement() else {
            return Ok(false);
        };
        Ok(Expected::program(value)?.matches_expr(returned)?)
    }

    // Imports

    pub fn find_imports(&self) -> Vec<QueryNode> {
        self.find_stmts(|stmt| matches!(stmt, Stmt::Import(_) | Stmt::ImportFrom { .. }))
    }

    /// True when some import in the block is equivalent to `import`.
    pub fn has_import(&self, import: &str) -> Result<bool, QueryError> {
        let expected = Expected::program(import)?;
        for stmt in self.body() {
            if matches!(stmt, Stmt::Import(_) | Stmt::ImportFrom { .. }) && expected.matches_stmt(stmt)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // Calls

    /// Every call expression in the heads of this block's statements.
    fn visible_calls(&self) -> Vec<&Expr> {
        let heads: Vec<&Expr> = match self.tree() {
            Some(Syntax::Expr(expr)) => vec![expr],
            Some(Syntax::Stmt(stmt)) if stmt.body().is_none() => statement_heads(stmt),
            _ => self.body().iter().flat_map(statement_heads).collect(),
        };
        let mut found = Vec::new();
        for head in heads {
            walk_expr(head, &mut |expr| {
                if matches!(expr, Expr::Call { .. }) {
                    found.push(expr);
                }
            });
        }
        found
    }

    /// Calls to `name` in this block, not looking inside nested blocks.
    ///
    /// `name` matches a plain call `name(...)`, a method call
    /// `obj.name(...)` or the full dotted path `mod.name`.
    pub fn find_calls(&self, name: &str) -> Vec<QueryNode> {
        self.visible_calls()
            .into_iter()
            .filter(|call| matches!(call, Expr::Call { func, .. } if calls(func, name)))
            .cloned()
            .map(QueryNode::from)
            .collect()
    }

    /// True when this block calls `call`: either a callee name, or a whole
    /// call such as `print("hi", end="")` compared by equivalence.
    pub fn has_call(&self, call: &str) -> Result<bool, QueryError> {
        let parsed = crate::parser::parse(call)?;
        if let [Stmt::Expr(callee)] = parsed.body.as_slice() {
            if let Some(name) = callee.dotted_name() {
                return Ok(!self.find_calls(&name).is_empty());
            }
        }
        let expected = Expected::program(call)?;
        for found in self.visible_calls() {
            if expected.matches_expr(found)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True when a call to `name` appears anywhere below this node, nested
    /// blocks included.
    pub fn block_has_call(&self, name: &str) -> bool {
        let mut found = false;
        let mut check = |expr: &Expr| {
            if let Expr::Call { func, .. } = expr {
                found |= calls(func, name);
            }
        };
        match self.tree() {
            Some(Syntax::Expr(expr)) => walk_expr(expr, &mut check),
            Some(Syntax::Stmt(stmt)) => walk_stmt_deep(stmt, &mut check),
            _ => {
                for stmt in self.body() {
                    walk_stmt_deep(stmt, &mut check);
                }
            }
        }
        found
    }

    /// Positional arguments of the call this node stands for.
    pub fn find_call_args(&self) -> Vec<QueryNode> {
        match self.expression() {
            Some(Expr::Call { args, .. }) => args.iter().cloned().map(QueryNode::from).collect(),
            _ => Vec::new(),
        }
    }
}
