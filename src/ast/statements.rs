use super::{Arguments, Expr, Keyword, Operator, Pattern};

/// Statement nodes.
///
/// Compound statements own their nested blocks. An `elif` chain is an
/// [`Stmt::If`] whose `orelse` holds exactly one further `If`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `def` or `async def`
    FunctionDef(FunctionDef),

    ClassDef(ClassDef),

    Return(Option<Expr>),

    Delete(Vec<Expr>),

    /// `a = b = value`; one target per `=`
    Assign { targets: Vec<Expr>, value: Expr },

    /// `target += value` and friends
    AugAssign {
        target: Expr,
        op: Operator,
        value: Expr,
    },

    /// `target: annotation [= value]`
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },

    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
    },

    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        is_async: bool,
    },

    Match { subject: Expr, cases: Vec<MatchCase> },

    Raise {
        exc: Option<Expr>,
        cause: Option<Expr>,
    },

    /// `try` statement; `is_star` marks `except*` handlers
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        is_star: bool,
    },

    Assert { test: Expr, msg: Option<Expr> },

    Import(Vec<Alias>),

    /// `from ..module import names`; `level` counts the leading dots
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
    },

    Global(Vec<String>),

    Nonlocal(Vec<String>),

    /// `type Name[params] = value`
    TypeAlias {
        name: String,
        type_params: Vec<TypeParam>,
        value: Expr,
    },

    /// Expression evaluated for its side effects
    Expr(Expr),

    Pass,

    Break,

    Continue,
}

impl Stmt {
    /// The primary block of a compound statement.
    ///
    /// `match` has no primary block (its blocks belong to its cases), and
    /// simple statements have none at all.
    pub fn body(&self) -> Option<&[Stmt]> {
        match self {
            Stmt::FunctionDef(def) => Some(&def.body),
            Stmt::ClassDef(class) => Some(&class.body),
            Stmt::For { body, .. }
            | Stmt::While { body, .. }
            | Stmt::If { body, .. }
            | Stmt::With { body, .. }
            | Stmt::Try { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Every nested block, in source order.
    pub fn blocks(&self) -> Vec<&[Stmt]> {
        match self {
            Stmt::FunctionDef(def) => vec![def.body.as_slice()],
            Stmt::ClassDef(class) => vec![class.body.as_slice()],
            Stmt::For { body, orelse, .. }
            | Stmt::While { body, orelse, .. }
            | Stmt::If { body, orelse, .. } => vec![body.as_slice(), orelse.as_slice()],
            Stmt::With { body, .. } => vec![body.as_slice()],
            Stmt::Match { cases, .. } => cases.iter().map(|case| case.body.as_slice()).collect(),
            Stmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                let mut blocks = vec![body.as_slice()];
                blocks.extend(handlers.iter().map(|handler| handler.body.as_slice()));
                blocks.push(orelse);
                blocks.push(finalbody);
                blocks
            }
            _ => Vec::new(),
        }
    }
}

/// A function definition, `async` or not.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub args: Arguments,
    pub body: Vec<Stmt>,
    pub decorator_list: Vec<Expr>,
    pub returns: Option<Expr>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub bases: Vec<Expr>,
    pub keywords: Vec<Keyword>,
    pub body: Vec<Stmt>,
    pub decorator_list: Vec<Expr>,
}

/// A generic parameter in `def f[T]`, `class C[T]` or `type A[T] = ...`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeParam {
    /// `T` or `T: bound`
    TypeVar { name: String, bound: Option<Expr> },

    /// `*Ts`
    TypeVarTuple(String),

    /// `**P`
    ParamSpec(String),
}

/// `name [as asname]` in an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

/// `context_expr [as optional_vars]` in a `with` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context_expr: Expr,
    pub optional_vars: Option<Expr>,
}

/// `except [exc_type [as name]]:` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub exc_type: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

/// One `case pattern [if guard]:` arm of a `match` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}
