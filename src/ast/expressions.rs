use super::{BoolOp, CmpOp, Operator, UnaryOp};
use crate::value::Value;

/// Expression nodes.
///
/// # Examples
///
/// ```text
/// a and b                 → BoolOp
/// (y := f(x))             → NamedExpr
/// x ** 2                  → BinOp
/// [i for i in items]      → ListComp
/// obj.method(1, key=2)    → Call
/// data[1:3]               → Subscript with a Slice
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `a or b or c`; always two or more values
    BoolOp { op: BoolOp, values: Vec<Expr> },

    /// Assignment expression `target := value`
    NamedExpr { target: Box<Expr>, value: Box<Expr> },

    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },

    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    Lambda { args: Box<Arguments>, body: Box<Expr> },

    /// Conditional expression `body if test else orelse`
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },

    /// Dictionary display. A `None` key marks a `**mapping` unpacking.
    Dict {
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },

    Set(Vec<Expr>),

    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },

    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },

    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },

    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },

    Await(Box<Expr>),

    Yield(Option<Box<Expr>>),

    YieldFrom(Box<Expr>),

    /// Chained comparison `left op0 c0 op1 c1 ...`
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },

    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },

    /// f-string, including any plain strings implicitly joined to it
    FormattedString(Vec<FStringPart>),

    Constant(Value),

    Attribute { value: Box<Expr>, attr: String },

    Subscript { value: Box<Expr>, slice: Box<Expr> },

    Starred(Box<Expr>),

    Name(String),

    List(Vec<Expr>),

    Tuple(Vec<Expr>),

    /// `lower:upper:step`; only valid as (part of) a subscript
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
}

/// A piece of an f-string. Adjacent literal text is always merged, so two
/// `Literal`s never sit next to each other.
///
/// ```text
/// f'{name!r:>{width}} items'
///   → [Value { name, Some('r'), [Literal(">"), Value { width, None, None }] },
///      Literal(" items")]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    /// Text outside replacement fields, with escapes decoded and `{{`/`}}`
    /// reduced to single braces
    Literal(String),

    /// A replacement field. `{x=}` is stored as the literal `x=` followed by
    /// a field converted with `!r`, which is what it evaluates to.
    Value {
        value: Box<Expr>,
        conversion: Option<char>,
        format_spec: Option<Vec<FStringPart>>,
    },
}

impl Expr {
    /// Dotted spelling of a name or attribute chain.
    ///
    /// `os.path.join` gives `Some("os.path.join")`; anything that is not a
    /// plain chain of names, such as `f().x`, gives `None`.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Name(id) => Some(id.clone()),
            Expr::Attribute { value, attr } => {
                let owner = value.dotted_name()?;
                Some(format!("{owner}.{attr}"))
            }
            _ => None,
        }
    }
}

/// One `for ... in ... if ...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

/// Keyword argument of a call or class definition.
///
/// `arg` is `None` for `**kwargs` unpacking.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

/// Parameter list of a function or lambda.
///
/// `defaults` lines up with the *last* entries of `posonlyargs` followed by
/// `args`. `kw_defaults` has exactly one entry per keyword-only parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    pub posonlyargs: Vec<Arg>,
    pub args: Vec<Arg>,
    pub vararg: Option<Arg>,
    pub kwonlyargs: Vec<Arg>,
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<Arg>,
    pub defaults: Vec<Expr>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.posonlyargs.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.kwonlyargs.is_empty()
            && self.kwarg.is_none()
    }
}

/// A single parameter with its optional annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
    pub annotation: Option<Expr>,
}
