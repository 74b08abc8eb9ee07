use super::Expr;
use crate::value::Value;

/// Structural patterns of `case` clauses.
///
/// # Examples
///
/// ```text
/// case 0 | 1:                 → MatchOr([MatchValue(0), MatchValue(1)])
/// case [first, *rest]:        → MatchSequence([MatchAs(first), MatchStar(rest)])
/// case {"id": id, **extra}:   → MatchMapping
/// case Point(x=0, y=y):       → MatchClass
/// case _:                     → MatchAs { pattern: None, name: None }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Literal or dotted value compared with `==`
    MatchValue(Expr),

    /// `None`, `True` or `False`, compared with `is`
    MatchSingleton(Value),

    MatchSequence(Vec<Pattern>),

    MatchMapping {
        keys: Vec<Expr>,
        patterns: Vec<Pattern>,
        rest: Option<String>,
    },

    MatchClass {
        cls: Expr,
        patterns: Vec<Pattern>,
        kwd_attrs: Vec<String>,
        kwd_patterns: Vec<Pattern>,
    },

    /// `*name` inside a sequence; `None` for `*_`
    MatchStar(Option<String>),

    /// Capture (`name`), wildcard (`_`) or `pattern as name`
    MatchAs {
        pattern: Option<Box<Pattern>>,
        name: Option<String>,
    },

    MatchOr(Vec<Pattern>),
}
