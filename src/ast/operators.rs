use super::Token;

/// Boolean operators joining two or more operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mult,
    /// `@`
    MatMult,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<<`
    LShift,
    /// `>>`
    RShift,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `//`
    FloorDiv,
}

impl Operator {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::MatMult => "@",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::FloorDiv => "//",
        }
    }

    /// The operator an augmented assignment token applies, e.g. `+=` gives `Add`.
    pub fn from_augmented(token: &Token) -> Option<Operator> {
        let op = match token {
            Token::PlusEqual => Operator::Add,
            Token::MinusEqual => Operator::Sub,
            Token::StarEqual => Operator::Mult,
            Token::AtEqual => Operator::MatMult,
            Token::SlashEqual => Operator::Div,
            Token::PercentEqual => Operator::Mod,
            Token::DoubleStarEqual => Operator::Pow,
            Token::LeftShiftEqual => Operator::LShift,
            Token::RightShiftEqual => Operator::RShift,
            Token::VBarEqual => Operator::BitOr,
            Token::CircumflexEqual => Operator::BitXor,
            Token::AmperEqual => Operator::BitAnd,
            Token::DoubleSlashEqual => Operator::FloorDiv,
            _ => return None,
        };
        Some(op)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `~`
    Invert,
    /// `not`
    Not,
    /// `+`
    UAdd,
    /// `-`
    USub,
}

/// Comparison operators, chained in [`crate::ast::Expr::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}
