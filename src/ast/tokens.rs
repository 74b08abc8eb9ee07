use std::fmt;

/// A lexical token of Python source.
///
/// Keywords get their own variants. Soft keywords (`match`, `case`, `_`)
/// stay [`Token::Name`] and are recognized by the parser from context.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Identifier
    ///
    /// # Examples
    /// ```text
    /// x
    /// _private
    /// match
    /// ```
    Name(String),

    /// Integer literal in any radix, with underscores removed
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0x2A
    /// 1_000
    /// ```
    Int(i128),

    /// Integer literal too large for `i128`, as decimal digits
    BigInt(String),

    /// Floating-point literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e-5
    /// .5
    /// ```
    Float(f64),

    /// Imaginary literal, holding the coefficient of `j`
    ///
    /// # Examples
    /// ```text
    /// 2j
    /// 1.5J
    /// ```
    Imaginary(f64),

    /// String literal with escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// "tab\tseparated"
    /// r'raw\d'
    /// ```
    Str(String),

    /// Bytes literal with escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// b'\x00\xff'
    /// ```
    Bytes(Vec<u8>),

    /// Formatted string literal.
    ///
    /// `body` is the text between the quotes exactly as written.
    ///
    /// # Examples
    /// ```text
    /// f'{name}!'
    /// rf"\d{count}"
    /// ```
    FString { body: String, raw: bool },

    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `%`
    Percent,
    /// `@`
    At,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `&`
    Amper,
    /// `|`
    VBar,
    /// `^`
    Circumflex,
    /// `~`
    Tilde,
    /// `:=`
    ColonEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqEqual,
    /// `!=`
    NotEqual,

    // Augmented assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    DoubleStarEqual,
    SlashEqual,
    DoubleSlashEqual,
    PercentEqual,
    AtEqual,
    LeftShiftEqual,
    RightShiftEqual,
    AmperEqual,
    VBarEqual,
    CircumflexEqual,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `=`
    Equal,
    /// `->`
    Arrow,
    /// `...`
    Ellipsis,

    // Layout
    /// End of a logical line
    Newline,
    /// Indentation increased
    Indent,
    /// Indentation decreased by one level
    Dedent,
    /// End of input
    Eof,
}

impl Token {
    /// The keyword spelled `word`, if it is one.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "False" => Token::False,
            "None" => Token::None,
            "True" => Token::True,
            "and" => Token::And,
            "as" => Token::As,
            "assert" => Token::Assert,
            "async" => Token::Async,
            "await" => Token::Await,
            "break" => Token::Break,
            "class" => Token::Class,
            "continue" => Token::Continue,
            "def" => Token::Def,
            "del" => Token::Del,
            "elif" => Token::Elif,
            "else" => Token::Else,
            "except" => Token::Except,
            "finally" => Token::Finally,
            "for" => Token::For,
            "from" => Token::From,
            "global" => Token::Global,
            "if" => Token::If,
            "import" => Token::Import,
            "in" => Token::In,
            "is" => Token::Is,
            "lambda" => Token::Lambda,
            "nonlocal" => Token::Nonlocal,
            "not" => Token::Not,
            "or" => Token::Or,
            "pass" => Token::Pass,
            "raise" => Token::Raise,
            "return" => Token::Return,
            "try" => Token::Try,
            "while" => Token::While,
            "with" => Token::With,
            "yield" => Token::Yield,
            _ => return None,
        };
        Some(token)
    }

    /// The operator or delimiter spelled `text`, if it is one.
    pub fn operator(text: &str) -> Option<Token> {
        let token = match text {
            "**=" => Token::DoubleStarEqual,
            "//=" => Token::DoubleSlashEqual,
            "<<=" => Token::LeftShiftEqual,
            ">>=" => Token::RightShiftEqual,
            "..." => Token::Ellipsis,
            "**" => Token::DoubleStar,
            "//" => Token::DoubleSlash,
            "<<" => Token::LeftShift,
            ">>" => Token::RightShift,
            "<=" => Token::LessEqual,
            ">=" => Token::GreaterEqual,
            "==" => Token::EqEqual,
            "!=" => Token::NotEqual,
            "->" => Token::Arrow,
            ":=" => Token::ColonEqual,
            "+=" => Token::PlusEqual,
            "-=" => Token::MinusEqual,
            "*=" => Token::StarEqual,
            "/=" => Token::SlashEqual,
            "%=" => Token::PercentEqual,
            "@=" => Token::AtEqual,
            "&=" => Token::AmperEqual,
            "|=" => Token::VBarEqual,
            "^=" => Token::CircumflexEqual,
            "+" => Token::Plus,
            "-" => Token::Minus,
            "*" => Token::Star,
            "/" => Token::Slash,
            "%" => Token::Percent,
            "@" => Token::At,
            "&" => Token::Amper,
            "|" => Token::VBar,
            "^" => Token::Circumflex,
            "~" => Token::Tilde,
            "<" => Token::Less,
            ">" => Token::Greater,
            "=" => Token::Equal,
            "." => Token::Dot,
            "," => Token::Comma,
            ":" => Token::Colon,
            ";" => Token::Semicolon,
            "(" => Token::LParen,
            ")" => Token::RParen,
            "[" => Token::LBracket,
            "]" => Token::RBracket,
            "{" => Token::LBrace,
            "}" => Token::RBrace,
            _ => return None,
        };
        Some(token)
    }

    /// Source spelling of fixed-text tokens.
    fn spelling(&self) -> Option<&'static str> {
        let text = match self {
            Token::False => "False",
            Token::None => "None",
            Token::True => "True",
            Token::And => "and",
            Token::As => "as",
            Token::Assert => "assert",
            Token::Async => "async",
            Token::Await => "await",
            Token::Break => "break",
            Token::Class => "class",
            Token::Continue => "continue",
            Token::Def => "def",
            Token::Del => "del",
            Token::Elif => "elif",
            Token::Else => "else",
            Token::Except => "except",
            Token::Finally => "finally",
            Token::For => "for",
            Token::From => "from",
            Token::Global => "global",
            Token::If => "if",
            Token::Import => "import",
            Token::In => "in",
            Token::Is => "is",
            Token::Lambda => "lambda",
            Token::Nonlocal => "nonlocal",
            Token::Not => "not",
            Token::Or => "or",
            Token::Pass => "pass",
            Token::Raise => "raise",
            Token::Return => "return",
            Token::Try => "try",
            Token::While => "while",
            Token::With => "with",
            Token::Yield => "yield",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::DoubleStar => "**",
            Token::Slash => "/",
            Token::DoubleSlash => "//",
            Token::Percent => "%",
            Token::At => "@",
            Token::LeftShift => "<<",
            Token::RightShift => ">>",
            Token::Amper => "&",
            Token::VBar => "|",
            Token::Circumflex => "^",
            Token::Tilde => "~",
            Token::ColonEqual => ":=",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::EqEqual => "==",
            Token::NotEqual => "!=",
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::DoubleStarEqual => "**=",
            Token::SlashEqual => "/=",
            Token::DoubleSlashEqual => "//=",
            Token::PercentEqual => "%=",
            Token::AtEqual => "@=",
            Token::LeftShiftEqual => "<<=",
            Token::RightShiftEqual => ">>=",
            Token::AmperEqual => "&=",
            Token::VBarEqual => "|=",
            Token::CircumflexEqual => "^=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Semicolon => ";",
            Token::Equal => "=",
            Token::Arrow => "->",
            Token::Ellipsis => "...",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.spelling() {
            return write!(f, "'{text}'");
        }
        match self {
            Token::Name(name) => write!(f, "name '{name}'"),
            Token::Int(value) => write!(f, "number {value}"),
            Token::BigInt(digits) => write!(f, "number {digits}"),
            Token::Float(value) => write!(f, "number {value}"),
            Token::Imaginary(value) => write!(f, "number {value}j"),
            Token::Str(_) | Token::FString { .. } => write!(f, "string literal"),
            Token::Bytes(_) => write!(f, "bytes literal"),
            Token::Newline => write!(f, "end of line"),
            Token::Indent => write!(f, "indent"),
            Token::Dedent => write!(f, "dedent"),
            Token::Eof => write!(f, "end of input"),
            _ => write!(f, "{self:?}"),
        }
    }
}
