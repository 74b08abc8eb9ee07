use std::fmt;

/// A Python literal constant.
///
/// This is the payload of [`crate::ast::Expr::Constant`] and what
/// [`crate::QueryNode::get_variable`] hands back for a literal right-hand
/// side.
///
/// # Examples
///
/// ```
/// use py_query::Value;
///
/// let answer = Value::Int(42);
/// assert_eq!(answer.to_string(), "42");
///
/// let greeting = Value::Str("it's".to_string());
/// assert_eq!(greeting.to_string(), "\"it's\"");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `None`
    None,

    /// `True` / `False`
    Bool(bool),

    /// Integer literal
    Int(i128),

    /// Integer beyond the `i128` range, as decimal digits with an optional
    /// leading `-`
    BigInt(String),

    /// Float literal
    Float(f64),

    /// Imaginary literal; holds the coefficient of `j`
    Complex(f64),

    /// String literal
    Str(String),

    /// Bytes literal
    Bytes(Vec<u8>),

    /// `...`
    Ellipsis,
}

impl Value {
    /// Name of the Python type of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Ellipsis => "ellipsis",
        }
    }

    /// Check if the value is truthy, as `bool(value)` would decide.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::BigInt(_) => true,
            Value::Float(n) | Value::Complex(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Ellipsis => true,
        }
    }

    /// True for `int` literals only; `True` and `False` are not integers here.
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::BigInt(digits) => digits.parse().ok(),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    ///
    /// Integers outside the 64-bit range become floats. Literals with no JSON
    /// counterpart (complex, bytes, `...`) become their Python spelling.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Number, Value as Json};

        let float = |n: f64| Number::from_f64(n).map_or(Json::Null, Json::Number);
        match self {
            Value::None => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => {
                if let Ok(small) = i64::try_from(*n) {
                    Json::Number(small.into())
                } else if let Ok(unsigned) = u64::try_from(*n) {
                    Json::Number(unsigned.into())
                } else {
                    float(*n as f64)
                }
            }
            Value::Float(n) => float(*n),
            Value::BigInt(digits) => digits.parse().map_or(Json::Null, float),
            Value::Str(s) => Json::String(s.clone()),
            Value::Complex(_) | Value::Bytes(_) | Value::Ellipsis => Json::String(self.to_string()),
        }
    }
}

/// Formats the value the way Python's `repr` spells the literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::literal(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
