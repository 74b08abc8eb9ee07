pub mod ast;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod render;
pub mod value;

pub use ast::{Expr, MatchCase, Module, Pattern, Stmt, Token};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser, parse, parse_case, parse_pattern};
pub use query::{Fragment, QueryError, QueryNode, Syntax};
pub use render::{Renderer, unparse};
pub use value::Value;
