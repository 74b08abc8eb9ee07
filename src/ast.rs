//! # Python Syntax Tree
//!
//! This module defines the syntax tree produced by [`crate::parser`] and
//! consumed by [`crate::render`] and [`crate::query`].
//!
//! ## Architecture Overview
//!
//! The tree is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (names, calls, literals, comprehensions)
//! - **[operators]** - Boolean, binary, unary and comparison operators
//! - **[statements]** - Statement nodes (definitions, control flow, assignments)
//! - **[patterns]** - Structural patterns used by `match` statements
//! - **[module]** - The top-level sequence of statements
//!
//! ## Shape
//!
//! The node kinds mirror the ones Python's own `ast` module exposes, with
//! two differences:
//!
//! - Nodes carry no source positions. Two trees compare equal with `==`
//!   exactly when they have the same structure, no matter how the code
//!   that produced them was laid out. This holds inside f-string
//!   replacement fields too, which are parsed like any other expression.
//! - Integer constants beyond `i128` keep their exact decimal digits in
//!   [`crate::Value::BigInt`] instead of becoming an arbitrary-precision
//!   number.
//!
//! ## Example
//!
//! ```text
//! x = 1
//! if x == 1:
//!     x = 2
//! ```
//!
//! parses to a [`Module`] with two statements:
//!
//! ```text
//! Module {
//!     body: [
//!         Assign { targets: [Name("x")], value: Constant(Int(1)) },
//!         If {
//!             test: Compare { left: Name("x"), ops: [Eq], comparators: [Constant(Int(1))] },
//!             body: [Assign { targets: [Name("x")], value: Constant(Int(2)) }],
//!             orelse: [],
//!         },
//!     ],
//! }
//! ```

pub mod expressions;
pub mod module;
pub mod operators;
pub mod patterns;
pub mod statements;
pub mod tokens;

pub use expressions::{Arg, Arguments, Comprehension, Expr, FStringPart, Keyword};
pub use module::Module;
pub use operators::{BoolOp, CmpOp, Operator, UnaryOp};
pub use patterns::Pattern;
pub use statements::{
    Alias, ClassDef, ExceptHandler, FunctionDef, MatchCase, Stmt, TypeParam, WithItem,
};
pub use tokens::Token;
