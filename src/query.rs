//! # Structural queries over Python code
//!
//! A [`QueryNode`] wraps one piece of syntax, or nothing at all, and offers
//! a chainable API for finding things inside it and asking questions about
//! them.
//!
//! ## Architecture Overview
//!
//! - **node** - The [`QueryNode`] wrapper, the [`Syntax`] it holds and
//!   positional access
//! - **equivalence** - Deciding whether two fragments are the same code
//! - **walk** - Expression and statement traversal shared by the finders
//! - **navigate** - Functions, classes, variables, calls, imports, returns
//! - **chains** - `if`/`elif`/`else`, loops with `else`, `match`/`case`
//! - **inspect** - Comprehensions, decorators, signatures, base classes
//! - **order** - Statement ordering and containment
//!
//! ## Absence
//!
//! A finder that finds nothing returns an empty node (or an empty `Vec`)
//! rather than an error. Every method is defined on an empty node, so a
//! chain of lookups never has to stop and check:
//!
//! ```
//! use py_query::QueryNode;
//!
//! let code = QueryNode::parse("def f():\n    return 1\n").unwrap();
//! let missing = code.find_function("g").find_variable("x");
//! assert!(missing.is_empty());
//! assert!(!missing.is_equivalent("x = 1").unwrap());
//! ```
//!
//! Only bad positional access and unparsable caller text are errors.
//!
//! ## Equivalence
//!
//! Fragments are compared by canonical text. Both sides are rendered,
//! parsed and rendered again, one line group per top-level statement, so
//! layout, comments, redundant parentheses and quote style never matter:
//!
//! ```
//! use py_query::QueryNode;
//!
//! let code = QueryNode::parse("total = (price*2)  # doubled").unwrap();
//! assert!(code.is_equivalent("total = price * 2").unwrap());
//! assert!(!code.is_equivalent("total = price * 3").unwrap());
//! ```

mod chains;
mod equivalence;
mod inspect;
mod navigate;
mod node;
mod order;
mod walk;

pub use equivalence::Fragment;
pub use node::{QueryError, QueryNode, Syntax};
