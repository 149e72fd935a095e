//! Parser for the `.lode` declarative module format.
//!
//! A `.lode` file is a flat, Python-flavored namespace declaration: an
//! optional module docstring, constant bindings, and `class` blocks whose
//! bodies hold class-level constants.
//!
//! ```text
//! """Network defaults."""
//!
//! TIMEOUT = 2.5
//! PORTS = [80, 443]
//!
//! class Endpoint:
//!     KIND = "http"
//! ```
//!
//! Parsing produces a [`ParsedModule`] — a list of statements the resolver's
//! executor folds into a module namespace. Syntax errors carry 1-indexed
//! line and column positions.

pub mod error;
pub mod parse;

pub use error::ParseError;
pub use parse::{parse, ParsedModule, Stmt};
