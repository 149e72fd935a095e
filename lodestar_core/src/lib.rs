//! Core runtime representation for Lodestar.
//!
//! Provides the two building blocks every other crate in the workspace
//! leans on:
//!
//! - [`intern`] — a process-wide string interner handing out cheap
//!   [`InternedString`] keys for attribute and module-name maps.
//! - [`value`] — the [`Value`] enum representing module attributes
//!   (constants, lists, class objects).

pub mod intern;
pub mod value;

pub use intern::{intern, InternedString};
pub use value::{ClassObject, Value};
