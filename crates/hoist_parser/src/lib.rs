//! hoist_parser: recursive descent parser for the script language.
//!
//! Consumes tokens from the scanner and builds an arena-allocated AST.
//! Syntax outside the supported subset is parsed far enough to recover and
//! reported as a `'{0}' is not supported.` diagnostic.

mod parser;
mod precedence;

pub use parser::{parse_script, Parser};
