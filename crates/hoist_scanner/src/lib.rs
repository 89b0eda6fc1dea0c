//! hoist_scanner: tokenizer for the script language.
//!
//! Produces one token at a time on demand from the parser. String and
//! template literals are cooked here, so the parser and evaluator only ever
//! see resolved text. Positions are character offsets.

mod char_codes;
mod numeric;
mod scanner;

pub use numeric::parse_numeric_literal;
pub use scanner::{Scanner, ScannerState};
