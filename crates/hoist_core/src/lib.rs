//! hoist_core: Core utilities shared by every stage of the hoist evaluator.
//!
//! Provides string interning for identifiers, source positions and line maps,
//! and the bump arena that owns a script's syntax tree.

pub mod arena;
pub mod intern;
pub mod text;

pub use arena::ScriptArena;
pub use intern::{InternedString, StringInterner};
pub use text::{LineAndColumn, LineMap, TextRange, TextSpan};
