//! hoist_ast: syntax tree for the script language.
//!
//! Defines the `SyntaxKind` enum, node and token flags, the arena-allocated
//! node types and a default-walking visitor.

pub mod accessors;
pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
