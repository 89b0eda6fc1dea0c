//! hoist_binder: binding tables, the scope chain and the hoisting pre-scan.
//!
//! Scopes own binding tables keyed by interned names. The chain is a linked
//! list of `Rc<RefCell<Scope>>`, so a closure keeps its defining scopes alive
//! by holding on to the innermost one. The binder is generic over the value
//! type stored in a binding; the evaluator instantiates it with its `Value`.

mod binding;
mod error;
mod hoist;
mod scope;

pub use binding::{Binding, BindingTable, DeclarationKind, LifecycleState, Name};
pub use error::ScopeError;
pub use hoist::{hoist_case_block, hoist_declarations, HoistedDeclarations, LexicalDeclaration};
pub use scope::{Scope, ScopeChain, ScopeKind, ScopeRef};
