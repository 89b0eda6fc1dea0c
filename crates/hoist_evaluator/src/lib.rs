//! hoist_evaluator: values, closures, builtins and the evaluator driver.
//!
//! The interpreter walks the arena AST produced by `hoist_parser` and keeps
//! its bindings in a `hoist_binder::ScopeChain<Value>`. Function values hold
//! a handle to the scope they were created in, and arrays, objects and
//! functions are reference counted, so every value borrows from the script
//! arena for `'a` and nothing outlives it.

pub mod builtins;
pub mod console;
pub mod error;
pub mod inspect;
pub mod interpreter;
pub mod number;
pub mod operators;
pub mod value;

pub use console::{BufferConsole, Console, StdoutConsole};
pub use error::{AccessKind, Exception, RuntimeError, Thrown};
pub use inspect::{format_log_args, inspect};
pub use interpreter::{Interpreter, InterpreterOptions};
pub use value::{EvalResult, FunctionRef, Value};
