//! Resolution and lifecycle errors.

use thiserror::Error;

/// A scope rule violation. Each variant carries the identifier involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Identifier '{0}' has already been declared")]
    DuplicateDeclaration(String),

    #[error("{0} is not defined")]
    UnresolvedIdentifier(String),

    #[error("Cannot access '{0}' before initialization")]
    UninitializedAccess(String),

    #[error("Assignment to constant variable.")]
    AlreadyInitialized(String),

    #[error("{0} is not a function")]
    InvocationOfUninitialized(String),
}

impl ScopeError {
    /// The script-visible error constructor name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScopeError::DuplicateDeclaration(_) => "SyntaxError",
            ScopeError::UnresolvedIdentifier(_) | ScopeError::UninitializedAccess(_) => "ReferenceError",
            ScopeError::AlreadyInitialized(_) | ScopeError::InvocationOfUninitialized(_) => "TypeError",
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ScopeError::DuplicateDeclaration(name)
            | ScopeError::UnresolvedIdentifier(name)
            | ScopeError::UninitializedAccess(name)
            | ScopeError::AlreadyInitialized(name)
            | ScopeError::InvocationOfUninitialized(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ScopeError::DuplicateDeclaration("x".into()).to_string(),
            "Identifier 'x' has already been declared"
        );
        assert_eq!(ScopeError::UnresolvedIdentifier("y".into()).to_string(), "y is not defined");
        assert_eq!(
            ScopeError::UninitializedAccess("z".into()).to_string(),
            "Cannot access 'z' before initialization"
        );
        assert_eq!(
            ScopeError::AlreadyInitialized("PI".into()).to_string(),
            "Assignment to constant variable."
        );
        assert_eq!(ScopeError::InvocationOfUninitialized("f".into()).to_string(), "f is not a function");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ScopeError::DuplicateDeclaration("a".into()).kind_name(), "SyntaxError");
        assert_eq!(ScopeError::UninitializedAccess("a".into()).kind_name(), "ReferenceError");
        assert_eq!(ScopeError::AlreadyInitialized("a".into()).kind_name(), "TypeError");
        assert_eq!(ScopeError::AlreadyInitialized("a".into()).identifier(), "a");
    }
}
