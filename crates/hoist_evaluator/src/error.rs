//! Runtime errors and the exceptions that carry them up the call stack.

use crate::inspect;
use crate::value::{PropertyMap, Value};
use hoist_binder::ScopeError;
use hoist_core::text::TextRange;
use std::fmt;
use thiserror::Error;

/// Whether a nullish property access was a read or a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

fn access_verb(access: &AccessKind) -> &'static str {
    match access {
        AccessKind::Read => "read",
        AccessKind::Write => "set",
    }
}

fn access_gerund(access: &AccessKind) -> &'static str {
    match access {
        AccessKind::Read => "reading",
        AccessKind::Write => "setting",
    }
}

/// An error raised by the evaluator itself, as opposed to a value thrown by
/// the script.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Calling something that is not a function. Carries the callee's source
    /// text.
    #[error("{0} is not a function")]
    NotCallable(String),

    #[error(
        "Cannot {} properties of {base} ({} '{property}')",
        access_verb(.access),
        access_gerund(.access)
    )]
    PropertyOfNullish {
        base: &'static str,
        property: String,
        access: AccessKind,
    },

    /// A strict-mode write to a frozen object or array.
    #[error("Cannot assign to read only property '{0}' of object")]
    FrozenWrite(String),

    #[error("Maximum call stack size exceeded")]
    CallStackOverflow,

    #[error("{0} is not supported")]
    Unsupported(String),

    /// Any other `TypeError`, such as `reduce` on an empty array.
    #[error("{0}")]
    Type(String),

    /// Any other `RangeError`, such as a negative `repeat` count.
    #[error("{0}")]
    Range(String),
}

impl RuntimeError {
    /// The script-visible error constructor name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RuntimeError::Scope(scope) => scope.kind_name(),
            RuntimeError::NotCallable(_)
            | RuntimeError::PropertyOfNullish { .. }
            | RuntimeError::FrozenWrite(_)
            | RuntimeError::Type(_) => "TypeError",
            RuntimeError::CallStackOverflow | RuntimeError::Range(_) => "RangeError",
            RuntimeError::Unsupported(_) => "SyntaxError",
        }
    }
}

/// What is being thrown.
#[derive(Debug, Clone)]
pub enum Thrown<'a> {
    Error(RuntimeError),
    /// A `throw` statement's value.
    Value(Value<'a>),
}

/// An exception propagating toward the nearest `catch`.
#[derive(Debug, Clone)]
pub struct Exception<'a> {
    pub thrown: Thrown<'a>,
    /// Where it was raised, once known.
    pub range: Option<TextRange>,
}

impl<'a> Exception<'a> {
    pub fn thrown_value(value: Value<'a>, range: TextRange) -> Self {
        Self {
            thrown: Thrown::Value(value),
            range: Some(range),
        }
    }

    /// Attach a location unless a more precise one is already set.
    pub fn at(mut self, range: TextRange) -> Self {
        self.range.get_or_insert(range);
        self
    }

    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match &self.thrown {
            Thrown::Error(error) => Some(error),
            Thrown::Value(_) => None,
        }
    }

    /// The error name reported for an uncaught exception. A thrown object
    /// with a string `name` reports that name; other thrown values report
    /// `Uncaught`.
    pub fn kind_name(&self) -> String {
        match &self.thrown {
            Thrown::Error(error) => error.kind_name().to_string(),
            Thrown::Value(value) => match error_like_fields(value) {
                Some((name, _)) => name,
                None => "Uncaught".to_string(),
            },
        }
    }

    pub fn message(&self) -> String {
        match &self.thrown {
            Thrown::Error(error) => error.to_string(),
            Thrown::Value(Value::String(s)) => s.to_string(),
            Thrown::Value(value) => match error_like_fields(value) {
                Some((_, message)) => message,
                None => inspect::inspect(value),
            },
        }
    }

    /// The value a `catch (e)` clause binds. Evaluator errors become a
    /// `{ name, message }` record.
    pub fn into_value(self) -> Value<'a> {
        match self.thrown {
            Thrown::Value(value) => value,
            Thrown::Error(error) => {
                let mut properties = PropertyMap::default();
                properties.insert("name".into(), Value::from(error.kind_name()));
                properties.insert("message".into(), Value::from(error.to_string()));
                Value::new_object(properties)
            }
        }
    }
}

/// `(name, message)` of a thrown object that looks like an error record.
fn error_like_fields(value: &Value<'_>) -> Option<(String, String)> {
    let Value::Object(object) = value else {
        return None;
    };
    let object = object.borrow();
    let message = match object.get("message") {
        Some(Value::String(message)) => message.to_string(),
        _ => return None,
    };
    let name = match object.get("name") {
        Some(Value::String(name)) => name.to_string(),
        _ => "Error".to_string(),
    };
    Some((name, message))
}

impl fmt::Display for Exception<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind_name(), self.message())
    }
}

impl From<RuntimeError> for Exception<'_> {
    fn from(error: RuntimeError) -> Self {
        Self {
            thrown: Thrown::Error(error),
            range: None,
        }
    }
}

impl From<ScopeError> for Exception<'_> {
    fn from(error: ScopeError) -> Self {
        RuntimeError::Scope(error).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_messages() {
        let read = RuntimeError::PropertyOfNullish {
            base: "undefined",
            property: "length".into(),
            access: AccessKind::Read,
        };
        assert_eq!(read.to_string(), "Cannot read properties of undefined (reading 'length')");
        let write = RuntimeError::PropertyOfNullish {
            base: "null",
            property: "x".into(),
            access: AccessKind::Write,
        };
        assert_eq!(write.to_string(), "Cannot set properties of null (setting 'x')");
        assert_eq!(
            RuntimeError::FrozenWrite("value".into()).to_string(),
            "Cannot assign to read only property 'value' of object"
        );
        assert_eq!(RuntimeError::NotCallable("obj.m".into()).to_string(), "obj.m is not a function");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RuntimeError::CallStackOverflow.kind_name(), "RangeError");
        assert_eq!(RuntimeError::NotCallable("f".into()).kind_name(), "TypeError");
        assert_eq!(
            RuntimeError::Scope(ScopeError::UnresolvedIdentifier("x".into())).kind_name(),
            "ReferenceError"
        );
    }

    #[test]
    fn test_scope_error_is_transparent() {
        let exception: Exception<'_> = ScopeError::UninitializedAccess("a".into()).into();
        assert_eq!(exception.to_string(), "ReferenceError: Cannot access 'a' before initialization");
    }

    #[test]
    fn test_catch_value_shape() {
        let exception: Exception<'_> = ScopeError::UnresolvedIdentifier("y".into()).into();
        let Value::Object(record) = exception.into_value() else {
            panic!("expected an object record");
        };
        let record = record.borrow();
        assert_eq!(record.get("name").map(Value::to_js_string).as_deref(), Some("ReferenceError"));
        assert_eq!(record.get("message").map(Value::to_js_string).as_deref(), Some("y is not defined"));
    }

    #[test]
    fn test_thrown_values() {
        let range = TextRange::new(0, 1);
        let thrown = Exception::thrown_value(Value::from("boom"), range);
        assert_eq!(thrown.to_string(), "Uncaught: boom");

        let mut properties = PropertyMap::default();
        properties.insert("name".into(), Value::from("ValidationError"));
        properties.insert("message".into(), Value::from("bad input"));
        let thrown = Exception::thrown_value(Value::new_object(properties), range);
        assert_eq!(thrown.to_string(), "ValidationError: bad input");
    }

    #[test]
    fn test_first_location_wins() {
        let exception: Exception<'_> = RuntimeError::CallStackOverflow.into();
        let exception = exception.at(TextRange::new(4, 9)).at(TextRange::new(0, 20));
        assert_eq!(exception.range, Some(TextRange::new(4, 9)));
    }
}
