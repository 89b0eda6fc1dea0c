//! Runtime values.
//!
//! Primitives are held inline. Arrays, objects and functions are shared
//! handles, so copying a `Value` aliases the same record the way a script
//! variable does.

use crate::error::{Exception, RuntimeError};
use crate::inspect;
use crate::interpreter::Interpreter;
use crate::number::{format_number, string_to_number};
use hoist_ast::node::{Block, Expression, ParameterDeclaration};
use hoist_binder::ScopeRef;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

pub type EvalResult<'a, T> = Result<T, Exception<'a>>;

/// Longest string a script can build, in characters.
pub const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

/// Reject a string result longer than `MAX_STRING_LENGTH` before building it.
pub fn check_string_length(len: usize) -> Result<(), RuntimeError> {
    if len > MAX_STRING_LENGTH {
        return Err(RuntimeError::Range("Invalid string length".to_string()));
    }
    Ok(())
}

pub type PropertyMap<'a> = IndexMap<Rc<str>, Value<'a>, FxBuildHasher>;
pub type ObjectRef<'a> = Rc<RefCell<ObjectRecord<'a>>>;
pub type ArrayRef<'a> = Rc<RefCell<ArrayRecord<'a>>>;
pub type FunctionRef<'a> = Rc<FunctionObject<'a>>;

/// Signature of a builtin. Receives the `this` value and the arguments.
pub type NativeFn<'a> = fn(&mut Interpreter<'a>, &Value<'a>, &[Value<'a>]) -> EvalResult<'a, Value<'a>>;

#[derive(Clone, Default)]
pub enum Value<'a> {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(ArrayRef<'a>),
    Object(ObjectRef<'a>),
    Function(FunctionRef<'a>),
}

// ============================================================================
// Records
// ============================================================================

/// A plain object: insertion-ordered properties and a frozen flag.
#[derive(Default)]
pub struct ObjectRecord<'a> {
    properties: PropertyMap<'a>,
    frozen: bool,
}

impl<'a> ObjectRecord<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_properties(properties: PropertyMap<'a>) -> Self {
        Self {
            properties,
            frozen: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.properties.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Store a property, ignoring the frozen flag. Callers check it first.
    pub fn insert(&mut self, key: Rc<str>, value: Value<'a>) {
        self.properties.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Keys in enumeration order: integer-like keys ascending, then the rest
    /// in insertion order.
    pub fn keys(&self) -> Vec<Rc<str>> {
        let mut indexed: Vec<(usize, Rc<str>)> = Vec::new();
        let mut named: Vec<Rc<str>> = Vec::new();
        for key in self.properties.keys() {
            match array_index(key) {
                Some(index) => indexed.push((index, key.clone())),
                None => named.push(key.clone()),
            }
        }
        if indexed.is_empty() {
            return named;
        }
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, key)| key).chain(named).collect()
    }

    pub fn entries(&self) -> Vec<(Rc<str>, Value<'a>)> {
        self.keys()
            .into_iter()
            .map(|key| {
                let value = self.properties.get(&key).cloned().unwrap_or_default();
                (key, value)
            })
            .collect()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[derive(Default)]
pub struct ArrayRecord<'a> {
    pub elements: Vec<Value<'a>>,
    frozen: bool,
}

impl<'a> ArrayRecord<'a> {
    pub fn new(elements: Vec<Value<'a>>) -> Self {
        Self {
            elements,
            frozen: false,
        }
    }

    pub fn get(&self, index: usize) -> Value<'a> {
        self.elements.get(index).cloned().unwrap_or_default()
    }

    /// Write an element, growing the array with `undefined` as needed.
    pub fn set(&mut self, index: usize, value: Value<'a>) {
        if index >= self.elements.len() {
            self.elements.resize(index + 1, Value::Undefined);
        }
        self.elements[index] = value;
    }

    /// Truncate or extend to `len` elements.
    pub fn set_len(&mut self, len: usize) {
        self.elements.resize(len, Value::Undefined);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Clone, Copy)]
pub enum FunctionBody<'a> {
    Block(&'a Block<'a>),
    /// Concise arrow body: `x => x * 2`.
    Expression(&'a Expression<'a>),
}

/// A script function together with the scope it was created in.
pub struct Closure<'a> {
    pub parameters: &'a [ParameterDeclaration<'a>],
    pub body: FunctionBody<'a>,
    pub scope: ScopeRef<Value<'a>>,
    /// The `this` an arrow function captured; `None` for ordinary functions.
    pub lexical_this: Option<Value<'a>>,
    pub strict: bool,
    /// Source text of the function, for `String(fn)`.
    pub source: &'a str,
}

pub enum FunctionKind<'a> {
    Closure(Closure<'a>),
    Native { call: NativeFn<'a>, arity: u32 },
}

pub struct FunctionObject<'a> {
    name: RefCell<Rc<str>>,
    pub kind: FunctionKind<'a>,
    properties: RefCell<PropertyMap<'a>>,
}

impl<'a> FunctionObject<'a> {
    pub fn new(name: Rc<str>, kind: FunctionKind<'a>) -> Self {
        Self {
            name: RefCell::new(name),
            kind,
            properties: RefCell::new(PropertyMap::default()),
        }
    }

    pub fn name(&self) -> Rc<str> {
        self.name.borrow().clone()
    }

    /// Give an anonymous function the name it was first bound to, as in
    /// `const square = x => x * x`.
    pub fn infer_name(&self, name: &str) {
        let mut current = self.name.borrow_mut();
        if current.is_empty() {
            *current = Rc::from(name);
        }
    }

    pub fn arity(&self) -> u32 {
        match &self.kind {
            FunctionKind::Closure(closure) => {
                closure.parameters.iter().take_while(|p| p.initializer.is_none()).count() as u32
            }
            FunctionKind::Native { arity, .. } => *arity,
        }
    }

    pub fn properties(&self) -> Ref<'_, PropertyMap<'a>> {
        self.properties.borrow()
    }

    pub fn set_property(&self, key: Rc<str>, value: Value<'a>) {
        self.properties.borrow_mut().insert(key, value);
    }
}

// ============================================================================
// Value
// ============================================================================

impl<'a> Value<'a> {
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::String(text.into())
    }

    pub fn new_array(elements: Vec<Value<'a>>) -> Self {
        Value::Array(Rc::new(RefCell::new(ArrayRecord::new(elements))))
    }

    pub fn new_object(properties: PropertyMap<'a>) -> Self {
        Value::Object(Rc::new(RefCell::new(ObjectRecord::from_properties(properties))))
    }

    pub fn native(name: &str, arity: u32, call: NativeFn<'a>) -> Self {
        Value::Function(Rc::new(FunctionObject::new(
            Rc::from(name),
            FunctionKind::Native { call, arity },
        )))
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_js_string()),
            Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(array) => join_elements(&array.borrow().elements, ","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(function) => match &function.kind {
                FunctionKind::Closure(closure) => closure.source.to_string(),
                FunctionKind::Native { .. } => format!("function {}() {{ [native code] }}", function.name()),
            },
        }
    }

    /// A property key: strings as they are, everything else through
    /// `String(value)`.
    pub fn to_property_key(&self) -> Rc<str> {
        match self {
            Value::String(s) => s.clone(),
            other => Rc::from(other.to_js_string()),
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Boolean(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (Value::Array(_) | Value::Object(_) | Value::Function(_), Value::Number(_) | Value::String(_)) => {
                Value::string(self.to_js_string()).loose_equals(other)
            }
            (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_) | Value::Function(_)) => {
                self.loose_equals(&Value::string(other.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// Equality used by `includes`: like `===` except that `NaN` matches
    /// itself.
    pub fn same_value_zero(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&inspect::inspect(self))
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value<'_> {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

/// `Array.prototype.join`: `null` and `undefined` become empty strings.
pub fn join_elements(elements: &[Value<'_>], separator: &str) -> String {
    let mut out = String::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        if !element.is_nullish() {
            out.push_str(&element.to_js_string());
        }
    }
    out
}

/// Parse a canonical array index: `"0"`, `"17"`, but not `"01"` or `"-1"`.
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || key.len() > 10 || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i != u32::MAX).map(|i| i as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_length_bound() {
        assert!(check_string_length(MAX_STRING_LENGTH).is_ok());
        assert!(matches!(
            check_string_length(MAX_STRING_LENGTH + 1),
            Err(RuntimeError::Range(message)) if message == "Invalid string length"
        ));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::new_array(vec![]).is_truthy());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::new_array(vec![]).type_of(), "object");
        assert_eq!(Value::from(1.0).type_of(), "number");
        assert_eq!(Value::Undefined.type_of(), "undefined");
    }

    #[test]
    fn test_to_js_string() {
        let array = Value::new_array(vec![Value::from(1.0), Value::Null, Value::from("x")]);
        assert_eq!(array.to_js_string(), "1,,x");
        assert_eq!(Value::new_object(PropertyMap::default()).to_js_string(), "[object Object]");
        assert_eq!(Value::from(-0.0).to_js_string(), "0");
    }

    #[test]
    fn test_equality() {
        assert!(Value::from(1.0).loose_equals(&Value::from("1")));
        assert!(!Value::from(1.0).strict_equals(&Value::from("1")));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.loose_equals(&Value::from(0.0)));
        assert!(Value::from(true).loose_equals(&Value::from(1.0)));
        assert!(!Value::from(f64::NAN).strict_equals(&Value::from(f64::NAN)));
        assert!(Value::from(f64::NAN).same_value_zero(&Value::from(f64::NAN)));

        let a = Value::new_array(vec![]);
        let b = a.clone();
        assert!(a.strict_equals(&b));
        assert!(!a.strict_equals(&Value::new_array(vec![])));
    }

    #[test]
    fn test_object_key_order() {
        let mut record = ObjectRecord::new();
        for key in ["b", "2", "a", "1"] {
            record.insert(Rc::from(key), Value::Null);
        }
        let keys: Vec<String> = record.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["1", "2", "b", "a"]);
    }

    #[test]
    fn test_array_set_extends_with_undefined() {
        let mut array = ArrayRecord::new(vec![Value::from(0.0)]);
        array.set(3, Value::from(3.0));
        assert_eq!(array.len(), 4);
        assert!(matches!(array.get(1), Value::Undefined));
        array.set_len(1);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
        assert_eq!(array_index("length"), None);
    }
}
