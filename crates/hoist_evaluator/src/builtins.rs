//! Builtin globals and the member functions of arrays, strings and numbers.
//!
//! Globals are bound in the realm scope, the parent of the global scope, so
//! a script may shadow any of them. `NaN`, `Infinity` and `undefined` are
//! bound immutable.

use crate::error::RuntimeError;
use crate::inspect::{format_log_args, inspect};
use crate::interpreter::Interpreter;
use crate::number::{format_number, parse_float, parse_int, to_fixed, to_radix_string};
use crate::value::*;
use hoist_binder::{DeclarationKind, ScopeError};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// Member functions shared by every value of a primitive or array type.
pub struct Intrinsics<'a> {
    array: FxHashMap<&'static str, Value<'a>>,
    string: FxHashMap<&'static str, Value<'a>>,
    number: FxHashMap<&'static str, Value<'a>>,
}

fn method_table<'a>(methods: &[(&'static str, u32, NativeFn<'a>)]) -> FxHashMap<&'static str, Value<'a>> {
    methods
        .iter()
        .map(|&(name, arity, call)| (name, Value::native(name, arity, call)))
        .collect()
}

impl<'a> Intrinsics<'a> {
    pub fn new() -> Self {
        Self {
            array: method_table(&[
                ("push", 1, array_push),
                ("pop", 0, array_pop),
                ("shift", 0, array_shift),
                ("unshift", 1, array_unshift),
                ("forEach", 1, array_for_each),
                ("map", 1, array_map),
                ("filter", 1, array_filter),
                ("reduce", 1, array_reduce),
                ("join", 1, array_join),
                ("includes", 1, array_includes),
                ("indexOf", 1, array_index_of),
                ("slice", 2, array_slice),
                ("concat", 1, array_concat),
                ("reverse", 0, array_reverse),
            ]),
            string: method_table(&[
                ("repeat", 1, string_repeat),
                ("toUpperCase", 0, string_to_upper_case),
                ("toLowerCase", 0, string_to_lower_case),
                ("includes", 1, string_includes),
                ("indexOf", 1, string_index_of),
                ("slice", 2, string_slice),
                ("split", 2, string_split),
                ("trim", 0, string_trim),
                ("charAt", 1, string_char_at),
                ("startsWith", 1, string_starts_with),
                ("endsWith", 1, string_ends_with),
                ("padStart", 2, string_pad_start),
                ("padEnd", 2, string_pad_end),
            ]),
            number: method_table(&[("toFixed", 1, number_to_fixed), ("toString", 1, number_to_string)]),
        }
    }

    pub fn array_method(&self, name: &str) -> Value<'a> {
        self.array.get(name).cloned().unwrap_or_default()
    }

    pub fn string_method(&self, name: &str) -> Value<'a> {
        self.string.get(name).cloned().unwrap_or_default()
    }

    pub fn number_method(&self, name: &str) -> Value<'a> {
        self.number.get(name).cloned().unwrap_or_default()
    }
}

impl Default for Intrinsics<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind every builtin global.
pub(crate) fn install_globals(interpreter: &Interpreter<'_>) -> Result<(), ScopeError> {
    use DeclarationKind::{BlockImmutable, Rebindable};

    interpreter.define_global("undefined", BlockImmutable, Value::Undefined)?;
    interpreter.define_global("NaN", BlockImmutable, Value::Number(f64::NAN))?;
    interpreter.define_global("Infinity", BlockImmutable, Value::Number(f64::INFINITY))?;

    interpreter.define_global("console", Rebindable, namespace(&[("log", 0, console_log)], &[]))?;
    interpreter.define_global(
        "Math",
        Rebindable,
        namespace(
            &[
                ("floor", 1, math_floor),
                ("ceil", 1, math_ceil),
                ("round", 1, math_round),
                ("abs", 1, math_abs),
                ("sqrt", 1, math_sqrt),
                ("pow", 2, math_pow),
                ("max", 2, math_max),
                ("min", 2, math_min),
                ("trunc", 1, math_trunc),
                ("random", 0, math_random),
            ],
            &[("PI", std::f64::consts::PI)],
        ),
    )?;
    interpreter.define_global(
        "Object",
        Rebindable,
        namespace(
            &[
                ("keys", 1, object_keys),
                ("values", 1, object_values),
                ("entries", 1, object_entries),
                ("freeze", 1, object_freeze),
                ("isFrozen", 1, object_is_frozen),
                ("deepFreeze", 1, object_deep_freeze),
            ],
            &[],
        ),
    )?;
    interpreter.define_global("Array", Rebindable, namespace(&[("isArray", 1, array_is_array)], &[]))?;

    let number = Value::native("Number", 1, number_constructor);
    if let Value::Function(function) = &number {
        function.set_property("isInteger".into(), Value::native("isInteger", 1, number_is_integer));
    }
    interpreter.define_global("Number", Rebindable, number)?;
    interpreter.define_global("String", Rebindable, Value::native("String", 1, string_constructor))?;
    interpreter.define_global("Boolean", Rebindable, Value::native("Boolean", 1, boolean_constructor))?;
    interpreter.define_global("parseInt", Rebindable, Value::native("parseInt", 2, global_parse_int))?;
    interpreter.define_global("parseFloat", Rebindable, Value::native("parseFloat", 1, global_parse_float))?;
    interpreter.define_global("isNaN", Rebindable, Value::native("isNaN", 1, global_is_nan))?;
    Ok(())
}

/// A plain object holding native functions and numeric constants.
fn namespace<'a>(functions: &[(&'static str, u32, NativeFn<'a>)], constants: &[(&'static str, f64)]) -> Value<'a> {
    let mut properties = PropertyMap::default();
    for &(name, arity, call) in functions {
        properties.insert(Rc::from(name), Value::native(name, arity, call));
    }
    for &(name, value) in constants {
        properties.insert(Rc::from(name), Value::Number(value));
    }
    Value::new_object(properties)
}

// ============================================================================
// Helpers
// ============================================================================

fn arg<'a>(args: &[Value<'a>], index: usize) -> Value<'a> {
    args.get(index).cloned().unwrap_or_default()
}

fn number_arg(args: &[Value<'_>], index: usize) -> f64 {
    args.get(index).map_or(f64::NAN, Value::to_number)
}

/// `ToIntegerOrInfinity`, with `NaN` becoming 0.
fn integer_arg(args: &[Value<'_>], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(Value::Undefined) => default,
        Some(value) => {
            let n = value.to_number();
            if n.is_nan() {
                0.0
            } else {
                n.trunc()
            }
        }
    }
}

/// Resolve a possibly negative index against `len`, clamped to `0..=len`.
fn relative_index(n: f64, len: usize) -> usize {
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

fn type_error<'a, T>(message: String) -> EvalResult<'a, T> {
    Err(RuntimeError::Type(message).into())
}

fn this_array<'a>(this: &Value<'a>, method: &str) -> EvalResult<'a, ArrayRef<'a>> {
    match this {
        Value::Array(array) => Ok(array.clone()),
        other => type_error(format!("Array.prototype.{method} called on {}", inspect(other))),
    }
}

fn this_string(this: &Value<'_>) -> Rc<str> {
    match this {
        Value::String(s) => s.clone(),
        other => Rc::from(other.to_js_string()),
    }
}

fn callback_arg<'a>(args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return type_error(format!("{} is not a function", inspect(&callback)));
    }
    Ok(callback)
}

fn check_extensible<'a>(array: &ArrayRecord<'a>) -> EvalResult<'a, ()> {
    if array.is_frozen() {
        return type_error(format!("Cannot add property {}, object is not extensible", array.len()));
    }
    Ok(())
}

fn check_deletable<'a>(array: &ArrayRecord<'a>) -> EvalResult<'a, ()> {
    if array.is_frozen() {
        let last = array.len().saturating_sub(1);
        return type_error(format!("Cannot delete property '{last}' of [object Array]"));
    }
    Ok(())
}

/// Element `index` of a live array, or `None` once the array has shrunk
/// below it.
fn element_at<'a>(array: &ArrayRef<'a>, index: usize) -> Option<Value<'a>> {
    array.borrow().elements.get(index).cloned()
}

// ============================================================================
// console, Math
// ============================================================================

fn console_log<'a>(interpreter: &mut Interpreter<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let line = format_log_args(args);
    interpreter.log(&line);
    Ok(Value::Undefined)
}

fn math_floor<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(number_arg(args, 0).floor()))
}

fn math_ceil<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(number_arg(args, 0).ceil()))
}

/// Rounds half up, toward positive infinity.
fn math_round<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let n = number_arg(args, 0);
    if !n.is_finite() {
        return Ok(Value::Number(n));
    }
    let floor = n.floor();
    Ok(Value::Number(if n - floor >= 0.5 { floor + 1.0 } else { floor }))
}

fn math_abs<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(number_arg(args, 0).abs()))
}

fn math_sqrt<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(number_arg(args, 0).sqrt()))
}

fn math_pow<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let result = crate::operators::binary(
        hoist_ast::SyntaxKind::AsteriskAsteriskToken,
        &Value::Number(number_arg(args, 0)),
        &Value::Number(number_arg(args, 1)),
    )?;
    Ok(result)
}

fn math_max<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let mut result = f64::NEG_INFINITY;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = result.max(n);
    }
    Ok(Value::Number(result))
}

fn math_min<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let mut result = f64::INFINITY;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = result.min(n);
    }
    Ok(Value::Number(result))
}

fn math_trunc<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(number_arg(args, 0).trunc()))
}

fn math_random<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(rand::random::<f64>()))
}

// ============================================================================
// Object, Array, conversions
// ============================================================================

fn own_keys(value: &Value<'_>) -> Vec<Rc<str>> {
    match value {
        Value::Object(object) => object.borrow().keys(),
        Value::Array(array) => (0..array.borrow().len()).map(|i| Rc::from(i.to_string())).collect(),
        Value::String(s) => (0..s.chars().count()).map(|i| Rc::from(i.to_string())).collect(),
        Value::Function(function) => function.properties().keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn own_entries<'a>(value: &Value<'a>) -> Vec<(Rc<str>, Value<'a>)> {
    match value {
        Value::Object(object) => object.borrow().entries(),
        Value::Array(array) => array
            .borrow()
            .elements
            .iter()
            .enumerate()
            .map(|(i, v)| (Rc::from(i.to_string()), v.clone()))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (Rc::from(i.to_string()), Value::from(c.to_string())))
            .collect(),
        Value::Function(function) => function
            .properties()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

fn object_keys<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let keys = own_keys(&arg(args, 0)).into_iter().map(Value::String).collect();
    Ok(Value::new_array(keys))
}

fn object_values<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let values = own_entries(&arg(args, 0)).into_iter().map(|(_, v)| v).collect();
    Ok(Value::new_array(values))
}

fn object_entries<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let entries = own_entries(&arg(args, 0))
        .into_iter()
        .map(|(k, v)| Value::new_array(vec![Value::String(k), v]))
        .collect();
    Ok(Value::new_array(entries))
}

/// Shallow: nested records stay writable.
fn object_freeze<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let target = arg(args, 0);
    match &target {
        Value::Object(object) => object.borrow_mut().freeze(),
        Value::Array(array) => array.borrow_mut().freeze(),
        _ => {}
    }
    Ok(target)
}

fn object_is_frozen<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let frozen = match &arg(args, 0) {
        Value::Object(object) => object.borrow().is_frozen(),
        Value::Array(array) => array.borrow().is_frozen(),
        Value::Function(_) => false,
        _ => true,
    };
    Ok(Value::Boolean(frozen))
}

fn object_deep_freeze<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let target = arg(args, 0);
    deep_freeze(&target, &mut FxHashSet::default());
    Ok(target)
}

fn deep_freeze(value: &Value<'_>, visited: &mut FxHashSet<*const ()>) {
    let children: Vec<Value<'_>> = match value {
        Value::Object(object) => {
            if !visited.insert(Rc::as_ptr(object) as *const ()) {
                return;
            }
            let mut object = object.borrow_mut();
            object.freeze();
            object.entries().into_iter().map(|(_, v)| v).collect()
        }
        Value::Array(array) => {
            if !visited.insert(Rc::as_ptr(array) as *const ()) {
                return;
            }
            let mut array = array.borrow_mut();
            array.freeze();
            array.elements.clone()
        }
        _ => return,
    };
    for child in children.iter() {
        deep_freeze(child, visited);
    }
}

fn array_is_array<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Array(_))))
}

fn number_constructor<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))
}

fn number_is_integer<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let is_integer = matches!(arg(args, 0), Value::Number(n) if n.is_finite() && n.trunc() == n);
    Ok(Value::Boolean(is_integer))
}

fn string_constructor<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::from(args.first().map_or_else(String::new, Value::to_js_string)))
}

fn boolean_constructor<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Boolean(arg(args, 0).is_truthy()))
}

fn global_parse_int<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let text = arg(args, 0).to_js_string();
    let radix = match args.get(1) {
        None | Some(Value::Undefined) => None,
        Some(value) => Some(crate::number::to_int32(value.to_number())),
    };
    Ok(Value::Number(parse_int(&text, radix)))
}

fn global_parse_float<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Number(parse_float(&arg(args, 0).to_js_string())))
}

fn global_is_nan<'a>(_: &mut Interpreter<'a>, _: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::Boolean(number_arg(args, 0).is_nan()))
}

// ============================================================================
// Array members
// ============================================================================

fn array_push<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "push")?;
    let mut array = array.borrow_mut();
    check_extensible(&array)?;
    array.elements.extend(args.iter().cloned());
    Ok(Value::Number(array.len() as f64))
}

fn array_pop<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "pop")?;
    let mut array = array.borrow_mut();
    if array.is_empty() {
        return Ok(Value::Undefined);
    }
    check_deletable(&array)?;
    Ok(array.elements.pop().unwrap_or_default())
}

fn array_shift<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "shift")?;
    let mut array = array.borrow_mut();
    if array.is_empty() {
        return Ok(Value::Undefined);
    }
    check_deletable(&array)?;
    Ok(array.elements.remove(0))
}

fn array_unshift<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "unshift")?;
    let mut array = array.borrow_mut();
    if !args.is_empty() {
        check_extensible(&array)?;
    }
    array.elements.splice(0..0, args.iter().cloned());
    Ok(Value::Number(array.len() as f64))
}

fn array_for_each<'a>(interpreter: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "forEach")?;
    let callback = callback_arg(args)?;
    let len = array.borrow().len();
    for i in 0..len {
        let Some(item) = element_at(&array, i) else { break };
        interpreter.call_value(&callback, Value::Undefined, &[item, Value::Number(i as f64), this.clone()])?;
    }
    Ok(Value::Undefined)
}

fn array_map<'a>(interpreter: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "map")?;
    let callback = callback_arg(args)?;
    let len = array.borrow().len();
    let mut mapped = Vec::with_capacity(len);
    for i in 0..len {
        let Some(item) = element_at(&array, i) else { break };
        mapped.push(interpreter.call_value(&callback, Value::Undefined, &[item, Value::Number(i as f64), this.clone()])?);
    }
    Ok(Value::new_array(mapped))
}

fn array_filter<'a>(interpreter: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "filter")?;
    let callback = callback_arg(args)?;
    let len = array.borrow().len();
    let mut kept = Vec::new();
    for i in 0..len {
        let Some(item) = element_at(&array, i) else { break };
        let keep = interpreter.call_value(&callback, Value::Undefined, &[item.clone(), Value::Number(i as f64), this.clone()])?;
        if keep.is_truthy() {
            kept.push(item);
        }
    }
    Ok(Value::new_array(kept))
}

fn array_reduce<'a>(interpreter: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "reduce")?;
    let callback = callback_arg(args)?;
    let len = array.borrow().len();
    let (mut accumulator, start) = match args.get(1) {
        Some(initial) => (initial.clone(), 0),
        None => match element_at(&array, 0) {
            Some(first) => (first, 1),
            None => return type_error("Reduce of empty array with no initial value".to_string()),
        },
    };
    for i in start..len {
        let Some(item) = element_at(&array, i) else { break };
        accumulator = interpreter.call_value(
            &callback,
            Value::Undefined,
            &[accumulator, item, Value::Number(i as f64), this.clone()],
        )?;
    }
    Ok(accumulator)
}

fn array_join<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "join")?;
    let separator = match args.first() {
        None | Some(Value::Undefined) => ",".to_string(),
        Some(value) => value.to_js_string(),
    };
    let joined = join_elements(&array.borrow().elements, &separator);
    Ok(Value::from(joined))
}

fn array_includes<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "includes")?;
    let array = array.borrow();
    let target = arg(args, 0);
    let from = relative_index(integer_arg(args, 1, 0.0), array.len());
    Ok(Value::Boolean(array.elements[from..].iter().any(|v| v.same_value_zero(&target))))
}

fn array_index_of<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "indexOf")?;
    let array = array.borrow();
    let target = arg(args, 0);
    let from = relative_index(integer_arg(args, 1, 0.0), array.len());
    let found = array.elements[from..]
        .iter()
        .position(|v| v.strict_equals(&target))
        .map_or(-1.0, |i| (i + from) as f64);
    Ok(Value::Number(found))
}

fn array_slice<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "slice")?;
    let array = array.borrow();
    let len = array.len();
    let start = relative_index(integer_arg(args, 0, 0.0), len);
    let end = relative_index(integer_arg(args, 1, len as f64), len);
    let elements = if start < end { array.elements[start..end].to_vec() } else { Vec::new() };
    Ok(Value::new_array(elements))
}

fn array_concat<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "concat")?;
    let mut elements = array.borrow().elements.clone();
    for value in args {
        match value {
            Value::Array(other) => elements.extend(other.borrow().elements.iter().cloned()),
            other => elements.push(other.clone()),
        }
    }
    Ok(Value::new_array(elements))
}

fn array_reverse<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let array = this_array(this, "reverse")?;
    {
        let mut record = array.borrow_mut();
        if record.is_frozen() && record.len() > 1 {
            return type_error("Cannot assign to read only property '0' of object '[object Array]'".to_string());
        }
        record.elements.reverse();
    }
    Ok(this.clone())
}

// ============================================================================
// String members
// ============================================================================

fn chars_of(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// Character index of the first occurrence of `needle` at or after `from`.
fn char_index_of(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let byte_start = haystack.char_indices().nth(from).map_or(haystack.len(), |(b, _)| b);
    if from > 0 && byte_start == haystack.len() && !needle.is_empty() {
        return None;
    }
    haystack[byte_start..]
        .find(needle)
        .map(|byte| from + haystack[byte_start..byte_start + byte].chars().count())
}

fn string_repeat<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let count = integer_arg(args, 0, 0.0);
    if count < 0.0 || count.is_infinite() {
        return Err(RuntimeError::Range(format!("Invalid count value: {}", format_number(count))).into());
    }
    let len = s.chars().count();
    if len == 0 || count == 0.0 {
        return Ok(Value::from(""));
    }
    if count > (MAX_STRING_LENGTH / len) as f64 {
        return Err(RuntimeError::Range("Invalid string length".to_string()).into());
    }
    Ok(Value::from(s.repeat(count as usize)))
}

fn string_to_upper_case<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::from(this_string(this).to_uppercase()))
}

fn string_to_lower_case<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::from(this_string(this).to_lowercase()))
}

fn string_includes<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let needle = arg(args, 0).to_js_string();
    let from = relative_index(integer_arg(args, 1, 0.0).max(0.0), s.chars().count());
    Ok(Value::Boolean(char_index_of(&s, &needle, from).is_some()))
}

fn string_index_of<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let needle = arg(args, 0).to_js_string();
    let from = relative_index(integer_arg(args, 1, 0.0).max(0.0), s.chars().count());
    Ok(Value::Number(char_index_of(&s, &needle, from).map_or(-1.0, |i| i as f64)))
}

fn string_slice<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let chars = chars_of(&this_string(this));
    let len = chars.len();
    let start = relative_index(integer_arg(args, 0, 0.0), len);
    let end = relative_index(integer_arg(args, 1, len as f64), len);
    let sliced: String = if start < end { chars[start..end].iter().collect() } else { String::new() };
    Ok(Value::from(sliced))
}

fn string_split<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => usize::MAX,
        Some(value) => crate::number::to_uint32(value.to_number()) as usize,
    };
    let parts: Vec<Value<'a>> = match args.first() {
        None | Some(Value::Undefined) => vec![Value::String(s.clone())],
        Some(separator) => {
            let separator = separator.to_js_string();
            if separator.is_empty() {
                s.chars().map(|c| Value::from(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            }
        }
    };
    Ok(Value::new_array(parts.into_iter().take(limit).collect()))
}

fn string_trim<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, _: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    Ok(Value::from(this_string(this).trim()))
}

fn string_char_at<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let index = integer_arg(args, 0, 0.0);
    let c = if index < 0.0 { None } else { s.chars().nth(index as usize) };
    Ok(Value::from(c.map(String::from).unwrap_or_default()))
}

fn string_starts_with<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let chars = chars_of(&this_string(this));
    let needle = arg(args, 0).to_js_string();
    let from = relative_index(integer_arg(args, 1, 0.0).max(0.0), chars.len());
    let rest: String = chars[from..].iter().collect();
    Ok(Value::Boolean(rest.starts_with(&needle)))
}

fn string_ends_with<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let chars = chars_of(&this_string(this));
    let needle = arg(args, 0).to_js_string();
    let end = relative_index(integer_arg(args, 1, chars.len() as f64).max(0.0), chars.len());
    let head: String = chars[..end].iter().collect();
    Ok(Value::Boolean(head.ends_with(&needle)))
}

/// Padding to reach `target_len` characters, built from repeats of `pad`.
fn padding(current_len: usize, args: &[Value<'_>]) -> Result<String, RuntimeError> {
    let target_len = integer_arg(args, 0, 0.0);
    let pad = match args.get(1) {
        None | Some(Value::Undefined) => " ".to_string(),
        Some(value) => value.to_js_string(),
    };
    if pad.is_empty() || target_len <= current_len as f64 {
        return Ok(String::new());
    }
    if target_len > MAX_STRING_LENGTH as f64 {
        return Err(RuntimeError::Range("Invalid string length".to_string()));
    }
    let needed = target_len as usize - current_len;
    Ok(pad.chars().cycle().take(needed).collect())
}

fn string_pad_start<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let fill = padding(s.chars().count(), args)?;
    Ok(Value::from(format!("{fill}{s}")))
}

fn string_pad_end<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let s = this_string(this);
    let fill = padding(s.chars().count(), args)?;
    Ok(Value::from(format!("{s}{fill}")))
}

// ============================================================================
// Number members
// ============================================================================

fn this_number<'a>(this: &Value<'a>, method: &str) -> EvalResult<'a, f64> {
    match this {
        Value::Number(n) => Ok(*n),
        other => type_error(format!("Number.prototype.{method} requires that 'this' be a Number, not {}", other.type_of())),
    }
}

fn number_to_fixed<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let n = this_number(this, "toFixed")?;
    let digits = integer_arg(args, 0, 0.0);
    if !(0.0..=100.0).contains(&digits) {
        return Err(RuntimeError::Range("toFixed() digits argument must be between 0 and 100".to_string()).into());
    }
    Ok(Value::from(to_fixed(n, digits as usize)))
}

fn number_to_string<'a>(_: &mut Interpreter<'a>, this: &Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
    let n = this_number(this, "toString")?;
    let radix = integer_arg(args, 0, 10.0);
    if !(2.0..=36.0).contains(&radix) {
        return Err(RuntimeError::Range("toString() radix must be between 2 and 36".to_string()).into());
    }
    Ok(Value::from(to_radix_string(n, radix as u32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-10.0, 5), 0);
        assert_eq!(relative_index(7.0, 5), 5);
        assert_eq!(relative_index(2.0, 5), 2);
    }

    #[test]
    fn test_char_index_of() {
        assert_eq!(char_index_of("héllo", "llo", 0), Some(2));
        assert_eq!(char_index_of("hello", "l", 3), Some(3));
        assert_eq!(char_index_of("hello", "z", 0), None);
        assert_eq!(char_index_of("abc", "", 1), Some(1));
    }

    #[test]
    fn test_padding() {
        let args = [Value::from(5.0), Value::from("ab")];
        assert_eq!(padding(2, &args).unwrap(), "aba");
        assert_eq!(padding(6, &args).unwrap(), "");
        assert_eq!(padding(3, &[Value::from(4.0)]).unwrap(), " ");
    }

    #[test]
    fn test_deep_freeze_handles_cycles() {
        let inner = Value::new_object(PropertyMap::default());
        let mut properties = PropertyMap::default();
        properties.insert("inner".into(), inner.clone());
        let outer = Value::new_object(properties);
        if let Value::Object(record) = &inner {
            record.borrow_mut().insert("back".into(), outer.clone());
        }
        deep_freeze(&outer, &mut FxHashSet::default());
        let Value::Object(record) = &inner else { unreachable!() };
        assert!(record.borrow().is_frozen());
        record.borrow_mut().insert("back".into(), Value::Null);
    }
}
