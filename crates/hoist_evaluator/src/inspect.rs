//! Console formatting, after Node's single-line `util.inspect`.

use crate::value::{FunctionObject, Value};
use std::rc::Rc;

/// Objects and arrays nested deeper than this print as `[Object]`/`[Array]`.
const MAX_DEPTH: usize = 2;
/// Array elements printed before the rest is summarized.
const MAX_ARRAY_LENGTH: usize = 100;

/// Format `console.log` arguments: top-level strings print raw, everything
/// else is inspected, and the pieces are joined by single spaces.
pub fn format_log_args(args: &[Value<'_>]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match arg {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&inspect(other)),
        }
    }
    out
}

/// Inspect a single value.
pub fn inspect(value: &Value<'_>) -> String {
    let mut out = String::new();
    Inspector::default().write_value(&mut out, value, 0);
    out
}

#[derive(Default)]
struct Inspector {
    /// Records currently being printed, for cycle detection.
    stack: Vec<*const ()>,
}

impl Inspector {
    fn write_value(&mut self, out: &mut String, value: &Value<'_>, depth: usize) {
        match value {
            Value::String(s) => write_quoted(out, s),
            Value::Array(array) => {
                let ptr = Rc::as_ptr(array) as *const ();
                if self.stack.contains(&ptr) {
                    out.push_str("[Circular *1]");
                    return;
                }
                if depth > MAX_DEPTH {
                    out.push_str("[Array]");
                    return;
                }
                let array = array.borrow();
                if array.is_empty() {
                    out.push_str("[]");
                    return;
                }
                self.stack.push(ptr);
                out.push_str("[ ");
                for (i, element) in array.elements.iter().take(MAX_ARRAY_LENGTH).enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, element, depth + 1);
                }
                let remaining = array.len().saturating_sub(MAX_ARRAY_LENGTH);
                if remaining > 0 {
                    let plural = if remaining == 1 { "" } else { "s" };
                    out.push_str(&format!(", ... {remaining} more item{plural}"));
                }
                out.push_str(" ]");
                self.stack.pop();
            }
            Value::Object(object) => {
                let ptr = Rc::as_ptr(object) as *const ();
                if self.stack.contains(&ptr) {
                    out.push_str("[Circular *1]");
                    return;
                }
                if depth > MAX_DEPTH {
                    out.push_str("[Object]");
                    return;
                }
                let entries = object.borrow().entries();
                if entries.is_empty() {
                    out.push_str("{}");
                    return;
                }
                self.stack.push(ptr);
                self.write_entries(out, &entries, depth);
                self.stack.pop();
            }
            Value::Function(function) => {
                write_function_tag(out, function);
                let entries: Vec<_> = function
                    .properties()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                if !entries.is_empty() && depth <= MAX_DEPTH {
                    out.push(' ');
                    self.write_entries(out, &entries, depth);
                }
            }
            other => out.push_str(&other.to_js_string()),
        }
    }

    fn write_entries(&mut self, out: &mut String, entries: &[(Rc<str>, Value<'_>)], depth: usize) {
        out.push_str("{ ");
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_key(out, key);
            out.push_str(": ");
            self.write_value(out, value, depth + 1);
        }
        out.push_str(" }");
    }
}

fn write_function_tag(out: &mut String, function: &FunctionObject<'_>) {
    let name = function.name();
    if name.is_empty() {
        out.push_str("[Function (anonymous)]");
    } else {
        out.push_str("[Function: ");
        out.push_str(&name);
        out.push(']');
    }
}

fn is_identifier_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_key(out: &mut String, key: &str) {
    if is_identifier_key(key) {
        out.push_str(key);
    } else {
        write_quoted(out, key);
    }
}

/// Quote a string with `'`, switching to `"` or `` ` `` when that avoids
/// escaping.
fn write_quoted(out: &mut String, s: &str) {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') && !s.contains("${") {
        '`'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
}
