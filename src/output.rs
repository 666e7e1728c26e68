//! JSON output for rendered Kriti values.
//!
//! Objects print in insertion order and duplicate keys are written as many
//! times as they occur, so the output mirrors the template's own layout.
//!
//! # Examples
//!
//! ```
//! use kriti_lang::Value;
//! use kriti_lang::output::{to_json, to_json_pretty};
//!
//! let value = Value::Object(vec![
//!     ("b".to_string(), Value::Number(1.0)),
//!     ("a".to_string(), Value::Array(vec![Value::Null])),
//! ]);
//!
//! assert_eq!(to_json(&value), r#"{"b":1,"a":[null]}"#);
//! assert_eq!(to_json_pretty(&value), "{\n  \"b\": 1,\n  \"a\": [\n    null\n  ]\n}");
//! ```

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.print_value(&mut out, value, 0);
        out
    }

    fn print_value(&self, out: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.print_number(out, *n),
            Value::String(s) => self.print_string(out, s),
            Value::Array(items) => {
                self.print_container(out, '[', ']', items, indent, |out, item, indent| {
                    self.print_value(out, item, indent)
                })
            }
            Value::Object(pairs) => {
                self.print_container(out, '{', '}', pairs, indent, |out, (key, value), indent| {
                    self.print_string(out, key);
                    out.push(':');
                    if self.pretty {
                        out.push(' ');
                    }
                    self.print_value(out, value, indent);
                })
            }
        }
    }

    fn print_container<T>(
        &self,
        out: &mut String,
        open: char,
        close: char,
        items: &[T],
        indent: usize,
        mut print_item: impl FnMut(&mut String, &T, usize),
    ) {
        out.push(open);
        if items.is_empty() {
            out.push(close);
            return;
        }

        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if self.pretty {
                out.push('\n');
                out.push_str(&"  ".repeat(indent + 1));
            }
            print_item(out, item, indent + 1);
        }

        if self.pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(indent));
        }
        out.push(close);
    }

    /// Whole numbers print without a fraction; NaN and infinities have no
    /// JSON form and print as `null`.
    fn print_number(&self, out: &mut String, n: f64) {
        if n.is_finite() {
            out.push_str(&n.to_string());
        } else {
            out.push_str("null");
        }
    }

    fn print_string(&self, out: &mut String, s: &str) {
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{08}' => out.push_str("\\b"),
                '\u{0c}' => out.push_str("\\f"),
                // Unicode escape for the remaining control chars
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
    }
}

// Convenience functions

/// Converts a Value to compact JSON.
///
/// # Examples
///
/// ```
/// use kriti_lang::Value;
/// use kriti_lang::output::to_json;
///
/// let value = Value::Array(vec![Value::Number(1.5), Value::String("a\"b".into())]);
/// assert_eq!(to_json(&value), r#"[1.5,"a\"b"]"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to JSON with 2-space indentation, one element or
/// property per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
