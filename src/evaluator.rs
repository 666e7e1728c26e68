use std::{collections::HashMap, str::Chars};

use thiserror::Error;
use tracing::debug;

use crate::{ast::Node, value::Value};

/// A host function callable from a template as `{{ name arg ... }}`.
pub type Function = Box<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

/// Errors that can occur while rendering a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Value of the wrong type for the operation
    #[error("type error: {0}")]
    TypeError(String),

    /// Missing object key along a path
    #[error("access error: {0}")]
    AccessError(String),

    /// Path starting at a name no enclosing range binds
    #[error("undefined variable: `{0}` is not bound")]
    UndefinedVariable(String),

    /// Call of a function that was never registered
    #[error("undefined function: `{0}`")]
    UndefinedFunction(String),

    /// Node the evaluator does not implement
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// String literal whose escapes do not decode to valid UTF-8
    #[error("invalid string literal {0:?}")]
    InvalidString(String),
}

/// Evaluation context: the data root and the range bindings in scope.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    /// The data context (referred to by `$`)
    pub root: &'a Value,
    /// Range bindings, innermost last
    bindings: Vec<(String, Value)>,
}

impl<'a> EvalContext<'a> {
    pub fn new(root: &'a Value) -> Self {
        EvalContext {
            root,
            bindings: vec![],
        }
    }

    /// Create a child context with extra bindings shadowing outer ones
    pub fn with_bindings(&self, bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut child = self.clone();
        child.bindings.extend(bindings);
        child
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

/// Renders template trees against a data context.
///
/// Comparison, logical and coalescing operators parse, but evaluating them
/// fails with [`EvalError::Unsupported`].
#[derive(Default)]
pub struct Evaluator {
    functions: HashMap<String, Function>,
}

impl Evaluator {
    /// Creates an evaluator with no registered functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function for `{{ name arg ... }}` calls, replacing any
    /// previous one of the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use kriti_lang::{Evaluator, Value, parse};
    ///
    /// let mut evaluator = Evaluator::new();
    /// evaluator.register("count", |args| {
    ///     Ok(Value::Number(args.first().and_then(|v| v.as_array()).map_or(0, |a| a.len()) as f64))
    /// });
    ///
    /// let template = parse(r#"{"total": {{ count $.items }}}"#).unwrap().unwrap();
    /// let data = Value::Object(vec![(
    ///     "items".to_string(),
    ///     Value::Array(vec![Value::Null, Value::Null]),
    /// )]);
    ///
    /// let result = evaluator.eval(&template, &data).unwrap();
    /// assert_eq!(result.get("total"), Some(&Value::Number(2.0)));
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
        self
    }

    /// Evaluates a template tree with `data` as `$`.
    pub fn eval(&self, node: &Node, data: &Value) -> Result<Value, EvalError> {
        let ctx = EvalContext::new(data);
        self.eval_node(node, &ctx)
    }

    pub fn eval_node(&self, node: &Node, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match node {
            Node::String(raw) => decode_string(raw).map(Value::String),
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::Boolean(b) => Ok(Value::Boolean(*b)),
            Node::Null => Ok(Value::Null),
            Node::Array(elements) => elements
                .iter()
                .map(|element| self.eval_node(element, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Node::Object(properties) => {
                let mut pairs = Vec::with_capacity(properties.len());
                for property in properties {
                    let key = decode_string(&property.key)?;
                    pairs.push((key, self.eval_node(&property.value, ctx)?));
                }
                Ok(Value::Object(pairs))
            }
            Node::Path(segments) => self.resolve_path(segments, ctx),
            Node::Range {
                index_ident,
                value_ident,
                iterable,
                body,
            } => self.eval_range(index_ident, value_ident, iterable, body, ctx),
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                let condition = self.eval_node(condition, ctx)?;
                let Some(truth) = condition.as_bool() else {
                    return Err(EvalError::TypeError(format!(
                        "if condition must be a boolean, got {}",
                        condition.type_name()
                    )));
                };
                match (truth, else_body) {
                    (true, _) => self.eval_node(then_body, ctx),
                    (false, Some(else_body)) => self.eval_node(else_body, ctx),
                    (false, None) => Ok(Value::Null),
                }
            }
            Node::Call { name, args } => {
                let function = self
                    .functions
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedFunction(name.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_node(arg, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(target: "kriti::evaluator", function = %name, args = args.len(), "call");
                function(&args)
            }
            Node::Binary { op, .. } => Err(EvalError::Unsupported(format!(
                "operator `{}` cannot be evaluated",
                op
            ))),
        }
    }

    fn eval_range(
        &self,
        index_ident: &str,
        value_ident: &str,
        iterable: &Node,
        body: &Node,
        ctx: &EvalContext<'_>,
    ) -> Result<Value, EvalError> {
        let items = match self.eval_node(iterable, ctx)? {
            Value::Array(items) => items,
            other => {
                return Err(EvalError::TypeError(format!(
                    "range expects an array, got {}",
                    other.type_name()
                )));
            }
        };

        debug!(target: "kriti::evaluator", items = items.len(), "range");

        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let scope = ctx.with_bindings([
                (index_ident.to_string(), Value::Number(index as f64)),
                (value_ident.to_string(), item),
            ]);
            results.push(self.eval_node(body, &scope)?);
        }
        Ok(Value::Array(results))
    }

    fn resolve_path(&self, segments: &[String], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(EvalError::AccessError("empty path".to_string()));
        };

        let mut current = if first == "$" {
            ctx.root
        } else {
            ctx.lookup(first)
                .ok_or_else(|| EvalError::UndefinedVariable(first.clone()))?
        };

        for (depth, segment) in rest.iter().enumerate() {
            if !matches!(current, Value::Object(_)) {
                return Err(EvalError::TypeError(format!(
                    "cannot access `{}` on {}",
                    segment,
                    current.type_name()
                )));
            }
            current = current.get(segment).ok_or_else(|| {
                EvalError::AccessError(format!(
                    "`{}` not found in `{}`",
                    segment,
                    segments[..depth + 1].join(".")
                ))
            })?;
        }

        Ok(current.clone())
    }
}

/// Decodes the escapes of a raw string literal.
///
/// `\uXXXX` escapes forming a surrogate pair are combined; a lone surrogate
/// is an error.
pub fn decode_string(raw: &str) -> Result<String, EvalError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let decoded = match chars.next() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{08}',
            Some('f') => '\u{0c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => decode_unicode(&mut chars, raw)?,
            _ => return Err(EvalError::InvalidString(raw.to_string())),
        };
        out.push(decoded);
    }

    Ok(out)
}

fn decode_unicode(chars: &mut Chars<'_>, raw: &str) -> Result<char, EvalError> {
    let invalid = || EvalError::InvalidString(raw.to_string());

    let high = read_hex4(chars).ok_or_else(invalid)?;
    let code = if (0xD800..0xDC00).contains(&high) {
        if chars.next() != Some('\\') || chars.next() != Some('u') {
            return Err(invalid());
        }
        let low = read_hex4(chars).ok_or_else(invalid)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(invalid());
        }
        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
    } else {
        high
    };

    char::from_u32(code).ok_or_else(invalid)
}

fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}
