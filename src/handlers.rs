//! Caller-supplied collaborators: per-tag handlers, the expression evaluator
//! and the deparser used for `!expr` output.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tags::{self, RESERVED};
use crate::value::{Expression, Value};

/// A custom conversion for one tag id.
///
/// It receives the value the built-in conversion would start from (the
/// scalar as a string, or the finished sequence/mapping) and returns the
/// replacement. An `Err` or a panic is recovered: the decoder warns and falls
/// back to the built-in conversion.
pub type Handler = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Registry of custom tag handlers, keyed by normalized tag id.
/// Cloning shares the handlers.
///
/// ```rust
/// use dynyaml::{Handlers, Value};
///
/// let mut handlers = Handlers::new();
/// handlers.register("!upper", |v: &Value| {
///     Ok(Value::from(v.as_str().unwrap_or_default().to_uppercase()))
/// });
/// let value = dynyaml::decode("!upper abc", true, &handlers).unwrap();
/// assert_eq!(value, Value::from("ABC"));
/// ```
#[derive(Clone, Default)]
pub struct Handlers {
    table: HashMap<String, Handler>,
    rejected: Vec<String>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `tag`. The tag may be given in any spelling
    /// (`!!int`, `tag:yaml.org,2002:int`, `int`).
    ///
    /// Returns false, and logs a warning, for the reserved tags `merge`,
    /// `default` and the bad-anchor sentinel.
    pub fn register<F>(&mut self, tag: &str, handler: F) -> bool
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        let id = tags::normalize_tag(tag);
        if RESERVED.contains(&id) {
            log::warn!("{}", rejected_message(id));
            self.rejected.push(id.to_owned());
            return false;
        }
        self.table.insert(id.to_owned(), Arc::new(handler));
        true
    }

    pub fn get(&self, tag: &str) -> Option<&Handler> {
        self.table.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.table.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Tags whose registration was refused, as warnings to replay per decode.
    pub(crate) fn rejected_warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.rejected.iter().map(|id| rejected_message(id))
    }
}

fn rejected_message(id: &str) -> String {
    format!("custom handling of {id} type is not allowed; handler ignored")
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.table.keys().collect();
        tags.sort();
        f.debug_struct("Handlers")
            .field("tags", &tags)
            .field("rejected", &self.rejected)
            .finish()
    }
}

impl<S, F> FromIterator<(S, F)> for Handlers
where
    S: AsRef<str>,
    F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = (S, F)>>(iter: I) -> Self {
        let mut handlers = Handlers::new();
        for (tag, handler) in iter {
            handlers.register(tag.as_ref(), handler);
        }
        handlers
    }
}

/// Evaluates `!expr` scalars. Without one, they decode to [`Value::Expr`].
pub trait ExprEvaluator: Send + Sync {
    fn evaluate(&self, source: &str) -> Result<Value, String>;
}

/// Renders an [`Expression`] back to source text for `!expr` output.
/// Without one, the expression's stored source is written.
pub trait Deparser: Send + Sync {
    fn deparse(&self, expr: &Expression) -> Result<String, String>;
}

/// Per-call holder of the optional collaborators. Read-only during a call.
///
/// ```rust
/// use dynyaml::{CodecContext, ExprEvaluator, Value};
///
/// struct Sum;
///
/// impl ExprEvaluator for Sum {
///     fn evaluate(&self, source: &str) -> Result<Value, String> {
///         let mut total = 0;
///         for term in source.split('+') {
///             total += term.trim().parse::<i64>().map_err(|e| e.to_string())?;
///         }
///         Ok(Value::from(total))
///     }
/// }
///
/// let ctx = CodecContext::default().with_evaluator(Sum);
/// let options = dynyaml::DecodeOptions::default();
/// let value = dynyaml::from_str_with_options("!expr 1 + 2", &options, &ctx).unwrap();
/// assert_eq!(value, Value::from(3));
/// ```
#[derive(Default)]
pub struct CodecContext {
    pub handlers: Handlers,
    pub evaluator: Option<Box<dyn ExprEvaluator>>,
    pub deparser: Option<Box<dyn Deparser>>,
}

impl CodecContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Opt in to evaluating `!expr` scalars. This runs caller code on
    /// document content; only enable it for trusted input.
    pub fn with_evaluator<E: ExprEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn with_deparser<D: Deparser + 'static>(mut self, deparser: D) -> Self {
        self.deparser = Some(Box::new(deparser));
        self
    }
}

impl fmt::Debug for CodecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecContext")
            .field("handlers", &self.handlers)
            .field("evaluator", &self.evaluator.as_ref().map(|_| "set"))
            .field("deparser", &self.deparser.as_ref().map(|_| "set"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_tags_are_refused() {
        let mut handlers = Handlers::new();
        assert!(!handlers.register("merge", |v: &Value| Ok(v.clone())));
        assert!(!handlers.register("!!default", |v: &Value| Ok(v.clone())));
        assert!(!handlers.register("_yaml.bad-anchor_", |v: &Value| Ok(v.clone())));
        assert!(handlers.is_empty());
        assert_eq!(handlers.rejected_warnings().count(), 3);
    }

    #[test]
    fn tags_are_normalized_on_registration() {
        let mut handlers = Handlers::new();
        assert!(handlers.register("tag:yaml.org,2002:int", |_: &Value| Ok(Value::Null)));
        assert!(handlers.contains("int"));
        assert!(!handlers.contains("!!int"));
    }

    #[test]
    fn collects_from_pairs() {
        fn null(_: &Value) -> Result<Value, String> {
            Ok(Value::Null)
        }
        let pairs: [(&str, fn(&Value) -> Result<Value, String>); 2] = [("a", null), ("!b", null)];
        let handlers: Handlers = pairs.into_iter().collect();
        assert_eq!(handlers.len(), 2);
        assert!(handlers.contains("b"));
    }
}
