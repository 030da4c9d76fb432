//! Tag conversion: turn a freshly built node and its tag id into the final value.
//!
//! A custom handler registered for the tag runs first. If it fails, or none is
//! registered, the built-in conversion for the tag applies. Tags with neither
//! (timestamps, base-60 numbers, application tags) leave the node as built.

use std::panic::{self, AssertUnwindSafe};

use ahash::AHashSet;

use crate::error::{Error, NodeKind, Warnings};
use crate::handlers::CodecContext;
use crate::location::Location;
use crate::merge::key_text;
use crate::parse_scalars::{IntError, parse_float, parse_int, parse_yaml11_bool};
use crate::resolver::resolve_implicit_tag;
use crate::tags::{self, Builtin};
use crate::value::{Expression, KeyFingerprint, Mapping, Value, Vector};

/// A converted node. The merge key only has meaning inside the enclosing
/// mapping and never reaches the final tree.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Value(Value),
    MergeKey,
}

pub(crate) struct Converter<'c> {
    ctx: &'c CodecContext,
}

impl<'c> Converter<'c> {
    pub(crate) fn new(ctx: &'c CodecContext) -> Self {
        Self { ctx }
    }

    /// Convert `value` (a `Str` for scalars, a `Seq` or `Map` for containers)
    /// under tag id `tag`.
    pub(crate) fn convert(
        &self,
        tag: &str,
        kind: NodeKind,
        value: Value,
        location: Location,
        warnings: &mut Warnings,
    ) -> Result<Node, Error> {
        if let Some(handler) = self.ctx.handlers.get(tag) {
            // A panicking handler is recovered like one that returned `Err`.
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (**handler)(&value)))
                .unwrap_or_else(|_| Err("handler panicked".to_owned()));
            match outcome {
                Ok(converted) => return Ok(Node::Value(converted)),
                Err(cause) => {
                    log::debug!("handler for '{tag}' failed: {cause}");
                    warnings.push(
                        format!("an error occurred when handling type '{tag}'; using default handler"),
                        location,
                    );
                }
            }
        }

        let Some(builtin) = Builtin::lookup(tag) else {
            return Ok(Node::Value(value));
        };
        self.builtin(builtin, tag, kind, value, location, warnings)
            .map_err(|err| err.with_location(location))
    }

    fn builtin(
        &self,
        builtin: Builtin,
        tag: &str,
        kind: NodeKind,
        value: Value,
        location: Location,
        warnings: &mut Warnings,
    ) -> Result<Node, Error> {
        let wrong_kind = || Error::invalid_tag(tag, kind);
        let text = match (&value, kind) {
            (Value::Str(Some(s)), NodeKind::Scalar) => Some(s.as_str()),
            _ => None,
        };
        let scalar = || text.ok_or_else(wrong_kind);

        let converted = match builtin {
            Builtin::Str => {
                scalar()?;
                value
            }
            Builtin::Seq => match value {
                Value::Seq(items) if kind == NodeKind::Sequence => match Vector::collapse(items) {
                    Ok(vector) => Value::Vector(vector),
                    Err(items) => Value::Seq(items),
                },
                _ => return Err(wrong_kind()),
            },
            Builtin::Map => match value {
                Value::Map(_) if kind == NodeKind::Mapping => value,
                _ => return Err(wrong_kind()),
            },
            Builtin::Null => Value::Null,
            Builtin::Bool => {
                let text = scalar()?;
                match parse_yaml11_bool(text) {
                    Some(b) => Value::Bool(Some(b)),
                    None => {
                        warnings.push(
                            format!("NAs introduced by coercion: {text} is not a logical"),
                            location,
                        );
                        Value::Bool(None)
                    }
                }
            }
            Builtin::BoolYes => {
                scalar()?;
                Value::Bool(Some(true))
            }
            Builtin::BoolNo => {
                scalar()?;
                Value::Bool(Some(false))
            }
            Builtin::Int | Builtin::IntHex | Builtin::IntOct => {
                let text = scalar()?;
                let radix = match builtin {
                    Builtin::IntHex => 16,
                    Builtin::IntOct => 8,
                    _ => match resolve_implicit_tag(text) {
                        tags::INT_HEX => 16,
                        tags::INT_OCT => 8,
                        _ => 10,
                    },
                };
                Value::Int(int_or_na(text, radix, location, warnings))
            }
            Builtin::Float => {
                let text = scalar()?;
                match resolve_implicit_tag(text) {
                    tags::FLOAT_NAN => Value::Float(Some(f64::NAN)),
                    tags::FLOAT_INF => Value::Float(Some(f64::INFINITY)),
                    tags::FLOAT_NEGINF => Value::Float(Some(f64::NEG_INFINITY)),
                    _ => match parse_float(text) {
                        Some(f) => Value::Float(Some(f)),
                        None => {
                            warnings.push(
                                format!("NAs introduced by coercion: {text} is not a real"),
                                location,
                            );
                            Value::Float(None)
                        }
                    },
                }
            }
            Builtin::FloatNan => {
                scalar()?;
                Value::Float(Some(f64::NAN))
            }
            Builtin::FloatInf => {
                scalar()?;
                Value::Float(Some(f64::INFINITY))
            }
            Builtin::FloatNegInf => {
                scalar()?;
                Value::Float(Some(f64::NEG_INFINITY))
            }
            Builtin::BoolNa => {
                scalar()?;
                Value::Bool(None)
            }
            Builtin::IntNa => {
                scalar()?;
                Value::Int(None)
            }
            Builtin::FloatNa => {
                scalar()?;
                Value::Float(None)
            }
            Builtin::StrNa => {
                scalar()?;
                Value::Str(None)
            }
            Builtin::Merge => {
                scalar()?;
                return Ok(Node::MergeKey);
            }
            Builtin::Omap => match value {
                Value::Seq(items) if kind == NodeKind::Sequence => Value::Map(omap(items)?),
                _ => return Err(wrong_kind()),
            },
            Builtin::Expr => {
                let source = scalar()?;
                self.expression(source, location, warnings)?
            }
        };
        Ok(Node::Value(converted))
    }

    fn expression(
        &self,
        source: &str,
        location: Location,
        warnings: &mut Warnings,
    ) -> Result<Value, Error> {
        match &self.ctx.evaluator {
            Some(evaluator) => evaluator.evaluate(source).map_err(|cause| {
                Error::coercion(format!("Could not evaluate expression: {source} ({cause})"))
            }),
            None => {
                warnings.push(
                    format!("expression evaluation is disabled; '!expr {source}' kept unevaluated"),
                    location,
                );
                Ok(Value::Expr(Expression::new(source)))
            }
        }
    }
}

fn int_or_na(text: &str, radix: u32, location: Location, warnings: &mut Warnings) -> Option<i64> {
    match parse_int(text, radix) {
        Ok(i) => Some(i),
        Err(IntError::Invalid) => {
            warnings.push(
                format!("NAs introduced by coercion: {text} is not an integer"),
                location,
            );
            None
        }
        Err(IntError::Overflow) => {
            warnings.push(
                format!("NAs introduced by coercion to integer range: {text}"),
                location,
            );
            None
        }
    }
}

/// Flatten a sequence of single-pair maps into one ordered map.
fn omap(items: Vec<Value>) -> Result<Mapping, Error> {
    let mut out = Mapping::with_capacity(items.len());
    let mut seen = AHashSet::with_capacity(items.len());
    for item in items {
        let pair = match item {
            Value::Map(map) if map.len() == 1 => map.into_iter().next(),
            _ => None,
        };
        let Some((key, value)) = pair else {
            return Err(Error::coercion("omap must be a sequence of maps"));
        };
        if !seen.insert(KeyFingerprint::of(&key)) {
            return Err(Error::coercion(format!(
                "Duplicate omap key: '{}'",
                key_text(&key).0
            )));
        }
        out.push_unique(key, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{ExprEvaluator, Handlers};

    fn run(ctx: &CodecContext, tag: &str, kind: NodeKind, value: Value) -> (Result<Node, Error>, Vec<String>) {
        let mut warnings = Warnings::default();
        let out = Converter::new(ctx).convert(tag, kind, value, Location::UNKNOWN, &mut warnings);
        let messages = warnings.into_vec().into_iter().map(|w| w.message).collect();
        (out, messages)
    }

    fn scalar(tag: &str, text: &str) -> (Result<Node, Error>, Vec<String>) {
        run(&CodecContext::default(), tag, NodeKind::Scalar, Value::from(text))
    }

    #[test]
    fn partial_integers_become_na_with_warning() {
        let (out, warnings) = scalar("int", "3abc");
        assert_eq!(out.unwrap(), Node::Value(Value::Int(None)));
        assert_eq!(warnings, ["NAs introduced by coercion: 3abc is not an integer"]);
    }

    #[test]
    fn explicit_int_follows_the_written_base() {
        assert_eq!(scalar("int", "0x1F").0.unwrap(), Node::Value(Value::from(31)));
        assert_eq!(scalar("int#oct", "017").0.unwrap(), Node::Value(Value::from(15)));
        let (out, warnings) = scalar("int", "99999999999999999999");
        assert_eq!(out.unwrap(), Node::Value(Value::Int(None)));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn floats_and_specials() {
        assert_eq!(scalar("float", "1.5").0.unwrap(), Node::Value(Value::from(1.5)));
        match scalar("float", ".NaN").0.unwrap() {
            Node::Value(Value::Float(Some(f))) => assert!(f.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            scalar("float#neginf", "-.inf").0.unwrap(),
            Node::Value(Value::float(f64::NEG_INFINITY))
        );
        let (out, warnings) = scalar("float", "1.5x");
        assert_eq!(out.unwrap(), Node::Value(Value::Float(None)));
        assert_eq!(warnings, ["NAs introduced by coercion: 1.5x is not a real"]);
    }

    #[test]
    fn na_family() {
        assert_eq!(scalar("int#na", ".na.integer").0.unwrap(), Node::Value(Value::Int(None)));
        assert_eq!(scalar("float#na", ".na.real").0.unwrap(), Node::Value(Value::Float(None)));
        assert_eq!(scalar("str#na", ".na.character").0.unwrap(), Node::Value(Value::Str(None)));
        assert_eq!(scalar("bool#na", ".na").0.unwrap(), Node::Value(Value::Bool(None)));
    }

    #[test]
    fn wrong_kind_is_an_error() {
        let err = scalar("omap", "x").0.unwrap_err();
        assert_eq!(err.to_string(), "Invalid tag: omap for scalar");
        let (out, _) = run(
            &CodecContext::default(),
            "int",
            NodeKind::Sequence,
            Value::Seq(vec![]),
        );
        assert_eq!(out.unwrap_err().to_string(), "Invalid tag: int for sequence");
    }

    #[test]
    fn unknown_tags_pass_through() {
        assert_eq!(
            scalar("timestamp#ymd", "2001-12-14").0.unwrap(),
            Node::Value(Value::from("2001-12-14"))
        );
        let items = Value::Seq(vec![Value::from(1), Value::from(2)]);
        let (out, _) = run(&CodecContext::default(), "point", NodeKind::Sequence, items.clone());
        assert_eq!(out.unwrap(), Node::Value(items));
    }

    #[test]
    fn seq_collapses_when_homogeneous() {
        let (out, _) = run(
            &CodecContext::default(),
            "seq",
            NodeKind::Sequence,
            Value::Seq(vec![Value::from(1), Value::Int(None)]),
        );
        assert_eq!(
            out.unwrap(),
            Node::Value(Value::Vector(Vector::Int(vec![Some(1), None])))
        );
    }

    #[test]
    fn omap_rules() {
        let pair = |k: &str, v: i64| Value::Map([(k, v)].into_iter().collect());
        let (out, _) = run(
            &CodecContext::default(),
            "omap",
            NodeKind::Sequence,
            Value::Seq(vec![pair("b", 1), pair("a", 2)]),
        );
        let Node::Value(Value::Map(m)) = out.unwrap() else {
            panic!("expected a map");
        };
        assert_eq!(m.keys().filter_map(Value::as_str).collect::<Vec<_>>(), ["b", "a"]);

        let (out, _) = run(
            &CodecContext::default(),
            "omap",
            NodeKind::Sequence,
            Value::Seq(vec![pair("a", 1), pair("a", 2)]),
        );
        assert_eq!(out.unwrap_err().to_string(), "Duplicate omap key: 'a'");

        let (out, _) = run(
            &CodecContext::default(),
            "omap",
            NodeKind::Sequence,
            Value::Seq(vec![Value::from(1)]),
        );
        assert_eq!(out.unwrap_err().to_string(), "omap must be a sequence of maps");
    }

    #[test]
    fn failing_handler_falls_back() {
        let mut handlers = Handlers::new();
        handlers.register("int", |_: &Value| Err("boom".to_owned()));
        let ctx = CodecContext::default().with_handlers(handlers);
        let (out, warnings) = run(&ctx, "int", NodeKind::Scalar, Value::from("7"));
        assert_eq!(out.unwrap(), Node::Value(Value::from(7)));
        assert_eq!(
            warnings,
            ["an error occurred when handling type 'int'; using default handler"]
        );
    }

    #[test]
    fn panicking_handler_falls_back() {
        let mut handlers = Handlers::new();
        handlers.register("float", |_: &Value| -> Result<Value, String> { panic!("broken handler") });
        let ctx = CodecContext::default().with_handlers(handlers);
        let (out, warnings) = run(&ctx, "float", NodeKind::Scalar, Value::from("2.5"));
        assert_eq!(out.unwrap(), Node::Value(Value::float(2.5)));
        assert_eq!(
            warnings,
            ["an error occurred when handling type 'float'; using default handler"]
        );
    }

    #[test]
    fn expressions_need_an_evaluator() {
        let (out, warnings) = scalar("expr", "1 + 1");
        assert_eq!(out.unwrap(), Node::Value(Value::Expr(Expression::new("1 + 1"))));
        assert_eq!(warnings.len(), 1);

        struct Fails;
        impl ExprEvaluator for Fails {
            fn evaluate(&self, _: &str) -> Result<Value, String> {
                Err("no".into())
            }
        }
        let ctx = CodecContext::default().with_evaluator(Fails);
        let (out, _) = run(&ctx, "expr", NodeKind::Scalar, Value::from("x"));
        assert!(matches!(out.unwrap_err(), Error::TagCoercion { .. }));
    }
}
