//! Value walker for the encoder.
//!
//! Lowers a [`Value`] into writer [`Node`]s: scalar text and the style each
//! scalar asks for, `!omap` / `!expr` tags, and the row or column layout of
//! tables. Layout itself is left to [`crate::ser::YamlWriter`].

use ahash::AHashMap;

use crate::encode_options::EncodeOptions;
use crate::handlers::CodecContext;
use crate::resolver::resolve_implicit_tag;
use crate::ser::{Node, Result, Style};
use crate::ser_error::EmitError;
use crate::tags;
use crate::value::{Expression, Factor, Mapping, Table, Value, Vector};
use crate::zmij_format::push_float_string;

const NA_LOGICAL: &str = ".na";
const NA_INTEGER: &str = ".na.integer";
const NA_REAL: &str = ".na.real";
const NA_CHARACTER: &str = ".na.character";

/// Style a string asks for.
///
/// Text the resolver would read back as anything but a string is
/// single-quoted; text with line breaks is a literal block.
pub(crate) fn string_style(s: &str) -> Style {
    if resolve_implicit_tag(s) != tags::STR {
        Style::SingleQuoted
    } else if s.contains('\n') {
        Style::Literal
    } else {
        Style::Any
    }
}

fn str_node(s: Option<&str>) -> Node {
    match s {
        Some(s) => Node::scalar(s, string_style(s)),
        None => Node::scalar(NA_CHARACTER, Style::Any),
    }
}

fn bool_node(b: Option<bool>) -> Node {
    let text = match b {
        Some(true) => "yes",
        Some(false) => "no",
        None => NA_LOGICAL,
    };
    Node::scalar(text, Style::Any)
}

fn int_node(i: Option<i64>) -> Node {
    match i {
        Some(i) => Node::scalar(i.to_string(), Style::Any),
        None => Node::scalar(NA_INTEGER, Style::Any),
    }
}

pub(crate) struct Emitter<'a> {
    options: &'a EncodeOptions,
    context: &'a CodecContext,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(options: &'a EncodeOptions, context: &'a CodecContext) -> Self {
        Self { options, context }
    }

    pub(crate) fn node(&self, value: &Value) -> Result<Node> {
        Ok(match value {
            Value::Null => Node::scalar("~", Style::Any),
            Value::Bool(b) => bool_node(*b),
            Value::Int(i) => int_node(*i),
            Value::Float(f) => self.float_node(*f),
            Value::Str(s) => str_node(s.as_deref()),
            Value::Vector(v) => self.vector_node(v),
            Value::Factor(f) => factor_node(f),
            Value::Seq(items) => Node::seq(
                items
                    .iter()
                    .map(|item| self.node(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Map(map) => self.map_node(map)?,
            Value::Table(table) => self.table_node(table)?,
            Value::Expr(expr) => self.expr_node(expr)?,
            Value::BadAnchor => return Err(EmitError::unsupported(value.type_name())),
        })
    }

    fn float_node(&self, f: Option<f64>) -> Node {
        match f {
            Some(f) => {
                let mut text = String::new();
                push_float_string(&mut text, f, self.options.precision);
                Node::scalar(text, Style::Any)
            }
            None => Node::scalar(NA_REAL, Style::Any),
        }
    }

    /// Every element of a vector is its own scalar, even for length one.
    fn vector_node(&self, vector: &Vector) -> Node {
        let items = match vector {
            Vector::Bool(items) => items.iter().map(|b| bool_node(*b)).collect(),
            Vector::Int(items) => items.iter().map(|i| int_node(*i)).collect(),
            Vector::Float(items) => items.iter().map(|f| self.float_node(*f)).collect(),
            Vector::Str(items) => items.iter().map(|s| str_node(s.as_deref())).collect(),
        };
        Node::seq(items)
    }

    fn map_node(&self, map: &Mapping) -> Result<Node> {
        let pairs = map
            .iter()
            .map(|(k, v)| Ok((self.node(k)?, self.node(v)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.keyed(pairs))
    }

    /// A mapping, or with `use_omap` an `!omap` sequence of single-pair mappings.
    fn keyed(&self, pairs: Vec<(Node, Node)>) -> Node {
        if self.options.use_omap {
            Node::Seq {
                tag: Some(tags::LOCAL_OMAP),
                items: pairs.into_iter().map(|pair| Node::map(vec![pair])).collect(),
            }
        } else {
            Node::map(pairs)
        }
    }

    fn table_node(&self, table: &Table) -> Result<Node> {
        let rows = table
            .rows()
            .ok_or_else(|| EmitError::unsupported("data.frame with columns of unequal length"))?;

        if self.options.column_major || rows == 0 {
            let pairs = table
                .columns
                .iter()
                .map(|(name, column)| Ok((str_node(Some(name)), self.node(column)?)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(self.keyed(pairs));
        }

        let mut items = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut pairs = Vec::with_capacity(table.columns.len());
            for (name, column) in &table.columns {
                let cell = column.cell(row).unwrap_or(Value::Null);
                pairs.push((str_node(Some(name)), self.node(&cell)?));
            }
            items.push(self.keyed(pairs));
        }
        Ok(Node::seq(items))
    }

    fn expr_node(&self, expr: &Expression) -> Result<Node> {
        let source = match &self.context.deparser {
            Some(deparser) => deparser
                .deparse(expr)
                .map_err(|msg| EmitError::Deparse { msg })?,
            None => expr.source.clone(),
        };
        let text = source.lines().map(str::trim).collect::<Vec<_>>().join("\n");
        Ok(Node::Scalar {
            text,
            style: Style::Literal,
            tag: Some(tags::LOCAL_EXPR),
        })
    }
}

/// Labels are styled like strings; the style is worked out once per label.
fn factor_node(factor: &Factor) -> Node {
    let mut styles: AHashMap<&str, Style> = AHashMap::new();
    let items = (0..factor.len())
        .map(|i| match factor.label(i).flatten() {
            Some(label) => {
                let style = *styles.entry(label).or_insert_with(|| string_style(label));
                Node::scalar(label, style)
            }
            None => Node::scalar(NA_CHARACTER, Style::Any),
        })
        .collect();
    Node::seq(items)
}
