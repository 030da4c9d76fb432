//! The dynamically typed document tree.
//!
//! Scalars carry an `Option` payload: `None` is the NA ("missing value")
//! member of that type, which YAML spells `.na`, `.na.integer`, `.na.real`
//! and `.na.character`.

use std::fmt;

/// A decoded YAML node, or a tree to encode.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(Option<bool>),
    Int(Option<i64>),
    /// `Some(NaN)` is `.nan`; `None` is the NA real.
    Float(Option<f64>),
    Str(Option<String>),
    /// Homogeneous primitive array, produced when every element of a
    /// sequence is a scalar of the same type.
    Vector(Vector),
    /// Labeled categorical vector. Encoded like a string vector.
    Factor(Factor),
    /// Heterogeneous list.
    Seq(Vec<Value>),
    Map(Mapping),
    /// Named, equal-length columns.
    Table(Table),
    /// Executable-code scalar (`!expr`) kept unevaluated.
    Expr(Expression),
    /// Stand-in for an alias whose anchor had no finished value.
    BadAnchor,
}

impl Value {
    pub fn str<S: Into<String>>(s: S) -> Self {
        Value::Str(Some(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Value::Int(Some(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Float(Some(f))
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(Some(b))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for the NA member of any scalar type.
    pub fn is_na(&self) -> bool {
        matches!(
            self,
            Value::Bool(None) | Value::Int(None) | Value::Float(None) | Value::Str(None)
        )
    }

    pub fn is_bad_anchor(&self) -> bool {
        matches!(self, Value::BadAnchor)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => *i,
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => *f,
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => *b,
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Vector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a string key in a map (or a column in a table).
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            Value::Table(t) => t.column(key),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "logical",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Str(_) => "character",
            Value::Vector(v) => v.type_name(),
            Value::Factor(_) => "factor",
            Value::Seq(_) => "list",
            Value::Map(_) => "map",
            Value::Table(_) => "data.frame",
            Value::Expr(_) => "expression",
            Value::BadAnchor => "bad-anchor",
        }
    }

    /// Number of elements when viewed as a column: scalars count as one.
    pub(crate) fn column_len(&self) -> usize {
        match self {
            Value::Vector(v) => v.len(),
            Value::Factor(f) => f.len(),
            Value::Seq(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    /// The `index`-th cell of a column-like value.
    pub(crate) fn cell(&self, index: usize) -> Option<Value> {
        match self {
            Value::Vector(v) => v.get(index),
            Value::Factor(f) => f.label(index).map(|l| Value::Str(l.map(str::to_owned))),
            Value::Seq(items) => items.get(index).cloned(),
            other if index == 0 => Some(other.clone()),
            _ => None,
        }
    }

    /// The primitive kind of a length-one scalar, if it is one.
    pub(crate) fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Int(_) => Some(ScalarKind::Int),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Str(_) => Some(ScalarKind::Str),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Some(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Value::Vector(v)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Map(m)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

/// A flat, homogeneous primitive array. `None` elements are NA.
#[derive(Clone, Debug, PartialEq)]
pub enum Vector {
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
}

impl Vector {
    pub fn len(&self) -> usize {
        match self {
            Vector::Bool(v) => v.len(),
            Vector::Int(v) => v.len(),
            Vector::Float(v) => v.len(),
            Vector::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` as a scalar [`Value`].
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Vector::Bool(v) => v.get(index).map(|b| Value::Bool(*b)),
            Vector::Int(v) => v.get(index).map(|i| Value::Int(*i)),
            Vector::Float(v) => v.get(index).map(|f| Value::Float(*f)),
            Vector::Str(v) => v.get(index).map(|s| Value::Str(s.clone())),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Vector::Bool(_) => "logical",
            Vector::Int(_) => "integer",
            Vector::Float(_) => "double",
            Vector::Str(_) => "character",
        }
    }

    /// Collapse a list of same-kind scalars into a vector.
    ///
    /// Returns the items back unchanged when the list is empty or mixes kinds.
    pub(crate) fn collapse(items: Vec<Value>) -> Result<Vector, Vec<Value>> {
        let Some(kind) = items.first().and_then(Value::scalar_kind) else {
            return Err(items);
        };
        if items.iter().any(|item| item.scalar_kind() != Some(kind)) {
            return Err(items);
        }
        let vector = match kind {
            ScalarKind::Bool => Vector::Bool(items.into_iter().filter_map(|v| match v {
                Value::Bool(b) => Some(b),
                _ => None,
            }).collect()),
            ScalarKind::Int => Vector::Int(items.into_iter().filter_map(|v| match v {
                Value::Int(i) => Some(i),
                _ => None,
            }).collect()),
            ScalarKind::Float => Vector::Float(items.into_iter().filter_map(|v| match v {
                Value::Float(f) => Some(f),
                _ => None,
            }).collect()),
            ScalarKind::Str => Vector::Str(items.into_iter().filter_map(|v| match v {
                Value::Str(s) => Some(s),
                _ => None,
            }).collect()),
        };
        Ok(vector)
    }
}

/// Categorical vector: `codes` index into `levels`; `None` is NA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factor {
    pub levels: Vec<String>,
    pub codes: Vec<Option<usize>>,
}

impl Factor {
    pub fn new(levels: Vec<String>, codes: Vec<Option<usize>>) -> Self {
        Self { levels, codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Label at `index`: `Some(None)` for NA or out-of-range codes.
    pub fn label(&self, index: usize) -> Option<Option<&str>> {
        let code = self.codes.get(index)?;
        Some(code.and_then(|c| self.levels.get(c)).map(String::as_str))
    }
}

/// Insertion-ordered map with unique keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(Value, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a pair. An equal key is replaced in place and its old value returned.
    pub fn insert<K: Into<Value>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Append without a uniqueness check; callers guarantee distinct keys.
    pub(crate) fn push_unique(&mut self, key: Value, value: Value) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn get_value(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Tabular value: named columns, each a vector, factor or list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<(String, Value)>,
}

impl Table {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of rows, or `None` when the columns disagree.
    pub fn rows(&self) -> Option<usize> {
        let mut lengths = self.columns.iter().map(|(_, c)| c.column_len());
        let first = lengths.next().unwrap_or(0);
        lengths.all(|len| len == first).then_some(first)
    }
}

/// Unevaluated `!expr` source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    pub source: String,
}

impl Expression {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Hashable structural identity of a key, used for duplicate detection.
///
/// Floats compare by bit pattern with `-0.0` folded onto `0.0` and every NaN
/// onto one canonical NaN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum KeyFingerprint {
    Null,
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<u64>),
    Str(Option<String>),
    Vector(Vec<KeyFingerprint>),
    Seq(Vec<KeyFingerprint>),
    Map(Vec<(KeyFingerprint, KeyFingerprint)>),
    Expr(String),
    BadAnchor,
}

fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl KeyFingerprint {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Null => KeyFingerprint::Null,
            Value::Bool(b) => KeyFingerprint::Bool(*b),
            Value::Int(i) => KeyFingerprint::Int(*i),
            Value::Float(f) => KeyFingerprint::Float(f.map(float_bits)),
            Value::Str(s) => KeyFingerprint::Str(s.clone()),
            Value::Vector(v) => KeyFingerprint::Vector(v.values().map(|x| Self::of(&x)).collect()),
            Value::Factor(f) => KeyFingerprint::Vector(
                (0..f.len())
                    .map(|i| KeyFingerprint::Str(f.label(i).flatten().map(str::to_owned)))
                    .collect(),
            ),
            Value::Seq(items) => KeyFingerprint::Seq(items.iter().map(Self::of).collect()),
            Value::Map(m) => {
                KeyFingerprint::Map(m.iter().map(|(k, v)| (Self::of(k), Self::of(v))).collect())
            }
            Value::Table(t) => KeyFingerprint::Map(
                t.columns
                    .iter()
                    .map(|(n, c)| (KeyFingerprint::Str(Some(n.clone())), Self::of(c)))
                    .collect(),
            ),
            Value::Expr(e) => KeyFingerprint::Expr(e.source.clone()),
            Value::BadAnchor => KeyFingerprint::BadAnchor,
        }
    }
}
