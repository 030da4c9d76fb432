//! Mapping assembly: duplicate detection, merge-key (`<<`) expansion and
//! string-key coercion.
//!
//! Pairs are fed newest first (reverse document order). Every accepted pair is
//! appended and the list is reversed once at the end, so a key that displaces
//! an earlier entry settles where the winning pair appeared.
//!
//! Conflict rules:
//! - explicit key vs explicit key: [`Error::DuplicateKey`];
//! - explicit key vs merged key: the explicit pair wins wherever it appears;
//! - merged key vs merged key: the source declared first wins, including
//!   between the elements of a `<<: [*a, *b]` list.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::error::Error;
use crate::value::{KeyFingerprint, Mapping, Value};

#[derive(Debug)]
struct MergeEntry {
    key: Value,
    value: Value,
    merged: bool,
}

/// Working state for one mapping under construction.
#[derive(Debug, Default)]
pub(crate) struct MergeAccumulator {
    /// Accepted pairs, newest first. `None` marks a displaced entry.
    entries: Vec<Option<MergeEntry>>,
    index: AHashMap<KeyFingerprint, usize>,
}

impl MergeAccumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, fingerprint: KeyFingerprint, entry: MergeEntry) {
        self.index.insert(fingerprint, self.entries.len());
        self.entries.push(Some(entry));
    }

    /// Add a pair written directly in the mapping.
    pub(crate) fn explicit(&mut self, key: Value, value: Value) -> Result<(), Error> {
        let fingerprint = KeyFingerprint::of(&key);
        if let Some(&at) = self.index.get(&fingerprint) {
            match &self.entries[at] {
                Some(existing) if !existing.merged => {
                    return Err(Error::duplicate_key(key_text(&key).0));
                }
                _ => self.entries[at] = None,
            }
        }
        self.push(
            fingerprint,
            MergeEntry {
                key,
                value,
                merged: false,
            },
        );
        Ok(())
    }

    /// Expand the value of a `<<` key: a mapping, or a sequence of mappings.
    ///
    /// Nothing is merged unless the whole value is acceptable.
    pub(crate) fn merge(&mut self, source: Value) -> Result<(), Error> {
        let sources: SmallVec<[Mapping; 4]> = match source {
            Value::Map(map) => smallvec::smallvec![map],
            Value::Seq(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Map(map) => Ok(map),
                    _ => Err(illegal_merge()),
                })
                .collect::<Result<_, _>>()?,
            Value::Vector(v) if v.is_empty() => SmallVec::new(),
            _ => return Err(illegal_merge()),
        };
        // Pairs arrive newest first, so the last listed source goes in first
        // and each source's pairs are walked from the end.
        for map in sources.into_iter().rev() {
            for (key, value) in map.into_iter().rev() {
                self.merged(key, value);
            }
        }
        Ok(())
    }

    fn merged(&mut self, key: Value, value: Value) {
        let fingerprint = KeyFingerprint::of(&key);
        if let Some(&at) = self.index.get(&fingerprint) {
            match &self.entries[at] {
                Some(existing) if !existing.merged => return,
                _ => self.entries[at] = None,
            }
        }
        self.push(
            fingerprint,
            MergeEntry {
                key,
                value,
                merged: true,
            },
        );
    }

    /// Materialize the surviving pairs in document order.
    pub(crate) fn finish(self) -> Mapping {
        let mut map = Mapping::with_capacity(self.index.len());
        for entry in self.entries.into_iter().rev().flatten() {
            map.push_unique(entry.key, entry.value);
        }
        map
    }
}

fn illegal_merge() -> Error {
    Error::illegal_merge("value must be a map or a sequence of maps")
}

const EMPTY_KEY: &str = "Empty character vector used as a list name";
const LONG_KEY: &str = "Character vector of length greater than 1 used as a list name";

/// Text of a key coerced to a string, with the warning the coercion raises.
pub(crate) fn key_text(key: &Value) -> (String, Option<&'static str>) {
    match key {
        Value::Str(Some(s)) => (s.clone(), None),
        Value::Null => (String::new(), Some(EMPTY_KEY)),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(None) => {
            (scalar_key_text(key), None)
        }
        Value::Vector(v) => first_of(v.len(), || v.get(0)),
        Value::Factor(f) => first_of(f.len(), || {
            f.label(0).map(|l| Value::Str(l.map(str::to_owned)))
        }),
        Value::Seq(items) => first_of(items.len(), || items.first().cloned()),
        Value::Map(m) => first_of(m.len(), || m.values().next().cloned()),
        Value::Table(t) => first_of(t.columns.len(), || t.columns.first().map(|(_, c)| c.clone())),
        Value::Expr(e) => (e.source.clone(), None),
        Value::BadAnchor => (crate::tags::BAD_ANCHOR.to_owned(), None),
    }
}

fn first_of(len: usize, first: impl FnOnce() -> Option<Value>) -> (String, Option<&'static str>) {
    match (len, first()) {
        (0, _) | (_, None) => (String::new(), Some(EMPTY_KEY)),
        (1, Some(v)) => (key_text(&v).0, None),
        (_, Some(v)) => (key_text(&v).0, Some(LONG_KEY)),
    }
}

fn scalar_key_text(key: &Value) -> String {
    match key {
        Value::Bool(Some(true)) => "TRUE".to_owned(),
        Value::Bool(Some(false)) => "FALSE".to_owned(),
        Value::Int(Some(i)) => i.to_string(),
        Value::Float(Some(f)) if f.is_nan() => "NaN".to_owned(),
        Value::Float(Some(f)) if f.is_infinite() => {
            if *f > 0.0 { "Inf" } else { "-Inf" }.to_owned()
        }
        Value::Float(Some(f)) => f.to_string(),
        Value::Str(Some(s)) => s.clone(),
        _ => "NA".to_owned(),
    }
}
