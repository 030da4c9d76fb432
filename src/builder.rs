//! Decode stack machine: events in, value tree out.
//!
//! Scalars are converted as soon as they arrive. Container starts push a
//! placeholder; the matching end pops everything above it, assembles the
//! container and converts it under its tag. Anchored nodes are copied into the
//! alias table when they complete, so an alias to a container that is still
//! open (a self reference) finds nothing and becomes [`Value::BadAnchor`].

use std::collections::HashMap;

use nohash_hasher::BuildNoHashHasher;
use saphyr_parser::ScalarStyle;

use crate::budget::BudgetBreach;
use crate::convert::{Converter, Node};
use crate::de::{Ev, Events};
use crate::error::{Error, NodeKind, Warning, Warnings};
use crate::handlers::CodecContext;
use crate::location::Location;
use crate::merge::{MergeAccumulator, key_text};
use crate::options::{AliasLimits, DecodeOptions};
use crate::resolver::resolve_implicit_tag;
use crate::tags::{self, normalize_tag};
use crate::value::Value;

type IdMap<V> = HashMap<usize, V, BuildNoHashHasher<usize>>;

#[derive(Debug)]
enum Entry {
    /// A finished node. `weight` is the number of nodes in its subtree.
    Node { node: Node, weight: usize },
    Start {
        kind: NodeKind,
        tag: Option<String>,
        anchor: usize,
        location: Location,
    },
}

#[derive(Debug)]
enum Anchored {
    /// The anchored container has started but not ended yet.
    Pending,
    Done { node: Node, weight: usize },
}

/// Result of building one stream.
#[derive(Debug)]
pub(crate) struct Built {
    pub(crate) value: Value,
    pub(crate) warnings: Vec<Warning>,
}

pub(crate) struct Builder<'c> {
    converter: Converter<'c>,
    string_keys: bool,
    alias_limits: AliasLimits,
    stack: Vec<Entry>,
    anchors: IdMap<Anchored>,
    expansions: IdMap<usize>,
    alias_nodes: usize,
    warnings: Warnings,
}

impl<'c> Builder<'c> {
    pub(crate) fn new(ctx: &'c CodecContext, options: &DecodeOptions) -> Self {
        let mut warnings = Warnings::default();
        for message in ctx.handlers.rejected_warnings() {
            warnings.push(message, Location::UNKNOWN);
        }
        Self {
            converter: Converter::new(ctx),
            string_keys: options.string_keys,
            alias_limits: options.alias_limits,
            stack: Vec::with_capacity(32),
            anchors: IdMap::default(),
            expansions: IdMap::default(),
            alias_nodes: 0,
            warnings,
        }
    }

    /// Consume `events` to the end and return the root of the last document.
    pub(crate) fn build<E: Events>(mut self, events: &mut E) -> Result<Built, Error> {
        while let Some(ev) = events.next()? {
            log::trace!("builder <- {ev:?}");
            match ev {
                Ev::DocumentStart { location } => self.document_start(location)?,
                Ev::Scalar {
                    value,
                    tag,
                    style,
                    anchor,
                    location,
                } => {
                    let tag = scalar_tag(tag.as_deref(), style, &value);
                    let node = self.converter.convert(
                        &tag,
                        NodeKind::Scalar,
                        Value::Str(Some(value)),
                        location,
                        &mut self.warnings,
                    )?;
                    self.push_node(node, 1, anchor);
                }
                Ev::SeqStart {
                    tag,
                    anchor,
                    location,
                } => self.start(NodeKind::Sequence, tag, anchor, location),
                Ev::MapStart {
                    tag,
                    anchor,
                    location,
                } => self.start(NodeKind::Mapping, tag, anchor, location),
                Ev::SeqEnd { location } => self.end_sequence(location)?,
                Ev::MapEnd { location } => self.end_mapping(location, events)?,
                Ev::Alias { anchor, location } => self.alias(anchor, location)?,
            }
        }
        let end = events.last_location();
        let value = self.finish(end)?;
        Ok(Built {
            value,
            warnings: self.warnings.into_vec(),
        })
    }

    fn document_start(&mut self, location: Location) -> Result<(), Error> {
        if self.stack.iter().any(|e| matches!(e, Entry::Start { .. })) {
            return Err(Error::structure("document started inside an open collection")
                .with_location(location));
        }
        self.stack.clear();
        self.anchors.clear();
        self.expansions.clear();
        Ok(())
    }

    fn start(&mut self, kind: NodeKind, tag: Option<String>, anchor: usize, location: Location) {
        if anchor != 0 {
            self.anchors.insert(anchor, Anchored::Pending);
        }
        self.stack.push(Entry::Start {
            kind,
            tag,
            anchor,
            location,
        });
    }

    fn push_node(&mut self, node: Node, weight: usize, anchor: usize) {
        if anchor != 0 {
            self.anchors.insert(
                anchor,
                Anchored::Done {
                    node: node.clone(),
                    weight,
                },
            );
        }
        self.stack.push(Entry::Node { node, weight });
    }

    fn alias(&mut self, anchor: usize, location: Location) -> Result<(), Error> {
        let Some(Anchored::Done { node, weight }) = self.anchors.get(&anchor) else {
            self.warnings.push(
                format!("alias refers to an unknown or unfinished anchor; using {}", tags::BAD_ANCHOR),
                location,
            );
            self.stack.push(Entry::Node {
                node: Node::Value(Value::BadAnchor),
                weight: 1,
            });
            return Ok(());
        };

        let expansions = self.expansions.entry(anchor).or_insert(0);
        *expansions += 1;
        if *expansions > self.alias_limits.max_alias_expansions_per_anchor {
            return Err(Error::budget(BudgetBreach::AliasExpansions {
                anchor,
                expansions: *expansions,
            })
            .with_location(location));
        }
        self.alias_nodes = self.alias_nodes.saturating_add(*weight);
        if self.alias_nodes > self.alias_limits.max_alias_nodes {
            return Err(Error::budget(BudgetBreach::AliasNodes {
                nodes: self.alias_nodes,
            })
            .with_location(location));
        }

        let entry = Entry::Node {
            node: node.clone(),
            weight: *weight,
        };
        self.stack.push(entry);
        Ok(())
    }

    /// Pop finished nodes down to the innermost start, which must be of `kind`.
    /// Nodes come back in document order.
    fn pop_until_start(
        &mut self,
        kind: NodeKind,
        location: Location,
    ) -> Result<(Vec<(Node, usize)>, Option<String>, usize, Location), Error> {
        let mut children = Vec::new();
        loop {
            match self.stack.pop() {
                Some(Entry::Node { node, weight }) => children.push((node, weight)),
                Some(Entry::Start {
                    kind: started,
                    tag,
                    anchor,
                    location: start_location,
                }) => {
                    if started != kind {
                        return Err(Error::structure(format!(
                            "{kind} end does not match the open {started}"
                        ))
                        .with_location(location));
                    }
                    children.reverse();
                    return Ok((children, tag, anchor, start_location));
                }
                None => {
                    return Err(Error::structure(format!("{kind} end without a start"))
                        .with_location(location));
                }
            }
        }
    }

    fn end_sequence(&mut self, location: Location) -> Result<(), Error> {
        let (children, tag, anchor, start) = self.pop_until_start(NodeKind::Sequence, location)?;
        let weight = 1 + children.iter().map(|(_, w)| w).sum::<usize>();
        let items = children.into_iter().map(|(node, _)| into_value(node)).collect();
        let tag = container_tag(tag.as_deref(), tags::SEQ);
        let node = self.converter.convert(
            &tag,
            NodeKind::Sequence,
            Value::Seq(items),
            start,
            &mut self.warnings,
        )?;
        self.push_node(node, weight, anchor);
        Ok(())
    }

    fn end_mapping<E: Events>(&mut self, location: Location, events: &mut E) -> Result<(), Error> {
        let (children, tag, anchor, start) = self.pop_until_start(NodeKind::Mapping, location)?;
        if children.len() % 2 != 0 {
            return Err(Error::structure("mapping key without a value").with_location(location));
        }
        let weight = 1 + children.iter().map(|(_, w)| w).sum::<usize>();

        let mut pairs = Vec::with_capacity(children.len() / 2);
        let mut it = children.into_iter().map(|(node, _)| node);
        while let (Some(key), Some(value)) = (it.next(), it.next()) {
            pairs.push((key, value));
        }

        let mut acc = MergeAccumulator::with_capacity(pairs.len());
        for (key, value) in pairs.into_iter().rev() {
            match key {
                Node::MergeKey => {
                    events.observe_merge_key()?;
                    acc.merge(into_value(value))
                        .map_err(|err| err.with_location(start))?;
                }
                Node::Value(key) => {
                    let key = self.coerce_key(key, start);
                    acc.explicit(key, into_value(value))
                        .map_err(|err| err.with_location(start))?;
                }
            }
        }

        let tag = container_tag(tag.as_deref(), tags::MAP);
        let node = self.converter.convert(
            &tag,
            NodeKind::Mapping,
            Value::Map(acc.finish()),
            start,
            &mut self.warnings,
        )?;
        self.push_node(node, weight, anchor);
        Ok(())
    }

    fn coerce_key(&mut self, key: Value, location: Location) -> Value {
        if !self.string_keys {
            return key;
        }
        if let Value::Str(Some(_)) = key {
            return key;
        }
        let (text, warning) = key_text(&key);
        if let Some(warning) = warning {
            self.warnings.push(warning, location);
        }
        Value::Str(Some(text))
    }

    fn finish(&mut self, location: Location) -> Result<Value, Error> {
        match self.stack.pop() {
            None => Ok(Value::Null),
            Some(Entry::Node { node, .. }) => {
                if self.stack.iter().any(|e| matches!(e, Entry::Start { .. })) {
                    return Err(Error::structure("unexpected end of input inside a collection")
                        .with_location(location));
                }
                Ok(into_value(node))
            }
            Some(Entry::Start { kind, location, .. }) => Err(Error::structure(format!(
                "{kind} started here was never closed"
            ))
            .with_location(location)),
        }
    }
}

/// A merge key outside key position is just the text it was written as.
fn into_value(node: Node) -> Value {
    match node {
        Node::Value(value) => value,
        Node::MergeKey => Value::str("<<"),
    }
}

/// Tag id for a scalar: a specific explicit tag, `str` for quoted text, else
/// the implicit type of the text. Block scalars are resolved like plain ones.
fn scalar_tag(explicit: Option<&str>, style: ScalarStyle, text: &str) -> String {
    match explicit.map(normalize_tag) {
        Some(tag) if !tag.is_empty() => tag.to_owned(),
        _ if matches!(style, ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted) => {
            tags::STR.to_owned()
        }
        _ => resolve_implicit_tag(text).to_owned(),
    }
}

fn container_tag(explicit: Option<&str>, default: &str) -> String {
    match explicit.map(normalize_tag) {
        Some(tag) if !tag.is_empty() => tag.to_owned(),
        _ => default.to_owned(),
    }
}
