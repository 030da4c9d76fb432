//! Live events: a compact layer over the YAML event stream from `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Provide owned, simplified events (`Ev`) for the tree builder.
//! - Hide stream markers; surface document starts so anchors can be reset.
//! - Track source locations for diagnostics.
//! - Enforce the event budget before the builder sees an event.
//!
//! Anchors and aliases are passed through as ids. Resolving them is the
//! builder's job: it keeps the built node, not the event slice, so an alias
//! costs one clone instead of a replay.

use std::borrow::Cow;

use saphyr_parser::{Event, Parser, StrInput};

use crate::budget::{Budget, BudgetEnforcer, BudgetReport};
use crate::de::{Ev, Events};
use crate::error::Error;
use crate::location::{Location, location_from_span};

/// Live event source that wraps `saphyr_parser::Parser`.
pub(crate) struct LiveEvents<'a> {
    /// Underlying streaming parser that produces raw events from the input.
    parser: Parser<'a, StrInput<'a>>,
    budget: Option<BudgetEnforcer>,
    /// Location of the last yielded event (for better error reporting).
    last_location: Location,
}

impl<'a> LiveEvents<'a> {
    pub(crate) fn new(input: &'a str, budget: Option<Budget>) -> Self {
        Self {
            parser: Parser::new_from_str(input),
            budget: budget.map(BudgetEnforcer::new),
            last_location: Location::UNKNOWN,
        }
    }

    fn observe(&mut self, ev: &Ev) -> Result<(), Error> {
        match self.budget.as_mut() {
            Some(budget) => budget
                .observe(ev)
                .map_err(|breach| Error::budget(breach).with_location(ev.location())),
            None => Ok(()),
        }
    }

    /// Finalize the stream: surface delayed budget breaches and return the counters.
    pub(crate) fn finish(&mut self) -> Result<Option<BudgetReport>, Error> {
        let Some(budget) = self.budget.take() else {
            return Ok(None);
        };
        let report = budget.finalize();
        if let Some(breach) = report.breached.clone() {
            return Err(Error::budget(breach).with_location(self.last_location));
        }
        Ok(Some(report))
    }

    fn translate(raw: Event<'a>, location: Location) -> Option<Ev> {
        Some(match raw {
            Event::StreamStart | Event::StreamEnd | Event::DocumentEnd | Event::Nothing => {
                return None;
            }
            Event::DocumentStart(_) => Ev::DocumentStart { location },
            Event::Scalar(val, style, anchor, tag) => Ev::Scalar {
                value: match val {
                    Cow::Borrowed(v) => v.to_string(),
                    Cow::Owned(v) => v,
                },
                tag: tag.map(|t| t.to_string()),
                style,
                anchor,
                location,
            },
            Event::SequenceStart(anchor, tag) => Ev::SeqStart {
                tag: tag.map(|t| t.to_string()),
                anchor,
                location,
            },
            Event::SequenceEnd => Ev::SeqEnd { location },
            Event::MappingStart(anchor, tag) => Ev::MapStart {
                tag: tag.map(|t| t.to_string()),
                anchor,
                location,
            },
            Event::MappingEnd => Ev::MapEnd { location },
            Event::Alias(anchor) => Ev::Alias { anchor, location },
        })
    }
}

impl<'a> Events for LiveEvents<'a> {
    fn next(&mut self) -> Result<Option<Ev>, Error> {
        while let Some(item) = self.parser.next() {
            let (raw, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);
            self.last_location = location;
            if let Some(ev) = Self::translate(raw, location) {
                self.observe(&ev)?;
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn last_location(&self) -> Location {
        self.last_location
    }

    fn observe_merge_key(&mut self) -> Result<(), Error> {
        match self.budget.as_mut() {
            Some(budget) => budget
                .observe_merge_key()
                .map_err(|breach| Error::budget(breach).with_location(self.last_location)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saphyr_parser::ScalarStyle;

    fn drain(input: &str) -> Vec<Ev> {
        let mut events = LiveEvents::new(input, None);
        let mut out = Vec::new();
        while let Some(ev) = events.next().unwrap() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn tags_and_anchors_are_kept() {
        let evs = drain("&a !!int 3\n");
        assert!(matches!(evs[0], Ev::DocumentStart { .. }));
        match &evs[1] {
            Ev::Scalar {
                value,
                tag,
                style,
                anchor,
                location,
            } => {
                assert_eq!(value, "3");
                assert_eq!(tag.as_deref().map(crate::tags::normalize_tag), Some("int"));
                assert_eq!(*style, ScalarStyle::Plain);
                assert_ne!(*anchor, 0);
                assert_eq!(location.line(), 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn one_document_start_per_document() {
        let evs = drain("--- 1\n--- 2\n");
        let starts = evs
            .iter()
            .filter(|ev| matches!(ev, Ev::DocumentStart { .. }))
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn scan_errors_carry_location() {
        let mut events = LiveEvents::new("a: [1, 2\n", None);
        let err = loop {
            match events.next() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a scan error"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Error::Scan { .. }));
        assert!(err.location().is_some());
    }

    #[test]
    fn budget_stops_the_stream() {
        let budget = Budget {
            max_nodes: 2,
            ..Budget::default()
        };
        let mut events = LiveEvents::new("[1, 2, 3]", Some(budget));
        let err = loop {
            match events.next() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a budget breach"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Error::Budget { .. }));
    }
}
