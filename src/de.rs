//! Owned, simplified YAML events consumed by the tree builder.
//!
//! The builder never talks to the parser directly. It pulls [`Ev`]s from an
//! [`Events`] source: [`crate::live_events::LiveEvents`] for real text, or
//! `ReplayEvents` for a pre-recorded list in tests (event streams the scanner
//! would refuse to produce).

#[cfg(test)]
use std::collections::VecDeque;

use saphyr_parser::ScalarStyle;

use crate::error::Error;
use crate::location::Location;

/// One logical parser event with the data the builder needs.
///
/// Anchor ids are the parser's numeric ids; `0` means "no anchor".
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Ev {
    /// Start of a document. Anchors do not cross document boundaries.
    DocumentStart { location: Location },
    /// Scalar value, with its raw tag text (if any) and presentation style.
    Scalar {
        value: String,
        tag: Option<String>,
        style: ScalarStyle,
        anchor: usize,
        location: Location,
    },
    SeqStart {
        tag: Option<String>,
        anchor: usize,
        location: Location,
    },
    SeqEnd { location: Location },
    MapStart {
        tag: Option<String>,
        anchor: usize,
        location: Location,
    },
    MapEnd { location: Location },
    /// Reference to a previously anchored node.
    Alias { anchor: usize, location: Location },
}

impl Ev {
    pub(crate) fn location(&self) -> Location {
        match self {
            Ev::DocumentStart { location }
            | Ev::Scalar { location, .. }
            | Ev::SeqStart { location, .. }
            | Ev::SeqEnd { location }
            | Ev::MapStart { location, .. }
            | Ev::MapEnd { location }
            | Ev::Alias { location, .. } => *location,
        }
    }
}

/// Source of events for the builder.
pub(crate) trait Events {
    /// Next event, or `None` at the end of the stream.
    fn next(&mut self) -> Result<Option<Ev>, Error>;
    /// Location of the last event handed out, for end-of-input errors.
    fn last_location(&self) -> Location;
    /// Charge one expanded merge key to the source's budget, if it has one.
    fn observe_merge_key(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Event source over a pre-built list.
///
/// Unlike the live scanner it does not validate anything: aliases may name
/// anchors that were never defined and start/end events may not pair up.
#[cfg(test)]
pub(crate) struct ReplayEvents {
    buf: VecDeque<Ev>,
    last_location: Location,
}

#[cfg(test)]
impl ReplayEvents {
    pub(crate) fn new(events: impl IntoIterator<Item = Ev>) -> Self {
        Self {
            buf: events.into_iter().collect(),
            last_location: Location::UNKNOWN,
        }
    }
}

#[cfg(test)]
impl Events for ReplayEvents {
    fn next(&mut self) -> Result<Option<Ev>, Error> {
        let ev = self.buf.pop_front();
        if let Some(ev) = &ev {
            self.last_location = ev.location();
        }
        Ok(ev)
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}
