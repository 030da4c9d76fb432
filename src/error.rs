//! Decode error and warning types.
use std::fmt;

use saphyr_parser::ScanError;

use crate::budget::BudgetBreach;
use crate::location::Location;

/// The kind of node a tag was attached to, used in coercion messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "map",
        })
    }
}

/// Error returned by the decoding entry points.
///
/// Every variant is fatal to the enclosing decode call. Recoverable problems are
/// reported as [`Warning`]s instead.
#[derive(Debug)]
pub enum Error {
    /// The scanner rejected the input text.
    Scan { msg: String, location: Location },
    /// Start and end events did not pair up.
    Structure { msg: String, location: Location },
    /// A tag could not be applied to the node it was attached to, or its
    /// built-in conversion failed (`omap` shape, expression evaluation).
    TagCoercion { msg: String, location: Location },
    /// The same explicit key appeared twice in one mapping.
    DuplicateKey { key: String, location: Location },
    /// A merge key (`<<`) carried something other than a map or a list of maps.
    IllegalMerge { msg: String, location: Location },
    /// A YAML budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
    /// Reading the input failed. Only produced by `from_reader`.
    Io { cause: std::io::Error },
}

impl Error {
    pub(crate) fn structure<S: Into<String>>(msg: S) -> Self {
        Error::Structure {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn coercion<S: Into<String>>(msg: S) -> Self {
        Error::TagCoercion {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn invalid_tag(tag: &str, kind: NodeKind) -> Self {
        Error::coercion(format!("Invalid tag: {tag} for {kind}"))
    }

    pub(crate) fn duplicate_key<S: Into<String>>(key: S) -> Self {
        Error::DuplicateKey {
            key: key.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn illegal_merge<S: Into<String>>(msg: S) -> Self {
        Error::IllegalMerge {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn budget(breach: BudgetBreach) -> Self {
        Error::Budget {
            breach,
            location: Location::UNKNOWN,
        }
    }

    /// Attach a location unless one is already known.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Scan { location, .. }
            | Error::Structure { location, .. }
            | Error::TagCoercion { location, .. }
            | Error::DuplicateKey { location, .. }
            | Error::IllegalMerge { location, .. }
            | Error::Budget { location, .. } => {
                if !location.is_known() {
                    *location = set_location;
                }
            }
            Error::Io { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Scan { location, .. }
            | Error::Structure { location, .. }
            | Error::TagCoercion { location, .. }
            | Error::DuplicateKey { location, .. }
            | Error::IllegalMerge { location, .. }
            | Error::Budget { location, .. } => location.is_known().then_some(*location),
            Error::Io { .. } => None,
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        Error::Scan {
            msg: err.info().to_owned(),
            location: Location::new(mark.line(), mark.col() + 1),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan { msg, location } => {
                fmt_with_location(f, &format!("Scanner error: {msg}"), location)
            }
            Error::Structure { msg, location }
            | Error::TagCoercion { msg, location } => fmt_with_location(f, msg, location),
            Error::DuplicateKey { key, location } => {
                fmt_with_location(f, &format!("Duplicate map key: '{key}'"), location)
            }
            Error::IllegalMerge { msg, location } => {
                fmt_with_location(f, &format!("Illegal merge: {msg}"), location)
            }
            Error::Budget { breach, location } => {
                fmt_with_location(f, &format!("YAML budget breached: {breach:?}"), location)
            }
            Error::Io { cause } => write!(f, "IO error: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::Io { cause }
    }
}

/// A recoverable problem found while decoding.
///
/// Warnings never abort a decode; the affected node gets a fallback value
/// (an NA sentinel, the first element of a vector key, the default handler's
/// output, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_with_location(f, &self.message, &self.location)
    }
}

/// Warnings raised during one decode, logged as they are collected.
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    list: Vec<Warning>,
}

impl Warnings {
    pub(crate) fn push<S: Into<String>>(&mut self, message: S, location: Location) {
        let warning = Warning {
            message: message.into(),
            location,
        };
        log::warn!("{warning}");
        self.list.push(warning);
    }

    pub(crate) fn into_vec(self) -> Vec<Warning> {
        self.list
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.line, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_location() {
        let err = Error::duplicate_key("a").with_location(Location::new(2, 1));
        assert_eq!(err.to_string(), "Duplicate map key: 'a' at line 2, column 1");
        assert_eq!(err.location(), Some(Location::new(2, 1)));
    }

    #[test]
    fn first_location_sticks() {
        let err = Error::invalid_tag("omap", NodeKind::Scalar)
            .with_location(Location::new(1, 4))
            .with_location(Location::new(9, 9));
        assert_eq!(err.to_string(), "Invalid tag: omap for scalar at line 1, column 4");
    }

    #[test]
    fn unknown_location_is_omitted() {
        let warning = Warning {
            message: "Empty character vector used as a list name".into(),
            location: Location::UNKNOWN,
        };
        assert_eq!(warning.to_string(), "Empty character vector used as a list name");
    }
}
