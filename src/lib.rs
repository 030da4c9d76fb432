//! YAML 1.1 codec between text and a dynamically typed [`Value`] tree.
//!
//! Decoding pulls events from `saphyr-parser`, resolves implicit tags
//! (`yes` is a boolean, `0x1F` an integer, `.na.real` a missing double),
//! applies merge keys and aliases, runs per-tag [`Handlers`] and collapses
//! homogeneous sequences into typed [`Vector`]s. Encoding walks a [`Value`]
//! and writes block-style YAML that decodes back to the same tree.
//!
//! ```rust
//! use dynyaml::{from_str, to_string, Value};
//!
//! let value = from_str("base: &b {x: 1}\nderived:\n  <<: *b\n  y: .na.real\n").unwrap();
//! let derived = value.get("derived").unwrap();
//! assert_eq!(derived.get("x"), Some(&Value::int(1)));
//! assert_eq!(derived.get("y"), Some(&Value::Float(None)));
//! assert_eq!(to_string(derived).unwrap(), "x: 1\ny: .na.real\n");
//! ```

pub use budget::{Budget, BudgetBreach, BudgetReport};
pub use codec::{
    Loaded, decode, encode, from_reader, from_str, from_str_with_options, load, to_fmt_writer,
    to_io_writer, to_string, to_string_with_options,
};
pub use encode_options::{EncodeOptions, LineBreak};
pub use error::{Error, NodeKind, Warning};
pub use handlers::{CodecContext, Deparser, ExprEvaluator, Handler, Handlers};
pub use location::Location;
pub use options::{AliasLimits, DecodeOptions};
pub use resolver::resolve_implicit_tag;
pub use ser_error::EmitError;
pub use tags::{BAD_ANCHOR, normalize_tag};
pub use value::{Expression, Factor, Mapping, Table, Value, Vector};

pub mod budget;
mod buffered_input;
mod builder;
mod codec;
mod convert;
mod de;
mod emitter;
mod encode_options;
mod error;
mod handlers;
mod live_events;
mod location;
mod macros;
mod merge;
mod options;
mod parse_scalars;
mod resolver;
mod ser;
mod ser_error;
mod ser_quoting;
mod tags;
mod value;
mod zmij_format;
