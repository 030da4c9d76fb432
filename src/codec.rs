//! Decode and encode entry points.

use std::fmt::Write;
use std::io::Read;

use crate::budget::BudgetReport;
use crate::buffered_input::read_to_text;
use crate::builder::Builder;
use crate::emitter::Emitter;
use crate::encode_options::EncodeOptions;
use crate::error::{Error, Warning};
use crate::handlers::{CodecContext, Handlers};
use crate::live_events::LiveEvents;
use crate::options::DecodeOptions;
use crate::ser::YamlWriter;
use crate::ser_error::EmitError;
use crate::value::Value;

/// A decoded value together with what was recovered on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    pub value: Value,
    /// Recovered problems, in document order: NA coercions, failed handlers,
    /// bad anchors, key coercions.
    pub warnings: Vec<Warning>,
    /// Budget counters, when a budget was enforced.
    pub budget: Option<BudgetReport>,
}

/// Decode YAML text with default options and no collaborators.
///
/// An alias to an anchor that was never defined (`*nowhere`) is rejected by
/// the scanner as [`Error::Scan`]; only a self-reference such as
/// `&a [1, *a]` decodes to [`Value::BadAnchor`].
///
/// ```rust
/// use dynyaml::Value;
///
/// let value = dynyaml::from_str("a: [1, 2, 3]\nb: yes\n").unwrap();
/// assert_eq!(value.get("b"), Some(&Value::bool(true)));
/// assert_eq!(value.get("a").unwrap().as_vector().unwrap().len(), 3);
/// ```
pub fn from_str(input: &str) -> Result<Value, Error> {
    from_str_with_options(input, &DecodeOptions::default(), &CodecContext::default())
}

/// Decode YAML text; warnings are logged and dropped. Use [`load`] to keep them.
pub fn from_str_with_options(
    input: &str,
    options: &DecodeOptions,
    ctx: &CodecContext,
) -> Result<Value, Error> {
    load(input, options, ctx).map(|loaded| loaded.value)
}

/// Decode YAML text and return the value with its warnings and budget counters.
///
/// For a stream of several documents the last document is returned.
/// Undefined aliases are scan errors; a self-referencing alias becomes
/// [`Value::BadAnchor`] with a warning.
///
/// ```rust
/// use dynyaml::{load, CodecContext, DecodeOptions, Value};
///
/// let loaded = load("n: !!int 3abc\n", &DecodeOptions::default(), &CodecContext::default()).unwrap();
/// assert_eq!(loaded.value.get("n"), Some(&Value::Int(None)));
/// assert_eq!(loaded.warnings.len(), 1);
/// ```
pub fn load(input: &str, options: &DecodeOptions, ctx: &CodecContext) -> Result<Loaded, Error> {
    let mut events = LiveEvents::new(input, options.budget.clone());
    let built = Builder::new(ctx, options).build(&mut events)?;
    let budget = events.finish()?;
    log::debug!(
        "decoded {} bytes into {} ({} warning(s))",
        input.len(),
        built.value.type_name(),
        built.warnings.len()
    );
    Ok(Loaded {
        value: built.value,
        warnings: built.warnings,
        budget,
    })
}

/// Decode YAML from any reader. A UTF-8 or UTF-16 byte-order mark selects
/// the encoding; otherwise the input must be UTF-8.
pub fn from_reader<R: Read>(
    reader: R,
    options: &DecodeOptions,
    ctx: &CodecContext,
) -> Result<Value, Error> {
    let text = read_to_text(reader, options.max_reader_input_bytes)?;
    from_str_with_options(&text, options, ctx)
}

/// Decode with the given key mode and handlers, other options at their defaults.
pub fn decode(text: &str, use_string_keys: bool, handlers: &Handlers) -> Result<Value, Error> {
    let options = crate::decode_options! {
        string_keys: use_string_keys,
    };
    let ctx = CodecContext::default().with_handlers(handlers.clone());
    from_str_with_options(text, &options, &ctx)
}

/// Encode a value as a YAML document with default options.
///
/// ```rust
/// use dynyaml::{Mapping, Value, Vector};
///
/// let mut map = Mapping::new();
/// map.insert("name", "x");
/// map.insert("ids", Value::Vector(Vector::Int(vec![Some(1), None])));
/// assert_eq!(dynyaml::to_string(&Value::Map(map)).unwrap(), "name: x\nids:\n- 1\n- .na.integer\n");
/// ```
pub fn to_string(value: &Value) -> Result<String, EmitError> {
    to_string_with_options(value, &EncodeOptions::default(), &CodecContext::default())
}

/// Encode a value as a YAML document.
pub fn to_string_with_options(
    value: &Value,
    options: &EncodeOptions,
    ctx: &CodecContext,
) -> Result<String, EmitError> {
    options.consistent()?;
    let node = Emitter::new(options, ctx).node(value)?;
    let text = YamlWriter::new(options).write_document(&node)?;
    log::debug!("encoded {} into {} bytes", value.type_name(), text.len());
    Ok(text)
}

/// Encode into a `fmt::Write`. Nothing is written unless the whole value
/// could be encoded.
pub fn to_fmt_writer<W: Write>(
    out: &mut W,
    value: &Value,
    options: &EncodeOptions,
    ctx: &CodecContext,
) -> Result<(), EmitError> {
    let text = to_string_with_options(value, options, ctx)?;
    out.write_str(&text)?;
    Ok(())
}

/// Encode into a `std::io::Write`, with the same all-or-nothing behavior as
/// [`to_fmt_writer`].
pub fn to_io_writer<W: std::io::Write>(
    out: &mut W,
    value: &Value,
    options: &EncodeOptions,
    ctx: &CodecContext,
) -> Result<(), EmitError> {
    let text = to_string_with_options(value, options, ctx)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Encode with the given options and no deparser.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<String, EmitError> {
    to_string_with_options(value, options, &CodecContext::default())
}
