//! Encoder options for YAML emission.
//!
//! ```rust
//! use dynyaml::{to_string_with_options, CodecContext, LineBreak, Mapping, Value};
//!
//! let mut map = Mapping::new();
//! map.insert("a", 1.25);
//! let opts = dynyaml::encode_options! {
//!     indent: 4,
//!     line_break: LineBreak::CrLf,
//! };
//! let yaml = to_string_with_options(&Value::Map(map), &opts, &CodecContext::default()).unwrap();
//! assert_eq!(yaml, "a: 1.25\r\n");
//! ```

use serde::{Deserialize, Serialize};

use crate::ser_error::EmitError;

/// Line terminator written between output lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineBreak {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineBreak {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }
}

/// Encoder options.
///
/// Construct with the [`encode_options!`](crate::encode_options!) macro so
/// call sites survive new fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub line_break: LineBreak,
    /// Spaces per nesting level (2 by default). 0 is rejected.
    pub indent: usize,
    /// Indent a block sequence that is the value of a mapping key by one
    /// more level. Off by default: the `-` lines up with the key.
    pub indent_sequences_under_maps: bool,
    /// Write mappings as `!omap` sequences of single-pair mappings.
    pub use_omap: bool,
    /// Write tables as a mapping of columns instead of a sequence of rows.
    pub column_major: bool,
    /// Write non-ASCII characters as they are. When off, strings containing
    /// them are double-quoted with `\u` escapes.
    pub allow_unicode: bool,
    /// Significant digits for floats, 1 to 22. The default 17 writes the
    /// shortest text that reads back to the same `f64`.
    pub precision: usize,
}

impl EncodeOptions {
    pub(crate) fn consistent(&self) -> Result<(), EmitError> {
        if self.indent == 0 {
            return Err(EmitError::InvalidOptions(
                "Invalid indent: must be positive".to_string(),
            ));
        }
        if !(1..=22).contains(&self.precision) {
            return Err(EmitError::InvalidOptions(format!(
                "Invalid precision {}: must be between 1 and 22",
                self.precision
            )));
        }
        Ok(())
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            line_break: LineBreak::Lf,
            indent: 2,
            indent_sequences_under_maps: false,
            use_omap: false,
            column_major: false,
            allow_unicode: true,
            precision: 17,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_indent_and_bad_precision() {
        assert!(EncodeOptions::default().consistent().is_ok());
        let zero = EncodeOptions {
            indent: 0,
            ..EncodeOptions::default()
        };
        assert!(matches!(zero.consistent(), Err(EmitError::InvalidOptions(_))));
        for precision in [0, 23] {
            let opts = EncodeOptions {
                precision,
                ..EncodeOptions::default()
            };
            assert!(opts.consistent().is_err());
        }
    }
}
