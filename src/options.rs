use crate::budget::Budget;
use serde::{Deserialize, Serialize};

/// Limits applied to alias expansion to harden against alias bombs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AliasLimits {
    /// Maximum total number of nodes copied into the tree by aliases across
    /// the whole decode. Each alias adds the size of the node it refers to.
    pub max_alias_nodes: usize,
    /// Maximum number of times a **single anchor id** may be referenced.
    /// Use `usize::MAX` for "unlimited".
    pub max_alias_expansions_per_anchor: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_alias_nodes: 1_000_000,
            max_alias_expansions_per_anchor: usize::MAX,
        }
    }
}

/// Decoder configuration.
///
/// ```rust
/// use dynyaml::{from_str_with_options, CodecContext, Value};
///
/// let options = dynyaml::decode_options! {
///     string_keys: false,
/// };
/// let value = from_str_with_options("1: one", &options, &CodecContext::default()).unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get_value(&Value::from(1)), Some(&Value::from("one")));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Coerce every mapping key to a string (the default). When false, keys
    /// keep whatever type they decoded to.
    pub string_keys: bool,
    /// Optional YAML budget enforced while events are consumed.
    pub budget: Option<Budget>,
    /// Limits for alias expansion.
    pub alias_limits: AliasLimits,
    /// Upper bound on decoded bytes read by [`crate::from_reader`]. `None` reads everything.
    pub max_reader_input_bytes: Option<usize>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            string_keys: true,
            budget: Some(Budget::default()),
            alias_limits: AliasLimits::default(),
            max_reader_input_bytes: Some(256 * 1024 * 1024),
        }
    }
}
