//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! Call sites stay valid when the option structs grow new fields.

/// Construct [`crate::DecodeOptions`] from `Default` and a list of field assignments.
///
/// ```rust
/// let options = dynyaml::decode_options! {
///     string_keys: false,
/// };
/// assert!(!options.string_keys);
/// ```
#[macro_export]
macro_rules! decode_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::DecodeOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::EncodeOptions`] from `Default` and a list of field assignments.
///
/// ```rust
/// let opts = dynyaml::encode_options! {
///     indent: 4,
///     use_omap: true,
/// };
/// assert_eq!(opts.indent, 4);
/// ```
#[macro_export]
macro_rules! encode_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::EncodeOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = dynyaml::budget! {
///     max_depth: 32,
/// };
/// assert_eq!(budget.max_depth, 32);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::Budget::default();
        $(
            budget.$field = $value;
        )*
        budget
    }};
}
