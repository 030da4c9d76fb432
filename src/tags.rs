//! Tag identifiers and the tag normalizer.
//!
//! Both pipelines speak in short tag ids (`int`, `float#fix`, `omap`, ...).
//! Explicit tags from the document are reduced to that form by [`normalize_tag`];
//! implicit ones come from [`crate::resolve_implicit_tag`].

/// Prefix of the standard YAML tag URI space.
pub const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

pub(crate) const STR: &str = "str";
pub(crate) const SEQ: &str = "seq";
pub(crate) const MAP: &str = "map";
pub(crate) const NULL: &str = "null";
pub(crate) const BOOL: &str = "bool";
pub(crate) const BOOL_YES: &str = "bool#yes";
pub(crate) const BOOL_NO: &str = "bool#no";
pub(crate) const BOOL_NA: &str = "bool#na";
pub(crate) const INT: &str = "int";
pub(crate) const INT_HEX: &str = "int#hex";
pub(crate) const INT_OCT: &str = "int#oct";
pub(crate) const INT_BASE60: &str = "int#base60";
pub(crate) const INT_NA: &str = "int#na";
pub(crate) const FLOAT: &str = "float";
pub(crate) const FLOAT_FIX: &str = "float#fix";
pub(crate) const FLOAT_EXP: &str = "float#exp";
pub(crate) const FLOAT_BASE60: &str = "float#base60";
pub(crate) const FLOAT_NAN: &str = "float#nan";
pub(crate) const FLOAT_INF: &str = "float#inf";
pub(crate) const FLOAT_NEGINF: &str = "float#neginf";
pub(crate) const FLOAT_NA: &str = "float#na";
pub(crate) const STR_NA: &str = "str#na";
pub(crate) const MERGE: &str = "merge";
pub(crate) const DEFAULT: &str = "default";
pub(crate) const OMAP: &str = "omap";
pub(crate) const EXPR: &str = "expr";
pub(crate) const TIMESTAMP_YMD: &str = "timestamp#ymd";
pub(crate) const TIMESTAMP_ISO8601: &str = "timestamp#iso8601";
pub(crate) const TIMESTAMP_SPACED: &str = "timestamp#spaced";

/// Tag id of the bad-anchor sentinel.
pub const BAD_ANCHOR: &str = "_yaml.bad-anchor_";

/// Tag ids that custom handlers may not claim.
pub(crate) const RESERVED: &[&str] = &[MERGE, DEFAULT, BAD_ANCHOR];

/// Local tags written by the encoder.
pub(crate) const LOCAL_OMAP: &str = "!omap";
pub(crate) const LOCAL_EXPR: &str = "!expr";

/// Reduce an explicit tag to its short id.
///
/// `tag:yaml.org,2002:int`, `!!int` and `!int` all become `int`. A bare `!`
/// (the non-specific tag) becomes the empty string.
pub fn normalize_tag(tag: &str) -> &str {
    let tag = tag.strip_prefix(YAML_TAG_PREFIX).unwrap_or(tag);
    tag.trim_start_matches('!')
}

/// Built-in conversions, looked up once per node by tag id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Builtin {
    Str,
    Seq,
    Map,
    Null,
    Bool,
    BoolYes,
    BoolNo,
    Int,
    IntHex,
    IntOct,
    Float,
    FloatNan,
    FloatInf,
    FloatNegInf,
    BoolNa,
    IntNa,
    FloatNa,
    StrNa,
    Merge,
    Omap,
    Expr,
}

impl Builtin {
    pub(crate) fn lookup(tag: &str) -> Option<Self> {
        Some(match tag {
            STR => Builtin::Str,
            SEQ => Builtin::Seq,
            MAP => Builtin::Map,
            NULL => Builtin::Null,
            BOOL => Builtin::Bool,
            BOOL_YES => Builtin::BoolYes,
            BOOL_NO => Builtin::BoolNo,
            INT => Builtin::Int,
            INT_HEX => Builtin::IntHex,
            INT_OCT => Builtin::IntOct,
            FLOAT | FLOAT_FIX | FLOAT_EXP => Builtin::Float,
            FLOAT_NAN => Builtin::FloatNan,
            FLOAT_INF => Builtin::FloatInf,
            FLOAT_NEGINF => Builtin::FloatNegInf,
            BOOL_NA => Builtin::BoolNa,
            INT_NA => Builtin::IntNa,
            FLOAT_NA => Builtin::FloatNa,
            STR_NA => Builtin::StrNa,
            MERGE => Builtin::Merge,
            OMAP => Builtin::Omap,
            EXPR => Builtin::Expr,
            _ => return None,
        })
    }
}
