//! Block-style YAML writer.
//!
//! The value walker ([`crate::emitter`]) lowers a [`crate::Value`] into a
//! small tree of [`Node`]s that already carries tags and requested scalar
//! styles. This module lays that tree out as text:
//!
//! - mappings and sequences are always block style; empty ones are `{}` / `[]`,
//! - a mapping or sequence that is a sequence item starts on the dash line
//!   (`- a: 1`), a tagged one starts on the next line,
//! - a sequence that is a mapping value lines its dashes up with the key
//!   unless `indent_sequences_under_maps` is set,
//! - keys that are collections, or very long, use the explicit `? ` form.
//!
//! Output goes into a private `String`; the caller decides what to do with it
//! once the whole document was written.

use std::fmt::Write;

use crate::encode_options::EncodeOptions;
use crate::ser_error::EmitError;
use crate::ser_quoting::{
    first_line_leading_spaces, is_literal_safe, is_plain_safe, is_printable, is_single_quote_safe,
};

pub(crate) type Result<T, E = EmitError> = std::result::Result<T, E>;

/// Keys longer than this many characters are written with the `? ` indicator.
const MAX_SIMPLE_KEY_CHARS: usize = 1000;

/// Requested scalar style. The writer may fall back to a stronger quoting
/// style when the text cannot be carried by the requested one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Style {
    /// Plain if possible, then single-quoted, then double-quoted.
    Any,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar; double-quoted in key position or when the text
    /// does not survive a literal block.
    Literal,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Scalar {
        text: String,
        style: Style,
        tag: Option<&'static str>,
    },
    Seq {
        tag: Option<&'static str>,
        items: Vec<Node>,
    },
    Map {
        tag: Option<&'static str>,
        pairs: Vec<(Node, Node)>,
    },
}

impl Node {
    pub(crate) fn scalar<S: Into<String>>(text: S, style: Style) -> Self {
        Node::Scalar {
            text: text.into(),
            style,
            tag: None,
        }
    }

    pub(crate) fn seq(items: Vec<Node>) -> Self {
        Node::Seq { tag: None, items }
    }

    pub(crate) fn map(pairs: Vec<(Node, Node)>) -> Self {
        Node::Map { tag: None, pairs }
    }

    fn tag(&self) -> Option<&'static str> {
        match self {
            Node::Scalar { tag, .. } | Node::Seq { tag, .. } | Node::Map { tag, .. } => *tag,
        }
    }

    fn is_simple_key(&self) -> bool {
        match self {
            Node::Scalar { text, .. } => text.chars().count() <= MAX_SIMPLE_KEY_CHARS,
            _ => false,
        }
    }
}

/// Where a node is written, relative to what is already on the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    /// Document root, at the start of a line.
    Root,
    /// After `key:`.
    Value,
    /// After a `-`, `?` or `:` indicator.
    Entry,
}

pub(crate) struct YamlWriter<'o> {
    out: String,
    options: &'o EncodeOptions,
}

impl<'o> YamlWriter<'o> {
    pub(crate) fn new(options: &'o EncodeOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    /// Lay out one document. The text always ends with a line break.
    pub(crate) fn write_document(mut self, root: &Node) -> Result<String> {
        self.node(root, 0, Slot::Root)?;
        Ok(self.out)
    }

    #[inline]
    fn newline(&mut self) {
        self.out.push_str(self.options.line_break.as_str());
    }

    #[inline]
    fn pad(&mut self, spaces: usize) {
        self.out.extend(std::iter::repeat_n(' ', spaces));
    }

    /// Write `node` whose parent's entries start at column `col`.
    /// Every call returns with the cursor at the start of a fresh line.
    fn node(&mut self, node: &Node, col: usize, slot: Slot) -> Result<()> {
        let step = self.options.indent;
        let tag = node.tag();

        let empty = match node {
            Node::Scalar { text, style, .. } => {
                if slot != Slot::Root {
                    self.out.push(' ');
                }
                if let Some(tag) = tag {
                    self.out.push_str(tag);
                    self.out.push(' ');
                }
                if !self.scalar(text, *style, col + step, false)? {
                    self.newline();
                }
                return Ok(());
            }
            Node::Seq { items, .. } => items.is_empty().then_some("[]"),
            Node::Map { pairs, .. } => pairs.is_empty().then_some("{}"),
        };
        if let Some(empty) = empty {
            if slot != Slot::Root {
                self.out.push(' ');
            }
            if let Some(tag) = tag {
                self.out.push_str(tag);
                self.out.push(' ');
            }
            self.out.push_str(empty);
            self.newline();
            return Ok(());
        }

        let entries_col = match (slot, node) {
            (Slot::Root, _) => 0,
            (Slot::Value, Node::Seq { .. }) if !self.options.indent_sequences_under_maps => col,
            (Slot::Value, _) => col + step,
            (Slot::Entry, _) if tag.is_none() => col + step.max(2),
            (Slot::Entry, _) => col + step,
        };
        let first_inline = slot == Slot::Entry && tag.is_none();
        if first_inline {
            // The indicator itself takes one column.
            self.pad(entries_col - col - 1);
        } else if let Some(tag) = tag {
            if slot != Slot::Root {
                self.out.push(' ');
            }
            self.out.push_str(tag);
            self.newline();
        } else if slot != Slot::Root {
            self.newline();
        }

        match node {
            Node::Seq { items, .. } => self.seq_entries(items, entries_col, first_inline),
            Node::Map { pairs, .. } => self.map_entries(pairs, entries_col, first_inline),
            Node::Scalar { .. } => Ok(()),
        }
    }

    fn seq_entries(&mut self, items: &[Node], col: usize, first_inline: bool) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(col);
            }
            self.out.push('-');
            self.node(item, col, Slot::Entry)?;
        }
        Ok(())
    }

    fn map_entries(&mut self, pairs: &[(Node, Node)], col: usize, first_inline: bool) -> Result<()> {
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(col);
            }
            match key {
                Node::Scalar { text, style, tag } if key.is_simple_key() => {
                    if let Some(tag) = tag {
                        self.out.push_str(tag);
                        self.out.push(' ');
                    }
                    self.scalar(text, *style, col + self.options.indent, true)?;
                    self.out.push(':');
                    self.node(value, col, Slot::Value)?;
                }
                _ => {
                    self.out.push('?');
                    self.node(key, col, Slot::Entry)?;
                    self.pad(col);
                    self.out.push(':');
                    self.node(value, col, Slot::Entry)?;
                }
            }
        }
        Ok(())
    }

    /// Pick the style `text` is actually written in.
    fn select_style(&self, text: &str, requested: Style, is_key: bool) -> Style {
        let allow_unicode = self.options.allow_unicode;
        match requested {
            Style::Any if is_plain_safe(text, allow_unicode) => Style::Any,
            Style::Any | Style::SingleQuoted if is_single_quote_safe(text, allow_unicode) => {
                Style::SingleQuoted
            }
            Style::Literal
                if !is_key
                    && is_literal_safe(text, allow_unicode)
                    && (first_line_leading_spaces(text) == 0 || self.options.indent <= 9) =>
            {
                Style::Literal
            }
            _ => Style::DoubleQuoted,
        }
    }

    /// Write a scalar. Returns true when it already ended the line (block scalars).
    fn scalar(&mut self, text: &str, requested: Style, body_col: usize, is_key: bool) -> Result<bool> {
        match self.select_style(text, requested, is_key) {
            Style::Any => self.out.push_str(text),
            Style::SingleQuoted => self.write_single_quoted(text),
            Style::DoubleQuoted => self.write_double_quoted(text)?,
            Style::Literal => {
                self.write_literal(text, body_col)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Single quotes inside the string are escaped by doubling them.
    fn write_single_quoted(&mut self, s: &str) {
        self.out.push('\'');
        for ch in s.chars() {
            if ch == '\'' {
                self.out.push_str("''");
            } else {
                self.out.push(ch);
            }
        }
        self.out.push('\'');
    }

    /// Write a double-quoted string with necessary escapes.
    fn write_double_quoted(&mut self, s: &str) -> Result<()> {
        let allow_unicode = self.options.allow_unicode;
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\0' => self.out.push_str("\\0"),
                '\u{7}' => self.out.push_str("\\a"),
                '\u{8}' => self.out.push_str("\\b"),
                '\t' => self.out.push_str("\\t"),
                '\n' => self.out.push_str("\\n"),
                '\u{b}' => self.out.push_str("\\v"),
                '\u{c}' => self.out.push_str("\\f"),
                '\r' => self.out.push_str("\\r"),
                '\u{1b}' => self.out.push_str("\\e"),
                '\u{85}' => self.out.push_str("\\N"),
                '\u{2028}' => self.out.push_str("\\L"),
                '\u{2029}' => self.out.push_str("\\P"),
                c if is_printable(c) && (allow_unicode || c.is_ascii()) => self.out.push(c),
                c if (c as u32) <= 0xFF => write!(self.out, "\\x{:02X}", c as u32)?,
                c if (c as u32) <= 0xFFFF => write!(self.out, "\\u{:04X}", c as u32)?,
                c => write!(self.out, "\\U{:08X}", c as u32)?,
            }
        }
        self.out.push('"');
        Ok(())
    }

    /// `|` block scalar with its body at `body_col`.
    ///
    /// The chomping indicator keeps the trailing line breaks exact: `-` for
    /// none, nothing for one, `+` for more. An indentation digit is written
    /// when the first line starts with a space.
    fn write_literal(&mut self, text: &str, body_col: usize) -> Result<()> {
        self.out.push('|');
        if first_line_leading_spaces(text) > 0 {
            let digit = char::from_digit(self.options.indent as u32, 10).ok_or_else(|| {
                EmitError::InvalidOptions(
                    "indentation indicator must be a single digit (1..=9)".to_string(),
                )
            })?;
            self.out.push(digit);
        }
        if !text.ends_with('\n') {
            self.out.push('-');
        } else if text.ends_with("\n\n") {
            self.out.push('+');
        }
        self.newline();

        let body = text.strip_suffix('\n').unwrap_or(text);
        for line in body.split('\n') {
            if !line.is_empty() {
                self.pad(body_col);
                self.out.push_str(line);
            }
            self.newline();
        }
        Ok(())
    }
}
