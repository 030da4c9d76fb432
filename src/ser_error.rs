use std::{fmt, io};

/// Error type used by the YAML encoder.
///
/// No output reaches the caller's sink when one of these is returned: the
/// document is rendered into a private buffer first.
#[derive(Debug)]
pub enum EmitError {
    /// A value the encoder has no rule for, or a table whose columns disagree.
    UnsupportedValue { type_name: String },
    /// Options used would produce invalid YAML (0 indentation, etc)
    InvalidOptions(String),
    /// The deparser failed on an expression.
    Deparse { msg: String },
    /// Wrapper for formatting errors.
    Format { error: fmt::Error },
    /// Wrapper for I/O errors.
    Io { error: io::Error },
}

impl EmitError {
    #[cold]
    pub(crate) fn unsupported(type_name: &str) -> Self {
        EmitError::UnsupportedValue {
            type_name: type_name.to_owned(),
        }
    }
}

impl From<fmt::Error> for EmitError {
    fn from(error: fmt::Error) -> Self {
        EmitError::Format { error }
    }
}

impl From<io::Error> for EmitError {
    fn from(error: io::Error) -> Self {
        EmitError::Io { error }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::UnsupportedValue { type_name } => write!(
                f,
                "Emitter error: don't know how to emit object of type: '{type_name}'"
            ),
            EmitError::InvalidOptions(msg) => write!(f, "invalid encoding options: {msg}"),
            EmitError::Deparse { msg } => write!(f, "Emitter error: could not deparse expression: {msg}"),
            EmitError::Format { error } => write!(f, "formatting error: {error}"),
            EmitError::Io { error } => write!(f, "I/O error: {error}"),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::Format { error } => Some(error),
            EmitError::Io { error } => Some(error),
            _ => None,
        }
    }
}
