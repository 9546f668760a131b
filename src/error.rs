use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("truncated stream at offset {offset} reading {field}: need {need} bytes, have {have}")]
    TruncatedStream {
        offset: usize,
        field: Cow<'static, str>,
        need: usize,
        have: usize,
    },

    #[error("malformed field {field} at offset {offset}: {reason}")]
    MalformedField {
        offset: usize,
        field: Cow<'static, str>,
        reason: String,
    },

    #[error("unsupported format version {version} at offset {offset}")]
    UnsupportedVersion { offset: usize, version: i32 },

    #[error("parse timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    pub fn truncated(offset: usize, need: usize, have: usize) -> Self {
        Error::TruncatedStream { offset, field: Cow::Borrowed(""), need, have }
    }

    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::MalformedField { offset, field: Cow::Borrowed(""), reason: reason.into() }
    }

    /// Byte offset at which the failure was detected, if the error came from decoding.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::TruncatedStream { offset, .. }
            | Error::MalformedField { offset, .. }
            | Error::UnsupportedVersion { offset, .. } => Some(*offset),
            Error::Timeout { .. } | Error::Io(_) => None,
        }
    }

    /// Dotted path of the field being decoded, outermost first.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::TruncatedStream { field, .. } | Error::MalformedField { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedField { .. })
    }

    /// Prefix the field path with an enclosing field name.
    pub fn in_field(mut self, name: &str) -> Self {
        if let Error::TruncatedStream { field, .. } | Error::MalformedField { field, .. } = &mut self {
            *field = if field.is_empty() {
                Cow::Owned(name.to_string())
            } else {
                Cow::Owned(format!("{name}.{field}"))
            };
        }
        self
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attaches field names to decode errors as they propagate outwards.
pub trait FieldContext<T> {
    fn field(self, name: &str) -> Result<T>;
}

impl<T> FieldContext<T> for Result<T> {
    fn field(self, name: &str) -> Result<T> {
        self.map_err(|e| e.in_field(name))
    }
}
