use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by self-parsing types and custom providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum Error {
    #[error("Binding target should be a struct behind a non-null reference")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(help("pass `&mut config` where config is a struct implementing `Configurable`"))
    )]
    NotAStructPointer,

    #[error("Quotes did not terminate in {input:?}")]
    UnterminatedQuote { input: String },

    #[error("Can't parse {value:?} in a bool value")]
    NotBoolValue { value: String },

    #[error("Range overextended for type {kind} with value {value}")]
    InvalidRange { kind: &'static str, value: String },

    #[error("Invalid integer {value:?}: {source}")]
    InvalidInt {
        value: String,
        source: ParseIntError,
    },

    #[error("Invalid float {value:?}: {source}")]
    InvalidFloat {
        value: String,
        source: ParseFloatError,
    },

    #[error("Invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Invalid time {value:?} for layout {layout:?}: {source}")]
    InvalidTime {
        value: String,
        layout: String,
        source: chrono::ParseError,
    },

    #[error("{value:?} is not a correct {shape} value: {source}")]
    InvalidComposite {
        value: String,
        shape: &'static str,
        source: Box<Error>,
    },

    #[error("{type_name} can't parse {value:?}: {source}")]
    Unmarshal {
        type_name: &'static str,
        value: String,
        source: BoxError,
    },

    #[error("Internal type mismatch: expected {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("Can't provide value for {field}({key:?}, {namespace:?}): {source}")]
    Providing {
        field: &'static str,
        key: String,
        namespace: String,
        source: Box<Error>,
    },

    #[error("Can't set value for {field}({key:?}, {namespace:?}, {value:?}): {source}")]
    Setting {
        field: &'static str,
        key: String,
        namespace: String,
        value: String,
        source: Box<Error>,
    },

    #[error("Provider error: {0}")]
    Provider(BoxError),

    #[error("Malformed document at key {key:?}: {reason}")]
    MalformedDocument { key: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write help: {0}")]
    HelpOutput(#[source] std::io::Error),

    #[error("Help requested")]
    HelpRequested,
}

impl Error {
    /// Wrap an arbitrary error raised by a custom provider.
    pub fn provider<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Provider(err.into())
    }

    /// The innermost error, skipping the field/key context wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Providing { source, .. }
            | Error::Setting { source, .. }
            | Error::InvalidComposite { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
