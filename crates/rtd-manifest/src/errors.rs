use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable, machine-matchable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigRequired,
    ConfigSyntaxInvalid,
    InvalidBool,
    InvalidChoice,
    InvalidList,
    InvalidString,
    InvalidPath,
    InvalidDirectory,
    InvalidFile,
    InvalidUrl,
    NameRequired,
    NameInvalid,
    NameDuplicate,
    TypeRequired,
    BaseInvalid,
    BaseNotADirectory,
    PythonInvalid,
    CondaInvalid,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ConfigRequired => "config-required",
            ErrorCode::ConfigSyntaxInvalid => "config-syntax-invalid",
            ErrorCode::InvalidBool => "invalid-bool",
            ErrorCode::InvalidChoice => "invalid-choice",
            ErrorCode::InvalidList => "invalid-list",
            ErrorCode::InvalidString => "invalid-string",
            ErrorCode::InvalidPath => "invalid-path",
            ErrorCode::InvalidDirectory => "invalid-directory",
            ErrorCode::InvalidFile => "invalid-file",
            ErrorCode::InvalidUrl => "invalid-url",
            ErrorCode::NameRequired => "name-required",
            ErrorCode::NameInvalid => "name-invalid",
            ErrorCode::NameDuplicate => "name-duplicate",
            ErrorCode::TypeRequired => "type-required",
            ErrorCode::BaseInvalid => "base-invalid",
            ErrorCode::BaseNotADirectory => "base-not-a-directory",
            ErrorCode::PythonInvalid => "python-invalid",
            ErrorCode::CondaInvalid => "conda-invalid",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised by a single field validator.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    /// Rendering of the rejected value
    pub value: String,
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(value: impl Into<String>, code: ErrorCode) -> Self {
        let value = value.into();
        let message = match code {
            ErrorCode::InvalidBool => format!("expected one of (0, 1, true, false), got {}", value),
            ErrorCode::InvalidList => format!("expected list, got {}", value),
            ErrorCode::InvalidString => format!("expected string, got {}", value),
            ErrorCode::InvalidPath => format!("path {} does not exist", value),
            ErrorCode::InvalidDirectory => format!("{} is not a directory", value),
            ErrorCode::InvalidFile => format!("{} is not a file", value),
            ErrorCode::InvalidUrl => format!("expected URL with scheme and host, got {}", value),
            _ => format!("invalid value {}", value),
        };
        ValidationError {
            value,
            code,
            message,
        }
    }

    /// `invalid-choice`, listing every accepted value
    pub fn invalid_choice(value: impl Into<String>, choices: &[String]) -> Self {
        let value = value.into();
        let message = format!("expected one of ({}), got {}", choices.join(", "), value);
        ValidationError {
            value,
            code: ErrorCode::InvalidChoice,
            message,
        }
    }
}

/// Raised by the manifest parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

/// A configuration error attributed to one manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidConfig {
    pub code: ErrorCode,
    /// Dotted key of the offending field, e.g. `python.version`
    pub key: Option<String>,
    pub message: String,
    pub source_file: Option<PathBuf>,
    pub source_position: Option<usize>,
}

impl InvalidConfig {
    /// An error not tied to a particular document (discovery, parsing)
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        InvalidConfig {
            code,
            key: None,
            message: message.into(),
            source_file: None,
            source_position: None,
        }
    }

    pub fn for_document(
        code: ErrorCode,
        key: &str,
        message: impl Into<String>,
        source_file: &Path,
        source_position: usize,
    ) -> Self {
        InvalidConfig {
            code,
            key: Some(key.to_string()),
            message: message.into(),
            source_file: Some(source_file.to_path_buf()),
            source_position: Some(source_position),
        }
    }
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.source_file {
            write!(f, "{} [{}]: ", file.display(), self.source_position.unwrap_or(0))?;
        }
        match self.key {
            Some(ref key) => write!(f, "{}: {} ({})", key, self.message, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

impl std::error::Error for InvalidConfig {}
