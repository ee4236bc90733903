use std::fmt;
use thiserror::Error;

/// A single violated constraint on query input, tagged with its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All validation failures found for one set of query inputs
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages recorded against one field, in the order they were added
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// Any transport-level failure while talking to the service.
///
/// The underlying cause is flattened into its message so callers never have
/// to tell a reset connection from a timeout or a bad status line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Network error: {message}")]
pub struct NetworkError {
    message: String,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        // Keep the whole source chain; reqwest's top-level text is often just
        // "error sending request".
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

/// Main error type for baconlink
#[derive(Error, Debug)]
pub enum BaconError {
    /// Query input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Transport failures
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Convenient Result type using BaconError
pub type Result<T> = std::result::Result<T, BaconError>;
