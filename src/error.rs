use std::error::Error as StdError;
use std::fmt;

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Error type for cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Option store query failed: {0}")]
    Store(String),

    #[error("Failed to decode serialized option value: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Unknown accessor: {0}")]
    UnknownAccessor(String),

    #[error(transparent)]
    NotSupported(#[from] NotSupportedError),

    #[error(transparent)]
    NullReference(#[from] NullReferenceError),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(feature = "sqlx-store")]
impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::Store(err.to_string())
    }
}

/// Raised where an operation is explicitly not implemented for a given context.
#[derive(Debug)]
pub struct NotSupportedError {
    note: String,
    source: Option<BoxedCause>,
}

impl NotSupportedError {
    pub const MESSAGE: &'static str = "Operation is not supported!";

    pub fn new(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            source: None,
        }
    }

    /// Chains the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// What was attempted.
    pub fn note(&self) -> &str {
        &self.note
    }
}

impl fmt::Display for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported operation {}: {}", self.note, Self::MESSAGE)
    }
}

impl StdError for NotSupportedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

/// Raised when a required argument or reference is missing or empty.
#[derive(Debug)]
pub struct NullReferenceError {
    reference_name: String,
    source: Option<BoxedCause>,
}

impl NullReferenceError {
    pub const MESSAGE: &'static str = "The given argument is unassigned or empty!";

    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            source: None,
        }
    }

    /// Chains the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name of the offending reference.
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }
}

impl fmt::Display for NullReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Empty value for: {}: {}", self.reference_name, Self::MESSAGE)
    }
}

impl StdError for NullReferenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}
