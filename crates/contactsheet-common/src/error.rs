//! Common error types used throughout contactsheet.
//!
//! [`Error`] covers the typed failures callers match on: unknown photo ids,
//! rejected configuration and failed listing requests. [`ExtractionError`] is the two-phase failure of
//! reading a tag block out of an image asset: either the asset could not be
//! loaded, or its bytes did not contain a readable tag block.

/// Failure while extracting embedded metadata from an image asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// The asset itself could not be read (missing file, HTTP error, ...).
    #[error("Failed to load asset {source_ref}: {message}")]
    Load {
        /// Locator of the asset that failed to load.
        source_ref: String,
        /// Human-readable error description.
        message: String,
    },

    /// The asset was read but its tag block is absent or malformed.
    #[error("Failed to parse tag block: {0}")]
    Parse(String),
}

impl ExtractionError {
    /// Create a new Load error.
    pub fn load<S: Into<String>, M: Into<String>>(source_ref: S, message: M) -> Self {
        Self::Load {
            source_ref: source_ref.into(),
            message: message.into(),
        }
    }

    /// Create a new Parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether the failure happened before any bytes were available.
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}

/// Common error type for contactsheet.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested photo or resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An HTTP collaborator returned an error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Http error.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
