/// Convenience result type used across the composer.
pub type MockupResult<T> = Result<T, MockupError>;

/// Top-level error taxonomy used by composer APIs.
///
/// Every variant is local to the operation that raised it; none of them invalidate the
/// composer session or the order draft.
#[derive(thiserror::Error, Debug)]
pub enum MockupError {
    /// Design file is not a supported raster format (PNG/JPEG).
    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    /// Design file exceeds the configured size ceiling.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Garment base or design image could not be read or decoded.
    #[error("asset load failure: {0}")]
    AssetLoad(String),

    /// `save()` was invoked before any design was loaded.
    #[error("no design loaded")]
    NoDesignLoaded,

    /// A save is already waiting on its upload.
    #[error("a mockup save is already in flight")]
    SaveInFlight,

    /// Remote image upload failed (network, non-success response, bad payload).
    #[error("upload failure: {0}")]
    Upload(String),

    /// Invalid user-provided or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Record store rejected an operation.
    #[error("store error: {0}")]
    Store(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MockupError {
    /// Build a [`MockupError::InvalidFileType`] value.
    pub fn invalid_file_type(msg: impl Into<String>) -> Self {
        Self::InvalidFileType(msg.into())
    }

    /// Build a [`MockupError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`MockupError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`MockupError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MockupError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<serde_json::Error> for MockupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
