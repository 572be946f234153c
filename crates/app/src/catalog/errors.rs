//! Catalog store errors.

use thiserror::Error;

use crate::backend::{UploadError, WriteError};

/// A catalog mutation did not take effect.
///
/// Always recoverable by retry; the local read model is left exactly as it
/// was.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The forwarded document write failed.
    #[error("catalog write failed")]
    Write(#[from] WriteError),

    /// The image upload failed before the write was attempted.
    #[error("image upload failed")]
    Upload(#[from] UploadError),

    /// The record could not be encoded as a document.
    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),
}
