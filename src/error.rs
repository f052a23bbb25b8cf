//! Top-level error taxonomy for coaching runs.
//!
//! Each collaborator owns its own error enum ([`ProviderError`],
//! [`DeliveryError`]); [`CoachError`] aggregates them so a scheduled job or
//! bot command can propagate any failure with `?`.

use crate::providers::ProviderError;
use crate::publisher::DeliveryError;

/// Any failure that ends a coaching invocation.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// A required credential or identifier is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A structured document or required date failed to parse.
    #[error("parse error: {0}")]
    Parse(String),
    /// Reading a local document failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The completion provider was unreachable or returned an error.
    #[error("completion failed: {0}")]
    RemoteService(#[from] ProviderError),
    /// A destination rejected a post or append.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
