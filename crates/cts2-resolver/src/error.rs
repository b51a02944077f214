//! Error types for value-set resolution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cts2_query::CatalogError;
use thiserror::Error;

/// Result type for resolver operations.
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

/// Errors that can occur while resolving value sets.
///
/// Errors are `Clone` so that one failed computation can be reported to
/// every caller waiting on it.
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    /// Catalog lookup or query error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The requested code system version set cannot be used.
    #[error("resolution conflict: {0}")]
    ResolutionConflict(String),

    /// The caller stopped waiting for a resolution.
    #[error("resolution timeout after {0:?}")]
    Timeout(Duration),

    /// I/O error during persistence operations.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The computation panicked; no value was produced.
    #[error("resolution aborted: {0}")]
    Aborted(String),

    /// A recomputed membership set does not match its recorded digest.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        /// Recorded digest.
        expected: String,
        /// Digest of the recomputed set.
        actual: String,
    },
}

impl ResolverError {
    /// Creates an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true if a later attempt may succeed.
    ///
    /// Only store failures qualify; lookups, conflicts and parameter errors
    /// fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolverError::Catalog(CatalogError::StoreError(_)))
    }

    /// Returns true for missing catalog roots.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolverError::Catalog(e) if e.is_not_found())
    }
}
