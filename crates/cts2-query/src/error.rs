//! Error types for catalog queries.

use cts2_model::{FilterComponent, RequestError};
use thiserror::Error;

/// Errors that can occur while querying a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A catalog root (version, entity, value set, definition, map) does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of resource looked up.
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A parameter had a value outside its domain.
    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// The catalog does not support filtering on the given component.
    #[error("filter component {component} is not supported by the {catalog} catalog")]
    UnsupportedFilterComponent {
        /// Requested component.
        component: FilterComponent,
        /// Catalog name.
        catalog: &'static str,
    },

    /// Error while parsing the request.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Configuration or snapshot document could not be read.
    #[error("config error: {0}")]
    Config(String),

    /// Error from the underlying store.
    #[error("store error: {0}")]
    StoreError(String),
}

impl CatalogError {
    /// Builds a [`CatalogError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true for missing catalog roots.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    /// Returns true for client errors that no retry can fix.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidParameter { .. }
                | CatalogError::UnsupportedFilterComponent { .. }
                | CatalogError::Request(_)
        )
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
