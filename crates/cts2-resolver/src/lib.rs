//! # cts2-resolver
//!
//! Memoized value-set resolution and a read-only service facade for CTS2
//! terminology catalogs.
//!
//! A value-set definition is a sequence of set operations over entity
//! sources (edges walked from an anchor entity, explicit entity lists,
//! whole code system versions). Resolving it against a set of code system
//! versions yields a membership set with a content-addressed URI.
//!
//! - **Memoization** - resolved sets are cached per
//!   `(value set, digest, version set)` key in an LRU cache
//! - **Coalescing** - concurrent requests for the same key share one
//!   computation; failures reach every waiter and are never cached
//! - **History** - every distinct resolution gets a stable 1-based ordinal
//!   and a membership digest that recomputations must reproduce
//! - **Persistence** - the history round-trips through a JSON manifest
//! - **Service facade** - one typed method per CTS2 read endpoint
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use cts2_query::{CatalogQuery, InMemoryCatalog};
//! use cts2_resolver::{ResolverConfig, ValueSetResolver};
//!
//! let query = CatalogQuery::new(Arc::new(InMemoryCatalog::load("snapshot.json")?));
//! let config = ResolverConfig::builder()
//!     .with_cache_capacity(256)
//!     .with_wait_timeout(std::time::Duration::from_secs(30))
//!     .build();
//! let resolver = ValueSetResolver::with_config(query, config);
//!
//! let resolved = resolver.resolve_current("Heart Structures", "e32e022f")?;
//! for member in &resolved.members {
//!     println!("{} {}", member.name, member.about);
//! }
//! println!("{}", resolver.stats());
//! ```
//!
//! ## Errors
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Catalog(NotFound)` | unknown value set, definition, version or resolution |
//! | `Catalog(StoreError)` | the store failed; retried up to `max_attempts` |
//! | `ResolutionConflict` | retired or clashing versions, or a recorded resolution no longer reproduces |
//! | `Timeout` | the configured wait elapsed; the computation keeps running |
//! | `Aborted` | the computation panicked; the key is released for the next caller |
//! | `DigestMismatch` | an imported manifest record is not the content address of its key |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod config;
mod digest;
mod error;
mod evaluator;
mod history;
mod inflight;
pub mod persistence;
mod resolver;
mod result;
pub mod service;

// Public re-exports
pub use cache::ResolutionCache;
pub use config::{
    ResolverConfig, ResolverConfigBuilder, ServiceConfig, DEFAULT_CACHE_CAPACITY,
    DEFAULT_MAX_ATTEMPTS,
};
pub use digest::{membership_digest, ResolutionKey, RESOLUTION_ID_LEN};
pub use error::{ResolverError, ResolverResult};
pub use evaluator::{current_version, DefinitionEvaluator, VersionSet};
pub use history::{Recorded, ResolutionHistory};
pub use inflight::{InFlight, Join, Slot};
pub use persistence::ResolutionManifest;
pub use resolver::ValueSetResolver;
pub use result::{ResolutionRecord, ResolvedValueSet, ResolvedValueSetResolution, ResolverStats};
pub use service::{Cts2Response, Cts2Service, TestEnvironment};
