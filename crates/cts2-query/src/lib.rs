//! # cts2-query
//!
//! Read-side query engine for CTS2 terminology catalogs.
//!
//! This crate provides the [`CatalogStore`] abstraction over a versioned,
//! read-only terminology catalog, an indexed [`InMemoryCatalog`], and the
//! engines that turn request parameters into paged directories:
//!
//! - **Match filtering** - `(filtercomponent, matchvalue, matchalgorithm)`
//!   evaluated per catalog, with a pluggable ranked strategy for `luceneQuery`
//! - **Paging** - bounded directories with a COMPLETE/PARTIAL flag
//! - **Graph navigation** - `children`, `subjectof` and `targetof` views
//!   anchored at an entity of one code system version
//! - **Map navigation** - map versions and entries, filtered by map role
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use cts2_model::{EntityId, QueryParams};
//! use cts2_query::{CatalogQuery, InMemoryCatalog};
//!
//! let store = InMemoryCatalog::load("snapshot.json")?;
//! let query = CatalogQuery::new(Arc::new(store));
//!
//! // Everything below C12727 in NCI Thesaurus 19.05d
//! let children = query.navigator().children(
//!     "NCI_Thesaurus",
//!     "19.05d",
//!     &EntityId::parse("ncit:C12727"),
//!     &QueryParams::new(),
//! )?;
//! println!("{} children ({:?})", children.num_entries, children.complete);
//! ```
//!
//! ## Catalogs
//!
//! | Catalog | Operation | resourceName | resourceSynopsis | about |
//! |---------|-----------|--------------|------------------|-------|
//! | Code system versions | [`CatalogQuery::code_system_versions`] | version name | synopsis | about URI |
//! | Entities | [`CatalogQuery::entities`] | name, designations | synopsis | about URI |
//! | Associations | [`AssociationNavigator::subject_of`] | subject, predicate, target names | - | their URIs |
//! | Value sets | [`CatalogQuery::value_sets`] | value set name | synopsis | about URI |
//! | Map versions | [`MapNavigator::map_versions`] | version name, map name | synopsis | document URI |
//! | Map entries | [`MapNavigator::map_entries`] | mapped entity names | mapped entity synopses | mapped entity URIs |
//!
//! A `-` marks a component the catalog rejects with
//! [`CatalogError::UnsupportedFilterComponent`] when a match value is given.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod catalog;
mod config;
mod error;
mod maps;
mod matcher;
mod memory;
mod navigator;
mod pager;
mod traits;
mod traverser;

// Public re-exports
pub use catalog::CatalogQuery;
pub use config::{HierarchyPredicate, Orientation, QueryConfig, QueryConfigBuilder};
pub use error::{CatalogError, CatalogResult};
pub use maps::MapNavigator;
pub use matcher::{
    ContainsMatcher, ExactMatcher, MatchEngine, Searchable, StartsWithMatcher, TextMatcher,
    TokenMatcher,
};
pub use memory::{CatalogBuilder, CatalogSnapshot, InMemoryCatalog};
pub use navigator::AssociationNavigator;
pub use pager::Pager;
pub use traits::CatalogStore;
pub use traverser::AssociationTraverser;
