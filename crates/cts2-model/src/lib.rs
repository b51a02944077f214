//! # cts2-model
//!
//! Typed data model for CTS2 terminology catalogs.
//!
//! This crate provides:
//! - **Catalog records**: code system versions, entities, associations,
//!   value-set definitions and maps, all immutable once published
//! - **Query parameters**: the `(filtercomponent, matchvalue, matchalgorithm)`
//!   triple plus paging, parsed case-insensitively
//! - **Directories**: bounded listings with a completeness flag
//! - **Request parser**: a nom parser from logical paths to typed requests
//!
//! ## Usage
//!
//! ```rust
//! use cts2_model::{parse_request, FilterComponent, Resource};
//!
//! let request = parse_request(
//!     "/codesystemversions?matchvalue=thesaurus&filtercomponent=resourceSynopsis&format=json",
//! )
//! .unwrap();
//! assert_eq!(request.resource, Resource::CodeSystemVersions);
//! assert_eq!(request.params.filter.component, FilterComponent::ResourceSynopsis);
//! assert_eq!(request.params.filter.value.as_deref(), Some("thesaurus"));
//! ```
//!
//! ## Request Paths
//!
//! | Path | Resource |
//! |------|----------|
//! | `/service` | Service descriptor |
//! | `/codesystemversions` | Code system version directory |
//! | `/codesystem/{cs}/version/{v}` | Code system version |
//! | `/codesystem/{cs}/version/{v}/entities` | Entity directory of a version |
//! | `/codesystem/{cs}/version/{v}/entity/{ns}:{id}` | Entity description |
//! | `.../entity/{ns}:{id}/children\|subjectof\|targetof` | Graph views |
//! | `/entities` | Cross-code-system entity directory |
//! | `/valuesets`, `/valueset/{name}` | Value sets |
//! | `/valueset/{name}/definition/{digest}` | Value-set definition |
//! | `/valueset/{name}/definition/{digest}/resolution/{n}` | Historical resolution |
//! | `/resolvedvaluesets` | Resolved value sets |
//! | `/mapversions`, `/map/{name}`, `/map/{name}/versions` | Maps |
//! | `/map/{name}/version/{v}[/entries\|/entry/{id}]` | Map versions and entries |
//!
//! ## Feature Flags
//!
//! - `serde` - Enables `Serialize`/`Deserialize` on every model type

#![warn(missing_docs)]

pub mod catalog;
pub mod digest;
pub mod directory;
mod error;
pub mod query;
pub mod refs;
pub mod request;
pub mod service;

pub use catalog::{
    AssociatedEntities, Association, AssociationDirection, CodeSystemVersion, CurrentDefinition,
    DefinitionEntry, DefinitionSource, Designation, Entity, EntryState, MapCatalogEntry, MapEntry,
    MapVersion, ResourceState, SetOperator, Transitivity, ValueSetCatalogEntry,
    ValueSetDefinition,
};
pub use digest::definition_digest;
pub use directory::{
    CompleteDirectory, Directory, EntitySummary, ResolutionOf, ResolvedValueSetHeader,
    ResolvedValueSetSummary,
};
pub use error::{RequestError, RequestResult};
pub use query::{FilterComponent, MapRole, MatchAlgorithm, MatchFilter, MaxToReturn, QueryParams};
pub use refs::{
    CodeSystemVersionRef, EntityId, EntityRef, MapVersionRef, NameAndUri, ScopedEntityName,
};
pub use request::{parse_request, Cts2Request, GraphView, Resource};
pub use service::{FunctionalProfile, ServiceDescriptor, StructuralProfile, SupportedProfile};
