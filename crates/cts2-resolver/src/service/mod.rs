//! Read-only CTS2 service facade.
//!
//! [`Cts2Service`] puts the query engine and the value-set resolver behind
//! one typed method per endpoint, and [`Cts2Service::handle`] dispatches a
//! parsed [`Cts2Request`] to the matching method. Transport and encoding
//! stay outside; every response is a [`Cts2Response`] that serialises with
//! `serde`.
//!
//! | Path | Method | Response |
//! |------|--------|----------|
//! | `/service` | [`service`](Cts2Service::service) | `BaseService` |
//! | `/codesystemversions` | [`code_system_versions`](Cts2Service::code_system_versions) | `CodeSystemVersionCatalogEntryDirectory` |
//! | `/codesystem/{cs}/version/{v}` | [`code_system_version`](Cts2Service::code_system_version) | `CodeSystemVersionCatalogEntryMsg` |
//! | `/codesystem/{cs}/version/{v}/entities` | [`code_system_entities`](Cts2Service::code_system_entities) | `EntityDirectory` |
//! | `/codesystem/{cs}/version/{v}/entity/{id}` | [`entity`](Cts2Service::entity) | `EntityDescriptionMsg` |
//! | `.../entity/{id}/children` | [`children`](Cts2Service::children) | `EntityDirectory` |
//! | `.../entity/{id}/subjectof`, `targetof` | [`subject_of`](Cts2Service::subject_of), [`target_of`](Cts2Service::target_of) | `AssociationDirectory` |
//! | `/entities` | [`entities`](Cts2Service::entities) | `EntityDirectory` |
//! | `/valuesets`, `/valueset/{name}` | [`value_sets`](Cts2Service::value_sets), [`value_set`](Cts2Service::value_set) | `ValueSetCatalogEntry*` |
//! | `/valueset/{name}/definition/{digest}` | [`value_set_definition`](Cts2Service::value_set_definition) | `ValueSetDefinitionMsg` |
//! | `.../definition/{digest}/resolution/{n}` | [`resolution`](Cts2Service::resolution) | `IteratableResolvedValueSet` |
//! | `/resolvedvaluesets` | [`resolved_value_sets`](Cts2Service::resolved_value_sets) | `ResolvedValueSetDirectory` |
//! | `/mapversions`, `/map/{name}/...` | `map*` | `Map*` |

mod environment;
mod types;

pub use environment::{TestEnvironment, CHEBI, MEDDRA, METATHESAURUS, THESAURUS};
pub use types::Cts2Response;

use std::sync::Arc;

use cts2_model::{
    parse_request, Association, CodeSystemVersion, Cts2Request, Directory, Entity, EntityId,
    EntitySummary, GraphView, MapCatalogEntry, MapEntry, MapVersion, QueryParams, Resource,
    ResolvedValueSetSummary, ServiceDescriptor, ValueSetCatalogEntry, ValueSetDefinition,
};
use cts2_query::{CatalogError, CatalogQuery, CatalogStore, QueryConfig};

use crate::config::{ResolverConfig, ServiceConfig};
use crate::error::ResolverResult;
use crate::resolver::ValueSetResolver;
use crate::result::ResolvedValueSetResolution;

/// Typed CTS2 read endpoints over one catalog.
///
/// # Example
///
/// ```ignore
/// let service = Cts2Service::new(Arc::new(InMemoryCatalog::load("snapshot.json")?));
/// let response = service.handle_path("/codesystemversions?matchvalue=thesaurus")?;
/// println!("{}", serde_json::to_string_pretty(&response)?);
/// ```
#[derive(Clone)]
pub struct Cts2Service {
    resolver: ValueSetResolver,
    config: ServiceConfig,
}

impl Cts2Service {
    /// Creates a service with default configurations.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_configs(
            store,
            QueryConfig::default(),
            ResolverConfig::default(),
            ServiceConfig::default(),
        )
    }

    /// Creates a service with explicit configurations.
    pub fn with_configs(
        store: Arc<dyn CatalogStore>,
        query_config: QueryConfig,
        resolver_config: ResolverConfig,
        config: ServiceConfig,
    ) -> Self {
        let query = CatalogQuery::with_config(store, query_config);
        Self::from_resolver(ValueSetResolver::with_config(query, resolver_config), config)
    }

    /// Wraps an existing resolver, sharing its cache and history.
    pub fn from_resolver(resolver: ValueSetResolver, config: ServiceConfig) -> Self {
        Self { resolver, config }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        self.query().store()
    }

    /// Returns the query engine.
    pub fn query(&self) -> &CatalogQuery {
        self.resolver.query()
    }

    /// Returns the value-set resolver.
    pub fn resolver(&self) -> &ValueSetResolver {
        &self.resolver
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Answers a parsed request.
    pub fn handle(&self, request: &Cts2Request) -> ResolverResult<Cts2Response> {
        log::debug!("handling {}", request.resource);
        let params = &request.params;
        let response = match &request.resource {
            Resource::Service => Cts2Response::BaseService(self.service()),
            Resource::CodeSystemVersions => {
                let directory = self.code_system_versions(params)?;
                Cts2Response::CodeSystemVersionCatalogEntryDirectory(directory)
            }
            Resource::CodeSystemVersion {
                code_system,
                version,
            } => {
                let entry = self.code_system_version(code_system, version)?;
                Cts2Response::CodeSystemVersionCatalogEntryMsg(entry)
            }
            Resource::CodeSystemEntities {
                code_system,
                version,
            } => {
                let directory = self.code_system_entities(code_system, version, params)?;
                Cts2Response::EntityDirectory(directory)
            }
            Resource::Entity {
                code_system,
                version,
                entity,
            } => Cts2Response::EntityDescriptionMsg(self.entity(code_system, version, entity)?),
            Resource::EntityGraph {
                code_system,
                version,
                entity,
                view,
            } => match view {
                GraphView::Children => {
                    let directory = self.children(code_system, version, entity, params)?;
                    Cts2Response::EntityDirectory(directory)
                }
                GraphView::SubjectOf => {
                    let directory = self.subject_of(code_system, version, entity, params)?;
                    Cts2Response::AssociationDirectory(directory)
                }
                GraphView::TargetOf => {
                    let directory = self.target_of(code_system, version, entity, params)?;
                    Cts2Response::AssociationDirectory(directory)
                }
            },
            Resource::Entities => Cts2Response::EntityDirectory(self.entities(params)?),
            Resource::ValueSets => {
                Cts2Response::ValueSetCatalogEntryDirectory(self.value_sets(params)?)
            }
            Resource::ValueSet { name } => {
                Cts2Response::ValueSetCatalogEntryMsg(self.value_set(name)?)
            }
            Resource::ValueSetDefinition { name, digest } => {
                Cts2Response::ValueSetDefinitionMsg(self.value_set_definition(name, digest)?)
            }
            Resource::ValueSetResolution {
                name,
                digest,
                ordinal,
            } => {
                let resolution = self.resolution(name, digest, *ordinal, params)?;
                Cts2Response::IteratableResolvedValueSet(resolution)
            }
            Resource::ResolvedValueSets => {
                Cts2Response::ResolvedValueSetDirectory(self.resolved_value_sets(params)?)
            }
            Resource::MapVersions => Cts2Response::MapVersionDirectory(self.map_versions(params)?),
            Resource::Map { name } => Cts2Response::MapCatalogEntryMsg(self.map(name)?),
            Resource::MapVersionsOf { name } => {
                Cts2Response::MapVersionDirectory(self.map_versions_of(name, params)?)
            }
            Resource::MapVersion { map, version } => {
                Cts2Response::MapVersionMsg(self.map_version(map, version)?)
            }
            Resource::MapEntries { map, version } => {
                Cts2Response::MapEntryDirectory(self.map_entries(map, version, params)?)
            }
            Resource::MapEntry {
                map,
                version,
                entity,
            } => Cts2Response::MapEntryMsg(self.map_entry(map, version, entity)?),
        };
        Ok(response)
    }

    /// Parses a logical path with query string and answers it.
    pub fn handle_path(&self, path: &str) -> ResolverResult<Cts2Response> {
        let request = parse_request(path).map_err(CatalogError::from)?;
        self.handle(&request)
    }

    // =========================================================================
    // Catalog reads
    // =========================================================================

    /// `GET /service`.
    pub fn service(&self) -> ServiceDescriptor {
        self.config.descriptor()
    }

    /// `GET /codesystemversions`.
    pub fn code_system_versions(
        &self,
        params: &QueryParams,
    ) -> ResolverResult<Directory<CodeSystemVersion>> {
        Ok(self.query().code_system_versions(params)?)
    }

    /// `GET /codesystem/{cs}/version/{v}`.
    pub fn code_system_version(
        &self,
        code_system: &str,
        version: &str,
    ) -> ResolverResult<CodeSystemVersion> {
        Ok(self.query().code_system_version(code_system, version)?.clone())
    }

    /// `GET /codesystem/{cs}/version/{v}/entities`.
    pub fn code_system_entities(
        &self,
        code_system: &str,
        version: &str,
        params: &QueryParams,
    ) -> ResolverResult<Directory<EntitySummary>> {
        Ok(self.query().code_system_entities(code_system, version, params)?)
    }

    /// `GET /codesystem/{cs}/version/{v}/entity/{id}`.
    pub fn entity(
        &self,
        code_system: &str,
        version: &str,
        entity: &EntityId,
    ) -> ResolverResult<Entity> {
        Ok(self.query().entity(code_system, version, entity)?.clone())
    }

    /// `GET /codesystem/{cs}/version/{v}/entity/{id}/children`.
    pub fn children(
        &self,
        code_system: &str,
        version: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> ResolverResult<Directory<EntitySummary>> {
        Ok(self.query().navigator().children(code_system, version, entity, params)?)
    }

    /// `GET /codesystem/{cs}/version/{v}/entity/{id}/subjectof`.
    pub fn subject_of(
        &self,
        code_system: &str,
        version: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> ResolverResult<Directory<Association>> {
        Ok(self.query().navigator().subject_of(code_system, version, entity, params)?)
    }

    /// `GET /codesystem/{cs}/version/{v}/entity/{id}/targetof`.
    pub fn target_of(
        &self,
        code_system: &str,
        version: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> ResolverResult<Directory<Association>> {
        Ok(self.query().navigator().target_of(code_system, version, entity, params)?)
    }

    /// `GET /entities`.
    pub fn entities(&self, params: &QueryParams) -> ResolverResult<Directory<EntitySummary>> {
        Ok(self.query().entities(params)?)
    }

    // =========================================================================
    // Value sets
    // =========================================================================

    /// `GET /valuesets`.
    pub fn value_sets(
        &self,
        params: &QueryParams,
    ) -> ResolverResult<Directory<ValueSetCatalogEntry>> {
        Ok(self.query().value_sets(params)?)
    }

    /// `GET /valueset/{name}`.
    pub fn value_set(&self, name: &str) -> ResolverResult<ValueSetCatalogEntry> {
        Ok(self.query().value_set(name)?.clone())
    }

    /// `GET /valueset/{name}/definition/{digest}`.
    pub fn value_set_definition(
        &self,
        name: &str,
        digest: &str,
    ) -> ResolverResult<ValueSetDefinition> {
        Ok(self.query().value_set_definition(name, digest)?.clone())
    }

    /// `GET /valueset/{name}/definition/{digest}/resolution/{n}`.
    pub fn resolution(
        &self,
        name: &str,
        digest: &str,
        ordinal: usize,
        params: &QueryParams,
    ) -> ResolverResult<ResolvedValueSetResolution> {
        self.resolver.resolution_members(name, digest, ordinal, params)
    }

    /// `GET /resolvedvaluesets`.
    pub fn resolved_value_sets(
        &self,
        params: &QueryParams,
    ) -> ResolverResult<Directory<ResolvedValueSetSummary>> {
        self.resolver.resolved_value_sets(params)
    }

    // =========================================================================
    // Maps
    // =========================================================================

    /// `GET /mapversions`.
    pub fn map_versions(&self, params: &QueryParams) -> ResolverResult<Directory<MapVersion>> {
        Ok(self.query().maps().map_versions(params)?)
    }

    /// `GET /map/{name}`.
    pub fn map(&self, name: &str) -> ResolverResult<MapCatalogEntry> {
        Ok(self.query().maps().map(name)?.clone())
    }

    /// `GET /map/{name}/versions`.
    pub fn map_versions_of(
        &self,
        name: &str,
        params: &QueryParams,
    ) -> ResolverResult<Directory<MapVersion>> {
        Ok(self.query().maps().map_versions_of(name, params)?)
    }

    /// `GET /map/{name}/version/{v}`.
    pub fn map_version(&self, map: &str, version: &str) -> ResolverResult<MapVersion> {
        Ok(self.query().maps().map_version(map, version)?.clone())
    }

    /// `GET /map/{name}/version/{v}/entries`.
    pub fn map_entries(
        &self,
        map: &str,
        version: &str,
        params: &QueryParams,
    ) -> ResolverResult<Directory<MapEntry>> {
        Ok(self.query().maps().map_entries(map, version, params)?)
    }

    /// `GET /map/{name}/version/{v}/entry/{id}`.
    pub fn map_entry(
        &self,
        map: &str,
        version: &str,
        entity: &EntityId,
    ) -> ResolverResult<MapEntry> {
        Ok(self.query().maps().map_entry(map, version, entity)?.clone())
    }
}
