//! Catalog directory queries.
//!
//! [`CatalogQuery`] is the entry point for the read side of the catalog: it
//! owns the store, the query configuration and the match engine, and turns
//! `(catalog, QueryParams)` pairs into paged directories.

use std::sync::Arc;

use cts2_model::{
    CodeSystemVersion, Directory, Entity, EntityId, EntitySummary, QueryParams,
    ValueSetCatalogEntry, ValueSetDefinition,
};

use crate::config::QueryConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::maps::MapNavigator;
use crate::matcher::{MatchEngine, Searchable};
use crate::navigator::AssociationNavigator;
use crate::pager::Pager;
use crate::traits::CatalogStore;

/// Directory and read queries over a catalog store.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cts2_model::{CodeSystemVersion, FilterComponent, MatchFilter, QueryParams};
/// use cts2_query::{CatalogQuery, InMemoryCatalog};
///
/// let store = InMemoryCatalog::builder()
///     .code_system_version(
///         CodeSystemVersion::new("NCI_Thesaurus", "19.05d", "http://evs/Thesaurus#19.05d")
///             .with_synopsis("NCI Thesaurus"),
///     )
///     .build();
/// let query = CatalogQuery::new(Arc::new(store));
///
/// let params = QueryParams::new()
///     .with_filter(MatchFilter::new("thesaurus").on(FilterComponent::ResourceSynopsis));
/// let directory = query.code_system_versions(&params).unwrap();
/// assert!(directory.is_complete());
/// assert_eq!(directory.entries[0].code_system_version_name, "NCI_Thesaurus-19.05d");
/// ```
#[derive(Clone)]
pub struct CatalogQuery {
    store: Arc<dyn CatalogStore>,
    config: QueryConfig,
    matcher: MatchEngine,
}

impl CatalogQuery {
    /// Creates a query engine with the default configuration.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    /// Creates a query engine with a custom configuration.
    pub fn with_config(store: Arc<dyn CatalogStore>, config: QueryConfig) -> Self {
        Self {
            store,
            config,
            matcher: MatchEngine::new(),
        }
    }

    /// Replaces the match engine.
    pub fn with_matcher(mut self, matcher: MatchEngine) -> Self {
        self.matcher = matcher;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Returns the match engine.
    pub fn matcher(&self) -> &MatchEngine {
        &self.matcher
    }

    /// Returns the association graph navigator.
    pub fn navigator(&self) -> AssociationNavigator<'_> {
        AssociationNavigator::new(self.store.as_ref(), &self.config, &self.matcher)
    }

    /// Returns the map navigator.
    pub fn maps(&self) -> MapNavigator<'_> {
        MapNavigator::new(self.store.as_ref(), &self.config, &self.matcher)
    }

    // =========================================================================
    // Code system versions
    // =========================================================================

    /// Lists code system versions.
    pub fn code_system_versions(
        &self,
        params: &QueryParams,
    ) -> CatalogResult<Directory<CodeSystemVersion>> {
        self.directory(self.store.code_system_versions(), params, |v| v.clone())
    }

    /// Looks up a code system version by code system name and official version id.
    pub fn code_system_version(
        &self,
        code_system: &str,
        version_id: &str,
    ) -> CatalogResult<&CodeSystemVersion> {
        find_version(self.store.as_ref(), &self.config, code_system, version_id)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Lists entities across every code system version.
    pub fn entities(&self, params: &QueryParams) -> CatalogResult<Directory<EntitySummary>> {
        self.directory(self.store.entities(), params, EntitySummary::from)
    }

    /// Lists the entities described by one code system version.
    pub fn code_system_entities(
        &self,
        code_system: &str,
        version_id: &str,
        params: &QueryParams,
    ) -> CatalogResult<Directory<EntitySummary>> {
        let version = self.code_system_version(code_system, version_id)?;
        self.directory(
            self.store.entities_of(&version.code_system_version_name),
            params,
            EntitySummary::from,
        )
    }

    /// Reads one entity of a code system version.
    ///
    /// `entity` may be `ns:name` or a bare name.
    pub fn entity(
        &self,
        code_system: &str,
        version_id: &str,
        entity: &EntityId,
    ) -> CatalogResult<&Entity> {
        let version = self.code_system_version(code_system, version_id)?;
        self.store
            .find_entity(&version.code_system_version_name, entity)
            .filter(|e| self.config.include_inactive || e.entry_state.is_active())
            .ok_or_else(|| {
                CatalogError::not_found(
                    "entity",
                    format!("{}/{}", version.code_system_version_name, entity),
                )
            })
    }

    // =========================================================================
    // Value sets
    // =========================================================================

    /// Lists value sets.
    pub fn value_sets(
        &self,
        params: &QueryParams,
    ) -> CatalogResult<Directory<ValueSetCatalogEntry>> {
        self.directory(self.store.value_sets(), params, |v| v.clone())
    }

    /// Reads a value set.
    pub fn value_set(&self, name: &str) -> CatalogResult<&ValueSetCatalogEntry> {
        self.store
            .value_set(name)
            .filter(|v| self.config.include_inactive || v.entry_state.is_active())
            .ok_or_else(|| CatalogError::not_found("value set", name))
    }

    /// Reads a value-set definition by value-set name and digest.
    pub fn value_set_definition(
        &self,
        name: &str,
        digest: &str,
    ) -> CatalogResult<&ValueSetDefinition> {
        self.store
            .value_set_definition(name, digest)
            .ok_or_else(|| {
                CatalogError::not_found("value set definition", format!("{}/{}", name, digest))
            })
    }

    /// Reads the current definition of a value set.
    pub fn current_definition(&self, name: &str) -> CatalogResult<&ValueSetDefinition> {
        let entry = self.value_set(name)?;
        let digest = entry.current_digest().ok_or_else(|| {
            CatalogError::not_found("value set definition", format!("{}/current", name))
        })?;
        self.value_set_definition(name, digest)
    }

    fn directory<'r, R, T, F>(
        &self,
        records: impl Iterator<Item = &'r R>,
        params: &QueryParams,
        to_entry: F,
    ) -> CatalogResult<Directory<T>>
    where
        R: Searchable + 'r,
        F: Fn(&'r R) -> T,
    {
        let matched = self
            .matcher
            .filter(records, &params.filter, self.config.include_inactive)?;
        let directory =
            Pager::from_params(params, &self.config).page(matched.into_iter().map(to_entry));
        log::debug!(
            "{} directory ({}): {} entries ({:?})",
            R::CATALOG,
            params.filter.component,
            directory.num_entries,
            directory.complete
        );
        Ok(directory)
    }
}

/// Finds a code system version by code system name and official version id.
///
/// The full version name (`{codeSystem}-{version}`) is accepted in place of
/// the version id.
pub(crate) fn find_version<'s>(
    store: &'s dyn CatalogStore,
    config: &QueryConfig,
    code_system: &str,
    version_id: &str,
) -> CatalogResult<&'s CodeSystemVersion> {
    let by_id = CodeSystemVersion::version_name(code_system, version_id);
    store
        .code_system_version(&by_id)
        .or_else(|| {
            store
                .code_system_version(version_id)
                .filter(|v| v.code_system_name() == code_system)
        })
        .filter(|v| config.include_inactive || v.entry_state.is_active())
        .ok_or_else(|| CatalogError::not_found("code system version", by_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cts2_model::{EntryState, FilterComponent, MatchAlgorithm, MatchFilter};
    use crate::memory::InMemoryCatalog;

    fn thesaurus() -> CodeSystemVersion {
        CodeSystemVersion::new("NCI_Thesaurus", "19.05d", "http://EVS/Thesaurus#19.05d")
            .with_synopsis("NCI Thesaurus")
    }

    fn query() -> CatalogQuery {
        let version = thesaurus();
        let store = InMemoryCatalog::builder()
            .code_system_version(version.clone())
            .code_system_version(
                CodeSystemVersion::new("NCI_Thesaurus", "18.10e", "http://EVS/Thesaurus#18.10e")
                    .with_entry_state(EntryState::Inactive),
            )
            .entity(
                Entity::new("ncit", "C12727", "http://ncit#C12727", version.to_ref())
                    .with_designation("Heart", true),
            )
            .entity(
                Entity::new("ncit", "C12468", "http://ncit#C12468", version.to_ref())
                    .with_designation("Lung", true)
                    .with_entry_state(EntryState::Inactive),
            )
            .build();
        CatalogQuery::new(Arc::new(store))
    }

    #[test]
    fn test_version_lookup_by_id_and_name() {
        let query = query();
        let by_id = query.code_system_version("NCI_Thesaurus", "19.05d").unwrap();
        let by_name = query
            .code_system_version("NCI_Thesaurus", "NCI_Thesaurus-19.05d")
            .unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.version_of.content, "NCI_Thesaurus");
    }

    #[test]
    fn test_version_lookup_errors() {
        let query = query();
        let err = query.code_system_version("NCI_Thesaurus", "99").unwrap_err();
        assert_eq!(err, CatalogError::not_found("code system version", "NCI_Thesaurus-99"));
        assert!(query
            .code_system_version("GO", "NCI_Thesaurus-19.05d")
            .unwrap_err()
            .is_not_found());
        // Inactive versions are hidden by default
        assert!(query.code_system_version("NCI_Thesaurus", "18.10e").is_err());
    }

    #[test]
    fn test_inactive_versions_listed_when_configured() {
        let query = query();
        let store = Arc::clone(query.store());
        let all = CatalogQuery::with_config(
            store,
            QueryConfig::builder().with_include_inactive(true).build(),
        );
        assert_eq!(query.code_system_versions(&QueryParams::new()).unwrap().num_entries, 1);
        assert_eq!(all.code_system_versions(&QueryParams::new()).unwrap().num_entries, 2);
        assert!(all.code_system_version("NCI_Thesaurus", "18.10e").is_ok());
    }

    #[test]
    fn test_entity_read() {
        let query = query();
        let heart = query
            .entity("NCI_Thesaurus", "19.05d", &EntityId::parse("ncit:C12727"))
            .unwrap();
        assert_eq!(heart.preferred_designation(), Some("Heart"));
        assert!(query
            .entity("NCI_Thesaurus", "19.05d", &EntityId::parse("C12727"))
            .is_ok());
        assert!(query
            .entity("NCI_Thesaurus", "19.05d", &EntityId::parse("ncit:C12468"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_code_system_entities() {
        let query = query();
        let params = QueryParams::new()
            .with_filter(MatchFilter::new("heart").using(MatchAlgorithm::StartsWith));
        let directory = query
            .code_system_entities("NCI_Thesaurus", "19.05d", &params)
            .unwrap();
        assert_eq!(directory.num_entries, 1);
        assert_eq!(directory.entries[0].known_entity_description.as_deref(), Some("Heart"));
    }

    #[test]
    fn test_about_filter_case_sensitivity() {
        let query = query();
        let on_about = |algorithm| {
            let params = QueryParams::new()
                .with_filter(MatchFilter::new("EVS").on(FilterComponent::About).using(algorithm));
            query.code_system_versions(&params).unwrap().num_entries
        };
        assert_eq!(on_about(MatchAlgorithm::Contains), 1);
        assert_eq!(on_about(MatchAlgorithm::StartsWith), 0);
        assert_eq!(on_about(MatchAlgorithm::ExactMatch), 0);
    }
}
