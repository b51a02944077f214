//! Map navigator.
//!
//! Directory and read operations over the map, map-version and map-entry
//! catalogs. Map entries are matched through the entities they reference:
//! the `entitiesmaprole` parameter picks the `mapFrom` side, the `mapTo`
//! side, or both, and each referenced entity contributes the strings of its
//! entity record when the map version's code system version describes it.

use cts2_model::{
    Directory, EntityId, EntityRef, FilterComponent, MapCatalogEntry, MapEntry, MapRole,
    MapVersion, QueryParams,
};

use crate::config::QueryConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::matcher::{MatchEngine, Searchable};
use crate::navigator::ref_candidates;
use crate::pager::Pager;
use crate::traits::CatalogStore;

/// Queries over maps and their versions and entries.
pub struct MapNavigator<'a> {
    store: &'a dyn CatalogStore,
    config: &'a QueryConfig,
    matcher: &'a MatchEngine,
}

impl<'a> MapNavigator<'a> {
    /// Creates a navigator.
    pub fn new(
        store: &'a dyn CatalogStore,
        config: &'a QueryConfig,
        matcher: &'a MatchEngine,
    ) -> Self {
        Self {
            store,
            config,
            matcher,
        }
    }

    // =========================================================================
    // Maps and versions
    // =========================================================================

    /// Lists the versions of every map.
    pub fn map_versions(&self, params: &QueryParams) -> CatalogResult<Directory<MapVersion>> {
        self.version_directory(self.store.map_versions(), params)
    }

    /// Looks up a map by name.
    pub fn map(&self, name: &str) -> CatalogResult<&'a MapCatalogEntry> {
        self.store
            .map(name)
            .filter(|m| self.config.include_inactive || m.entry_state.is_active())
            .ok_or_else(|| CatalogError::not_found("map", name))
    }

    /// Lists the versions of one map.
    pub fn map_versions_of(
        &self,
        name: &str,
        params: &QueryParams,
    ) -> CatalogResult<Directory<MapVersion>> {
        let map = self.map(name)?;
        let versions = self
            .store
            .map_versions()
            .filter(move |v| v.map_name() == map.map_name);
        self.version_directory(versions, params)
    }

    /// Looks up a map version.
    pub fn map_version(&self, map: &str, version: &str) -> CatalogResult<&'a MapVersion> {
        self.store
            .map_version(map, version)
            .filter(|v| self.config.include_inactive || v.entry_state.is_active())
            .ok_or_else(|| CatalogError::not_found("map version", format!("{}/{}", map, version)))
    }

    fn version_directory<'v>(
        &self,
        versions: impl Iterator<Item = &'v MapVersion>,
        params: &QueryParams,
    ) -> CatalogResult<Directory<MapVersion>> {
        let matched = self
            .matcher
            .filter(versions, &params.filter, self.config.include_inactive)?;
        let directory = Pager::from_params(params, self.config).page(matched.into_iter().cloned());
        log::debug!(
            "map version directory: {} entries ({:?})",
            directory.num_entries,
            directory.complete
        );
        Ok(directory)
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// Lists the entries of a map version.
    ///
    /// Filters match against the entities on the side(s) selected by the
    /// request's map role.
    pub fn map_entries(
        &self,
        map: &str,
        version: &str,
        params: &QueryParams,
    ) -> CatalogResult<Directory<MapEntry>> {
        let map_version = self.map_version(map, version)?;
        let component = params.filter.component;
        let role = params.map_role;

        let entries = self
            .store
            .map_entries(&map_version.map_version_name)
            .filter(|e| self.config.include_inactive || e.entry_state.is_active());
        let matched = self.matcher.select(entries, &params.filter, |entry| {
            let mut candidates = Vec::new();
            if role != MapRole::MapToRole {
                candidates.extend(entity_candidates(
                    self.store,
                    &entry.map_from,
                    map_version.from_code_system_version.version_name(),
                    component,
                ));
            }
            if role != MapRole::MapFromRole {
                for target in &entry.map_to {
                    candidates.extend(entity_candidates(
                        self.store,
                        target,
                        map_version.to_code_system_version.version_name(),
                        component,
                    ));
                }
            }
            candidates
        });

        let directory = Pager::from_params(params, self.config).page(matched.into_iter().cloned());
        log::debug!(
            "entries of {} ({:?}): {} entries ({:?})",
            map_version.map_version_name,
            role,
            directory.num_entries,
            directory.complete
        );
        Ok(directory)
    }

    /// Looks up the entry mapping from one source entity.
    ///
    /// `entity` may be `ns:name` or a bare name.
    pub fn map_entry(
        &self,
        map: &str,
        version: &str,
        entity: &EntityId,
    ) -> CatalogResult<&'a MapEntry> {
        let map_version = self.map_version(map, version)?;
        self.store
            .map_entries(&map_version.map_version_name)
            .filter(|e| self.config.include_inactive || e.entry_state.is_active())
            .find(|e| entity.matches_ref(&e.map_from))
            .ok_or_else(|| {
                CatalogError::not_found(
                    "map entry",
                    format!("{}/{}", map_version.map_version_name, entity),
                )
            })
    }
}

/// Candidate strings of a mapped entity, taken from its record in
/// `version_name` when there is one.
fn entity_candidates<'e>(
    store: &'e dyn CatalogStore,
    entity: &'e EntityRef,
    version_name: &str,
    component: FilterComponent,
) -> Vec<&'e str> {
    match store.entity(version_name, &entity.scoped_name()) {
        Some(record) => record.candidates(component),
        None => ref_candidates(entity, component),
    }
}
