//! Association graph navigator.
//!
//! Entity-anchored graph views (`children`, `subjectof`, `targetof`) scoped
//! to one code system version and returned as paged directories.

use cts2_model::{
    Association, AssociationDirection, CodeSystemVersion, Directory, Entity, EntityId, EntityRef,
    EntitySummary, FilterComponent, QueryParams, ScopedEntityName,
};

use crate::catalog::find_version;
use crate::config::QueryConfig;
use crate::error::CatalogResult;
use crate::matcher::{check_supported, MatchEngine, Searchable};
use crate::pager::Pager;
use crate::traits::CatalogStore;
use crate::traverser::AssociationTraverser;

/// Graph views anchored at an entity of one code system version.
///
/// An unknown code system version is `NotFound`. An unknown entity in a
/// known version yields an empty, COMPLETE directory.
pub struct AssociationNavigator<'a> {
    store: &'a dyn CatalogStore,
    config: &'a QueryConfig,
    matcher: &'a MatchEngine,
}

impl<'a> AssociationNavigator<'a> {
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

    /// Entities directly below the anchor in the hierarchy.
    pub fn children(
        &self,
        code_system: &str,
        version_id: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> CatalogResult<Directory<EntitySummary>> {
        let version = find_version(self.store, self.config, code_system, version_id)?;
        check_supported::<Entity>(&params.filter)?;
        let Some(anchor) = self.anchor(version, entity) else {
            return Ok(Directory::empty());
        };
        let version_name = version.code_system_version_name.as_str();

        let children = AssociationTraverser::new(self.store, [version_name])
            .with_inactive(self.config.include_inactive)
            .children(&anchor, self.config)?;
        let rows: Vec<(EntityRef, Option<&Entity>)> = children
            .into_iter()
            .map(|child| {
                let record = self.store.entity(version_name, &child.scoped_name());
                (child, record)
            })
            .filter(|(_, record)| {
                self.config.include_inactive || record.map_or(true, |e| e.entry_state.is_active())
            })
            .collect();

        let component = params.filter.component;
        let matched = self.matcher.select(rows, &params.filter, |(child, record)| match record {
            Some(entity) => entity.candidates(component),
            None => ref_candidates(child, component),
        });

        let directory = Pager::from_params(params, self.config).page(matched.into_iter().map(
            |(child, record)| match record {
                Some(entity) => EntitySummary::from(entity),
                None => EntitySummary {
                    about: child.uri.clone(),
                    name: child.scoped_name(),
                    known_entity_description: None,
                    describing_code_system_version: version.to_ref(),
                },
            },
        ));
        log::debug!(
            "children of {} in {}: {} entries ({:?})",
            anchor,
            version_name,
            directory.num_entries,
            directory.complete
        );
        Ok(directory)
    }

    /// Associations whose subject is the anchor, across all predicates.
    pub fn subject_of(
        &self,
        code_system: &str,
        version_id: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> CatalogResult<Directory<Association>> {
        self.edges(
            code_system,
            version_id,
            entity,
            params,
            AssociationDirection::SourceToTarget,
        )
    }

    /// Associations whose target is the anchor, across all predicates.
    pub fn target_of(
        &self,
        code_system: &str,
        version_id: &str,
        entity: &EntityId,
        params: &QueryParams,
    ) -> CatalogResult<Directory<Association>> {
        self.edges(
            code_system,
            version_id,
            entity,
            params,
            AssociationDirection::TargetToSource,
        )
    }

    fn edges(
        &self,
        code_system: &str,
        version_id: &str,
        entity: &EntityId,
        params: &QueryParams,
        direction: AssociationDirection,
    ) -> CatalogResult<Directory<Association>> {
        let version = find_version(self.store, self.config, code_system, version_id)?;
        check_supported::<Association>(&params.filter)?;
        let Some(anchor) = self.anchor(version, entity) else {
            return Ok(Directory::empty());
        };

        let version_name = version.code_system_version_name.as_str();
        let edges = AssociationTraverser::new(self.store, [version_name])
            .with_inactive(self.config.include_inactive)
            .edges(&anchor, direction)?;
        let matched = self
            .matcher
            .filter(edges, &params.filter, self.config.include_inactive)?;

        let directory = Pager::from_params(params, self.config).page(matched.into_iter().cloned());
        log::debug!(
            "{} edges of {} in {}: {} entries ({:?})",
            direction,
            anchor,
            version.code_system_version_name,
            directory.num_entries,
            directory.complete
        );
        Ok(directory)
    }

    /// Resolves the anchor's scoped name.
    ///
    /// A qualified identifier is used as-is, since edges may reference
    /// entities the version does not describe; a bare one must name an
    /// entity of the version.
    fn anchor(&self, version: &CodeSystemVersion, entity: &EntityId) -> Option<ScopedEntityName> {
        match &entity.namespace {
            Some(namespace) => Some(ScopedEntityName::new(namespace.clone(), entity.name.clone())),
            None => self
                .store
                .find_entity(&version.code_system_version_name, entity)
                .map(|e| e.name.clone()),
        }
    }
}

/// Candidate strings of an entity known only by reference.
pub(crate) fn ref_candidates(entity: &EntityRef, component: FilterComponent) -> Vec<&str> {
    match component {
        FilterComponent::ResourceName => vec![entity.name.as_str()],
        FilterComponent::ResourceSynopsis => Vec::new(),
        FilterComponent::About => vec![entity.uri.as_str()],
    }
}
