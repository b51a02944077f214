//! Traits for catalog query execution.
//!
//! This module defines the [`CatalogStore`] trait that must be implemented
//! by any backing store the query engine and resolver run against. The
//! store is a read-only, versioned snapshot: every method returns records
//! in the store's natural (insertion) order, and no method mutates state.
//!
//! # Example: Wrapping a store
//!
//! ```ignore
//! use cts2_query::{CatalogResult, CatalogStore, InMemoryCatalog};
//!
//! struct AuditedStore(InMemoryCatalog);
//!
//! impl CatalogStore for AuditedStore {
//!     fn code_system_versions(&self) -> Box<dyn Iterator<Item = &CodeSystemVersion> + '_> {
//!         self.0.code_system_versions()
//!     }
//!     // ... delegate the remaining required methods ...
//! }
//! ```

use cts2_model::{
    Association, CodeSystemVersion, Entity, EntityId, MapCatalogEntry, MapEntry, MapVersion,
    ScopedEntityName, ValueSetCatalogEntry, ValueSetDefinition,
};

use crate::error::CatalogResult;

/// Trait for stores that back the CTS2 catalogs.
///
/// # Required Methods
///
/// - [`code_system_versions`](Self::code_system_versions) - All code system versions
/// - [`entities`](Self::entities) - All entities of all versions
/// - [`associations_with_subject`](Self::associations_with_subject) /
///   [`associations_with_target`](Self::associations_with_target) - Edge indexes
/// - [`value_sets`](Self::value_sets) / [`value_set_definitions`](Self::value_set_definitions)
/// - [`maps`](Self::maps) / [`map_versions`](Self::map_versions) / [`map_entries`](Self::map_entries)
///
/// # Optional Methods (with defaults)
///
/// Point lookups default to linear scans over the iterators. Override them
/// when the store keeps indexes.
///
/// The association lookups are fallible because they are the index reads
/// a remote store would serve; failures there surface as
/// [`CatalogError::StoreError`](crate::CatalogError::StoreError).
pub trait CatalogStore: Send + Sync {
    /// Returns every code system version in catalog order.
    fn code_system_versions(&self) -> Box<dyn Iterator<Item = &CodeSystemVersion> + '_>;

    /// Returns every entity in catalog order.
    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_>;

    /// Returns associations whose subject is `subject`, asserted by the version.
    fn associations_with_subject(
        &self,
        version_name: &str,
        subject: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>>;

    /// Returns associations whose target is `target`, asserted by the version.
    fn associations_with_target(
        &self,
        version_name: &str,
        target: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>>;

    /// Returns every value-set catalog entry in catalog order.
    fn value_sets(&self) -> Box<dyn Iterator<Item = &ValueSetCatalogEntry> + '_>;

    /// Returns every value-set definition in catalog order.
    fn value_set_definitions(&self) -> Box<dyn Iterator<Item = &ValueSetDefinition> + '_>;

    /// Returns every map in catalog order.
    fn maps(&self) -> Box<dyn Iterator<Item = &MapCatalogEntry> + '_>;

    /// Returns every map version in catalog order.
    fn map_versions(&self) -> Box<dyn Iterator<Item = &MapVersion> + '_>;

    /// Returns the entries asserted by one map version.
    fn map_entries(&self, map_version_name: &str) -> Box<dyn Iterator<Item = &MapEntry> + '_>;

    // =========================================================================
    // Point lookups
    // =========================================================================

    /// Looks up a code system version by its version name.
    fn code_system_version(&self, version_name: &str) -> Option<&CodeSystemVersion> {
        self.code_system_versions()
            .find(|v| v.code_system_version_name == version_name)
    }

    /// Returns the entities described by one version.
    fn entities_of(&self, version_name: &str) -> Box<dyn Iterator<Item = &Entity> + '_> {
        let version_name = version_name.to_string();
        Box::new(
            self.entities()
                .filter(move |e| e.describing_code_system_version.version_name() == version_name),
        )
    }

    /// Looks up an entity of a version by scoped name.
    fn entity(&self, version_name: &str, name: &ScopedEntityName) -> Option<&Entity> {
        self.entities_of(version_name).find(|e| &e.name == name)
    }

    /// Looks up an entity of a version by a possibly unqualified identifier.
    fn find_entity(&self, version_name: &str, id: &EntityId) -> Option<&Entity> {
        match &id.namespace {
            Some(namespace) => {
                let name = ScopedEntityName::new(namespace.clone(), id.name.clone());
                self.entity(version_name, &name)
            }
            None => self.entities_of(version_name).find(|e| id.matches(&e.name)),
        }
    }

    /// Looks up a value-set catalog entry by name.
    fn value_set(&self, name: &str) -> Option<&ValueSetCatalogEntry> {
        self.value_sets().find(|v| v.value_set_name == name)
    }

    /// Looks up a value-set definition by value-set name and digest.
    fn value_set_definition(&self, name: &str, digest: &str) -> Option<&ValueSetDefinition> {
        self.value_set_definitions()
            .find(|d| d.value_set_name() == name && d.digest == digest)
    }

    /// Looks up a map by name.
    fn map(&self, name: &str) -> Option<&MapCatalogEntry> {
        self.maps().find(|m| m.map_name == name)
    }

    /// Looks up a map version by map name and version name.
    fn map_version(&self, map_name: &str, version_name: &str) -> Option<&MapVersion> {
        self.map_versions()
            .find(|v| v.map_name() == map_name && v.map_version_name == version_name)
    }
}
