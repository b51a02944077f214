//! In-memory catalog store.
//!
//! [`InMemoryCatalog`] keeps every record of a [`CatalogSnapshot`] in
//! insertion order and builds hash indexes for the lookups the query engine
//! and resolver perform. Snapshots come from the import pipeline as JSON or
//! are assembled in code with [`CatalogBuilder`].

use std::collections::HashMap;
use std::path::Path;

use cts2_model::{
    definition_digest, Association, CodeSystemVersion, Entity, MapCatalogEntry, MapEntry,
    MapVersion, ScopedEntityName, ValueSetCatalogEntry, ValueSetDefinition,
};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::traits::CatalogStore;

/// The full contents of a catalog, as produced by the import pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Free-form label identifying the snapshot.
    pub label: String,
    /// Code system versions.
    pub code_system_versions: Vec<CodeSystemVersion>,
    /// Entities of every version.
    pub entities: Vec<Entity>,
    /// Associations of every version.
    pub associations: Vec<Association>,
    /// Value-set catalog entries.
    pub value_sets: Vec<ValueSetCatalogEntry>,
    /// Value-set definitions.
    pub value_set_definitions: Vec<ValueSetDefinition>,
    /// Maps.
    pub maps: Vec<MapCatalogEntry>,
    /// Map versions.
    pub map_versions: Vec<MapVersion>,
    /// Map entries of every map version.
    pub map_entries: Vec<MapEntry>,
}

type EdgeKey = (String, ScopedEntityName);

/// An indexed, immutable catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    snapshot: CatalogSnapshot,
    version_index: HashMap<String, usize>,
    entity_index: HashMap<EdgeKey, usize>,
    entities_by_version: HashMap<String, Vec<usize>>,
    by_subject: HashMap<EdgeKey, Vec<usize>>,
    by_target: HashMap<EdgeKey, Vec<usize>>,
    value_set_index: HashMap<String, usize>,
    definition_index: HashMap<(String, String), usize>,
    entries_by_map_version: HashMap<String, Vec<usize>>,
}

impl InMemoryCatalog {
    /// Creates a new builder.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Indexes a snapshot.
    ///
    /// Definitions without a digest get one computed from their body, and
    /// value-set entries whose current definition has no digest are pointed
    /// at the first definition of the same value set.
    pub fn from_snapshot(mut snapshot: CatalogSnapshot) -> Self {
        for definition in &mut snapshot.value_set_definitions {
            if definition.digest.is_empty() {
                definition.digest = definition_digest(definition);
            }
        }
        for entry in &mut snapshot.value_sets {
            let Some(current) = entry.current_definition.as_mut() else {
                continue;
            };
            if current.value_set_definition.content.is_empty() {
                if let Some(definition) = snapshot
                    .value_set_definitions
                    .iter()
                    .find(|d| d.value_set_name() == entry.value_set_name)
                {
                    current.value_set_definition.content = definition.digest.clone();
                }
            }
        }

        let mut catalog = InMemoryCatalog::default();
        for (i, version) in snapshot.code_system_versions.iter().enumerate() {
            catalog
                .version_index
                .entry(version.code_system_version_name.clone())
                .or_insert(i);
        }
        for (i, entity) in snapshot.entities.iter().enumerate() {
            let version = entity.describing_code_system_version.version_name().to_string();
            catalog
                .entity_index
                .entry((version.clone(), entity.name.clone()))
                .or_insert(i);
            catalog.entities_by_version.entry(version).or_default().push(i);
        }
        for (i, association) in snapshot.associations.iter().enumerate() {
            let version = association.asserted_by.version_name().to_string();
            catalog
                .by_subject
                .entry((version.clone(), association.subject.scoped_name()))
                .or_default()
                .push(i);
            catalog
                .by_target
                .entry((version, association.target.scoped_name()))
                .or_default()
                .push(i);
        }
        for (i, value_set) in snapshot.value_sets.iter().enumerate() {
            catalog
                .value_set_index
                .entry(value_set.value_set_name.clone())
                .or_insert(i);
        }
        for (i, definition) in snapshot.value_set_definitions.iter().enumerate() {
            catalog
                .definition_index
                .entry((definition.value_set_name().to_string(), definition.digest.clone()))
                .or_insert(i);
        }
        for (i, entry) in snapshot.map_entries.iter().enumerate() {
            catalog
                .entries_by_map_version
                .entry(entry.asserted_by.map_version.content.clone())
                .or_default()
                .push(i);
        }

        log::debug!(
            "indexed catalog '{}': {} versions, {} entities, {} edges, {} value sets, {} maps",
            snapshot.label,
            snapshot.code_system_versions.len(),
            snapshot.entities.len(),
            snapshot.associations.len(),
            snapshot.value_sets.len(),
            snapshot.maps.len()
        );
        catalog.snapshot = snapshot;
        catalog
    }

    /// Parses and indexes a JSON snapshot.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Reads, parses and indexes a JSON snapshot file.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Returns the snapshot label.
    pub fn label(&self) -> &str {
        &self.snapshot.label
    }

    /// Returns the underlying snapshot.
    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn associations_at<'a>(&'a self, indexes: Option<&'a Vec<usize>>) -> Vec<&'a Association> {
        indexes
            .map(|idx| idx.iter().map(|&i| &self.snapshot.associations[i]).collect())
            .unwrap_or_default()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn code_system_versions(&self) -> Box<dyn Iterator<Item = &CodeSystemVersion> + '_> {
        Box::new(self.snapshot.code_system_versions.iter())
    }

    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        Box::new(self.snapshot.entities.iter())
    }

    fn associations_with_subject(
        &self,
        version_name: &str,
        subject: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>> {
        let key = (version_name.to_string(), subject.clone());
        Ok(self.associations_at(self.by_subject.get(&key)))
    }

    fn associations_with_target(
        &self,
        version_name: &str,
        target: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>> {
        let key = (version_name.to_string(), target.clone());
        Ok(self.associations_at(self.by_target.get(&key)))
    }

    fn value_sets(&self) -> Box<dyn Iterator<Item = &ValueSetCatalogEntry> + '_> {
        Box::new(self.snapshot.value_sets.iter())
    }

    fn value_set_definitions(&self) -> Box<dyn Iterator<Item = &ValueSetDefinition> + '_> {
        Box::new(self.snapshot.value_set_definitions.iter())
    }

    fn maps(&self) -> Box<dyn Iterator<Item = &MapCatalogEntry> + '_> {
        Box::new(self.snapshot.maps.iter())
    }

    fn map_versions(&self) -> Box<dyn Iterator<Item = &MapVersion> + '_> {
        Box::new(self.snapshot.map_versions.iter())
    }

    fn map_entries(&self, map_version_name: &str) -> Box<dyn Iterator<Item = &MapEntry> + '_> {
        match self.entries_by_map_version.get(map_version_name) {
            Some(indexes) => Box::new(indexes.iter().map(|&i| &self.snapshot.map_entries[i])),
            None => Box::new(std::iter::empty()),
        }
    }

    fn code_system_version(&self, version_name: &str) -> Option<&CodeSystemVersion> {
        self.version_index
            .get(version_name)
            .map(|&i| &self.snapshot.code_system_versions[i])
    }

    fn entities_of(&self, version_name: &str) -> Box<dyn Iterator<Item = &Entity> + '_> {
        match self.entities_by_version.get(version_name) {
            Some(indexes) => Box::new(indexes.iter().map(|&i| &self.snapshot.entities[i])),
            None => Box::new(std::iter::empty()),
        }
    }

    fn entity(&self, version_name: &str, name: &ScopedEntityName) -> Option<&Entity> {
        self.entity_index
            .get(&(version_name.to_string(), name.clone()))
            .map(|&i| &self.snapshot.entities[i])
    }

    fn value_set(&self, name: &str) -> Option<&ValueSetCatalogEntry> {
        self.value_set_index
            .get(name)
            .map(|&i| &self.snapshot.value_sets[i])
    }

    fn value_set_definition(&self, name: &str, digest: &str) -> Option<&ValueSetDefinition> {
        self.definition_index
            .get(&(name.to_string(), digest.to_string()))
            .map(|&i| &self.snapshot.value_set_definitions[i])
    }
}

/// Builder for [`InMemoryCatalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    snapshot: CatalogSnapshot,
}

impl CatalogBuilder {
    /// Sets the snapshot label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.snapshot.label = label.into();
        self
    }

    /// Adds a code system version.
    pub fn code_system_version(mut self, version: CodeSystemVersion) -> Self {
        self.snapshot.code_system_versions.push(version);
        self
    }

    /// Adds an entity.
    pub fn entity(mut self, entity: Entity) -> Self {
        self.snapshot.entities.push(entity);
        self
    }

    /// Adds an association.
    pub fn association(mut self, association: Association) -> Self {
        self.snapshot.associations.push(association);
        self
    }

    /// Adds a value set whose current definition is `definition`.
    ///
    /// The definition's digest is computed when it has none.
    pub fn value_set(
        mut self,
        entry: ValueSetCatalogEntry,
        mut definition: ValueSetDefinition,
    ) -> Self {
        if definition.digest.is_empty() {
            definition.digest = definition_digest(&definition);
        }
        self.snapshot
            .value_sets
            .push(entry.with_current_definition(&definition));
        self.snapshot.value_set_definitions.push(definition);
        self
    }

    /// Adds a definition that is not current for any value set.
    pub fn value_set_definition(mut self, definition: ValueSetDefinition) -> Self {
        self.snapshot.value_set_definitions.push(definition);
        self
    }

    /// Adds a map.
    pub fn map(mut self, map: MapCatalogEntry) -> Self {
        self.snapshot.maps.push(map);
        self
    }

    /// Adds a map version.
    pub fn map_version(mut self, version: MapVersion) -> Self {
        self.snapshot.map_versions.push(version);
        self
    }

    /// Adds a map entry.
    pub fn map_entry(mut self, entry: MapEntry) -> Self {
        self.snapshot.map_entries.push(entry);
        self
    }

    /// Indexes the collected records.
    pub fn build(self) -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(self.snapshot)
    }
}
