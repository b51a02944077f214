//! Value-set definition evaluation.
//!
//! A definition is an ordered list of entries, each contributing a set of
//! entities that is folded into the running membership with the entry's
//! operator:
//!
//! | Operator | Effect on the accumulator |
//! |----------|---------------------------|
//! | `UNION` | add the contribution |
//! | `INTERSECTION` | keep only members also in the contribution |
//! | `DIFFERENCE` | remove members found in the contribution |
//!
//! The fold runs left to right, so `A UNION B DIFFERENCE C` is
//! `(A ∪ B) \ C`. Membership is keyed by entity URI and returned sorted by
//! URI, which makes evaluation deterministic for a fixed version set.

use std::collections::{BTreeMap, BTreeSet};

use cts2_model::{
    AssociatedEntities, CodeSystemVersion, CodeSystemVersionRef, DefinitionSource, EntityRef,
    EntitySummary, NameAndUri, ResourceState, SetOperator, Transitivity, ValueSetDefinition,
};
use cts2_query::{AssociationTraverser, CatalogError, CatalogStore};

use crate::error::{ResolverError, ResolverResult};

type Members = BTreeMap<String, EntitySummary>;

// =============================================================================
// Version sets
// =============================================================================

/// Selects the code system versions a definition is evaluated against.
pub struct VersionSet;

impl VersionSet {
    /// Validates an explicit list of version names.
    ///
    /// Unknown names are `NotFound`. A RETIRED version, or two versions of
    /// the same code system, is a `ResolutionConflict`.
    pub fn explicit<'s, S: AsRef<str>>(
        store: &'s dyn CatalogStore,
        names: &[S],
    ) -> ResolverResult<Vec<&'s CodeSystemVersion>> {
        let mut by_system: BTreeMap<&str, &'s CodeSystemVersion> = BTreeMap::new();
        let mut versions = BTreeMap::new();

        for name in names {
            let name = name.as_ref();
            let version = store
                .code_system_version(name)
                .filter(|v| v.entry_state.is_active())
                .ok_or_else(|| CatalogError::not_found("code system version", name))?;
            if version.state == ResourceState::Retired {
                return Err(ResolverError::ResolutionConflict(format!(
                    "{} is {}",
                    name, version.state
                )));
            }
            if let Some(other) = by_system.insert(version.code_system_name(), version) {
                if other.code_system_version_name != version.code_system_version_name {
                    return Err(ResolverError::ResolutionConflict(format!(
                        "{} and {} are versions of the same code system",
                        other.code_system_version_name, version.code_system_version_name
                    )));
                }
            }
            versions.insert(version.code_system_version_name.as_str(), version);
        }
        Ok(versions.into_values().collect())
    }

    /// Picks the current version of every code system the definition uses.
    ///
    /// A code system is used when it describes a referenced or listed
    /// entity, or when a `CompleteCodeSystem` entry names it. Its current
    /// version is the last FINAL, ACTIVE version in catalog order. Pinned
    /// `CompleteCodeSystem` versions are used as given.
    pub fn current<'s>(
        store: &'s dyn CatalogStore,
        definition: &ValueSetDefinition,
    ) -> ResolverResult<Vec<&'s CodeSystemVersion>> {
        let mut systems = BTreeSet::new();
        let mut pinned = BTreeMap::new();

        for entry in &definition.entries {
            match &entry.source {
                DefinitionSource::AssociatedEntities(associated) => {
                    systems.extend(describing_systems(store, &associated.referenced_entity));
                }
                DefinitionSource::SpecificEntities(entities) => {
                    for entity in entities {
                        systems.extend(describing_systems(store, entity));
                    }
                }
                DefinitionSource::CompleteCodeSystem {
                    code_system,
                    version: Some(version),
                } => {
                    let pinned_version = pinned_version(store, code_system, version)?;
                    pinned.insert(code_system.clone(), pinned_version);
                }
                DefinitionSource::CompleteCodeSystem {
                    code_system,
                    version: None,
                } => {
                    systems.insert(code_system.clone());
                }
            }
        }

        let mut versions = BTreeMap::new();
        for version in pinned.values() {
            versions.insert(version.code_system_version_name.as_str(), *version);
        }
        for system in systems.iter().filter(|s| !pinned.contains_key(*s)) {
            let current = current_version(store, system).ok_or_else(|| {
                ResolverError::ResolutionConflict(format!("no current version of {}", system))
            })?;
            versions.insert(current.code_system_version_name.as_str(), current);
        }
        Ok(versions.into_values().collect())
    }
}

/// The last FINAL, ACTIVE version of a code system in catalog order.
pub fn current_version<'s>(
    store: &'s dyn CatalogStore,
    code_system: &str,
) -> Option<&'s CodeSystemVersion> {
    store
        .code_system_versions()
        .filter(|v| v.code_system_name() == code_system)
        .filter(|v| v.state == ResourceState::Final && v.entry_state.is_active())
        .last()
}

fn describing_systems(store: &dyn CatalogStore, entity: &EntityRef) -> BTreeSet<String> {
    let name = entity.scoped_name();
    store
        .entities()
        .filter(|e| e.name == name)
        .map(|e| e.describing_code_system_version.code_system_name().to_string())
        .collect()
}

fn pinned_version<'s>(
    store: &'s dyn CatalogStore,
    code_system: &str,
    version: &str,
) -> ResolverResult<&'s CodeSystemVersion> {
    let by_id = CodeSystemVersion::version_name(code_system, version);
    store
        .code_system_version(version)
        .filter(|v| v.code_system_name() == code_system)
        .or_else(|| store.code_system_version(&by_id))
        .filter(|v| v.entry_state.is_active())
        .ok_or_else(|| CatalogError::not_found("code system version", by_id).into())
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates definitions against a fixed set of code system versions.
///
/// # Example
///
/// ```ignore
/// let versions = VersionSet::current(store, definition)?;
/// let evaluator = DefinitionEvaluator::new(store, versions, Transitivity::TransitiveClosure);
/// let members = evaluator.evaluate(definition)?;
/// ```
pub struct DefinitionEvaluator<'a> {
    store: &'a dyn CatalogStore,
    versions: Vec<&'a CodeSystemVersion>,
    default_transitivity: Transitivity,
}

impl<'a> DefinitionEvaluator<'a> {
    /// Creates an evaluator over the given versions.
    pub fn new(
        store: &'a dyn CatalogStore,
        versions: Vec<&'a CodeSystemVersion>,
        default_transitivity: Transitivity,
    ) -> Self {
        Self {
            store,
            versions,
            default_transitivity,
        }
    }

    /// The versions, sorted by name.
    pub fn versions(&self) -> &[&'a CodeSystemVersion] {
        &self.versions
    }

    /// References to the versions, sorted by name.
    pub fn version_refs(&self) -> Vec<CodeSystemVersionRef> {
        self.versions.iter().map(|v| v.to_ref()).collect()
    }

    /// Evaluates a definition, returning its members sorted by URI.
    pub fn evaluate(&self, definition: &ValueSetDefinition) -> ResolverResult<Vec<EntitySummary>> {
        let mut members = Members::new();
        for (position, entry) in definition.entries.iter().enumerate() {
            let contribution = self.contribution(&entry.source)?;
            log::debug!(
                "{} entry {}: {} {} members",
                definition.value_set_name(),
                position,
                entry.operator,
                contribution.len()
            );
            match entry.operator {
                SetOperator::Union => {
                    for (uri, member) in contribution {
                        members.entry(uri).or_insert(member);
                    }
                }
                SetOperator::Intersection => {
                    members.retain(|uri, _| contribution.contains_key(uri))
                }
                SetOperator::Difference => {
                    members.retain(|uri, _| !contribution.contains_key(uri))
                }
            }
        }
        Ok(members.into_values().collect())
    }

    fn contribution(&self, source: &DefinitionSource) -> ResolverResult<Members> {
        match source {
            DefinitionSource::AssociatedEntities(associated) => self.associated(associated),
            DefinitionSource::SpecificEntities(entities) => {
                Ok(self.summarize(entities.iter().cloned()))
            }
            DefinitionSource::CompleteCodeSystem {
                code_system,
                version,
            } => self.complete_code_system(code_system, version.as_deref()),
        }
    }

    fn associated(&self, associated: &AssociatedEntities) -> ResolverResult<Members> {
        let traverser = AssociationTraverser::new(
            self.store,
            self.versions.iter().map(|v| v.code_system_version_name.as_str()),
        );
        let anchor = associated.referenced_entity.scoped_name();
        let predicate = associated.association_predicate.as_ref();
        let reached = match associated.transitivity.unwrap_or(self.default_transitivity) {
            Transitivity::DirectlyAssociated => {
                traverser.neighbours(&anchor, associated.direction, predicate)?
            }
            Transitivity::TransitiveClosure => {
                traverser.closure(&anchor, associated.direction, predicate)?
            }
        };
        Ok(self.summarize(reached))
    }

    fn complete_code_system(
        &self,
        code_system: &str,
        pinned: Option<&str>,
    ) -> ResolverResult<Members> {
        let version = match pinned {
            Some(version) => pinned_version(self.store, code_system, version)?,
            None => self
                .versions
                .iter()
                .copied()
                .find(|v| v.code_system_name() == code_system)
                .ok_or_else(|| {
                    ResolverError::ResolutionConflict(format!(
                        "no version of {} in the resolution's version set",
                        code_system
                    ))
                })?,
        };
        Ok(self
            .store
            .entities_of(&version.code_system_version_name)
            .filter(|e| e.entry_state.is_active())
            .map(|e| (e.about.clone(), EntitySummary::from(e)))
            .collect())
    }

    /// Turns references into member rows.
    ///
    /// The record is looked up in each version of the set in turn. INACTIVE
    /// records drop out; references with no record become rows built from
    /// the reference itself.
    fn summarize(&self, entities: impl IntoIterator<Item = EntityRef>) -> Members {
        let mut members = Members::new();
        for entity in entities {
            let name = entity.scoped_name();
            let record = self
                .versions
                .iter()
                .find_map(|v| self.store.entity(&v.code_system_version_name, &name));
            let summary = match record {
                Some(record) if !record.entry_state.is_active() => continue,
                Some(record) => EntitySummary::from(record),
                None => EntitySummary {
                    describing_code_system_version: self.fallback_version(&entity),
                    about: entity.uri,
                    name,
                    known_entity_description: None,
                },
            };
            members.entry(summary.about.clone()).or_insert(summary);
        }
        members
    }

    fn fallback_version(&self, entity: &EntityRef) -> CodeSystemVersionRef {
        match self.versions.first() {
            Some(version) => version.to_ref(),
            None => CodeSystemVersionRef::new(NameAndUri::named(entity.namespace.clone()), ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cts2_model::{
        Association, AssociationDirection, DefinitionEntry, Entity, EntryState,
    };
    use cts2_query::InMemoryCatalog;
    use pretty_assertions::assert_eq;

    fn go(version: &str) -> CodeSystemVersion {
        CodeSystemVersion::new("GO", version, format!("http://go/{}", version))
    }

    fn term(version: &CodeSystemVersion, name: &str) -> Entity {
        Entity::new("GO", name, format!("http://go#{}", name), version.to_ref())
    }

    fn is_a(version: &CodeSystemVersion, child: &Entity, parent: &Entity) -> Association {
        Association::new(
            child.to_ref(),
            EntityRef::new("GO", "is_a", "http://go#is_a"),
            parent.to_ref(),
            version.to_ref(),
        )
    }

    /// GO_1 <- GO_2 <- GO_3, GO_1 <- GO_4; GO_5 is inactive.
    fn catalog() -> InMemoryCatalog {
        let v = go("2019");
        let t: Vec<Entity> = (1..=5).map(|i| term(&v, &format!("GO_{}", i))).collect();
        InMemoryCatalog::builder()
            .code_system_version(go("2018").with_state(ResourceState::Retired))
            .code_system_version(v.clone())
            .code_system_version(go("2020").with_state(ResourceState::Draft))
            .entity(t[0].clone())
            .entity(t[1].clone())
            .entity(t[2].clone())
            .entity(t[3].clone())
            .entity(t[4].clone().with_entry_state(EntryState::Inactive))
            .association(is_a(&v, &t[1], &t[0]))
            .association(is_a(&v, &t[2], &t[1]))
            .association(is_a(&v, &t[3], &t[0]))
            .association(is_a(&v, &t[4], &t[0]))
            .build()
    }

    fn descendants(of: &str) -> DefinitionSource {
        DefinitionSource::AssociatedEntities(AssociatedEntities::new(
            AssociationDirection::TargetToSource,
            EntityRef::new("GO", of, format!("http://go#{}", of)),
        ))
    }

    fn specific(names: &[&str]) -> DefinitionSource {
        DefinitionSource::SpecificEntities(
            names
                .iter()
                .map(|n| EntityRef::new("GO", *n, format!("http://go#{}", n)))
                .collect(),
        )
    }

    fn evaluate(store: &InMemoryCatalog, entries: Vec<DefinitionEntry>) -> Vec<String> {
        let definition = ValueSetDefinition::new("Terms", "http://vs/Terms", entries);
        let versions = VersionSet::current(store, &definition).unwrap();
        DefinitionEvaluator::new(store, versions, Transitivity::TransitiveClosure)
            .evaluate(&definition)
            .unwrap()
            .into_iter()
            .map(|m| m.name.name)
            .collect()
    }

    #[test]
    fn test_closure_excludes_anchor_and_inactive() {
        let store = catalog();
        let members = evaluate(&store, vec![DefinitionEntry::union(descendants("GO_1"))]);
        assert_eq!(members, vec!["GO_2", "GO_3", "GO_4"]);
    }

    #[test]
    fn test_direct_association_is_one_hop() {
        let store = catalog();
        let source = DefinitionSource::AssociatedEntities(
            AssociatedEntities::new(
                AssociationDirection::TargetToSource,
                EntityRef::new("GO", "GO_1", "http://go#GO_1"),
            )
            .with_transitivity(Transitivity::DirectlyAssociated),
        );
        let members = evaluate(&store, vec![DefinitionEntry::union(source)]);
        assert_eq!(members, vec!["GO_2", "GO_4"]);
    }

    #[test]
    fn test_source_to_target_walks_up() {
        let store = catalog();
        let source = DefinitionSource::AssociatedEntities(AssociatedEntities::new(
            AssociationDirection::SourceToTarget,
            EntityRef::new("GO", "GO_3", "http://go#GO_3"),
        ));
        let members = evaluate(&store, vec![DefinitionEntry::union(source)]);
        assert_eq!(members, vec!["GO_1", "GO_2"]);
    }

    #[test]
    fn test_fold_is_left_to_right() {
        let store = catalog();
        // (descendants(GO_1) \ {GO_3}) ∪ {GO_3} keeps GO_3
        let members = evaluate(
            &store,
            vec![
                DefinitionEntry::union(descendants("GO_1")),
                DefinitionEntry::difference(specific(&["GO_3"])),
                DefinitionEntry::union(specific(&["GO_3"])),
            ],
        );
        assert_eq!(members, vec!["GO_2", "GO_3", "GO_4"]);

        // (descendants(GO_1) ∪ {GO_3}) \ {GO_3} drops it
        let members = evaluate(
            &store,
            vec![
                DefinitionEntry::union(descendants("GO_1")),
                DefinitionEntry::union(specific(&["GO_3"])),
                DefinitionEntry::difference(specific(&["GO_3"])),
            ],
        );
        assert_eq!(members, vec!["GO_2", "GO_4"]);
    }

    #[test]
    fn test_intersection() {
        let store = catalog();
        let members = evaluate(
            &store,
            vec![
                DefinitionEntry::union(descendants("GO_1")),
                DefinitionEntry::intersection(descendants("GO_2")),
            ],
        );
        assert_eq!(members, vec!["GO_3"]);
    }

    #[test]
    fn test_leading_intersection_is_empty() {
        let store = catalog();
        let members = evaluate(&store, vec![DefinitionEntry::intersection(descendants("GO_1"))]);
        assert!(members.is_empty());
    }

    #[test]
    fn test_complete_code_system_lists_active_entities() {
        let store = catalog();
        let members = evaluate(
            &store,
            vec![DefinitionEntry::union(DefinitionSource::CompleteCodeSystem {
                code_system: "GO".to_string(),
                version: None,
            })],
        );
        assert_eq!(members, vec!["GO_1", "GO_2", "GO_3", "GO_4"]);
    }

    #[test]
    fn test_unknown_specific_entity_is_kept_from_reference() {
        let store = catalog();
        let definition = ValueSetDefinition::new(
            "Terms",
            "http://vs/Terms",
            vec![DefinitionEntry::union(specific(&["GO_1", "GO_404"]))],
        );
        let versions = VersionSet::current(&store, &definition).unwrap();
        let members = DefinitionEvaluator::new(&store, versions, Transitivity::TransitiveClosure)
            .evaluate(&definition)
            .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].about, "http://go#GO_404");
        assert_eq!(members[1].describing_code_system_version.version_name(), "GO-2019");
    }

    #[test]
    fn test_current_version_skips_retired_and_draft() {
        let store = catalog();
        let current = current_version(&store, "GO").unwrap();
        assert_eq!(current.code_system_version_name, "GO-2019");
        assert!(current_version(&store, "NCI_Thesaurus").is_none());
    }

    #[test]
    fn test_explicit_versions_validation() {
        let store = catalog();
        let versions = VersionSet::explicit(&store, &["GO-2019", "GO-2019"]).unwrap();
        assert_eq!(versions.len(), 1);

        let err = VersionSet::explicit(&store, &["GO-1999"]).unwrap_err();
        assert!(err.is_not_found());

        let err = VersionSet::explicit(&store, &["GO-2018"]).unwrap_err();
        assert!(matches!(err, ResolverError::ResolutionConflict(_)));

        let err = VersionSet::explicit(&store, &["GO-2019", "GO-2020"]).unwrap_err();
        assert!(matches!(err, ResolverError::ResolutionConflict(_)));
    }

    #[test]
    fn test_pinned_version_must_exist() {
        let store = catalog();
        let definition = ValueSetDefinition::new(
            "Terms",
            "http://vs/Terms",
            vec![DefinitionEntry::union(DefinitionSource::CompleteCodeSystem {
                code_system: "GO".to_string(),
                version: Some("1999".to_string()),
            })],
        );
        assert!(VersionSet::current(&store, &definition).unwrap_err().is_not_found());
    }
}
