//! Catalog record types.
//!
//! All records are immutable once published. They are produced by the
//! terminology import pipeline and only ever read by queries.

use std::fmt;

use crate::refs::{CodeSystemVersionRef, EntityRef, MapVersionRef, NameAndUri, ScopedEntityName};

// =============================================================================
// States
// =============================================================================

/// Lifecycle state of a catalog record.
///
/// Inactive records are excluded from directories and traversals by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EntryState {
    /// Visible to queries.
    #[default]
    Active,
    /// Retained for history only.
    Inactive,
}

impl EntryState {
    /// Returns true for [`EntryState::Active`].
    pub fn is_active(self) -> bool {
        self == EntryState::Active
    }
}

/// Publication state of a versioned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ResourceState {
    /// Work in progress.
    Draft,
    /// Published.
    #[default]
    Final,
    /// Withdrawn; may not be used for new resolutions.
    Retired,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Draft => write!(f, "DRAFT"),
            ResourceState::Final => write!(f, "FINAL"),
            ResourceState::Retired => write!(f, "RETIRED"),
        }
    }
}

// =============================================================================
// Code systems and entities
// =============================================================================

/// A published release of a code system.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CodeSystemVersion {
    /// `{codeSystemName}-{officialResourceVersionId}`.
    pub code_system_version_name: String,
    /// The code system this is a version of.
    pub version_of: NameAndUri,
    /// Version identifier used in request paths, e.g. `19.05d`.
    pub official_resource_version_id: String,
    /// Canonical URI of this version.
    pub about: String,
    /// Location of the source document.
    pub document_uri: String,
    /// Formal name of the code system.
    pub formal_name: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_synopsis: Option<String>,
    /// Description of the loader that produced the version.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_and_notation: Option<String>,
    /// Publication state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: ResourceState,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl CodeSystemVersion {
    /// Creates a FINAL, ACTIVE version. The document URI defaults to `about`
    /// and the formal name to the code system name.
    pub fn new(
        code_system: impl Into<String>,
        version_id: impl Into<String>,
        about: impl Into<String>,
    ) -> Self {
        let code_system = code_system.into();
        let version_id = version_id.into();
        let about = about.into();
        Self {
            code_system_version_name: Self::version_name(&code_system, &version_id),
            formal_name: code_system.clone(),
            version_of: NameAndUri::named(code_system),
            official_resource_version_id: version_id,
            document_uri: about.clone(),
            about,
            resource_synopsis: None,
            source_and_notation: None,
            state: ResourceState::Final,
            entry_state: EntryState::Active,
        }
    }

    /// Builds the canonical version name from its parts.
    pub fn version_name(code_system: &str, version_id: &str) -> String {
        format!("{}-{}", code_system, version_id)
    }

    /// Sets the code system URI.
    pub fn with_code_system_uri(mut self, uri: impl Into<String>) -> Self {
        self.version_of.uri = Some(uri.into());
        self
    }

    /// Sets the formal name.
    pub fn with_formal_name(mut self, formal_name: impl Into<String>) -> Self {
        self.formal_name = formal_name.into();
        self
    }

    /// Sets the document URI.
    pub fn with_document_uri(mut self, document_uri: impl Into<String>) -> Self {
        self.document_uri = document_uri.into();
        self
    }

    /// Sets the resource synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.resource_synopsis = Some(synopsis.into());
        self
    }

    /// Sets the source-and-notation description.
    pub fn with_source_and_notation(mut self, description: impl Into<String>) -> Self {
        self.source_and_notation = Some(description.into());
        self
    }

    /// Sets the publication state.
    pub fn with_state(mut self, state: ResourceState) -> Self {
        self.state = state;
        self
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }

    /// Returns the code system name.
    pub fn code_system_name(&self) -> &str {
        &self.version_of.content
    }

    /// Returns a reference to this version.
    pub fn to_ref(&self) -> CodeSystemVersionRef {
        CodeSystemVersionRef::new(self.version_of.clone(), self.code_system_version_name.clone())
    }
}

/// A name or synonym attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Designation {
    /// The designation text.
    pub value: String,
    /// Whether this is the preferred designation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preferred: bool,
}

/// A concept (or other named entity) described by one code system version.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Entity {
    /// Namespace-qualified name.
    pub name: ScopedEntityName,
    /// Canonical URI; links the same concept across versions.
    pub about: String,
    /// The version that describes this record.
    pub describing_code_system_version: CodeSystemVersionRef,
    /// Names and synonyms.
    #[cfg_attr(feature = "serde", serde(default))]
    pub designations: Vec<Designation>,
    /// Description text.
    #[cfg_attr(feature = "serde", serde(default))]
    pub synopsis: Option<String>,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl Entity {
    /// Creates an ACTIVE entity with no designations.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        about: impl Into<String>,
        describing_code_system_version: CodeSystemVersionRef,
    ) -> Self {
        Self {
            name: ScopedEntityName::new(namespace, name),
            about: about.into(),
            describing_code_system_version,
            designations: Vec::new(),
            synopsis: None,
            entry_state: EntryState::Active,
        }
    }

    /// Adds a designation.
    pub fn with_designation(mut self, value: impl Into<String>, preferred: bool) -> Self {
        self.designations.push(Designation {
            value: value.into(),
            preferred,
        });
        self
    }

    /// Sets the synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = Some(synopsis.into());
        self
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }

    /// Returns the preferred designation, falling back to the first one.
    pub fn preferred_designation(&self) -> Option<&str> {
        self.designations
            .iter()
            .find(|d| d.preferred)
            .or_else(|| self.designations.first())
            .map(|d| d.value.as_str())
    }

    /// Returns a reference to this entity.
    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(
            self.name.namespace.clone(),
            self.name.name.clone(),
            self.about.clone(),
        )
    }
}

/// A directed edge `(subject, predicate, target)` asserted by a version.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Association {
    /// Source of the edge.
    pub subject: EntityRef,
    /// Relationship type.
    pub predicate: EntityRef,
    /// Destination of the edge.
    pub target: EntityRef,
    /// The version asserting the edge.
    pub asserted_by: CodeSystemVersionRef,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl Association {
    /// Creates an ACTIVE association.
    pub fn new(
        subject: EntityRef,
        predicate: EntityRef,
        target: EntityRef,
        asserted_by: CodeSystemVersionRef,
    ) -> Self {
        Self {
            subject,
            predicate,
            target,
            asserted_by,
            entry_state: EntryState::Active,
        }
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }
}

// =============================================================================
// Value sets
// =============================================================================

/// How a definition entry combines with the entries before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SetOperator {
    /// Add the entry's members.
    Union,
    /// Keep only members also in the entry.
    Intersection,
    /// Remove the entry's members.
    Difference,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOperator::Union => write!(f, "UNION"),
            SetOperator::Intersection => write!(f, "INTERSECTION"),
            SetOperator::Difference => write!(f, "DIFFERENCE"),
        }
    }
}

/// Which end of an edge the referenced entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AssociationDirection {
    /// The referenced entity is the subject; members are targets.
    SourceToTarget,
    /// The referenced entity is the target; members are subjects.
    TargetToSource,
}

impl fmt::Display for AssociationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationDirection::SourceToTarget => write!(f, "SOURCE_TO_TARGET"),
            AssociationDirection::TargetToSource => write!(f, "TARGET_TO_SOURCE"),
        }
    }
}

/// Whether an associated-entities entry follows edges one hop or to closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Transitivity {
    /// One hop from the referenced entity.
    DirectlyAssociated,
    /// Every entity reachable from the referenced entity.
    TransitiveClosure,
}

impl fmt::Display for Transitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transitivity::DirectlyAssociated => write!(f, "DIRECTLY_ASSOCIATED"),
            Transitivity::TransitiveClosure => write!(f, "TRANSITIVE_CLOSURE"),
        }
    }
}

/// Members reached by walking associations from a referenced entity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AssociatedEntities {
    /// Edge direction to follow.
    pub direction: AssociationDirection,
    /// Seed entity.
    pub referenced_entity: EntityRef,
    /// Restricts the walk to one predicate; any predicate when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub association_predicate: Option<EntityRef>,
    /// Hop policy; the resolver default applies when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transitivity: Option<Transitivity>,
}

impl AssociatedEntities {
    /// Creates an entry walking any predicate with the default transitivity.
    pub fn new(direction: AssociationDirection, referenced_entity: EntityRef) -> Self {
        Self {
            direction,
            referenced_entity,
            association_predicate: None,
            transitivity: None,
        }
    }

    /// Restricts the walk to one predicate.
    pub fn with_predicate(mut self, predicate: EntityRef) -> Self {
        self.association_predicate = Some(predicate);
        self
    }

    /// Sets the hop policy.
    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = Some(transitivity);
        self
    }
}

/// The member source of one definition entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DefinitionSource {
    /// Entities reached through associations.
    AssociatedEntities(AssociatedEntities),
    /// An explicit list of entities.
    SpecificEntities(Vec<EntityRef>),
    /// Every active entity of a code system (current version unless pinned).
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    CompleteCodeSystem {
        /// Code system name.
        code_system: String,
        /// Pinned version name.
        #[cfg_attr(feature = "serde", serde(default))]
        version: Option<String>,
    },
}

/// One entry of a value-set definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinitionEntry {
    /// How this entry folds into the running result.
    pub operator: SetOperator,
    /// Where the entry's members come from.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub source: DefinitionSource,
}

impl DefinitionEntry {
    /// A UNION entry.
    pub fn union(source: DefinitionSource) -> Self {
        Self {
            operator: SetOperator::Union,
            source,
        }
    }

    /// An INTERSECTION entry.
    pub fn intersection(source: DefinitionSource) -> Self {
        Self {
            operator: SetOperator::Intersection,
            source,
        }
    }

    /// A DIFFERENCE entry.
    pub fn difference(source: DefinitionSource) -> Self {
        Self {
            operator: SetOperator::Difference,
            source,
        }
    }

    /// Returns the associated-entities body, if that is the entry kind.
    pub fn associated_entities(&self) -> Option<&AssociatedEntities> {
        match &self.source {
            DefinitionSource::AssociatedEntities(associated) => Some(associated),
            _ => None,
        }
    }
}

/// Canonical single-line rendering; the definition digest hashes these lines.
impl fmt::Display for DefinitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.operator)?;
        match &self.source {
            DefinitionSource::AssociatedEntities(a) => {
                write!(f, "associatedEntities {} {}", a.direction, a.referenced_entity.uri)?;
                if let Some(predicate) = &a.association_predicate {
                    write!(f, " predicate={}", predicate.uri)?;
                }
                if let Some(transitivity) = a.transitivity {
                    write!(f, " transitivity={}", transitivity)?;
                }
                Ok(())
            }
            DefinitionSource::SpecificEntities(entities) => {
                write!(f, "specificEntities")?;
                for entity in entities {
                    write!(f, " {}", entity.uri)?;
                }
                Ok(())
            }
            DefinitionSource::CompleteCodeSystem {
                code_system,
                version,
            } => match version {
                Some(version) => write!(f, "completeCodeSystem {} {}", code_system, version),
                None => write!(f, "completeCodeSystem {}", code_system),
            },
        }
    }
}

/// A versioned value-set definition, identified by `(value_set_name, digest)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ValueSetDefinition {
    /// Name of the defined value set.
    pub defined_value_set: NameAndUri,
    /// Content digest of the definition body.
    #[cfg_attr(feature = "serde", serde(default))]
    pub digest: String,
    /// Source document URI.
    pub document_uri: String,
    /// Publication state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: ResourceState,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
    /// Ordered entries, folded left to right.
    #[cfg_attr(feature = "serde", serde(rename = "entry"))]
    pub entries: Vec<DefinitionEntry>,
}

impl ValueSetDefinition {
    /// Creates a FINAL, ACTIVE definition with no digest yet.
    pub fn new(
        value_set_name: impl Into<String>,
        document_uri: impl Into<String>,
        entries: Vec<DefinitionEntry>,
    ) -> Self {
        Self {
            defined_value_set: NameAndUri::named(value_set_name),
            digest: String::new(),
            document_uri: document_uri.into(),
            state: ResourceState::Final,
            entry_state: EntryState::Active,
            entries,
        }
    }

    /// Sets an externally assigned digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = digest.into();
        self
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }

    /// Returns the defined value-set name.
    pub fn value_set_name(&self) -> &str {
        &self.defined_value_set.content
    }
}

/// Pointer from a value-set catalog entry to its current definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CurrentDefinition {
    /// Definition digest (`content`) and document URI (`uri`).
    pub value_set_definition: NameAndUri,
    /// The value set being defined.
    pub value_set: NameAndUri,
}

/// A value set as listed in the value-set catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ValueSetCatalogEntry {
    /// Value-set name.
    pub value_set_name: String,
    /// Canonical URI.
    pub about: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_synopsis: Option<String>,
    /// The definition currently in force.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_definition: Option<CurrentDefinition>,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl ValueSetCatalogEntry {
    /// Creates an ACTIVE catalog entry with no definition.
    pub fn new(value_set_name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            value_set_name: value_set_name.into(),
            about: about.into(),
            resource_synopsis: None,
            current_definition: None,
            entry_state: EntryState::Active,
        }
    }

    /// Sets the synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.resource_synopsis = Some(synopsis.into());
        self
    }

    /// Points the entry at a definition.
    pub fn with_current_definition(mut self, definition: &ValueSetDefinition) -> Self {
        self.current_definition = Some(CurrentDefinition {
            value_set_definition: NameAndUri::with_uri(
                definition.digest.clone(),
                definition.document_uri.clone(),
            ),
            value_set: NameAndUri::named(self.value_set_name.clone()),
        });
        self
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }

    /// Returns the digest of the current definition.
    pub fn current_digest(&self) -> Option<&str> {
        self.current_definition
            .as_ref()
            .map(|d| d.value_set_definition.content.as_str())
    }
}

// =============================================================================
// Maps
// =============================================================================

/// A cross-terminology map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MapCatalogEntry {
    /// Map name.
    pub map_name: String,
    /// Canonical URI.
    pub about: String,
    /// Source code system.
    pub from_code_system: NameAndUri,
    /// Destination code system.
    pub to_code_system: NameAndUri,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_synopsis: Option<String>,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl MapCatalogEntry {
    /// Creates an ACTIVE map whose URI is its name.
    pub fn new(
        map_name: impl Into<String>,
        from_code_system: impl Into<String>,
        to_code_system: impl Into<String>,
    ) -> Self {
        let map_name = map_name.into();
        Self {
            about: map_name.clone(),
            map_name,
            from_code_system: NameAndUri::named(from_code_system),
            to_code_system: NameAndUri::named(to_code_system),
            resource_synopsis: None,
            entry_state: EntryState::Active,
        }
    }

    /// Sets the synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.resource_synopsis = Some(synopsis.into());
        self
    }
}

/// A published version of a map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MapVersion {
    /// `{mapName}-{version}`.
    pub map_version_name: String,
    /// The map this is a version of.
    pub version_of: NameAndUri,
    /// Formal name.
    pub formal_name: String,
    /// Source document URI.
    pub document_uri: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_synopsis: Option<String>,
    /// Version the `mapFrom` entities belong to.
    pub from_code_system_version: CodeSystemVersionRef,
    /// Version the `mapTo` entities belong to.
    pub to_code_system_version: CodeSystemVersionRef,
    /// Description of the loader that produced the version.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_and_notation: Option<String>,
    /// Publication state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: ResourceState,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl MapVersion {
    /// Creates a FINAL, ACTIVE map version.
    pub fn new(
        map_name: impl Into<String>,
        map_version_name: impl Into<String>,
        from_code_system_version: CodeSystemVersionRef,
        to_code_system_version: CodeSystemVersionRef,
    ) -> Self {
        let map_name = map_name.into();
        Self {
            map_version_name: map_version_name.into(),
            formal_name: map_name.clone(),
            document_uri: format!("urn:oid:{}", map_name),
            version_of: NameAndUri::named(map_name),
            resource_synopsis: None,
            from_code_system_version,
            to_code_system_version,
            source_and_notation: None,
            state: ResourceState::Final,
            entry_state: EntryState::Active,
        }
    }

    /// Sets the synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.resource_synopsis = Some(synopsis.into());
        self
    }

    /// Sets the source-and-notation description.
    pub fn with_source_and_notation(mut self, description: impl Into<String>) -> Self {
        self.source_and_notation = Some(description.into());
        self
    }

    /// Sets the record state.
    pub fn with_entry_state(mut self, entry_state: EntryState) -> Self {
        self.entry_state = entry_state;
        self
    }

    /// Returns the map name.
    pub fn map_name(&self) -> &str {
        &self.version_of.content
    }

    /// Returns a reference to this map version.
    pub fn to_ref(&self) -> MapVersionRef {
        MapVersionRef::new(self.version_of.clone(), self.map_version_name.clone())
    }
}

/// A single source-to-target mapping record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MapEntry {
    /// The asserting map version.
    pub asserted_by: MapVersionRef,
    /// Source entity.
    pub map_from: EntityRef,
    /// Target entities.
    #[cfg_attr(feature = "serde", serde(default))]
    pub map_to: Vec<EntityRef>,
    /// Record state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_state: EntryState,
}

impl MapEntry {
    /// Creates an ACTIVE map entry.
    pub fn new(asserted_by: MapVersionRef, map_from: EntityRef, map_to: Vec<EntityRef>) -> Self {
        Self {
            asserted_by,
            map_from,
            map_to,
            entry_state: EntryState::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thesaurus() -> CodeSystemVersion {
        CodeSystemVersion::new(
            "NCI_Thesaurus",
            "19.05d",
            "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#19.05d",
        )
        .with_code_system_uri("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#")
        .with_formal_name("NCI Thesaurus")
        .with_synopsis("NCI Thesaurus")
    }

    #[test]
    fn test_code_system_version_name() {
        let version = thesaurus();
        assert_eq!(version.code_system_version_name, "NCI_Thesaurus-19.05d");
        assert_eq!(version.code_system_name(), "NCI_Thesaurus");
        assert_eq!(version.official_resource_version_id, "19.05d");
        assert_eq!(version.state, ResourceState::Final);
        assert!(version.entry_state.is_active());
    }

    #[test]
    fn test_code_system_version_ref() {
        let version_ref = thesaurus().to_ref();
        assert_eq!(version_ref.version_name(), "NCI_Thesaurus-19.05d");
        assert_eq!(
            version_ref.code_system.uri.as_deref(),
            Some("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#")
        );
    }

    #[test]
    fn test_preferred_designation_falls_back_to_first() {
        let version = thesaurus().to_ref();
        let entity = Entity::new("ncit", "C938", "http://x#C938", version.clone())
            .with_designation("Alpha", false)
            .with_designation("Beta", false);
        assert_eq!(entity.preferred_designation(), Some("Alpha"));

        let entity = Entity::new("ncit", "C938", "http://x#C938", version)
            .with_designation("Alpha", false)
            .with_designation("Beta", true);
        assert_eq!(entity.preferred_designation(), Some("Beta"));
    }

    #[test]
    fn test_definition_entry_display() {
        let entry = DefinitionEntry::union(DefinitionSource::AssociatedEntities(
            AssociatedEntities::new(
                AssociationDirection::TargetToSource,
                EntityRef::new("ncit", "C131123", "http://x#C131123"),
            )
            .with_predicate(EntityRef::new("ncit", "A8", "http://x#A8")),
        ));
        assert_eq!(
            entry.to_string(),
            "UNION associatedEntities TARGET_TO_SOURCE http://x#C131123 predicate=http://x#A8"
        );

        let entry = DefinitionEntry::difference(DefinitionSource::CompleteCodeSystem {
            code_system: "GO".to_string(),
            version: None,
        });
        assert_eq!(entry.to_string(), "DIFFERENCE completeCodeSystem GO");
    }

    #[test]
    fn test_value_set_entry_current_definition() {
        let definition =
            ValueSetDefinition::new("FDA Terminology", "http://evs/FDA/C131123", vec![])
                .with_digest("e32e022f");
        let entry = ValueSetCatalogEntry::new("FDA Terminology", "http://evs/FDA/C131123")
            .with_current_definition(&definition);
        assert_eq!(entry.current_digest(), Some("e32e022f"));
        let current = entry.current_definition.unwrap();
        assert_eq!(current.value_set.content, "FDA Terminology");
        assert_eq!(current.value_set_definition.uri.as_deref(), Some("http://evs/FDA/C131123"));
    }

    #[test]
    fn test_map_version_defaults() {
        let from = thesaurus().to_ref();
        let to = CodeSystemVersionRef::new(NameAndUri::named("chebi"), "chebi-v169");
        let version =
            MapVersion::new("NCIt_to_ChEBI_Mapping", "NCIt_to_ChEBI_Mapping-1.0", from, to);
        assert_eq!(version.map_name(), "NCIt_to_ChEBI_Mapping");
        assert_eq!(version.formal_name, "NCIt_to_ChEBI_Mapping");
        assert_eq!(version.document_uri, "urn:oid:NCIt_to_ChEBI_Mapping");
        assert_eq!(version.to_ref().map_version.content, "NCIt_to_ChEBI_Mapping-1.0");
    }
}
