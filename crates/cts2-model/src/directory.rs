//! Directory (paged listing) types.

use crate::catalog::Entity;
use crate::refs::{CodeSystemVersionRef, NameAndUri, ScopedEntityName};

/// Whether a directory holds every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CompleteDirectory {
    /// No further matches exist after the returned window.
    Complete,
    /// More matches exist.
    Partial,
}

/// A bounded, ordered listing with a completeness flag.
///
/// `num_entries` always equals `entries.len()`; it is the number returned,
/// not the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Directory<T> {
    /// Completeness flag.
    pub complete: CompleteDirectory,
    /// Number of entries returned.
    pub num_entries: usize,
    /// The entries, in catalog order (or relevance order for ranked searches).
    #[cfg_attr(feature = "serde", serde(rename = "entry"))]
    pub entries: Vec<T>,
}

impl<T> Directory<T> {
    /// Creates a directory from a window of entries.
    pub fn new(entries: Vec<T>, complete: CompleteDirectory) -> Self {
        Self {
            complete,
            num_entries: entries.len(),
            entries,
        }
    }

    /// An empty, complete directory.
    pub fn empty() -> Self {
        Self::new(Vec::new(), CompleteDirectory::Complete)
    }

    /// Returns true when no further matches exist.
    pub fn is_complete(&self) -> bool {
        self.complete == CompleteDirectory::Complete
    }

    /// Transforms every entry, keeping the completeness flag.
    pub fn map<U, F>(self, f: F) -> Directory<U>
    where
        F: FnMut(T) -> U,
    {
        Directory::new(self.entries.into_iter().map(f).collect(), self.complete)
    }
}

/// One row of an entity directory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EntitySummary {
    /// Canonical URI.
    pub about: String,
    /// Scoped name.
    pub name: ScopedEntityName,
    /// Preferred designation, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub known_entity_description: Option<String>,
    /// Describing version.
    pub describing_code_system_version: CodeSystemVersionRef,
}

impl From<&Entity> for EntitySummary {
    fn from(entity: &Entity) -> Self {
        Self {
            about: entity.about.clone(),
            name: entity.name.clone(),
            known_entity_description: entity.preferred_designation().map(str::to_string),
            describing_code_system_version: entity.describing_code_system_version.clone(),
        }
    }
}

/// What a resolution was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolutionOf {
    /// The resolved value set.
    pub value_set: NameAndUri,
    /// Definition digest (`content`) and document URI (`uri`).
    pub value_set_definition: NameAndUri,
}

/// Header of a resolved value set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolvedValueSetHeader {
    /// Source of the resolution.
    pub resolution_of: ResolutionOf,
    /// Versions the definition was evaluated against, sorted by name.
    pub resolved_using_code_systems: Vec<CodeSystemVersionRef>,
}

/// One row of the resolved-value-set directory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolvedValueSetSummary {
    /// Content-addressed URI.
    #[cfg_attr(feature = "serde", serde(rename = "resolvedValueSetURI"))]
    pub resolved_value_set_uri: String,
    /// Resolution header.
    pub resolved_header: ResolvedValueSetHeader,
}
