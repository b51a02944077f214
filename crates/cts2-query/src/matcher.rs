//! Match filter engine.
//!
//! Evaluates a `(filtercomponent, matchvalue, matchalgorithm)` triple against
//! the searchable strings of catalog records. Each record type declares, via
//! [`Searchable`], which strings it exposes for each [`FilterComponent`];
//! `resourceName` and `resourceSynopsis` are always separate candidate sets,
//! even for records where their contents overlap.
//!
//! The algorithms are [`TextMatcher`] strategies. `luceneQuery` is served
//! by a pluggable ranked matcher (a [`TokenMatcher`] unless configured
//! otherwise) so a deployment can swap in a real inverted index without
//! changing the directory contract.

use std::sync::Arc;

use cts2_model::{
    Association, CodeSystemVersion, Entity, EntitySummary, EntryState, FilterComponent,
    MapCatalogEntry, MapVersion, MatchAlgorithm, MatchFilter, ResolvedValueSetSummary,
    ValueSetCatalogEntry,
};

use crate::error::{CatalogError, CatalogResult};

// =============================================================================
// Searchable records
// =============================================================================

/// A record that can be filtered by the match engine.
pub trait Searchable {
    /// Catalog name used in error messages.
    const CATALOG: &'static str;

    /// Returns true if the catalog can be filtered on `component`.
    fn supports(component: FilterComponent) -> bool {
        let _ = component;
        true
    }

    /// Returns the candidate strings for `component`.
    fn candidates(&self, component: FilterComponent) -> Vec<&str>;

    /// Record state.
    fn entry_state(&self) -> EntryState {
        EntryState::Active
    }
}

impl Searchable for CodeSystemVersion {
    const CATALOG: &'static str = "code system version";

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => vec![self.code_system_version_name.as_str()],
            FilterComponent::ResourceSynopsis => {
                self.resource_synopsis.as_deref().into_iter().collect()
            }
            FilterComponent::About => vec![self.about.as_str()],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

impl Searchable for Entity {
    const CATALOG: &'static str = "entity";

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => std::iter::once(self.name.name.as_str())
                .chain(self.designations.iter().map(|d| d.value.as_str()))
                .collect(),
            FilterComponent::ResourceSynopsis => self.synopsis.as_deref().into_iter().collect(),
            FilterComponent::About => vec![self.about.as_str()],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

/// Entity rows carry no synopsis, so only name and about are searchable.
impl Searchable for EntitySummary {
    const CATALOG: &'static str = "entity summary";

    fn supports(component: FilterComponent) -> bool {
        component != FilterComponent::ResourceSynopsis
    }

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => std::iter::once(self.name.name.as_str())
                .chain(self.known_entity_description.as_deref())
                .collect(),
            FilterComponent::ResourceSynopsis => Vec::new(),
            FilterComponent::About => vec![self.about.as_str()],
        }
    }
}

impl Searchable for Association {
    const CATALOG: &'static str = "association";

    fn supports(component: FilterComponent) -> bool {
        component != FilterComponent::ResourceSynopsis
    }

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => vec![
                self.subject.name.as_str(),
                self.predicate.name.as_str(),
                self.target.name.as_str(),
            ],
            FilterComponent::ResourceSynopsis => Vec::new(),
            FilterComponent::About => vec![
                self.subject.uri.as_str(),
                self.predicate.uri.as_str(),
                self.target.uri.as_str(),
            ],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

impl Searchable for ValueSetCatalogEntry {
    const CATALOG: &'static str = "value set";

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => vec![self.value_set_name.as_str()],
            FilterComponent::ResourceSynopsis => {
                self.resource_synopsis.as_deref().into_iter().collect()
            }
            FilterComponent::About => vec![self.about.as_str()],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

impl Searchable for MapCatalogEntry {
    const CATALOG: &'static str = "map";

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => vec![self.map_name.as_str()],
            FilterComponent::ResourceSynopsis => {
                self.resource_synopsis.as_deref().into_iter().collect()
            }
            FilterComponent::About => vec![self.about.as_str()],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

impl Searchable for MapVersion {
    const CATALOG: &'static str = "map version";

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => vec![self.map_version_name.as_str(), self.map_name()],
            FilterComponent::ResourceSynopsis => {
                self.resource_synopsis.as_deref().into_iter().collect()
            }
            FilterComponent::About => vec![self.document_uri.as_str()],
        }
    }

    fn entry_state(&self) -> EntryState {
        self.entry_state
    }
}

impl Searchable for ResolvedValueSetSummary {
    const CATALOG: &'static str = "resolved value set";

    fn supports(component: FilterComponent) -> bool {
        component != FilterComponent::ResourceSynopsis
    }

    fn candidates(&self, component: FilterComponent) -> Vec<&str> {
        match component {
            FilterComponent::ResourceName => {
                vec![self.resolved_header.resolution_of.value_set.content.as_str()]
            }
            FilterComponent::ResourceSynopsis => Vec::new(),
            FilterComponent::About => vec![self.resolved_value_set_uri.as_str()],
        }
    }
}

// =============================================================================
// Text matchers
// =============================================================================

/// A text-matching strategy.
///
/// Returns `Some(score)` when `value` matches any of `candidates`. Unranked
/// strategies return a constant score.
pub trait TextMatcher: Send + Sync {
    /// Scores `value` against the candidate strings.
    fn score(&self, value: &str, candidates: &[&str]) -> Option<u32>;
}

/// Case-sensitive equality with any candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl TextMatcher for ExactMatcher {
    fn score(&self, value: &str, candidates: &[&str]) -> Option<u32> {
        candidates.iter().any(|c| *c == value).then_some(1)
    }
}

/// Case-insensitive substring of any candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsMatcher;

impl TextMatcher for ContainsMatcher {
    fn score(&self, value: &str, candidates: &[&str]) -> Option<u32> {
        let value = value.to_lowercase();
        candidates
            .iter()
            .any(|c| c.to_lowercase().contains(&value))
            .then_some(1)
    }
}

/// Case-insensitive prefix of any candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartsWithMatcher;

impl TextMatcher for StartsWithMatcher {
    fn score(&self, value: &str, candidates: &[&str]) -> Option<u32> {
        let value = value.to_lowercase();
        candidates
            .iter()
            .any(|c| c.to_lowercase().starts_with(&value))
            .then_some(1)
    }
}

/// Naive tokenized free-text matcher.
///
/// Query and candidates are split into lowercase alphanumeric tokens. Each
/// query token scores 2 for an equal candidate token and 1 for a candidate
/// token it is a prefix of; a record matches when the total is positive.
/// Query syntax characters such as `*`, `"` and `~` act as separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMatcher;

impl TokenMatcher {
    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

impl TextMatcher for TokenMatcher {
    fn score(&self, value: &str, candidates: &[&str]) -> Option<u32> {
        let query = Self::tokens(value);
        let tokens: Vec<String> = candidates.iter().flat_map(|c| Self::tokens(c)).collect();

        let score: u32 = query
            .iter()
            .map(|q| {
                if tokens.iter().any(|t| t == q) {
                    2
                } else if tokens.iter().any(|t| t.starts_with(q.as_str())) {
                    1
                } else {
                    0
                }
            })
            .sum();
        (score > 0).then_some(score)
    }
}

// =============================================================================
// Match engine
// =============================================================================

/// Applies match filters to record streams.
///
/// # Example
///
/// ```rust
/// use cts2_model::{CodeSystemVersion, FilterComponent, MatchAlgorithm, MatchFilter};
/// use cts2_query::MatchEngine;
///
/// let versions = vec![
///     CodeSystemVersion::new("NCI_Thesaurus", "19.05d", "http://evs/Thesaurus#19.05d")
///         .with_synopsis("NCI Thesaurus"),
///     CodeSystemVersion::new("GO", "2019", "http://go/2019"),
/// ];
///
/// let engine = MatchEngine::new();
/// let filter = MatchFilter::new("thesaurus").on(FilterComponent::ResourceSynopsis);
/// let matched = engine.filter(versions.iter(), &filter, false).unwrap();
/// assert_eq!(matched.len(), 1);
/// ```
#[derive(Clone)]
pub struct MatchEngine {
    ranked: Arc<dyn TextMatcher>,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine").finish_non_exhaustive()
    }
}

impl MatchEngine {
    /// Creates an engine using [`TokenMatcher`] for `luceneQuery`.
    pub fn new() -> Self {
        Self::with_ranked_matcher(Arc::new(TokenMatcher))
    }

    /// Creates an engine with a custom `luceneQuery` strategy.
    pub fn with_ranked_matcher(ranked: Arc<dyn TextMatcher>) -> Self {
        Self { ranked }
    }

    /// Returns the strategy serving an algorithm.
    pub fn matcher(&self, algorithm: MatchAlgorithm) -> &dyn TextMatcher {
        match algorithm {
            MatchAlgorithm::ExactMatch => &ExactMatcher,
            MatchAlgorithm::Contains => &ContainsMatcher,
            MatchAlgorithm::StartsWith => &StartsWithMatcher,
            MatchAlgorithm::LuceneQuery => self.ranked.as_ref(),
        }
    }

    /// Returns true if the filter passes a record.
    ///
    /// State is not considered here; see [`filter`](Self::filter).
    pub fn matches<R: Searchable>(&self, record: &R, filter: &MatchFilter) -> CatalogResult<bool> {
        check_supported::<R>(filter)?;
        Ok(match &filter.value {
            None => true,
            Some(value) => self
                .matcher(filter.algorithm)
                .score(value, &record.candidates(filter.component))
                .is_some(),
        })
    }

    /// Filters records, dropping INACTIVE ones unless `include_inactive`.
    ///
    /// Catalog order is preserved, except that ranked algorithms order by
    /// descending score (ties keep catalog order).
    pub fn filter<'r, R, I>(
        &self,
        records: I,
        filter: &MatchFilter,
        include_inactive: bool,
    ) -> CatalogResult<Vec<&'r R>>
    where
        R: Searchable + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        check_supported::<R>(filter)?;
        let records = records
            .into_iter()
            .filter(|r| include_inactive || r.entry_state().is_active());
        Ok(self.select(records, filter, |r| r.candidates(filter.component)))
    }

    /// Filters arbitrary items using caller-supplied candidate strings.
    ///
    /// Used where candidates come from more than one record, such as map
    /// entries matched through the entities they reference.
    pub fn select<T, I, F>(&self, items: I, filter: &MatchFilter, candidates: F) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        F: for<'x> Fn(&'x T) -> Vec<&'x str>,
    {
        let Some(value) = filter.value.as_deref() else {
            return items.into_iter().collect();
        };
        let matcher = self.matcher(filter.algorithm);

        let mut scored: Vec<(u32, T)> = items
            .into_iter()
            .filter_map(|item| {
                let score = matcher.score(value, &candidates(&item))?;
                Some((score, item))
            })
            .collect();
        if filter.algorithm.is_ranked() {
            scored.sort_by(|a, b| b.0.cmp(&a.0));
        }
        scored.into_iter().map(|(_, item)| item).collect()
    }
}

pub(crate) fn check_supported<R: Searchable>(filter: &MatchFilter) -> CatalogResult<()> {
    if filter.value.is_some() && !R::supports(filter.component) {
        return Err(CatalogError::UnsupportedFilterComponent {
            component: filter.component,
            catalog: R::CATALOG,
        });
    }
    Ok(())
}
