//! Resolution result types.

use chrono::{DateTime, Utc};
use cts2_model::{Directory, EntitySummary, ResolvedValueSetHeader, ResolvedValueSetSummary};
use serde::{Deserialize, Serialize};

/// A materialized value-set resolution.
///
/// Immutable once built; shared between callers behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedValueSet {
    /// What was resolved and against which versions.
    pub header: ResolvedValueSetHeader,
    /// Content-addressed identifier.
    #[serde(rename = "resolvedValueSetURI")]
    pub resolved_value_set_uri: String,
    /// Members sorted by URI.
    pub members: Vec<EntitySummary>,
    /// SHA-256 over the sorted member URIs.
    pub membership_digest: String,
    /// Position in the definition's resolution history (1-based).
    pub ordinal: usize,
}

impl ResolvedValueSet {
    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the resolution has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if an entity URI is a member.
    pub fn contains(&self, about: &str) -> bool {
        self.members
            .binary_search_by(|m| m.about.as_str().cmp(about))
            .is_ok()
    }

    /// Member URIs in order.
    pub fn member_uris(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.about.as_str())
    }

    /// Directory row for this resolution.
    pub fn summary(&self) -> ResolvedValueSetSummary {
        ResolvedValueSetSummary {
            resolved_value_set_uri: self.resolved_value_set_uri.clone(),
            resolved_header: self.header.clone(),
        }
    }
}

/// A resolution as recorded in the history.
///
/// Records outlive the cached membership sets; the membership digest lets a
/// recomputed set be checked against what was originally served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    /// Position in the definition's history (1-based).
    pub ordinal: usize,
    /// Version names the definition was evaluated against.
    pub versions: Vec<String>,
    /// Resolved value set URI.
    pub resolved_value_set_uri: String,
    /// SHA-256 over the sorted member URIs.
    pub membership_digest: String,
    /// Number of members.
    pub member_count: usize,
    /// Resolution header.
    pub header: ResolvedValueSetHeader,
    /// When the resolution was first computed.
    pub resolved_at: DateTime<Utc>,
}

impl ResolutionRecord {
    /// Records a freshly computed resolution.
    pub fn new(resolved: &ResolvedValueSet, versions: Vec<String>) -> Self {
        Self {
            ordinal: resolved.ordinal,
            versions,
            resolved_value_set_uri: resolved.resolved_value_set_uri.clone(),
            membership_digest: resolved.membership_digest.clone(),
            member_count: resolved.len(),
            header: resolved.header.clone(),
            resolved_at: Utc::now(),
        }
    }

    /// Value set name.
    pub fn value_set_name(&self) -> &str {
        &self.header.resolution_of.value_set.content
    }

    /// Definition digest.
    pub fn digest(&self) -> &str {
        &self.header.resolution_of.value_set_definition.content
    }

    /// Directory row for this resolution.
    pub fn summary(&self) -> ResolvedValueSetSummary {
        ResolvedValueSetSummary {
            resolved_value_set_uri: self.resolved_value_set_uri.clone(),
            resolved_header: self.header.clone(),
        }
    }
}

/// Response to `GET /valueset/{name}/definition/{digest}/resolution/{n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedValueSetResolution {
    /// Resolution header.
    pub resolved_value_set_header: ResolvedValueSetHeader,
    /// Content-addressed identifier.
    #[serde(rename = "resolvedValueSetURI")]
    pub resolved_value_set_uri: String,
    /// One page of members.
    pub members: Directory<EntitySummary>,
}

/// Statistics about resolver usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Number of resolutions computed.
    pub computations: usize,
    /// Number of requests served from the cache.
    pub cache_hits: usize,
    /// Number of requests that waited on another caller's computation.
    pub coalesced: usize,
    /// Number of retried attempts.
    pub retries: usize,
    /// Number of requests that ended in an error.
    pub failures: usize,
}

impl ResolverStats {
    /// Returns the share of requests that did not compute, as a percentage.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.computations + self.cache_hits + self.coalesced;
        if total == 0 {
            0.0
        } else {
            ((self.cache_hits + self.coalesced) as f64 / total as f64) * 100.0
        }
    }
}

impl std::fmt::Display for ResolverStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resolver Statistics:")?;
        writeln!(f, "  Computations:    {}", self.computations)?;
        writeln!(f, "  Cache hits:      {}", self.cache_hits)?;
        writeln!(f, "  Coalesced:       {}", self.coalesced)?;
        writeln!(f, "  Reuse rate:      {:.1}%", self.reuse_rate())?;
        writeln!(f, "  Retries:         {}", self.retries)?;
        writeln!(f, "  Failures:        {}", self.failures)?;
        Ok(())
    }
}
