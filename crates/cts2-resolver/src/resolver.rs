//! Memoized value-set resolution.
//!
//! [`ValueSetResolver`] evaluates value-set definitions against sets of code
//! system versions. Each `(value set, digest, version set)` key is computed
//! at most once at a time: concurrent callers for the same key share one
//! computation through the in-flight registry, and completed resolutions
//! are served from an LRU cache. Failures are delivered to the callers that
//! waited for them and are never cached.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cts2_query::{CatalogQuery, InMemoryCatalog};
//! use cts2_resolver::ValueSetResolver;
//!
//! let query = CatalogQuery::new(Arc::new(InMemoryCatalog::load("snapshot.json")?));
//! let resolver = ValueSetResolver::new(query);
//!
//! // Against the current version of every code system the definition uses
//! let resolved = resolver.resolve_current("Heart Structures", "e32e022f")?;
//! println!("{} members at {}", resolved.len(), resolved.resolved_value_set_uri);
//!
//! // Pinned to an explicit version set
//! let pinned = resolver.resolve("Heart Structures", "e32e022f", &["NCI_Thesaurus-19.05d"])?;
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cts2_model::{
    Directory, NameAndUri, QueryParams, ResolutionOf, ResolvedValueSetHeader,
    ResolvedValueSetSummary, ValueSetDefinition,
};
use cts2_query::{CatalogError, CatalogQuery, Pager};
use rayon::prelude::*;

use crate::cache::ResolutionCache;
use crate::config::ResolverConfig;
use crate::digest::{membership_digest, ResolutionKey};
use crate::error::{ResolverError, ResolverResult};
use crate::evaluator::{DefinitionEvaluator, VersionSet};
use crate::history::{Recorded, ResolutionHistory};
use crate::inflight::{InFlight, Join, Slot};
use crate::persistence::ResolutionManifest;
use crate::result::{ResolvedValueSet, ResolvedValueSetResolution, ResolverStats};

/// Memoizing, coalescing value-set resolver.
///
/// Cloning is cheap; clones share the cache, the history and the in-flight
/// registry.
#[derive(Clone)]
pub struct ValueSetResolver {
    inner: Arc<Inner>,
}

struct Inner {
    query: CatalogQuery,
    config: ResolverConfig,
    cache: ResolutionCache,
    in_flight: InFlight<ResolutionKey, Arc<ResolvedValueSet>>,
    history: ResolutionHistory,
    stats: Counters,
}

#[derive(Default)]
struct Counters {
    computations: AtomicUsize,
    cache_hits: AtomicUsize,
    coalesced: AtomicUsize,
    retries: AtomicUsize,
    failures: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            computations: self.computations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl ValueSetResolver {
    /// Creates a resolver with the default configuration.
    pub fn new(query: CatalogQuery) -> Self {
        Self::with_config(query, ResolverConfig::default())
    }

    /// Creates a resolver with a custom configuration.
    pub fn with_config(query: CatalogQuery, config: ResolverConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache: ResolutionCache::new(config.cache_capacity),
                in_flight: InFlight::new(),
                history: ResolutionHistory::new(),
                stats: Counters::default(),
                query,
                config,
            }),
        }
    }

    /// Returns the query engine.
    pub fn query(&self) -> &CatalogQuery {
        &self.inner.query
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    /// Returns the resolution history.
    pub fn history(&self) -> &ResolutionHistory {
        &self.inner.history
    }

    /// Returns usage statistics.
    pub fn stats(&self) -> ResolverStats {
        self.inner.stats.snapshot()
    }

    /// Number of membership sets currently cached.
    pub fn cached(&self) -> usize {
        self.inner.cache.len()
    }

    /// Drops every cached membership set. The history is kept.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves a definition against an explicit list of version names.
    ///
    /// An empty list selects the current version of every code system the
    /// definition uses.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown definition or version name
    /// - [`ResolverError::ResolutionConflict`] for a RETIRED version, two
    ///   versions of one code system, or a recorded resolution that no
    ///   longer reproduces
    /// - [`ResolverError::Timeout`] when the configured wait elapses
    /// - [`ResolverError::Aborted`] when the store panics mid-computation
    pub fn resolve<S: AsRef<str>>(
        &self,
        value_set_name: &str,
        digest: &str,
        versions: &[S],
    ) -> ResolverResult<Arc<ResolvedValueSet>> {
        let key = self.key(value_set_name, digest, versions)?;
        self.resolve_key(key)
    }

    /// Resolves a definition against the current version set.
    pub fn resolve_current(
        &self,
        value_set_name: &str,
        digest: &str,
    ) -> ResolverResult<Arc<ResolvedValueSet>> {
        self.resolve::<&str>(value_set_name, digest, &[])
    }

    /// Reads a recorded resolution by its 1-based ordinal.
    ///
    /// Ordinal 1 of a definition that was never resolved triggers a
    /// resolution against the current version set. A record whose
    /// membership set was evicted is recomputed and checked against the
    /// recorded membership digest.
    pub fn resolution(
        &self,
        value_set_name: &str,
        digest: &str,
        ordinal: usize,
    ) -> ResolverResult<Arc<ResolvedValueSet>> {
        self.inner.query.value_set_definition(value_set_name, digest)?;

        if let Some(record) = self.inner.history.get(value_set_name, digest, ordinal) {
            let key = ResolutionKey::new(value_set_name, digest, record.versions);
            return self.resolve_key(key);
        }
        if ordinal == 1 && self.inner.history.count(value_set_name, digest) == 0 {
            return self.resolve_current(value_set_name, digest);
        }
        Err(CatalogError::not_found(
            "resolution",
            format!("{}/{}/{}", value_set_name, digest, ordinal),
        )
        .into())
    }

    /// Reads a recorded resolution with one page of its members.
    pub fn resolution_members(
        &self,
        value_set_name: &str,
        digest: &str,
        ordinal: usize,
        params: &QueryParams,
    ) -> ResolverResult<ResolvedValueSetResolution> {
        let resolved = self.resolution(value_set_name, digest, ordinal)?;
        let query = &self.inner.query;
        let matched = query
            .matcher()
            .filter(resolved.members.iter(), &params.filter, true)?;
        let members = Pager::from_params(params, query.config()).page(matched.into_iter().cloned());
        log::debug!(
            "resolution {} of {}/{}: {} members ({:?})",
            resolved.ordinal,
            value_set_name,
            digest,
            members.num_entries,
            members.complete
        );
        Ok(ResolvedValueSetResolution {
            resolved_value_set_header: resolved.header.clone(),
            resolved_value_set_uri: resolved.resolved_value_set_uri.clone(),
            members,
        })
    }

    /// Directory of recorded resolutions, in recording order.
    pub fn resolved_value_sets(
        &self,
        params: &QueryParams,
    ) -> ResolverResult<Directory<ResolvedValueSetSummary>> {
        let summaries: Vec<ResolvedValueSetSummary> = self
            .inner
            .history
            .records()
            .iter()
            .map(|r| r.summary())
            .collect();
        let query = &self.inner.query;
        let matched = query.matcher().filter(summaries.iter(), &params.filter, true)?;
        let directory =
            Pager::from_params(params, query.config()).page(matched.into_iter().cloned());
        log::debug!(
            "resolved value set directory: {} of {} recorded ({:?})",
            directory.num_entries,
            summaries.len(),
            directory.complete
        );
        Ok(directory)
    }

    /// Resolves the current definition of every ACTIVE value set in parallel.
    ///
    /// Results are returned per value set in catalog order; one failing
    /// value set does not stop the others.
    pub fn resolve_all_current(&self) -> Vec<(String, ResolverResult<Arc<ResolvedValueSet>>)> {
        let names: Vec<String> = self
            .inner
            .query
            .store()
            .value_sets()
            .filter(|v| v.entry_state.is_active())
            .map(|v| v.value_set_name.clone())
            .collect();
        log::info!("resolving {} value sets", names.len());

        names
            .into_par_iter()
            .map(|name| {
                let outcome = self
                    .inner
                    .query
                    .current_definition(&name)
                    .map_err(ResolverError::from)
                    .and_then(|definition| self.resolve_current(&name, &definition.digest));
                (name, outcome)
            })
            .collect()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Captures the resolution history.
    pub fn export_manifest(&self, snapshot_label: &str) -> ResolutionManifest {
        ResolutionManifest::new(snapshot_label, self.inner.history.records())
    }

    /// Restores recorded resolutions, returning how many were new.
    ///
    /// Each record's URI must be the content address of its key.
    pub fn import_manifest(&self, manifest: &ResolutionManifest) -> ResolverResult<usize> {
        let mut added = 0;
        for record in &manifest.resolutions {
            let key = ResolutionKey::new(
                record.value_set_name(),
                record.digest(),
                record.versions.iter().cloned(),
            );
            let document_uri = record
                .header
                .resolution_of
                .value_set_definition
                .uri
                .as_deref()
                .unwrap_or_default();
            let expected = key.resolution_uri(document_uri);
            if expected != record.resolved_value_set_uri {
                log::warn!("manifest record for {} has a foreign URI", key);
                return Err(ResolverError::DigestMismatch {
                    expected,
                    actual: record.resolved_value_set_uri.clone(),
                });
            }
            if self.inner.history.import(record.clone())? == Recorded::New {
                added += 1;
            }
        }
        log::info!(
            "imported {} of {} resolutions from snapshot {}",
            added,
            manifest.resolutions.len(),
            manifest.snapshot_label
        );
        Ok(added)
    }

    // =========================================================================
    // Coalescing
    // =========================================================================

    fn key<S: AsRef<str>>(
        &self,
        value_set_name: &str,
        digest: &str,
        versions: &[S],
    ) -> ResolverResult<ResolutionKey> {
        let store = self.inner.query.store().as_ref();
        let definition = self.inner.query.value_set_definition(value_set_name, digest)?;
        let versions = if versions.is_empty() {
            VersionSet::current(store, definition)?
        } else {
            VersionSet::explicit(store, versions)?
        };
        Ok(ResolutionKey::new(
            value_set_name,
            digest,
            versions.iter().map(|v| v.code_system_version_name.as_str()),
        ))
    }

    fn resolve_key(&self, key: ResolutionKey) -> ResolverResult<Arc<ResolvedValueSet>> {
        let inner = &self.inner;
        if let Some(hit) = inner.cache.get(&key) {
            Counters::bump(&inner.stats.cache_hits);
            return Ok(hit);
        }

        let outcome = match inner.in_flight.join(&key) {
            Join::Follower(slot) => {
                Counters::bump(&inner.stats.coalesced);
                slot.wait(inner.config.wait_timeout)
            }
            Join::Leader(slot) => match inner.config.wait_timeout {
                // Off the rayon pool a bounded wait runs the computation as a
                // pool job so the caller can stop waiting without cancelling it
                Some(timeout) if rayon::current_thread_index().is_none() => {
                    let detached = Arc::clone(inner);
                    let job_key = key.clone();
                    let job_slot = Arc::clone(&slot);
                    rayon::spawn(move || {
                        detached.lead(&job_key, &job_slot);
                    });
                    slot.wait(Some(timeout))
                }
                _ => inner.lead(&key, &slot),
            },
        };
        if outcome.is_err() {
            Counters::bump(&inner.stats.failures);
        }
        outcome
    }
}

impl Inner {
    /// Computes a key as its leader and publishes the outcome.
    fn lead(
        &self,
        key: &ResolutionKey,
        slot: &Slot<Arc<ResolvedValueSet>>,
    ) -> ResolverResult<Arc<ResolvedValueSet>> {
        // A previous leader may have finished between the cache check and join
        let outcome = match self.cache.get(key) {
            Some(hit) => {
                Counters::bump(&self.stats.cache_hits);
                Ok(hit)
            }
            None => {
                Counters::bump(&self.stats.computations);
                // A panic must still release the key and reach the followers
                let computed =
                    panic::catch_unwind(AssertUnwindSafe(|| self.compute_with_retry(key)));
                let outcome = computed.unwrap_or_else(|payload| {
                    let reason = panic_reason(payload.as_ref());
                    log::error!("resolution of {} panicked: {}", key, reason);
                    Err(ResolverError::Aborted(reason))
                });
                if let Ok(resolved) = &outcome {
                    self.cache.insert(key.clone(), Arc::clone(resolved));
                }
                outcome
            }
        };
        self.in_flight.complete(key, slot, outcome.clone());
        outcome
    }

    fn compute_with_retry(&self, key: &ResolutionKey) -> ResolverResult<Arc<ResolvedValueSet>> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.compute(key) {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    log::warn!(
                        "resolution of {} failed (attempt {}/{}): {}",
                        key,
                        attempt,
                        max_attempts,
                        e
                    );
                    Counters::bump(&self.stats.retries);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    fn compute(&self, key: &ResolutionKey) -> ResolverResult<Arc<ResolvedValueSet>> {
        let store = self.query.store().as_ref();
        let definition = self.query.value_set_definition(&key.value_set_name, &key.digest)?;
        let names: Vec<&str> = key.versions.iter().map(String::as_str).collect();
        let versions = VersionSet::explicit(store, &names)?;

        let evaluator = DefinitionEvaluator::new(store, versions, self.config.default_transitivity);
        let members = evaluator.evaluate(definition)?;

        let mut resolved = ResolvedValueSet {
            header: ResolvedValueSetHeader {
                resolution_of: ResolutionOf {
                    value_set: self.value_set_ref(definition),
                    value_set_definition: NameAndUri::with_uri(
                        key.digest.clone(),
                        definition.document_uri.clone(),
                    ),
                },
                resolved_using_code_systems: evaluator.version_refs(),
            },
            resolved_value_set_uri: key.resolution_uri(&definition.document_uri),
            membership_digest: membership_digest(members.iter().map(|m| m.about.as_str())),
            members,
            ordinal: 0,
        };
        self.history.record(key, &mut resolved)?;
        log::info!(
            "resolved {} to {} members as {}",
            key,
            resolved.len(),
            resolved.resolved_value_set_uri
        );
        Ok(Arc::new(resolved))
    }

    fn value_set_ref(&self, definition: &ValueSetDefinition) -> NameAndUri {
        let name = definition.value_set_name();
        match self.query.store().value_set(name) {
            Some(entry) => NameAndUri::with_uri(name, entry.about.clone()),
            None => definition.defined_value_set.clone(),
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason.to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic".to_string()
    }
}
