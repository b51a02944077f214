//! Resolution history.
//!
//! Every distinct resolution of a definition is recorded once, under a
//! 1-based ordinal per `(value set, digest)` assigned in order of first
//! computation. Records are immutable: recomputing a resolution must
//! reproduce the recorded membership digest.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::digest::ResolutionKey;
use crate::error::{ResolverError, ResolverResult};
use crate::result::{ResolutionRecord, ResolvedValueSet};

type DefinitionId = (String, String);

#[derive(Default)]
struct Records {
    /// Recording order.
    records: Vec<ResolutionRecord>,
    by_key: HashMap<ResolutionKey, usize>,
    by_ordinal: HashMap<DefinitionId, BTreeMap<usize, usize>>,
}

impl Records {
    fn push(&mut self, key: ResolutionKey, record: ResolutionRecord) {
        let index = self.records.len();
        self.by_ordinal
            .entry((key.value_set_name.clone(), key.digest.clone()))
            .or_default()
            .insert(record.ordinal, index);
        self.by_key.insert(key, index);
        self.records.push(record);
    }

    fn next_ordinal(&self, key: &ResolutionKey) -> usize {
        self.by_ordinal
            .get(&(key.value_set_name.clone(), key.digest.clone()))
            .and_then(|ordinals| ordinals.keys().next_back())
            .map_or(1, |last| last + 1)
    }
}

/// Whether [`ResolutionHistory::record`] added a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// First computation of this key.
    New,
    /// The key was recorded before and the membership matched.
    Verified,
}

/// Append-only record of resolutions.
#[derive(Default)]
pub struct ResolutionHistory {
    inner: RwLock<Records>,
}

impl ResolutionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a computed resolution and stamps its ordinal.
    ///
    /// A key seen before keeps its ordinal; the recomputed membership digest
    /// must equal the recorded one, otherwise the catalog changed under the
    /// resolution and a [`ResolverError::ResolutionConflict`] is returned.
    pub fn record(
        &self,
        key: &ResolutionKey,
        resolved: &mut ResolvedValueSet,
    ) -> ResolverResult<Recorded> {
        let mut inner = self.inner.write();
        if let Some(&index) = inner.by_key.get(key) {
            let existing = &inner.records[index];
            resolved.ordinal = existing.ordinal;
            if existing.membership_digest != resolved.membership_digest {
                log::warn!(
                    "{} resolution {} no longer reproduces: recorded {}, computed {}",
                    key,
                    existing.ordinal,
                    existing.membership_digest,
                    resolved.membership_digest
                );
                return Err(ResolverError::ResolutionConflict(format!(
                    "resolution {} of {}/{} changed: recorded membership {}, computed {}",
                    existing.ordinal,
                    key.value_set_name,
                    key.digest,
                    existing.membership_digest,
                    resolved.membership_digest
                )));
            }
            return Ok(Recorded::Verified);
        }

        resolved.ordinal = inner.next_ordinal(key);
        let record = ResolutionRecord::new(resolved, key.versions.iter().cloned().collect());
        log::info!(
            "recorded resolution {} of {}/{} with {} members",
            record.ordinal,
            key.value_set_name,
            key.digest,
            record.member_count
        );
        inner.push(key.clone(), record);
        Ok(Recorded::New)
    }

    /// Adds a record produced elsewhere, such as a loaded manifest.
    ///
    /// Re-importing an identical record is a no-op. A record whose key or
    /// ordinal is already taken by a different resolution is a conflict.
    pub fn import(&self, record: ResolutionRecord) -> ResolverResult<Recorded> {
        let key = ResolutionKey::new(
            record.value_set_name(),
            record.digest(),
            record.versions.iter().cloned(),
        );
        let mut inner = self.inner.write();

        if let Some(&index) = inner.by_key.get(&key) {
            let existing = &inner.records[index];
            if existing.ordinal == record.ordinal
                && existing.membership_digest == record.membership_digest
                && existing.resolved_value_set_uri == record.resolved_value_set_uri
            {
                return Ok(Recorded::Verified);
            }
            return Err(ResolverError::ResolutionConflict(format!(
                "{} is already recorded as resolution {}",
                key, existing.ordinal
            )));
        }
        let taken = inner
            .by_ordinal
            .get(&(key.value_set_name.clone(), key.digest.clone()))
            .is_some_and(|ordinals| ordinals.contains_key(&record.ordinal));
        if taken {
            return Err(ResolverError::ResolutionConflict(format!(
                "resolution {} of {}/{} is already recorded",
                record.ordinal, key.value_set_name, key.digest
            )));
        }

        inner.push(key, record);
        Ok(Recorded::New)
    }

    /// Looks up a resolution by definition and ordinal.
    pub fn get(
        &self,
        value_set_name: &str,
        digest: &str,
        ordinal: usize,
    ) -> Option<ResolutionRecord> {
        let inner = self.inner.read();
        let index = *inner
            .by_ordinal
            .get(&(value_set_name.to_string(), digest.to_string()))?
            .get(&ordinal)?;
        inner.records.get(index).cloned()
    }

    /// Looks up a resolution by key.
    pub fn get_key(&self, key: &ResolutionKey) -> Option<ResolutionRecord> {
        let inner = self.inner.read();
        let index = *inner.by_key.get(key)?;
        inner.records.get(index).cloned()
    }

    /// Number of resolutions recorded for a definition.
    pub fn count(&self, value_set_name: &str, digest: &str) -> usize {
        self.inner
            .read()
            .by_ordinal
            .get(&(value_set_name.to_string(), digest.to_string()))
            .map_or(0, BTreeMap::len)
    }

    /// All records in recording order.
    pub fn records(&self) -> Vec<ResolutionRecord> {
        self.inner.read().records.clone()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::membership_digest;
    use cts2_model::{NameAndUri, ResolutionOf, ResolvedValueSetHeader};
    use pretty_assertions::assert_eq;

    fn key(versions: &[&str]) -> ResolutionKey {
        ResolutionKey::new("Heart", "e32e022f", versions.iter().copied())
    }

    fn resolved(key: &ResolutionKey, members: &[&str]) -> ResolvedValueSet {
        ResolvedValueSet {
            header: ResolvedValueSetHeader {
                resolution_of: ResolutionOf {
                    value_set: NameAndUri::named(key.value_set_name.clone()),
                    value_set_definition: NameAndUri::with_uri(
                        key.digest.clone(),
                        "http://evs/Heart",
                    ),
                },
                resolved_using_code_systems: Vec::new(),
            },
            resolved_value_set_uri: key.resolution_uri("http://evs/Heart"),
            members: Vec::new(),
            membership_digest: membership_digest(members.iter().copied()),
            ordinal: 0,
        }
    }

    #[test]
    fn test_ordinals_follow_first_computation() {
        let history = ResolutionHistory::new();
        let first = key(&["NCI_Thesaurus-19.05d"]);
        let second = key(&["NCI_Thesaurus-18.10e"]);

        let mut a = resolved(&first, &["x"]);
        assert_eq!(history.record(&first, &mut a).unwrap(), Recorded::New);
        let mut b = resolved(&second, &["y"]);
        assert_eq!(history.record(&second, &mut b).unwrap(), Recorded::New);

        assert_eq!((a.ordinal, b.ordinal), (1, 2));
        assert_eq!(history.count("Heart", "e32e022f"), 2);
        assert_eq!(
            history.get("Heart", "e32e022f", 2).unwrap().resolved_value_set_uri,
            b.resolved_value_set_uri
        );
        assert!(history.get("Heart", "e32e022f", 3).is_none());
    }

    #[test]
    fn test_recomputation_is_verified() {
        let history = ResolutionHistory::new();
        let k = key(&["NCI_Thesaurus-19.05d"]);
        history.record(&k, &mut resolved(&k, &["x", "y"])).unwrap();

        let mut again = resolved(&k, &["y", "x"]);
        assert_eq!(history.record(&k, &mut again).unwrap(), Recorded::Verified);
        assert_eq!(again.ordinal, 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_changed_membership_is_a_conflict() {
        let history = ResolutionHistory::new();
        let k = key(&["NCI_Thesaurus-19.05d"]);
        history.record(&k, &mut resolved(&k, &["x"])).unwrap();

        let err = history.record(&k, &mut resolved(&k, &["x", "z"])).unwrap_err();
        assert!(matches!(err, ResolverError::ResolutionConflict(_)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_import_round_trip() {
        let source = ResolutionHistory::new();
        let k = key(&["NCI_Thesaurus-19.05d"]);
        source.record(&k, &mut resolved(&k, &["x"])).unwrap();

        let target = ResolutionHistory::new();
        for record in source.records() {
            assert_eq!(target.import(record.clone()).unwrap(), Recorded::New);
            assert_eq!(target.import(record).unwrap(), Recorded::Verified);
        }
        assert_eq!(target.records(), source.records());
        assert!(target.get_key(&k).is_some());

        // Ordinal 1 is taken by a different version set
        let mut other = source.records()[0].clone();
        other.versions = vec!["NCI_Thesaurus-18.10e".to_string()];
        assert!(target.import(other).is_err());
    }
}
