//! Content addressing of resolutions.
//!
//! A resolution is identified by the definition it evaluates and the exact
//! set of code system versions it was evaluated against. Both the resolved
//! value set URI and the membership digest are SHA-256 based, so the same
//! inputs always produce the same identifiers.

use std::collections::BTreeSet;
use std::fmt;

use cts2_model::digest::sha256_hex;
use serde::{Deserialize, Serialize};

/// Number of hex characters of the key hash used in resolution URIs.
pub const RESOLUTION_ID_LEN: usize = 16;

/// Identity of one resolution: `(value set, definition digest, version set)`.
///
/// Versions are held in a sorted set so that the order callers list them
/// in never changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolutionKey {
    /// Value set name.
    pub value_set_name: String,
    /// Definition digest.
    pub digest: String,
    /// Code system version names the definition is evaluated against.
    pub versions: BTreeSet<String>,
}

impl ResolutionKey {
    /// Creates a key; duplicate version names collapse.
    pub fn new<I, S>(
        value_set_name: impl Into<String>,
        digest: impl Into<String>,
        versions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value_set_name: value_set_name.into(),
            digest: digest.into(),
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Short content hash of the key.
    pub fn fingerprint(&self) -> String {
        let parts = [self.value_set_name.as_str(), self.digest.as_str()]
            .into_iter()
            .chain(self.versions.iter().map(String::as_str));
        let mut hash = sha256_hex(parts);
        hash.truncate(RESOLUTION_ID_LEN);
        hash
    }

    /// The resolved value set URI under a definition's document URI.
    pub fn resolution_uri(&self, document_uri: &str) -> String {
        format!(
            "{}/resolution/{}",
            document_uri.trim_end_matches('/'),
            self.fingerprint()
        )
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value_set_name, self.digest)?;
        if !self.versions.is_empty() {
            let versions: Vec<&str> = self.versions.iter().map(String::as_str).collect();
            write!(f, "[{}]", versions.join(","))?;
        }
        Ok(())
    }
}

/// Digest of a membership set: SHA-256 over the sorted member URIs.
pub fn membership_digest<'a, I>(member_uris: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let sorted: BTreeSet<&str> = member_uris.into_iter().collect();
    sha256_hex(sorted)
}
