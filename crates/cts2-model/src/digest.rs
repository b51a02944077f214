//! Content hashing of value-set definitions.
//!
//! A definition is identified by `(value set name, digest)` where the digest
//! is a short hex prefix of a SHA-256 over the canonical rendering of the
//! definition body. Digests supplied by the import pipeline are kept as-is;
//! these helpers fill them in when absent.

use sha2::{Digest, Sha256};

use crate::catalog::ValueSetDefinition;

/// Number of hex characters kept in a definition digest.
pub const DEFINITION_DIGEST_LEN: usize = 8;

/// Hashes newline-separated parts and returns the full lowercase hex digest.
pub fn sha256_hex<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Renders the definition body one line per entry, prefixed by the value-set name.
pub fn canonical_definition(definition: &ValueSetDefinition) -> Vec<String> {
    let mut lines = Vec::with_capacity(definition.entries.len() + 1);
    lines.push(definition.value_set_name().to_string());
    lines.extend(definition.entries.iter().map(|e| e.to_string()));
    lines
}

/// Computes the digest of a definition body.
pub fn definition_digest(definition: &ValueSetDefinition) -> String {
    let mut digest = sha256_hex(canonical_definition(definition));
    digest.truncate(DEFINITION_DIGEST_LEN);
    digest
}
