//! Deployment description used by contract tests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, ResolverResult};

/// Code system name of NCI Thesaurus.
pub const THESAURUS: &str = "NCI_Thesaurus";
/// Code system name of NCI Metathesaurus.
pub const METATHESAURUS: &str = "NCI Metathesaurus";
/// Code system name of ChEBI.
pub const CHEBI: &str = "ChEBI";
/// Code system name of MedDRA.
pub const MEDDRA: &str = "MedDRA";

/// Where the service under test lives and which reference releases it
/// serves.
///
/// Passed explicitly into each test; nothing here is process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestEnvironment {
    /// Scheme and authority, e.g. `https://lexevscts2.nci.nih.gov`.
    pub base_url: String,
    /// Path prefix of every endpoint.
    pub base_path: String,
    /// Expected `BaseService.serviceVersion`.
    pub service_version: String,
    /// NCI Thesaurus release, e.g. `19.05d`.
    pub thesaurus_version_number: String,
    /// NCI Metathesaurus release.
    pub metathesaurus_version_number: String,
    /// ChEBI release.
    pub chebi_version_number: String,
    /// MedDRA release.
    pub meddra_version_number: String,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            base_path: "/lexevscts2".to_string(),
            service_version: "1.3.6.FINAL".to_string(),
            thesaurus_version_number: "19.05d".to_string(),
            metathesaurus_version_number: "201911".to_string(),
            chebi_version_number: "v174".to_string(),
            meddra_version_number: "20.1".to_string(),
        }
    }
}

impl TestEnvironment {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ResolverResult<Self> {
        serde_json::from_str(json).map_err(|e| ResolverError::Deserialization(e.to_string()))
    }

    /// Reads a JSON document from disk.
    pub fn load(path: impl AsRef<Path>) -> ResolverResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ResolverError::io_error(path, e))?;
        Self::from_json_str(&json)
    }

    /// `{codeSystem}-{version}`.
    pub fn version_name(code_system: &str, version: &str) -> String {
        format!("{}-{}", code_system, version)
    }

    /// Version name of the reference NCI Thesaurus release.
    pub fn thesaurus_version(&self) -> String {
        Self::version_name(THESAURUS, &self.thesaurus_version_number)
    }

    /// Version name of the reference NCI Metathesaurus release.
    pub fn metathesaurus_version(&self) -> String {
        Self::version_name(METATHESAURUS, &self.metathesaurus_version_number)
    }

    /// Version name of the reference ChEBI release.
    pub fn chebi_version(&self) -> String {
        Self::version_name(CHEBI, &self.chebi_version_number)
    }

    /// Version name of the reference MedDRA release.
    pub fn meddra_version(&self) -> String {
        Self::version_name(MEDDRA, &self.meddra_version_number)
    }

    /// Joins the base path and a logical path.
    pub fn path(&self, logical: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        if logical.starts_with('/') {
            format!("{}{}", base, logical)
        } else {
            format!("{}/{}", base, logical)
        }
    }

    /// Absolute URL of a logical path.
    pub fn url(&self, logical: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path(logical))
    }

    /// Strips the base URL and base path, leaving the logical path.
    ///
    /// Input that does not carry the prefix is returned unchanged.
    pub fn logical_path<'a>(&self, request: &'a str) -> &'a str {
        let request = request
            .strip_prefix(self.base_url.trim_end_matches('/'))
            .unwrap_or(request);
        let base = self.base_path.trim_end_matches('/');
        match request.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
            _ => request,
        }
    }
}
