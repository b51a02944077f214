//! Manifest file for a resolution history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{ResolverError, ResolverResult};
use crate::result::ResolutionRecord;

/// Manifest file for a resolution history.
///
/// The manifest names the catalog snapshot the resolutions were computed
/// against and lists every record in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionManifest {
    /// Label of the catalog snapshot.
    pub snapshot_label: String,
    /// Timestamp when the manifest was exported.
    pub exported_at: DateTime<Utc>,
    /// Version of the exporting library.
    pub exporter_version: String,
    /// Recorded resolutions.
    pub resolutions: Vec<ResolutionRecord>,
}

impl ResolutionManifest {
    /// Creates a manifest stamped with the current time.
    pub fn new(snapshot_label: &str, resolutions: Vec<ResolutionRecord>) -> Self {
        Self {
            snapshot_label: snapshot_label.to_string(),
            exported_at: Utc::now(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
            resolutions,
        }
    }

    /// Returns the number of recorded resolutions.
    pub fn count(&self) -> usize {
        self.resolutions.len()
    }

    /// Returns the total number of members across all resolutions.
    pub fn total_members(&self) -> usize {
        self.resolutions.iter().map(|r| r.member_count).sum()
    }

    /// Finds a record by resolved value set URI.
    pub fn get_record(&self, uri: &str) -> Option<&ResolutionRecord> {
        self.resolutions.iter().find(|r| r.resolved_value_set_uri == uri)
    }

    /// Saves the manifest to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ResolverResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ResolverError::io_error(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ResolverError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Loads a manifest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ResolverResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ResolverError::io_error(path, e))?;
        let reader = BufReader::new(file);
        let manifest: Self = serde_json::from_reader(reader)
            .map_err(|e| ResolverError::Deserialization(e.to_string()))?;
        Ok(manifest)
    }
}

impl std::fmt::Display for ResolutionManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resolution Manifest")?;
        writeln!(f, "  Snapshot:        {}", self.snapshot_label)?;
        writeln!(f, "  Exported:        {}", self.exported_at)?;
        writeln!(f, "  Exporter:        {}", self.exporter_version)?;
        writeln!(f, "  Resolutions:     {}", self.count())?;
        writeln!(f, "  Total members:   {}", self.total_members())?;
        Ok(())
    }
}
