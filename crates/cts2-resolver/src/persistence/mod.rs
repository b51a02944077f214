//! Save/load the resolution history to/from disk.
//!
//! Recorded resolutions are immutable, so they must survive restarts: a
//! manifest captures every record (ordinal, version set, URI and membership
//! digest) as pretty-printed JSON. Membership sets themselves are not
//! stored; they are recomputed on demand and checked against the recorded
//! digest.
//!
//! # Example
//!
//! ```ignore
//! use cts2_resolver::persistence::ResolutionManifest;
//!
//! // Save the history
//! resolver.export_manifest("ncit-19.05d").save("resolutions.json")?;
//!
//! // Restore it into a fresh resolver
//! let manifest = ResolutionManifest::load("resolutions.json")?;
//! let restored = fresh_resolver.import_manifest(&manifest)?;
//! ```

mod manifest;

pub use manifest::ResolutionManifest;
