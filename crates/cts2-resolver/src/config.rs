//! Configuration types for the resolver and the service facade.

use std::path::Path;
use std::time::Duration;

use cts2_model::{ServiceDescriptor, StructuralProfile, SupportedProfile, Transitivity};
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, ResolverResult};

/// Default number of resolved value sets kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Default number of attempts for a retryable resolution failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Configuration for the value-set resolver.
///
/// # Example
///
/// ```rust
/// use cts2_resolver::ResolverConfig;
/// use std::time::Duration;
///
/// let config = ResolverConfig::builder()
///     .with_cache_capacity(256)
///     .with_wait_timeout(Duration::from_secs(5))
///     .with_max_attempts(3)
///     .build();
/// assert_eq!(config.cache_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of resolved membership sets kept in memory.
    pub cache_capacity: usize,
    /// How long a caller waits for a resolution (None = wait until done).
    #[serde(rename = "wait_timeout_ms", with = "duration_ms")]
    pub wait_timeout: Option<Duration>,
    /// Attempts made for a retryable failure before it is reported.
    pub max_attempts: u32,
    /// Hop policy for associated-entities entries that do not set one.
    pub default_transitivity: Transitivity,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            wait_timeout: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_transitivity: Transitivity::TransitiveClosure,
        }
    }
}

impl ResolverConfig {
    /// Creates a new builder for ResolverConfig.
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

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
}

/// Builder for ResolverConfig.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Sets the number of cached membership sets (at least one is kept).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity.max(1);
        self
    }

    /// Sets how long callers wait for an in-flight resolution.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = Some(timeout);
        self
    }

    /// Sets the attempt bound for retryable failures (at least one).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    /// Sets the hop policy used when an entry does not carry one.
    pub fn with_default_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.config.default_transitivity = transitivity;
        self
    }

    /// Builds the ResolverConfig.
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

/// Identity and capabilities reported by `GET /service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Reported service name.
    pub service_name: String,
    /// Reported service version.
    pub service_version: String,
    /// Structural profiles with their functional profiles.
    pub supported_profiles: Vec<SupportedProfile>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "CTS2 Development Framework RESTWebApp".to_string(),
            service_version: "1.3.6.FINAL".to_string(),
            supported_profiles: StructuralProfile::ALL
                .iter()
                .copied()
                .map(SupportedProfile::read_only)
                .collect(),
        }
    }
}

impl ServiceConfig {
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

    /// The capability descriptor served at `/service`.
    pub fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor {
            service_name: self.service_name.clone(),
            service_version: self.service_version.clone(),
            supported_profiles: self.supported_profiles.clone(),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
