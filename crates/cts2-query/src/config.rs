//! Configuration types for the query engine.

use std::path::Path;

use cts2_model::MaxToReturn;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Which way a hierarchy predicate points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// `(child, p, parent)`, e.g. `subClassOf`.
    ChildToParent,
    /// `(parent, p, child)`, e.g. `hasSubtype`.
    ParentToChild,
}

/// A predicate that links entities into a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyPredicate {
    /// Predicate local name, compared case-insensitively.
    pub name: String,
    /// Edge orientation.
    pub orientation: Orientation,
}

impl HierarchyPredicate {
    /// A child-to-parent predicate.
    pub fn child_to_parent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::ChildToParent,
        }
    }

    /// A parent-to-child predicate.
    pub fn parent_to_child(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::ParentToChild,
        }
    }
}

fn default_hierarchy_predicates() -> Vec<HierarchyPredicate> {
    vec![
        HierarchyPredicate::child_to_parent("subClassOf"),
        HierarchyPredicate::child_to_parent("isA"),
        HierarchyPredicate::child_to_parent("is_a"),
        HierarchyPredicate::parent_to_child("hasSubtype"),
    ]
}

/// Configuration for the query engine.
///
/// # Example
///
/// ```rust
/// use cts2_model::MaxToReturn;
/// use cts2_query::{HierarchyPredicate, QueryConfig};
///
/// let config = QueryConfig::builder()
///     .with_default_max_to_return(MaxToReturn::new(100).unwrap())
///     .with_include_inactive(false)
///     .with_hierarchy_predicate(HierarchyPredicate::child_to_parent("partOf"))
///     .build();
/// assert_eq!(config.default_max_to_return.get(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the caller omits `maxtoreturn`.
    pub default_max_to_return: MaxToReturn,
    /// Whether INACTIVE records are listed.
    pub include_inactive: bool,
    /// Predicates that define `children`.
    pub hierarchy_predicates: Vec<HierarchyPredicate>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_max_to_return: MaxToReturn::default(),
            include_inactive: false,
            hierarchy_predicates: default_hierarchy_predicates(),
        }
    }
}

impl QueryConfig {
    /// Creates a new builder for QueryConfig.
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::default()
    }

    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// Reads a JSON document from disk.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Returns the orientation of a predicate if it is a hierarchy predicate.
    pub fn hierarchy_orientation(&self, predicate_name: &str) -> Option<Orientation> {
        self.hierarchy_predicates
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(predicate_name))
            .map(|p| p.orientation)
    }
}

/// Builder for QueryConfig.
#[derive(Debug, Clone, Default)]
pub struct QueryConfigBuilder {
    default_max_to_return: Option<MaxToReturn>,
    include_inactive: bool,
    hierarchy_predicates: Option<Vec<HierarchyPredicate>>,
}

impl QueryConfigBuilder {
    /// Sets the default page size.
    pub fn with_default_max_to_return(mut self, max_to_return: MaxToReturn) -> Self {
        self.default_max_to_return = Some(max_to_return);
        self
    }

    /// Lists INACTIVE records too.
    pub fn with_include_inactive(mut self, include_inactive: bool) -> Self {
        self.include_inactive = include_inactive;
        self
    }

    /// Adds a hierarchy predicate to the defaults (or to those already set).
    pub fn with_hierarchy_predicate(mut self, predicate: HierarchyPredicate) -> Self {
        self.hierarchy_predicates
            .get_or_insert_with(default_hierarchy_predicates)
            .push(predicate);
        self
    }

    /// Replaces the hierarchy predicates.
    pub fn with_hierarchy_predicates(mut self, predicates: Vec<HierarchyPredicate>) -> Self {
        self.hierarchy_predicates = Some(predicates);
        self
    }

    /// Builds the QueryConfig.
    pub fn build(self) -> QueryConfig {
        QueryConfig {
            default_max_to_return: self.default_max_to_return.unwrap_or_default(),
            include_inactive: self.include_inactive,
            hierarchy_predicates: self
                .hierarchy_predicates
                .unwrap_or_else(default_hierarchy_predicates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_query_config_default() {
        let config = QueryConfig::default();
        assert_eq!(config.default_max_to_return.get(), 50);
        assert!(!config.include_inactive);
        assert_eq!(
            config.hierarchy_orientation("subClassOf"),
            Some(Orientation::ChildToParent)
        );
        assert_eq!(
            config.hierarchy_orientation("HASSUBTYPE"),
            Some(Orientation::ParentToChild)
        );
        assert_eq!(config.hierarchy_orientation("Concept_In_Subset"), None);
    }

    #[test]
    fn test_query_config_builder() {
        let config = QueryConfig::builder()
            .with_default_max_to_return(MaxToReturn::new(10).unwrap())
            .with_include_inactive(true)
            .with_hierarchy_predicates(vec![HierarchyPredicate::parent_to_child("narrower")])
            .build();

        assert_eq!(config.default_max_to_return.get(), 10);
        assert!(config.include_inactive);
        assert_eq!(config.hierarchy_predicates.len(), 1);
        assert_eq!(config.hierarchy_orientation("subClassOf"), None);
    }

    #[test]
    fn test_query_config_from_json() {
        let config = QueryConfig::from_json_str(r#"{ "default_max_to_return": 25 }"#).unwrap();
        assert_eq!(config.default_max_to_return.get(), 25);
        assert_eq!(config.hierarchy_predicates.len(), 4);
    }

    #[test]
    fn test_query_config_rejects_zero_page_size() {
        let err = QueryConfig::from_json_str(r#"{ "default_max_to_return": 0 }"#).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_query_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "include_inactive": true,
                "hierarchy_predicates": [{{ "name": "broader", "orientation": "CHILD_TO_PARENT" }}]
            }}"#
        )
        .unwrap();

        let config = QueryConfig::load(file.path()).unwrap();
        assert!(config.include_inactive);
        assert_eq!(
            config.hierarchy_orientation("broader"),
            Some(Orientation::ChildToParent)
        );
    }

    #[test]
    fn test_query_config_load_missing_file() {
        let err = QueryConfig::load("/nonexistent/cts2/query.json").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
