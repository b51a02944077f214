//! Reference types shared by every catalog.
//!
//! CTS2 resources point at each other through lightweight references
//! rather than embedding the referenced record. An [`EntityRef`] carries a
//! namespace-qualified name plus the canonical URI; version references carry
//! both the version name and the code system (or map) it is a version of.

use std::fmt;

/// A namespace-qualified entity name, e.g. `ncit:C1648`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopedEntityName {
    /// Entity namespace (stable per code system).
    pub namespace: String,
    /// Local name (code) within the namespace.
    pub name: String,
}

impl ScopedEntityName {
    /// Creates a scoped name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ScopedEntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Reference to an entity: scoped name plus canonical URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    /// Entity namespace.
    pub namespace: String,
    /// Local name (code).
    pub name: String,
    /// Canonical `about` URI.
    pub uri: String,
}

impl EntityRef {
    /// Creates an entity reference.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Returns the namespace-qualified name of the referenced entity.
    pub fn scoped_name(&self) -> ScopedEntityName {
        ScopedEntityName::new(self.namespace.clone(), self.name.clone())
    }

    /// Returns true if this reference names the given scoped entity.
    pub fn names(&self, name: &ScopedEntityName) -> bool {
        self.namespace == name.namespace && self.name == name.name
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// An entity identifier as written in a request path.
///
/// Paths use `ns:name` for entity reads, while map-entry reads commonly use
/// the bare local name (`/entry/C1028`), so the namespace is optional here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId {
    /// Namespace, when given.
    pub namespace: Option<String>,
    /// Local name.
    pub name: String,
}

impl EntityId {
    /// Creates an identifier with a namespace.
    pub fn scoped(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Creates an identifier without a namespace.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Parses `ns:name` or `name`.
    ///
    /// Only the first `:` separates the namespace, so local names may
    /// themselves contain colons.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Self::scoped(ns, name),
            _ => Self::bare(text),
        }
    }

    /// Returns true if this identifier denotes the given scoped name.
    pub fn matches(&self, name: &ScopedEntityName) -> bool {
        self.name == name.name
            && self
                .namespace
                .as_deref()
                .map_or(true, |ns| ns == name.namespace)
    }

    /// Returns true if this identifier denotes the given reference.
    pub fn matches_ref(&self, entity: &EntityRef) -> bool {
        self.name == entity.name
            && self
                .namespace
                .as_deref()
                .map_or(true, |ns| ns == entity.namespace)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&ScopedEntityName> for EntityId {
    fn from(name: &ScopedEntityName) -> Self {
        Self::scoped(name.namespace.clone(), name.name.clone())
    }
}

/// A name with an optional URI (CTS2 "name and meaning" reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameAndUri {
    /// The referenced name.
    pub content: String,
    /// URI of the referenced resource, when known.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub uri: Option<String>,
}

impl NameAndUri {
    /// Creates a reference with no URI.
    pub fn named(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            uri: None,
        }
    }

    /// Creates a reference with a URI.
    pub fn with_uri(content: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            uri: Some(uri.into()),
        }
    }
}

/// Reference to a code system version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CodeSystemVersionRef {
    /// Code system the version belongs to.
    pub code_system: NameAndUri,
    /// Version name, e.g. `NCI_Thesaurus-19.05d`.
    pub version: NameAndUri,
}

impl CodeSystemVersionRef {
    /// Creates a version reference.
    pub fn new(code_system: NameAndUri, version_name: impl Into<String>) -> Self {
        Self {
            code_system,
            version: NameAndUri::named(version_name),
        }
    }

    /// Returns the code-system-version name.
    pub fn version_name(&self) -> &str {
        &self.version.content
    }

    /// Returns the code system name.
    pub fn code_system_name(&self) -> &str {
        &self.code_system.content
    }
}

/// Reference to a map version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MapVersionRef {
    /// The map this version belongs to.
    pub map: NameAndUri,
    /// Map version name, e.g. `NCIt_to_ChEBI_Mapping-1.0`.
    pub map_version: NameAndUri,
}

impl MapVersionRef {
    /// Creates a map version reference.
    pub fn new(map: NameAndUri, map_version_name: impl Into<String>) -> Self {
        Self {
            map,
            map_version: NameAndUri::named(map_version_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_parse_scoped() {
        let id = EntityId::parse("ncit:C1648");
        assert_eq!(id.namespace.as_deref(), Some("ncit"));
        assert_eq!(id.name, "C1648");
        assert_eq!(id.to_string(), "ncit:C1648");
    }

    #[test]
    fn test_entity_id_parse_bare() {
        let id = EntityId::parse("C1028");
        assert!(id.namespace.is_none());
        assert_eq!(id.name, "C1028");
    }

    #[test]
    fn test_entity_id_parse_degenerate_colons() {
        assert_eq!(EntityId::parse(":C1"), EntityId::bare(":C1"));
        assert_eq!(EntityId::parse("ncit:"), EntityId::bare("ncit:"));
        assert_eq!(EntityId::parse("a:b:c"), EntityId::scoped("a", "b:c"));
    }

    #[test]
    fn test_entity_id_matching() {
        let name = ScopedEntityName::new("ncit", "C1028");
        assert!(EntityId::parse("ncit:C1028").matches(&name));
        assert!(EntityId::parse("C1028").matches(&name));
        assert!(!EntityId::parse("chebi:C1028").matches(&name));

        let entity = EntityRef::new("ncit", "C1028", "http://example.org#C1028");
        assert!(EntityId::bare("C1028").matches_ref(&entity));
        assert!(entity.names(&name));
    }

    #[test]
    fn test_version_ref_accessors() {
        let version = CodeSystemVersionRef::new(
            NameAndUri::with_uri(
                "NCI_Thesaurus",
                "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#",
            ),
            "NCI_Thesaurus-19.05d",
        );
        assert_eq!(version.version_name(), "NCI_Thesaurus-19.05d");
        assert_eq!(version.code_system_name(), "NCI_Thesaurus");
    }
}
