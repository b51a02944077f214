//! Query parameter types shared by every directory endpoint.
//!
//! Parameter names and the values of enumerated parameters are matched
//! case-insensitively, so `matchAlgorithm=EXACTMATCH` and
//! `matchalgorithm=exactMatch` are the same request.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::{RequestError, RequestResult};

/// Parameter names recognised by [`QueryParams::from_pairs`].
pub mod param {
    /// Text to match.
    pub const MATCH_VALUE: &str = "matchvalue";
    /// Attribute to compare.
    pub const FILTER_COMPONENT: &str = "filtercomponent";
    /// Comparison algorithm.
    pub const MATCH_ALGORITHM: &str = "matchalgorithm";
    /// Page size.
    pub const MAX_TO_RETURN: &str = "maxtoreturn";
    /// Zero-based page index.
    pub const PAGE: &str = "page";
    /// Map-entry side restriction.
    pub const ENTITIES_MAP_ROLE: &str = "entitiesmaprole";
    /// Response encoding, owned by the transport.
    pub const FORMAT: &str = "format";
}

/// Default page size when the caller omits `maxtoreturn`.
pub const DEFAULT_MAX_TO_RETURN: usize = 50;

/// Which attribute of a record a match filter compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum FilterComponent {
    /// Names and designations.
    #[default]
    ResourceName,
    /// Synopsis or description text.
    ResourceSynopsis,
    /// Canonical URI.
    About,
}

impl FromStr for FilterComponent {
    type Err = RequestError;

    fn from_str(s: &str) -> RequestResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "resourcename" => Ok(FilterComponent::ResourceName),
            "resourcesynopsis" => Ok(FilterComponent::ResourceSynopsis),
            "about" => Ok(FilterComponent::About),
            _ => Err(RequestError::invalid_parameter(param::FILTER_COMPONENT, s)),
        }
    }
}

impl fmt::Display for FilterComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterComponent::ResourceName => write!(f, "resourceName"),
            FilterComponent::ResourceSynopsis => write!(f, "resourceSynopsis"),
            FilterComponent::About => write!(f, "about"),
        }
    }
}

/// How the match value is compared with candidate strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MatchAlgorithm {
    /// Case-sensitive equality with any candidate.
    ExactMatch,
    /// Case-insensitive substring of any candidate.
    #[default]
    Contains,
    /// Case-insensitive prefix of any candidate.
    StartsWith,
    /// Tokenized free-text search, ordered by relevance.
    LuceneQuery,
}

impl MatchAlgorithm {
    /// Returns true if results are ordered by relevance rather than catalog order.
    pub fn is_ranked(self) -> bool {
        self == MatchAlgorithm::LuceneQuery
    }
}

impl FromStr for MatchAlgorithm {
    type Err = RequestError;

    fn from_str(s: &str) -> RequestResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exactmatch" => Ok(MatchAlgorithm::ExactMatch),
            "contains" => Ok(MatchAlgorithm::Contains),
            "startswith" => Ok(MatchAlgorithm::StartsWith),
            "lucenequery" => Ok(MatchAlgorithm::LuceneQuery),
            _ => Err(RequestError::invalid_parameter(param::MATCH_ALGORITHM, s)),
        }
    }
}

impl fmt::Display for MatchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchAlgorithm::ExactMatch => write!(f, "exactMatch"),
            MatchAlgorithm::Contains => write!(f, "contains"),
            MatchAlgorithm::StartsWith => write!(f, "startsWith"),
            MatchAlgorithm::LuceneQuery => write!(f, "luceneQuery"),
        }
    }
}

/// Restricts map-entry matching to one side of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MapRole {
    /// Match against `mapFrom` entities.
    MapFromRole,
    /// Match against `mapTo` entities.
    MapToRole,
    /// Match against either side.
    #[default]
    BothMapRoles,
}

impl FromStr for MapRole {
    type Err = RequestError;

    fn from_str(s: &str) -> RequestResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MAP_FROM_ROLE" => Ok(MapRole::MapFromRole),
            "MAP_TO_ROLE" => Ok(MapRole::MapToRole),
            "BOTH_MAP_ROLES" => Ok(MapRole::BothMapRoles),
            _ => Err(RequestError::invalid_parameter(param::ENTITIES_MAP_ROLE, s)),
        }
    }
}

/// A strictly positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxToReturn(NonZeroUsize);

impl MaxToReturn {
    /// Returns `None` for zero.
    pub fn new(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(MaxToReturn)
    }

    /// The page size.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for MaxToReturn {
    fn default() -> Self {
        MaxToReturn(NonZeroUsize::MIN.saturating_add(DEFAULT_MAX_TO_RETURN - 1))
    }
}

impl FromStr for MaxToReturn {
    type Err = RequestError;

    fn from_str(s: &str) -> RequestResult<Self> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .and_then(MaxToReturn::new)
            .ok_or_else(|| RequestError::invalid_parameter(param::MAX_TO_RETURN, s))
    }
}

/// A `(filtercomponent, matchvalue, matchalgorithm)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchFilter {
    /// Attribute to compare.
    pub component: FilterComponent,
    /// Text to match; `None` passes every active record.
    pub value: Option<String>,
    /// Comparison algorithm.
    pub algorithm: MatchAlgorithm,
}

impl MatchFilter {
    /// A filter that passes every active record.
    pub fn all() -> Self {
        Self::default()
    }

    /// A `contains` filter on `resourceName`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Sets the compared attribute.
    pub fn on(mut self, component: FilterComponent) -> Self {
        self.component = component;
        self
    }

    /// Sets the algorithm.
    pub fn using(mut self, algorithm: MatchAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns true if the filter has no match value.
    pub fn is_noop(&self) -> bool {
        self.value.is_none()
    }
}

/// All parameters of a directory query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryParams {
    /// Match filter.
    pub filter: MatchFilter,
    /// Page size; the engine default applies when absent.
    pub max_to_return: Option<MaxToReturn>,
    /// Zero-based page index.
    pub page: usize,
    /// Map-entry side restriction.
    pub map_role: MapRole,
    /// Requested response encoding, passed through untouched.
    pub format: Option<String>,
}

impl QueryParams {
    /// Parameters for an unfiltered first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from raw `(name, value)` pairs.
    ///
    /// Unknown names are ignored. An empty `matchvalue` is treated as absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> RequestResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = QueryParams::default();
        for (name, value) in pairs {
            let value = value.as_ref();
            match name.as_ref().to_ascii_lowercase().as_str() {
                param::MATCH_VALUE => {
                    params.filter.value = (!value.is_empty()).then(|| value.to_string());
                }
                param::FILTER_COMPONENT => params.filter.component = value.parse()?,
                param::MATCH_ALGORITHM => params.filter.algorithm = value.parse()?,
                param::MAX_TO_RETURN => params.max_to_return = Some(value.parse()?),
                param::PAGE => {
                    params.page = value
                        .trim()
                        .parse()
                        .map_err(|_| RequestError::invalid_parameter(param::PAGE, value))?;
                }
                param::ENTITIES_MAP_ROLE => params.map_role = value.parse()?,
                param::FORMAT => params.format = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(params)
    }

    /// Sets the match filter.
    pub fn with_filter(mut self, filter: MatchFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the page size.
    pub fn with_max_to_return(mut self, max_to_return: MaxToReturn) -> Self {
        self.max_to_return = Some(max_to_return);
        self
    }

    /// Sets the page index.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the map role.
    pub fn with_map_role(mut self, map_role: MapRole) -> Self {
        self.map_role = map_role;
        self
    }
}
