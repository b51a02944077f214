//! Request-path parser implementation using nom.
//!
//! Turns a logical CTS2 path plus query string into a typed [`Cts2Request`].
//! Both percent-encoded and raw paths are accepted, so
//! `/valueset/FDA%20Terminology` and `/valueset/FDA Terminology` parse to
//! the same request. A leading `/` is optional and a trailing `/` is ignored.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{anychar, char},
    combinator::{all_consuming, map, map_res, opt, verify},
    multi::{fold_many0, separated_list0},
    sequence::{preceded, terminated},
    IResult, Offset,
};

use crate::error::{RequestError, RequestResult};
use crate::query::QueryParams;
use crate::refs::EntityId;

/// Edge view of an entity read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GraphView {
    /// Entities below the anchor in the hierarchy.
    Children,
    /// Associations whose subject is the anchor.
    SubjectOf,
    /// Associations whose target is the anchor.
    TargetOf,
}

impl GraphView {
    fn parse(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "children" => Some(GraphView::Children),
            "subjectof" => Some(GraphView::SubjectOf),
            "targetof" => Some(GraphView::TargetOf),
            _ => None,
        }
    }
}

impl fmt::Display for GraphView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphView::Children => write!(f, "children"),
            GraphView::SubjectOf => write!(f, "subjectof"),
            GraphView::TargetOf => write!(f, "targetof"),
        }
    }
}

/// The resource a request addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Resource {
    /// `/service`
    Service,
    /// `/codesystemversions`
    CodeSystemVersions,
    /// `/codesystem/{cs}/version/{v}`
    CodeSystemVersion { code_system: String, version: String },
    /// `/codesystem/{cs}/version/{v}/entities`
    CodeSystemEntities { code_system: String, version: String },
    /// `/codesystem/{cs}/version/{v}/entity/{id}`
    Entity {
        code_system: String,
        version: String,
        entity: EntityId,
    },
    /// `/codesystem/{cs}/version/{v}/entity/{id}/{children|subjectof|targetof}`
    EntityGraph {
        code_system: String,
        version: String,
        entity: EntityId,
        view: GraphView,
    },
    /// `/entities`
    Entities,
    /// `/valuesets`
    ValueSets,
    /// `/valueset/{name}`
    ValueSet { name: String },
    /// `/valueset/{name}/definition/{digest}`
    ValueSetDefinition { name: String, digest: String },
    /// `/valueset/{name}/definition/{digest}/resolution/{n}`
    ValueSetResolution {
        name: String,
        digest: String,
        ordinal: usize,
    },
    /// `/resolvedvaluesets`
    ResolvedValueSets,
    /// `/mapversions`
    MapVersions,
    /// `/map/{name}`
    Map { name: String },
    /// `/map/{name}/versions`
    MapVersionsOf { name: String },
    /// `/map/{name}/version/{v}`
    MapVersion { map: String, version: String },
    /// `/map/{name}/version/{v}/entries`
    MapEntries { map: String, version: String },
    /// `/map/{name}/version/{v}/entry/{id}`
    MapEntry {
        map: String,
        version: String,
        entity: EntityId,
    },
}

/// Renders the canonical, percent-encoded path.
impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = encode_segment;
        match self {
            Resource::Service => write!(f, "/service"),
            Resource::CodeSystemVersions => write!(f, "/codesystemversions"),
            Resource::CodeSystemVersion {
                code_system,
                version,
            } => write!(f, "/codesystem/{}/version/{}", e(code_system), e(version)),
            Resource::CodeSystemEntities {
                code_system,
                version,
            } => write!(
                f,
                "/codesystem/{}/version/{}/entities",
                e(code_system),
                e(version)
            ),
            Resource::Entity {
                code_system,
                version,
                entity,
            } => write!(
                f,
                "/codesystem/{}/version/{}/entity/{}",
                e(code_system),
                e(version),
                e(&entity.to_string())
            ),
            Resource::EntityGraph {
                code_system,
                version,
                entity,
                view,
            } => write!(
                f,
                "/codesystem/{}/version/{}/entity/{}/{}",
                e(code_system),
                e(version),
                e(&entity.to_string()),
                view
            ),
            Resource::Entities => write!(f, "/entities"),
            Resource::ValueSets => write!(f, "/valuesets"),
            Resource::ValueSet { name } => write!(f, "/valueset/{}", e(name)),
            Resource::ValueSetDefinition { name, digest } => {
                write!(f, "/valueset/{}/definition/{}", e(name), e(digest))
            }
            Resource::ValueSetResolution {
                name,
                digest,
                ordinal,
            } => write!(
                f,
                "/valueset/{}/definition/{}/resolution/{}",
                e(name),
                e(digest),
                ordinal
            ),
            Resource::ResolvedValueSets => write!(f, "/resolvedvaluesets"),
            Resource::MapVersions => write!(f, "/mapversions"),
            Resource::Map { name } => write!(f, "/map/{}", e(name)),
            Resource::MapVersionsOf { name } => write!(f, "/map/{}/versions", e(name)),
            Resource::MapVersion { map, version } => {
                write!(f, "/map/{}/version/{}", e(map), e(version))
            }
            Resource::MapEntries { map, version } => {
                write!(f, "/map/{}/version/{}/entries", e(map), e(version))
            }
            Resource::MapEntry {
                map,
                version,
                entity,
            } => write!(
                f,
                "/map/{}/version/{}/entry/{}",
                e(map),
                e(version),
                e(&entity.to_string())
            ),
        }
    }
}

/// A parsed request: resource plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cts2Request {
    /// Addressed resource.
    pub resource: Resource,
    /// Query parameters.
    pub params: QueryParams,
}

impl Cts2Request {
    /// A request with default parameters.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: QueryParams::default(),
        }
    }

    /// Replaces the parameters.
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }
}

/// Parse a request path with optional query string.
///
/// # Examples
///
/// ```rust
/// use cts2_model::request::{parse_request, Resource};
///
/// let request = parse_request("/valueset/FDA%20Terminology?format=json").unwrap();
/// assert_eq!(
///     request.resource,
///     Resource::ValueSet { name: "FDA Terminology".to_string() }
/// );
/// ```
pub fn parse_request(input: &str) -> RequestResult<Cts2Request> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RequestError::EmptyPath);
    }

    let (path, query) = match input.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (input, None),
    };

    let raw_segments = match all_consuming(path_segments)(path) {
        Ok((_, segments)) => segments,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(RequestError::ParseError {
                position: input.offset(e.input),
                message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
            })
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(RequestError::ParseError {
                position: path.len(),
                message: "incomplete path".to_string(),
            })
        }
    };
    if raw_segments.is_empty() {
        return Err(RequestError::EmptyPath);
    }

    let segments = raw_segments
        .iter()
        .map(|raw| decode_at(input, raw, false))
        .collect::<RequestResult<Vec<_>>>()?;

    let params = match query {
        Some(query) => QueryParams::from_pairs(query_pairs(input, query)?)?,
        None => QueryParams::default(),
    };

    Ok(Cts2Request {
        resource: route(&segments, path)?,
        params,
    })
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

// ============================================================================
// Path tokenizing
// ============================================================================

fn path_segments(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        opt(char('/')),
        terminated(separated_list0(char('/'), raw_segment), opt(char('/'))),
    )(input)
}

fn raw_segment(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c != '/')(input)
}

// ============================================================================
// Percent-decoding
// ============================================================================

enum Piece {
    Byte(u8),
    Char(char),
}

fn escaped_byte(input: &str) -> IResult<&str, Piece> {
    map(
        preceded(
            char('%'),
            map_res(
                take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
                |hex: &str| u8::from_str_radix(hex, 16),
            ),
        ),
        Piece::Byte,
    )(input)
}

fn plain_char(input: &str) -> IResult<&str, Piece> {
    map(verify(anychar, |c: &char| *c != '%'), Piece::Char)(input)
}

/// Decodes escapes and raw characters; in query text a raw `+` is a space.
fn encoded_text(plus_as_space: bool) -> impl FnMut(&str) -> IResult<&str, Vec<u8>> {
    move |input: &str| {
        fold_many0(
            alt((escaped_byte, plain_char)),
            Vec::new,
            move |mut bytes, piece| {
                match piece {
                    Piece::Byte(b) => bytes.push(b),
                    Piece::Char('+') if plus_as_space => bytes.push(b' '),
                    Piece::Char(c) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                }
                bytes
            },
        )(input)
    }
}

/// Decodes `raw`, a slice of `input`, reporting errors at their offset in `input`.
fn decode_at(input: &str, raw: &str, plus_as_space: bool) -> RequestResult<String> {
    let base = input.offset(raw);
    let bytes = match all_consuming(encoded_text(plus_as_space))(raw) {
        Ok((_, bytes)) => bytes,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(RequestError::ParseError {
                position: base + raw.offset(e.input),
                message: format!("invalid percent-escape at: '{}'", truncate(e.input, 20)),
            })
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(RequestError::ParseError {
                position: base + raw.len(),
                message: "incomplete percent-escape".to_string(),
            })
        }
    };
    String::from_utf8(bytes).map_err(|_| RequestError::ParseError {
        position: base,
        message: "percent-escapes do not form valid UTF-8".to_string(),
    })
}

fn query_pairs(input: &str, query: &str) -> RequestResult<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((
                decode_at(input, name, true)?,
                decode_at(input, value, true)?,
            ))
        })
        .collect()
}

fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '%' => encoded.push_str("%25"),
            '/' => encoded.push_str("%2F"),
            '?' => encoded.push_str("%3F"),
            '#' => encoded.push_str("%23"),
            '&' => encoded.push_str("%26"),
            _ => encoded.push(c),
        }
    }
    encoded
}

// ============================================================================
// Routing
// ============================================================================

fn route(segments: &[String], path: &str) -> RequestResult<Resource> {
    fn owned(s: &str) -> String {
        s.to_string()
    }

    let segs: Vec<&str> = segments.iter().map(String::as_str).collect();

    let resource = match segs.as_slice() {
        ["service"] => Resource::Service,
        ["codesystemversions"] => Resource::CodeSystemVersions,
        ["codesystem", cs, "version", v] => Resource::CodeSystemVersion {
            code_system: owned(cs),
            version: owned(v),
        },
        ["codesystem", cs, "version", v, "entities"] => Resource::CodeSystemEntities {
            code_system: owned(cs),
            version: owned(v),
        },
        ["codesystem", cs, "version", v, "entity", id] => Resource::Entity {
            code_system: owned(cs),
            version: owned(v),
            entity: EntityId::parse(id),
        },
        ["codesystem", cs, "version", v, "entity", id, view] => Resource::EntityGraph {
            code_system: owned(cs),
            version: owned(v),
            entity: EntityId::parse(id),
            view: GraphView::parse(view)
                .ok_or_else(|| RequestError::UnknownResource(path.to_string()))?,
        },
        ["entities"] => Resource::Entities,
        ["valuesets"] => Resource::ValueSets,
        ["valueset", name] => Resource::ValueSet { name: owned(name) },
        ["valueset", name, "definition", digest] => Resource::ValueSetDefinition {
            name: owned(name),
            digest: owned(digest),
        },
        ["valueset", name, "definition", digest, "resolution", n] => {
            Resource::ValueSetResolution {
                name: owned(name),
                digest: owned(digest),
                ordinal: parse_ordinal(n)?,
            }
        }
        ["resolvedvaluesets"] => Resource::ResolvedValueSets,
        ["mapversions"] => Resource::MapVersions,
        ["map", name] => Resource::Map { name: owned(name) },
        ["map", name, "versions"] => Resource::MapVersionsOf { name: owned(name) },
        ["map", map, "version", v] => Resource::MapVersion {
            map: owned(map),
            version: owned(v),
        },
        ["map", map, "version", v, "entries"] => Resource::MapEntries {
            map: owned(map),
            version: owned(v),
        },
        ["map", map, "version", v, "entry", id] => Resource::MapEntry {
            map: owned(map),
            version: owned(v),
            entity: EntityId::parse(id),
        },
        _ => return Err(RequestError::UnknownResource(path.to_string())),
    };
    Ok(resource)
}

fn parse_ordinal(text: &str) -> RequestResult<usize> {
    text.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| RequestError::invalid_parameter("resolution", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterComponent, MatchAlgorithm, MatchFilter, MaxToReturn};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    // Routing tests

    #[test]
    fn test_parse_service() {
        let request = parse_request("/service?format=json").unwrap();
        assert_eq!(request.resource, Resource::Service);
        assert_eq!(request.params.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_parse_without_leading_slash() {
        let request =
            parse_request("codesystem/NCI_Thesaurus/version/19.05d/entities?maxtoreturn=50")
                .unwrap();
        assert_eq!(
            request.resource,
            Resource::CodeSystemEntities {
                code_system: "NCI_Thesaurus".to_string(),
                version: "19.05d".to_string(),
            }
        );
        assert_eq!(request.params.max_to_return, MaxToReturn::new(50));
    }

    #[test]
    fn test_parse_entity_graph() {
        let request =
            parse_request("/codesystem/NCI_Thesaurus/version/19.05d/entity/ncit:C1648/children")
                .unwrap();
        assert_eq!(
            request.resource,
            Resource::EntityGraph {
                code_system: "NCI_Thesaurus".to_string(),
                version: "19.05d".to_string(),
                entity: EntityId::scoped("ncit", "C1648"),
                view: GraphView::Children,
            }
        );
    }

    #[rstest]
    #[case("/valueset/FDA Terminology")]
    #[case("/valueset/FDA%20Terminology")]
    #[case("valueset/FDA%20Terminology/")]
    fn test_parse_value_set_encodings(#[case] path: &str) {
        assert_eq!(
            parse_request(path).unwrap().resource,
            Resource::ValueSet {
                name: "FDA Terminology".to_string()
            }
        );
    }

    #[test]
    fn test_parse_resolution() {
        let request = parse_request(
            "/valueset/CDISC Questionnaire NPI Test Name Terminology/definition/e31ccb56/resolution/1",
        )
        .unwrap();
        assert_eq!(
            request.resource,
            Resource::ValueSetResolution {
                name: "CDISC Questionnaire NPI Test Name Terminology".to_string(),
                digest: "e31ccb56".to_string(),
                ordinal: 1,
            }
        );
    }

    #[test]
    fn test_parse_map_entry_bare_name() {
        let request = parse_request(
            "/map/NCIt_to_ChEBI_Mapping/version/NCIt_to_ChEBI_Mapping-1.0/entry/C1028",
        )
        .unwrap();
        assert_eq!(
            request.resource,
            Resource::MapEntry {
                map: "NCIt_to_ChEBI_Mapping".to_string(),
                version: "NCIt_to_ChEBI_Mapping-1.0".to_string(),
                entity: EntityId::bare("C1028"),
            }
        );
    }

    #[test]
    fn test_parse_query_filter() {
        let request = parse_request(
            "/valuesets?matchvalue=GAIA+Terminology&filtercomponent=resourceName&matchalgorithm=exactMatch",
        )
        .unwrap();
        assert_eq!(
            request.params.filter,
            MatchFilter::new("GAIA Terminology")
                .on(FilterComponent::ResourceName)
                .using(MatchAlgorithm::ExactMatch)
        );
    }

    #[rstest]
    #[case("/entities?matchvalue=C%2B%2B", "C++")]
    #[case("/entities?matchvalue=C++", "C  ")]
    #[case("/entities?matchvalue=a%2Bb+c", "a+b c")]
    fn test_parse_query_plus(#[case] path: &str, #[case] expected: &str) {
        let request = parse_request(path).unwrap();
        assert_eq!(request.params.filter.value.as_deref(), Some(expected));
    }

    #[test]
    fn test_parse_keeps_plus_in_path() {
        let request = parse_request("/valueset/A+B").unwrap();
        assert_eq!(
            request.resource,
            Resource::ValueSet {
                name: "A+B".to_string()
            }
        );
    }

    // Error tests

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_request("   "), Err(RequestError::EmptyPath));
        assert_eq!(parse_request("/"), Err(RequestError::EmptyPath));
    }

    #[test]
    fn test_parse_unknown_resource() {
        assert_eq!(
            parse_request("/valueset/a/b"),
            Err(RequestError::UnknownResource("/valueset/a/b".to_string()))
        );
        assert!(matches!(
            parse_request("/codesystem/X/version/1/entity/ns:a/parents"),
            Err(RequestError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_parse_bad_escape_position() {
        let err = parse_request("/valueset/A%zz").unwrap_err();
        assert_eq!(
            err,
            RequestError::ParseError {
                position: 11,
                message: "invalid percent-escape at: '%zz'".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_double_slash() {
        assert!(matches!(
            parse_request("/valueset//x"),
            Err(RequestError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_bad_ordinal() {
        assert_eq!(
            parse_request("/valueset/X/definition/abc/resolution/0"),
            Err(RequestError::invalid_parameter("resolution", "0"))
        );
    }

    #[test]
    fn test_parse_bad_parameter_value() {
        assert_eq!(
            parse_request("/entities?maxtoreturn=0"),
            Err(RequestError::invalid_parameter("maxtoreturn", "0"))
        );
    }

    // Display tests

    #[test]
    fn test_resource_display_reparses() {
        let resource = Resource::MapEntry {
            map: "GO to NCIt".to_string(),
            version: "1.0".to_string(),
            entity: EntityId::scoped("GO", "GO:0000001"),
        };
        let path = resource.to_string();
        assert_eq!(path, "/map/GO%20to%20NCIt/version/1.0/entry/GO:GO:0000001");
        assert_eq!(parse_request(&path).unwrap().resource, resource);
    }
}
