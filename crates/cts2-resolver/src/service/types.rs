//! Typed responses of the service facade.

use cts2_model::{
    Association, CodeSystemVersion, Directory, Entity, EntitySummary, MapCatalogEntry, MapEntry,
    MapVersion, ResolvedValueSetSummary, ServiceDescriptor, ValueSetCatalogEntry,
    ValueSetDefinition,
};
use serde::Serialize;

use crate::result::ResolvedValueSetResolution;

/// One response message per endpoint.
///
/// Serialised externally tagged, so a directory of code system versions
/// encodes as `{"CodeSystemVersionCatalogEntryDirectory": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub enum Cts2Response {
    BaseService(ServiceDescriptor),
    CodeSystemVersionCatalogEntryDirectory(Directory<CodeSystemVersion>),
    CodeSystemVersionCatalogEntryMsg(CodeSystemVersion),
    EntityDirectory(Directory<EntitySummary>),
    EntityDescriptionMsg(Entity),
    AssociationDirectory(Directory<Association>),
    ValueSetCatalogEntryDirectory(Directory<ValueSetCatalogEntry>),
    ValueSetCatalogEntryMsg(ValueSetCatalogEntry),
    ValueSetDefinitionMsg(ValueSetDefinition),
    IteratableResolvedValueSet(ResolvedValueSetResolution),
    ResolvedValueSetDirectory(Directory<ResolvedValueSetSummary>),
    MapVersionDirectory(Directory<MapVersion>),
    MapCatalogEntryMsg(MapCatalogEntry),
    MapVersionMsg(MapVersion),
    MapEntryDirectory(Directory<MapEntry>),
    MapEntryMsg(MapEntry),
}

impl Cts2Response {
    /// The message name used as the outer JSON key.
    pub fn message_name(&self) -> &'static str {
        match self {
            Cts2Response::BaseService(_) => "BaseService",
            Cts2Response::CodeSystemVersionCatalogEntryDirectory(_) => {
                "CodeSystemVersionCatalogEntryDirectory"
            }
            Cts2Response::CodeSystemVersionCatalogEntryMsg(_) => "CodeSystemVersionCatalogEntryMsg",
            Cts2Response::EntityDirectory(_) => "EntityDirectory",
            Cts2Response::EntityDescriptionMsg(_) => "EntityDescriptionMsg",
            Cts2Response::AssociationDirectory(_) => "AssociationDirectory",
            Cts2Response::ValueSetCatalogEntryDirectory(_) => "ValueSetCatalogEntryDirectory",
            Cts2Response::ValueSetCatalogEntryMsg(_) => "ValueSetCatalogEntryMsg",
            Cts2Response::ValueSetDefinitionMsg(_) => "ValueSetDefinitionMsg",
            Cts2Response::IteratableResolvedValueSet(_) => "IteratableResolvedValueSet",
            Cts2Response::ResolvedValueSetDirectory(_) => "ResolvedValueSetDirectory",
            Cts2Response::MapVersionDirectory(_) => "MapVersionDirectory",
            Cts2Response::MapCatalogEntryMsg(_) => "MapCatalogEntryMsg",
            Cts2Response::MapVersionMsg(_) => "MapVersionMsg",
            Cts2Response::MapEntryDirectory(_) => "MapEntryDirectory",
            Cts2Response::MapEntryMsg(_) => "MapEntryMsg",
        }
    }

    /// Entry count of a directory response; `None` for single messages.
    pub fn num_entries(&self) -> Option<usize> {
        match self {
            Cts2Response::CodeSystemVersionCatalogEntryDirectory(d) => Some(d.num_entries),
            Cts2Response::EntityDirectory(d) => Some(d.num_entries),
            Cts2Response::AssociationDirectory(d) => Some(d.num_entries),
            Cts2Response::ValueSetCatalogEntryDirectory(d) => Some(d.num_entries),
            Cts2Response::IteratableResolvedValueSet(r) => Some(r.members.num_entries),
            Cts2Response::ResolvedValueSetDirectory(d) => Some(d.num_entries),
            Cts2Response::MapVersionDirectory(d) => Some(d.num_entries),
            Cts2Response::MapEntryDirectory(d) => Some(d.num_entries),
            _ => None,
        }
    }

    /// Serialises the response to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
