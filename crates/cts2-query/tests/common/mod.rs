//! Reference catalog shared by the integration tests.
//!
//! A small snapshot shaped like the terminology server the query contract
//! was observed against: several NCI releases and other code systems, an
//! anatomy fragment of NCI Thesaurus with a known set of children, a few
//! value sets and one map.

#![allow(dead_code)]

use std::sync::Arc;

use cts2_model::{
    AssociatedEntities, Association, AssociationDirection, CodeSystemVersion, DefinitionEntry,
    DefinitionSource, Entity, EntityRef, EntryState, MapCatalogEntry, MapEntry, MapVersion,
    ResourceState, ValueSetCatalogEntry, ValueSetDefinition,
};
use cts2_query::{CatalogQuery, InMemoryCatalog};

pub const THESAURUS: &str = "NCI_Thesaurus";
pub const THESAURUS_VERSION: &str = "19.05d";
pub const THESAURUS_VERSION_NAME: &str = "NCI_Thesaurus-19.05d";
pub const HEART: &str = "C12727";

pub fn thesaurus() -> CodeSystemVersion {
    CodeSystemVersion::new(
        THESAURUS,
        THESAURUS_VERSION,
        "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#19.05d",
    )
    .with_synopsis("NCI Thesaurus")
    .with_formal_name("NCI Thesaurus")
}

pub fn versions() -> Vec<CodeSystemVersion> {
    vec![
        thesaurus(),
        CodeSystemVersion::new(
            THESAURUS,
            "18.10e",
            "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#18.10e",
        )
        .with_synopsis("NCI Thesaurus, previous release")
        .with_state(ResourceState::Retired),
        CodeSystemVersion::new("NCI_Metathesaurus", "201911", "urn:oid:2.16.840.1.113883.3.26.1.2")
            .with_synopsis("NCI Metathesaurus"),
        CodeSystemVersion::new("ChEBI", "v174", "http://purl.obolibrary.org/obo/chebi/174")
            .with_synopsis("Chemical Entities of Biological Interest"),
        CodeSystemVersion::new("MedDRA", "20.1", "urn:oid:2.16.840.1.113883.6.163")
            .with_synopsis("Medical Dictionary for Regulatory Activities"),
        CodeSystemVersion::new("GO", "2019", "http://purl.obolibrary.org/obo/go/2019")
            .with_synopsis("Gene Ontology"),
    ]
}

pub fn ncit(code: &str, label: &str) -> Entity {
    Entity::new(
        "ncit",
        code,
        format!("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#{}", code),
        thesaurus().to_ref(),
    )
    .with_designation(label, true)
}

pub fn predicate(name: &str) -> EntityRef {
    EntityRef::new(
        "ncit",
        name,
        format!("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#{}", name),
    )
}

pub fn edge(subject: &Entity, name: &str, target: &Entity) -> Association {
    Association::new(subject.to_ref(), predicate(name), target.to_ref(), thesaurus().to_ref())
}

/// The four ACTIVE children of Heart, in insertion order.
pub fn heart_children() -> Vec<Entity> {
    vec![
        ncit("C12728", "Heart Valve")
            .with_synopsis("A structure that allows blood flow in one direction"),
        ncit("C12729", "Cardiac Atrium"),
        ncit("C12730", "Cardiac Ventricle"),
        ncit("C13005", "Myocardium"),
    ]
}

pub fn heart() -> Entity {
    ncit(HEART, "Heart")
        .with_designation("Cardiac organ", false)
        .with_synopsis("A hollow muscular organ that pumps blood")
}

pub fn heart_structures_definition() -> ValueSetDefinition {
    ValueSetDefinition::new(
        "Heart Structures",
        "http://evs.nci.nih.gov/valueset/HeartStructures",
        vec![DefinitionEntry::union(DefinitionSource::AssociatedEntities(
            AssociatedEntities::new(AssociationDirection::TargetToSource, heart().to_ref())
                .with_predicate(predicate("subClassOf")),
        ))],
    )
}

pub fn reference_catalog() -> InMemoryCatalog {
    let heart = heart();
    let children = heart_children();
    let part = ncit("C22498", "Cardiovascular System Part");
    let obsolete = ncit("C99999", "Obsolete Heart Part").with_entry_state(EntryState::Inactive);
    let murmur = ncit("C50000", "Heart Murmur");

    let mut builder = InMemoryCatalog::builder().label("reference");
    for version in versions() {
        builder = builder.code_system_version(version);
    }
    builder = builder
        .entity(heart.clone())
        .entity(part.clone())
        .entity(obsolete.clone())
        .entity(murmur.clone())
        .association(edge(&heart, "subClassOf", &part));
    for child in &children {
        builder = builder
            .entity(child.clone())
            .association(edge(child, "subClassOf", &heart));
    }

    let meddra = CodeSystemVersion::new("MedDRA", "20.1", "urn:oid:2.16.840.1.113883.6.163");
    let map_version = MapVersion::new(
        "NCIt_to_MedDRA",
        "NCIt_to_MedDRA-1.0",
        thesaurus().to_ref(),
        meddra.to_ref(),
    )
    .with_synopsis("NCI Thesaurus to MedDRA cross references");

    builder
        .association(edge(&obsolete, "subClassOf", &heart).with_entry_state(EntryState::Inactive))
        .association(edge(&murmur, "Finding_Has_Anatomic_Site", &heart))
        .value_set(
            ValueSetCatalogEntry::new(
                "Heart Structures",
                "http://evs.nci.nih.gov/valueset/HeartStructures",
            )
            .with_synopsis("Parts of the heart"),
            heart_structures_definition(),
        )
        .value_set(
            ValueSetCatalogEntry::new(
                "Desktop Software",
                "http://example.org/valueset/DesktopSoftware",
            )
            .with_synopsis("Office products from Microsoft and other vendors"),
            ValueSetDefinition::new(
                "Desktop Software",
                "http://example.org/valueset/DesktopSoftware",
                vec![DefinitionEntry::union(DefinitionSource::SpecificEntities(vec![
                    murmur.to_ref(),
                ]))],
            ),
        )
        .value_set(
            ValueSetCatalogEntry::new(
                "Microsoft Office Formats",
                "http://example.org/valueset/OfficeFormats",
            )
            .with_synopsis("Document formats"),
            ValueSetDefinition::new(
                "Microsoft Office Formats",
                "http://example.org/valueset/OfficeFormats",
                vec![DefinitionEntry::union(DefinitionSource::CompleteCodeSystem {
                    code_system: "GO".to_string(),
                    version: None,
                })],
            ),
        )
        .map(
            MapCatalogEntry::new("NCIt_to_MedDRA", "NCI_Thesaurus", "MedDRA")
                .with_synopsis("NCI Thesaurus to MedDRA"),
        )
        .map_version(map_version.clone())
        .map_entry(MapEntry::new(
            map_version.to_ref(),
            heart.to_ref(),
            vec![EntityRef::new("MDR", "10019250", "urn:oid:2.16.840.1.113883.6.163#10019250")],
        ))
        .build()
}

pub fn reference_query() -> CatalogQuery {
    CatalogQuery::new(Arc::new(reference_catalog()))
}
