//! Fixture catalog and store wrappers shared by the resolver tests.
//!
//! The catalog carries two FINAL releases of NCI Thesaurus (19.04e with two
//! children of Heart, 19.05d with four), one RETIRED release, three value
//! sets and one map. [`ScriptedStore`] wraps it to inject latency, transient
//! failures and content drift into the association index reads.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cts2_model::{
    AssociatedEntities, Association, AssociationDirection, CodeSystemVersion, DefinitionEntry,
    DefinitionSource, Entity, EntityRef, EntryState, MapCatalogEntry, MapEntry, MapVersion,
    ResourceState, ScopedEntityName, ValueSetCatalogEntry, ValueSetDefinition,
};
use cts2_query::{CatalogError, CatalogQuery, CatalogResult, CatalogStore, InMemoryCatalog};
use cts2_resolver::{ResolverConfig, ValueSetResolver};

pub const THESAURUS: &str = "NCI_Thesaurus";
pub const CURRENT: &str = "NCI_Thesaurus-19.05d";
pub const PREVIOUS: &str = "NCI_Thesaurus-19.04e";
pub const RETIRED: &str = "NCI_Thesaurus-18.10e";
pub const HEART: &str = "C12727";
pub const HEART_STRUCTURES: &str = "Heart Structures";
pub const DESKTOP_SOFTWARE: &str = "Desktop Software";
pub const OFFICE_FORMATS: &str = "Microsoft Office Formats";

fn release(version: &str) -> CodeSystemVersion {
    CodeSystemVersion::new(
        THESAURUS,
        version,
        format!("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#{}", version),
    )
    .with_synopsis("NCI Thesaurus")
}

pub fn current() -> CodeSystemVersion {
    release("19.05d")
}

pub fn previous() -> CodeSystemVersion {
    release("19.04e")
}

pub fn ncit(version: &CodeSystemVersion, code: &str, label: &str) -> Entity {
    Entity::new(
        "ncit",
        code,
        format!("http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#{}", code),
        version.to_ref(),
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

pub fn edge(
    version: &CodeSystemVersion,
    subject: &Entity,
    name: &str,
    target: &Entity,
) -> Association {
    Association::new(subject.to_ref(), predicate(name), target.to_ref(), version.to_ref())
}

/// Children of Heart in 19.05d, in insertion order.
pub fn heart_children() -> Vec<(&'static str, &'static str)> {
    vec![
        ("C12728", "Heart Valve"),
        ("C12729", "Cardiac Atrium"),
        ("C12730", "Cardiac Ventricle"),
        ("C13005", "Myocardium"),
    ]
}

pub fn heart_child_uris() -> Vec<String> {
    let mut uris: Vec<String> = heart_children()
        .into_iter()
        .map(|(code, label)| ncit(&current(), code, label).about)
        .collect();
    uris.sort();
    uris
}

pub fn heart_structures_definition() -> ValueSetDefinition {
    let heart = ncit(&current(), HEART, "Heart");
    ValueSetDefinition::new(
        HEART_STRUCTURES,
        "http://evs.nci.nih.gov/valueset/HeartStructures",
        vec![DefinitionEntry::union(DefinitionSource::AssociatedEntities(
            AssociatedEntities::new(AssociationDirection::TargetToSource, heart.to_ref())
                .with_predicate(predicate("subClassOf")),
        ))],
    )
}

pub fn reference_catalog() -> InMemoryCatalog {
    let (previous, current) = (previous(), current());
    let mut builder = InMemoryCatalog::builder()
        .label("resolver-fixture")
        .code_system_version(previous.clone())
        .code_system_version(current.clone())
        .code_system_version(release("18.10e").with_state(ResourceState::Retired))
        .code_system_version(CodeSystemVersion::new(
            "MedDRA",
            "20.1",
            "urn:oid:2.16.840.1.113883.6.163",
        ))
        .code_system_version(CodeSystemVersion::new(
            "GO",
            "2019",
            "http://purl.obolibrary.org/obo/go/2019",
        ));

    // 19.04e: Heart with two children
    let old_heart = ncit(&previous, HEART, "Heart");
    builder = builder.entity(old_heart.clone());
    for (code, label) in heart_children().into_iter().take(2) {
        let child = ncit(&previous, code, label);
        builder = builder
            .entity(child.clone())
            .association(edge(&previous, &child, "subClassOf", &old_heart));
    }

    // 19.05d: Heart with four children, one inactive record and a finding
    let heart = ncit(&current, HEART, "Heart");
    let obsolete =
        ncit(&current, "C99999", "Obsolete Heart Part").with_entry_state(EntryState::Inactive);
    let murmur = ncit(&current, "C50000", "Heart Murmur");
    builder = builder
        .entity(heart.clone())
        .entity(obsolete.clone())
        .entity(murmur.clone())
        .association(edge(&current, &obsolete, "subClassOf", &heart))
        .association(edge(&current, &murmur, "Finding_Has_Anatomic_Site", &heart));
    for (code, label) in heart_children() {
        let child = ncit(&current, code, label);
        builder = builder
            .entity(child.clone())
            .association(edge(&current, &child, "subClassOf", &heart));
    }

    let meddra = CodeSystemVersion::new("MedDRA", "20.1", "urn:oid:2.16.840.1.113883.6.163");
    let map_version = MapVersion::new(
        "NCIt_to_MedDRA",
        "NCIt_to_MedDRA-1.0",
        current.to_ref(),
        meddra.to_ref(),
    );

    builder
        .value_set(
            ValueSetCatalogEntry::new(
                HEART_STRUCTURES,
                "http://evs.nci.nih.gov/valueset/HeartStructures",
            )
            .with_synopsis("Parts of the heart"),
            heart_structures_definition(),
        )
        .value_set(
            ValueSetCatalogEntry::new(
                DESKTOP_SOFTWARE,
                "http://example.org/valueset/DesktopSoftware",
            )
            .with_synopsis("Office products"),
            ValueSetDefinition::new(
                DESKTOP_SOFTWARE,
                "http://example.org/valueset/DesktopSoftware",
                vec![DefinitionEntry::union(DefinitionSource::SpecificEntities(vec![
                    murmur.to_ref(),
                ]))],
            ),
        )
        .value_set(
            ValueSetCatalogEntry::new(OFFICE_FORMATS, "http://example.org/valueset/OfficeFormats")
                .with_synopsis("Document formats"),
            ValueSetDefinition::new(
                OFFICE_FORMATS,
                "http://example.org/valueset/OfficeFormats",
                vec![DefinitionEntry::union(DefinitionSource::CompleteCodeSystem {
                    code_system: "GO".to_string(),
                    version: None,
                })],
            ),
        )
        .map(MapCatalogEntry::new("NCIt_to_MedDRA", THESAURUS, "MedDRA"))
        .map_version(map_version.clone())
        .map_entry(MapEntry::new(
            map_version.to_ref(),
            heart.to_ref(),
            vec![EntityRef::new("MDR", "10019250", "urn:oid:2.16.840.1.113883.6.163#10019250")],
        ))
        .build()
}

pub fn reference_resolver() -> ValueSetResolver {
    ValueSetResolver::new(CatalogQuery::new(Arc::new(reference_catalog())))
}

pub fn resolver_over(store: Arc<ScriptedStore>, config: ResolverConfig) -> ValueSetResolver {
    ValueSetResolver::with_config(CatalogQuery::new(store), config)
}

/// Digest of the current definition of a value set.
pub fn digest_of(resolver: &ValueSetResolver, value_set: &str) -> String {
    resolver.query().current_definition(value_set).unwrap().digest.clone()
}

// =============================================================================
// Scripted store
// =============================================================================

/// Delegating store with scripted behaviour on the association index.
#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryCatalog,
    delay: Duration,
    failures_left: AtomicUsize,
    panics_left: AtomicUsize,
    reads: AtomicUsize,
    hide_first_child: AtomicBool,
}

impl ScriptedStore {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Every association read sleeps for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The next `count` association reads fail with a store error.
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// The next `count` association reads panic.
    pub fn panicking(self, count: usize) -> Self {
        self.panics_left.store(count, Ordering::SeqCst);
        self
    }

    /// Drops the Heart Valve edges from every later read.
    pub fn hide_first_child(&self) {
        self.hide_first_child.store(true, Ordering::SeqCst);
    }

    /// Number of association reads served or failed so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn script(&self) -> CatalogResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let panicked = self
            .panics_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if panicked {
            panic!("association index corrupted");
        }
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(CatalogError::StoreError("connection reset".to_string()));
        }
        Ok(())
    }

    fn visible<'a>(&self, edges: Vec<&'a Association>) -> Vec<&'a Association> {
        if !self.hide_first_child.load(Ordering::SeqCst) {
            return edges;
        }
        edges
            .into_iter()
            .filter(|a| a.subject.name != "C12728")
            .collect()
    }
}

impl CatalogStore for ScriptedStore {
    fn code_system_versions(&self) -> Box<dyn Iterator<Item = &CodeSystemVersion> + '_> {
        self.inner.code_system_versions()
    }

    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        self.inner.entities()
    }

    fn associations_with_subject(
        &self,
        version_name: &str,
        subject: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>> {
        self.script()?;
        Ok(self.visible(self.inner.associations_with_subject(version_name, subject)?))
    }

    fn associations_with_target(
        &self,
        version_name: &str,
        target: &ScopedEntityName,
    ) -> CatalogResult<Vec<&Association>> {
        self.script()?;
        Ok(self.visible(self.inner.associations_with_target(version_name, target)?))
    }

    fn value_sets(&self) -> Box<dyn Iterator<Item = &ValueSetCatalogEntry> + '_> {
        self.inner.value_sets()
    }

    fn value_set_definitions(&self) -> Box<dyn Iterator<Item = &ValueSetDefinition> + '_> {
        self.inner.value_set_definitions()
    }

    fn maps(&self) -> Box<dyn Iterator<Item = &MapCatalogEntry> + '_> {
        self.inner.maps()
    }

    fn map_versions(&self) -> Box<dyn Iterator<Item = &MapVersion> + '_> {
        self.inner.map_versions()
    }

    fn map_entries(&self, map_version_name: &str) -> Box<dyn Iterator<Item = &MapEntry> + '_> {
        self.inner.map_entries(map_version_name)
    }
}
