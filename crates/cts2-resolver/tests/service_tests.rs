//! Endpoint tests for the service facade, driven through request paths.

mod common;

use std::sync::Arc;

use common::*;
use cts2_model::{CompleteDirectory, FunctionalProfile, RequestError, StructuralProfile};
use cts2_query::{CatalogError, QueryConfig};
use cts2_resolver::{
    Cts2Response, Cts2Service, ResolverConfig, ResolverError, ServiceConfig, TestEnvironment,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn service() -> Cts2Service {
    Cts2Service::new(Arc::new(reference_catalog()))
}

fn environment() -> TestEnvironment {
    TestEnvironment::from_json_str(
        r#"{"base_url": "https://lexevscts2.example.org", "thesaurus_version_number": "19.05d"}"#,
    )
    .unwrap()
}

fn heart_digest(service: &Cts2Service) -> String {
    service.query().current_definition(HEART_STRUCTURES).unwrap().digest.clone()
}

#[test]
fn test_service_descriptor() {
    let env = environment();
    let service = service();

    let response = service
        .handle_path(env.logical_path(&env.url("/service")))
        .unwrap();
    let Cts2Response::BaseService(descriptor) = response else {
        panic!("expected BaseService");
    };
    assert_eq!(descriptor.service_version, env.service_version);
    assert_eq!(descriptor.supported_profiles.len(), StructuralProfile::ALL.len());
    assert!(descriptor
        .functional_profiles(StructuralProfile::SP_VALUE_SET_DEFINITION)
        .contains(&FunctionalProfile::FP_RESOLUTION));
}

#[test]
fn test_custom_service_config() {
    let config = ServiceConfig::from_json_str(r#"{"service_version": "2.0.0"}"#).unwrap();
    let service = Cts2Service::with_configs(
        Arc::new(reference_catalog()),
        QueryConfig::default(),
        ResolverConfig::default(),
        config,
    );
    assert_eq!(service.service().service_version, "2.0.0");
    assert_eq!(service.service().service_name, "CTS2 Development Framework RESTWebApp");
}

#[rstest]
#[case("/codesystemversions", "CodeSystemVersionCatalogEntryDirectory", Some(5))]
#[case(
    "/codesystemversions?matchvalue=GO&filtercomponent=resourceName&matchalgorithm=exactMatch",
    "CodeSystemVersionCatalogEntryDirectory",
    Some(0)
)]
#[case("/codesystem/NCI_Thesaurus/version/19.05d", "CodeSystemVersionCatalogEntryMsg", None)]
#[case("/codesystem/NCI_Thesaurus/version/19.05d/entity/ncit:C12727", "EntityDescriptionMsg", None)]
#[case(
    "/codesystem/NCI_Thesaurus/version/19.05d/entity/C12727/children",
    "EntityDirectory",
    Some(4)
)]
#[case(
    "/codesystem/NCI_Thesaurus/version/19.04e/entity/C12727/children",
    "EntityDirectory",
    Some(2)
)]
#[case(
    "/codesystem/NCI_Thesaurus/version/19.05d/entity/ncit:C12727/targetof",
    "AssociationDirectory",
    Some(6)
)]
#[case(
    "/codesystem/NCI_Thesaurus/version/19.05d/entity/ncit:C12728/subjectof",
    "AssociationDirectory",
    Some(1)
)]
#[case("/valuesets?maxtoreturn=2", "ValueSetCatalogEntryDirectory", Some(2))]
#[case("/valueset/Heart%20Structures", "ValueSetCatalogEntryMsg", None)]
#[case("/valueset/Heart Structures", "ValueSetCatalogEntryMsg", None)]
#[case("/mapversions", "MapVersionDirectory", Some(1))]
#[case("/map/NCIt_to_MedDRA", "MapCatalogEntryMsg", None)]
#[case("/map/NCIt_to_MedDRA/versions", "MapVersionDirectory", Some(1))]
#[case("/map/NCIt_to_MedDRA/version/NCIt_to_MedDRA-1.0", "MapVersionMsg", None)]
#[case("/map/NCIt_to_MedDRA/version/NCIt_to_MedDRA-1.0/entries", "MapEntryDirectory", Some(1))]
#[case("/map/NCIt_to_MedDRA/version/NCIt_to_MedDRA-1.0/entry/C12727", "MapEntryMsg", None)]
#[case("/resolvedvaluesets", "ResolvedValueSetDirectory", Some(0))]
fn test_dispatch(#[case] path: &str, #[case] message: &str, #[case] entries: Option<usize>) {
    let response = service().handle_path(path).unwrap();
    assert_eq!(response.message_name(), message);
    assert_eq!(response.num_entries(), entries);

    let json = response.to_json();
    assert!(json.get(message).is_some(), "{json}");
}

#[test]
fn test_resolution_endpoint() {
    let service = service();
    let digest = heart_digest(&service);

    let path = format!(
        "/valueset/Heart%20Structures/definition/{}/resolution/1?maxtoreturn=3",
        digest
    );
    let response = service.handle_path(&path).unwrap();
    let Cts2Response::IteratableResolvedValueSet(resolution) = response else {
        panic!("expected IteratableResolvedValueSet");
    };
    assert_eq!(resolution.members.num_entries, 3);
    assert_eq!(resolution.members.complete, CompleteDirectory::Partial);
    assert_eq!(
        resolution.resolved_value_set_header.resolution_of.value_set_definition.content,
        digest
    );

    // The resolution is now listed
    let listed = service.handle_path("/resolvedvaluesets").unwrap();
    assert_eq!(listed.num_entries(), Some(1));
    let Cts2Response::ResolvedValueSetDirectory(directory) = listed else {
        panic!("expected ResolvedValueSetDirectory");
    };
    assert_eq!(directory.entries[0].resolved_value_set_uri, resolution.resolved_value_set_uri);

    // The facade shares the resolver's history
    assert_eq!(service.resolver().history().len(), 1);
}

#[test]
fn test_definition_endpoint() {
    let service = service();
    let digest = heart_digest(&service);

    let response = service
        .handle_path(&format!("/valueset/Heart Structures/definition/{}", digest))
        .unwrap();
    let Cts2Response::ValueSetDefinitionMsg(definition) = response else {
        panic!("expected ValueSetDefinitionMsg");
    };
    assert_eq!(definition.value_set_name(), HEART_STRUCTURES);
    assert_eq!(definition.entries.len(), 1);
}

#[test]
fn test_thesaurus_version_from_environment() {
    let env = environment();
    let service = service();

    let path = format!(
        "/codesystemversions?matchvalue={}&matchalgorithm=exactMatch",
        env.thesaurus_version()
    );
    let response = service.handle_path(&path).unwrap();
    let Cts2Response::CodeSystemVersionCatalogEntryDirectory(directory) = response else {
        panic!("expected CodeSystemVersionCatalogEntryDirectory");
    };
    assert_eq!(directory.num_entries, 1);
    assert_eq!(directory.entries[0].code_system_version_name, env.thesaurus_version());
}

#[test]
fn test_not_found_and_bad_requests() {
    let service = service();

    assert!(service.handle_path("/valueset/No Such Set").unwrap_err().is_not_found());
    assert!(service
        .handle_path("/codesystem/NCI_Thesaurus/version/99.99z")
        .unwrap_err()
        .is_not_found());
    assert!(service
        .handle_path("/valueset/Heart Structures/definition/ffffffff/resolution/1")
        .unwrap_err()
        .is_not_found());

    let err = service.handle_path("").unwrap_err();
    assert!(matches!(
        err,
        ResolverError::Catalog(CatalogError::Request(RequestError::EmptyPath))
    ));

    let err = service.handle_path("/valuesets?matchalgorithm=soundex&matchvalue=x").unwrap_err();
    assert!(matches!(
        err,
        ResolverError::Catalog(CatalogError::Request(RequestError::InvalidParameter { .. }))
    ));
}
