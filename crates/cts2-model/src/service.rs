//! Service capability descriptor (`GET /service`).

use std::fmt;

/// A resource family the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_camel_case_types)]
#[allow(missing_docs)]
pub enum StructuralProfile {
    SP_ENTITY_DESCRIPTION,
    SP_CODE_SYSTEM_VERSION,
    SP_ASSOCIATION,
    SP_VALUE_SET,
    SP_VALUE_SET_DEFINITION,
    SP_RESOLVED_VALUE_SET,
    SP_MAP,
    SP_MAP_VERSION,
    SP_MAP_ENTRY,
}

impl StructuralProfile {
    /// Every structural profile, in descriptor order.
    pub const ALL: [StructuralProfile; 9] = [
        StructuralProfile::SP_ENTITY_DESCRIPTION,
        StructuralProfile::SP_CODE_SYSTEM_VERSION,
        StructuralProfile::SP_ASSOCIATION,
        StructuralProfile::SP_VALUE_SET,
        StructuralProfile::SP_VALUE_SET_DEFINITION,
        StructuralProfile::SP_RESOLVED_VALUE_SET,
        StructuralProfile::SP_MAP,
        StructuralProfile::SP_MAP_VERSION,
        StructuralProfile::SP_MAP_ENTRY,
    ];
}

impl fmt::Display for StructuralProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An operation family supported for a structural profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_camel_case_types)]
pub enum FunctionalProfile {
    /// Single-resource reads.
    FP_READ,
    /// Directory queries.
    FP_QUERY,
    /// Value-set resolution.
    FP_RESOLUTION,
}

impl fmt::Display for FunctionalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One structural profile with its functional profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SupportedProfile {
    /// Resource family.
    pub structural_profile: StructuralProfile,
    /// Supported operation families.
    #[cfg_attr(feature = "serde", serde(rename = "functionalProfile"))]
    pub functional_profiles: Vec<FunctionalProfile>,
}

impl SupportedProfile {
    /// The functional profiles a read-only catalog offers for a structural profile.
    pub fn read_only(structural_profile: StructuralProfile) -> Self {
        let mut functional_profiles = vec![FunctionalProfile::FP_READ, FunctionalProfile::FP_QUERY];
        if structural_profile == StructuralProfile::SP_VALUE_SET_DEFINITION {
            functional_profiles.push(FunctionalProfile::FP_RESOLUTION);
        }
        Self {
            structural_profile,
            functional_profiles,
        }
    }
}

/// Description of the running service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ServiceDescriptor {
    /// Service name.
    pub service_name: String,
    /// Service version string.
    pub service_version: String,
    /// Supported profiles.
    #[cfg_attr(feature = "serde", serde(rename = "supportedProfile"))]
    pub supported_profiles: Vec<SupportedProfile>,
}

impl ServiceDescriptor {
    /// Returns the functional profiles listed for a structural profile.
    pub fn functional_profiles(&self, structural: StructuralProfile) -> &[FunctionalProfile] {
        self.supported_profiles
            .iter()
            .find(|p| p.structural_profile == structural)
            .map(|p| p.functional_profiles.as_slice())
            .unwrap_or_default()
    }
}
