//! Plain-data request and response records of the uniform operation
//! contract. Both dialect services accept and produce these; the wire
//! shapes differ underneath.

use kmsc_kmip::kmip_0::{
    kmip_data_structures::CapabilityInformation,
    kmip_types::{
        CryptographicAlgorithm, CryptographicUsageMask, KeyFormatType, ObjectType, Operation,
        ProtocolVersion, QueryFunction, RevocationReasonCode, SecretDataType,
    },
};
use time::OffsetDateTime;

use crate::secret::Secret;

/// Create a new symmetric key under a client-chosen name.
#[derive(Debug, Clone)]
pub struct CreateKeyRequest {
    /// The Name attribute of the new key
    pub id: String,
    pub algorithm: CryptographicAlgorithm,
    pub cryptographic_length: i32,
    pub cryptographic_usage_mask: CryptographicUsageMask,
    /// Extra client attributes, (name, value) pairs
    pub attributes: Vec<(String, String)>,
}

impl CreateKeyRequest {
    /// The original console's defaults: AES-256 for encrypt+decrypt.
    #[must_use]
    pub fn aes_256(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            algorithm: CryptographicAlgorithm::AES,
            cryptographic_length: 256,
            cryptographic_usage_mask: CryptographicUsageMask::ENCRYPT
                | CryptographicUsageMask::DECRYPT,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateKeyResponse {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateKeyRequest {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateKeyResponse {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetKeyRequest {
    pub unique_identifier: String,
}

/// The key material comes back as lowercase hexadecimal; the raw bytes
/// are zeroized before the response payload is dropped. An object with
/// no key material yields the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetKeyResponse {
    pub object_type: ObjectType,
    pub unique_identifier: String,
    pub key_material: String,
}

/// Register an externally-created object, secret data by default.
#[derive(Debug)]
pub struct RegisterRequest {
    pub object_type: ObjectType,
    pub key_material: Secret,
    pub key_format: KeyFormatType,
    pub secret_data_type: SecretDataType,
    pub name: String,
    pub object_group: Option<String>,
    /// Extra client attributes, (name, value) pairs
    pub attributes: Vec<(String, String)>,
}

impl RegisterRequest {
    #[must_use]
    pub fn secret_data(name: impl Into<String>, key_material: Secret) -> Self {
        Self {
            object_type: ObjectType::SecretData,
            key_material,
            key_format: KeyFormatType::Opaque,
            secret_data_type: SecretDataType::Password,
            name: name.into(),
            object_group: None,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub unique_identifier: String,
}

/// Locate by name plus up to a handful of attribute filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateRequest {
    pub name: String,
    /// (attribute name, attribute value) filter pairs
    pub attributes: Vec<(String, String)>,
}

/// An empty result is a success: the server found nothing, nothing went
/// wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateResponse {
    pub unique_identifiers: Vec<String>,
    pub located_items: Option<i32>,
}

impl LocateResponse {
    /// First match, the way `locate` scripts use it.
    #[must_use]
    pub fn unique_identifier(&self) -> Option<&str> {
        self.unique_identifiers.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeKeyRequest {
    pub unique_identifier: String,
    pub revocation_reason: RevocationReasonCode,
    /// 1.4 only; the 2.0 payload has no message field
    pub revocation_message: Option<String>,
    pub compromise_occurrence_date: Option<OffsetDateTime>,
}

impl RevokeKeyRequest {
    #[must_use]
    pub fn cessation(unique_identifier: impl Into<String>) -> Self {
        Self {
            unique_identifier: unique_identifier.into(),
            revocation_reason: RevocationReasonCode::CessationOfOperation,
            revocation_message: None,
            compromise_occurrence_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeKeyResponse {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyKeyRequest {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyKeyResponse {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyRequest {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyResponse {
    pub unique_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub query_functions: Vec<QueryFunction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    pub operations: Vec<Operation>,
    pub object_types: Vec<ObjectType>,
    pub vendor_identification: Option<String>,
    pub capability_information: Vec<CapabilityInformation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverRequest {
    pub client_versions: Vec<ProtocolVersion>,
}

/// Ordered server-preferred first, straight off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverResponse {
    pub supported_versions: Vec<ProtocolVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttributeRequest {
    pub unique_identifier: String,
    pub attribute_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttributeResponse {
    pub unique_identifier: String,
    /// The attribute rendered for display, when the server returned one
    pub attribute: Option<String>,
}

/// Both sides of the modification travel in the uniform request; the 1.4
/// dialect sends only the current attribute, 2.0 sends both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeRequest {
    pub unique_identifier: String,
    pub current_attribute: (String, String),
    pub new_attribute: (String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeResponse {
    pub unique_identifier: String,
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAttributeRequest {
    pub unique_identifier: String,
    pub attribute_name: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAttributeResponse {
    pub unique_identifier: String,
}
