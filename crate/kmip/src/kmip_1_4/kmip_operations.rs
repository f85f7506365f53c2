//! KMIP 1.4 operation payloads.
//!
//! One request/response record pair per operation in the client contract,
//! each with a hand-written mapping to and from its `RequestPayload` /
//! `ResponsePayload` TTLV structure.

use time::OffsetDateTime;

use super::kmip_data_structures::TemplateAttribute;
use crate::{
    kmip_0::{
        kmip_data_structures::{Attribute, CapabilityInformation, ManagedObject, RevocationReason},
        kmip_types::{
            enum_child, ObjectGroupMember, ObjectType, Operation, ProtocolVersion, QueryFunction,
            StorageStatusMask,
        },
    },
    ttlv::TTLV,
    KmipError,
};

const REQUEST_PAYLOAD: &str = "RequestPayload";

fn text_child(parent: &TTLV, tag: &str) -> Result<Option<String>, KmipError> {
    match parent.child(tag) {
        Some(item) => Ok(Some(item.as_text()?.to_owned())),
        None => Ok(None),
    }
}

fn required_text(
    parent: &TTLV,
    tag: &'static str,
    payload: &'static str,
) -> Result<String, KmipError> {
    parent
        .child(tag)
        .ok_or(KmipError::MissingField(tag, payload))?
        .as_text()
        .map(str::to_owned)
        .map_err(KmipError::from)
}

/// 4.1 Create
/// Requests the server to generate a new managed cryptographic object;
/// the attributes to assign travel in a Template-Attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequestPayload {
    pub object_type: ObjectType,
    pub template_attribute: TemplateAttribute,
}

impl CreateRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                TTLV::enumeration("ObjectType", self.object_type),
                self.template_attribute.to_ttlv(),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResponsePayload {
    pub object_type: Option<ObjectType>,
    pub unique_identifier: String,
}

impl CreateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let object_type = match enum_child(ttlv, "ObjectType")? {
            Some(variant) => Some(ObjectType::from_variant(variant)?),
            None => None,
        };
        Ok(Self {
            object_type,
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "CreateResponsePayload")?,
        })
    }
}

/// 4.19 Activate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateRequestPayload {
    pub unique_identifier: String,
}

impl ActivateRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![TTLV::text_string("UniqueIdentifier", &self.unique_identifier)],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateResponsePayload {
    pub unique_identifier: String,
}

impl ActivateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "ActivateResponsePayload")?,
        })
    }
}

/// 4.11 Get
/// Wrapping specifications and alternate key formats are not part of this
/// client's contract, so the request is the identifier alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequestPayload {
    pub unique_identifier: String,
}

impl GetRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![TTLV::text_string("UniqueIdentifier", &self.unique_identifier)],
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct GetResponsePayload {
    pub object_type: ObjectType,
    pub unique_identifier: String,
    pub object: Option<ManagedObject>,
}

impl GetResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let object_type = enum_child(ttlv, "ObjectType")?
            .ok_or(KmipError::MissingField("ObjectType", "GetResponsePayload"))
            .and_then(ObjectType::from_variant)?;
        Ok(Self {
            object_type,
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "GetResponsePayload")?,
            object: ManagedObject::from_parent(ttlv)?,
        })
    }
}

/// 4.3 Register
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterRequestPayload {
    pub object_type: ObjectType,
    pub template_attribute: TemplateAttribute,
    pub object: ManagedObject,
}

impl RegisterRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                TTLV::enumeration("ObjectType", self.object_type),
                self.template_attribute.to_ttlv(),
                self.object.to_ttlv(),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponsePayload {
    pub unique_identifier: String,
}

impl RegisterResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "RegisterResponsePayload")?,
        })
    }
}

/// 4.9 Locate
/// The filters are Attribute children listed directly in the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateRequestPayload {
    pub maximum_items: Option<i32>,
    pub storage_status_mask: Option<StorageStatusMask>,
    pub object_group_member: Option<ObjectGroupMember>,
    pub attribute: Vec<Attribute>,
}

impl LocateRequestPayload {
    pub fn to_ttlv(&self) -> Result<TTLV, KmipError> {
        let mut items = Vec::new();
        if let Some(maximum_items) = self.maximum_items {
            items.push(TTLV::integer("MaximumItems", maximum_items));
        }
        if let Some(mask) = self.storage_status_mask {
            items.push(TTLV::integer("StorageStatusMask", mask.as_i32()?));
        }
        if let Some(member) = self.object_group_member {
            items.push(TTLV::enumeration("ObjectGroupMember", member));
        }
        for attribute in &self.attribute {
            items.push(attribute.to_ttlv("Attribute"));
        }
        Ok(TTLV::structure(REQUEST_PAYLOAD, items))
    }
}

/// The 1.4 Locate response: a single identifier (absent when nothing
/// matched — that is a success, not an error) and an optional count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateResponsePayload {
    pub located_items: Option<i32>,
    pub unique_identifier: Option<String>,
}

impl LocateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let located_items = match ttlv.child("LocatedItems") {
            Some(item) => Some(item.as_integer()?),
            None => None,
        };
        Ok(Self {
            located_items,
            unique_identifier: text_child(ttlv, "UniqueIdentifier")?,
        })
    }
}

/// 4.20 Revoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRequestPayload {
    pub unique_identifier: String,
    pub revocation_reason: RevocationReason,
    pub compromise_occurrence_date: Option<OffsetDateTime>,
}

impl RevokeRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![
            TTLV::text_string("UniqueIdentifier", &self.unique_identifier),
            self.revocation_reason.to_ttlv(true),
        ];
        if let Some(date) = self.compromise_occurrence_date {
            items.push(TTLV::date_time("CompromiseOccurrenceDate", date));
        }
        TTLV::structure(REQUEST_PAYLOAD, items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeResponsePayload {
    pub unique_identifier: String,
}

impl RevokeResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "RevokeResponsePayload")?,
        })
    }
}

/// 4.21 Destroy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyRequestPayload {
    pub unique_identifier: String,
}

impl DestroyRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![TTLV::text_string("UniqueIdentifier", &self.unique_identifier)],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyResponsePayload {
    pub unique_identifier: String,
}

impl DestroyResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "DestroyResponsePayload")?,
        })
    }
}

/// 4.4 Re-key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyRequestPayload {
    pub unique_identifier: String,
    pub offset: Option<i32>,
}

impl ReKeyRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![TTLV::text_string("UniqueIdentifier", &self.unique_identifier)];
        if let Some(offset) = self.offset {
            items.push(TTLV::interval("Offset", offset.unsigned_abs()));
        }
        TTLV::structure(REQUEST_PAYLOAD, items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyResponsePayload {
    pub unique_identifier: String,
}

impl ReKeyResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_text(ttlv, "UniqueIdentifier", "ReKeyResponsePayload")?,
        })
    }
}

/// 4.25 Query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequestPayload {
    pub query_function: Vec<QueryFunction>,
}

impl QueryRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            self.query_function
                .iter()
                .map(|function| TTLV::enumeration("QueryFunction", *function))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponsePayload {
    pub operation: Vec<Operation>,
    pub object_type: Vec<ObjectType>,
    pub vendor_identification: Option<String>,
    pub capability_information: Vec<CapabilityInformation>,
}

impl QueryResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let mut operation = Vec::new();
        for item in ttlv.children_with_tag("Operation") {
            operation.push(Operation::from_variant(item.as_enumeration()?)?);
        }
        let mut object_type = Vec::new();
        for item in ttlv.children_with_tag("ObjectType") {
            object_type.push(ObjectType::from_variant(item.as_enumeration()?)?);
        }
        let mut capability_information = Vec::new();
        for item in ttlv.children_with_tag("CapabilityInformation") {
            capability_information.push(CapabilityInformation::from_ttlv(item)?);
        }
        Ok(Self {
            operation,
            object_type,
            vendor_identification: text_child(ttlv, "VendorIdentification")?,
            capability_information,
        })
    }
}

/// 4.26 Discover Versions
/// The payload is identical in both dialects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverVersionsRequestPayload {
    pub protocol_version: Vec<ProtocolVersion>,
}

impl DiscoverVersionsRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            self.protocol_version
                .iter()
                .map(|version| version.to_ttlv("ProtocolVersion"))
                .collect(),
        )
    }
}

/// Supported versions, server-preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverVersionsResponsePayload {
    pub protocol_version: Vec<ProtocolVersion>,
}

impl DiscoverVersionsResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let mut protocol_version = Vec::new();
        for item in ttlv.children_with_tag("ProtocolVersion") {
            protocol_version.push(ProtocolVersion::from_ttlv(item)?);
        }
        Ok(Self { protocol_version })
    }
}

/// 4.12 Get Attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttributesRequestPayload {
    pub unique_identifier: String,
    pub attribute_name: Vec<String>,
}

impl GetAttributesRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![TTLV::text_string("UniqueIdentifier", &self.unique_identifier)];
        for name in &self.attribute_name {
            items.push(TTLV::text_string("AttributeName", name));
        }
        TTLV::structure(REQUEST_PAYLOAD, items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttributesResponsePayload {
    pub unique_identifier: String,
    pub attribute: Vec<Attribute>,
}

impl GetAttributesResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let mut attribute = Vec::new();
        for item in ttlv.children_with_tag("Attribute") {
            attribute.push(Attribute::from_ttlv(item)?);
        }
        Ok(Self {
            unique_identifier: required_text(
                ttlv,
                "UniqueIdentifier",
                "GetAttributesResponsePayload",
            )?,
            attribute,
        })
    }
}

/// 4.15 Modify Attribute
/// The 1.4 dialect sends only the attribute being replaced; there is no
/// current/new pair before 2.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeRequestPayload {
    pub unique_identifier: String,
    pub attribute: Attribute,
}

impl ModifyAttributeRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                TTLV::text_string("UniqueIdentifier", &self.unique_identifier),
                self.attribute.to_ttlv("Attribute"),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeResponsePayload {
    pub unique_identifier: String,
    pub attribute: Option<Attribute>,
}

impl ModifyAttributeResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let attribute = match ttlv.child("Attribute") {
            Some(item) => Some(Attribute::from_ttlv(item)?),
            None => None,
        };
        Ok(Self {
            unique_identifier: required_text(
                ttlv,
                "UniqueIdentifier",
                "ModifyAttributeResponsePayload",
            )?,
            attribute,
        })
    }
}
