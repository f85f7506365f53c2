//! KMIP 2.0 operation payloads.
//!
//! Same operation set as the 1.4 module, different shapes: attributes are
//! flat `Attributes` structures, identifiers are the tagged
//! [`UniqueIdentifier`] sum, Revoke lost its message, and SetAttribute
//! exists at all.

use super::{
    kmip_attributes::Attributes,
    kmip_types::UniqueIdentifier,
};
use crate::{
    kmip_0::{
        kmip_data_structures::{CapabilityInformation, ManagedObject},
        kmip_types::{
            enum_child, ObjectType, Operation, QueryFunction,
            RevocationReasonCode,
        },
    },
    ttlv::TTLV,
    KmipError,
};

const REQUEST_PAYLOAD: &str = "RequestPayload";

fn required_uid(parent: &TTLV, payload: &'static str) -> Result<UniqueIdentifier, KmipError> {
    UniqueIdentifier::from_ttlv(
        parent
            .child("UniqueIdentifier")
            .ok_or(KmipError::MissingField("UniqueIdentifier", payload))?,
    )
}

/// 6.1.5 Create
/// The attributes of the new object are carried flat, tagged by their
/// semantic tag, instead of the 1.x Template-Attribute wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequestPayload {
    pub object_type: ObjectType,
    pub attributes: Attributes,
}

impl CreateRequestPayload {
    pub fn to_ttlv(&self) -> Result<TTLV, KmipError> {
        Ok(TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                TTLV::enumeration("ObjectType", self.object_type),
                self.attributes.to_ttlv()?,
            ],
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResponsePayload {
    pub object_type: Option<ObjectType>,
    pub unique_identifier: UniqueIdentifier,
}

impl CreateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let object_type = match enum_child(ttlv, "ObjectType")? {
            Some(variant) => Some(ObjectType::from_variant(variant)?),
            None => None,
        };
        Ok(Self {
            object_type,
            unique_identifier: required_uid(ttlv, "CreateResponsePayload")?,
        })
    }
}

/// 6.1.2 Activate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateRequestPayload {
    pub unique_identifier: UniqueIdentifier,
}

impl ActivateRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![self.unique_identifier.to_ttlv("UniqueIdentifier")],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl ActivateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "ActivateResponsePayload")?,
        })
    }
}

/// 6.1.16 Get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequestPayload {
    pub unique_identifier: UniqueIdentifier,
}

impl GetRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![self.unique_identifier.to_ttlv("UniqueIdentifier")],
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct GetResponsePayload {
    pub object_type: ObjectType,
    pub unique_identifier: UniqueIdentifier,
    pub object: Option<ManagedObject>,
}

impl GetResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let object_type = enum_child(ttlv, "ObjectType")?
            .ok_or(KmipError::MissingField("ObjectType", "GetResponsePayload"))
            .and_then(ObjectType::from_variant)?;
        Ok(Self {
            object_type,
            unique_identifier: required_uid(ttlv, "GetResponsePayload")?,
            object: ManagedObject::from_parent(ttlv)?,
        })
    }
}

/// 6.1.36 Register
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterRequestPayload {
    pub object_type: ObjectType,
    pub attributes: Attributes,
    pub object: ManagedObject,
}

impl RegisterRequestPayload {
    pub fn to_ttlv(&self) -> Result<TTLV, KmipError> {
        Ok(TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                TTLV::enumeration("ObjectType", self.object_type),
                self.attributes.to_ttlv()?,
                self.object.to_ttlv(),
            ],
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl RegisterResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "RegisterResponsePayload")?,
        })
    }
}

/// 6.1.26 Locate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateRequestPayload {
    pub maximum_items: Option<i32>,
    pub attributes: Attributes,
}

impl LocateRequestPayload {
    pub fn to_ttlv(&self) -> Result<TTLV, KmipError> {
        let mut items = Vec::new();
        if let Some(maximum_items) = self.maximum_items {
            items.push(TTLV::integer("MaximumItems", maximum_items));
        }
        items.push(self.attributes.to_ttlv()?);
        Ok(TTLV::structure(REQUEST_PAYLOAD, items))
    }
}

/// The 2.0 Locate response: the full ordered list of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateResponsePayload {
    pub located_items: Option<i32>,
    pub unique_identifier: Vec<UniqueIdentifier>,
}

impl LocateResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let located_items = match ttlv.child("LocatedItems") {
            Some(item) => Some(item.as_integer()?),
            None => None,
        };
        let mut unique_identifier = Vec::new();
        for item in ttlv.children_with_tag("UniqueIdentifier") {
            unique_identifier.push(UniqueIdentifier::from_ttlv(item)?);
        }
        Ok(Self {
            located_items,
            unique_identifier,
        })
    }
}

/// 6.1.38 Revoke
/// 2.0 carries the reason code alone: `RevocationMessage` is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRequestPayload {
    pub unique_identifier: UniqueIdentifier,
    pub revocation_reason_code: RevocationReasonCode,
}

impl RevokeRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                self.unique_identifier.to_ttlv("UniqueIdentifier"),
                TTLV::structure(
                    "RevocationReason",
                    vec![TTLV::enumeration(
                        "RevocationReasonCode",
                        self.revocation_reason_code,
                    )],
                ),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl RevokeResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "RevokeResponsePayload")?,
        })
    }
}

/// 6.1.12 Destroy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyRequestPayload {
    pub unique_identifier: UniqueIdentifier,
}

impl DestroyRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![self.unique_identifier.to_ttlv("UniqueIdentifier")],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl DestroyResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "DestroyResponsePayload")?,
        })
    }
}

/// 6.1.37 Re-key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyRequestPayload {
    pub unique_identifier: UniqueIdentifier,
}

impl ReKeyRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![self.unique_identifier.to_ttlv("UniqueIdentifier")],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReKeyResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl ReKeyResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "ReKeyResponsePayload")?,
        })
    }
}

/// 6.1.34 Query — request shape is the 1.4 one; the response reuses the
/// shared capability-information decoding, which also understands the
/// 2.0-only batch capabilities.
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
        let vendor_identification = match ttlv.child("VendorIdentification") {
            Some(item) => Some(item.as_text()?.to_owned()),
            None => None,
        };
        let mut capability_information = Vec::new();
        for item in ttlv.children_with_tag("CapabilityInformation") {
            capability_information.push(CapabilityInformation::from_ttlv(item)?);
        }
        Ok(Self {
            operation,
            object_type,
            vendor_identification,
            capability_information,
        })
    }
}

/// 6.1.13 Get Attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttributesRequestPayload {
    pub unique_identifier: UniqueIdentifier,
    pub attribute_reference: Vec<String>,
}

impl GetAttributesRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![self.unique_identifier.to_ttlv("UniqueIdentifier")];
        for name in &self.attribute_reference {
            items.push(TTLV::text_string("AttributeReference", name));
        }
        TTLV::structure(REQUEST_PAYLOAD, items)
    }
}

/// The attributes come back as the children of an `Attributes` structure;
/// they are kept as raw TTLV items because a server may return any
/// attribute tag it knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct GetAttributesResponsePayload {
    pub unique_identifier: UniqueIdentifier,
    pub attributes: Vec<TTLV>,
}

impl GetAttributesResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let attributes = match ttlv.child("Attributes") {
            Some(item) => item.children()?.to_vec(),
            None => Vec::new(),
        };
        Ok(Self {
            unique_identifier: required_uid(ttlv, "GetAttributesResponsePayload")?,
            attributes,
        })
    }
}

/// An attribute spelled as a name/value pair, used by the
/// current/new-attribute structures of ModifyAttribute and SetAttribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNameValue {
    pub attribute_name: String,
    pub attribute_value: String,
}

impl AttributeNameValue {
    #[must_use]
    pub fn to_ttlv(&self, tag: &str) -> TTLV {
        TTLV::structure(
            tag,
            vec![
                TTLV::text_string("AttributeName", &self.attribute_name),
                TTLV::text_string("AttributeValue", &self.attribute_value),
            ],
        )
    }
}

/// 6.1.29 Modify Attribute
/// 2.0 names both sides: the attribute being replaced and its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeRequestPayload {
    pub unique_identifier: UniqueIdentifier,
    pub current_attribute: Option<AttributeNameValue>,
    pub new_attribute: AttributeNameValue,
}

impl ModifyAttributeRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![self.unique_identifier.to_ttlv("UniqueIdentifier")];
        if let Some(current) = &self.current_attribute {
            items.push(current.to_ttlv("CurrentAttribute"));
        }
        items.push(self.new_attribute.to_ttlv("NewAttribute"));
        TTLV::structure(REQUEST_PAYLOAD, items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyAttributeResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl ModifyAttributeResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "ModifyAttributeResponsePayload")?,
        })
    }
}

/// 6.1.41 Set Attribute (new in 2.0; the 1.4 dialect rejects it locally).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAttributeRequestPayload {
    pub unique_identifier: UniqueIdentifier,
    pub new_attribute: AttributeNameValue,
}

impl SetAttributeRequestPayload {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            REQUEST_PAYLOAD,
            vec![
                self.unique_identifier.to_ttlv("UniqueIdentifier"),
                self.new_attribute.to_ttlv("NewAttribute"),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAttributeResponsePayload {
    pub unique_identifier: UniqueIdentifier,
}

impl SetAttributeResponsePayload {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            unique_identifier: required_uid(ttlv, "SetAttributeResponsePayload")?,
        })
    }
}

/// 6.1.11 Discover Versions — identical to the 1.4 payload.
pub use crate::kmip_1_4::kmip_operations::{
    DiscoverVersionsRequestPayload, DiscoverVersionsResponsePayload,
};
