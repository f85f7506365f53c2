//! The KMIP 2.0 dialect service: flat `Attributes` carriage, tagged
//! `UniqueIdentifier` values, identifier-list Locate responses, and a
//! real SetAttribute.

use kmsc_kmip::{
    kmip_0::{
        kmip_data_structures::{
            AttributeValue, KeyBlock, KeyMaterial, KeyValue, ManagedObject, Name, SecretData,
            SymmetricKey,
        },
        kmip_types::{ObjectType, Operation},
    },
    kmip_2_0::{
        kmip_attributes::{Attributes, CustomAttribute},
        kmip_operations::{
            ActivateRequestPayload, ActivateResponsePayload, AttributeNameValue,
            CreateRequestPayload, CreateResponsePayload, DestroyRequestPayload,
            DestroyResponsePayload, DiscoverVersionsRequestPayload,
            DiscoverVersionsResponsePayload, GetAttributesRequestPayload,
            GetAttributesResponsePayload, GetRequestPayload, GetResponsePayload,
            LocateRequestPayload, LocateResponsePayload, ModifyAttributeRequestPayload,
            ModifyAttributeResponsePayload, QueryRequestPayload, QueryResponsePayload,
            ReKeyRequestPayload, ReKeyResponsePayload, RegisterRequestPayload,
            RegisterResponsePayload, RevokeRequestPayload, RevokeResponsePayload,
            SetAttributeRequestPayload, SetAttributeResponsePayload,
        },
        kmip_types::UniqueIdentifier,
    },
    ttlv::TTLV,
};
use tracing::debug;

use super::{kmip14::key_material_hex, send_request, KmipOperations};
use crate::{
    batch::BatchOutput,
    config::ConfigurationSettings,
    error::{ClientError, ClientResult},
    ops::*,
    transport::KmipConnection,
};

fn uid(value: &str) -> UniqueIdentifier {
    UniqueIdentifier::TextString(value.to_owned())
}

fn create_attributes(req: &CreateKeyRequest) -> ClientResult<Attributes> {
    let mut attributes = Attributes {
        cryptographic_algorithm: Some(req.algorithm),
        cryptographic_length: Some(req.cryptographic_length),
        cryptographic_usage_mask: Some(req.cryptographic_usage_mask),
        object_group: None,
        name: vec![Name::uninterpreted(&req.id)],
        attribute: Vec::new(),
    };
    for (name, value) in &req.attributes {
        attributes.attribute.push(CustomAttribute {
            vendor_identification: "x".to_owned(),
            attribute_name: name.clone(),
            attribute_value: AttributeValue::TextString(value.clone()),
        });
    }
    Ok(attributes)
}

fn registered_object(req: &RegisterRequest) -> ManagedObject {
    let key_block = KeyBlock {
        key_format_type: req.key_format,
        key_value: Some(KeyValue {
            key_material: KeyMaterial::new(req.key_material.to_vec()),
        }),
        cryptographic_algorithm: None,
        cryptographic_length: None,
    };
    match req.object_type {
        ObjectType::SymmetricKey => ManagedObject::SymmetricKey(SymmetricKey { key_block }),
        _ => ManagedObject::SecretData(SecretData {
            secret_data_type: req.secret_data_type,
            key_block,
        }),
    }
}

/// KMIP 2.0.
pub struct Kmip20Service;

impl KmipOperations for Kmip20Service {
    fn discover(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &DiscoverRequest,
    ) -> ClientResult<DiscoverResponse> {
        debug!(versions = ?req.client_versions, "discover versions");
        let payload = DiscoverVersionsRequestPayload {
            protocol_version: req.client_versions.clone(),
        };
        let response = send_request(
            conn,
            settings,
            Operation::DiscoverVersions,
            payload.to_ttlv(),
        )?;
        let parsed = DiscoverVersionsResponsePayload::from_ttlv(&response)?;
        Ok(DiscoverResponse {
            supported_versions: parsed.protocol_version,
        })
    }

    fn query(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &QueryRequest,
    ) -> ClientResult<QueryResponse> {
        debug!(functions = ?req.query_functions, "query server");
        let payload = QueryRequestPayload {
            query_function: req.query_functions.clone(),
        };
        let response = send_request(conn, settings, Operation::Query, payload.to_ttlv())?;
        let parsed = QueryResponsePayload::from_ttlv(&response)?;
        Ok(QueryResponse {
            operations: parsed.operation,
            object_types: parsed.object_type,
            vendor_identification: parsed.vendor_identification,
            capability_information: parsed.capability_information,
        })
    }

    fn create_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &CreateKeyRequest,
    ) -> ClientResult<CreateKeyResponse> {
        debug!(id = %req.id, "create key");
        let payload = self.create_key_payload(req)?;
        let response = send_request(conn, settings, Operation::Create, payload)?;
        let parsed = CreateResponsePayload::from_ttlv(&response)?;
        Ok(CreateKeyResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn activate_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ActivateKeyRequest,
    ) -> ClientResult<ActivateKeyResponse> {
        debug!(uid = %req.unique_identifier, "activate key");
        let payload = self.activate_payload(&req.unique_identifier)?;
        let response = send_request(conn, settings, Operation::Activate, payload)?;
        let parsed = ActivateResponsePayload::from_ttlv(&response)?;
        Ok(ActivateKeyResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn get_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &GetKeyRequest,
    ) -> ClientResult<GetKeyResponse> {
        debug!(uid = %req.unique_identifier, "get key");
        let payload = self.get_payload(&req.unique_identifier)?;
        let mut response = send_request(conn, settings, Operation::Get, payload)?;
        let parsed = GetResponsePayload::from_ttlv(&response);
        // the response tree holds a copy of the key material
        response.zeroize_byte_strings();
        let parsed = parsed?;
        let key_material = key_material_hex(parsed.object.as_ref());
        Ok(GetKeyResponse {
            object_type: parsed.object_type,
            unique_identifier: parsed.unique_identifier.to_string(),
            key_material,
        })
    }

    fn register(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &RegisterRequest,
    ) -> ClientResult<RegisterResponse> {
        debug!(name = %req.name, object_type = %req.object_type, "register");
        let mut attributes = Attributes {
            object_group: req.object_group.clone(),
            ..Attributes::default()
        };
        if !req.name.is_empty() {
            attributes.name.push(Name::uninterpreted(&req.name));
        }
        for (name, value) in &req.attributes {
            attributes.attribute.push(CustomAttribute {
                vendor_identification: "x".to_owned(),
                attribute_name: name.clone(),
                attribute_value: AttributeValue::TextString(value.clone()),
            });
        }
        let payload = RegisterRequestPayload {
            object_type: req.object_type,
            attributes,
            object: registered_object(req),
        };
        let response = send_request(conn, settings, Operation::Register, payload.to_ttlv()?)?;
        let parsed = RegisterResponsePayload::from_ttlv(&response)?;
        Ok(RegisterResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn locate(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &LocateRequest,
    ) -> ClientResult<LocateResponse> {
        debug!(name = %req.name, "locate");
        let payload = self.locate_payload(req)?;
        let response = send_request(conn, settings, Operation::Locate, payload)?;
        let parsed = LocateResponsePayload::from_ttlv(&response)?;
        Ok(LocateResponse {
            unique_identifiers: parsed
                .unique_identifier
                .iter()
                .map(ToString::to_string)
                .collect(),
            located_items: parsed.located_items,
        })
    }

    fn revoke_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &RevokeKeyRequest,
    ) -> ClientResult<RevokeKeyResponse> {
        debug!(uid = %req.unique_identifier, reason = %req.revocation_reason, "revoke key");
        let payload = self.revoke_payload(req)?;
        let response = send_request(conn, settings, Operation::Revoke, payload)?;
        let parsed = RevokeResponsePayload::from_ttlv(&response)?;
        Ok(RevokeKeyResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn destroy_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &DestroyKeyRequest,
    ) -> ClientResult<DestroyKeyResponse> {
        debug!(uid = %req.unique_identifier, "destroy key");
        let payload = self.destroy_payload(&req.unique_identifier)?;
        let response = send_request(conn, settings, Operation::Destroy, payload)?;
        let parsed = DestroyResponsePayload::from_ttlv(&response)?;
        Ok(DestroyKeyResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn rekey(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ReKeyRequest,
    ) -> ClientResult<ReKeyResponse> {
        debug!(uid = %req.unique_identifier, "rekey");
        let payload = ReKeyRequestPayload {
            unique_identifier: uid(&req.unique_identifier),
        };
        let response = send_request(conn, settings, Operation::ReKey, payload.to_ttlv())?;
        let parsed = ReKeyResponsePayload::from_ttlv(&response)?;
        Ok(ReKeyResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn get_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &GetAttributeRequest,
    ) -> ClientResult<GetAttributeResponse> {
        debug!(uid = %req.unique_identifier, name = %req.attribute_name, "get attribute");
        let payload = GetAttributesRequestPayload {
            unique_identifier: uid(&req.unique_identifier),
            attribute_reference: vec![req.attribute_name.clone()],
        };
        let response = send_request(conn, settings, Operation::GetAttributes, payload.to_ttlv())?;
        let parsed = GetAttributesResponsePayload::from_ttlv(&response)?;
        let attribute = parsed
            .attributes
            .first()
            .map(|item| format!("{item}").trim_end().to_owned());
        Ok(GetAttributeResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
            attribute,
        })
    }

    fn modify_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ModifyAttributeRequest,
    ) -> ClientResult<ModifyAttributeResponse> {
        debug!(uid = %req.unique_identifier, "modify attribute");
        // 2.0 names both the current attribute and its replacement
        let payload = ModifyAttributeRequestPayload {
            unique_identifier: uid(&req.unique_identifier),
            current_attribute: Some(AttributeNameValue {
                attribute_name: req.current_attribute.0.clone(),
                attribute_value: req.current_attribute.1.clone(),
            }),
            new_attribute: AttributeNameValue {
                attribute_name: req.new_attribute.0.clone(),
                attribute_value: req.new_attribute.1.clone(),
            },
        };
        let response = send_request(conn, settings, Operation::ModifyAttribute, payload.to_ttlv())?;
        let parsed = ModifyAttributeResponsePayload::from_ttlv(&response)?;
        Ok(ModifyAttributeResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
            attribute: Some(format!(
                "{}={}",
                req.new_attribute.0, req.new_attribute.1
            )),
        })
    }

    fn set_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &SetAttributeRequest,
    ) -> ClientResult<SetAttributeResponse> {
        debug!(uid = %req.unique_identifier, name = %req.attribute_name, "set attribute");
        let payload = SetAttributeRequestPayload {
            unique_identifier: uid(&req.unique_identifier),
            new_attribute: AttributeNameValue {
                attribute_name: req.attribute_name.clone(),
                attribute_value: req.attribute_value.clone(),
            },
        };
        let response = send_request(conn, settings, Operation::SetAttribute, payload.to_ttlv())?;
        let parsed = SetAttributeResponsePayload::from_ttlv(&response)?;
        Ok(SetAttributeResponse {
            unique_identifier: parsed.unique_identifier.to_string(),
        })
    }

    fn create_key_payload(&self, req: &CreateKeyRequest) -> ClientResult<TTLV> {
        CreateRequestPayload {
            object_type: ObjectType::SymmetricKey,
            attributes: create_attributes(req)?,
        }
        .to_ttlv()
        .map_err(ClientError::from)
    }

    fn activate_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(ActivateRequestPayload {
            unique_identifier: uid(unique_identifier),
        }
        .to_ttlv())
    }

    fn get_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(GetRequestPayload {
            unique_identifier: uid(unique_identifier),
        }
        .to_ttlv())
    }

    fn locate_payload(&self, req: &LocateRequest) -> ClientResult<TTLV> {
        let mut attributes = Attributes::default();
        if !req.name.is_empty() {
            attributes.name.push(Name::uninterpreted(&req.name));
        }
        for (name, value) in &req.attributes {
            attributes.attribute.push(CustomAttribute {
                vendor_identification: "x".to_owned(),
                attribute_name: name.clone(),
                attribute_value: AttributeValue::TextString(value.clone()),
            });
        }
        LocateRequestPayload {
            maximum_items: None,
            attributes,
        }
        .to_ttlv()
        .map_err(ClientError::from)
    }

    fn revoke_payload(&self, req: &RevokeKeyRequest) -> ClientResult<TTLV> {
        // no RevocationMessage in 2.0
        Ok(RevokeRequestPayload {
            unique_identifier: uid(&req.unique_identifier),
            revocation_reason_code: req.revocation_reason,
        }
        .to_ttlv())
    }

    fn destroy_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(DestroyRequestPayload {
            unique_identifier: uid(unique_identifier),
        }
        .to_ttlv())
    }

    fn rekey_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(ReKeyRequestPayload {
            unique_identifier: uid(unique_identifier),
        }
        .to_ttlv())
    }

    fn decode_batch_item(
        &self,
        operation: Operation,
        payload: Option<&TTLV>,
    ) -> ClientResult<BatchOutput> {
        let payload = payload
            .ok_or_else(|| ClientError::Protocol("successful item without a payload".to_owned()))?;
        Ok(match operation {
            Operation::Create => BatchOutput::Created {
                unique_identifier: CreateResponsePayload::from_ttlv(payload)?
                    .unique_identifier
                    .to_string(),
            },
            Operation::Activate => BatchOutput::Activated {
                unique_identifier: ActivateResponsePayload::from_ttlv(payload)?
                    .unique_identifier
                    .to_string(),
            },
            Operation::Get => {
                let parsed = GetResponsePayload::from_ttlv(payload)?;
                BatchOutput::Got {
                    object_type: parsed.object_type,
                    unique_identifier: parsed.unique_identifier.to_string(),
                    key_material: key_material_hex(parsed.object.as_ref()),
                }
            }
            Operation::Locate => {
                let parsed = LocateResponsePayload::from_ttlv(payload)?;
                BatchOutput::Located {
                    unique_identifiers: parsed
                        .unique_identifier
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                }
            }
            Operation::Revoke => BatchOutput::Revoked {
                unique_identifier: RevokeResponsePayload::from_ttlv(payload)?
                    .unique_identifier
                    .to_string(),
            },
            Operation::Destroy => BatchOutput::Destroyed {
                unique_identifier: DestroyResponsePayload::from_ttlv(payload)?
                    .unique_identifier
                    .to_string(),
            },
            Operation::ReKey => BatchOutput::ReKeyed {
                unique_identifier: ReKeyResponsePayload::from_ttlv(payload)?
                    .unique_identifier
                    .to_string(),
            },
            _ => BatchOutput::Other,
        })
    }
}
