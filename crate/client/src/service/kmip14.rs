//! The KMIP 1.4 dialect service: Template-Attribute carriage, plain
//! TextString identifiers, single-identifier Locate responses.

use kmsc_kmip::{
    kmip_0::{
        kmip_data_structures::{
            Attribute, AttributeValue, KeyBlock, KeyMaterial, KeyValue, ManagedObject, Name,
            RevocationReason, SecretData, SymmetricKey,
        },
        kmip_types::{ObjectType, Operation},
    },
    kmip_1_4::{
        kmip_data_structures::TemplateAttribute,
        kmip_operations::{
            ActivateRequestPayload, ActivateResponsePayload, CreateRequestPayload,
            CreateResponsePayload, DestroyRequestPayload, DestroyResponsePayload,
            DiscoverVersionsRequestPayload, DiscoverVersionsResponsePayload,
            GetAttributesRequestPayload, GetAttributesResponsePayload, GetRequestPayload,
            GetResponsePayload, LocateRequestPayload, LocateResponsePayload,
            ModifyAttributeRequestPayload, ModifyAttributeResponsePayload, QueryRequestPayload,
            QueryResponsePayload, ReKeyRequestPayload, ReKeyResponsePayload,
            RegisterRequestPayload, RegisterResponsePayload, RevokeRequestPayload,
            RevokeResponsePayload,
        },
    },
    ttlv::TTLV,
};
use tracing::debug;

use super::{send_request, KmipOperations};
use crate::{
    batch::BatchOutput,
    config::ConfigurationSettings,
    error::{ClientError, ClientResult},
    ops::*,
    transport::KmipConnection,
};

/// Turn a key block into the lowercase-hex rendering of its material,
/// or the empty string when there is none.
pub(crate) fn key_material_hex(object: Option<&ManagedObject>) -> String {
    object
        .and_then(|object| object.key_block().key_value.as_ref())
        .map(|key_value| hex::encode(key_value.key_material.as_slice()))
        .unwrap_or_default()
}

fn template_attribute(req: &CreateKeyRequest) -> ClientResult<TemplateAttribute> {
    let mut template = TemplateAttribute::default();
    template.push(
        "CryptographicAlgorithm",
        AttributeValue::Enumeration(req.algorithm.into()),
    );
    template.push(
        "CryptographicLength",
        AttributeValue::Integer(req.cryptographic_length),
    );
    template.push(
        "CryptographicUsageMask",
        AttributeValue::Integer(
            req.cryptographic_usage_mask
                .as_i32()
                .map_err(|e| ClientError::Usage(e.to_string()))?,
        ),
    );
    template.push("Name", AttributeValue::Name(Name::uninterpreted(&req.id)));
    for (name, value) in &req.attributes {
        template.push(name.clone(), AttributeValue::TextString(value.clone()));
    }
    Ok(template)
}

fn locate_attributes(req: &LocateRequest) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    if !req.name.is_empty() {
        attributes.push(Attribute::new(
            "Name",
            AttributeValue::Name(Name::uninterpreted(&req.name)),
        ));
    }
    for (name, value) in &req.attributes {
        // an ObjectType filter is an enumeration, everything else text
        if name == "ObjectType" {
            if let Ok(object_type) = value.parse::<ObjectType>() {
                attributes.push(Attribute::new(
                    "ObjectType",
                    AttributeValue::Enumeration(object_type.into()),
                ));
                continue;
            }
        }
        attributes.push(Attribute::text(name.clone(), value.clone()));
    }
    attributes
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

fn render_attribute(attribute: &Attribute) -> String {
    format!(
        "{}={}",
        attribute.attribute_name,
        attribute.attribute_value.render()
    )
}

/// KMIP 1.4.
pub struct Kmip14Service;

impl KmipOperations for Kmip14Service {
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
            unique_identifier: parsed.unique_identifier,
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
            unique_identifier: parsed.unique_identifier,
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
            unique_identifier: parsed.unique_identifier,
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
        let mut template = TemplateAttribute::default();
        if let Some(group) = &req.object_group {
            template.push("ObjectGroup", AttributeValue::TextString(group.clone()));
        }
        for (name, value) in &req.attributes {
            template.push(name.clone(), AttributeValue::TextString(value.clone()));
        }
        if !req.name.is_empty() {
            template.push("Name", AttributeValue::Name(Name::uninterpreted(&req.name)));
        }
        let payload = RegisterRequestPayload {
            object_type: req.object_type,
            template_attribute: template,
            object: registered_object(req),
        };
        let response = send_request(conn, settings, Operation::Register, payload.to_ttlv())?;
        let parsed = RegisterResponsePayload::from_ttlv(&response)?;
        Ok(RegisterResponse {
            unique_identifier: parsed.unique_identifier,
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
            unique_identifiers: parsed.unique_identifier.into_iter().collect(),
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
            unique_identifier: parsed.unique_identifier,
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
            unique_identifier: parsed.unique_identifier,
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
            unique_identifier: req.unique_identifier.clone(),
            offset: None,
        };
        let response = send_request(conn, settings, Operation::ReKey, payload.to_ttlv())?;
        let parsed = ReKeyResponsePayload::from_ttlv(&response)?;
        Ok(ReKeyResponse {
            unique_identifier: parsed.unique_identifier,
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
            unique_identifier: req.unique_identifier.clone(),
            attribute_name: vec![req.attribute_name.clone()],
        };
        let response = send_request(conn, settings, Operation::GetAttributes, payload.to_ttlv())?;
        let parsed = GetAttributesResponsePayload::from_ttlv(&response)?;
        Ok(GetAttributeResponse {
            unique_identifier: parsed.unique_identifier,
            attribute: parsed.attribute.first().map(render_attribute),
        })
    }

    fn modify_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ModifyAttributeRequest,
    ) -> ClientResult<ModifyAttributeResponse> {
        debug!(uid = %req.unique_identifier, "modify attribute");
        // 1.4 carries the current attribute only
        let payload = ModifyAttributeRequestPayload {
            unique_identifier: req.unique_identifier.clone(),
            attribute: Attribute::text(
                req.current_attribute.0.clone(),
                req.current_attribute.1.clone(),
            ),
        };
        let response = send_request(conn, settings, Operation::ModifyAttribute, payload.to_ttlv())?;
        let parsed = ModifyAttributeResponsePayload::from_ttlv(&response)?;
        Ok(ModifyAttributeResponse {
            unique_identifier: parsed.unique_identifier,
            attribute: parsed.attribute.as_ref().map(render_attribute),
        })
    }

    fn set_attribute(
        &self,
        _conn: &mut KmipConnection,
        _settings: &ConfigurationSettings,
        _req: &SetAttributeRequest,
    ) -> ClientResult<SetAttributeResponse> {
        // no SetAttribute before 2.0; rejected locally, nothing is sent
        Err(ClientError::Usage(
            "SetAttribute is not supported by the KMIP 1.4 dialect".to_owned(),
        ))
    }

    fn create_key_payload(&self, req: &CreateKeyRequest) -> ClientResult<TTLV> {
        let payload = CreateRequestPayload {
            object_type: ObjectType::SymmetricKey,
            template_attribute: template_attribute(req)?,
        };
        Ok(payload.to_ttlv())
    }

    fn activate_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(ActivateRequestPayload {
            unique_identifier: unique_identifier.to_owned(),
        }
        .to_ttlv())
    }

    fn get_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(GetRequestPayload {
            unique_identifier: unique_identifier.to_owned(),
        }
        .to_ttlv())
    }

    fn locate_payload(&self, req: &LocateRequest) -> ClientResult<TTLV> {
        LocateRequestPayload {
            maximum_items: None,
            storage_status_mask: None,
            object_group_member: None,
            attribute: locate_attributes(req),
        }
        .to_ttlv()
        .map_err(ClientError::from)
    }

    fn revoke_payload(&self, req: &RevokeKeyRequest) -> ClientResult<TTLV> {
        Ok(RevokeRequestPayload {
            unique_identifier: req.unique_identifier.clone(),
            revocation_reason: RevocationReason {
                revocation_reason_code: req.revocation_reason,
                revocation_message: req.revocation_message.clone(),
            },
            compromise_occurrence_date: req.compromise_occurrence_date,
        }
        .to_ttlv())
    }

    fn destroy_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(DestroyRequestPayload {
            unique_identifier: unique_identifier.to_owned(),
        }
        .to_ttlv())
    }

    fn rekey_payload(&self, unique_identifier: &str) -> ClientResult<TTLV> {
        Ok(ReKeyRequestPayload {
            unique_identifier: unique_identifier.to_owned(),
            offset: None,
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
                unique_identifier: CreateResponsePayload::from_ttlv(payload)?.unique_identifier,
            },
            Operation::Activate => BatchOutput::Activated {
                unique_identifier: ActivateResponsePayload::from_ttlv(payload)?.unique_identifier,
            },
            Operation::Get => {
                let parsed = GetResponsePayload::from_ttlv(payload)?;
                BatchOutput::Got {
                    object_type: parsed.object_type,
                    unique_identifier: parsed.unique_identifier,
                    key_material: key_material_hex(parsed.object.as_ref()),
                }
            }
            Operation::Locate => {
                let parsed = LocateResponsePayload::from_ttlv(payload)?;
                BatchOutput::Located {
                    unique_identifiers: parsed.unique_identifier.into_iter().collect(),
                }
            }
            Operation::Revoke => BatchOutput::Revoked {
                unique_identifier: RevokeResponsePayload::from_ttlv(payload)?.unique_identifier,
            },
            Operation::Destroy => BatchOutput::Destroyed {
                unique_identifier: DestroyResponsePayload::from_ttlv(payload)?.unique_identifier,
            },
            Operation::ReKey => BatchOutput::ReKeyed {
                unique_identifier: ReKeyResponsePayload::from_ttlv(payload)?.unique_identifier,
            },
            _ => BatchOutput::Other,
        })
    }
}
