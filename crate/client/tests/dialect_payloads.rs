//! Dialect-service tests: golden request bytes, response decoding, and
//! the uniform-contract corners that differ between 1.4 and 2.0.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use kmsc_client::{
    service::{Kmip14Service, Kmip20Service, KmipOperations},
    BatchOutput, ClientError, ConfigurationSettings, CreateKeyRequest, KmipClient, LocateRequest,
    RevokeKeyRequest, SetAttributeRequest,
};
use kmsc_kmip::{
    kmip_0::kmip_types::{Operation, ProtocolVersion, RevocationReasonCode},
    kmip_1_4::kmip_operations::DiscoverVersionsResponsePayload,
    ttlv::TTLV,
};

#[test]
fn kmip20_activate_unique_identifier_golden_bytes() {
    // Activate(uid="99") under 2.0: the UniqueIdentifier tagged value,
    // text variant, inside the RequestPayload structure.
    let payload = Kmip20Service.activate_payload("99").unwrap();
    let bytes = payload.to_bytes_2_0().unwrap();
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x79, 0x01, 0x00, 0x00, 0x00, 0x10, // RequestPayload
            0x42, 0x00, 0x94, 0x07, 0x00, 0x00, 0x00, 0x02, // UniqueIdentifier, TextString
            0x39, 0x39, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // "99" + padding
        ]
    );
}

#[test]
fn kmip14_activate_is_a_plain_text_string_too() {
    // same wire shape under 1.4, but through the String-typed payload
    let payload = Kmip14Service.activate_payload("99").unwrap();
    let bytes = payload.to_bytes_1_4().unwrap();
    assert_eq!(&bytes[8..12], &[0x42, 0x00, 0x94, 0x07]);
}

#[test]
fn kmip14_create_uses_a_template_attribute() {
    let request = CreateKeyRequest::aes_256("disk-0001");
    let payload = Kmip14Service.create_key_payload(&request).unwrap();

    assert_eq!(payload.tag, "RequestPayload");
    let template = payload.child("TemplateAttribute").unwrap();
    let attributes = template.children_with_tag("Attribute");
    assert_eq!(attributes.len(), 4);

    let names: Vec<_> = attributes
        .iter()
        .map(|attribute| {
            attribute
                .child("AttributeName")
                .unwrap()
                .as_text()
                .unwrap()
                .to_owned()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "CryptographicAlgorithm",
            "CryptographicLength",
            "CryptographicUsageMask",
            "Name",
        ]
    );

    // usage mask Encrypt|Decrypt = 12, carried as an Integer
    let mask = attributes[2].child("AttributeValue").unwrap();
    assert_eq!(mask.as_integer().unwrap(), 12);

    // the Name attribute value is a Name structure
    let name = attributes[3].child("AttributeValue").unwrap();
    assert_eq!(
        name.child("NameValue").unwrap().as_text().unwrap(),
        "disk-0001"
    );

    // and the whole thing survives the wire
    let bytes = payload.to_bytes_1_4().unwrap();
    assert_eq!(TTLV::from_bytes_1_4(&bytes).unwrap(), payload);
}

#[test]
fn kmip20_create_uses_flat_attributes() {
    let request = CreateKeyRequest::aes_256("disk-0001");
    let payload = Kmip20Service.create_key_payload(&request).unwrap();

    let attributes = payload.child("Attributes").unwrap();
    // flat: the semantic tags are the children themselves
    assert!(attributes.child("CryptographicAlgorithm").is_some());
    assert_eq!(
        attributes
            .child("CryptographicLength")
            .unwrap()
            .as_integer()
            .unwrap(),
        256
    );
    assert_eq!(
        attributes
            .child("CryptographicUsageMask")
            .unwrap()
            .as_integer()
            .unwrap(),
        12
    );
    assert_eq!(
        attributes
            .child("Name")
            .unwrap()
            .child("NameValue")
            .unwrap()
            .as_text()
            .unwrap(),
        "disk-0001"
    );
    // no 1.x wrapper anywhere
    assert!(payload.child("TemplateAttribute").is_none());

    let bytes = payload.to_bytes_2_0().unwrap();
    assert_eq!(TTLV::from_bytes_2_0(&bytes).unwrap(), payload);
}

#[test]
fn kmip14_revoke_carries_reason_and_message() {
    let request = RevokeKeyRequest {
        unique_identifier: "42".to_owned(),
        revocation_reason: RevocationReasonCode::KeyCompromise,
        revocation_message: Some("stolen laptop".to_owned()),
        compromise_occurrence_date: None,
    };
    let payload = Kmip14Service.revoke_payload(&request).unwrap();
    let reason = payload.child("RevocationReason").unwrap();
    assert_eq!(
        reason
            .child("RevocationReasonCode")
            .unwrap()
            .as_enumeration()
            .unwrap()
            .value,
        0x2
    );
    assert_eq!(
        reason.child("RevocationMessage").unwrap().as_text().unwrap(),
        "stolen laptop"
    );
}

#[test]
fn kmip20_revoke_has_no_revocation_message() {
    let request = RevokeKeyRequest {
        unique_identifier: "42".to_owned(),
        revocation_reason: RevocationReasonCode::CessationOfOperation,
        revocation_message: Some("ignored under 2.0".to_owned()),
        compromise_occurrence_date: None,
    };
    let payload = Kmip20Service.revoke_payload(&request).unwrap();
    let reason = payload.child("RevocationReason").unwrap();
    assert!(reason.child("RevocationReasonCode").is_some());
    assert!(reason.child("RevocationMessage").is_none());
}

#[test]
fn kmip14_locate_with_no_match_is_ok_and_empty() {
    // Server success response with no UniqueIdentifier at all
    let response_payload = TTLV::structure("ResponsePayload", vec![]);
    let output = Kmip14Service
        .decode_batch_item(Operation::Locate, Some(&response_payload))
        .unwrap();
    assert_eq!(
        output,
        BatchOutput::Located {
            unique_identifiers: Vec::new()
        }
    );
}

#[test]
fn kmip20_locate_decodes_the_ordered_identifier_list() {
    let response_payload = TTLV::structure(
        "ResponsePayload",
        vec![
            TTLV::integer("LocatedItems", 2),
            TTLV::text_string("UniqueIdentifier", "first"),
            TTLV::text_string("UniqueIdentifier", "second"),
        ],
    );
    let output = Kmip20Service
        .decode_batch_item(Operation::Locate, Some(&response_payload))
        .unwrap();
    assert_eq!(
        output,
        BatchOutput::Located {
            unique_identifiers: vec!["first".to_owned(), "second".to_owned()]
        }
    );
}

fn get_response_payload(material: Vec<u8>) -> TTLV {
    TTLV::structure(
        "ResponsePayload",
        vec![
            TTLV::enumeration("ObjectType", 0x2_u32), // SymmetricKey
            TTLV::text_string("UniqueIdentifier", "42"),
            TTLV::structure(
                "SymmetricKey",
                vec![TTLV::structure(
                    "KeyBlock",
                    vec![
                        TTLV::enumeration("KeyFormatType", 0x1_u32), // Raw
                        TTLV::structure(
                            "KeyValue",
                            vec![TTLV::byte_string("KeyMaterial", material)],
                        ),
                        TTLV::enumeration("CryptographicAlgorithm", 0x3_u32), // AES
                        TTLV::integer("CryptographicLength", 256),
                    ],
                )],
            ),
        ],
    )
}

#[test]
fn get_extracts_key_material_as_lowercase_hex() {
    let material: Vec<u8> = (0_u8..32).map(|i| i.wrapping_mul(0x11)).collect();
    let expected = hex::encode(&material);
    assert_eq!(expected.len(), 64);

    for service in [
        &Kmip14Service as &dyn KmipOperations,
        &Kmip20Service as &dyn KmipOperations,
    ] {
        let payload = get_response_payload(material.clone());
        let output = service
            .decode_batch_item(Operation::Get, Some(&payload))
            .unwrap();
        match output {
            BatchOutput::Got {
                unique_identifier,
                key_material,
                ..
            } => {
                assert_eq!(unique_identifier, "42");
                assert_eq!(key_material, expected);
                assert_eq!(key_material, key_material.to_lowercase());
            }
            other => panic!("expected a Got output, have {other:?}"),
        }
    }
}

#[test]
fn get_without_key_material_yields_the_empty_string() {
    let payload = TTLV::structure(
        "ResponsePayload",
        vec![
            TTLV::enumeration("ObjectType", 0x7_u32), // SecretData
            TTLV::text_string("UniqueIdentifier", "7"),
            TTLV::structure(
                "SecretData",
                vec![
                    TTLV::enumeration("SecretDataType", 0x1_u32),
                    TTLV::structure(
                        "KeyBlock",
                        vec![TTLV::enumeration("KeyFormatType", 0x2_u32)],
                    ),
                ],
            ),
        ],
    );
    let output = Kmip14Service
        .decode_batch_item(Operation::Get, Some(&payload))
        .unwrap();
    match output {
        BatchOutput::Got { key_material, .. } => assert_eq!(key_material, ""),
        other => panic!("expected a Got output, have {other:?}"),
    }
}

#[test]
fn operation_errors_carry_reason_and_message() {
    // a revoke refused by the server surfaces reason and message verbatim
    let error = ClientError::Operation {
        reason: Some(kmsc_kmip::kmip_0::kmip_types::ResultReason::PermissionDenied),
        message: "object is not in Active state".to_owned(),
    };
    let rendered = error.to_string();
    assert!(rendered.contains("PermissionDenied"));
    assert!(rendered.contains("object is not in Active state"));
}

#[test]
fn discover_response_preserves_server_preference_order() {
    let wire = TTLV::structure(
        "ResponsePayload",
        vec![
            ProtocolVersion::KMIP_1_4.to_ttlv("ProtocolVersion"),
            ProtocolVersion::new(1, 2).to_ttlv("ProtocolVersion"),
        ],
    );
    let parsed = DiscoverVersionsResponsePayload::from_ttlv(&wire).unwrap();
    assert_eq!(
        parsed.protocol_version,
        vec![ProtocolVersion::KMIP_1_4, ProtocolVersion::new(1, 2)]
    );
}

#[test]
fn set_attribute_is_rejected_locally_on_kmip14() {
    let mut client = KmipClient::new(ConfigurationSettings {
        save_settings_to_file: false,
        ..ConfigurationSettings::default()
    });
    let result = client.set_attribute(&SetAttributeRequest {
        unique_identifier: "42".to_owned(),
        attribute_name: "x-State".to_owned(),
        attribute_value: "parked".to_owned(),
    });
    match result {
        Err(ClientError::Usage(message)) => {
            assert!(message.contains("not supported"));
        }
        other => panic!("expected a usage error, have {other:?}"),
    }
}

#[test]
fn kmip20_set_attribute_payload_uses_new_attribute() {
    let payload = kmsc_kmip::kmip_2_0::kmip_operations::SetAttributeRequestPayload {
        unique_identifier: kmsc_kmip::kmip_2_0::kmip_types::UniqueIdentifier::TextString(
            "42".to_owned(),
        ),
        new_attribute: kmsc_kmip::kmip_2_0::kmip_operations::AttributeNameValue {
            attribute_name: "x-State".to_owned(),
            attribute_value: "parked".to_owned(),
        },
    }
    .to_ttlv();
    let new_attribute = payload.child("NewAttribute").unwrap();
    assert_eq!(
        new_attribute
            .child("AttributeName")
            .unwrap()
            .as_text()
            .unwrap(),
        "x-State"
    );
    // the 2.0 registry resolves the NewAttribute tag on the wire
    let bytes = payload.to_bytes_2_0().unwrap();
    assert_eq!(TTLV::from_bytes_2_0(&bytes).unwrap(), payload);
}

#[test]
fn locate_request_filters_differ_by_dialect() {
    let request = LocateRequest {
        name: "temp-key".to_owned(),
        attributes: vec![("x-id".to_owned(), "143".to_owned())],
    };

    let v14 = Kmip14Service.locate_payload(&request).unwrap();
    // 1.4 lists Attribute children directly
    assert_eq!(v14.children_with_tag("Attribute").len(), 2);

    let v20 = Kmip20Service.locate_payload(&request).unwrap();
    // 2.0 wraps everything in Attributes
    assert!(v20.children_with_tag("Attribute").is_empty());
    let attributes = v20.child("Attributes").unwrap();
    assert_eq!(
        attributes
            .child("Name")
            .unwrap()
            .child("NameValue")
            .unwrap()
            .as_text()
            .unwrap(),
        "temp-key"
    );
}
