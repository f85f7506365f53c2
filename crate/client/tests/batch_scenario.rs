//! The create→activate→get→revoke→destroy batch, driven two ways: once
//! through message assembly, correlation and per-item payload decoding,
//! and once end-to-end through `KmipClient::batch` over an in-memory
//! stream standing in for the TLS socket.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::{
    io::{self, Read, Write},
    sync::{Arc, Mutex},
};

use kmsc_client::{
    service::{Kmip14Service, KmipOperations},
    ActivateKeyRequest, BatchOperation, BatchOutput, ConfigurationSettings, CreateKeyRequest,
    DestroyKeyRequest, GetKeyRequest, KmipClient, KmipConnection, LocateRequest, RevokeKeyRequest,
};
use kmsc_kmip::{
    kmip_0::kmip_types::{Operation, ProtocolVersion, ResultStatus},
    message::{demux, RequestBatchItem, RequestMessage, ResponseMessage},
    ttlv::TTLV,
};

fn uid_payload(uid: &str) -> TTLV {
    TTLV::structure(
        "ResponsePayload",
        vec![TTLV::text_string("UniqueIdentifier", uid)],
    )
}

fn get_payload(uid: &str, material: &[u8]) -> TTLV {
    TTLV::structure(
        "ResponsePayload",
        vec![
            TTLV::enumeration("ObjectType", 0x2_u32),
            TTLV::text_string("UniqueIdentifier", uid),
            TTLV::structure(
                "SymmetricKey",
                vec![TTLV::structure(
                    "KeyBlock",
                    vec![
                        TTLV::enumeration("KeyFormatType", 0x1_u32),
                        TTLV::structure(
                            "KeyValue",
                            vec![TTLV::byte_string("KeyMaterial", material.to_vec())],
                        ),
                    ],
                )],
            ),
        ],
    )
}

fn response_for(request: &RequestMessage, payloads: Vec<TTLV>) -> ResponseMessage {
    let wire = TTLV::structure(
        "ResponseMessage",
        std::iter::once(TTLV::structure(
            "ResponseHeader",
            vec![
                ProtocolVersion::KMIP_1_4.to_ttlv("ProtocolVersion"),
                TTLV::integer("BatchCount", request.request_header.batch_count),
            ],
        ))
        .chain(
            request
                .batch_item
                .iter()
                .zip(payloads)
                .map(|(item, payload)| {
                    TTLV::structure(
                        "BatchItem",
                        vec![
                            TTLV::enumeration("Operation", item.operation),
                            TTLV::byte_string(
                                "UniqueBatchItemID",
                                item.unique_batch_item_id.clone().unwrap(),
                            ),
                            TTLV::enumeration("ResultStatus", ResultStatus::Success),
                            payload,
                        ],
                    )
                }),
        )
        .collect(),
    );
    // shove it through the byte codec so the whole path is real
    let bytes = wire.to_bytes_1_4().unwrap();
    ResponseMessage::from_ttlv(&TTLV::from_bytes_1_4(&bytes).unwrap()).unwrap()
}

#[test]
fn five_item_batch_correlates_and_decodes() {
    let service = &Kmip14Service as &dyn KmipOperations;
    let material = [0x5A_u8; 32];

    let items = vec![
        RequestBatchItem::new(
            Operation::Create,
            service
                .create_key_payload(&CreateKeyRequest::aes_256("temp-key"))
                .unwrap(),
        ),
        RequestBatchItem::new(
            Operation::Activate,
            service.activate_payload("temp-1").unwrap(),
        ),
        RequestBatchItem::new(Operation::Get, service.get_payload("temp-1").unwrap()),
        RequestBatchItem::new(
            Operation::Revoke,
            service
                .revoke_payload(&RevokeKeyRequest::cessation("temp-1"))
                .unwrap(),
        ),
        RequestBatchItem::new(
            Operation::Destroy,
            service.destroy_payload("temp-1").unwrap(),
        ),
    ];
    let request = RequestMessage::build(ProtocolVersion::KMIP_1_4, items).unwrap();
    assert_eq!(request.request_header.batch_count, 5);

    let response = response_for(
        &request,
        vec![
            uid_payload("temp-1"),
            uid_payload("temp-1"),
            get_payload("temp-1", &material),
            uid_payload("temp-1"),
            uid_payload("temp-1"),
        ],
    );

    // every response item's ID equals its request item's ID, bijectively
    let ordered = demux(&request, &response).unwrap();
    for (request_item, response_item) in request.batch_item.iter().zip(&ordered) {
        assert_eq!(
            request_item.unique_batch_item_id,
            response_item.unique_batch_item_id
        );
    }

    let outputs: Vec<BatchOutput> = request
        .batch_item
        .iter()
        .zip(&ordered)
        .map(|(request_item, response_item)| {
            service
                .decode_batch_item(
                    request_item.operation,
                    response_item.response_payload.as_ref(),
                )
                .unwrap()
        })
        .collect();

    assert_eq!(
        outputs[0],
        BatchOutput::Created {
            unique_identifier: "temp-1".to_owned()
        }
    );
    assert_eq!(
        outputs[1],
        BatchOutput::Activated {
            unique_identifier: "temp-1".to_owned()
        }
    );
    match &outputs[2] {
        BatchOutput::Got {
            unique_identifier,
            key_material,
            ..
        } => {
            assert_eq!(unique_identifier, "temp-1");
            assert_eq!(*key_material, hex::encode(material));
        }
        other => panic!("expected a Got output, have {other:?}"),
    }
    assert_eq!(
        outputs[3],
        BatchOutput::Revoked {
            unique_identifier: "temp-1".to_owned()
        }
    );
    assert_eq!(
        outputs[4],
        BatchOutput::Destroyed {
            unique_identifier: "temp-1".to_owned()
        }
    );
}

/// An in-memory transport: collects the request frame the client
/// writes, answers it through `respond`, and serves the response a few
/// bytes per read so the length-driven frame reader has to loop.
#[derive(Clone)]
struct ScriptedStream(Arc<Mutex<ScriptedInner>>);

struct ScriptedInner {
    written: Vec<u8>,
    pending: Vec<u8>,
    exchanges: usize,
    respond: fn(&[u8]) -> Vec<u8>,
}

impl ScriptedStream {
    fn new(respond: fn(&[u8]) -> Vec<u8>) -> Self {
        Self(Arc::new(Mutex::new(ScriptedInner {
            written: Vec::new(),
            pending: Vec::new(),
            exchanges: 0,
            respond,
        })))
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = self.0.lock().unwrap();
        if inner.pending.is_empty() {
            let request = std::mem::take(&mut inner.written);
            let respond = inner.respond;
            inner.pending = respond(&request);
            inner.exchanges += 1;
        }
        let n = inner.pending.len().min(buf.len()).min(5);
        buf[..n].copy_from_slice(&inner.pending[..n]);
        inner.pending.drain(..n);
        Ok(n)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Answer one KMIP 1.4 request message, echoing every batch item ID and
/// returning key material for Get items.
fn respond_kmip14(request: &[u8]) -> Vec<u8> {
    let request = TTLV::from_bytes_1_4(request).unwrap();
    let items = request.children_with_tag("BatchItem");
    let mut children = vec![TTLV::structure(
        "ResponseHeader",
        vec![
            ProtocolVersion::KMIP_1_4.to_ttlv("ProtocolVersion"),
            TTLV::integer("BatchCount", i32::try_from(items.len()).unwrap()),
        ],
    )];
    for item in items {
        let operation =
            Operation::from_variant(item.child("Operation").unwrap().as_enumeration().unwrap())
                .unwrap();
        let payload = match operation {
            Operation::Get => get_payload("temp-1", &[0x5A_u8; 32]),
            _ => uid_payload("temp-1"),
        };
        let mut batch_children = vec![TTLV::enumeration("Operation", operation)];
        if let Some(id) = item.child("UniqueBatchItemID") {
            batch_children.push(TTLV::byte_string(
                "UniqueBatchItemID",
                id.as_bytes().unwrap().to_vec(),
            ));
        }
        batch_children.push(TTLV::enumeration("ResultStatus", ResultStatus::Success));
        batch_children.push(payload);
        children.push(TTLV::structure("BatchItem", batch_children));
    }
    TTLV::structure("ResponseMessage", children)
        .to_bytes_1_4()
        .unwrap()
}

/// Spec §8 key-material hygiene for the batch path: the whole send path
/// runs for real here — request assembly, framing, the dribbled read
/// loop, response parsing with its scrubbed intermediate copies, demux
/// and per-item decoding — and the stream must come out exactly in sync.
#[test]
fn client_batch_runs_the_full_send_path_over_a_scripted_stream() {
    let stream = ScriptedStream::new(respond_kmip14);
    let probe = stream.clone();

    let mut client = KmipClient::new(ConfigurationSettings {
        save_settings_to_file: false,
        ..ConfigurationSettings::default()
    });
    client.attach(KmipConnection::from_stream(stream, "scripted"));

    let results = client
        .batch(&[
            BatchOperation::Create(CreateKeyRequest::aes_256("temp-key")),
            BatchOperation::Activate(ActivateKeyRequest {
                unique_identifier: "temp-1".to_owned(),
            }),
            BatchOperation::Get(GetKeyRequest {
                unique_identifier: "temp-1".to_owned(),
            }),
            BatchOperation::Revoke(RevokeKeyRequest::cessation("temp-1")),
            BatchOperation::Destroy(DestroyKeyRequest {
                unique_identifier: "temp-1".to_owned(),
            }),
        ])
        .unwrap();

    assert_eq!(results.len(), 5);
    for result in &results {
        assert_eq!(result.unique_batch_item_id.len(), 16);
        assert!(result.result.is_ok(), "{:?} failed", result.operation);
    }
    match results[2].result.as_ref().unwrap() {
        BatchOutput::Got {
            unique_identifier,
            key_material,
            ..
        } => {
            assert_eq!(unique_identifier, "temp-1");
            assert_eq!(*key_material, hex::encode([0x5A_u8; 32]));
        }
        other => panic!("expected a Got output, have {other:?}"),
    }

    {
        // the frame reader consumed the response to the last byte and
        // the request buffer was drained: nothing is left to
        // desynchronize the next exchange
        let inner = probe.0.lock().unwrap();
        assert_eq!(inner.exchanges, 1);
        assert!(inner.pending.is_empty());
        assert!(inner.written.is_empty());
    }

    // the exchange did not poison the connection: a second batch (one
    // item, correlated by position) runs on the same stream
    let results = client
        .batch(&[BatchOperation::Locate(LocateRequest {
            name: "temp-key".to_owned(),
            attributes: Vec::new(),
        })])
        .unwrap();
    assert_eq!(results.len(), 1);
    match results[0].result.as_ref().unwrap() {
        BatchOutput::Located { unique_identifiers } => {
            assert_eq!(unique_identifiers, &vec!["temp-1".to_owned()]);
        }
        other => panic!("expected a Located output, have {other:?}"),
    }
    assert_eq!(probe.0.lock().unwrap().exchanges, 2);
}
