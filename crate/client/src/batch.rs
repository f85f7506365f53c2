//! The batch path: several logical operations in one request message,
//! processed by the server in order, demultiplexed back into per-item
//! results.

use kmsc_kmip::{
    kmip_0::kmip_types::{ObjectType, Operation},
    message::{demux, BatchItemOutcome, RequestBatchItem, ResponseMessage},
};
use tracing::debug;

use crate::{
    config::ConfigurationSettings,
    error::{ClientError, ClientResult},
    ops::{CreateKeyRequest, DestroyKeyRequest, GetKeyRequest, LocateRequest, RevokeKeyRequest},
    service::{send_batch, KmipOperations},
    transport::KmipConnection,
    ActivateKeyRequest, ReKeyRequest,
};

/// One logical operation in a batch: the tagged sum of the concrete
/// request types, one variant per supported operation.
#[derive(Debug)]
pub enum BatchOperation {
    Create(CreateKeyRequest),
    Activate(ActivateKeyRequest),
    Get(GetKeyRequest),
    Locate(LocateRequest),
    Revoke(RevokeKeyRequest),
    Destroy(DestroyKeyRequest),
    ReKey(ReKeyRequest),
}

impl BatchOperation {
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Activate(_) => Operation::Activate,
            Self::Get(_) => Operation::Get,
            Self::Locate(_) => Operation::Locate,
            Self::Revoke(_) => Operation::Revoke,
            Self::Destroy(_) => Operation::Destroy,
            Self::ReKey(_) => Operation::ReKey,
        }
    }
}

/// The typed output of one successful batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutput {
    Created {
        unique_identifier: String,
    },
    Activated {
        unique_identifier: String,
    },
    Got {
        object_type: ObjectType,
        unique_identifier: String,
        key_material: String,
    },
    Located {
        unique_identifiers: Vec<String>,
    },
    Revoked {
        unique_identifier: String,
    },
    Destroyed {
        unique_identifier: String,
    },
    ReKeyed {
        unique_identifier: String,
    },
    Other,
}

/// One per request item, in request order. A failed item does not fail
/// the batch call; it fails its own slot.
#[derive(Debug)]
pub struct BatchItemResult {
    pub operation: Operation,
    pub unique_batch_item_id: Vec<u8>,
    pub result: ClientResult<BatchOutput>,
}

pub(crate) fn execute_batch(
    conn: &mut KmipConnection,
    settings: &ConfigurationSettings,
    service: &dyn KmipOperations,
    operations: &[BatchOperation],
) -> ClientResult<Vec<BatchItemResult>> {
    if operations.is_empty() {
        return Err(ClientError::Usage("empty batch".to_owned()));
    }

    let mut items = Vec::with_capacity(operations.len());
    for op in operations {
        let payload = match op {
            BatchOperation::Create(req) => service.create_key_payload(req)?,
            BatchOperation::Activate(req) => service.activate_payload(&req.unique_identifier)?,
            BatchOperation::Get(req) => service.get_payload(&req.unique_identifier)?,
            BatchOperation::Locate(req) => service.locate_payload(req)?,
            BatchOperation::Revoke(req) => service.revoke_payload(req)?,
            BatchOperation::Destroy(req) => service.destroy_payload(&req.unique_identifier)?,
            BatchOperation::ReKey(req) => service.rekey_payload(&req.unique_identifier)?,
        };
        items.push(RequestBatchItem::new(op.operation(), payload));
    }

    let (request, mut response) = send_batch(conn, settings, items)?;
    debug!(items = response.batch_item.len(), "batch response received");

    let results = {
        let ordered = demux(&request, &response).map_err(|e| {
            conn.poison();
            ClientError::from(e)
        })?;
        request
            .batch_item
            .iter()
            .zip(ordered)
            .map(|(request_item, response_item)| {
                let result = match response_item.outcome() {
                    BatchItemOutcome::Success { payload, .. } => {
                        service.decode_batch_item(request_item.operation, payload)
                    }
                    BatchItemOutcome::OperationFailed { reason, message } => {
                        Err(ClientError::Operation { reason, message })
                    }
                };
                BatchItemResult {
                    operation: request_item.operation,
                    unique_batch_item_id: request_item
                        .unique_batch_item_id
                        .clone()
                        .unwrap_or_default(),
                    result,
                }
            })
            .collect::<Vec<_>>()
    };

    scrub_response(&mut response);

    Ok(results)
}

/// Scrub the payload copies a [`ResponseMessage`] holds; a batched Get
/// leaves key material in them. This covers the message the batch path
/// keeps for decoding; the transient decode tree it was parsed from is
/// scrubbed inside `send_batch` itself.
pub(crate) fn scrub_response(response: &mut ResponseMessage) {
    for item in &mut response.batch_item {
        if let Some(payload) = &mut item.response_payload {
            payload.zeroize_byte_strings();
        }
    }
}

#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
#[cfg(test)]
mod tests {
    use kmsc_kmip::{
        kmip_0::kmip_types::{ProtocolVersion, ResultStatus},
        message::{ResponseBatchItem, ResponseHeader, ResponseMessage},
        ttlv::TTLV,
    };

    use super::scrub_response;

    #[test]
    fn scrub_response_zeroizes_every_payload_byte_string() {
        let mut response = ResponseMessage {
            response_header: ResponseHeader {
                protocol_version: ProtocolVersion::KMIP_1_4,
                time_stamp: None,
                nonce: None,
                client_correlation_value: None,
                server_correlation_value: None,
                batch_count: 1,
            },
            batch_item: vec![ResponseBatchItem {
                operation: Some(kmsc_kmip::kmip_0::kmip_types::Operation::Get),
                unique_batch_item_id: None,
                result_status: ResultStatus::Success,
                result_reason: None,
                result_message: None,
                response_payload: Some(TTLV::structure(
                    "ResponsePayload",
                    vec![TTLV::structure(
                        "KeyValue",
                        vec![TTLV::byte_string("KeyMaterial", vec![0xAA; 32])],
                    )],
                )),
            }],
        };

        scrub_response(&mut response);

        let material = response.batch_item[0]
            .response_payload
            .as_ref()
            .unwrap()
            .child("KeyValue")
            .unwrap()
            .child("KeyMaterial")
            .unwrap()
            .as_bytes()
            .unwrap();
        assert_eq!(material, vec![0_u8; 32].as_slice());
    }
}
