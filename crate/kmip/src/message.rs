//! Request/response message framing and batch-item correlation.
//!
//! The messages in the protocol consist of a message header and one or
//! more batch items carrying operation payloads. Payloads enter and leave
//! this layer as [`TTLV`] trees; the dialect services own their typed
//! shapes. All fields are emitted in the order the KMIP specifications
//! require.

use tracing::trace;
use uuid::Uuid;

use crate::{
    kmip_0::{
        kmip_data_structures::date_time_child,
        kmip_types::{enum_child, Operation, ProtocolVersion, ResultReason, ResultStatus},
    },
    ttlv::TTLV,
    KmipError, KmipResult, KmipResultHelper,
};

/// Header of a request message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub protocol_version: ProtocolVersion,
    pub maximum_response_size: Option<i32>,
    pub client_correlation_value: Option<String>,
    /// Always set: the server must process items in request order for
    /// locate→revoke→destroy sequences to mean what they say.
    pub batch_order_option: bool,
    pub batch_count: i32,
}

/// One request batch item. The unique ID is mandatory as soon as the
/// message carries more than one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBatchItem {
    pub operation: Operation,
    pub unique_batch_item_id: Option<Vec<u8>>,
    pub request_payload: TTLV,
}

impl RequestBatchItem {
    #[must_use]
    pub const fn new(operation: Operation, request_payload: TTLV) -> Self {
        Self {
            operation,
            unique_batch_item_id: None,
            request_payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    pub request_header: RequestHeader,
    pub batch_item: Vec<RequestBatchItem>,
}

impl RequestMessage {
    /// Assemble a request message around the given items.
    ///
    /// `batch_count` is derived from the item list. When the batch holds
    /// more than one item, every item must carry a unique batch item ID;
    /// items that arrive without one are assigned a fresh 16-byte random
    /// identifier.
    pub fn build(
        protocol_version: ProtocolVersion,
        mut items: Vec<RequestBatchItem>,
    ) -> KmipResult<Self> {
        if items.is_empty() {
            return Err(KmipError::Protocol(
                "a request message needs at least one batch item".to_owned(),
            ));
        }
        let batch_count = i32::try_from(items.len()).context("too many batch items")?;
        if items.len() > 1 {
            for item in &mut items {
                match &item.unique_batch_item_id {
                    Some(id) if !id.is_empty() => {}
                    _ => {
                        item.unique_batch_item_id =
                            Some(Uuid::new_v4().as_bytes().to_vec());
                    }
                }
            }
        }
        Ok(Self {
            request_header: RequestHeader {
                protocol_version,
                maximum_response_size: None,
                client_correlation_value: None,
                batch_order_option: true,
                batch_count,
            },
            batch_item: items,
        })
    }

    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let header = &self.request_header;
        let mut header_items = vec![header.protocol_version.to_ttlv("ProtocolVersion")];
        if let Some(size) = header.maximum_response_size {
            header_items.push(TTLV::integer("MaximumResponseSize", size));
        }
        if let Some(value) = &header.client_correlation_value {
            header_items.push(TTLV::text_string("ClientCorrelationValue", value));
        }
        header_items.push(TTLV::boolean("BatchOrderOption", header.batch_order_option));
        header_items.push(TTLV::integer("BatchCount", header.batch_count));

        let mut items = vec![TTLV::structure("RequestHeader", header_items)];
        for item in &self.batch_item {
            let mut batch_children = vec![TTLV::enumeration("Operation", item.operation)];
            if let Some(id) = &item.unique_batch_item_id {
                batch_children.push(TTLV::byte_string("UniqueBatchItemID", id.clone()));
            }
            batch_children.push(item.request_payload.clone());
            items.push(TTLV::structure("BatchItem", batch_children));
        }
        TTLV::structure("RequestMessage", items)
    }
}

/// Header of a response message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub protocol_version: ProtocolVersion,
    pub time_stamp: Option<time::OffsetDateTime>,
    pub nonce: Option<Vec<u8>>,
    pub client_correlation_value: Option<String>,
    pub server_correlation_value: Option<String>,
    pub batch_count: i32,
}

/// One response batch item: operation echo, correlation ID echo, the
/// result triple, and the payload when the item succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBatchItem {
    pub operation: Option<Operation>,
    pub unique_batch_item_id: Option<Vec<u8>>,
    pub result_status: ResultStatus,
    pub result_reason: Option<ResultReason>,
    pub result_message: Option<String>,
    pub response_payload: Option<TTLV>,
}

/// What one batch item came back as, after the status triage.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchItemOutcome<'a> {
    Success {
        operation: Option<Operation>,
        payload: Option<&'a TTLV>,
    },
    OperationFailed {
        reason: Option<ResultReason>,
        message: String,
    },
}

impl ResponseBatchItem {
    #[must_use]
    pub fn outcome(&self) -> BatchItemOutcome<'_> {
        if self.result_status == ResultStatus::Success {
            BatchItemOutcome::Success {
                operation: self.operation,
                payload: self.response_payload.as_ref(),
            }
        } else {
            BatchItemOutcome::OperationFailed {
                reason: self.result_reason,
                message: self.result_message.clone().unwrap_or_default(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    pub response_header: ResponseHeader,
    pub batch_item: Vec<ResponseBatchItem>,
}

impl ResponseMessage {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        if ttlv.tag != "ResponseMessage" {
            return Err(KmipError::Protocol(format!(
                "expected a ResponseMessage, got `{}`",
                ttlv.tag
            )));
        }
        let header_ttlv = ttlv
            .child("ResponseHeader")
            .ok_or(KmipError::MissingField("ResponseHeader", "ResponseMessage"))?;
        let batch_count = header_ttlv
            .child("BatchCount")
            .ok_or(KmipError::MissingField("BatchCount", "ResponseHeader"))?
            .as_integer()?;
        let nonce = match header_ttlv.child("Nonce") {
            Some(item) => Some(item.as_bytes()?.to_vec()),
            None => None,
        };
        let text = |tag: &str| -> Result<Option<String>, KmipError> {
            match header_ttlv.child(tag) {
                Some(item) => Ok(Some(item.as_text()?.to_owned())),
                None => Ok(None),
            }
        };
        let response_header = ResponseHeader {
            protocol_version: ProtocolVersion::from_ttlv(
                header_ttlv
                    .child("ProtocolVersion")
                    .ok_or(KmipError::MissingField("ProtocolVersion", "ResponseHeader"))?,
            )?,
            time_stamp: date_time_child(header_ttlv, "TimeStamp")?,
            nonce,
            client_correlation_value: text("ClientCorrelationValue")?,
            server_correlation_value: text("ServerCorrelationValue")?,
            batch_count,
        };

        let mut batch_item = Vec::new();
        for item in ttlv.children_with_tag("BatchItem") {
            batch_item.push(Self::parse_batch_item(item)?);
        }
        if usize::try_from(batch_count).ok() != Some(batch_item.len()) {
            return Err(KmipError::Protocol(format!(
                "header announces {batch_count} batch items, message carries {}",
                batch_item.len()
            )));
        }
        trace!(batch_count, "parsed response message");
        Ok(Self {
            response_header,
            batch_item,
        })
    }

    fn parse_batch_item(item: &TTLV) -> Result<ResponseBatchItem, KmipError> {
        let operation = match enum_child(item, "Operation")? {
            Some(variant) => Some(Operation::from_variant(variant)?),
            None => None,
        };
        let unique_batch_item_id = match item.child("UniqueBatchItemID") {
            Some(id) => Some(id.as_bytes()?.to_vec()),
            None => None,
        };
        let result_status = enum_child(item, "ResultStatus")?
            .ok_or(KmipError::MissingField("ResultStatus", "BatchItem"))
            .and_then(ResultStatus::from_variant)?;
        let result_reason = match enum_child(item, "ResultReason")? {
            Some(variant) => Some(ResultReason::from_variant(variant)?),
            None => None,
        };
        let result_message = match item.child("ResultMessage") {
            Some(message) => Some(message.as_text()?.to_owned()),
            None => None,
        };
        Ok(ResponseBatchItem {
            operation,
            unique_batch_item_id,
            result_status,
            result_reason,
            result_message,
            response_payload: item.child("ResponsePayload").cloned(),
        })
    }
}

/// Pair each request item with its response item.
///
/// Matching is by unique batch item ID when the request carried one, by
/// position otherwise (both sides are ordered, `BatchOrderOption` is
/// always set). A request ID with no response item, or a response item
/// claimed twice, is a protocol error.
pub fn demux<'a>(
    request: &RequestMessage,
    response: &'a ResponseMessage,
) -> Result<Vec<&'a ResponseBatchItem>, KmipError> {
    if request.batch_item.len() != response.batch_item.len() {
        return Err(KmipError::Protocol(format!(
            "request carried {} items, response {}",
            request.batch_item.len(),
            response.batch_item.len()
        )));
    }
    let mut claimed = vec![false; response.batch_item.len()];
    let mut ordered = Vec::with_capacity(request.batch_item.len());
    for (position, request_item) in request.batch_item.iter().enumerate() {
        let index = match &request_item.unique_batch_item_id {
            Some(id) => response
                .batch_item
                .iter()
                .position(|item| item.unique_batch_item_id.as_ref() == Some(id))
                .ok_or_else(|| {
                    KmipError::Protocol(format!(
                        "no response item for batch item ID {}",
                        hex::encode(id)
                    ))
                })?,
            None => position,
        };
        let slot = claimed
            .get_mut(index)
            .ok_or_else(|| KmipError::Protocol("response item index out of range".to_owned()))?;
        if *slot {
            return Err(KmipError::Protocol(
                "response item claimed by two request items".to_owned(),
            ));
        }
        *slot = true;
        let item = response
            .batch_item
            .get(index)
            .ok_or_else(|| KmipError::Protocol("response item index out of range".to_owned()))?;
        ordered.push(item);
    }
    Ok(ordered)
}

#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ttlv::TTLV;

    fn payload() -> TTLV {
        TTLV::structure(
            "RequestPayload",
            vec![TTLV::text_string("UniqueIdentifier", "42")],
        )
    }

    fn response_item(id: Option<Vec<u8>>, uid: &str) -> ResponseBatchItem {
        ResponseBatchItem {
            operation: Some(Operation::Get),
            unique_batch_item_id: id,
            result_status: ResultStatus::Success,
            result_reason: None,
            result_message: None,
            response_payload: Some(TTLV::structure(
                "ResponsePayload",
                vec![TTLV::text_string("UniqueIdentifier", uid)],
            )),
        }
    }

    fn response(items: Vec<ResponseBatchItem>) -> ResponseMessage {
        let batch_count = i32::try_from(items.len()).unwrap();
        ResponseMessage {
            response_header: ResponseHeader {
                protocol_version: ProtocolVersion::KMIP_1_4,
                time_stamp: None,
                nonce: None,
                client_correlation_value: None,
                server_correlation_value: None,
                batch_count,
            },
            batch_item: items,
        }
    }

    #[test]
    fn single_item_keeps_no_forced_id() {
        let message = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![RequestBatchItem::new(Operation::Get, payload())],
        )
        .unwrap();
        assert_eq!(message.request_header.batch_count, 1);
        assert!(message.request_header.batch_order_option);
        assert!(message.batch_item[0].unique_batch_item_id.is_none());
    }

    #[test]
    fn multi_item_batch_assigns_unique_ids() {
        let message = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![
                RequestBatchItem::new(Operation::Create, payload()),
                RequestBatchItem::new(Operation::Activate, payload()),
                RequestBatchItem::new(Operation::Get, payload()),
            ],
        )
        .unwrap();
        assert_eq!(message.request_header.batch_count, 3);
        let ids: Vec<_> = message
            .batch_item
            .iter()
            .map(|item| item.unique_batch_item_id.clone().unwrap())
            .collect();
        assert!(ids.iter().all(|id| id.len() == 16));
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(RequestMessage::build(ProtocolVersion::KMIP_1_4, Vec::new()).is_err());
    }

    #[test]
    fn batch_count_mismatch_is_a_protocol_error() {
        let wire = TTLV::structure(
            "ResponseMessage",
            vec![
                TTLV::structure(
                    "ResponseHeader",
                    vec![
                        ProtocolVersion::KMIP_1_4.to_ttlv("ProtocolVersion"),
                        TTLV::integer("BatchCount", 2),
                    ],
                ),
                TTLV::structure(
                    "BatchItem",
                    vec![
                        TTLV::enumeration("Operation", Operation::Get),
                        TTLV::enumeration("ResultStatus", ResultStatus::Success),
                    ],
                ),
            ],
        );
        assert!(matches!(
            ResponseMessage::from_ttlv(&wire),
            Err(KmipError::Protocol(_))
        ));
    }

    #[test]
    fn demux_matches_by_id_out_of_order() {
        let mut request = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![
                RequestBatchItem::new(Operation::Create, payload()),
                RequestBatchItem::new(Operation::Get, payload()),
            ],
        )
        .unwrap();
        let id_0 = request.batch_item[0].unique_batch_item_id.clone();
        let id_1 = request.batch_item[1].unique_batch_item_id.clone();

        // server answered in reverse order
        let response = response(vec![
            response_item(id_1.clone(), "second"),
            response_item(id_0.clone(), "first"),
        ]);
        let ordered = demux(&request, &response).unwrap();
        assert_eq!(ordered[0].unique_batch_item_id, id_0);
        assert_eq!(ordered[1].unique_batch_item_id, id_1);

        // a missing ID is a protocol error
        request.batch_item[0].unique_batch_item_id = Some(vec![9; 16]);
        assert!(demux(&request, &response).is_err());
    }

    #[test]
    fn demux_is_a_bijection() {
        let request = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![
                RequestBatchItem::new(Operation::Create, payload()),
                RequestBatchItem::new(Operation::Get, payload()),
            ],
        )
        .unwrap();
        let id_0 = request.batch_item[0].unique_batch_item_id.clone();
        // both response items carry the first request's ID
        let response = response(vec![
            response_item(id_0.clone(), "a"),
            response_item(id_0, "b"),
        ]);
        assert!(demux(&request, &response).is_err());
    }

    #[test]
    fn demux_falls_back_to_position() {
        let request = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![RequestBatchItem::new(Operation::Get, payload())],
        )
        .unwrap();
        let response = response(vec![response_item(None, "only")]);
        let ordered = demux(&request, &response).unwrap();
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn outcome_maps_result_status() {
        let ok = response_item(None, "1");
        assert!(matches!(ok.outcome(), BatchItemOutcome::Success { .. }));

        let failed = ResponseBatchItem {
            operation: Some(Operation::Revoke),
            unique_batch_item_id: None,
            result_status: ResultStatus::OperationFailed,
            result_reason: Some(ResultReason::PermissionDenied),
            result_message: Some("object is not active".to_owned()),
            response_payload: None,
        };
        match failed.outcome() {
            BatchItemOutcome::OperationFailed { reason, message } => {
                assert_eq!(reason, Some(ResultReason::PermissionDenied));
                assert_eq!(message, "object is not active");
            }
            BatchItemOutcome::Success { .. } => panic!("expected a failure"),
        }
    }

    #[test]
    fn request_message_round_trips_through_bytes() {
        let request = RequestMessage::build(
            ProtocolVersion::KMIP_1_4,
            vec![RequestBatchItem::new(Operation::Query, payload())],
        )
        .unwrap();
        let ttlv = request.to_ttlv();
        let bytes = ttlv.to_bytes_1_4().unwrap();
        let back = TTLV::from_bytes_1_4(&bytes).unwrap();
        assert_eq!(ttlv, back);
    }
}
