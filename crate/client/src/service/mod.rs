//! The two dialect services.
//!
//! Both implement the same [`KmipOperations`] contract; what differs is
//! the payload shapes they put on the wire. Runtime selection is driven
//! by the `service_type` configuration setting.

pub use kmip14::Kmip14Service;
pub use kmip20::Kmip20Service;

mod kmip14;
mod kmip20;

use kmsc_kmip::{
    kmip_0::kmip_types::Operation,
    message::{BatchItemOutcome, RequestBatchItem, RequestMessage, ResponseMessage},
    ttlv::TTLV,
};
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::{
    batch::BatchOutput,
    config::{ConfigurationSettings, ServiceType},
    error::{ClientError, ClientResult},
    ops::*,
    transport::KmipConnection,
};

/// One method per logical operation, plus the payload generators the
/// batch path uses to assemble multi-item requests.
pub trait KmipOperations {
    fn discover(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &DiscoverRequest,
    ) -> ClientResult<DiscoverResponse>;

    fn query(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &QueryRequest,
    ) -> ClientResult<QueryResponse>;

    fn create_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &CreateKeyRequest,
    ) -> ClientResult<CreateKeyResponse>;

    fn activate_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ActivateKeyRequest,
    ) -> ClientResult<ActivateKeyResponse>;

    fn get_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &GetKeyRequest,
    ) -> ClientResult<GetKeyResponse>;

    fn register(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &RegisterRequest,
    ) -> ClientResult<RegisterResponse>;

    fn locate(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &LocateRequest,
    ) -> ClientResult<LocateResponse>;

    fn revoke_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &RevokeKeyRequest,
    ) -> ClientResult<RevokeKeyResponse>;

    fn destroy_key(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &DestroyKeyRequest,
    ) -> ClientResult<DestroyKeyResponse>;

    fn rekey(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ReKeyRequest,
    ) -> ClientResult<ReKeyResponse>;

    fn get_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &GetAttributeRequest,
    ) -> ClientResult<GetAttributeResponse>;

    fn modify_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &ModifyAttributeRequest,
    ) -> ClientResult<ModifyAttributeResponse>;

    fn set_attribute(
        &self,
        conn: &mut KmipConnection,
        settings: &ConfigurationSettings,
        req: &SetAttributeRequest,
    ) -> ClientResult<SetAttributeResponse>;

    // Payload generators for the batch path. Each returns the
    // `RequestPayload` tree for one item.

    fn create_key_payload(&self, req: &CreateKeyRequest) -> ClientResult<TTLV>;
    fn activate_payload(&self, unique_identifier: &str) -> ClientResult<TTLV>;
    fn get_payload(&self, unique_identifier: &str) -> ClientResult<TTLV>;
    fn locate_payload(&self, req: &LocateRequest) -> ClientResult<TTLV>;
    fn revoke_payload(&self, req: &RevokeKeyRequest) -> ClientResult<TTLV>;
    fn destroy_payload(&self, unique_identifier: &str) -> ClientResult<TTLV>;
    fn rekey_payload(&self, unique_identifier: &str) -> ClientResult<TTLV>;

    /// Decode a successful batch item's payload into its typed output.
    fn decode_batch_item(
        &self,
        operation: Operation,
        payload: Option<&TTLV>,
    ) -> ClientResult<BatchOutput>;
}

/// The dialect service for a configured service type.
#[must_use]
pub fn service_for(service_type: ServiceType) -> &'static dyn KmipOperations {
    match service_type {
        ServiceType::Kmip14 => &Kmip14Service,
        ServiceType::Kmip20 => &Kmip20Service,
    }
}

pub(crate) fn encode_message(
    settings: &ConfigurationSettings,
    ttlv: &TTLV,
) -> ClientResult<Vec<u8>> {
    let bytes = match settings.service_type {
        ServiceType::Kmip14 => ttlv.to_bytes_1_4()?,
        ServiceType::Kmip20 => ttlv.to_bytes_2_0()?,
    };
    Ok(bytes)
}

pub(crate) fn decode_message(
    settings: &ConfigurationSettings,
    bytes: &[u8],
) -> ClientResult<TTLV> {
    let ttlv = match settings.service_type {
        ServiceType::Kmip14 => TTLV::from_bytes_1_4(bytes)?,
        ServiceType::Kmip20 => TTLV::from_bytes_2_0(bytes)?,
    };
    Ok(ttlv)
}

/// The single-operation send path.
///
/// Builds a one-item request, writes it, reads the response frame,
/// validates the headers and the item status, and returns the response
/// payload tree. Codec and protocol failures poison the connection;
/// server-reported failures do not.
pub(crate) fn send_request(
    conn: &mut KmipConnection,
    settings: &ConfigurationSettings,
    operation: Operation,
    payload: TTLV,
) -> ClientResult<TTLV> {
    let request = RequestMessage::build(
        settings.protocol_version(),
        vec![RequestBatchItem::new(operation, payload)],
    )?;
    let request_bytes = encode_message(settings, &request.to_ttlv())?;
    debug!(%operation, bytes = request_bytes.len(), "sending request");
    trace!(request = %hex::encode(&request_bytes), "request bytes");

    let mut response_bytes = conn.send(&request_bytes)?;
    let decoded = decode_message(settings, &response_bytes);
    // the frame may carry key material
    response_bytes.zeroize();
    let mut response_ttlv = match decoded {
        Ok(ttlv) => ttlv,
        Err(e) => {
            conn.poison();
            return Err(e);
        }
    };

    let response = match ResponseMessage::from_ttlv(&response_ttlv) {
        Ok(response) => response,
        Err(e) => {
            response_ttlv.zeroize_byte_strings();
            conn.poison();
            return Err(e.into());
        }
    };
    response_ttlv.zeroize_byte_strings();

    let item = response
        .batch_item
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Protocol("response carried no batch items".to_owned()))?;
    match item.outcome() {
        BatchItemOutcome::Success { .. } => {}
        BatchItemOutcome::OperationFailed { reason, message } => {
            debug!(%operation, ?reason, message, "server rejected the operation");
            return Err(ClientError::Operation { reason, message });
        }
    }
    item.response_payload
        .ok_or_else(|| ClientError::Protocol("successful item without a payload".to_owned()))
}

/// The batch send path: pre-assembled items in, the parsed and
/// correlation-checked response out.
pub(crate) fn send_batch(
    conn: &mut KmipConnection,
    settings: &ConfigurationSettings,
    items: Vec<RequestBatchItem>,
) -> ClientResult<(RequestMessage, ResponseMessage)> {
    let request = RequestMessage::build(settings.protocol_version(), items)?;
    let request_bytes = encode_message(settings, &request.to_ttlv())?;
    debug!(
        batch_count = request.request_header.batch_count,
        bytes = request_bytes.len(),
        "sending batch request"
    );

    let mut response_bytes = conn.send(&request_bytes)?;
    let decoded = decode_message(settings, &response_bytes);
    response_bytes.zeroize();
    let mut response_ttlv = match decoded {
        Ok(ttlv) => ttlv,
        Err(e) => {
            conn.poison();
            return Err(e);
        }
    };
    // from_ttlv clones each item payload out of this tree, so a batched
    // Get leaves a second copy of its key material here; scrub it on
    // both paths before the tree drops, as the single-send path does
    match ResponseMessage::from_ttlv(&response_ttlv) {
        Ok(response) => {
            response_ttlv.zeroize_byte_strings();
            Ok((request, response))
        }
        Err(e) => {
            response_ttlv.zeroize_byte_strings();
            conn.poison();
            Err(e.into())
        }
    }
}
