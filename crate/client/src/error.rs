use kmsc_kmip::{kmip_0::kmip_types::ResultReason, ttlv::TtlvError, KmipError};
use thiserror::Error;

/// The five error kinds of the client, each with its own propagation
/// policy:
///
/// * `Transport` and `Codec`/`Protocol` are fatal to the operation; the
///   two latter also poison the connection because stream sync is lost.
/// * `Operation` is the server saying no; the connection stays usable.
/// * `Usage` is rejected locally before any bytes are written.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("codec: {0}")]
    Codec(String),

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("operation failed ({}): {message}", reason_name(.reason))]
    Operation {
        reason: Option<ResultReason>,
        message: String,
    },

    #[error("usage: {0}")]
    Usage(String),
}

fn reason_name(reason: &Option<ResultReason>) -> String {
    reason.map_or_else(|| "unknown reason".to_owned(), |r| r.to_string())
}

impl From<TtlvError> for ClientError {
    fn from(e: TtlvError) -> Self {
        Self::Codec(e.to_string())
    }
}

impl From<KmipError> for ClientError {
    fn from(e: KmipError) -> Self {
        match e {
            KmipError::Ttlv(inner) => Self::Codec(inner.to_string()),
            KmipError::Protocol(message) => Self::Protocol(message),
            KmipError::NotSupported(message) => Self::Usage(message),
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
