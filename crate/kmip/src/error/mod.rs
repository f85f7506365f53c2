use thiserror::Error;

use crate::{kmip_0::kmip_types::ResultReason, ttlv::TtlvError};

pub(crate) mod result;

#[derive(Error, Debug)]
pub enum KmipError {
    #[error(transparent)]
    Ttlv(#[from] TtlvError),

    #[error("invalid {0} enumeration value: 0x{1:08X}")]
    InvalidEnumValue(&'static str, u32),

    #[error("missing `{0}` in `{1}`")]
    MissingField(&'static str, &'static str),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("Not Supported: {0}")]
    NotSupported(String),

    #[error("Invalid KMIP value: {0}: {1}")]
    InvalidKmipValue(ResultReason, String),

    #[error("{0}")]
    Default(String),
}

impl KmipError {
    #[must_use]
    pub fn reason(&self, reason: ResultReason) -> Self {
        match self {
            Self::InvalidKmipValue(_r, e) => Self::InvalidKmipValue(reason, e.clone()),
            e => Self::InvalidKmipValue(reason, e.to_string()),
        }
    }
}

impl From<String> for KmipError {
    fn from(value: String) -> Self {
        Self::Default(value)
    }
}
