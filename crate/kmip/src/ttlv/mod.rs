//! The TTLV (Tag-Type-Length-Value) codec.
//!
//! KMIP messages are trees of self-describing items: a 3-byte tag, a one
//! byte item type, a 4-byte length and the value bytes, zero-padded to
//! 8-byte alignment. [`TTLV`] is the in-memory form of one item; the
//! `wire` submodule moves it to and from bytes through a dialect's tag
//! registry.

pub mod error;
pub mod kmip_big_int;
pub mod ttlv_struct;
pub mod wire;

#[cfg(test)]
mod tests;

pub use error::TtlvError;
pub use kmip_big_int::KmipBigInt;
pub use ttlv_struct::{KmipEnumerationVariant, TTLValue, TtlvType, TTLV};
pub use wire::{KmipTag, TTLVBytesDeserializer, TTLVBytesSerializer};

use crate::{kmip_1_4, kmip_2_0};

impl TTLV {
    /// Serialize with the KMIP 1.4 tag registry.
    pub fn to_bytes_1_4(&self) -> Result<Vec<u8>, TtlvError> {
        let mut buffer = Vec::new();
        TTLVBytesSerializer::new(&mut buffer).write_ttlv::<kmip_1_4::kmip_types::Tag>(self)?;
        Ok(buffer)
    }

    /// Serialize with the KMIP 2.0 tag registry.
    pub fn to_bytes_2_0(&self) -> Result<Vec<u8>, TtlvError> {
        let mut buffer = Vec::new();
        TTLVBytesSerializer::new(&mut buffer).write_ttlv::<kmip_2_0::kmip_types::Tag>(self)?;
        Ok(buffer)
    }

    /// Deserialize one message with the KMIP 1.4 tag registry.
    pub fn from_bytes_1_4(bytes: &[u8]) -> Result<Self, TtlvError> {
        Self::from_bytes::<kmip_1_4::kmip_types::Tag>(bytes)
    }

    /// Deserialize one message with the KMIP 2.0 tag registry.
    pub fn from_bytes_2_0(bytes: &[u8]) -> Result<Self, TtlvError> {
        Self::from_bytes::<kmip_2_0::kmip_types::Tag>(bytes)
    }

    fn from_bytes<TAG: KmipTag>(bytes: &[u8]) -> Result<Self, TtlvError> {
        let (ttlv, consumed) = TTLVBytesDeserializer::new(bytes).read_ttlv::<TAG>()?;
        if consumed != bytes.len() {
            return Err(TtlvError::Alignment(format!(
                "{} trailing bytes after a complete message",
                bytes.len() - consumed
            )));
        }
        Ok(ttlv)
    }
}
