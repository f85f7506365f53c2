use std::str::FromStr;

use crate::{kmip_1_4, kmip_2_0, ttlv::TtlvError};

/// First tag value of the vendor-extension range.
pub const VENDOR_EXTENSION_BASE: u32 = 0x54_0000;

/// A dialect's 24-bit tag registry, used by the byte codec to resolve tag
/// names to wire values and back.
pub trait KmipTag: Copy + ToString + FromStr {
    /// Get a tag variant from its 24-bit wire value
    fn from_u32(tag_value: u32) -> Result<Self, TtlvError>
    where
        Self: Sized;

    /// Convert the tag to its 24-bit wire value
    fn to_u32(&self) -> u32;
}

impl KmipTag for kmip_1_4::kmip_types::Tag {
    fn from_u32(tag_value: u32) -> Result<Self, TtlvError> {
        Self::from_repr(tag_value).ok_or_else(|| TtlvError::UnknownTag(format!("0x{tag_value:06X}")))
    }

    #[allow(clippy::as_conversions)]
    // idiomatic for items marked #[repr(u32)]
    fn to_u32(&self) -> u32 {
        *self as u32
    }
}

impl KmipTag for kmip_2_0::kmip_types::Tag {
    fn from_u32(tag_value: u32) -> Result<Self, TtlvError> {
        Self::from_repr(tag_value).ok_or_else(|| TtlvError::UnknownTag(format!("0x{tag_value:06X}")))
    }

    #[allow(clippy::as_conversions)]
    // idiomatic for items marked #[repr(u32)]
    fn to_u32(&self) -> u32 {
        *self as u32
    }
}

/// Resolve a tag name to its wire value through the registry; `0xNNNNNN`
/// names (vendor extensions preserved by the decoder) bypass it.
pub(crate) fn tag_value<TAG: KmipTag>(tag_str: &str) -> Result<u32, TtlvError> {
    if let Some(hex_digits) = tag_str.strip_prefix("0x") {
        return u32::from_str_radix(hex_digits, 16)
            .map_err(|_e| TtlvError::UnknownTag(tag_str.to_owned()));
    }
    TAG::from_str(tag_str)
        .map(|tag| tag.to_u32())
        .map_err(|_e| TtlvError::UnknownTag(tag_str.to_owned()))
}

/// Resolve a wire value to a tag name; unknown values inside the vendor
/// extension range keep their hex spelling instead of failing the decode.
pub(crate) fn tag_name<TAG: KmipTag>(tag_value: u32) -> Result<String, TtlvError> {
    match TAG::from_u32(tag_value) {
        Ok(tag) => Ok(tag.to_string()),
        Err(_e) if tag_value >= VENDOR_EXTENSION_BASE => Ok(format!("0x{tag_value:06X}")),
        Err(e) => Err(e),
    }
}
