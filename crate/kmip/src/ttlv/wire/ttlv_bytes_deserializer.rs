use std::io::Read;

use time::OffsetDateTime;

use crate::ttlv::{
    error::TtlvError,
    kmip_big_int::KmipBigInt,
    wire::kmip_tag::{tag_name, KmipTag},
    KmipEnumerationVariant, TTLValue, TtlvType, TTLV,
};

const fn padded(length: usize) -> usize {
    length + (8 - length % 8) % 8
}

/// Deserializes the KMIP byte form back into a [`TTLV`] tree.
///
/// Strict about the layout invariants: item lengths must match the item
/// type, structure contents must stay 8-byte aligned, and padding bytes
/// must be zero. Any violation means the stream is out of sync.
pub struct TTLVBytesDeserializer<R> {
    reader: R,
}

impl<R> TTLVBytesDeserializer<R>
where
    R: Read,
{
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one complete TTLV item; returns the item and the total number
    /// of bytes consumed (header + value + padding).
    pub fn read_ttlv<TAG: KmipTag>(&mut self) -> Result<(TTLV, usize), TtlvError> {
        // Tag (3 bytes)
        let mut tag_bytes = [0_u8; 3];
        self.reader.read_exact(&mut tag_bytes)?;
        let tag_value = u32::from_be_bytes([0, tag_bytes[0], tag_bytes[1], tag_bytes[2]]);
        let tag = tag_name::<TAG>(tag_value)?;

        // Type (1 byte)
        let mut type_byte = [0_u8; 1];
        self.reader.read_exact(&mut type_byte)?;
        let item_type = TtlvType::try_from(type_byte[0])?;

        // Length (4 bytes)
        let mut buf4 = [0_u8; 4];
        self.reader.read_exact(&mut buf4)?;
        let length = usize::try_from(u32::from_be_bytes(buf4))
            .map_err(|_e| TtlvError::from("length does not fit in usize"))?;

        // Value, padded to 8 bytes
        let (value, value_len) = match item_type {
            TtlvType::Structure => {
                if length % 8 != 0 {
                    return Err(TtlvError::Alignment(format!(
                        "structure `{tag}` length {length} is not a multiple of 8"
                    )));
                }
                let mut items = Vec::new();
                let mut remaining = length;
                while remaining > 0 {
                    let (item, size) = self.read_ttlv::<TAG>()?;
                    if size > remaining {
                        return Err(TtlvError::Alignment(format!(
                            "children of structure `{tag}` overrun its length"
                        )));
                    }
                    remaining -= size;
                    items.push(item);
                }
                (TTLValue::Structure(items), length)
            }
            TtlvType::Integer => {
                self.expect_length(&tag, item_type, length, 4)?;
                let mut buf = [0_u8; 4];
                self.reader.read_exact(&mut buf)?;
                let value = TTLValue::Integer(i32::from_be_bytes(buf));
                self.read_padding(&tag, 4)?;
                (value, 8)
            }
            TtlvType::LongInteger => {
                self.expect_length(&tag, item_type, length, 8)?;
                let mut buf = [0_u8; 8];
                self.reader.read_exact(&mut buf)?;
                (TTLValue::LongInteger(i64::from_be_bytes(buf)), 8)
            }
            TtlvType::BigInteger => {
                if length == 0 || length % 8 != 0 {
                    return Err(TtlvError::Alignment(format!(
                        "big integer `{tag}` length {length} is not a non-zero multiple of 8"
                    )));
                }
                let mut buf = vec![0_u8; length];
                self.reader.read_exact(&mut buf)?;
                (
                    TTLValue::BigInteger(KmipBigInt::from_signed_bytes_be(&buf)),
                    length,
                )
            }
            TtlvType::Enumeration => {
                self.expect_length(&tag, item_type, length, 4)?;
                let mut buf = [0_u8; 4];
                self.reader.read_exact(&mut buf)?;
                let value = TTLValue::Enumeration(KmipEnumerationVariant {
                    value: u32::from_be_bytes(buf),
                    name: String::new(),
                });
                self.read_padding(&tag, 4)?;
                (value, 8)
            }
            TtlvType::Boolean => {
                self.expect_length(&tag, item_type, length, 8)?;
                let mut buf = [0_u8; 8];
                self.reader.read_exact(&mut buf)?;
                let flag = buf.last().copied().unwrap_or_default() != 0;
                (TTLValue::Boolean(flag), 8)
            }
            TtlvType::TextString => {
                let mut buf = vec![0_u8; length];
                self.reader.read_exact(&mut buf)?;
                let value = TTLValue::TextString(String::from_utf8(buf)?);
                self.read_padding(&tag, length)?;
                (value, padded(length))
            }
            TtlvType::ByteString => {
                let mut buf = vec![0_u8; length];
                self.reader.read_exact(&mut buf)?;
                let value = TTLValue::ByteString(buf);
                self.read_padding(&tag, length)?;
                (value, padded(length))
            }
            TtlvType::DateTime => {
                self.expect_length(&tag, item_type, length, 8)?;
                let mut buf = [0_u8; 8];
                self.reader.read_exact(&mut buf)?;
                let timestamp = i64::from_be_bytes(buf);
                let t = OffsetDateTime::from_unix_timestamp(timestamp)
                    .map_err(|e| TtlvError::from(format!("invalid DateTime `{tag}`: {e}")))?;
                (TTLValue::DateTime(t), 8)
            }
            TtlvType::Interval => {
                self.expect_length(&tag, item_type, length, 4)?;
                let mut buf = [0_u8; 4];
                self.reader.read_exact(&mut buf)?;
                let value = TTLValue::Interval(u32::from_be_bytes(buf));
                self.read_padding(&tag, 4)?;
                (value, 8)
            }
        };

        Ok((TTLV { tag, value }, 8 + value_len))
    }

    fn expect_length(
        &self,
        tag: &str,
        item_type: TtlvType,
        found: usize,
        expected: usize,
    ) -> Result<(), TtlvError> {
        if found == expected {
            return Ok(());
        }
        Err(TtlvError::TypeMismatch {
            tag: tag.to_owned(),
            expected: format!("{expected}-byte {item_type}"),
            found: format!("length {found}"),
        })
    }

    /// Consume the zero padding that completes a `length`-byte value to the
    /// next multiple of 8.
    fn read_padding(&mut self, tag: &str, length: usize) -> Result<(), TtlvError> {
        let padding = (8 - length % 8) % 8;
        if padding == 0 {
            return Ok(());
        }
        let mut buf = [0_u8; 7];
        let pad = buf
            .get_mut(..padding)
            .ok_or_else(|| TtlvError::from("padding larger than 7 bytes"))?;
        self.reader.read_exact(pad)?;
        if pad.iter().any(|b| *b != 0) {
            return Err(TtlvError::Alignment(format!(
                "non-zero padding after `{tag}`"
            )));
        }
        Ok(())
    }
}
