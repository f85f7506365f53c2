use std::io::Write;

use crate::ttlv::{
    error::TtlvError,
    wire::kmip_tag::{tag_value, KmipTag},
    TTLValue, TtlvType, TTLV,
};

/// Write a tag as a 3-byte big-endian integer
fn write_tag<W: Write, TAG: KmipTag>(writer: &mut W, tag_str: &str) -> Result<(), TtlvError> {
    let value = tag_value::<TAG>(tag_str)?;
    let tag_bytes = value.to_be_bytes();
    // only the lowest 3 bytes travel
    writer.write_all(tag_bytes.get(1..).unwrap_or_default())?;
    Ok(())
}

/// Write a type as a 1-byte integer
fn write_type<W: Write>(writer: &mut W, item_type: TtlvType) -> Result<(), TtlvError> {
    writer.write_all(&[item_type.to_byte()])?;
    Ok(())
}

/// Write a length as a 4-byte big-endian integer
fn write_length<W: Write>(writer: &mut W, length: usize) -> Result<(), TtlvError> {
    let l = u32::try_from(length)
        .map_err(|_e| TtlvError::from(format!("length too large: {length}")))?;
    writer.write_all(&l.to_be_bytes())?;
    Ok(())
}

/// Zero-pad a value of `length` bytes to the next multiple of 8.
/// Padding bytes are not counted in the item's length field.
fn write_padding<W: Write>(writer: &mut W, length: usize) -> Result<(), TtlvError> {
    let padding = (8 - length % 8) % 8;
    if padding != 0 {
        writer.write_all(&[0_u8; 7][..padding])?;
    }
    Ok(())
}

/// Serializes a [`TTLV`] tree into the KMIP byte form, resolving tag names
/// through the `TAG` registry of the active dialect.
pub struct TTLVBytesSerializer<W> {
    writer: W,
}

impl<W> TTLVBytesSerializer<W>
where
    W: Write,
{
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_ttlv<TAG: KmipTag>(&mut self, ttlv: &TTLV) -> Result<(), TtlvError> {
        // Tag (3 bytes)
        write_tag::<W, TAG>(&mut self.writer, &ttlv.tag)?;

        match &ttlv.value {
            TTLValue::Structure(items) => {
                write_type(&mut self.writer, TtlvType::Structure)?;
                // serialize children to a scratch buffer to learn the length
                let mut nested = Vec::new();
                let mut nested_serializer = TTLVBytesSerializer::new(&mut nested);
                for item in items {
                    nested_serializer.write_ttlv::<TAG>(item)?;
                }
                write_length(&mut self.writer, nested.len())?;
                self.writer.write_all(&nested)?;
            }
            TTLValue::Integer(value) => {
                write_type(&mut self.writer, TtlvType::Integer)?;
                write_length(&mut self.writer, 4)?;
                self.writer.write_all(&value.to_be_bytes())?;
                write_padding(&mut self.writer, 4)?;
            }
            TTLValue::LongInteger(value) => {
                write_type(&mut self.writer, TtlvType::LongInteger)?;
                write_length(&mut self.writer, 8)?;
                self.writer.write_all(&value.to_be_bytes())?;
            }
            TTLValue::BigInteger(value) => {
                // already sign-extended to a multiple of 8
                let bytes = value.to_signed_bytes_be();
                write_type(&mut self.writer, TtlvType::BigInteger)?;
                write_length(&mut self.writer, bytes.len())?;
                self.writer.write_all(&bytes)?;
            }
            TTLValue::Enumeration(variant) => {
                write_type(&mut self.writer, TtlvType::Enumeration)?;
                write_length(&mut self.writer, 4)?;
                self.writer.write_all(&variant.value.to_be_bytes())?;
                write_padding(&mut self.writer, 4)?;
            }
            TTLValue::Boolean(value) => {
                write_type(&mut self.writer, TtlvType::Boolean)?;
                write_length(&mut self.writer, 8)?;
                // booleans are encoded on 8 bytes
                let buf = [0, 0, 0, 0, 0, 0, 0, u8::from(*value)];
                self.writer.write_all(&buf)?;
            }
            TTLValue::TextString(value) => {
                write_type(&mut self.writer, TtlvType::TextString)?;
                let utf8_bytes = value.as_bytes();
                write_length(&mut self.writer, utf8_bytes.len())?;
                self.writer.write_all(utf8_bytes)?;
                write_padding(&mut self.writer, utf8_bytes.len())?;
            }
            TTLValue::ByteString(value) => {
                write_type(&mut self.writer, TtlvType::ByteString)?;
                write_length(&mut self.writer, value.len())?;
                self.writer.write_all(value)?;
                write_padding(&mut self.writer, value.len())?;
            }
            TTLValue::DateTime(value) => {
                write_type(&mut self.writer, TtlvType::DateTime)?;
                write_length(&mut self.writer, 8)?;
                self.writer
                    .write_all(&value.unix_timestamp().to_be_bytes())?;
            }
            TTLValue::Interval(value) => {
                write_type(&mut self.writer, TtlvType::Interval)?;
                write_length(&mut self.writer, 4)?;
                self.writer.write_all(&value.to_be_bytes())?;
                write_padding(&mut self.writer, 4)?;
            }
        }
        Ok(())
    }
}
