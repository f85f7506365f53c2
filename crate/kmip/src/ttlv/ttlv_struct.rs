use std::fmt;

use time::OffsetDateTime;

use super::{error::TtlvError, kmip_big_int::KmipBigInt};

/// One TTLV item: a tag (registry name, or `0xNNNNNN` for vendor
/// extensions) and a value.
///
/// This tree is the pivot of the whole protocol engine: typed operation
/// payloads build it, the wire layer turns it into bytes and back.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct TTLV {
    pub tag: String,
    pub value: TTLValue,
}

/// The value of a TTLV item, one variant per KMIP item type.
#[derive(Debug, Clone)]
pub enum TTLValue {
    Structure(Vec<TTLV>),
    Integer(i32),
    LongInteger(i64),
    BigInteger(KmipBigInt),
    Enumeration(KmipEnumerationVariant),
    Boolean(bool),
    TextString(String),
    ByteString(Vec<u8>),
    DateTime(OffsetDateTime),
    Interval(u32),
}

impl Default for TTLValue {
    fn default() -> Self {
        Self::TextString(String::default())
    }
}

impl PartialEq for TTLValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Structure(l0), Self::Structure(r0)) => l0 == r0,
            (Self::Integer(l0), Self::Integer(r0)) => l0 == r0,
            (Self::LongInteger(l0), Self::LongInteger(r0)) => l0 == r0,
            (Self::BigInteger(l0), Self::BigInteger(r0)) => l0 == r0,
            (Self::Enumeration(l0), Self::Enumeration(r0)) => l0 == r0,
            (Self::Boolean(l0), Self::Boolean(r0)) => l0 == r0,
            (Self::TextString(l0), Self::TextString(r0)) => l0 == r0,
            (Self::ByteString(l0), Self::ByteString(r0)) => l0 == r0,
            (Self::DateTime(l0), Self::DateTime(r0)) => {
                l0.unix_timestamp() == r0.unix_timestamp()
            }
            (Self::Interval(l0), Self::Interval(r0)) => l0 == r0,
            (_, _) => false,
        }
    }
}

impl Eq for TTLValue {}

/// An enumeration on the wire is a bare 32-bit value; the name is registry
/// metadata that never travels. Equality therefore compares values only.
#[derive(Debug, Clone, Default)]
pub struct KmipEnumerationVariant {
    pub value: u32,
    pub name: String,
}

impl PartialEq for KmipEnumerationVariant {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for KmipEnumerationVariant {}

impl From<u32> for KmipEnumerationVariant {
    fn from(value: u32) -> Self {
        Self {
            value,
            name: String::new(),
        }
    }
}

impl fmt::Display for KmipEnumerationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "0x{:08X}", self.value)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Item type codes, KMIP 1.4 §9.1.1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TtlvType {
    Structure = 0x01,
    Integer = 0x02,
    LongInteger = 0x03,
    BigInteger = 0x04,
    Enumeration = 0x05,
    Boolean = 0x06,
    TextString = 0x07,
    ByteString = 0x08,
    DateTime = 0x09,
    Interval = 0x0A,
}

impl TtlvType {
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TtlvType {
    type Error = TtlvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Structure),
            0x02 => Ok(Self::Integer),
            0x03 => Ok(Self::LongInteger),
            0x04 => Ok(Self::BigInteger),
            0x05 => Ok(Self::Enumeration),
            0x06 => Ok(Self::Boolean),
            0x07 => Ok(Self::TextString),
            0x08 => Ok(Self::ByteString),
            0x09 => Ok(Self::DateTime),
            0x0A => Ok(Self::Interval),
            t => Err(TtlvError::InvalidType(t)),
        }
    }
}

impl fmt::Display for TtlvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structure => "Structure",
            Self::Integer => "Integer",
            Self::LongInteger => "LongInteger",
            Self::BigInteger => "BigInteger",
            Self::Enumeration => "Enumeration",
            Self::Boolean => "Boolean",
            Self::TextString => "TextString",
            Self::ByteString => "ByteString",
            Self::DateTime => "DateTime",
            Self::Interval => "Interval",
        };
        write!(f, "{name}")
    }
}

impl TTLV {
    #[must_use]
    pub fn structure(tag: impl Into<String>, items: Vec<TTLV>) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::Structure(items),
        }
    }

    #[must_use]
    pub fn integer(tag: impl Into<String>, value: i32) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::Integer(value),
        }
    }

    #[must_use]
    pub fn long_integer(tag: impl Into<String>, value: i64) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::LongInteger(value),
        }
    }

    #[must_use]
    pub fn big_integer(tag: impl Into<String>, value: KmipBigInt) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::BigInteger(value),
        }
    }

    #[must_use]
    pub fn enumeration(tag: impl Into<String>, value: impl Into<KmipEnumerationVariant>) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::Enumeration(value.into()),
        }
    }

    #[must_use]
    pub fn boolean(tag: impl Into<String>, value: bool) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::Boolean(value),
        }
    }

    #[must_use]
    pub fn text_string(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::TextString(value.into()),
        }
    }

    #[must_use]
    pub fn byte_string(tag: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::ByteString(value),
        }
    }

    #[must_use]
    pub fn date_time(tag: impl Into<String>, value: OffsetDateTime) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::DateTime(value),
        }
    }

    #[must_use]
    pub fn interval(tag: impl Into<String>, value: u32) -> Self {
        Self {
            tag: tag.into(),
            value: TTLValue::Interval(value),
        }
    }

    #[must_use]
    pub const fn item_type(&self) -> TtlvType {
        match &self.value {
            TTLValue::Structure(_) => TtlvType::Structure,
            TTLValue::Integer(_) => TtlvType::Integer,
            TTLValue::LongInteger(_) => TtlvType::LongInteger,
            TTLValue::BigInteger(_) => TtlvType::BigInteger,
            TTLValue::Enumeration(_) => TtlvType::Enumeration,
            TTLValue::Boolean(_) => TtlvType::Boolean,
            TTLValue::TextString(_) => TtlvType::TextString,
            TTLValue::ByteString(_) => TtlvType::ByteString,
            TTLValue::DateTime(_) => TtlvType::DateTime,
            TTLValue::Interval(_) => TtlvType::Interval,
        }
    }

    fn type_mismatch(&self, expected: TtlvType) -> TtlvError {
        TtlvError::TypeMismatch {
            tag: self.tag.clone(),
            expected: expected.to_string(),
            found: self.item_type().to_string(),
        }
    }

    pub fn children(&self) -> Result<&[TTLV], TtlvError> {
        match &self.value {
            TTLValue::Structure(items) => Ok(items),
            _ => Err(self.type_mismatch(TtlvType::Structure)),
        }
    }

    /// First child with the given tag, if any.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&TTLV> {
        match &self.value {
            TTLValue::Structure(items) => items.iter().find(|item| item.tag == tag),
            _ => None,
        }
    }

    pub fn child_required(&self, tag: &str) -> Result<&TTLV, TtlvError> {
        self.child(tag)
            .ok_or_else(|| TtlvError::MissingChild(tag.to_owned(), self.tag.clone()))
    }

    /// All children with the given tag, in document order.
    #[must_use]
    pub fn children_with_tag(&self, tag: &str) -> Vec<&TTLV> {
        match &self.value {
            TTLValue::Structure(items) => items.iter().filter(|item| item.tag == tag).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_integer(&self) -> Result<i32, TtlvError> {
        match &self.value {
            TTLValue::Integer(v) => Ok(*v),
            _ => Err(self.type_mismatch(TtlvType::Integer)),
        }
    }

    pub fn as_long_integer(&self) -> Result<i64, TtlvError> {
        match &self.value {
            TTLValue::LongInteger(v) => Ok(*v),
            _ => Err(self.type_mismatch(TtlvType::LongInteger)),
        }
    }

    pub fn as_enumeration(&self) -> Result<&KmipEnumerationVariant, TtlvError> {
        match &self.value {
            TTLValue::Enumeration(v) => Ok(v),
            _ => Err(self.type_mismatch(TtlvType::Enumeration)),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, TtlvError> {
        match &self.value {
            TTLValue::Boolean(v) => Ok(*v),
            _ => Err(self.type_mismatch(TtlvType::Boolean)),
        }
    }

    pub fn as_text(&self) -> Result<&str, TtlvError> {
        match &self.value {
            TTLValue::TextString(v) => Ok(v),
            _ => Err(self.type_mismatch(TtlvType::TextString)),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], TtlvError> {
        match &self.value {
            TTLValue::ByteString(v) => Ok(v),
            _ => Err(self.type_mismatch(TtlvType::ByteString)),
        }
    }

    pub fn as_date_time(&self) -> Result<OffsetDateTime, TtlvError> {
        match &self.value {
            TTLValue::DateTime(v) => Ok(*v),
            _ => Err(self.type_mismatch(TtlvType::DateTime)),
        }
    }

    pub fn as_interval(&self) -> Result<u32, TtlvError> {
        match &self.value {
            TTLValue::Interval(v) => Ok(*v),
            _ => Err(self.type_mismatch(TtlvType::Interval)),
        }
    }

    /// Overwrite every ByteString in the tree with zeros.
    ///
    /// Response trees that carried key material go through this before they
    /// are dropped.
    pub fn zeroize_byte_strings(&mut self) {
        use zeroize::Zeroize;
        match &mut self.value {
            TTLValue::ByteString(bytes) => bytes.zeroize(),
            TTLValue::Structure(items) => {
                for item in items {
                    item.zeroize_byte_strings();
                }
            }
            _ => {}
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match &self.value {
            TTLValue::Structure(items) => {
                writeln!(f, "{pad}{} (Structure/{}):", self.tag, items.len())?;
                for item in items {
                    item.fmt_indented(f, indent + 1)?;
                }
                Ok(())
            }
            TTLValue::Integer(v) => writeln!(f, "{pad}{} (Integer): {v}", self.tag),
            TTLValue::LongInteger(v) => writeln!(f, "{pad}{} (LongInteger): {v}", self.tag),
            TTLValue::BigInteger(v) => writeln!(f, "{pad}{} (BigInteger): {v}", self.tag),
            TTLValue::Enumeration(v) => writeln!(f, "{pad}{} (Enumeration): {v}", self.tag),
            TTLValue::Boolean(v) => writeln!(f, "{pad}{} (Boolean): {v}", self.tag),
            TTLValue::TextString(v) => writeln!(f, "{pad}{} (TextString): {v}", self.tag),
            TTLValue::ByteString(v) => {
                writeln!(f, "{pad}{} (ByteString/{}): 0x{}", self.tag, v.len(), hex::encode(v))
            }
            TTLValue::DateTime(v) => writeln!(f, "{pad}{} (DateTime): {v}", self.tag),
            TTLValue::Interval(v) => writeln!(f, "{pad}{} (Interval): {v}", self.tag),
        }
    }
}

impl fmt::Display for TTLV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
