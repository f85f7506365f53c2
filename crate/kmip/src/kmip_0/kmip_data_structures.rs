use time::OffsetDateTime;
use zeroize::Zeroizing;

use super::kmip_types::{
    enum_child, CryptographicAlgorithm, DestroyAction, KeyFormatType, NameType, ObjectType,
    RNGMode, RevocationReasonCode, SecretDataType, ShreddingAlgorithm, UnwrapMode,
};
use crate::{
    ttlv::{KmipEnumerationVariant, TTLValue, TTLV},
    KmipError,
};

/// KMIP 1.4 §3.2 Name attribute: a value and its interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub name_value: String,
    pub name_type: NameType,
}

impl Name {
    #[must_use]
    pub fn uninterpreted(value: impl Into<String>) -> Self {
        Self {
            name_value: value.into(),
            name_type: NameType::UninterpretedTextString,
        }
    }

    #[must_use]
    pub fn to_ttlv(&self, tag: &str) -> TTLV {
        TTLV::structure(
            tag,
            vec![
                TTLV::text_string("NameValue", &self.name_value),
                TTLV::enumeration("NameType", self.name_type),
            ],
        )
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let name_type = match enum_child(ttlv, "NameType")? {
            Some(variant) => NameType::from_variant(variant)?,
            None => NameType::UninterpretedTextString,
        };
        Ok(Self {
            name_value: ttlv.child_required("NameValue")?.as_text()?.to_owned(),
            name_type,
        })
    }
}

/// The value carried by an attribute. The wire type follows the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    TextString(String),
    Integer(i32),
    Enumeration(KmipEnumerationVariant),
    Name(Name),
}

impl AttributeValue {
    #[must_use]
    pub fn to_ttlv(&self, tag: &str) -> TTLV {
        match self {
            Self::TextString(value) => TTLV::text_string(tag, value),
            Self::Integer(value) => TTLV::integer(tag, *value),
            Self::Enumeration(variant) => TTLV::enumeration(tag, variant.clone()),
            Self::Name(name) => name.to_ttlv(tag),
        }
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(match &ttlv.value {
            TTLValue::TextString(value) => Self::TextString(value.clone()),
            TTLValue::Integer(value) => Self::Integer(*value),
            TTLValue::Enumeration(variant) => Self::Enumeration(variant.clone()),
            TTLValue::Structure(_) => Self::Name(Name::from_ttlv(ttlv)?),
            other => {
                return Err(KmipError::Protocol(format!(
                    "unsupported attribute value type: {other:?}"
                )))
            }
        })
    }

    pub fn render(&self) -> String {
        match self {
            Self::TextString(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Enumeration(variant) => variant.to_string(),
            Self::Name(name) => name.name_value.clone(),
        }
    }
}

/// KMIP 1.4 §2.1.1 Attribute object: name, optional index, value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attribute_name: String,
    pub attribute_index: Option<i32>,
    pub attribute_value: AttributeValue,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            attribute_name: name.into(),
            attribute_index: None,
            attribute_value: value,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::TextString(value.into()))
    }

    #[must_use]
    pub fn to_ttlv(&self, tag: &str) -> TTLV {
        let mut items = vec![TTLV::text_string("AttributeName", &self.attribute_name)];
        if let Some(index) = self.attribute_index {
            items.push(TTLV::integer("AttributeIndex", index));
        }
        items.push(self.attribute_value.to_ttlv("AttributeValue"));
        TTLV::structure(tag, items)
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let attribute_index = match ttlv.child("AttributeIndex") {
            Some(item) => Some(item.as_integer()?),
            None => None,
        };
        Ok(Self {
            attribute_name: ttlv
                .child_required("AttributeName")?
                .as_text()?
                .to_owned(),
            attribute_index,
            attribute_value: AttributeValue::from_ttlv(ttlv.child_required("AttributeValue")?)?,
        })
    }
}

/// KMIP 1.4 §2.1.9 Revocation Reason: a code and an optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationReason {
    pub revocation_reason_code: RevocationReasonCode,
    pub revocation_message: Option<String>,
}

impl RevocationReason {
    #[must_use]
    pub const fn code(code: RevocationReasonCode) -> Self {
        Self {
            revocation_reason_code: code,
            revocation_message: None,
        }
    }

    /// The 2.0 dialect dropped `RevocationMessage`; it asks for the code
    /// alone with `with_message = false`.
    #[must_use]
    pub fn to_ttlv(&self, with_message: bool) -> TTLV {
        let mut items = vec![TTLV::enumeration(
            "RevocationReasonCode",
            self.revocation_reason_code,
        )];
        if with_message {
            if let Some(message) = &self.revocation_message {
                items.push(TTLV::text_string("RevocationMessage", message));
            }
        }
        TTLV::structure("RevocationReason", items)
    }
}

/// Raw bytes of a key, zeroized when dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyMaterial(pub Zeroizing<Vec<u8>>);

impl KeyMaterial {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// KMIP 1.4 §2.1.4 Key Value: the key material (wrapped attributes are a
/// non-goal here).
#[derive(Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key_material: KeyMaterial,
}

/// KMIP 1.4 §2.1.3 Key Block: format, material, and the cryptographic
/// parameters that travel with it.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyBlock {
    pub key_format_type: KeyFormatType,
    pub key_value: Option<KeyValue>,
    pub cryptographic_algorithm: Option<CryptographicAlgorithm>,
    pub cryptographic_length: Option<i32>,
}

impl KeyBlock {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        let mut items = vec![TTLV::enumeration("KeyFormatType", self.key_format_type)];
        if let Some(key_value) = &self.key_value {
            items.push(TTLV::structure(
                "KeyValue",
                vec![TTLV::byte_string(
                    "KeyMaterial",
                    key_value.key_material.as_slice().to_vec(),
                )],
            ));
        }
        if let Some(algorithm) = self.cryptographic_algorithm {
            items.push(TTLV::enumeration("CryptographicAlgorithm", algorithm));
        }
        if let Some(length) = self.cryptographic_length {
            items.push(TTLV::integer("CryptographicLength", length));
        }
        TTLV::structure("KeyBlock", items)
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let key_format_type = match enum_child(ttlv, "KeyFormatType")? {
            Some(variant) => KeyFormatType::from_variant(variant)?,
            None => KeyFormatType::Raw,
        };
        let key_value = match ttlv.child("KeyValue") {
            Some(kv) => {
                // Key material may be absent (e.g. metadata-only responses)
                match kv.child("KeyMaterial") {
                    Some(material) => Some(KeyValue {
                        key_material: KeyMaterial::new(material.as_bytes()?.to_vec()),
                    }),
                    None => None,
                }
            }
            None => None,
        };
        let cryptographic_algorithm = match enum_child(ttlv, "CryptographicAlgorithm")? {
            Some(variant) => Some(CryptographicAlgorithm::from_variant(variant)?),
            None => None,
        };
        let cryptographic_length = match ttlv.child("CryptographicLength") {
            Some(item) => Some(item.as_integer()?),
            None => None,
        };
        Ok(Self {
            key_format_type,
            key_value,
            cryptographic_algorithm,
            cryptographic_length,
        })
    }
}

/// KMIP 1.4 §2.2.2 Symmetric Key object.
#[derive(Debug, PartialEq, Eq)]
pub struct SymmetricKey {
    pub key_block: KeyBlock,
}

/// KMIP 1.4 §2.2.7 Secret Data object.
#[derive(Debug, PartialEq, Eq)]
pub struct SecretData {
    pub secret_data_type: SecretDataType,
    pub key_block: KeyBlock,
}

/// The managed objects this client can carry in Get and Register
/// payloads. The variant is selected by the object's tag.
#[derive(Debug, PartialEq, Eq)]
pub enum ManagedObject {
    SymmetricKey(SymmetricKey),
    SecretData(SecretData),
}

impl ManagedObject {
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::SymmetricKey(_) => ObjectType::SymmetricKey,
            Self::SecretData(_) => ObjectType::SecretData,
        }
    }

    #[must_use]
    pub const fn key_block(&self) -> &KeyBlock {
        match self {
            Self::SymmetricKey(key) => &key.key_block,
            Self::SecretData(data) => &data.key_block,
        }
    }

    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        match self {
            Self::SymmetricKey(key) => {
                TTLV::structure("SymmetricKey", vec![key.key_block.to_ttlv()])
            }
            Self::SecretData(data) => TTLV::structure(
                "SecretData",
                vec![
                    TTLV::enumeration("SecretDataType", data.secret_data_type),
                    data.key_block.to_ttlv(),
                ],
            ),
        }
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        match ttlv.tag.as_str() {
            "SymmetricKey" => Ok(Self::SymmetricKey(SymmetricKey {
                key_block: KeyBlock::from_ttlv(ttlv.child_required("KeyBlock")?)?,
            })),
            "SecretData" => {
                let secret_data_type = match enum_child(ttlv, "SecretDataType")? {
                    Some(variant) => SecretDataType::from_variant(variant)?,
                    None => SecretDataType::Password,
                };
                Ok(Self::SecretData(SecretData {
                    secret_data_type,
                    key_block: KeyBlock::from_ttlv(ttlv.child_required("KeyBlock")?)?,
                }))
            }
            tag => Err(KmipError::Protocol(format!(
                "unsupported managed object: {tag}"
            ))),
        }
    }

    /// Find the managed-object child of a payload, if present.
    pub fn from_parent(parent: &TTLV) -> Result<Option<Self>, KmipError> {
        for tag in ["SymmetricKey", "SecretData"] {
            if let Some(child) = parent.child(tag) {
                return Self::from_ttlv(child).map(Some);
            }
        }
        Ok(None)
    }
}

/// KMIP 1.4 §2.1.20 / 2.0 §2.2 Capability Information reported by Query.
/// The 2.0 dialect adds the batch-undo and batch-continue capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityInformation {
    pub streaming_capability: Option<bool>,
    pub asynchronous_capability: Option<bool>,
    pub attestation_capability: Option<bool>,
    pub batch_undo_capability: Option<bool>,
    pub batch_continue_capability: Option<bool>,
    pub unwrap_mode: Option<UnwrapMode>,
    pub destroy_action: Option<DestroyAction>,
    pub shredding_algorithm: Option<ShreddingAlgorithm>,
    pub rng_mode: Option<RNGMode>,
}

impl CapabilityInformation {
    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let bool_child = |tag: &str| -> Result<Option<bool>, KmipError> {
            match ttlv.child(tag) {
                Some(item) => Ok(Some(item.as_boolean()?)),
                None => Ok(None),
            }
        };
        let unwrap_mode = match enum_child(ttlv, "UnwrapMode")? {
            Some(variant) => Some(UnwrapMode::from_variant(variant)?),
            None => None,
        };
        let destroy_action = match enum_child(ttlv, "DestroyAction")? {
            Some(variant) => Some(DestroyAction::from_variant(variant)?),
            None => None,
        };
        let shredding_algorithm = match enum_child(ttlv, "ShreddingAlgorithm")? {
            Some(variant) => Some(ShreddingAlgorithm::from_variant(variant)?),
            None => None,
        };
        let rng_mode = match enum_child(ttlv, "RNGMode")? {
            Some(variant) => Some(RNGMode::from_variant(variant)?),
            None => None,
        };
        Ok(Self {
            streaming_capability: bool_child("StreamingCapability")?,
            asynchronous_capability: bool_child("AsynchronousCapability")?,
            attestation_capability: bool_child("AttestationCapability")?,
            batch_undo_capability: bool_child("BatchUndoCapability")?,
            batch_continue_capability: bool_child("BatchContinueCapability")?,
            unwrap_mode,
            destroy_action,
            shredding_algorithm,
            rng_mode,
        })
    }
}

/// Decode helper: an optional DateTime child.
pub(crate) fn date_time_child(
    parent: &TTLV,
    tag: &str,
) -> Result<Option<OffsetDateTime>, KmipError> {
    match parent.child(tag) {
        Some(item) => Ok(Some(item.as_date_time()?)),
        None => Ok(None),
    }
}
