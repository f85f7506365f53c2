#![allow(non_camel_case_types)]

use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

use strum::{Display, EnumString, FromRepr};

use crate::{
    ttlv::{KmipEnumerationVariant, TTLV},
    KmipError,
};

/// Implements the conversions between a registry enum and the wire-level
/// [`KmipEnumerationVariant`], both directions.
macro_rules! kmip_enum_variant {
    ($($name:ty),* $(,)?) => {$(
        #[allow(clippy::as_conversions)]
        impl From<$name> for KmipEnumerationVariant {
            fn from(value: $name) -> Self {
                Self { value: value as u32, name: value.to_string() }
            }
        }

        impl $name {
            pub fn from_variant(variant: &KmipEnumerationVariant) -> Result<Self, KmipError> {
                Self::from_repr(variant.value)
                    .ok_or(KmipError::InvalidEnumValue(stringify!($name), variant.value))
            }
        }
    )*};
}

/// KMIP Operation Enumeration.
///
/// Values 0x01-0x2B are KMIP 1.4 §9.1.3.2.27; 0x2C and up were added by
/// KMIP 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum Operation {
    Create = 0x01,
    CreateKeyPair = 0x02,
    Register = 0x03,
    ReKey = 0x04,
    DeriveKey = 0x05,
    Certify = 0x06,
    ReCertify = 0x07,
    Locate = 0x08,
    Check = 0x09,
    Get = 0x0A,
    GetAttributes = 0x0B,
    GetAttributeList = 0x0C,
    AddAttribute = 0x0D,
    ModifyAttribute = 0x0E,
    DeleteAttribute = 0x0F,
    ObtainLease = 0x10,
    GetUsageAllocation = 0x11,
    Activate = 0x12,
    Revoke = 0x13,
    Destroy = 0x14,
    Archive = 0x15,
    Recover = 0x16,
    Validate = 0x17,
    Query = 0x18,
    Cancel = 0x19,
    Poll = 0x1A,
    Notify = 0x1B,
    Put = 0x1C,
    ReKeyKeyPair = 0x1D,
    DiscoverVersions = 0x1E,
    Encrypt = 0x1F,
    Decrypt = 0x20,
    Sign = 0x21,
    SignatureVerify = 0x22,
    MAC = 0x23,
    MACVerify = 0x24,
    RNGRetrieve = 0x25,
    RNGSeed = 0x26,
    Hash = 0x27,
    CreateSplitKey = 0x28,
    JoinSplitKey = 0x29,
    Import = 0x2A,
    Export = 0x2B,
    Log = 0x2C,
    Login = 0x2D,
    Logout = 0x2E,
    DelegatedLogin = 0x2F,
    AdjustAttribute = 0x30,
    SetAttribute = 0x31,
    SetEndpointRole = 0x32,
    PKCS11 = 0x33,
    Interop = 0x34,
    ReProvision = 0x35,
}

/// KMIP Object Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ObjectType {
    Certificate = 0x1,
    SymmetricKey = 0x2,
    PublicKey = 0x3,
    PrivateKey = 0x4,
    SplitKey = 0x5,
    Template = 0x6,
    SecretData = 0x7,
    OpaqueObject = 0x8,
    PGPKey = 0x9,
    CertificateRequest = 0xA,
}

/// KMIP Cryptographic Algorithm Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum CryptographicAlgorithm {
    DES = 0x01,
    TripleDES = 0x02,
    AES = 0x03,
    RSA = 0x04,
    DSA = 0x05,
    ECDSA = 0x06,
    HMACSHA1 = 0x07,
    HMACSHA224 = 0x08,
    HMACSHA256 = 0x09,
    HMACSHA384 = 0x0A,
    HMACSHA512 = 0x0B,
    HMACMD5 = 0x0C,
    DH = 0x0D,
    ECDH = 0x0E,
    ECMQV = 0x0F,
    Blowfish = 0x10,
    Camellia = 0x11,
    CAST5 = 0x12,
    IDEA = 0x13,
    MARS = 0x14,
    RC2 = 0x15,
    RC4 = 0x16,
    RC5 = 0x17,
    SKIPJACK = 0x18,
    Twofish = 0x19,
    EC = 0x1A,
    OneTimePad = 0x1B,
    ChaCha20 = 0x1C,
    Poly1305 = 0x1D,
    ChaCha20Poly1305 = 0x1E,
    SHA3224 = 0x1F,
    SHA3256 = 0x20,
    SHA3384 = 0x21,
    SHA3512 = 0x22,
    HMACSHA3224 = 0x23,
    HMACSHA3256 = 0x24,
    HMACSHA3384 = 0x25,
    HMACSHA3512 = 0x26,
    SHAKE128 = 0x27,
    SHAKE256 = 0x28,
    ARIA = 0x29,
    SEED = 0x2A,
    SM2 = 0x2B,
    SM3 = 0x2C,
    SM4 = 0x2D,
    GOSTR34102012 = 0x2E,
    GOSTR34112012 = 0x2F,
    GOSTR34132015 = 0x30,
    GOST2814789 = 0x31,
    XMSS = 0x32,
    SPHINCS256 = 0x33,
    Ed25519 = 0x37,
    Ed448 = 0x38,
}

/// KMIP Key Format Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum KeyFormatType {
    Raw = 0x1,
    Opaque = 0x2,
    PKCS1 = 0x3,
    PKCS8 = 0x4,
    X509 = 0x5,
    ECPrivateKey = 0x6,
    TransparentSymmetricKey = 0x7,
    TransparentDSAPrivateKey = 0x8,
    TransparentDSAPublicKey = 0x9,
    TransparentRSAPrivateKey = 0xA,
    TransparentRSAPublicKey = 0xB,
    TransparentDHPrivateKey = 0xC,
    TransparentDHPublicKey = 0xD,
    TransparentECDSAPrivateKey = 0xE,
    TransparentECDSAPublicKey = 0xF,
    TransparentECDHPrivateKey = 0x10,
    TransparentECDHPublicKey = 0x11,
    TransparentECMQVPrivateKey = 0x12,
    TransparentECMQVPublicKey = 0x13,
    TransparentECPrivateKey = 0x14,
    TransparentECPublicKey = 0x15,
    PKCS12 = 0x16,
}

/// KMIP Name Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum NameType {
    UninterpretedTextString = 0x1,
    URI = 0x2,
}

/// KMIP Secret Data Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum SecretDataType {
    Password = 0x1,
    Seed = 0x2,
}

/// KMIP Revocation Reason Code Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum RevocationReasonCode {
    Unspecified = 0x1,
    KeyCompromise = 0x2,
    CACompromise = 0x3,
    AffiliationChanged = 0x4,
    Superseded = 0x5,
    CessationOfOperation = 0x6,
    PrivilegeWithdrawn = 0x7,
}

/// KMIP Query Function Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum QueryFunction {
    QueryOperations = 0x1,
    QueryObjects = 0x2,
    QueryServerInformation = 0x3,
    QueryApplicationNamespaces = 0x4,
    QueryExtensionList = 0x5,
    QueryExtensionMap = 0x6,
    QueryAttestationTypes = 0x7,
    QueryRNGs = 0x8,
    QueryValidations = 0x9,
    QueryProfiles = 0xA,
    QueryCapabilities = 0xB,
    QueryClientRegistrationMethods = 0xC,
    QueryDefaultsInformation = 0xD,
    QueryStorageProtectionMasks = 0xE,
}

/// KMIP Result Status Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ResultStatus {
    Success = 0x0,
    OperationFailed = 0x1,
    OperationPending = 0x2,
    OperationUndone = 0x3,
}

/// KMIP Result Reason Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ResultReason {
    ItemNotFound = 0x1,
    ResponseTooLarge = 0x2,
    AuthenticationNotSuccessful = 0x3,
    InvalidMessage = 0x4,
    OperationNotSupported = 0x5,
    MissingData = 0x6,
    InvalidField = 0x7,
    FeatureNotSupported = 0x8,
    OperationCanceled = 0x9,
    CryptographicFailure = 0xA,
    IllegalOperation = 0xB,
    PermissionDenied = 0xC,
    ObjectArchived = 0xD,
    IndexOutOfBounds = 0xE,
    ApplicationNamespaceNotSupported = 0xF,
    KeyFormatTypeNotSupported = 0x10,
    KeyCompressionTypeNotSupported = 0x11,
    EncodingOptionError = 0x12,
    KeyValueNotPresent = 0x13,
    AttestationRequired = 0x14,
    AttestationFailed = 0x15,
    Sensitive = 0x16,
    NotExtractable = 0x17,
    ObjectAlreadyExists = 0x18,
    GeneralFailure = 0x100,
}

/// KMIP Attestation Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum AttestationType {
    TPMQuote = 0x1,
    TCGIntegrityReport = 0x2,
    SAMLAssertion = 0x3,
}

/// KMIP Batch Error Continuation Option Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum BatchErrorContinuationOption {
    Continue = 0x1,
    Stop = 0x2,
    Undo = 0x3,
}

/// KMIP Shredding Algorithm Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ShreddingAlgorithm {
    Unspecified = 0x1,
    Cryptographic = 0x2,
    Unsupported = 0x3,
}

/// KMIP RNG Mode Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum RNGMode {
    Unspecified = 0x1,
    SharedInstantiation = 0x2,
    NonSharedInstantiation = 0x3,
}

/// KMIP Unwrap Mode Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum UnwrapMode {
    Unspecified = 0x1,
    Processed = 0x2,
    NotProcessed = 0x3,
}

/// KMIP Destroy Action Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum DestroyAction {
    Unspecified = 0x1,
    KeyMaterialDeleted = 0x2,
    KeyMaterialShredded = 0x3,
    MetaDataDeleted = 0x4,
    MetaDataShredded = 0x5,
    Deleted = 0x6,
    Shredded = 0x7,
}

/// KMIP Client Registration Method Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ClientRegistrationMethod {
    Unspecified = 0x1,
    ServerPreGenerated = 0x2,
    ServerOnDemand = 0x3,
    ClientGenerated = 0x4,
    ClientRegistered = 0x5,
}

/// KMIP Validation Authority Type Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ValidationAuthorityType {
    Unspecified = 0x1,
    NISTCMVP = 0x2,
    CommonCriteria = 0x3,
}

/// KMIP Object Group Member Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, FromRepr)]
#[repr(u32)]
pub enum ObjectGroupMember {
    GroupMemberFresh = 0x1,
    GroupMemberDefault = 0x2,
}

kmip_enum_variant!(
    Operation,
    ObjectType,
    CryptographicAlgorithm,
    KeyFormatType,
    NameType,
    SecretDataType,
    RevocationReasonCode,
    QueryFunction,
    ResultStatus,
    ResultReason,
    AttestationType,
    BatchErrorContinuationOption,
    ShreddingAlgorithm,
    RNGMode,
    UnwrapMode,
    DestroyAction,
    ClientRegistrationMethod,
    ValidationAuthorityType,
    ObjectGroupMember,
);

/// KMIP Cryptographic Usage Mask: a bitmask carried as an Integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CryptographicUsageMask(pub u32);

impl CryptographicUsageMask {
    pub const SIGN: Self = Self(0x0000_0001);
    pub const VERIFY: Self = Self(0x0000_0002);
    pub const ENCRYPT: Self = Self(0x0000_0004);
    pub const DECRYPT: Self = Self(0x0000_0008);
    pub const WRAP_KEY: Self = Self(0x0000_0010);
    pub const UNWRAP_KEY: Self = Self(0x0000_0020);
    pub const EXPORT: Self = Self(0x0000_0040);
    pub const MAC_GENERATE: Self = Self(0x0000_0080);
    pub const MAC_VERIFY: Self = Self(0x0000_0100);
    pub const DERIVE_KEY: Self = Self(0x0000_0200);
    pub const CONTENT_COMMITMENT: Self = Self(0x0000_0400);
    pub const KEY_AGREEMENT: Self = Self(0x0000_0800);
    pub const CERTIFICATE_SIGN: Self = Self(0x0000_1000);
    pub const CRL_SIGN: Self = Self(0x0000_2000);
    pub const GENERATE_CRYPTOGRAM: Self = Self(0x0000_4000);
    pub const VALIDATE_CRYPTOGRAM: Self = Self(0x0000_8000);
    pub const TRANSLATE_ENCRYPT: Self = Self(0x0001_0000);
    pub const TRANSLATE_DECRYPT: Self = Self(0x0002_0000);
    pub const TRANSLATE_WRAP: Self = Self(0x0004_0000);
    pub const TRANSLATE_UNWRAP: Self = Self(0x0008_0000);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn as_i32(self) -> Result<i32, KmipError> {
        i32::try_from(self.0)
            .map_err(|_e| KmipError::Default(format!("usage mask 0x{:08X} overflows i32", self.0)))
    }
}

impl BitOr for CryptographicUsageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CryptographicUsageMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CryptographicUsageMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// KMIP Storage Status Mask: a bitmask carried as an Integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageStatusMask(pub u32);

impl StorageStatusMask {
    pub const ONLINE_STORAGE: Self = Self(0x1);
    pub const ARCHIVAL_STORAGE: Self = Self(0x2);
    pub const DESTROYED_STORAGE: Self = Self(0x4);

    pub fn as_i32(self) -> Result<i32, KmipError> {
        i32::try_from(self.0)
            .map_err(|_e| KmipError::Default(format!("storage mask 0x{:08X} overflows i32", self.0)))
    }
}

impl BitOr for StorageStatusMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The (major, minor) pair that opens every message header.
///
/// Ordered so that version negotiation can pick the server's most
/// preferred mutually supported version with a plain `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ProtocolVersion {
    pub protocol_version_major: i32,
    pub protocol_version_minor: i32,
}

impl ProtocolVersion {
    pub const KMIP_1_4: Self = Self::new(1, 4);
    pub const KMIP_2_0: Self = Self::new(2, 0);

    #[must_use]
    pub const fn new(major: i32, minor: i32) -> Self {
        Self {
            protocol_version_major: major,
            protocol_version_minor: minor,
        }
    }

    #[must_use]
    pub fn to_ttlv(self, tag: &str) -> TTLV {
        TTLV::structure(
            tag,
            vec![
                TTLV::integer("ProtocolVersionMajor", self.protocol_version_major),
                TTLV::integer("ProtocolVersionMinor", self.protocol_version_minor),
            ],
        )
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            protocol_version_major: ttlv.child_required("ProtocolVersionMajor")?.as_integer()?,
            protocol_version_minor: ttlv.child_required("ProtocolVersionMinor")?.as_integer()?,
        })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.protocol_version_major, self.protocol_version_minor
        )
    }
}

/// Decode helper: the enumeration value of a child item.
pub(crate) fn enum_child<'a>(
    parent: &'a TTLV,
    tag: &str,
) -> Result<Option<&'a KmipEnumerationVariant>, KmipError> {
    match parent.child(tag) {
        Some(item) => Ok(Some(item.as_enumeration()?)),
        None => Ok(None),
    }
}

/// Decode helper: an optional Integer child interpreted as a mask.
pub(crate) fn mask_child(parent: &TTLV, tag: &str) -> Result<Option<u32>, KmipError> {
    match parent.child(tag) {
        #[allow(clippy::cast_sign_loss, clippy::as_conversions)]
        Some(item) => Ok(Some(item.as_integer()? as u32)),
        None => Ok(None),
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn enum_names_and_values_round_trip() {
        assert_eq!(Operation::Create.to_string(), "Create");
        assert_eq!(Operation::from_str("DiscoverVersions").unwrap(), Operation::DiscoverVersions);
        assert_eq!(Operation::from_repr(0x31).unwrap(), Operation::SetAttribute);
        assert_eq!(ObjectType::SymmetricKey.to_string(), "SymmetricKey");
        assert_eq!(ResultReason::from_repr(0xC).unwrap(), ResultReason::PermissionDenied);

        let variant = KmipEnumerationVariant::from(CryptographicAlgorithm::AES);
        assert_eq!(variant.value, 0x3);
        assert_eq!(variant.name, "AES");
        assert_eq!(
            CryptographicAlgorithm::from_variant(&variant).unwrap(),
            CryptographicAlgorithm::AES
        );
    }

    #[test]
    fn usage_mask_bitor() {
        let mask = CryptographicUsageMask::ENCRYPT | CryptographicUsageMask::DECRYPT;
        assert_eq!(mask.0, 12);
        assert!(mask.contains(CryptographicUsageMask::ENCRYPT));
        assert!(!mask.contains(CryptographicUsageMask::SIGN));
    }

    #[test]
    fn protocol_version_ordering() {
        assert!(ProtocolVersion::KMIP_2_0 > ProtocolVersion::KMIP_1_4);
        assert!(ProtocolVersion::new(1, 4) > ProtocolVersion::new(1, 2));
        assert_eq!(ProtocolVersion::KMIP_1_4.to_string(), "1.4");
    }

    #[test]
    fn protocol_version_ttlv_round_trip() {
        let version = ProtocolVersion::KMIP_1_4;
        let ttlv = version.to_ttlv("ProtocolVersion");
        assert_eq!(ProtocolVersion::from_ttlv(&ttlv).unwrap(), version);
    }
}
