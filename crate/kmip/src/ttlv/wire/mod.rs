pub mod kmip_tag;
pub mod ttlv_bytes_deserializer;
pub mod ttlv_bytes_serializer;

pub use kmip_tag::{KmipTag, VENDOR_EXTENSION_BASE};
pub use ttlv_bytes_deserializer::TTLVBytesDeserializer;
pub use ttlv_bytes_serializer::TTLVBytesSerializer;
