//! The KMIP 2.0 dialect: tag registry, flat `Attributes` carriage, the
//! tagged `UniqueIdentifier` sum, and operation payload records.

pub mod kmip_attributes;
pub mod kmip_operations;
pub mod kmip_types;
