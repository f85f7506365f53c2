//! The KMIP 1.4 dialect: tag registry, Template-Attribute carriage, and
//! operation payload records.

pub mod kmip_data_structures;
pub mod kmip_operations;
pub mod kmip_types;
