//! Types shared by every KMIP dialect: the enumeration registry, the
//! protocol version pair, and the managed-object data structures
//! (key blocks, names, attributes) whose wire layout did not change
//! between 1.4 and 2.0.

pub mod kmip_data_structures;
pub mod kmip_types;
