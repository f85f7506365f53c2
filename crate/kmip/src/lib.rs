#![deny(nonstandard_style, unsafe_code)]
#![warn(clippy::all, clippy::unwrap_used, clippy::expect_used)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::missing_errors_doc
)]

pub use error::{
    result::{KmipResult, KmipResultHelper},
    KmipError,
};

mod error;
pub mod kmip_0;
pub mod kmip_1_4;
pub mod kmip_2_0;
pub mod message;
pub mod ttlv;
