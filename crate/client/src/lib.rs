#![deny(nonstandard_style, unsafe_code)]
#![warn(clippy::all, clippy::unwrap_used, clippy::expect_used)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::missing_errors_doc
)]

//! KMIP client: configuration, mutually-authenticated TLS transport, the
//! two dialect services and the operation-oriented façade.

pub use batch::{BatchItemResult, BatchOperation, BatchOutput};
pub use client::KmipClient;
pub use config::{ConfigurationSettings, ServiceType};
pub use error::{ClientError, ClientResult};
pub use ops::*;
pub use secret::Secret;
pub use transport::{CancelToken, KmipConnection};

mod batch;
mod client;
mod config;
mod error;
mod ops;
mod secret;
pub mod service;
mod transport;
