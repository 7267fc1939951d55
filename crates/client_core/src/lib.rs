//! Record-kind clients for the catalog API: one generic CRUD + command client
//! per kind, a registry dispatching by kind, the list query codec, and the
//! detail/update helpers the views build on.

pub mod client;
pub mod commands;
pub mod config;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod query_codec;
pub mod registry;
pub mod transport;

pub use client::{KindClient, RecordKindClient};
pub use commands::{spec_for, CommandSpec, ReasonPolicy, RecordKindSpec};
pub use config::{load_settings, Settings};
pub use detail::{fetch_detail, DetailOutcome, RetryPolicy};
pub use dispatch::{apply_update, plan_update};
pub use error::ClientError;
pub use registry::Registry;
pub use transport::{HttpTransport, Method, Transport, TransportRequest, TransportResponse};
