//! # signdesk-core
//!
//! Core building blocks for the signdesk signing orchestration pipeline:
//! the shared data model, the error taxonomy, the async operation
//! lifecycle, license token parsing, and configuration.
//!
//! ## Operation lifecycle
//!
//! Every registry load and pipeline run reports `Started` synchronously,
//! defers the work by one scheduling tick, then fires exactly one
//! terminal `Succeeded`/`Failed` event. See [`lifecycle`].
//!
//! ## Error policy
//!
//! Errors local to one item of a batch are isolated (a failed sign call
//! marks the batch, a failed chain build downgrades to untrusted);
//! registry-wide failures (enumeration, license load) abort the whole
//! operation. User-visible failure is always a lifecycle event, never a
//! crash.

pub mod config;
pub mod error;
pub mod license;
pub mod lifecycle;
pub mod types;

pub use config::{Config, DEFAULT_PROVIDER_TYPE, DEFAULT_UPLOAD_URL};
pub use error::{Result, SigndeskError};
pub use license::{load_license, parse_license, License, LicensePayload};
pub use lifecycle::{spawn_operation, EventSink, LifecycleEvent, Observer};
pub use types::*;
