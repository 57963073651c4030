//! # signdesk-pipeline
//!
//! The signing and verification pipelines plus their lifecycle-wrapped
//! entry points.
//!
//! Signing is batched and strictly sequential: each file is signed,
//! announced over its live connection, and uploaded when it belongs to a
//! remote document; a per-file failure marks the batch and processing
//! continues. Verification runs per file and never fails terminally: an
//! error produces a diagnostic event followed by an authoritative
//! `status = false` outcome.
//!
//! External capabilities enter through traits: [`SignBackend`] wraps the
//! CMS engine, [`ConnectionHub`] the push channel, and [`FileRegistry`]
//! the file selection the follow-on effects land in.

pub mod files;
pub mod notify;
pub mod ops;
pub mod sign;
pub mod sign_backend;
pub mod upload;
pub mod verify;

#[cfg(test)]
pub(crate) mod testutil;

pub use files::{file_entry_from_artifact, FileRegistry};
pub use notify::{ConnectionHub, NullHub, FILES_SIGNED, SIGNATURE_VERIFIED};
pub use sign::{SignPipeline, SignRequest, SignedBatch};
pub use sign_backend::{
    normalize_signers, ChainCertProperties, DataFormat, SignBackend, SignatureHandle,
    SignerProperties,
};
pub use upload::UploadClient;
pub use verify::{VerificationOutcome, VerificationReport, VerifyFailure, VerifyPipeline};
