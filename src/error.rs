//! Crate-wide error taxonomy.
//!
//! Parsers and protocol drivers surface the most specific variant they can.
//! `anyhow::Error` is still used internally (e.g. inside `crypto::mod_ring`)
//! for invariants that can't be violated through the public API; anything
//! reachable from untrusted input or an untrusted card goes through
//! [`Error`].

use thiserror::Error;

/// Errors produced by the TLV, ASN.1, LDS, CBEFF and biometric codecs, the
/// access-control protocols, and the Secure Messaging wrapper.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed TLV: {reason}")]
    MalformedTlv { reason: &'static str },

    #[error("malformed ASN.1: {reason}")]
    MalformedAsn1 { reason: String },

    #[error("unexpected tag: expected {expected:#x}, found {found:#x}")]
    UnexpectedTag { expected: u32, found: u32 },

    #[error("unsupported field: {field}")]
    UnsupportedField { field: &'static str },

    #[error("unsupported algorithm: {oid}")]
    UnsupportedAlgorithm { oid: String },

    #[error("cryptographic operation failed at {stage}")]
    CryptoFailed { stage: &'static str },

    #[error("protocol error at {stage}: {cause}")]
    ProtocolError {
        stage: &'static str,
        cause: String,
    },

    #[error("secure messaging session has been terminated")]
    SessionTerminated,

    #[error("datagroup {dg} hash does not match the Document Security Object")]
    MismatchedDigest { dg: u8 },

    #[error("Document Security Object signature is invalid")]
    SignatureInvalid,

    #[error("Document Security Object signer is not trusted")]
    UntrustedSigner,

    #[error("access denied: {reason}")]
    AccessDenied { reason: &'static str },

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("transport timeout")]
    TransportTimeout,
}

pub type Result<T> = std::result::Result<T, Error>;
