//! eMRTD (electronic passport/ID) core library: ASN.1 data structures,
//! access-control protocols, Secure Messaging, and the LDS/CBEFF/biometric
//! data groups defined by ICAO Doc 9303.
//!
//! This crate is transport-agnostic: it builds and interprets the APDUs and
//! file contents, but does not talk to a card or reader itself.

pub mod asn1;
pub mod biometrics;
pub mod cbeff;
pub mod crypto;
pub mod error;
pub mod icao9303;
pub mod iso7816;
pub mod kdf;
pub mod lds;
pub mod protocols;
pub mod secure_messaging;
pub mod sod;
pub mod tlv;

/// Returns `$err` from the enclosing function if `$cond` is false.
///
/// Like `anyhow::ensure!`, but takes the error value to return directly
/// instead of building one from a format string, so it works equally for
/// `der::Error`, `crate::error::Error` and `anyhow::Error` returning
/// functions.
#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            return Err(::std::convert::From::from($err));
        }
    };
}
