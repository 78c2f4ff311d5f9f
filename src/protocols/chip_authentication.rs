//! Chip Authentication, ICAO 9303-11 §4.5 / TR-03110-3 §3.4.
//!
//! Unlike PACE, Chip Authentication's key agreement is against the chip's
//! static key (from `ChipAuthenticationPublicKeyInfo`), so the object-safe
//! [`crate::crypto::KeyAgreementAlgorithm`] bridge is enough: no curve-level
//! generics are needed here.

use crate::{
    asn1::emrtd::security_info::{ChipAuthenticationInfo, ChipAuthenticationPublicKeyInfo},
    crypto::{CryptoCoreRng, PublicKey},
    error::{Error, Result},
    kdf,
    secure_messaging::SecureMessaging,
};

/// Generates the terminal's ephemeral key pair for the curve/group the chip
/// advertises in `capk`. The public half is sent to the chip in a `MSE:Set
/// AT`/`GENERAL AUTHENTICATE` exchange (APDU framing is the caller's job).
pub fn generate_ephemeral_key_pair(
    capk: &ChipAuthenticationPublicKeyInfo,
    rng: &mut dyn CryptoCoreRng,
) -> Result<(crate::crypto::PrivateKey, PublicKey)> {
    let (algorithm, _chip_public) = capk
        .chip_authentication_public_key
        .to_algorithm_public_key()
        .map_err(|_| Error::UnsupportedAlgorithm {
            oid: "chip authentication public key".into(),
        })?;
    Ok(algorithm.generate_key_pair(rng))
}

/// Performs the key agreement against the chip's static public key and
/// derives the resulting Secure Messaging session, ICAO 9303-11 9.7.1 (the
/// same `K_enc`/`K_mac` derivation as BAC/PACE, counters 1 and 2, no
/// intermediate `K_pi`).
pub fn complete(
    info: &ChipAuthenticationInfo,
    capk: &ChipAuthenticationPublicKeyInfo,
    terminal_private: &crate::crypto::PrivateKey,
) -> Result<SecureMessaging> {
    let cipher = info.protocol.cipher.ok_or(Error::UnsupportedField {
        field: "ChipAuthenticationInfo.protocol.cipher",
    })?;
    let (algorithm, chip_public) = capk
        .chip_authentication_public_key
        .to_algorithm_public_key()
        .map_err(|_| Error::UnsupportedAlgorithm {
            oid: "chip authentication public key".into(),
        })?;
    let shared_secret = algorithm
        .key_agreement(terminal_private, &chip_public)
        .map_err(|_| Error::CryptoFailed { stage: "chip authentication key agreement" })?;

    let suite = super::cipher_suite(cipher);
    let key_length = super::key_length(cipher);
    let k_enc = kdf::derive_key(&shared_secret, kdf::COUNTER_ENC, key_length);
    let k_mac = kdf::derive_key(&shared_secret, kdf::COUNTER_MAC, key_length);
    Ok(SecureMessaging::new(suite, k_enc, k_mac, 0))
}
