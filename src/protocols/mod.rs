//! Access-control and authentication protocol state machines, ICAO 9303-11 §4.

pub mod active_authentication;
pub mod bac;
pub mod chip_authentication;
pub mod pace;
pub mod terminal_authentication;

use crate::asn1::emrtd::security_info::SymmetricCipher;

/// Maps a `SecurityInfo` cipher tag to the byte-level cipher suite used by
/// [`crate::crypto::symmetric`] and [`crate::kdf`].
pub(crate) fn cipher_suite(cipher: SymmetricCipher) -> crate::crypto::symmetric::CipherSuite {
    use crate::crypto::symmetric::CipherSuite;
    match cipher {
        SymmetricCipher::Tdes => CipherSuite::Des3CbcCbc,
        SymmetricCipher::Aes128 => CipherSuite::AesCbcCmac128,
        SymmetricCipher::Aes192 => CipherSuite::AesCbcCmac192,
        SymmetricCipher::Aes256 => CipherSuite::AesCbcCmac256,
    }
}

pub(crate) fn key_length(cipher: SymmetricCipher) -> crate::kdf::KeyLength {
    use crate::kdf::KeyLength;
    match cipher {
        SymmetricCipher::Tdes => KeyLength::Tdes,
        SymmetricCipher::Aes128 => KeyLength::Aes128,
        SymmetricCipher::Aes192 => KeyLength::Aes192,
        SymmetricCipher::Aes256 => KeyLength::Aes256,
    }
}
