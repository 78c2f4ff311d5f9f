//! PACE (Password Authenticated Connection Establishment), ICAO 9303-11 §4.4 /
//! BSI TR-03110-3 §4.3.
//!
//! Only the Generic Mapping (GM) variant over an elliptic curve is
//! implemented: it is what every deployed eMRTD actually uses. Integrated
//! Mapping and Chip Authentication Mapping, and the classic-DH flavour of GM,
//! are not implemented (`Error::UnsupportedAlgorithm`); see DESIGN.md.

use crate::{
    asn1::emrtd::security_info::{KeyAgreement, PaceMapping, PaceProtocol},
    crypto::{
        groups::{EllipticCurve, EllipticCurvePoint},
        mod_ring::{UintExp, UintMont},
        symmetric::{self, CipherSuite},
    },
    error::{Error, Result},
    kdf::{self, KeyLength},
    secure_messaging::SecureMessaging,
};
use subtle::ConditionallySelectable;

fn cipher_suite(cipher: crate::asn1::emrtd::security_info::SymmetricCipher) -> CipherSuite {
    super::cipher_suite(cipher)
}

fn key_length(cipher: crate::asn1::emrtd::security_info::SymmetricCipher) -> KeyLength {
    super::key_length(cipher)
}

/// The chip's encrypted nonce, decrypted with `K_pi` derived from the shared
/// secret (MRZ, CAN or PIN).
pub fn decrypt_nonce(protocol: PaceProtocol, k_pi: &[u8], encrypted_nonce: &[u8]) -> Result<Vec<u8>> {
    let suite = cipher_suite(protocol.cipher);
    let iv = vec![0u8; suite.block_size()];
    symmetric::decrypt_cbc_no_padding(suite, k_pi, &iv, encrypted_nonce)
        .map_err(|_| Error::CryptoFailed { stage: "PACE nonce decryption" })
}

/// Derives `K_pi` from the shared secret bytes (MRZ `K_seed`, or the CAN/PIN
/// directly per 9303-11 9.7.1) for the given cipher.
pub fn derive_k_pi(protocol: PaceProtocol, shared: &[u8]) -> Vec<u8> {
    kdf::derive_key(shared, kdf::COUNTER_PACE, key_length(protocol.cipher))
}

/// Mutual-authentication token: `MAC(K_mac, encoded public key)`, ICAO
/// 9303-11 4.4.3.6 / TR-03110 4.3.5. Both sides compute this over each
/// other's ephemeral public key for the mapped group.
pub fn authentication_token(protocol: PaceProtocol, k_mac: &[u8], peer_public_key: &[u8]) -> Result<[u8; 8]> {
    symmetric::mac(cipher_suite(protocol.cipher), k_mac, peer_public_key)
        .map_err(|_| Error::CryptoFailed { stage: "PACE authentication token" })
}

/// Completes the Generic Mapping key agreement for one side (terminal or
/// chip, the protocol is symmetric) over an elliptic curve, and derives the
/// Secure Messaging session keys.
///
/// `static_curve` is the standardized domain parameter curve from
/// `PaceDomainParameterInfo`/`PaceInfo`; the returned session keys are valid
/// only once both sides' authentication tokens have been checked by the
/// caller.
///
/// Step 1 (mapping): given the decrypted nonce `s` and the ephemeral mapping
/// key agreement (own private scalar and the peer's mapping public point),
/// derives the mapped generator `G' = s*G + H` and builds a curve identical
/// to `static_curve` except for its base point.
pub fn map_generic<U>(
    protocol: PaceProtocol,
    static_curve: &EllipticCurve<U, U>,
    nonce_s: crate::crypto::mod_ring::ModRingElementRef<'_, U>,
    mapping_shared_point: EllipticCurvePoint<'_, U, U>,
) -> Result<EllipticCurve<U, U>>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    if protocol.mapping != PaceMapping::Generic || protocol.key_agreement != KeyAgreement::Ecdh {
        return Err(Error::UnsupportedAlgorithm {
            oid: format!("{:?}", protocol),
        });
    }
    let mapped_generator = static_curve.generator() * nonce_s + mapping_shared_point;
    let (x, y) = mapped_generator.as_monty().ok_or_else(|| Error::ProtocolError {
        stage: "PACE mapping",
        cause: "mapped generator is the point at infinity".into(),
    })?;
    EllipticCurve::new(
        static_curve.base_field().modulus(),
        static_curve.a().to_uint(),
        static_curve.b().to_uint(),
        static_curve.base_field().from_montgomery(x).to_uint(),
        static_curve.base_field().from_montgomery(y).to_uint(),
        static_curve.scalar_field().modulus(),
        static_curve.cofactor(),
    )
    .map_err(|_| Error::ProtocolError {
        stage: "PACE mapping",
        cause: "mapped curve is degenerate".into(),
    })
}

/// Derives session keys from the final key-agreement shared secret `K` over
/// the mapped curve, ICAO 9303-11 9.7.1.
pub fn derive_session(protocol: PaceProtocol, shared_secret_x: &[u8]) -> SecureMessaging {
    let k_senc = kdf::derive_key(shared_secret_x, kdf::COUNTER_ENC, key_length(protocol.cipher));
    let k_smac = kdf::derive_key(shared_secret_x, kdf::COUNTER_MAC, key_length(protocol.cipher));
    SecureMessaging::new(cipher_suite(protocol.cipher), k_senc, k_smac, 0)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{asn1::emrtd::security_info::SymmetricCipher, crypto::groups::named::secp256r1},
        rand::thread_rng,
    };

    #[test]
    fn test_ec_gm_mapping_and_agreement_round_trip() {
        let curve = secp256r1();
        let protocol = PaceProtocol {
            key_agreement: KeyAgreement::Ecdh,
            mapping: PaceMapping::Generic,
            cipher: SymmetricCipher::Aes128,
        };
        let mut rng = thread_rng();

        // Both sides agree on a shared nonce s (normally: chip picks it,
        // encrypts with K_pi, terminal decrypts).
        let s = curve.scalar_field().random(&mut rng);

        // Ephemeral mapping key agreement (unauthenticated ECDH over the
        // static curve).
        let terminal_map_priv = curve.scalar_field().random(&mut rng);
        let chip_map_priv = curve.scalar_field().random(&mut rng);
        let terminal_map_pub = curve.generator() * terminal_map_priv;
        let chip_map_pub = curve.generator() * chip_map_priv;

        let terminal_h = chip_map_pub * terminal_map_priv;
        let chip_h = terminal_map_pub * chip_map_priv;
        assert_eq!(terminal_h, chip_h);

        let terminal_mapped = map_generic(protocol, &curve, s, terminal_h).unwrap();
        let chip_mapped = map_generic(protocol, &curve, s, chip_h).unwrap();
        assert_eq!(terminal_mapped.generator().x(), chip_mapped.generator().x());

        // Final key agreement over the mapped curve.
        let terminal_priv = terminal_mapped.scalar_field().random(&mut rng);
        let chip_priv = chip_mapped.scalar_field().random(&mut rng);
        let terminal_pub = terminal_mapped.generator() * terminal_priv;
        let chip_pub = chip_mapped.generator() * chip_priv;

        let terminal_shared = chip_pub * terminal_priv;
        let chip_shared = terminal_pub * chip_priv;
        assert_eq!(terminal_shared.x(), chip_shared.x());

        let x_bytes = terminal_shared.x().unwrap().to_uint().to_be_bytes();
        let terminal_sm = derive_session(protocol, &x_bytes);
        let chip_sm = derive_session(protocol, &chip_shared.x().unwrap().to_uint().to_be_bytes());
        assert_eq!(terminal_sm.ssc(), chip_sm.ssc());
    }
}
