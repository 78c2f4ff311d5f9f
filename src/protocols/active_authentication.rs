//! Active Authentication, ICAO 9303-11 §6.1 / §9.2.8.
//!
//! Proves DG15's public key is bound to the physical chip: the terminal
//! sends an 8-byte challenge via `INTERNAL AUTHENTICATE`, and the chip signs
//! it with DG15's private key. RSA responses (ISO/IEC 9796-2 scheme 1,
//! partial message recovery, implicit SHA-1 trailer) and ECDSA responses
//! over NIST/Brainpool P-256 are verified; other EC sizes are recognized
//! but rejected, see DESIGN.md.

use crate::{
    asn1::public_key_info::{
        AnySubjectPublicKeyInfo, ECAlgoParameters, PubkeyAlgorithmIdentifier, SubjectPublicKeyInfo,
    },
    crypto::{
        groups::{named, EllipticCurve},
        mod_ring::{RingRefExt, UintExp, UintMont},
        verify_active_authentication_rsa, ECPublicKey, ECSignature,
    },
    error::{Error, Result},
};
use der::{asn1::ObjectIdentifier as Oid, Decode, Encode};
use sha1::{Digest, Sha1};
use subtle::ConditionallySelectable;

/// Length of the `INTERNAL AUTHENTICATE` challenge.
pub const CHALLENGE_LEN: usize = 8;

const OID_SECP256R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.7");
const OID_BRAINPOOL_P256R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.7");

/// Verifies an Active Authentication response against DG15's public key.
///
/// For RSA keys, returns the recovered `M1` message part (callers that don't
/// need it can ignore the return value); for EC keys, `M1` doesn't exist so
/// an empty vector is returned on success.
pub fn verify_response(
    dg15_public_key: &SubjectPublicKeyInfo,
    challenge: &[u8; CHALLENGE_LEN],
    response: &[u8],
) -> Result<Vec<u8>> {
    match dg15_public_key {
        SubjectPublicKeyInfo::Rsa(_) => {
            verify_active_authentication_rsa(dg15_public_key, challenge, response).map_err(|_| {
                Error::ProtocolError {
                    stage: "active authentication",
                    cause:  "ISO 9796-2 signature verification failed".into(),
                }
            })
        }
        SubjectPublicKeyInfo::Unknown(any) => {
            verify_ec(any, challenge, response)?;
            Ok(Vec::new())
        }
    }
}

fn verify_ec(
    any: &AnySubjectPublicKeyInfo,
    challenge: &[u8; CHALLENGE_LEN],
    response: &[u8],
) -> Result<()> {
    let unsupported = || Error::UnsupportedAlgorithm { oid: any.algorithm.algorithm.to_string() };

    let der = any.algorithm.to_der().map_err(|_| unsupported())?;
    let algorithm = PubkeyAlgorithmIdentifier::from_der(&der).map_err(|_| unsupported())?;
    let PubkeyAlgorithmIdentifier::Ec(ECAlgoParameters::NamedCurve(curve_oid)) = algorithm else {
        return Err(unsupported());
    };

    let point_bytes = any.subject_public_key.as_bytes().ok_or_else(|| Error::ProtocolError {
        stage: "active authentication",
        cause: "DG15 EC point is not byte-aligned".into(),
    })?;

    match curve_oid {
        OID_SECP256R1 => verify_ecdsa(named::secp256r1(), point_bytes, challenge, response),
        OID_BRAINPOOL_P256R1 => verify_ecdsa(named::brainpool_p256r1(), point_bytes, challenge, response),
        _ => Err(Error::UnsupportedAlgorithm { oid: curve_oid.to_string() }),
    }
}

fn verify_ecdsa<U>(
    curve: EllipticCurve<U, U>,
    point_bytes: &[u8],
    challenge: &[u8; CHALLENGE_LEN],
    response: &[u8],
) -> Result<()>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    let field_len = (curve.base_field().modulus().bit_len() + 7) / 8;
    let bad_encoding = || Error::ProtocolError {
        stage: "active authentication",
        cause: "unsupported EC point or signature encoding".into(),
    };

    if point_bytes.len() != 1 + 2 * field_len || point_bytes[0] != 0x04 {
        return Err(bad_encoding());
    }
    if response.len() != 2 * field_len {
        return Err(bad_encoding());
    }

    let x = U::from_be_bytes(&point_bytes[1..1 + field_len]);
    let y = U::from_be_bytes(&point_bytes[1 + field_len..]);
    if x >= curve.base_field().modulus() || y >= curve.base_field().modulus() {
        return Err(bad_encoding());
    }
    let point = curve
        .from_affine(curve.base_field().from(x), curve.base_field().from(y))
        .map_err(|_| Error::ProtocolError {
            stage: "active authentication",
            cause: "DG15 EC point is not on the curve".into(),
        })?;
    let public = ECPublicKey::new(point);

    let r = U::from_be_bytes(&response[..field_len]);
    let s = U::from_be_bytes(&response[field_len..]);
    if r >= curve.scalar_field().modulus() || s >= curve.scalar_field().modulus() {
        return Err(bad_encoding());
    }
    let signature = ECSignature::new(curve.scalar_field().from(r), curve.scalar_field().from(s));

    let hash = Sha1::digest(challenge);
    let message_hash = curve.scalar_field().from(U::from_be_bytes(&hash));

    public.verify(message_hash, &signature).map_err(|_| Error::ProtocolError {
        stage: "active authentication",
        cause: "ECDSA signature verification failed".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_truncated_ec_response() {
        let curve = named::secp256r1();
        let generator = curve.generator();
        let (x, y) = (generator.x().unwrap().to_uint(), generator.y().unwrap().to_uint());
        let mut point_bytes = vec![0x04u8];
        point_bytes.extend_from_slice(&x.to_be_bytes());
        point_bytes.extend_from_slice(&y.to_be_bytes());

        let challenge = [0u8; CHALLENGE_LEN];
        let short_response = vec![0u8; 10];
        assert!(verify_ecdsa(curve, &point_bytes, &challenge, &short_response).is_err());
    }
}
