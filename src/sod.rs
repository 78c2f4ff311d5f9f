//! Full SOd verification and construction (ICAO 9303-10 4.6.2, C11).
//!
//! `crypto::signature::EfSod::verify_signature` only checks the CMS
//! signature over `signedAttrs`. This module completes the chain per RFC
//! 5652 5.4 and ICAO 9303-10 4.6.2.2: it checks the `messageDigest` signed
//! attribute against the actual encapsulated content, exposes per-data-group
//! hash comparison against `LdsSecurityObject.data_group_hash_values`, and
//! does a structural trust-anchor check in the same spirit as
//! `crypto::pki::MasterList::verify`.
//!
//! `build` constructs a fresh, ECDSA-signed SOd from scratch. RSA signing is
//! deliberately out of scope (see `crypto::rsa`'s module doc: that key is
//! verify-only), so only ECDSA Document Signers are supported here. Rather
//! than constructing `cms`'s `SignedData`/`SignerInfo` Rust values directly,
//! the CMS structure is hand-built over `crate::tlv::Node` — the same
//! generic BER/DER codec `lds`, `cbeff` and `biometrics::iso19794` already
//! use — then round-tripped through `EfSod::from_der` to produce a real
//! typed value.

use crate::{
    asn1::{
        emrtd::{EfSod, LdsSecurityObject},
        ContentType, DigestAlgorithmIdentifier,
    },
    crypto::{
        ecdsa::ECPrivateKey,
        groups::EllipticCurve,
        mod_ring::{RingRefExt, UintExp, UintMont},
        CryptoCoreRng,
    },
    error::{Error, Result},
    tlv::Node,
};
use der::{
    asn1::{Int, ObjectIdentifier as Oid, OctetString},
    Decode, Encode,
};
use subtle::ConditionallySelectable;

const ID_CONTENT_TYPE: &str = "1.2.840.113549.1.9.3";
const ID_MESSAGE_DIGEST: &str = "1.2.840.113549.1.9.4";
const ID_SIGNED_DATA: &str = "1.2.840.113549.1.7.2";

fn asn1_err(e: der::Error) -> Error {
    Error::MalformedAsn1 { reason: e.to_string() }
}

/// Looks up a `signedAttrs` attribute value by OID, reading the attribute
/// set as a plain [`Node`] rather than through `cms`'s typed `Attribute`
/// (this module avoids depending on that type's exact field names, the same
/// way the rest of this crate's TLV-based files do).
fn attribute_value<'a>(attrs: &'a Node, oid: &str) -> Result<Option<&'a Node>> {
    let target = Oid::new_unwrap(oid).to_der().map_err(asn1_err)?;
    for attr in attrs.as_children()? {
        let fields = attr.as_children()?;
        let Some(oid_node) = fields.first() else { continue };
        if oid_node.encode() != target {
            continue;
        }
        let values = fields.get(1).ok_or(Error::MalformedTlv { reason: "attribute has no values" })?;
        return Ok(values.as_children()?.first());
    }
    Ok(None)
}

/// Verifies the `messageDigest` signed attribute against the SOd's actual
/// encapsulated content (the `LdsSecurityObject` DER bytes), on top of the
/// CMS signature check `EfSod::verify_signature` already does.
///
/// Returns the parsed [`LdsSecurityObject`] for the caller to then check
/// individual data groups against with [`hash_matches`] as they are read
/// off the chip.
pub fn verify(sod: &EfSod) -> Result<LdsSecurityObject> {
    sod.verify_signature().map_err(|_| Error::SignatureInvalid)?;

    let lso = sod.lds_security_object().map_err(asn1_err)?;
    let econtent = sod.econtent_bytes().map_err(asn1_err)?;

    let attrs_der = sod.signed_attrs_der().map_err(|e| Error::MalformedAsn1 { reason: e.to_string() })?;
    let attrs = Node::decode(&attrs_der)?;
    let message_digest = attribute_value(&attrs, ID_MESSAGE_DIGEST)?
        .ok_or(Error::ProtocolError {
            stage: "sod",
            cause: "signedAttrs is missing the messageDigest attribute".into(),
        })?
        .as_bytes()?;

    let expected = lso.hash_algorithm.hash_bytes(&econtent);
    if message_digest != expected.as_slice() {
        return Err(Error::SignatureInvalid);
    }

    Ok(lso)
}

/// Recomputes the hash of `data` (a data group's raw file contents) and
/// compares it against the SOd's stored hash for that data group number.
pub fn verify_data_group(lso: &LdsSecurityObject, dg_number: u8, data: &[u8]) -> Result<()> {
    let expected = lso
        .hash_for_dg(dg_number as usize)
        .ok_or(Error::ProtocolError {
            stage: "sod",
            cause: format!("no stored hash for DG{dg_number}"),
        })?;
    let actual = lso.hash_algorithm.hash_bytes(data);
    if actual != expected {
        return Err(Error::MismatchedDigest { dg: dg_number });
    }
    Ok(())
}

/// Structural-only trust-anchor check, in the same spirit as
/// `crypto::pki::MasterList::verify`: this crate does not perform
/// CSCA->DSC chain validation, so this only checks that the SOd's signer
/// certificate's issuer matches the subject of one of the supplied anchors.
/// An empty `trust_anchors` list skips the check entirely (Non-goal).
pub fn verify_trust_anchor(sod: &EfSod, trust_anchors: &[cms::cert::x509::Certificate]) -> Result<()> {
    if trust_anchors.is_empty() {
        return Ok(());
    }
    let signer = sod.signer_certificate().ok_or(Error::UntrustedSigner)?;
    let issuer = &signer.tbs_certificate.issuer;
    let trusted = trust_anchors
        .iter()
        .any(|anchor| &anchor.tbs_certificate.subject == issuer);
    if trusted {
        Ok(())
    } else {
        Err(Error::UntrustedSigner)
    }
}

/// Pieces identifying the signer needed to build `SignerInfo.sid`
/// (`IssuerAndSerialNumber`) and embed the Document Signer Certificate, kept
/// as opaque DER: this crate does not issue certificates (Non-goal), so it
/// never needs to interpret them beyond re-embedding.
pub struct SignerIdentity<'a> {
    /// DER bytes of the Document Signer Certificate (`Certificate`, the
    /// whole `SEQUENCE`), embedded as-is into `SignedData.certificates`.
    pub certificate_der: &'a [u8],
    /// DER bytes of the certificate's `issuer` field (a `Name`).
    pub issuer_der: &'a [u8],
    /// Big-endian magnitude bytes of the certificate's serial number.
    pub serial_number: &'a [u8],
}

fn der_uint(bytes: &[u8]) -> Result<Int> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len().saturating_sub(1));
    let mut trimmed = bytes[start..].to_vec();
    if trimmed.first().is_some_and(|&b| b & 0x80 != 0) {
        trimmed.insert(0, 0);
    }
    Int::new(&trimmed).map_err(asn1_err)
}

fn node_of(der_bytes: Vec<u8>) -> Result<Node> {
    Ok(Node::decode(&der_bytes)?)
}

/// `ecdsa-with-SHAxxx` (RFC 5758 3.2), picked by the hash's digest length
/// rather than naming `DigestAlgorithmIdentifier`'s private `Algorithm`
/// enum directly.
fn ecdsa_signature_oid(hash_algorithm: DigestAlgorithmIdentifier) -> Oid {
    match hash_algorithm.digest_len() {
        20 => Oid::new_unwrap("1.2.840.10045.4.1"),
        28 => Oid::new_unwrap("1.2.840.10045.4.3.1"),
        32 => Oid::new_unwrap("1.2.840.10045.4.3.2"),
        48 => Oid::new_unwrap("1.2.840.10045.4.3.3"),
        _ => Oid::new_unwrap("1.2.840.10045.4.3.4"),
    }
}

/// Builds a fresh SOd over `lso`, signed with an ECDSA Document Signer key.
///
/// `k` must be a fresh, secret, uniformly random scalar — see
/// `ECPrivateKey::sign`'s caveat on reuse.
pub fn build<U>(
    lso: &LdsSecurityObject,
    signer: &SignerIdentity<'_>,
    curve: &EllipticCurve<U, U>,
    signing_key: &ECPrivateKey<'_, U>,
    rng: &mut dyn CryptoCoreRng,
) -> Result<EfSod>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    let lso_der = lso.to_der().map_err(asn1_err)?;
    let hash_algorithm = lso.hash_algorithm;
    let message_digest = hash_algorithm.hash_bytes(&lso_der);

    let content_type_attr = Node::constructed(
        0x30u32,
        vec![
            node_of(Oid::new_unwrap(ID_CONTENT_TYPE).to_der().map_err(asn1_err)?)?,
            Node::constructed(
                0x31u32,
                vec![node_of(
                    <LdsSecurityObject as ContentType>::CONTENT_TYPE.to_der().map_err(asn1_err)?,
                )?],
            ),
        ],
    );
    let message_digest_attr = Node::constructed(
        0x30u32,
        vec![
            node_of(Oid::new_unwrap(ID_MESSAGE_DIGEST).to_der().map_err(asn1_err)?)?,
            Node::constructed(
                0x31u32,
                vec![node_of(
                    OctetString::new(message_digest).map_err(asn1_err)?.to_der().map_err(asn1_err)?,
                )?],
            ),
        ],
    );
    let attrs = vec![content_type_attr, message_digest_attr];

    // RFC 5652 5.4: the identical attribute bytes get a universal SET tag
    // (0x31) when hashed for signing, but an [0] IMPLICIT tag (0xA0) when
    // stored in SignerInfo.
    let attrs_for_signing = Node::constructed(0x31u32, attrs.clone()).encode();
    let signed_attrs_wire = Node::constructed(0xA0u32, attrs);

    let signature_oid = ecdsa_signature_oid(hash_algorithm);
    let hash = hash_algorithm.hash_bytes(&attrs_for_signing);
    let message_hash = curve.scalar_field().from(U::from_be_bytes(&hash));
    let k = curve.scalar_field().random(rng);
    let signature = signing_key
        .sign(curve, message_hash, k)
        .map_err(|_| Error::CryptoFailed { stage: "sod-sign" })?;

    let sig_value_der = Node::constructed(
        0x30u32,
        vec![
            node_of(der_uint(&signature.r().to_uint().to_be_bytes())?.to_der().map_err(asn1_err)?)?,
            node_of(der_uint(&signature.s().to_uint().to_be_bytes())?.to_der().map_err(asn1_err)?)?,
        ],
    )
    .encode();

    let version = node_of(Int::new(&[1]).map_err(asn1_err)?.to_der().map_err(asn1_err)?)?;
    let sid = Node::constructed(
        0x30u32,
        vec![Node::decode(signer.issuer_der)?, node_of(der_uint(signer.serial_number)?.to_der().map_err(asn1_err)?)?],
    );
    let digest_algorithm = node_of(hash_algorithm.to_der().map_err(asn1_err)?)?;
    let signature_algorithm =
        Node::constructed(0x30u32, vec![node_of(signature_oid.to_der().map_err(asn1_err)?)?]);
    let signature_node =
        node_of(OctetString::new(sig_value_der).map_err(asn1_err)?.to_der().map_err(asn1_err)?)?;

    let signer_info = Node::constructed(
        0x30u32,
        vec![version, sid, digest_algorithm, signed_attrs_wire, signature_algorithm, signature_node],
    );

    let digest_algorithms = Node::constructed(0x31u32, vec![digest_algorithm_for_set(hash_algorithm)?]);
    let econtent_type = node_of(
        <LdsSecurityObject as ContentType>::CONTENT_TYPE.to_der().map_err(asn1_err)?,
    )?;
    let econtent = Node::constructed(
        0xA0u32,
        vec![node_of(OctetString::new(lso_der).map_err(asn1_err)?.to_der().map_err(asn1_err)?)?],
    );
    let encap_content_info = Node::constructed(0x30u32, vec![econtent_type, econtent]);
    let certificates = Node::constructed(0xA0u32, vec![Node::decode(signer.certificate_der)?]);
    let signer_infos = Node::constructed(0x31u32, vec![signer_info]);

    let signed_data = Node::constructed(
        0x30u32,
        vec![
            node_of(Int::new(&[3]).map_err(asn1_err)?.to_der().map_err(asn1_err)?)?,
            digest_algorithms,
            encap_content_info,
            certificates,
            signer_infos,
        ],
    );

    let content_type = node_of(Oid::new_unwrap(ID_SIGNED_DATA).to_der().map_err(asn1_err)?)?;
    let content = Node::constructed(0xA0u32, vec![signed_data]);
    let content_info = Node::constructed(0x30u32, vec![content_type, content]);

    // APPLICATION 23, constructed: class 01, constructed bit set, number 23.
    let ef_sod = Node::constructed(0x77u32, vec![content_info]);
    EfSod::from_der(&ef_sod.encode()).map_err(asn1_err)
}

/// The `digestAlgorithms` SET entry is a fresh node: `digest_algorithm` above
/// is consumed into `SignerInfo`, and `Node` isn't `Copy`.
fn digest_algorithm_for_set(hash_algorithm: DigestAlgorithmIdentifier) -> Result<Node> {
    node_of(hash_algorithm.to_der().map_err(asn1_err)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::groups::named::secp256r1;
    use rand::thread_rng;

    // `Algorithm` isn't exported outside `asn1`; go through `DigestAlgorithmIdentifier`'s
    // own `Decode` impl with a hand-built SHA-256 `AlgorithmIdentifier` instead.
    fn sha256() -> DigestAlgorithmIdentifier {
        let oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");
        let der = Node::constructed(
            0x30u32,
            vec![node_of(oid.to_der().unwrap()).unwrap(), Node::primitive(0x05u32, vec![])],
        )
        .encode();
        DigestAlgorithmIdentifier::from_der(&der).unwrap()
    }

    fn sample_lso() -> LdsSecurityObject {
        use crate::asn1::emrtd::DataGroupHash;
        LdsSecurityObject {
            version: 0,
            hash_algorithm: sha256(),
            data_group_hash_values: vec![DataGroupHash {
                data_group_number: 1,
                hash_value: OctetString::new(vec![0xAA; 32]).unwrap(),
            }],
            lds_version_info: None,
        }
    }

    fn rdn_name(cn: &str) -> Vec<u8> {
        let oid = Oid::new_unwrap("2.5.4.3").to_der().unwrap();
        let atv = Node::constructed(
            0x30u32,
            vec![node_of(oid).unwrap(), Node::primitive(0x0Cu32, cn.as_bytes().to_vec())],
        );
        Node::constructed(0x30u32, vec![Node::constructed(0x31u32, vec![atv])]).encode()
    }

    fn pad32(mut bytes: Vec<u8>) -> Vec<u8> {
        while bytes.len() < 32 {
            bytes.insert(0, 0);
        }
        bytes
    }

    /// A minimal, structurally valid self-signed-looking EC certificate
    /// carrying `public_point`: exercises `verify`/`verify_signature`'s
    /// actual `x509_cert::Certificate` decode path end to end, rather than
    /// standing in an opaque blob that skips it.
    fn test_certificate(public_x: Vec<u8>, public_y: Vec<u8>) -> Vec<u8> {
        let ec_point = {
            let mut v = vec![0x00u8, 0x04]; // BIT STRING unused-bits=0, uncompressed point
            v.extend(pad32(public_x));
            v.extend(pad32(public_y));
            v
        };
        let spki = Node::constructed(
            0x30u32,
            vec![
                Node::constructed(
                    0x30u32,
                    vec![
                        node_of(Oid::new_unwrap("1.2.840.10045.2.1").to_der().unwrap()).unwrap(),
                        node_of(Oid::new_unwrap("1.2.840.10045.3.1.7").to_der().unwrap()).unwrap(),
                    ],
                ),
                Node::primitive(0x03u32, ec_point),
            ],
        );
        let validity = Node::constructed(
            0x30u32,
            vec![
                Node::primitive(0x17u32, b"250101000000Z".to_vec()),
                Node::primitive(0x17u32, b"350101000000Z".to_vec()),
            ],
        );
        let signature_alg = Node::constructed(
            0x30u32,
            vec![node_of(Oid::new_unwrap("1.2.840.10045.4.3.2").to_der().unwrap()).unwrap()],
        );
        let name = Node::decode(&rdn_name("Test CSCA")).unwrap();
        let tbs = Node::constructed(
            0x30u32,
            vec![
                node_of(der_uint(&[0x01]).unwrap().to_der().unwrap()).unwrap(),
                signature_alg.clone(),
                name.clone(),
                validity,
                name,
                spki,
            ],
        );
        Node::constructed(
            0x30u32,
            vec![tbs, signature_alg, Node::primitive(0x03u32, vec![0x00, 0xAB, 0xCD])],
        )
        .encode()
    }

    #[test]
    fn test_build_then_verify_round_trips() {
        let curve = secp256r1();
        let mut rng = thread_rng();
        let scalar = curve.scalar_field().random(&mut rng);
        let signing_key = ECPrivateKey::new(scalar);
        let public_point = curve.generator() * scalar;

        let cert_der = test_certificate(
            public_point.x().unwrap().to_uint().to_be_bytes(),
            public_point.y().unwrap().to_uint().to_be_bytes(),
        );
        let issuer_der = rdn_name("Test CSCA");
        let signer = SignerIdentity {
            certificate_der: &cert_der,
            issuer_der: &issuer_der,
            serial_number: &[0x01],
        };

        let lso = sample_lso();
        let sod = build(&lso, &signer, &curve, &signing_key, &mut rng).unwrap();

        let verified = verify(&sod).unwrap();
        assert_eq!(verified, lso);
        assert!(verify_data_group(&verified, 1, &[]).is_err());
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let curve = secp256r1();
        let mut rng = thread_rng();
        let scalar = curve.scalar_field().random(&mut rng);
        let signing_key = ECPrivateKey::new(scalar);
        let public_point = curve.generator() * scalar;

        let cert_der = test_certificate(
            public_point.x().unwrap().to_uint().to_be_bytes(),
            public_point.y().unwrap().to_uint().to_be_bytes(),
        );
        let issuer_der = rdn_name("Test CSCA");
        let signer = SignerIdentity {
            certificate_der: &cert_der,
            issuer_der: &issuer_der,
            serial_number: &[0x01],
        };

        let lso = sample_lso();
        let sod = build(&lso, &signer, &curve, &signing_key, &mut rng).unwrap();

        // Flip a byte inside the encoded SOd's trailing bytes (the
        // signature's OCTET STRING payload lives at the end of the
        // structure) and confirm the CMS signature check now fails rather
        // than silently accepting a forged document.
        let mut tampered = sod.to_der().unwrap();
        let last = tampered.len() - 1;
        tampered[last] ^= 0xFF;
        let tampered_sod = EfSod::from_der(&tampered).unwrap();

        match verify(&tampered_sod) {
            Err(Error::SignatureInvalid) => {}
            other => panic!("expected SignatureInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_tampered_data_group_hash() {
        let curve = secp256r1();
        let mut rng = thread_rng();
        let scalar = curve.scalar_field().random(&mut rng);
        let signing_key = ECPrivateKey::new(scalar);
        let public_point = curve.generator() * scalar;

        let cert_der = test_certificate(
            public_point.x().unwrap().to_uint().to_be_bytes(),
            public_point.y().unwrap().to_uint().to_be_bytes(),
        );
        let issuer_der = rdn_name("Test CSCA");
        let signer = SignerIdentity {
            certificate_der: &cert_der,
            issuer_der: &issuer_der,
            serial_number: &[0x01],
        };

        let lso = sample_lso();
        let sod = build(&lso, &signer, &curve, &signing_key, &mut rng).unwrap();
        let verified = verify(&sod).unwrap();

        let dg1 = b"not the data that was hashed";
        match verify_data_group(&verified, 1, dg1) {
            Err(Error::MismatchedDigest { dg: 1 }) => {}
            other => panic!("expected MismatchedDigest, got {other:?}"),
        }
    }
}
