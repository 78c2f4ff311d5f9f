//! Signature verification for SOD.
//!
//! RSA signer certificates are handled natively (RSASSA-PSS and PKCS#1
//! v1.5), covering the overwhelming majority of deployed Document Signer
//! Certificates. ECDSA-signed SODs (`ecdsa-with-SHAxxx`, RFC 5758 3.2) are
//! also verified, over the NIST/Brainpool P-256 curves `crypto::ecdsa`
//! already supports for Active Authentication.
//!
//! This only checks the CMS signature over `signedAttrs`; it does not
//! recompute per-DG hashes or check the `messageDigest` attribute against
//! the actual encapsulated content — see `crate::sod` for the full SOd
//! verification built on top of this.

use {
    crate::{
        asn1::{
            emrtd::{pki::CscaMasterList, EfSod},
            public_key_info::{AnySubjectPublicKeyInfo, ECAlgoParameters, PubkeyAlgorithmIdentifier, SubjectPublicKeyInfo},
            AnyAlgorithmIdentifier, DigestAlgorithmIdentifier, SignatureAlgorithmIdentifier,
        },
        crypto::{
            ecdsa::{ECPublicKey, ECSignature},
            groups::{named, EllipticCurve},
            mod_ring::{RingRefExt, UintExp, UintMont},
            rsa::RSAPublicKey,
        },
    },
    anyhow::{anyhow, bail, ensure, Result},
    cms::{cert::CertificateChoices, content_info::CmsVersion},
    der::{
        asn1::{Int, ObjectIdentifier as Oid},
        Decode, Encode, Sequence,
    },
    ruint::Uint,
    subtle::ConditionallySelectable,
};

const OID_SECP256R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.7");
const OID_BRAINPOOL_P256R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.7");

/// `Ecdsa-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`, RFC 3279 2.2.3 /
/// X9.62: the DER wrapper around the raw `(r, s)` pair carried on the wire,
/// as opposed to the fixed-width concatenation Active Authentication uses.
#[derive(Clone, Debug, Sequence)]
struct EcdsaSigValue {
    r: Int,
    s: Int,
}

/// Maps the combined "hash+RSA" OIDs used by PKCS#1 v1.5 signatures (RFC
/// 8017 Appendix C, e.g. `sha256WithRSAEncryption`) to the bare digest OID
/// `DigestAlgorithmIdentifier` already knows how to resolve.
fn pkcs1v15_digest_oid(algorithm: Oid) -> Option<Oid> {
    Some(match algorithm.to_string().as_str() {
        "1.2.840.113549.1.1.5" => Oid::new_unwrap("1.3.14.3.2.26"), // sha1WithRSAEncryption
        "1.2.840.113549.1.1.14" => Oid::new_unwrap("2.16.840.1.101.3.4.2.4"), // sha224WithRSAEncryption
        "1.2.840.113549.1.1.11" => Oid::new_unwrap("2.16.840.1.101.3.4.2.1"), // sha256WithRSAEncryption
        "1.2.840.113549.1.1.12" => Oid::new_unwrap("2.16.840.1.101.3.4.2.2"), // sha384WithRSAEncryption
        "1.2.840.113549.1.1.13" => Oid::new_unwrap("2.16.840.1.101.3.4.2.3"), // sha512WithRSAEncryption
        _ => return None,
    })
}

/// Maps the combined "ecdsa-with-SHAxxx" OIDs (RFC 5758 3.2) to the bare
/// digest OID, same idea as [`pkcs1v15_digest_oid`] for RSA.
fn ecdsa_digest_oid(algorithm: Oid) -> Option<Oid> {
    Some(match algorithm.to_string().as_str() {
        "1.2.840.10045.4.1" => Oid::new_unwrap("1.3.14.3.2.26"), // ecdsa-with-SHA1
        "1.2.840.10045.4.3.1" => Oid::new_unwrap("2.16.840.1.101.3.4.2.4"), // ecdsa-with-SHA224
        "1.2.840.10045.4.3.2" => Oid::new_unwrap("2.16.840.1.101.3.4.2.1"), // ecdsa-with-SHA256
        "1.2.840.10045.4.3.3" => Oid::new_unwrap("2.16.840.1.101.3.4.2.2"), // ecdsa-with-SHA384
        "1.2.840.10045.4.3.4" => Oid::new_unwrap("2.16.840.1.101.3.4.2.3"), // ecdsa-with-SHA512
        _ => return None,
    })
}

/// Verifies a DER `Ecdsa-Sig-Value` over `message` against an EC
/// `SubjectPublicKeyInfo`, for whichever curve it names.
fn verify_ecdsa_signature(
    signer_pubkey: &AnySubjectPublicKeyInfo,
    digest: &DigestAlgorithmIdentifier,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let der = signer_pubkey.algorithm.to_der()?;
    let algorithm = PubkeyAlgorithmIdentifier::from_der(&der)?;
    let PubkeyAlgorithmIdentifier::Ec(ECAlgoParameters::NamedCurve(curve_oid)) = algorithm else {
        bail!("SOD signer key is not an EC named-curve key");
    };
    let point_bytes = signer_pubkey
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| anyhow!("EC point is not byte-aligned"))?;
    let sig = EcdsaSigValue::from_der(signature)?;

    match curve_oid {
        OID_SECP256R1 => verify_ecdsa_on_curve(named::secp256r1(), point_bytes, digest, message, &sig),
        OID_BRAINPOOL_P256R1 => {
            verify_ecdsa_on_curve(named::brainpool_p256r1(), point_bytes, digest, message, &sig)
        }
        _ => bail!("Unsupported SOD signer curve: {curve_oid}"),
    }
}

fn verify_ecdsa_on_curve<U>(
    curve: EllipticCurve<U, U>,
    point_bytes: &[u8],
    digest: &DigestAlgorithmIdentifier,
    message: &[u8],
    sig: &EcdsaSigValue,
) -> Result<()>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    let field_len = (curve.base_field().modulus().bit_len() + 7) / 8;
    ensure!(point_bytes.len() == 1 + 2 * field_len && point_bytes[0] == 0x04, "unsupported EC point encoding");

    let x = U::from_be_bytes(&point_bytes[1..1 + field_len]);
    let y = U::from_be_bytes(&point_bytes[1 + field_len..]);
    let point = curve
        .from_affine(curve.base_field().from(x), curve.base_field().from(y))
        .map_err(|_| anyhow!("SOD signer EC point is not on the curve"))?;
    let public = ECPublicKey::new(point);

    let r = U::from_be_bytes(sig.r.as_bytes());
    let s = U::from_be_bytes(sig.s.as_bytes());
    let signature = ECSignature::new(curve.scalar_field().from(r), curve.scalar_field().from(s));

    let hash = digest.hash_bytes(message);
    let message_hash = curve.scalar_field().from(U::from_be_bytes(&hash));

    public.verify(message_hash, &signature)
}

impl EfSod {
    /// Verify the signature of the SOD
    pub fn verify_signature(&self) -> Result<()> {
        let signer = self.signer_info();
        let signature_algo =
            SignatureAlgorithmIdentifier::from_der(&signer.signature_algorithm.to_der()?)?;

        // ICAO 9303-10 4.6.2.2: SignedData must be version 3
        ensure!(
            self.signed_data().version == CmsVersion::V3,
            "SignedData must be version 3"
        );

        // ICAO 9303-10 4.6.2.2: Certificates field is mandatory
        ensure!(
            self.signed_data().certificates.is_some(),
            "SignedData must contain the Certificates field"
        );

        // ICAO 9303-10 4.6.2.2: Crls field must be absent
        ensure!(
            self.signed_data().crls.is_none(),
            "SignedData must not contain the Crls field"
        );

        // Lets just use the first certificate for now, grab the signer public key
        let cert = self
            .signer_certificate()
            .ok_or_else(|| anyhow!("Certificate not found in SignedData.certificates"))?;
        let signer_pubkey = &cert.tbs_certificate.subject_public_key_info;

        // Message
        // ICAO 9303-10 4.6.2.2: signedAttrs field is mandatory
        let attrs = &self
            .signer_info()
            .signed_attrs
            .as_ref()
            .ok_or_else(|| anyhow!("SignedData must contain the signedAttrs field"))?;
        let attrs_der = attrs.to_der()?;

        // Signature
        let signature = signer.signature.as_bytes();

        type Uint2048 = Uint<2048, 32>;
        match signature_algo {
            SignatureAlgorithmIdentifier::Rsa(params) => {
                let pubkey = RSAPublicKey::<Uint2048>::try_from(SubjectPublicKeyInfo::try_from(
                    signer_pubkey,
                )?)?;
                pubkey.verify_pss(&attrs_der, signature, &params)
            }
            SignatureAlgorithmIdentifier::Unknown(any) => {
                if let Some(digest_oid) = pkcs1v15_digest_oid(any.algorithm) {
                    let digest_algo = DigestAlgorithmIdentifier::try_from(&AnyAlgorithmIdentifier {
                        algorithm:  digest_oid,
                        parameters: None,
                    })?;
                    let pubkey = RSAPublicKey::<Uint2048>::try_from(SubjectPublicKeyInfo::try_from(
                        signer_pubkey,
                    )?)?;
                    return pubkey.verify_pkcs1v15(&attrs_der, signature, digest_algo);
                }
                let Some(digest_oid) = ecdsa_digest_oid(any.algorithm) else {
                    bail!("Unsupported SOD signature algorithm: {}", any.algorithm);
                };
                let digest_algo = DigestAlgorithmIdentifier::try_from(&AnyAlgorithmIdentifier {
                    algorithm:  digest_oid,
                    parameters: None,
                })?;
                let SubjectPublicKeyInfo::Unknown(ec_pubkey) =
                    SubjectPublicKeyInfo::try_from(signer_pubkey)?
                else {
                    bail!("SOD signer key is not an EC key");
                };
                verify_ecdsa_signature(&ec_pubkey, &digest_algo, &attrs_der, signature)
            }
        }
    }
}

impl EfSod {
    /// The first `Certificate` choice in `SignedData.certificates`: the SOD
    /// carries exactly one Document Signer Certificate in practice, so this
    /// doesn't attempt to match against the signer's `sid`.
    pub fn signer_certificate(&self) -> Option<&cms::cert::x509::Certificate> {
        self.signed_data().certificates.as_ref()?.0.iter().find_map(|choice| {
            if let CertificateChoices::Certificate(cert) = choice {
                Some(cert)
            } else {
                None
            }
        })
    }

    /// The DER bytes of `signedAttrs` as signed (RFC 5652 5.4): this, not
    /// the raw `eContent`, is what the SOD's signature covers.
    pub fn signed_attrs_der(&self) -> Result<Vec<u8>> {
        let attrs = self
            .signer_info()
            .signed_attrs
            .as_ref()
            .ok_or_else(|| anyhow!("SignedData must contain the signedAttrs field"))?;
        Ok(attrs.to_der()?)
    }
}
