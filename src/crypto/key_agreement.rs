//! Bridges the generic, statically-typed group arithmetic in [`super::groups`]
//! to the object-safe [`super::KeyAgreementAlgorithm`] trait, so that a key
//! agreement algorithm read from an arbitrary `SubjectPublicKeyInfo` can be
//! used without knowing its concrete group type ahead of time.

use {
    super::{
        groups::{named, EllipticCurve},
        mod_ring::{ModRing, RingRefExt, UintExp, UintMont},
        parse_int, parse_uint_os, CryptoCoreRng, KeyAgreementAlgorithm, PrivateKey, PublicKey,
    },
    crate::asn1::public_key_info::{DhAlgoParameters, EcParameters, FieldId, SubjectPublicKeyInfo},
    anyhow::{anyhow, bail, ensure, Result},
    der::{asn1::ObjectIdentifier as Oid, Decode},
    ruint::{
        aliases::{U192, U256, U384},
        Uint,
    },
    std::fmt,
    subtle::ConditionallySelectable,
};

type U224 = Uint<224, 4>;
type U320 = Uint<320, 5>;
type U512 = Uint<512, 8>;
type U521 = Uint<521, 9>;

/// Large enough to hold any Diffie-Hellman modulus seen in eMRTD PKI
/// (1024 to 4096 bits); explicit parameters are not restricted to the
/// standardized PACE groups the way `ModPGroup` usage elsewhere is.
type DhUint = Uint<4096, 64>;

const OID_SECP192R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.1");
const OID_SECP224R1: Oid = Oid::new_unwrap("1.3.132.0.33");
const OID_SECP256R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.7");
const OID_SECP384R1: Oid = Oid::new_unwrap("1.3.132.0.34");
const OID_SECP521R1: Oid = Oid::new_unwrap("1.3.132.0.35");
const OID_BRAINPOOL_P224R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.5");
const OID_BRAINPOOL_P256R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.7");
const OID_BRAINPOOL_P320R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.9");
const OID_BRAINPOOL_P384R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.11");
const OID_BRAINPOOL_P512R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.13");

/// Picks the named curve matching an explicit `NamedCurve` OID.
pub(super) fn named_curve_by_oid(oid: Oid) -> Result<Box<dyn KeyAgreementAlgorithm>> {
    Ok(match oid {
        OID_SECP192R1 => Box::new(named::secp192r1()),
        OID_SECP224R1 => Box::new(named::secp224r1()),
        OID_SECP256R1 => Box::new(named::secp256r1()),
        OID_SECP384R1 => Box::new(named::secp384r1()),
        OID_SECP521R1 => Box::new(named::secp521r1()),
        OID_BRAINPOOL_P224R1 => Box::new(named::brainpool_p224r1()),
        OID_BRAINPOOL_P256R1 => Box::new(named::brainpool_p256r1()),
        OID_BRAINPOOL_P320R1 => Box::new(named::brainpool_p320r1()),
        OID_BRAINPOOL_P384R1 => Box::new(named::brainpool_p384r1()),
        OID_BRAINPOOL_P512R1 => Box::new(named::brainpool_p512r1()),
        _ => bail!("Unsupported named curve {oid}"),
    })
}

/// Builds an `EllipticCurve` from explicit `EcParameters`, picking the
/// smallest standard field width that fits the prime. Doc 9303 profiles
/// only ever use explicit parameters to restate one of the standardized
/// curves, so there is no need to support arbitrary field sizes.
pub(super) fn ec_algorithm_from_explicit(params: &EcParameters) -> Result<Box<dyn KeyAgreementAlgorithm>> {
    let FieldId::Prime(prime) = &params.field_id else {
        bail!("Only prime fields are supported for explicit EC parameters");
    };
    let bytes = prime.as_bytes();
    let len = bytes.iter().position(|&b| b != 0).map_or(0, |trim| bytes.len() - trim);
    match len {
        0..=24 => Ok(Box::new(build_curve::<U192, U192>(params)?)),
        25..=28 => Ok(Box::new(build_curve::<U224, U224>(params)?)),
        29..=32 => Ok(Box::new(build_curve::<U256, U256>(params)?)),
        33..=40 => Ok(Box::new(build_curve::<U320, U320>(params)?)),
        41..=48 => Ok(Box::new(build_curve::<U384, U384>(params)?)),
        49..=64 => Ok(Box::new(build_curve::<U512, U512>(params)?)),
        65..=66 => Ok(Box::new(build_curve::<U521, U521>(params)?)),
        _ => bail!("Unsupported explicit curve field size ({len} bytes)"),
    }
}

fn build_curve<U, V>(params: &EcParameters) -> Result<EllipticCurve<U, V>>
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    let FieldId::Prime(prime) = &params.field_id else {
        bail!("Only prime fields are supported for explicit EC parameters");
    };
    let modulus: U = parse_int(prime)?;
    let a: U = parse_uint_os(&params.curve.a)?;
    let b: U = parse_uint_os(&params.curve.b)?;
    let base = params.base.as_bytes();
    ensure!(base.first() == Some(&4), "Only uncompressed base points are supported");
    ensure!(base.len() % 2 == 1, "Invalid base point length");
    let field_bytes = base.len() / 2;
    let x = U::from_be_bytes(&base[1..1 + field_bytes]);
    let y = U::from_be_bytes(&base[1 + field_bytes..]);
    let order: V = parse_int(&params.order)?;
    let cofactor = match &params.cofactor {
        Some(cofactor) => parse_int(cofactor)?,
        None => V::from_u64(1),
    };
    EllipticCurve::new(modulus, a, b, x, y, order, cofactor)
}

impl<U, V> fmt::Display for EllipticCurve<U, V>
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Elliptic curve Diffie-Hellman over a {}-byte field", self.base_field().modulus().to_be_bytes().len())
    }
}

impl<U, V> KeyAgreementAlgorithm for EllipticCurve<U, V>
where
    U: UintMont + ConditionallySelectable + 'static,
    V: UintMont + UintExp + 'static,
{
    fn subject_public_key(&self, pubkey: &SubjectPublicKeyInfo) -> Result<PublicKey> {
        let SubjectPublicKeyInfo::Unknown(any) = pubkey else {
            bail!("Not an elliptic-curve public key");
        };
        let bytes = any
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| anyhow!("Public key is not a whole number of bytes"))?;
        ensure!(bytes.first() == Some(&4), "Only uncompressed points are supported");
        ensure!(bytes.len() % 2 == 1, "Invalid point length");
        let field_bytes = bytes.len() / 2;
        let x = self.base_field().from(U::from_be_bytes(&bytes[1..1 + field_bytes]));
        let y = self.base_field().from(U::from_be_bytes(&bytes[1 + field_bytes..]));
        self.from_affine(x, y)?;
        Ok(PublicKey(bytes.to_vec()))
    }

    fn generate_key_pair(&self, rng: &mut dyn CryptoCoreRng) -> (PrivateKey, PublicKey) {
        let private = self.scalar_field().random(rng);
        let public = self.generator() * private;
        let (x, y) = public.as_monty().expect("freshly generated key is never the identity");
        let x = self.base_field().from_montgomery(x).to_uint().to_be_bytes();
        let y = self.base_field().from_montgomery(y).to_uint().to_be_bytes();
        let mut encoded = Vec::with_capacity(1 + x.len() + y.len());
        encoded.push(4);
        encoded.extend(x);
        encoded.extend(y);
        (PrivateKey(Box::new(private.to_uint())), PublicKey(encoded))
    }

    fn key_agreement(&self, private: &PrivateKey, public: &PublicKey) -> Result<Vec<u8>> {
        let private = private
            .0
            .downcast_ref::<V>()
            .ok_or_else(|| anyhow!("Private key is not for this curve"))?;
        let scalar = self.scalar_field().from(*private);
        let public = self.subject_public_key_point(public)?;
        let shared = public * scalar;
        let x = shared
            .x()
            .ok_or_else(|| anyhow!("Shared secret is the point at infinity"))?;
        Ok(x.to_uint().to_be_bytes())
    }
}

impl<U, V> EllipticCurve<U, V>
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    fn subject_public_key_point(&self, public: &PublicKey) -> Result<super::groups::EllipticCurvePoint<'_, U, V>> {
        let bytes = public.as_ref();
        ensure!(bytes.first() == Some(&4), "Only uncompressed points are supported");
        ensure!(bytes.len() % 2 == 1, "Invalid point length");
        let field_bytes = bytes.len() / 2;
        let x = self.base_field().from(U::from_be_bytes(&bytes[1..1 + field_bytes]));
        let y = self.base_field().from(U::from_be_bytes(&bytes[1 + field_bytes..]));
        self.from_affine(x, y)
    }
}

/// Classic PKCS#3-style Diffie-Hellman over an arbitrary mod-P group, read
/// from an explicit `DhAlgoParameters`.
///
/// Unlike [`super::groups::ModPGroup`], this does not require the subgroup
/// order to be known: `DhAlgoParameters` carries only the modulus, generator,
/// and optionally the exponent's bit length, so the private key is simply
/// sampled from that range rather than validated against a known order.
#[derive(Debug)]
pub(super) struct RawDhGroup {
    field:         ModRing<DhUint>,
    generator:     DhUint,
    exponent_bits: usize,
}

impl fmt::Display for RawDhGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Diffie-Hellman mod-P group over a {}-byte modulus", self.field.modulus().to_be_bytes().len())
    }
}

impl RawDhGroup {
    pub(super) fn from_parameters(params: &DhAlgoParameters) -> Result<Self> {
        let modulus: DhUint = parse_int(&params.prime)?;
        let generator: DhUint = parse_int(&params.base)?;
        ensure!(generator < modulus, "Generator not in field");
        let field = ModRing::from_modulus(modulus);
        let exponent_bits = params
            .private_value_length
            .map(|bits| bits as usize)
            .unwrap_or_else(|| modulus.bit_len());
        Ok(Self {
            field,
            generator,
            exponent_bits,
        })
    }

    fn max_private_key(&self) -> DhUint {
        if self.exponent_bits >= DhUint::BITS {
            DhUint::MAX
        } else {
            (DhUint::from_u64(1) << self.exponent_bits) - DhUint::from_u64(1)
        }
    }
}

impl KeyAgreementAlgorithm for RawDhGroup {
    fn subject_public_key(&self, pubkey: &SubjectPublicKeyInfo) -> Result<PublicKey> {
        let SubjectPublicKeyInfo::Unknown(any) = pubkey else {
            bail!("Not a Diffie-Hellman public key");
        };
        let bytes = any
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| anyhow!("Public key is not a whole number of bytes"))?;
        let value: DhUint = parse_int(&der::asn1::Int::from_der(bytes)?)?;
        ensure!(value < self.field.modulus(), "Public key not in field");
        Ok(PublicKey(value.to_be_bytes()))
    }

    fn generate_key_pair(&self, rng: &mut dyn CryptoCoreRng) -> (PrivateKey, PublicKey) {
        let private = DhUint::random(rng, self.max_private_key());
        let public = self.field.from(self.generator).pow_ct(private);
        (PrivateKey(Box::new(private)), PublicKey(public.to_uint().to_be_bytes()))
    }

    fn key_agreement(&self, private: &PrivateKey, public: &PublicKey) -> Result<Vec<u8>> {
        let private = private
            .0
            .downcast_ref::<DhUint>()
            .ok_or_else(|| anyhow!("Private key is not for this group"))?;
        let public = DhUint::from_be_bytes(public.as_ref());
        ensure!(public < self.field.modulus(), "Public key not in field");
        let shared = self.field.from(public).pow_ct(*private);
        Ok(shared.to_uint().to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::asn1::public_key_info::{Curve, EcParameters, FieldId},
        der::asn1::{Int, OctetString},
        rand::thread_rng,
    };

    /// Minimal-length, sign-safe big-endian encoding for a DER `Int`.
    fn der_uint(mut bytes: &[u8]) -> Vec<u8> {
        while bytes.len() > 1 && bytes[0] == 0 {
            bytes = &bytes[1..];
        }
        if bytes[0] & 0x80 != 0 {
            let mut padded = vec![0];
            padded.extend_from_slice(bytes);
            padded
        } else {
            bytes.to_vec()
        }
    }

    #[test]
    fn test_ec_key_agreement_round_trip() {
        let curve = named::secp256r1();
        let mut rng = thread_rng();
        let (alice_private, alice_public) = curve.generate_key_pair(&mut rng);
        let (bob_private, bob_public) = curve.generate_key_pair(&mut rng);

        let alice_shared = curve.key_agreement(&alice_private, &bob_public).unwrap();
        let bob_shared = curve.key_agreement(&bob_private, &alice_public).unwrap();
        assert_eq!(alice_shared, bob_shared);
    }

    #[test]
    fn test_raw_dh_key_agreement_round_trip() {
        // A small (non-cryptographic) prime, large enough to exercise the
        // full generate/agree path without a 4096-bit modexp.
        let params = DhAlgoParameters {
            prime:                Int::new(&2147483647_u32.to_be_bytes()).unwrap(),
            base:                 Int::new(&[5]).unwrap(),
            private_value_length: Some(16),
        };
        let group = RawDhGroup::from_parameters(&params).unwrap();
        let mut rng = thread_rng();
        let (alice_private, alice_public) = group.generate_key_pair(&mut rng);
        let (bob_private, bob_public) = group.generate_key_pair(&mut rng);

        let alice_shared = group.key_agreement(&alice_private, &bob_public).unwrap();
        let bob_shared = group.key_agreement(&bob_private, &alice_public).unwrap();
        assert_eq!(alice_shared, bob_shared);
    }

    #[test]
    fn test_named_curve_by_oid() {
        assert!(named_curve_by_oid(OID_SECP256R1).is_ok());
        assert!(named_curve_by_oid(OID_BRAINPOOL_P256R1).is_ok());
        assert!(named_curve_by_oid(Oid::new_unwrap("1.2.3.4")).is_err());
    }

    #[test]
    fn test_explicit_params_dispatch_by_field_size() {
        let curve = named::secp256r1();
        let modulus = curve.base_field().modulus();
        let (x_monty, y_monty) = curve.generator().as_monty().unwrap();
        let x = curve.base_field().from_montgomery(x_monty).to_uint().to_be_bytes();
        let y = curve.base_field().from_montgomery(y_monty).to_uint().to_be_bytes();
        let mut base = vec![4];
        base.extend(x);
        base.extend(y);

        let params = EcParameters {
            version:  1,
            field_id: FieldId::Prime(Int::new(&der_uint(&modulus.to_be_bytes())).unwrap()),
            curve:    Curve {
                a:    OctetString::new(curve.a().to_uint().to_be_bytes()).unwrap(),
                b:    OctetString::new(curve.b().to_uint().to_be_bytes()).unwrap(),
                seed: None,
            },
            base:     OctetString::new(base).unwrap(),
            order:    Int::new(&der_uint(&curve.scalar_field().modulus().to_be_bytes())).unwrap(),
            cofactor: Some(Int::new(&[1]).unwrap()),
        };
        let algo = ec_algorithm_from_explicit(&params).unwrap();
        assert_eq!(algo.to_string(), curve.to_string());
    }
}
