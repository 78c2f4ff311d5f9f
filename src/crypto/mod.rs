//! Implements the required cryptography.
//!
//! Primarily based on TR-03111.

mod codec;
mod ecdsa;
pub mod groups;
mod key_agreement;
pub mod mod_ring;
mod pki;
mod rsa;
mod signature;
pub mod symmetric;

pub use ecdsa::{ECPrivateKey, ECPublicKey, ECSignature};

pub use codec::Codec;
use {
    crate::asn1::public_key_info::{ECAlgoParameters, PubkeyAlgorithmIdentifier, SubjectPublicKeyInfo},
    anyhow::{bail, ensure, Result},
    der::{
        asn1::{Int, OctetString},
        Decode, Encode,
    },
    rand::{CryptoRng, RngCore},
    ruint::Uint,
    std::{
        any::Any,
        fmt::{Debug, Display},
    },
};

pub trait CryptoCoreRng: CryptoRng + RngCore {}

impl<T> CryptoCoreRng for T where T: CryptoRng + RngCore {}

/// Opaque wrapper for public keys.
///
/// Derefs as a byte slice.
pub struct PublicKey(Vec<u8>);

/// Opaque wrapper for private keys.
pub struct PrivateKey(Box<dyn Any>);

pub trait DiffieHellman {
    fn generate_private_key(&self, rng: &mut dyn CryptoCoreRng) -> Vec<u8>;
    fn private_to_public(&self, private: &[u8]) -> Result<Vec<u8>>;
    fn shared_secret(&self, private: &[u8], public: &[u8]) -> Result<Vec<u8>>;
}

/// Object safe trait for key agreement algorithms
pub trait KeyAgreementAlgorithm: Display + Debug {
    fn subject_public_key(&self, pubkey: &SubjectPublicKeyInfo) -> Result<PublicKey>;
    fn generate_key_pair(&self, rng: &mut dyn CryptoCoreRng) -> (PrivateKey, PublicKey);
    fn key_agreement(&self, private: &PrivateKey, public: &PublicKey) -> Result<Vec<u8>>;
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl SubjectPublicKeyInfo {
    /// Returns the KeyAgreementAlgorithm and public key.
    pub fn to_algorithm_public_key(&self) -> Result<(Box<dyn KeyAgreementAlgorithm>, PublicKey)> {
        let Self::Unknown(any) = self else {
            bail!("RSA keys do not support key agreement");
        };
        // AnyAlgorithmIdentifier and PubkeyAlgorithmIdentifier share the same
        // SEQUENCE shape, so re-parsing recovers the structured Dh/Ec params
        // that were erased when this key was first decoded.
        let algorithm = PubkeyAlgorithmIdentifier::from_der(&any.algorithm.to_der()?)?;
        let algo: Box<dyn KeyAgreementAlgorithm> = match algorithm {
            PubkeyAlgorithmIdentifier::Dh(params) => {
                Box::new(key_agreement::RawDhGroup::from_parameters(&params)?)
            }
            PubkeyAlgorithmIdentifier::Ec(ECAlgoParameters::EcParameters(params)) => {
                key_agreement::ec_algorithm_from_explicit(&params)?
            }
            PubkeyAlgorithmIdentifier::Ec(ECAlgoParameters::NamedCurve(oid)) => {
                key_agreement::named_curve_by_oid(oid)?
            }
            PubkeyAlgorithmIdentifier::Ec(ECAlgoParameters::ImplicitlyCA(_)) => {
                bail!("Implicit CA curve parameters are not supported")
            }
            PubkeyAlgorithmIdentifier::Rsa | PubkeyAlgorithmIdentifier::Unknown(_) => {
                bail!("Unsupported key agreement algorithm")
            }
        };
        let public = algo.subject_public_key(self)?;
        Ok((algo, public))
    }
}

/// Verifies an Active Authentication response (ICAO 9303-11 9.2.8) against an
/// RSA DG15 public key, returning the recovered message part `M1`.
pub(crate) fn verify_active_authentication_rsa(
    pubkey_info: &SubjectPublicKeyInfo,
    challenge: &[u8],
    response: &[u8],
) -> Result<Vec<u8>> {
    type Uint2048 = Uint<2048, 32>;
    let pubkey = rsa::RSAPublicKey::<Uint2048>::try_from(pubkey_info.clone())?;
    pubkey.verify_iso9796_2(challenge, response)
}

/// Parses a big-endian, zero-extended `OctetString` into a fixed-width `Uint`.
pub fn parse_uint_os<const B: usize, const L: usize>(os: &OctetString) -> Result<Uint<B, L>> {
    parse_be_bytes(os.as_bytes())
}

/// Parses a non-negative DER `Int` into a fixed-width `Uint`.
pub fn parse_int<const B: usize, const L: usize>(value: &Int) -> Result<Uint<B, L>> {
    let bytes = value.as_bytes();
    ensure!(
        bytes.first().map_or(true, |b| b & 0x80 == 0),
        "Negative integers are not supported here"
    );
    parse_be_bytes(bytes)
}

fn parse_be_bytes<const B: usize, const L: usize>(big_endian: &[u8]) -> Result<Uint<B, L>> {
    let size = Uint::<B, L>::BYTES;
    let trim = big_endian.iter().position(|&b| b != 0).unwrap_or(big_endian.len());
    let big_endian = &big_endian[trim..];
    ensure!(big_endian.len() <= size, "Value is too large for the target width");
    let mut zero_extended = vec![0_u8; size];
    zero_extended[size - big_endian.len()..].copy_from_slice(big_endian);
    Ok(Uint::from_be_slice(&zero_extended))
}
