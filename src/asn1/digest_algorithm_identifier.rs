//! `AlgorithmIdentifier` restricted to the message-digest algorithms Doc 9303
//! signs over (RSA/ECDSA signatures, and the SOd's own hash algorithm).
//!
//! Two different encodings of "this algorithm has no parameters" show up in
//! the wild: `parameters` entirely absent, or present and `NULL`. CSCA
//! certificates and SOds from different vendors use either, so [`Parameters`]
//! preserves which one was seen rather than normalizing on decode — re-encoding
//! then reproduces the original bytes exactly.

use const_oid::ObjectIdentifier as Oid;
use der::{
    asn1::Null, Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Result,
    Sequence, Writer,
};
use hex_literal::hex;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

const OID_SHA1: Oid = Oid::new_unwrap("1.3.14.3.2.26");
const OID_SHA224: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.4");
const OID_SHA256: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");
const OID_SHA384: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.2");
const OID_SHA512: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.3");

/// The two ways "no parameters" appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameters {
    Null,
    Absent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigestAlgorithmIdentifier {
    pub algorithm: Algorithm,
    pub parameters: Parameters,
}

impl DigestAlgorithmIdentifier {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            parameters: Parameters::Null,
        }
    }

    pub fn digest_len(self) -> usize {
        match self.algorithm {
            Algorithm::Sha1 => 20,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    pub fn hash_bytes(self, input: &[u8]) -> Vec<u8> {
        match self.algorithm {
            Algorithm::Sha1 => Sha1::digest(input).to_vec(),
            Algorithm::Sha224 => Sha224::digest(input).to_vec(),
            Algorithm::Sha256 => Sha256::digest(input).to_vec(),
            Algorithm::Sha384 => Sha384::digest(input).to_vec(),
            Algorithm::Sha512 => Sha512::digest(input).to_vec(),
        }
    }

    fn oid(self) -> Oid {
        match self.algorithm {
            Algorithm::Sha1 => OID_SHA1,
            Algorithm::Sha224 => OID_SHA224,
            Algorithm::Sha256 => OID_SHA256,
            Algorithm::Sha384 => OID_SHA384,
            Algorithm::Sha512 => OID_SHA512,
        }
    }

    fn from_oid(oid: Oid) -> crate::error::Result<Algorithm> {
        Ok(match oid {
            OID_SHA1 => Algorithm::Sha1,
            OID_SHA224 => Algorithm::Sha224,
            OID_SHA256 => Algorithm::Sha256,
            OID_SHA384 => Algorithm::Sha384,
            OID_SHA512 => Algorithm::Sha512,
            other => {
                return Err(crate::error::Error::UnsupportedAlgorithm {
                    oid: other.to_string(),
                })
            }
        })
    }

    /// RFC 3447 Appendix B.1 `DigestInfo` DER prefix (everything before the
    /// raw digest bytes), for PKCS#1 v1.5 signature verification.
    pub(crate) fn der_prefix(self) -> &'static [u8] {
        match self.algorithm {
            Algorithm::Sha1 => &hex!("3021300906052b0e03021a05000414"),
            Algorithm::Sha224 => &hex!("302d300d06096086480165030402040500041c"),
            Algorithm::Sha256 => &hex!("3031300d060960864801650304020105000420"),
            Algorithm::Sha384 => &hex!("3041300d060960864801650304020205000430"),
            Algorithm::Sha512 => &hex!("3051300d060960864801650304020305000440"),
        }
    }
}

impl TryFrom<&super::AnyAlgorithmIdentifier> for DigestAlgorithmIdentifier {
    type Error = crate::error::Error;

    /// Resolves a generic `AlgorithmIdentifier` (as carried by
    /// `RsaSsaPssParameters`/`MaskGenAlgorithm`-style wire fields) into the
    /// concrete digest algorithm it names.
    fn try_from(any: &super::AnyAlgorithmIdentifier) -> crate::error::Result<Self> {
        let algorithm = Self::from_oid(any.algorithm)?;
        let parameters = match &any.parameters {
            None => Parameters::Absent,
            Some(_) => Parameters::Null,
        };
        Ok(Self { algorithm, parameters })
    }
}

impl Sequence<'_> for DigestAlgorithmIdentifier {}

impl EncodeValue for DigestAlgorithmIdentifier {
    fn value_len(&self) -> Result<Length> {
        let params_len = match self.parameters {
            Parameters::Null => Null.encoded_len()?,
            Parameters::Absent => Length::ZERO,
        };
        Ok(self.oid().encoded_len()? + params_len)
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        self.oid().encode(writer)?;
        if matches!(self.parameters, Parameters::Null) {
            Null.encode(writer)?;
        }
        Ok(())
    }
}

impl<'a> DecodeValue<'a> for DigestAlgorithmIdentifier {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let oid = Oid::decode(reader)?;
            let algorithm = Self::from_oid(oid).map_err(|_| {
                der::Error::new(der::ErrorKind::OidUnknown { oid }, Length::ZERO)
            })?;
            let parameters = if reader.is_finished() {
                Parameters::Absent
            } else {
                Null::decode(reader)?;
                Parameters::Null
            };
            Ok(Self {
                algorithm,
                parameters,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_and_without_null_params() {
        let with_null = DigestAlgorithmIdentifier::new(Algorithm::Sha256);
        let encoded = with_null.to_der().unwrap();
        assert_eq!(
            DigestAlgorithmIdentifier::from_der(&encoded).unwrap(),
            with_null
        );

        let without = DigestAlgorithmIdentifier {
            algorithm: Algorithm::Sha256,
            parameters: Parameters::Absent,
        };
        let encoded = without.to_der().unwrap();
        assert_eq!(DigestAlgorithmIdentifier::from_der(&encoded).unwrap(), without);
    }

    #[test]
    fn hashes_sha256() {
        let digest = DigestAlgorithmIdentifier::new(Algorithm::Sha256).hash_bytes(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
