mod field_id;
mod pubkey_algorithm_identifier;

pub use self::{
    field_id::FieldId,
    pubkey_algorithm_identifier::{PubkeyAlgorithmIdentifier, ID_DH, ID_EC, ID_RSA},
};
use crate::asn1::AnyAlgorithmIdentifier;
use der::{
    asn1::{BitString, Int, Null, ObjectIdentifier as Oid, OctetString},
    Any, Choice, Decode, DecodeValue, Encode, EncodeValue, Error, ErrorKind, Header, Length,
    Reader, Result, Sequence, Tag, ValueOrd, Writer,
};
use std::cmp::Ordering;

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum SubjectPublicKeyInfo {
    Rsa(RsaPublicKeyInfo),
    Unknown(AnySubjectPublicKeyInfo),
}

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct AnySubjectPublicKeyInfo {
    pub algorithm:          AnyAlgorithmIdentifier,
    pub subject_public_key: BitString,
}

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct RsaPublicKeyInfo {
    pub modulus:         Int,
    pub public_exponent: Int,
}

/// Diffie-Hellman Mod-P Group Parameters.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct DhAlgoParameters {
    pub prime:                Int,
    pub base:                 Int,
    pub private_value_length: Option<u64>,
}

/// Elliptic Curve Algorithm Parameters.
///
/// **Note**: This deviates from RFC 5480 by allowing for explicit
/// parameters using `EcParameters` in addition to named curves. This
/// is used by at least some Dutch eMRTDs.
///
/// [TR-03111] `Parameters`
/// Details on parameters in [TR-03111]
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Choice, ValueOrd)]
pub enum ECAlgoParameters {
    EcParameters(EcParameters),
    NamedCurve(Oid),
    ImplicitlyCA(Null),
}

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct EcParameters {
    pub version:  u64,
    pub field_id: FieldId,
    pub curve:    Curve,
    pub base:     ECPoint,
    pub order:    Int,
    pub cofactor: Option<Int>,
}

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct Curve {
    pub a:    FieldElement,
    pub b:    FieldElement,
    pub seed: Option<BitString>,
}

pub type FieldElement = OctetString;

pub type ECPoint = OctetString;

impl Sequence<'_> for SubjectPublicKeyInfo {}

impl ValueOrd for SubjectPublicKeyInfo {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        // TODO: Better method.
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl EncodeValue for SubjectPublicKeyInfo {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::Rsa(rsa) => {
                let bits = rsa.to_der()?;
                PubkeyAlgorithmIdentifier::Rsa.encoded_len()?
                    + BitString::new(0, bits)?.encoded_len()?
            }
            Self::Unknown(any) => any.value_len(),
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Rsa(rsa) => {
                PubkeyAlgorithmIdentifier::Rsa.encode(writer)?;
                BitString::new(0, rsa.to_der()?)?.encode(writer)
            }
            Self::Unknown(any) => any.encode(writer),
        }
    }
}

impl<'a> DecodeValue<'a> for SubjectPublicKeyInfo {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let algorithm = PubkeyAlgorithmIdentifier::decode(reader)?;
            let subject_public_key = BitString::decode(reader)?;
            Ok(match algorithm {
                PubkeyAlgorithmIdentifier::Rsa => {
                    let bytes = subject_public_key
                        .as_bytes()
                        .ok_or_else(|| Error::new(ErrorKind::Length { tag: Tag::BitString }, Length::ZERO))?;
                    Self::Rsa(RsaPublicKeyInfo::from_der(bytes)?)
                }
                other => Self::Unknown(AnySubjectPublicKeyInfo {
                    algorithm: other.into(),
                    subject_public_key,
                }),
            })
        })
    }
}

impl Sequence<'_> for PubkeyAlgorithmIdentifier {}

impl ValueOrd for PubkeyAlgorithmIdentifier {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl From<PubkeyAlgorithmIdentifier> for AnyAlgorithmIdentifier {
    fn from(value: PubkeyAlgorithmIdentifier) -> Self {
        // Re-encoding and re-parsing as the generic form is simpler than
        // threading a second constructor through every variant, and this
        // path is only taken for the `Unknown` fallback's bookkeeping.
        let der = value.to_der().expect("PubkeyAlgorithmIdentifier always encodes");
        AnyAlgorithmIdentifier::from_der(&der).expect("re-parsing our own encoding")
    }
}

impl EncodeValue for PubkeyAlgorithmIdentifier {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::Rsa => ID_RSA.encoded_len() + Null.encoded_len()?,
            Self::Ec(params) => ID_EC.encoded_len()? + params.encoded_len()?,
            Self::Dh(params) => ID_DH.encoded_len()? + params.encoded_len()?,
            Self::Unknown(any) => any.value_len(),
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Rsa => {
                ID_RSA.encode(writer)?;
                Null.encode(writer)
            }
            Self::Ec(params) => {
                ID_EC.encode(writer)?;
                params.encode(writer)
            }
            Self::Dh(params) => {
                ID_DH.encode(writer)?;
                params.encode(writer)
            }
            Self::Unknown(any) => any.encode(writer),
        }
    }
}

impl<'a> DecodeValue<'a> for PubkeyAlgorithmIdentifier {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: der::Header) -> Result<Self> {
        let oid = Oid::decode(reader)?;
        Ok(match oid {
            ID_RSA => {
                Null::decode(reader)?;
                Self::Rsa
            }
            ID_EC => Self::Ec(ECAlgoParameters::decode(reader)?),
            ID_DH => Self::Dh(DhAlgoParameters::decode(reader)?),
            _ => Self::Unknown(AnyAlgorithmIdentifier {
                algorithm:  oid,
                parameters: Option::<Any>::decode(reader)?,
            }),
        })
    }
}
