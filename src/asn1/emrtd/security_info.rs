//! `SecurityInfo`, the tagged union `EF.CardAccess`/`EF.DG14` are built out
//! of (ICAO-9303-11 9.2, BSI TR-03110-3 Appendix A.1).
//!
//! `SecurityInfo ::= SEQUENCE { protocol OID, requiredData ANY DEFINED BY
//! protocol, optionalData ANY DEFINED BY protocol OPTIONAL }`. The shape of
//! `requiredData`/`optionalData` depends entirely on which of the ~30 known
//! protocol OIDs is present, so this is hand-decoded rather than derived:
//! peek the OID, then parse the fields that OID's variant defines.

use crate::asn1::{
    ordered_set::OrderedSet,
    public_key_info::{DhAlgoParameters, ECAlgoParameters, SubjectPublicKeyInfo},
};
use der::{
    asn1::{Int, ObjectIdentifier as Oid, Uint},
    Decode, DecodeValue, Encode, EncodeValue, Error, ErrorKind, Header, Length, Reader, Result,
    Sequence, Writer,
};

pub type SecurityInfos = OrderedSet<SecurityInfo>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAgreement {
    Dh,
    Ecdh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymmetricCipher {
    Tdes,
    Aes128,
    Aes192,
    Aes256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaceMapping {
    Generic,
    Integrated,
    Chip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipAuthenticationProtocol {
    pub key_agreement: KeyAgreement,
    pub cipher: Option<SymmetricCipher>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaceProtocol {
    pub key_agreement: KeyAgreement,
    pub mapping: PaceMapping,
    pub cipher: SymmetricCipher,
}

macro_rules! oid_table {
    ($name:ident: $value:ty = [$(($oid:literal, $val:expr)),+ $(,)?]) => {
        const $name: &[(Oid, $value)] = &[$((Oid::new_unwrap($oid), $val)),+];
    };
}

oid_table!(CA_OIDS: ChipAuthenticationProtocol = [
    ("0.4.0.127.0.7.2.2.3.1.1", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Dh, cipher: Some(SymmetricCipher::Tdes) }),
    ("0.4.0.127.0.7.2.2.3.1.2", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Dh, cipher: Some(SymmetricCipher::Aes128) }),
    ("0.4.0.127.0.7.2.2.3.1.3", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Dh, cipher: Some(SymmetricCipher::Aes192) }),
    ("0.4.0.127.0.7.2.2.3.1.4", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Dh, cipher: Some(SymmetricCipher::Aes256) }),
    ("0.4.0.127.0.7.2.2.3.2.1", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Ecdh, cipher: Some(SymmetricCipher::Tdes) }),
    ("0.4.0.127.0.7.2.2.3.2.2", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Ecdh, cipher: Some(SymmetricCipher::Aes128) }),
    ("0.4.0.127.0.7.2.2.3.2.3", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Ecdh, cipher: Some(SymmetricCipher::Aes192) }),
    ("0.4.0.127.0.7.2.2.3.2.4", ChipAuthenticationProtocol { key_agreement: KeyAgreement::Ecdh, cipher: Some(SymmetricCipher::Aes256) }),
]);

oid_table!(PK_OIDS: KeyAgreement = [
    ("0.4.0.127.0.7.2.2.1.1", KeyAgreement::Dh),
    ("0.4.0.127.0.7.2.2.1.2", KeyAgreement::Ecdh),
]);

/// `id-PACE-DH-GM`/`id-PACE-ECDH-GM`/`id-PACE-DH-IM`/`id-PACE-ECDH-IM`: the
/// bare (no cipher suffix) OIDs `PACEDomainParameterInfo` tags its protocol
/// with, distinct from the cipher-suffixed ones `PaceInfo` uses.
oid_table!(PACE_DOMAIN_OIDS: (KeyAgreement, PaceMapping) = [
    ("0.4.0.127.0.7.2.2.4.1", (KeyAgreement::Dh, PaceMapping::Generic)),
    ("0.4.0.127.0.7.2.2.4.2", (KeyAgreement::Ecdh, PaceMapping::Generic)),
    ("0.4.0.127.0.7.2.2.4.3", (KeyAgreement::Dh, PaceMapping::Integrated)),
    ("0.4.0.127.0.7.2.2.4.4", (KeyAgreement::Ecdh, PaceMapping::Integrated)),
]);

const ID_TA: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.2");

const ID_AA: Oid = Oid::new_unwrap("2.23.136.1.1.5");

oid_table!(PACE_OIDS: PaceProtocol = [
    ("0.4.0.127.0.7.2.2.4.1.1", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Tdes }),
    ("0.4.0.127.0.7.2.2.4.1.2", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes128 }),
    ("0.4.0.127.0.7.2.2.4.1.3", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes192 }),
    ("0.4.0.127.0.7.2.2.4.1.4", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes256 }),
    ("0.4.0.127.0.7.2.2.4.2.1", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Tdes }),
    ("0.4.0.127.0.7.2.2.4.2.2", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes128 }),
    ("0.4.0.127.0.7.2.2.4.2.3", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes192 }),
    ("0.4.0.127.0.7.2.2.4.2.4", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Generic, cipher: SymmetricCipher::Aes256 }),
    ("0.4.0.127.0.7.2.2.4.3.1", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Tdes }),
    ("0.4.0.127.0.7.2.2.4.3.2", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes128 }),
    ("0.4.0.127.0.7.2.2.4.3.3", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes192 }),
    ("0.4.0.127.0.7.2.2.4.3.4", PaceProtocol { key_agreement: KeyAgreement::Dh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes256 }),
    ("0.4.0.127.0.7.2.2.4.4.1", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Tdes }),
    ("0.4.0.127.0.7.2.2.4.4.2", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes128 }),
    ("0.4.0.127.0.7.2.2.4.4.3", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes192 }),
    ("0.4.0.127.0.7.2.2.4.4.4", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Integrated, cipher: SymmetricCipher::Aes256 }),
    ("0.4.0.127.0.7.2.2.4.6.1", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Chip, cipher: SymmetricCipher::Tdes }),
    ("0.4.0.127.0.7.2.2.4.6.2", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Chip, cipher: SymmetricCipher::Aes128 }),
    ("0.4.0.127.0.7.2.2.4.6.3", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Chip, cipher: SymmetricCipher::Aes192 }),
    ("0.4.0.127.0.7.2.2.4.6.4", PaceProtocol { key_agreement: KeyAgreement::Ecdh, mapping: PaceMapping::Chip, cipher: SymmetricCipher::Aes256 }),
]);

/// DER INTEGER requires a minimal encoding; trim the leading zero bytes
/// `u64::to_be_bytes` always produces for small values.
fn u64_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[first_nonzero..].to_vec()
}

fn lookup<V: Copy + PartialEq>(table: &[(Oid, V)], oid: Oid) -> Option<V> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == oid)
        .map(|(_, value)| *value)
}

fn reverse_lookup<V: Copy + PartialEq>(table: &[(Oid, V)], value: V) -> Oid {
    table
        .iter()
        .find(|(_, candidate)| *candidate == value)
        .map(|(oid, _)| *oid)
        .expect("every constructed protocol value has a matching OID in its table")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveAuthenticationInfo {
    pub signature_algorithm: Oid,
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChipAuthenticationInfo {
    pub protocol: ChipAuthenticationProtocol,
    pub version: u64,
    pub key_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChipAuthenticationPublicKeyInfo {
    pub key_agreement: KeyAgreement,
    pub chip_authentication_public_key: SubjectPublicKeyInfo,
    pub key_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalAuthenticationInfo {
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaceInfo {
    pub protocol: PaceProtocol,
    pub version: u64,
    pub parameter_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainParameter {
    Dh(DhAlgoParameters),
    Ec(ECAlgoParameters),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaceDomainParameterInfo {
    pub key_agreement: KeyAgreement,
    pub mapping: PaceMapping,
    pub domain_parameter: DomainParameter,
    pub parameter_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecurityInfo {
    ActiveAuthentication(ActiveAuthenticationInfo),
    ChipAuthentication(ChipAuthenticationInfo),
    ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo),
    TerminalAuthentication(TerminalAuthenticationInfo),
    Pace(PaceInfo),
    PaceDomainParameter(PaceDomainParameterInfo),
    /// An unrecognized protocol OID. Kept raw (as DER) rather than dropped,
    /// so a `SecurityInfos` round-trips even when it contains a protocol this
    /// crate doesn't implement.
    Unknown {
        protocol: Oid,
        required: der::Any,
        optional: Option<der::Any>,
    },
}

impl Sequence<'_> for SecurityInfo {}

impl EncodeValue for SecurityInfo {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::ActiveAuthentication(info) => {
                let len = (ID_AA.encoded_len()? + info.signature_algorithm.encoded_len()?)?;
                Ok((len + Uint::new(&u64_be(info.version))?.encoded_len()?)?)
            }
            Self::ChipAuthentication(info) => {
                let oid = reverse_lookup(CA_OIDS, info.protocol);
                let mut len =
                    (oid.encoded_len()? + Uint::new(&u64_be(info.version))?.encoded_len()?)?;
                if let Some(key_id) = info.key_id {
                    len = (len + Uint::new(&u64_be(key_id))?.encoded_len()?)?;
                }
                Ok(len)
            }
            Self::ChipAuthenticationPublicKey(info) => {
                let oid = reverse_lookup(PK_OIDS, info.key_agreement);
                let mut len =
                    (oid.encoded_len()? + info.chip_authentication_public_key.encoded_len()?)?;
                if let Some(key_id) = info.key_id {
                    len = (len + Uint::new(&u64_be(key_id))?.encoded_len()?)?;
                }
                Ok(len)
            }
            Self::TerminalAuthentication(info) => Ok((ID_TA.encoded_len()?
                + Uint::new(&u64_be(info.version))?.encoded_len()?)?),
            Self::Pace(info) => {
                let oid = reverse_lookup(PACE_OIDS, info.protocol);
                let mut len =
                    (oid.encoded_len()? + Uint::new(&u64_be(info.version))?.encoded_len()?)?;
                if let Some(parameter_id) = info.parameter_id {
                    len = (len + Int::new(&u64_be(parameter_id))?.encoded_len()?)?;
                }
                Ok(len)
            }
            Self::PaceDomainParameter(info) => {
                let oid = reverse_lookup(PACE_DOMAIN_OIDS, (info.key_agreement, info.mapping));
                let domain_len = match &info.domain_parameter {
                    DomainParameter::Dh(p) => p.encoded_len()?,
                    DomainParameter::Ec(p) => p.encoded_len()?,
                };
                let mut len = (oid.encoded_len()? + domain_len)?;
                if let Some(parameter_id) = info.parameter_id {
                    len = (len + Int::new(&u64_be(parameter_id))?.encoded_len()?)?;
                }
                Ok(len)
            }
            Self::Unknown {
                protocol,
                required,
                optional,
            } => {
                let mut len = (protocol.encoded_len()? + required.encoded_len()?)?;
                if let Some(optional) = optional {
                    len = (len + optional.encoded_len()?)?;
                }
                Ok(len)
            }
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::ActiveAuthentication(info) => {
                ID_AA.encode(writer)?;
                info.signature_algorithm.encode(writer)?;
                Uint::new(&u64_be(info.version))?.encode(writer)
            }
            Self::ChipAuthentication(info) => {
                reverse_lookup(CA_OIDS, info.protocol).encode(writer)?;
                Uint::new(&u64_be(info.version))?.encode(writer)?;
                if let Some(key_id) = info.key_id {
                    Uint::new(&u64_be(key_id))?.encode(writer)?;
                }
                Ok(())
            }
            Self::ChipAuthenticationPublicKey(info) => {
                reverse_lookup(PK_OIDS, info.key_agreement).encode(writer)?;
                info.chip_authentication_public_key.encode(writer)?;
                if let Some(key_id) = info.key_id {
                    Uint::new(&u64_be(key_id))?.encode(writer)?;
                }
                Ok(())
            }
            Self::TerminalAuthentication(info) => {
                ID_TA.encode(writer)?;
                Uint::new(&u64_be(info.version))?.encode(writer)
            }
            Self::Pace(info) => {
                reverse_lookup(PACE_OIDS, info.protocol).encode(writer)?;
                Uint::new(&u64_be(info.version))?.encode(writer)?;
                if let Some(parameter_id) = info.parameter_id {
                    Int::new(&u64_be(parameter_id))?.encode(writer)?;
                }
                Ok(())
            }
            Self::PaceDomainParameter(info) => {
                reverse_lookup(PACE_DOMAIN_OIDS, (info.key_agreement, info.mapping)).encode(writer)?;
                match &info.domain_parameter {
                    DomainParameter::Dh(p) => p.encode(writer)?,
                    DomainParameter::Ec(p) => p.encode(writer)?,
                }
                if let Some(parameter_id) = info.parameter_id {
                    Int::new(&u64_be(parameter_id))?.encode(writer)?;
                }
                Ok(())
            }
            Self::Unknown {
                protocol,
                required,
                optional,
            } => {
                protocol.encode(writer)?;
                required.encode(writer)?;
                if let Some(optional) = optional {
                    optional.encode(writer)?;
                }
                Ok(())
            }
        }
    }
}

fn decode_u64(any: &der::Any) -> Result<u64> {
    let uint = any.decode_as::<Uint>()?;
    let bytes = uint.as_bytes();
    if bytes.len() > 8 {
        return Err(Error::new(ErrorKind::Overflow, Length::ZERO));
    }
    let mut buf = [0u8; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

impl<'a> DecodeValue<'a> for SecurityInfo {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let protocol = Oid::decode(reader)?;

            if protocol == ID_AA {
                let signature_algorithm = Oid::decode(reader)?;
                let version = decode_u64(&der::Any::decode(reader)?)?;
                return Ok(Self::ActiveAuthentication(ActiveAuthenticationInfo {
                    signature_algorithm,
                    version,
                }));
            }
            if protocol == ID_TA {
                let version = decode_u64(&der::Any::decode(reader)?)?;
                return Ok(Self::TerminalAuthentication(TerminalAuthenticationInfo {
                    version,
                }));
            }
            if let Some(protocol) = lookup(CA_OIDS, protocol) {
                let version = decode_u64(&der::Any::decode(reader)?)?;
                let key_id = if reader.is_finished() {
                    None
                } else {
                    Some(decode_u64(&der::Any::decode(reader)?)?)
                };
                return Ok(Self::ChipAuthentication(ChipAuthenticationInfo {
                    protocol,
                    version,
                    key_id,
                }));
            }
            if let Some(key_agreement) = lookup(PK_OIDS, protocol) {
                let required = der::Any::decode(reader)?;
                let key_id = if reader.is_finished() {
                    None
                } else {
                    Some(decode_u64(&der::Any::decode(reader)?)?)
                };
                return Ok(Self::ChipAuthenticationPublicKey(
                    ChipAuthenticationPublicKeyInfo {
                        key_agreement,
                        chip_authentication_public_key: required.decode_as()?,
                        key_id,
                    },
                ));
            }
            if let Some((key_agreement, mapping)) = lookup(PACE_DOMAIN_OIDS, protocol) {
                let domain_parameter = match key_agreement {
                    KeyAgreement::Dh => DomainParameter::Dh(DhAlgoParameters::decode(reader)?),
                    KeyAgreement::Ecdh => DomainParameter::Ec(ECAlgoParameters::decode(reader)?),
                };
                let parameter_id = if reader.is_finished() {
                    None
                } else {
                    Some(decode_u64(&der::Any::decode(reader)?)?)
                };
                return Ok(Self::PaceDomainParameter(PaceDomainParameterInfo {
                    key_agreement,
                    mapping,
                    domain_parameter,
                    parameter_id,
                }));
            }
            if let Some(protocol) = lookup(PACE_OIDS, protocol) {
                let version = decode_u64(&der::Any::decode(reader)?)?;
                let parameter_id = if reader.is_finished() {
                    None
                } else {
                    Some(decode_u64(&der::Any::decode(reader)?)?)
                };
                return Ok(Self::Pace(PaceInfo {
                    protocol,
                    version,
                    parameter_id,
                }));
            }

            let required = der::Any::decode(reader)?;
            let optional = if reader.is_finished() {
                None
            } else {
                Some(der::Any::decode(reader)?)
            };
            Ok(Self::Unknown {
                protocol,
                required,
                optional,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_oid_round_trips() {
        let protocol = PaceProtocol {
            key_agreement: KeyAgreement::Ecdh,
            mapping: PaceMapping::Generic,
            cipher: SymmetricCipher::Aes128,
        };
        let oid = reverse_lookup(PACE_OIDS, protocol);
        assert_eq!(oid, Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.2"));
        assert_eq!(lookup(PACE_OIDS, oid), Some(protocol));
    }
}
