//! X9.62 `FieldID`, restricted to what Doc 9303 explicit EC parameters use:
//! the prime field. Characteristic-two fields aren't handled since none of
//! the curves it names (`brainpoolP*r1`, `secp*r1`) use them.

use der::{
    asn1::{Int, ObjectIdentifier as Oid},
    Any, Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Result, Sequence,
    Writer,
};

const ID_PRIME_FIELD: Oid = Oid::new_unwrap("1.2.840.10045.1.1");

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldId {
    Prime(Int),
    Unknown { field_type: Oid, parameters: Any },
}

impl Sequence<'_> for FieldId {}

impl EncodeValue for FieldId {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::Prime(p) => ID_PRIME_FIELD.encoded_len()? + p.encoded_len()?,
            Self::Unknown {
                field_type,
                parameters,
            } => field_type.encoded_len()? + parameters.encoded_len()?,
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Prime(p) => {
                ID_PRIME_FIELD.encode(writer)?;
                p.encode(writer)
            }
            Self::Unknown {
                field_type,
                parameters,
            } => {
                field_type.encode(writer)?;
                parameters.encode(writer)
            }
        }
    }
}

impl<'a> DecodeValue<'a> for FieldId {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let oid = Oid::decode(reader)?;
            Ok(match oid {
                ID_PRIME_FIELD => Self::Prime(Int::decode(reader)?),
                other => Self::Unknown {
                    field_type: other,
                    parameters: Any::decode(reader)?,
                },
            })
        })
    }
}
