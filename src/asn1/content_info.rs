//! RFC 5652 `ContentInfo`, pared down to what EF.SOd and a CSCA master list
//! need: a content type OID followed by an explicitly-tagged payload whose
//! schema is picked statically by the caller rather than dispatched on the
//! OID at runtime.

use der::{
    asn1::{AnyRef, ObjectIdentifier as Oid},
    Decode, DecodeValue, Encode, EncodeValue, ErrorKind, Header, Length, Reader, Result, Sequence,
    Tag, TagNumber, Writer,
};

/// Associates a Rust type with the content-type OID it is expected to appear
/// under inside a `ContentInfo`. `SignedData`'s is `1.2.840.113549.1.7.2`.
pub trait ContentType {
    const CONTENT_TYPE: Oid;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentInfo<T>(pub T);

impl<'a, T> DecodeValue<'a> for ContentInfo<T>
where
    T: ContentType + Decode<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let oid = Oid::decode(reader)?;
            if oid != T::CONTENT_TYPE {
                return Err(der::Error::new(ErrorKind::OidUnknown { oid }, Length::ZERO));
            }
            let explicit = der::asn1::ContextSpecific::<AnyRef<'_>>::decode_explicit(
                reader,
                TagNumber::new(0),
            )?
            .ok_or_else(|| {
                der::Error::new(
                    ErrorKind::Missing {
                        tag: Tag::ContextSpecific {
                            constructed: true,
                            number: TagNumber::new(0),
                        },
                    },
                    Length::ZERO,
                )
            })?;
            let content = T::from_der(&explicit.value.to_der()?)?;
            Ok(Self(content))
        })
    }
}

impl<T> EncodeValue for ContentInfo<T>
where
    T: ContentType + Encode,
{
    fn value_len(&self) -> Result<Length> {
        let encoded = self.0.to_der()?;
        let explicit = der::asn1::ContextSpecific {
            tag_number: TagNumber::new(0),
            tag_mode: der::TagMode::Explicit,
            value: AnyRef::from_der(&encoded)?,
        };
        T::CONTENT_TYPE.encoded_len()? + explicit.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        T::CONTENT_TYPE.encode(writer)?;
        let encoded = self.0.to_der()?;
        let explicit = der::asn1::ContextSpecific {
            tag_number: TagNumber::new(0),
            tag_mode: der::TagMode::Explicit,
            value: AnyRef::from_der(&encoded)?,
        };
        explicit.encode(writer)
    }
}

// `der`'s `Sequence` trait blanket-provides `FixedTag` (tag = `Tag::Sequence`)
// and `Decode`/`Encode` for anything implementing `DecodeValue` + `EncodeValue`,
// the same machinery `#[derive(Sequence)]` hooks into for ordinary structs.
impl<'a, T> Sequence<'a> for ContentInfo<T> where T: ContentType + Decode<'a> + Encode {}
