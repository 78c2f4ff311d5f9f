//! `[APPLICATION n] IMPLICIT` wrapper used by the top-level LDS files.
//!
//! EF.DG14 and EF.SOd are each a single BER TLV whose outer tag is an
//! APPLICATION-class constructed tag (`0x6E` = APPLICATION 14, `0x77` =
//! APPLICATION 23) wrapping an ordinary DER value. `ApplicationTagged<N, T>`
//! reuses `T`'s own `SEQUENCE`/`SET` content encoding under that implicit
//! outer tag, the way ICAO-9303-11 9.4.1 wraps `SecurityInfos` and
//! `SignedData`.

use der::{DecodeValue, EncodeValue, FixedTag, Header, Length, Reader, Result, Tag, TagNumber, Writer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationTagged<const N: u8, T>(pub T);

impl<const N: u8, T> FixedTag for ApplicationTagged<N, T> {
    const TAG: Tag = Tag::Application {
        constructed: true,
        number: TagNumber::new(N),
    };
}

impl<'a, const N: u8, T> DecodeValue<'a> for ApplicationTagged<N, T>
where
    T: DecodeValue<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        T::decode_value(reader, header).map(Self)
    }
}

impl<const N: u8, T> EncodeValue for ApplicationTagged<N, T>
where
    T: EncodeValue,
{
    fn value_len(&self) -> Result<Length> {
        self.0.value_len()
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        self.0.encode_value(writer)
    }
}

// `der`'s blanket `impl<T: DecodeValue + FixedTag> Decode for T` (and the
// matching one for `Encode`) picks this up automatically, the same as it
// does for `#[derive(Sequence)]` structs.
