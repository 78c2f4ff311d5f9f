//! DER canonical ordering for `SET OF`.
//!
//! X.690 8.12 requires the elements of a DER `SET OF` to appear in ascending
//! order of their own encoding. `SecurityInfos` is defined as a `SET OF
//! SecurityInfo`; the teacher's original `der` `SetOfVec` only orders
//! elements that implement `Ord` on the Rust value itself, which isn't
//! available for a heterogeneous `SecurityInfo` tagged union. `OrderedSet`
//! instead sorts by the DER encoding directly, which is what the standard
//! actually mandates.

use der::{Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Result, Tag, Writer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedSet<T>(Vec<T>);

impl<T> OrderedSet<T>
where
    T: Encode,
{
    pub fn new(mut items: Vec<T>) -> Result<Self> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            let der = item.to_der()?;
            keyed.push((der, item));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self(keyed.into_iter().map(|(_, item)| item).collect()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<'a, T> DecodeValue<'a> for OrderedSet<T>
where
    T: Decode<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut items = Vec::new();
            while !reader.is_finished() {
                items.push(T::decode(reader)?);
            }
            Ok(Self(items))
        })
    }
}

impl<T> EncodeValue for OrderedSet<T>
where
    T: Encode,
{
    fn value_len(&self) -> Result<Length> {
        self.0.iter().try_fold(Length::ZERO, |acc, item| {
            Ok(acc + item.encoded_len()?)
        })
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        for item in &self.0 {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<T> der::FixedTag for OrderedSet<T> {
    const TAG: Tag = Tag::Set;
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::OctetString;

    #[test]
    fn sorts_by_encoding() {
        let a = OctetString::new(vec![0x01]).unwrap();
        let b = OctetString::new(vec![0x02, 0x00]).unwrap();
        let set = OrderedSet::new(vec![b.clone(), a.clone()]).unwrap();
        assert_eq!(set.into_vec(), vec![a, b]);
    }
}
