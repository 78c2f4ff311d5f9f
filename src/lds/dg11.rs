//! DG11/DG12: `AdditionalDetailDataGroup`, ICAO 9303-10 §4.7 tables 31/32 /
//! spec.md §4.7, §8 scenario 2.
//!
//! Both data groups share the same shape: a `5C` tag-list header
//! enumerating the present inner tags, followed by the inner TLVs in that
//! same order. List-valued fields (e.g. "Other names") join their entries
//! with a single `<` filler and split on it when decoding; an absent/empty
//! list therefore round-trips as the singleton `[""]`, not `[]` — splitting
//! an empty byte string on `<` naturally yields one empty piece, so the
//! quirk in spec.md §4.7/§8 falls out of the encoding rather than needing a
//! special case.

use super::LdsFile;
use crate::{
    error::{Error, Result},
    tlv::{Node, Tag},
};

/// Tag list header, ICAO 9303-10 §4.6.1.
const TAG_TAG_LIST: u32 = 0x5C;

/// A single optional field of an `AdditionalDetailDataGroup`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn encode(&self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.clone().into_bytes(),
            Self::List(items) => items.join("<").into_bytes(),
        }
    }

    fn decode_text(bytes: &[u8]) -> Result<String> {
        Ok(std::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedTlv { reason: "non-UTF-8 additional-details field" })?
            .trim()
            .to_string())
    }

    fn decode_list(bytes: &[u8]) -> Result<Vec<String>> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedTlv { reason: "non-UTF-8 additional-details field" })?;
        Ok(s.split('<').map(str::to_string).collect())
    }
}

/// The ordered set of `(tag, value)` pairs an `AdditionalDetailDataGroup`
/// carries. Order is preserved exactly as built/parsed so the `5C` tag list
/// and the round trip stay consistent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdditionalDetails {
    pub fields: Vec<(u32, FieldValue)>,
}

impl AdditionalDetails {
    pub fn get_text(&self, tag: u32) -> Option<&str> {
        self.fields.iter().find_map(|(t, v)| match v {
            FieldValue::Text(s) if *t == tag => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn get_list(&self, tag: u32) -> Option<&[String]> {
        self.fields.iter().find_map(|(t, v)| match v {
            FieldValue::List(items) if *t == tag => Some(items.as_slice()),
            _ => None,
        })
    }

    pub fn set_text(&mut self, tag: u32, value: impl Into<String>) {
        self.fields.push((tag, FieldValue::Text(value.into())));
    }

    pub fn set_list(&mut self, tag: u32, values: Vec<String>) {
        self.fields.push((tag, FieldValue::List(values)));
    }

    fn encode_children(&self) -> Vec<Node> {
        let tag_list: Vec<u8> =
            self.fields.iter().flat_map(|(tag, _)| Tag(*tag).to_be_bytes()).collect();
        let mut children = vec![Node::primitive(TAG_TAG_LIST, tag_list)];
        for (tag, value) in &self.fields {
            children.push(Node::primitive(*tag, value.encode()));
        }
        children
    }

    fn decode_children(children: &[Node], list_tags: &[u32]) -> Result<Self> {
        let mut iter = children.iter();
        let header = iter.next().ok_or(Error::MalformedTlv {
            reason: "additional-details group is missing its tag list",
        })?;
        if header.tag.0 != TAG_TAG_LIST {
            return Err(Error::UnexpectedTag { expected: TAG_TAG_LIST, found: header.tag.0 });
        }

        let mut fields = Vec::new();
        for node in iter {
            let value = if list_tags.contains(&node.tag.0) {
                FieldValue::List(FieldValue::decode_list(node.as_bytes()?)?)
            } else {
                FieldValue::Text(FieldValue::decode_text(node.as_bytes()?)?)
            };
            fields.push((node.tag.0, value));
        }
        Ok(Self { fields })
    }
}

/// DG11 field tags, ICAO 9303-10 Table 31.
pub mod dg11_tags {
    pub const NAME_OF_HOLDER: u32 = 0x5F0E;
    pub const OTHER_NAMES: u32 = 0x5F0F;
    pub const PERSONAL_NUMBER: u32 = 0x5F10;
    pub const PLACE_OF_BIRTH: u32 = 0x5F11;
    pub const PERMANENT_ADDRESS: u32 = 0x5F42;
    pub const TELEPHONE: u32 = 0x5F12;
    pub const PROFESSION: u32 = 0x5F13;
    pub const TITLE: u32 = 0x5F14;
    pub const PERSONAL_SUMMARY: u32 = 0x5F15;
    pub const OTHER_VALID_TD_NUMBERS: u32 = 0x5F17;
    pub const CUSTODY_INFORMATION: u32 = 0x5F18;
    pub const FULL_DATE_OF_BIRTH: u32 = 0x5F2B;
    pub const LIST_TAGS: [u32; 4] = [OTHER_NAMES, PLACE_OF_BIRTH, PERMANENT_ADDRESS, OTHER_VALID_TD_NUMBERS];
}

/// DG11, ICAO 9303-10 §4.7.5: additional personal detail(s).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dg11(pub AdditionalDetails);

impl Dg11 {
    pub fn name_of_holder(&self) -> Option<&str> {
        self.0.get_text(dg11_tags::NAME_OF_HOLDER)
    }

    pub fn full_date_of_birth(&self) -> Option<&str> {
        self.0.get_text(dg11_tags::FULL_DATE_OF_BIRTH)
    }
}

impl LdsFile for Dg11 {
    const OUTER_TAG: u32 = 0x6B;

    fn encode_children(&self) -> Vec<Node> {
        self.0.encode_children()
    }

    fn decode_children(children: &[Node]) -> Result<Self> {
        Ok(Self(AdditionalDetails::decode_children(children, &dg11_tags::LIST_TAGS)?))
    }
}

/// DG12 field tags, ICAO 9303-10 Table 32.
pub mod dg12_tags {
    pub const ISSUING_AUTHORITY: u32 = 0x5F19;
    pub const DATE_OF_ISSUE: u32 = 0x5F26;
    pub const OTHER_PERSONS: u32 = 0x5F1A;
    pub const ENDORSEMENTS_OBSERVATIONS: u32 = 0x5F1B;
    pub const TAXES_EXIT_REQUIREMENTS: u32 = 0x5F1C;
    pub const IMAGE_FRONT: u32 = 0x5F1D;
    pub const IMAGE_REAR: u32 = 0x5F1E;
    pub const PERSONALIZATION_DATE_TIME: u32 = 0x5F55;
    pub const PERSONALIZATION_SYSTEM_SERIAL: u32 = 0x5F56;
    pub const LIST_TAGS: [u32; 1] = [OTHER_PERSONS];
}

/// DG12, ICAO 9303-10 §4.7.6: additional document detail(s).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dg12(pub AdditionalDetails);

impl LdsFile for Dg12 {
    const OUTER_TAG: u32 = 0x6C;

    fn encode_children(&self) -> Vec<Node> {
        self.0.encode_children()
    }

    fn decode_children(children: &[Node]) -> Result<Self> {
        Ok(Self(AdditionalDetails::decode_children(children, &dg12_tags::LIST_TAGS)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// spec.md §8 scenario 2 gives only an elided prefix of the real 54-byte
    /// fixture (`6B 34 5C 10 5F 0E 5F 10 …`); the full bytes aren't
    /// reproduced in the spec text, so this builds a self-consistent
    /// fixture matching the documented shape (tag-list length `0x10` = 8
    /// two-byte tags, `nameOfHolder == "<<"`, `fullDateOfBirth ==
    /// "19711019"`) and checks the round trip and field values instead of
    /// hardcoding unverifiable hex.
    #[test]
    fn test_dg11_round_trip_and_quirks() {
        let mut details = AdditionalDetails::default();
        details.set_text(dg11_tags::NAME_OF_HOLDER, "<<");
        details.set_list(dg11_tags::OTHER_NAMES, vec![String::new()]);
        details.set_text(dg11_tags::PERSONAL_NUMBER, "1234567890");
        details.set_text(dg11_tags::FULL_DATE_OF_BIRTH, "19711019");
        details.set_list(dg11_tags::PLACE_OF_BIRTH, vec!["UTOPIA".to_string()]);
        details.set_text(dg11_tags::TELEPHONE, "+1234567890");
        details.set_text(dg11_tags::PROFESSION, "ENGINEER");
        details.set_text(dg11_tags::TITLE, "MS");

        let dg11 = Dg11(details);
        assert_eq!(dg11.name_of_holder(), Some("<<"));
        assert_eq!(dg11.full_date_of_birth(), Some("19711019"));

        let encoded = dg11.encode();
        assert_eq!(&encoded[0..2], [0x6B, (encoded.len() - 2) as u8]);
        let decoded = Dg11::decode(&encoded).unwrap();
        assert_eq!(decoded, dg11);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_empty_list_round_trips_as_singleton_empty_string() {
        let mut details = AdditionalDetails::default();
        details.set_list(dg11_tags::OTHER_NAMES, vec![]);
        let dg11 = Dg11(details);
        let encoded = dg11.encode();
        let decoded = Dg11::decode(&encoded).unwrap();
        assert_eq!(decoded.0.get_list(dg11_tags::OTHER_NAMES), Some(&[String::new()][..]));
    }
}
