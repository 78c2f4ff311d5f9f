//! CBEFF/BIT codec, ISO 7816-11 / ICAO 9303-10 §4.7 (DG2/DG3/DG4 wrapper),
//! spec.md §4.8 (C8).
//!
//! A `7F61` Biometric Information Template Group wraps one or more `7F60`
//! Biometric Information Templates, each holding an `A1` Biometric Header
//! Template (BHT) and a Biometric Data Block, carried either plain under
//! `5F2E` or, for statically protected templates, wrapped again under
//! `7D`/`7F2E`. This crate does not implement the access-control checks a
//! statically protected BIT would require, spec.md §9 Design Notes, so such
//! a template surfaces as [`Error::AccessDenied`] rather than an attempted
//! (and wrong) decode.

use crate::{
    error::{Error, Result},
    tlv::Node,
};

const TAG_BIT_GROUP: u32 = 0x7F61;
const TAG_BIOMETRIC_COUNT: u32 = 0x02;
const TAG_BIT: u32 = 0x7F60;
const TAG_BHT: u32 = 0xA1;
const TAG_BDB_PLAIN: u32 = 0x5F2E;
const TAG_BDB_PROTECTED: u32 = 0x7F2E;
const TAG_STATICALLY_PROTECTED: u32 = 0x7D;

const TAG_BHT_FORMAT_OWNER: u32 = 0x87;
const TAG_BHT_FORMAT_TYPE: u32 = 0x88;
const TAG_BHT_BIOMETRIC_TYPE: u32 = 0x81;
const TAG_BHT_BIOMETRIC_SUBTYPE: u32 = 0x82;
const TAG_BHT_CREATION_DATE: u32 = 0x83;
const TAG_BHT_VALIDITY_PERIOD: u32 = 0x86;

/// A Biometric Header Template, ISO 7816-11 Annex C. Only the elements
/// Doc 9303 actually populates are pulled into named fields; anything else
/// present on the wire is kept in `other` so re-encoding is exact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiometricHeaderTemplate {
    pub biometric_type: Option<Vec<u8>>,
    pub biometric_subtype: Option<u8>,
    pub creation_date: Option<Vec<u8>>,
    pub validity_period: Option<Vec<u8>>,
    pub format_owner: Option<u16>,
    pub format_type: Option<u16>,
    pub other: Vec<Node>,
}

impl BiometricHeaderTemplate {
    fn encode(&self) -> Node {
        let mut children = Vec::new();
        if let Some(v) = &self.biometric_type {
            children.push(Node::primitive(TAG_BHT_BIOMETRIC_TYPE, v.clone()));
        }
        if let Some(v) = self.biometric_subtype {
            children.push(Node::primitive(TAG_BHT_BIOMETRIC_SUBTYPE, vec![v]));
        }
        if let Some(v) = &self.creation_date {
            children.push(Node::primitive(TAG_BHT_CREATION_DATE, v.clone()));
        }
        if let Some(v) = &self.validity_period {
            children.push(Node::primitive(TAG_BHT_VALIDITY_PERIOD, v.clone()));
        }
        if let Some(v) = self.format_owner {
            children.push(Node::primitive(TAG_BHT_FORMAT_OWNER, v.to_be_bytes().to_vec()));
        }
        if let Some(v) = self.format_type {
            children.push(Node::primitive(TAG_BHT_FORMAT_TYPE, v.to_be_bytes().to_vec()));
        }
        children.extend(self.other.iter().cloned());
        Node::constructed(TAG_BHT, children)
    }

    fn decode(node: &Node) -> Result<Self> {
        if node.tag.0 != TAG_BHT {
            return Err(Error::UnexpectedTag { expected: TAG_BHT, found: node.tag.0 });
        }
        let mut bht = Self::default();
        for child in node.as_children()? {
            match child.tag.0 {
                TAG_BHT_BIOMETRIC_TYPE => bht.biometric_type = Some(child.as_bytes()?.to_vec()),
                TAG_BHT_BIOMETRIC_SUBTYPE => {
                    bht.biometric_subtype = Some(*child.as_bytes()?.first().ok_or(
                        Error::MalformedTlv { reason: "empty biometric subtype element" },
                    )?);
                }
                TAG_BHT_CREATION_DATE => bht.creation_date = Some(child.as_bytes()?.to_vec()),
                TAG_BHT_VALIDITY_PERIOD => bht.validity_period = Some(child.as_bytes()?.to_vec()),
                TAG_BHT_FORMAT_OWNER => bht.format_owner = Some(be_u16(child.as_bytes()?)?),
                TAG_BHT_FORMAT_TYPE => bht.format_type = Some(be_u16(child.as_bytes()?)?),
                _ => bht.other.push(child.clone()),
            }
        }
        Ok(bht)
    }
}

fn be_u16(bytes: &[u8]) -> Result<u16> {
    if bytes.len() != 2 {
        return Err(Error::MalformedTlv { reason: "expected a 2-byte BHT element" });
    }
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// One Biometric Information Template: a header plus its data block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiometricInfoTemplate {
    pub header: BiometricHeaderTemplate,
    /// The raw Biometric Data Block, still in its ISO 19794/39794 encoding.
    pub data_block: Vec<u8>,
}

/// A `7F61` Biometric Information Template Group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiometricInfoGroup(pub Vec<BiometricInfoTemplate>);

impl BiometricInfoGroup {
    pub fn encode(&self) -> Vec<u8> {
        let mut templates = vec![Node::primitive(TAG_BIOMETRIC_COUNT, vec![self.0.len() as u8])];
        for bit in &self.0 {
            templates.push(Node::constructed(
                TAG_BIT,
                vec![bit.header.encode(), Node::primitive(TAG_BDB_PLAIN, bit.data_block.clone())],
            ));
        }
        Node::constructed(TAG_BIT_GROUP, templates).encode()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let node = Node::decode(bytes)?;
        if node.tag.0 != TAG_BIT_GROUP {
            return Err(Error::UnexpectedTag { expected: TAG_BIT_GROUP, found: node.tag.0 });
        }
        let mut templates = Vec::new();
        for child in node.as_children()? {
            match child.tag.0 {
                TAG_BIOMETRIC_COUNT => continue,
                TAG_BIT => templates.push(decode_template(child)?),
                _ => {
                    return Err(Error::UnexpectedTag { expected: TAG_BIT, found: child.tag.0 });
                }
            }
        }
        Ok(Self(templates))
    }
}

fn decode_template(node: &Node) -> Result<BiometricInfoTemplate> {
    let children = node.as_children()?;
    let header_node = children
        .iter()
        .find(|c| c.tag.0 == TAG_BHT)
        .ok_or(Error::MalformedTlv { reason: "biometric info template is missing its header" })?;
    let header = BiometricHeaderTemplate::decode(header_node)?;

    if children.iter().any(|c| c.tag.0 == TAG_STATICALLY_PROTECTED || c.tag.0 == TAG_BDB_PROTECTED) {
        return Err(Error::AccessDenied { reason: "statically protected biometric data block" });
    }
    let bdb_node = children
        .iter()
        .find(|c| c.tag.0 == TAG_BDB_PLAIN)
        .ok_or(Error::MalformedTlv { reason: "biometric info template is missing its data block" })?;
    Ok(BiometricInfoTemplate { header, data_block: bdb_node.as_bytes()?.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_plain_bdb() {
        let group = BiometricInfoGroup(vec![BiometricInfoTemplate {
            header: BiometricHeaderTemplate {
                biometric_type: Some(vec![0x02]),
                biometric_subtype: Some(0x00),
                format_owner: Some(0x0101),
                format_type: Some(0x0008),
                ..Default::default()
            },
            data_block: vec![0xAA; 16],
        }]);
        let encoded = group.encode();
        let decoded = BiometricInfoGroup::decode(&encoded).unwrap();
        assert_eq!(decoded, group);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_statically_protected_bdb_is_access_denied() {
        let header = BiometricHeaderTemplate::default().encode();
        let protected = Node::constructed(
            TAG_BIT_GROUP,
            vec![
                Node::primitive(TAG_BIOMETRIC_COUNT, vec![1]),
                Node::constructed(
                    TAG_BIT,
                    vec![header, Node::primitive(TAG_BDB_PROTECTED, vec![0x00])],
                ),
            ],
        )
        .encode();
        assert!(matches!(
            BiometricInfoGroup::decode(&protected),
            Err(Error::AccessDenied { .. })
        ));
    }
}
