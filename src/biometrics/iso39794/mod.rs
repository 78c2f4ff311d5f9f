//! ISO/IEC 39794, the ASN.1 BER successor to ISO 19794, spec.md §4.10
//! (C10).
//!
//! Each modality is a `[APPLICATION n]` wrapped SEQUENCE (face = 4, finger
//! = 5, iris = 6) of a version marker, a CHOICE of representations, and an
//! optional extension set. Full field-by-field ASN.1 schemas for each
//! modality run to dozens of CHOICE alternatives; this crate models the
//! envelope generically over [`crate::tlv::Node`] rather than deriving a
//! `der`-crate type per alternative, and — per spec.md §9's CHOICE/
//! extension fallback invariant — keeps any representation or extension
//! element whose tag it doesn't specifically recognize as an opaque
//! [`Node`] rather than erroring, so round trip survives vendor extensions.

use crate::{
    error::{Error, Result},
    tlv::Node,
};

const TAG_VERSION: u32 = 0xA0;
const TAG_REPRESENTATIONS: u32 = 0xA1;
const TAG_EXTENSIONS: u32 = 0xBF21; // context-specific tag [33], high-tag-number form.

/// Modality discriminator, carried as the outer `[APPLICATION n]` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modality {
    Face,
    Finger,
    Iris,
}

impl Modality {
    const fn application_tag(self) -> u32 {
        // `[APPLICATION n]`, constructed: class bits 01, constructed bit set.
        match self {
            Self::Face => 0x64,
            Self::Finger => 0x65,
            Self::Iris => 0x66,
        }
    }

    fn from_application_tag(tag: u32) -> Result<Self> {
        Ok(match tag {
            0x64 => Self::Face,
            0x65 => Self::Finger,
            0x66 => Self::Iris,
            _ => return Err(Error::UnexpectedTag { expected: 0x64, found: tag }),
        })
    }
}

/// A generic ISO 39794 biometric data block: version, CHOICE of
/// representations, and an optional extension set, each preserved as raw
/// nodes for any content this crate doesn't specifically interpret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiometricDataBlock {
    pub modality: Modality,
    pub version: Option<Node>,
    pub representations: Vec<Node>,
    pub extensions: Vec<Node>,
}

impl BiometricDataBlock {
    pub fn encode(&self) -> Vec<u8> {
        let mut children = Vec::new();
        if let Some(version) = &self.version {
            children.push(version.clone());
        }
        children.push(Node::constructed(TAG_REPRESENTATIONS, self.representations.clone()));
        if !self.extensions.is_empty() {
            children.push(Node::constructed(TAG_EXTENSIONS, self.extensions.clone()));
        }
        Node::constructed(self.modality.application_tag(), children).encode()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let node = Node::decode(bytes)?;
        let modality = Modality::from_application_tag(node.tag.0)?;
        let mut version = None;
        let mut representations = Vec::new();
        let mut extensions = Vec::new();
        for child in node.as_children()? {
            match child.tag.0 {
                TAG_VERSION => version = Some(child.clone()),
                TAG_REPRESENTATIONS => representations = child.as_children()?.to_vec(),
                TAG_EXTENSIONS => extensions = child.as_children()?.to_vec(),
                // Unknown CHOICE alternative or vendor extension: fall back
                // to treating it as an extra representation rather than
                // rejecting the whole record (spec.md §9).
                _ => representations.push(child.clone()),
            }
        }
        Ok(Self { modality, version, representations, extensions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_unknown_representation_preserved() {
        let bdb = BiometricDataBlock {
            modality: Modality::Face,
            version: Some(Node::primitive(TAG_VERSION, vec![0x01, 0x00])),
            representations: vec![Node::primitive(0x80u32, vec![0xAA; 4]), Node::primitive(0x99u32, vec![0xBB])],
            extensions: vec![Node::primitive(0x81u32, vec![0x01])],
        };
        let encoded = bdb.encode();
        let decoded = BiometricDataBlock::decode(&encoded).unwrap();
        assert_eq!(decoded, bdb);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_unrecognized_top_level_element_falls_back_as_representation() {
        let node = Node::constructed(
            Modality::Iris.application_tag(),
            vec![
                Node::constructed(TAG_REPRESENTATIONS, vec![Node::primitive(0x80u32, vec![0x01])]),
                Node::primitive(0xDFu32, vec![0x02]), // unknown extension tag
            ],
        );
        let decoded = BiometricDataBlock::decode(&node.encode()).unwrap();
        assert_eq!(decoded.representations.len(), 2);
    }
}
