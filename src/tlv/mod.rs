//! Minimal BER/DER Tag-Length-Value codec.
//!
//! This is the codec that the LDS files (`crate::lds`), the CBEFF/BIT group
//! (`crate::cbeff`) and the ISO 19794 wrappers (`crate::biometrics::iso19794`)
//! all nest their payloads in. It is deliberately not a general ASN.1 decoder
//! (that's `crate::asn1`, built on the `der` crate's schema-driven derive
//! macros) — here tags and nesting are only known at the call site, so
//! reading is a pull parser over a flat byte buffer rather than a typed
//! `Decode` impl.
//!
//! Tags are represented as the literal concatenation of their identifier
//! octets (e.g. `0x7F61`, `0x5F2E`), matching how they appear throughout
//! Doc 9303 tables, not as a decomposed (class, constructed, number) tuple.

mod reader;
mod writer;

pub use reader::TlvReader;
pub use writer::TlvWriter;

use crate::error::{Error, Result};

/// A BER tag, stored as the big-endian concatenation of its identifier
/// octets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u32);

impl Tag {
    /// Number of octets this tag occupies when encoded.
    pub fn byte_len(self) -> usize {
        match self.0 {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            _ => 3,
        }
    }

    /// The class of the *first* identifier octet.
    pub fn class(self) -> Class {
        let first = self.first_octet();
        match first & 0xC0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }

    /// Whether the constructed bit (0x20) is set on the first identifier
    /// octet.
    pub fn constructed(self) -> bool {
        self.first_octet() & 0x20 != 0
    }

    fn first_octet(self) -> u8 {
        let len = self.byte_len();
        ((self.0 >> (8 * (len - 1))) & 0xFF) as u8
    }

    /// Encodes this tag's identifier octets, big-endian.
    pub fn to_be_bytes(self) -> Vec<u8> {
        let len = self.byte_len();
        (0..len)
            .rev()
            .map(|i| ((self.0 >> (8 * i)) & 0xFF) as u8)
            .collect()
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        Tag(value as u32)
    }
}

impl From<u32> for Tag {
    fn from(value: u32) -> Self {
        Tag(value)
    }
}

/// BER identifier class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// A parsed TLV node: either a raw value or, for constructed tags, a nested
/// list of nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Primitive(Vec<u8>),
    Constructed(Vec<Node>),
}

impl Node {
    pub fn primitive(tag: impl Into<Tag>, value: Vec<u8>) -> Self {
        Self {
            tag: tag.into(),
            value: Value::Primitive(value),
        }
    }

    pub fn constructed(tag: impl Into<Tag>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            value: Value::Constructed(children),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match &self.value {
            Value::Primitive(bytes) => Ok(bytes),
            Value::Constructed(_) => Err(Error::MalformedTlv {
                reason: "expected primitive value, found constructed",
            }),
        }
    }

    pub fn as_children(&self) -> Result<&[Node]> {
        match &self.value {
            Value::Constructed(children) => Ok(children),
            Value::Primitive(_) => Err(Error::MalformedTlv {
                reason: "expected constructed value, found primitive",
            }),
        }
    }

    /// Encode this node and all its children as canonical (definite-length)
    /// BER.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = TlvWriter::new();
        write_node(&mut writer, self);
        writer.into_bytes()
    }

    /// Decode a single TLV node from `bytes`. The entire input must be
    /// consumed by exactly one node.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = TlvReader::new(bytes);
        let node = read_node(&mut reader)?;
        if reader.has_remaining() {
            return Err(Error::MalformedTlv {
                reason: "trailing bytes after TLV node",
            });
        }
        Ok(node)
    }
}

fn write_node(writer: &mut TlvWriter, node: &Node) {
    match &node.value {
        Value::Primitive(bytes) => {
            writer.write_tag(node.tag);
            writer.write_length(bytes.len());
            writer.write_value(bytes);
        }
        Value::Constructed(children) => {
            writer.write_tag(node.tag);
            let start = writer.begin_length();
            for child in children {
                write_node(writer, child);
            }
            writer.end_length(start);
        }
    }
}

fn read_node(reader: &mut TlvReader) -> Result<Node> {
    let tag = reader.read_tag()?;
    let len = reader.read_length()?;
    if tag.constructed() {
        let bytes = match len {
            Some(len) => reader.read_slice(len)?,
            None => reader.read_indefinite()?,
        };
        let mut inner = TlvReader::new(bytes);
        let mut children = Vec::new();
        while inner.has_remaining() {
            children.push(read_node(&mut inner)?);
        }
        Ok(Node::constructed(tag, children))
    } else {
        let len = len.ok_or(Error::MalformedTlv {
            reason: "indefinite length on primitive tag",
        })?;
        let bytes = reader.read_slice(len)?;
        Ok(Node::primitive(tag, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_primitive() {
        let node = Node::primitive(0x5Fu32, b"hello".to_vec());
        let encoded = node.encode();
        assert_eq!(encoded, [0x5F, 0x05, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(Node::decode(&encoded).unwrap(), node);
    }

    #[test]
    fn round_trip_constructed() {
        let inner = Node::primitive(0x02u32, vec![0x01]);
        let outer = Node::constructed(0x61u32, vec![inner.clone()]);
        let encoded = outer.encode();
        assert_eq!(Node::decode(&encoded).unwrap(), outer);
    }

    #[test]
    fn long_form_length() {
        let value = vec![0xAB; 200];
        let node = Node::primitive(0x80u32, value.clone());
        let encoded = node.encode();
        assert_eq!(encoded[0], 0x80);
        assert_eq!(encoded[1], 0x81); // long form, 1 length byte
        assert_eq!(encoded[2], 200);
        assert_eq!(Node::decode(&encoded).unwrap().as_bytes().unwrap(), &value[..]);
    }

    #[test]
    fn two_byte_tag() {
        let node = Node::primitive(0x5F2Eu32, vec![0x01, 0x02]);
        let encoded = node.encode();
        assert_eq!(&encoded[..2], [0x5F, 0x2E]);
        assert_eq!(Node::decode(&encoded).unwrap(), node);
    }
}
