//! LDS TLV files, ICAO 9303-10 §4 / spec.md §4.7 (C7).
//!
//! Each concrete data group is a BER TLV whose outer tag identifies it
//! (`61` = DG1 ... `77` = SOd, see [`file tags`](https://www.icao.int)
//! table in spec.md §6) wrapping a data-group-specific content. The outer
//! codec lives here in [`LdsFile`]; content is interpreted by `dg1`/`dg11`/
//! `dg14`/`com`.

pub mod com;
pub mod dg1;
pub mod dg11;
pub mod dg14;

pub use com::Com;
pub use dg1::{Dg1, MrzInfo};
pub use dg11::{AdditionalDetails, Dg11, Dg12};
pub use dg14::Dg14;

use crate::{
    error::{Error, Result},
    tlv::Node,
};

/// A concrete LDS data group: outer BER TLV tag plus data-group-specific
/// content, ICAO 9303-10 §4 / spec.md §4.7.
///
/// `encode(decode(x)) == x` byte-for-byte for well-formed input.
pub trait LdsFile: Sized {
    /// The outer tag identifying this data group (e.g. `0x61` for DG1).
    const OUTER_TAG: u32;

    /// Builds the children nested inside the outer TLV.
    fn encode_children(&self) -> Vec<Node>;

    /// Interprets the children nested inside the outer TLV.
    fn decode_children(children: &[Node]) -> Result<Self>;

    /// Encodes this data group as a complete outer TLV.
    fn encode(&self) -> Vec<u8> {
        Node::constructed(Self::OUTER_TAG, self.encode_children()).encode()
    }

    /// Decodes a complete outer TLV into this data group.
    fn decode(bytes: &[u8]) -> Result<Self> {
        let node = Node::decode(bytes)?;
        if node.tag.0 != Self::OUTER_TAG {
            return Err(Error::UnexpectedTag {
                expected: Self::OUTER_TAG,
                found: node.tag.0,
            });
        }
        Self::decode_children(node.as_children()?)
    }
}
