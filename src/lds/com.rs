//! EF.COM: the tag list announcing which data groups are present, ICAO
//! 9303-10 §4.7.2 / spec.md §4.7.

use super::LdsFile;
use crate::{
    error::{Error, Result},
    tlv::{Node, Tag},
};

const TAG_LDS_VERSION: u32 = 0x5F01;
const TAG_UNICODE_VERSION: u32 = 0x5F36;
const TAG_TAG_LIST: u32 = 0x5C;

/// EF.COM: LDS version, Unicode version, and the set of DG outer tags
/// present on the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Com {
    pub lds_version: String,
    pub unicode_version: String,
    pub data_groups: Vec<u32>,
}

impl LdsFile for Com {
    const OUTER_TAG: u32 = 0x60;

    fn encode_children(&self) -> Vec<Node> {
        let tag_list: Vec<u8> = self.data_groups.iter().flat_map(|&tag| Tag(tag).to_be_bytes()).collect();
        vec![
            Node::primitive(TAG_LDS_VERSION, self.lds_version.clone().into_bytes()),
            Node::primitive(TAG_UNICODE_VERSION, self.unicode_version.clone().into_bytes()),
            Node::primitive(TAG_TAG_LIST, tag_list),
        ]
    }

    fn decode_children(children: &[Node]) -> Result<Self> {
        let mut lds_version = None;
        let mut unicode_version = None;
        let mut data_groups = None;
        for node in children {
            match node.tag.0 {
                TAG_LDS_VERSION => {
                    lds_version = Some(decode_ascii(node.as_bytes()?)?);
                }
                TAG_UNICODE_VERSION => {
                    unicode_version = Some(decode_ascii(node.as_bytes()?)?);
                }
                TAG_TAG_LIST => {
                    let bytes = node.as_bytes()?;
                    data_groups = Some(parse_tag_list(bytes)?);
                }
                _ => {}
            }
        }
        Ok(Self {
            lds_version: lds_version
                .ok_or(Error::MalformedTlv { reason: "EF.COM is missing the LDS version element" })?,
            unicode_version: unicode_version
                .ok_or(Error::MalformedTlv { reason: "EF.COM is missing the Unicode version element" })?,
            data_groups: data_groups
                .ok_or(Error::MalformedTlv { reason: "EF.COM is missing the tag list element" })?,
        })
    }
}

fn decode_ascii(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)
        .map_err(|_| Error::MalformedTlv { reason: "EF.COM field is not valid ASCII" })?
        .to_string())
}

/// Every DG outer tag fits in a single byte (`0x60..=0x7F`), so the `5C` tag
/// list is simply the raw bytes.
fn parse_tag_list(bytes: &[u8]) -> Result<Vec<u32>> {
    Ok(bytes.iter().map(|&b| b as u32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let com = Com {
            lds_version: "0107".to_string(),
            unicode_version: "040000".to_string(),
            data_groups: vec![0x61, 0x75, 0x6E, 0x6F, 0x77],
        };
        let encoded = com.encode();
        let decoded = Com::decode(&encoded).unwrap();
        assert_eq!(decoded, com);
        assert_eq!(decoded.encode(), encoded);
    }
}
