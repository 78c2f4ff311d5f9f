//! ISO/IEC 19794-4 finger image records ("FIR"), ICAO 9303-10 §4.7 (DG3) /
//! spec.md §4.9.
//!
//! DG3 is nationally defined and access-controlled (Terminal Authentication
//! is required before a card will release it), so unlike `face` this is
//! scoped to the common record envelope: each per-finger block is kept as
//! an opaque, round-trip-exact byte span (it is still individually length-
//! delimited, as ISO 19794-4 requires) rather than decomposing every finger
//! position/impression-type/image-quality field.

use super::RecordHeader;
use crate::error::{Error, Result};

const MAGIC: [u8; 4] = *b"FIR\0";

/// One per-finger image block: its length-prefixed bytes, metadata left
/// undecoded (see module docs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerImage {
    pub raw: Vec<u8>,
}

/// A complete ISO 19794-4 finger record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerRecord {
    pub version: [u8; 4],
    pub images: Vec<FingerImage>,
}

impl FingerRecord {
    pub fn encode(&self) -> Vec<u8> {
        let header = RecordHeader { magic: MAGIC, version: self.version, record_count: self.images.len() as u16 };
        let bodies: Vec<u8> = self
            .images
            .iter()
            .flat_map(|img| {
                let mut block = ((4 + img.raw.len()) as u32).to_be_bytes().to_vec();
                block.extend_from_slice(&img.raw);
                block
            })
            .collect();
        let mut out = Vec::with_capacity(14 + bodies.len());
        header.write(&mut out, (14 + bodies.len()) as u32);
        out.extend_from_slice(&bodies);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (header, _total_length, mut rest) = RecordHeader::read(bytes, &MAGIC)?;
        let mut images = Vec::with_capacity(header.record_count as usize);
        for _ in 0..header.record_count {
            if rest.len() < 4 {
                return Err(Error::MalformedTlv { reason: "finger image block truncated" });
            }
            let len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
            if len < 4 || len > rest.len() {
                return Err(Error::MalformedTlv { reason: "finger image block length out of range" });
            }
            let (block, tail) = rest.split_at(len);
            images.push(FingerImage { raw: block[4..].to_vec() });
            rest = tail;
        }
        Ok(Self { version: header.version, images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let record = FingerRecord {
            version: *b"020\0",
            images: vec![FingerImage { raw: vec![0x11; 40] }, FingerImage { raw: vec![0x22; 12] }],
        };
        let encoded = record.encode();
        let decoded = FingerRecord::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.encode(), encoded);
    }
}
