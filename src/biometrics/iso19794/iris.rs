//! ISO/IEC 19794-6 iris image records ("IIR"), ICAO 9303-10 §4.7 (DG4) /
//! spec.md §4.9.
//!
//! Like `finger`, DG4 is access-controlled and nationally defined; the
//! per-image block is kept as an opaque, length-delimited byte span. The
//! one field this module does interpret is the eye-position subtype, since
//! spec.md §9 calls out its record-level/per-image aggregation as a
//! documented ambiguity (see [`BiometricsConfig::iris_subtype_aggregation`]).

use super::RecordHeader;
use crate::{
    biometrics::{BiometricsConfig, IrisSubtypeAggregation},
    error::{Error, Result},
};

const MAGIC: [u8; 4] = *b"IIR\0";

/// One per-eye iris image block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrisImage {
    pub subtype: u8,
    pub raw: Vec<u8>,
}

/// A complete ISO 19794-6 iris record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrisRecord {
    pub version: [u8; 4],
    pub record_subtype: u8,
    pub images: Vec<IrisImage>,
}

impl IrisRecord {
    /// Combines the record-level and per-image eye-position subtype bits,
    /// per the caller's chosen [`IrisSubtypeAggregation`].
    pub fn effective_subtype(&self, image: &IrisImage, config: &BiometricsConfig) -> u8 {
        match config.iris_subtype_aggregation {
            IrisSubtypeAggregation::Or => self.record_subtype | image.subtype,
            IrisSubtypeAggregation::And => self.record_subtype & image.subtype,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let header = RecordHeader { magic: MAGIC, version: self.version, record_count: self.images.len() as u16 };
        let bodies: Vec<u8> = self
            .images
            .iter()
            .flat_map(|img| {
                let mut block = ((5 + img.raw.len()) as u32).to_be_bytes().to_vec();
                block.push(img.subtype);
                block.extend_from_slice(&img.raw);
                block
            })
            .collect();
        let mut out = Vec::with_capacity(15 + bodies.len());
        header.write(&mut out, (15 + bodies.len()) as u32);
        out.push(self.record_subtype);
        out.extend_from_slice(&bodies);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (header, _total_length, rest) = RecordHeader::read(bytes, &MAGIC)?;
        let (&record_subtype, mut rest) = rest.split_first().ok_or(Error::MalformedTlv {
            reason: "iris record is missing its record-level subtype",
        })?;
        let mut images = Vec::with_capacity(header.record_count as usize);
        for _ in 0..header.record_count {
            if rest.len() < 5 {
                return Err(Error::MalformedTlv { reason: "iris image block truncated" });
            }
            let len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
            if len < 5 || len > rest.len() {
                return Err(Error::MalformedTlv { reason: "iris image block length out of range" });
            }
            let (block, tail) = rest.split_at(len);
            images.push(IrisImage { subtype: block[4], raw: block[5..].to_vec() });
            rest = tail;
        }
        Ok(Self { version: header.version, record_subtype, images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let record = IrisRecord {
            version: *b"020\0",
            record_subtype: 0b0000_0011,
            images: vec![IrisImage { subtype: 0b0000_0001, raw: vec![0x33; 20] }],
        };
        let encoded = record.encode();
        let decoded = IrisRecord::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_subtype_aggregation_or_vs_and() {
        let record = IrisRecord {
            version: *b"020\0",
            record_subtype: 0b0000_0010,
            images: vec![IrisImage { subtype: 0b0000_0001, raw: vec![] }],
        };
        let image = &record.images[0];
        let or_config = BiometricsConfig { iris_subtype_aggregation: IrisSubtypeAggregation::Or, ..Default::default() };
        let and_config = BiometricsConfig { iris_subtype_aggregation: IrisSubtypeAggregation::And, ..Default::default() };
        assert_eq!(record.effective_subtype(image, &or_config), 0b0000_0011);
        assert_eq!(record.effective_subtype(image, &and_config), 0b0000_0000);
    }
}
