//! ISO/IEC 19794-5 facial image records ("FAC"), ICAO 9303-10 §4.7
//! (DG2) / spec.md §4.9.

use super::RecordHeader;
use crate::{
    biometrics::BiometricsConfig,
    error::{Error, Result},
};

const MAGIC: [u8; 4] = *b"FAC\0";

/// Full JP2 file magic (ISO/IEC 15444-1 Annex I.1), vs. a bare JPEG 2000
/// codestream magic some encoders emit instead — spec.md §9 Open Question.
const JP2_BOX_MAGIC: [u8; 12] = [0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A];
const JP2_CODESTREAM_MAGIC: [u8; 4] = [0xFF, 0x4F, 0xFF, 0x51];

fn is_jp2(data: &[u8], config: &BiometricsConfig) -> bool {
    if data.starts_with(&JP2_BOX_MAGIC) {
        return true;
    }
    config.permissive_fac_jp2_fallback && data.starts_with(&JP2_CODESTREAM_MAGIC)
}

/// A single facial image and its ISO 19794-5 metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacialImage {
    pub feature_points: Vec<u8>,
    pub gender: u8,
    pub eye_colour: u8,
    pub hair_colour: u8,
    pub feature_mask: [u8; 3],
    pub expression: u16,
    pub pose_angle: [u8; 3],
    pub pose_angle_uncertainty: [u8; 3],
    pub facial_image_type: u8,
    pub image_data_type: u8,
    pub width: u16,
    pub height: u16,
    pub image_colour_space: u8,
    pub source_type: u8,
    pub device_type: u16,
    pub quality: u16,
    pub image_data: Vec<u8>,
}

impl FacialImage {
    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&((self.feature_points.len() / 8) as u16).to_be_bytes());
        body.push(self.gender);
        body.push(self.eye_colour);
        body.push(self.hair_colour);
        body.extend_from_slice(&self.feature_mask);
        body.extend_from_slice(&self.expression.to_be_bytes());
        body.extend_from_slice(&self.pose_angle);
        body.extend_from_slice(&self.pose_angle_uncertainty);
        body.extend_from_slice(&self.feature_points);
        body.push(self.facial_image_type);
        body.push(self.image_data_type);
        body.extend_from_slice(&self.width.to_be_bytes());
        body.extend_from_slice(&self.height.to_be_bytes());
        body.push(self.image_colour_space);
        body.push(self.source_type);
        body.extend_from_slice(&self.device_type.to_be_bytes());
        body.extend_from_slice(&self.quality.to_be_bytes());
        body.extend_from_slice(&self.image_data);

        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&((4 + body.len()) as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    fn decode(bytes: &[u8], config: &BiometricsConfig) -> Result<(Self, &[u8])> {
        if bytes.len() < 4 {
            return Err(Error::MalformedTlv { reason: "facial image record truncated" });
        }
        let record_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        if record_len < 4 || record_len > bytes.len() {
            return Err(Error::MalformedTlv { reason: "facial image record length out of range" });
        }
        let (record, rest) = bytes.split_at(record_len);
        let body = &record[4..];
        if body.len() < 20 {
            return Err(Error::MalformedTlv { reason: "facial image record truncated" });
        }
        let feature_point_count = u16::from_be_bytes([body[0], body[1]]) as usize;
        let gender = body[2];
        let eye_colour = body[3];
        let hair_colour = body[4];
        let feature_mask = [body[5], body[6], body[7]];
        let expression = u16::from_be_bytes([body[8], body[9]]);
        let pose_angle = [body[10], body[11], body[12]];
        let pose_angle_uncertainty = [body[13], body[14], body[15]];

        let feature_points_end = 20 + feature_point_count * 8;
        if body.len() < feature_points_end + 12 {
            return Err(Error::MalformedTlv { reason: "facial image feature points truncated" });
        }
        let feature_points = body[20..feature_points_end].to_vec();
        let post = &body[feature_points_end..];
        let facial_image_type = post[0];
        let image_data_type = post[1];
        let width = u16::from_be_bytes([post[2], post[3]]);
        let height = u16::from_be_bytes([post[4], post[5]]);
        let image_colour_space = post[6];
        let source_type = post[7];
        let device_type = u16::from_be_bytes([post[8], post[9]]);
        let quality = u16::from_be_bytes([post[10], post[11]]);
        let image_data = post[12..].to_vec();

        if image_data_type == 1 && !is_jp2(&image_data, config) {
            return Err(Error::MalformedTlv { reason: "facial image claims JPEG2000 but lacks its magic" });
        }

        Ok((
            Self {
                feature_points,
                gender,
                eye_colour,
                hair_colour,
                feature_mask,
                expression,
                pose_angle,
                pose_angle_uncertainty,
                facial_image_type,
                image_data_type,
                width,
                height,
                image_colour_space,
                source_type,
                device_type,
                quality,
                image_data,
            },
            rest,
        ))
    }
}

/// A complete ISO 19794-5 facial record (one or more [`FacialImage`]s).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacialRecord {
    pub version: [u8; 4],
    pub images: Vec<FacialImage>,
}

impl FacialRecord {
    pub fn encode(&self) -> Vec<u8> {
        let header = RecordHeader { magic: MAGIC, version: self.version, record_count: self.images.len() as u16 };
        let bodies: Vec<u8> = self.images.iter().flat_map(|img| img.encode()).collect();
        let mut out = Vec::with_capacity(14 + bodies.len());
        header.write(&mut out, (14 + bodies.len()) as u32);
        out.extend_from_slice(&bodies);
        out
    }

    pub fn decode(bytes: &[u8], config: &BiometricsConfig) -> Result<Self> {
        let (header, _total_length, mut rest) = RecordHeader::read(bytes, &MAGIC)?;
        let mut images = Vec::with_capacity(header.record_count as usize);
        for _ in 0..header.record_count {
            let (image, tail) = FacialImage::decode(rest, config)?;
            images.push(image);
            rest = tail;
        }
        Ok(Self { version: header.version, images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image(image_data: Vec<u8>) -> FacialImage {
        FacialImage {
            feature_points: Vec::new(),
            gender: 1,
            eye_colour: 1,
            hair_colour: 1,
            feature_mask: [0, 0, 0],
            expression: 0,
            pose_angle: [0, 0, 0],
            pose_angle_uncertainty: [0, 0, 0],
            facial_image_type: 1,
            image_data_type: 1,
            width: 480,
            height: 640,
            image_colour_space: 1,
            source_type: 2,
            device_type: 0,
            quality: 0,
            image_data,
        }
    }

    #[test]
    fn test_round_trip_with_jp2_codestream_fallback() {
        let mut image_data = JP2_CODESTREAM_MAGIC.to_vec();
        image_data.extend_from_slice(&[0xAA; 32]);
        let record = FacialRecord { version: *b"010\0", images: vec![sample_image(image_data)] };
        let config = BiometricsConfig::default();
        let encoded = record.encode();
        let decoded = FacialRecord::decode(&encoded, &config).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_bare_codestream_rejected_when_fallback_disabled() {
        let mut image_data = JP2_CODESTREAM_MAGIC.to_vec();
        image_data.extend_from_slice(&[0xAA; 32]);
        let record = FacialRecord { version: *b"010\0", images: vec![sample_image(image_data)] };
        let encoded = record.encode();
        let strict = BiometricsConfig { permissive_fac_jp2_fallback: false, ..Default::default() };
        assert!(FacialRecord::decode(&encoded, &strict).is_err());
    }
}
