//! DG1: the Machine Readable Zone, ICAO 9303-10 §4.7.1 / spec.md §4.7, §8
//! scenario 1.

use super::LdsFile;
use crate::{
    error::{Error, Result},
    tlv::Node,
};

/// Tag of the single data element nested inside DG1 (`5F1F`, "MRZ
/// information").
const TAG_MRZ_DATA: u32 = 0x5F1F;

/// DG1: a single `5F1F` element holding the raw MRZ string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dg1 {
    pub mrz: MrzInfo,
}

impl LdsFile for Dg1 {
    const OUTER_TAG: u32 = 0x61;

    fn encode_children(&self) -> Vec<Node> {
        vec![Node::primitive(TAG_MRZ_DATA, self.mrz.raw.clone().into_bytes())]
    }

    fn decode_children(children: &[Node]) -> Result<Self> {
        let node = children.first().ok_or(Error::MalformedTlv {
            reason: "DG1 is missing its MRZ data element",
        })?;
        if node.tag.0 != TAG_MRZ_DATA {
            return Err(Error::UnexpectedTag {
                expected: TAG_MRZ_DATA,
                found: node.tag.0,
            });
        }
        Ok(Self { mrz: MrzInfo::parse(node.as_bytes()?)? })
    }
}

/// The three MRZ formats, ICAO 9303-4/5/11.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MrzFormat {
    /// Two 30-character lines, used on ID cards.
    Td1,
    /// Two 36-character lines, used on some visas/ID cards.
    Td2,
    /// Two 44-character lines, used on passport books.
    Td3,
}

/// A parsed MRZ, ICAO 9303-4/5 field layouts. Equality and round trip are
/// defined on the raw string: fields are derived views over it.
///
/// Dates (`date_of_birth`/`date_of_expiry`) are kept as the raw `yyMMdd`
/// MRZ string; resolving the century is ambiguous without external context
/// (the document's validity window), and is left to the caller, spec.md §9.
#[derive(Clone, Debug, Eq)]
pub struct MrzInfo {
    raw: String,
    pub format: MrzFormat,
    pub document_code: String,
    pub issuing_state: String,
    pub primary_identifier: String,
    pub secondary_identifiers: Vec<String>,
    pub document_number: String,
    pub document_number_check_digit: char,
    pub nationality: String,
    pub date_of_birth: String,
    pub date_of_birth_check_digit: char,
    pub sex: char,
    pub date_of_expiry: String,
    pub date_of_expiry_check_digit: char,
    pub personal_number: String,
    pub personal_number_check_digit: char,
    pub composite_check_digit: char,
}

impl PartialEq for MrzInfo {
    /// Field-wise comparison after trimming padding filler `<`, spec.md §3.
    fn eq(&self, other: &Self) -> bool {
        fn trim(s: &str) -> &str {
            s.trim_end_matches('<')
        }
        self.document_code == other.document_code
            && self.issuing_state == other.issuing_state
            && self.primary_identifier == other.primary_identifier
            && self.secondary_identifiers == other.secondary_identifiers
            && self.document_number == other.document_number
            && self.nationality == other.nationality
            && self.date_of_birth == other.date_of_birth
            && self.sex == other.sex
            && self.date_of_expiry == other.date_of_expiry
            && trim(&self.personal_number) == trim(&other.personal_number)
    }
}

impl MrzInfo {
    /// The exact MRZ bytes this value was parsed from, or will re-encode to.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parses an MRZ string. Only the TD3 (passport book, 2x44) layout is
    /// fully implemented; spec.md §1 scopes DG1 parsing to interface level,
    /// but spec.md §8 scenario 1 requires a working TD3 decoder, so that one
    /// layout is built out completely. TD1/TD2 are recognized by length but
    /// rejected with `UnsupportedField` rather than silently mis-parsed.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw = std::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedTlv { reason: "MRZ is not valid UTF-8/ASCII" })?
            .to_string();
        match raw.len() {
            88 => Self::parse_td3(raw),
            90 => Err(Error::UnsupportedField { field: "TD1 MRZ" }),
            72 => Err(Error::UnsupportedField { field: "TD2 MRZ" }),
            _ => Err(Error::MalformedTlv { reason: "MRZ has an unrecognized length" }),
        }
    }

    fn parse_td3(raw: String) -> Result<Self> {
        let (line1, line2) = raw.split_at(44);
        let document_code = line1[0..2].to_string();
        let issuing_state = line1[2..5].to_string();
        let (primary_identifier, secondary_identifiers) = split_name(&line1[5..44]);

        let document_number = line2[0..9].to_string();
        let document_number_check_digit = nth_char(line2, 9)?;
        check(&line2[0..9], document_number_check_digit, "document number")?;

        let nationality = line2[10..13].to_string();

        let date_of_birth = line2[13..19].to_string();
        let date_of_birth_check_digit = nth_char(line2, 19)?;
        check(&line2[13..19], date_of_birth_check_digit, "date of birth")?;

        let sex = nth_char(line2, 20)?;

        let date_of_expiry = line2[21..27].to_string();
        let date_of_expiry_check_digit = nth_char(line2, 27)?;
        check(&line2[21..27], date_of_expiry_check_digit, "date of expiry")?;

        let personal_number = line2[28..42].to_string();
        let personal_number_check_digit = nth_char(line2, 42)?;
        // The personal number check digit may legitimately be `<` when the
        // field is entirely unused, per ICAO 9303-4 Appendix A.
        if personal_number_check_digit != '<' {
            check(&personal_number, personal_number_check_digit, "personal number")?;
        }

        let composite_check_digit = nth_char(line2, 43)?;
        let mut composite_input = String::new();
        composite_input.push_str(&document_number);
        composite_input.push(document_number_check_digit);
        composite_input.push_str(&date_of_birth);
        composite_input.push(date_of_birth_check_digit);
        composite_input.push_str(&date_of_expiry);
        composite_input.push(date_of_expiry_check_digit);
        composite_input.push_str(&personal_number);
        composite_input.push(personal_number_check_digit);
        check(&composite_input, composite_check_digit, "composite")?;

        Ok(Self {
            raw,
            format: MrzFormat::Td3,
            document_code,
            issuing_state,
            primary_identifier,
            secondary_identifiers,
            document_number,
            document_number_check_digit,
            nationality,
            date_of_birth,
            date_of_birth_check_digit,
            sex,
            date_of_expiry,
            date_of_expiry_check_digit,
            personal_number,
            personal_number_check_digit,
            composite_check_digit,
        })
    }
}

fn nth_char(s: &str, i: usize) -> Result<char> {
    s.chars().nth(i).ok_or(Error::MalformedTlv { reason: "MRZ field too short" })
}

/// Splits an MRZ name field on the surname/given-names separator `<<`, and
/// the given names further on single `<` separators, trimming trailing
/// filler.
fn split_name(field: &str) -> (String, Vec<String>) {
    let mut parts = field.splitn(2, "<<");
    let primary = parts.next().unwrap_or("").trim_end_matches('<').to_string();
    let rest = parts.next().unwrap_or("").trim_end_matches('<');
    let secondary = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('<').filter(|s| !s.is_empty()).map(str::to_string).collect()
    };
    (primary, secondary)
}

/// ICAO 9303-3 §4.9 check digit: weights `7, 3, 1` cycling per character,
/// `<` = 0, digits at face value, letters `A..Z` = `10..35`.
fn check_digit(field: &str) -> u8 {
    const WEIGHTS: [u32; 3] = [7, 3, 1];
    let total: u32 = field
        .chars()
        .enumerate()
        .map(|(i, c)| char_value(c) * WEIGHTS[i % 3])
        .sum();
    (total % 10) as u8
}

fn char_value(c: char) -> u32 {
    match c {
        '<' => 0,
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='Z' => c as u32 - 'A' as u32 + 10,
        _ => 0,
    }
}

fn check(field: &str, digit: char, name: &'static str) -> Result<()> {
    let expected = char::from(b'0' + check_digit(field));
    if digit != expected {
        return Err(match name {
            "document number" => Error::MalformedTlv { reason: "MRZ document number check digit mismatch" },
            "date of birth" => Error::MalformedTlv { reason: "MRZ date of birth check digit mismatch" },
            "date of expiry" => Error::MalformedTlv { reason: "MRZ date of expiry check digit mismatch" },
            "personal number" => Error::MalformedTlv { reason: "MRZ personal number check digit mismatch" },
            _ => Error::MalformedTlv { reason: "MRZ composite check digit mismatch" },
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TD3_MRZ: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\
L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    #[test]
    fn test_td3_round_trip_and_fields() {
        let mrz = MrzInfo::parse(TD3_MRZ.as_bytes()).unwrap();
        assert_eq!(mrz.document_code, "P<");
        assert_eq!(mrz.issuing_state, "UTO");
        assert_eq!(mrz.primary_identifier, "ERIKSSON");
        assert_eq!(mrz.secondary_identifiers, vec!["ANNA", "MARIA"]);
        assert_eq!(mrz.document_number, "L898902C3");
        assert_eq!(mrz.nationality, "UTO");
        assert_eq!(mrz.date_of_birth, "740812");
        assert_eq!(mrz.sex, 'F');
        assert_eq!(mrz.date_of_expiry, "120415");

        let dg1 = Dg1 { mrz: mrz.clone() };
        let encoded = dg1.encode();
        assert_eq!(&encoded[..5], [0x61, 0x5B, 0x5F, 0x1F, 0x58]);
        let decoded = Dg1::decode(&encoded).unwrap();
        assert_eq!(decoded.mrz, mrz);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn test_rejects_bad_check_digit() {
        let mut bytes = TD3_MRZ.as_bytes().to_vec();
        bytes[9] = b'9'; // corrupt the document number check digit
        assert!(MrzInfo::parse(&bytes).is_err());
    }
}
