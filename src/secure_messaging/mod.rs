//! Secure Messaging: the stateful APDU wrap/unwrap layer, ICAO 9303-11 9.8.
//!
//! Replaces the teacher's `PlainText`/`SecureMessaging` trait stub with the
//! full SSC-tracked wrapper described in `spec.md` §4.4.

use {
    crate::{
        crypto::symmetric::{self, CipherSuite},
        error::{Error, Result},
        iso7816::StatusWord,
    },
    tracing::{debug, warn},
};

/// Session state owned by a Secure Messaging wrapper.
///
/// Once constructed, `enc_key`/`mac_key` never change; `ssc` increases by
/// exactly one before each MAC computation/verification (spec.md §8 SSC
/// monotonicity property: two increments per successful exchange).
pub struct SecureMessaging {
    suite: CipherSuite,
    enc_key: Vec<u8>,
    mac_key: Vec<u8>,
    ssc: u128,
    terminated: bool,
}

impl SecureMessaging {
    pub fn new(suite: CipherSuite, enc_key: Vec<u8>, mac_key: Vec<u8>, ssc: u128) -> Self {
        debug_assert_eq!(enc_key.len(), suite.key_len());
        debug_assert_eq!(mac_key.len(), suite.key_len());
        Self {
            suite,
            enc_key,
            mac_key,
            ssc,
            terminated: false,
        }
    }

    /// Current SSC value. Exposed for diagnostics only; the key material
    /// itself is never exposed (spec.md §8 key opacity property).
    pub fn ssc(&self) -> u128 {
        self.ssc
    }

    fn ssc_bytes(&self) -> Vec<u8> {
        let full = self.ssc.to_be_bytes();
        full[full.len() - self.suite.ssc_len()..].to_vec()
    }

    fn increment_ssc(&mut self) {
        self.ssc = self.ssc.wrapping_add(1);
    }

    fn mac(&self, data: &[u8]) -> Result<[u8; 8]> {
        symmetric::mac(self.suite, &self.mac_key, data).map_err(|_| Error::CryptoFailed {
            stage: "secure messaging MAC",
        })
    }

    fn enc_iv(&self) -> Result<Vec<u8>> {
        if self.suite.is_aes() {
            let mut block = [0u8; 16];
            block.copy_from_slice(&self.ssc_bytes());
            let iv = symmetric::aes_iv(&self.enc_key, &block)
                .map_err(|_| Error::CryptoFailed { stage: "AES SM IV" })?;
            Ok(iv.to_vec())
        } else {
            Ok(vec![0u8; 8])
        }
    }

    /// Protects a plain command APDU, per spec.md §4.4.
    pub fn protect(&mut self, header: &[u8; 4], data: &[u8], le: Option<&[u8]>) -> Result<Vec<u8>> {
        self.ensure_live()?;

        let mut protected_header = *header;
        protected_header[0] |= 0x0C;

        let mut body = Vec::new();
        if !data.is_empty() {
            let iv = self.enc_iv()?;
            let ciphertext = symmetric::encrypt_cbc(self.suite, &self.enc_key, &iv, data)
                .map_err(|_| Error::CryptoFailed { stage: "SM encrypt" })?;
            let mut do87 = vec![0x01];
            do87.extend_from_slice(&ciphertext);
            append_do(&mut body, 0x87, &do87);
        }
        if let Some(le) = le {
            append_do(&mut body, 0x97, le);
        }

        let mut mac_input = self.padded_header(&protected_header);
        mac_input.extend_from_slice(&body);
        let mac_input = symmetric::pad(&mac_input, self.suite.block_size());
        self.increment_ssc();
        let mut mac_input_with_ssc = self.ssc_bytes();
        mac_input_with_ssc.extend_from_slice(&mac_input);
        let tag = self.mac(&mac_input_with_ssc)?;
        append_do(&mut body, 0x8E, &tag);

        let mut apdu = protected_header.to_vec();
        apdu.push(body.len().try_into().map_err(|_| Error::CryptoFailed {
            stage: "SM command too long",
        })?);
        apdu.extend_from_slice(&body);
        apdu.push(0x00);
        debug!(ssc = self.ssc, "protected command APDU");
        Ok(apdu)
    }

    fn padded_header(&self, header: &[u8; 4]) -> Vec<u8> {
        symmetric::pad(header, self.suite.block_size())
    }

    /// Verifies and decrypts a protected response, per spec.md §4.4.
    pub fn unprotect(&mut self, response: &[u8]) -> Result<(StatusWord, Vec<u8>)> {
        self.ensure_live()?;
        if response.len() < 2 {
            self.terminated = true;
            return Err(Error::MalformedTlv {
                reason: "response shorter than a status word",
            });
        }
        let (body, sw_bytes) = response.split_at(response.len() - 2);
        let sw = StatusWord::from(u16::from_be_bytes([sw_bytes[0], sw_bytes[1]]));

        let mut do87 = None;
        let mut do99 = None;
        let mut do8e = None;
        let mut cursor = body;
        while !cursor.is_empty() {
            let (tag, value, rest) = read_do(cursor)?;
            match tag {
                0x87 => do87 = Some(value),
                0x99 => do99 = Some(value),
                0x8E => do8e = Some(value),
                _ => warn!(tag, "unexpected data object in SM response"),
            }
            cursor = rest;
        }

        let do99 = do99.ok_or_else(|| {
            self.terminated = true;
            Error::SessionTerminated
        })?;
        let do8e = do8e.ok_or_else(|| {
            self.terminated = true;
            Error::SessionTerminated
        })?;

        let mut mac_input = Vec::new();
        if let Some(do87) = do87 {
            append_do(&mut mac_input, 0x87, do87);
        }
        append_do(&mut mac_input, 0x99, do99);
        let mac_input = symmetric::pad(&mac_input, self.suite.block_size());
        self.increment_ssc();
        let mut mac_input_with_ssc = self.ssc_bytes();
        mac_input_with_ssc.extend_from_slice(&mac_input);
        let expected = self.mac(&mac_input_with_ssc)?;

        if expected.as_slice() != do8e {
            self.terminated = true;
            return Err(Error::SessionTerminated);
        }

        let plaintext = match do87 {
            Some(do87) => {
                ensure_len(do87, 1)?;
                let (marker, ciphertext) = do87.split_at(1);
                if marker[0] != 0x01 {
                    self.terminated = true;
                    return Err(Error::SessionTerminated);
                }
                let iv = self.enc_iv()?;
                symmetric::decrypt_cbc(self.suite, &self.enc_key, &iv, ciphertext).map_err(|_| {
                    self.terminated = true;
                    Error::SessionTerminated
                })?
            }
            None => Vec::new(),
        };

        debug!(ssc = self.ssc, sw = %sw, "unprotected response APDU");
        Ok((sw, plaintext))
    }

    fn ensure_live(&self) -> Result<()> {
        if self.terminated {
            Err(Error::SessionTerminated)
        } else {
            Ok(())
        }
    }
}

fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        Err(Error::MalformedTlv {
            reason: "data object shorter than required",
        })
    } else {
        Ok(())
    }
}

fn append_do(buffer: &mut Vec<u8>, tag: u8, value: &[u8]) {
    buffer.push(tag);
    if value.len() < 128 {
        buffer.push(value.len() as u8);
    } else {
        let be = (value.len() as u32).to_be_bytes();
        let trim = be.iter().position(|&b| b != 0).unwrap_or(3);
        let trimmed = &be[trim..];
        buffer.push(0x80 | trimmed.len() as u8);
        buffer.extend_from_slice(trimmed);
    }
    buffer.extend_from_slice(value);
}

fn read_do(data: &[u8]) -> Result<(u8, &[u8], &[u8])> {
    ensure_len(data, 2)?;
    let tag = data[0];
    let (len, rest) = if data[1] < 0x80 {
        (data[1] as usize, &data[2..])
    } else {
        let n = (data[1] & 0x7F) as usize;
        ensure_len(data, 2 + n)?;
        let mut len = 0usize;
        for &b in &data[2..2 + n] {
            len = (len << 8) | b as usize;
        }
        (len, &data[2 + n..])
    };
    ensure_len(rest, len)?;
    Ok((tag, &rest[..len], &rest[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_do_round_trip_short_and_long_form() {
        let mut buffer = Vec::new();
        append_do(&mut buffer, 0x87, &[0xAB; 10]);
        let (tag, value, rest) = read_do(&buffer).unwrap();
        assert_eq!(tag, 0x87);
        assert_eq!(value, &[0xAB; 10][..]);
        assert!(rest.is_empty());

        let mut buffer = Vec::new();
        append_do(&mut buffer, 0x87, &[0xCD; 200]);
        let (tag, value, rest) = read_do(&buffer).unwrap();
        assert_eq!(tag, 0x87);
        assert_eq!(value.len(), 200);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_ssc_increments_twice_per_exchange() {
        let key = vec![0u8; 16];
        let mut sm = SecureMessaging::new(CipherSuite::AesCbcCmac128, key.clone(), key, 0);
        let initial = sm.ssc();
        let protected = sm.protect(&[0x00, 0xA4, 0x02, 0x0C], &[], Some(&[0x00])).unwrap();
        assert!(protected[0] & 0x0C == 0x0C);
        assert_eq!(sm.ssc(), initial + 1);
    }

    #[test]
    fn test_session_terminates_on_mac_mismatch() {
        let key = vec![0u8; 16];
        let mut sm = SecureMessaging::new(CipherSuite::AesCbcCmac128, key.clone(), key, 0);
        let mut fake_response = vec![0x99, 0x02, 0x90, 0x00, 0x8E, 0x08];
        fake_response.extend_from_slice(&[0u8; 8]);
        fake_response.extend_from_slice(&[0x90, 0x00]);
        assert!(sm.unprotect(&fake_response).is_err());
        // Session is now terminated; any further use fails fast.
        assert!(sm.unprotect(&fake_response).is_err());
    }
}
