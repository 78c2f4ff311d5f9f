//! Session orchestration for a single eMRTD: owns a transport handle and,
//! once an access-control protocol (BAC/PACE) has completed, the Secure
//! Messaging wrapper that protects every APDU sent afterwards.
//!
//! This crate is transport-agnostic (see the crate doc comment): it builds
//! and interprets APDUs and file contents but never talks to a reader
//! itself, so [`Transport`] is implemented by the caller.

use crate::{
    error::{Error, Result},
    iso7816::StatusWord,
    secure_messaging::SecureMessaging,
};

/// AID of the eMRTD application, ICAO 9303-10 3.2.1.
pub const EMRTD_AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01];

/// Sends a raw command APDU and returns the raw response (data, if any,
/// followed by the status word).
pub trait Transport {
    fn transceive(&mut self, apdu: &[u8]) -> Result<Vec<u8>>;
}

/// A session against a single eMRTD. Plain until `establish_secure_messaging`
/// is called with the result of a completed BAC ([`crate::protocols::bac`])
/// or PACE ([`crate::protocols::pace`]) exchange, after which every command
/// sent through [`Icao9303::send`] is transparently protected.
pub struct Icao9303<T> {
    transport: T,
    sm: Option<SecureMessaging>,
}

impl<T: Transport> Icao9303<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, sm: None }
    }

    pub fn establish_secure_messaging(&mut self, sm: SecureMessaging) {
        self.sm = Some(sm);
    }

    pub fn has_secure_messaging(&self) -> bool {
        self.sm.is_some()
    }

    /// Sends a command APDU, wrapping/unwrapping it through Secure
    /// Messaging when a session has been established.
    pub fn send(&mut self, header: [u8; 4], data: &[u8], le: Option<&[u8]>) -> Result<(StatusWord, Vec<u8>)> {
        match &mut self.sm {
            Some(sm) => {
                let protected = sm.protect(&header, data, le)?;
                let response = self.transport.transceive(&protected)?;
                sm.unprotect(&response)
            }
            None => {
                let mut apdu = header.to_vec();
                if !data.is_empty() {
                    apdu.push(data.len() as u8);
                    apdu.extend_from_slice(data);
                }
                match le {
                    Some(le) => apdu.extend_from_slice(le),
                    None => apdu.push(0x00),
                }
                let response = self.transport.transceive(&apdu)?;
                split_status_word(&response)
            }
        }
    }

    /// SELECT the eMRTD application by AID.
    pub fn select_application(&mut self) -> Result<StatusWord> {
        let (sw, _) = self.send([0x00, 0xA4, 0x04, 0x0C], &EMRTD_AID, None)?;
        Ok(sw)
    }

    /// SELECT an elementary file by file identifier, ICAO 9303-10 3.6.2.
    pub fn select_file(&mut self, file_id: u16) -> Result<StatusWord> {
        let (sw, _) = self.send([0x00, 0xA4, 0x02, 0x0C], &file_id.to_be_bytes(), None)?;
        Ok(sw)
    }

    /// Reads the currently selected file's contents via repeated READ
    /// BINARY, ICAO 9303-10 3.6.3, stopping once the chip returns less than
    /// a full chunk.
    pub fn read_binary(&mut self) -> Result<Vec<u8>> {
        const CHUNK: u8 = 0xDC; // request up to 220 bytes per READ BINARY
        let mut contents = Vec::new();
        loop {
            let offset = (contents.len() as u16).to_be_bytes();
            let (sw, chunk) = self.send([0x00, 0xB0, offset[0], offset[1]], &[], Some(&[CHUNK]))?;
            let got = chunk.len();
            contents.extend_from_slice(&chunk);
            if !sw.is_success() || got < CHUNK as usize {
                break;
            }
        }
        Ok(contents)
    }
}

fn split_status_word(response: &[u8]) -> Result<(StatusWord, Vec<u8>)> {
    if response.len() < 2 {
        return Err(Error::ProtocolError {
            stage: "icao9303",
            cause: "response shorter than a status word".into(),
        });
    }
    let (body, sw) = response.split_at(response.len() - 2);
    Ok((StatusWord::from(u16::from_be_bytes([sw[0], sw[1]])), body.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockCard {
        responses: Vec<Vec<u8>>,
        sent: Vec<Vec<u8>>,
    }

    impl Transport for MockCard {
        fn transceive(&mut self, apdu: &[u8]) -> Result<Vec<u8>> {
            self.sent.push(apdu.to_vec());
            Ok(self.responses.remove(0))
        }
    }

    #[test]
    fn test_select_application_sends_expected_apdu() {
        let card = MockCard { responses: vec![vec![0x90, 0x00]], sent: Vec::new() };
        let mut session = Icao9303::new(card);
        let sw = session.select_application().unwrap();
        assert_eq!(sw, StatusWord::SUCCESS);
        assert_eq!(session.transport.sent[0][..4], [0x00, 0xA4, 0x04, 0x0C]);
        assert_eq!(&session.transport.sent[0][5..12], &EMRTD_AID);
    }

    #[test]
    fn test_read_binary_stops_on_short_chunk() {
        let mut first_chunk = vec![0xAA; 0xDC];
        first_chunk.extend_from_slice(&[0x90, 0x00]);
        let second_chunk = vec![0xBB, 0xBB, 0x90, 0x00];
        let card = MockCard { responses: vec![first_chunk, second_chunk], sent: Vec::new() };
        let mut session = Icao9303::new(card);
        let data = session.read_binary().unwrap();
        assert_eq!(data.len(), 0xDC + 2);
        assert_eq!(session.transport.sent.len(), 2);
    }

    #[test]
    fn test_send_routes_through_secure_messaging_once_established() {
        use crate::crypto::symmetric::CipherSuite;
        let key = vec![0u8; 16];
        let sm = SecureMessaging::new(CipherSuite::AesCbcCmac128, key.clone(), key, 0);

        let card = MockCard { responses: vec![vec![0x6F, 0x00]], sent: Vec::new() };
        let mut session = Icao9303::new(card);
        session.establish_secure_messaging(sm);
        assert!(session.has_secure_messaging());

        // A garbled SM response (no DO'99'/DO'8E') must surface as an error,
        // not silently fall back to plaintext parsing.
        assert!(session.send([0x00, 0xA4, 0x02, 0x0C], &[0x01, 0x1E], None).is_err());
    }
}
