//! Integration-level Secure Messaging round trip driven through the public
//! crate API: a full BAC exchange (ICAO 9303-11 Appendix D.2 test MRZ and
//! `RND.ICC`) establishes the session, then a command is wrapped and a
//! hand-built chip response unwrapped through `icao9303::Icao9303`, exactly
//! as a reader driving a real card would.

use emrtd_core::{
    crypto::symmetric::{self, CipherSuite},
    error::Result,
    icao9303::{Icao9303, Transport},
    iso7816::StatusWord,
    kdf::{self, KeyLength},
    protocols::bac::BacSession,
};
use rand::{thread_rng, RngCore};

/// Builds the DO'99'/DO'8E' response body `unprotect` expects for a plain
/// `0x9000` status with no response data, MAC'd the same way
/// `secure_messaging::SecureMessaging::protect`/`unprotect` build it
/// (SSC incremented once, then the padded `DO99` MAC'd with the session key).
fn build_success_response(suite: CipherSuite, k_mac: &[u8], ssc_after_increment: u128) -> Vec<u8> {
    let mut do99 = vec![0x99, 0x02, 0x90, 0x00];
    let padded = symmetric::pad(&do99, suite.block_size());

    let ssc_bytes = {
        let full = ssc_after_increment.to_be_bytes();
        full[full.len() - suite.ssc_len()..].to_vec()
    };
    let mut mac_input = ssc_bytes;
    mac_input.extend_from_slice(&padded);
    let tag = symmetric::mac(suite, k_mac, &mac_input).unwrap();

    do99.push(0x8E);
    do99.push(0x08);
    do99.extend_from_slice(&tag);
    do99.extend_from_slice(&[0x90, 0x00]);
    do99
}

struct FixedResponse(Vec<u8>);

impl Transport for FixedResponse {
    fn transceive(&mut self, apdu: &[u8]) -> Result<Vec<u8>> {
        assert_eq!(apdu[0] & 0x0C, 0x0C, "command header must be SM-protected");
        Ok(self.0.clone())
    }
}

#[test]
fn test_bac_then_secure_messaging_round_trip() {
    let mrz_information = b"L898902C<369080619406236";
    let rnd_icc = [0x46, 0x08, 0xF9, 0x19, 0x88, 0x70, 0x22, 0x12];
    let mut rng = thread_rng();

    let (session, command) = BacSession::initiate(mrz_information, rnd_icc, &mut rng);
    assert_eq!(command.len(), 40);

    let k_seed = kdf::bac_seed(mrz_information);
    let k_enc = kdf::derive_key(&k_seed, kdf::COUNTER_ENC, KeyLength::Tdes);
    let k_mac = kdf::derive_key(&k_seed, kdf::COUNTER_MAC, KeyLength::Tdes);
    let decrypted_ifd =
        symmetric::decrypt_cbc(CipherSuite::Des3CbcCbc, &k_enc, &[0u8; 8], &command[..32]).unwrap();
    let rnd_ifd = decrypted_ifd[0..8].to_vec();
    let k_ifd = decrypted_ifd[16..32].to_vec();

    let mut k_icc = [0u8; 16];
    rng.fill_bytes(&mut k_icc);
    let mut response_plain = Vec::with_capacity(32);
    response_plain.extend_from_slice(&rnd_icc);
    response_plain.extend_from_slice(&rnd_ifd);
    response_plain.extend_from_slice(&k_icc);
    let ciphertext =
        symmetric::encrypt_cbc(CipherSuite::Des3CbcCbc, &k_enc, &[0u8; 8], &response_plain).unwrap();
    let mac = symmetric::mac(CipherSuite::Des3CbcCbc, &k_mac, &ciphertext).unwrap();
    let mut response = ciphertext;
    response.extend_from_slice(&mac);

    let sm = session.complete(&response).unwrap();

    let mut k_seed_session = [0u8; 16];
    for i in 0..16 {
        k_seed_session[i] = k_ifd[i] ^ k_icc[i];
    }
    let k_smac = kdf::derive_key(&k_seed_session, kdf::COUNTER_MAC, KeyLength::Tdes);
    // `send` below calls `protect` (SSC +1, for the command MAC) then
    // `unprotect` (SSC +1 again, for the response MAC) in the same exchange.
    let ssc_for_response_mac = sm.ssc() + 2;

    let chip_response = build_success_response(CipherSuite::Des3CbcCbc, &k_smac, ssc_for_response_mac);

    let mut reader = Icao9303::new(FixedResponse(chip_response));
    reader.establish_secure_messaging(sm);

    let (sw, data) = reader.select_file(0x011E).unwrap();
    assert_eq!(sw, StatusWord::SUCCESS);
    assert!(data.is_empty());
}
