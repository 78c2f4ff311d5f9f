//! Terminal Authentication, ICAO 9303-11 §4.6 / TR-03110-3 §3.5.
//!
//! TA proves the inspection system's authorization to the chip by pushing a
//! Card Verifiable certificate chain (`MSE:Set DST` + `PSO:Verify
//! Certificate`, repeated per link) and then signing the chip's challenge
//! with the inspection system's private key (`MSE:Set AT` + `GET
//! CHALLENGE`/`EXTERNAL AUTHENTICATE`). This crate does not hold or manage
//! IS credentials: callers supply the already-negotiated certificate chain
//! and signing capability; this module only shapes the data each APDU step
//! signs/carries, not the private key material itself.

use crate::error::{Error, Result};

/// The data external-authenticated in TA step 2, ICAO 9303-11 9.2.5:
/// `ID_PICC || compressed ephemeral CA public key || challenge`, where
/// `id_picc` is the chip's identifier from Chip Authentication (or the BAC
/// session's RND.ICC when CA wasn't performed first).
pub fn signed_data(id_picc: &[u8], compressed_ca_public_key: &[u8], chip_challenge: &[u8; 8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(id_picc.len() + compressed_ca_public_key.len() + 8);
    data.extend_from_slice(id_picc);
    data.extend_from_slice(compressed_ca_public_key);
    data.extend_from_slice(chip_challenge);
    data
}

/// Validates the chip's `GET CHALLENGE` response has the length TA expects.
/// The actual signature check is the caller's `crypto::ecdsa`/`crypto::rsa`
/// call over [`signed_data`], since the scheme depends on the IS
/// certificate's public key algorithm.
pub fn validate_challenge(chip_challenge: &[u8]) -> Result<[u8; 8]> {
    chip_challenge.try_into().map_err(|_| Error::ProtocolError {
        stage: "terminal authentication",
        cause: "challenge is not 8 bytes".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_data_concatenation_order() {
        let id_picc = [0xAAu8; 8];
        let ca_pub = [0xBBu8; 33];
        let challenge = [0xCCu8; 8];
        let data = signed_data(&id_picc, &ca_pub, &challenge);
        assert_eq!(data.len(), 8 + 33 + 8);
        assert_eq!(&data[0..8], &id_picc);
        assert_eq!(&data[8..41], &ca_pub);
        assert_eq!(&data[41..49], &challenge);
    }
}
