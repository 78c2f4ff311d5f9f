//! ICAO 9303-11 Appendix: key derivation function for BAC, PACE and Secure
//! Messaging session keys.
//!
//! `K(K_seed, c) = first m bytes of H(K_seed || c)`, with `H` and `m` chosen
//! per target cipher.

use {
    crate::crypto::symmetric::DigestAlgorithm,
    sha1::{Digest, Sha1},
};

/// `c` values from ICAO 9303-11 9.7.1.
pub const COUNTER_ENC: u32 = 1;
pub const COUNTER_MAC: u32 = 2;
pub const COUNTER_PACE: u32 = 3;

/// The cipher/key-length a derived key is destined for, selecting `(H, m)`
/// per ICAO 9303-11 Table in Appendix G.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyLength {
    Tdes,
    Aes128,
    Aes192,
    Aes256,
}

impl KeyLength {
    const fn digest(self) -> DigestAlgorithm {
        match self {
            Self::Tdes | Self::Aes128 => DigestAlgorithm::Sha1,
            Self::Aes192 | Self::Aes256 => DigestAlgorithm::Sha256,
        }
    }

    const fn key_bytes(self) -> usize {
        match self {
            Self::Tdes | Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// `K(K_seed, c)`, truncated/parity-adjusted for the target cipher.
pub fn derive_key(k_seed: &[u8], counter: u32, key_length: KeyLength) -> Vec<u8> {
    let mut input = k_seed.to_vec();
    input.extend_from_slice(&counter.to_be_bytes());
    let hash = key_length.digest().digest(&input);
    let mut key = hash[..key_length.key_bytes()].to_vec();
    if key_length == KeyLength::Tdes {
        adjust_parity(&mut key);
    }
    key
}

/// Sets odd parity on every byte, as required for a DES/3DES key.
fn adjust_parity(key: &mut [u8]) {
    for byte in key.iter_mut() {
        if byte.count_ones() % 2 == 0 {
            *byte ^= 1;
        }
    }
}

/// `K_seed` for BAC: `SHA1(MRZ_information)[0..16]`, per ICAO 9303-11 4.3.2.
pub fn bac_seed(mrz_information: &[u8]) -> [u8; 16] {
    let digest = Sha1::digest(mrz_information);
    let mut seed = [0u8; 16];
    seed.copy_from_slice(&digest[..16]);
    seed
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    // ICAO 9303-11 Appendix D.2 worked example.
    #[test]
    fn test_bac_key_derivation() {
        let mrz_information = b"L898902C<369080619406236";
        let k_seed = bac_seed(mrz_information);
        assert_eq!(k_seed, hex!("239AB9CB282DAF66231DC5A4DF6BFBAE"));

        let k_enc = derive_key(&k_seed, COUNTER_ENC, KeyLength::Tdes);
        assert_eq!(
            k_enc,
            hex!("AB94FDECF2674FDFB9B391F85D7F76F2")
        );

        let k_mac = derive_key(&k_seed, COUNTER_MAC, KeyLength::Tdes);
        assert_eq!(
            k_mac,
            hex!("7962D9ECE03D1ACD4C76089DCE131543")
        );
    }

    // ICAO 9303-11 Appendix G.2 worked example for PACE (AES-128).
    #[test]
    fn test_pace_kdf_example() {
        let k = hex!("7E2D2A41C74EA0B38CD36F863939BFA8E9032AAD");
        let k_pi = derive_key(&k[..], COUNTER_PACE, KeyLength::Aes128);
        assert_eq!(k_pi, hex!("89DED1B26624EC1E634C1989302849DD"));
    }
}
