//! Symmetric primitives for Secure Messaging: block ciphers, MACs and
//! hashes, per ICAO 9303-11 9.8 / TR-SAC §4.

use {
    aes::{Aes128, Aes192, Aes256},
    anyhow::{anyhow, ensure, Result},
    cbc::{Decryptor, Encryptor},
    cipher::{
        block_padding::Iso7816, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut,
        KeyInit, KeyIvInit,
    },
    des::{Des, TdesEde2},
    sha1::Sha1,
    sha2::{Sha224, Sha256, Sha384, Sha512},
};

/// The cipher suites listed in ICAO 9303-11 9.8.1, Table 13.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherSuite {
    /// `DES3_CBC_CBC`: 3DES-CBC / ISO 9797-1 MAC algorithm 3 (Retail MAC).
    Des3CbcCbc,
    /// `AES_CBC_CMAC_128`.
    AesCbcCmac128,
    /// `AES_CBC_CMAC_192`.
    AesCbcCmac192,
    /// `AES_CBC_CMAC_256`.
    AesCbcCmac256,
}

impl CipherSuite {
    /// `K_enc`/`K_mac` length in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Self::Des3CbcCbc => 16,
            Self::AesCbcCmac128 => 16,
            Self::AesCbcCmac192 => 24,
            Self::AesCbcCmac256 => 32,
        }
    }

    /// Cipher block size in bytes: also the SSC width for 3DES, but AES uses
    /// a 16-byte SSC regardless of key length.
    pub const fn block_size(self) -> usize {
        match self {
            Self::Des3CbcCbc => 8,
            _ => 16,
        }
    }

    pub const fn ssc_len(self) -> usize {
        self.block_size()
    }

    /// MAC output is always truncated to 8 bytes in Secure Messaging.
    pub const fn mac_len(self) -> usize {
        8
    }

    pub const fn is_aes(self) -> bool {
        !matches!(self, Self::Des3CbcCbc)
    }
}

/// Pads `data` with ISO/IEC 9797-1 padding method 2 (`0x80` then zeroes) to a
/// multiple of `block_size`.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.push(0x80);
    while padded.len() % block_size != 0 {
        padded.push(0x00);
    }
    padded
}

/// Strips ISO/IEC 9797-1 padding method 2, failing if the padding is
/// malformed.
pub fn unpad(data: &[u8]) -> Result<&[u8]> {
    let marker = data
        .iter()
        .rposition(|&b| b != 0x00)
        .ok_or_else(|| anyhow!("Padding is all zero"))?;
    ensure!(data[marker] == 0x80, "Missing 0x80 padding marker");
    Ok(&data[..marker])
}

/// Encrypts `plaintext` (which must already be block-aligned) under CBC mode
/// with the given IV.
pub fn encrypt_cbc(suite: CipherSuite, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    ensure!(key.len() == suite.key_len(), "Invalid key length");
    ensure!(iv.len() == suite.block_size(), "Invalid IV length");
    let padded = pad(plaintext, suite.block_size());
    Ok(match suite {
        CipherSuite::Des3CbcCbc => Encryptor::<TdesEde2>::new(key.into(), iv.into())
            .encrypt_padded_vec_mut::<Iso7816>(&padded[..plaintext.len()]),
        CipherSuite::AesCbcCmac128 => Encryptor::<Aes128>::new(key.into(), iv.into())
            .encrypt_padded_vec_mut::<Iso7816>(&padded[..plaintext.len()]),
        CipherSuite::AesCbcCmac192 => Encryptor::<Aes192>::new(key.into(), iv.into())
            .encrypt_padded_vec_mut::<Iso7816>(&padded[..plaintext.len()]),
        CipherSuite::AesCbcCmac256 => Encryptor::<Aes256>::new(key.into(), iv.into())
            .encrypt_padded_vec_mut::<Iso7816>(&padded[..plaintext.len()]),
    })
}

/// Decrypts a block-aligned `ciphertext`, returning the unpadded plaintext.
pub fn decrypt_cbc(suite: CipherSuite, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    ensure!(key.len() == suite.key_len(), "Invalid key length");
    ensure!(iv.len() == suite.block_size(), "Invalid IV length");
    ensure!(
        !ciphertext.is_empty() && ciphertext.len() % suite.block_size() == 0,
        "Ciphertext is not block-aligned"
    );
    let plaintext = match suite {
        CipherSuite::Des3CbcCbc => Decryptor::<TdesEde2>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<Iso7816>(ciphertext),
        CipherSuite::AesCbcCmac128 => Decryptor::<Aes128>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<Iso7816>(ciphertext),
        CipherSuite::AesCbcCmac192 => Decryptor::<Aes192>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<Iso7816>(ciphertext),
        CipherSuite::AesCbcCmac256 => Decryptor::<Aes256>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<Iso7816>(ciphertext),
    }
    .map_err(|_| anyhow!("Invalid padding"))?;
    Ok(plaintext)
}

/// Decrypts a single block-aligned buffer under CBC with no padding removed,
/// for PACE's encrypted nonce (ICAO 9303-11 4.4.3.3, always exactly one
/// block, carries no padding).
pub fn decrypt_cbc_no_padding(suite: CipherSuite, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    ensure!(key.len() == suite.key_len(), "Invalid key length");
    ensure!(iv.len() == suite.block_size(), "Invalid IV length");
    ensure!(
        !ciphertext.is_empty() && ciphertext.len() % suite.block_size() == 0,
        "Ciphertext is not block-aligned"
    );
    Ok(match suite {
        CipherSuite::Des3CbcCbc => Decryptor::<TdesEde2>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<cipher::block_padding::NoPadding>(ciphertext),
        CipherSuite::AesCbcCmac128 => Decryptor::<Aes128>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<cipher::block_padding::NoPadding>(ciphertext),
        CipherSuite::AesCbcCmac192 => Decryptor::<Aes192>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<cipher::block_padding::NoPadding>(ciphertext),
        CipherSuite::AesCbcCmac256 => Decryptor::<Aes256>::new(key.into(), iv.into())
            .decrypt_padded_vec_mut::<cipher::block_padding::NoPadding>(ciphertext),
    }
    .map_err(|_| anyhow!("Invalid block alignment"))?)
}

/// Computes the AES-CBC IV from the current SSC, per ICAO 9303-11 9.8.6.3:
/// `IV = AES-ECB_{K_enc}(SSC_block)`.
pub fn aes_iv(key: &[u8], ssc_block: &[u8; 16]) -> Result<[u8; 16]> {
    let mut block = cipher::generic_array::GenericArray::clone_from_slice(ssc_block);
    match key.len() {
        16 => Aes128::new_from_slice(key).unwrap().encrypt_block(&mut block),
        24 => Aes192::new_from_slice(key).unwrap().encrypt_block(&mut block),
        32 => Aes256::new_from_slice(key).unwrap().encrypt_block(&mut block),
        _ => return Err(anyhow!("Invalid AES key length")),
    }
    Ok(block.into())
}

/// Retail MAC (ISO/IEC 9797-1 MAC algorithm 3), padding method 2, keyed by a
/// 2-key (16-byte) 3DES key.
pub fn retail_mac(key: &[u8], data: &[u8]) -> Result<[u8; 8]> {
    ensure!(key.len() == 16, "Retail MAC requires a 16-byte key");
    let (k1, k2) = key.split_at(8);
    let cipher1 = Des::new_from_slice(k1).unwrap();
    let cipher2 = Des::new_from_slice(k2).unwrap();

    let padded = pad(data, 8);
    let mut h = [0u8; 8];
    for block in padded.chunks_exact(8) {
        for (b, x) in h.iter_mut().zip(block) {
            *b ^= x;
        }
        let mut ga = cipher::generic_array::GenericArray::clone_from_slice(&h);
        cipher1.encrypt_block(&mut ga);
        h.copy_from_slice(&ga);
    }

    let mut ga = cipher::generic_array::GenericArray::clone_from_slice(&h);
    cipher2.decrypt_block(&mut ga);
    cipher1.encrypt_block(&mut ga);
    let mut out = [0u8; 8];
    out.copy_from_slice(&ga);
    Ok(out)
}

/// AES-CMAC over the given key, truncated to 8 bytes for Secure Messaging.
pub fn aes_cmac(key: &[u8], data: &[u8]) -> Result<[u8; 8]> {
    use cmac::{Cmac, Mac};
    let full = match key.len() {
        16 => Cmac::<Aes128>::new_from_slice(key).unwrap().chain_update(data).finalize().into_bytes(),
        24 => Cmac::<Aes192>::new_from_slice(key).unwrap().chain_update(data).finalize().into_bytes(),
        32 => Cmac::<Aes256>::new_from_slice(key).unwrap().chain_update(data).finalize().into_bytes(),
        _ => return Err(anyhow!("Invalid AES-CMAC key length")),
    };
    let mut out = [0u8; 8];
    out.copy_from_slice(&full[..8]);
    Ok(out)
}

/// Computes the Secure Messaging MAC for `suite` over `data` (already
/// assembled and padded per the caller's protocol step).
pub fn mac(suite: CipherSuite, key: &[u8], data: &[u8]) -> Result<[u8; 8]> {
    match suite {
        CipherSuite::Des3CbcCbc => retail_mac(key, data),
        _ => aes_cmac(key, data),
    }
}

/// Hash algorithms used for SOd digests and the KDF, ICAO 9303-11 9.7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        use sha1::Digest as _;
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha224 => Sha224::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    pub const fn output_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    #[test]
    fn test_pad_unpad() {
        let data = b"hello";
        let padded = pad(data, 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(unpad(&padded).unwrap(), data);
    }

    #[test]
    fn test_pad_block_aligned_input_adds_full_block() {
        let data = [0xAAu8; 8];
        let padded = pad(&data, 8);
        assert_eq!(padded.len(), 16);
    }

    // ICAO 9303-11 Appendix D.4 worked example.
    #[test]
    fn test_retail_mac_example() {
        let k_mac = hex!("7962D9ECE03D1ACD4C76089DCE131543");
        let cmd_header = hex!("0C A4 02 0C 8000000008");
        // Truncated/simplified input; real value assembles SSC || padded
        // header || DOs, exercised end to end in secure_messaging tests.
        let _ = retail_mac(&k_mac[..], &cmd_header).unwrap();
    }

    #[test]
    fn test_aes_cmac_truncates_to_eight_bytes() {
        let key = [0u8; 16];
        let mac = aes_cmac(&key, b"test").unwrap();
        assert_eq!(mac.len(), 8);
    }

    #[test]
    fn test_digest_output_sizes() {
        assert_eq!(DigestAlgorithm::Sha1.digest(b"").len(), 20);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"").len(), 32);
    }
}
