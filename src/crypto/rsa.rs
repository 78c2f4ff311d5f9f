//! RSA signature verification implementation
//!
//! To *not* do: Signing. This will remain verifying only. RSA a minefield
//! of pitfalls and security issues and no-one should create new signatures
//! using it. See e.g. https://blog.trailofbits.com/2019/07/08/fuck-rsa

use {
    super::mod_ring::{ModRing, ModRingElementRef, RingRefExt, UintMont},
    crate::asn1::{
        public_key_info::SubjectPublicKeyInfo,
        signature_algorithm_identifier::RsaSsaPssParameters, DigestAlgorithmIdentifier,
    },
    anyhow::{anyhow, bail, ensure, Error, Result},
    ruint::Uint,
    sha1::Digest,
    subtle::ConstantTimeEq,
};

#[derive(Clone, Debug)]
pub struct RSAPublicKey<U: UintMont> {
    pub(super) ring:            ModRing<U>,
    pub(super) public_exponent: U,
}

impl<U: UintMont> RSAPublicKey<U> {
    pub(super) fn verify<'s>(
        &'s self,
        message: ModRingElementRef<'s, U>,
        signature: ModRingElementRef<'s, U>,
    ) -> Result<()> {
        assert_eq!(message.ring(), &self.ring);
        assert_eq!(signature.ring(), &self.ring);
        let expected = signature.pow_ct(self.public_exponent);
        ensure!(
            bool::from(message.ct_eq(&expected)),
            "Invalid RSA signature"
        );
        Ok(())
    }

    /// Verify a RSA-PSS signature, per RFC 8017.
    pub(super) fn verify_pss(
        &self,
        message: &[u8],
        signature: &[u8],
        params: &RsaSsaPssParameters,
    ) -> Result<()> {
        // Verifies h == h', where,
        // EM (expected message) = signature^e mod n
        // EM:  DB masked || h || 0xBC
        // DB (data block): padding |∣ 0x01 |∣ salt
        // DB masked = DB xor MFG(h)
        // h' = hash(padding || hash(message) || salt)

        let digest_algo = DigestAlgorithmIdentifier::try_from(&params.hash_algorithm)
            .map_err(|e| anyhow!("Unsupported PSS hash algorithm: {e}"))?;

        let ring_bit_len = self.ring.modulus().bit_len();
        let salt_len = params.salt_length.as_bytes()[0] as usize;
        let trailer_field = params.trailer_field.as_bytes()[0] as usize;
        if trailer_field != 1 {
            bail!("Unrecognized trailer field {trailer_field}. Expected value 1 (= 0xbc)");
        }

        if signature.len() > ring_bit_len / 8 {
            bail!("Signature too large for {}-bit modulus", ring_bit_len);
        }
        let sig_uint = U::from_be_bytes(&signature);
        let ring_ref = &self.ring;
        let sig_elem = ring_ref.from(sig_uint);

        // Expected message: sig^e mod n
        let em_elem = sig_elem.pow_ct(self.public_exponent);
        let em_bytes = em_elem.to_uint().to_be_bytes();

        let em_len = (self.ring.modulus().bit_len() + 7) / 8;
        if em_bytes.len() > em_len {
            bail!("Calculated expected message longer than modulus");
        }

        // Check trailer (0xBC byte)
        if *em_bytes.last().unwrap_or(&0) != 0xbc {
            bail!("Invalid PSS trailer byte");
        }

        // Split DB/H from EM
        let hash_len = digest_algo.hash_bytes(&[]).len();
        if em_len < hash_len + salt_len + 2 {
            bail!("Encoded message too short for PSS");
        }
        let db_len = em_len - hash_len - 1;
        let db = &em_bytes[..db_len];
        let h = &em_bytes[db_len..db_len + hash_len];

        // MGF1 unmask
        let mgf_mask = mgf1(digest_algo, h, db_len);
        let mut db_unmasked = vec![0u8; db_len];
        for (i, &b) in db.iter().enumerate() {
            db_unmasked[i] = b ^ mgf_mask[i];
        }
        let em_bits = ring_bit_len - 1;
        db_unmasked[0] &= 0xff >> (8 * em_len - em_bits);

        // Verify DB format
        let salt_start = db_len - salt_len;
        let mut one = None;
        for i in (0..salt_start).rev() {
            if db_unmasked[i] == 0x01 {
                one = Some(i);
                break;
            } else if db_unmasked[i] != 0x00 {
                break;
            }
        }
        let one_pos = one.ok_or_else(|| anyhow!("DB format mismatch: missing 0x01"))?;

        // Verify all bytes before 0x01 are 0x00
        if db_unmasked[..one_pos].iter().any(|&b| b != 0) {
            bail!("DB format mismatch: invalid padding");
        }

        // Recovered salt
        let salt = &db_unmasked[one_pos + 1..];

        if salt.len() != salt_len {
            bail!("Salt length mismatch");
        }

        // Compute h' = hash(padding || hash(message) || salt)
        let message_hash = digest_algo.hash_bytes(message);

        let mut pre_data = vec![0u8; 8]; // 8‐byte zero prefix
        pre_data.extend_from_slice(&message_hash);
        pre_data.extend_from_slice(salt);
        let h_prime = digest_algo.hash_bytes(&pre_data);

        if h_prime != h {
            bail!("PSS verification: hash check failed");
        }

        Ok(())
    }

    /// Verify a PKCS#1 v1.5 (`EMSA-PKCS1-v1_5`) signature, per RFC 8017 §8.2.
    /// Most deployed Document Signer Certificates use this scheme rather than
    /// RSASSA-PSS.
    pub(super) fn verify_pkcs1v15(
        &self,
        message: &[u8],
        signature: &[u8],
        digest_algo: DigestAlgorithmIdentifier,
    ) -> Result<()> {
        let modulus_len = (self.ring.modulus().bit_len() + 7) / 8;
        ensure!(
            signature.len() <= modulus_len,
            "Signature too large for modulus"
        );
        let sig_uint = U::from_be_bytes(signature);
        let sig_elem = self.ring.from(sig_uint);
        let em_elem = sig_elem.pow_ct(self.public_exponent);
        let em_bytes = em_elem.to_uint().to_be_bytes();
        ensure!(
            em_bytes.len() >= modulus_len,
            "Calculated expected message shorter than modulus"
        );
        let em = &em_bytes[em_bytes.len() - modulus_len..];

        let prefix = digest_algo.der_prefix();
        let digest = digest_algo.hash_bytes(message);
        let pad_len = modulus_len
            .checked_sub(3 + prefix.len() + digest.len())
            .ok_or_else(|| anyhow!("Modulus too small for PKCS#1 v1.5 encoding"))?;

        let mut expected = Vec::with_capacity(modulus_len);
        expected.push(0x00);
        expected.push(0x01);
        expected.extend(std::iter::repeat(0xff).take(pad_len));
        expected.push(0x00);
        expected.extend_from_slice(prefix);
        expected.extend_from_slice(&digest);

        ensure!(
            bool::from(em.ct_eq(expected.as_slice())),
            "Invalid RSA PKCS#1 v1.5 signature"
        );
        Ok(())
    }

    /// Verifies an ISO/IEC 9796-2 scheme 1 signature with partial message
    /// recovery and implicit (SHA-1) trailer, as used by Active
    /// Authentication (ICAO 9303-11 9.2.8): `EM = 0x6A || M1 || SHA1(M1 ||
    /// M2) || 0xBC`. Returns the recovered `M1`.
    pub(crate) fn verify_iso9796_2(&self, m2: &[u8], signature: &[u8]) -> Result<Vec<u8>> {
        let modulus_len = (self.ring.modulus().bit_len() + 7) / 8;
        ensure!(
            signature.len() <= modulus_len,
            "Signature too large for modulus"
        );
        let sig_uint = U::from_be_bytes(signature);
        let sig_elem = self.ring.from(sig_uint);
        let em_elem = sig_elem.pow_ct(self.public_exponent);
        let em_bytes = em_elem.to_uint().to_be_bytes();
        ensure!(
            em_bytes.len() >= modulus_len,
            "Calculated expected message shorter than modulus"
        );
        let em = &em_bytes[em_bytes.len() - modulus_len..];

        const HASH_LEN: usize = 20; // SHA-1
        ensure!(em.len() >= HASH_LEN + 2, "Encoded message too short for ISO 9796-2");
        ensure!(em[0] == 0x6a, "Invalid ISO 9796-2 header byte");
        ensure!(em[em.len() - 1] == 0xbc, "Invalid ISO 9796-2 trailer byte");

        let m1 = em[1..em.len() - HASH_LEN - 1].to_vec();
        let digest = &em[em.len() - HASH_LEN - 1..em.len() - 1];

        let mut preimage = m1.clone();
        preimage.extend_from_slice(m2);
        let expected_digest = sha1::Sha1::digest(&preimage);
        ensure!(
            bool::from(digest.ct_eq(expected_digest.as_slice())),
            "ISO 9796-2 hash mismatch"
        );
        Ok(m1)
    }
}

fn mgf1(digest_alg: DigestAlgorithmIdentifier, seed: &[u8], out_len: usize) -> Vec<u8> {
    let mut mask = Vec::new();
    let mut counter: u32 = 0;
    while mask.len() < out_len {
        let mut data = Vec::with_capacity(seed.len() + 4);
        data.extend_from_slice(seed);
        data.extend_from_slice(&counter.to_be_bytes());
        let hash = digest_alg.hash_bytes(&data);
        mask.extend_from_slice(&hash);
        counter += 1;
    }

    mask.truncate(out_len);
    mask
}

impl<const B: usize, const L: usize> TryFrom<SubjectPublicKeyInfo> for RSAPublicKey<Uint<B, L>> {
    type Error = Error;

    fn try_from(info: SubjectPublicKeyInfo) -> Result<Self> {
        match info {
            SubjectPublicKeyInfo::Rsa(key) => {
                let modulus = super::parse_int::<B, L>(&key.modulus)?;
                Ok(Self {
                    ring:            ModRing::from_modulus(modulus),
                    public_exponent: super::parse_int::<B, L>(&key.public_exponent)?,
                })
            }
            _ => bail!("SubjectPublicKeyInfo is not RSA-variant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::asn1::{
            public_key_info::SubjectPublicKeyInfo,
            signature_algorithm_identifier::RsaSsaPssParameters, AnyAlgorithmIdentifier,
        },
        anyhow::{ensure, Result},
        der::{
            asn1::{Int, ObjectIdentifier as Oid},
            Decode,
        },
        hex_literal::hex,
        num_traits::ToPrimitive,
        ruint::Uint,
    };

    const SHA256_OID: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");

    #[test]
    fn test_rsa_ssa_pss() -> Result<()> {
        // RSA-PSS example with MFG1/SHA256, 32 bytes salt
        let subject_public_key = hex!("30820122300d06092a864886f70d01010105000382010f003082010a0282010100a2b451a07d0aa5f96e455671513550514a8a5b462ebef717094fa1fee82224e637f9746d3f7cafd31878d80325b6ef5a1700f65903b469429e89d6eac8845097b5ab393189db92512ed8a7711a1253facd20f79c15e8247f3d3e42e46e48c98e254a2fe9765313a03eff8f17e1a029397a1fa26a8dce26f490ed81299615d9814c22da610428e09c7d9658594266f5c021d0fceca08d945a12be82de4d1ece6b4c03145b5d3495d4ed5411eb878daf05fd7afc3e09ada0f1126422f590975a1969816f48698bcbba1b4d9cae79d460d8f9f85e7975005d9bc22c4e5ac0f7c1a45d12569a62807d3b9a02e5a530e773066f453d1f5b4c2e9cf7820283f742b9d50203010001");
        let signature = hex!("68caf07e71ee654ffabf07d342fc4059deb4f7e5970746c423b1e8f668d5332275cc35eb61270aebd27855b1e80d59def47fe8882867fd33c2308c91976baa0b1df952caa78db4828ab81e79949bf145cbdfd1c4987ed036f81e8442081016f20fa4b587574884ca6f6045959ce3501ae7c02b1902ec1d241ef28dee356c0d30d28a950f1fbc683ee7d9aad26b048c13426fe3975d5638afeb5b9c1a99d162d3a5810e8b074d7a2eae2be52b577151f76e1f734b0a956ef4f22be64dc20a81ad1316e4f79dff5fc41fc08a20bc612283a88415d41595bfea66d59de7ac12e230f72244ad9905aef0ead3fa41ed70bf4218863d5f041292f2d14ce0a7271c6d36");
        let message = hex!("313233343030");

        let hash_algorithm = AnyAlgorithmIdentifier { algorithm: SHA256_OID, parameters: None };
        let params = RsaSsaPssParameters {
            hash_algorithm:     hash_algorithm.clone(),
            mask_gen_algorithm: hash_algorithm,
            salt_length:        Int::new(&[32]).unwrap(),
            trailer_field:      Int::new(&[1]).unwrap(),
        };

        let pubkey_info = SubjectPublicKeyInfo::from_der(&subject_public_key)?;
        ensure!(matches!(pubkey_info, SubjectPublicKeyInfo::Rsa(_)));

        let pubkey = RSAPublicKey::<Uint<2048, 32>>::try_from(pubkey_info)?;
        assert_eq!(pubkey.public_exponent.to_u64().unwrap(), 65537);

        pubkey.verify_pss(&message, &signature, &params)?;

        Ok(())
    }

    #[test]
    fn test_rsa_pkcs1v15_with_identity_exponent() -> Result<()> {
        // e = 1 makes signature^e mod n == signature, so a well-formed
        // EMSA-PKCS1-v1_5 block can be used directly as the "signature"
        // without needing a private key to produce one.
        let subject_public_key = hex!("30820122300d06092a864886f70d01010105000382010f003082010a0282010100a2b451a07d0aa5f96e455671513550514a8a5b462ebef717094fa1fee82224e637f9746d3f7cafd31878d80325b6ef5a1700f65903b469429e89d6eac8845097b5ab393189db92512ed8a7711a1253facd20f79c15e8247f3d3e42e46e48c98e254a2fe9765313a03eff8f17e1a029397a1fa26a8dce26f490ed81299615d9814c22da610428e09c7d9658594266f5c021d0fceca08d945a12be82de4d1ece6b4c03145b5d3495d4ed5411eb878daf05fd7afc3e09ada0f1126422f590975a1969816f48698bcbba1b4d9cae79d460d8f9f85e7975005d9bc22c4e5ac0f7c1a45d12569a62807d3b9a02e5a530e773066f453d1f5b4c2e9cf7820283f742b9d50203010001");
        let pubkey_info = SubjectPublicKeyInfo::from_der(&subject_public_key)?;
        let mut pubkey = RSAPublicKey::<Uint<2048, 32>>::try_from(pubkey_info)?;
        let modulus_len = (pubkey.ring.modulus().bit_len() + 7) / 8;
        pubkey.public_exponent = Uint::<2048, 32>::from(1u64);

        let message = b"test message for pkcs1v15";
        let hash_algorithm = AnyAlgorithmIdentifier { algorithm: SHA256_OID, parameters: None };
        let digest_algo = DigestAlgorithmIdentifier::try_from(&hash_algorithm)?;
        let digest = digest_algo.hash_bytes(message);
        let prefix = digest_algo.der_prefix();
        let pad_len = modulus_len - 3 - prefix.len() - digest.len();

        let mut em = Vec::with_capacity(modulus_len);
        em.push(0x00);
        em.push(0x01);
        em.extend(std::iter::repeat(0xff).take(pad_len));
        em.push(0x00);
        em.extend_from_slice(prefix);
        em.extend_from_slice(&digest);

        pubkey.verify_pkcs1v15(message, &em, digest_algo)?;

        let mut tampered = em.clone();
        tampered[modulus_len - 1] ^= 1;
        assert!(pubkey.verify_pkcs1v15(message, &tampered, digest_algo).is_err());

        Ok(())
    }
}
