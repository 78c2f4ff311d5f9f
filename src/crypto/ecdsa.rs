//! ECDSA signature verification implementation, per TR-03111 4.2.1.1 / FIPS 186-4.

use {
    super::{
        groups::{EllipticCurve, EllipticCurvePoint},
        mod_ring::{ModRingElementRef, UintExp, UintMont},
    },
    anyhow::{anyhow, ensure, Result},
    subtle::ConditionallySelectable,
};

#[derive(Clone, Copy, Debug)]
pub struct ECPublicKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    point: EllipticCurvePoint<'g, U, U>,
}

#[derive(Clone, Copy, Debug)]
pub struct ECSignature<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    r: ModRingElementRef<'g, U>,
    s: ModRingElementRef<'g, U>,
}

impl<'g, U> ECSignature<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    pub fn new(r: ModRingElementRef<'g, U>, s: ModRingElementRef<'g, U>) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> ModRingElementRef<'g, U> {
        self.r
    }

    pub fn s(&self) -> ModRingElementRef<'g, U> {
        self.s
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ECPrivateKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    scalar: ModRingElementRef<'g, U>,
}

impl<'g, U> ECPrivateKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    pub fn new(scalar: ModRingElementRef<'g, U>) -> Self {
        Self { scalar }
    }

    pub fn public(&self, curve: &EllipticCurve<U, U>) -> ECPublicKey<'g, U> {
        ECPublicKey::new(curve.generator() * self.scalar)
    }

    /// Signs a message hash already reduced into the curve's scalar field.
    ///
    /// `k` must be a fresh, secret, uniformly random scalar for every call:
    /// reusing it across two signatures (or leaking it) recovers the
    /// private key from the pair of signatures.
    pub fn sign(
        &self,
        curve: &EllipticCurve<U, U>,
        message_hash: ModRingElementRef<'g, U>,
        k: ModRingElementRef<'g, U>,
    ) -> Result<ECSignature<'g, U>> {
        let r_point = curve.generator() * k;
        let x = r_point.x().ok_or_else(|| anyhow!("ephemeral point is the point at infinity"))?;
        let r = curve.scalar_field().from(x.to_uint() % curve.scalar_field().modulus());
        let s = ((message_hash + r * self.scalar) / k).ok_or_else(|| anyhow!("unlucky k, retry with a fresh one"))?;
        Ok(ECSignature::new(r, s))
    }
}

impl<'g, U> ECPublicKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    pub fn new(point: EllipticCurvePoint<'g, U, U>) -> Self {
        Self { point }
    }

    /// Verifies a signature over a message hash already reduced into the
    /// curve's scalar field.
    pub fn verify(
        &self,
        message_hash: ModRingElementRef<'g, U>,
        signature: &ECSignature<'g, U>,
    ) -> Result<()> {
        let curve: &EllipticCurve<U, U> = self.point.curve();
        ensure!(signature.r.ring() == curve.scalar_field(), "r not in scalar field");
        ensure!(signature.s.ring() == curve.scalar_field(), "s not in scalar field");
        ensure!(message_hash.ring() == curve.scalar_field(), "hash not in scalar field");

        // w = s^(-1) mod n
        let w = signature.s.inv().ok_or_else(|| anyhow!("Invalid s value"))?;

        // u1 = e * w mod n, u2 = r * w mod n
        let u1 = message_hash * w;
        let u2 = signature.r * w;

        // Q = u1*G + u2*P
        let q = curve.generator() * u1 + self.point * u2;
        let x = q.x().ok_or_else(|| anyhow!("Result is the point at infinity"))?;

        // x and r both live in U, but x comes from the base field while r is a
        // scalar field element: reduce before comparing.
        let x_mod_n = x.to_uint() % curve.scalar_field().modulus();
        ensure!(x_mod_n == signature.r.to_uint(), "Invalid ECDSA signature");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::crypto::{groups::named::secp256r1, mod_ring::RingRefExt},
        rand::thread_rng,
    };

    #[test]
    fn test_ecdsa_round_trip() {
        let curve = secp256r1();
        let mut rng = thread_rng();

        let private = curve.scalar_field().random(&mut rng);
        let public = ECPublicKey::new(curve.generator() * private);

        let message_hash = curve.scalar_field().random(&mut rng);
        let k = curve.scalar_field().random(&mut rng);
        let r_point = curve.generator() * k;
        let r = curve
            .scalar_field()
            .from(r_point.x().unwrap().to_uint() % curve.scalar_field().modulus());
        let s = ((message_hash + r * private) / k).unwrap();
        let signature = ECSignature::new(r, s);

        public.verify(message_hash, &signature).unwrap();
    }

    #[test]
    fn test_ecprivatekey_sign_round_trips_with_verify() {
        let curve = secp256r1();
        let mut rng = thread_rng();

        let private = ECPrivateKey::new(curve.scalar_field().random(&mut rng));
        let public = private.public(&curve);

        let message_hash = curve.scalar_field().random(&mut rng);
        let k = curve.scalar_field().random(&mut rng);
        let signature = private.sign(&curve, message_hash, k).unwrap();

        public.verify(message_hash, &signature).unwrap();
    }

    #[test]
    fn test_ecprivatekey_sign_rejects_wrong_hash_on_verify() {
        let curve = secp256r1();
        let mut rng = thread_rng();

        let private = ECPrivateKey::new(curve.scalar_field().random(&mut rng));
        let public = private.public(&curve);

        let message_hash = curve.scalar_field().random(&mut rng);
        let k = curve.scalar_field().random(&mut rng);
        let signature = private.sign(&curve, message_hash, k).unwrap();

        let other_hash = curve.scalar_field().random(&mut rng);
        assert!(public.verify(other_hash, &signature).is_err());
    }

    #[test]
    fn test_ecdsa_rejects_wrong_hash() {
        let curve = secp256r1();
        let mut rng = thread_rng();

        let private = curve.scalar_field().random(&mut rng);
        let public = ECPublicKey::new(curve.generator() * private);

        let message_hash = curve.scalar_field().random(&mut rng);
        let k = curve.scalar_field().random(&mut rng);
        let r_point = curve.generator() * k;
        let r = curve
            .scalar_field()
            .from(r_point.x().unwrap().to_uint() % curve.scalar_field().modulus());
        let s = ((message_hash + r * private) / k).unwrap();
        let signature = ECSignature::new(r, s);

        let other_hash = curve.scalar_field().random(&mut rng);
        assert!(public.verify(other_hash, &signature).is_err());
    }
}
