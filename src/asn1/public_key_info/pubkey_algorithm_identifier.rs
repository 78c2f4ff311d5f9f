//! `AlgorithmIdentifier` for a `SubjectPublicKeyInfo`: RSA, EC (including the
//! non-RFC-5480 explicit-parameters form some Dutch eMRTDs use), and plain
//! Diffie-Hellman mod-P, with an `Unknown` fallback.

use super::{DhAlgoParameters, ECAlgoParameters};
use crate::asn1::AnyAlgorithmIdentifier;
use der::asn1::ObjectIdentifier as Oid;

pub const ID_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.1");
pub const ID_EC: Oid = Oid::new_unwrap("1.2.840.10045.2.1");
pub const ID_DH: Oid = Oid::new_unwrap("1.2.840.10046.2.1");

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PubkeyAlgorithmIdentifier {
    Rsa,
    Ec(ECAlgoParameters),
    Dh(DhAlgoParameters),
    Unknown(AnyAlgorithmIdentifier),
}
