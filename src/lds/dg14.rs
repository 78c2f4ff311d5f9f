//! DG14: thin wrapper over [`crate::asn1::emrtd::EfDg14`], ICAO 9303-10
//! §4.7.8 / spec.md §4.7.
//!
//! DG14 is already a full `der`-derived ASN.1 type (a `SecurityInfos` set
//! wrapped in an `[APPLICATION 14]` tag) rather than a BER-TLV-nested file
//! like DG1/DG11, so there is nothing to add here beyond the name: callers
//! reach Chip Authentication/PACE/Terminal Authentication discovery through
//! `Dg14::chip_authentication()` and the `SecurityInfos` iterator directly.

pub use crate::asn1::emrtd::EfDg14 as Dg14;
