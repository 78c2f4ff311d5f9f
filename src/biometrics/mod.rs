//! Biometric data block formats carried inside a [`crate::cbeff`] BDB,
//! spec.md §4.9/§4.10 (C9/C10).
//!
//! ISO 19794 (`iso19794`) is the older fixed-layout family (FAC/FIR/IIR
//! records); ISO 39794 (`iso39794`) is its ASN.1 BER-encoded successor.
//! Both are selected by the BHT's format owner/type (`crate::cbeff`), not
//! by sniffing the data block itself.

pub mod iso19794;
pub mod iso39794;

/// Caller-supplied choices for the two documented ambiguities in the ISO
/// 19794 decoders (spec.md §9 Open Questions), following the
/// `crypto::codec::Leniency`/`Icao9303Codec` pattern of making such choices
/// explicit config rather than implicit global behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiometricsConfig {
    /// Some facial records in the field carry a bare JPEG 2000 codestream
    /// (starting `FF 4F FF 51`) instead of a full JP2 file with its box
    /// structure magic. When `true`, `iso19794::face` accepts both; when
    /// `false`, only the full JP2 magic is accepted.
    pub permissive_fac_jp2_fallback: bool,

    /// How to combine an iris record's per-image subtype bits with the
    /// record-level subtype when both are present. The ISO 19794-6 text
    /// reads as a bitwise OR (eye position bits accumulate), but at least
    /// one widely deployed encoder bitwise-ANDs them instead — spec.md §9
    /// flags this as a likely bug to preserve and document, not silently
    /// "fix". Defaults to `Or` (the spec-literal reading).
    pub iris_subtype_aggregation: IrisSubtypeAggregation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrisSubtypeAggregation {
    Or,
    And,
}

impl Default for BiometricsConfig {
    fn default() -> Self {
        Self {
            permissive_fac_jp2_fallback: true,
            iris_subtype_aggregation: IrisSubtypeAggregation::Or,
        }
    }
}
