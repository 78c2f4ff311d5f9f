mod dataset;

use {
    anyhow::Result,
    dataset::Dataset,
    der::Decode,
    emrtd_core::asn1::emrtd::{pki::MasterList, EfSod},
};

#[test]
#[ignore = "requires the BSI TR-03105-5 ReferenceDataSet under tests/dataset/, not checked into this repo"]
fn test_verify_sod() -> Result<()> {
    let dataset = Dataset::load()?;
    let sod = EfSod::from_der(&dataset.sod)?;

    sod.verify_signature()?;

    Ok(())
}

#[test]
#[ignore = "requires the BSI TR-03105-5 ReferenceDataSet master list file, not checked into this repo"]
fn test_verify_master_list() -> Result<()> {
    let dataset = Dataset::load()?;
    let ml = MasterList::from_der(&dataset.master_list)?;

    ml.verify()?;

    Ok(())
}
