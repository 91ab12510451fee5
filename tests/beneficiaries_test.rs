mod common;

use anyhow::Result;
use common::test_service;
use paisa::domain::{NewBeneficiary, TransactionMetadata, validate_routing_code};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_add_beneficiary_appends_unverified() -> Result<()> {
    let (service, _clock) = test_service();

    let added = service
        .add_beneficiary(NewBeneficiary::new(
            "Amit Verma",
            "5566778899",
            "ICIC0004321",
            "ICICI Bank",
        ))
        .await;

    assert!(!added.verified);
    assert!(added.id != "1" && added.id != "2");

    let beneficiaries = service.list_beneficiaries().await;
    assert_eq!(beneficiaries.len(), 3);
    assert_eq!(beneficiaries.last(), Some(&added));

    Ok(())
}

#[tokio::test]
async fn test_beneficiary_ids_are_unique() -> Result<()> {
    let (service, _clock) = test_service();

    let a = service
        .add_beneficiary(NewBeneficiary::new("A", "1", "SBIN0000001", "SBI"))
        .await;
    let b = service
        .add_beneficiary(NewBeneficiary::new("A", "1", "SBIN0000001", "SBI"))
        .await;

    assert_ne!(a.id, b.id);
    Ok(())
}

#[tokio::test]
async fn test_listing_returns_a_copy() -> Result<()> {
    let (service, _clock) = test_service();

    let mut listed = service.list_beneficiaries().await;
    listed.clear();

    assert_eq!(service.list_beneficiaries().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_store_does_not_validate_routing_code() -> Result<()> {
    let (service, _clock) = test_service();

    // Validation is the caller's job; the store accepts what it is given
    assert!(!validate_routing_code("not-a-code"));
    let added = service
        .add_beneficiary(NewBeneficiary::new("X", "1", "not-a-code", "Bank"))
        .await;
    assert_eq!(added.routing_code, "not-a-code");

    Ok(())
}

#[tokio::test]
async fn test_transfer_to_new_beneficiary() -> Result<()> {
    let (service, _clock) = test_service();

    let added = service
        .add_beneficiary(NewBeneficiary::new(
            "Amit Verma",
            "5566778899",
            "ICIC0004321",
            "ICICI Bank",
        ))
        .await;

    let tx = service.transfer_to_bank(&added.id, dec!(750), None).await?;
    assert_eq!(tx.description, "Transfer to Amit Verma");
    assert!(matches!(
        tx.metadata,
        Some(TransactionMetadata::BankTransfer { ref beneficiary_id, ref routing_code, .. })
            if *beneficiary_id == added.id && routing_code == "ICIC0004321"
    ));

    Ok(())
}
