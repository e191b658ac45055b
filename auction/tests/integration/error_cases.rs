//! Error and failure case integration tests.

use auction::config::{bid_key, BID_KEYS_KEY};
use auction::mocks::MockLedgerFailure;
use auction::{AuctionError, BidStatus, KeyIndex};

use crate::common::MultiPartyHarness;

#[tokio::test]
async fn test_invalid_drafts_write_nothing() {
    let harness = MultiPartyHarness::new(1);

    let drafts = [
        ("", "1"),
        ("   ", "1"),
        ("Mars", ""),
        ("Mars", "abc"),
        ("Mars", "-2"),
        ("Mars", "0"),
    ];
    for (parcel, amount) in drafts {
        let result = harness.try_place_bid(0, parcel, amount).await;
        assert!(
            matches!(result, Err(AuctionError::Validation(_))),
            "({parcel:?}, {amount:?}) should be rejected"
        );
    }
    assert_eq!(harness.observer().write_count().await, 0);
}

#[tokio::test]
async fn test_index_failure_leaves_orphan_record() {
    let harness = MultiPartyHarness::new(2);
    harness.place_bid(1, "Mars", "1").await;
    let ledger = harness.party(0).ledger.clone();
    ledger
        .set_fail_mode(Some(MockLedgerFailure::WritesOnKey(BID_KEYS_KEY.to_string())))
        .await;

    let result = harness.try_place_bid(0, "Neo Tokyo", "5").await;
    assert!(matches!(result, Err(AuctionError::Ledger(_))));
    ledger.set_fail_mode(None).await;

    // Exactly one bid record exists without an index entry
    let snapshot = harness.observer().snapshot().await;
    let index = KeyIndex::from_json(&snapshot[BID_KEYS_KEY]).unwrap();
    let orphans: Vec<_> = snapshot
        .keys()
        .filter(|k| *k != BID_KEYS_KEY)
        .filter_map(|k| k.strip_prefix("bid_"))
        .filter(|id| !index.contains(id))
        .collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(harness.load(1).await.len(), 1);
}

#[tokio::test]
async fn test_corrupt_records_are_skipped() {
    let harness = MultiPartyHarness::new(2);
    let good = harness.place_bid(0, "Neo Tokyo", "2").await;
    let bad = harness.place_bid(1, "Mars", "3").await;

    let ledger = harness.observer();
    ledger.seed(&bid_key(&bad.id), b"{not json".to_vec()).await;

    let bids = harness.load(1).await;
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].id, good.id);

    // The skipped bid takes no part in resolution either
    let outcome = harness.run_auction(1).await.unwrap();
    assert_eq!(outcome.winner_id, good.id);
}

#[tokio::test]
async fn test_malformed_index_loads_empty() {
    let harness = MultiPartyHarness::new(1);
    harness.place_bid(0, "Neo Tokyo", "2").await;
    harness
        .observer()
        .seed(BID_KEYS_KEY, b"{\"not\":\"an array\"}".to_vec())
        .await;

    assert!(harness.load(0).await.is_empty());
}

#[tokio::test]
async fn test_unavailable_contract_clears_snapshot() {
    let harness = MultiPartyHarness::new(1);
    harness.place_bid(0, "Neo Tokyo", "2").await;
    assert_eq!(harness.load(0).await.len(), 1);

    let ledger = harness.party(0).ledger.clone();
    ledger.set_available(false);
    assert!(harness.load(0).await.is_empty());
    assert!(harness.party(0).controller.snapshot().await.is_empty());
    assert!(matches!(
        harness.party(0).controller.resolve().await,
        Err(AuctionError::NoActiveBids)
    ));

    ledger.set_available(true);
    assert_eq!(harness.load(0).await.len(), 1);
}

#[tokio::test]
async fn test_read_failure_aborts_load() {
    let harness = MultiPartyHarness::new(1);
    harness.place_bid(0, "Neo Tokyo", "2").await;

    let ledger = harness.party(0).ledger.clone();
    ledger.set_fail_mode(Some(MockLedgerFailure::All)).await;
    assert!(harness.party(0).controller.load().await.is_err());
}

#[tokio::test]
async fn test_resolve_stops_at_first_write_failure() {
    let harness = MultiPartyHarness::new(3);
    let low = harness.place_bid(0, "Neo Tokyo", "1").await;
    let high = harness.place_bid(1, "Neo Tokyo", "9").await;
    let mid = harness.place_bid(2, "Neo Tokyo", "5").await;
    harness.load(0).await;

    // Snapshot order is newest first: mid, high, low
    let ledger = harness.party(0).ledger.clone();
    ledger
        .set_fail_mode(Some(MockLedgerFailure::WritesOnKey(bid_key(&high.id))))
        .await;
    let result = harness.party(0).controller.resolve().await;
    assert!(matches!(result, Err(AuctionError::Ledger(_))));
    ledger.set_fail_mode(None).await;

    let statuses = harness.statuses().await;
    assert!(statuses.contains(&(mid.id, BidStatus::Lost)));
    assert!(statuses.contains(&(high.id, BidStatus::Active)));
    assert!(statuses.contains(&(low.id, BidStatus::Active)));
}

#[tokio::test]
async fn test_vanished_record_is_skipped_on_resolve() {
    let harness = MultiPartyHarness::new(2);
    let gone = harness.place_bid(0, "Neo Tokyo", "1").await;
    let kept = harness.place_bid(1, "Neo Tokyo", "2").await;
    harness.load(0).await;

    // An empty value reads back as "no record"
    harness.observer().seed(&bid_key(&gone.id), Vec::new()).await;

    let outcome = harness.party(0).controller.resolve().await.unwrap();
    assert_eq!(outcome.winner_id, kept.id);
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 1);
}

#[tokio::test]
async fn test_resolve_without_bids() {
    let harness = MultiPartyHarness::new(1);

    let result = harness.run_auction(0).await;
    assert!(matches!(result, Err(AuctionError::NoActiveBids)));
    assert_eq!(harness.observer().write_count().await, 0);
}
