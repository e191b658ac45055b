//! End-to-end auction scenarios across several wallets.

use auction::config::{bid_key, BID_KEYS_KEY};
use auction::crypto::SimulatedFhe;
use auction::{BidDraft, BidStatus, Encryptor, KeyIndex};

use crate::common::MultiPartyHarness;

#[tokio::test]
async fn test_single_bid_round_trip() {
    let harness = MultiPartyHarness::new(1);
    let bid = harness.place_bid(0, "Neo Tokyo", "1.5").await;

    let bids = harness.load(0).await;
    assert_eq!(bids.len(), 1);
    let loaded = &bids[0];
    assert_eq!(loaded.id, bid.id);
    assert_eq!(loaded.land_parcel, "Neo Tokyo");
    assert_eq!(loaded.bid_amount, "1.5");
    assert_eq!(loaded.bidder, harness.party(0).account);
    assert_eq!(loaded.status, BidStatus::Active);
    assert_eq!(loaded.timestamp, 1_700_000_000);

    // The sealed payload is the draft as JSON
    let plain = SimulatedFhe.decrypt(&loaded.encrypted_bid).unwrap();
    let draft: BidDraft = serde_json::from_str(&plain).unwrap();
    assert_eq!(draft, BidDraft::new("Neo Tokyo", "1.5"));

    let ledger = harness.observer();
    let index = KeyIndex::from_json(&ledger.raw(BID_KEYS_KEY).await.unwrap()).unwrap();
    assert_eq!(index.ids(), [bid.id.clone()]);
    assert!(ledger.raw(&bid_key(&bid.id)).await.is_some());
}

#[tokio::test]
async fn test_3_party_highest_bid_wins() {
    let harness = MultiPartyHarness::new(3);

    harness.place_bid(0, "Neo Tokyo", "150").await;
    harness.place_bid(1, "Neo Tokyo", "200").await; // highest
    harness.place_bid(2, "Neo Tokyo", "175").await;

    assert_eq!(harness.execute_auction(0).await, Some(1));

    let bids = harness.load(2).await;
    let won: Vec<_> = bids.iter().filter(|b| b.status == BidStatus::Won).collect();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].bidder, harness.party(1).account);
    assert_eq!(
        bids.iter().filter(|b| b.status == BidStatus::Lost).count(),
        2
    );
}

#[tokio::test]
async fn test_tie_goes_to_first_bid_in_snapshot_order() {
    let harness = MultiPartyHarness::new(3);

    harness.place_bid(0, "Mars", "5").await;
    harness.place_bid(1, "Mars", "9").await;
    harness.place_bid(2, "Mars", "9").await;

    // Loaded newest first, so party 2's bid is scanned before party 1's
    assert_eq!(harness.execute_auction(0).await, Some(2));
}

#[tokio::test]
async fn test_decimal_amounts_compare_numerically() {
    let harness = MultiPartyHarness::new(3);

    harness.place_bid(0, "Atlantis", "10").await;
    harness.place_bid(1, "Atlantis", "9.99").await;
    harness.place_bid(2, "Atlantis", "100.5").await;

    assert_eq!(harness.execute_auction(1).await, Some(2));
}

#[tokio::test]
async fn test_bids_load_newest_first() {
    let harness = MultiPartyHarness::new(2);

    let first = harness.place_bid(0, "Neo Tokyo", "1").await;
    let second = harness.place_bid(1, "Mars", "2").await;
    let third = harness.place_bid(0, "Atlantis", "3").await;

    let ids: Vec<_> = harness.load(1).await.into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn test_resolve_ignores_bids_after_last_load() {
    let harness = MultiPartyHarness::new(2);
    harness.place_bid(0, "Neo Tokyo", "3").await;

    harness.load(0).await;
    let late = harness.place_bid(1, "Neo Tokyo", "50").await;

    let outcome = harness.party(0).controller.resolve().await.unwrap();
    assert_ne!(outcome.winner_id, late.id);
    assert_eq!(outcome.updated, 1);

    let statuses = harness.statuses().await;
    assert!(statuses.contains(&(late.id, BidStatus::Active)));
}

#[tokio::test]
async fn test_second_resolve_leaves_settled_bids() {
    let harness = MultiPartyHarness::new(2);
    harness.place_bid(0, "Neo Tokyo", "3").await;
    harness.place_bid(1, "Neo Tokyo", "4").await;
    harness.run_auction(0).await.unwrap();

    // A new round only involves bids placed since
    let fresh = harness.place_bid(0, "Mars", "1").await;
    let outcome = harness.run_auction(1).await.unwrap();
    assert_eq!(outcome.winner_id, fresh.id);
    assert_eq!(outcome.updated, 1);

    let won = harness
        .statuses()
        .await
        .into_iter()
        .filter(|(_, s)| *s == BidStatus::Won)
        .count();
    assert_eq!(won, 2);
}

#[tokio::test]
async fn test_10_party_auction() {
    let harness = MultiPartyHarness::new(10);
    for party in 0..harness.num_parties() {
        let amount = format!("{}.25", (party * 7) % 10 + 1);
        harness.place_bid(party, "Neo Tokyo", &amount).await;
    }

    // Party 7 bids 10.25
    assert_eq!(harness.execute_auction(4).await, Some(7));

    let bids = harness.load(0).await;
    assert_eq!(bids.len(), 10);
    assert!(bids.iter().all(|b| b.status.is_terminal()));
}

#[tokio::test]
async fn test_status_writes_preserve_record() {
    let harness = MultiPartyHarness::new(2);
    let bid = harness.place_bid(0, "Neo Tokyo", "1.5").await;
    harness.place_bid(1, "Neo Tokyo", "1").await;

    harness.run_auction(1).await.unwrap();

    let after = harness
        .load(0)
        .await
        .into_iter()
        .find(|b| b.id == bid.id)
        .unwrap();
    assert_eq!(after.status, BidStatus::Won);
    assert_eq!(after.encrypted_bid, bid.encrypted_bid);
    assert_eq!(after.timestamp, bid.timestamp);
    assert_eq!(after.bidder, bid.bidder);
}

#[tokio::test]
async fn test_stale_resolve_skips_settled_bids() {
    let harness = MultiPartyHarness::new(2);
    let low = harness.place_bid(0, "Neo Tokyo", "1").await;
    let high = harness.place_bid(1, "Neo Tokyo", "2").await;
    harness.load(0).await;
    harness.load(1).await;

    let first = harness.party(0).controller.resolve().await.unwrap();
    assert_eq!(first.winner_id, high.id);
    assert_eq!(first.updated, 2);
    let writes = harness.observer().write_count().await;

    // Party 1 still holds the pre-resolution snapshot
    let second = harness.party(1).controller.resolve().await.unwrap();
    assert_eq!(second.winner_id, high.id);
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(harness.observer().write_count().await, writes);

    let statuses = harness.statuses().await;
    assert!(statuses.contains(&(high.id, BidStatus::Won)));
    assert!(statuses.contains(&(low.id, BidStatus::Lost)));
}

#[tokio::test]
async fn test_stale_resolve_settles_remaining_bids() {
    let harness = MultiPartyHarness::new(3);
    let a = harness.place_bid(0, "Mars", "5").await;
    let b = harness.place_bid(1, "Mars", "3").await;
    harness.load(0).await;
    let c = harness.place_bid(1, "Mars", "4").await;
    harness.load(2).await;

    // Party 0 settles a and b; c was not in its snapshot
    harness.party(0).controller.resolve().await.unwrap();

    // Party 2 saw all three as active. Newest first: c is still active,
    // b and a are already settled.
    let outcome = harness.party(2).controller.resolve().await.unwrap();
    assert_eq!(outcome.winner_id, a.id);
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 2);

    let statuses = harness.statuses().await;
    assert!(statuses.contains(&(a.id, BidStatus::Won)));
    assert!(statuses.contains(&(b.id, BidStatus::Lost)));
    assert!(statuses.contains(&(c.id, BidStatus::Lost)));
}
