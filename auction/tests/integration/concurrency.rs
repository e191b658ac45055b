//! Concurrent writers racing on the shared key index.

use std::sync::Arc;

use auction::config::BID_KEYS_KEY;
use auction::{AuctionConfig, BidRecord, BidStatus, IndexUpdateStrategy, KeyIndex};
use serde_json::Map;

use crate::common::MultiPartyHarness;

fn config(strategy: IndexUpdateStrategy) -> AuctionConfig {
    AuctionConfig {
        index_strategy: strategy,
        ..AuctionConfig::immediate()
    }
}

async fn index_of(harness: &MultiPartyHarness) -> KeyIndex {
    let raw = harness.observer().raw(BID_KEYS_KEY).await.unwrap_or_default();
    KeyIndex::from_json(&raw).unwrap()
}

/// Party 1 publishes a bid and its index write lands between party 0's
/// index read and index write. Returns (racing id, party 0's id).
async fn race_two_submits(harness: &MultiPartyHarness) -> (String, String) {
    let existing = harness.place_bid(1, "Mars", "2").await;

    let racing = BidRecord {
        id: "1700000001000-racing0".to_string(),
        bidder: harness.party(1).account.clone(),
        bid_amount: "3".to_string(),
        encrypted_bid: "FHE-e30=".to_string(),
        timestamp: 1_700_000_001,
        land_parcel: "Mars".to_string(),
        status: BidStatus::Active,
        extra: Map::new(),
    };
    harness
        .party(1)
        .controller
        .operations()
        .publish_bid(&racing)
        .await
        .unwrap();

    let racing_index: KeyIndex = [existing.id, racing.id.clone()].into_iter().collect();
    harness
        .party(0)
        .ledger
        .stage_concurrent_write(BID_KEYS_KEY, racing_index.to_json().unwrap())
        .await;

    let ours = harness.place_bid(0, "Neo Tokyo", "1.5").await;
    (racing.id, ours.id)
}

#[tokio::test]
async fn test_versioned_index_keeps_racing_append() {
    let harness = MultiPartyHarness::with_config(2, config(IndexUpdateStrategy::Versioned));

    let (racing, ours) = race_two_submits(&harness).await;

    let index = index_of(&harness).await;
    assert!(index.contains(&racing));
    assert!(index.contains(&ours));
    assert_eq!(index.len(), 3);
    assert_eq!(harness.load(0).await.len(), 3);
}

#[tokio::test]
async fn test_last_writer_wins_drops_racing_append() {
    let harness =
        MultiPartyHarness::with_config(2, config(IndexUpdateStrategy::LastWriterWins));

    let (racing, ours) = race_two_submits(&harness).await;

    // The racing bid's record exists but no longer shows up in the index
    let index = index_of(&harness).await;
    assert!(index.contains(&ours));
    assert!(!index.contains(&racing));
    let loaded = harness.load(1).await;
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|b| b.id != racing));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_versioned_index_under_parallel_submits() {
    let parties = 8;
    let harness = Arc::new(MultiPartyHarness::with_config(
        parties,
        AuctionConfig {
            index_max_retries: 32,
            ..config(IndexUpdateStrategy::Versioned)
        },
    ));

    let handles: Vec<_> = (0..parties)
        .map(|party| {
            let harness = harness.clone();
            tokio::spawn(async move {
                let amount = format!("{}", party + 1);
                harness.try_place_bid(party, "Neo Tokyo", &amount).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }

    let index = index_of(&harness).await;
    assert_eq!(index.len(), parties);
    assert!(ids.iter().all(|id| index.contains(id)));

    assert_eq!(harness.execute_auction(0).await, Some(parties - 1));
}

#[tokio::test]
async fn test_resubmitting_indexed_id_is_noop() {
    let harness = MultiPartyHarness::new(1);
    let bid = harness.place_bid(0, "Neo Tokyo", "1").await;
    let cfg = harness.party(0).controller.config().clone();
    let writes = harness.observer().write_count().await;

    let receipt = harness
        .party(0)
        .controller
        .operations()
        .append_to_index(&bid.id, &cfg)
        .await
        .unwrap();

    assert!(receipt.is_none());
    assert_eq!(harness.observer().write_count().await, writes);
}
