//! Load, submit and resolve over the bid ledger.
//!
//! The controller keeps a cached snapshot of the last load. `resolve`
//! deliberately works from that cache rather than re-reading the index,
//! so bids submitted after the last load take no part in it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::{AuctionConfig, BID_ID_SUFFIX_LEN};
use crate::crypto::Encryptor;
use crate::error::{AuctionError, AuctionResult};
use crate::ledger::bid_ops::{ledger_err, BidOperations};
use crate::marketplace::{BidDraft, BidRecord, BidStatus};
use crate::traits::{Ledger, RandomSource, TimeProvider};

/// Result of winner determination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveOutcome {
    pub winner_id: String,
    pub winning_amount: String,
    /// Records whose status was written.
    pub updated: usize,
    /// Cached active records whose blob had disappeared or was already settled.
    pub skipped: usize,
}

/// Pick the highest bid. Scans in order and only replaces the current
/// maximum on a strictly greater amount, so the first maximal bid wins
/// ties and unparseable amounts never displace a leader.
pub fn select_winner(active: &[BidRecord]) -> Option<&BidRecord> {
    let (first, rest) = active.split_first()?;
    Some(rest.iter().fold(first, |max, bid| {
        match (bid.amount_value(), max.amount_value()) {
            (Some(candidate), Some(current)) if candidate > current => bid,
            _ => max,
        }
    }))
}

/// Auction operations, generic over the ledger, clock and randomness.
pub struct AuctionController<L, C, R>
where
    L: Ledger,
    C: TimeProvider,
    R: RandomSource,
{
    ops: BidOperations<L>,
    time: C,
    random: R,
    encryptor: Arc<dyn Encryptor>,
    config: AuctionConfig,
    /// Bids from the last successful load, newest first
    snapshot: Arc<RwLock<Vec<BidRecord>>>,
}

impl<L, C, R> AuctionController<L, C, R>
where
    L: Ledger,
    C: TimeProvider,
    R: RandomSource,
{
    pub fn new(
        ledger: L,
        time: C,
        random: R,
        encryptor: Arc<dyn Encryptor>,
        config: AuctionConfig,
    ) -> Self {
        Self {
            ops: BidOperations::new(ledger),
            time,
            random,
            encryptor,
            config,
            snapshot: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub const fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub const fn operations(&self) -> &BidOperations<L> {
        &self.ops
    }

    /// Bids from the last load, newest first.
    pub async fn snapshot(&self) -> Vec<BidRecord> {
        self.snapshot.read().await.clone()
    }

    /// Active bids from the last load.
    pub async fn active_bids(&self) -> Vec<BidRecord> {
        self.snapshot
            .read()
            .await
            .iter()
            .filter(|b| b.is_active())
            .cloned()
            .collect()
    }

    /// Rebuild the snapshot from the ledger.
    ///
    /// Unreadable or undecodable bids are logged and left out. If the
    /// contract reports itself unavailable the snapshot is cleared and an
    /// empty list returned.
    pub async fn load(&self) -> AuctionResult<Vec<BidRecord>> {
        if !self.ops.ledger().is_available().await.map_err(ledger_err)? {
            error!("Contract is not available");
            self.snapshot.write().await.clear();
            return Ok(Vec::new());
        }

        let (index, _) = self.ops.fetch_index().await?;
        let mut bids = Vec::with_capacity(index.len());

        for id in index.ids() {
            match self.ops.fetch_bid(id).await {
                Ok(Some(bid)) => bids.push(bid),
                Ok(None) => {
                    warn!("Bid {} is indexed but has no record", id);
                }
                Err(AuctionError::MalformedRecord(e)) => {
                    warn!("Error parsing bid data for {}: {}", id, e);
                }
                Err(e) => {
                    warn!("Error loading bid {}: {}", id, e);
                }
            }
        }

        bids.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!("Loaded {} bids from {} index entries", bids.len(), index.len());

        *self.snapshot.write().await = bids.clone();
        Ok(bids)
    }

    /// Seal and publish a new bid, then append it to the key index.
    ///
    /// If the index update fails the bid record stays in the ledger
    /// unreferenced; nothing is rolled back.
    pub async fn submit(&self, bidder: &str, draft: &BidDraft) -> AuctionResult<BidRecord> {
        draft.validate()?;

        let plain = serde_json::to_string(draft).map_err(|e| {
            AuctionError::Serialization(format!("Failed to serialize bid draft: {e}"))
        })?;
        let encrypted_bid = self.encryptor.encrypt(&plain)?;

        let bid = BidRecord {
            id: self.generate_bid_id(),
            bidder: bidder.to_string(),
            bid_amount: draft.bid_amount.clone(),
            encrypted_bid,
            timestamp: self.time.now_unix(),
            land_parcel: draft.land_parcel.clone(),
            status: BidStatus::Active,
            extra: Default::default(),
        };

        self.ops.publish_bid(&bid).await?;
        if let Err(e) = self.ops.append_to_index(&bid.id, &self.config).await {
            error!("Bid {} written but not indexed: {}", bid.id, e);
            return Err(e);
        }

        info!(
            "Submitted bid {} on '{}' for {}",
            bid.id, bid.land_parcel, bid.bid_amount
        );
        Ok(bid)
    }

    /// Mark the highest cached active bid as won and every other cached
    /// active bid as lost.
    ///
    /// Writes go out one record at a time; the first failure aborts and
    /// leaves earlier records already updated.
    pub async fn resolve(&self) -> AuctionResult<ResolveOutcome> {
        let active = self.active_bids().await;
        let winner = select_winner(&active).ok_or(AuctionError::NoActiveBids)?;
        info!(
            "Resolving {} active bids, winner {} at {}",
            active.len(),
            winner.id,
            winner.bid_amount
        );

        let mut outcome = ResolveOutcome {
            winner_id: winner.id.clone(),
            winning_amount: winner.bid_amount.clone(),
            updated: 0,
            skipped: 0,
        };

        for bid in &active {
            let status = if bid.id == outcome.winner_id {
                BidStatus::Won
            } else {
                BidStatus::Lost
            };
            match self.ops.write_status(&bid.id, status).await? {
                Some(_) => outcome.updated += 1,
                None => outcome.skipped += 1,
            }
        }

        Ok(outcome)
    }

    /// `<epoch-ms>-<random base36 suffix>`. Collisions are not checked.
    fn generate_bid_id(&self) -> String {
        format!(
            "{}-{}",
            self.time.now_millis(),
            self.random.base36_suffix(BID_ID_SUFFIX_LEN)
        )
    }
}
