use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{bid_key, AuctionConfig, IndexUpdateStrategy, BID_KEYS_KEY};
use crate::error::{AuctionError, AuctionResult};
use crate::marketplace::{BidRecord, BidStatus, KeyIndex};
use crate::traits::{Ledger, TxReceipt};

/// Double a retry delay, saturating instead of overflowing.
fn next_backoff(delay: Duration) -> Duration {
    delay.saturating_mul(2)
}

pub(crate) fn ledger_err(e: anyhow::Error) -> AuctionError {
    AuctionError::Ledger(format!("{e:#}"))
}

/// Operations for managing bids in the ledger.
/// Generic over the ledger implementation for testability.
#[derive(Clone)]
pub struct BidOperations<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> BidOperations<L> {
    pub const fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Read the key index and the ledger version it was read at.
    ///
    /// An absent index is empty. A malformed index is logged and treated
    /// as empty; the next append overwrites it.
    pub async fn fetch_index(&self) -> AuctionResult<(KeyIndex, u64)> {
        let entry = self.ledger.get_entry(BID_KEYS_KEY).await.map_err(ledger_err)?;
        if entry.is_absent() {
            debug!("No bid index found, returning empty index");
            return Ok((KeyIndex::new(), entry.version));
        }
        match KeyIndex::from_json(&entry.data) {
            Ok(index) => Ok((index, entry.version)),
            Err(e) => {
                warn!("Error parsing bid keys: {}", e);
                Ok((KeyIndex::new(), entry.version))
            }
        }
    }

    /// Fetch a bid from the ledger. `None` when the key holds nothing.
    pub async fn fetch_bid(&self, id: &str) -> AuctionResult<Option<BidRecord>> {
        let data = self.ledger.get_data(&bid_key(id)).await.map_err(ledger_err)?;
        if data.is_empty() {
            return Ok(None);
        }
        let bid = BidRecord::from_ledger(id, &data)?;
        debug!("Fetched bid {} from ledger", id);
        Ok(Some(bid))
    }

    /// Write a bid record under `bid_<id>`.
    pub async fn publish_bid(&self, bid: &BidRecord) -> AuctionResult<TxReceipt> {
        let data = bid.to_json()?;
        let receipt = self
            .ledger
            .set_data(&bid_key(&bid.id), data)
            .await
            .map_err(ledger_err)?;
        info!("Published bid {} to ledger (tx {})", bid.id, receipt.tx_hash);
        Ok(receipt)
    }

    /// Append `id` to the key index.
    ///
    /// Returns `None` when the id was already indexed and nothing was written.
    pub async fn append_to_index(
        &self,
        id: &str,
        config: &AuctionConfig,
    ) -> AuctionResult<Option<TxReceipt>> {
        match config.index_strategy {
            IndexUpdateStrategy::LastWriterWins => self.append_last_writer_wins(id).await,
            IndexUpdateStrategy::Versioned => self.append_versioned(id, config).await,
        }
    }

    /// Read-modify-write with no concurrency check. A writer that lands
    /// between our read and write loses its entry.
    async fn append_last_writer_wins(&self, id: &str) -> AuctionResult<Option<TxReceipt>> {
        let (mut index, _) = self.fetch_index().await?;
        if !index.push(id) {
            return Ok(None);
        }
        let receipt = self
            .ledger
            .set_data(BID_KEYS_KEY, index.to_json()?)
            .await
            .map_err(ledger_err)?;
        info!("Appended bid {} to index ({} entries)", id, index.len());
        Ok(Some(receipt))
    }

    async fn append_versioned(
        &self,
        id: &str,
        config: &AuctionConfig,
    ) -> AuctionResult<Option<TxReceipt>> {
        let max_retries = config.index_max_retries.max(1);
        let mut retry_delay = config.index_initial_delay;

        for attempt in 1..=max_retries {
            let (mut index, version) = self.fetch_index().await?;
            if !index.push(id) {
                debug!("Bid {} already indexed", id);
                return Ok(None);
            }

            let outcome = self
                .ledger
                .compare_and_set(BID_KEYS_KEY, version, index.to_json()?)
                .await
                .map_err(ledger_err)?;

            if let Some(receipt) = outcome {
                info!(
                    "Appended bid {} to index ({} entries, attempt {}/{})",
                    id,
                    index.len(),
                    attempt,
                    max_retries
                );
                return Ok(Some(receipt));
            }

            warn!(
                "Bid index conflict (attempt {}/{}), retrying...",
                attempt, max_retries
            );
            if attempt < max_retries {
                tokio::time::sleep(retry_delay).await;
                retry_delay = next_backoff(retry_delay);
            }
        }

        Err(AuctionError::IndexConflict {
            attempts: max_retries,
        })
    }

    /// Re-read the latest blob for `id`, move it to `status` and write it back.
    ///
    /// Returns `None` if the blob has disappeared or another client has
    /// already settled it; nothing is written in either case.
    pub async fn write_status(
        &self,
        id: &str,
        status: BidStatus,
    ) -> AuctionResult<Option<BidRecord>> {
        let Some(mut bid) = self.fetch_bid(id).await? else {
            warn!("Bid {} vanished before its status could be set", id);
            return Ok(None);
        };
        if bid.status.is_terminal() {
            warn!("Bid {} already settled as {}, leaving it", id, bid.status);
            return Ok(None);
        }
        bid.transition(status)?;
        self.publish_bid(&bid).await?;
        Ok(Some(bid))
    }
}
