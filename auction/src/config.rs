//! Configuration constants for the auction client.
//!
//! This module centralizes ledger key names, retry tuning and UI delays,
//! plus the runtime `AuctionConfig` that can be overridden from the
//! environment.

use std::time::Duration;

use crate::error::{AuctionError, AuctionResult};

/// Ledger key holding the JSON array of bid ids.
pub const BID_KEYS_KEY: &str = "bid_keys";

/// Prefix of the per-bid ledger key (`bid_<id>`).
pub const BID_KEY_PREFIX: &str = "bid_";

/// Maximum size accepted for a single ledger value.
pub const MAX_LEDGER_VALUE_SIZE: usize = 32_768;

/// Length of the random suffix in generated bid ids.
pub const BID_ID_SUFFIX_LEN: usize = 7;

/// Maximum retries for a versioned bid index update.
pub const INDEX_UPDATE_MAX_RETRIES: u32 = 10;

/// Initial delay for index update retry (doubles on each retry).
pub const INDEX_UPDATE_INITIAL_DELAY_MS: u64 = 50;

/// Simulated FHE computation time before winner determination.
pub const RESOLVE_DELAY_MS: u64 = 5_000;

/// How long a success banner stays visible.
pub const STATUS_SUCCESS_DISMISS_MS: u64 = 2_000;

/// How long an error banner stays visible.
pub const STATUS_ERROR_DISMISS_MS: u64 = 3_000;

/// Number of parcels shown in the bid distribution.
pub const DISTRIBUTION_MAX_PARCELS: usize = 5;

/// Bid amount that fills a distribution bar to 100%.
pub const DISTRIBUTION_FULL_SCALE: f64 = 1_000.0;

/// Environment variable selecting the index update strategy.
pub const INDEX_STRATEGY_ENV: &str = "AUCTION_INDEX_STRATEGY";

/// Environment variable overriding the resolve delay (milliseconds).
pub const RESOLVE_DELAY_ENV: &str = "AUCTION_RESOLVE_DELAY_MS";

/// Environment variable overriding the index update retry budget.
pub const INDEX_MAX_RETRIES_ENV: &str = "AUCTION_INDEX_MAX_RETRIES";

/// Ledger key for a single bid record.
pub fn bid_key(id: &str) -> String {
    format!("{BID_KEY_PREFIX}{id}")
}

/// How the client appends a new id to the shared bid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexUpdateStrategy {
    /// Read, append, write back. Concurrent submitters can drop each
    /// other's entries.
    LastWriterWins,
    /// Compare-and-set against the index version, retrying on conflict.
    #[default]
    Versioned,
}

impl std::str::FromStr for IndexUpdateStrategy {
    type Err = AuctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "versioned" => Ok(Self::Versioned),
            "last-writer-wins" | "lww" => Ok(Self::LastWriterWins),
            other => Err(AuctionError::Config(format!(
                "unknown index strategy '{other}'"
            ))),
        }
    }
}

/// Runtime configuration for the controller and app shell.
#[derive(Debug, Clone)]
pub struct AuctionConfig {
    pub index_strategy: IndexUpdateStrategy,
    pub index_max_retries: u32,
    pub index_initial_delay: Duration,
    pub resolve_delay: Duration,
    pub success_dismiss: Duration,
    pub error_dismiss: Duration,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            index_strategy: IndexUpdateStrategy::default(),
            index_max_retries: INDEX_UPDATE_MAX_RETRIES,
            index_initial_delay: Duration::from_millis(INDEX_UPDATE_INITIAL_DELAY_MS),
            resolve_delay: Duration::from_millis(RESOLVE_DELAY_MS),
            success_dismiss: Duration::from_millis(STATUS_SUCCESS_DISMISS_MS),
            error_dismiss: Duration::from_millis(STATUS_ERROR_DISMISS_MS),
        }
    }
}

impl AuctionConfig {
    /// Build a config from defaults, applying any environment overrides.
    pub fn from_env() -> AuctionResult<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(INDEX_STRATEGY_ENV) {
            config.index_strategy = value.parse()?;
        }
        if let Ok(value) = std::env::var(RESOLVE_DELAY_ENV) {
            let ms: u64 = value.trim().parse().map_err(|e| {
                AuctionError::Config(format!("{RESOLVE_DELAY_ENV}='{value}': {e}"))
            })?;
            config.resolve_delay = Duration::from_millis(ms);
        }
        if let Ok(value) = std::env::var(INDEX_MAX_RETRIES_ENV) {
            let retries: u32 = value.trim().parse().map_err(|e| {
                AuctionError::Config(format!("{INDEX_MAX_RETRIES_ENV}='{value}': {e}"))
            })?;
            if retries == 0 {
                return Err(AuctionError::Config(format!(
                    "{INDEX_MAX_RETRIES_ENV} must be at least 1"
                )));
            }
            config.index_max_retries = retries;
        }

        Ok(config)
    }

    /// Config with every delay set to zero, for tests and scripted drivers.
    pub fn immediate() -> Self {
        Self {
            index_initial_delay: Duration::ZERO,
            resolve_delay: Duration::ZERO,
            success_dismiss: Duration::ZERO,
            error_dismiss: Duration::ZERO,
            ..Self::default()
        }
    }
}
