pub mod app;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod marketplace;
pub mod traits;
pub mod util;
pub mod wallet;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use app::{AppState, AuctionApp, StatusKind, Tab, TransactionStatus};
pub use config::*;
pub use crypto::{generate_key, AesGcmEncryptor, Encryptor, SimulatedFhe};
pub use error::{AuctionError, AuctionResult};
pub use ledger::{select_winner, AuctionController, BidOperations, InMemoryLedger, ResolveOutcome};
pub use marketplace::{
    parcel_distribution, parse_amount, AuctionStats, BidDraft, BidRecord, BidStatus, KeyIndex,
    ParcelBar,
};
pub use traits::{
    Ledger, LedgerEntry, RandomSource, SystemTimeProvider, ThreadRng, TimeProvider, TxReceipt,
    WalletProvider,
};
pub use wallet::{StaticWallet, WalletSession};
