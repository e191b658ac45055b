//! Bid ledger synchronization over the key-value contract.
//!
//! Layout in the ledger:
//! - `bid_keys`: JSON array of bid ids (the key index)
//! - `bid_<id>`: JSON object per bid

pub mod auction_controller;
pub mod bid_ops;
pub mod memory;

pub use auction_controller::{select_winner, AuctionController, ResolveOutcome};
pub use bid_ops::BidOperations;
pub use memory::InMemoryLedger;
