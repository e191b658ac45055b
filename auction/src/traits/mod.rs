//! Trait abstractions for dependency injection and testability.
//!
//! This module provides trait-based abstractions for external dependencies,
//! enabling unit testing without a deployed contract or wallet extension.

pub mod ledger;
pub mod random;
pub mod time;
pub mod wallet;

// Re-export all traits for crate-internal use.
// The public API surface is controlled by lib.rs re-exports.
pub use ledger::{Ledger, LedgerEntry, TxReceipt};
pub use random::RandomSource;
pub use time::TimeProvider;
pub use wallet::WalletProvider;

// Re-export default implementations
pub use random::ThreadRng;
pub use time::SystemTimeProvider;
