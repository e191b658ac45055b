//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait abstractions
//! that allow unit testing without external dependencies.

pub mod ledger;
pub mod random;
pub mod time;
pub mod wallet;

pub use ledger::{make_test_address, MockLedger, MockLedgerFailure, SharedLedgerHandle};
pub use random::MockRandom;
pub use time::MockTime;
pub use wallet::MockWallet;
