//! Application shell state for auction front-ends.
//!
//! `AuctionApp` owns every piece of session state (wallet, snapshot, form,
//! banners) and publishes it as an `AppState` value on a watch channel.
//! Front-ends render from the receiver and call back into the app.

pub mod actions;
pub mod state;

pub use actions::{submit_failure_message, AuctionApp, USER_REJECTED_MARKER};
pub use state::{AppState, StatusKind, Tab, TransactionStatus};
