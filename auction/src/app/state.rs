//! Application state snapshot published to front-ends.

use serde::Serialize;

use crate::marketplace::{parcel_distribution, AuctionStats, BidDraft, BidRecord, ParcelBar};

/// Main navigation tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Bids,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Pending,
    Success,
    Error,
}

/// Transient banner shown while a transaction is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionStatus {
    pub visible: bool,
    pub kind: StatusKind,
    pub message: String,
}

impl TransactionStatus {
    pub fn show(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            visible: true,
            kind,
            message: message.into(),
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Everything a front-end needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    /// Connected account; `None` when no wallet is connected
    pub account: Option<String>,
    /// Set until the first load finishes
    pub loading: bool,
    pub refreshing: bool,
    /// Last loaded bids, newest first
    pub bids: Vec<BidRecord>,
    pub stats: AuctionStats,
    pub distribution: Vec<ParcelBar>,
    pub active_tab: Tab,
    pub show_tutorial: bool,
    pub show_bid_modal: bool,
    pub draft: BidDraft,
    /// A submission is in flight
    pub bidding: bool,
    pub transaction: TransactionStatus,
    /// Blocking message the user must acknowledge
    pub alert: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            account: None,
            loading: true,
            refreshing: false,
            bids: Vec::new(),
            stats: AuctionStats::default(),
            distribution: Vec::new(),
            active_tab: Tab::default(),
            show_tutorial: false,
            show_bid_modal: false,
            draft: BidDraft::default(),
            bidding: false,
            transaction: TransactionStatus::hidden(),
            alert: None,
        }
    }
}

impl AppState {
    /// Replace the bid list and everything derived from it.
    pub fn set_bids(&mut self, bids: Vec<BidRecord>) {
        self.stats = AuctionStats::from_bids(&bids);
        self.distribution = parcel_distribution(&bids);
        self.bids = bids;
    }

    /// Whether `address` belongs to the connected account.
    pub fn is_owner(&self, address: &str) -> bool {
        self.account
            .as_deref()
            .is_some_and(|acc| !acc.is_empty() && acc.eq_ignore_ascii_case(address))
    }
}
