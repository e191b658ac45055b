//! Dashboard figures derived from an auction snapshot.

use serde::Serialize;

use crate::config::{DISTRIBUTION_FULL_SCALE, DISTRIBUTION_MAX_PARCELS};
use crate::marketplace::{BidRecord, BidStatus};

/// Counts and totals over a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuctionStats {
    pub total: usize,
    pub active: usize,
    pub won: usize,
    pub lost: usize,
    /// Sum of all parseable bid amounts; unparseable amounts count as zero.
    pub total_value: f64,
}

impl AuctionStats {
    pub fn from_bids(bids: &[BidRecord]) -> Self {
        let count = |status: BidStatus| bids.iter().filter(|b| b.status == status).count();
        Self {
            total: bids.len(),
            active: count(BidStatus::Active),
            won: count(BidStatus::Won),
            lost: count(BidStatus::Lost),
            total_value: bids.iter().map(|b| b.amount_value().unwrap_or(0.0)).sum(),
        }
    }
}

/// Highest bid seen for one parcel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelBar {
    pub parcel: String,
    pub max_amount: f64,
    /// Bar height, capped at 100.
    pub height_pct: f64,
}

/// Highest bid per parcel, for the first few distinct parcels in snapshot order.
pub fn parcel_distribution(bids: &[BidRecord]) -> Vec<ParcelBar> {
    let mut parcels: Vec<&str> = Vec::new();
    for bid in bids {
        if !parcels.contains(&bid.land_parcel.as_str()) {
            parcels.push(&bid.land_parcel);
        }
    }

    parcels
        .into_iter()
        .take(DISTRIBUTION_MAX_PARCELS)
        .map(|parcel| {
            let max_amount = bids
                .iter()
                .filter(|b| b.land_parcel == parcel)
                .map(|b| b.amount_value().unwrap_or(0.0))
                .fold(f64::NEG_INFINITY, f64::max);
            ParcelBar {
                parcel: parcel.to_string(),
                max_amount,
                height_pct: (max_amount / DISTRIBUTION_FULL_SCALE * 100.0).min(100.0),
            }
        })
        .collect()
}
