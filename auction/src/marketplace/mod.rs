pub mod bid;
pub mod bid_record;
pub mod stats;

pub use bid::{parse_amount, BidDraft};
pub use bid_record::{BidRecord, BidStatus, KeyIndex};
pub use stats::{parcel_distribution, AuctionStats, ParcelBar};
