use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::MAX_LEDGER_VALUE_SIZE;
use crate::error::{AuctionError, AuctionResult};
use crate::marketplace::bid::parse_amount;
use crate::util::{json_from_limited_slice, json_to_vec};

/// Lifecycle of a bid. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    #[default]
    Active,
    Won,
    Lost,
}

impl BidStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Missing, null and empty status all read as `Active`.
fn status_or_active<'de, D>(deserializer: D) -> Result<BidStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") | Some("active") => Ok(BidStatus::Active),
        Some("won") => Ok(BidStatus::Won),
        Some("lost") => Ok(BidStatus::Lost),
        Some(other) => Err(serde::de::Error::unknown_variant(
            other,
            &["active", "won", "lost"],
        )),
    }
}

/// A bid as persisted under `bid_<id>` in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    /// Bid id; the ledger key is authoritative when reading
    #[serde(default)]
    pub id: String,

    /// Wallet address of the bidder
    pub bidder: String,

    /// Decimal amount as submitted
    pub bid_amount: String,

    /// Sealed bid payload produced by the encryptor
    pub encrypted_bid: String,

    /// Unix seconds at submission
    pub timestamp: u64,

    /// Parcel being bid on
    pub land_parcel: String,

    #[serde(default, deserialize_with = "status_or_active")]
    pub status: BidStatus,

    /// Fields written by other clients; carried through rewrites untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BidRecord {
    /// Serialize to UTF-8 JSON for ledger storage
    pub fn to_json(&self) -> AuctionResult<Vec<u8>> {
        json_to_vec(self, "bid record")
    }

    /// Deserialize from UTF-8 JSON
    pub fn from_json(data: &[u8]) -> AuctionResult<Self> {
        json_from_limited_slice(data, MAX_LEDGER_VALUE_SIZE)
    }

    /// Deserialize a blob read from `bid_<id>`, taking the id from the key.
    pub fn from_ledger(id: &str, data: &[u8]) -> AuctionResult<Self> {
        let mut record = Self::from_json(data)?;
        record.id = id.to_string();
        Ok(record)
    }

    /// Parsed bid amount, `None` when the stored string is not numeric.
    pub fn amount_value(&self) -> Option<f64> {
        parse_amount(&self.bid_amount)
    }

    pub fn is_active(&self) -> bool {
        self.status == BidStatus::Active
    }

    /// Move an active bid into a terminal status.
    pub fn transition(&mut self, next: BidStatus) -> AuctionResult<()> {
        if self.status.is_terminal() || !next.is_terminal() {
            return Err(AuctionError::InvalidTransition(format!(
                "bid {}: {} -> {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// Ordered list of bid ids, stored as a JSON array under `bid_keys`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyIndex {
    ids: Vec<String>,
}

impl KeyIndex {
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Append an id. Returns `false` if it was already present.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_json(&self) -> AuctionResult<Vec<u8>> {
        json_to_vec(self, "bid index")
    }

    /// Empty bytes mean the index was never written.
    pub fn from_json(data: &[u8]) -> AuctionResult<Self> {
        if data.is_empty() {
            return Ok(Self::new());
        }
        json_from_limited_slice(data, MAX_LEDGER_VALUE_SIZE)
    }
}

impl FromIterator<String> for KeyIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut index = Self::new();
        for id in iter {
            index.push(id);
        }
        index
    }
}
