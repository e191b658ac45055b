use serde::{Deserialize, Serialize};

use crate::error::{AuctionError, AuctionResult};

/// Bid form input before it is sealed and written to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDraft {
    /// Parcel being bid on, e.g. "Neo Tokyo"
    pub land_parcel: String,

    /// Decimal amount as typed by the user
    pub bid_amount: String,

    /// Free-form strategy notes, sealed together with the bid
    #[serde(default)]
    pub encrypted_strategy: String,
}

impl BidDraft {
    pub fn new(land_parcel: impl Into<String>, bid_amount: impl Into<String>) -> Self {
        Self {
            land_parcel: land_parcel.into(),
            bid_amount: bid_amount.into(),
            encrypted_strategy: String::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.encrypted_strategy = strategy.into();
        self
    }

    /// Check required fields before anything touches the ledger.
    pub fn validate(&self) -> AuctionResult<()> {
        if self.land_parcel.trim().is_empty() {
            return Err(AuctionError::Validation("land parcel is required".into()));
        }
        if self.bid_amount.trim().is_empty() {
            return Err(AuctionError::Validation("bid amount is required".into()));
        }
        match parse_amount(&self.bid_amount) {
            Some(amount) if amount > 0.0 => Ok(()),
            _ => Err(AuctionError::Validation(format!(
                "bid amount must be a positive number, got '{}'",
                self.bid_amount
            ))),
        }
    }
}

/// Parse the leading decimal number of an amount string.
///
/// Trailing text is ignored ("1.5 ETH" parses as 1.5). Returns `None` when
/// no finite number can be read.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let len = numeric_prefix_len(trimmed.as_bytes());
    if len == 0 {
        return None;
    }
    trimmed[..len].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Length of the longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix,
/// or 0 when there is no digit in the mantissa.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;
    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        mantissa_digits += frac_end - (i + 1);
        i = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}
