use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::MandiId;

/// Fixed display unit for mandi prices. Not derived from source data.
pub const PRICE_UNIT: &str = "Kg";

/// Derive the shared mapping key for a market's snapshot and history.
pub fn mandi_id(market: &str, commodity: &str) -> MandiId {
    format!("{}-{}", market, commodity)
}

/// Inclusive min/max price band in major units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Latest known price record for one market, shaped for display.
///
/// One per distinct market name in the input batch; carries only the most
/// recent record's prices and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: MandiId,
    pub name: String,
    pub district: String,
    pub state: String,
    pub price_range: PriceRange,
    /// Always [`PRICE_UNIT`]; kept as a field for serialization to consumers
    pub unit: String,
    pub as_of_date: NaiveDate,
    pub commodity: String,
}

/// One point of a market's price trend, used to render the history chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketHistoryPoint {
    pub date: NaiveDate,
    pub min_price: f64,
    pub max_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandi_id_derivation() {
        assert_eq!(mandi_id("Azadpur", "Tomato"), "Azadpur-Tomato");
    }

    #[test]
    fn test_mandi_id_is_exact_match() {
        // Grouping keys are case- and whitespace-sensitive
        assert_ne!(mandi_id("Azadpur ", "Tomato"), mandi_id("Azadpur", "Tomato"));
        assert_ne!(mandi_id("azadpur", "Tomato"), mandi_id("Azadpur", "Tomato"));
    }
}
