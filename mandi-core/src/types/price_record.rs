use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataFormatError;

/// One row of the data.gov.in daily mandi price resource, exactly as served.
///
/// Prices arrive as numeric strings in minor currency units (paise); the
/// arrival date is a plain string because the resource mixes `DD/MM/YYYY`
/// and ISO `YYYY-MM-DD` depending on the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPriceRecord {
    pub state: String,
    pub district: String,
    pub market: String,
    pub commodity: String,
    pub variety: String,
    pub arrival_date: String,
    pub min_price: String,
    pub max_price: String,
    pub modal_price: String,
}

/// [`RawPriceRecord`] with the arrival date parsed and prices converted to
/// major units (rupees), rounded to 2 decimal places. Derived per batch,
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPriceRecord {
    pub state: String,
    pub district: String,
    pub market: String,
    pub commodity: String,
    pub variety: String,
    pub arrival_date: NaiveDate,
    pub min_price: f64,
    pub max_price: f64,
    pub modal_price: f64,
}

impl RawPriceRecord {
    /// Parse dates and convert prices from minor to major units.
    ///
    /// Fails with [`DataFormatError`] on the first field that does not
    /// parse. Applying this twice would divide by 100 again; callers must
    /// normalize a batch exactly once.
    pub fn normalize(&self) -> Result<NormalizedPriceRecord, DataFormatError> {
        Ok(NormalizedPriceRecord {
            state: self.state.clone(),
            district: self.district.clone(),
            market: self.market.clone(),
            commodity: self.commodity.clone(),
            variety: self.variety.clone(),
            arrival_date: self.parse_arrival_date()?,
            min_price: self.parse_minor_price("min_price", &self.min_price)?,
            max_price: self.parse_minor_price("max_price", &self.max_price)?,
            modal_price: self.parse_minor_price("modal_price", &self.modal_price)?,
        })
    }

    /// Parse the arrival date, accepting the resource's `DD/MM/YYYY` export
    /// format as well as ISO `YYYY-MM-DD`.
    fn parse_arrival_date(&self) -> Result<NaiveDate, DataFormatError> {
        let raw = self.arrival_date.trim();

        NaiveDate::parse_from_str(raw, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .map_err(|_| DataFormatError::InvalidDate {
                value: self.arrival_date.clone(),
                market: self.market.clone(),
            })
    }

    /// Parse a minor-unit price string and convert to major units (2 dp).
    ///
    /// Non-finite values ("NaN", "inf") parse as `f64` but are rejected:
    /// they cannot be real prices and would poison comparisons downstream.
    fn parse_minor_price(&self, field: &'static str, raw: &str) -> Result<f64, DataFormatError> {
        let invalid = || DataFormatError::InvalidPrice {
            field,
            value: raw.to_string(),
            market: self.market.clone(),
            arrival_date: self.arrival_date.clone(),
        };

        let minor: f64 = raw.trim().parse().map_err(|_| invalid())?;
        if !minor.is_finite() {
            return Err(invalid());
        }

        let major = minor / 100.0;
        Ok((major * 100.0).round() / 100.0)
    }
}
