use thiserror::Error;

/// A record's date or numeric field could not be parsed.
///
/// Raised by the aggregation pipeline, which fails fast: the whole batch
/// aborts and no partial output is produced. Invalid values are never
/// coerced to zero or a sentinel date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    #[error("invalid {field} {value:?} in record for market {market:?} dated {arrival_date:?}")]
    InvalidPrice {
        /// Which price field failed ("min_price", "max_price" or "modal_price")
        field: &'static str,
        value: String,
        market: String,
        arrival_date: String,
    },

    #[error("unparseable arrival date {value:?} in record for market {market:?}")]
    InvalidDate { value: String, market: String },
}

/// Errors from building a [`MarketFilter`](crate::types::filter::MarketFilter)
/// out of loose key/value pairs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unrecognized filter key: {0}")]
    UnknownKey(String),

    #[error("missing filter key: {0}")]
    MissingKey(&'static str),
}
