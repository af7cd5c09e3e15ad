pub mod error;
pub mod types;

// Re-export common types
pub use error::{DataFormatError, FilterError};
pub use types::filter::MarketFilter;
pub use types::market::{mandi_id, MarketHistoryPoint, MarketSnapshot, PriceRange, PRICE_UNIT};
pub use types::price_record::{NormalizedPriceRecord, RawPriceRecord};
pub use types::MandiId;
