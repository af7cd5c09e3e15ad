pub mod aggregator;
pub mod fetcher;
pub mod refresh;

// Re-export commonly used items
pub use aggregator::{aggregate, MarketGroup, MarketTrends};
pub use fetcher::{DataGovClient, FetchError, PriceRecordSource};
pub use refresh::{RefreshCoordinator, RefreshOutcome, TrendsState};
