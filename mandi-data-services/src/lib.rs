pub mod market;

// Re-export commonly used items
pub use market::{
    aggregate, DataGovClient, FetchError, MarketTrends, PriceRecordSource, RefreshCoordinator,
    RefreshOutcome, TrendsState,
};
