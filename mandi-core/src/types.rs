pub mod filter;
pub mod market;
pub mod price_record;

/// Derived market identifier: `"{market}-{commodity}"`
pub type MandiId = String;

/// Raw market name exactly as served by the API (grouping key,
/// case- and whitespace-sensitive)
pub type MarketName = String;
