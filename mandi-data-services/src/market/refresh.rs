//! Filter-driven refresh with stale-response cancellation.
//!
//! Every filter change issues a generation-stamped refresh. A refresh whose
//! generation is no longer current when its fetch resolves discards its
//! result instead of overwriting state produced for a newer filter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mandi_core::MarketFilter;

use super::aggregator::{aggregate, MarketTrends};
use super::fetcher::PriceRecordSource;

/// What a finished refresh did with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result was published as the current state
    Applied,
    /// A newer refresh started before this one resolved; result discarded
    Superseded,
}

/// Consumer-facing view of the latest refresh.
///
/// `Failed` carries a terminal message; there is no retry policy. Previous
/// data is cleared when a refresh starts, never merged into.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrendsState {
    #[default]
    Empty,
    Loading,
    Ready(MarketTrends),
    Failed(String),
}

/// Coordinates fetch-and-aggregate cycles for a changing filter.
///
/// The aggregator itself is stateless and re-entrant; all mutable state
/// lives here, guarded by the generation counter so that a slow stale
/// response can never overwrite a newer filter's result.
pub struct RefreshCoordinator {
    source: Arc<dyn PriceRecordSource>,
    generation: AtomicU64,
    state: tokio::sync::RwLock<TrendsState>,
}

impl RefreshCoordinator {
    pub fn new(source: Arc<dyn PriceRecordSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            state: tokio::sync::RwLock::new(TrendsState::Empty),
        }
    }

    /// Current state as last published by a completed refresh.
    pub async fn current_state(&self) -> TrendsState {
        self.state.read().await.clone()
    }

    /// Run one fetch-and-aggregate cycle for `filter`.
    ///
    /// Clears the stored state before fetching (stale data is fully
    /// discarded, not updated incrementally), then publishes `Ready` or
    /// `Failed`. Both writes happen only if no newer refresh has started in
    /// the meantime: a refresh that is already stale when it reaches the
    /// clear must not wipe a newer result either.
    pub async fn refresh(&self, filter: MarketFilter) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(
            "Refresh #{} started for {}/{}/{}",
            generation,
            filter.state,
            filter.district,
            filter.commodity
        );

        if !self.write_if_current(generation, TrendsState::Loading).await {
            tracing::debug!("Refresh #{} superseded before clearing", generation);
            return RefreshOutcome::Superseded;
        }

        let fetched = self.source.fetch_records(&filter).await;

        let next = match fetched {
            Ok(records) => match aggregate(&records, &filter) {
                Ok(trends) => TrendsState::Ready(trends),
                Err(e) => TrendsState::Failed(e.to_string()),
            },
            Err(e) => TrendsState::Failed(e.to_string()),
        };

        if let TrendsState::Failed(message) = &next {
            tracing::warn!("Refresh #{} failed: {}", generation, message);
        }

        if !self.write_if_current(generation, next).await {
            tracing::debug!("Refresh #{} superseded, result discarded", generation);
            return RefreshOutcome::Superseded;
        }

        RefreshOutcome::Applied
    }

    /// Store `next` only if `generation` is still the newest refresh.
    ///
    /// The generation is re-checked under the write lock, so a refresh that
    /// got overtaken between bumping the counter and acquiring the lock can
    /// never overwrite the overtaking refresh's state.
    async fn write_if_current(&self, generation: u64, next: TrendsState) -> bool {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mandi_core::RawPriceRecord;

    use crate::market::fetcher::FetchError;

    struct StaticSource {
        records: Vec<RawPriceRecord>,
    }

    #[async_trait]
    impl PriceRecordSource for StaticSource {
        async fn fetch_records(
            &self,
            _filter: &MarketFilter,
        ) -> Result<Vec<RawPriceRecord>, FetchError> {
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PriceRecordSource for FailingSource {
        async fn fetch_records(
            &self,
            _filter: &MarketFilter,
        ) -> Result<Vec<RawPriceRecord>, FetchError> {
            Err(FetchError::Status(503))
        }
    }

    fn tomato_record() -> RawPriceRecord {
        RawPriceRecord {
            state: "NCT of Delhi".to_string(),
            district: "Delhi".to_string(),
            market: "Azadpur".to_string(),
            commodity: "Tomato".to_string(),
            variety: "Local".to_string(),
            arrival_date: "2024-01-05".to_string(),
            min_price: "1200".to_string(),
            max_price: "1700".to_string(),
            modal_price: "1450".to_string(),
        }
    }

    #[tokio::test]
    async fn test_refresh_publishes_ready_state() {
        let coordinator = RefreshCoordinator::new(Arc::new(StaticSource {
            records: vec![tomato_record()],
        }));

        let filter = MarketFilter::new("NCT of Delhi", "Delhi", "Tomato");
        let outcome = coordinator.refresh(filter.clone()).await;
        assert_eq!(outcome, RefreshOutcome::Applied);

        match coordinator.current_state().await {
            TrendsState::Ready(trends) => {
                assert_eq!(trends.filter, filter);
                assert!(trends.snapshots.contains_key("Azadpur-Tomato"));
            }
            other => panic!("Expected Ready state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_fetch_is_ready_not_failed() {
        let coordinator = RefreshCoordinator::new(Arc::new(StaticSource { records: vec![] }));

        let outcome = coordinator
            .refresh(MarketFilter::new("NCT of Delhi", "Delhi", "Tomato"))
            .await;
        assert_eq!(outcome, RefreshOutcome::Applied);

        match coordinator.current_state().await {
            TrendsState::Ready(trends) => {
                assert!(trends.snapshots.is_empty());
                assert!(trends.history.is_empty());
            }
            other => panic!("Expected Ready state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_to_failed_state() {
        let coordinator = RefreshCoordinator::new(Arc::new(FailingSource));

        let outcome = coordinator
            .refresh(MarketFilter::new("NCT of Delhi", "Delhi", "Tomato"))
            .await;
        assert_eq!(outcome, RefreshOutcome::Applied);

        match coordinator.current_state().await {
            TrendsState::Failed(message) => assert!(message.contains("503")),
            other => panic!("Expected Failed state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_generation_cannot_clear_newer_state() {
        let coordinator = RefreshCoordinator::new(Arc::new(StaticSource {
            records: vec![tomato_record()],
        }));

        // Two refreshes complete; the second one's result is current
        coordinator
            .refresh(MarketFilter::new("NCT of Delhi", "Delhi", "Tomato"))
            .await;
        coordinator
            .refresh(MarketFilter::new("NCT of Delhi", "Delhi", "Tomato"))
            .await;
        let published = coordinator.current_state().await;
        assert!(matches!(published, TrendsState::Ready(_)));

        // A refresh overtaken between bumping the counter and reaching the
        // state lock must not wipe the newer result with Loading
        let cleared = coordinator
            .write_if_current(1, TrendsState::Loading)
            .await;
        assert!(!cleared);
        assert_eq!(coordinator.current_state().await, published);
    }

    #[tokio::test]
    async fn test_bad_record_surfaces_data_format_failure() {
        let mut record = tomato_record();
        record.min_price = "abc".to_string();
        let coordinator = RefreshCoordinator::new(Arc::new(StaticSource {
            records: vec![record],
        }));

        coordinator
            .refresh(MarketFilter::new("NCT of Delhi", "Delhi", "Tomato"))
            .await;

        match coordinator.current_state().await {
            TrendsState::Failed(message) => assert!(message.contains("min_price")),
            other => panic!("Expected Failed state, got {:?}", other),
        }
    }
}
