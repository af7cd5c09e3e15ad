//! Price-record aggregation pipeline.
//!
//! Turns one flat batch of raw mandi price records (already filtered to a
//! single commodity and location by the caller) into per-market latest
//! snapshots and per-market chronological history series. Pure functions of
//! their input: no logging, no caching, no shared state. Each batch is
//! shaped from scratch; nothing is merged with a previous result.

use std::cmp::Ordering;
use std::collections::HashMap;

use mandi_core::types::market::{mandi_id, MarketHistoryPoint, MarketSnapshot, PriceRange, PRICE_UNIT};
use mandi_core::types::{MandiId, MarketName};
use mandi_core::{DataFormatError, MarketFilter, NormalizedPriceRecord, RawPriceRecord};

/// Aggregated view of one fetch batch: latest snapshot plus full price
/// history per mandi, both keyed by the same derived id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketTrends {
    /// The filter triple this batch was aggregated for
    pub filter: MarketFilter,
    pub snapshots: HashMap<MandiId, MarketSnapshot>,
    pub history: HashMap<MandiId, Vec<MarketHistoryPoint>>,
}

/// All records for one market, in input order.
///
/// Only [`group_by_market`] constructs groups, and it never emits an empty
/// one, so every group carries at least one record.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketGroup {
    market: MarketName,
    records: Vec<NormalizedPriceRecord>,
}

impl MarketGroup {
    /// Raw market name, used verbatim as the grouping key.
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Records in input order; never empty.
    pub fn records(&self) -> &[NormalizedPriceRecord] {
        &self.records
    }

    /// Shared mapping key for this group's snapshot and history entries.
    ///
    /// Derived once from the first record so both mappings always agree,
    /// regardless of which record ends up being the latest.
    fn id(&self) -> MandiId {
        mandi_id(&self.market, &self.records[0].commodity)
    }
}

/// Convert a raw batch to major units with parsed dates.
///
/// Fails fast with [`DataFormatError`] on the first record whose date or
/// price fields do not parse; no partial output is produced.
pub fn normalize(records: &[RawPriceRecord]) -> Result<Vec<NormalizedPriceRecord>, DataFormatError> {
    records.iter().map(RawPriceRecord::normalize).collect()
}

/// Group normalized records by their raw market name.
///
/// Market names are matched exactly (case- and whitespace-sensitive).
/// Groups appear in first-seen order and records keep their input order
/// within each group; no sorting happens at this stage.
pub fn group_by_market(records: Vec<NormalizedPriceRecord>) -> Vec<MarketGroup> {
    let mut groups: Vec<MarketGroup> = Vec::new();
    let mut index_by_market: HashMap<MarketName, usize> = HashMap::new();

    for record in records {
        match index_by_market.get(&record.market) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index_by_market.insert(record.market.clone(), groups.len());
                groups.push(MarketGroup {
                    market: record.market.clone(),
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Build the latest-snapshot mapping, one entry per market group.
///
/// Latest-record selection is deterministic: the maximum arrival date wins;
/// on equal dates the record with the highest modal price wins; on a full
/// tie the first record encountered is kept.
pub fn build_snapshots(groups: &[MarketGroup]) -> HashMap<MandiId, MarketSnapshot> {
    groups
        .iter()
        .map(|group| {
            let latest = latest_record(&group.records);
            let snapshot = MarketSnapshot {
                id: group.id(),
                name: latest.market.clone(),
                district: latest.district.clone(),
                state: latest.state.clone(),
                price_range: PriceRange {
                    min: latest.min_price,
                    max: latest.max_price,
                },
                unit: PRICE_UNIT.to_string(),
                as_of_date: latest.arrival_date,
                commodity: latest.commodity.clone(),
            };
            (snapshot.id.clone(), snapshot)
        })
        .collect()
}

/// Build the history mapping, one ascending series per market group.
///
/// The sort is stable, so records sharing a date keep their input order.
/// Ids derive identically to [`build_snapshots`], guaranteeing the two
/// mappings share keys.
pub fn build_history(groups: &[MarketGroup]) -> HashMap<MandiId, Vec<MarketHistoryPoint>> {
    groups
        .iter()
        .map(|group| {
            let mut points: Vec<MarketHistoryPoint> = group
                .records
                .iter()
                .map(|record| MarketHistoryPoint {
                    date: record.arrival_date,
                    min_price: record.min_price,
                    max_price: record.max_price,
                })
                .collect();
            points.sort_by_key(|point| point.date);
            (group.id(), points)
        })
        .collect()
}

/// Sole public entry point: run the full pipeline for one batch.
///
/// The caller passes the filter triple explicitly; the aggregator never
/// reads location or commodity from ambient state. An empty batch yields
/// empty mappings, not an error.
pub fn aggregate(
    records: &[RawPriceRecord],
    filter: &MarketFilter,
) -> Result<MarketTrends, DataFormatError> {
    let normalized = normalize(records)?;
    let groups = group_by_market(normalized);

    Ok(MarketTrends {
        filter: filter.clone(),
        snapshots: build_snapshots(&groups),
        history: build_history(&groups),
    })
}

/// Select the latest record of a non-empty group (see [`build_snapshots`]
/// for the tie-break rules).
fn latest_record(records: &[NormalizedPriceRecord]) -> &NormalizedPriceRecord {
    let mut latest = &records[0];
    for candidate in &records[1..] {
        let ordering = candidate
            .arrival_date
            .cmp(&latest.arrival_date)
            .then_with(|| candidate.modal_price.total_cmp(&latest.modal_price));
        if ordering == Ordering::Greater {
            latest = candidate;
        }
    }
    latest
}
