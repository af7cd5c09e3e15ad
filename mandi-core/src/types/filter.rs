use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// The three recognized filter keys for the mandi price resource.
///
/// Replaces the loose key/value object the data source nominally accepts:
/// location and commodity are always passed explicitly, never read from
/// ambient state, and unknown keys are rejected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFilter {
    pub state: String,
    pub district: String,
    pub commodity: String,
}

impl MarketFilter {
    pub fn new(
        state: impl Into<String>,
        district: impl Into<String>,
        commodity: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            district: district.into(),
            commodity: commodity.into(),
        }
    }

    /// Build a filter from loose key/value pairs.
    ///
    /// Only `state`, `district` and `commodity` are recognized; anything
    /// else fails with [`FilterError::UnknownKey`], and all three keys must
    /// be present.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut state = None;
        let mut district = None;
        let mut commodity = None;

        for (key, value) in pairs {
            match key {
                "state" => state = Some(value.to_string()),
                "district" => district = Some(value.to_string()),
                "commodity" => commodity = Some(value.to_string()),
                other => return Err(FilterError::UnknownKey(other.to_string())),
            }
        }

        Ok(Self {
            state: state.ok_or(FilterError::MissingKey("state"))?,
            district: district.ok_or(FilterError::MissingKey("district"))?,
            commodity: commodity.ok_or(FilterError::MissingKey("commodity"))?,
        })
    }

    /// Query parameters in the `filters[...]` envelope the resource API
    /// expects.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("filters[state]".to_string(), self.state.clone()),
            ("filters[district]".to_string(), self.district.clone()),
            ("filters[commodity]".to_string(), self.commodity.clone()),
        ]
    }
}
