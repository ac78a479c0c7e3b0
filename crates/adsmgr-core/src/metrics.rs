//! Ratio metrics derived from summed delivery figures.
//!
//! Every ratio is `0.0` when its denominator is zero, so serialized output
//! never carries `NaN` or infinities.

use serde::{Deserialize, Serialize};

use crate::entity::AggregatedEntity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Cost per acquisition: `spend / sales`.
    pub cpa: f64,
    /// Cost per thousand impressions: `spend / impressions * 1000`.
    pub cpm: f64,
    /// Cost per click: `spend / clicks`.
    pub cpc: f64,
    /// Click-through rate in percent: `clicks / impressions * 100`.
    pub ctr: f64,
    /// Click-to-sale conversion in percent: `sales / clicks * 100`.
    pub click_cv: f64,
    /// Earnings per click: `revenue / clicks`.
    pub epc: f64,
    /// Return on ad spend: `revenue / spend`.
    pub roas: f64,
}

impl DerivedMetrics {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(spend: f64, revenue: f64, sales: i64, clicks: i64, impressions: i64) -> Self {
        let sales = sales as f64;
        let clicks = clicks as f64;
        let impressions = impressions as f64;

        Self {
            cpa: ratio(spend, sales),
            cpm: ratio(spend, impressions) * 1000.0,
            cpc: ratio(spend, clicks),
            ctr: ratio(clicks, impressions) * 100.0,
            click_cv: ratio(sales, clicks) * 100.0,
            epc: ratio(revenue, clicks),
            roas: ratio(revenue, spend),
        }
    }
}

/// Divide `numerator` by `denominator`, yielding `0.0` unless the
/// denominator is strictly positive and the result is finite.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator;
        if value.is_finite() {
            return value;
        }
    }
    0.0
}

/// Summary row over a set of aggregated entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub entity_count: usize,
    pub spend: f64,
    pub revenue: f64,
    pub sales: i64,
    pub profit: f64,
    pub clicks: i64,
    pub impressions: i64,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

impl Totals {
    #[must_use]
    pub fn from_entities<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = &'a AggregatedEntity>,
    {
        let mut totals = entities
            .into_iter()
            .fold(Self::default(), |mut acc, entity| {
                acc.entity_count += 1;
                acc.spend += entity.spend;
                acc.revenue += entity.revenue;
                acc.sales += entity.sales;
                acc.profit += entity.profit;
                acc.clicks += entity.clicks;
                acc.impressions += entity.impressions;
                acc
            });
        totals.metrics = DerivedMetrics::compute(
            totals.spend,
            totals.revenue,
            totals.sales,
            totals.clicks,
            totals.impressions,
        );
        totals
    }
}
