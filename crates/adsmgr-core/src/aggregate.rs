//! Groups daily report rows into per-name entities at one hierarchy level.
//!
//! The output is rebuilt from scratch for every fetch or filter change; there
//! is no incremental update path.

use std::collections::BTreeMap;

use crate::entity::{AggregatedEntity, Level};
use crate::metrics::DerivedMetrics;
use crate::report::ReportRow;

/// Exact-match restriction on the parent names of a row.
///
/// `None` and empty strings both mean "no restriction".
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentFilter<'a> {
    pub account: Option<&'a str>,
    pub campaign: Option<&'a str>,
    pub adset: Option<&'a str>,
}

impl ParentFilter<'_> {
    fn matches(&self, row: &ReportRow) -> bool {
        field_matches(self.account, row.account_name.as_deref())
            && field_matches(self.campaign, row.campaign_name.as_deref())
            && field_matches(self.adset, row.adset_name.as_deref())
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.filter(|w| !w.is_empty()) {
        None => true,
        Some(w) => actual == Some(w),
    }
}

/// Post-aggregation list filter used by the dashboard search box and
/// status dropdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityFilter<'a> {
    /// Case-insensitive substring of the entity name.
    pub name_contains: Option<&'a str>,
    /// Case-insensitive exact status, e.g. `"ACTIVE"`.
    pub status: Option<&'a str>,
}

/// Build one [`AggregatedEntity`] per distinct name at `level`.
///
/// Rows failing `parent` or lacking a name at `level` are skipped. Identity
/// fields come from the first matching row for each name; metrics are
/// summed over all of them, with missing values counted as zero.
#[must_use]
pub fn aggregate(
    rows: &[ReportRow],
    parent: &ParentFilter<'_>,
    level: Level,
) -> BTreeMap<String, AggregatedEntity> {
    let mut buckets: BTreeMap<String, AggregatedEntity> = BTreeMap::new();

    for row in rows.iter().filter(|r| parent.matches(r)) {
        let Some(name) = group_name(row, level) else {
            continue;
        };

        let entity = buckets
            .entry(name.to_owned())
            .or_insert_with(|| new_entity(row, name, level));

        entity.spend += row.spend.unwrap_or(0.0);
        entity.revenue += row.revenue.unwrap_or(0.0);
        entity.sales += row.sales.unwrap_or(0);
        entity.profit += row.profit.unwrap_or(0.0);
        entity.clicks += row.clicks.unwrap_or(0);
        entity.impressions += row.impressions.unwrap_or(0);
    }

    for entity in buckets.values_mut() {
        entity.metrics = DerivedMetrics::compute(
            entity.spend,
            entity.revenue,
            entity.sales,
            entity.clicks,
            entity.impressions,
        );
    }

    buckets
}

fn group_name(row: &ReportRow, level: Level) -> Option<&str> {
    let name = match level {
        Level::Account => row.account_name.as_deref(),
        Level::Campaign => row.campaign_name.as_deref(),
        Level::Adset => row.adset_name.as_deref(),
        Level::Ad => row.ad_name.as_deref(),
    };
    name.filter(|n| !n.trim().is_empty())
}

fn new_entity(row: &ReportRow, name: &str, level: Level) -> AggregatedEntity {
    let (real_id, status) = match level {
        Level::Account => (None, None),
        Level::Campaign => (row.campaign_id.clone(), row.campaign_status.clone()),
        Level::Adset => (row.adset_id.clone(), row.adset_status.clone()),
        Level::Ad => (row.ad_id.clone(), row.ad_status.clone()),
    };

    AggregatedEntity {
        id: slugify(name),
        real_id: real_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| name.to_owned()),
        first_ad_id: row.ad_id.clone().filter(|id| !id.is_empty()),
        level,
        name: name.to_owned(),
        status,
        is_adset_level_budget: row.is_adset_level_budget.unwrap_or(false),
        daily_budget: row.daily_budget,
        account_name: row.account_name.clone(),
        campaign_name: (level != Level::Account)
            .then(|| row.campaign_name.clone())
            .flatten(),
        adset_name: matches!(level, Level::Adset | Level::Ad)
            .then(|| row.adset_name.clone())
            .flatten(),
        spend: 0.0,
        revenue: 0.0,
        sales: 0,
        profit: 0.0,
        clicks: 0,
        impressions: 0,
        metrics: DerivedMetrics::default(),
    }
}

/// Lowercase `name` and replace every non-ASCII-alphanumeric character with `_`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Keep only the entities accepted by `filter`.
#[must_use]
pub fn apply_entity_filter<I>(entities: I, filter: &EntityFilter<'_>) -> Vec<AggregatedEntity>
where
    I: IntoIterator<Item = AggregatedEntity>,
{
    let needle = filter
        .name_contains
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase);
    let status = filter.status.map(str::trim).filter(|s| !s.is_empty());

    entities
        .into_iter()
        .filter(|e| {
            needle
                .as_deref()
                .is_none_or(|n| e.name.to_lowercase().contains(n))
        })
        .filter(|e| {
            status.is_none_or(|s| {
                e.status
                    .as_deref()
                    .is_some_and(|actual| actual.eq_ignore_ascii_case(s))
            })
        })
        .collect()
}

/// Order entities by spend, highest first; equal spend falls back to name.
pub fn sort_by_spend(entities: &mut [AggregatedEntity]) {
    entities.sort_by(|a, b| {
        b.spend
            .total_cmp(&a.spend)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
