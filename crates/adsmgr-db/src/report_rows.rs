//! Read access to `view_ads_report`, one row per ad per day.

use adsmgr_core::ReportRow;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from `view_ads_report` with money columns still in `NUMERIC` form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportViewRow {
    pub date: Option<NaiveDate>,
    pub account_name: Option<String>,
    pub campaign_name: Option<String>,
    pub campaign_id: Option<String>,
    pub adset_name: Option<String>,
    pub adset_id: Option<String>,
    pub ad_name: Option<String>,
    pub ad_id: Option<String>,
    pub spend: Option<Decimal>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub sales: Option<i64>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub daily_budget: Option<Decimal>,
    pub is_adset_level_budget: Option<bool>,
    pub campaign_status: Option<String>,
    pub adset_status: Option<String>,
    pub ad_status: Option<String>,
}

impl From<ReportViewRow> for ReportRow {
    fn from(row: ReportViewRow) -> Self {
        Self {
            date: row.date,
            account_name: row.account_name,
            campaign_name: row.campaign_name,
            campaign_id: row.campaign_id,
            adset_name: row.adset_name,
            adset_id: row.adset_id,
            ad_name: row.ad_name,
            ad_id: row.ad_id,
            spend: money(row.spend),
            impressions: row.impressions,
            clicks: row.clicks,
            sales: row.sales,
            revenue: money(row.revenue),
            profit: money(row.profit),
            daily_budget: money(row.daily_budget),
            is_adset_level_budget: row.is_adset_level_budget,
            campaign_status: row.campaign_status,
            adset_status: row.adset_status,
            ad_status: row.ad_status,
        }
    }
}

fn money(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

/// Date range plus optional exact-match parent names.
///
/// Both ends of the range are inclusive.
#[derive(Debug, Clone)]
pub struct ReportRowFilters<'a> {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub account: Option<&'a str>,
    pub campaign: Option<&'a str>,
    pub adset: Option<&'a str>,
}

/// Returns every report row in `[from, to]` matching the parent filters.
///
/// Empty parent filters are treated as absent.
///
/// # Errors
///
/// Returns [`DbError::InvalidDateRange`] if `from > to`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn list_report_rows(
    pool: &PgPool,
    filters: ReportRowFilters<'_>,
) -> Result<Vec<ReportRow>, DbError> {
    if filters.from > filters.to {
        return Err(DbError::InvalidDateRange {
            from: filters.from,
            to: filters.to,
        });
    }

    let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);

    let rows = sqlx::query_as::<_, ReportViewRow>(
        "SELECT \
             date, account_name, campaign_name, campaign_id, adset_name, adset_id, \
             ad_name, ad_id, spend, impressions, clicks, sales, revenue, profit, \
             daily_budget, is_adset_level_budget, campaign_status, adset_status, ad_status \
         FROM view_ads_report \
         WHERE date >= $1 \
           AND date <= $2 \
           AND ($3::TEXT IS NULL OR account_name = $3) \
           AND ($4::TEXT IS NULL OR campaign_name = $4) \
           AND ($5::TEXT IS NULL OR adset_name = $5) \
         ORDER BY date, ad_id",
    )
    .bind(filters.from)
    .bind(filters.to)
    .bind(non_empty(filters.account))
    .bind(non_empty(filters.campaign))
    .bind(non_empty(filters.adset))
    .fetch_all(pool)
    .await?;

    tracing::debug!(
        rows = rows.len(),
        from = %filters.from,
        to = %filters.to,
        "loaded report rows"
    );

    Ok(rows.into_iter().map(ReportRow::from).collect())
}
