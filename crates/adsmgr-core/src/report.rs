use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of delivery for one ad, as exposed by the reporting view.
///
/// Every column is nullable upstream. Missing metrics count as zero when
/// aggregated; rows missing the name for the requested level are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: Option<NaiveDate>,
    pub account_name: Option<String>,
    pub campaign_name: Option<String>,
    pub campaign_id: Option<String>,
    pub adset_name: Option<String>,
    pub adset_id: Option<String>,
    pub ad_name: Option<String>,
    pub ad_id: Option<String>,
    pub spend: Option<f64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub sales: Option<i64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub daily_budget: Option<f64>,
    /// `true` when the budget lives on the adset rather than the campaign.
    pub is_adset_level_budget: Option<bool>,
    pub campaign_status: Option<String>,
    pub adset_status: Option<String>,
    pub ad_status: Option<String>,
}
