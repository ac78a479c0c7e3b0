//! Live integration tests for adsmgr-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh Postgres database with the local reporting-schema
//! mirror applied. They need `DATABASE_URL` pointing at a server the harness
//! may create databases on, so they are ignored by default:
//! `cargo test -p adsmgr-db -- --ignored`.

use adsmgr_core::{aggregate, Level, ParentFilter};
use adsmgr_db::{list_report_rows, DbError, ReportRowFilters};
use chrono::NaiveDate;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
}

async fn insert_row(pool: &sqlx::PgPool, date: NaiveDate, campaign: &str, ad_id: &str, spend: &str) {
    sqlx::query(
        "INSERT INTO ads_report_daily \
             (date, account_name, campaign_name, campaign_id, adset_name, adset_id, \
              ad_name, ad_id, spend, impressions, clicks, sales, revenue, campaign_status) \
         VALUES ($1, 'Main', $2, $3, $4, $5, $6, $7, $8::NUMERIC, 1000, 10, 1, 20, 'ACTIVE')",
    )
    .bind(date)
    .bind(campaign)
    .bind(format!("cmp-{campaign}"))
    .bind(format!("{campaign} adset"))
    .bind(format!("ads-{campaign}"))
    .bind(format!("{campaign} ad"))
    .bind(ad_id)
    .bind(spend)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_row failed for {campaign}/{ad_id}: {e}"));
}

fn filters(from: NaiveDate, to: NaiveDate) -> ReportRowFilters<'static> {
    ReportRowFilters {
        from,
        to,
        account: None,
        campaign: None,
        adset: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn date_range_is_inclusive(pool: sqlx::PgPool) {
    insert_row(&pool, day(1), "Spring", "ad-1", "10.00").await;
    insert_row(&pool, day(2), "Spring", "ad-1", "20.00").await;
    insert_row(&pool, day(3), "Spring", "ad-1", "40.00").await;

    let rows = list_report_rows(&pool, filters(day(1), day(2)))
        .await
        .expect("query should succeed");

    assert_eq!(rows.len(), 2);
    let total: f64 = rows.iter().filter_map(|r| r.spend).sum();
    assert!((total - 30.0).abs() < 1e-9);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn campaign_filter_is_exact_match(pool: sqlx::PgPool) {
    insert_row(&pool, day(1), "Spring", "ad-1", "10.00").await;
    insert_row(&pool, day(1), "Spring Sale", "ad-2", "5.00").await;

    let mut f = filters(day(1), day(1));
    f.campaign = Some("Spring");
    let rows = list_report_rows(&pool, f).await.expect("query should succeed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].campaign_name.as_deref(), Some("Spring"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn rows_feed_the_aggregator(pool: sqlx::PgPool) {
    insert_row(&pool, day(1), "Spring", "ad-1", "10.00").await;
    insert_row(&pool, day(2), "Spring", "ad-1", "15.50").await;
    insert_row(&pool, day(2), "Autumn", "ad-9", "3.00").await;

    let rows = list_report_rows(&pool, filters(day(1), day(31)))
        .await
        .expect("query should succeed");
    let campaigns = aggregate(&rows, &ParentFilter::default(), Level::Campaign);

    assert_eq!(campaigns.len(), 2);
    let spring = &campaigns["Spring"];
    assert!((spring.spend - 25.5).abs() < 1e-9);
    assert_eq!(spring.sales, 2);
    assert_eq!(spring.real_id, "cmp-Spring");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn inverted_range_is_rejected_before_querying(pool: sqlx::PgPool) {
    let err = list_report_rows(&pool, filters(day(5), day(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidDateRange { .. }));
}
