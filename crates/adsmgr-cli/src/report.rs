use adsmgr_core::{
    aggregate, apply_entity_filter, sort_by_spend, AggregatedEntity, EntityFilter, Level,
    ParentFilter, Totals, PLATFORMS,
};
use chrono::NaiveDate;

pub(crate) struct ReportArgs<'a> {
    pub level: Level,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub account: Option<&'a str>,
    pub campaign: Option<&'a str>,
    pub adset: Option<&'a str>,
    pub name: Option<&'a str>,
    pub status: Option<&'a str>,
    pub limit: usize,
}

/// Print the aggregated entity table for a date range, highest spend first.
///
/// # Errors
///
/// Returns an error if the date range is inverted or the query fails.
pub(crate) async fn run_report(pool: &sqlx::PgPool, args: &ReportArgs<'_>) -> anyhow::Result<()> {
    let rows = adsmgr_db::list_report_rows(
        pool,
        adsmgr_db::ReportRowFilters {
            from: args.from,
            to: args.to,
            account: args.account,
            campaign: args.campaign,
            adset: args.adset,
        },
    )
    .await?;

    let parent = ParentFilter {
        account: args.account,
        campaign: args.campaign,
        adset: args.adset,
    };
    let filter = EntityFilter {
        name_contains: args.name,
        status: args.status,
    };
    let mut entities = apply_entity_filter(
        aggregate(&rows, &parent, args.level).into_values(),
        &filter,
    );
    sort_by_spend(&mut entities);

    if entities.is_empty() {
        println!("no {} data between {} and {}", args.level, args.from, args.to);
        return Ok(());
    }

    println!("{}", header());
    for entity in entities.iter().take(args.limit) {
        println!("{}", format_row(entity));
    }
    if entities.len() > args.limit {
        println!("... {} more", entities.len() - args.limit);
    }

    let totals = Totals::from_entities(&entities);
    println!();
    println!(
        "{} {}s  spend {:.2}  revenue {:.2}  sales {}  cpa {:.2}  roas {:.2}",
        totals.entity_count,
        args.level,
        totals.spend,
        totals.revenue,
        totals.sales,
        totals.metrics.cpa,
        totals.metrics.roas
    );

    Ok(())
}

pub(crate) fn print_placements() {
    for platform in PLATFORMS {
        println!("{} ({})", platform.label, platform.id);
        for placement in platform.placements {
            println!("  {}:{:<22}{}", platform.id, placement.id, placement.label);
        }
    }
}

fn header() -> String {
    format!(
        "{:<36}{:<10}{:>12}{:>12}{:>8}{:>10}{:>8}  ID",
        "NAME", "STATUS", "SPEND", "REVENUE", "SALES", "CPA", "ROAS"
    )
}

fn format_row(entity: &AggregatedEntity) -> String {
    let name = if entity.name.chars().count() > 34 {
        format!("{}...", entity.name.chars().take(31).collect::<String>())
    } else {
        entity.name.clone()
    };
    format!(
        "{:<36}{:<10}{:>12.2}{:>12.2}{:>8}{:>10.2}{:>8.2}  {}",
        name,
        entity.status.as_deref().unwrap_or("-"),
        entity.spend,
        entity.revenue,
        entity.sales,
        entity.metrics.cpa,
        entity.metrics.roas,
        entity.real_id
    )
}
