mod create;
mod mutate;
mod report;
mod rules;

use std::path::PathBuf;

use adsmgr_core::{EntityType, Level};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adsmgr-cli")]
#[command(about = "Ads manager command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Aggregate report rows into a per-entity table
    Report {
        #[arg(long, default_value = "campaign")]
        level: Level,
        /// First day of the range (inclusive, YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the range (inclusive, YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        campaign: Option<String>,
        #[arg(long)]
        adset: Option<String>,
        /// Case-insensitive substring of the entity name
        #[arg(long)]
        name: Option<String>,
        /// Exact status, e.g. ACTIVE
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of rows to print
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Set the status of a campaign, adset, or ad
    Status {
        entity_type: EntityType,
        real_id: String,
        /// ACTIVE or PAUSED
        status: String,
    },
    /// Change a daily budget
    Budget {
        entity_type: EntityType,
        real_id: String,
        amount: f64,
        /// Daily budget currently in effect (0 when the object has none)
        #[arg(long)]
        current: f64,
        /// Confirm a large increase without prompting
        #[arg(long)]
        yes: bool,
    },
    /// Create a campaign or adset
    Create {
        #[command(subcommand)]
        command: create::CreateCommands,
    },
    /// Manage automation rules
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// List publisher platforms and placements
    Placements,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply the local reporting-schema mirror
    Migrate,
}

#[derive(Debug, Subcommand)]
enum RulesCommands {
    /// Send a rule defined in a YAML file
    Create { path: PathBuf },
    /// Activate or deactivate a rule
    Toggle {
        rule_id: String,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    /// Delete a rule
    Delete { rule_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("adsmgr-cli ready; run with --help for commands");
        return Ok(());
    };

    if let Commands::Placements = command {
        report::print_placements();
        return Ok(());
    }

    let config = adsmgr_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Db { command } => run_db(&config, command).await,
        Commands::Report {
            level,
            from,
            to,
            account,
            campaign,
            adset,
            name,
            status,
            limit,
        } => {
            let pool = connect(&config).await?;
            report::run_report(
                &pool,
                &report::ReportArgs {
                    level,
                    from,
                    to,
                    account: account.as_deref(),
                    campaign: campaign.as_deref(),
                    adset: adset.as_deref(),
                    name: name.as_deref(),
                    status: status.as_deref(),
                    limit,
                },
            )
            .await
        }
        Commands::Status {
            entity_type,
            real_id,
            status,
        } => mutate::run_status(&config, entity_type, &real_id, &status).await,
        Commands::Budget {
            entity_type,
            real_id,
            amount,
            current,
            yes,
        } => mutate::run_budget(&config, entity_type, &real_id, amount, current, yes).await,
        Commands::Create { command } => create::run_create(&config, command).await,
        Commands::Rules { command } => match command {
            RulesCommands::Create { path } => rules::run_rules_create(&config, &path).await,
            RulesCommands::Toggle { rule_id, active } => {
                rules::run_rules_toggle(&config, &rule_id, active).await
            }
            RulesCommands::Delete { rule_id } => rules::run_rules_delete(&config, &rule_id).await,
        },
        Commands::Placements => Ok(()),
    }
}

async fn connect(config: &adsmgr_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = adsmgr_db::PoolConfig::from_app_config(config);
    Ok(adsmgr_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn run_db(config: &adsmgr_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    match command {
        DbCommands::Ping => {
            adsmgr_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = adsmgr_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
