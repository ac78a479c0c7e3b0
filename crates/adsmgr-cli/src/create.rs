use adsmgr_core::{AppConfig, EntityType};
use adsmgr_webhook::{CreateEntityRequest, WebhookClient};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum CreateCommands {
    Campaign {
        name: String,
        /// Platform objective, e.g. `OUTCOME_SALES`
        #[arg(long)]
        objective: Option<String>,
        #[arg(long)]
        daily_budget: Option<f64>,
        #[arg(long)]
        account: Option<String>,
    },
    Adset {
        name: String,
        #[arg(long)]
        campaign_id: String,
        #[arg(long)]
        daily_budget: Option<f64>,
        /// Publisher platform; repeat for several
        #[arg(long = "platform")]
        platforms: Vec<String>,
        /// `<platform>:<placement>`; repeat for several
        #[arg(long = "placement")]
        placements: Vec<String>,
    },
}

impl CreateCommands {
    pub(crate) fn into_request(self) -> CreateEntityRequest {
        match self {
            CreateCommands::Campaign {
                name,
                objective,
                daily_budget,
                account,
            } => CreateEntityRequest {
                name,
                level: EntityType::Campaign,
                objective,
                campaign_id: None,
                daily_budget,
                account_name: account,
                publisher_platforms: Vec::new(),
                placements: Vec::new(),
            },
            CreateCommands::Adset {
                name,
                campaign_id,
                daily_budget,
                platforms,
                placements,
            } => CreateEntityRequest {
                name,
                level: EntityType::Adset,
                objective: None,
                campaign_id: Some(campaign_id),
                daily_budget,
                account_name: None,
                publisher_platforms: platforms,
                placements,
            },
        }
    }
}

pub(crate) async fn run_create(config: &AppConfig, command: CreateCommands) -> anyhow::Result<()> {
    let request = command.into_request();
    request.validate()?;

    let client = WebhookClient::from_app_config(config)?;
    client.create_entity(&request).await?;

    println!("{} '{}' submitted for creation", request.level, request.name);
    Ok(())
}
