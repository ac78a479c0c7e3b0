//! `status` and `budget` commands.
//!
//! Each invocation builds its own store and coordinator; the overlay only
//! matters for the lifetime of the command, but the same apply, dispatch,
//! and rollback sequence as the server runs.

use std::time::Duration;

use adsmgr_core::{AppConfig, EntityType, MutationField};
use adsmgr_state::{
    CoordinatorSettings, MutationCoordinator, MutationError, MutationTarget, OptimisticStore,
};
use adsmgr_webhook::WebhookClient;

fn coordinator(config: &AppConfig) -> anyhow::Result<MutationCoordinator<WebhookClient>> {
    let client = WebhookClient::from_app_config(config)?;
    let store = OptimisticStore::new(Duration::from_secs(config.optimistic_ttl_secs));
    Ok(MutationCoordinator::new(
        store,
        client,
        CoordinatorSettings::from_app_config(config),
    ))
}

pub(crate) async fn run_status(
    config: &AppConfig,
    entity_type: EntityType,
    real_id: &str,
    status: &str,
) -> anyhow::Result<()> {
    let coordinator = coordinator(config)?;
    let target = MutationTarget::new(entity_type, real_id);

    coordinator
        .update_field(
            &target,
            MutationField::Status,
            serde_json::Value::from(status),
            &config.user,
        )
        .await?;

    println!(
        "{entity_type} {real_id}: status set to {}",
        status.to_ascii_uppercase()
    );
    Ok(())
}

pub(crate) async fn run_budget(
    config: &AppConfig,
    entity_type: EntityType,
    real_id: &str,
    amount: f64,
    current: f64,
    confirmed: bool,
) -> anyhow::Result<()> {
    let coordinator = coordinator(config)?;
    let target = MutationTarget::new(entity_type, real_id).with_current_budget(current);

    match coordinator
        .update_budget(&target, amount, confirmed, &config.user)
        .await
    {
        Ok(()) => {
            println!("{entity_type} {real_id}: daily budget set to {amount:.2}");
            Ok(())
        }
        Err(MutationError::ConfirmationRequired {
            current,
            requested,
            multiplier,
        }) => anyhow::bail!(
            "{requested:.2} is at least {multiplier}x the current budget of {current:.2}; rerun with --yes to apply it"
        ),
        Err(e) => Err(e.into()),
    }
}
