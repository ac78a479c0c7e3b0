use std::path::Path;

use adsmgr_core::AppConfig;
use adsmgr_webhook::WebhookClient;

/// Load a rule from YAML, validate it, and send it to the rule webhook.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or the webhook
/// does not accept the rule.
pub(crate) async fn run_rules_create(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let rule = adsmgr_core::load_rule(path)?;
    let client = WebhookClient::from_app_config(config)?;
    client.create_rule(&rule).await?;

    println!(
        "rule '{}' sent ({} condition(s), {} target(s))",
        rule.name,
        rule.conditions.len(),
        rule.target_ids.len()
    );
    Ok(())
}

pub(crate) async fn run_rules_toggle(
    config: &AppConfig,
    rule_id: &str,
    active: bool,
) -> anyhow::Result<()> {
    let client = WebhookClient::from_app_config(config)?;
    client.set_rule_status(rule_id, active).await?;
    println!(
        "rule {rule_id} {}",
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

pub(crate) async fn run_rules_delete(config: &AppConfig, rule_id: &str) -> anyhow::Result<()> {
    let client = WebhookClient::from_app_config(config)?;
    client.delete_rule(rule_id).await?;
    println!("rule {rule_id} deleted");
    Ok(())
}
