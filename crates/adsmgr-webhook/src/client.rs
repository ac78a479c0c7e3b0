//! HTTP client for the workflow webhooks that apply changes on the ad
//! platform.
//!
//! Every call is a single JSON `POST`. A 2xx answer means the workflow
//! accepted the change; anything else, including a timeout, is a failure the
//! caller must roll back. There are no retries.

use std::time::Duration;

use adsmgr_core::{AppConfig, Rule};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::WebhookError;
use crate::types::{CreateEntityRequest, FieldUpdate, RuleControl, RuleDocument};

/// The three webhook URLs the client posts to.
#[derive(Debug, Clone)]
pub struct WebhookEndpoints {
    pub mutation: String,
    pub create: String,
    pub rules: String,
}

impl WebhookEndpoints {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            mutation: config.mutation_webhook_url.clone(),
            create: config.create_webhook_url.clone(),
            rules: config.rules_webhook_url.clone(),
        }
    }
}

/// Client for the mutation, creation, and rule webhooks.
///
/// Use [`WebhookClient::from_app_config`] in the binaries or
/// [`WebhookClient::new`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    mutation_url: Url,
    create_url: Url,
    rules_url: Url,
    timeout_ms: u64,
}

impl WebhookClient {
    /// Creates a client whose requests are cancelled after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidUrl`] if any endpoint does not parse,
    /// or [`WebhookError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(endpoints: &WebhookEndpoints, timeout: Duration) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("adsmgr/0.1 (ads-manager)")
            .build()?;

        Ok(Self {
            client,
            mutation_url: parse_url(&endpoints.mutation)?,
            create_url: parse_url(&endpoints.create)?,
            rules_url: parse_url(&endpoints.rules)?,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Builds a client from the webhook URLs and timeout in `config`.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, WebhookError> {
        Self::new(
            &WebhookEndpoints::from_app_config(config),
            Duration::from_secs(config.webhook_timeout_secs),
        )
    }

    /// Asks the workflow to change one field of one campaign, adset, or ad.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::Timeout`] if no answer arrives within the timeout.
    /// - [`WebhookError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`WebhookError::Http`] on any other transport failure.
    pub async fn update_field(&self, update: &FieldUpdate) -> Result<(), WebhookError> {
        self.post_json("mutation", &self.mutation_url, update).await?;
        tracing::debug!(
            entity_type = %update.entity_type,
            object = %update.object,
            field = %update.field,
            "mutation webhook accepted update"
        );
        Ok(())
    }

    /// Asks the workflow to create a campaign or adset.
    ///
    /// The request is validated locally first and never sent if invalid.
    ///
    /// # Errors
    ///
    /// [`WebhookError::InvalidRequest`] for a rejected request, otherwise the
    /// same errors as [`WebhookClient::update_field`].
    pub async fn create_entity(&self, request: &CreateEntityRequest) -> Result<(), WebhookError> {
        request.validate()?;
        self.post_json("create", &self.create_url, request).await?;
        tracing::info!(level = %request.level, name = %request.name, "creation webhook accepted request");
        Ok(())
    }

    /// Sends a new automation rule to the rule webhook.
    ///
    /// # Errors
    ///
    /// [`WebhookError::InvalidRequest`] if the rule fails validation,
    /// otherwise the same errors as [`WebhookClient::update_field`].
    pub async fn create_rule(&self, rule: &Rule) -> Result<(), WebhookError> {
        rule.validate()
            .map_err(|e| WebhookError::InvalidRequest(e.to_string()))?;
        let document = RuleDocument::from(rule);
        self.post_json("rules", &self.rules_url, &document).await?;
        tracing::info!(
            rule = %rule.name,
            conditions = document.conditions.len(),
            targets = document.target_ids.len(),
            "rule webhook accepted rule"
        );
        Ok(())
    }

    /// Activates or deactivates an existing rule.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookClient::update_field`], plus
    /// [`WebhookError::InvalidRequest`] for a blank `rule_id`.
    pub async fn set_rule_status(&self, rule_id: &str, is_active: bool) -> Result<(), WebhookError> {
        self.send_rule_control(&RuleControl::Toggle {
            rule_id: rule_id.to_owned(),
            is_active,
        })
        .await
    }

    /// Deletes an existing rule.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookClient::set_rule_status`].
    pub async fn delete_rule(&self, rule_id: &str) -> Result<(), WebhookError> {
        self.send_rule_control(&RuleControl::Delete {
            rule_id: rule_id.to_owned(),
        })
        .await
    }

    async fn send_rule_control(&self, control: &RuleControl) -> Result<(), WebhookError> {
        if control.rule_id().trim().is_empty() {
            return Err(WebhookError::InvalidRequest(
                "rule_id must be non-empty".to_string(),
            ));
        }
        self.post_json("rules", &self.rules_url, control).await?;
        tracing::info!(rule_id = %control.rule_id(), "rule webhook accepted control message");
        Ok(())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        url: &Url,
        body: &T,
    ) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "webhook rejected request");
            return Err(WebhookError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    fn classify(&self, endpoint: &'static str, error: reqwest::Error) -> WebhookError {
        if error.is_timeout() {
            tracing::warn!(endpoint, timeout_ms = self.timeout_ms, "webhook timed out");
            WebhookError::Timeout {
                endpoint,
                timeout_ms: self.timeout_ms,
            }
        } else {
            tracing::warn!(endpoint, error = %error, "webhook request failed");
            WebhookError::Http(error)
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, WebhookError> {
    let url = Url::parse(raw.trim()).map_err(|e| WebhookError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WebhookError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
