//! JSON bodies accepted by the mutation, creation, and rule webhooks.

use std::collections::BTreeMap;

use adsmgr_core::options::validate_placements;
use adsmgr_core::{EntityType, Logic, Metric, MutationField, Operator, Rule};
use serde::{Deserialize, Serialize};

use crate::error::WebhookError;

/// Body of a single field change: `{ user, type, object, field, value }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// Identity of the person or tool issuing the change.
    pub user: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Platform id of the campaign, adset, or ad.
    pub object: String,
    pub field: MutationField,
    pub value: serde_json::Value,
}

/// Body of a campaign or adset creation request.
///
/// `campaign_id` is required for adsets; `daily_budget` is omitted when the
/// budget lives elsewhere in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEntityRequest {
    pub name: String,
    pub level: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publisher_platforms: Vec<String>,
    /// Entries of the form `"<platform>:<placement>"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDocument {
    pub metric: Metric,
    pub operator: Operator,
    pub value: f64,
    pub logic: Logic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleActionDocument {
    pub action_type: String,
    pub params: serde_json::Map<String, serde_json::Value>,
    pub order: u32,
}

/// Rule as the workflow engine expects it: conditions and actions keyed by
/// their position as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub name: String,
    pub is_active: bool,
    pub level: EntityType,
    pub conditions: BTreeMap<String, ConditionDocument>,
    pub actions: BTreeMap<String, RuleActionDocument>,
    pub target_ids: Vec<String>,
}

impl From<&Rule> for RuleDocument {
    fn from(rule: &Rule) -> Self {
        let conditions = rule
            .conditions
            .iter()
            .enumerate()
            .map(|(index, c)| {
                (
                    index.to_string(),
                    ConditionDocument {
                        metric: c.metric,
                        operator: c.operator,
                        value: c.value,
                        logic: c.logic,
                    },
                )
            })
            .collect();

        let mut actions = BTreeMap::new();
        actions.insert(
            "0".to_string(),
            RuleActionDocument {
                action_type: rule.action.action_type.clone(),
                params: rule.action.params.clone(),
                order: 0,
            },
        );

        Self {
            name: rule.name.clone(),
            is_active: rule.is_active,
            level: rule.level,
            conditions,
            actions,
            target_ids: rule
                .target_ids
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}

/// Control message for an existing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RuleControl {
    Toggle { rule_id: String, is_active: bool },
    Delete { rule_id: String },
}

impl RuleControl {
    #[must_use]
    pub fn rule_id(&self) -> &str {
        match self {
            RuleControl::Toggle { rule_id, .. } | RuleControl::Delete { rule_id } => rule_id,
        }
    }
}

impl CreateEntityRequest {
    /// Reject requests the creation workflow would refuse anyway.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidRequest`] for a blank name, an `ad`
    /// level, an adset without a parent campaign, a budget that is not a
    /// positive finite number, or an unknown platform/placement.
    pub fn validate(&self) -> Result<(), WebhookError> {
        if self.name.trim().is_empty() {
            return Err(WebhookError::InvalidRequest(
                "name must be non-empty".to_string(),
            ));
        }

        match self.level {
            EntityType::Campaign => {}
            EntityType::Adset => {
                if self.campaign_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                    return Err(WebhookError::InvalidRequest(
                        "an adset needs a campaign_id".to_string(),
                    ));
                }
            }
            EntityType::Ad => {
                return Err(WebhookError::InvalidRequest(
                    "only campaigns and adsets can be created".to_string(),
                ));
            }
        }

        if let Some(budget) = self.daily_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(WebhookError::InvalidRequest(format!(
                    "daily_budget must be a positive number, got {budget}"
                )));
            }
        }

        validate_placements(&self.publisher_platforms, &self.placements)
            .map_err(|e| WebhookError::InvalidRequest(e.to_string()))
    }
}
