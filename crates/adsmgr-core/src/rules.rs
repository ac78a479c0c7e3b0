use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::ConfigError;

/// Metric a rule condition compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Spend,
    Revenue,
    Sales,
    Profit,
    Clicks,
    Impressions,
    Cpa,
    Cpm,
    Cpc,
    Ctr,
    ClickCv,
    Epc,
    Roas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

/// How a condition chains onto the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: Metric,
    pub operator: Operator,
    pub value: f64,
    #[serde(default)]
    pub logic: Logic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Workflow-side action name, e.g. `"pause"` or `"increase_budget"`.
    pub action_type: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// An "if conditions then action" automation rule.
///
/// Rules are only described here; the remote workflow engine evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub level: EntityType,
    pub conditions: Vec<Condition>,
    pub action: Action,
    pub target_ids: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl Rule {
    /// Check the rule is complete enough to hand to the workflow engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty name, no conditions,
    /// a non-finite threshold, an empty action type, or no targets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "rule name must be non-empty".to_string(),
            ));
        }

        if self.conditions.is_empty() {
            return Err(ConfigError::Validation(format!(
                "rule '{}' needs at least one condition",
                self.name
            )));
        }

        if let Some(c) = self.conditions.iter().find(|c| !c.value.is_finite()) {
            return Err(ConfigError::Validation(format!(
                "rule '{}' has a non-finite threshold for {:?}",
                self.name, c.metric
            )));
        }

        if self.action.action_type.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "rule '{}' has an empty action type",
                self.name
            )));
        }

        if self.target_ids.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "rule '{}' must target at least one {}",
                self.name, self.level
            )));
        }

        Ok(())
    }
}

/// Load and validate a rule definition from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rule(path: &Path) -> Result<Rule, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RuleFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rule: Rule = serde_yaml::from_str(&content)?;
    rule.validate()?;
    Ok(rule)
}
