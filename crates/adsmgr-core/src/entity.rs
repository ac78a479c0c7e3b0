use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics::DerivedMetrics;
use crate::ConfigError;

/// An ad-platform object that can be mutated through the webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Campaign,
    Adset,
    Ad,
}

impl EntityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Campaign => "campaign",
            EntityType::Adset => "adset",
            EntityType::Ad => "ad",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "campaign" => Ok(EntityType::Campaign),
            "adset" => Ok(EntityType::Adset),
            "ad" => Ok(EntityType::Ad),
            other => Err(ConfigError::Validation(format!(
                "entity type must be campaign, adset, or ad, got '{other}'"
            ))),
        }
    }
}

/// Drill-down level of the dashboard hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Account,
    Campaign,
    Adset,
    Ad,
}

impl Level {
    /// The mutable entity type at this level; accounts cannot be mutated.
    #[must_use]
    pub fn entity_type(self) -> Option<EntityType> {
        match self {
            Level::Account => None,
            Level::Campaign => Some(EntityType::Campaign),
            Level::Adset => Some(EntityType::Adset),
            Level::Ad => Some(EntityType::Ad),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Account => "account",
            Level::Campaign => "campaign",
            Level::Adset => "adset",
            Level::Ad => "ad",
        }
    }
}

impl From<EntityType> for Level {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Campaign => Level::Campaign,
            EntityType::Adset => Level::Adset,
            EntityType::Ad => Level::Ad,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "account" => Ok(Level::Account),
            "campaign" => Ok(Level::Campaign),
            "adset" => Ok(Level::Adset),
            "ad" => Ok(Level::Ad),
            other => Err(ConfigError::Validation(format!(
                "level must be account, campaign, adset, or ad, got '{other}'"
            ))),
        }
    }
}

/// Field that the mutation webhook knows how to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationField {
    Status,
    Budget,
    Objective,
}

impl MutationField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MutationField::Status => "status",
            MutationField::Budget => "budget",
            MutationField::Objective => "objective",
        }
    }

    /// Name of the [`AggregatedEntity`] field an overlay for this mutation replaces.
    #[must_use]
    pub fn entity_field(self) -> &'static str {
        match self {
            MutationField::Status => "status",
            MutationField::Budget => "daily_budget",
            MutationField::Objective => "objective",
        }
    }
}

impl std::fmt::Display for MutationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "status" => Ok(MutationField::Status),
            "budget" => Ok(MutationField::Budget),
            "objective" => Ok(MutationField::Objective),
            other => Err(ConfigError::Validation(format!(
                "field must be status, budget, or objective, got '{other}'"
            ))),
        }
    }
}

/// Report rows summed under one name at one [`Level`].
///
/// Identity fields come from the first row seen for the name; the additive
/// metrics cover every matching row in the requested range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntity {
    /// Slug of the display name, stable across fetches.
    pub id: String,
    /// Platform identifier passed to the mutation webhook.
    pub real_id: String,
    /// Ad id of the first contributing row; preferred optimistic-overlay key.
    pub first_ad_id: Option<String>,
    pub level: Level,
    pub name: String,
    pub status: Option<String>,
    pub is_adset_level_budget: bool,
    pub daily_budget: Option<f64>,
    pub account_name: Option<String>,
    pub campaign_name: Option<String>,
    pub adset_name: Option<String>,
    pub spend: f64,
    pub revenue: f64,
    pub sales: i64,
    pub profit: f64,
    pub clicks: i64,
    pub impressions: i64,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

impl AggregatedEntity {
    /// Key under which optimistic overlays for this entity are stored.
    #[must_use]
    pub fn overlay_key(&self) -> &str {
        self.first_ad_id.as_deref().unwrap_or(&self.real_id)
    }

    /// Returns `true` when the finalized status reads as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("active"))
    }
}
