pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod entity;
pub mod metrics;
pub mod options;
pub mod report;
pub mod rules;

use thiserror::Error;

pub use aggregate::{aggregate, apply_entity_filter, sort_by_spend, EntityFilter, ParentFilter};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entity::{AggregatedEntity, EntityType, Level, MutationField};
pub use metrics::{DerivedMetrics, Totals};
pub use options::{Platform, PLATFORMS};
pub use report::ReportRow;
pub use rules::{load_rule, Action, Condition, Logic, Metric, Operator, Rule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rule file {path}: {source}")]
    RuleFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule file: {0}")]
    RuleFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
