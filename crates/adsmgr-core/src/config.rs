use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let mutation_webhook_url = require("ADSMGR_MUTATION_WEBHOOK_URL")?;
    let create_webhook_url = require("ADSMGR_CREATE_WEBHOOK_URL")?;
    let rules_webhook_url = require("ADSMGR_RULES_WEBHOOK_URL")?;

    let env = parse_environment(&or_default("ADSMGR_ENV", "development"))?;

    let bind_addr = parse_addr("ADSMGR_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ADSMGR_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("ADSMGR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ADSMGR_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADSMGR_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("ADSMGR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let webhook_timeout_secs = parse_u64("ADSMGR_WEBHOOK_TIMEOUT_SECS", "3")?;
    let optimistic_ttl_secs = parse_u64("ADSMGR_OPTIMISTIC_TTL_SECS", "420")?;
    let sweep_interval_secs = parse_u64("ADSMGR_SWEEP_INTERVAL_SECS", "30")?;
    if sweep_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADSMGR_SWEEP_INTERVAL_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    let settle_delay_ms = parse_u64("ADSMGR_SETTLE_DELAY_MS", "2000")?;
    let budget_confirm_multiplier =
        parse_multiplier(&or_default("ADSMGR_BUDGET_CONFIRM_MULTIPLIER", "4"))?;
    let user = or_default("ADSMGR_USER", "adsmgr-cli");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        mutation_webhook_url,
        create_webhook_url,
        rules_webhook_url,
        webhook_timeout_secs,
        optimistic_ttl_secs,
        sweep_interval_secs,
        settle_delay_ms,
        budget_confirm_multiplier,
        user,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADSMGR_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

fn parse_multiplier(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "ADSMGR_BUDGET_CONFIRM_MULTIPLIER".to_string(),
        reason,
    };
    let value = raw.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() || value <= 1.0 {
        return Err(invalid(format!("must be a finite number above 1, got {raw}")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
