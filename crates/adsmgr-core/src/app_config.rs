use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Endpoint receiving `{ user, type, object, field, value }` field updates.
    pub mutation_webhook_url: String,
    /// Endpoint creating campaigns and adsets.
    pub create_webhook_url: String,
    /// Workflow webhook accepting rule documents and rule control messages.
    pub rules_webhook_url: String,
    pub webhook_timeout_secs: u64,
    /// Maximum age of an optimistic overlay before it is ignored.
    pub optimistic_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Wait after a successful mutation before callers refetch rows.
    pub settle_delay_ms: u64,
    /// New budgets at or above `current * multiplier` need explicit confirmation.
    pub budget_confirm_multiplier: f64,
    /// Actor identity sent with mutations issued by the CLI.
    pub user: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("mutation_webhook_url", &"[redacted]")
            .field("create_webhook_url", &"[redacted]")
            .field("rules_webhook_url", &"[redacted]")
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("optimistic_ttl_secs", &self.optimistic_ttl_secs)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("budget_confirm_multiplier", &self.budget_confirm_multiplier)
            .field("user", &self.user)
            .finish()
    }
}
