mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use adsmgr_state::{CoordinatorSettings, MutationCoordinator, OptimisticStore};
use adsmgr_webhook::WebhookClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = adsmgr_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting adsmgr-server");

    let pool_config = adsmgr_db::PoolConfig::from_app_config(&config);
    let pool = adsmgr_db::connect_pool(&config.database_url, pool_config).await?;

    let webhooks = WebhookClient::from_app_config(&config)?;
    let store = OptimisticStore::new(Duration::from_secs(config.optimistic_ttl_secs));
    let coordinator = MutationCoordinator::new(
        store.clone(),
        webhooks.clone(),
        CoordinatorSettings::from_app_config(&config),
    );

    let _scheduler = scheduler::build_scheduler(store, config.sweep_interval_secs).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        adsmgr_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            coordinator: Arc::new(coordinator),
            webhooks,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
