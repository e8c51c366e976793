use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signage_pricing::config::Config;
use signage_pricing::pricing::{PolicyRegistry, PolicySet};
use signage_pricing::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let policies = match &config.policy_file {
        Some(path) => PolicyRegistry::from_file(path)
            .with_context(|| format!("Failed to load pricing policies from {}", path.display()))?,
        None => {
            info!("PRICING_POLICY_FILE not set, using built-in policies");
            PolicyRegistry::new(PolicySet::builtin().context("Built-in pricing policies are invalid")?)
        }
    };

    let state = AppState::new(policies.clone());
    let router = app(state, &config.static_dir);

    spawn_policy_reloader(policies);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Reload the policy file on SIGHUP
#[cfg(unix)]
fn spawn_policy_reloader(policies: PolicyRegistry) {
    use tokio::signal::unix::{signal, SignalKind};

    if policies.source().is_none() {
        return;
    }

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGHUP handler: {}", e);
                return;
            }
        };

        while sighup.recv().await.is_some() {
            info!("SIGHUP received, reloading pricing policies");
            if let Err(e) = policies.reload() {
                error!("Failed to reload pricing policies: {}", e);
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_policy_reloader(_policies: PolicyRegistry) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
