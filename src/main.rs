use std::sync::Arc;

use adscampaign::auth::HostedAuthClient;
use adscampaign::config::AppConfig;
use adscampaign::error::Result;
use adscampaign::server::{AppState, build_router};
use adscampaign::store::LibSqlBackend;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export ADSCAMPAIGN_AUTH_URL=https://<project>.supabase.co");
            eprintln!("  export ADSCAMPAIGN_AUTH_ANON_KEY=<anon key>");
            std::process::exit(1);
        }
    };

    eprintln!("📣 AdsCampaign v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Auth: {}", config.auth.url);
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    let db = match LibSqlBackend::new_local(&config.db_path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            eprintln!(
                "Error: Failed to open database at {}: {}",
                config.db_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    eprintln!("   Database: {}\n", config.db_path.display());

    let auth = Arc::new(HostedAuthClient::new(&config.auth));
    let app = build_router(AppState::new(auth, db));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
