use server::config::{self, env_value};
use server::db::{self, AppState};
use server::{auth, health, openapi, telemetry};

#[tokio::main]
async fn main() {
    // Load .env if present; deployments set variables directly.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();
    config::load_feature_flags();
    if config::feature_flags().telemetry {
        telemetry::init_telemetry();
    }
    health::record_start_time();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server stopped with an error");
        telemetry::shutdown_telemetry();
        std::process::exit(1);
    }

    telemetry::shutdown_telemetry();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = db::store_from_env().await?;
    auth::bootstrap_admin(&store).await?;

    let state = AppState::new(store);
    let app = openapi::build_router(state);

    let addr = env_value("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
