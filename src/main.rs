use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_gateway::config::GatewayConfig;
use upload_gateway::infrastructure::storage;
use upload_gateway::{AppState, create_app};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the HTTP server (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & Logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Upload Gateway...");

    // 2. Configuration
    let mut config = GatewayConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(
        "🛡️  Config: Max Size={}MB, Signed URL TTL={}s, Staging={}, List all pages={}",
        config.max_file_size / 1024 / 1024,
        config.signed_url_ttl.as_secs(),
        config.staging_dir.display(),
        config.list_all_pages
    );

    // 3. Infrastructure
    let storage_service = storage::setup_storage(&config).await?;
    let state = AppState::new(storage_service, config.clone());
    state.file_service.staging().ensure_dir().await?;

    // 4. HTTP server
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server running at http://localhost:{}", config.port);
    info!("📖 Swagger UI: http://localhost:{}/swagger-ui", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
