use anyhow::Context;
use clap::Parser;
use record_gateway::{
    api,
    config::{self, Config, StoreBackend},
    gateway::RecordGateway,
    logging,
    store::{MemoryStore, MongoStore},
};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// JSON CRUD service over the `exams` and `students` collections.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// Document store backend, `mongo` or `memory` (overrides `STORE_BACKEND`).
    #[arg(long, value_parser = parse_backend)]
    store: Option<StoreBackend>,
    /// MongoDB connection string (overrides `MONGO_URI`).
    #[arg(long)]
    mongo_uri: Option<String>,
    /// Log file path (overrides `RECORD_GATEWAY_LOG_FILE`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply_to(self, settings: &mut Config) {
        if let Some(port) = self.port {
            settings.server_port = port;
        }
        if let Some(store) = self.store {
            settings.store_backend = store;
        }
        if let Some(uri) = self.mongo_uri {
            settings.mongo_uri = uri;
        }
        if let Some(path) = self.log_file {
            settings.log_file = Some(path);
        }
    }
}

fn parse_backend(value: &str) -> Result<StoreBackend, String> {
    value
        .parse()
        .map_err(|()| format!("unknown store backend '{value}' (expected mongo or memory)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::init_config(|settings| cli.apply_to(settings))
        .context("failed to load configuration")?;
    logging::init_tracing(settings.log_file.as_deref());

    let gateway = Arc::new(RecordGateway::new());
    spawn_store_connection(gateway.clone(), settings);

    let app = api::create_router(gateway);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, settings.server_port))
        .await
        .with_context(|| format!("failed to bind port {}", settings.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", settings.server_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Connect to the configured store in the background and install it once reachable.
///
/// Requests served before installation receive 503. A failed connection is logged and leaves
/// the gateway unready; the process keeps serving so the failure is visible to clients.
fn spawn_store_connection(gateway: Arc<RecordGateway>, settings: &'static Config) {
    tokio::spawn(async move {
        match settings.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                gateway.install_store(Arc::new(MemoryStore::new()));
            }
            StoreBackend::Mongo => {
                tracing::info!(database = %settings.mongo_database, "Connecting to MongoDB");
                match MongoStore::connect(&settings.mongo_uri, &settings.mongo_database).await {
                    Ok(store) => {
                        gateway.install_store(Arc::new(store));
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to connect to MongoDB");
                    }
                }
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
