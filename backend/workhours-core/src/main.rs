// src/main.rs
use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workhours_core::api::{router, AppState};
use workhours_core::auth::issue_token;
use workhours_core::config::Config;
use workhours_core::counters::PlaceholderCounters;
use workhours_core::scheduler::{AutoApproveJob, SnapshotTarget};
use workhours_core::snapshot;
use workhours_core::{DashboardService, InMemoryTimeEntryStore, SystemClock};

#[derive(Parser)]
#[command(name = "workhours", version, about = "Work-hours auto-approval and dashboard summary service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard API and run the scheduled auto-approval (default)
    Serve,
    /// Run one auto-approval pass over every user's entries in a CSV snapshot
    AutoApprove {
        #[arg(long, env = "DATA_FILE")]
        data_file: PathBuf,
    },
    /// Print a bearer token signed with JWT_SECRET, for local testing
    IssueToken {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 8)]
        hours: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::AutoApprove { data_file } => auto_approve_once(data_file).await,
        Command::IssueToken { user, hours } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let token = issue_token(
                &user,
                config.jwt_secret_bytes(),
                chrono::Duration::hours(hours),
            )
            .context("Failed to sign token")?;
            println!("{}", token);
            Ok(())
        }
    }
}

fn dashboard_for(store: &InMemoryTimeEntryStore) -> DashboardService {
    DashboardService::new(
        Arc::new(store.clone()),
        Arc::new(SystemClock),
        Arc::new(PlaceholderCounters),
    )
}

fn open_store(data_file: Option<&Path>) -> Result<InMemoryTimeEntryStore> {
    match data_file {
        Some(path) if path.exists() => snapshot::load_store(path)
            .with_context(|| format!("Failed to load time entries from {}", path.display())),
        Some(path) => {
            warn!(
                "Data file {} does not exist yet; starting with an empty store",
                path.display()
            );
            Ok(InMemoryTimeEntryStore::new())
        }
        None => {
            info!("No DATA_FILE configured; time entries live in memory only");
            Ok(InMemoryTimeEntryStore::new())
        }
    }
}

async fn serve() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded.");

    let store = open_store(config.data_file.as_deref())?;
    let snapshot_target = config.data_file.clone().map(|path| SnapshotTarget {
        store: store.clone(),
        path,
    });
    let dashboard = dashboard_for(&store);

    // Periodic global approval, same rule as the request path
    let job = AutoApproveJob::new(dashboard.clone(), snapshot_target.clone());
    tokio::spawn(job.run_every(config.auto_approve_interval()));

    let state = AppState {
        dashboard,
        config: Arc::new(config.clone()),
    };
    let app = router(state);

    match config.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .context("Failed to load TLS cert/key")?;
            let addr: SocketAddr = config
                .bind_address()
                .parse()
                .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(StdDuration::from_secs(10)));
            });

            info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            let addr = config.bind_address();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server failed")?;
        }
    }

    if let Some(target) = snapshot_target {
        snapshot::save_store(&target.store, &target.path)
            .await
            .context("Failed to save time entries on shutdown")?;
    }
    info!("Server stopped.");
    Ok(())
}

async fn auto_approve_once(data_file: PathBuf) -> Result<()> {
    let store = snapshot::load_store(&data_file)
        .with_context(|| format!("Failed to load time entries from {}", data_file.display()))?;
    let job = AutoApproveJob::new(
        dashboard_for(&store),
        Some(SnapshotTarget {
            store,
            path: data_file,
        }),
    );
    job.run_once().await.context("Auto-approval failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
