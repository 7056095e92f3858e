use std::{env, net::SocketAddr};

use anyhow::Context;
use clap::Parser;
use colored::*;
use config_engine::{ClinicConfig, ConfigLoader, StorageBackend};
use tracing::info;

use clinic_server::{create_app, ClinicServer};

/// Clinic Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(about = "Reception, insurance and billing HTTP API for outpatient clinics")]
struct Args {
    /// Server bind address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Server port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = "clinic.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Keep all data in memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

impl Args {
    fn apply(&self, config: &mut ClinicConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if self.in_memory {
            config.database.backend = StorageBackend::Memory;
            config.database.run_migrations = false;
        }
        if env::var("CLINIC_ENV").is_ok_and(|value| value == "production") {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new()
        .with_file(&args.config)
        .with_dotenv(true)
        .load()
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    args.apply(&mut config);
    config.validate()?;

    logger_redacted::init_tracing(&config.logging)?;
    if !config.logging.json {
        print_startup_banner(&config);
    }

    info!("🏥 {}", "Starting Clinic Engine HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid bind address {}:{}", config.server.host, config.server.port)
        })?;

    let server = ClinicServer::from_config(config).await?;
    let db_pool = server.db_pool.clone();
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 {}", format!("Clinic Engine server running on http://{}", addr).bright_green());
    info!("📋 {}", format!("Health check available at: http://{}/health", addr).bright_blue());
    info!("📋 {}", format!("API v1 available at: http://{}/api/v1", addr).bright_blue());
    info!("📖 {}", format!("API docs available at: http://{}/swagger-ui", addr).bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_startup_banner(config: &ClinicConfig) {
    let storage = match config.database.backend {
        StorageBackend::Postgres => "PostgreSQL",
        StorageBackend::Memory => "in-memory",
    };
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                      🏥 CLINIC ENGINE                        ║".bright_cyan());
    println!("{}", "║            Reception, Insurance and Billing API              ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!("  {} {}", "Clinic:".bright_white(), config.clinic.name);
    println!("  {} {}", "Storage:".bright_white(), storage.bright_yellow());
    println!();
}
