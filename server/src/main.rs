use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use todo_server::config::{AppConfig, CliOverrides};

/// Todo server - REST API over a single todo collection
#[derive(Parser)]
#[command(name = "todo-server")]
#[command(about = "Todo server - REST API over a single todo collection")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON snapshot file for persistence (overrides config)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and storage
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        host: cli.host.clone(),
        port: cli.port,
        data_file: cli.data_file.clone(),
        verbose: cli.verbose,
    });
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    todo_server::logging::init_logging(&config.logging)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let service = todo_server::service_from_config(&config).await?;
    let router = todo_server::build_app(service, &config.server);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        base_path = %config.server.base_path,
        storage = ?config.storage.path,
        "todo server listening"
    );

    todo_server::serve(listener, router, shutdown_signal()).await?;
    tracing::info!("todo server stopped");
    Ok(())
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let service = todo_server::service_from_config(&config).await?;
    let count = service.list().await?.len();
    println!("Configuration check passed ({count} todos in storage)");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
