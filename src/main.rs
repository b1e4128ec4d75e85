use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use voucher_engine::api::{AppState, RunResponse, create_router};
use voucher_engine::config::ConfigLoader;
use voucher_engine::error::EngineError;
use voucher_engine::ingest::CsvDirectoryReader;
use voucher_engine::pipeline::{render_run_summary, resolve_competence, run_pipeline};
use voucher_engine::telemetry::{self, TelemetryError};

const DEFAULT_CONFIG_DIR: &str = "./config/vr_va";

#[derive(Parser, Debug)]
#[command(
    name = "voucher-engine",
    about = "Compute the monthly meal/food voucher benefit from payroll exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline over a directory of CSV exports
    Run(RunArgs),
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory holding the source CSV files
    #[arg(long)]
    data: PathBuf,
    /// Configuration directory (settings.yaml and unions.yaml)
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    config: PathBuf,
    /// Month to process (YYYY-MM or MM.YYYY)
    #[arg(long)]
    competence: Option<String>,
    /// Print the full run outcome as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Configuration directory (settings.yaml and unions.yaml)
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    config: PathBuf,
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode run outcome: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("voucher-engine: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    match Cli::parse().command {
        Command::Run(args) => run_once(args),
        Command::Serve(args) => run_server(args).await,
    }
}

fn run_once(args: RunArgs) -> Result<(), AppError> {
    let config = ConfigLoader::load(&args.config)?;
    let settings = config.settings();
    telemetry::init(&settings.log_level)?;

    let competence = resolve_competence(args.competence.as_deref(), settings)?;
    let reader = CsvDirectoryReader::new(&args.data, settings.source_files.clone());
    let outcome = run_pipeline(&reader, &config, competence);

    let success = outcome.success;
    let failed_stage = outcome.failed_stage;
    let message = outcome.message.clone();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&RunResponse::from(outcome))?);
    } else {
        if let Some(report) = &outcome.report {
            println!("{}", report);
        }
        if let Some(validation) = &outcome.validation {
            for diagnostic in validation.errors() {
                eprintln!(
                    "error [{}] {}: {}",
                    diagnostic.rule,
                    diagnostic.matricula.as_deref().unwrap_or("-"),
                    diagnostic.message
                );
            }
        }
        println!("{}", render_run_summary(&outcome)?);
    }

    if success {
        Ok(())
    } else {
        Err(EngineError::StageFailed {
            stage: failed_stage.map_or_else(|| "pipeline".to_string(), |s| s.to_string()),
            message,
        }
        .into())
    }
}

async fn run_server(args: ServeArgs) -> Result<(), AppError> {
    let config = ConfigLoader::load(&args.config)?;
    telemetry::init(&config.settings().log_level)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let app = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "voucher engine listening");
    axum::serve(listener, app).await?;
    Ok(())
}
