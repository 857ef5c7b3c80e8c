use clap::{Parser, Subcommand};
use civic::error::{ErrorKind, Result};
use civic_config::Config;
use civic_fetch::DocumentSource;
use exn::ResultExt;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to `config.toml` in
    /// the platform configuration directory, if present.
    #[arg(short, long, global = true, env = "CIVIC_CONFIG")]
    config: Option<PathBuf>,
    /// More logging; repeat for more.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON API.
    Serve {
        /// Address to listen on, overriding `server.bind`.
        #[arg(short, long)]
        bind: Option<std::net::SocketAddr>,
    },
    /// Fetch the source page once and print the extracted regions as JSON.
    Fetch,
    /// Extract regions from a saved copy of the source page and print them as JSON.
    Extract {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    civic::logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %*err, "Command failed");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { bind } => serve(&load_config(cli.config.as_deref())?, bind).await,
        Command::Fetch => fetch(&load_config(cli.config.as_deref())?).await,
        Command::Extract { file } => extract(&file).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).or_raise(|| ErrorKind::Config)
}

async fn serve(config: &Config, bind: Option<std::net::SocketAddr>) -> Result<()> {
    let addr = bind.unwrap_or(config.server.bind);
    let cache = Arc::new(civic::cache(config)?);
    let listener = TcpListener::bind(addr).await.or_raise(|| ErrorKind::Bind(addr))?;
    tracing::info!(source = %config.source.url, "Starting civic v{}", env!("CARGO_PKG_VERSION"));
    civic::server::serve(listener, cache, shutdown_signal()).await
}

async fn fetch(config: &Config) -> Result<()> {
    let source = civic::source(config)?;
    let document = source.fetch().await.or_raise(|| ErrorKind::Fetch)?;
    let regions = civic_extract::extract(&document.body).or_raise(|| ErrorKind::Extract)?;
    print_json(&regions)
}

async fn extract(file: &Path) -> Result<()> {
    let html = tokio::fs::read_to_string(file).await.or_raise(|| ErrorKind::Read(file.to_path_buf()))?;
    let regions = civic_extract::extract(&html).or_raise(|| ErrorKind::Extract)?;
    print_json(&regions)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).or_raise(|| ErrorKind::Output)?;
    writeln!(stdout).or_raise(|| ErrorKind::Output)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Could not listen for Ctrl-C; shut down by other means");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
