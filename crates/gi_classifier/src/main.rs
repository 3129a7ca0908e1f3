use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use gi_classifier::{load_classifier, Scheduler};
use gi_protocol::Config;

/// Classification Scheduler: polls matured Analyses and writes F3 back
/// onto their Candidate (spec §4.4, §6). The `--vocab-size`,
/// `--embed-dim`, `--num-classes` and `--dropout` flags describe the
/// external CNN's architecture and are accepted for launcher
/// compatibility; they select nothing in this process, since the
/// trained model itself is an external collaborator (spec §1, §9).
#[derive(Debug, Parser)]
struct Cli {
    /// Path to the pipeline's JSON configuration file.
    config: PathBuf,
    /// Interface to bind the health-check listener to.
    bind_address: IpAddr,
    /// Port to bind the health-check listener to.
    port: u16,

    /// Path to a classifier checkpoint. Falls back to the config file's
    /// `launcher.es_monitor.classifier`, and then to the deterministic
    /// signature stub if neither resolves.
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// Path to a tokenizer artifact. The tokenizer itself is fixed
    /// (spec §9); this flag exists for launcher-surface parity and is
    /// otherwise unused.
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Comma-separated list of classification target names. Falls back
    /// to the config file's `launcher.es_monitor.signatures`.
    #[arg(long)]
    signatures: Option<String>,

    #[arg(long, default_value_t = 10000)]
    vocab_size: usize,
    #[arg(long, default_value_t = 128)]
    embed_dim: usize,
    #[arg(long, default_value_t = 2)]
    num_classes: usize,
    #[arg(long, default_value_t = 0.5)]
    dropout: f64,

    /// Seconds between scans of `analyzing` candidates.
    #[arg(long, default_value_t = 30)]
    poll_interval: u64,
}

fn main() -> ExitCode {
    gi_logging::init("gi_classifier");

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            return ExitCode::from(1);
        }
    };

    if cli.signatures.is_none() && config.launcher.es_monitor.as_ref().and_then(|m| m.signatures.as_ref()).is_none()
    {
        error!("no --signatures given and none configured in launcher.es_monitor.signatures");
        return ExitCode::from(1);
    }

    info!(
        vocab_size = cli.vocab_size,
        embed_dim = cli.embed_dim,
        num_classes = cli.num_classes,
        dropout = cli.dropout,
        tokenizer = ?cli.tokenizer,
        "classifier architecture flags recorded for launcher compatibility"
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            error!(%err, "failed to start async runtime");
            return ExitCode::from(1);
        }
    };

    let addr = SocketAddr::from((cli.bind_address, cli.port));
    runtime.block_on(async_main(config, cli, addr))
}

async fn async_main(config: Config, cli: Cli, addr: SocketAddr) -> ExitCode {
    let pool = match gi_db::init_pool(&config.sqlalchemy_database_uri).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(%err, "failed to connect to database");
            return ExitCode::from(2);
        }
    };

    let signatures_raw = cli
        .signatures
        .clone()
        .or_else(|| config.launcher.es_monitor.as_ref().and_then(|m| m.signatures.clone()))
        .unwrap_or_default();
    let signatures: Vec<String> = signatures_raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let checkpoint = cli
        .classifier
        .clone()
        .or_else(|| config.launcher.es_monitor.as_ref().and_then(|m| m.classifier.clone()));

    let classifier = Arc::from(load_classifier(checkpoint.as_deref(), signatures));
    let scheduler = Scheduler::new(pool, classifier, Duration::from_secs(cli.poll_interval));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %addr, "failed to bind health listener");
            return ExitCode::from(2);
        }
    };

    info!(%addr, "gi_classifier listening");
    let health = axum::serve(listener, gi_classifier::router());

    tokio::select! {
        result = health => {
            if let Err(err) = result {
                error!(%err, "health server exited with error");
                return ExitCode::from(1);
            }
        }
        _ = scheduler.run() => {}
    }

    ExitCode::SUCCESS
}
