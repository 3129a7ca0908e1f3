use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use gi_hypervisor::{FleetManager, StaleRowWatchdog, VmTaskPool};
use gi_protocol::Config;
use gi_sandbox_service::reclaim::AnalysisStore;
use gi_sandbox_service::AppState;

/// Sandbox Service: owns sample intake, encryption-at-rest, and
/// analysis-VM dispatch (spec §4.2, §6).
#[derive(Debug, Parser)]
struct Cli {
    /// Path to the pipeline's JSON configuration file.
    config: std::path::PathBuf,
    /// Interface to bind the HTTP listener to.
    bind_address: IpAddr,
    /// Port to bind the HTTP listener to.
    port: u16,
}

fn main() -> ExitCode {
    gi_logging::init("gi_sandbox_service");

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            return ExitCode::from(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            error!(%err, "failed to start async runtime");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(async_main(config, cli.bind_address, cli.port))
}

async fn async_main(config: Config, bind_address: IpAddr, port: u16) -> ExitCode {
    let config = Arc::new(config);

    let pool = match gi_db::init_pool(&config.sqlalchemy_database_uri).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(%err, "failed to connect to database");
            return ExitCode::from(2);
        }
    };

    let driver = gi_hypervisor::driver_from_config(&config);
    let task_pool = Arc::new(VmTaskPool::new(driver.clone()));

    let fleet = FleetManager::new(driver);
    let reset_pool = pool.clone();
    if let Err(err) = fleet
        .init_all(&config.vms, || async move { Ok(gi_db::analyses::reset_non_terminal(&reset_pool).await?) })
        .await
    {
        error!(%err, "fleet initialization failed");
        return ExitCode::from(2);
    }

    let watchdog = StaleRowWatchdog::new(
        AnalysisStore { pool: pool.clone() },
        Arc::new(config.vms.clone()),
        Arc::clone(&task_pool),
        config.vm_timeout(),
        "analysis VM did not report within VM_TIMEOUT, reclaiming",
    );
    tokio::spawn(watchdog.run());

    let state = AppState { pool, config, task_pool };
    let app = gi_sandbox_service::router(state);

    let addr = SocketAddr::from((bind_address, port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %addr, "failed to bind listener");
            return ExitCode::from(2);
        }
    };

    info!(%addr, "gi_sandbox_service listening");
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    if let Err(err) = serve.await {
        error!(%err, "server exited with error");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
