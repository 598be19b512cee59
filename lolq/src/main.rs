mod config;

use clap::Parser;
use config::{Config, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short)]
    config: PathBuf,

    /// Apply database migrations and exit.
    #[arg(long)]
    migrate: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_metrics(config: &MetricsConfig) {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some("lolq"));
    match recorder {
        Ok(recorder) => {
            if let Err(err) = metrics::set_global_recorder(recorder) {
                warn!("could not install the statsd recorder: {err}");
            }
        }
        Err(err) => warn!("could not build the statsd recorder: {err}"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("could not install the SIGINT handler: {err}");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("could not install the SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!("could not load {}: {err}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    if let Some(metrics) = &config.common.metrics {
        init_metrics(metrics);
    }

    // Request handling is I/O bound; a single-threaded runtime is enough.
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("could not start the runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.migrate {
        runtime.block_on(gateway::migrate(&config.gateway.database))
    } else {
        runtime.block_on(gateway::run(config.gateway, shutdown_signal()))
    };

    match result {
        Ok(()) => {
            info!("gateway stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("gateway failed: {err}");
            ExitCode::FAILURE
        }
    }
}
