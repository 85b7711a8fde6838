//! `adgen` -- command-line client for the ad-generation backend.
//!
//! Submits jobs, follows them to completion with a progress display,
//! resumes jobs left pending by an earlier run, and prints the account
//! dashboard. Ctrl-C stops polling; the backend job keeps running.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default                     | Description                        |
//! |------------------------------|----------|-----------------------------|------------------------------------|
//! | `ADGEN_API_URL`              | no       | `http://localhost:8000/api` | Backend base URL                   |
//! | `ADGEN_API_TOKEN`            | no       | --                          | Bearer token for every request     |
//! | `ADGEN_REQUEST_TIMEOUT_SECS` | no       | `30`                        | Per-request timeout                |
//! | `ADGEN_SESSION_FILE`         | no       | `.adgen-session.json`       | Pending jobs and selected product  |
//! | `ADGEN_RESUME_MAX_AGE_MINS`  | no       | `30`                        | Oldest pending job `resume` picks up |
//! | `RUST_LOG`                   | no       | `adgen=info`                | Log filter                         |

mod app;
mod args;
mod config;
mod display;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::args::{Command, USAGE};
use crate::config::CliConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match args::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = CliConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            signal_token.cancel();
        }
    });

    let code = match run(&config, command, shutdown).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(config: &CliConfig, command: Command, shutdown: CancellationToken) -> anyhow::Result<()> {
    let mut app = App::new(config, shutdown)?;
    let outcome = app.run(command).await;
    app.shutdown().await;
    outcome
}
