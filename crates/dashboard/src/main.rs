//! `pizzawatch` -- terminal front end for the pizza detection dashboard.
//!
//! Connects to the detection backend, keeps the statistics, video library
//! and pending detections panels refreshed, and accepts operator commands
//! on stdin:
//!
//! | Command                               | Action                              |
//! |---------------------------------------|-------------------------------------|
//! | `upload <path>`                       | validate and upload a video         |
//! | `stream <filename>`                   | watch the annotated live stream     |
//! | `close`                               | close the stream viewer             |
//! | `feedback <track> correct`            | confirm a pending detection         |
//! | `feedback <track> incorrect`          | reject a pending detection          |
//! | `slider <value>`                      | move the confidence slider          |
//! | `threshold`                           | commit the slider value             |
//! | `classes [id ...]`                    | show, or replace, detection classes |
//! | `dismiss`                             | dismiss the oldest notification     |
//! | `quit`                                | exit                                |
//!
//! Configuration comes from the environment; see
//! [`DashboardConfig::from_env`](pizzawatch_dashboard::DashboardConfig::from_env).

mod console;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pizzawatch_client::DashboardApi;
use pizzawatch_dashboard::{Dashboard, DashboardConfig, DashboardInput};

use console::{parse_command, Command, ConsoleView};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizzawatch_dashboard=info,pizzawatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DashboardConfig::from_env();
    tracing::info!(api_url = %config.api_url, "Starting pizzawatch");

    let api = DashboardApi::new(&config.api_url)
        .with_context(|| format!("invalid backend URL {}", config.api_url))?;
    let dashboard = Dashboard::new(Arc::new(api), Arc::new(ConsoleView), config);
    dashboard.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C received");
                break;
            }
            line = lines.next_line() => line.context("reading stdin")?,
        };
        let Some(line) = line else {
            tracing::info!("stdin closed");
            break;
        };

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Dismiss)) => {
                if let Some(oldest) = dashboard.notifications().active().first() {
                    dashboard.handle(DashboardInput::ToastClicked(oldest.id));
                }
            }
            Ok(Some(Command::Input(input))) => dashboard.handle(input),
            Err(e) => eprintln!("{e}"),
        }
    }

    dashboard.shutdown().await;
    Ok(())
}
