//! Main Entrypoint for the Train-R Console
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Optionally probing the server's health endpoint.
//! 3. Running a coaching session and relaying stdin to it.
//! 4. Printing connection, transcript and display changes as they arrive.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use train_r_client::{ClientConfig, Session, health};
use train_r_console::{
    args::{Args, Input, parse_input},
    render::Printer,
};

async fn handle_line(session: &Session, line: &str) {
    let pending = session.snapshot().pending_confirmation();
    let result = match parse_input(line, pending.is_some()) {
        Input::Empty => return,
        Input::Answer(confirmed) => match pending {
            Some(pending) => session.respond_to_confirmation(pending.id, confirmed).await,
            None => return,
        },
        Input::Chat(content) => session.send_user_message(content).await,
    };
    if let Err(e) = result {
        eprintln!("! {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let args = Args::parse();
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    args.apply(&mut config)?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!(url = %config.ws_url, policy = ?config.reconnect, "Configuration loaded");

    // --- 3. Health Probe ---
    if args.health {
        let status = health::check(&config.ws_url)
            .await
            .context("Health check failed")?;
        println!("{} {} ({})", status.service, status.version, status.status);
        if !status.is_healthy() {
            anyhow::bail!("Server reported status '{}'", status.status);
        }
        return Ok(());
    }

    // --- 4. Run the Session ---
    let session = Session::spawn(config.ws_url.as_str(), config.reconnect);
    let mut state = session.subscribe();
    let mut printer = Printer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let initial = printer.update(&state.borrow_and_update());
    for line in initial {
        println!("{}", line);
    }

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let output = printer.update(&state.borrow_and_update());
                for line in output {
                    println!("{}", line);
                }
            }
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => handle_line(&session, &line).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal. Closing session...");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
