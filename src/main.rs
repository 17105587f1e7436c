//! feed-aggregator CLI — drives the feed engine from a terminal.
//!
//! Loads page 1, prints the feed, switches polling on, then reads commands
//! from stdin (see [`input::HELP`]).  Every state change published by the
//! orchestrator is printed as a status line plus the newest items.

mod input;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_aggregator::{Config, FeedOrchestrator, FeedState, HttpSourceClient};
use input::{parse_command, Command, HELP};

/// How many items are printed after each update.
const PREVIEW_LEN: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feed_aggregator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // -- configuration -------------------------------------------------------
    let config = Config::from_env(std::env::args().nth(1)).context("Failed to load configuration")?;
    tracing::info!(base_url = %config.api_base_url, "configuration loaded");

    let client = Arc::new(HttpSourceClient::new(&config.api_base_url, config.api_token.clone()));
    let orchestrator = FeedOrchestrator::new(client, config.feed);
    let poll_interval = orchestrator.config().poll_interval;

    // -- print every published snapshot --------------------------------------
    let printer = tokio::spawn(print_updates(orchestrator.subscribe()));

    orchestrator.load_first_page().await;
    orchestrator.start_polling(poll_interval);
    print_polling(&orchestrator);
    println!("{HELP}");

    // -- command loop --------------------------------------------------------
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let Some(cmd) = parse_command(&line) else {
            if !line.trim().is_empty() {
                println!("unknown command: {}  ({HELP})", line.trim());
            }
            continue;
        };
        match cmd {
            Command::Refresh => orchestrator.load_first_page().await,
            Command::LoadMore => orchestrator.load_more().await,
            Command::Poll(interval) => {
                orchestrator.start_polling(interval.unwrap_or(poll_interval));
                print_polling(&orchestrator);
            }
            Command::StopPolling => {
                orchestrator.stop_polling();
                print_polling(&orchestrator);
            }
            Command::Help => {
                print_polling(&orchestrator);
                println!("{HELP}");
            }
            Command::Quit => break,
        }
    }

    orchestrator.stop_polling();
    printer.abort();
    Ok(())
}

fn print_polling(orchestrator: &FeedOrchestrator) {
    match orchestrator.poll_interval() {
        Some(interval) => println!("polling every {}s", interval.as_secs_f32()),
        None => println!("polling off"),
    }
}

async fn print_updates(mut updates: watch::Receiver<FeedState>) {
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        // Loading flips are noise on a line-oriented terminal.
        if state.is_loading || state.is_loading_more {
            continue;
        }
        print_state(&state);
    }
}

fn print_state(state: &FeedState) {
    let status = match (&state.error, state.items.is_empty()) {
        (Some(err), true) => format!("error: {err}"),
        (Some(err), false) => format!("stale ({err}); 'r' to retry"),
        (None, true) => "no items".to_string(),
        (None, false) => "ok".to_string(),
    };
    println!(
        "── {status} │ {} items │ page {} │ {}",
        state.items.len(),
        state.last_page,
        if state.has_more { "more available" } else { "end of feed" },
    );

    for item in state.items.iter().take(PREVIEW_LEN) {
        let date = item
            .effective_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "no date".into());
        let recent = if item.is_recent { "*" } else { " " };
        println!("{recent} {date:<16}  {:<10} {}  {}", item.source_type.tag(), item.title, item.link_url);
    }
}
