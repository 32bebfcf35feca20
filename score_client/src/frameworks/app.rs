use std::io;
use std::time::Instant;

use tokio::signal;
use tokio::time::{Duration, interval};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::feed::ConnectionStatus;
use crate::domain::leaderboard::{LeaderboardView, optional_stat};
use crate::frameworks::config;
use crate::interface_adapters::clients::scores::ScoreQueryClient;
use crate::net::channel::{ChannelSettings, connect};
use crate::use_cases::registry::RegistryHandle;

/// One-time process setup: environment, logging, panic reporting. Call this
/// before anything else in main.
pub fn init_runtime() {
    // Load .env if present; ignore absence.
    let _ = dotenvy::dotenv();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(%info, "panic\n{backtrace}");
    }));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if use_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Watches one game's leaderboard until Ctrl-C: seeds the board from the
/// REST API, then keeps it current from the push feed.
pub async fn run() -> io::Result<()> {
    let game = config::watch_game();
    let api = ScoreQueryClient::new(config::api_base_url(), config::query_timeout())
        .map_err(io::Error::other)?;
    let feed_url = config::feed_url().map_err(io::Error::other)?;

    let mut view = LeaderboardView::new(game.clone());
    let initial = api
        .top_scores(&game, 10)
        .await
        .map_err(|error| error.to_string());
    view.seed_from_query(initial);
    render(&view, ConnectionStatus::Connecting, None);

    let (channel, inbound) = connect(feed_url, ChannelSettings::default());
    let status_rx = channel.status();
    let registry = RegistryHandle::spawn(channel, inbound);
    registry.subscribe(game.clone()).await;

    watch_loop(&game, &mut view, &registry, status_rx).await;

    registry.stop().await;
    info!("score client stopped");
    Ok(())
}

async fn watch_loop(
    game: &str,
    view: &mut LeaderboardView,
    registry: &RegistryHandle,
    mut status_rx: tokio::sync::watch::Receiver<ConnectionStatus>,
) {
    let mut state_rx = registry.state();
    let mut redraw = interval(Duration::from_secs(1));
    let mut last_update_id = None;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutting down");
                return;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                let state = state_rx.borrow_and_update().clone();
                if let Some(snapshot) = state.snapshot(game) {
                    view.apply_snapshot(game, snapshot);
                }
                if let Some(update) = &state.latest_update {
                    if last_update_id != Some(update.id) {
                        last_update_id = Some(update.id);
                        view.note_score_update(update, Instant::now());
                    }
                }
                render(view, *status_rx.borrow(), state.last_error.as_deref());
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                let status = *status_rx.borrow_and_update();
                info!(?status, "feed status changed");
                render(view, status, registry.snapshot().last_error.as_deref());
            }
            _ = redraw.tick() => {
                // Keep redrawing while a highlight is fading out.
                if view.highlight_at(Instant::now()).is_some() {
                    render(view, *status_rx.borrow(), None);
                }
            }
        }
    }
}

fn render(view: &LeaderboardView, status: ConnectionStatus, error: Option<&str>) {
    let now = Instant::now();
    println!();
    println!("{} leaderboard", view.game_name());
    println!("feed: {:?}  data: {:?}", status, view.source());
    println!(
        "{:>4}  {:<16} {:>10} {:>7} {:>6}",
        "rank", "player", "score", "kills", "wins"
    );
    for (index, entry) in view.entries().iter().enumerate() {
        let marker = if view.is_highlighted(entry, now) {
            '*'
        } else {
            ' '
        };
        println!(
            "{:>4}{} {:<16} {:>10} {:>7} {:>6}",
            index + 1,
            marker,
            entry.player_name,
            entry.score,
            optional_stat(entry.kills),
            optional_stat(entry.wins),
        );
    }
    if let Some(error) = error {
        println!("notice: {error}");
    }
}
