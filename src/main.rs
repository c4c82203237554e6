use anyhow::{Context, Result};
use chrono::DateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use onair::board::{self, Board};
use onair::cli::{parse_args, print_help};
use onair::clock::{Clock, SystemClock};
use onair::config::Config;
use onair::fetch::Fetcher;
use onair::render::render;
use onair::store::ScheduleStore;

/// How long --once waits for the weekday documents before printing what it has
const ONCE_SETTLE_GRACE: Duration = Duration::from_secs(5);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("onair=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("onair v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Schedule: {}", config.schedule_base_url);
    info!("  Time zone: {}", config.timezone);
    info!("  Fetch timeout: {}s", config.fetch_timeout_secs);

    if args.validate {
        info!("Validating configuration...");
        match config.validate() {
            Ok(()) => {
                info!("Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    // An --at instant is checked before any request goes out
    let at = args
        .at
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("--at '{}' is not an RFC 3339 timestamp", raw))
                .map(|t| t.with_timezone(&config.timezone))
        })
        .transpose()?;

    let config = Arc::new(config);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));
    let store = ScheduleStore::new();
    let fetcher = Arc::new(Fetcher::new(Arc::clone(&config), store.clone())?);

    let cancel = CancellationToken::new();
    let fetch_handle = tokio::spawn(Arc::clone(&fetcher).run(cancel.clone()));

    if args.once {
        if tokio::time::timeout(ONCE_SETTLE_GRACE, store.wait_settled())
            .await
            .is_err()
        {
            warn!("Schedule still loading after {:?}; printing what arrived", ONCE_SETTLE_GRACE);
        }
        let now = at.unwrap_or_else(|| clock.now());
        println!("{}", render(&board::view_at(&store.snapshot(), &now)));
        cancel.cancel();
        return Ok(());
    }

    let board = Arc::new(Board::new(clock, store));
    let mut view_rx = board.subscribe();

    let runner = Arc::clone(&board);
    let board_cancel = cancel.clone();
    let board_handle = tokio::spawn(async move { runner.run(board_cancel).await });

    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = render(&view_rx.borrow_and_update());
                println!("{}\n", text);
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    cancel.cancel();
    if let Err(e) = board_handle.await {
        error!("Board task failed: {}", e);
    }
    if let Err(e) = fetch_handle.await {
        error!("Fetch task failed: {}", e);
    }

    Ok(())
}
