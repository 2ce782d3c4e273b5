//! Expiry Cache - interactive demo
//!
//! Reads `key=value` (default TTL) or `key=value@ttl_ms` lines from stdin into
//! a cache that prints every expired entry as `key: value`. On Ctrl+C, SIGTERM
//! or end of input the cache is shut down and drained.

use std::time::Duration;

use anyhow::{bail, Context};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiry_cache::expire::println_on_expire;
use expiry_cache::{Cache, Config, Shutdown};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
struct SetCommand {
    key: String,
    value: String,
    ttl: Option<Duration>,
}

/// Main entry point for the expiry cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache with a printing expire callback
/// 4. Feed stdin lines into the cache until input ends or a signal arrives
/// 5. Trigger shutdown and wait for the cache to drain
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiry_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::try_from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: default_ttl={:?}, drain_timeout={:?}",
        config.default_ttl, config.drain_timeout
    );

    let shutdown = Shutdown::new();
    let cache = Cache::<String>::builder()
        .default_ttl(config.default_ttl)
        .on_expire(println_on_expire())
        .shutdown(shutdown.signal())
        .build()?;

    tokio::select! {
        result = feed_stdin(&cache) => {
            result?;
            info!("End of input, initiating shutdown...");
        }
        _ = shutdown_signal() => {}
    }

    let remaining = cache.len().await;
    shutdown.trigger();
    info!(remaining, "Shutdown triggered, draining cache");

    if tokio::time::timeout(config.drain_timeout, cache.done())
        .await
        .is_err()
    {
        warn!("Cache did not drain within {:?}", config.drain_timeout);
    }

    let stats = cache.stats().await;
    info!(
        inserts = stats.inserts,
        updates = stats.updates,
        removals = stats.removals(),
        "Shutdown complete"
    );
    Ok(())
}

/// Reads commands from stdin until end of input.
///
/// Stdin is read on a detached thread so a pending read never holds up
/// runtime shutdown after a signal.
async fn feed_stdin(cache: &Cache<String>) -> anyhow::Result<()> {
    let (tx, mut lines) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    while let Some(line) = lines.recv().await {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(SetCommand {
                key,
                value,
                ttl: Some(ttl),
            }) => cache.set_with_ttl(key, value, ttl).await,
            Ok(SetCommand { key, value, ttl: None }) => cache.set(key, value).await,
            Err(err) => warn!("Skipping line {:?}: {}", line, err),
        }
    }

    Ok(())
}

/// Parses `key=value` or `key=value@ttl_ms`.
fn parse_line(line: &str) -> anyhow::Result<SetCommand> {
    let Some((key, rest)) = line.split_once('=') else {
        bail!("expected key=value");
    };
    if key.is_empty() {
        bail!("empty key");
    }

    let (value, ttl) = match rest.rsplit_once('@') {
        Some((value, ttl_ms)) => {
            let ttl_ms: u64 = ttl_ms
                .parse()
                .with_context(|| format!("invalid ttl {:?}", ttl_ms))?;
            (value, Some(Duration::from_millis(ttl_ms)))
        }
        None => (rest, None),
    };

    Ok(SetCommand {
        key: key.to_string(),
        value: value.to_string(),
        ttl,
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
