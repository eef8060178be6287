//! FlightScout - runs one weekend-flight search from the command line.

use flightscout::api::HttpBackend;
use flightscout::config::ClientConfig;
use flightscout::engine::{group_deals, summarize, FavoriteSet, ToastQueue};
use flightscout::job::start_search;
use flightscout::model::{JobStatus, SearchConfig};
use flightscout::store::{SessionStore, SqliteStore};

use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("flightscout=info".parse()?))
        .init();

    let cfg = ClientConfig::load();
    tracing::info!("Using backend at {}", cfg.api_url);
    tracing::info!("Using local state at {}", cfg.state_path);

    let search = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<SearchConfig>(&raw)?
        }
        None => SearchConfig::default(),
    };

    let store = SqliteStore::new(&cfg.state_path)?;
    let favorites = FavoriteSet::load(&store)?;

    let mut backend = HttpBackend::new(&cfg.api_url, cfg.request_timeout)?;
    if let Some(session) = SessionStore::new(&store).load()? {
        tracing::info!("Logged in as {}", session.username);
        backend.set_token(Some(session.token));
    }

    let mut handle = start_search(Arc::new(backend), &search, cfg.poll_interval).await?;
    tracing::info!("Submitted job {}", handle.job_id());

    let mut toasts = ToastQueue::default();
    let mut stopping = false;
    loop {
        tokio::select! {
            Some(n) = handle.notifications.recv() => {
                tracing::info!("New destination: {}, {} from {:.1}€", n.city, n.country, n.price);
                toasts.push(n, Instant::now());
                tracing::debug!("{} toast(s) visible", toasts.len());
            }
            changed = handle.snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let job = handle.snapshots.borrow_and_update().clone();
                tracing::info!(
                    "[{:>3}%] {} ({} deals so far)",
                    job.progress,
                    job.message,
                    job.current_results().len()
                );
                if job.status.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c(), if !stopping => {
                tracing::info!("Interrupted, asking the backend to stop");
                handle.stop().await;
                stopping = true;
            }
        }
    }

    let job = handle.finished().await?;
    if job.status == JobStatus::Cancelled {
        tracing::warn!("Search cancelled, showing results found so far");
    }

    let summary = summarize(&job.results);
    println!(
        "{} deals to {} destinations ({} direct)",
        summary.deals, summary.destinations, summary.direct
    );
    for group in group_deals(&job.results, &favorites) {
        let star = if group.is_favorite { "*" } else { " " };
        println!(
            "{} {:<20} {:<16} {:>8.1}€  {} option(s)",
            star,
            group.city,
            group.country,
            group.min_price,
            group.deals.len()
        );
    }

    Ok(())
}
