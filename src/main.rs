use anyhow::Result;
use candisync::api::BackendClient;
use candisync::notify::ToastHub;
use candisync::store::Store;
use candisync::{config, derive, followup, temporal};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let client = BackendClient::new(cfg.base_url()?, cfg.backend.token.clone());
    let hub = Arc::new(ToastHub::new(Duration::from_secs(cfg.app.toast_ttl_seconds)));
    let store = Arc::new(Store::new(Arc::new(client), hub.clone()));

    info!("loading applications");
    store.load().await?;

    let now = Utc::now();
    for app in store.applications() {
        println!(
            "#{} {} — {} [{}] relances {}% — {}",
            app.id,
            app.job_title,
            app.company.name,
            temporal::format_display_date(Some(app.applied_at.date_naive())),
            followup::progress(&app),
            derive::display_state(&app),
        );
    }

    let stats = store.stats(now);
    println!(
        "{} candidatures, {} avec relance en retard, {} relances effectuées",
        stats.total, stats.pending_follow_ups, stats.done_follow_ups
    );

    Ok(())
}
