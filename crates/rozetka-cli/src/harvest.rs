//! One complete harvest: every category, one session, two CSV files.

use anyhow::Context;
use rozetka_core::AppConfig;
use rozetka_scraper::{Catalog, JitterRange, RetrievalPolicy, Session, TransportSettings};

fn transport_settings(config: &AppConfig) -> TransportSettings {
    TransportSettings {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        proxy_url: config.proxy_url.clone(),
        clearance_cookie: config.clearance_cookie.clone(),
    }
}

fn retrieval_policy(config: &AppConfig) -> RetrievalPolicy {
    RetrievalPolicy::default()
        .with_max_attempts(config.max_attempts)
        .with_pacing(JitterRange::from_millis(
            config.pacing_min_ms,
            config.pacing_max_ms,
        ))
}

/// Harvests all configured categories and writes the product and image files.
///
/// Nothing is written if any category fails; the records gathered so far
/// are discarded.
pub async fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    let started_at = chrono::Local::now().naive_local();
    tracing::info!(started_at = %started_at.format("%H:%M:%S"), "=== harvest run starting ===");

    let categories = rozetka_core::load_categories(&config.categories_path)?;
    if categories.is_empty() {
        tracing::error!(
            path = %config.categories_path.display(),
            "no categories to harvest"
        );
        return Ok(());
    }
    tracing::info!(count = categories.len(), "categories loaded");

    let session = Session::connect(&transport_settings(config), retrieval_policy(config))
        .context("failed to build HTTP session")?;
    let harvest = Catalog::new(&session)
        .harvest(&categories)
        .await
        .context("harvest aborted")?;
    drop(session);

    let products_path =
        rozetka_export::write_products_file(&config.output_dir, started_at, &harvest.products)?;
    rozetka_export::write_images_file(&config.images_file, &harvest.images)?;

    tracing::info!(
        products = harvest.products.len(),
        categories = categories.len(),
        path = %products_path.display(),
        "harvest run finished"
    );
    Ok(())
}
