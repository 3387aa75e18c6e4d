mod archiver;
mod config;
mod fetcher;
mod images;
mod models;
mod parser;
mod walker;

use std::fs;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ScrapeConfig;
use crate::fetcher::HttpFetcher;
use crate::models::CatalogDocument;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neotech_product_archiver=info".into()),
        )
        .init();

    let cfg = ScrapeConfig::default();
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("failed to create {}", cfg.output_dir.display()))?;
    fs::create_dir_all(&cfg.images_dir)
        .with_context(|| format!("failed to create {}", cfg.images_dir.display()))?;

    let fetcher =
        HttpFetcher::new(cfg.request_timeout).context("failed to build the http client")?;

    info!("starting product scrape of {}", cfg.base_url);

    let mut total = 0usize;
    for category in config::categories() {
        let result = walker::scrape_category(&fetcher, category, &cfg);
        let count = result.products.len();

        let catalog = CatalogDocument {
            category_type: category.category_type.to_string(),
            description: category.description.to_string(),
            scraped_at: chrono::Utc::now().to_rfc3339(),
            data: result.products,
        };
        let path = archiver::save_catalog(&catalog, &cfg.output_dir, category.key)?;
        info!("saved {count} products to {}", path.display());

        total += count;
    }

    info!("scraping complete, {total} products extracted");
    Ok(())
}
