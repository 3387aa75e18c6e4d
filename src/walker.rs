use std::thread;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, error, info, warn};

use crate::config::{Category, ScrapeConfig};
use crate::fetcher::Fetch;
use crate::images;
use crate::models::ProductRecord;
use crate::parser::{self, Extraction};

static GRID_MARKER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".ty-grid-list__item, .ut2-gl__item").unwrap());

/// Product detail links appear under a handful of markup patterns depending
/// on which grid template the shop renders.
static PRODUCT_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".ty-grid-list__item a.product-title, .ut2-gl__item a.product-title, a.ty-grid-list__item-name",
    )
    .unwrap()
});

static NEXT_PAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".ty-pagination__next, .cm-pagination-next").unwrap());

const DISABLED_CLASSES: &[&str] = &["disabled", "ty-pagination__item--disabled"];

pub struct CategoryResult {
    pub products: Vec<ProductRecord>,
    pub pages_visited: usize,
}

/// Walk a category's listing pages and collect its products in order.
///
/// The walk ends when a page yields no product links, the next-page control
/// is missing or disabled, or the page cap is reached. A listing fetch
/// failure aborts the rest of this category only; whatever was collected so
/// far is returned for the caller to save.
pub fn scrape_category<F: Fetch>(
    fetcher: &F,
    category: &Category,
    cfg: &ScrapeConfig,
) -> CategoryResult {
    info!("scraping category: {}", category.description);

    let mut products: Vec<ProductRecord> = Vec::new();
    let mut pages_visited = 0;

    for page_num in 1..=cfg.page_cap {
        let page_url = match category.page_url(&cfg.base_url, page_num) {
            Ok(url) => url,
            Err(err) => {
                error!("bad listing url for {}: {err}", category.key);
                break;
            }
        };
        info!("page {page_num}: {page_url}");

        let html = match fetcher.page(page_url.as_str()) {
            Ok(html) => html,
            Err(err) => {
                error!(
                    "failed to load page {page_num} of {}: {err}",
                    category.key
                );
                break;
            }
        };
        pages_visited += 1;

        let doc = Html::parse_document(&html);
        if doc.select(&GRID_MARKER_SELECTOR).next().is_none() {
            debug!("no product grid marker on {page_url}, extracting anyway");
        }

        let hrefs = product_urls(&doc);
        info!("found {} products on page {page_num}", hrefs.len());
        if hrefs.is_empty() {
            break;
        }

        for href in hrefs {
            if let Some(record) =
                scrape_product(fetcher, &href, category, cfg, products.len() + 1)
            {
                info!("added: {}", record.name);
                products.push(record);
            }
            thread::sleep(cfg.product_delay);
        }

        if !has_next_page(&doc) {
            break;
        }
    }

    CategoryResult {
        products,
        pages_visited,
    }
}

/// Fetch and extract one product. Any failure here is a per-product skip:
/// the ordinal only advances when a record is actually produced.
fn scrape_product<F: Fetch>(
    fetcher: &F,
    href: &str,
    category: &Category,
    cfg: &ScrapeConfig,
    index: usize,
) -> Option<ProductRecord> {
    let product_url = match cfg.base_url.join(href) {
        Ok(url) => url,
        Err(err) => {
            warn!("skipping unresolvable product url {href}: {err}");
            return None;
        }
    };
    info!("extracting: {product_url}");

    let html = match fetcher.page(product_url.as_str()) {
        Ok(html) => html,
        Err(err) => {
            warn!("failed to load product page {product_url}: {err}");
            return None;
        }
    };

    let doc = Html::parse_document(&html);
    match parser::parse_product(&doc, index) {
        Extraction::Extracted(product) => {
            images::download_product_images(
                fetcher,
                &product.image_urls,
                &cfg.base_url,
                &cfg.images_dir,
                category.category_type,
                &product.record.id,
                cfg.images_per_product,
            );
            Some(product.record)
        }
        Extraction::Skipped(reason) => {
            warn!("skipping {product_url}: {reason}");
            None
        }
    }
}

/// Hrefs of the product links on a listing page, document order, with
/// in-page duplicates suppressed.
fn product_urls(doc: &Html) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for link in doc.select(&PRODUCT_LINK_SELECTOR) {
        if let Some(href) = link.value().attr("href") {
            if !urls.iter().any(|existing| existing == href) {
                urls.push(href.to_string());
            }
        }
    }
    urls
}

fn has_next_page(doc: &Html) -> bool {
    doc.select(&NEXT_PAGE_SELECTOR).next().is_some_and(|next| {
        !DISABLED_CLASSES
            .iter()
            .any(|class| next.value().classes().any(|c| c == *class))
    })
}
