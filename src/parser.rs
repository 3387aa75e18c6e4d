use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::models::ProductRecord;

/// Placeholder price for products the shop lists without one ("contact us").
const CONTACT_PRICE: &str = "საკონტაქტო";

const DESCRIPTION_LIMIT: usize = 200;
const MAX_IMAGE_CANDIDATES: usize = 5;

/// The shop renders product templates inconsistently, so no single selector
/// is authoritative. Each field gets an ordered chain of strategies; the
/// first one producing a non-empty value wins.
enum Strategy {
    /// Text of the first element matching a CSS selector.
    Selector(&'static str),
    /// First capture group of a pattern run over the page's flattened text.
    Pattern(&'static Lazy<Regex>),
}

impl Strategy {
    fn apply(&self, doc: &Html) -> Option<String> {
        match self {
            Strategy::Selector(css) => {
                let selector = Selector::parse(css).ok()?;
                doc.select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty())
            }
            Strategy::Pattern(re) => re
                .captures(&page_text(doc))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }
}

fn first_match(doc: &Html, chain: &[Strategy]) -> Option<String> {
    chain.iter().find_map(|strategy| strategy.apply(doc))
}

static NAME_STRATEGIES: &[Strategy] = &[
    Strategy::Selector("h1"),
    Strategy::Selector(".ty-product-block-title"),
    Strategy::Selector(".ty-mainbox-title"),
    Strategy::Selector("[itemprop='name']"),
];

static PRICE_STRATEGIES: &[Strategy] = &[
    Strategy::Selector(".ty-price-num"),
    Strategy::Selector(".cm-reload-price"),
    Strategy::Selector("[itemprop='price']"),
    Strategy::Selector(".ty-price span"),
];

static DESCRIPTION_STRATEGIES: &[Strategy] = &[
    Strategy::Selector(".ty-product-block__description"),
    Strategy::Selector(".ty-wysiwyg-content"),
    Strategy::Selector("[itemprop='description']"),
    Strategy::Selector(".ty-product-block p"),
];

static FULL_DESCRIPTION_STRATEGIES: &[Strategy] = &[
    Strategy::Selector("#content_description"),
    Strategy::Selector(".ty-product-block__description-full"),
    Strategy::Selector(".product-description"),
];

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"კოდი:\s*(\d+)").unwrap());

static CODE_STRATEGIES: &[Strategy] = &[Strategy::Pattern(&CODE_RE)];

/// The shop mixes Georgian and English stock labels.
const AVAILABILITY_MARKERS: &[&str] = &["გაყიდვაშია", "In Stock"];

static SPEC_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".ty-product-feature, .ty-features-list__item, .cm-features-list li").unwrap()
});
static SPEC_LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".ty-features-list__item-label, .ty-product-feature__label, .ty-product-feature span:first-child",
    )
    .unwrap()
});
static SPEC_VALUE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".ty-features-list__item-value, .ty-product-feature__value, .ty-product-feature span:last-child",
    )
    .unwrap()
});

static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

const IMAGE_SRC_ATTRS: &[&str] = &["data-src", "src", "data-large-image"];
const EXCLUDED_IMAGE_HINTS: &[&str] = &["placeholder", "logo", "icon"];
const PRODUCT_IMAGE_PATHS: &[&str] = &["/detailed/", "/thumbnails/", "/images/"];

/// Outcome of extracting one product page. `Skipped` keeps the category walk
/// going without advancing the ordinal; the caller decides how to log it.
pub enum Extraction {
    Extracted(Box<ExtractedProduct>),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "no product name found"),
        }
    }
}

/// A parsed product plus the image URLs still to be downloaded.
pub struct ExtractedProduct {
    pub record: ProductRecord,
    pub image_urls: Vec<String>,
}

/// Extract a product from a loaded detail page. `index` is the 1-based
/// ordinal within the category and becomes part of the record id.
pub fn parse_product(doc: &Html, index: usize) -> Extraction {
    let Some(raw_name) = first_match(doc, NAME_STRATEGIES) else {
        return Extraction::Skipped(SkipReason::MissingName);
    };

    let name = clean_text(&raw_name);
    let text = page_text(doc);

    let description = first_match(doc, DESCRIPTION_STRATEGIES)
        .map(|d| truncate_chars(&clean_text(&d), DESCRIPTION_LIMIT))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| name.clone());
    let full_description = first_match(doc, FULL_DESCRIPTION_STRATEGIES)
        .map(|d| clean_text(&d))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| description.clone());

    let record = ProductRecord {
        id: product_id(&name, index),
        description,
        full_description,
        price: first_match(doc, PRICE_STRATEGIES)
            .map(|p| clean_text(&p))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| CONTACT_PRICE.to_string()),
        code: first_match(doc, CODE_STRATEGIES).unwrap_or_default(),
        availability: AVAILABILITY_MARKERS
            .iter()
            .any(|marker| text.contains(marker)),
        specifications: extract_specifications(doc),
        name,
    };

    Extraction::Extracted(Box::new(ExtractedProduct {
        image_urls: extract_image_urls(doc),
        record,
    }))
}

fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect::<String>()
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-based, not byte-based: most of the scraped text is Georgian.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Slug the name and append the 1-based ordinal within the category. Unique
/// per category document; not unique across categories.
fn product_id(name: &str, index: usize) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect();
    format!("{slug}-{index}")
}

/// Specification rows come in a few alternate markup shapes; label and value
/// sub-elements are paired within each row.
fn extract_specifications(doc: &Html) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();
    for row in doc.select(&SPEC_ROW_SELECTOR) {
        let label = row
            .select(&SPEC_LABEL_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>());
        let value = row
            .select(&SPEC_VALUE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>());
        if let (Some(label), Some(value)) = (label, value) {
            let key = clean_text(&label).replace(':', "");
            let value = clean_text(&value);
            if !key.is_empty() && !value.is_empty() {
                specs.insert(key, value);
            }
        }
    }
    specs
}

/// Candidate product image URLs in document order, deduplicated, capped at
/// five. Placeholders, logos and icons are filtered out, and only URLs under
/// image-bearing path segments qualify.
fn extract_image_urls(doc: &Html) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for img in doc.select(&IMG_SELECTOR) {
        if urls.len() == MAX_IMAGE_CANDIDATES {
            break;
        }
        let Some(src) = IMAGE_SRC_ATTRS
            .iter()
            .find_map(|attr| img.value().attr(attr))
        else {
            continue;
        };
        if EXCLUDED_IMAGE_HINTS.iter().any(|hint| src.contains(hint)) {
            continue;
        }
        if !PRODUCT_IMAGE_PATHS
            .iter()
            .any(|segment| src.contains(segment))
        {
            continue;
        }
        if !urls.iter().any(|existing| existing == src) {
            urls.push(src.to_string());
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, index: usize) -> ExtractedProduct {
        let doc = Html::parse_document(html);
        match parse_product(&doc, index) {
            Extraction::Extracted(product) => *product,
            Extraction::Skipped(reason) => panic!("expected a product, got skip: {reason}"),
        }
    }

    #[test]
    fn cleans_whitespace_runs() {
        assert_eq!(clean_text("  Lorex   Camera \n 4K  "), "Lorex Camera 4K");
    }

    #[test]
    fn generates_slugged_ordinal_id() {
        assert_eq!(
            product_id("Lorex 4K Dome Camera!!", 3),
            "lorex-4k-dome-camera-3"
        );
    }

    #[test]
    fn slug_is_capped_at_fifty_chars() {
        let name = "a".repeat(80);
        let id = product_id(&name, 12);
        assert_eq!(id, format!("{}-12", "a".repeat(50)));
    }

    #[test]
    fn name_prefers_earlier_strategies() {
        let product = extract(
            r#"<html><body>
                <h1>  Lorex   Dome </h1>
                <div class="ty-product-block-title">Other Name</div>
            </body></html>"#,
            1,
        );
        assert_eq!(product.record.name, "Lorex Dome");
        assert_eq!(product.record.id, "lorex-dome-1");
    }

    #[test]
    fn name_falls_through_empty_candidates() {
        let product = extract(
            r#"<html><body>
                <h1>   </h1>
                <div class="ty-mainbox-title">Hikvision NVR</div>
            </body></html>"#,
            2,
        );
        assert_eq!(product.record.name, "Hikvision NVR");
    }

    #[test]
    fn missing_name_is_skipped() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        match parse_product(&doc, 1) {
            Extraction::Skipped(SkipReason::MissingName) => {}
            _ => panic!("expected MissingName skip"),
        }
    }

    #[test]
    fn missing_price_gets_contact_placeholder() {
        let product = extract("<html><body><h1>Camera</h1></body></html>", 1);
        assert_eq!(product.record.price, CONTACT_PRICE);
    }

    #[test]
    fn code_and_availability_come_from_page_text() {
        let product = extract(
            r#"<html><body>
                <h1>Camera</h1>
                <div>კოდი: 44172</div>
                <div>გაყიდვაშია</div>
            </body></html>"#,
            1,
        );
        assert_eq!(product.record.code, "44172");
        assert!(product.record.availability);
    }

    #[test]
    fn english_stock_marker_counts() {
        let product = extract(
            "<html><body><h1>Camera</h1><span>In Stock</span></body></html>",
            1,
        );
        assert!(product.record.availability);
    }

    #[test]
    fn absent_markers_mean_unavailable() {
        let product = extract("<html><body><h1>Camera</h1></body></html>", 1);
        assert!(!product.record.availability);
        assert_eq!(product.record.code, "");
    }

    #[test]
    fn description_falls_back_to_name() {
        let product = extract("<html><body><h1>Camera</h1></body></html>", 1);
        assert_eq!(product.record.description, "Camera");
        assert_eq!(product.record.full_description, "Camera");
    }

    #[test]
    fn full_description_falls_back_to_short() {
        let product = extract(
            r#"<html><body>
                <h1>Camera</h1>
                <div class="ty-product-block__description">Short blurb</div>
            </body></html>"#,
            1,
        );
        assert_eq!(product.record.description, "Short blurb");
        assert_eq!(product.record.full_description, "Short blurb");
    }

    #[test]
    fn short_description_is_truncated() {
        let long = "x".repeat(300);
        let html = format!(
            r#"<html><body><h1>Camera</h1>
                <div class="ty-product-block__description">{long}</div>
            </body></html>"#
        );
        let product = extract(&html, 1);
        assert_eq!(product.record.description.chars().count(), 200);
        // no dedicated full-description block, so it inherits the short one
        assert_eq!(product.record.full_description, product.record.description);
    }

    #[test]
    fn specifications_pair_labels_and_values() {
        let product = extract(
            r#"<html><body>
                <h1>Camera</h1>
                <div class="ty-features-list__item">
                    <span class="ty-features-list__item-label">Resolution:</span>
                    <span class="ty-features-list__item-value">4K</span>
                </div>
                <div class="ty-product-feature">
                    <span>Weight</span>
                    <span>1.2 kg</span>
                </div>
            </body></html>"#,
            1,
        );
        assert_eq!(
            product.record.specifications.get("Resolution"),
            Some(&"4K".to_string())
        );
        assert_eq!(
            product.record.specifications.get("Weight"),
            Some(&"1.2 kg".to_string())
        );
    }

    #[test]
    fn image_urls_are_filtered_deduped_and_capped() {
        let product = extract(
            r#"<html><body>
                <h1>Camera</h1>
                <img src="/images/logo.png">
                <img src="/images/detailed/placeholder.jpg">
                <img data-src="/images/detailed/a.jpg" src="/images/thumbnails/tiny-a.jpg">
                <img src="/images/detailed/a.jpg">
                <img src="/banners/promo.jpg">
                <img src="/images/detailed/b.jpg">
                <img src="/images/detailed/c.jpg">
                <img src="/images/detailed/d.jpg">
                <img src="/images/detailed/e.jpg">
                <img src="/images/detailed/f.jpg">
            </body></html>"#,
            1,
        );
        assert_eq!(
            product.image_urls,
            vec![
                "/images/detailed/a.jpg",
                "/images/detailed/b.jpg",
                "/images/detailed/c.jpg",
                "/images/detailed/d.jpg",
                "/images/detailed/e.jpg",
            ]
        );
    }
}
