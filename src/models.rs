use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One product as stored in a category's catalog file.
///
/// Field names are part of the contract with the storefront front-end that
/// consumes the JSON output; `fullDescription` stays camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "fullDescription")]
    pub full_description: String,
    pub price: String,
    pub code: String,
    pub availability: bool,
    pub specifications: BTreeMap<String, String>,
}

/// The per-category JSON document, one file per configured category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "type")]
    pub category_type: String,
    pub description: String,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: String,
    pub data: Vec<ProductRecord>,
}
