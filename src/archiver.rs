use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::CatalogDocument;

/// Serialize a category's catalog to `{output_dir}/{key}.json`, replacing
/// any file from a previous run. The front-end consumes every JSON file in
/// this directory, so the key doubles as the file stem.
pub fn save_catalog(catalog: &CatalogDocument, output_dir: &Path, key: &str) -> Result<PathBuf> {
    let path = output_dir.join(format!("{key}.json"));
    let json = serde_json::to_string_pretty(catalog)?;
    let mut file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
