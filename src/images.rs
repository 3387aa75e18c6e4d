use std::fs;
use std::path::Path;

use tracing::warn;
use url::Url;

use crate::fetcher::Fetch;

/// Download a product's images to `{images_dir}/{category_type}/{product_id}/`,
/// naming them `image1.{ext}`, `image2.{ext}`, ... in candidate order. The
/// front-end probes this layout, so it must not change.
///
/// Every failure is logged and swallowed; a product with no images is still a
/// valid product. Returns the filenames that were actually written.
pub fn download_product_images<F: Fetch>(
    fetcher: &F,
    image_urls: &[String],
    base_url: &Url,
    images_dir: &Path,
    category_type: &str,
    product_id: &str,
    limit: usize,
) -> Vec<String> {
    let folder = images_dir.join(category_type).join(product_id);
    let mut saved = Vec::new();

    for (i, candidate) in image_urls.iter().take(limit).enumerate() {
        let url = match base_url.join(candidate) {
            Ok(url) => url,
            Err(err) => {
                warn!("skipping unresolvable image url {candidate}: {err}");
                continue;
            }
        };

        let filename = format!("image{}.{}", i + 1, extension_of(&url));
        match fetcher.bytes(url.as_str()) {
            Ok(bytes) => {
                if let Err(err) = fs::create_dir_all(&folder)
                    .and_then(|_| fs::write(folder.join(&filename), &bytes))
                {
                    warn!("failed to write {}: {err}", folder.join(&filename).display());
                    continue;
                }
                saved.push(filename);
            }
            Err(err) => {
                warn!("failed to download image {url}: {err}");
            }
        }
    }

    saved
}

/// File extension from the URL's final path segment, `jpg` when absent. The
/// query string never reaches here; `Url` keeps it out of the path.
fn extension_of(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_string())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "jpg".to_string())
}
