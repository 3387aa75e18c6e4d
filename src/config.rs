use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const BASE_URL: &str = "https://shop.neotech.ge";

/// A storefront category to crawl. The table is fixed for a run; `key` names
/// the output file and `category_type` names the image directory the
/// front-end probes.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub key: &'static str,
    pub source_path: &'static str,
    pub category_type: &'static str,
    pub description: &'static str,
}

impl Category {
    /// Listing URL for the given 1-based page. Page 1 is the bare category
    /// path; later pages carry a `page` query parameter.
    pub fn page_url(&self, base: &Url, page: usize) -> Result<Url, url::ParseError> {
        let mut url = base.join(self.source_path)?;
        if page > 1 {
            url.set_query(Some(&format!("page={page}")));
        }
        Ok(url)
    }
}

pub fn categories() -> &'static [Category] {
    &[
        Category {
            key: "video-cameras",
            source_path: "/cctv-ka/",
            category_type: "video-cameras",
            description: "ვიდეო კამერები",
        },
        Category {
            key: "access-control",
            source_path: "/ka-5/",
            category_type: "access-control",
            description: "დაშვების სისტემები",
        },
        Category {
            key: "ezviz",
            source_path: "/ezviz-ka-ka/",
            category_type: "ezviz",
            description: "EZVIZ - ჭკვიანი სახლი",
        },
        Category {
            key: "ajax",
            source_path: "/ajax/",
            category_type: "ajax",
            description: "AJAX",
        },
        Category {
            key: "monacemta-shemnaxveli",
            source_path: "/storage-devices-ka/",
            category_type: "monacemta-shemnaxveli",
            description: "მონაცემთა შემნახველი",
        },
        Category {
            key: "saxandzro-signalizacia",
            source_path: "/ka-8/",
            category_type: "saxandzro-signalizacia",
            description: "სახანძრო სიგნალიზაცია",
        },
        Category {
            key: "ukabeulo-signalizacia",
            source_path: "/wireless/",
            category_type: "ukabeulo-signalizacia",
            description: "უკაბელო სიგნალიზაცია",
        },
        Category {
            key: "monitorebi",
            source_path: "/ka-3/",
            category_type: "monitorebi",
            description: "მონიტორები",
        },
        Category {
            key: "qseluri-mowyobiloba",
            source_path: "/ka-9/",
            category_type: "qseluri-mowyobiloba",
            description: "ქსელური მოწყობილობები",
        },
        Category {
            key: "kabelebi",
            source_path: "/ka-7/",
            category_type: "kabelebi",
            description: "კაბელები",
        },
    ]
}

/// Run-wide settings, built once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: Url,
    pub output_dir: PathBuf,
    pub images_dir: PathBuf,
    /// Hard cap on listing pages visited per category.
    pub page_cap: usize,
    /// How many of a product's image candidates get downloaded.
    pub images_per_product: usize,
    pub request_timeout: Duration,
    /// Politeness delay between product requests.
    pub product_delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).expect("base url is valid"),
            output_dir: PathBuf::from("src/assets/data"),
            images_dir: PathBuf::from("src/assets/images/data"),
            page_cap: 50,
            images_per_product: 3,
            request_timeout: Duration::from_secs(30),
            product_delay: Duration::from_secs(1),
        }
    }
}
