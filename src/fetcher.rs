use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, redirect};
use thiserror::Error;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Seam between the pipeline and the network. The walker and the image
/// downloader only see this trait, so tests can feed them canned pages.
pub trait Fetch {
    fn page(&self, url: &str) -> Result<String, FetchError>;
    fn bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let redirect_policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > 10 {
                attempt.error("too many redirects (>10)")
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        Ok(resp)
    }
}

impl Fetch for HttpFetcher {
    fn page(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url)?.text()?)
    }

    fn bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.get(url)?.bytes()?.to_vec())
    }
}
