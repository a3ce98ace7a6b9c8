use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// A raw-content download failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download({url}): response status code {status} not OK")]
    Status { url: String, status: u16 },
    #[error("download({url}): {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches raw bytes from a URL.
#[async_trait]
pub trait Fetch: Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] implementation backed by a shared reqwest client with a fixed
/// per-request deadline.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("modlicense/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}
