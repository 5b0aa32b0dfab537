//! Remote slide access.
//!
//! [`SlideSource`] is the seam between the pipeline and the network: the
//! length search only needs a cheap presence check, the fetcher needs the
//! body. [`HttpSlideSource`] implements both against `GET/HEAD <base><index>`.

use crate::error::{SlideError, SlidesError};
use crate::link::slide_url;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Access to the numbered slides of one presentation.
#[async_trait]
pub trait SlideSource: Send + Sync {
    /// Whether slide `index` exists.
    ///
    /// `Ok(false)` means the server answered and the slide is absent.
    /// `Err` is a transport problem and is worth retrying.
    async fn probe(&self, index: usize) -> Result<bool, SlideError>;

    /// Body of slide `index`.
    async fn fetch(&self, index: usize) -> Result<String, SlideError>;
}

/// [`SlideSource`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSlideSource {
    client: reqwest::Client,
    base_link: String,
}

impl HttpSlideSource {
    /// Build a source for `base_link` (as returned by [`crate::normalize_link`]).
    pub fn new(base_link: impl Into<String>, timeout: Duration) -> Result<Self, SlidesError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SlidesError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(base_link, client))
    }

    /// Reuse an existing client (shared connection pool across jobs).
    pub fn with_client(base_link: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_link: base_link.into(),
        }
    }

    pub fn base_link(&self) -> &str {
        &self.base_link
    }
}

#[async_trait]
impl SlideSource for HttpSlideSource {
    async fn probe(&self, index: usize) -> Result<bool, SlideError> {
        let url = slide_url(&self.base_link, index);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| SlideError::from_reqwest(index, &e))?;
        debug!("HEAD {} -> {}", url, response.status());
        Ok(response.status().is_success())
    }

    async fn fetch(&self, index: usize) -> Result<String, SlideError> {
        let url = slide_url(&self.base_link, index);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SlideError::from_reqwest(index, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlideError::Status {
                index,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SlideError::from_reqwest(index, &e))?;
        if body.trim().is_empty() {
            return Err(SlideError::EmptyBody { index });
        }
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }
}
