/// Portrait downloads
///
/// Fetches a resolved portrait URL and checks that the payload really is
/// an image before handing it to the renderer. Requests never carry a
/// Referer header; the thumbnail proxy answers 403 to requests that do.

use iced::widget::image::Handle;
use thiserror::Error;
use tokio::task;

use crate::state::config::PortraitConfig;

const USER_AGENT: &str = concat!("pairing-generator/", env!("CARGO_PKG_VERSION"));

/// Any reason a portrait could not be shown
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("not a decodable image: {0}")]
    Decode(String),
    #[error("decode task failed: {0}")]
    Join(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PortraitFetcher {
    client: reqwest::Client,
}

impl PortraitFetcher {
    pub fn new(config: &PortraitConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .referer(false)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Build the GET request for `url` without sending it
    pub fn request(&self, url: &str) -> Result<reqwest::Request, FetchError> {
        Ok(self.client.get(url).build()?)
    }

    /// Download and validate one portrait
    pub async fn fetch(self, url: String) -> Result<Handle, FetchError> {
        let request = self.request(&url)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;

        // Decoding is CPU-bound, keep it off the UI executor
        let bytes = task::spawn_blocking(move || {
            image::load_from_memory(&bytes)
                .map(|_| bytes)
                .map_err(|e| FetchError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| FetchError::Join(e.to_string()))??;

        Ok(Handle::from_bytes(bytes))
    }
}
