//! Poster artwork verification.
//!
//! A poster counts as loadable when it downloads with a success status within
//! the size limit and decodes as an image. Verification never fails: every
//! error class collapses to `false`.

use async_trait::async_trait;
use marquee_core::{MarqueeConfig, MarqueeError};
use tracing::{debug, trace};
use url::Url;

/// Checks whether poster artwork actually loads.
#[async_trait]
pub trait PosterVerifier: Send + Sync + std::fmt::Debug {
    /// Resolves `true` if the poster at `poster_url` loads and decodes.
    async fn verify(&self, poster_url: &str) -> bool;
}

/// Result of loading one poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterCheck {
    /// The image decoded successfully.
    Loaded {
        /// Decoded width in pixels
        width: u32,
        /// Decoded height in pixels
        height: u32,
    },
    /// The image could not be loaded.
    Failed(PosterFailure),
}

impl PosterCheck {
    /// Whether the poster loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, PosterCheck::Loaded { .. })
    }
}

/// Why a poster failed to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosterFailure {
    /// Not an absolute http(s) URL.
    #[error("invalid poster URL: {0}")]
    InvalidUrl(String),

    /// The request failed before a response arrived.
    #[error("poster request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("poster server answered HTTP {0}")]
    Status(u16),

    /// The body exceeded the configured size limit.
    #[error("poster exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// The body is not a decodable image.
    #[error("poster could not be decoded: {0}")]
    Undecodable(String),
}

/// Poster verifier that downloads and decodes the image.
#[derive(Debug, Clone)]
pub struct HttpPosterValidator {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpPosterValidator {
    /// Creates a validator from the poster section of `config`.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Http` - The HTTP client could not be built
    pub fn new(config: &MarqueeConfig) -> Result<Self, MarqueeError> {
        let client = reqwest::Client::builder()
            .timeout(config.poster.request_timeout)
            .user_agent(config.api.user_agent)
            .build()
            .map_err(|e| MarqueeError::Http {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_bytes: config.poster.max_bytes,
        })
    }

    /// Loads the poster and reports what happened.
    pub async fn check(&self, poster_url: &str) -> PosterCheck {
        match self.load(poster_url).await {
            Ok((width, height)) => {
                trace!(poster_url, width, height, "Poster loaded");
                PosterCheck::Loaded { width, height }
            }
            Err(failure) => {
                debug!(poster_url, %failure, "Poster failed to load");
                PosterCheck::Failed(failure)
            }
        }
    }

    async fn load(&self, poster_url: &str) -> Result<(u32, u32), PosterFailure> {
        let url = Url::parse(poster_url).map_err(|e| PosterFailure::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PosterFailure::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PosterFailure::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PosterFailure::Status(status.as_u16()));
        }

        let limit = self.max_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(PosterFailure::TooLarge { limit });
        }

        // Content-Length may be absent or wrong, so the limit is enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PosterFailure::Request(e.to_string()))?
        {
            if body.len() + chunk.len() > limit {
                return Err(PosterFailure::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        tokio::task::spawn_blocking(move || {
            image::load_from_memory(&body).map(|decoded| (decoded.width(), decoded.height()))
        })
        .await
        .map_err(|e| PosterFailure::Undecodable(format!("decoder task failed: {e}")))?
        .map_err(|e| PosterFailure::Undecodable(e.to_string()))
    }
}

#[async_trait]
impl PosterVerifier for HttpPosterValidator {
    async fn verify(&self, poster_url: &str) -> bool {
        self.check(poster_url).await.is_loaded()
    }
}
