use std::time::Duration;

use reqwest::{header, redirect::Policy, StatusCode};

use crate::models::{NewLink, ShortenedLink};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("redirect without a usable Location header")]
    MissingLocation,
}

/// Client for another instance's `/urls` API.
#[derive(Debug, Clone)]
pub struct UrlsClient {
    http: reqwest::Client,
    base_url: String,
}

impl UrlsClient {
    /// `base_url` is the instance origin, e.g. "https://sho.rt". A trailing
    /// slash is ignored.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // Redirects are not followed so `resolve` can read the Location.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /urls
    pub async fn list(&self) -> Result<Vec<ShortenedLink>, ClientError> {
        let response = self
            .http
            .get(format!("{}/urls", self.base_url))
            .send()
            .await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    /// POST /urls with a single object. Returns the updated collection.
    pub async fn create(&self, link: &NewLink) -> Result<Vec<ShortenedLink>, ClientError> {
        let response = self
            .http
            .post(format!("{}/urls", self.base_url))
            .json(link)
            .send()
            .await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    /// POST /urls with the whole collection.
    pub async fn replace_all(
        &self,
        links: &[ShortenedLink],
    ) -> Result<Vec<ShortenedLink>, ClientError> {
        let response = self
            .http
            .post(format!("{}/urls", self.base_url))
            .json(links)
            .send()
            .await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    /// GET /:short_id. Returns the redirect target, or `None` when the
    /// instance answers 404.
    pub async fn resolve(&self, short_id: &str) -> Result<Option<String>, ClientError> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, short_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_redirection() {
            return Err(unexpected(response).await);
        }

        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| Some(s.to_owned()))
            .ok_or(ClientError::MissingLocation)
    }
}

async fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(unexpected(response).await)
    }
}

async fn unexpected(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ClientError::Status { status, body }
}
