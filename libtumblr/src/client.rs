//! Signed GET requests against the Tumblr v2 API
//!
//! Every call re-derives the signing context from the current credentials,
//! filters the caller's parameters against the endpoint allow-list and
//! repackages the JSON body into a [`RequestEnvelope`]. The HTTP status is
//! logged but never turned into an error: a JSON error body is still a
//! normal envelope.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::credentials::CredentialManager;
use crate::endpoints::Endpoint;
use crate::error::{Result, TumblrError};
use crate::types::{Method, Params, RequestEnvelope};

/// Build the request part of the URL: path without surrounding slashes,
/// plus `/?query` when any parameter is left.
pub fn request_path(path: &str, params: &Params) -> String {
    let path = path.trim_matches('/');
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}/?{}", path, params.to_query())
    }
}

#[derive(Debug)]
pub struct TumblrClient {
    credentials: CredentialManager,
    http: reqwest::Client,
    base_url: String,
}

impl TumblrClient {
    /// Create a client against the configured API root.
    ///
    /// No timeout is set on the HTTP client; reqwest's default applies,
    /// which lets a stalled connection block indefinitely.
    pub fn new(credentials: CredentialManager, config: &Config) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
            base_url: normalize_base(&config.api.base_url),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request and normalize the response.
    ///
    /// `method` is the HTTP verb as text; only `GET` is executed.
    #[instrument(skip(self, params, allowed))]
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        params: &Params,
        allowed: &[&str],
    ) -> Result<RequestEnvelope> {
        if path.trim_matches('/').is_empty() {
            return Err(TumblrError::InvalidArgument(
                "request path cannot be empty".to_string(),
            ));
        }
        let signer = self.credentials.validate()?;
        let method: Method = method.parse()?;

        let params = params.filtered(allowed);
        let request = request_path(path, &params);

        match method {
            Method::Get => {
                let url = format!("{}{}", self.base_url, request);
                let header = signer.sign("GET", &url, params.pairs())?;

                debug!(%request, "Sending GET");
                let response = self
                    .http
                    .get(&url)
                    .header(reqwest::header::AUTHORIZATION, header)
                    .send()
                    .await?;

                let status = response.status();
                debug!(status = status.as_u16(), "Received response");

                let body = response.text().await?;
                let body: serde_json::Value = serde_json::from_str(&body)?;
                RequestEnvelope::from_body(request, body)
            }
            other => Err(TumblrError::UnsupportedMethod(other.to_string())),
        }
    }

    async fn get(&self, endpoint: Endpoint, params: &Params) -> Result<RequestEnvelope> {
        self.request("GET", &endpoint.path, params, endpoint.allowed)
            .await
    }

    /// Blog info, or the authenticated user's info when `blog` is empty.
    pub async fn info(&self, blog: &str) -> Result<RequestEnvelope> {
        self.get(Endpoint::info(blog), &Params::new()).await
    }

    pub async fn likes(&self, blog: &str, params: &Params) -> Result<RequestEnvelope> {
        self.get(Endpoint::likes(blog), params).await
    }

    pub async fn following(&self, blog: &str, params: &Params) -> Result<RequestEnvelope> {
        self.get(Endpoint::following(blog), params).await
    }

    pub async fn dashboard(&self, params: &Params) -> Result<RequestEnvelope> {
        self.get(Endpoint::dashboard(), params).await
    }

    /// Posts of `blog`; an empty `post_type` lists every type.
    pub async fn posts(
        &self,
        blog: &str,
        post_type: &str,
        params: &Params,
    ) -> Result<RequestEnvelope> {
        self.get(Endpoint::posts(blog, post_type)?, params).await
    }
}

fn normalize_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
