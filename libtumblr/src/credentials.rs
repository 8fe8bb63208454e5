//! OAuth1 credential lifecycle
//!
//! A [`CredentialManager`] holds the four credential strings, validates
//! them, persists them to a JSON file and runs the three-legged handshake
//! that upgrades a consumer-only set into a fully authenticated one.
//!
//! # Example
//!
//! ```no_run
//! use libtumblr::credentials::{CredentialManager, CredentialSource, StdinAuthorizer, Verbosity};
//!
//! # async fn example() -> libtumblr::error::Result<()> {
//! let mut manager = CredentialManager::new(
//!     CredentialSource::FromFile("tumblr.conf.json".into()),
//!     Verbosity::Quiet,
//! )?;
//!
//! if !manager.state().is_authenticated() {
//!     let path = std::path::PathBuf::from("tumblr.conf.json");
//!     manager
//!         .acquire_tokens(&StdinAuthorizer, Some(&path), Verbosity::Quiet)
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use url::Url;
use zeroize::Zeroize;

use crate::config::OAuthEndpoints;
use crate::error::{CredentialError, Result, TumblrError};
use crate::oauth::OAuthSigner;

/// The four OAuth1 credential strings, in the on-disk key names.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(rename = "oauth_key", default, deserialize_with = "null_as_empty")]
    pub consumer_key: String,
    #[serde(rename = "oauth_key_sec", default, deserialize_with = "null_as_empty")]
    pub consumer_secret: String,
    #[serde(rename = "oauth_token", default, deserialize_with = "null_as_empty")]
    pub access_token: String,
    #[serde(rename = "oauth_token_sec", default, deserialize_with = "null_as_empty")]
    pub access_token_secret: String,
}

/// A `null` field reads the same as an absent one.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CredentialSet {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.consumer_key.is_empty()
            && self.consumer_secret.is_empty()
            && self.access_token.is_empty()
            && self.access_token_secret.is_empty()
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Drop for CredentialSet {
    fn drop(&mut self) {
        self.consumer_secret.zeroize();
        self.access_token_secret.zeroize();
        self.access_token.zeroize();
    }
}

/// Where construction takes its credentials from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    FromArguments(CredentialSet),
    FromFile(PathBuf),
}

impl CredentialSource {
    /// Pick the source the way the command-line tools do: four empty
    /// strings mean "read the file".
    pub fn from_parts(
        consumer_key: &str,
        consumer_secret: &str,
        access_token: &str,
        access_token_secret: &str,
        file: impl Into<PathBuf>,
    ) -> Self {
        let set = CredentialSet::new(
            consumer_key,
            consumer_secret,
            access_token,
            access_token_secret,
        );
        if set.is_empty() {
            CredentialSource::FromFile(file.into())
        } else {
            CredentialSource::FromArguments(set)
        }
    }
}

/// Whether keys and tokens are echoed to stdout after loading or
/// acquiring them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Quiet,
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Consumer pair only; enough to request a token
    RequestOnly,
    /// Full signing with an access token pair
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}

/// Supplies the redirect URL after the user authorizes the application.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, authorization_url: &Url) -> Result<String>;
}

/// Prompts on the console and reads the pasted redirect URL from stdin.
pub struct StdinAuthorizer;

#[async_trait]
impl Authorizer for StdinAuthorizer {
    async fn authorize(&self, authorization_url: &Url) -> Result<String> {
        use std::io::Write;
        use tokio::io::{AsyncBufReadExt, BufReader};

        println!("Please go here and authorize:");
        println!("{}", authorization_url);
        print!("Paste the full redirect url here: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }
}

/// Answers with a redirect URL obtained out of band.
pub struct FixedAuthorizer(pub String);

#[async_trait]
impl Authorizer for FixedAuthorizer {
    async fn authorize(&self, authorization_url: &Url) -> Result<String> {
        tracing::debug!("Using pre-supplied redirect for {}", authorization_url);
        Ok(self.0.clone())
    }
}

pub struct CredentialManager {
    credentials: CredentialSet,
    endpoints: OAuthEndpoints,
    http: reqwest::Client,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("credentials", &self.credentials)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    /// Build a manager from explicit credentials or a credential file.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty file path
    /// - `Io` / `Decode` when the file cannot be read or is not JSON
    /// - `Credential` when the resulting set fails [`validate`](Self::validate)
    pub fn new(source: CredentialSource, verbosity: Verbosity) -> Result<Self> {
        match source {
            CredentialSource::FromFile(path) => Self::load(&path, verbosity),
            CredentialSource::FromArguments(credentials) => {
                let manager = Self::from_set(credentials);
                manager.validate()?;
                manager.reveal_all(verbosity);
                Ok(manager)
            }
        }
    }

    pub(crate) fn from_set(credentials: CredentialSet) -> Self {
        Self {
            credentials,
            endpoints: OAuthEndpoints::default(),
            http: reqwest::Client::new(),
        }
    }

    /// Read credentials from a JSON file; absent fields are empty.
    pub fn load(path: &Path, verbosity: Verbosity) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(TumblrError::InvalidArgument(
                "credential file path cannot be empty".to_string(),
            ));
        }

        tracing::debug!("Loading credentials from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let credentials: CredentialSet = serde_json::from_str(&content)?;

        let manager = Self::from_set(credentials);
        manager.validate()?;
        manager.reveal_all(verbosity);
        Ok(manager)
    }

    /// Use different handshake endpoints than the fixed defaults.
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Replace the whole set. A set that fails validation is rejected and
    /// the current one kept.
    pub fn set_credentials(&mut self, credentials: CredentialSet) -> Result<()> {
        let previous = std::mem::replace(&mut self.credentials, credentials);
        if let Err(e) = self.validate() {
            self.credentials = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Write the four fields as pretty JSON, replacing the file.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.credentials)?;
        json.push('\n');
        std::fs::write(path, json)?;
        tracing::info!("Saved credentials to {}", path.display());
        Ok(())
    }

    /// Check the credential invariants and derive a fresh signing context.
    pub fn validate(&self) -> Result<OAuthSigner> {
        let c = &self.credentials;

        if !c.access_token.is_empty() && (c.consumer_key.is_empty() || c.consumer_secret.is_empty())
        {
            return Err(CredentialError::MissingConsumerKeys.into());
        }
        if c.access_token.is_empty() != c.access_token_secret.is_empty() {
            return Err(CredentialError::IncompleteTokenPair.into());
        }
        if c.consumer_key.is_empty() {
            return Err(CredentialError::EmptyConsumerKey.into());
        }

        Ok(OAuthSigner::new(
            c.consumer_key.as_str(),
            c.consumer_secret.as_str(),
            c.access_token.as_str(),
            c.access_token_secret.as_str(),
        ))
    }

    pub fn state(&self) -> AuthState {
        if !self.credentials.access_token.is_empty() && !self.credentials.access_token_secret.is_empty()
        {
            AuthState::Authenticated
        } else {
            AuthState::RequestOnly
        }
    }

    pub fn keys(&self) -> String {
        format!(
            "Consumer key = {}\nConsumer secret key = {}",
            self.credentials.consumer_key, self.credentials.consumer_secret
        )
    }

    pub fn tokens(&self) -> String {
        format!(
            "OAuth token = {}\nOAuth secret token = {}",
            self.credentials.access_token, self.credentials.access_token_secret
        )
    }

    fn reveal_all(&self, verbosity: Verbosity) {
        if verbosity == Verbosity::Reveal {
            println!("{}", self.keys());
            println!("{}", self.tokens());
        }
    }

    /// Run the three-legged OAuth1 handshake.
    ///
    /// Fetches a request token with the consumer pair, asks `authorizer`
    /// for the redirect URL, extracts its verifier and exchanges it for an
    /// access token pair. The new tokens replace the current ones, are
    /// validated, and are written to `persist_to` when given.
    pub async fn acquire_tokens(
        &mut self,
        authorizer: &dyn Authorizer,
        persist_to: Option<&Path>,
        verbosity: Verbosity,
    ) -> Result<()> {
        let consumer = OAuthSigner::request_only(
            self.credentials.consumer_key.as_str(),
            self.credentials.consumer_secret.as_str(),
        );

        tracing::debug!("Requesting OAuth request token");
        let reply = self
            .token_request(&consumer, &self.endpoints.request_token_url, &[])
            .await?;
        let request_token = form_field(&reply, "oauth_token").ok_or_else(|| {
            CredentialError::Handshake("request token reply has no oauth_token".to_string())
        })?;
        let request_secret = form_field(&reply, "oauth_token_secret").ok_or_else(|| {
            CredentialError::Handshake("request token reply has no oauth_token_secret".to_string())
        })?;

        let authorization_url = Url::parse_with_params(
            &self.endpoints.authorize_url,
            &[("oauth_token", request_token.as_str())],
        )?;
        let redirect = authorizer.authorize(&authorization_url).await?;
        let verifier = parse_verifier(&redirect)?;

        tracing::debug!("Exchanging verifier for access token");
        let temporary = OAuthSigner::new(
            self.credentials.consumer_key.as_str(),
            self.credentials.consumer_secret.as_str(),
            request_token.as_str(),
            request_secret.as_str(),
        );
        let reply = self
            .token_request(
                &temporary,
                &self.endpoints.access_token_url,
                &[("oauth_verifier", verifier.as_str())],
            )
            .await?;

        let mut updated = self.credentials.clone();
        updated.access_token = form_field(&reply, "oauth_token").unwrap_or_default();
        updated.access_token_secret = form_field(&reply, "oauth_token_secret").unwrap_or_default();
        self.set_credentials(updated)?;
        tracing::info!("Obtained OAuth access token");

        if let Some(path) = persist_to {
            self.persist(path)?;
        }
        if verbosity == Verbosity::Reveal {
            println!("{}", self.tokens());
        }
        Ok(())
    }

    async fn token_request(
        &self,
        signer: &OAuthSigner,
        url: &str,
        extra_oauth: &[(&str, &str)],
    ) -> Result<String> {
        let header = signer.sign_with("POST", url, &[], extra_oauth)?;
        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CredentialError::Handshake(format!(
                "token endpoint {} answered {}: {}",
                url, status, body
            ))
            .into());
        }
        Ok(body)
    }
}

fn form_field(body: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Pull `oauth_verifier` out of the URL the provider redirected to.
///
/// A pasted query string without scheme and host (`?oauth_token=..&oauth_verifier=..`)
/// is accepted too.
pub fn parse_verifier(redirect: &str) -> Result<String> {
    let redirect = redirect.trim();
    let query = match Url::parse(redirect) {
        Ok(url) => url.query().map(str::to_string),
        Err(_) => redirect
            .split_once('?')
            .map(|(_, q)| q.split_once('#').map_or(q, |(q, _)| q).to_string()),
    };

    query
        .as_deref()
        .and_then(|q| form_field(q, "oauth_verifier"))
        .ok_or_else(|| {
            TumblrError::Parse(format!("no oauth_verifier in redirect URL '{}'", redirect))
        })
}
