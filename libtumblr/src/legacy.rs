//! Legacy `backup.conf` support
//!
//! The old backup script kept its settings in a line-oriented
//! `key=value` file and authenticated with a bare `api_key` query
//! parameter instead of OAuth signing.

use std::path::Path;

use crate::error::Result;

pub const DEFAULT_LEGACY_FILE: &str = "backup.conf";
pub const LEGACY_API_URL: &str = "http://api.tumblr.com/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyConfig {
    pub user: String,
    pub oauth_key: String,
    pub oauth_sec: String,
}

impl LegacyConfig {
    /// Parse `user=`, `oauth_key=` and `oauth_sec=` lines.
    ///
    /// Spaces are removed everywhere on the line. The value is the text
    /// after the first `=` with any further `=` characters dropped. Later
    /// lines win.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();

        for line in text.lines() {
            let line: String = line.trim().chars().filter(|c| *c != ' ').collect();
            let Some((key, rest)) = line.split_once('=') else {
                continue;
            };
            let value = rest.replace('=', "");

            match key {
                "user" => config.user = value,
                "oauth_key" => config.oauth_key = value,
                "oauth_sec" => config.oauth_sec = value,
                _ => {}
            }
        }

        config
    }

    /// Read and parse `path`; a missing file gives an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!("No legacy config at {}", path.display());
            return Ok(Self::default());
        }
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Console diagnostics for each absent field, in a fixed order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user.is_empty() {
            missing.push("user not defined");
        }
        if self.oauth_key.is_empty() {
            missing.push("oauth key not defined");
        }
        if self.oauth_sec.is_empty() {
            missing.push("oauth secret key not defined");
        }
        missing
    }

    /// Likes URL for the configured user, keyed by `api_key`.
    pub fn likes_url(&self, base_url: &str) -> String {
        format!(
            "{}/v2/blog/{}.tumblr.com/likes?api_key={}",
            base_url.trim_end_matches('/'),
            self.user,
            self.oauth_key
        )
    }
}

/// Fetch the configured user's likes without OAuth signing.
///
/// The body must be JSON; the status code is not inspected.
pub async fn fetch_likes(
    http: &reqwest::Client,
    config: &LegacyConfig,
    base_url: &str,
) -> Result<serde_json::Value> {
    let url = config.likes_url(base_url);
    tracing::debug!(user = %config.user, "Fetching likes with api_key");

    let body = http.get(&url).send().await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// `"{status} {msg}"` from the `meta` object, as the script prints it.
pub fn status_line(body: &serde_json::Value) -> Option<String> {
    let meta = body.get("meta")?;
    let status = meta.get("status")?;
    let msg = meta.get("msg")?;
    let msg = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
    Some(format!("{} {}", status, msg))
}
