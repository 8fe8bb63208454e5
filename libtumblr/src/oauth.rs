//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Produces the `Authorization: OAuth ...` header value for a request.
//! Query and form parameters take part in the signature base string, so
//! callers pass them separately from the URL.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::{CredentialError, Result};

/// Everything except the RFC 3986 unreserved characters.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context derived from the four credential strings.
///
/// With an empty token pair only the consumer credentials are used, which
/// is what the request-token leg of the handshake needs.
#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer_key)
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

impl OAuthSigner {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Signer that only carries the consumer pair.
    pub fn request_only(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self::new(consumer_key, consumer_secret, String::new(), String::new())
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Generate the Authorization header value for a request.
    ///
    /// `url` may carry a query string; it is dropped from the base string
    /// URI, and the caller is expected to list those pairs in `params`.
    pub fn sign(&self, method: &str, url: &str, params: &[(String, String)]) -> Result<String> {
        self.sign_with(method, url, params, &[])
    }

    /// Like [`sign`](Self::sign) with additional `oauth_*` protocol
    /// parameters, e.g. `oauth_verifier` on the access-token leg.
    pub fn sign_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
    ) -> Result<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| CredentialError::Handshake(format!("Failed to get timestamp: {e}")))?
            .as_secs()
            .to_string();

        self.sign_at(method, url, params, extra_oauth, &generate_nonce(), &timestamp)
    }

    pub(crate) fn sign_at(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
        ];
        if self.has_token() {
            oauth_params.push(("oauth_token".to_string(), self.token.clone()));
        }
        oauth_params.push(("oauth_version".to_string(), "1.0".to_string()));
        oauth_params.extend(
            extra_oauth
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let normalized = normalize_parameters(
            oauth_params
                .iter()
                .chain(params.iter())
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(&base_string_uri(&Url::parse(url)?)),
            percent_encode(&normalized)
        );

        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }
}

/// Percent-encode a string per RFC 3986 (unreserved characters kept).
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Scheme, authority and path of a URL as used in the base string.
pub fn base_string_uri(url: &Url) -> String {
    let mut out = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        out.push_str(&format!(":{port}"));
    }
    out.push_str(url.path());
    out
}

/// Encode every pair, sort by name then value, join with `&`.
pub fn normalize_parameters<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn generate_nonce() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hmac_sha1(key: &str, data: &str) -> Result<String> {
    type HmacSha1 = Hmac<sha1::Sha1>;

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialError::Handshake(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
        header
            .trim_start_matches("OAuth ")
            .split(", ")
            .find_map(|pair| pair.strip_prefix(&format!("{name}=\"")))
            .map(|v| v.trim_end_matches('"'))
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("\u{2603}"), "%E2%98%83");
        assert_eq!(percent_encode("test-value_123.txt~"), "test-value_123.txt~");
    }

    #[test]
    fn test_base_string_uri() {
        let url = Url::parse("HTTP://EXAMPLE.COM:80/r%20v/X?id=123").unwrap();
        assert_eq!(base_string_uri(&url), "http://example.com/r%20v/X");

        let url = Url::parse("https://www.example.net:8080/?q=1").unwrap();
        assert_eq!(base_string_uri(&url), "https://www.example.net:8080/");
    }

    #[test]
    fn test_normalize_parameters() {
        let params = [
            ("b5", "=%3D"),
            ("a3", "a"),
            ("c@", ""),
            ("a2", "r b"),
            ("oauth_consumer_key", "9djdj82h48djs9d2"),
            ("oauth_token", "kkk9d7dh3k39sjv7"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "137131201"),
            ("oauth_nonce", "7d8f3e4a"),
            ("c2", ""),
            ("a3", "2 q"),
        ];
        assert_eq!(
            normalize_parameters(params),
            concat!(
                "a2=r%20b&a3=2%20q&a3=a&b5=%3D%253D&c%40=&c2=&oauth_consumer_key=9dj",
                "dj82h48djs9d2&oauth_nonce=7d8f3e4a&oauth_signature_method=HMAC-SHA1",
                "&oauth_timestamp=137131201&oauth_token=kkk9d7dh3k39sjv7"
            )
        );
    }

    #[test]
    fn test_known_signature() {
        let signer = OAuthSigner::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = vec![
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
            ("include_entities".to_string(), "true".to_string()),
        ];

        let header = signer
            .sign_at(
                "POST",
                "https://api.twitter.com/1/statuses/update.json",
                &params,
                &[],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                "1318622958",
            )
            .unwrap();

        assert_eq!(
            header_value(&header, "oauth_signature"),
            Some("tnnArxj06cWHq44gCs1OSKk%2FjLY%3D")
        );
    }

    #[test]
    fn test_request_only_signer_omits_token() {
        let signer = OAuthSigner::request_only("ck", "cs");
        let header = signer
            .sign("POST", "http://www.tumblr.com/oauth/request_token", &[])
            .unwrap();

        assert!(header.starts_with("OAuth "));
        assert_eq!(header_value(&header, "oauth_consumer_key"), Some("ck"));
        assert!(header_value(&header, "oauth_token").is_none());
        assert!(header_value(&header, "oauth_signature").is_some());
    }

    #[test]
    fn test_extra_oauth_params_in_header() {
        let signer = OAuthSigner::new("ck", "cs", "rt", "rts");
        let header = signer
            .sign_with(
                "POST",
                "http://www.tumblr.com/oauth/access_token",
                &[],
                &[("oauth_verifier", "v3r")],
            )
            .unwrap();

        assert_eq!(header_value(&header, "oauth_verifier"), Some("v3r"));
        assert_eq!(header_value(&header, "oauth_token"), Some("rt"));
    }

    #[test]
    fn test_nonce_is_random_hex() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let signer = OAuthSigner::new("ck", "super-secret", "tok", "tok-secret");
        let debug = format!("{:?}", signer);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("tok-secret"));
    }

    #[test]
    fn test_invalid_url_is_parse_error() {
        let signer = OAuthSigner::request_only("ck", "cs");
        let result = signer.sign("GET", "not a url", &[]);
        assert!(matches!(result, Err(crate::error::TumblrError::Parse(_))));
    }
}
