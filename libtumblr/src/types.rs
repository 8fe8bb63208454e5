//! Core data types shared by the API client and the binaries

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::error::{Result, TumblrError};

/// HTTP methods the executor understands.
///
/// Only `Get` is executed; the write methods parse but are rejected with
/// [`TumblrError::UnsupportedMethod`] by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = TumblrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(TumblrError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Query parameters in insertion order.
///
/// Setting a name twice replaces the earlier value, so this behaves like
/// a mapping that remembers the order keys were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|entry| entry.0 == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn insert_opt(&mut self, name: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Keep only names found in `allowed`; everything else is dropped.
    pub fn filtered(&self, allowed: &[&str]) -> Params {
        Params(
            self.0
                .iter()
                .filter(|(k, _)| allowed.contains(&k.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// `application/x-www-form-urlencoded` rendering, spaces as `+`.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

/// Normalized result of every API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Request path relative to the API root, including the query string
    pub request: String,
    pub meta: Value,
    pub errors: Value,
    pub response: Value,
}

impl RequestEnvelope {
    /// Placeholder used when the payload carries no `errors` or `response`.
    pub fn sentinel() -> Value {
        json!([{ "null": null }])
    }

    /// Repackage a decoded API body.
    ///
    /// `meta` is mandatory; a payload without it is a decode failure.
    pub fn from_body(request: impl Into<String>, mut body: Value) -> Result<Self> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| TumblrError::Decode("response body is not a JSON object".to_string()))?;

        let meta = object
            .remove("meta")
            .ok_or_else(|| TumblrError::Decode("response body has no 'meta' field".to_string()))?;

        Ok(Self {
            request: request.into(),
            meta,
            errors: object.remove("errors").unwrap_or_else(Self::sentinel),
            response: object.remove("response").unwrap_or_else(Self::sentinel),
        })
    }

    /// HTTP-like status code reported in `meta.status`
    pub fn status(&self) -> Option<u64> {
        self.meta.get("status").and_then(Value::as_u64)
    }

    pub fn message(&self) -> Option<&str> {
        self.meta.get("msg").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_sensitive() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "get".parse::<Method>(),
            Err(TumblrError::UnsupportedMethod(m)) if m == "get"
        ));
    }

    #[test]
    fn test_params_insert_replaces_and_keeps_order() {
        let params = Params::new()
            .with("limit", 5)
            .with("offset", 10)
            .with("limit", 20);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("limit"), Some("20"));
        assert_eq!(params.pairs()[0].0, "limit");
        assert_eq!(params.pairs()[1].0, "offset");
    }

    #[test]
    fn test_params_filtered_drops_unknown_names() {
        let params = Params::new().with("limit", 5).with("bogus", 1);
        let filtered = params.filtered(&["limit", "offset"]);

        assert_eq!(filtered.get("limit"), Some("5"));
        assert_eq!(filtered.get("bogus"), None);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_params_filtered_with_empty_allow_list() {
        let params = Params::new().with("limit", 5);
        assert!(params.filtered(&[]).is_empty());
    }

    #[test]
    fn test_params_to_query_encodes() {
        let params = Params::new().with("tag", "cute cats").with("filter", "a&b");
        assert_eq!(params.to_query(), "tag=cute+cats&filter=a%26b");
    }

    #[test]
    fn test_insert_opt_skips_none() {
        let mut params = Params::new();
        params.insert_opt("limit", None::<u32>);
        params.insert_opt("offset", Some(3u32));
        assert_eq!(params.pairs(), &[("offset".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_envelope_defaults_missing_errors_to_sentinel() {
        let body = json!({ "meta": { "status": 200, "msg": "OK" }, "response": { "liked_count": 1 } });
        let envelope = RequestEnvelope::from_body("v2/user/likes", body).unwrap();

        assert_eq!(envelope.errors, json!([{ "null": null }]));
        assert_eq!(envelope.errors.as_array().map(Vec::len), Some(1));
        assert_eq!(envelope.response, json!({ "liked_count": 1 }));
        assert_eq!(envelope.status(), Some(200));
        assert_eq!(envelope.message(), Some("OK"));
    }

    #[test]
    fn test_envelope_defaults_missing_response_to_sentinel() {
        let body = json!({ "meta": { "status": 401, "msg": "Not Authorized" }, "errors": [{ "code": 1 }] });
        let envelope = RequestEnvelope::from_body("v2/user/info", body).unwrap();

        assert_eq!(envelope.response, RequestEnvelope::sentinel());
        assert_eq!(envelope.errors, json!([{ "code": 1 }]));
    }

    #[test]
    fn test_envelope_requires_meta() {
        let result = RequestEnvelope::from_body("v2/user/info", json!({ "response": {} }));
        assert!(matches!(result, Err(TumblrError::Decode(_))));

        let result = RequestEnvelope::from_body("v2/user/info", json!([1, 2, 3]));
        assert!(matches!(result, Err(TumblrError::Decode(_))));
    }
}
