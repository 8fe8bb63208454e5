//! libtumblr - a small OAuth1 client for the Tumblr v2 API
//!
//! Credential handling (load, validate, persist, three-legged handshake),
//! request signing, and a handful of read-only endpoints returning a
//! normalized response envelope.

pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod legacy;
pub mod logging;
pub mod oauth;
pub mod types;

// Re-export commonly used types
pub use client::TumblrClient;
pub use config::Config;
pub use credentials::{
    Authorizer, CredentialManager, CredentialSet, CredentialSource, StdinAuthorizer, Verbosity,
};
pub use endpoints::{DashboardOptions, Endpoint, FollowingOptions, LikesOptions, PostsOptions};
pub use error::{CredentialError, Result, TumblrError};
pub use types::{Method, Params, RequestEnvelope};
