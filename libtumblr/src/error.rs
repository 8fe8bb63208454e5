//! Error types for libtumblr

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TumblrError>;

#[derive(Error, Debug)]
pub enum TumblrError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to parse redirect URL: {0}")]
    Parse(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TumblrError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TumblrError::InvalidArgument(_) => 3,
            TumblrError::UnsupportedMethod(_) => 3,
            TumblrError::Credential(_) => 2,
            TumblrError::Config(_) => 1,
            TumblrError::Transport(_) => 1,
            TumblrError::Decode(_) => 1,
            TumblrError::Parse(_) => 1,
            TumblrError::Io(_) => 1,
        }
    }
}

impl From<serde_json::Error> for TumblrError {
    fn from(err: serde_json::Error) -> Self {
        TumblrError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for TumblrError {
    fn from(err: url::ParseError) -> Self {
        TumblrError::Parse(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Needs both oauth consumer keys if tokens are provided")]
    MissingConsumerKeys,

    #[error("Needs both oauth tokens")]
    IncompleteTokenPair,

    #[error("Consumer key cannot be empty")]
    EmptyConsumerKey,

    #[error("OAuth handshake failed: {0}")]
    Handshake(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
