use thiserror::Error;

/// Errors surfaced by the market-data and news clients.
///
/// Upstream messages are carried through unmodified.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or contradictory caller-supplied parameters. Raised before any
    /// request is sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested symbol or entity is unknown upstream.
    #[error("not found: {0}")]
    Lookup(String),

    /// Network, authentication, rate-limit or malformed-response failure.
    #[error("external service error: {0}")]
    ExternalService(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Error::Lookup(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        Error::ExternalService(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::Lookup(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ExternalService(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ExternalService(format!("malformed response: {}", err))
    }
}
