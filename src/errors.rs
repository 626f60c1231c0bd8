use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Block data provider operations
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Scan pipeline failures surfaced to the caller
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Errors raised while talking to a blockchain data provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP transport failed before a response arrived
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Provider answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded into the expected shape
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Response decoded but lacked a required field
    #[error("Missing field `{field}` in response from {url}")]
    MissingField { url: String, field: String },
}

/// Scan pipeline error taxonomy
///
/// Only `NoProviderReachable` and a failed first block page ever reach a
/// caller. The remaining variants are logged at the point of failure and the
/// scan carries on with degraded data.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Every candidate provider failed the selection call
    #[error("No block data provider reachable (tried: {tried})")]
    NoProviderReachable { tried: String },

    /// A block listing page could not be fetched
    #[error("Block page fetch failed at {anchor}: {source}")]
    PageFetchFailed {
        anchor: String,
        #[source]
        source: ProviderError,
    },

    /// The pool registry could not be fetched or parsed
    #[error("Pool registry load failed: {0}")]
    RegistryLoadFailed(String),

    /// A registry tag pattern is not a valid regular expression
    #[error("Malformed pool tag pattern `{pattern}`: {message}")]
    MalformedPattern { pattern: String, message: String },

    /// A script could not be decoded
    #[error("Script decode failure: {0}")]
    DecodeFailure(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl ProviderError {
    /// Build a transport error from a reqwest failure, keeping the status when present
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ProviderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None if err.is_decode() => ProviderError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            },
            None => ProviderError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            },
        }
    }
}
