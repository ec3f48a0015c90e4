use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No {0} entered")]
    EmptyInput(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC endpoint is not set")]
    MissingRpcEndpoint,

    #[error("Solana RPC error: {0}")]
    SolanaRpc(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A balance check is already running")]
    RunInProgress,
}

impl Error {
    /// True for errors raised before any network call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput(_) | Error::InvalidAddress(_) | Error::MissingRpcEndpoint
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ExternalService(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(format!("Malformed JSON: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
