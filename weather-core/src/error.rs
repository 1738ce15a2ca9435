use thiserror::Error;

/// Why a provider call did not produce usable data.
///
/// These never leave the client: every variant is logged and then collapsed into
/// `Lookup::NotFound` or an empty suggestion list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("provider payload carries no status code")]
    MissingStatus,

    #[error("failed to parse provider payload: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// A request that was deliberately not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("query shorter than {min} characters")]
    QueryTooShort { min: usize },
}
