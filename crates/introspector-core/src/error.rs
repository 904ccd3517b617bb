use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntrospectError {
    #[error("Provider not configured: {0}")]
    ProviderUnconfigured(String),

    #[error("Provider error: {0}")]
    ProviderResponse(String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    #[error("Have a conversation first: need at least {required} messages, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("No active session")]
    NoActiveSession,

    #[error("Session already finalized")]
    SessionFinished,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IntrospectError {
    pub fn insufficient_history(required: usize, actual: usize) -> Self {
        Self::InsufficientHistory { required, actual }
    }

    /// Whether the session is still usable for another attempt after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderResponse(_)
                | Self::UnexpectedResponseShape(_)
                | Self::Http(_)
                | Self::InsufficientHistory { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IntrospectError>;
